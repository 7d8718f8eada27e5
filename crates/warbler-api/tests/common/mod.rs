//! In-process client for driving the router the way a browser would: it
//! keeps the session cookie between requests and can follow redirects.

#![allow(dead_code)]

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use axum_extra::extract::cookie::Cookie;
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::session::{SESSION_COOKIE, SessionData};
use warbler_api::{AppState, AppStateInner, router};
use warbler_db::{Database, MessageRow, UserRow};

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub struct TestClient {
    pub state: AppState,
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let db = Database::open_in_memory().unwrap();
        let state = AppStateInner::new(db, "test-secret").unwrap();
        let app = router(state.clone(), Path::new("static"));
        Self {
            state,
            app,
            cookie: None,
        }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Fixture user whose password is "password".
    pub fn user(&self, username: &str) -> UserRow {
        self.db()
            .signup(username, &format!("{}@email.com", username), "password", None)
            .unwrap()
    }

    pub fn message(&self, user: &UserRow, text: &str) -> MessageRow {
        self.db().insert_message(user.id, text).unwrap()
    }

    /// Put `user_id` straight into the session, as if they had logged in.
    pub fn login_as(&mut self, user_id: i64) {
        let token = self
            .state
            .sessions
            .encode(&SessionData::for_user(user_id))
            .unwrap();
        self.cookie = Some(token);
    }

    pub fn set_raw_cookie(&mut self, value: &str) {
        self.cookie = Some(value.to_string());
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request("GET", uri, None).await
    }

    pub async fn post(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let body = serde_urlencoded::to_string(form).unwrap();
        self.request("POST", uri, Some(body)).await
    }

    pub async fn get_following(&mut self, uri: &str) -> TestResponse {
        let resp = self.get(uri).await;
        self.follow_redirects(resp).await
    }

    pub async fn post_following(&mut self, uri: &str, form: &[(&str, &str)]) -> TestResponse {
        let resp = self.post(uri, form).await;
        self.follow_redirects(resp).await
    }

    async fn follow_redirects(&mut self, mut resp: TestResponse) -> TestResponse {
        while resp.status == StatusCode::FOUND {
            let location = resp.location.clone().expect("redirect without Location");
            resp = self.get(&location).await;
        }
        resp
    }

    async fn request(&mut self, method: &str, uri: &str, form: Option<String>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            let cookie = Cookie::new(SESSION_COOKIE, cookie.clone());
            builder = builder.header(header::COOKIE, cookie.to_string());
        }
        let req = match form {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body)),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let resp = self.app.clone().oneshot(req).await.unwrap();

        for set_cookie in resp.headers().get_all(header::SET_COOKIE) {
            let cookie = Cookie::parse(set_cookie.to_str().unwrap()).unwrap();
            if cookie.name() != SESSION_COOKIE {
                continue;
            }
            let removed = cookie.value().is_empty() || cookie.max_age().is_some_and(|age| age.is_zero());
            self.cookie = (!removed).then(|| cookie.value().to_string());
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
