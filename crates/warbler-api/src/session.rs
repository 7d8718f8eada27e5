//! Cookie-backed session.
//!
//! The whole session lives client-side in one cookie, signed as an HS256 JWT
//! so it cannot be forged without the server's secret key. It carries the
//! logged-in user id and any pending flash messages. A missing, tampered or
//! expired cookie reads as an empty session.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tera::Context;
use tracing::debug;

use warbler_db::UserRow;
use warbler_types::views::Flash;

use crate::auth::{AppState, AppStateInner};
use crate::error::AppError;
use crate::views::user_view;

pub const SESSION_COOKIE: &str = "warbler_session";

/// Name of the session field holding the logged-in user's id.
pub const CURR_USER_KEY: &str = "curr_user";

const SESSION_TTL_DAYS: i64 = 31;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curr_user: Option<i64>,
    #[serde(default, rename = "_flashes", skip_serializing_if = "Vec::is_empty")]
    pub flashes: Vec<Flash>,
}

impl SessionData {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            curr_user: Some(user_id),
            flashes: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.curr_user.is_none() && self.flashes.is_empty()
    }
}

#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    data: SessionData,
    exp: usize,
}

/// Signs and verifies session cookies.
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = Claims {
            data: data.clone(),
            exp: (chrono::Utc::now() + chrono::Duration::days(SESSION_TTL_DAYS)).timestamp()
                as usize,
        };
        encode(&Header::default(), &claims, &self.encoding)
    }

    pub fn decode(&self, token: &str) -> Option<SessionData> {
        match decode::<Claims>(token, &self.decoding, &Validation::default()) {
            Ok(token_data) => Some(token_data.claims.data),
            Err(e) => {
                debug!("Discarding session cookie: {}", e);
                None
            }
        }
    }
}

/// The current request's session. Changes are written back to the cookie
/// by [`Session::redirect`] and [`Session::render`].
pub struct Session {
    data: SessionData,
    jar: CookieJar,
    dirty: bool,
}

impl FromRequestParts<AppState> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let data = jar
            .get(SESSION_COOKIE)
            .and_then(|cookie| state.sessions.decode(cookie.value()))
            .unwrap_or_default();

        Ok(Self {
            data,
            jar,
            dirty: false,
        })
    }
}

impl Session {
    pub fn user_id(&self) -> Option<i64> {
        self.data.curr_user
    }

    pub fn login(&mut self, user_id: i64) {
        self.data.curr_user = Some(user_id);
        self.dirty = true;
    }

    pub fn logout(&mut self) {
        if self.data.curr_user.take().is_some() {
            self.dirty = true;
        }
    }

    pub fn flash(&mut self, category: &str, message: impl Into<String>) {
        self.data.flashes.push(Flash {
            category: category.to_string(),
            message: message.into(),
        });
        self.dirty = true;
    }

    pub fn take_flashes(&mut self) -> Vec<Flash> {
        if !self.data.flashes.is_empty() {
            self.dirty = true;
        }
        std::mem::take(&mut self.data.flashes)
    }

    /// Cookie jar reflecting the session's current state.
    pub fn into_jar(self, keys: &SessionKeys) -> Result<CookieJar, AppError> {
        if !self.dirty {
            return Ok(self.jar);
        }

        if self.data.is_empty() {
            return Ok(self.jar.remove(Cookie::build(SESSION_COOKIE).path("/")));
        }

        let token = keys.encode(&self.data)?;
        let cookie = Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax);
        Ok(self.jar.add(cookie))
    }

    /// 302 to `location`, saving the session.
    pub fn redirect(self, state: &AppStateInner, location: &str) -> Result<Response, AppError> {
        let jar = self.into_jar(&state.sessions)?;
        Ok((jar, found(location)).into_response())
    }

    /// Render `template` with the pending flashes and the viewer, consuming
    /// the flashes.
    pub fn render(
        mut self,
        state: &AppStateInner,
        viewer: Option<&UserRow>,
        template: &str,
        mut ctx: Context,
    ) -> Result<Response, AppError> {
        ctx.insert("flashes", &self.take_flashes());
        ctx.insert("viewer", &viewer.map(user_view));

        let html = state.templates.render(template, &ctx)?;
        let jar = self.into_jar(&state.sessions)?;
        Ok((jar, Html(html)).into_response())
    }
}

/// Bare 302 Found.
pub fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
