mod common;

use axum::http::StatusCode;

use common::TestClient;

#[tokio::test]
async fn anonymous_home_is_landing_page() {
    let mut client = TestClient::new();
    let resp = client.get("/").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Sign up now"));
}

#[tokio::test]
async fn signup_logs_in_new_user() {
    let mut client = TestClient::new();

    let resp = client
        .post(
            "/signup",
            &[
                ("username", "testing"),
                ("email", "user3@test.com"),
                ("password", "123456"),
                ("image_url", ""),
            ],
        )
        .await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/"));

    let user = client.db().get_user_by_username("testing").unwrap().unwrap();
    assert_eq!(user.email, "user3@test.com");

    let home = client.get("/").await;
    assert!(home.body.contains("@testing"));
}

#[tokio::test]
async fn signup_rejects_taken_username() {
    let mut client = TestClient::new();
    client.user("test1");

    let resp = client
        .post(
            "/signup",
            &[("username", "test1"), ("email", "other@test.com"), ("password", "123456")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Username already taken"));
    assert!(client.db().get_user_by_username("test1").unwrap().is_some());
}

#[tokio::test]
async fn signup_validates_fields() {
    let mut client = TestClient::new();

    let resp = client
        .post(
            "/signup",
            &[("username", "iam3"), ("email", "not-an-email"), ("password", "123")],
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid email address"));
    assert!(resp.body.contains("Password must be at least 6 characters"));
    assert!(client.db().get_user_by_username("iam3").unwrap().is_none());
}

#[tokio::test]
async fn login_greets_user() {
    let mut client = TestClient::new();
    client.user("test1");

    let resp = client
        .post_following("/login", &[("username", "test1"), ("password", "password")])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Hello, test1!"));
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    let mut client = TestClient::new();
    client.user("test1");

    let resp = client
        .post("/login", &[("username", "test1"), ("password", "wrongpw")])
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid credentials."));

    let resp = client
        .post_following("/messages/new", &[("text", "Hello")])
        .await;
    assert!(resp.body.contains("Access unauthorized"));
}

#[tokio::test]
async fn logout_clears_session() {
    let mut client = TestClient::new();
    let u1 = client.user("test1");
    client.login_as(u1.id);

    let resp = client.get("/logout").await;
    assert_eq!(resp.status, StatusCode::FOUND);
    assert_eq!(resp.location.as_deref(), Some("/login"));

    let resp = client.get("/login").await;
    assert!(resp.body.contains("You have successfully logged out."));

    let resp = client.get_following("/messages/new").await;
    assert!(resp.body.contains("Access unauthorized"));
}

#[tokio::test]
async fn tampered_session_is_anonymous() {
    let mut client = TestClient::new();
    client.user("test1");
    client.set_raw_cookie("eyJhbGciOiJIUzI1NiJ9.eyJjdXJyX3VzZXIiOjF9.forged");

    let resp = client.get_following("/messages/new").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Access unauthorized"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let mut client = TestClient::new();
    let resp = client.get("/no/such/page").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert!(resp.body.contains("404"));
}

#[tokio::test]
async fn login_without_password_is_rejected() {
    let mut client = TestClient::new();
    client.user("test1");

    let resp = client.post("/login", &[("username", "test1")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid credentials."));
}

#[tokio::test]
async fn signup_with_missing_fields_rerenders_form() {
    let mut client = TestClient::new();

    let resp = client.post("/signup", &[("username", "iam3")]).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.body.contains("Invalid email address"));
    assert!(resp.body.contains("Password must be at least 6 characters"));
    assert!(client.db().get_user_by_username("iam3").unwrap().is_none());
}
