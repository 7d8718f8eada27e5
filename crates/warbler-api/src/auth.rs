use std::sync::Arc;

use axum::{Form, extract::State, response::Response};
use serde_json::json;
use tera::Context;
use tracing::info;

use warbler_db::{Database, DbError, UserRow};
use warbler_types::forms::{LoginForm, SignupForm};

use crate::error::AppError;
use crate::session::{Session, SessionKeys};
use crate::templates::Templates;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub sessions: SessionKeys,
    pub templates: Templates,
}

impl AppStateInner {
    pub fn new(db: Database, secret_key: &str) -> Result<AppState, tera::Error> {
        Ok(Arc::new(Self {
            db,
            sessions: SessionKeys::new(secret_key),
            templates: Templates::new()?,
        }))
    }

    /// The logged-in user, if the session names one that still exists.
    pub fn current_user(&self, session: &Session) -> Result<Option<UserRow>, AppError> {
        match session.user_id() {
            Some(id) => Ok(self.db.get_user(id)?),
            None => Ok(None),
        }
    }
}

const MIN_PASSWORD_LEN: usize = 6;

pub async fn signup_form(State(state): State<AppState>, mut session: Session) -> Result<Response, AppError> {
    session.logout();
    render_signup(&state, session, &[], "", "", "")
}

pub async fn signup(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    session.logout();

    let errors = validate_signup(&form);
    let username = form.username.clone();
    let email = form.email.clone();
    let image_url = form.image_url.clone().unwrap_or_default();
    if !errors.is_empty() {
        return render_signup(&state, session, &errors, &username, &email, &image_url);
    }

    // Argon2 hashing is CPU-bound; keep it off the async workers
    let db = state.clone();
    let result = tokio::task::spawn_blocking(move || {
        db.db.signup(&form.username, &form.email, &form.password, form.image_url.as_deref())
    })
    .await?;

    match result {
        Ok(user) => {
            session.login(user.id);
            session.redirect(&state, "/")
        }
        Err(err) => match err.downcast_ref::<DbError>() {
            Some(DbError::UsernameTaken | DbError::EmailTaken) => {
                session.flash("danger", "Username already taken");
                render_signup(&state, session, &[], &username, &email, &image_url)
            }
            Some(DbError::MissingField(field)) => {
                let errors = vec![format!("{} is required", field)];
                render_signup(&state, session, &errors, &username, &email, &image_url)
            }
            _ => Err(err.into()),
        },
    }
}

pub async fn login_form(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    render_login(&state, session, "")
}

pub async fn login(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let username = form.username.clone();
    let user = tokio::task::spawn_blocking(move || db.db.authenticate(&form.username, &form.password))
        .await??;

    match user {
        Some(user) => {
            info!("User {} logged in", user.username);
            session.login(user.id);
            session.flash("success", format!("Hello, {}!", user.username));
            session.redirect(&state, "/")
        }
        None => {
            session.flash("danger", "Invalid credentials.");
            render_login(&state, session, &username)
        }
    }
}

pub async fn logout(State(state): State<AppState>, mut session: Session) -> Result<Response, AppError> {
    session.logout();
    session.flash("success", "You have successfully logged out.");
    session.redirect(&state, "/login")
}

fn validate_signup(form: &SignupForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.username.trim().is_empty() {
        errors.push("Username is required".to_string());
    }
    if !form.email.contains('@') {
        errors.push("Invalid email address".to_string());
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
    }
    errors
}

fn render_signup(
    state: &AppStateInner,
    session: Session,
    errors: &[String],
    username: &str,
    email: &str,
    image_url: &str,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("errors", errors);
    ctx.insert("form", &json!({ "username": username, "email": email, "image_url": image_url }));
    session.render(state, None, "users/signup.html", ctx)
}

fn render_login(state: &AppStateInner, session: Session, username: &str) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", &json!({ "username": username }));
    session.render(state, None, "users/login.html", ctx)
}
