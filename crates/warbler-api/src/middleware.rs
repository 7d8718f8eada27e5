use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use warbler_db::UserRow;

use crate::auth::{AppState, AppStateInner};
use crate::error::AppError;
use crate::session::Session;

/// The logged-in user, inserted by [`require_login`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

/// Gate a route on a logged-in user. Anonymous visitors, and sessions naming
/// a user that no longer exists, are bounced to `/` with a flash.
pub async fn require_login(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    match state.current_user(&session)? {
        Some(user) => {
            req.extensions_mut().insert(CurrentUser(user));
            Ok(next.run(req).await)
        }
        None => {
            debug!("Unauthorized request to {}", req.uri().path());
            unauthorized(&state, session)
        }
    }
}

pub fn unauthorized(state: &AppStateInner, mut session: Session) -> Result<Response, AppError> {
    session.flash("danger", "Access unauthorized.");
    session.redirect(state, "/")
}
