use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};
use tracing::debug;

use crate::auth::AppState;
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::session::Session;

/// Like a message, or unlike it if already liked. Users cannot like their
/// own messages.
pub async fn toggle_like(
    State(state): State<AppState>,
    mut session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let message = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    if message.user_id == me.id {
        session.flash("danger", "You can't like your own warble.");
        return session.redirect(&state, "/");
    }

    let liked = state.db.toggle_like(me.id, message.id)?;
    debug!("User {} {} message {}", me.id, if liked { "liked" } else { "unliked" }, message.id);

    session.redirect(&state, "/")
}
