use axum::{
    Extension, Form,
    extract::{Path, State},
    response::Response,
};
use tera::Context;
use tracing::{info, warn};

use warbler_db::{DbError, UserRow};
use warbler_types::forms::MessageForm;

use crate::auth::{AppState, AppStateInner};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::session::Session;
use crate::views::message_view;

pub async fn new_message_form(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    render_new(&state, session, &me, &[], "")
}

pub async fn create_message(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Form(form): Form<MessageForm>,
) -> Result<Response, AppError> {
    match state.db.insert_message(me.id, &form.text) {
        Ok(message) => {
            info!("User {} posted message {}", me.id, message.id);
            session.redirect(&state, &format!("/users/{}", me.id))
        }
        Err(err) => match err.downcast_ref::<DbError>() {
            Some(e @ (DbError::MissingField(_) | DbError::MessageTooLong)) => {
                let errors = vec![e.to_string()];
                render_new(&state, session, &me, &errors, &form.text)
            }
            _ => Err(err.into()),
        },
    }
}

pub async fn show_message(
    State(state): State<AppState>,
    session: Session,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let viewer = state.current_user(&session)?;
    let message = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    let author = state.db.message_author(&message)?;
    let liked = match &viewer {
        Some(v) => state.db.liked_message_ids(v.id)?.contains(&message.id),
        None => false,
    };

    let mut ctx = Context::new();
    ctx.insert("message", &message_view(&message, &author, liked));
    session.render(&state, viewer.as_ref(), "messages/show.html", ctx)
}

/// Only the author may delete a message.
pub async fn delete_message(
    State(state): State<AppState>,
    mut session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(message_id): Path<i64>,
) -> Result<Response, AppError> {
    let message = state.db.get_message(message_id)?.ok_or(AppError::NotFound)?;
    if message.user_id != me.id {
        warn!("User {} tried to delete message {} owned by {}", me.id, message.id, message.user_id);
        session.flash("danger", "Unauthorized Action");
        return session.redirect(&state, "/");
    }

    state.db.delete_message(message.id)?;
    session.redirect(&state, &format!("/users/{}", me.id))
}

fn render_new(
    state: &AppStateInner,
    session: Session,
    me: &UserRow,
    errors: &[String],
    text: &str,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("errors", errors);
    ctx.insert("text", text);
    session.render(state, Some(me), "messages/new.html", ctx)
}
