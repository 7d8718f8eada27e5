use std::collections::HashSet;

use axum::{extract::State, response::Response};
use tera::Context;

use crate::auth::AppState;
use crate::error::AppError;
use crate::session::Session;
use crate::views::{authored_views, profile_view};

const TIMELINE_LIMIT: i64 = 100;

/// Anonymous visitors get the landing page; logged-in users get their own
/// and followed users' messages, newest first.
pub async fn homepage(State(state): State<AppState>, session: Session) -> Result<Response, AppError> {
    let Some(viewer) = state.current_user(&session)? else {
        return session.render(&state, None, "home-anon.html", Context::new());
    };

    // Run the timeline queries off the async runtime
    let db = state.clone();
    let user = viewer.clone();
    let (profile, messages) = tokio::task::spawn_blocking(move || {
        let rows = db.db.home_timeline(user.id, TIMELINE_LIMIT)?;
        let liked: HashSet<i64> = db.db.liked_message_ids(user.id)?.into_iter().collect();
        let profile = profile_view(&db.db, &user, Some(&user))?;
        Ok::<_, anyhow::Error>((profile, authored_views(&rows, &liked)))
    })
    .await??;

    let mut ctx = Context::new();
    ctx.insert("profile", &profile);
    ctx.insert("messages", &messages);
    session.render(&state, Some(&viewer), "home.html", ctx)
}
