use std::collections::HashSet;

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::Response,
};
use serde_json::json;
use tera::Context;
use tracing::info;

use warbler_db::{DbError, ProfileUpdate, UserRow};
use warbler_types::forms::{SearchQuery, UserEditForm};

use crate::auth::{AppState, AppStateInner};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::session::Session;
use crate::views::{authored_views, message_view, profile_view, user_view};

const PROFILE_MESSAGE_LIMIT: i64 = 100;

pub async fn list_users(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let viewer = state.current_user(&session)?;
    let users: Vec<_> = state
        .db
        .search_users(query.q.as_deref())?
        .iter()
        .map(user_view)
        .collect();

    let mut ctx = Context::new();
    ctx.insert("users", &users);
    ctx.insert("q", &query.q.unwrap_or_default());
    session.render(&state, viewer.as_ref(), "users/index.html", ctx)
}

pub async fn show_user(
    State(state): State<AppState>,
    session: Session,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let viewer = state.current_user(&session)?;
    let user = find_user(&state, user_id)?;

    let liked: HashSet<i64> = match &viewer {
        Some(v) => state.db.liked_message_ids(v.id)?.into_iter().collect(),
        None => HashSet::new(),
    };
    let messages: Vec<_> = state
        .db
        .recent_messages_for_user(user.id, PROFILE_MESSAGE_LIMIT)?
        .iter()
        .map(|m| message_view(m, &user, liked.contains(&m.id)))
        .collect();

    let mut ctx = Context::new();
    ctx.insert("profile", &profile_view(&state.db, &user, viewer.as_ref())?);
    ctx.insert("messages", &messages);
    session.render(&state, viewer.as_ref(), "users/show.html", ctx)
}

pub async fn show_following(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = find_user(&state, user_id)?;
    let following = state.db.following(user.id)?;
    render_connections(&state, session, &me, &user, "Following", &following)
}

pub async fn show_followers(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = find_user(&state, user_id)?;
    let followers = state.db.followers(user.id)?;
    render_connections(&state, session, &me, &user, "Followers", &followers)
}

pub async fn show_likes(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(user_id): Path<i64>,
) -> Result<Response, AppError> {
    let user = find_user(&state, user_id)?;
    let rows = state.db.liked_timeline(user.id)?;
    let my_likes: HashSet<i64> = state.db.liked_message_ids(me.id)?.into_iter().collect();

    let mut ctx = Context::new();
    ctx.insert("profile", &profile_view(&state.db, &user, Some(&me))?);
    ctx.insert("messages", &authored_views(&rows, &my_likes));
    session.render(&state, Some(&me), "users/likes.html", ctx)
}

pub async fn add_follow(
    State(state): State<AppState>,
    mut session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(follow_id): Path<i64>,
) -> Result<Response, AppError> {
    let followed = find_user(&state, follow_id)?;
    if followed.id == me.id {
        session.flash("danger", "You can't follow yourself.");
        return session.redirect(&state, &format!("/users/{}", me.id));
    }

    state.db.follow(me.id, followed.id)?;
    session.redirect(&state, &format!("/users/{}/following", me.id))
}

pub async fn stop_following(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(follow_id): Path<i64>,
) -> Result<Response, AppError> {
    let followed = find_user(&state, follow_id)?;
    state.db.unfollow(me.id, followed.id)?;
    session.redirect(&state, &format!("/users/{}/following", me.id))
}

pub async fn edit_profile_form(
    State(state): State<AppState>,
    session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    let form = json!({
        "username": me.username,
        "email": me.email,
        "image_url": me.image_url,
        "header_image_url": me.header_image_url,
        "bio": me.bio.clone().unwrap_or_default(),
        "location": me.location.clone().unwrap_or_default(),
    });
    render_edit(&state, session, &me, form)
}

pub async fn edit_profile(
    State(state): State<AppState>,
    mut session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Form(form): Form<UserEditForm>,
) -> Result<Response, AppError> {
    let db = state.clone();
    let username = me.username.clone();
    let password = form.password.clone();
    let confirmed = tokio::task::spawn_blocking(move || db.db.authenticate(&username, &password))
        .await??;
    if confirmed.is_none() {
        session.flash("danger", "Wrong password, please try again.");
        return session.redirect(&state, "/");
    }

    let update = ProfileUpdate {
        username: form.username.trim().to_string(),
        email: form.email.trim().to_string(),
        image_url: form.image_url.clone(),
        header_image_url: form.header_image_url.clone(),
        bio: form.bio.clone(),
        location: form.location.clone(),
    };

    match state.db.update_user(me.id, &update) {
        Ok(user) => {
            info!("User {} updated their profile", user.id);
            session.redirect(&state, &format!("/users/{}", user.id))
        }
        Err(err) => match err.downcast_ref::<DbError>() {
            Some(e @ (DbError::UsernameTaken | DbError::EmailTaken | DbError::MissingField(_))) => {
                session.flash("danger", e.to_string());
                let echo = json!({
                    "username": form.username,
                    "email": form.email,
                    "image_url": form.image_url.unwrap_or_default(),
                    "header_image_url": form.header_image_url.unwrap_or_default(),
                    "bio": form.bio.unwrap_or_default(),
                    "location": form.location.unwrap_or_default(),
                });
                render_edit(&state, session, &me, echo)
            }
            _ => Err(err.into()),
        },
    }
}

pub async fn delete_user(
    State(state): State<AppState>,
    mut session: Session,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
) -> Result<Response, AppError> {
    session.logout();
    state.db.delete_user(me.id)?;
    session.redirect(&state, "/signup")
}

fn find_user(state: &AppStateInner, user_id: i64) -> Result<UserRow, AppError> {
    state.db.get_user(user_id)?.ok_or(AppError::NotFound)
}

fn render_connections(
    state: &AppStateInner,
    session: Session,
    me: &UserRow,
    user: &UserRow,
    title: &str,
    users: &[UserRow],
) -> Result<Response, AppError> {
    let users: Vec<_> = users.iter().map(user_view).collect();

    let mut ctx = Context::new();
    ctx.insert("profile", &profile_view(&state.db, user, Some(me))?);
    ctx.insert("title", title);
    ctx.insert("users", &users);
    session.render(state, Some(me), "users/connections.html", ctx)
}

fn render_edit(
    state: &AppStateInner,
    session: Session,
    me: &UserRow,
    form: serde_json::Value,
) -> Result<Response, AppError> {
    let mut ctx = Context::new();
    ctx.insert("form", &form);
    session.render(state, Some(me), "users/edit.html", ctx)
}
