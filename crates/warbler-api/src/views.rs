use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::warn;

use warbler_db::{AuthoredMessage, Database, MessageRow, UserCounts, UserRow};
use warbler_types::views::{CountsView, MessageView, ProfileView, UserView};

pub fn user_view(user: &UserRow) -> UserView {
    UserView {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
        image_url: user.image_url.clone(),
        header_image_url: user.header_image_url.clone(),
        bio: user.bio.clone(),
        location: user.location.clone(),
    }
}

pub fn message_view(message: &MessageRow, author: &UserRow, liked: bool) -> MessageView {
    MessageView {
        id: message.id,
        text: message.text.clone(),
        timestamp: display_timestamp(&message.timestamp, message.id),
        user: user_view(author),
        liked,
    }
}

pub fn authored_views(rows: &[AuthoredMessage], liked_ids: &HashSet<i64>) -> Vec<MessageView> {
    rows.iter()
        .map(|row| message_view(&row.message, &row.author, liked_ids.contains(&row.message.id)))
        .collect()
}

fn counts_view(counts: UserCounts) -> CountsView {
    CountsView {
        messages: counts.messages,
        following: counts.following,
        followers: counts.followers,
        likes: counts.likes,
    }
}

/// Profile header data for `user` as seen by `viewer`.
pub fn profile_view(db: &Database, user: &UserRow, viewer: Option<&UserRow>) -> anyhow::Result<ProfileView> {
    let counts = db.counts_for_user(user.id)?;
    let is_following = match viewer {
        Some(viewer) if viewer.id != user.id => db.is_following(viewer.id, user.id)?,
        _ => false,
    };

    Ok(ProfileView {
        user: user_view(user),
        counts: counts_view(counts),
        is_self: viewer.is_some_and(|v| v.id == user.id),
        is_following,
    })
}

/// "2026-10-19 08:15:00.123456" -> "19 October 2026"
fn display_timestamp(raw: &str, message_id: i64) -> String {
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        Ok(ts) => ts.format("%d %B %Y").to_string(),
        Err(e) => {
            warn!("Corrupt timestamp '{}' on message '{}': {}", raw, message_id, e);
            raw.to_string()
        }
    }
}
