use serde::{Deserialize, Serialize};

/// Public face of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub image_url: String,
    pub header_image_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageView {
    pub id: i64,
    pub text: String,
    /// Display form, e.g. "19 October 2026".
    pub timestamp: String,
    pub user: UserView,
    pub liked: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CountsView {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

/// Header and sidebar data for every `/users/{id}/...` page.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: UserView,
    pub counts: CountsView,
    /// The viewer is looking at their own profile.
    pub is_self: bool,
    /// The viewer follows this user.
    pub is_following: bool,
}

/// One-shot notice shown on the next rendered page. `category` is a
/// Bootstrap alert suffix: "success", "danger", "info".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}
