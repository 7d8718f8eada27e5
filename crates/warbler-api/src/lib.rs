pub mod auth;
pub mod error;
pub mod home;
pub mod likes;
pub mod messages;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod templates;
pub mod users;
pub mod views;

pub use auth::{AppState, AppStateInner};
pub use error::AppError;
pub use routes::router;
