//! Contest handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Contest routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/{id}/leaderboard", get(handler::get_leaderboard))
}
