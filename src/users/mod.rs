mod dto;
mod handlers;
pub mod repo;
pub mod stats;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
