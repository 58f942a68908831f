mod dto;
mod handlers;
pub mod policy;
pub mod repo;
pub mod service;
pub mod validate;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
