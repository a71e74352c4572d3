mod dto;
pub mod handlers;
pub mod memory;
pub mod repo;
pub mod repo_types;
mod validation;

pub use repo::ProductStore;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::product_routes()
}
