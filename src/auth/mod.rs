use crate::state::AppState;
use axum::Router;

mod dto;
pub mod extractors;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
