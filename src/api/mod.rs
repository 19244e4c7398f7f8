pub mod handlers;
pub mod response;
pub mod state;

use axum::Router;
use axum::routing::get;

pub use state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/cotacao", get(handlers::get_cotacao))
        .route("/health", get(handlers::health))
        .with_state(state)
}
