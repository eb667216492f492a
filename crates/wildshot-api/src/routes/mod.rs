//! Route modules organized by bounded context.

pub mod expeditions;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/expeditions", expeditions::router())
        .with_state(state)
}
