use axum::Router;

use crate::state::SharedState;

pub mod analytics;
pub mod docs;
pub mod health;
pub mod leaderboard;
pub mod participants;
pub mod responses;
pub mod session;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(responses::router())
        .merge(participants::router())
        .merge(leaderboard::router())
        .merge(analytics::router())
        .merge(docs::router());

    api_router.with_state(state)
}
