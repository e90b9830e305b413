pub mod assets;
pub mod auth;
pub mod complaints;
pub mod pages;

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(pages::router())
        .merge(auth::router())
        .merge(complaints::router())
        .route("/assets/{*path}", get(assets::serve))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
