use axum::{middleware, routing::post, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{batch, middleware::admission_middleware};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Layered on the method router: a 405 never touches the admission gate.
    let batch_route = post(batch::fetch_batch).route_layer(middleware::from_fn_with_state(
        state.clone(),
        admission_middleware,
    ));

    Router::new()
        .route("/", batch_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
