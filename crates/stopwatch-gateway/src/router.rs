//! Axum router wiring.
//!
//! Demo pages sit behind the timing middleware; operational endpoints are
//! added after the layer so they are never timed or rewritten.

use axum::{middleware, routing::get, Router};

use crate::{app_state::AppState, ops, services::demo, transport};

pub fn build_router(state: AppState) -> Router {
    let pages = Router::new()
        .route("/", get(demo::index))
        .route("/plain", get(demo::plain));

    instrument(pages, state.clone())
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}

/// Wrap every route of `router` in the timing middleware.
pub fn instrument<S>(router: Router<S>, state: AppState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, transport::track_render))
}
