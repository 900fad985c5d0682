pub mod destination;
pub mod index;
pub mod optimize;
pub mod result;
pub mod stub;

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .merge(index::router())
        .merge(optimize::router())
        .merge(result::router())
        .merge(destination::router());

    if state.config.stub_optimizer {
        router = router.merge(stub::router::<AppState>());
    }

    router
        .nest_service("/static", ServeDir::new("static"))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
