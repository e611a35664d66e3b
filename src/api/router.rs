//! API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`. Every response carries
//! `Cache-Control: no-store`; health data must not sit in shared caches.

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::routing::{delete, get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::api::endpoints;
use crate::core_state::CoreState;

/// Build the API router over a shared `CoreState`.
///
/// NOTE: Path params use `:param` syntax (matchit 0.7 / axum 0.7).
pub fn api_router(core: Arc<CoreState>) -> Router {
    let routes = Router::new()
        .route("/health", get(endpoints::health::check))
        .route(
            "/medications",
            get(endpoints::medications::list).post(endpoints::medications::add),
        )
        .route("/medications/:id", delete(endpoints::medications::remove))
        .route("/time-options", get(endpoints::medications::time_options))
        .route("/schedule/:date", get(endpoints::schedule::for_date))
        .route("/schedule/:date/summary", get(endpoints::schedule::summary))
        .route("/doses", post(endpoints::doses::record))
        .route("/adherence", get(endpoints::adherence::range))
        .route("/history", get(endpoints::adherence::history))
        .route("/history/adherence", get(endpoints::adherence::logged))
        .with_state(core);

    Router::new().nest("/api", routes).layer(
        ServiceBuilder::new()
            .layer(SetResponseHeaderLayer::overriding(
                header::CACHE_CONTROL,
                HeaderValue::from_static("no-store"),
            ))
            .layer(CorsLayer::permissive()),
    )
}
