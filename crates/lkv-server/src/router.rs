use axum::http::header::{HeaderValue, SERVER};
use axum::routing::{get, post};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Value of the `Server` header sent with every response.
pub const SERVER_STRING: &str = concat!("levelkv/", env!("CARGO_PKG_VERSION"));

/// Build the axum router with all LevelKV endpoints.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::resources))
        .route("/ping", get(handler::ping))
        .route("/stats", get(handler::stats))
        .route("/mapred", post(handler::mapred))
        .route("/buckets", get(handler::list_buckets))
        .route("/buckets/", get(handler::list_buckets))
        .route(
            "/buckets/:bucket/keys",
            get(handler::list_keys).post(handler::create_object),
        )
        .route(
            "/buckets/:bucket/keys/:key",
            get(handler::fetch_object)
                .put(handler::store_object)
                .post(handler::store_object)
                .delete(handler::delete_object),
        )
        .route("/buckets/:bucket/keys/:key/*phases", get(handler::walk))
        .route(
            "/buckets/:bucket/index/:field/:start",
            get(handler::index_exact),
        )
        .route(
            "/buckets/:bucket/index/:field/:start/:end",
            get(handler::index_range),
        )
        .fallback(handler::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            SERVER,
            HeaderValue::from_static(SERVER_STRING),
        ))
}
