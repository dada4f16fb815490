//! HTTP routes

pub mod documents;
pub mod extract;
pub mod ingest;
pub mod query;
pub mod review;
pub mod search;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::server::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/api/extract", post(extract::extract_case_file))
        .route("/api/ingest", post(ingest::ingest_batch))
        .route("/api/contexts/:id/review", post(review::review_context))
        .route("/api/contexts/:id/documents", get(documents::list_documents))
        .route("/api/contexts/:id/usage", get(documents::token_usage))
        .route("/api/documents/:id", get(documents::get_document))
        .route("/api/search", post(search::search))
        .route("/api/query", post(query::query));

    if state.config().server.enable_cors {
        router = router.layer(CorsLayer::permissive());
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
