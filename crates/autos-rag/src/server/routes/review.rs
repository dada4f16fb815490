//! Bulk natureza review endpoint

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::Result;
use crate::pipeline::ReviewOutcome;
use crate::server::state::AppState;

/// POST /api/contexts/:id/review - classify every temp document of the
/// context semantically, deleting the noise
pub async fn review_context(
    State(state): State<AppState>,
    Path(context_id): Path<i64>,
) -> Result<Json<ReviewOutcome>> {
    let outcome = state.review().review_context(context_id).await?;
    Ok(Json(outcome))
}
