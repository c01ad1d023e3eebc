use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::summary::GameSummaryView, error::AppError, services::summary_service, state::SharedState,
};

/// Routes exposing finished-game summaries.
pub fn router() -> Router<SharedState> {
    Router::new().route("/summaries/{id}", get(get_summary))
}

/// Fetch the summary of a finished game.
#[utoipa::path(
    get,
    path = "/summaries/{id}",
    tag = "summary",
    params(("id" = u64, Path, description = "Identifier the game held while it was live")),
    responses(
        (status = 200, description = "Finished-game summary", body = GameSummaryView),
        (status = 404, description = "No summary recorded for this identifier")
    )
)]
pub async fn get_summary(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<GameSummaryView>, AppError> {
    let summary = summary_service::get_summary(&state, id).await?;
    Ok(Json(summary))
}
