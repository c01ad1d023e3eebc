use crate::{
    dto::summary::GameSummaryView,
    error::{GameError, ServiceError},
    state::{GameId, SharedState},
};

/// Fetch a finished game's summary from the store.
///
/// Summaries are public for now; restricting them to former participants is
/// an account-system concern.
pub async fn get_summary(
    state: &SharedState,
    game_id: GameId,
) -> Result<GameSummaryView, ServiceError> {
    let store = state.require_summary_store().await?;
    let summary = store
        .find_summary(game_id)
        .await?
        .ok_or(GameError::NotFound)?;
    Ok(summary.into())
}
