//! Periodic driver that advances every live game and persists summaries.
//!
//! The scheduler acquires each game's lock only for the duration of one
//! `tick()`; persistence and registry removal happen after the lock is
//! released, so commands are never blocked on storage I/O.

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use crate::state::{SharedState, game::TickOutcome};

/// Run the scheduler loop forever at the configured tick interval.
pub async fn run(state: SharedState) {
    let period = state.config().tick_interval;
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_ms = period.as_millis() as u64, "scheduler started");
    loop {
        ticker.tick().await;
        pass(&state).await;
    }
}

/// Perform one pass over all live games.
///
/// Exposed separately so tests can drive the scheduler deterministically.
pub async fn pass(state: &SharedState) {
    for (game_id, handle) in state.registry().live_games() {
        let terminated = {
            let mut game = handle.lock().await;
            match game.tick() {
                TickOutcome::NoChange => None,
                TickOutcome::Updated => {
                    debug!(game_id, phase = ?game.phase(), "game advanced");
                    None
                }
                TickOutcome::Dead => Some((game.summary(), game.known_users())),
            }
        };

        let Some((summary, users)) = terminated else {
            continue;
        };

        state.registry().remove(game_id);
        for user in users {
            state.registry().clear_current_game(user, game_id);
        }

        match state.summary_store().await {
            Some(store) => {
                if let Err(err) = store.save_summary(summary).await {
                    error!(game_id, error = %err, "failed to persist game summary");
                }
            }
            None => warn!(game_id, "summary store unavailable; summary dropped"),
        }
        info!(game_id, "game terminated and removed from registry");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::summary_store::{SummaryStore, memory::InMemorySummaryStore},
        state::{
            AppState,
            game::{Game, GameSettings},
        },
    };

    #[tokio::test]
    async fn abandoned_games_are_removed_and_summarized() {
        let state = AppState::new(AppConfig::default());
        let store = Arc::new(InMemorySummaryStore::new());
        state.install_summary_store(store.clone()).await;

        let mut game = Game::new(7, 1, GameSettings::default());
        game.dismiss(1);
        state.registry().insert(game);
        state.registry().set_current_game(1, 7);

        pass(&state).await;

        assert!(state.registry().is_empty());
        assert_eq!(state.registry().current_game_of(1), None);
        assert!(store.summary_exists(7).await.unwrap());
    }

    #[tokio::test]
    async fn lobby_games_survive_a_pass() {
        let state = AppState::new(AppConfig::default());
        state
            .install_summary_store(Arc::new(InMemorySummaryStore::new()))
            .await;

        state
            .registry()
            .insert(Game::new(7, 1, GameSettings::default()));
        pass(&state).await;

        assert_eq!(state.registry().len(), 1);
    }
}
