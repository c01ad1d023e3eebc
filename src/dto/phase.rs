use serde::Serialize;
use utoipa::ToSchema;

use crate::state::game::GamePhase;

/// Publicly visible game phase exposed to polling clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisiblePhase {
    /// Players join, ready up, and the master configures settings.
    Lobby,
    /// The current round collects caption suggestions.
    Suggestion,
    /// The current round collects votes.
    Voting,
    /// The game terminated; only its summary remains.
    Dead,
}

impl From<GamePhase> for VisiblePhase {
    fn from(value: GamePhase) -> Self {
        match value {
            GamePhase::Lobby => VisiblePhase::Lobby,
            GamePhase::Suggestion => VisiblePhase::Suggestion,
            GamePhase::Voting => VisiblePhase::Voting,
            GamePhase::Dead => VisiblePhase::Dead,
        }
    }
}
