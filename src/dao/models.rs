use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Settings snapshot stored with a finished game.
///
/// The join password itself is never persisted, only whether one was set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettingsEntity {
    /// Display name of the game.
    pub name: String,
    /// Whether joining required a password.
    pub password_protected: bool,
    /// Configured lobby capacity.
    pub max_players: usize,
    /// Configured number of rounds.
    pub round_count: u32,
    /// Length of each suggestion window, in seconds.
    pub suggestion_secs: u64,
    /// Length of each voting window, in seconds.
    pub voting_secs: u64,
}

/// One caption submitted during a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionEntity {
    /// User who submitted the caption.
    pub author: u64,
    /// The caption text.
    pub text: String,
}

/// Votes received by one suggestion author.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteCountEntity {
    /// Suggestion author the votes were cast for.
    pub author: u64,
    /// Number of votes received.
    pub count: u32,
}

/// Immutable record of one completed round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundSummaryEntity {
    /// Round number, starting at 1.
    pub index: u32,
    /// All captions submitted before the suggestion deadline.
    pub suggestions: Vec<SuggestionEntity>,
    /// Votes received per author; every author appears, zero included.
    pub votes: Vec<VoteCountEntity>,
    /// Author with the most votes, ties broken by lowest user identifier.
    pub winner: Option<u64>,
}

/// Immutable record of a finished game, written exactly once at termination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSummaryEntity {
    /// Identifier the game held while it was live. Never reused.
    pub game_id: u64,
    /// Settings the game ran with.
    pub settings: GameSettingsEntity,
    /// Completed rounds, oldest first. May be empty for abandoned games.
    pub rounds: Vec<RoundSummaryEntity>,
    /// When the game terminated.
    pub finished_at: SystemTime,
}
