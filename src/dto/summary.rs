use serde::Serialize;
use utoipa::ToSchema;

use crate::dao::models::{
    GameSettingsEntity, GameSummaryEntity, RoundSummaryEntity, SuggestionEntity, VoteCountEntity,
};
use crate::dto::format_system_time;

/// Settings a finished game ran with.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct GameSettingsView {
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

/// One caption an author submitted during a round.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct SuggestionView {
    /// User who submitted the caption.
    pub author: u64,
    /// The caption text.
    pub text: String,
}

/// Votes received by one suggestion author.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct VoteCountView {
    /// Suggestion author the votes were cast for.
    pub author: u64,
    /// Number of votes received.
    pub count: u32,
}

/// One completed round of a game.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RoundSummaryView {
    /// Round number, starting at 1.
    pub index: u32,
    /// All captions submitted before the suggestion deadline.
    pub suggestions: Vec<SuggestionView>,
    /// Votes received per author, zero included.
    pub votes: Vec<VoteCountView>,
    /// Author with the most votes, ties broken by lowest user identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<u64>,
}

/// Finished-game summary returned to reviewers.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct GameSummaryView {
    /// Identifier the game held while it was live.
    pub game_id: u64,
    /// Settings the game ran with.
    pub settings: GameSettingsView,
    /// Completed rounds, oldest first.
    pub rounds: Vec<RoundSummaryView>,
    /// RFC 3339 timestamp of the game's termination.
    pub finished_at: String,
}

impl From<GameSettingsEntity> for GameSettingsView {
    fn from(value: GameSettingsEntity) -> Self {
        Self {
            name: value.name,
            password_protected: value.password_protected,
            max_players: value.max_players,
            round_count: value.round_count,
            suggestion_secs: value.suggestion_secs,
            voting_secs: value.voting_secs,
        }
    }
}

impl From<SuggestionEntity> for SuggestionView {
    fn from(value: SuggestionEntity) -> Self {
        Self {
            author: value.author,
            text: value.text,
        }
    }
}

impl From<VoteCountEntity> for VoteCountView {
    fn from(value: VoteCountEntity) -> Self {
        Self {
            author: value.author,
            count: value.count,
        }
    }
}

impl From<RoundSummaryEntity> for RoundSummaryView {
    fn from(value: RoundSummaryEntity) -> Self {
        Self {
            index: value.index,
            suggestions: value.suggestions.into_iter().map(Into::into).collect(),
            votes: value.votes.into_iter().map(Into::into).collect(),
            winner: value.winner,
        }
    }
}

impl From<GameSummaryEntity> for GameSummaryView {
    fn from(value: GameSummaryEntity) -> Self {
        Self {
            game_id: value.game_id,
            settings: value.settings.into(),
            rounds: value.rounds.into_iter().map(Into::into).collect(),
            finished_at: format_system_time(value.finished_at),
        }
    }
}
