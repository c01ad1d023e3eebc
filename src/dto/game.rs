use std::time::Instant;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        format_system_time,
        phase::VisiblePhase,
        summary::{RoundSummaryView, SuggestionView},
        validation::validate_game_name,
    },
    state::game::{Game, GamePhase, GameSettings},
};

/// Player-configurable settings supplied at creation or via the settings update.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct GameSettingsInput {
    /// Display name of the game.
    #[validate(custom(function = validate_game_name))]
    pub name: String,
    /// Optional join password. Empty or absent means the game is open.
    #[serde(default)]
    #[validate(length(max = 64))]
    pub password: Option<String>,
    /// Lobby capacity.
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Number of rounds to play.
    #[serde(default = "default_round_count")]
    pub round_count: u32,
    /// Length of each suggestion window, in seconds.
    #[serde(default = "default_suggestion_secs")]
    pub suggestion_secs: u64,
    /// Length of each voting window, in seconds.
    #[serde(default = "default_voting_secs")]
    pub voting_secs: u64,
}

fn default_max_players() -> usize {
    8
}

fn default_round_count() -> u32 {
    3
}

fn default_suggestion_secs() -> u64 {
    60
}

fn default_voting_secs() -> u64 {
    30
}

impl From<GameSettingsInput> for GameSettings {
    fn from(value: GameSettingsInput) -> Self {
        Self {
            name: value.name.trim().to_string(),
            password: value.password.filter(|password| !password.is_empty()),
            max_players: value.max_players,
            round_count: value.round_count,
            suggestion_secs: value.suggestion_secs,
            voting_secs: value.voting_secs,
        }
    }
}

/// Payload used to bootstrap a brand-new game instance.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    /// Initial settings chosen by the creating master.
    #[validate(nested)]
    pub settings: GameSettingsInput,
}

/// Payload for joining a running lobby.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JoinGameRequest {
    /// Join password, required when the game demands one.
    #[serde(default)]
    pub password: Option<String>,
}

/// Payload for the master's start request.
#[derive(Debug, Deserialize, ToSchema)]
pub struct StartGameRequest {
    /// Start even when not every player is ready.
    #[serde(default)]
    pub force: bool,
}

/// Payload toggling a player's lobby readiness.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReadyRequest {
    /// Desired readiness flag.
    pub ready: bool,
}

/// Payload carrying a caption suggestion for the current round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SuggestionRequest {
    /// The caption text.
    #[validate(length(min = 1, max = 200))]
    pub text: String,
}

/// Payload carrying a vote for the current round.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// Suggestion author the vote is cast for.
    pub target: u64,
}

/// Payload carrying a chat-style master command such as `/ban 42`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct MasterCommandRequest {
    /// Command line starting with the command verb.
    #[validate(length(min = 1, max = 120))]
    pub command: String,
}

/// Roster entry exposed to polling clients.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PlayerSnapshot {
    /// User identifier of the player.
    pub user_id: u64,
    /// Whether this player is the game master.
    pub promoted: bool,
    /// Lobby readiness flag.
    pub ready: bool,
}

/// State of the round currently being played.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct RoundSnapshot {
    /// Round number, starting at 1.
    pub number: u32,
    /// Milliseconds until the current phase's deadline.
    pub deadline_in_ms: u64,
    /// Number of captions submitted so far.
    pub suggestion_count: usize,
    /// Submitted captions; only revealed while voting is open.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<SuggestionView>>,
}

/// Poller snapshot of one live game.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct GameSnapshot {
    /// Identifier of the game.
    pub game_id: u64,
    /// Display name of the game.
    pub name: String,
    /// Current phase.
    pub phase: VisiblePhase,
    /// Whether joining requires a password.
    pub password_protected: bool,
    /// The game master, absent only when the roster emptied out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub master: Option<u64>,
    /// Configured number of rounds.
    pub round_count: u32,
    /// Configured lobby capacity.
    pub max_players: usize,
    /// Currently enrolled players.
    pub players: Vec<PlayerSnapshot>,
    /// The round currently being played, absent in the lobby.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundSnapshot>,
    /// Results of the rounds whose voting already closed.
    pub results: Vec<RoundSummaryView>,
    /// Identifier of the chat channel created alongside this game.
    pub chat_channel: Uuid,
    /// RFC 3339 timestamp of the game's creation.
    pub created_at: String,
}

/// Abbreviated game entry for the lobby browser.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct GameListItem {
    /// Identifier of the game.
    pub game_id: u64,
    /// Display name of the game.
    pub name: String,
    /// Current phase.
    pub phase: VisiblePhase,
    /// Number of enrolled players.
    pub players: usize,
    /// Configured lobby capacity.
    pub max_players: usize,
    /// Whether joining requires a password.
    pub password_protected: bool,
}

impl GameSnapshot {
    /// Capture a poller-facing snapshot of `game` at the current instant.
    pub fn capture(game: &Game) -> Self {
        let mut players: Vec<PlayerSnapshot> = game
            .roster()
            .iter()
            .filter(|(_, state)| state.enrolled)
            .map(|(user_id, state)| PlayerSnapshot {
                user_id: *user_id,
                promoted: state.promoted,
                ready: state.ready,
            })
            .collect();
        players.sort_by_key(|player| player.user_id);

        let round = game.current_round().map(|round| {
            let deadline = match game.phase() {
                GamePhase::Voting => round.voting_deadline.unwrap_or(round.suggestion_deadline),
                _ => round.suggestion_deadline,
            };
            RoundSnapshot {
                number: game.current_round_number().unwrap_or(0),
                deadline_in_ms: deadline
                    .saturating_duration_since(Instant::now())
                    .as_millis() as u64,
                suggestion_count: round.suggestions.len(),
                suggestions: (game.phase() == GamePhase::Voting).then(|| {
                    round
                        .suggestions
                        .iter()
                        .map(|(author, text)| SuggestionView {
                            author: *author,
                            text: text.clone(),
                        })
                        .collect()
                }),
            }
        });

        Self {
            game_id: game.game_id(),
            name: game.settings().name.clone(),
            phase: game.phase().into(),
            password_protected: game.settings().password.is_some(),
            master: game.master(),
            round_count: game.settings().round_count,
            max_players: game.settings().max_players,
            players,
            round,
            results: game.round_summaries().into_iter().map(Into::into).collect(),
            chat_channel: game.chat().id(),
            created_at: format_system_time(game.created_at()),
        }
    }
}

impl GameListItem {
    /// Capture an abbreviated entry of `game` for the lobby browser.
    pub fn capture(game: &Game) -> Self {
        Self {
            game_id: game.game_id(),
            name: game.settings().name.clone(),
            phase: game.phase().into(),
            players: game.enrolled_count(),
            max_players: game.settings().max_players,
            password_protected: game.settings().password.is_some(),
        }
    }
}
