//! Command operations over the game registry.
//!
//! Every function resolves the game through the registry and performs its
//! work under that game's exclusive lock. No I/O happens while a game lock
//! is held; summary persistence is the scheduler's job.

use tracing::info;
use validator::Validate;

use crate::{
    config::SettingsLimits,
    dto::game::{
        CreateGameRequest, GameListItem, GameSettingsInput, GameSnapshot, JoinGameRequest,
        MasterCommandRequest, ReadyRequest, StartGameRequest, SuggestionRequest, VoteRequest,
    },
    error::{GameError, ServiceError},
    state::{
        GameId, SharedState, UserId,
        game::{Game, GameSettings},
    },
};

/// Create a new game with `master` enrolled and promoted.
pub async fn create_game(
    state: &SharedState,
    master: UserId,
    request: CreateGameRequest,
) -> Result<GameSnapshot, ServiceError> {
    validate_request(&request)?;
    let settings: GameSettings = request.settings.into();
    validate_settings(&settings, &state.config().limits)?;

    let store = state.require_summary_store().await?;
    let game_id = state.registry().allocate_id(store.as_ref()).await?;

    dismiss_from_current_game(state, master).await;

    let game = Game::new(game_id, master, settings);
    let snapshot = GameSnapshot::capture(&game);
    state.registry().insert(game);
    state.registry().set_current_game(master, game_id);

    info!(game_id, master, "created new game");
    Ok(snapshot)
}

/// Enroll `user` into an open lobby, leaving any previous game first.
pub async fn join_game(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    request: JoinGameRequest,
) -> Result<GameSnapshot, ServiceError> {
    let handle = state.registry().lookup(game_id)?;

    if let Some(previous) = state.registry().current_game_of(user) {
        if previous != game_id {
            dismiss_from_current_game(state, user).await;
        }
    }

    let mut game = handle.lock().await;
    game.enroll(user, request.password.as_deref())?;
    state.registry().set_current_game(user, game_id);
    Ok(GameSnapshot::capture(&game))
}

/// Remove `user` from a game. Leaving a game one is not part of is a no-op.
pub async fn leave_game(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
) -> Result<(), ServiceError> {
    let handle = state.registry().lookup(game_id)?;
    {
        let mut game = handle.lock().await;
        game.dismiss(user);
    }
    state.registry().clear_current_game(user, game_id);
    Ok(())
}

/// Close the lobby and start round 1. Master only.
pub async fn start_game(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    request: StartGameRequest,
) -> Result<(), ServiceError> {
    let handle = state.registry().lookup(game_id)?;
    let mut game = handle.lock().await;
    verify_master(&game, user)?;
    game.close_lobby(request.force)?;
    info!(game_id, "game started");
    Ok(())
}

/// Record a player's lobby readiness.
pub async fn set_ready(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    request: ReadyRequest,
) -> Result<(), ServiceError> {
    let handle = state.registry().lookup(game_id)?;
    let mut game = handle.lock().await;
    game.set_ready(user, request.ready)?;
    Ok(())
}

/// Replace a lobby's settings. Master only.
pub async fn adapt_settings(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    input: GameSettingsInput,
) -> Result<GameSnapshot, ServiceError> {
    validate_request(&input)?;
    let settings: GameSettings = input.into();
    validate_settings(&settings, &state.config().limits)?;

    let handle = state.registry().lookup(game_id)?;
    let mut game = handle.lock().await;
    verify_master(&game, user)?;
    game.adapt_settings(settings)?;
    Ok(GameSnapshot::capture(&game))
}

/// Upsert `user`'s caption for the current round.
pub async fn put_suggestion(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    request: SuggestionRequest,
) -> Result<(), ServiceError> {
    validate_request(&request)?;
    let handle = state.registry().lookup(game_id)?;
    let mut game = handle.lock().await;
    game.put_suggestion(user, request.text)?;
    Ok(())
}

/// Upsert `user`'s vote for the current round.
pub async fn put_vote(
    state: &SharedState,
    game_id: GameId,
    user: UserId,
    request: VoteRequest,
) -> Result<(), ServiceError> {
    let handle = state.registry().lookup(game_id)?;
    let mut game = handle.lock().await;
    game.put_vote(user, request.target)?;
    Ok(())
}

/// Execute a chat-style master command (`/start`, `/ban <user>`, `/forgive <user>`).
pub async fn run_master_command(
    state: &SharedState,
    game_id: GameId,
    master: UserId,
    request: MasterCommandRequest,
) -> Result<(), ServiceError> {
    validate_request(&request)?;
    let command = parse_master_command(&request.command)?;
    let handle = state.registry().lookup(game_id)?;

    match command {
        MasterCommand::Start => {
            let mut game = handle.lock().await;
            verify_master(&game, master)?;
            game.close_lobby(true)?;
            info!(game_id, "game force-started by master command");
        }
        MasterCommand::Ban(target) => {
            let was_enrolled = {
                let mut game = handle.lock().await;
                verify_master(&game, master)?;
                game.ban(target)
            };
            if was_enrolled {
                state.registry().clear_current_game(target, game_id);
            }
            info!(game_id, target, "player banned");
        }
        MasterCommand::Forgive(target) => {
            let mut game = handle.lock().await;
            verify_master(&game, master)?;
            game.forgive(target);
            info!(game_id, target, "player forgiven");
        }
    }
    Ok(())
}

/// Snapshot one live game for a polling client.
pub async fn get_game(state: &SharedState, game_id: GameId) -> Result<GameSnapshot, ServiceError> {
    let handle = state.registry().lookup(game_id)?;
    let game = handle.lock().await;
    Ok(GameSnapshot::capture(&game))
}

/// List all live games for the lobby browser.
pub async fn list_games(state: &SharedState) -> Vec<GameListItem> {
    let mut items = Vec::new();
    for (_, handle) in state.registry().live_games() {
        let game = handle.lock().await;
        items.push(GameListItem::capture(&game));
    }
    items.sort_by_key(|item| item.game_id);
    items
}

/// Recognized master command verbs and their targets.
#[derive(Debug, PartialEq, Eq)]
enum MasterCommand {
    Start,
    Ban(UserId),
    Forgive(UserId),
}

fn parse_master_command(line: &str) -> Result<MasterCommand, GameError> {
    let mut parts = line.split_whitespace();
    let verb = parts.next().unwrap_or_default();
    match verb {
        "/start" => Ok(MasterCommand::Start),
        "/ban" | "/forgive" => {
            let target: UserId = parts
                .next()
                .and_then(|raw| raw.parse().ok())
                .ok_or(GameError::MissingTarget)?;
            if verb == "/ban" {
                Ok(MasterCommand::Ban(target))
            } else {
                Ok(MasterCommand::Forgive(target))
            }
        }
        other => Err(GameError::UnknownCommand(other.to_string())),
    }
}

/// Dismiss `user` from whatever game their record currently points at.
///
/// A user may be enrolled in at most one game, so joining or creating a new
/// one first makes the previous game let go of them. No-op without a record.
async fn dismiss_from_current_game(state: &SharedState, user: UserId) {
    let Some(previous_id) = state.registry().current_game_of(user) else {
        return;
    };
    if let Ok(handle) = state.registry().lookup(previous_id) {
        let mut game = handle.lock().await;
        game.dismiss(user);
    }
    state.registry().clear_current_game(user, previous_id);
}

fn verify_master(game: &Game, user: UserId) -> Result<(), GameError> {
    if game.master() != Some(user) {
        return Err(GameError::Forbidden);
    }
    Ok(())
}

fn validate_request<T: Validate>(request: &T) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(format!("validation failed: {err}")))
}

fn validate_settings(
    settings: &GameSettings,
    limits: &SettingsLimits,
) -> Result<(), ServiceError> {
    if settings.max_players < 2 || settings.max_players > limits.max_players {
        return Err(ServiceError::InvalidInput(format!(
            "max_players must lie in 2..={}",
            limits.max_players
        )));
    }
    if settings.round_count == 0 || settings.round_count > limits.max_rounds {
        return Err(ServiceError::InvalidInput(format!(
            "round_count must lie in 1..={}",
            limits.max_rounds
        )));
    }
    for (label, secs) in [
        ("suggestion_secs", settings.suggestion_secs),
        ("voting_secs", settings.voting_secs),
    ] {
        if secs < limits.min_window_secs || secs > limits.max_window_secs {
            return Err(ServiceError::InvalidInput(format!(
                "{label} must lie in {}..={}",
                limits.min_window_secs, limits.max_window_secs
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::summary_store::memory::InMemorySummaryStore, state::AppState,
    };

    fn settings_input(name: &str) -> GameSettingsInput {
        serde_json::from_value(serde_json::json!({ "name": name })).unwrap()
    }

    async fn state_with_store() -> SharedState {
        let state = AppState::new(AppConfig::default());
        state
            .install_summary_store(Arc::new(InMemorySummaryStore::new()))
            .await;
        state
    }

    #[test]
    fn master_commands_parse() {
        assert!(matches!(
            parse_master_command("/start"),
            Ok(MasterCommand::Start)
        ));
        assert!(matches!(
            parse_master_command("/ban 42"),
            Ok(MasterCommand::Ban(42))
        ));
        assert!(matches!(
            parse_master_command("/forgive 42"),
            Ok(MasterCommand::Forgive(42))
        ));
        assert_eq!(
            parse_master_command("/ban"),
            Err(GameError::MissingTarget)
        );
        assert_eq!(
            parse_master_command("/ban nobody"),
            Err(GameError::MissingTarget)
        );
        assert_eq!(
            parse_master_command("/dance"),
            Err(GameError::UnknownCommand("/dance".into()))
        );
    }

    #[tokio::test]
    async fn create_game_enrolls_and_indexes_the_master() {
        let state = state_with_store().await;
        let snapshot = create_game(
            &state,
            1,
            CreateGameRequest {
                settings: settings_input("friday"),
            },
        )
        .await
        .unwrap();

        assert_eq!(snapshot.master, Some(1));
        assert_eq!(
            state.registry().current_game_of(1),
            Some(snapshot.game_id)
        );
    }

    #[tokio::test]
    async fn joining_a_second_game_leaves_the_first() {
        let state = state_with_store().await;
        let first = create_game(
            &state,
            1,
            CreateGameRequest {
                settings: settings_input("first"),
            },
        )
        .await
        .unwrap();
        let second = create_game(
            &state,
            2,
            CreateGameRequest {
                settings: settings_input("second"),
            },
        )
        .await
        .unwrap();

        join_game(&state, second.game_id, 1, JoinGameRequest { password: None })
            .await
            .unwrap();

        assert_eq!(state.registry().current_game_of(1), Some(second.game_id));
        let old = get_game(&state, first.game_id).await.unwrap();
        assert!(old.players.iter().all(|player| player.user_id != 1));
    }

    #[tokio::test]
    async fn only_the_master_may_start() {
        let state = state_with_store().await;
        let game = create_game(
            &state,
            1,
            CreateGameRequest {
                settings: settings_input("friday"),
            },
        )
        .await
        .unwrap();
        join_game(&state, game.game_id, 2, JoinGameRequest { password: None })
            .await
            .unwrap();

        let err = start_game(&state, game.game_id, 2, StartGameRequest { force: true })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Game(GameError::Forbidden)));
    }

    #[tokio::test]
    async fn settings_outside_configured_bounds_are_rejected() {
        let state = state_with_store().await;
        let mut input = settings_input("friday");
        input.round_count = 999;
        let err = create_game(&state, 1, CreateGameRequest { settings: input })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn banned_player_is_removed_from_the_user_index() {
        let state = state_with_store().await;
        let game = create_game(
            &state,
            1,
            CreateGameRequest {
                settings: settings_input("friday"),
            },
        )
        .await
        .unwrap();
        join_game(&state, game.game_id, 2, JoinGameRequest { password: None })
            .await
            .unwrap();

        run_master_command(
            &state,
            game.game_id,
            1,
            MasterCommandRequest {
                command: "/ban 2".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(state.registry().current_game_of(2), None);
        let err = join_game(&state, game.game_id, 2, JoinGameRequest { password: None })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Game(GameError::Banned)));
    }
}
