//! End-to-end flows through the service layer and the scheduler, using
//! one-second phase windows so real deadlines elapse quickly.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use caption_clash_back::{
    config::{AppConfig, SettingsLimits},
    dao::summary_store::memory::InMemorySummaryStore,
    dto::{
        game::{
            CreateGameRequest, GameSettingsInput, JoinGameRequest, StartGameRequest, VoteRequest,
        },
        phase::VisiblePhase,
    },
    error::{GameError, ServiceError},
    services::{game_service, scheduler, summary_service},
    state::{AppState, SharedState},
};

const MASTER: u64 = 1;
const PLAYER: u64 = 2;
const OTHER: u64 = 3;

fn test_config() -> AppConfig {
    AppConfig {
        tick_interval: Duration::from_millis(50),
        limits: SettingsLimits {
            min_window_secs: 1,
            ..SettingsLimits::default()
        },
    }
}

fn settings(max_players: usize, round_count: u32) -> GameSettingsInput {
    GameSettingsInput {
        name: "integration".into(),
        password: None,
        max_players,
        round_count,
        suggestion_secs: 1,
        voting_secs: 1,
    }
}

async fn state_with_store() -> (SharedState, Arc<InMemorySummaryStore>) {
    let state = AppState::new(test_config());
    let store = Arc::new(InMemorySummaryStore::new());
    state.install_summary_store(store.clone()).await;
    (state, store)
}

async fn wait_past_deadline() {
    sleep(Duration::from_millis(1_100)).await;
}

#[tokio::test]
async fn single_round_game_runs_to_completion_and_is_summarized() {
    let (state, store) = state_with_store().await;

    let game = game_service::create_game(
        &state,
        MASTER,
        CreateGameRequest {
            settings: settings(8, 1),
        },
    )
    .await
    .unwrap();
    let game_id = game.game_id;

    game_service::join_game(&state, game_id, PLAYER, JoinGameRequest { password: None })
        .await
        .unwrap();
    game_service::start_game(&state, game_id, MASTER, StartGameRequest { force: true })
        .await
        .unwrap();

    game_service::put_suggestion(
        &state,
        game_id,
        PLAYER,
        serde_json::from_value(serde_json::json!({ "text": "cat" })).unwrap(),
    )
    .await
    .unwrap();

    // Before the deadline the scheduler must not advance the phase.
    scheduler::pass(&state).await;
    let snapshot = game_service::get_game(&state, game_id).await.unwrap();
    assert_eq!(snapshot.phase, VisiblePhase::Suggestion);

    wait_past_deadline().await;
    scheduler::pass(&state).await;
    let snapshot = game_service::get_game(&state, game_id).await.unwrap();
    assert_eq!(snapshot.phase, VisiblePhase::Voting);
    let round = snapshot.round.unwrap();
    assert_eq!(round.suggestion_count, 1);

    let err = game_service::put_vote(&state, game_id, PLAYER, VoteRequest { target: PLAYER })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Game(GameError::InvalidTarget)));

    wait_past_deadline().await;
    scheduler::pass(&state).await;

    // The dead game is gone from the registry, its summary is in the store.
    let err = game_service::get_game(&state, game_id).await.unwrap_err();
    assert!(matches!(err, ServiceError::Game(GameError::NotFound)));
    assert!(state.registry().is_empty());

    let summary = summary_service::get_summary(&state, game_id).await.unwrap();
    assert_eq!(summary.rounds.len(), 1);
    let round = &summary.rounds[0];
    assert_eq!(round.suggestions.len(), 1);
    assert_eq!(round.suggestions[0].text, "cat");
    let votes_cast: u32 = round.votes.iter().map(|entry| entry.count).sum();
    assert_eq!(votes_cast, 0);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn capacity_limit_rejects_the_overflow_join() {
    let (state, _store) = state_with_store().await;

    let game = game_service::create_game(
        &state,
        MASTER,
        CreateGameRequest {
            settings: settings(2, 1),
        },
    )
    .await
    .unwrap();

    game_service::join_game(&state, game.game_id, PLAYER, JoinGameRequest { password: None })
        .await
        .unwrap();

    let err = game_service::join_game(
        &state,
        game.game_id,
        OTHER,
        JoinGameRequest { password: None },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Game(GameError::Full)));
}

#[tokio::test]
async fn leaving_master_hands_over_mastership() {
    let (state, _store) = state_with_store().await;

    let game = game_service::create_game(
        &state,
        MASTER,
        CreateGameRequest {
            settings: settings(8, 1),
        },
    )
    .await
    .unwrap();

    game_service::join_game(&state, game.game_id, PLAYER, JoinGameRequest { password: None })
        .await
        .unwrap();
    game_service::leave_game(&state, game.game_id, MASTER)
        .await
        .unwrap();

    let snapshot = game_service::get_game(&state, game.game_id).await.unwrap();
    assert_eq!(snapshot.master, Some(PLAYER));
    let promoted = snapshot
        .players
        .iter()
        .filter(|player| player.promoted)
        .count();
    assert_eq!(promoted, 1);
}

#[tokio::test]
async fn abandoned_lobby_is_reaped_with_an_empty_summary() {
    let (state, store) = state_with_store().await;

    let game = game_service::create_game(
        &state,
        MASTER,
        CreateGameRequest {
            settings: settings(8, 1),
        },
    )
    .await
    .unwrap();
    game_service::leave_game(&state, game.game_id, MASTER)
        .await
        .unwrap();

    scheduler::pass(&state).await;

    assert!(state.registry().is_empty());
    let summary = summary_service::get_summary(&state, game.game_id)
        .await
        .unwrap();
    assert!(summary.rounds.is_empty());
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn dead_game_identifier_is_never_reallocated() {
    let (state, store) = state_with_store().await;

    let game = game_service::create_game(
        &state,
        MASTER,
        CreateGameRequest {
            settings: settings(8, 1),
        },
    )
    .await
    .unwrap();
    game_service::leave_game(&state, game.game_id, MASTER)
        .await
        .unwrap();
    scheduler::pass(&state).await;

    // The summary blocks the identifier from being drawn again.
    for _ in 0..8 {
        let allocated = state
            .registry()
            .allocate_id(store.as_ref())
            .await
            .unwrap();
        assert_ne!(allocated, game.game_id);
    }
}
