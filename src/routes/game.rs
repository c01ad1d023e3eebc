use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
};

use crate::{
    dto::game::{
        CreateGameRequest, GameListItem, GameSettingsInput, GameSnapshot, JoinGameRequest,
        MasterCommandRequest, ReadyRequest, StartGameRequest, SuggestionRequest, VoteRequest,
    },
    error::AppError,
    services::game_service,
    state::{SharedState, UserId},
};

/// Header carrying the acting user's identifier.
///
/// Token verification happens upstream; by the time a request reaches this
/// service the header is trusted.
const USER_ID_HEADER: &str = "x-user-id";

/// Routes handling game lifecycle and gameplay commands.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", post(create_game).get(list_games))
        .route("/games/{id}", get(get_game))
        .route("/games/{id}/join", post(join_game))
        .route("/games/{id}/leave", post(leave_game))
        .route("/games/{id}/start", put(start_game))
        .route("/games/{id}/settings", put(update_settings))
        .route("/games/{id}/ready", put(set_ready))
        .route("/games/{id}/suggestion", put(put_suggestion))
        .route("/games/{id}/vote", put(put_vote))
        .route("/games/{id}/command", post(master_command))
}

fn acting_user(headers: &HeaderMap) -> Result<UserId, AppError> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.parse().ok())
        .ok_or_else(|| {
            AppError::BadRequest(format!("missing or invalid `{USER_ID_HEADER}` header"))
        })
}

/// Create a fresh game with the caller as game master.
#[utoipa::path(
    post,
    path = "/games",
    tag = "game",
    params(("x-user-id" = u64, Header, description = "Acting user identifier")),
    request_body = CreateGameRequest,
    responses((status = 201, description = "Game created", body = GameSnapshot))
)]
pub async fn create_game(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameSnapshot>), AppError> {
    let user = acting_user(&headers)?;
    let snapshot = game_service::create_game(&state, user, payload).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// List all live games.
#[utoipa::path(
    get,
    path = "/games",
    tag = "game",
    responses((status = 200, description = "Live games", body = [GameListItem]))
)]
pub async fn list_games(State(state): State<SharedState>) -> Json<Vec<GameListItem>> {
    Json(game_service::list_games(&state).await)
}

/// Snapshot one live game for polling clients.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "game",
    params(("id" = u64, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game snapshot", body = GameSnapshot),
        (status = 404, description = "No live game with this identifier")
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
) -> Result<Json<GameSnapshot>, AppError> {
    let snapshot = game_service::get_game(&state, id).await?;
    Ok(Json(snapshot))
}

/// Join an open lobby, leaving any previous game.
#[utoipa::path(
    post,
    path = "/games/{id}/join",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = JoinGameRequest,
    responses(
        (status = 200, description = "Joined", body = GameSnapshot),
        (status = 401, description = "Wrong password"),
        (status = 410, description = "Lobby already closed"),
        (status = 422, description = "Game is full"),
        (status = 423, description = "User is banned from this game")
    )
)]
pub async fn join_game(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<JoinGameRequest>,
) -> Result<Json<GameSnapshot>, AppError> {
    let user = acting_user(&headers)?;
    let snapshot = game_service::join_game(&state, id, user, payload).await?;
    Ok(Json(snapshot))
}

/// Leave a game.
#[utoipa::path(
    post,
    path = "/games/{id}/leave",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    responses((status = 204, description = "Left the game"))
)]
pub async fn leave_game(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::leave_game(&state, id, user).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Close the lobby and start the game. Master only.
#[utoipa::path(
    put,
    path = "/games/{id}/start",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = StartGameRequest,
    responses(
        (status = 204, description = "Game started"),
        (status = 403, description = "Caller is not the game master"),
        (status = 409, description = "Not every player is ready"),
        (status = 410, description = "Game already running")
    )
)]
pub async fn start_game(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<StartGameRequest>,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::start_game(&state, id, user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the lobby settings. Master only.
#[utoipa::path(
    put,
    path = "/games/{id}/settings",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = GameSettingsInput,
    responses(
        (status = 200, description = "Settings updated", body = GameSnapshot),
        (status = 403, description = "Caller is not the game master"),
        (status = 410, description = "Game already running")
    )
)]
pub async fn update_settings(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<GameSettingsInput>,
) -> Result<Json<GameSnapshot>, AppError> {
    let user = acting_user(&headers)?;
    let snapshot = game_service::adapt_settings(&state, id, user, payload).await?;
    Ok(Json(snapshot))
}

/// Toggle the caller's lobby readiness.
#[utoipa::path(
    put,
    path = "/games/{id}/ready",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = ReadyRequest,
    responses((status = 204, description = "Readiness recorded"))
)]
pub async fn set_ready(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<ReadyRequest>,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::set_ready(&state, id, user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit or overwrite the caller's caption for the current round.
#[utoipa::path(
    put,
    path = "/games/{id}/suggestion",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = SuggestionRequest,
    responses(
        (status = 204, description = "Suggestion recorded"),
        (status = 401, description = "Caller is not enrolled"),
        (status = 422, description = "The current phase does not allow suggestions")
    )
)]
pub async fn put_suggestion(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<SuggestionRequest>,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::put_suggestion(&state, id, user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Submit or overwrite the caller's vote for the current round.
#[utoipa::path(
    put,
    path = "/games/{id}/vote",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = VoteRequest,
    responses(
        (status = 204, description = "Vote recorded"),
        (status = 401, description = "Caller is not enrolled"),
        (status = 422, description = "Invalid target or phase")
    )
)]
pub async fn put_vote(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<VoteRequest>,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::put_vote(&state, id, user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run a chat-style master command (`/start`, `/ban <user>`, `/forgive <user>`).
#[utoipa::path(
    post,
    path = "/games/{id}/command",
    tag = "game",
    params(
        ("id" = u64, Path, description = "Identifier of the game"),
        ("x-user-id" = u64, Header, description = "Acting user identifier")
    ),
    request_body = MasterCommandRequest,
    responses(
        (status = 204, description = "Command executed"),
        (status = 400, description = "Unknown command or missing target"),
        (status = 403, description = "Caller is not the game master")
    )
)]
pub async fn master_command(
    State(state): State<SharedState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<MasterCommandRequest>,
) -> Result<StatusCode, AppError> {
    let user = acting_user(&headers)?;
    game_service::run_master_command(&state, id, user, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}
