use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Caption Clash backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::game::create_game,
        crate::routes::game::list_games,
        crate::routes::game::get_game,
        crate::routes::game::join_game,
        crate::routes::game::leave_game,
        crate::routes::game::start_game,
        crate::routes::game::update_settings,
        crate::routes::game::set_ready,
        crate::routes::game::put_suggestion,
        crate::routes::game::put_vote,
        crate::routes::game::master_command,
        crate::routes::summary::get_summary,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::game::CreateGameRequest,
            crate::dto::game::GameSettingsInput,
            crate::dto::game::JoinGameRequest,
            crate::dto::game::StartGameRequest,
            crate::dto::game::ReadyRequest,
            crate::dto::game::SuggestionRequest,
            crate::dto::game::VoteRequest,
            crate::dto::game::MasterCommandRequest,
            crate::dto::game::GameSnapshot,
            crate::dto::game::GameListItem,
            crate::dto::phase::VisiblePhase,
            crate::dto::summary::GameSummaryView,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "game", description = "Game lifecycle and gameplay commands"),
        (name = "summary", description = "Finished-game summaries"),
    )
)]
pub struct ApiDoc;
