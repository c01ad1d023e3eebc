use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::dao::storage::StorageError;

/// Typed failures produced by game command operations.
///
/// Every command surfaces one of these kinds synchronously to its caller;
/// nothing is retried inside the core. `tick()` never produces an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No running game with the given identifier.
    #[error("game not found")]
    NotFound,
    /// The game demands a password and the supplied one does not match.
    #[error("wrong password")]
    WrongCredential,
    /// A banned user attempted to join.
    #[error("you are banned from this game")]
    Banned,
    /// The lobby already holds the configured maximum of players.
    #[error("game is full")]
    Full,
    /// A lobby-only operation was attempted after the lobby closed.
    #[error("game is already running")]
    AlreadyRunning,
    /// A master-only operation was attempted by somebody else.
    #[error("you are not the game master of this game")]
    Forbidden,
    /// A gameplay operation was attempted by a non-member.
    #[error("you are not enrolled for this game")]
    NotEnrolled,
    /// A suggestion or vote arrived outside its phase window.
    #[error("the game's current phase does not allow this")]
    WrongPhase,
    /// A vote targeted the voter themselves or a user without a suggestion.
    #[error("invalid vote target")]
    InvalidTarget,
    /// The lobby cannot close because an enrolled player is not ready.
    #[error("not every player is ready")]
    NotReady,
    /// A master command verb that the game does not recognize.
    #[error("unknown master command `{0}`")]
    UnknownCommand(String),
    /// A master command that needs a target was given none.
    #[error("master command requires a target user")]
    MissingTarget,
}

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A game command was rejected with a typed failure kind.
    #[error(transparent)]
    Game(#[from] GameError),
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Application is running in degraded mode without storage.
    #[error("storage unavailable (degraded mode)")]
    Degraded,
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Unauthorized access attempt.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// Operation reserved to the game master.
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The game has moved on and the lobby no longer exists.
    #[error("gone: {0}")]
    Gone(String),
    /// The acting user is locked out of the resource.
    #[error("locked: {0}")]
    Locked(String),
    /// The request was understood but the game state rejects it.
    #[error("unprocessable: {0}")]
    Unprocessable(String),
    /// Service unavailable or degraded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<GameError> for AppError {
    fn from(err: GameError) -> Self {
        let message = err.to_string();
        match err {
            GameError::NotFound => AppError::NotFound(message),
            GameError::WrongCredential | GameError::NotEnrolled => AppError::Unauthorized(message),
            GameError::Banned => AppError::Locked(message),
            GameError::Full | GameError::WrongPhase | GameError::InvalidTarget => {
                AppError::Unprocessable(message)
            }
            GameError::AlreadyRunning => AppError::Gone(message),
            GameError::Forbidden => AppError::Forbidden(message),
            GameError::NotReady => AppError::Conflict(message),
            GameError::UnknownCommand(_) | GameError::MissingTarget => {
                AppError::BadRequest(message)
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Game(game_err) => game_err.into(),
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::Degraded => AppError::ServiceUnavailable("degraded mode".into()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Gone(_) => StatusCode::GONE,
            AppError::Locked(_) => StatusCode::LOCKED,
            AppError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_errors_map_to_expected_http_classes() {
        assert!(matches!(
            AppError::from(GameError::WrongCredential),
            AppError::Unauthorized(_)
        ));
        assert!(matches!(
            AppError::from(GameError::Banned),
            AppError::Locked(_)
        ));
        assert!(matches!(
            AppError::from(GameError::AlreadyRunning),
            AppError::Gone(_)
        ));
        assert!(matches!(AppError::from(GameError::Full), AppError::Unprocessable(_)));
        assert!(matches!(
            AppError::from(GameError::UnknownCommand("/dance".into())),
            AppError::BadRequest(_)
        ));
    }

    #[test]
    fn degraded_mode_maps_to_service_unavailable() {
        assert!(matches!(
            AppError::from(ServiceError::Degraded),
            AppError::ServiceUnavailable(_)
        ));
    }
}
