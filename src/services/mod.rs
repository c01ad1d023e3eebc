/// OpenAPI documentation generation.
pub mod documentation;
/// Game command operations: lobby, roster, suggestions, votes.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Periodic driver advancing every live game.
pub mod scheduler;
/// Finished-game summary lookup.
pub mod summary_service;
