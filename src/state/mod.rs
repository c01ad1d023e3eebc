//! In-memory application state: the game registry and the summary-store slot.

pub mod chat;
pub mod game;
pub mod player;
pub mod registry;
pub mod round;

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::AppConfig;
use crate::dao::summary_store::SummaryStore;
use crate::error::ServiceError;
use crate::state::registry::GameRegistry;

/// Identifier of a user, assigned by the (out-of-scope) account system.
pub type UserId = u64;
/// Identifier of a game, allocated by [`GameRegistry`].
pub type GameId = u64;

/// Shared handle to the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by the request layer and the scheduler.
pub struct AppState {
    config: AppConfig,
    registry: GameRegistry,
    summary_store: RwLock<Option<Arc<dyn SummaryStore>>>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a summary store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        Arc::new(Self {
            config,
            registry: GameRegistry::new(),
            summary_store: RwLock::new(None),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Registry of live games.
    pub fn registry(&self) -> &GameRegistry {
        &self.registry
    }

    /// Obtain a handle to the current summary store, if one is installed.
    pub async fn summary_store(&self) -> Option<Arc<dyn SummaryStore>> {
        let guard = self.summary_store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the summary store or fail with the degraded-mode error.
    pub async fn require_summary_store(&self) -> Result<Arc<dyn SummaryStore>, ServiceError> {
        self.summary_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a summary store implementation and leave degraded mode.
    pub async fn install_summary_store(&self, store: Arc<dyn SummaryStore>) {
        let mut guard = self.summary_store.write().await;
        *guard = Some(store);
    }

    /// Remove the current summary store and enter degraded mode.
    pub async fn clear_summary_store(&self) {
        let mut guard = self.summary_store.write().await;
        guard.take();
    }

    /// Whether no summary store is currently installed.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.summary_store.read().await;
        guard.is_none()
    }
}
