pub mod memory;

use futures::future::BoxFuture;

use crate::dao::models::GameSummaryEntity;
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for finished-game summaries.
///
/// The registry consults `summary_exists` during identifier allocation so a
/// dead game's identifier is never handed out again; the scheduler calls
/// `save_summary` exactly once per terminated game, after the game's lock has
/// been released.
pub trait SummaryStore: Send + Sync {
    /// Persist a finished game's summary.
    fn save_summary(&self, summary: GameSummaryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a summary by game identifier.
    fn find_summary(
        &self,
        game_id: u64,
    ) -> BoxFuture<'static, StorageResult<Option<GameSummaryEntity>>>;
    /// Whether a summary exists for the given game identifier.
    fn summary_exists(&self, game_id: u64) -> BoxFuture<'static, StorageResult<bool>>;
    /// Probe the backend for liveness.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
