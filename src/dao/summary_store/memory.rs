//! Process-local summary store backing single-node deployments and tests.

use dashmap::DashMap;
use futures::future::{BoxFuture, ready};

use crate::dao::models::GameSummaryEntity;
use crate::dao::storage::StorageResult;
use crate::dao::summary_store::SummaryStore;

/// In-memory [`SummaryStore`] keyed by game identifier.
///
/// Summaries live for the lifetime of the process; durable backends plug in
/// behind the same trait.
#[derive(Debug, Default)]
pub struct InMemorySummaryStore {
    summaries: DashMap<u64, GameSummaryEntity>,
}

impl InMemorySummaryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored summaries.
    pub fn len(&self) -> usize {
        self.summaries.len()
    }

    /// Whether the store holds no summaries.
    pub fn is_empty(&self) -> bool {
        self.summaries.is_empty()
    }
}

impl SummaryStore for InMemorySummaryStore {
    fn save_summary(&self, summary: GameSummaryEntity) -> BoxFuture<'static, StorageResult<()>> {
        self.summaries.insert(summary.game_id, summary);
        Box::pin(ready(Ok(())))
    }

    fn find_summary(
        &self,
        game_id: u64,
    ) -> BoxFuture<'static, StorageResult<Option<GameSummaryEntity>>> {
        let found = self.summaries.get(&game_id).map(|entry| entry.clone());
        Box::pin(ready(Ok(found)))
    }

    fn summary_exists(&self, game_id: u64) -> BoxFuture<'static, StorageResult<bool>> {
        let exists = self.summaries.contains_key(&game_id);
        Box::pin(ready(Ok(exists)))
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(ready(Ok(())))
    }
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::*;
    use crate::dao::models::GameSettingsEntity;

    fn summary(game_id: u64) -> GameSummaryEntity {
        GameSummaryEntity {
            game_id,
            settings: GameSettingsEntity {
                name: "test".into(),
                password_protected: false,
                max_players: 8,
                round_count: 1,
                suggestion_secs: 60,
                voting_secs: 30,
            },
            rounds: Vec::new(),
            finished_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn saved_summaries_can_be_found() {
        let store = InMemorySummaryStore::new();
        assert!(!store.summary_exists(7).await.unwrap());

        store.save_summary(summary(7)).await.unwrap();
        assert!(store.summary_exists(7).await.unwrap());
        let found = store.find_summary(7).await.unwrap().unwrap();
        assert_eq!(found.game_id, 7);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_summary_is_none() {
        let store = InMemorySummaryStore::new();
        assert!(store.find_summary(42).await.unwrap().is_none());
    }
}
