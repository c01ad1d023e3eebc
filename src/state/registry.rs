//! Process-wide map from game identifier to live game.
//!
//! The registry's own locks (DashMap shards) are held only for the brief
//! insert/lookup/remove operations, never across a game command; gameplay
//! serialization happens on each game's own mutex.

use std::sync::Arc;

use dashmap::DashMap;
use rand::Rng;
use tokio::sync::Mutex;

use crate::dao::storage::StorageResult;
use crate::dao::summary_store::SummaryStore;
use crate::error::GameError;
use crate::state::game::Game;
use crate::state::{GameId, UserId};

/// Exclusive-access handle to a live game.
pub type GameHandle = Arc<Mutex<Game>>;

/// Upper bound (exclusive) of the game identifier space, 40 bits like the
/// summary records it must stay collision-free with.
const GAME_ID_SPACE: u64 = 1 << 40;

/// Live games plus the user-to-current-game index.
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: DashMap<GameId, GameHandle>,
    users: DashMap<UserId, GameId>,
}

impl GameRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a fresh random identifier, redrawing on collision against both
    /// the live map and the summary store.
    ///
    /// A dead game's identifier must never be reused, hence the store check.
    pub async fn allocate_id(&self, store: &dyn SummaryStore) -> StorageResult<GameId> {
        loop {
            let candidate = rand::rng().random_range(1..GAME_ID_SPACE);
            if self.games.contains_key(&candidate) {
                continue;
            }
            if store.summary_exists(candidate).await? {
                continue;
            }
            return Ok(candidate);
        }
    }

    /// Insert a freshly constructed game and return its handle.
    pub fn insert(&self, game: Game) -> GameHandle {
        let game_id = game.game_id();
        let handle = Arc::new(Mutex::new(game));
        self.games.insert(game_id, handle.clone());
        handle
    }

    /// Resolve a live game by identifier.
    pub fn lookup(&self, game_id: GameId) -> Result<GameHandle, GameError> {
        self.games
            .get(&game_id)
            .map(|entry| entry.value().clone())
            .ok_or(GameError::NotFound)
    }

    /// Drop a terminated game. Called by the scheduler after `Dead`.
    pub fn remove(&self, game_id: GameId) {
        self.games.remove(&game_id);
    }

    /// Snapshot of all live games for a scheduler pass.
    pub fn live_games(&self) -> Vec<(GameId, GameHandle)> {
        self.games
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Number of live games.
    pub fn len(&self) -> usize {
        self.games.len()
    }

    /// Whether no game is currently live.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// The game `user` is currently enrolled in, if any.
    pub fn current_game_of(&self, user: UserId) -> Option<GameId> {
        self.users.get(&user).map(|entry| *entry.value())
    }

    /// Point `user`'s record at `game_id`.
    pub fn set_current_game(&self, user: UserId, game_id: GameId) {
        self.users.insert(user, game_id);
    }

    /// Clear `user`'s record, but only while it still points at `game_id`.
    pub fn clear_current_game(&self, user: UserId, game_id: GameId) {
        self.users
            .remove_if(&user, |_, current| *current == game_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::summary_store::memory::InMemorySummaryStore;
    use crate::state::game::GameSettings;

    #[tokio::test]
    async fn allocated_ids_are_positive_and_unique_among_live_games() {
        let registry = GameRegistry::new();
        let store = InMemorySummaryStore::new();

        let first = registry.allocate_id(&store).await.unwrap();
        assert!(first > 0);
        registry.insert(Game::new(first, 1, GameSettings::default()));

        let second = registry.allocate_id(&store).await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn lookup_of_unknown_game_fails() {
        let registry = GameRegistry::new();
        assert_eq!(registry.lookup(42).unwrap_err(), GameError::NotFound);
    }

    #[tokio::test]
    async fn remove_makes_a_game_unreachable() {
        let registry = GameRegistry::new();
        registry.insert(Game::new(7, 1, GameSettings::default()));
        assert!(registry.lookup(7).is_ok());

        registry.remove(7);
        assert!(registry.lookup(7).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn user_index_clears_only_matching_entries() {
        let registry = GameRegistry::new();
        registry.set_current_game(1, 7);

        registry.clear_current_game(1, 8);
        assert_eq!(registry.current_game_of(1), Some(7));

        registry.clear_current_game(1, 7);
        assert_eq!(registry.current_game_of(1), None);
    }
}
