//! Per-user membership record inside a single game.

/// Membership flags tracked for one (game, user) pair.
///
/// Records are kept after dismissal so the `banned` flag survives a player
/// leaving; the active roster is the subset with `enrolled` set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerState {
    /// Whether the user currently takes part in the game.
    pub enrolled: bool,
    /// Whether the user is the game master. At most one promoted entry per game.
    pub promoted: bool,
    /// Lobby readiness flag, consulted when the lobby closes.
    pub ready: bool,
    /// Whether the user is locked out until forgiven.
    pub banned: bool,
}

impl PlayerState {
    /// Record for the game master created together with the game.
    pub fn master() -> Self {
        Self {
            enrolled: true,
            promoted: true,
            ..Self::default()
        }
    }

    /// Record keeping only a ban for a user who never enrolled.
    pub fn banned() -> Self {
        Self {
            banned: true,
            ..Self::default()
        }
    }
}
