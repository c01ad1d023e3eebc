//! The game aggregate: settings, roster, rounds, and the phase state machine.
//!
//! Every command method and [`Game::tick`] must run under the game's own
//! exclusive lock (see [`crate::state::registry`]). Deadlines are always
//! compared against the wall clock captured at entry, never against a cached
//! boundary, so a vote submitted just before its deadline is counted even
//! when the scheduler observes it a moment later.

use std::collections::HashMap;
use std::time::{Duration, Instant, SystemTime};

use crate::dao::models::{
    GameSettingsEntity, GameSummaryEntity, RoundSummaryEntity, SuggestionEntity, VoteCountEntity,
};
use crate::error::GameError;
use crate::state::chat::MessageChannel;
use crate::state::player::PlayerState;
use crate::state::round::RoundState;
use crate::state::{GameId, UserId};

/// Configuration snapshot for one game, frozen once the lobby closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    /// Display name of the game.
    pub name: String,
    /// Optional join password. `None` means the game is open.
    pub password: Option<String>,
    /// Maximum number of simultaneously enrolled players.
    pub max_players: usize,
    /// Number of rounds played before the game finishes.
    pub round_count: u32,
    /// Length of each round's suggestion window, in seconds.
    pub suggestion_secs: u64,
    /// Length of each round's voting window, in seconds.
    pub voting_secs: u64,
}

impl GameSettings {
    fn suggestion_window(&self) -> Duration {
        Duration::from_secs(self.suggestion_secs)
    }

    fn voting_window(&self) -> Duration {
        Duration::from_secs(self.voting_secs)
    }
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: "caption clash".into(),
            password: None,
            max_players: 8,
            round_count: 3,
            suggestion_secs: 60,
            voting_secs: 30,
        }
    }
}

/// Phases a game moves through.
///
/// The transient "finished" state is unobservable: the tick that completes
/// the last round proceeds to `Dead` under the same lock, so it is not
/// modelled as a separate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Players join, ready up, and the master configures settings.
    Lobby,
    /// The current round collects caption suggestions.
    Suggestion,
    /// The current round collects votes on the submitted suggestions.
    Voting,
    /// Terminal. The game is removed from the registry on the next pass.
    Dead,
}

/// Result of a single [`Game::tick`] invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No deadline was reached; nothing changed.
    NoChange,
    /// Exactly one phase transition was performed.
    Updated,
    /// The game reached its terminal state on this call.
    Dead,
}

/// Aggregated state of one running game.
#[derive(Debug)]
pub struct Game {
    game_id: GameId,
    settings: GameSettings,
    roster: HashMap<UserId, PlayerState>,
    rounds: Vec<RoundState>,
    current_round: usize,
    phase: GamePhase,
    chat: MessageChannel,
    created_at: SystemTime,
}

impl Game {
    /// Create a game in the lobby phase with `master` enrolled and promoted.
    pub fn new(game_id: GameId, master: UserId, settings: GameSettings) -> Self {
        let mut roster = HashMap::new();
        roster.insert(master, PlayerState::master());

        let chat = MessageChannel::new();
        chat.announce(format!("lobby open for `{}`", settings.name));

        Self {
            game_id,
            settings,
            roster,
            rounds: Vec::new(),
            current_round: 0,
            phase: GamePhase::Lobby,
            chat,
            created_at: SystemTime::now(),
        }
    }

    /// Identifier assigned by the registry, immutable for the game's lifetime.
    pub fn game_id(&self) -> GameId {
        self.game_id
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Current settings snapshot.
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Full roster including dismissed and banned records.
    pub fn roster(&self) -> &HashMap<UserId, PlayerState> {
        &self.roster
    }

    /// All user identifiers this game has ever seen.
    pub fn known_users(&self) -> Vec<UserId> {
        self.roster.keys().copied().collect()
    }

    /// The promoted player, if mastership is not vacant.
    pub fn master(&self) -> Option<UserId> {
        self.roster
            .iter()
            .find(|(_, state)| state.promoted)
            .map(|(user, _)| *user)
    }

    /// Whether `user` is an enrolled, non-banned roster member.
    pub fn is_enrolled(&self, user: UserId) -> bool {
        self.roster
            .get(&user)
            .is_some_and(|state| state.enrolled && !state.banned)
    }

    /// Number of currently enrolled players.
    pub fn enrolled_count(&self) -> usize {
        self.roster.values().filter(|state| state.enrolled).count()
    }

    /// Rounds allocated so far, oldest first.
    pub fn rounds(&self) -> &[RoundState] {
        &self.rounds
    }

    /// The round currently being played, absent while in the lobby.
    pub fn current_round(&self) -> Option<&RoundState> {
        match self.phase {
            GamePhase::Suggestion | GamePhase::Voting => self.rounds.get(self.current_round),
            GamePhase::Lobby | GamePhase::Dead => None,
        }
    }

    /// Number of the round currently being played, starting at 1.
    pub fn current_round_number(&self) -> Option<u32> {
        self.current_round().map(|_| self.current_round as u32 + 1)
    }

    /// Chat channel created alongside this game.
    pub fn chat(&self) -> &MessageChannel {
        &self.chat
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Enroll `user` into the lobby.
    ///
    /// Re-enrolling an already enrolled user is a no-op success. Failure
    /// kinds, in check order: [`GameError::WrongCredential`],
    /// [`GameError::Banned`], [`GameError::AlreadyRunning`],
    /// [`GameError::Full`].
    pub fn enroll(&mut self, user: UserId, password: Option<&str>) -> Result<(), GameError> {
        if self.is_enrolled(user) {
            return Ok(());
        }

        if let Some(expected) = self.settings.password.as_deref() {
            if password != Some(expected) {
                return Err(GameError::WrongCredential);
            }
        }
        if self.roster.get(&user).is_some_and(|state| state.banned) {
            return Err(GameError::Banned);
        }
        if self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyRunning);
        }
        if self.enrolled_count() >= self.settings.max_players {
            return Err(GameError::Full);
        }

        let entry = self.roster.entry(user).or_default();
        entry.enrolled = true;
        entry.ready = false;

        if self.master().is_none() {
            self.promote(user);
        }
        Ok(())
    }

    /// Remove `user` from the active roster. Returns whether they were enrolled.
    ///
    /// Dismissing the promoted player hands mastership to the enrolled,
    /// non-banned player with the lowest identifier; with nobody left the
    /// mastership stays vacant and the next tick terminates the game.
    pub fn dismiss(&mut self, user: UserId) -> bool {
        let Some(entry) = self.roster.get_mut(&user) else {
            return false;
        };
        if !entry.enrolled {
            return false;
        }

        entry.enrolled = false;
        entry.ready = false;
        let was_promoted = entry.promoted;
        entry.promoted = false;

        if was_promoted {
            if let Some(successor) = self.successor_candidate() {
                self.promote(successor);
            }
        }
        true
    }

    /// Flag `target` as banned, dismissing them if enrolled.
    ///
    /// Returns whether the target was enrolled before the ban.
    pub fn ban(&mut self, target: UserId) -> bool {
        let was_enrolled = self.dismiss(target);
        self.roster
            .entry(target)
            .or_insert_with(PlayerState::banned)
            .banned = true;
        was_enrolled
    }

    /// Clear a ban so `target` may enroll again.
    pub fn forgive(&mut self, target: UserId) {
        if let Some(entry) = self.roster.get_mut(&target) {
            entry.banned = false;
        }
    }

    /// Record a player's lobby readiness.
    pub fn set_ready(&mut self, user: UserId, ready: bool) -> Result<(), GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyRunning);
        }
        match self.roster.get_mut(&user) {
            Some(entry) if entry.enrolled && !entry.banned => {
                entry.ready = ready;
                Ok(())
            }
            _ => Err(GameError::NotEnrolled),
        }
    }

    /// Replace the settings. Only allowed while the lobby is open.
    pub fn adapt_settings(&mut self, settings: GameSettings) -> Result<(), GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyRunning);
        }
        self.settings = settings;
        Ok(())
    }

    /// Close the lobby, freeze the settings, and open round 1.
    ///
    /// Without `force`, every enrolled non-banned player must be ready.
    pub fn close_lobby(&mut self, force: bool) -> Result<(), GameError> {
        self.close_lobby_at(force, Instant::now())
    }

    fn close_lobby_at(&mut self, force: bool, now: Instant) -> Result<(), GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyRunning);
        }
        if !force {
            let all_ready = self
                .roster
                .values()
                .filter(|state| state.enrolled && !state.banned)
                .all(|state| state.ready);
            if !all_ready {
                return Err(GameError::NotReady);
            }
        }

        self.current_round = 0;
        self.rounds
            .push(RoundState::open(now + self.settings.suggestion_window()));
        self.phase = GamePhase::Suggestion;
        self.chat.announce(format!(
            "lobby closed, round 1 of {}: suggestions open",
            self.settings.round_count
        ));
        Ok(())
    }

    /// Upsert `user`'s caption for the current round.
    pub fn put_suggestion(&mut self, user: UserId, text: String) -> Result<(), GameError> {
        self.put_suggestion_at(user, text, Instant::now())
    }

    fn put_suggestion_at(
        &mut self,
        user: UserId,
        text: String,
        now: Instant,
    ) -> Result<(), GameError> {
        if !self.is_enrolled(user) {
            return Err(GameError::NotEnrolled);
        }
        if self.phase != GamePhase::Suggestion {
            return Err(GameError::WrongPhase);
        }
        let round = &mut self.rounds[self.current_round];
        if now >= round.suggestion_deadline {
            return Err(GameError::WrongPhase);
        }
        round.suggestions.insert(user, text);
        Ok(())
    }

    /// Upsert `user`'s vote for `target` in the current round.
    pub fn put_vote(&mut self, user: UserId, target: UserId) -> Result<(), GameError> {
        self.put_vote_at(user, target, Instant::now())
    }

    fn put_vote_at(&mut self, user: UserId, target: UserId, now: Instant) -> Result<(), GameError> {
        if !self.is_enrolled(user) {
            return Err(GameError::NotEnrolled);
        }
        if self.phase != GamePhase::Voting {
            return Err(GameError::WrongPhase);
        }
        let round = &mut self.rounds[self.current_round];
        match round.voting_deadline {
            Some(deadline) if now < deadline => {}
            _ => return Err(GameError::WrongPhase),
        }
        if target == user || !round.suggestions.contains_key(&target) {
            return Err(GameError::InvalidTarget);
        }
        round.votes.insert(user, target);
        Ok(())
    }

    /// Advance the phase machine based on elapsed time.
    ///
    /// Idempotent and infallible: a missing deadline means "advance
    /// immediately", and at most one transition is performed per call so a
    /// delayed scheduler catches up over several passes instead of looping
    /// inside the lock. A game with zero enrolled players dies regardless of
    /// phase.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> TickOutcome {
        if self.phase == GamePhase::Dead {
            return TickOutcome::Dead;
        }

        if self.enrolled_count() == 0 {
            self.phase = GamePhase::Dead;
            self.chat.announce("game abandoned");
            return TickOutcome::Dead;
        }

        match self.phase {
            GamePhase::Lobby => TickOutcome::NoChange,
            GamePhase::Suggestion => {
                if now < self.rounds[self.current_round].suggestion_deadline {
                    return TickOutcome::NoChange;
                }
                let voting_deadline = now + self.settings.voting_window();
                self.rounds[self.current_round].open_voting(voting_deadline);
                self.phase = GamePhase::Voting;
                self.chat.announce(format!(
                    "round {}: voting open",
                    self.current_round as u32 + 1
                ));
                TickOutcome::Updated
            }
            GamePhase::Voting => {
                let round = &mut self.rounds[self.current_round];
                if let Some(deadline) = round.voting_deadline {
                    if now < deadline {
                        return TickOutcome::NoChange;
                    }
                }
                let winner = round.close().winner;
                match winner {
                    Some(winner) => self.chat.announce(format!(
                        "round {} won by player {winner}",
                        self.current_round as u32 + 1
                    )),
                    None => self.chat.announce(format!(
                        "round {} had no entries",
                        self.current_round as u32 + 1
                    )),
                }

                if (self.current_round as u32 + 1) < self.settings.round_count {
                    self.current_round += 1;
                    self.rounds
                        .push(RoundState::open(now + self.settings.suggestion_window()));
                    self.phase = GamePhase::Suggestion;
                    self.chat.announce(format!(
                        "round {} of {}: suggestions open",
                        self.current_round as u32 + 1,
                        self.settings.round_count
                    ));
                    TickOutcome::Updated
                } else {
                    self.phase = GamePhase::Dead;
                    self.chat.announce("game over");
                    TickOutcome::Dead
                }
            }
            GamePhase::Dead => TickOutcome::Dead,
        }
    }

    /// Summaries of the rounds whose voting already closed.
    pub fn round_summaries(&self) -> Vec<RoundSummaryEntity> {
        self.rounds
            .iter()
            .enumerate()
            .filter_map(|(index, round)| {
                round.tally.as_ref().map(|tally| RoundSummaryEntity {
                    index: index as u32 + 1,
                    suggestions: round
                        .suggestions
                        .iter()
                        .map(|(author, text)| SuggestionEntity {
                            author: *author,
                            text: text.clone(),
                        })
                        .collect(),
                    votes: tally
                        .counts
                        .iter()
                        .map(|(author, count)| VoteCountEntity {
                            author: *author,
                            count: *count,
                        })
                        .collect(),
                    winner: tally.winner,
                })
            })
            .collect()
    }

    /// Produce the durable summary handed to the store at termination.
    pub fn summary(&self) -> GameSummaryEntity {
        GameSummaryEntity {
            game_id: self.game_id,
            settings: GameSettingsEntity::from(&self.settings),
            rounds: self.round_summaries(),
            finished_at: SystemTime::now(),
        }
    }

    fn promote(&mut self, user: UserId) {
        for state in self.roster.values_mut() {
            state.promoted = false;
        }
        if let Some(entry) = self.roster.get_mut(&user) {
            entry.promoted = true;
        }
    }

    fn successor_candidate(&self) -> Option<UserId> {
        self.roster
            .iter()
            .filter(|(_, state)| state.enrolled && !state.banned)
            .map(|(user, _)| *user)
            .min()
    }
}

impl From<&GameSettings> for GameSettingsEntity {
    fn from(settings: &GameSettings) -> Self {
        Self {
            name: settings.name.clone(),
            password_protected: settings.password.is_some(),
            max_players: settings.max_players,
            round_count: settings.round_count,
            suggestion_secs: settings.suggestion_secs,
            voting_secs: settings.voting_secs,
        }
    }
}
