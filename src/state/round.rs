//! One round's suggestion set, vote set, deadlines, and computed tally.

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use indexmap::IndexMap;

use crate::state::UserId;

/// Mutable state of a single suggestion-then-voting cycle.
#[derive(Debug, Clone)]
pub struct RoundState {
    /// Submitted caption per author, last write wins until the deadline.
    pub suggestions: IndexMap<UserId, String>,
    /// Vote target per voter, last write wins until the deadline.
    pub votes: HashMap<UserId, UserId>,
    /// Hard cutoff for suggestion submission.
    pub suggestion_deadline: Instant,
    /// Hard cutoff for voting, set when the suggestion phase closes.
    pub voting_deadline: Option<Instant>,
    /// Vote counts, computed exactly once when voting closes.
    pub tally: Option<RoundTally>,
}

/// Per-round vote aggregation keyed by suggestion author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTally {
    /// Votes received per author; every author appears, zero included.
    pub counts: BTreeMap<UserId, u32>,
    /// Author with the most votes, ties broken by lowest user identifier.
    pub winner: Option<UserId>,
}

impl RoundState {
    /// Open a fresh round collecting suggestions until `suggestion_deadline`.
    pub fn open(suggestion_deadline: Instant) -> Self {
        Self {
            suggestions: IndexMap::new(),
            votes: HashMap::new(),
            suggestion_deadline,
            voting_deadline: None,
            tally: None,
        }
    }

    /// Close suggestion collection and start the voting window.
    pub fn open_voting(&mut self, voting_deadline: Instant) {
        self.voting_deadline = Some(voting_deadline);
    }

    /// Close voting and fix the tally. Further calls keep the first result.
    pub fn close(&mut self) -> &RoundTally {
        if self.tally.is_none() {
            self.tally = Some(self.compute_tally());
        }
        self.tally.as_ref().expect("tally just set")
    }

    fn compute_tally(&self) -> RoundTally {
        let mut counts: BTreeMap<UserId, u32> = self
            .suggestions
            .keys()
            .map(|author| (*author, 0))
            .collect();

        for target in self.votes.values() {
            if let Some(count) = counts.get_mut(target) {
                *count += 1;
            }
        }

        let mut winner: Option<(UserId, u32)> = None;
        for (author, count) in &counts {
            match winner {
                Some((_, best)) if *count <= best => {}
                _ => winner = Some((*author, *count)),
            }
        }

        RoundTally {
            counts,
            winner: winner.map(|(author, _)| author),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn round_with_suggestions(authors: &[UserId]) -> RoundState {
        let mut round = RoundState::open(Instant::now() + Duration::from_secs(60));
        for author in authors {
            round.suggestions.insert(*author, format!("caption-{author}"));
        }
        round
    }

    #[test]
    fn tally_sums_to_votes_cast() {
        let mut round = round_with_suggestions(&[1, 2, 3]);
        round.votes.insert(1, 2);
        round.votes.insert(2, 3);
        round.votes.insert(3, 2);

        let tally = round.close().clone();
        let total: u32 = tally.counts.values().sum();
        assert_eq!(total, 3);
        assert_eq!(tally.counts[&2], 2);
        assert_eq!(tally.counts[&3], 1);
        assert_eq!(tally.counts[&1], 0);
        assert_eq!(tally.winner, Some(2));
    }

    #[test]
    fn tie_breaks_on_lowest_user_id() {
        let mut round = round_with_suggestions(&[7, 3, 5]);
        round.votes.insert(3, 7);
        round.votes.insert(7, 5);

        let tally = round.close().clone();
        assert_eq!(tally.counts[&5], 1);
        assert_eq!(tally.counts[&7], 1);
        assert_eq!(tally.winner, Some(5));
    }

    #[test]
    fn empty_round_has_no_winner() {
        let mut round = round_with_suggestions(&[]);
        let tally = round.close().clone();
        assert!(tally.counts.is_empty());
        assert_eq!(tally.winner, None);
    }

    #[test]
    fn close_is_computed_once() {
        let mut round = round_with_suggestions(&[1, 2]);
        round.votes.insert(2, 1);
        let first = round.close().clone();

        // Late mutation must not change a fixed tally.
        round.votes.insert(1, 2);
        let second = round.close().clone();
        assert_eq!(first, second);
    }
}
