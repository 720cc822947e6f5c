//! Single-elimination bracket
//!
//! Round one is seeded by rating: the strongest entrants take the byes and
//! the rest are folded best-vs-worst. Later rounds pair the advancing list in
//! order. The bracket is plain state; [`Bracket::advance`] is the only
//! transition and it runs once per finished match.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::consts::BASELINE_RATING;

/// A competitor eligible for bracket placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: String,
    pub name: String,
    pub rating: f64,
}

impl Entrant {
    /// Missing, non-finite or non-positive ratings become the baseline
    pub fn new(id: impl Into<String>, name: impl Into<String>, rating: Option<f64>) -> Self {
        let rating = match rating {
            Some(r) if r.is_finite() && r > 0.0 => r,
            _ => BASELINE_RATING,
        };
        Self {
            id: id.into(),
            name: name.into(),
            rating,
        }
    }

    /// Highest rating first, then name, then id
    fn seed_order(a: &Entrant, b: &Entrant) -> Ordering {
        b.rating
            .total_cmp(&a.rating)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.id.cmp(&b.id))
    }
}

/// Two entrants slated to play one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair(pub Entrant, pub Entrant);

impl Pair {
    pub fn first(&self) -> &Entrant {
        &self.0
    }

    pub fn second(&self) -> &Entrant {
        &self.1
    }
}

/// Pairs for a round plus whoever skips it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Seeding {
    pub pairs: Vec<Pair>,
    pub carry: Vec<Entrant>,
}

/// Smallest power of two that fits `count` entrants, never below 2
pub fn bracket_size(count: usize) -> usize {
    count.max(2).next_power_of_two()
}

/// Number of rounds for a bracket size
pub fn total_rounds(bracket_size: usize) -> u32 {
    bracket_size.max(1).ilog2().max(1)
}

/// Round-one seeding: byes to the top seeds, the rest folded best vs worst
pub fn seed(entrants: &[Entrant]) -> Seeding {
    let mut sorted = entrants.to_vec();
    sorted.sort_by(Entrant::seed_order);

    let byes = bracket_size(sorted.len()) - sorted.len();
    let mut rest = sorted.split_off(byes.min(sorted.len()));
    let mut carry = sorted;

    let mut pairs = Vec::with_capacity(rest.len() / 2);
    while rest.len() >= 2 {
        let worst = rest.remove(rest.len() - 1);
        let best = rest.remove(0);
        pairs.push(Pair(best, worst));
    }
    // Odd middle entrant
    carry.append(&mut rest);

    Seeding { pairs, carry }
}

/// Pair entrants in list order; a leftover entrant is carried
pub fn pair_sequential(entrants: Vec<Entrant>) -> Seeding {
    let mut seeding = Seeding::default();
    let mut iter = entrants.into_iter();
    while let Some(first) = iter.next() {
        match iter.next() {
            Some(second) => seeding.pairs.push(Pair(first, second)),
            None => seeding.carry.push(first),
        }
    }
    seeding
}

/// Outcome of reporting a finished match to the bracket
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Next match in the same round
    NextMatch,
    /// Round finished; a new round begins
    NextRound { round: u32 },
    /// Tournament over
    Champion(Entrant),
    /// Nothing to advance (not initialised or already finished)
    Idle,
}

/// Result of [`Bracket::advance`]
#[derive(Debug, Clone, PartialEq)]
pub struct AdvanceResult {
    pub winner: Option<Entrant>,
    /// The winner name matched neither pair member; the first member was used
    pub used_fallback: bool,
    pub advance: Advance,
}

/// Tournament bracket state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bracket {
    entrants: Vec<Entrant>,
    bracket_size: usize,
    round: u32,
    pairs: Vec<Pair>,
    match_index: usize,
    winners: Vec<Entrant>,
    carry: Vec<Entrant>,
    champion: Option<Entrant>,
}

impl Bracket {
    /// Seed a new bracket. Fewer than two entrants leaves it uninitialised.
    pub fn new(entrants: Vec<Entrant>) -> Self {
        let mut bracket = Self::default();
        bracket.reset_entrants(entrants);
        bracket
    }

    /// Throw away all progress and reseed with a new entrant list
    pub fn reset_entrants(&mut self, entrants: Vec<Entrant>) {
        *self = Self {
            bracket_size: bracket_size(entrants.len()),
            entrants,
            ..Self::default()
        };

        if self.entrants.len() < 2 {
            log::warn!(
                "Bracket needs at least two entrants, got {}",
                self.entrants.len()
            );
            return;
        }

        let Seeding { pairs, carry } = seed(&self.entrants);
        log::info!(
            "Seeded {} entrants into a bracket of {} ({} byes)",
            self.entrants.len(),
            self.bracket_size,
            carry.len()
        );
        self.pairs = pairs;
        self.carry = carry;
        self.round = 1;
    }

    pub fn is_initialized(&self) -> bool {
        self.round > 0
    }

    pub fn entrants(&self) -> &[Entrant] {
        &self.entrants
    }

    pub fn bracket_size(&self) -> usize {
        self.bracket_size
    }

    pub fn bye_count(&self) -> usize {
        self.bracket_size.saturating_sub(self.entrants.len())
    }

    pub fn total_rounds(&self) -> u32 {
        total_rounds(self.bracket_size)
    }

    /// Current round, 1-based. Zero when uninitialised.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Reporting stage; the final is always stage 1
    pub fn stage(&self) -> u32 {
        (self.total_rounds() + 1).saturating_sub(self.round.max(1)).max(1)
    }

    /// 1-based match number within the round
    pub fn match_number(&self) -> usize {
        self.match_index + 1
    }

    pub fn pairs_in_round(&self) -> &[Pair] {
        &self.pairs
    }

    /// Entrants skipping to the next round
    pub fn carried(&self) -> &[Entrant] {
        &self.carry
    }

    pub fn winners_this_round(&self) -> &[Entrant] {
        &self.winners
    }

    pub fn current_pair(&self) -> Option<&Pair> {
        if self.champion.is_some() {
            return None;
        }
        self.pairs.get(self.match_index)
    }

    /// Pair after the current one in this round
    pub fn upcoming_pair(&self) -> Option<&Pair> {
        if self.champion.is_some() {
            return None;
        }
        self.pairs.get(self.match_index + 1)
    }

    pub fn champion(&self) -> Option<&Entrant> {
        self.champion.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.champion.is_some()
    }

    /// Record the winner of the current pair and move on
    pub fn advance(&mut self, winner_name: &str) -> AdvanceResult {
        let Some(pair) = self.current_pair() else {
            return AdvanceResult {
                winner: None,
                used_fallback: false,
                advance: Advance::Idle,
            };
        };

        let (winner, used_fallback) = if pair.0.name == winner_name {
            (pair.0.clone(), false)
        } else if pair.1.name == winner_name {
            (pair.1.clone(), false)
        } else {
            log::warn!(
                "Winner '{}' is not in pair {} vs {}, advancing {}",
                winner_name,
                pair.0.name,
                pair.1.name,
                pair.0.name
            );
            (pair.0.clone(), true)
        };

        self.winners.push(winner.clone());
        let advance = self.next();
        AdvanceResult {
            winner: Some(winner),
            used_fallback,
            advance,
        }
    }

    fn next(&mut self) -> Advance {
        if self.match_index + 1 < self.pairs.len() {
            self.match_index += 1;
            return Advance::NextMatch;
        }

        let mut advancing = std::mem::take(&mut self.carry);
        advancing.append(&mut self.winners);
        self.pairs.clear();
        self.match_index = 0;

        if advancing.len() == 1 {
            let champion = advancing.remove(0);
            log::info!("Champion: {}", champion.name);
            self.champion = Some(champion.clone());
            return Advance::Champion(champion);
        }

        let Seeding { pairs, carry } = pair_sequential(advancing);
        self.pairs = pairs;
        self.carry = carry;
        self.round += 1;
        log::debug!(
            "Round {}: {} matches, {} carried",
            self.round,
            self.pairs.len(),
            self.carry.len()
        );
        Advance::NextRound { round: self.round }
    }
}
