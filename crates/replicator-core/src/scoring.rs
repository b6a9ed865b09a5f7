//! Three-tier recall scoring.
//!
//! Each drill unit keeps a `{perfect, almost, ko}` counter per pass and a
//! running total across the session. Base-pass results also seed the PRNG
//! used by random review.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::model::Outcome;
use crate::prng::MODULUS;

/// Outcome counters for one unit (or a sum over units).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LineScore {
    pub perfect: u32,
    pub almost: u32,
    pub ko: u32,
}

impl LineScore {
    pub fn new(perfect: u32, almost: u32, ko: u32) -> Self {
        Self {
            perfect,
            almost,
            ko,
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Perfect => self.perfect += 1,
            Outcome::Almost => self.almost += 1,
            Outcome::Ko => self.ko += 1,
        }
    }

    pub fn get(&self, outcome: Outcome) -> u32 {
        match outcome {
            Outcome::Perfect => self.perfect,
            Outcome::Almost => self.almost,
            Outcome::Ko => self.ko,
        }
    }

    pub fn total(&self) -> u32 {
        self.perfect + self.almost + self.ko
    }

    /// Sort key for worst-first selection: fewer perfects first, then fewer
    /// almosts, then fewer kos.
    pub fn as_tuple(&self) -> (u32, u32, u32) {
        (self.perfect, self.almost, self.ko)
    }
}

impl AddAssign for LineScore {
    fn add_assign(&mut self, other: Self) {
        self.perfect += other.perfect;
        self.almost += other.almost;
        self.ko += other.ko;
    }
}

/// Per-unit scores for one pass, indexed by the unit's position in the
/// session's unit list (document order).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreBoard {
    scores: Vec<LineScore>,
}

impl ScoreBoard {
    pub fn new(len: usize) -> Self {
        Self {
            scores: vec![LineScore::default(); len],
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Record one outcome for the unit at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is out of range; callers index with positions
    /// from the same unit list the board was sized for.
    pub fn record(&mut self, position: usize, outcome: Outcome) {
        self.scores[position].record(outcome);
    }

    pub fn get(&self, position: usize) -> Option<&LineScore> {
        self.scores.get(position)
    }

    pub fn as_slice(&self) -> &[LineScore] {
        &self.scores
    }

    /// Add another board of the same length unit by unit.
    pub fn absorb(&mut self, other: &ScoreBoard) {
        debug_assert_eq!(self.len(), other.len());
        for (mine, theirs) in self.scores.iter_mut().zip(&other.scores) {
            *mine += *theirs;
        }
    }

    pub fn summarize(&self) -> LineScore {
        summarize(&self.scores)
    }
}

/// Field-wise sum of a set of scores.
pub fn summarize(scores: &[LineScore]) -> LineScore {
    scores.iter().fold(LineScore::default(), |mut acc, s| {
        acc += *s;
        acc
    })
}

/// Derive the random-review seed from base-pass scores in document order.
///
/// `seed = (seed * 3 + almost + 2 * ko) mod 2^31`, starting from 0.
pub fn derive_seed(base: &[LineScore]) -> u64 {
    base.iter().fold(0u64, |seed, s| {
        (seed * 3 + u64::from(s.almost) + 2 * u64::from(s.ko)) % MODULUS
    })
}

/// Base-versus-final progression shown after a final pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub base: LineScore,
    #[serde(rename = "final")]
    pub final_: LineScore,
}

impl Comparison {
    /// Change in each counter, final minus base.
    pub fn delta(&self) -> (i64, i64, i64) {
        (
            i64::from(self.final_.perfect) - i64::from(self.base.perfect),
            i64::from(self.final_.almost) - i64::from(self.base.almost),
            i64::from(self.final_.ko) - i64::from(self.base.ko),
        )
    }
}
