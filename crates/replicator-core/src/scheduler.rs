//! Review scheduler: the state machine driving one drill session.
//!
//! ```text
//! SequentialBase ──▶ BaseReview ──┬──▶ RandomFocus ──▶ SequentialFinal ──▶ Complete
//!                                 ├──▶ SequentialFinal                      │
//!                                 └──▶ Exited ◀─────────────────────────────┘
//! ```
//!
//! `Complete` offers the same choices as `BaseReview`. The session never
//! blocks: the caller asks for the [`Step`] to perform, then feeds back an
//! [`Outcome`] with [`DrillSession::record`] or a [`SessionChoice`] with
//! [`DrillSession::choose`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::error::{ReplicatorError, Result};
use crate::model::{DrillUnit, Outcome, Scene};
use crate::prng::Lcg;
use crate::scoring::{derive_seed, Comparison, LineScore, ScoreBoard};
use crate::units::select_units;

/// Which kind of evaluation is being asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pass {
    Base,
    RandomFocus,
    Final,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::Base => write!(f, "base"),
            Pass::RandomFocus => write!(f, "random focus"),
            Pass::Final => write!(f, "final"),
        }
    }
}

/// Public view of the scheduler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    SequentialBase,
    BaseReview,
    RandomFocus,
    SequentialFinal,
    Complete,
    Exited,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::SequentialBase => "sequential base",
            Phase::BaseReview => "base review",
            Phase::RandomFocus => "random focus",
            Phase::SequentialFinal => "sequential final",
            Phase::Complete => "complete",
            Phase::Exited => "exited",
        };
        f.write_str(name)
    }
}

/// What the learner picks at a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionChoice {
    RandomFocus,
    SequentialFinal,
    ReturnToSelection,
}

/// A request to have one unit recited and judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub pass: Pass,
    /// Index of the unit in [`DrillSession::units`].
    pub position: usize,
    pub unit: DrillUnit,
    /// Evaluations already done in this pass.
    pub progress: usize,
    /// Evaluations this pass will take in total.
    pub length: usize,
}

/// The next thing the collaborator must do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Evaluate(EvaluationRequest),
    /// Base pass finished; show the summary and ask for a choice.
    BaseReview(LineScore),
    /// Final pass finished; show the progression and ask for a choice.
    Complete(Comparison),
    /// The learner went back to selection; the session is over.
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SequentialBase { next: usize },
    BaseReview,
    RandomFocus { progress: usize, current: usize },
    SequentialFinal { next: usize },
    Complete,
    Exited,
}

/// One drill session over one character's lines in one scene.
#[derive(Debug, Clone)]
pub struct DrillSession {
    character: String,
    scene_index: usize,
    units: Vec<DrillUnit>,
    base: ScoreBoard,
    final_scores: Option<ScoreBoard>,
    totals: ScoreBoard,
    rng: Lcg,
    seed: u64,
    random_rounds: u32,
    state: State,
}

impl DrillSession {
    /// Start a session for `character` (a main label) on `scene`.
    pub fn new(
        scene: &Scene,
        scene_index: usize,
        aliases: &AliasTable,
        character: &str,
    ) -> Result<Self> {
        if !aliases.is_main_label(character) {
            return Err(ReplicatorError::UnknownCharacter(character.to_string()));
        }
        let units = select_units(scene, aliases, character);
        if units.is_empty() {
            return Err(ReplicatorError::NoDrillUnits {
                character: character.to_string(),
                scene: scene.name.clone(),
            });
        }
        Self::from_units(character, scene_index, units)
    }

    /// Start a session over an already selected unit list.
    ///
    /// Fails with [`ReplicatorError::NoDrillUnits`] when `units` is empty.
    pub fn from_units(
        character: &str,
        scene_index: usize,
        units: Vec<DrillUnit>,
    ) -> Result<Self> {
        if units.is_empty() {
            return Err(ReplicatorError::NoDrillUnits {
                character: character.to_string(),
                scene: format!("#{scene_index}"),
            });
        }
        let n = units.len();
        tracing::info!("drill session for {character}: {n} lines, starting base pass");
        Ok(Self {
            character: character.to_string(),
            scene_index,
            base: ScoreBoard::new(n),
            final_scores: None,
            totals: ScoreBoard::new(n),
            rng: Lcg::default(),
            seed: 0,
            random_rounds: 0,
            state: State::SequentialBase { next: 0 },
            units,
        })
    }

    pub fn character(&self) -> &str {
        &self.character
    }

    pub fn scene_index(&self) -> usize {
        self.scene_index
    }

    pub fn units(&self) -> &[DrillUnit] {
        &self.units
    }

    pub fn base_scores(&self) -> &ScoreBoard {
        &self.base
    }

    /// Scores of the most recent final pass, complete or in progress.
    pub fn final_scores(&self) -> Option<&ScoreBoard> {
        self.final_scores.as_ref()
    }

    /// Running totals across the whole session.
    pub fn totals(&self) -> &ScoreBoard {
        &self.totals
    }

    /// Current PRNG state; equals the derived seed right after the base pass.
    pub fn rng_state(&self) -> u64 {
        self.rng.state()
    }

    /// Seed derived from the base pass (0 until the base pass is done).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of random-focus rounds started so far.
    pub fn random_rounds(&self) -> u32 {
        self.random_rounds
    }

    pub fn phase(&self) -> Phase {
        match self.state {
            State::SequentialBase { .. } => Phase::SequentialBase,
            State::BaseReview => Phase::BaseReview,
            State::RandomFocus { .. } => Phase::RandomFocus,
            State::SequentialFinal { .. } => Phase::SequentialFinal,
            State::Complete => Phase::Complete,
            State::Exited => Phase::Exited,
        }
    }

    /// Length of a random-focus round.
    pub fn random_focus_length(&self) -> usize {
        2 * self.units.len()
    }

    /// The step the collaborator has to perform next.
    pub fn current(&self) -> Step {
        let n = self.units.len();
        let request = |pass: Pass, position: usize, progress: usize, length: usize| {
            Step::Evaluate(EvaluationRequest {
                pass,
                position,
                unit: self.units[position],
                progress,
                length,
            })
        };
        match self.state {
            State::SequentialBase { next } => request(Pass::Base, next, next, n),
            State::RandomFocus { progress, current } => request(
                Pass::RandomFocus,
                current,
                progress,
                self.random_focus_length(),
            ),
            State::SequentialFinal { next } => request(Pass::Final, next, next, n),
            State::BaseReview => Step::BaseReview(self.base.summarize()),
            State::Complete => Step::Complete(self.comparison()),
            State::Exited => Step::Exited,
        }
    }

    /// Base summary next to the latest final summary (zero if none yet).
    pub fn comparison(&self) -> Comparison {
        Comparison {
            base: self.base.summarize(),
            final_: self
                .final_scores
                .as_ref()
                .map(ScoreBoard::summarize)
                .unwrap_or_default(),
        }
    }

    /// Record the outcome of the pending evaluation and advance.
    pub fn record(&mut self, outcome: Outcome) -> Result<()> {
        let n = self.units.len();
        match self.state {
            State::SequentialBase { next } => {
                self.base.record(next, outcome);
                if next + 1 == n {
                    self.finish_base();
                } else {
                    self.state = State::SequentialBase { next: next + 1 };
                }
            }
            State::RandomFocus { progress, current } => {
                self.totals.record(current, outcome);
                let progress = progress + 1;
                if progress == self.random_focus_length() {
                    tracing::info!("random focus done after {progress} evaluations");
                    self.start_final();
                } else {
                    let current = self.pick_weakest(Some(current))?;
                    self.state = State::RandomFocus { progress, current };
                }
            }
            State::SequentialFinal { next } => {
                if let Some(scores) = self.final_scores.as_mut() {
                    scores.record(next, outcome);
                }
                if next + 1 == n {
                    self.finish_final();
                } else {
                    self.state = State::SequentialFinal { next: next + 1 };
                }
            }
            State::BaseReview | State::Complete | State::Exited => {
                return Err(self.invalid("record an outcome"));
            }
        }
        Ok(())
    }

    /// Apply the learner's choice at a checkpoint.
    pub fn choose(&mut self, choice: SessionChoice) -> Result<()> {
        if !matches!(self.state, State::BaseReview | State::Complete) {
            return Err(self.invalid("choose what to do next"));
        }
        match choice {
            SessionChoice::RandomFocus => {
                self.random_rounds += 1;
                tracing::info!("starting random focus round {}", self.random_rounds);
                let current = self.pick_weakest(None)?;
                self.state = State::RandomFocus {
                    progress: 0,
                    current,
                };
            }
            SessionChoice::SequentialFinal => self.start_final(),
            SessionChoice::ReturnToSelection => {
                tracing::info!("leaving drill session for {}", self.character);
                self.state = State::Exited;
            }
        }
        Ok(())
    }

    fn finish_base(&mut self) {
        self.totals = self.base.clone();
        let seed = derive_seed(self.base.as_slice());
        self.seed = seed;
        self.rng.seed(seed);
        tracing::info!(
            "base pass done: {:?}, random seed {seed}",
            self.base.summarize()
        );
        self.state = State::BaseReview;
    }

    fn start_final(&mut self) {
        tracing::info!("starting final pass");
        self.final_scores = Some(ScoreBoard::new(self.units.len()));
        self.state = State::SequentialFinal { next: 0 };
    }

    fn finish_final(&mut self) {
        if let Some(scores) = &self.final_scores {
            self.totals.absorb(scores);
        }
        tracing::info!("final pass done: {:?}", self.comparison());
        self.state = State::Complete;
    }

    /// Choose the unit with the lexicographically smallest running total,
    /// skipping `last`, breaking ties with the PRNG in document order.
    fn pick_weakest(&mut self, last: Option<usize>) -> Result<usize> {
        // With a single unit, skipping it would leave nothing to pick.
        let skip = last.filter(|_| self.units.len() > 1);

        let mut worst: Option<(u32, u32, u32)> = None;
        let mut ties: Vec<usize> = Vec::new();
        for (position, score) in self.totals.as_slice().iter().enumerate() {
            if Some(position) == skip {
                continue;
            }
            let key = score.as_tuple();
            match worst {
                Some(w) if key > w => {}
                Some(w) if key == w => ties.push(position),
                _ => {
                    worst = Some(key);
                    ties.clear();
                    ties.push(position);
                }
            }
        }

        let index = self.rng.next_int(ties.len())?;
        let chosen = ties[index];
        tracing::debug!(
            "random focus picked {} among {} tie(s) at {:?}",
            self.units[chosen],
            ties.len(),
            worst
        );
        Ok(chosen)
    }

    fn invalid(&self, action: &str) -> ReplicatorError {
        ReplicatorError::InvalidTransition {
            state: self.phase().to_string(),
            action: action.to_string(),
        }
    }
}
