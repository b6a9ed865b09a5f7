//! Drill session driver.
//!
//! Runs a [`DrillSession`] to completion against a [`DrillFrontend`], the
//! collaborator that shows cues, collects outcomes and asks the learner what
//! to do at checkpoints. The frontend is the only place the session waits.

use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;

use crate::evaluation::{EvaluationPrompt, HISTORY_LENGTH};
use crate::model::{Outcome, Scene};
use crate::report::SessionReport;
use crate::scheduler::{DrillSession, Phase, SessionChoice, Step};
use crate::scoring::{Comparison, LineScore};

/// Configuration for the drill engine.
#[derive(Debug, Clone)]
pub struct DrillEngineConfig {
    /// Lines of cue shown per evaluation, target included.
    pub history_length: usize,
}

impl Default for DrillEngineConfig {
    fn default() -> Self {
        Self {
            history_length: HISTORY_LENGTH,
        }
    }
}

/// A point where the learner decides how to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// After the base pass.
    BaseReview(LineScore),
    /// After a final pass.
    Complete(Comparison),
}

/// Announcements made when a pass starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    SequentialBase { length: usize },
    RandomFocus { length: usize },
    SequentialFinal { length: usize },
}

/// The collaborator presenting the session to the learner.
#[async_trait]
pub trait DrillFrontend: Send {
    /// A pass is about to start.
    async fn announce(&mut self, notice: Notice) -> Result<()>;

    /// Run one evaluation and return the learner's verdict.
    async fn evaluate(&mut self, prompt: &EvaluationPrompt) -> Result<Outcome>;

    /// Show a checkpoint summary and return the learner's choice.
    async fn choose(&mut self, checkpoint: Checkpoint) -> Result<SessionChoice>;
}

/// Drives drill sessions.
pub struct DrillEngine {
    config: DrillEngineConfig,
}

impl DrillEngine {
    pub fn new(config: DrillEngineConfig) -> Self {
        Self { config }
    }

    /// Run `session` over `scene` until the learner returns to selection.
    pub async fn run(
        &self,
        play_name: &str,
        scene: &Scene,
        mut session: DrillSession,
        frontend: &mut dyn DrillFrontend,
    ) -> Result<SessionReport> {
        let started_at = Utc::now();
        let mut evaluations = 0usize;

        if let Some(notice) = notice_for(&session) {
            frontend.announce(notice).await?;
        }

        loop {
            let before = session.phase();
            match session.current() {
                Step::Evaluate(request) => {
                    let prompt = EvaluationPrompt::new(scene, request, self.config.history_length);
                    let outcome = frontend.evaluate(&prompt).await?;
                    tracing::debug!(
                        "{} pass: unit {} scored {outcome}",
                        request.pass,
                        request.unit
                    );
                    session.record(outcome)?;
                    evaluations += 1;
                }
                Step::BaseReview(summary) => {
                    let choice = frontend.choose(Checkpoint::BaseReview(summary)).await?;
                    session.choose(choice)?;
                }
                Step::Complete(comparison) => {
                    let choice = frontend.choose(Checkpoint::Complete(comparison)).await?;
                    session.choose(choice)?;
                }
                Step::Exited => break,
            }

            if session.phase() != before {
                if let Some(notice) = notice_for(&session) {
                    frontend.announce(notice).await?;
                }
            }
        }

        tracing::info!(
            "session for {} finished after {evaluations} evaluations",
            session.character()
        );

        Ok(SessionReport::from_session(
            play_name,
            &scene.name,
            &session,
            evaluations,
            started_at,
        ))
    }
}

fn notice_for(session: &DrillSession) -> Option<Notice> {
    let n = session.units().len();
    match session.phase() {
        Phase::SequentialBase => Some(Notice::SequentialBase { length: n }),
        Phase::RandomFocus => Some(Notice::RandomFocus {
            length: session.random_focus_length(),
        }),
        Phase::SequentialFinal => Some(Notice::SequentialFinal { length: n }),
        Phase::BaseReview | Phase::Complete | Phase::Exited => None,
    }
}

/// A frontend replaying canned answers, for tests and demos.
///
/// When outcomes run out every further evaluation is `perfect`; when choices
/// run out the learner returns to selection.
#[derive(Debug, Default)]
pub struct ScriptedFrontend {
    outcomes: VecDeque<Outcome>,
    choices: VecDeque<SessionChoice>,
    /// Every prompt received, in order.
    pub prompts: Vec<EvaluationPrompt>,
    /// Every checkpoint received, in order.
    pub checkpoints: Vec<Checkpoint>,
    /// Every notice received, in order.
    pub notices: Vec<Notice>,
}

impl ScriptedFrontend {
    pub fn new(
        outcomes: impl IntoIterator<Item = Outcome>,
        choices: impl IntoIterator<Item = SessionChoice>,
    ) -> Self {
        Self {
            outcomes: outcomes.into_iter().collect(),
            choices: choices.into_iter().collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl DrillFrontend for ScriptedFrontend {
    async fn announce(&mut self, notice: Notice) -> Result<()> {
        self.notices.push(notice);
        Ok(())
    }

    async fn evaluate(&mut self, prompt: &EvaluationPrompt) -> Result<Outcome> {
        self.prompts.push(prompt.clone());
        Ok(self.outcomes.pop_front().unwrap_or(Outcome::Perfect))
    }

    async fn choose(&mut self, checkpoint: Checkpoint) -> Result<SessionChoice> {
        self.checkpoints.push(checkpoint);
        Ok(self
            .choices
            .pop_front()
            .unwrap_or(SessionChoice::ReturnToSelection))
    }
}
