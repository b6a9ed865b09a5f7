//! Interactive terminal frontend for drill sessions.

use std::io::Write;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use replicator_core::engine::{Checkpoint, DrillFrontend, Notice};
use replicator_core::evaluation::{EvaluationFlow, EvaluationPrompt, FlowState};
use replicator_core::model::Outcome;
use replicator_core::scheduler::{Pass, SessionChoice};

use crate::render::{score_summary, write_entries};

/// Asks the learner through line-based input and prints to `output`.
pub struct TerminalFrontend<R, W> {
    input: R,
    output: W,
}

impl<R, W> TerminalFrontend<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Next answer, trimmed and lowercased, or `None` once input is closed.
    async fn read_answer(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .await
            .context("failed to read answer")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }

    /// Ask until `parse` accepts the answer.
    async fn ask<T: Send>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Option<T> + Send,
    ) -> Result<Option<T>> {
        loop {
            write!(self.output, "{question} ")?;
            self.output.flush()?;
            let Some(answer) = self.read_answer().await? else {
                writeln!(self.output)?;
                return Ok(None);
            };
            if let Some(value) = parse(&answer) {
                return Ok(Some(value));
            }
            writeln!(self.output, "Unrecognized answer {answer:?}.")?;
        }
    }

    fn input_closed() -> anyhow::Error {
        anyhow::anyhow!("input closed during evaluation")
    }
}

pub fn parse_yes_no(answer: &str) -> Option<bool> {
    match answer {
        "y" | "yes" | "o" | "oui" => Some(true),
        "n" | "no" | "non" => Some(false),
        _ => None,
    }
}

pub fn parse_choice(answer: &str) -> Option<SessionChoice> {
    match answer {
        "1" | "r" | "random" => Some(SessionChoice::RandomFocus),
        "2" | "f" | "final" => Some(SessionChoice::SequentialFinal),
        "3" | "q" | "back" => Some(SessionChoice::ReturnToSelection),
        _ => None,
    }
}

fn pass_label(pass: Pass) -> &'static str {
    match pass {
        Pass::Base => "base",
        Pass::RandomFocus => "random",
        Pass::Final => "final",
    }
}

#[async_trait]
impl<R, W> DrillFrontend for TerminalFrontend<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: Write + Send,
{
    async fn announce(&mut self, notice: Notice) -> Result<()> {
        let message = match notice {
            Notice::SequentialBase { length } => format!(
                "Sequential mode: your {length} line(s) in order, to measure where you stand."
            ),
            Notice::RandomFocus { length } => format!(
                "Random mode: {length} evaluations, weakest lines first."
            ),
            Notice::SequentialFinal { length } => format!(
                "Final mode: your {length} line(s) in order once more, to measure progress."
            ),
        };
        writeln!(self.output, "\n== {message}")?;
        Ok(())
    }

    async fn evaluate(&mut self, prompt: &EvaluationPrompt) -> Result<Outcome> {
        let request = prompt.request;
        writeln!(
            self.output,
            "\n[{} {}/{}]",
            pass_label(request.pass),
            request.progress + 1,
            request.length
        )?;
        write_entries(&mut self.output, prompt.cue())?;
        writeln!(self.output, "    ...")?;

        let mut flow = EvaluationFlow::new();
        loop {
            match flow.state() {
                FlowState::AwaitingRecall => {
                    let remembered = self
                        .ask("Do you remember the next line? [y/n]", parse_yes_no)
                        .await?
                        .ok_or_else(Self::input_closed)?;
                    flow.answer_recall(remembered)?;
                    writeln!(self.output, "    {}", prompt.target().unwrap_or_default())?;
                }
                FlowState::AwaitingSelfAssessment => {
                    let outcome = self
                        .ask("How did it go? [p]erfect/[a]lmost/[k]o", |a| {
                            a.parse::<Outcome>().ok()
                        })
                        .await?
                        .ok_or_else(Self::input_closed)?;
                    flow.self_assess(outcome)?;
                }
                FlowState::AwaitingAcknowledgment(_) => {
                    write!(self.output, "Say the line again, then press Enter.")?;
                    self.output.flush()?;
                    let mut line = String::new();
                    if self.input.read_line(&mut line).await? == 0 {
                        return Err(Self::input_closed());
                    }
                    flow.acknowledge()?;
                }
                FlowState::Done(outcome) => return Ok(outcome),
            }
        }
    }

    async fn choose(&mut self, checkpoint: Checkpoint) -> Result<SessionChoice> {
        match checkpoint {
            Checkpoint::BaseReview(base) => {
                writeln!(self.output, "\nBase pass: {}", score_summary(&base))?;
            }
            Checkpoint::Complete(comparison) => {
                let (perfect, almost, ko) = comparison.delta();
                writeln!(self.output, "\nBase pass: {}", score_summary(&comparison.base))?;
                writeln!(
                    self.output,
                    "Final pass: {}",
                    score_summary(&comparison.final_)
                )?;
                writeln!(
                    self.output,
                    "Progress: {perfect:+} perfect, {almost:+} almost, {ko:+} ko"
                )?;
            }
        }
        writeln!(self.output, "  1) random review of weak lines")?;
        writeln!(self.output, "  2) final pass")?;
        writeln!(self.output, "  3) back to selection")?;

        let choice = self.ask("Choice?", parse_choice).await?;
        Ok(choice.unwrap_or(SessionChoice::ReturnToSelection))
    }
}
