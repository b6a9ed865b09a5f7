//! Unit evaluation: cue context and the recall/self-assessment protocol.
//!
//! Before a line is recited the learner sees the few lines leading up to it
//! (the cue), walking backward across block boundaries. The target line
//! stays hidden until the learner says whether they remembered it.

use serde::{Deserialize, Serialize};

use crate::error::{ReplicatorError, Result};
use crate::model::{DrillUnit, Outcome, Scene};
use crate::scheduler::EvaluationRequest;

/// Number of lines shown for one evaluation, target included.
pub const HISTORY_LENGTH: usize = 4;

/// One element of a rendered context, in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextEntry {
    /// Start of a block (or of the visible part of one). Dialogue blocks
    /// carry their raw header; stage-direction blocks carry none.
    BlockStart { header: Option<String> },
    /// One script line. `distance` counts lines back from the newest one.
    Line {
        text: String,
        stage_direction: bool,
        distance: usize,
    },
}

/// Everything the collaborator needs to run one evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationPrompt {
    pub request: EvaluationRequest,
    pub context: Vec<ContextEntry>,
}

impl EvaluationPrompt {
    pub fn new(scene: &Scene, request: EvaluationRequest, history_length: usize) -> Self {
        Self {
            context: build_context(scene, request.unit, history_length),
            request,
        }
    }

    /// Text of the line to recite.
    pub fn target(&self) -> Option<&str> {
        self.context.iter().rev().find_map(|entry| match entry {
            ContextEntry::Line { text, .. } => Some(text.as_str()),
            ContextEntry::BlockStart { .. } => None,
        })
    }

    /// Context shown before the answer, i.e. everything but the target line.
    pub fn cue(&self) -> &[ContextEntry] {
        match self.context.last() {
            Some(ContextEntry::Line { .. }) => &self.context[..self.context.len() - 1],
            _ => &self.context,
        }
    }
}

/// Up to `history_length` lines ending at `unit`, oldest first, with a
/// [`ContextEntry::BlockStart`] wherever a block begins or the walk stops.
pub fn build_context(scene: &Scene, unit: DrillUnit, history_length: usize) -> Vec<ContextEntry> {
    walk_back(scene, Some(unit), Some(history_length.max(1)))
}

/// The whole scene in reading order.
pub fn reading_view(scene: &Scene) -> Vec<ContextEntry> {
    let last = scene
        .blocks
        .iter()
        .enumerate()
        .rev()
        .find_map(|(b, block)| block.lines.len().checked_sub(1).map(|l| DrillUnit::new(b, l)));
    walk_back(scene, last, None)
}

fn walk_back(scene: &Scene, start: Option<DrillUnit>, depth: Option<usize>) -> Vec<ContextEntry> {
    let mut entries = Vec::new();
    let mut position = start;
    let mut count = 0;

    while let Some(unit) = position {
        let Some(block) = scene.blocks.get(unit.block_index) else {
            break;
        };
        let Some(text) = block.lines.get(unit.line_index) else {
            break;
        };
        let exhausted = depth.is_some_and(|d| count + 1 >= d);

        entries.push(ContextEntry::Line {
            text: text.clone(),
            stage_direction: block.stage_direction,
            distance: count,
        });
        if unit.line_index == 0 || exhausted {
            entries.push(ContextEntry::BlockStart {
                header: (!block.stage_direction).then(|| block.header_text.clone()),
            });
        }

        count += 1;
        if exhausted {
            break;
        }
        position = previous_line(scene, unit);
    }

    entries.reverse();
    entries
}

/// The line just before `unit`, skipping blocks without lines.
fn previous_line(scene: &Scene, unit: DrillUnit) -> Option<DrillUnit> {
    if unit.line_index > 0 {
        return Some(DrillUnit::new(unit.block_index, unit.line_index - 1));
    }
    (0..unit.block_index).rev().find_map(|b| {
        scene.blocks[b]
            .lines
            .len()
            .checked_sub(1)
            .map(|l| DrillUnit::new(b, l))
    })
}

/// Where an evaluation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// "Do you remember what comes next?"
    AwaitingRecall,
    /// Target revealed; "how did it go?"
    AwaitingSelfAssessment,
    /// Imperfect answer; the learner repeats the line and confirms.
    AwaitingAcknowledgment(Outcome),
    Done(Outcome),
}

/// The recall / self-assessment / acknowledgment sequence for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationFlow {
    state: FlowState,
}

impl Default for EvaluationFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationFlow {
    pub fn new() -> Self {
        Self {
            state: FlowState::AwaitingRecall,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Whether the target line may be shown.
    pub fn reveals_target(&self) -> bool {
        self.state != FlowState::AwaitingRecall
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.state {
            FlowState::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// A "no" ends the evaluation as `ko` right away.
    pub fn answer_recall(&mut self, remembered: bool) -> Result<()> {
        self.expect(FlowState::AwaitingRecall, "answer the recall question")?;
        self.state = if remembered {
            FlowState::AwaitingSelfAssessment
        } else {
            FlowState::Done(Outcome::Ko)
        };
        Ok(())
    }

    pub fn self_assess(&mut self, outcome: Outcome) -> Result<()> {
        self.expect(FlowState::AwaitingSelfAssessment, "self-assess")?;
        self.state = match outcome {
            Outcome::Perfect => FlowState::Done(outcome),
            _ => FlowState::AwaitingAcknowledgment(outcome),
        };
        Ok(())
    }

    pub fn acknowledge(&mut self) -> Result<()> {
        match self.state {
            FlowState::AwaitingAcknowledgment(outcome) => {
                self.state = FlowState::Done(outcome);
                Ok(())
            }
            other => Err(ReplicatorError::InvalidTransition {
                state: format!("{other:?}"),
                action: "acknowledge".into(),
            }),
        }
    }

    fn expect(&self, expected: FlowState, action: &str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(ReplicatorError::InvalidTransition {
                state: format!("{:?}", self.state),
                action: action.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alias::AliasTable;
    use crate::scheduler::Pass;
    use crate::transcript::{parse_scene, ParseMode};

    const RAW: &str = "\
DIDASCALIE
Nuit.

A (bas)
a1
a2

B

B, A
b1
b2
b3
b4
";

    fn scene() -> Scene {
        let aliases = AliasTable::new(&[vec!["A"], vec!["B"]], &["DIDASCALIE"]).unwrap();
        parse_scene("s", RAW, &aliases, ParseMode::Strict).unwrap()
    }

    fn line(text: &str, stage_direction: bool, distance: usize) -> ContextEntry {
        ContextEntry::Line {
            text: text.into(),
            stage_direction,
            distance,
        }
    }

    fn header(h: &str) -> ContextEntry {
        ContextEntry::BlockStart {
            header: Some(h.into()),
        }
    }

    #[test]
    fn context_crosses_blocks_and_skips_empty_ones() {
        let context = build_context(&scene(), DrillUnit::new(3, 1), HISTORY_LENGTH);
        assert_eq!(
            context,
            vec![
                header("A (bas)"),
                line("a1", false, 3),
                line("a2", false, 2),
                header("B, A"),
                line("b1", false, 1),
                line("b2", false, 0),
            ]
        );
    }

    #[test]
    fn context_marks_stage_directions_without_header() {
        let context = build_context(&scene(), DrillUnit::new(1, 0), HISTORY_LENGTH);
        assert_eq!(
            context,
            vec![
                ContextEntry::BlockStart { header: None },
                line("Nuit.", true, 1),
                header("A (bas)"),
                line("a1", false, 0),
            ]
        );
    }

    #[test]
    fn exhausted_depth_inserts_speaker_marker() {
        let context = build_context(&scene(), DrillUnit::new(3, 3), 2);
        assert_eq!(
            context,
            vec![header("B, A"), line("b3", false, 1), line("b4", false, 0)]
        );
    }

    #[test]
    fn zero_depth_still_shows_target() {
        let context = build_context(&scene(), DrillUnit::new(3, 0), 0);
        assert_eq!(context, vec![header("B, A"), line("b1", false, 0)]);
    }

    #[test]
    fn prompt_splits_cue_and_target() {
        let request = EvaluationRequest {
            pass: Pass::Base,
            position: 0,
            unit: DrillUnit::new(1, 1),
            progress: 0,
            length: 1,
        };
        let prompt = EvaluationPrompt::new(&scene(), request, HISTORY_LENGTH);
        assert_eq!(prompt.target(), Some("a2"));
        assert_eq!(prompt.cue().len(), prompt.context.len() - 1);
        assert!(matches!(prompt.cue().last(), Some(ContextEntry::Line { text, .. }) if text == "a1"));
    }

    #[test]
    fn reading_view_covers_every_line() {
        let scene = scene();
        let view = reading_view(&scene);
        let lines = view
            .iter()
            .filter(|e| matches!(e, ContextEntry::Line { .. }))
            .count();
        assert_eq!(lines, scene.line_count());
        assert_eq!(view.first(), Some(&ContextEntry::BlockStart { header: None }));
        let blocks = view
            .iter()
            .filter(|e| matches!(e, ContextEntry::BlockStart { .. }))
            .count();
        assert_eq!(blocks, 3);
    }

    #[test]
    fn forgotten_line_is_ko_immediately() {
        let mut flow = EvaluationFlow::new();
        assert!(!flow.reveals_target());
        flow.answer_recall(false).unwrap();
        assert_eq!(flow.outcome(), Some(Outcome::Ko));
        assert!(flow.acknowledge().is_err());
    }

    #[test]
    fn perfect_recall_needs_no_acknowledgment() {
        let mut flow = EvaluationFlow::new();
        flow.answer_recall(true).unwrap();
        assert!(flow.reveals_target());
        flow.self_assess(Outcome::Perfect).unwrap();
        assert_eq!(flow.outcome(), Some(Outcome::Perfect));
    }

    #[test]
    fn imperfect_recall_waits_for_acknowledgment() {
        for outcome in [Outcome::Almost, Outcome::Ko] {
            let mut flow = EvaluationFlow::new();
            flow.answer_recall(true).unwrap();
            flow.self_assess(outcome).unwrap();
            assert_eq!(flow.state(), FlowState::AwaitingAcknowledgment(outcome));
            assert_eq!(flow.outcome(), None);
            flow.acknowledge().unwrap();
            assert_eq!(flow.outcome(), Some(outcome));
        }
    }

    #[test]
    fn out_of_order_answers_are_rejected() {
        let mut flow = EvaluationFlow::new();
        assert!(flow.self_assess(Outcome::Perfect).is_err());
        flow.answer_recall(true).unwrap();
        assert!(flow.answer_recall(true).is_err());
    }
}
