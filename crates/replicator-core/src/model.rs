//! Core data model types for replicator.
//!
//! A scene is an ordered list of speech blocks; a drill unit points at one
//! line of one block; an outcome is the learner's verdict on one recitation.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;

/// A header line naming one or more speakers, followed by their lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Raw speaker labels, in header order. Never empty.
    pub speakers: Vec<String>,
    /// Non-blank text lines, in order. May be empty.
    pub lines: Vec<String>,
    /// The header line as written in the script.
    pub header_text: String,
    /// 1-based line number of the header in the source text.
    pub header_line: usize,
    /// Whether the first speaker is a stage-direction label.
    pub stage_direction: bool,
}

impl Block {
    /// Main labels of the speakers, skipping labels the table does not know.
    pub fn resolved_speakers<'a>(
        &'a self,
        aliases: &'a AliasTable,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.speakers.iter().filter_map(|s| aliases.resolve(s))
    }

    /// Whether `character` (a main label) speaks in this dialogue block.
    pub fn is_spoken_by(&self, aliases: &AliasTable, character: &str) -> bool {
        !self.stage_direction && self.resolved_speakers(aliases).any(|c| c == character)
    }
}

/// One parsed scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    /// Display name of the scene (menu name).
    pub name: String,
    /// Blocks in document order.
    pub blocks: Vec<Block>,
    /// Main labels of every character speaking in a dialogue block.
    pub characters: BTreeSet<String>,
}

impl Scene {
    pub fn has_character(&self, character: &str) -> bool {
        self.characters.contains(character)
    }

    /// Text of a drill unit, if it points inside the scene.
    pub fn line(&self, unit: DrillUnit) -> Option<&str> {
        self.blocks
            .get(unit.block_index)
            .and_then(|b| b.lines.get(unit.line_index))
            .map(String::as_str)
    }

    /// Total number of text lines across all blocks.
    pub fn line_count(&self) -> usize {
        self.blocks.iter().map(|b| b.lines.len()).sum()
    }
}

/// Position of one line inside a scene: `(block_index, line_index)`.
///
/// Ordering is document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DrillUnit {
    pub block_index: usize,
    pub line_index: usize,
}

impl DrillUnit {
    pub fn new(block_index: usize, line_index: usize) -> Self {
        Self {
            block_index,
            line_index,
        }
    }
}

impl fmt::Display for DrillUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.block_index, self.line_index)
    }
}

/// The learner's verdict on one recitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Perfect,
    Almost,
    Ko,
}

impl Outcome {
    pub const ALL: [Outcome; 3] = [Outcome::Perfect, Outcome::Almost, Outcome::Ko];
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Perfect => write!(f, "perfect"),
            Outcome::Almost => write!(f, "almost"),
            Outcome::Ko => write!(f, "ko"),
        }
    }
}

impl FromStr for Outcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "perfect" | "p" => Ok(Outcome::Perfect),
            "almost" | "a" => Ok(Outcome::Almost),
            "ko" | "k" => Ok(Outcome::Ko),
            other => Err(format!("unknown outcome: {other}")),
        }
    }
}
