//! Character alias table.
//!
//! Every character is declared as a list of labels; the first one is its main
//! label. The table resolves any label to the main label and knows which
//! labels mark stage directions. Conflicts are rejected at construction.

use std::collections::{HashMap, HashSet};

use crate::error::{ReplicatorError, Result};

/// Bidirectional label lookup for one play.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    label_to_main: HashMap<String, String>,
    main_to_labels: HashMap<String, Vec<String>>,
    mains: Vec<String>,
    stage_directions: HashSet<String>,
}

impl AliasTable {
    /// Build the table from per-character label lists and stage-direction labels.
    ///
    /// Fails if a character has no labels or if any label is declared twice,
    /// whether within one character, across characters, or against a
    /// stage-direction label.
    pub fn new<S: AsRef<str>>(characters: &[Vec<S>], stage_directions: &[S]) -> Result<Self> {
        let mut owners: HashMap<String, String> = HashMap::new();
        let mut claim = |label: &str, owner: String| -> Result<()> {
            if let Some(first) = owners.get(label) {
                return Err(ReplicatorError::ConflictingLabel {
                    label: label.to_string(),
                    first: first.clone(),
                    second: owner,
                });
            }
            owners.insert(label.to_string(), owner);
            Ok(())
        };

        let mut table = AliasTable::default();

        for label in stage_directions {
            let label = label.as_ref();
            claim(label, "stage directions".to_string())?;
            table.stage_directions.insert(label.to_string());
        }

        for (index, labels) in characters.iter().enumerate() {
            let Some(main) = labels.first().map(|l| l.as_ref().to_string()) else {
                return Err(ReplicatorError::EmptyCharacter { index });
            };
            let mut aliases = Vec::with_capacity(labels.len());
            for label in labels {
                let label = label.as_ref();
                claim(label, format!("character {index}"))?;
                table.label_to_main.insert(label.to_string(), main.clone());
                aliases.push(label.to_string());
            }
            table.main_to_labels.insert(main.clone(), aliases);
            table.mains.push(main);
        }

        Ok(table)
    }

    /// Resolve a label to its character's main label.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.label_to_main.get(label).map(String::as_str)
    }

    /// All labels of a character, main label first.
    pub fn aliases_of(&self, main: &str) -> Option<&[String]> {
        self.main_to_labels.get(main).map(Vec::as_slice)
    }

    /// Main labels in declaration order.
    pub fn main_labels(&self) -> &[String] {
        &self.mains
    }

    pub fn is_main_label(&self, label: &str) -> bool {
        self.main_to_labels.contains_key(label)
    }

    pub fn is_stage_direction(&self, label: &str) -> bool {
        self.stage_directions.contains(label)
    }

    /// Whether the label is either a character alias or a stage direction.
    pub fn is_known(&self, label: &str) -> bool {
        self.label_to_main.contains_key(label) || self.stage_directions.contains(label)
    }
}
