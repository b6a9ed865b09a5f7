//! Session report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::DrillUnit;
use crate::scheduler::{DrillSession, Phase};
use crate::scoring::{Comparison, LineScore};

/// What happened during one drill session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    /// Unique report identifier.
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub play: String,
    pub scene: String,
    pub scene_index: usize,
    pub character: String,
    /// Base-pass summary.
    pub base: LineScore,
    /// Summary of the last final pass, if one completed.
    #[serde(rename = "final")]
    pub final_: Option<LineScore>,
    /// Seed derived from the base pass.
    pub seed: u64,
    pub random_rounds: u32,
    /// Evaluations performed across all passes.
    pub evaluations: usize,
    /// Running totals per drill unit, in document order.
    pub totals: Vec<UnitTotal>,
}

/// Running total of one drill unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitTotal {
    pub unit: DrillUnit,
    pub score: LineScore,
}

impl SessionReport {
    pub fn from_session(
        play: &str,
        scene: &str,
        session: &DrillSession,
        evaluations: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        let totals = session
            .units()
            .iter()
            .zip(session.totals().as_slice())
            .map(|(unit, score)| UnitTotal {
                unit: *unit,
                score: *score,
            })
            .collect();

        // An unfinished final pass has no meaningful summary.
        let final_ = session
            .final_scores()
            .filter(|_| session.phase() != Phase::SequentialFinal)
            .map(|s| s.summarize());

        Self {
            id: Uuid::new_v4(),
            started_at,
            finished_at: Utc::now(),
            play: play.to_string(),
            scene: scene.to_string(),
            scene_index: session.scene_index(),
            character: session.character().to_string(),
            base: session.base_scores().summarize(),
            final_,
            seed: session.seed(),
            random_rounds: session.random_rounds(),
            evaluations,
            totals,
        }
    }

    /// Base versus final, when a final pass completed.
    pub fn comparison(&self) -> Option<Comparison> {
        self.final_.map(|final_| Comparison {
            base: self.base,
            final_,
        })
    }

    /// The `count` weakest units: fewest perfect first, then fewest almost,
    /// then fewest ko, ties in document order.
    pub fn weakest(&self, count: usize) -> Vec<&UnitTotal> {
        let mut sorted: Vec<&UnitTotal> = self.totals.iter().collect();
        sorted.sort_by_key(|t| (t.score.as_tuple(), t.unit));
        sorted.truncate(count);
        sorted
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: SessionReport = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse report from {}", path.display()))?;
        Ok(report)
    }
}
