//! The `replicator drill` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use tokio::io::BufReader;

use replicator_core::config::load_play;
use replicator_core::engine::{DrillEngine, DrillEngineConfig};
use replicator_core::model::Scene;
use replicator_core::report::SessionReport;
use replicator_core::scheduler::DrillSession;

use crate::frontend::TerminalFrontend;
use crate::render::{score_summary, truncate};

pub async fn execute(
    play_path: PathBuf,
    character: String,
    scene_number: usize,
    output: Option<PathBuf>,
) -> Result<()> {
    let play = load_play(&play_path)?;
    let character = play.resolve_character(&character)?;
    let index = super::scene_index(scene_number)?;
    let scene = play.scene(index)?;

    let session = DrillSession::new(scene, index, &play.aliases, character)?;
    println!(
        "{} - {} - {} ({} lines)",
        play.name(),
        scene.name,
        character,
        session.units().len()
    );

    let engine = DrillEngine::new(DrillEngineConfig {
        history_length: play.config.drill.history_length,
    });
    let mut frontend =
        TerminalFrontend::new(BufReader::new(tokio::io::stdin()), std::io::stdout());
    let report = engine
        .run(play.name(), scene, session, &mut frontend)
        .await?;

    print_report(&report, scene);

    if let Some(path) = output {
        report.save_json(&path)?;
        tracing::debug!("report {} written", report.id);
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn print_report(report: &SessionReport, scene: &Scene) {
    println!("\nSession summary for {}", report.character);
    println!("  base:  {}", score_summary(&report.base));
    if let Some(final_) = &report.final_ {
        println!("  final: {}", score_summary(final_));
    }
    println!(
        "  {} evaluations, {} random round(s)",
        report.evaluations, report.random_rounds
    );

    let mut table = Table::new();
    table.set_header(vec!["Line", "Perfect", "Almost", "Ko"]);
    for total in report.weakest(5) {
        table.add_row(vec![
            Cell::new(truncate(scene.line(total.unit).unwrap_or_default(), 50)),
            Cell::new(total.score.perfect),
            Cell::new(total.score.almost),
            Cell::new(total.score.ko),
        ]);
    }
    println!("\nWeakest lines:\n{table}");
}
