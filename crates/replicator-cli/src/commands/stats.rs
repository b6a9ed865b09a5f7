//! The `replicator stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use replicator_core::config::load_play;
use replicator_core::statistics::{play_statistics, totals, TextStats};

pub fn execute(play_path: PathBuf) -> Result<()> {
    let play = load_play(&play_path)?;
    let scenes = play_statistics(&play);

    let mut header = vec![Cell::new("Scene")];
    header.extend(play.characters().iter().map(Cell::new));

    let mut table = Table::new();
    table.set_header(header);

    for scene in &scenes {
        let mut row = vec![Cell::new(&scene.menu_name)];
        for character in play.characters() {
            let text = match &scene.characters {
                Some(stats) => format_stats(stats.get(character).copied().unwrap_or_default()),
                None => "missing".to_string(),
            };
            row.push(Cell::new(text));
        }
        table.add_row(row);
    }

    let totals = totals(&scenes);
    let mut row = vec![Cell::new("Total")];
    for character in play.characters() {
        row.push(Cell::new(format_stats(
            totals.get(character).copied().unwrap_or_default(),
        )));
    }
    table.add_row(row);

    println!("{}", play.name());
    println!("{table}");
    println!("(lines / words / alphanumeric characters)");

    Ok(())
}

fn format_stats(stats: TextStats) -> String {
    format!("{} / {} / {}", stats.lines, stats.words, stats.alphanum_chars)
}
