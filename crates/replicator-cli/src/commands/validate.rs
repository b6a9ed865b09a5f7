//! The `replicator validate` command.

use std::path::PathBuf;

use anyhow::Result;

use replicator_core::config::load_play;

pub fn execute(play_path: PathBuf) -> Result<()> {
    let play = load_play(&play_path)?;

    println!(
        "Play: {} ({} characters, {} scenes)",
        play.name(),
        play.characters().len(),
        play.scenes.len()
    );

    let mut missing = 0;
    for entry in &play.scenes {
        match &entry.scene {
            Some(scene) => {
                let characters: Vec<&str> = scene.characters.iter().map(String::as_str).collect();
                println!(
                    "  {}: {} blocks, {} lines ({})",
                    entry.menu_name,
                    scene.blocks.len(),
                    scene.line_count(),
                    characters.join(", ")
                );
            }
            None => {
                println!("  {}: missing", entry.menu_name);
                missing += 1;
            }
        }
    }

    if missing == 0 {
        println!("Play is valid.");
    } else {
        println!("Play is valid ({missing} missing scene(s)).");
    }

    Ok(())
}
