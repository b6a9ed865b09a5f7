//! The `replicator scenes` command.

use std::path::PathBuf;

use anyhow::Result;

use replicator_core::config::load_play;

pub fn execute(play_path: PathBuf, character: Option<String>) -> Result<()> {
    let play = load_play(&play_path)?;

    let Some(label) = character else {
        for (index, entry) in play.scenes.iter().enumerate() {
            let status = if entry.scene.is_some() { "" } else { " (missing)" };
            println!("{:>3}. {}{status}", index + 1, entry.menu_name);
        }
        return Ok(());
    };

    let character = play.resolve_character(&label)?;
    let mut found = 0;
    for (index, scene) in play.scenes_for(character) {
        println!("{:>3}. {}", index + 1, scene.name);
        found += 1;
    }
    if found == 0 {
        println!("{character} does not speak in any available scene.");
    }

    Ok(())
}
