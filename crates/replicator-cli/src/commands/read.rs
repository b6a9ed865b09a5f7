//! The `replicator read` command.

use std::path::PathBuf;

use anyhow::Result;

use replicator_core::config::load_play;
use replicator_core::evaluation::reading_view;

use crate::render::write_entries;

pub fn execute(play_path: PathBuf, scene_number: usize) -> Result<()> {
    let play = load_play(&play_path)?;
    let scene = play.scene(super::scene_index(scene_number)?)?;

    println!("{} - {}\n", play.name(), scene.name);
    let mut stdout = std::io::stdout().lock();
    write_entries(&mut stdout, &reading_view(scene))?;

    Ok(())
}
