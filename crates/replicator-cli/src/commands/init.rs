//! The `replicator init` command.

use std::path::Path;

use anyhow::Result;

use replicator_core::config::CONFIG_FILE_NAME;

pub fn execute() -> Result<()> {
    if Path::new(CONFIG_FILE_NAME).exists() {
        println!("{CONFIG_FILE_NAME} already exists, skipping.");
    } else {
        std::fs::write(CONFIG_FILE_NAME, SAMPLE_CONFIG)?;
        println!("Created {CONFIG_FILE_NAME}");
    }

    std::fs::create_dir_all("scenes")?;
    let scene_path = Path::new("scenes/balcon.txt");
    if scene_path.exists() {
        println!("scenes/balcon.txt already exists, skipping.");
    } else {
        std::fs::write(scene_path, SAMPLE_SCENE)?;
        println!("Created scenes/balcon.txt");
    }

    println!("\nNext steps:");
    println!("  1. Replace the sample scene with your own script");
    println!("  2. Run: replicator validate");
    println!("  3. Run: replicator drill --character ROMEO --scene 1");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# replicator play configuration

play_name = "Roméo et Juliette"
version = "1"

[stage_directions]
labels = ["DIDASCALIE"]

# The first label of each character is its main label.
[[characters]]
labels = ["ROMEO", "ROM"]

[[characters]]
labels = ["JULIETTE", "JUL"]

[[scenes]]
menu_name = "Acte II, scène 2"
file_path = "scenes/balcon.txt"

[[scenes]]
menu_name = "Acte V, scène 3"
file_path = "scenes/crypte.txt"
missing = true

[drill]
history_length = 4
"#;

const SAMPLE_SCENE: &str = "\
# Acte II, scène 2

DIDASCALIE
Le jardin des Capulet.

ROMEO
Il se rit des plaies, celui qui n'a jamais reçu de blessure.
(Juliette paraît à une fenêtre.)
Mais doucement ! Quelle lumière brille à cette fenêtre ?

JULIETTE
Hélas !

ROM (à part)
Elle parle.

JUL
Ô Roméo, Roméo ! Pourquoi es-tu Roméo ?
";
