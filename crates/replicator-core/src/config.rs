//! Play configuration and loading.
//!
//! A play is described by a `replicator.toml` file listing the
//! stage-direction labels, the characters with their aliases, and the scene
//! scripts. Loading a play validates the labels, parses every available
//! scene and checks that each speaker label is declared.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::error::ReplicatorError;
use crate::evaluation::HISTORY_LENGTH;
use crate::model::Scene;
use crate::transcript::{parse_scene, validate_scene, ParseMode};

/// Default file name of a play configuration.
pub const CONFIG_FILE_NAME: &str = "replicator.toml";

/// Top-level play configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayConfig {
    pub play_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub stage_directions: StageDirections,
    #[serde(default)]
    pub characters: Vec<CharacterConfig>,
    #[serde(default)]
    pub scenes: Vec<SceneConfig>,
    #[serde(default)]
    pub drill: DrillSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDirections {
    #[serde(default)]
    pub labels: Vec<String>,
}

/// One character; the first label is the main label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterConfig {
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneConfig {
    /// Name shown in scene menus.
    pub menu_name: String,
    /// Script path, relative to the configuration file.
    pub file_path: PathBuf,
    /// Listed in menus but not loadable.
    #[serde(default)]
    pub missing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillSettings {
    /// Lines of cue shown per evaluation, target included.
    #[serde(default = "default_history_length")]
    pub history_length: usize,
}

fn default_history_length() -> usize {
    HISTORY_LENGTH
}

impl Default for DrillSettings {
    fn default() -> Self {
        Self {
            history_length: default_history_length(),
        }
    }
}

impl PlayConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("failed to parse play configuration")
    }

    /// Build the alias table, rejecting labels declared twice.
    pub fn alias_table(&self) -> std::result::Result<AliasTable, ReplicatorError> {
        let characters: Vec<Vec<&str>> = self
            .characters
            .iter()
            .map(|c| c.labels.iter().map(String::as_str).collect())
            .collect();
        let stage_directions: Vec<&str> = self
            .stage_directions
            .labels
            .iter()
            .map(String::as_str)
            .collect();
        AliasTable::new(&characters, &stage_directions)
    }
}

/// One entry of the scene menu.
#[derive(Debug, Clone)]
pub struct PlayScene {
    pub menu_name: String,
    pub path: PathBuf,
    /// `None` for scenes declared missing.
    pub scene: Option<Scene>,
}

/// A loaded and validated play.
#[derive(Debug, Clone)]
pub struct Play {
    pub config: PlayConfig,
    pub aliases: AliasTable,
    pub scenes: Vec<PlayScene>,
}

impl Play {
    /// Build a play from its configuration, fetching each available scene
    /// script through `read`.
    pub fn build<F>(config: PlayConfig, base_dir: &Path, mut read: F) -> Result<Self>
    where
        F: FnMut(&Path) -> Result<String>,
    {
        let aliases = config.alias_table()?;

        let mut scenes = Vec::with_capacity(config.scenes.len());
        for entry in &config.scenes {
            let path = base_dir.join(&entry.file_path);
            let scene = if entry.missing {
                tracing::debug!("scene {:?} is marked missing", entry.menu_name);
                None
            } else {
                let raw = read(&path)?;
                let scene = parse_scene(&entry.menu_name, &raw, &aliases, ParseMode::Strict)
                    .with_context(|| format!("failed to parse scene {}", path.display()))?;
                validate_scene(&scene, &aliases)?;
                Some(scene)
            };
            scenes.push(PlayScene {
                menu_name: entry.menu_name.clone(),
                path,
                scene,
            });
        }

        tracing::info!(
            "loaded {:?}: {} characters, {} scenes",
            config.play_name,
            aliases.main_labels().len(),
            scenes.len()
        );

        Ok(Self {
            config,
            aliases,
            scenes,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.play_name
    }

    /// Main labels, in declaration order.
    pub fn characters(&self) -> &[String] {
        self.aliases.main_labels()
    }

    /// The loaded scene at `index`.
    pub fn scene(&self, index: usize) -> std::result::Result<&Scene, ReplicatorError> {
        let entry = self
            .scenes
            .get(index)
            .ok_or(ReplicatorError::SceneOutOfRange {
                index,
                count: self.scenes.len(),
            })?;
        entry
            .scene
            .as_ref()
            .ok_or_else(|| ReplicatorError::MissingScene {
                name: entry.menu_name.clone(),
            })
    }

    /// Scenes where `character` speaks, with their menu index.
    pub fn scenes_for<'a>(
        &'a self,
        character: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Scene)> + 'a {
        self.scenes
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| entry.scene.as_ref().map(|s| (i, s)))
            .filter(move |(_, scene)| scene.has_character(character))
    }

    /// Resolve any label of a character to its main label.
    pub fn resolve_character(&self, label: &str) -> std::result::Result<&str, ReplicatorError> {
        self.aliases
            .resolve(label)
            .ok_or_else(|| ReplicatorError::UnknownCharacter(label.to_string()))
    }
}

/// Load a play from its configuration file.
pub fn load_play(path: &Path) -> Result<Play> {
    if !path.exists() {
        anyhow::bail!("play configuration not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = PlayConfig::from_toml_str(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    Play::build(config, base_dir, |scene_path| {
        std::fs::read_to_string(scene_path)
            .with_context(|| format!("failed to read scene: {}", scene_path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
play_name = "Roméo et Juliette"
version = "1"

[stage_directions]
labels = ["DIDASCALIE"]

[[characters]]
labels = ["ROMEO", "ROM"]

[[characters]]
labels = ["JULIETTE"]

[[scenes]]
menu_name = "Acte I"
file_path = "scenes/1.txt"

[[scenes]]
menu_name = "Acte II"
file_path = "scenes/2.txt"
missing = true

[[scenes]]
menu_name = "Acte III"
file_path = "scenes/3.txt"
"#;

    fn play_with(scene_one: &str, scene_three: &str) -> Result<Play> {
        let config = PlayConfig::from_toml_str(CONFIG)?;
        Play::build(config, Path::new("/plays/rj"), |path| {
            if path.ends_with("1.txt") {
                Ok(scene_one.to_string())
            } else if path.ends_with("3.txt") {
                Ok(scene_three.to_string())
            } else {
                anyhow::bail!("unexpected read of {}", path.display())
            }
        })
    }

    #[test]
    fn parse_config_with_defaults() {
        let config = PlayConfig::from_toml_str(CONFIG).unwrap();
        assert_eq!(config.characters.len(), 2);
        assert_eq!(config.stage_directions.labels, vec!["DIDASCALIE"]);
        assert!(config.scenes[1].missing);
        assert!(!config.scenes[0].missing);
        assert_eq!(config.drill.history_length, 4);
    }

    #[test]
    fn drill_settings_override() {
        let raw = "play_name = \"x\"\n[drill]\nhistory_length = 6\n";
        let config = PlayConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.drill.history_length, 6);
        assert!(config.scenes.is_empty());
    }

    #[test]
    fn build_play_skips_missing_scenes() {
        let play = play_with("ROM\nBonsoir.\n", "JULIETTE\nAdieu.\n").unwrap();
        assert_eq!(play.name(), "Roméo et Juliette");
        assert_eq!(play.characters(), &["ROMEO", "JULIETTE"]);
        assert_eq!(play.scenes.len(), 3);
        assert!(play.scenes[1].scene.is_none());
        assert_eq!(play.scenes[0].path, Path::new("/plays/rj/scenes/1.txt"));

        let romeo: Vec<usize> = play.scenes_for("ROMEO").map(|(i, _)| i).collect();
        assert_eq!(romeo, vec![0]);
        let juliette: Vec<usize> = play.scenes_for("JULIETTE").map(|(i, _)| i).collect();
        assert_eq!(juliette, vec![2]);
    }

    #[test]
    fn scene_lookup_errors() {
        let play = play_with("ROM\nBonsoir.\n", "JULIETTE\nAdieu.\n").unwrap();
        assert!(play.scene(0).is_ok());
        assert_eq!(
            play.scene(1).unwrap_err(),
            ReplicatorError::MissingScene {
                name: "Acte II".into()
            }
        );
        assert_eq!(
            play.scene(5).unwrap_err(),
            ReplicatorError::SceneOutOfRange { index: 5, count: 3 }
        );
    }

    #[test]
    fn resolve_character_accepts_aliases() {
        let play = play_with("ROM\nBonsoir.\n", "JULIETTE\nAdieu.\n").unwrap();
        assert_eq!(play.resolve_character("ROM").unwrap(), "ROMEO");
        assert!(play.resolve_character("TYBALT").is_err());
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let config = PlayConfig::from_toml_str(
            r#"
play_name = "x"
[stage_directions]
labels = ["DIDASCALIE"]
[[characters]]
labels = ["A", "DIDASCALIE"]
"#,
        )
        .unwrap();
        let err = Play::build(config, Path::new("."), |_| Ok(String::new())).unwrap_err();
        assert!(err.to_string().contains("present twice"));
    }

    #[test]
    fn unknown_speaker_is_rejected() {
        let err = play_with("TYBALT\nEn garde.\n", "JULIETTE\nAdieu.\n").unwrap_err();
        let root = err.downcast_ref::<ReplicatorError>();
        assert!(matches!(root, Some(ReplicatorError::UnknownLabel { .. })));
    }

    #[test]
    fn malformed_scene_reports_path() {
        let err = play_with("DIDASCALIE, ROM\nIls sortent.\n", "JULIETTE\nAdieu.\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("scenes/1.txt"));
        assert!(message.contains("invalid block at line 1"));
    }

    #[test]
    fn stage_direction_in_any_header_position_is_rejected() {
        let err = play_with("ROMEO\nBonsoir.\n", "ROM, DIDASCALIE\nIls sortent.\n").unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("scenes/3.txt"));
        assert!(message.contains("invalid block at line 1"));
    }

    #[test]
    fn load_play_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("scenes")).unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE_NAME), CONFIG).unwrap();
        std::fs::write(dir.path().join("scenes/1.txt"), "ROMEO\nBonsoir.\n").unwrap();
        std::fs::write(dir.path().join("scenes/3.txt"), "JULIETTE\nAdieu.\n").unwrap();

        let play = load_play(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(play.scene(2).unwrap().line_count(), 1);
    }

    #[test]
    fn load_play_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_play(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
