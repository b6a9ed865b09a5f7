//! Script statistics: how much text each character has to learn.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::alias::AliasTable;
use crate::config::Play;
use crate::model::Scene;
use crate::transcript::strip_parentheticals;

/// Text volume of one character in one scene (or a sum of scenes).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStats {
    pub lines: usize,
    pub words: usize,
    pub alphanum_chars: usize,
}

impl AddAssign for TextStats {
    fn add_assign(&mut self, other: Self) {
        self.lines += other.lines;
        self.words += other.words;
        self.alphanum_chars += other.alphanum_chars;
    }
}

/// Word and alphanumeric counts of one script line.
///
/// Inline stage directions are ignored and any non-alphanumeric character
/// separates words, so `"aujourd'hui"` counts as two words.
pub fn count_line(text: &str) -> (usize, usize) {
    let clean = strip_parentheticals(text);
    let words = clean
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .count();
    let alphanum = clean.chars().filter(|c| c.is_alphanumeric()).count();
    (words, alphanum)
}

/// Per-character statistics of one scene, keyed by main label.
///
/// Every main label of the table gets an entry, zero if the character does
/// not speak. A line counts once for each distinct character of its block.
pub fn scene_statistics(scene: &Scene, aliases: &AliasTable) -> BTreeMap<String, TextStats> {
    let mut stats: BTreeMap<String, TextStats> = aliases
        .main_labels()
        .iter()
        .map(|m| (m.clone(), TextStats::default()))
        .collect();

    for block in scene.blocks.iter().filter(|b| !b.stage_direction) {
        let mut speakers: Vec<&str> = block.resolved_speakers(aliases).collect();
        speakers.sort_unstable();
        speakers.dedup();

        let mut block_stats = TextStats::default();
        for line in &block.lines {
            let (words, alphanum_chars) = count_line(line);
            block_stats += TextStats {
                lines: 1,
                words,
                alphanum_chars,
            };
        }

        for speaker in speakers {
            if let Some(entry) = stats.get_mut(speaker) {
                *entry += block_stats;
            }
        }
    }
    stats
}

/// Statistics of one scene of a play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneStatistics {
    pub menu_name: String,
    /// `None` for scenes declared missing.
    pub characters: Option<BTreeMap<String, TextStats>>,
}

/// Statistics of every scene of a play, in menu order.
pub fn play_statistics(play: &Play) -> Vec<SceneStatistics> {
    play.scenes
        .iter()
        .map(|entry| SceneStatistics {
            menu_name: entry.menu_name.clone(),
            characters: entry
                .scene
                .as_ref()
                .map(|scene| scene_statistics(scene, &play.aliases)),
        })
        .collect()
}

/// Whole-play totals per character.
pub fn totals(scenes: &[SceneStatistics]) -> BTreeMap<String, TextStats> {
    let mut totals: BTreeMap<String, TextStats> = BTreeMap::new();
    for characters in scenes.iter().filter_map(|s| s.characters.as_ref()) {
        for (character, stats) in characters {
            *totals.entry(character.clone()).or_default() += *stats;
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{parse_scene, ParseMode};

    fn aliases() -> AliasTable {
        AliasTable::new(
            &[vec!["ROMEO", "ROM"], vec!["JULIETTE"], vec!["TYBALT"]],
            &["DIDASCALIE"],
        )
        .unwrap()
    }

    #[test]
    fn count_line_ignores_directions_and_punctuation() {
        assert_eq!(count_line("Bonjour, monde !"), (2, 12));
        assert_eq!(count_line("Aujourd'hui (il rit) oui"), (3, 13));
        assert_eq!(count_line("(seul)"), (0, 0));
        assert_eq!(count_line("Ô été"), (2, 4));
    }

    #[test]
    fn scene_statistics_per_character() {
        let raw = "\
DIDASCALIE
Une place publique.

ROM (à part)
Deux mots.
Trois petits mots.

JULIETTE, ROMEO
Adieu !
";
        let scene = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap();
        let stats = scene_statistics(&scene, &aliases());

        assert_eq!(
            stats["ROMEO"],
            TextStats {
                lines: 3,
                words: 6,
                alphanum_chars: 8 + 15 + 5,
            }
        );
        assert_eq!(
            stats["JULIETTE"],
            TextStats {
                lines: 1,
                words: 1,
                alphanum_chars: 5,
            }
        );
        assert_eq!(stats["TYBALT"], TextStats::default());
    }

    #[test]
    fn aliases_in_one_header_count_once() {
        let scene = parse_scene("s", "ROMEO, ROM\nOui.\n", &aliases(), ParseMode::Strict).unwrap();
        assert_eq!(scene_statistics(&scene, &aliases())["ROMEO"].lines, 1);
    }

    #[test]
    fn totals_sum_scenes() {
        let stats = |lines, words, alphanum_chars| TextStats {
            lines,
            words,
            alphanum_chars,
        };
        let scene = |name: &str, romeo: Option<TextStats>| SceneStatistics {
            menu_name: name.to_string(),
            characters: romeo.map(|s| BTreeMap::from([("ROMEO".to_string(), s)])),
        };
        let scenes = vec![
            scene("1", Some(stats(1, 2, 3))),
            scene("2", None),
            scene("3", Some(stats(4, 5, 6))),
        ];
        assert_eq!(totals(&scenes)["ROMEO"], stats(5, 7, 9));
    }
}
