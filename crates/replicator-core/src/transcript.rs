//! Transcript parser.
//!
//! A scene script is plain text: a header line listing comma-separated
//! speakers, followed by their lines, with blocks separated by blank lines.
//! Lines starting with `#` are comments. Parenthesized text is an inline
//! stage direction.

use std::collections::BTreeSet;

use crate::alias::AliasTable;
use crate::error::{ReplicatorError, Result};
use crate::model::{Block, Scene};

/// How strictly block headers are checked while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Reject stage-direction labels sharing a header, and speakerless headers.
    #[default]
    Strict,
    /// Keep mixed stage-direction headers; skip speakerless blocks with a warning.
    Lenient,
}

/// Remove every `(...)` span from `text`.
///
/// An unterminated `(` swallows the rest of the string.
pub fn strip_parentheticals(text: &str) -> String {
    let mut clean = String::with_capacity(text.len());
    let mut rest = text;
    while !rest.is_empty() {
        if let Some(inner) = rest.strip_prefix('(') {
            rest = match inner.find(')') {
                Some(end) => &inner[end + 1..],
                None => "",
            };
        } else {
            let begin = rest.find('(').unwrap_or(rest.len());
            clean.push_str(&rest[..begin]);
            rest = &rest[begin..];
        }
    }
    clean
}

/// Whether a line has nothing left to recite once stage directions are gone.
pub fn is_blank_line(text: &str) -> bool {
    strip_parentheticals(text).trim().is_empty()
}

/// Split a header line into its speaker labels.
pub fn parse_speakers(header: &str) -> Vec<String> {
    strip_parentheticals(header)
        .split(',')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the raw text of one scene.
pub fn parse_scene(name: &str, raw: &str, aliases: &AliasTable, mode: ParseMode) -> Result<Scene> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut awaiting_header = true;
    // Set while dropping the lines of a speakerless block in lenient mode.
    let mut skipping = false;

    for (index, raw_line) in raw.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() {
            awaiting_header = true;
            skipping = false;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        if awaiting_header {
            awaiting_header = false;
            let speakers = parse_speakers(line);

            let Some(first) = speakers.first() else {
                if mode == ParseMode::Strict {
                    return Err(ReplicatorError::InvalidBlock {
                        line: index + 1,
                        header: line.to_string(),
                        reason: "header names no speaker".into(),
                    });
                }
                tracing::warn!("{name}:{}: skipping block without speaker", index + 1);
                skipping = true;
                continue;
            };

            let stage_direction = aliases.is_stage_direction(first);
            if is_mixed_stage_direction(&speakers, aliases) {
                if mode == ParseMode::Strict {
                    return Err(ReplicatorError::InvalidBlock {
                        line: index + 1,
                        header: line.to_string(),
                        reason: format!("stage direction mixed with other labels {speakers:?}"),
                    });
                }
                tracing::warn!(
                    "{name}:{}: stage direction shares its header with other labels",
                    index + 1
                );
            }

            blocks.push(Block {
                speakers,
                lines: Vec::new(),
                header_text: line.to_string(),
                header_line: index + 1,
                stage_direction,
            });
        } else if !skipping {
            if let Some(block) = blocks.last_mut() {
                block.lines.push(line.to_string());
            }
        }
    }

    let characters: BTreeSet<String> = blocks
        .iter()
        .filter(|b| !b.stage_direction)
        .flat_map(|b| b.resolved_speakers(aliases))
        .map(str::to_string)
        .collect();

    tracing::debug!(
        "parsed scene {name:?}: {} blocks, {} characters",
        blocks.len(),
        characters.len()
    );

    Ok(Scene {
        name: name.to_string(),
        blocks,
        characters,
    })
}

/// A header listing several labels, at least one of them a stage direction.
fn is_mixed_stage_direction(speakers: &[String], aliases: &AliasTable) -> bool {
    speakers.len() > 1 && speakers.iter().any(|s| aliases.is_stage_direction(s))
}

/// Check that every speaker label of the scene is declared and that no
/// stage-direction label shares a header.
pub fn validate_scene(scene: &Scene, aliases: &AliasTable) -> Result<()> {
    for block in &scene.blocks {
        if is_mixed_stage_direction(&block.speakers, aliases) {
            return Err(ReplicatorError::InvalidBlock {
                line: block.header_line,
                header: block.header_text.clone(),
                reason: format!("invalid set of characters {:?}", block.speakers),
            });
        }
        if let Some(label) = block.speakers.iter().find(|s| !aliases.is_known(s)) {
            return Err(ReplicatorError::UnknownLabel {
                label: label.clone(),
                scene: scene.name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> AliasTable {
        AliasTable::new(
            &[vec!["ROMEO", "ROM"], vec!["JULIETTE", "JUL"]],
            &["DIDASCALIE"],
        )
        .unwrap()
    }

    const SCENE: &str = "\
# Acte II, scène 2

DIDASCALIE
Le jardin des Capulet.

ROM (à part)
Mais doucement ! Quelle lumière
(Il s'approche.)
brille à cette fenêtre ?

JULIETTE, ROMEO
Adieu !
";

    #[test]
    fn strip_removes_closed_spans() {
        assert_eq!(strip_parentheticals("a (b) c (d)e"), "a  c e");
        assert_eq!(strip_parentheticals("(tout bas)"), "");
        assert_eq!(strip_parentheticals("plain"), "plain");
    }

    #[test]
    fn strip_consumes_unterminated_span() {
        assert_eq!(strip_parentheticals("Oui (il sort"), "Oui ");
        assert_eq!(strip_parentheticals("(jamais fermé"), "");
    }

    #[test]
    fn strip_keeps_stray_closing_paren() {
        assert_eq!(strip_parentheticals("a) b"), "a) b");
    }

    #[test]
    fn parse_blocks_and_headers() {
        let scene = parse_scene("II-2", SCENE, &aliases(), ParseMode::Strict).unwrap();
        assert_eq!(scene.blocks.len(), 3);

        let direction = &scene.blocks[0];
        assert!(direction.stage_direction);
        assert_eq!(direction.lines, vec!["Le jardin des Capulet."]);

        let romeo = &scene.blocks[1];
        assert_eq!(romeo.speakers, vec!["ROM"]);
        assert_eq!(romeo.header_text, "ROM (à part)");
        assert_eq!(romeo.header_line, 6);
        assert_eq!(romeo.lines.len(), 3);

        assert_eq!(scene.blocks[2].speakers, vec!["JULIETTE", "ROMEO"]);
    }

    #[test]
    fn scene_characters_are_resolved_and_exclude_directions() {
        let scene = parse_scene("II-2", SCENE, &aliases(), ParseMode::Strict).unwrap();
        let characters: Vec<&str> = scene.characters.iter().map(String::as_str).collect();
        assert_eq!(characters, vec!["JULIETTE", "ROMEO"]);
    }

    #[test]
    fn comment_does_not_end_block() {
        let raw = "ROMEO\nun\n# note\ndeux\n";
        let scene = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap();
        assert_eq!(scene.blocks[0].lines, vec!["un", "deux"]);
    }

    #[test]
    fn header_without_lines_is_kept() {
        let raw = "ROMEO\n\nJULIETTE\nbonjour\n";
        let scene = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap();
        assert_eq!(scene.blocks.len(), 2);
        assert!(scene.blocks[0].lines.is_empty());
    }

    #[test]
    fn ensemble_stage_direction_is_rejected_in_strict_mode() {
        let raw = "DIDASCALIE, ROMEO\nIls dansent.\n";
        let err = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, ReplicatorError::InvalidBlock { line: 1, .. }));

        let scene = parse_scene("s", raw, &aliases(), ParseMode::Lenient).unwrap();
        assert_eq!(scene.blocks[0].speakers.len(), 2);
        assert!(scene.characters.is_empty());
    }

    #[test]
    fn speakerless_header() {
        let raw = "(silence)\nrien\n\nROMEO\nbonsoir\n";
        let err = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, ReplicatorError::InvalidBlock { line: 1, .. }));

        let scene = parse_scene("s", raw, &aliases(), ParseMode::Lenient).unwrap();
        assert_eq!(scene.blocks.len(), 1);
        assert_eq!(scene.blocks[0].lines, vec!["bonsoir"]);
    }

    #[test]
    fn validate_reports_unknown_labels() {
        let raw = "TYBALT\nEn garde !\n";
        let scene = parse_scene("III-1", raw, &aliases(), ParseMode::Strict).unwrap();
        let err = validate_scene(&scene, &aliases()).unwrap_err();
        assert_eq!(
            err,
            ReplicatorError::UnknownLabel {
                label: "TYBALT".into(),
                scene: "III-1".into()
            }
        );
    }

    #[test]
    fn stage_direction_after_a_character_is_rejected() {
        let raw = "ROMEO, DIDASCALIE\nIls sortent.\n";
        let err = parse_scene("s", raw, &aliases(), ParseMode::Strict).unwrap_err();
        assert!(matches!(err, ReplicatorError::InvalidBlock { line: 1, .. }));

        let scene = parse_scene("s", raw, &aliases(), ParseMode::Lenient).unwrap();
        let err = validate_scene(&scene, &aliases()).unwrap_err();
        match err {
            ReplicatorError::InvalidBlock { line, header, .. } => {
                assert_eq!(line, 1);
                assert_eq!(header, "ROMEO, DIDASCALIE");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_ensemble_stage_direction() {
        let raw = "DIDASCALIE, ROMEO\nIls dansent.\n";
        let scene = parse_scene("s", raw, &aliases(), ParseMode::Lenient).unwrap();
        assert!(matches!(
            validate_scene(&scene, &aliases()),
            Err(ReplicatorError::InvalidBlock { line: 1, .. })
        ));
    }

    #[test]
    fn validate_accepts_known_labels() {
        let scene = parse_scene("II-2", SCENE, &aliases(), ParseMode::Strict).unwrap();
        assert!(validate_scene(&scene, &aliases()).is_ok());
    }
}
