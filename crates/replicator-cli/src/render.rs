//! Plain-text rendering of script excerpts and scores.

use std::io::{self, Write};

use replicator_core::evaluation::ContextEntry;
use replicator_core::scoring::LineScore;

/// Write script entries the way they read on a page: speaker headers on
/// their own line, text indented, stage directions in brackets.
pub fn write_entries<W: Write>(out: &mut W, entries: &[ContextEntry]) -> io::Result<()> {
    for entry in entries {
        match entry {
            ContextEntry::BlockStart { header: Some(header) } => writeln!(out, "{header}")?,
            ContextEntry::BlockStart { header: None } => writeln!(out, "--")?,
            ContextEntry::Line {
                text,
                stage_direction: true,
                ..
            } => writeln!(out, "    [{text}]")?,
            ContextEntry::Line { text, .. } => writeln!(out, "    {text}")?,
        }
    }
    Ok(())
}

pub fn score_summary(score: &LineScore) -> String {
    format!(
        "{} perfect, {} almost, {} ko",
        score.perfect, score.almost, score.ko
    )
}

/// Shorten `text` to `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
