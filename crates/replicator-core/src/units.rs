//! Drill unit selection.

use crate::alias::AliasTable;
use crate::model::{DrillUnit, Scene};
use crate::transcript::is_blank_line;

/// Lines of `scene` that `character` (a main label) has to recite, in
/// document order.
///
/// A line qualifies when its block is a dialogue block spoken by the
/// character and the line still has text once inline stage directions are
/// removed.
pub fn select_units(scene: &Scene, aliases: &AliasTable, character: &str) -> Vec<DrillUnit> {
    scene
        .blocks
        .iter()
        .enumerate()
        .filter(|(_, block)| block.is_spoken_by(aliases, character))
        .flat_map(|(block_index, block)| {
            block
                .lines
                .iter()
                .enumerate()
                .filter(|(_, line)| !is_blank_line(line))
                .map(move |(line_index, _)| DrillUnit::new(block_index, line_index))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{parse_scene, ParseMode};

    fn aliases() -> AliasTable {
        AliasTable::new(&[vec!["A", "ALPHA"], vec!["B"]], &["DIDASCALIE"]).unwrap()
    }

    const RAW: &str = "\
A
one
(pause)
two

B
three

DIDASCALIE
A walks away.

ALPHA, B
four
   (  )

B
five
";

    fn scene() -> Scene {
        parse_scene("s", RAW, &aliases(), ParseMode::Strict).unwrap()
    }

    #[test]
    fn selects_lines_through_aliases() {
        let units = select_units(&scene(), &aliases(), "A");
        assert_eq!(
            units,
            vec![
                DrillUnit::new(0, 0),
                DrillUnit::new(0, 2),
                DrillUnit::new(3, 0)
            ]
        );
    }

    #[test]
    fn blank_after_stripping_is_excluded() {
        let scene = scene();
        let units = select_units(&scene, &aliases(), "A");
        for unit in &units {
            assert!(!is_blank_line(scene.line(*unit).unwrap()));
        }
        assert!(!units.contains(&DrillUnit::new(0, 1)));
        assert!(!units.contains(&DrillUnit::new(3, 1)));
    }

    #[test]
    fn units_are_strictly_increasing() {
        let units = select_units(&scene(), &aliases(), "B");
        assert_eq!(units.len(), 3);
        assert!(units.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn stage_directions_and_strangers_yield_nothing() {
        assert!(select_units(&scene(), &aliases(), "DIDASCALIE").is_empty());
        assert!(select_units(&scene(), &aliases(), "C").is_empty());
    }
}
