use crate::events::GameEvent;

use super::grid::Grid;

/// Removes full rows and compacts everything above them downward.
///
/// All removals and shifts happen inside one grid batch, so listeners see a
/// single [`GameEvent::CellsRemoved`] and a single [`GameEvent::GridChanged`],
/// followed by [`GameEvent::RowsCleared`] listing the removed row indices.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowClearer;

impl RowClearer {
    /// Clears every full row and returns their indices (ascending, as they
    /// were before compaction). Does nothing and emits nothing if no row is
    /// full.
    ///
    /// # Example
    ///
    /// ```
    /// use stacker_engine::{Color, Grid, RowClearer};
    ///
    /// let mut grid = Grid::new(2, 3);
    /// grid.set_filled_plain(0, 0, Color::WHITE);
    /// grid.set_filled_plain(1, 0, Color::WHITE);
    /// grid.set_filled_plain(0, 1, Color::WHITE);
    ///
    /// assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![0]);
    /// assert!(grid.is_filled_at(0, 0));
    /// assert!(grid.is_empty_at(0, 1));
    /// ```
    pub fn clear_full_rows(grid: &mut Grid) -> Vec<usize> {
        let full: Vec<usize> = (0..grid.height()).filter(|&y| grid.is_row_full(y)).collect();
        if full.is_empty() {
            return full;
        }

        grid.batch(|editor| {
            let width = editor.grid().width();
            let height = editor.grid().height();
            for &y in &full {
                for x in 0..width {
                    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                    let (x, y) = (x as i32, y as i32);
                    editor.set_empty(x, y);
                }
            }

            let mut dst = 0;
            for src in 0..height {
                if full.contains(&src) {
                    continue;
                }
                if src != dst {
                    editor.copy_row(src, dst);
                }
                dst += 1;
            }
            for y in dst..height {
                editor.empty_row(y);
            }
        });

        grid.emit(&GameEvent::RowsCleared { rows: full.clone() });
        full
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Color, PieceKind},
        events::EventLog,
    };

    fn logged(grid: &mut Grid) -> EventLog {
        let log = EventLog::new();
        grid.subscribe(log.listener());
        log
    }

    #[test]
    fn test_no_full_rows_is_silent() {
        let mut grid = Grid::from_text(&["....", "##.#"]);
        let log = logged(&mut grid);
        assert!(RowClearer::clear_full_rows(&mut grid).is_empty());
        assert!(log.is_empty());
        assert_eq!(grid.to_string(), "....\n##.#");
    }

    #[test]
    fn test_single_row_shifts_above_down() {
        let mut grid = Grid::from_text(&["....", ".T..", "##.#", "IIII"]);
        let log = logged(&mut grid);

        assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![0]);
        assert_eq!(grid.to_string(), "....\n....\n.T..\n##.#");

        let events = log.take();
        assert_eq!(events.len(), 3);
        let GameEvent::CellsRemoved { cells } = &events[0] else {
            panic!("expected CellsRemoved, got {:?}", events[0]);
        };
        assert_eq!(cells.len(), 4);
        assert!(cells.iter().all(|c| c.pos.y == 0));
        assert_eq!(events[1], GameEvent::GridChanged);
        assert_eq!(events[2], GameEvent::RowsCleared { rows: vec![0] });
    }

    #[test]
    fn test_direct_fill_of_bottom_row_clears() {
        let mut grid = Grid::new(10, 4);
        let color = Color::rgb(0x20, 0x40, 0x60);
        for x in 0..10 {
            assert!(grid.set_filled(x, 0, PieceKind::J, color));
        }
        assert!(grid.set_filled(4, 1, PieceKind::T, color));
        let before = grid.occupied_count();
        let log = logged(&mut grid);

        assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![0]);
        assert_eq!(grid.occupied_count(), before - 10);
        assert!(grid.cell_at(4, 0).is_filled());
        assert!(!grid.is_row_full(0));
        assert_eq!(log.count(GameEvent::is_grid_changed), 1);
    }

    #[test]
    fn test_non_adjacent_rows() {
        let mut grid = Grid::from_text(&["..O.", "SSSS", ".J..", "LLLL", "#..#"]);
        let log = logged(&mut grid);

        assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![1, 3]);
        // relative order of surviving rows is kept
        assert_eq!(grid.to_string(), "....\n....\n..O.\n.J..\n#..#");
        assert_eq!(log.count(GameEvent::is_grid_changed), 1);
        assert_eq!(log.count(GameEvent::is_cells_removed), 1);
    }

    #[test]
    fn test_every_row_full() {
        let mut grid = Grid::from_text(&["##", "##"]);
        assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![0, 1]);
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_top_row_full_leaves_fresh_empty_row() {
        let mut grid = Grid::from_text(&["ZZZ", "Z.."]);
        assert_eq!(RowClearer::clear_full_rows(&mut grid), vec![1]);
        assert_eq!(grid.to_string(), "...\nZ..");
    }

    #[test]
    fn test_bonus_survives_compaction() {
        let mut grid = Grid::from_text(&[".t", "##"]);
        RowClearer::clear_full_rows(&mut grid);
        let occupant = grid.cell_at(1, 0).occupant().copied().unwrap();
        assert!(occupant.bonus);
        assert_eq!(grid.to_string(), "..\n.t");
    }
}
