use std::fmt;

use crate::events::{EventBus, GameEvent, RemovedCell};

use super::{
    cell::{Cell, Occupant},
    color::Color,
    coord::{CoordMapper, GridPos, WorldPos},
    shape::PieceKind,
};

/// The playing field: a fixed `width × height` array of [`Cell`]s.
///
/// # Layout
///
/// - Row 0 is the floor, row `height - 1` is the top
/// - Cells are stored row-major from the floor up, so a row is a contiguous
///   slice
///
/// # Bounds policy
///
/// Occupancy queries are total over all integer coordinates:
///
/// | Region                          | `is_filled_at` | `is_empty_at` |
/// |---------------------------------|----------------|---------------|
/// | left/right of the walls         | `true`         | `false`       |
/// | below the floor                 | `true`         | `false`       |
/// | above the top (in column range) | `false`        | `true`        |
///
/// Pieces may therefore exist above the visible grid before they lock, but
/// can never pass through the walls or the floor.
///
/// # Notifications
///
/// Every mutation that changes the grid emits exactly one
/// [`GameEvent::GridChanged`] once it has completed. Use [`Self::batch`] to
/// group several mutations under a single notification.
///
/// # Example
///
/// ```
/// use stacker_engine::{Color, Grid, PieceKind};
///
/// let mut grid = Grid::new(10, 20);
/// assert!(grid.is_filled_at(-1, 0));
/// assert!(grid.is_empty_at(0, 25));
///
/// grid.set_filled(3, 0, PieceKind::L, Color::WHITE);
/// assert!(grid.is_filled_at(3, 0));
/// ```
#[derive(Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    mapper: CoordMapper,
    events: EventBus,
}

impl Grid {
    /// Largest accepted width or height.
    pub const MAX_DIMENSION: usize = 1024;

    /// Creates an empty grid using [`CoordMapper::UNIT`].
    ///
    /// # Panics
    ///
    /// Panics if a dimension is zero or exceeds [`Self::MAX_DIMENSION`].
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        assert!(
            (1..=Self::MAX_DIMENSION).contains(&width)
                && (1..=Self::MAX_DIMENSION).contains(&height),
            "invalid grid size {width}x{height}"
        );
        Self {
            width,
            height,
            cells: vec![Cell::Empty; width * height],
            mapper: CoordMapper::UNIT,
            events: EventBus::new(),
        }
    }

    #[must_use]
    pub fn with_mapper(mut self, mapper: CoordMapper) -> Self {
        self.mapper = mapper;
        self
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn mapper(&self) -> &CoordMapper {
        &self.mapper
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.events.subscribe(listener);
    }

    pub(crate) fn emit(&mut self, event: &GameEvent) {
        self.events.emit(event);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|x| *x < self.width)?;
        let y = usize::try_from(y).ok().filter(|y| *y < self.height)?;
        Some(y * self.width + x)
    }

    /// Returns `true` if `(x, y)` is inside the grid.
    #[must_use]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    fn is_blocking_region(&self, x: i32, y: i32) -> bool {
        !usize::try_from(x).is_ok_and(|x| x < self.width) || y < 0
    }

    #[must_use]
    pub fn is_filled_at(&self, x: i32, y: i32) -> bool {
        if self.is_blocking_region(x, y) {
            return true;
        }
        self.index(x, y)
            .is_some_and(|idx| self.cells[idx].is_filled())
    }

    #[must_use]
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        if self.is_blocking_region(x, y) {
            return false;
        }
        self.index(x, y).is_none_or(|idx| self.cells[idx].is_empty())
    }

    #[must_use]
    pub fn is_filled_at_world(&self, point: WorldPos) -> bool {
        let GridPos { x, y } = self.mapper.world_to_grid(point);
        self.is_filled_at(x, y)
    }

    #[must_use]
    pub fn is_empty_at_world(&self, point: WorldPos) -> bool {
        let GridPos { x, y } = self.mapper.world_to_grid(point);
        self.is_empty_at(x, y)
    }

    /// Returns the cell at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the grid. Callers bounds-check first.
    #[must_use]
    pub fn cell_at(&self, x: usize, y: usize) -> &Cell {
        assert!(
            x < self.width && y < self.height,
            "cell ({x}, {y}) out of bounds for {}x{} grid",
            self.width,
            self.height
        );
        &self.cells[y * self.width + x]
    }

    /// Returns the cells of row `y`, column-ascending.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[must_use]
    pub fn row_cells(&self, y: usize) -> &[Cell] {
        assert!(y < self.height, "row {y} out of bounds");
        &self.cells[y * self.width..][..self.width]
    }

    /// Iterates over the rows from the floor up.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Cell]> + ExactSizeIterator {
        self.cells.chunks_exact(self.width)
    }

    /// A row is full when every cell in it is filled.
    #[must_use]
    pub fn is_row_full(&self, y: usize) -> bool {
        self.row_cells(y).iter().all(Cell::is_filled)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_filled()).count()
    }

    /// Runs several mutations and notifies listeners once at the end.
    ///
    /// Cells removed inside the batch are reported in one
    /// [`GameEvent::CellsRemoved`] and then completed to empty, followed by
    /// one [`GameEvent::GridChanged`] if anything changed.
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut GridEditor<'_>) -> R) -> R {
        let mut editor = GridEditor {
            grid: self,
            changed: false,
            removed: Vec::new(),
        };
        let result = f(&mut editor);
        let GridEditor {
            changed, removed, ..
        } = editor;
        self.settle(changed, removed);
        result
    }

    fn settle(&mut self, changed: bool, removed: Vec<RemovedCell>) {
        if !removed.is_empty() {
            for cell in &mut self.cells {
                cell.complete_dying();
            }
            self.events.emit(&GameEvent::CellsRemoved { cells: removed });
        }
        if changed {
            self.events.emit(&GameEvent::GridChanged);
        }
    }

    /// Fills a cell with a typed occupant. No-op outside the grid.
    pub fn set_filled(&mut self, x: i32, y: i32, kind: PieceKind, color: Color) -> bool {
        self.batch(|e| e.set_filled(x, y, kind, color))
    }

    /// Fills a cell with a typeless occupant. No-op outside the grid.
    pub fn set_filled_plain(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.batch(|e| e.set_filled_plain(x, y, color))
    }

    pub fn set_filled_world(&mut self, point: WorldPos, kind: PieceKind, color: Color) -> bool {
        let GridPos { x, y } = self.mapper.world_to_grid(point);
        self.set_filled(x, y, kind, color)
    }

    /// Marks a filled cell as carrying a bonus. No-op outside the grid or on
    /// a cell that is not filled.
    pub fn mark_bonus(&mut self, x: i32, y: i32) -> bool {
        self.batch(|e| e.mark_bonus(x, y))
    }

    /// Removes a filled cell through the dying state. No-op outside the grid.
    pub fn set_empty(&mut self, x: i32, y: i32) -> bool {
        self.batch(|e| e.set_empty(x, y))
    }

    pub fn set_empty_world(&mut self, point: WorldPos) -> bool {
        let GridPos { x, y } = self.mapper.world_to_grid(point);
        self.set_empty(x, y)
    }

    /// Like [`Self::set_empty`], optionally dropping the bonus from the
    /// removal report so no reward is collected for it.
    pub fn remove_cell(&mut self, x: i32, y: i32, ignore_bonus: bool) -> bool {
        self.batch(|e| e.remove_cell(x, y, ignore_bonus))
    }

    /// Empties every cell. Removed occupants are reported with their bonus
    /// markers ignored.
    pub fn reset(&mut self) {
        self.batch(|e| {
            for y in 0..e.grid.height {
                for x in 0..e.grid.width {
                    e.force_empty_reporting(x, y);
                }
            }
        });
    }
}

impl fmt::Display for Grid {
    /// Renders the grid top row first: `.` empty, piece letter for typed
    /// cells, `#` for plain cells; bonus cells are lowercase (`+` if plain).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows().rev().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for cell in row {
                let c = match cell {
                    Cell::Empty => '.',
                    Cell::Dying(_) => 'x',
                    Cell::Filled(Occupant { kind, bonus, .. }) => match (kind, bonus) {
                        (Some(kind), false) => kind.as_char(),
                        (Some(kind), true) => kind.as_char().to_ascii_lowercase(),
                        (None, false) => '#',
                        (None, true) => '+',
                    },
                };
                write!(f, "{c}")?;
            }
        }
        Ok(())
    }
}

/// Mutable view of a [`Grid`] inside [`Grid::batch`].
///
/// Out-of-grid coordinates are silently ignored, including cells above the
/// top row: callers may pass speculative positions.
#[derive(Debug)]
pub struct GridEditor<'a> {
    grid: &'a mut Grid,
    changed: bool,
    removed: Vec<RemovedCell>,
}

impl GridEditor<'_> {
    /// Read access to the grid as mutated so far.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        self.grid
    }

    fn slot(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        let idx = self.grid.index(x, y)?;
        Some(&mut self.grid.cells[idx])
    }

    fn apply(&mut self, x: i32, y: i32, f: impl FnOnce(&mut Cell) -> bool) -> bool {
        let applied = self.slot(x, y).is_some_and(f);
        self.changed |= applied;
        applied
    }

    pub fn set_filled(&mut self, x: i32, y: i32, kind: PieceKind, color: Color) -> bool {
        self.apply(x, y, |cell| cell.set_filled(kind, color))
    }

    pub fn set_filled_plain(&mut self, x: i32, y: i32, color: Color) -> bool {
        self.apply(x, y, |cell| cell.set_filled_plain(color))
    }

    pub fn mark_bonus(&mut self, x: i32, y: i32) -> bool {
        self.apply(x, y, Cell::mark_bonus)
    }

    pub fn set_empty(&mut self, x: i32, y: i32) -> bool {
        self.remove_cell(x, y, false)
    }

    pub fn remove_cell(&mut self, x: i32, y: i32, ignore_bonus: bool) -> bool {
        let Some(mut occupant) = self.slot(x, y).and_then(Cell::clear) else {
            return false;
        };
        if ignore_bonus {
            occupant.bonus = false;
        }
        self.removed.push(RemovedCell {
            pos: GridPos::new(x, y),
            occupant,
        });
        self.changed = true;
        true
    }

    fn force_empty_reporting(&mut self, x: usize, y: usize) {
        let idx = y * self.grid.width + x;
        if let Some(mut occupant) = self.grid.cells[idx].force_empty() {
            occupant.bonus = false;
            #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let pos = GridPos::new(x as i32, y as i32);
            self.removed.push(RemovedCell { pos, occupant });
            self.changed = true;
        }
    }

    /// Copies the content of row `src` into row `dst`, column by column.
    pub(crate) fn copy_row(&mut self, src: usize, dst: usize) {
        let width = self.grid.width;
        self.grid
            .cells
            .copy_within(src * width..(src + 1) * width, dst * width);
        self.changed = true;
    }

    /// Empties row `y` without reporting removals.
    pub(crate) fn empty_row(&mut self, y: usize) {
        let width = self.grid.width;
        for cell in &mut self.grid.cells[y * width..][..width] {
            cell.force_empty();
        }
        self.changed = true;
    }
}

#[cfg(test)]
impl Grid {
    /// Builds a grid from text rows, top row first, using the `Display`
    /// alphabet. Every filled cell gets [`Color::WHITE`].
    pub(crate) fn from_text(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows[0].len();
        let mut grid = Self::new(width, height);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), width, "ragged row {i}");
            let y = height - 1 - i;
            for (x, c) in row.chars().enumerate() {
                let cell = &mut grid.cells[y * width + x];
                let kind = PieceKind::from_char(c.to_ascii_uppercase());
                match (c, kind) {
                    ('.', _) => {}
                    ('#', _) => _ = cell.set_filled_plain(Color::WHITE),
                    ('+', _) => {
                        cell.set_filled_plain(Color::WHITE);
                        cell.mark_bonus();
                    }
                    (c, Some(kind)) => {
                        cell.set_filled(kind, Color::WHITE);
                        if c.is_ascii_lowercase() {
                            cell.mark_bonus();
                        }
                    }
                    (c, None) => panic!("unexpected cell character {c:?}"),
                }
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use crate::events::EventLog;

    use super::*;

    const RED: Color = Color::rgb(0xff, 0, 0);

    fn logged(grid: &mut Grid) -> EventLog {
        let log = EventLog::new();
        grid.subscribe(log.listener());
        log
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = Grid::new(10, 4);
        assert_eq!(grid.width(), 10);
        assert_eq!(grid.height(), 4);
        assert_eq!(grid.rows().len(), 4);
        assert_eq!(grid.occupied_count(), 0);
        for y in 0..4 {
            for x in 0..10 {
                assert!(grid.cell_at(x, y).is_empty());
            }
        }
    }

    #[test]
    fn test_bounds_policy() {
        let grid = Grid::new(10, 4);
        for y in -3..10 {
            assert!(grid.is_filled_at(-1, y), "left wall at y={y}");
            assert!(grid.is_filled_at(10, y), "right wall at y={y}");
            assert!(!grid.is_empty_at(-1, y));
            assert!(!grid.is_empty_at(10, y));
        }
        for x in -2..12 {
            assert!(grid.is_filled_at(x, -1), "floor at x={x}");
            assert!(!grid.is_empty_at(x, -1));
        }
        for x in 0..10 {
            for y in 4..8 {
                assert!(grid.is_empty_at(x, y), "above top at ({x}, {y})");
                assert!(!grid.is_filled_at(x, y));
            }
        }
    }

    #[test]
    fn test_above_top_is_empty_regardless_of_content() {
        let mut grid = Grid::from_text(&["TTTTTTTTTT", "TTTTTTTTTT"]);
        assert!(grid.is_filled_at(0, 1));
        assert!(grid.is_empty_at(0, 2));
        assert!(!grid.set_filled(0, 2, PieceKind::I, RED));
        assert!(grid.is_empty_at(0, 2));
    }

    #[test]
    fn test_world_space_queries() {
        let mapper = CoordMapper::new(WorldPos::new(0.5, 0.5), WorldPos::new(-2.5, 0.0));
        let mut grid = Grid::new(10, 4).with_mapper(mapper);
        let point = WorldPos::new(-2.3, 0.2);
        assert!(grid.set_filled_world(point, PieceKind::S, RED));
        assert!(grid.cell_at(0, 0).is_filled());
        assert!(grid.is_filled_at_world(point));
        assert!(grid.is_filled_at_world(WorldPos::new(-2.6, 1.0)));
        assert!(grid.is_empty_at_world(WorldPos::new(0.0, 100.0)));
        assert!(grid.set_empty_world(point));
        assert!(grid.is_empty_at_world(point));
    }

    #[test]
    fn test_set_filled_notifies_once() {
        let mut grid = Grid::new(10, 4);
        let log = logged(&mut grid);
        assert!(grid.set_filled(2, 1, PieceKind::T, RED));
        assert_eq!(log.take(), vec![GameEvent::GridChanged]);
        assert_eq!(
            grid.cell_at(2, 1),
            &Cell::Filled(Occupant::typed(PieceKind::T, RED))
        );
    }

    #[test]
    fn test_out_of_bounds_mutation_is_silent_noop() {
        let mut grid = Grid::new(10, 4);
        let log = logged(&mut grid);
        assert!(!grid.set_filled(-1, 0, PieceKind::T, RED));
        assert!(!grid.set_filled(10, 0, PieceKind::T, RED));
        assert!(!grid.set_filled_plain(0, -1, RED));
        assert!(!grid.set_filled_plain(0, 4, RED));
        assert!(!grid.set_empty(0, 99));
        assert!(!grid.mark_bonus(-5, -5));
        assert!(log.is_empty());
        assert_eq!(grid.occupied_count(), 0);
    }

    #[test]
    fn test_set_empty_reports_removed_cell() {
        let mut grid = Grid::new(10, 4);
        grid.set_filled(4, 2, PieceKind::J, RED);
        grid.mark_bonus(4, 2);
        let log = logged(&mut grid);

        assert!(grid.set_empty(4, 2));
        let mut occupant = Occupant::typed(PieceKind::J, RED);
        occupant.bonus = true;
        assert_eq!(
            log.take(),
            vec![
                GameEvent::CellsRemoved {
                    cells: vec![RemovedCell {
                        pos: GridPos::new(4, 2),
                        occupant
                    }]
                },
                GameEvent::GridChanged,
            ]
        );
        // dying completed before anyone could observe it
        assert!(grid.cell_at(4, 2).is_empty());

        // removing an empty cell changes nothing
        assert!(!grid.set_empty(4, 2));
        assert!(log.is_empty());
    }

    #[test]
    fn test_remove_cell_ignoring_bonus() {
        let mut grid = Grid::from_text(&["..", "i."]);
        let log = logged(&mut grid);
        assert!(grid.remove_cell(0, 0, true));
        let events = log.take();
        let GameEvent::CellsRemoved { cells } = &events[0] else {
            panic!("unexpected events {events:?}");
        };
        assert!(!cells[0].occupant.bonus);
    }

    #[test]
    fn test_mark_bonus_only_on_filled() {
        let mut grid = Grid::new(3, 3);
        assert!(!grid.mark_bonus(1, 1));
        grid.set_filled_plain(1, 1, RED);
        assert!(grid.mark_bonus(1, 1));
        assert!(grid.cell_at(1, 1).occupant().unwrap().bonus);
    }

    #[test]
    fn test_batch_emits_single_notification() {
        let mut grid = Grid::new(10, 4);
        let log = logged(&mut grid);
        let written = grid.batch(|e| {
            let mut n = 0;
            for x in 0..4 {
                n += usize::from(e.set_filled(x, 0, PieceKind::I, RED));
            }
            assert_eq!(e.grid().occupied_count(), 4);
            n
        });
        assert_eq!(written, 4);
        assert_eq!(log.take(), vec![GameEvent::GridChanged]);
    }

    #[test]
    fn test_batch_without_changes_is_silent() {
        let mut grid = Grid::new(4, 4);
        let log = logged(&mut grid);
        grid.batch(|e| {
            e.set_empty(0, 0);
            e.set_filled(9, 9, PieceKind::O, RED);
        });
        assert!(log.is_empty());
    }

    #[test]
    fn test_reset_empties_everything_once() {
        let mut grid = Grid::from_text(&["..t.", "#IIO", "OOSS"]);
        let log = logged(&mut grid);
        grid.reset();
        assert_eq!(grid.occupied_count(), 0);

        let events = log.take();
        assert_eq!(events.len(), 2, "{events:?}");
        let GameEvent::CellsRemoved { cells } = &events[0] else {
            panic!("unexpected events {events:?}");
        };
        assert_eq!(cells.len(), 9);
        assert!(cells.iter().all(|c| !c.occupant.bonus));
        assert_eq!(events[1], GameEvent::GridChanged);
    }

    #[test]
    fn test_row_cells_column_ascending() {
        let grid = Grid::from_text(&["....", "IOSZ"]);
        let kinds: Vec<_> = grid
            .row_cells(0)
            .iter()
            .map(|c| c.occupant().and_then(|o| o.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(PieceKind::I),
                Some(PieceKind::O),
                Some(PieceKind::S),
                Some(PieceKind::Z)
            ]
        );
        assert!(grid.is_row_full(0));
        assert!(!grid.is_row_full(1));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_cell_at_out_of_bounds_panics() {
        let grid = Grid::new(10, 4);
        let _ = grid.cell_at(10, 0);
    }

    #[test]
    fn test_display_round_trip() {
        let rows = ["..t.", "#+IO", "OOSS"];
        let grid = Grid::from_text(&rows);
        assert_eq!(grid.to_string(), rows.join("\n"));
    }
}
