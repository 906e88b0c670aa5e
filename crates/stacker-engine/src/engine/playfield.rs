use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    MoveError, SpawnError,
    config::{ConfigError, GameConfig, default_spawn_anchor},
    core::{
        ActivePiece, Grid, GridPos, Palette, PieceKind, RotationDirection, RowClearer,
        ShapeTable, ShiftDirection, WorldPos,
    },
    events::GameEvent,
};

use super::motion::{Motion, Slide};

/// Player requests understood by [`Playfield::handle_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum InputCommand {
    ShiftLeft,
    ShiftRight,
    Drop,
    HardDrop,
    RotateCw,
    RotateCcw,
}

/// Result of moving the active piece one row down.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::IsVariant)]
pub enum DropOutcome {
    /// The piece moved down and is still falling.
    Moved,
    /// The piece was written into the grid; `cleared_rows` lists the rows
    /// the lock completed.
    Locked { cleared_rows: Vec<usize> },
}

/// The grid together with at most one falling piece.
///
/// Every request is validated against the grid before it changes anything:
/// a rejected shift or rotation leaves the piece exactly where it was.
/// Horizontal shifts commit the logical anchor immediately and start a
/// [`Slide`] for the presented position; a second shift is rejected until
/// that slide finishes.
///
/// Listeners registered with [`Self::subscribe`] receive grid and piece
/// events on one stream.
///
/// # Example
///
/// ```
/// use stacker_engine::{GameEvent, Grid, EventLog, Playfield, PieceKind};
///
/// let mut field = Playfield::new(Grid::new(10, 4));
/// let log = EventLog::new();
/// field.subscribe(log.listener());
///
/// field.spawn(PieceKind::I).unwrap();
/// field.hard_drop().unwrap();
///
/// assert!(field.active_piece().is_none());
/// assert_eq!(log.count(GameEvent::is_piece_locked), 1);
/// ```
#[derive(Debug)]
pub struct Playfield {
    grid: Grid,
    shapes: ShapeTable,
    palette: Palette,
    spawn_anchor: GridPos,
    slide_duration: Duration,
    piece: Option<ActivePiece>,
    motion: Motion,
}

impl Playfield {
    pub const DEFAULT_SLIDE_DURATION: Duration = Duration::from_millis(80);

    /// Creates a playfield over `grid` with the standard shapes and palette.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let spawn_anchor = default_spawn_anchor(grid.width(), grid.height());
        Self {
            grid,
            shapes: ShapeTable::STANDARD,
            palette: Palette::default(),
            spawn_anchor,
            slide_duration: Self::DEFAULT_SLIDE_DURATION,
            piece: None,
            motion: Motion::Idle,
        }
    }

    /// Validates `config` and builds the playfield it describes.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.build_grid())
            .with_shapes(config.shape_table()?)
            .with_palette(config.palette.clone())
            .with_spawn_anchor(config.spawn_anchor())
            .with_slide_duration(config.slide_duration()))
    }

    #[must_use]
    pub fn with_shapes(mut self, shapes: ShapeTable) -> Self {
        self.shapes = shapes;
        self
    }

    #[must_use]
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    #[must_use]
    pub fn with_spawn_anchor(mut self, anchor: GridPos) -> Self {
        self.spawn_anchor = anchor;
        self
    }

    /// A zero duration makes shifts take effect without a slide.
    #[must_use]
    pub fn with_slide_duration(mut self, duration: Duration) -> Self {
        self.slide_duration = duration;
        self
    }

    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&GameEvent) + 'static,
    {
        self.grid.subscribe(listener);
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn spawn_anchor(&self) -> GridPos {
        self.spawn_anchor
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&ActivePiece> {
        self.piece.as_ref()
    }

    #[must_use]
    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    /// Cells of the active piece, if any.
    #[must_use]
    pub fn piece_cells(&self) -> Option<[GridPos; 4]> {
        self.piece.map(|piece| piece.cells(&self.shapes))
    }

    /// Places a typed piece of `kind` at the spawn anchor.
    pub fn spawn(&mut self, kind: PieceKind) -> Result<(), SpawnError> {
        self.spawn_piece(ActivePiece::new(kind, self.spawn_anchor))
    }

    /// Places a typeless piece with the geometry of `shape`, painted with
    /// the palette's plain color.
    pub fn spawn_plain(&mut self, shape: PieceKind) -> Result<(), SpawnError> {
        self.spawn_piece(ActivePiece::plain(shape, self.palette.plain, self.spawn_anchor))
    }

    /// Makes `piece` the active piece.
    ///
    /// Fails if a piece is already falling, or if any of its cells is
    /// blocked; the latter also emits [`GameEvent::PieceOutOfBounds`].
    pub fn spawn_piece(&mut self, piece: ActivePiece) -> Result<(), SpawnError> {
        if self.piece.is_some() {
            return Err(SpawnError::AlreadyActive);
        }
        let kind = piece.shape();
        if piece.collides(&self.grid, &self.shapes) {
            self.grid.emit(&GameEvent::PieceOutOfBounds { kind });
            return Err(SpawnError::Blocked { kind });
        }
        self.piece = Some(piece);
        self.motion = Motion::Idle;
        self.grid.emit(&GameEvent::PieceSpawned { kind });
        Ok(())
    }

    fn current(&self) -> Result<ActivePiece, MoveError> {
        self.piece.ok_or(MoveError::NoActivePiece)
    }

    /// Moves the piece one column and starts the presented slide.
    pub fn attempt_shift(&mut self, direction: ShiftDirection) -> Result<(), MoveError> {
        let piece = self.current()?;
        if self.motion.is_sliding() {
            return Err(MoveError::SlideInProgress);
        }
        let target = piece.shifted(direction);
        if target.collides(&self.grid, &self.shapes) {
            return Err(MoveError::Collision);
        }

        let mapper = self.grid.mapper();
        let from = mapper.grid_to_world_center(piece.anchor());
        let to = match direction {
            ShiftDirection::Left => mapper.cell_center_left(from),
            ShiftDirection::Right => mapper.cell_center_right(from),
        };
        self.piece = Some(target);
        if !self.slide_duration.is_zero() {
            self.motion = Motion::Sliding(Slide::new(from, to, self.slide_duration));
            self.grid.emit(&GameEvent::SlideStarted { from, to });
        }
        Ok(())
    }

    /// Rotates the piece in place. There are no wall kicks.
    pub fn attempt_rotate(&mut self, direction: RotationDirection) -> Result<(), MoveError> {
        let target = self.current()?.rotated(direction);
        if target.collides(&self.grid, &self.shapes) {
            return Err(MoveError::Collision);
        }
        self.piece = Some(target);
        Ok(())
    }

    /// Moves the piece down one row, or locks it if it cannot move.
    pub fn attempt_drop(&mut self) -> Result<DropOutcome, MoveError> {
        let piece = self.current()?;
        let target = piece.dropped();
        if target.collides(&self.grid, &self.shapes) {
            return Ok(self.lock(piece));
        }
        self.piece = Some(target);
        Ok(DropOutcome::Moved)
    }

    /// Drops the piece until it locks.
    pub fn hard_drop(&mut self) -> Result<DropOutcome, MoveError> {
        let piece = self.current()?;
        let resting = piece.drop_position(&self.grid, &self.shapes);
        Ok(self.lock(resting))
    }

    /// Writes the piece into the grid and clears any rows it completes.
    ///
    /// Blocks resting above the top row are dropped; a board filled that
    /// high is detected by the next spawn.
    fn lock(&mut self, piece: ActivePiece) -> DropOutcome {
        self.piece = None;
        self.motion = Motion::Idle;

        let cells = piece.cells(&self.shapes);
        let palette = &self.palette;
        self.grid.batch(|editor| {
            for (block, pos) in cells.into_iter().enumerate() {
                let occupant = piece.occupant(block, palette);
                match occupant.kind {
                    Some(kind) => editor.set_filled(pos.x, pos.y, kind, occupant.color),
                    None => editor.set_filled_plain(pos.x, pos.y, occupant.color),
                };
                if occupant.bonus {
                    editor.mark_bonus(pos.x, pos.y);
                }
            }
        });

        self.grid.emit(&GameEvent::PieceLocked {
            kind: piece.occupant_kind(),
            cells,
        });
        let cleared_rows = RowClearer::clear_full_rows(&mut self.grid);
        DropOutcome::Locked { cleared_rows }
    }

    /// Advances the running slide by `dt`.
    pub fn tick(&mut self, dt: Duration) {
        if let Motion::Sliding(slide) = &mut self.motion
            && slide.advance(dt)
        {
            self.motion = Motion::Idle;
            self.grid.emit(&GameEvent::SlideFinished);
        }
    }

    /// Applies one command, discarding rejections.
    pub fn handle_input(&mut self, command: InputCommand) {
        match command {
            InputCommand::ShiftLeft => _ = self.attempt_shift(ShiftDirection::Left),
            InputCommand::ShiftRight => _ = self.attempt_shift(ShiftDirection::Right),
            InputCommand::RotateCw => _ = self.attempt_rotate(RotationDirection::Clockwise),
            InputCommand::RotateCcw => {
                _ = self.attempt_rotate(RotationDirection::CounterClockwise);
            }
            InputCommand::Drop => _ = self.attempt_drop(),
            InputCommand::HardDrop => _ = self.hard_drop(),
        }
    }

    /// Where the active piece would lock if dropped now.
    #[must_use]
    pub fn ghost_position(&self) -> Option<ActivePiece> {
        self.piece
            .map(|piece| piece.drop_position(&self.grid, &self.shapes))
    }

    /// World position of the active piece's anchor cell center, with the
    /// horizontal slide applied.
    #[must_use]
    pub fn presented_position(&self) -> Option<WorldPos> {
        let piece = self.piece?;
        let logical = self.grid.mapper().grid_to_world_center(piece.anchor());
        Some(match self.motion.slide() {
            Some(slide) => WorldPos::new(slide.position().x, logical.y),
            None => logical,
        })
    }

    /// Empties the grid and discards the active piece.
    pub fn reset(&mut self) {
        self.piece = None;
        self.motion = Motion::Idle;
        self.grid.reset();
    }
}
