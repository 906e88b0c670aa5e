use super::{
    cell::Occupant,
    color::{Color, Palette},
    coord::GridPos,
    grid::Grid,
    shape::{PieceKind, Rotation, ShapeTable},
};

/// How a piece's blocks are colored once they land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Paint {
    /// Blocks keep the piece type and take the palette color for it.
    Typed,
    /// Blocks are typeless decorative fills of the given color.
    Plain(Color),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftDirection {
    Left,
    Right,
}

impl ShiftDirection {
    const fn dx(self) -> i32 {
        match self {
            ShiftDirection::Left => -1,
            ShiftDirection::Right => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A falling piece at a specific location and orientation.
///
/// Pieces are immutable values: movement and rotation return new
/// `ActivePiece` instances, which the resolver validates against the grid
/// before committing.
///
/// # Example
///
/// ```
/// use stacker_engine::{ActivePiece, GridPos, PieceKind, ShapeTable, ShiftDirection};
///
/// let piece = ActivePiece::new(PieceKind::O, GridPos::new(4, 1));
/// let moved = piece.shifted(ShiftDirection::Left);
/// assert_eq!(moved.anchor(), GridPos::new(3, 1));
/// assert!(moved.cells(&ShapeTable::STANDARD).contains(&GridPos::new(3, 0)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActivePiece {
    shape: PieceKind,
    paint: Paint,
    anchor: GridPos,
    rotation: Rotation,
    bonus: [bool; 4],
}

impl ActivePiece {
    /// Creates a typed piece at spawn rotation.
    #[must_use]
    pub const fn new(kind: PieceKind, anchor: GridPos) -> Self {
        Self {
            shape: kind,
            paint: Paint::Typed,
            anchor,
            rotation: Rotation::SPAWN,
            bonus: [false; 4],
        }
    }

    /// Creates a typeless piece with the geometry of `shape`.
    #[must_use]
    pub const fn plain(shape: PieceKind, color: Color, anchor: GridPos) -> Self {
        Self {
            paint: Paint::Plain(color),
            ..Self::new(shape, anchor)
        }
    }

    /// Marks block `block` (index into the shape offsets, `0..4`) as carrying
    /// a bonus into the grid. Out-of-range indices are ignored.
    #[must_use]
    pub fn with_bonus(mut self, block: usize) -> Self {
        if let Some(flag) = self.bonus.get_mut(block) {
            *flag = true;
        }
        self
    }

    #[must_use]
    pub const fn shape(&self) -> PieceKind {
        self.shape
    }

    #[must_use]
    pub const fn paint(&self) -> Paint {
        self.paint
    }

    #[must_use]
    pub const fn anchor(&self) -> GridPos {
        self.anchor
    }

    #[must_use]
    pub const fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// The piece type written into the grid, `None` for plain pieces.
    #[must_use]
    pub const fn occupant_kind(&self) -> Option<PieceKind> {
        match self.paint {
            Paint::Typed => Some(self.shape),
            Paint::Plain(_) => None,
        }
    }

    #[must_use]
    pub const fn has_bonus(&self, block: usize) -> bool {
        block < 4 && self.bonus[block]
    }

    /// Returns what block `block` becomes when the piece locks.
    #[must_use]
    pub fn occupant(&self, block: usize, palette: &Palette) -> Occupant {
        let mut occupant = match self.paint {
            Paint::Typed => Occupant::typed(self.shape, palette.color_for(self.shape)),
            Paint::Plain(color) => Occupant::plain(color),
        };
        occupant.bonus = self.has_bonus(block);
        occupant
    }

    /// Absolute grid cells covered by the piece, in shape-offset order.
    #[must_use]
    pub fn cells(&self, table: &ShapeTable) -> [GridPos; 4] {
        let offsets = *table.offsets(self.shape, self.rotation);
        offsets.map(|offset| self.anchor + offset)
    }

    /// Returns `true` if any covered cell is filled or outside the walls or
    /// floor. Cells above the top never collide.
    #[must_use]
    pub fn collides(&self, grid: &Grid, table: &ShapeTable) -> bool {
        self.cells(table)
            .iter()
            .any(|pos| grid.is_filled_at(pos.x, pos.y))
    }

    #[must_use]
    pub const fn shifted(self, direction: ShiftDirection) -> Self {
        Self {
            anchor: GridPos::new(self.anchor.x + direction.dx(), self.anchor.y),
            ..self
        }
    }

    #[must_use]
    pub const fn rotated(self, direction: RotationDirection) -> Self {
        let rotation = match direction {
            RotationDirection::Clockwise => self.rotation.rotated_clockwise(),
            RotationDirection::CounterClockwise => self.rotation.rotated_counter_clockwise(),
        };
        Self { rotation, ..self }
    }

    /// The piece one row lower.
    #[must_use]
    pub const fn dropped(self) -> Self {
        Self {
            anchor: self.anchor.below(),
            ..self
        }
    }

    /// Returns the lowest non-colliding position reachable by dropping.
    #[must_use]
    pub fn drop_position(self, grid: &Grid, table: &ShapeTable) -> Self {
        let mut piece = self;
        loop {
            let next = piece.dropped();
            if next.collides(grid, table) {
                return piece;
            }
            piece = next;
        }
    }
}
