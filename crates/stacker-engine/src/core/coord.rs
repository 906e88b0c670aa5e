use serde::{Deserialize, Serialize};

/// Discrete cell coordinate on the grid.
///
/// # Coordinate System
///
/// - (0, 0) is the bottom-left cell of the grid
/// - X increases rightward (columns)
/// - Y increases upward (rows), so row 0 is the floor
///
/// Values outside the grid are valid and meaningful: pieces spawn partly
/// above the top row, and collision checks probe cells beyond the walls.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    derive_more::Add,
    derive_more::Sub,
    Deserialize,
    Serialize,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl From<[i32; 2]> for GridPos {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<GridPos> for [i32; 2] {
    fn from(pos: GridPos) -> Self {
        [pos.x, pos.y]
    }
}

impl GridPos {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn left(self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.x + 1, self.y)
    }

    #[must_use]
    pub const fn below(self) -> Self {
        Self::new(self.x, self.y - 1)
    }
}

/// Continuous world-space position, as used by the presentation layer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl From<[f32; 2]> for WorldPos {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<WorldPos> for [f32; 2] {
    fn from(pos: WorldPos) -> Self {
        [pos.x, pos.y]
    }
}

impl WorldPos {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation between `self` and `other`; `t` is not clamped.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Converts between world-space positions and grid cells.
///
/// Both axes use floor semantics: a point belongs to the cell whose
/// lower-left corner is at or below/left of it. Negative offsets from the
/// origin therefore map to negative indices instead of being clamped, and
/// callers bounds-check the result against the [`Grid`](super::grid::Grid).
///
/// # Example
///
/// ```
/// use stacker_engine::{CoordMapper, GridPos, WorldPos};
///
/// let mapper = CoordMapper::new(WorldPos::new(0.5, 0.5), WorldPos::new(-2.0, 0.0));
/// let cell = mapper.world_to_grid(WorldPos::new(-1.9, 0.7));
/// assert_eq!(cell, GridPos::new(0, 1));
/// assert_eq!(mapper.grid_to_world_center(cell), WorldPos::new(-1.75, 0.75));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordMapper {
    cell_size: WorldPos,
    origin: WorldPos,
}

impl Default for CoordMapper {
    fn default() -> Self {
        Self::UNIT
    }
}

impl CoordMapper {
    /// One world unit per cell, origin at (0, 0).
    pub const UNIT: Self = Self::new(WorldPos::new(1.0, 1.0), WorldPos::new(0.0, 0.0));

    /// Creates a mapper. `cell_size` must be positive on both axes.
    #[must_use]
    pub const fn new(cell_size: WorldPos, origin: WorldPos) -> Self {
        Self { cell_size, origin }
    }

    #[must_use]
    pub const fn cell_size(&self) -> WorldPos {
        self.cell_size
    }

    #[must_use]
    pub const fn origin(&self) -> WorldPos {
        self.origin
    }

    #[must_use]
    #[expect(clippy::cast_possible_truncation)]
    pub fn world_to_grid(&self, point: WorldPos) -> GridPos {
        let x = ((point.x - self.origin.x) / self.cell_size.x).floor();
        let y = ((point.y - self.origin.y) / self.cell_size.y).floor();
        GridPos::new(x as i32, y as i32)
    }

    /// Returns the world position of the lower-left corner of a cell.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn grid_to_world(&self, cell: GridPos) -> WorldPos {
        WorldPos::new(
            self.origin.x + cell.x as f32 * self.cell_size.x,
            self.origin.y + cell.y as f32 * self.cell_size.y,
        )
    }

    #[must_use]
    pub fn grid_to_world_center(&self, cell: GridPos) -> WorldPos {
        let corner = self.grid_to_world(cell);
        WorldPos::new(
            corner.x + self.cell_size.x / 2.0,
            corner.y + self.cell_size.y / 2.0,
        )
    }

    /// Returns the center of the cell containing `point`.
    #[must_use]
    pub fn snap_to_cell_center(&self, point: WorldPos) -> WorldPos {
        self.grid_to_world_center(self.world_to_grid(point))
    }

    #[must_use]
    pub fn cell_center_left(&self, point: WorldPos) -> WorldPos {
        self.grid_to_world_center(self.world_to_grid(point).left())
    }

    #[must_use]
    pub fn cell_center_right(&self, point: WorldPos) -> WorldPos {
        self.grid_to_world_center(self.world_to_grid(point).right())
    }

    #[must_use]
    pub fn cell_center_below(&self, point: WorldPos) -> WorldPos {
        self.grid_to_world_center(self.world_to_grid(point).below())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_in_bounds() {
        let mappers = [
            CoordMapper::UNIT,
            CoordMapper::new(WorldPos::new(0.5, 0.5), WorldPos::new(0.0, 0.0)),
            CoordMapper::new(WorldPos::new(0.32, 0.32), WorldPos::new(-1.6, -3.2)),
            CoordMapper::new(WorldPos::new(2.0, 3.0), WorldPos::new(10.0, -7.5)),
        ];
        for mapper in mappers {
            for y in 0..20 {
                for x in 0..10 {
                    let cell = GridPos::new(x, y);
                    let center = mapper.grid_to_world_center(cell);
                    assert_eq!(
                        mapper.world_to_grid(center),
                        cell,
                        "round trip failed for {cell:?} with {mapper:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_negative_coordinates_floor() {
        let mapper = CoordMapper::UNIT;
        assert_eq!(mapper.world_to_grid(WorldPos::new(-0.1, -0.1)), GridPos::new(-1, -1));
        assert_eq!(mapper.world_to_grid(WorldPos::new(-1.0, 0.0)), GridPos::new(-1, 0));
        assert_eq!(mapper.world_to_grid(WorldPos::new(-1.01, 0.99)), GridPos::new(-2, 0));
    }

    #[test]
    fn test_center_of_containing_cell() {
        let mapper = CoordMapper::new(WorldPos::new(0.5, 0.25), WorldPos::new(1.0, 1.0));
        let point = WorldPos::new(1.6, 1.3);
        assert_eq!(mapper.world_to_grid(point), GridPos::new(1, 1));
        assert_eq!(mapper.snap_to_cell_center(point), WorldPos::new(1.75, 1.375));
    }

    #[test]
    fn test_neighbor_centers() {
        let mapper = CoordMapper::UNIT;
        let point = WorldPos::new(3.2, 4.9);
        assert_eq!(mapper.cell_center_left(point), WorldPos::new(2.5, 4.5));
        assert_eq!(mapper.cell_center_right(point), WorldPos::new(4.5, 4.5));
        assert_eq!(mapper.cell_center_below(point), WorldPos::new(3.5, 3.5));
    }

    #[test]
    fn test_lerp() {
        let a = WorldPos::new(0.0, 2.0);
        let b = WorldPos::new(4.0, 2.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 0.25), WorldPos::new(1.0, 2.0));
        assert_eq!(a.lerp(b, 1.0), b);
    }
}
