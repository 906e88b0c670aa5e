use std::collections::BTreeMap;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

use super::coord::GridPos;

/// Enum representing the type of piece.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    derive_more::Display,
    Deserialize,
    Serialize,
)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// O-piece.
    O = 1,
    /// S-piece.
    S = 2,
    /// Z-piece.
    Z = 3,
    /// J-piece.
    J = 4,
    /// L-piece.
    L = 5,
    /// T-piece.
    T = 6,
}

impl Distribution<PieceKind> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        PieceKind::ALL[rng.random_range(0..PieceKind::LEN)]
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
        PieceKind::T,
    ];

    /// Returns the single character representation of this piece kind.
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use stacker_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('T'), Some(PieceKind::T));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: 90° clockwise
/// - `2`: 180°
/// - `3`: 270° clockwise (90° counterclockwise)
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    /// Creates a rotation from an index, wrapping modulo 4.
    #[must_use]
    pub const fn new(index: u8) -> Self {
        Self(index % 4)
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn rotated_clockwise(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_counter_clockwise(self) -> Self {
        Self((self.0 + 3) % 4)
    }
}

/// The four cell offsets of one piece orientation, relative to the anchor.
pub type ShapeOffsets = [GridPos; 4];

/// Raw shape table as loaded from configuration.
///
/// Maps each piece kind to its rotation entries, each a list of `[dx, dy]`
/// offsets. Validated by [`ShapeTable::from_definition`].
pub type ShapeTableDefinition = BTreeMap<PieceKind, Vec<Vec<GridPos>>>;

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ShapeTableError {
    #[display("shape table has no entry for piece kind {kind}")]
    MissingKind { kind: PieceKind },
    #[display("piece kind {kind} has {count} rotation entries, expected 4")]
    RotationCount { kind: PieceKind, count: usize },
    #[display("piece kind {kind} rotation {rotation} has {count} offsets, expected 4")]
    OffsetCount {
        kind: PieceKind,
        rotation: usize,
        count: usize,
    },
    #[display("piece kind {kind} rotation {rotation} repeats offset ({}, {})", offset.x, offset.y)]
    DuplicateOffset {
        kind: PieceKind,
        rotation: usize,
        offset: GridPos,
    },
}

/// Per-kind piece geometry: 4 rotations × 4 cell offsets.
///
/// Offsets are relative to the piece anchor, which is the top-left corner of
/// the piece's bounding box. Since grid Y grows upward, offsets extend to the
/// right (`dx >= 0`) and downward (`dy <= 0`).
///
/// # Example
///
/// ```
/// use stacker_engine::{GridPos, PieceKind, Rotation, ShapeTable};
///
/// let table = ShapeTable::STANDARD;
/// let offsets = table.offsets(PieceKind::I, Rotation::SPAWN);
/// assert_eq!(
///     offsets,
///     &[GridPos::new(0, -1), GridPos::new(1, -1), GridPos::new(2, -1), GridPos::new(3, -1)]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeTable {
    shapes: [[ShapeOffsets; 4]; PieceKind::LEN],
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl ShapeTable {
    /// Standard tetromino geometry with clockwise rotation inside the
    /// bounding box (4×4 for I, 2×2 for O, 3×3 for the rest).
    pub const STANDARD: Self = {
        const C: bool = true;
        const E: bool = false;
        const EEEE: [bool; 4] = [E; 4];
        Self {
            shapes: [
                // I-piece
                box_offsets(4, [EEEE, [C, C, C, C], EEEE, EEEE]),
                // O-piece
                box_offsets(2, [[C, C, E, E], [C, C, E, E], EEEE, EEEE]),
                // S-piece
                box_offsets(3, [[E, C, C, E], [C, C, E, E], EEEE, EEEE]),
                // Z-piece
                box_offsets(3, [[C, C, E, E], [E, C, C, E], EEEE, EEEE]),
                // J-piece
                box_offsets(3, [[C, E, E, E], [C, C, C, E], EEEE, EEEE]),
                // L-piece
                box_offsets(3, [[E, E, C, E], [C, C, C, E], EEEE, EEEE]),
                // T-piece
                box_offsets(3, [[E, C, E, E], [C, C, C, E], EEEE, EEEE]),
            ],
        }
    };

    /// Builds a table from a loaded definition, rejecting malformed entries.
    pub fn from_definition(definition: &ShapeTableDefinition) -> Result<Self, ShapeTableError> {
        let mut shapes = Self::STANDARD.shapes;
        for kind in PieceKind::ALL {
            let rotations = definition
                .get(&kind)
                .ok_or(ShapeTableError::MissingKind { kind })?;
            if rotations.len() != 4 {
                return Err(ShapeTableError::RotationCount {
                    kind,
                    count: rotations.len(),
                });
            }
            for (rotation, offsets) in rotations.iter().enumerate() {
                let offsets: ShapeOffsets =
                    offsets
                        .as_slice()
                        .try_into()
                        .map_err(|_| ShapeTableError::OffsetCount {
                            kind,
                            rotation,
                            count: offsets.len(),
                        })?;
                for (i, offset) in offsets.iter().enumerate() {
                    if offsets[..i].contains(offset) {
                        return Err(ShapeTableError::DuplicateOffset {
                            kind,
                            rotation,
                            offset: *offset,
                        });
                    }
                }
                shapes[kind.index()][rotation] = offsets;
            }
        }
        Ok(Self { shapes })
    }

    /// Converts the table back into its loadable form.
    #[must_use]
    pub fn to_definition(&self) -> ShapeTableDefinition {
        PieceKind::ALL
            .into_iter()
            .map(|kind| {
                let rotations = self.shapes[kind.index()]
                    .iter()
                    .map(|offsets| offsets.to_vec())
                    .collect();
                (kind, rotations)
            })
            .collect()
    }

    #[must_use]
    pub fn offsets(&self, kind: PieceKind, rotation: Rotation) -> &ShapeOffsets {
        &self.shapes[kind.index()][rotation.index()]
    }
}

/// Generates the offsets of all 4 rotation states of a shape drawn in a
/// top-down bounding box, rotating 90° clockwise each step.
///
/// # Arguments
///
/// * `size` - Effective size of the piece (3 for most pieces, 4 for I, 2 for O)
/// * `shape` - Initial shape at spawn rotation, rows listed top to bottom
const fn box_offsets(size: usize, shape: [[bool; 4]; 4]) -> [ShapeOffsets; 4] {
    let mut boxes = [shape; 4];
    let mut i = 1;
    while i < 4 {
        let mut rotated = [[false; 4]; 4];
        let mut y = 0;
        while y < size {
            let mut x = 0;
            while x < size {
                rotated[y][x] = boxes[i - 1][size - 1 - x][y];
                x += 1;
            }
            y += 1;
        }
        boxes[i] = rotated;
        i += 1;
    }

    let mut offsets = [[GridPos::new(0, 0); 4]; 4];
    let mut r = 0;
    while r < 4 {
        let mut n = 0;
        let mut row = 0;
        while row < 4 {
            let mut col = 0;
            while col < 4 {
                if boxes[r][row][col] {
                    assert!(n < 4, "shape has more than 4 cells");
                    #[expect(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
                    let offset = GridPos::new(col as i32, -(row as i32));
                    offsets[r][n] = offset;
                    n += 1;
                }
                col += 1;
            }
            row += 1;
        }
        assert!(n == 4, "shape has fewer than 4 cells");
        r += 1;
    }
    offsets
}
