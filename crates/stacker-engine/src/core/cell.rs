use serde::{Deserialize, Serialize};

use super::{color::Color, shape::PieceKind};

/// What occupies a non-empty cell.
///
/// `kind` is `None` for typeless decorative fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Occupant {
    pub kind: Option<PieceKind>,
    pub color: Color,
    pub bonus: bool,
}

impl Occupant {
    #[must_use]
    pub const fn typed(kind: PieceKind, color: Color) -> Self {
        Self {
            kind: Some(kind),
            color,
            bonus: false,
        }
    }

    #[must_use]
    pub const fn plain(color: Color) -> Self {
        Self {
            kind: None,
            color,
            bonus: false,
        }
    }
}

/// State tag of a [`Cell`], without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum CellState {
    Empty,
    Filled,
    Dying,
}

/// A single grid slot.
///
/// ```text
/// Empty ──set_filled──▶ Filled ──clear──▶ Dying ──complete_dying──▶ Empty
///                        │  ▲
///                        │  └─ set_filled (overwrite), mark_bonus
///                        └──────────── force_empty ──────────────▶ Empty
/// ```
///
/// The occupant only exists as the payload of `Filled` and `Dying`, so an
/// empty cell cannot carry stale color or bonus data. A dying cell rejects
/// every mutation except `complete_dying` and `force_empty`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Occupant),
    Dying(Occupant),
}

impl Cell {
    #[must_use]
    pub const fn state(&self) -> CellState {
        match self {
            Cell::Empty => CellState::Empty,
            Cell::Filled(_) => CellState::Filled,
            Cell::Dying(_) => CellState::Dying,
        }
    }

    /// Returns the occupant of a filled or dying cell.
    #[must_use]
    pub const fn occupant(&self) -> Option<&Occupant> {
        match self {
            Cell::Empty => None,
            Cell::Filled(occupant) | Cell::Dying(occupant) => Some(occupant),
        }
    }

    /// Fills the cell with a typed occupant, clearing any bonus marker.
    ///
    /// Returns `false` (and does nothing) if the cell is dying.
    pub fn set_filled(&mut self, kind: PieceKind, color: Color) -> bool {
        self.fill(Occupant::typed(kind, color))
    }

    /// Like [`Self::set_filled`], but the occupant has no piece type.
    pub fn set_filled_plain(&mut self, color: Color) -> bool {
        self.fill(Occupant::plain(color))
    }

    fn fill(&mut self, occupant: Occupant) -> bool {
        if self.is_dying() {
            return false;
        }
        *self = Cell::Filled(occupant);
        true
    }

    /// Sets the bonus marker. Ignored unless the cell is filled.
    pub fn mark_bonus(&mut self) -> bool {
        match self {
            Cell::Filled(occupant) => {
                occupant.bonus = true;
                true
            }
            Cell::Empty | Cell::Dying(_) => false,
        }
    }

    /// Starts removing a filled cell: `Filled -> Dying`.
    ///
    /// The occupant stays readable until [`Self::complete_dying`] runs.
    /// Returns the occupant being removed, or `None` if the cell was not
    /// filled.
    pub fn clear(&mut self) -> Option<Occupant> {
        let Cell::Filled(occupant) = *self else {
            return None;
        };
        *self = Cell::Dying(occupant);
        Some(occupant)
    }

    /// Finishes a removal: `Dying -> Empty`.
    pub fn complete_dying(&mut self) -> Option<Occupant> {
        let Cell::Dying(occupant) = *self else {
            return None;
        };
        *self = Cell::Empty;
        Some(occupant)
    }

    /// Empties the cell from any state, returning what was there.
    pub fn force_empty(&mut self) -> Option<Occupant> {
        let occupant = self.occupant().copied();
        *self = Cell::Empty;
        occupant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(0xff, 0, 0);
    const BLUE: Color = Color::rgb(0, 0, 0xff);

    #[test]
    fn test_new_cell_is_empty() {
        let cell = Cell::default();
        assert_eq!(cell.state(), CellState::Empty);
        assert!(cell.occupant().is_none());
    }

    #[test]
    fn test_full_cycle() {
        let mut cell = Cell::default();
        assert!(cell.set_filled(PieceKind::T, RED));
        assert_eq!(cell, Cell::Filled(Occupant::typed(PieceKind::T, RED)));

        let removed = cell.clear().unwrap();
        assert_eq!(removed.color, RED);
        assert!(cell.is_dying());
        // still readable while dying
        assert_eq!(cell.occupant().unwrap().kind, Some(PieceKind::T));

        assert_eq!(cell.complete_dying(), Some(removed));
        assert!(cell.is_empty());
    }

    #[test]
    fn test_overwrite_clears_bonus() {
        let mut cell = Cell::default();
        cell.set_filled(PieceKind::I, RED);
        assert!(cell.mark_bonus());
        assert!(cell.occupant().unwrap().bonus);

        assert!(cell.set_filled_plain(BLUE));
        let occupant = cell.occupant().unwrap();
        assert_eq!(occupant.kind, None);
        assert_eq!(occupant.color, BLUE);
        assert!(!occupant.bonus);
    }

    #[test]
    fn test_mark_bonus_requires_filled() {
        let mut cell = Cell::default();
        assert!(!cell.mark_bonus());
        assert!(cell.is_empty());

        cell.set_filled(PieceKind::O, RED);
        cell.clear();
        assert!(!cell.mark_bonus());
        assert!(!cell.occupant().unwrap().bonus);
    }

    #[test]
    fn test_dying_rejects_mutation() {
        let mut cell = Cell::default();
        cell.set_filled(PieceKind::S, RED);
        cell.clear();
        assert!(!cell.set_filled(PieceKind::Z, BLUE));
        assert!(!cell.set_filled_plain(BLUE));
        assert_eq!(cell.clear(), None);
        assert_eq!(cell, Cell::Dying(Occupant::typed(PieceKind::S, RED)));
    }

    #[test]
    fn test_clear_on_empty_is_noop() {
        let mut cell = Cell::default();
        assert_eq!(cell.clear(), None);
        assert_eq!(cell.complete_dying(), None);
        assert!(cell.is_empty());
    }

    #[test]
    fn test_force_empty_from_any_state() {
        let mut cell = Cell::default();
        assert_eq!(cell.force_empty(), None);

        cell.set_filled(PieceKind::L, RED);
        cell.mark_bonus();
        let occupant = cell.force_empty().unwrap();
        assert!(occupant.bonus);
        assert!(cell.is_empty());

        cell.set_filled(PieceKind::J, BLUE);
        cell.clear();
        assert_eq!(cell.force_empty().map(|o| o.color), Some(BLUE));
        assert!(cell.is_empty());
    }
}
