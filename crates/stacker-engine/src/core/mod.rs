//! Board-level data: coordinates, cells, the grid, piece geometry and the
//! active piece.
//!
//! Nothing in this module knows about time. Movement rules and the slide
//! live in [`crate::engine`].

pub use self::{cell::*, color::*, coord::*, grid::*, piece::*, row_clear::*, shape::*};

pub(crate) mod cell;
pub(crate) mod color;
pub(crate) mod coord;
pub(crate) mod grid;
pub(crate) mod piece;
pub(crate) mod row_clear;
pub(crate) mod shape;
