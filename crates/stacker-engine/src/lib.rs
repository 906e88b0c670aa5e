pub use self::{config::*, core::*, engine::*, events::*};

pub mod config;
pub mod core;
pub mod engine;
pub mod events;

/// Why a shift, rotation or drop request was rejected.
///
/// A rejected request never changes any state.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum MoveError {
    #[display("no active piece")]
    NoActivePiece,
    #[display("a horizontal slide is still in progress")]
    SlideInProgress,
    #[display("target cells are blocked")]
    Collision,
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum SpawnError {
    #[display("a piece is already active")]
    AlreadyActive,
    #[display("spawn cells of the {kind} piece are blocked")]
    Blocked {
        #[error(not(source))]
        kind: PieceKind,
    },
}
