//! Time-driven game logic on top of [`crate::core`].
//!
//! - [`Playfield`] - the grid plus the falling piece; validates and applies
//!   shift, rotate and drop requests and runs the horizontal slide
//! - [`GameSession`] - natural fall timer, piece dealing and top-out policy
//! - [`PieceBuffer`] - 7-bag piece generation
//! - [`PieceSeed`] - seed for deterministic piece generation
//!
//! # Game Flow
//!
//! 1. A piece is spawned at the spawn anchor
//! 2. Player input shifts, rotates and drops it; the session's fall timer
//!    drops it once per interval
//! 3. When it can no longer move down it locks and full rows are cleared
//! 4. The next piece is spawned; a piece that cannot be placed ends the game
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use stacker_engine::{GameConfig, GameSession, InputCommand};
//!
//! let mut session = GameSession::new(&GameConfig::default()).unwrap();
//! session.handle_input(InputCommand::ShiftLeft);
//! session.tick(Duration::from_millis(16));
//! session.handle_input(InputCommand::HardDrop);
//!
//! assert_eq!(session.field().grid().occupied_count(), 4);
//! ```

pub use self::{motion::*, piece_buffer::*, playfield::*, session::*};

mod motion;
mod piece_buffer;
mod playfield;
mod session;
