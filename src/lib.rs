//! A chess rules engine: full legal-move generation, check and pin
//! detection, and a reversible move history.
//!
//! The board is an 8×8 grid of piece records (vacancy is an explicit
//! `Empty` variant, never a null). Legality is computed by ray-cast
//! check/pin analysis plus geometric attack maps; every executed move is
//! logged as value snapshots and can be undone exactly.
//!
//! ```
//! use chess_rules::{Engine, Pos};
//!
//! let mut game = Engine::new();
//! let e2 = Pos::from_algebraic("e2").unwrap();
//! let e4 = Pos::from_algebraic("e4").unwrap();
//! assert!(game.attempt_move(e2, e4));
//! assert!(game.undo_move());
//! ```

pub mod board;
pub mod check;
pub mod engine;
pub mod movegen;
pub mod piece;
pub mod types;

pub use board::{Board, STARTING_LAYOUT};
pub use check::{CheckReport, ColorConstraints, Pin};
pub use engine::{Engine, MoveLogEntry};
pub use movegen::{Generation, generate_all_valid_moves};
pub use piece::{MoveCapability, Piece, PieceKind};
pub use types::{ChessError, Color, Move, Pos};
