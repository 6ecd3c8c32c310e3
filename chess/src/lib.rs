//! Chess rules engine
//!
//! The crate keeps the state of a two-player chess game and decides which moves are allowed.
//! It knows how every piece moves, handles castling, en passant and promotion, forbids moves
//! that leave the own king under attack, and detects checkmate.
//!
//! The main entry point is [`Game`]. It owns the [`Board`] and the history of moves, and is
//! driven by the user interface through [`Game::submit_move()`] and
//! [`Game::resolve_promotion()`].
//!
//! # Example
//!
//! ```
//! # use gambit::{Game, MoveOutcome, PieceKind, Square};
//! # use std::str::FromStr;
//! #
//! let sq = |s| Square::from_str(s).unwrap();
//! let mut game = Game::new_initial();
//! assert_eq!(game.submit_move(sq("e2"), sq("e4")), MoveOutcome::Applied);
//! assert!(game.submit_move(sq("e2"), sq("e4")).is_rejected());
//! assert_eq!(game.legal_destinations(sq("g8")).len(), 2);
//! ```
//!
//! # Features
//!
//! - `logging`: report played, rejected and undone moves via the [`log`](https://docs.rs/log)
//!   crate
//! - `serde`: derive `Serialize` and `Deserialize` for squares, pieces and move records

#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

#[cfg(feature = "logging")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        let _ = format_args!($($arg)*);
    }};
}

pub mod board;
pub mod game;
pub mod movegen;
pub mod moves;
pub mod trajectory;

pub use gambit_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, Layout, LayoutError, LayoutParseError, ValidateError};
pub use game::{Game, MoveOutcome, PromotionError, PromotionHandle, RejectReason};
pub use moves::{Make, MakeError, Move, MoveRecord, RecordKind};
pub use types::{Color, File, Piece, PieceKind, Rank, Square};

#[cfg(test)]
mod tests {
    #[test]
    fn test_log_macros() {
        let sq = crate::Square::from_index(12);
        let () = log_debug!("square {} at index {}", sq, sq.index());
        let () = log_info!("{:?}", sq);
    }
}
