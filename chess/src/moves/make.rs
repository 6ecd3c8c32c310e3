use super::base::{Castle, EnPassant, Move, Plain, Promotion};
use crate::board::Board;
use crate::types::Piece;

use thiserror::Error;

/// Error applying a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MakeError {
    /// Promotion kind was not chosen yet
    #[error("promotion piece is not chosen")]
    UnresolvedPromotion,
    /// The move lacks the data needed to apply it
    #[error("move cannot be applied")]
    NotApplicable,
}

/// Applies moves to the board
///
/// Applying doesn't validate anything beyond what is needed to change the board. The caller is
/// responsible for checking [`Move::is_valid()`] first.
pub trait Make {
    type Err;

    /// Applies the move to `board` in place
    ///
    /// On error, the board is left untouched.
    fn make_raw(&self, board: &mut Board) -> Result<(), Self::Err>;

    /// Returns the board after the move, keeping `board` untouched
    fn make(&self, board: &Board) -> Result<Board, Self::Err> {
        let mut cloned = board.clone();
        self.make_raw(&mut cloned)?;
        Ok(cloned)
    }
}

impl Plain {
    #[inline]
    fn do_make(&self, b: &mut Board) {
        b.relocate(self.piece, self.src, self.dst);
    }

    #[inline]
    fn do_unmake(&self, b: &mut Board) {
        b.put(self.dst, self.captured);
        b.put(self.src, Some(self.piece));
    }
}

impl Castle {
    fn do_make(&self, b: &mut Board) -> Result<(), MakeError> {
        let rook = self.rook.ok_or(MakeError::NotApplicable)?;
        self.king.do_make(b);
        rook.do_make(b);
        Ok(())
    }

    fn do_unmake(&self, b: &mut Board) {
        if let Some(rook) = self.rook {
            rook.do_unmake(b);
        }
        self.king.do_unmake(b);
    }
}

impl EnPassant {
    fn do_make(&self, b: &mut Board) -> Result<(), MakeError> {
        let victim = self.victim_square().ok_or(MakeError::NotApplicable)?;
        self.pawn.do_make(b);
        b.put(victim, None);
        Ok(())
    }

    fn do_unmake(&self, b: &mut Board) {
        self.pawn.do_unmake(b);
        if let Some(victim) = self.victim_square() {
            b.put(victim, self.victim);
        }
    }
}

impl Promotion {
    fn do_make(&self, b: &mut Board) -> Result<(), MakeError> {
        let kind = self.promote.ok_or(MakeError::UnresolvedPromotion)?;
        self.pawn.do_make(b);
        b.put(
            self.pawn.dst,
            Some(Piece::new(kind, self.pawn.piece.color).moved()),
        );
        Ok(())
    }

    #[inline]
    fn do_unmake(&self, b: &mut Board) {
        self.pawn.do_unmake(b);
    }
}

impl Make for Move {
    type Err = MakeError;

    fn make_raw(&self, b: &mut Board) -> Result<(), MakeError> {
        match self {
            Move::Plain(p) => {
                p.do_make(b);
                Ok(())
            }
            Move::Castle(c) => c.do_make(b),
            Move::EnPassant(e) => e.do_make(b),
            Move::Promotion(p) => p.do_make(b),
            Move::Rejected => Err(MakeError::NotApplicable),
        }
    }
}

impl Move {
    /// Reverts the move previously applied to `b` with [`Make::make_raw()`]
    ///
    /// Moves must be undone in the reverse order of applying them.
    pub fn unmake(&self, b: &mut Board) {
        match self {
            Move::Plain(p) => p.do_unmake(b),
            Move::Castle(c) => c.do_unmake(b),
            Move::EnPassant(e) => e.do_unmake(b),
            Move::Promotion(p) => p.do_unmake(b),
            Move::Rejected => {}
        }
    }
}
