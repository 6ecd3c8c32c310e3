//! Flat move records for storing the game history

use super::base::Move;
use crate::types::{Color, PieceKind, Square};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RecordKind {
    Normal,
    EnPassant,
    Castling,
    Promotion,
}

/// Move in a form suitable for persisting
///
/// The record describes the move from the point of view of the piece that was requested to move.
/// For castling it is the king, the rook relocation is implied.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MoveRecord {
    pub kind: RecordKind,
    pub color: Color,
    pub piece: PieceKind,
    pub src: Square,
    pub dst: Square,
    pub captured: Option<PieceKind>,
    pub promotes_to: Option<PieceKind>,
}

impl MoveRecord {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl Move {
    /// Returns the record of the move, or `None` for [`Move::Rejected`]
    pub fn record(&self) -> Option<MoveRecord> {
        let kind = match self {
            Move::Plain(_) => RecordKind::Normal,
            Move::Castle(_) => RecordKind::Castling,
            Move::EnPassant(_) => RecordKind::EnPassant,
            Move::Promotion(_) => RecordKind::Promotion,
            Move::Rejected => return None,
        };
        let primary = self.primary()?;
        Some(MoveRecord {
            kind,
            color: primary.piece().color,
            piece: primary.piece().kind,
            src: primary.src(),
            dst: primary.dst(),
            captured: self.captured().map(|p| p.kind),
            promotes_to: self.promote(),
        })
    }
}
