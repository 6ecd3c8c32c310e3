use crate::board::Board;
use crate::geometry;
use crate::trajectory::{self, between};
use crate::types::{Color, Piece, PieceKind, Square};

use std::fmt;

use thiserror::Error;

/// Error choosing the promotion piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PromoteError {
    /// The move is not a promotion
    #[error("move is not a promotion")]
    NotPromotion,
    /// The pawn cannot be promoted to this kind of piece
    #[error("cannot promote to {0:?}")]
    BadKind(PieceKind),
}

/// Single piece relocation
///
/// The piece moves from `src` to `dst`, capturing whatever stands on `dst`. The piece is stored
/// as it was before the move, so undoing the relocation restores its "has moved" flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Plain {
    pub(crate) piece: Piece,
    pub(crate) src: Square,
    pub(crate) dst: Square,
    pub(crate) captured: Option<Piece>,
}

impl Plain {
    #[inline]
    pub(crate) const fn new(piece: Piece, src: Square, dst: Square, captured: Option<Piece>) -> Plain {
        Plain {
            piece,
            src,
            dst,
            captured,
        }
    }

    #[inline]
    pub fn piece(&self) -> Piece {
        self.piece
    }

    #[inline]
    pub fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Square {
        self.dst
    }

    #[inline]
    pub fn captured(&self) -> Option<Piece> {
        self.captured
    }

    /// Returns `true` if this is the first move of the piece in the game
    #[inline]
    pub fn first_move(&self) -> bool {
        !self.piece.has_moved
    }

    /// Checks that the piece can geometrically reach `dst`, nothing stands in the way and
    /// the captured piece (if any) belongs to the opponent
    pub fn is_valid(&self, b: &Board) -> bool {
        if let Some(captured) = self.captured {
            if captured.color == self.piece.color {
                return false;
            }
        }
        let traj = trajectory::trajectory(
            self.piece.kind,
            self.piece.color,
            self.piece.has_moved,
            self.src,
            self.dst,
            self.captured.is_some(),
        );
        traj.is_nonempty()
            && between(traj, self.src, self.dst)
                .into_iter()
                .all(|sq| b.get(sq).is_none())
    }
}

/// Castling
///
/// The king moves two squares towards a rook. On the kingside the rook stands right behind the
/// king's target square and jumps to the square the king passes; on the queenside it stands two
/// squares behind the target and lands on the other side of the king.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Castle {
    pub(crate) king: Plain,
    pub(crate) rook: Option<Plain>,
}

impl Castle {
    fn new(b: &Board, king: Piece, src: Square, dst: Square, captured: Option<Piece>) -> Castle {
        let (rook_src, rook_dst) = if dst.col() > src.col() {
            (dst.try_shift(0, 1), dst.try_shift(0, -1))
        } else {
            (dst.try_shift(0, -2), dst.try_shift(0, 1))
        };
        let rook = match (rook_src, rook_dst) {
            (Some(rook_src), Some(rook_dst)) => b
                .get(rook_src)
                .map(|rook| Plain::new(rook, rook_src, rook_dst, None)),
            _ => None,
        };
        Castle {
            king: Plain::new(king, src, dst, captured),
            rook,
        }
    }

    #[inline]
    pub fn king(&self) -> &Plain {
        &self.king
    }

    /// Returns the rook relocation, or `None` if there is no piece to castle with
    #[inline]
    pub fn rook(&self) -> Option<&Plain> {
        self.rook.as_ref()
    }

    pub fn is_valid(&self, b: &Board) -> bool {
        let Some(rook) = self.rook else {
            return false;
        };
        let king = self.king;
        let color = king.piece.color;
        if king.piece.kind != PieceKind::King
            || rook.piece.kind != PieceKind::Rook
            || rook.piece.color != color
        {
            return false;
        }
        if king.piece.has_moved || rook.piece.has_moved || king.src.row() != rook.src.row() {
            return false;
        }

        let path = trajectory::trajectory(
            PieceKind::Rook,
            color,
            true,
            king.src,
            rook.src,
            false,
        );
        if between(path, king.src, rook.src)
            .into_iter()
            .any(|sq| b.get(sq).is_some())
        {
            return false;
        }

        // The king may not castle out of, through or into check
        let lo = king.src.col().min(king.dst.col());
        let hi = king.src.col().max(king.dst.col());
        (lo..=hi)
            .filter_map(|col| Square::new(king.src.row(), col))
            .all(|sq| !b.is_attacked(sq, color))
    }
}

/// En passant capture
///
/// Remembers the previous move, as the capture is possible only right after the opponent's pawn
/// advanced two squares, and the captured pawn, which stands next to the capturing one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EnPassant {
    pub(crate) pawn: Plain,
    pub(crate) prev: Option<Plain>,
    pub(crate) victim: Option<Piece>,
}

impl EnPassant {
    fn new(b: &Board, prev: Option<&Move>, pawn: Piece, src: Square, dst: Square) -> EnPassant {
        let prev = prev.and_then(Move::primary).copied();
        EnPassant {
            pawn: Plain::new(pawn, src, dst, None),
            prev,
            victim: prev.and_then(|p| b.get(p.dst)),
        }
    }

    #[inline]
    pub fn pawn(&self) -> &Plain {
        &self.pawn
    }

    /// Returns the square of the captured pawn
    #[inline]
    pub fn victim_square(&self) -> Option<Square> {
        self.prev.map(|p| p.dst)
    }

    #[inline]
    pub fn victim(&self) -> Option<Piece> {
        self.victim
    }

    pub fn is_valid(&self, b: &Board) -> bool {
        let (Some(prev), Some(victim)) = (self.prev, self.victim) else {
            return false;
        };
        let pawn = self.pawn;
        if pawn.piece.kind != PieceKind::Pawn
            || prev.piece.kind != PieceKind::Pawn
            || victim.kind != PieceKind::Pawn
            || victim.color == pawn.piece.color
        {
            return false;
        }
        if prev.src.delta(prev.dst).0.abs() != 2 {
            return false;
        }
        if prev.dst.row() != pawn.src.row() || prev.dst.col() != pawn.dst.col() {
            return false;
        }
        let (dr, dc) = pawn.src.delta(pawn.dst);
        dr == pawn.piece.color.sign() && dc.abs() == 1 && b.get(pawn.dst).is_none()
    }
}

/// Pawn move to the last row
///
/// The piece kind to promote to is chosen separately, after the move is classified. The move
/// cannot be applied until the kind is set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Promotion {
    pub(crate) pawn: Plain,
    pub(crate) promote: Option<PieceKind>,
}

impl Promotion {
    #[inline]
    pub fn pawn(&self) -> &Plain {
        &self.pawn
    }

    #[inline]
    pub fn promote(&self) -> Option<PieceKind> {
        self.promote
    }

    pub fn is_valid(&self, b: &Board) -> bool {
        let pawn = self.pawn;
        pawn.piece.kind == PieceKind::Pawn
            && pawn.dst.rank() == geometry::promote_rank(pawn.piece.color)
            && self.promote.map_or(true, |k| k.is_promote_target())
            && pawn.is_valid(b)
    }
}

/// Chess move
///
/// Every requested relocation of a piece is classified into one of the variants below.
/// Classification only looks at the shape of the request; use [`Move::is_valid()`] to check
/// whether the move obeys the rules of the piece on the current board. Whether the move leaves
/// the own king under attack is checked only when the move is actually played.
///
/// [`Move::Rejected`] is a regular value: it is produced when there is no piece to move and is
/// never valid.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    Plain(Plain),
    Castle(Castle),
    EnPassant(EnPassant),
    Promotion(Promotion),
    #[default]
    Rejected,
}

impl Move {
    /// Classifies the move of the piece on `src` to `dst`
    ///
    /// `prev` is the last move played on the board, if any. It is needed to classify en passant.
    #[inline]
    pub fn classify(b: &Board, prev: Option<&Move>, src: Square, dst: Square) -> Move {
        Move::classify_with(b, prev, b.get(src), src, dst, b.get(dst))
    }

    /// Classifies the move of `piece` from `src` to `dst`, capturing `captured`
    ///
    /// Unlike [`Move::classify()`], the moving and the captured pieces are given explicitly and
    /// may differ from the contents of the board.
    pub fn classify_with(
        b: &Board,
        prev: Option<&Move>,
        piece: Option<Piece>,
        src: Square,
        dst: Square,
        captured: Option<Piece>,
    ) -> Move {
        let Some(piece) = piece else {
            return Move::Rejected;
        };
        let (dr, dc) = src.delta(dst);
        match piece.kind {
            PieceKind::King if dr == 0 && dc.abs() == 2 => {
                Move::Castle(Castle::new(b, piece, src, dst, captured))
            }
            PieceKind::Pawn if dr.abs() == 1 && dc.abs() == 1 && captured.is_none() => {
                Move::EnPassant(EnPassant::new(b, prev, piece, src, dst))
            }
            PieceKind::Pawn if dst.rank() == geometry::promote_rank(piece.color) => {
                Move::Promotion(Promotion {
                    pawn: Plain::new(piece, src, dst, captured),
                    promote: None,
                })
            }
            _ => Move::Plain(Plain::new(piece, src, dst, captured)),
        }
    }

    /// Classifies a hypothetical capture of a `defender` piece on `dst` by the piece on `src`
    ///
    /// If `dst` doesn't contain a piece of color `defender`, a phantom pawn is assumed there.
    /// Castling never captures anything, so it results in [`Move::Rejected`].
    pub(crate) fn threat(b: &Board, src: Square, dst: Square, defender: Color) -> Move {
        let target = b
            .get(dst)
            .filter(|p| p.color == defender)
            .unwrap_or(Piece::new(PieceKind::Pawn, defender).moved());
        match Move::classify_with(b, None, b.get(src), src, dst, Some(target)) {
            Move::Castle(_) => Move::Rejected,
            mv => mv,
        }
    }

    /// Checks whether the move obeys the movement rules on board `b`
    pub fn is_valid(&self, b: &Board) -> bool {
        match self {
            Move::Plain(p) => p.is_valid(b),
            Move::Castle(c) => c.is_valid(b),
            Move::EnPassant(e) => e.is_valid(b),
            Move::Promotion(p) => p.is_valid(b),
            Move::Rejected => false,
        }
    }

    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, Move::Rejected)
    }

    #[inline]
    pub fn is_promotion(&self) -> bool {
        matches!(self, Move::Promotion(_))
    }

    /// Returns the relocation of the piece that was requested to move
    ///
    /// This is the king relocation for castling and the pawn relocation for en passant and
    /// promotion.
    pub fn primary(&self) -> Option<&Plain> {
        match self {
            Move::Plain(p) => Some(p),
            Move::Castle(c) => Some(&c.king),
            Move::EnPassant(e) => Some(&e.pawn),
            Move::Promotion(p) => Some(&p.pawn),
            Move::Rejected => None,
        }
    }

    #[inline]
    pub fn src(&self) -> Option<Square> {
        self.primary().map(Plain::src)
    }

    #[inline]
    pub fn dst(&self) -> Option<Square> {
        self.primary().map(Plain::dst)
    }

    #[inline]
    pub fn piece(&self) -> Option<Piece> {
        self.primary().map(Plain::piece)
    }

    #[inline]
    pub fn color(&self) -> Option<Color> {
        self.piece().map(|p| p.color)
    }

    /// Returns the piece captured by the move
    pub fn captured(&self) -> Option<Piece> {
        match self {
            Move::Plain(p) => p.captured,
            Move::Castle(_) | Move::Rejected => None,
            Move::EnPassant(e) => e.victim,
            Move::Promotion(p) => p.pawn.captured,
        }
    }

    /// Returns the chosen promotion kind
    pub fn promote(&self) -> Option<PieceKind> {
        match self {
            Move::Promotion(p) => p.promote,
            _ => None,
        }
    }

    /// Chooses the piece kind for the promotion
    pub fn set_promotion(&mut self, kind: PieceKind) -> Result<(), PromoteError> {
        let Move::Promotion(p) = self else {
            return Err(PromoteError::NotPromotion);
        };
        if !kind.is_promote_target() {
            return Err(PromoteError::BadKind(kind));
        }
        p.promote = Some(kind);
        Ok(())
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        let Some(p) = self.primary() else {
            return write!(f, "0000");
        };
        write!(f, "{}{}", p.src, p.dst)?;
        if let Some(kind) = self.promote() {
            write!(f, "{}", kind)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;
    use crate::moves::Make;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn board(s: &str, side: Color) -> Board {
        let mut layout = Layout::from_str(s).unwrap();
        layout.side = side;
        Board::try_from(layout).unwrap()
    }

    #[test]
    fn test_classify() {
        let b = Board::initial();
        assert_eq!(Move::classify(&b, None, sq("e4"), sq("e5")), Move::Rejected);
        assert!(matches!(
            Move::classify(&b, None, sq("e2"), sq("e4")),
            Move::Plain(_)
        ));
        assert!(matches!(
            Move::classify(&b, None, sq("e1"), sq("g1")),
            Move::Castle(_)
        ));
        assert!(matches!(
            Move::classify(&b, None, sq("d2"), sq("e3")),
            Move::EnPassant(_)
        ));
        assert!(matches!(
            Move::classify(&b, None, sq("d7"), sq("c8")),
            Move::Plain(_)
        ));

        let b = board("....K...\n.......p\n\n\n\n\n\n....k...", Color::White);
        let mv = Move::classify(&b, None, sq("h7"), sq("h8"));
        assert!(mv.is_promotion());
        assert_eq!(mv.promote(), None);
        assert!(mv.is_valid(&b));
        assert_eq!(mv.to_string(), "h7h8");
    }

    #[test]
    fn test_plain() {
        let b = Board::initial();
        let mv = Move::classify(&b, None, sq("e2"), sq("e4"));
        assert!(mv.is_valid(&b));
        assert_eq!(mv.to_string(), "e2e4");
        assert!(mv.primary().unwrap().first_move());
        assert!(Move::classify(&b, None, sq("g1"), sq("f3")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("f1"), sq("c4")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("a1"), sq("a2")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("e2"), sq("e5")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("e2"), sq("e2")).is_valid(&b));
        assert!(!Move::Rejected.is_valid(&b));
        assert_eq!(Move::Rejected.to_string(), "0000");
    }

    #[test]
    fn test_castle() {
        let s = "R...K..R\n\n\n\n\n\n\nr...k..r";
        let b = board(s, Color::White);
        for (dst, rook_src, rook_dst) in [("g1", "h1", "f1"), ("c1", "a1", "d1")] {
            let mv = Move::classify(&b, None, sq("e1"), sq(dst));
            let Move::Castle(c) = mv else {
                panic!("{} is not castling", mv);
            };
            let rook = c.rook().unwrap();
            assert_eq!(rook.src(), sq(rook_src));
            assert_eq!(rook.dst(), sq(rook_dst));
            assert!(mv.is_valid(&b));
        }

        // Blocked path
        let b = board("R...K..R\n\n\n\n\n\n\nrn..k.nr", Color::White);
        assert!(!Move::classify(&b, None, sq("e1"), sq("g1")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("e1"), sq("c1")).is_valid(&b));

        // Transit square attacked
        let b = board("R...K..R\n\n\n\n\n.....Q\n\n....k..r", Color::White);
        assert!(!Move::classify(&b, None, sq("e1"), sq("g1")).is_valid(&b));

        // Castling out of check
        let b = board("R...K..R\n\n\n\n\n\n....Q...\nr...k..r", Color::White);
        assert!(!Move::classify(&b, None, sq("e1"), sq("c1")).is_valid(&b));

        // Moved pieces
        let mut b = board(s, Color::White);
        let rook = b.get(sq("h1")).unwrap();
        b.put(sq("h1"), Some(rook.moved()));
        assert!(!Move::classify(&b, None, sq("e1"), sq("g1")).is_valid(&b));
        assert!(Move::classify(&b, None, sq("e1"), sq("c1")).is_valid(&b));
        let king = b.get(sq("e1")).unwrap();
        b.put(sq("e1"), Some(king.moved()));
        assert!(!Move::classify(&b, None, sq("e1"), sq("c1")).is_valid(&b));

        // No rook at all
        let b = board("....K...\n\n\n\n\n\n\n....k...", Color::White);
        let mv = Move::classify(&b, None, sq("e1"), sq("g1"));
        assert!(matches!(mv, Move::Castle(Castle { rook: None, .. })));
        assert!(!mv.is_valid(&b));
    }

    #[test]
    fn test_en_passant() {
        let mut b = board("....K...\n...P....\n\n....p...\n\n\n\n....k...", Color::Black);
        let double = Move::classify(&b, None, sq("d7"), sq("d5"));
        assert!(double.is_valid(&b));
        double.make_raw(&mut b).unwrap();

        let mv = Move::classify(&b, Some(&double), sq("e5"), sq("d6"));
        let Move::EnPassant(ep) = mv else {
            panic!("{} is not en passant", mv);
        };
        assert_eq!(ep.victim_square(), Some(sq("d5")));
        assert_eq!(
            mv.captured(),
            Some(Piece::new(PieceKind::Pawn, Color::Black).moved())
        );
        assert!(mv.is_valid(&b));

        // Only right after the double step
        let other = Move::classify(&b, None, sq("e1"), sq("f1"));
        assert!(!Move::classify(&b, Some(&other), sq("e5"), sq("d6")).is_valid(&b));
        assert!(!Move::classify(&b, None, sq("e5"), sq("d6")).is_valid(&b));
        // Not a capture of the pawn next to us
        assert!(!Move::classify(&b, Some(&double), sq("e5"), sq("f6")).is_valid(&b));
    }

    #[test]
    fn test_en_passant_single_step() {
        let mut b = board("....K...\n\n...P....\n....p...\n\n\n\n....k...", Color::Black);
        let single = Move::classify(&b, None, sq("d6"), sq("d5"));
        assert!(single.is_valid(&b));
        single.make_raw(&mut b).unwrap();
        assert!(!Move::classify(&b, Some(&single), sq("e5"), sq("d6")).is_valid(&b));
    }

    #[test]
    fn test_promotion_kind() {
        let b = board("....K...\n.......p\n\n\n\n\n\n....k...", Color::White);
        let mut mv = Move::classify(&b, None, sq("h7"), sq("h8"));
        assert_eq!(
            mv.set_promotion(PieceKind::King),
            Err(PromoteError::BadKind(PieceKind::King))
        );
        assert_eq!(
            mv.set_promotion(PieceKind::Pawn),
            Err(PromoteError::BadKind(PieceKind::Pawn))
        );
        assert_eq!(mv.set_promotion(PieceKind::Knight), Ok(()));
        assert_eq!(mv.promote(), Some(PieceKind::Knight));
        assert_eq!(mv.to_string(), "h7h8n");

        let mut plain = Move::classify(&b, None, sq("e1"), sq("e2"));
        assert_eq!(
            plain.set_promotion(PieceKind::Queen),
            Err(PromoteError::NotPromotion)
        );
    }

    #[test]
    fn test_threat() {
        let b = board("R...K..R\n\n\n\n\n\n\nr...k..r", Color::White);
        assert_eq!(
            Move::threat(&b, sq("e1"), sq("g1"), Color::Black),
            Move::Rejected
        );
        assert!(Move::threat(&b, sq("h1"), sq("h5"), Color::Black).is_valid(&b));
        assert!(Move::threat(&b, sq("h1"), sq("h8"), Color::Black).is_valid(&b));
        assert!(!Move::threat(&b, sq("a1"), sq("a2"), Color::White).is_valid(&b));
    }
}
