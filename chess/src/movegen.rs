//! Legal move enumeration
//!
//! A move is legal if it obeys the movement rules, doesn't capture the king and doesn't leave
//! the own king under attack. The last condition is checked by applying the move to the board
//! and undoing it right after, so the functions here take the board mutably. The board is
//! always restored before they return.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::moves::{Make, Move};
use crate::types::{Color, PieceKind, Square};

use arrayvec::ArrayVec;
use std::ops::{Deref, DerefMut};
use std::slice;

/// Sixteen pieces with at most 27 destinations each, plus castling
const MAX_MOVES: usize = 512;

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MoveList(ArrayVec<Move, MAX_MOVES>);

impl Deref for MoveList {
    type Target = ArrayVec<Move, MAX_MOVES>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for MoveList {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<'a> IntoIterator for &'a MoveList {
    type Item = &'a Move;
    type IntoIter = slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a mut MoveList {
    type Item = &'a mut Move;
    type IntoIter = slice::IterMut<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter_mut()
    }
}

impl MoveList {
    pub fn new() -> MoveList {
        MoveList(ArrayVec::new())
    }
}

pub trait MovePush {
    fn push(&mut self, m: Move);
}

impl MovePush for MoveList {
    fn push(&mut self, m: Move) {
        self.0.push(m);
    }
}

impl MovePush for Vec<Move> {
    fn push(&mut self, m: Move) {
        self.push(m);
    }
}

/// Checks whether the valid move `mv` keeps the own king safe
///
/// Unresolved promotions are tried as promotions to queen, as the chosen kind cannot affect
/// the safety of the king.
pub fn is_safe(b: &mut Board, mv: &Move) -> bool {
    let Some(color) = mv.color() else {
        return false;
    };
    if mv.captured().map_or(false, |p| p.kind == PieceKind::King) {
        return false;
    }
    let mut mv = *mv;
    if let Move::Promotion(p) = &mut mv {
        p.promote.get_or_insert(PieceKind::Queen);
    }
    if mv.make_raw(b).is_err() {
        return false;
    }
    let safe = !b.is_check(color);
    mv.unmake(b);
    safe
}

/// Checks whether `mv` is legal on board `b`
#[inline]
pub fn is_legal(b: &mut Board, mv: &Move) -> bool {
    mv.is_valid(b) && is_safe(b, mv)
}

/// Returns the set of squares where the piece on `src` can legally move
///
/// `prev` is the last move played on the board, if any.
pub fn legal_destinations(b: &mut Board, prev: Option<&Move>, src: Square) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for dst in Square::iter() {
        let mv = Move::classify(b, prev, src, dst);
        if is_legal(b, &mv) {
            res.set(dst);
        }
    }
    res
}

/// Adds all the legal moves of the side `color` to `dst`
///
/// Promotions are added once per target square, with the promotion kind not chosen yet.
pub fn legal_moves_into<P: MovePush>(
    b: &mut Board,
    prev: Option<&Move>,
    color: Color,
    dst: &mut P,
) {
    for src in b.color(color) {
        for target in Square::iter() {
            let mv = Move::classify(b, prev, src, target);
            if is_legal(b, &mv) {
                dst.push(mv);
            }
        }
    }
}

/// Returns all the legal moves of the side `color`
pub fn legal_moves(b: &mut Board, prev: Option<&Move>, color: Color) -> MoveList {
    let mut res = MoveList::new();
    legal_moves_into(b, prev, color, &mut res);
    res
}

/// Returns `true` if the side `color` has at least one legal move
pub fn has_legal_moves(b: &mut Board, prev: Option<&Move>, color: Color) -> bool {
    for src in b.color(color) {
        for target in Square::iter() {
            let mv = Move::classify(b, prev, src, target);
            if is_legal(b, &mv) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;
    use crate::types::Piece;
    use std::collections::BTreeSet;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn board(s: &str, side: Color) -> Board {
        let mut layout = Layout::from_str(s).unwrap();
        layout.side = side;
        Board::try_from(layout).unwrap()
    }

    fn names(ml: &MoveList) -> BTreeSet<String> {
        ml.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_initial() {
        let mut b = Board::initial();
        let ml = legal_moves(&mut b, None, Color::White);
        assert_eq!(ml.len(), 20);
        assert!(names(&ml).contains("g1f3"));
        assert!(names(&ml).contains("a2a4"));
        assert_eq!(legal_moves(&mut b, None, Color::Black).len(), 20);
        assert_eq!(b, Board::initial());

        let mut v = Vec::new();
        legal_moves_into(&mut b, None, Color::White, &mut v);
        assert_eq!(v.len(), 20);
    }

    #[test]
    fn test_destinations() {
        let mut b = Board::initial();
        assert_eq!(
            legal_destinations(&mut b, None, sq("b1")),
            Bitboard::EMPTY.with(sq("a3")).with(sq("c3"))
        );
        assert!(legal_destinations(&mut b, None, sq("e4")).is_empty());
        assert!(legal_destinations(&mut b, None, sq("d1")).is_empty());
    }

    #[test]
    fn test_pinned() {
        let mut b = board(
            "....R..K\n\n\n\n\n\n....b...\n....k...",
            Color::White,
        );
        assert!(legal_destinations(&mut b, None, sq("e2")).is_empty());
        assert_eq!(legal_destinations(&mut b, None, sq("e1")).len(), 4);
        let ml = legal_moves(&mut b, None, Color::White);
        assert_eq!(ml.len(), 4);
        assert!(ml.iter().all(|mv| mv.src() == Some(sq("e1"))));
    }

    #[test]
    fn test_castling_listed() {
        let mut b = board("R...K..R\n\n\n\n\n\n\nr...k..r", Color::White);
        let ml = names(&legal_moves(&mut b, None, Color::White));
        assert!(ml.contains("e1g1"));
        assert!(ml.contains("e1c1"));
    }

    #[test]
    fn test_promotion_listed() {
        let mut b = board("....K...\np\n\n\n\n\n\n....k...", Color::White);
        let ml = legal_moves(&mut b, None, Color::White);
        let promote: Vec<_> = ml.iter().filter(|mv| mv.is_promotion()).collect();
        assert_eq!(promote.len(), 1);
        assert_eq!(promote[0].promote(), None);
    }

    #[test]
    fn test_no_moves() {
        // Checkmate
        let mut b = board("r......K\n......PP\n\n\n\n\n\n....k...", Color::Black);
        assert!(b.is_check(Color::Black));
        assert!(!has_legal_moves(&mut b, None, Color::Black));
        assert!(legal_moves(&mut b, None, Color::Black).is_empty());
        assert!(has_legal_moves(&mut b, None, Color::White));

        // Stalemate
        let mut b = board("K.......\n\n.q......\n\n\n\n\n....k...", Color::Black);
        assert!(!b.is_check(Color::Black));
        assert!(!has_legal_moves(&mut b, None, Color::Black));
    }

    #[test]
    fn test_king_capture_not_legal() {
        let mut b = board("....K...\n\n\n\n\n\n\nr...k...", Color::White);
        b.put(sq("e8"), None);
        b.put(sq("a8"), Some(Piece::new(PieceKind::King, Color::Black)));
        let mv = Move::classify(&b, None, sq("a1"), sq("a8"));
        assert!(mv.is_valid(&b));
        assert!(!is_legal(&mut b, &mv));
        assert!(!names(&legal_moves(&mut b, None, Color::White)).contains("a1a8"));
    }
}
