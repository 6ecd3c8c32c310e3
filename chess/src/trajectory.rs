//! Piece trajectories
//!
//! A trajectory is the set of squares a piece occupies while travelling from one square to another,
//! endpoints included. It depends only on the piece and the geometry of the move, never on the pieces
//! currently standing on the board; checking for blocking pieces is up to the caller.

use crate::bitboard::Bitboard;
use crate::types::{Color, PieceKind, Square};

/// Returns all the squares from `src` to `dst` inclusive, walking one step at a time
///
/// The squares must lie on the same row, column or diagonal.
fn ray(src: Square, dst: Square) -> Bitboard {
    let (dr, dc) = src.delta(dst);
    let (step_r, step_c) = (dr.signum(), dc.signum());
    let mut res = Bitboard::from_square(src);
    let mut cur = src;
    while cur != dst {
        cur = match cur.try_shift(step_r, step_c) {
            Some(sq) => sq,
            None => return Bitboard::EMPTY,
        };
        res.set(cur);
    }
    res
}

fn straight(src: Square, dst: Square) -> Bitboard {
    let (dr, dc) = src.delta(dst);
    if (dr == 0) != (dc == 0) {
        ray(src, dst)
    } else {
        Bitboard::EMPTY
    }
}

fn diagonal(src: Square, dst: Square) -> Bitboard {
    let (dr, dc) = src.delta(dst);
    if dr != 0 && dr.abs() == dc.abs() {
        ray(src, dst)
    } else {
        Bitboard::EMPTY
    }
}

fn pawn(color: Color, has_moved: bool, src: Square, dst: Square, is_capture: bool) -> Bitboard {
    let (dr, dc) = src.delta(dst);
    if is_capture {
        if dr == color.sign() && dc.abs() == 1 {
            return Bitboard::from_square(src).with(dst);
        }
        return Bitboard::EMPTY;
    }
    let forward = dr * color.sign();
    if dc != 0 || forward <= 0 || forward > 2 || (forward == 2 && has_moved) {
        return Bitboard::EMPTY;
    }
    ray(src, dst)
}

/// Returns the trajectory of a piece moving from `src` to `dst`
///
/// The result is empty if the piece cannot make such a move geometrically. For sliding pieces
/// (Bishop, Rook, Queen) and for non-capturing pawn moves it contains every square on the way,
/// for King, Knight and capturing pawn moves it contains exactly `src` and `dst`.
///
/// Only pawns care about `color`, `has_moved` and `is_capture`: pawns advance in the direction of
/// [`Color::sign()`], may step two squares only before their first move, and capture diagonally.
pub fn trajectory(
    kind: PieceKind,
    color: Color,
    has_moved: bool,
    src: Square,
    dst: Square,
    is_capture: bool,
) -> Bitboard {
    if src == dst {
        return Bitboard::EMPTY;
    }
    let (dr, dc) = src.delta(dst);
    match kind {
        PieceKind::Pawn => pawn(color, has_moved, src, dst, is_capture),
        PieceKind::Knight => match (dr.abs(), dc.abs()) {
            (1, 2) | (2, 1) => Bitboard::from_square(src).with(dst),
            _ => Bitboard::EMPTY,
        },
        PieceKind::Bishop => diagonal(src, dst),
        PieceKind::Rook => straight(src, dst),
        PieceKind::Queen => straight(src, dst) | diagonal(src, dst),
        PieceKind::King => {
            if dr.abs() <= 1 && dc.abs() <= 1 {
                Bitboard::from_square(src).with(dst)
            } else {
                Bitboard::EMPTY
            }
        }
    }
}

/// Returns the squares of the trajectory strictly between its endpoints
///
/// These are the squares which must be empty for the move to be possible.
#[inline]
pub fn between(traj: Bitboard, src: Square, dst: Square) -> Bitboard {
    traj.without(src).without(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    fn sq(s: &str) -> Square {
        Square::from_str(s).unwrap()
    }

    fn squares(list: &[&str]) -> Bitboard {
        list.iter().map(|s| sq(s)).collect()
    }

    const SLIDERS: [PieceKind; 3] = [PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen];

    #[test]
    fn test_pawn() {
        let w = Color::White;
        let b = Color::Black;
        assert_eq!(
            trajectory(PieceKind::Pawn, w, false, sq("e2"), sq("e4"), false),
            squares(&["e2", "e3", "e4"])
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, w, true, sq("e2"), sq("e4"), false),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, w, true, sq("e3"), sq("e4"), false),
            squares(&["e3", "e4"])
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, w, false, sq("e3"), sq("e2"), false),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, b, false, sq("d7"), sq("d5"), false),
            squares(&["d7", "d6", "d5"])
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, b, false, sq("d7"), sq("d4"), false),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, w, false, sq("e2"), sq("e3"), true),
            Bitboard::EMPTY
        );
    }

    #[test]
    fn test_pawn_capture() {
        assert_eq!(
            trajectory(PieceKind::Pawn, Color::White, true, sq("e4"), sq("d5"), true),
            squares(&["e4", "d5"])
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, Color::White, true, sq("e4"), sq("d3"), true),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, Color::Black, true, sq("e5"), sq("f4"), true),
            squares(&["e5", "f4"])
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, Color::Black, false, sq("e7"), sq("e6"), true),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Pawn, Color::White, false, sq("e4"), sq("d5"), false),
            Bitboard::EMPTY
        );
    }

    #[test]
    fn test_knight_and_king() {
        for color in [Color::White, Color::Black] {
            assert_eq!(
                trajectory(PieceKind::Knight, color, false, sq("g1"), sq("f3"), false),
                squares(&["g1", "f3"])
            );
            assert_eq!(
                trajectory(PieceKind::Knight, color, false, sq("g1"), sq("g3"), true),
                Bitboard::EMPTY
            );
            assert_eq!(
                trajectory(PieceKind::King, color, true, sq("e1"), sq("d2"), false),
                squares(&["e1", "d2"])
            );
            assert_eq!(
                trajectory(PieceKind::King, color, false, sq("e1"), sq("g1"), false),
                Bitboard::EMPTY
            );
        }
    }

    #[test]
    fn test_sliders() {
        let w = Color::White;
        assert_eq!(
            trajectory(PieceKind::Bishop, w, false, sq("c1"), sq("f4"), false),
            squares(&["c1", "d2", "e3", "f4"])
        );
        assert_eq!(
            trajectory(PieceKind::Bishop, w, false, sq("c1"), sq("c4"), false),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Rook, w, false, sq("a1"), sq("a4"), false),
            squares(&["a1", "a2", "a3", "a4"])
        );
        assert_eq!(
            trajectory(PieceKind::Rook, w, false, sq("h8"), sq("e8"), true),
            squares(&["h8", "g8", "f8", "e8"])
        );
        assert_eq!(
            trajectory(PieceKind::Rook, w, false, sq("a1"), sq("b2"), false),
            Bitboard::EMPTY
        );
        assert_eq!(
            trajectory(PieceKind::Queen, w, false, sq("d1"), sq("h5"), false),
            squares(&["d1", "e2", "f3", "g4", "h5"])
        );
        assert_eq!(
            trajectory(PieceKind::Queen, w, false, sq("d1"), sq("d8"), false).len(),
            8
        );
        assert_eq!(
            trajectory(PieceKind::Queen, w, false, sq("d1"), sq("e3"), false),
            Bitboard::EMPTY
        );
    }

    #[test]
    fn test_between() {
        let traj = trajectory(PieceKind::Rook, Color::Black, false, sq("a8"), sq("d8"), false);
        assert_eq!(between(traj, sq("a8"), sq("d8")), squares(&["b8", "c8"]));
        let traj = trajectory(PieceKind::Knight, Color::Black, false, sq("b8"), sq("c6"), false);
        assert!(between(traj, sq("b8"), sq("c6")).is_empty());
    }

    fn any_square() -> impl Strategy<Value = Square> {
        (0..64_usize).prop_map(Square::from_index)
    }

    proptest! {
        #[test]
        fn prop_sliders_contain_endpoints(src in any_square(), dst in any_square()) {
            for kind in SLIDERS {
                let traj = trajectory(kind, Color::White, false, src, dst, false);
                if traj.is_nonempty() {
                    let (dr, dc) = src.delta(dst);
                    prop_assert!(traj.has(src));
                    prop_assert!(traj.has(dst));
                    prop_assert_eq!(traj.len() as isize, dr.abs().max(dc.abs()) + 1);
                }
            }
        }

        #[test]
        fn prop_queen_is_rook_or_bishop(src in any_square(), dst in any_square()) {
            let queen = trajectory(PieceKind::Queen, Color::Black, true, src, dst, true);
            let rook = trajectory(PieceKind::Rook, Color::Black, true, src, dst, true);
            let bishop = trajectory(PieceKind::Bishop, Color::Black, true, src, dst, true);
            prop_assert_eq!(queen, rook | bishop);
            prop_assert!((rook & bishop).is_empty());
        }

        #[test]
        fn prop_symmetric_for_non_pawns(src in any_square(), dst in any_square()) {
            for kind in [PieceKind::Knight, PieceKind::Bishop, PieceKind::Rook, PieceKind::Queen, PieceKind::King] {
                prop_assert_eq!(
                    trajectory(kind, Color::White, false, src, dst, false),
                    trajectory(kind, Color::Black, true, dst, src, true)
                );
            }
        }
    }
}
