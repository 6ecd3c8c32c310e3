use crate::types::{Color, Rank};

/// Rank where the pieces of color `c` start
pub const fn back_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank where the pawns of color `c` start
pub const fn pawn_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Last rank for the pawns of color `c`, i.e. the rank where they get promoted
pub const fn promote_rank(c: Color) -> Rank {
    back_rank(c.inv())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranks() {
        assert_eq!(promote_rank(Color::White).index(), 0);
        assert_eq!(promote_rank(Color::Black).index(), 7);
        assert_eq!(back_rank(Color::White).index(), 7);
        assert_eq!(pawn_rank(Color::Black).index(), 1);
    }
}
