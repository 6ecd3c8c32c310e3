//! Board and related things

use crate::bitboard::Bitboard;
use crate::geometry;
use crate::moves::Move;
use crate::types::{Color, File, Piece, PieceKind, Rank, Square};

use std::fmt::{self, Display};
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

/// Board validation error
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// One of the sides doesn't have a king
    #[error("no king of color {0:?}")]
    NoKing(Color),
    /// One of the sides has more than one king
    #[error("more than one king of color {0:?}")]
    TooManyKings(Color),
    /// There is a pawn on the first or on the last row
    #[error("invalid pawn position {0}")]
    InvalidPawn(Square),
    /// Opponent's king is under attack, so it could be captured right away
    #[error("opponent's king is attacked")]
    OpponentKingAttacked,
}

/// Error parsing a [`Layout`] grid
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum LayoutParseError {
    /// The grid has more than 8 non-empty rows
    #[error("too many rows")]
    TooManyRows,
    /// Row has more than 8 squares
    #[error("too many items in row {0}")]
    RowOverflow(usize),
    /// Unexpected character
    #[error("unexpected char {0:?}")]
    UnexpectedChar(char),
}

/// Error loading a [`Board`] from layout text
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Layout cannot be read
    #[error("cannot read layout: {0}")]
    Io(#[from] io::Error),
    /// Layout cannot be parsed
    #[error("cannot parse layout: {0}")]
    Parse(#[from] LayoutParseError),
    /// Layout was parsed, but the position is invalid
    #[error("invalid position: {0}")]
    Invalid(#[from] ValidateError),
}

/// Raw board layout
///
/// Layout is the unvalidated description of a position: what stands on every square and which
/// side moves first. It must be converted to [`Board`] via [`Board::try_from()`] before playing.
///
/// The text form of the layout is a grid of 8 lines, row 0 (Black's back rank) first. Every line
/// contains one char per column: `r`, `n`, `b`, `q`, `k` or `p` for a piece (lowercase for White,
/// uppercase for Black), `.` or space for an empty square. Short lines are padded with empty
/// squares, missing rows are empty.
///
/// # Example
///
/// ```
/// # use gambit::{Layout, Board, Color, Piece, PieceKind, Square};
/// #
/// let layout: Layout = "....K...\n\n\n\n\n\n\n....k..r".parse().unwrap();
/// let board = Board::try_from(layout).unwrap();
/// let e1 = "e1".parse::<Square>().unwrap();
/// assert_eq!(board.get(e1), Some(Piece::new(PieceKind::King, Color::White)));
/// assert_eq!(board.king_square(Color::White), e1);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Layout {
    /// Contents of the board, indexed by square index
    pub cells: [Option<Piece>; 64],
    /// Side to move
    pub side: Color,
}

impl Layout {
    /// Returns an empty layout with White to move
    pub const fn empty() -> Layout {
        Layout {
            cells: [None; 64],
            side: Color::White,
        }
    }

    /// Returns the initial position
    pub fn initial() -> Layout {
        let mut res = Layout::empty();
        for color in [Color::White, Color::Black] {
            let pawns = geometry::pawn_rank(color);
            let back = geometry::back_rank(color);
            for file in File::iter() {
                res.put2(file, pawns, Some(Piece::new(PieceKind::Pawn, color)));
            }
            for (file, kind) in [
                (File::A, PieceKind::Rook),
                (File::B, PieceKind::Knight),
                (File::C, PieceKind::Bishop),
                (File::D, PieceKind::Queen),
                (File::E, PieceKind::King),
                (File::F, PieceKind::Bishop),
                (File::G, PieceKind::Knight),
                (File::H, PieceKind::Rook),
            ] {
                res.put2(file, back, Some(Piece::new(kind, color)));
            }
        }
        res
    }

    /// Reads and parses the layout from the file at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Layout, LayoutError> {
        Ok(Layout::from_str(&fs::read_to_string(path)?)?)
    }

    /// Reads and parses the layout from `reader`
    pub fn from_reader(mut reader: impl Read) -> Result<Layout, LayoutError> {
        let mut s = String::new();
        reader.read_to_string(&mut s)?;
        Ok(Layout::from_str(&s)?)
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    #[inline]
    pub fn put(&mut self, sq: Square, cell: Option<Piece>) {
        self.cells[sq.index()] = cell;
    }

    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Option<Piece>) {
        self.put(Square::from_parts(file, rank), cell);
    }
}

impl Default for Layout {
    fn default() -> Layout {
        Layout::empty()
    }
}

impl FromStr for Layout {
    type Err = LayoutParseError;

    fn from_str(s: &str) -> Result<Layout, Self::Err> {
        type Error = LayoutParseError;

        let mut res = Layout::empty();
        for (row, line) in s.lines().enumerate() {
            let line = line.trim_end();
            if row >= 8 {
                if line.is_empty() {
                    continue;
                }
                return Err(Error::TooManyRows);
            }
            for (col, c) in line.chars().enumerate() {
                if col >= 8 {
                    return Err(Error::RowOverflow(row));
                }
                let cell = match c {
                    '.' | ' ' => None,
                    _ => Some(Piece::from_char(c).ok_or(Error::UnexpectedChar(c))?),
                };
                res.cells[row * 8 + col] = cell;
            }
        }
        Ok(res)
    }
}

impl Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            for file in File::iter() {
                match self.get(Square::from_parts(file, rank)) {
                    Some(p) => write!(f, "{}", p)?,
                    None => write!(f, ".")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Board that contains a valid position
///
/// The board is the single mutable source of truth for the game: what stands on every square,
/// which side moves, and where the kings are. The king squares are cached and kept in sync with
/// every placement of a king.
///
/// Both kings are always present. The board never changes on its own; it is mutated only by
/// applying and undoing moves (see [`Move::make()`] and [`Move::unmake()`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Option<Piece>; 64],
    side: Color,
    kings: [Square; 2],
}

impl Board {
    /// Returns a board with the initial position
    pub fn initial() -> Board {
        let layout = Layout::initial();
        let mut kings = [Square::from_index(0); 2];
        for color in [Color::White, Color::Black] {
            kings[color.index()] = Square::from_parts(File::E, geometry::back_rank(color));
        }
        Board {
            cells: layout.cells,
            side: layout.side,
            kings,
        }
    }

    /// Parses and validates a board from the layout grid text
    pub fn from_layout(s: &str) -> Result<Board, LayoutError> {
        Ok(Board::try_from(Layout::from_str(s)?)?)
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.cells[sq.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Option<Piece> {
        self.get(Square::from_parts(file, rank))
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    #[inline]
    pub(crate) fn set_side(&mut self, side: Color) {
        self.side = side;
    }

    /// Returns the square of the king of color `c`
    #[inline]
    pub fn king_square(&self, c: Color) -> Square {
        self.kings[c.index()]
    }

    /// Puts `cell` on the square `sq`, replacing whatever stands there
    pub(crate) fn put(&mut self, sq: Square, cell: Option<Piece>) {
        self.cells[sq.index()] = cell;
        if let Some(p) = cell {
            if p.kind == PieceKind::King {
                self.kings[p.color.index()] = sq;
            }
        }
    }

    /// Moves `piece` from `src` to `dst` and marks it as moved
    ///
    /// `src` becomes empty and the previous contents of `dst` are lost.
    pub(crate) fn relocate(&mut self, piece: Piece, src: Square, dst: Square) {
        self.put(src, None);
        self.put(dst, Some(piece.moved()));
    }

    /// Iterates over all 64 squares, together with their contents
    pub fn iter(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        Square::iter().map(move |sq| (sq, self.get(sq)))
    }

    /// Returns the set of all occupied squares
    pub fn occupied(&self) -> Bitboard {
        self.iter()
            .filter_map(|(sq, cell)| cell.map(|_| sq))
            .collect()
    }

    /// Returns the set of squares occupied by the pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        self.iter()
            .filter_map(|(sq, cell)| cell.filter(|p| p.color == c).map(|_| sq))
            .collect()
    }

    /// Returns all the pieces of color `defender.inv()` which attack the square `sq`
    ///
    /// A piece attacks a square if it could capture a piece of color `defender` standing there, by
    /// the same rules used to validate real moves. Castling never attacks anything.
    pub fn attackers(&self, sq: Square, defender: Color) -> Bitboard {
        self.color(defender.inv())
            .into_iter()
            .filter(|&src| Move::threat(self, src, sq, defender).is_valid(self))
            .collect()
    }

    /// Returns `true` if the square `sq` is attacked by the opponent of `defender`
    pub fn is_attacked(&self, sq: Square, defender: Color) -> bool {
        self.color(defender.inv())
            .into_iter()
            .any(|src| Move::threat(self, src, sq, defender).is_valid(self))
    }

    /// Returns `true` if the king of color `c` is under attack
    #[inline]
    pub fn is_check(&self, c: Color) -> bool {
        self.is_attacked(self.king_square(c), c)
    }

    /// Returns the current position as a layout
    pub fn layout(&self) -> Layout {
        Layout {
            cells: self.cells,
            side: self.side,
        }
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use gambit::{Board, board::PrettyStyle};
    /// #
    /// let b = Board::initial();
    ///
    /// let res = r#"
    /// 8|RNBQKBNR
    /// 7|PPPPPPPP
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|pppppppp
    /// 1|rnbqkbnr
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(b.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { board: self, style }
    }
}

impl TryFrom<Layout> for Board {
    type Error = ValidateError;

    fn try_from(layout: Layout) -> Result<Board, ValidateError> {
        let mut kings = [None; 2];
        for (idx, cell) in layout.cells.iter().enumerate() {
            let sq = Square::from_index(idx);
            let piece = match cell {
                Some(p) => p,
                None => continue,
            };
            match piece.kind {
                PieceKind::King => {
                    if kings[piece.color.index()].replace(sq).is_some() {
                        return Err(ValidateError::TooManyKings(piece.color));
                    }
                }
                PieceKind::Pawn => {
                    if sq.row() == 0 || sq.row() == 7 {
                        return Err(ValidateError::InvalidPawn(sq));
                    }
                }
                _ => {}
            }
        }

        let white = kings[Color::White.index()].ok_or(ValidateError::NoKing(Color::White))?;
        let black = kings[Color::Black.index()].ok_or(ValidateError::NoKing(Color::Black))?;
        let res = Board {
            cells: layout.cells,
            side: layout.side,
            kings: [white, black],
        };
        if res.is_check(res.side.inv()) {
            return Err(ValidateError::OpponentKingAttacked);
        }
        Ok(res)
    }
}

impl TryFrom<&Layout> for Board {
    type Error = ValidateError;

    fn try_from(layout: &Layout) -> Result<Board, ValidateError> {
        (*layout).try_into()
    }
}

/// Style for [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`Board::pretty()`] for more details.
pub struct Pretty<'a> {
    board: &'a Board,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn piece(p: Piece) -> char;

    fn cell(c: Option<Piece>) -> char {
        c.map_or('.', Self::piece)
    }

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(b: &Board, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(b.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(b.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn piece(p: Piece) -> char {
        p.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn piece(p: Piece) -> char {
        p.as_utf8_char()
    }
}

impl<'a> Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.board, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.board, f),
        }
    }
}
