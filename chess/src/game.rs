//! Game controller
//!
//! [`Game`] owns the board and the history of played moves. It enforces the turn order,
//! rejects moves that leave the own king under attack, detects checkmate, and walks the caller
//! through choosing the promotion piece.

use crate::bitboard::Bitboard;
use crate::board::{Board, Layout, ValidateError};
use crate::movegen;
use crate::moves::{Make, MakeError, Move, MoveRecord, PromoteError};
use crate::types::{Color, Piece, PieceKind, Square};

use thiserror::Error;

/// Reason to reject a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Error)]
pub enum RejectReason {
    /// The game is already finished
    #[error("game is finished")]
    GameOver,
    /// There is no piece on the source square
    #[error("no piece to move")]
    NoPiece,
    /// The piece belongs to the side which doesn't move now
    #[error("not your turn")]
    WrongSide,
    /// The move breaks the movement rules of the piece
    #[error("move is not valid")]
    Invalid,
    /// The move captures the king
    #[error("cannot capture the king")]
    CapturesKing,
    /// The move leaves the own king under attack
    #[error("king would be under attack")]
    ExposesKing,
    /// The move was built for another position
    #[error("move doesn't match the position")]
    Outdated,
}

/// Handle of the promotion awaiting the choice of the piece kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct PromotionHandle {
    src: Square,
    dst: Square,
    color: Color,
    ply: usize,
}

impl PromotionHandle {
    #[inline]
    pub fn src(&self) -> Square {
        self.src
    }

    #[inline]
    pub fn dst(&self) -> Square {
        self.dst
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the kinds the pawn may be promoted to
    #[inline]
    pub fn choices(&self) -> [PieceKind; 4] {
        PieceKind::PROMOTE
    }
}

/// Result of submitting a move
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The move was not played, the position is unchanged
    Rejected(RejectReason),
    /// The move was played
    Applied,
    /// The move was played and checkmated the opponent; contains the winner
    AppliedCheckmate(Color),
    /// The move is a valid promotion; the piece kind must be chosen via
    /// [`Game::resolve_promotion()`] before the move is played
    PendingPromotion(PromotionHandle),
}

impl MoveOutcome {
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, MoveOutcome::Rejected(_))
    }

    /// Returns `true` if the move was played
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            MoveOutcome::Applied | MoveOutcome::AppliedCheckmate(_)
        )
    }
}

/// Error resolving a pending promotion
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum PromotionError {
    /// No promotion is awaiting the choice
    #[error("no pending promotion")]
    NoPending,
    /// The handle doesn't refer to the pending promotion
    #[error("promotion handle is stale")]
    StaleHandle,
    /// The pawn cannot be promoted to this kind of piece
    #[error("cannot promote to {0:?}")]
    BadKind(PieceKind),
    /// The move cannot be applied
    #[error("cannot apply promotion: {0}")]
    Make(#[from] MakeError),
}

/// Game in progress
///
/// The game holds the only board. Moves are played with [`Game::submit_move()`], which
/// classifies and validates the move, or with [`Game::commit()`], which plays an already
/// classified one. Both flip the side to move after a successful move.
///
/// # Example
///
/// ```
/// # use gambit::{Game, MoveOutcome, Color, Square, PieceKind};
/// # use std::str::FromStr;
/// #
/// let sq = |s| Square::from_str(s).unwrap();
/// let mut game = Game::new_initial();
/// for (src, dst) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
///     assert_eq!(game.submit_move(sq(src), sq(dst)), MoveOutcome::Applied);
/// }
/// assert_eq!(
///     game.submit_move(sq("d8"), sq("h4")),
///     MoveOutcome::AppliedCheckmate(Color::Black)
/// );
/// assert_eq!(game.winner(), Some(Color::Black));
/// assert!(game.is_finished());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    history: Vec<Move>,
    winner: Option<Color>,
    pending: Option<Move>,
}

impl Game {
    pub fn new(board: Board) -> Game {
        Game {
            board,
            history: Vec::new(),
            winner: None,
            pending: None,
        }
    }

    pub fn new_initial() -> Game {
        Game::new(Board::initial())
    }

    pub fn from_layout(layout: Layout) -> Result<Game, ValidateError> {
        Ok(Game::new(Board::try_from(layout)?))
    }

    /// Starts a new game from `layout`, dropping the current one
    ///
    /// If the layout is invalid, the current game is kept.
    pub fn new_game(&mut self, layout: Layout) -> Result<(), ValidateError> {
        *self = Game::from_layout(layout)?;
        log_debug!("new game started");
        Ok(())
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the contents of the square `sq`
    #[inline]
    pub fn query(&self, sq: Square) -> Option<Piece> {
        self.board.get(sq)
    }

    /// Iterates over all 64 squares, together with their contents
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        self.board.iter()
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.board.side()
    }

    #[inline]
    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.winner.is_some()
    }

    /// Returns `true` if the side to move is in check
    #[inline]
    pub fn is_check(&self) -> bool {
        self.board.is_check(self.side())
    }

    /// Returns `true` if the side to move has at least one legal move
    ///
    /// If it has none and is not in check, the game is a stalemate. Stalemate doesn't finish
    /// the game by itself, so it is up to the caller to detect it.
    pub fn has_legal_moves(&self) -> bool {
        let mut board = self.board.clone();
        movegen::has_legal_moves(&mut board, self.history.last(), self.side())
    }

    /// Returns the squares where the piece on `src` can legally move
    ///
    /// The result is empty if the piece doesn't belong to the side to move or the game is over.
    pub fn legal_destinations(&self, src: Square) -> Bitboard {
        match self.board.get(src) {
            Some(p) if p.color == self.side() && !self.is_finished() => {
                let mut board = self.board.clone();
                movegen::legal_destinations(&mut board, self.history.last(), src)
            }
            _ => Bitboard::EMPTY,
        }
    }

    /// Returns the moves played so far, first move first
    #[inline]
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Returns the records of the moves played so far
    pub fn records(&self) -> Vec<MoveRecord> {
        self.history.iter().filter_map(Move::record).collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    #[inline]
    pub fn last_move(&self) -> Option<&Move> {
        self.history.last()
    }

    /// Returns the pending promotion, if any
    pub fn pending_promotion(&self) -> Option<PromotionHandle> {
        self.pending.as_ref().and_then(|mv| self.handle(mv))
    }

    /// Classifies the move from `src` to `dst` in the current position
    ///
    /// Nothing is validated here, use [`Game::commit()`] to play the move.
    #[inline]
    pub fn request(&self, src: Square, dst: Square) -> Move {
        Move::classify(&self.board, self.history.last(), src, dst)
    }

    fn handle(&self, mv: &Move) -> Option<PromotionHandle> {
        Some(PromotionHandle {
            src: mv.src()?,
            dst: mv.dst()?,
            color: mv.color()?,
            ply: self.history.len(),
        })
    }

    fn reject(&self, mv: &Move, reason: RejectReason) -> MoveOutcome {
        log_debug!("move {} rejected: {}", mv, reason);
        MoveOutcome::Rejected(reason)
    }

    /// Checks everything about `mv` except the safety of the own king
    fn check(&self, mv: &Move) -> Result<(), RejectReason> {
        if self.is_finished() {
            return Err(RejectReason::GameOver);
        }
        let Some(main) = mv.primary() else {
            return Err(RejectReason::NoPiece);
        };
        if main.piece().color != self.side() {
            return Err(RejectReason::WrongSide);
        }

        let mut fresh = self.request(main.src(), main.dst());
        if let (Move::Promotion(f), Move::Promotion(m)) = (&mut fresh, mv) {
            f.promote = m.promote;
        }
        if fresh != *mv {
            return Err(RejectReason::Outdated);
        }

        if !mv.is_valid(&self.board) {
            return Err(RejectReason::Invalid);
        }
        if mv.captured().map_or(false, |p| p.kind == PieceKind::King) {
            return Err(RejectReason::CapturesKing);
        }
        Ok(())
    }

    /// Requests the move from `src` to `dst`
    ///
    /// Any pending promotion is discarded. If the move is a valid promotion, it is not played
    /// right away: the caller must choose the piece kind via [`Game::resolve_promotion()`].
    pub fn submit_move(&mut self, src: Square, dst: Square) -> MoveOutcome {
        self.pending = None;
        let mv = self.request(src, dst);
        if let Err(reason) = self.check(&mv) {
            return self.reject(&mv, reason);
        }
        if !mv.is_promotion() {
            return self.play(mv);
        }
        if !movegen::is_safe(&mut self.board, &mv) {
            return self.reject(&mv, RejectReason::ExposesKing);
        }
        match self.handle(&mv) {
            Some(handle) => {
                log_debug!("move {} awaits promotion choice", mv);
                self.pending = Some(mv);
                MoveOutcome::PendingPromotion(handle)
            }
            None => self.reject(&mv, RejectReason::NoPiece),
        }
    }

    /// Chooses the piece kind for the pending promotion and plays it
    ///
    /// If `kind` is not a valid promotion target, the promotion stays pending.
    pub fn resolve_promotion(
        &mut self,
        handle: PromotionHandle,
        kind: PieceKind,
    ) -> Result<MoveOutcome, PromotionError> {
        let mut mv = self.pending.ok_or(PromotionError::NoPending)?;
        if self.handle(&mv) != Some(handle) {
            return Err(PromotionError::StaleHandle);
        }
        mv.set_promotion(kind).map_err(|e| match e {
            PromoteError::BadKind(k) => PromotionError::BadKind(k),
            PromoteError::NotPromotion => PromotionError::NoPending,
        })?;
        self.pending = None;
        log_debug!("promotion {} resolved", mv);
        Ok(self.commit(mv)?)
    }

    /// Plays the classified move `mv`
    ///
    /// Returns [`MakeError::UnresolvedPromotion`] if `mv` is a valid promotion with no piece kind
    /// chosen. Then the position is unchanged, and the same move can be committed again once
    /// [`Move::set_promotion()`] is called.
    pub fn commit(&mut self, mv: Move) -> Result<MoveOutcome, MakeError> {
        self.pending = None;
        if let Err(reason) = self.check(&mv) {
            return Ok(self.reject(&mv, reason));
        }
        if mv.is_promotion() && mv.promote().is_none() {
            return Err(MakeError::UnresolvedPromotion);
        }
        Ok(self.play(mv))
    }

    /// Plays the move which passed [`Game::check()`]
    fn play(&mut self, mv: Move) -> MoveOutcome {
        let Some(color) = mv.color() else {
            return self.reject(&mv, RejectReason::NoPiece);
        };
        if let Err(e) = mv.make_raw(&mut self.board) {
            log_debug!("move {} cannot be applied: {}", mv, e);
            return MoveOutcome::Rejected(RejectReason::Invalid);
        }
        if self.board.is_check(color) {
            mv.unmake(&mut self.board);
            return self.reject(&mv, RejectReason::ExposesKing);
        }
        self.history.push(mv);
        self.board.set_side(color.inv());
        log_debug!("move {} played by {}", mv, color.name());

        let opponent = color.inv();
        if self.board.is_check(opponent)
            && !movegen::has_legal_moves(&mut self.board, self.history.last(), opponent)
        {
            self.winner = Some(color);
            log_info!("checkmate, {} wins", color.name());
            return MoveOutcome::AppliedCheckmate(color);
        }
        MoveOutcome::Applied
    }

    /// Undoes the last move and returns it
    ///
    /// Clears the winner and any pending promotion. Returns `None` if no moves were played.
    pub fn undo_last(&mut self) -> Option<Move> {
        self.pending = None;
        let mv = self.history.pop()?;
        mv.unmake(&mut self.board);
        if let Some(color) = mv.color() {
            self.board.set_side(color);
        }
        self.winner = None;
        log_debug!("move {} undone", mv);
        Some(mv)
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new_initial()
    }
}
