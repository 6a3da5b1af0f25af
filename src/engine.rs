//! The engine: turn bookkeeping, move validation and execution, and the
//! reversible move log.
//!
//! Every mutation goes through `validate_and_make_move` / `undo_move`, and
//! every mutation ends with a full regeneration, so the cached move list and
//! check report are always consistent with the board. Illegal requests and
//! empty-history undos are silent no-ops returning `false`, never errors.

use tracing::debug;

use crate::board::Board;
use crate::check::CheckReport;
use crate::movegen::{self, Generation};
use crate::piece::{Piece, PieceKind, king_home, pawn_start_row, promotion_row};
use crate::types::{ChessError, Color, Move, Pos};

// ---------------------------------------------------------------------------
// Move log
// ---------------------------------------------------------------------------

/// A value snapshot of one board mutation, sufficient to reverse it exactly.
///
/// Castling and en passant push a second, auxiliary entry for the rook move
/// or the removed pawn *before* the primary entry; the primary's flag tells
/// `undo_move` to pop and reverse both as a unit.
#[derive(Clone, Copy, Debug)]
pub struct MoveLogEntry {
    pub mv: Move,
    /// The moving piece as it stood on `mv.start` before the move.
    pub moved: Piece,
    /// Whatever occupied `mv.end` before the move (usually the empty
    /// placeholder).
    pub captured: Piece,
    /// Primary entry of an en-passant capture; an aux entry precedes it.
    pub en_passant: bool,
    /// Primary entry of a castle; the rook's aux entry precedes it.
    pub castling: bool,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// A full game state: board, move counter, history, and the cached
/// generation for the current position.
#[derive(Clone, Debug)]
pub struct Engine {
    board: Board,
    move_number: u32,
    log: Vec<MoveLogEntry>,
    generation: Generation,
}

impl Engine {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// A game from the standard starting position.
    pub fn new() -> Self {
        let board = Board::starting();
        let generation = movegen::generate_all_valid_moves(&board, 0);
        let mut engine = Engine {
            board,
            move_number: 0,
            log: Vec::new(),
            generation,
        };
        engine.sync_checked_flags();
        engine
    }

    /// A game from a custom layout string. White moves first.
    pub fn from_layout(layout: &str) -> Result<Self, ChessError> {
        let board = Board::from_layout(layout)?;
        let generation = movegen::generate_all_valid_moves(&board, 0);
        let mut engine = Engine {
            board,
            move_number: 0,
            log: Vec::new(),
            generation,
        };
        engine.sync_checked_flags();
        Ok(engine)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, pos: Pos) -> &Piece {
        self.board.get(pos)
    }

    /// Completed half-moves.
    pub fn move_number(&self) -> u32 {
        self.move_number
    }

    /// White on even move counts, Black on odd.
    pub fn side_to_move(&self) -> Color {
        if self.move_number.is_multiple_of(2) {
            Color::White
        } else {
            Color::Black
        }
    }

    /// Every legal move in the position, both colours.
    pub fn legal_moves(&self) -> &[Move] {
        &self.generation.moves
    }

    /// Legal moves for the piece on a square.
    pub fn moves_from(&self, start: Pos) -> Vec<Move> {
        self.generation.moves_from(start).collect()
    }

    /// Legal moves belonging to one side.
    pub fn legal_moves_for(&self, color: Color) -> Vec<Move> {
        self.generation
            .moves
            .iter()
            .copied()
            .filter(|m| self.board.get(m.start).color == color)
            .collect()
    }

    /// Whether a side's king is currently attacked.
    pub fn in_check(&self, color: Color) -> bool {
        self.generation.report.for_color(color).in_check
    }

    /// Squares a side attacks in the current position.
    pub fn attack_squares(&self, color: Color) -> &std::collections::HashSet<Pos> {
        self.generation.attacks(color)
    }

    /// The current check/pin analysis.
    pub fn check_report(&self) -> &CheckReport {
        &self.generation.report
    }

    // -----------------------------------------------------------------------
    // Move execution
    // -----------------------------------------------------------------------

    /// Try to play `start → end` for the side to move. Returns whether the
    /// move was made; illegal requests change nothing.
    pub fn attempt_move(&mut self, start: Pos, end: Pos) -> bool {
        self.validate_and_make_move(Move::new(start, end))
    }

    /// Validate a move against the side to move and the cached legal list,
    /// then execute it. Rejections are silent.
    pub fn validate_and_make_move(&mut self, mv: Move) -> bool {
        if !mv.start.in_bounds() || !mv.end.in_bounds() {
            debug!(%mv, "rejected: off-board coordinates");
            return false;
        }
        let mover = self.board.get(mv.start);
        if mover.color != self.side_to_move() {
            debug!(%mv, side = %self.side_to_move(), "rejected: not this side's piece");
            return false;
        }
        if !self.generation.moves.contains(&mv) {
            debug!(%mv, "rejected: not a legal move");
            return false;
        }
        self.make_move(mv);
        true
    }

    /// Execute an already-validated move: log, apply, handle the special
    /// forms, regenerate.
    fn make_move(&mut self, mv: Move) {
        self.move_number += 1;

        let moved = *self.board.get(mv.start);
        let captured = *self.board.get(mv.end);

        let is_castle = moved.kind == PieceKind::King
            && mv.start == king_home(moved.color)
            && moved.can_castle
            && (mv.end.col - mv.start.col).abs() == 2;
        let is_en_passant =
            moved.kind == PieceKind::Pawn && mv.start.col != mv.end.col && captured.is_empty();
        let is_promotion =
            moved.kind == PieceKind::Pawn && mv.end.row == promotion_row(moved.color);

        if is_castle {
            // Move the rook first and log it as the aux entry.
            let row = mv.start.row;
            let (rook_start, rook_end) = if mv.end.col == 6 {
                (Pos::new(row, 7), Pos::new(row, 5))
            } else {
                (Pos::new(row, 0), Pos::new(row, 3))
            };
            let rook = *self.board.get(rook_start);
            self.log.push(MoveLogEntry {
                mv: Move::new(rook_start, rook_end),
                moved: rook,
                captured: *self.board.get(rook_end),
                en_passant: false,
                castling: false,
            });
            let mut placed_rook = rook;
            placed_rook.can_castle = false;
            self.board
                .move_piece(Move::new(rook_start, rook_end), placed_rook, Piece::empty(rook_start));
            debug!(%mv, "castling");
        } else if is_en_passant {
            // Remove the bypassed pawn and log its square as a zero-length
            // aux entry so undo restores it in place.
            let victim_sq = Pos::new(mv.start.row, mv.end.col);
            let victim = *self.board.get(victim_sq);
            self.log.push(MoveLogEntry {
                mv: Move::new(victim_sq, victim_sq),
                moved: victim,
                captured: Piece::empty(victim_sq),
                en_passant: false,
                castling: false,
            });
            self.board.place(victim_sq, Piece::empty(victim_sq));
            debug!(%mv, victim = %victim_sq, "en passant");
        }

        self.log.push(MoveLogEntry {
            mv,
            moved,
            captured,
            en_passant: is_en_passant,
            castling: is_castle,
        });

        let mut placed = moved;
        match placed.kind {
            PieceKind::King | PieceKind::Rook => placed.can_castle = false,
            PieceKind::Pawn => {
                if (mv.end.row - mv.start.row).abs() == 2
                    && mv.start.row == pawn_start_row(placed.color)
                {
                    // Double step: open the en-passant window. It closes by
                    // itself when the move counter advances past it.
                    placed.ep_capturable = true;
                    placed.ep_set_on = self.move_number;
                }
                if is_promotion {
                    debug!(%mv, "promotion to queen");
                    placed = Piece::new(PieceKind::Queen, placed.color, mv.end);
                }
            }
            _ => {}
        }
        self.board.move_piece(mv, placed, Piece::empty(mv.start));

        self.refresh();
    }

    /// Reverse the most recent move. Returns whether anything was undone.
    pub fn undo_move(&mut self) -> bool {
        let Some(entry) = self.log.pop() else {
            debug!("undo with empty history");
            return false;
        };
        self.move_number -= 1;

        // Captured first, moved second: on the zero-length aux entries the
        // squares coincide and the moved piece must win.
        self.board.place(entry.mv.end, entry.captured);
        self.board.place(entry.mv.start, entry.moved);

        if entry.castling || entry.en_passant {
            let aux = self
                .log
                .pop()
                .expect("special moves always log a paired aux entry");
            self.board.place(aux.mv.end, aux.captured);
            self.board.place(aux.mv.start, aux.moved);
        }

        self.refresh();
        true
    }

    // -----------------------------------------------------------------------
    // Cache maintenance
    // -----------------------------------------------------------------------

    /// Regenerate the cached move list and check report, then mirror the
    /// check state onto the king pieces for rendering layers.
    fn refresh(&mut self) {
        self.generation = movegen::generate_all_valid_moves(&self.board, self.move_number);
        self.sync_checked_flags();
    }

    fn sync_checked_flags(&mut self) {
        for color in [Color::White, Color::Black] {
            let in_check = self.generation.report.for_color(color).in_check;
            let king_sq = self.board.king(color);
            self.board.get_mut(king_sq).checked = in_check;
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
