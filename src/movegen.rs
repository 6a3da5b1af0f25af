//! Legal-move generation and attack maps.
//!
//! `generate_all_valid_moves` produces, in one pass: the fully legal move
//! list for both colours, the per-colour attack maps, and the check report
//! the moves were filtered against. Non-king pieces are filtered by the pin
//! lines and check-evasion squares from the detector; kings are filtered by
//! the enemy attack map.
//!
//! Attack maps are geometric, not legal: pawn capture diagonals count
//! regardless of occupancy, defended allied squares are included, and slider
//! rays continue through the enemy king. Those three rules make "king may
//! not step onto an attacked square" exact without a second probe.

use std::collections::HashSet;

use crate::board::Board;
use crate::check::{self, CheckReport, ColorConstraints};
use crate::piece::{
    MoveCapability, Piece, PieceKind, king_home, pawn_forward, pawn_start_row,
};
use crate::types::{Color, Move, Pos};

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// One full generation pass over a position.
#[derive(Clone, Debug, Default)]
pub struct Generation {
    /// Every legal move for both colours. Turn order is enforced at
    /// validation time, not here.
    pub moves: Vec<Move>,
    /// Squares attacked by White.
    pub white_attacks: HashSet<Pos>,
    /// Squares attacked by Black.
    pub black_attacks: HashSet<Pos>,
    /// The check/pin analysis the moves were filtered against.
    pub report: CheckReport,
}

impl Generation {
    pub fn attacks(&self, color: Color) -> &HashSet<Pos> {
        match color {
            Color::White => &self.white_attacks,
            Color::Black => &self.black_attacks,
            Color::Empty => unreachable!("vacant colour attacks nothing"),
        }
    }

    /// Legal moves starting on a square.
    pub fn moves_from(&self, start: Pos) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().copied().filter(move |m| m.start == start)
    }
}

/// Generate everything for a position. `move_number` gates the en-passant
/// capture window.
pub fn generate_all_valid_moves(board: &Board, move_number: u32) -> Generation {
    let report = check::analyze(board);

    let mut white_attacks = HashSet::new();
    let mut black_attacks = HashSet::new();
    for row in 0..8 {
        for col in 0..8 {
            let piece = board.get(Pos::new(row, col));
            match piece.color {
                Color::White => attack_squares(board, piece, &mut white_attacks),
                Color::Black => attack_squares(board, piece, &mut black_attacks),
                Color::Empty => {}
            }
        }
    }

    // Non-king moves first, kings last: king legality reads the finished
    // enemy attack map.
    let mut moves = Vec::new();
    for row in 0..8 {
        for col in 0..8 {
            let piece = board.get(Pos::new(row, col));
            if !piece.color.is_side() || piece.kind == PieceKind::King {
                continue;
            }
            let constraints = report.for_color(piece.color);
            piece_moves(board, piece, constraints, move_number, &mut moves);
        }
    }
    for color in [Color::White, Color::Black] {
        let king = *board.get(board.king(color));
        let enemy_attacks = match color {
            Color::White => &black_attacks,
            _ => &white_attacks,
        };
        king_moves(board, &king, report.for_color(color), enemy_attacks, &mut moves);
    }

    Generation {
        moves,
        white_attacks,
        black_attacks,
        report,
    }
}

// ---------------------------------------------------------------------------
// Attack maps
// ---------------------------------------------------------------------------

/// Add every square `piece` attacks to `out`.
///
/// Sliders x-ray through the enemy king so squares behind a checked king
/// still count as attacked.
pub fn attack_squares(board: &Board, piece: &Piece, out: &mut HashSet<Pos>) {
    match piece.kind.capability() {
        MoveCapability::Sliding => {
            let enemy_king = board.king(piece.color.opponent());
            for &dir in piece.kind.directions() {
                for n in 1..8 {
                    let sq = piece.pos.step(dir, n);
                    if !sq.in_bounds() {
                        break;
                    }
                    out.insert(sq);
                    if !board.get(sq).is_empty() && sq != enemy_king {
                        break;
                    }
                }
            }
        }
        MoveCapability::Stepping | MoveCapability::KingMoves => {
            for &off in piece.kind.directions() {
                let sq = piece.pos.offset(off.0, off.1);
                if sq.in_bounds() {
                    out.insert(sq);
                }
            }
        }
        MoveCapability::PawnMoves => {
            let fwd = pawn_forward(piece.color);
            for d_col in [-1, 1] {
                let sq = piece.pos.offset(fwd, d_col);
                if sq.in_bounds() {
                    out.insert(sq);
                }
            }
        }
        MoveCapability::None => {}
    }
}

// ---------------------------------------------------------------------------
// Per-piece generation
// ---------------------------------------------------------------------------

/// Legal moves for a non-king piece, pin- and check-filtered.
fn piece_moves(
    board: &Board,
    piece: &Piece,
    constraints: &ColorConstraints,
    move_number: u32,
    out: &mut Vec<Move>,
) {
    // Under double check only the king moves.
    if constraints.double_check() {
        return;
    }
    let pin = constraints.pin_line(piece.pos);

    match piece.kind.capability() {
        MoveCapability::Sliding => {
            for &dir in piece.kind.directions() {
                for n in 1..8 {
                    let sq = piece.pos.step(dir, n);
                    if !sq.in_bounds() {
                        break;
                    }
                    let target = board.get(sq);
                    if target.color == piece.color {
                        break;
                    }
                    push_if_allowed(piece.pos, sq, pin, constraints, out);
                    if !target.is_empty() {
                        break;
                    }
                }
            }
        }
        MoveCapability::Stepping => {
            for &off in piece.kind.directions() {
                let sq = piece.pos.offset(off.0, off.1);
                if sq.in_bounds() && board.get(sq).color != piece.color {
                    push_if_allowed(piece.pos, sq, pin, constraints, out);
                }
            }
        }
        MoveCapability::PawnMoves => {
            pawn_moves(board, piece, constraints, pin, move_number, out);
        }
        MoveCapability::KingMoves | MoveCapability::None => {}
    }
}

/// Push `start → end` if it satisfies the pin line and, under check, lands
/// on an evasion square.
fn push_if_allowed(
    start: Pos,
    end: Pos,
    pin: Option<&[Pos]>,
    constraints: &ColorConstraints,
    out: &mut Vec<Move>,
) {
    if let Some(line) = pin {
        if !line.contains(&end) {
            return;
        }
    }
    if constraints.in_check && !constraints.evasions.contains(&end) {
        return;
    }
    out.push(Move::new(start, end));
}

fn pawn_moves(
    board: &Board,
    piece: &Piece,
    constraints: &ColorConstraints,
    pin: Option<&[Pos]>,
    move_number: u32,
    out: &mut Vec<Move>,
) {
    let fwd = pawn_forward(piece.color);

    // Forward pushes: blocked by any piece, never capture.
    let one = piece.pos.offset(fwd, 0);
    if one.in_bounds() && board.get(one).is_empty() {
        push_if_allowed(piece.pos, one, pin, constraints, out);
        if piece.pos.row == pawn_start_row(piece.color) {
            let two = piece.pos.offset(2 * fwd, 0);
            if board.get(two).is_empty() {
                push_if_allowed(piece.pos, two, pin, constraints, out);
            }
        }
    }

    // Diagonal captures.
    for d_col in [-1, 1] {
        let sq = piece.pos.offset(fwd, d_col);
        if !sq.in_bounds() {
            continue;
        }
        let target = board.get(sq);
        if target.color == piece.color.opponent() {
            push_if_allowed(piece.pos, sq, pin, constraints, out);
        }
    }

    // En passant: an adjacent enemy pawn whose double-step window is still
    // open. The window is the single move after `ep_set_on`, so eligibility
    // is simply a counter comparison; nothing is ever cleared.
    for d_col in [-1, 1] {
        let beside = piece.pos.offset(0, d_col);
        if !beside.in_bounds() {
            continue;
        }
        let target = board.get(beside);
        if target.kind != PieceKind::Pawn
            || target.color != piece.color.opponent()
            || !target.ep_capturable
            || target.ep_set_on != move_number
        {
            continue;
        }
        let end = piece.pos.offset(fwd, d_col);
        if let Some(line) = pin {
            if !line.contains(&end) {
                continue;
            }
        }
        // Under check the capture resolves it either by taking the checking
        // pawn or by landing on an interposition square.
        if constraints.in_check
            && !constraints.evasions.contains(&beside)
            && !constraints.evasions.contains(&end)
        {
            continue;
        }
        out.push(Move::new(piece.pos, end));
    }
}

/// King steps plus castling, filtered by the enemy attack map.
fn king_moves(
    board: &Board,
    king: &Piece,
    constraints: &ColorConstraints,
    enemy_attacks: &HashSet<Pos>,
    out: &mut Vec<Move>,
) {
    for &off in king.kind.directions() {
        let sq = king.pos.offset(off.0, off.1);
        if sq.in_bounds()
            && board.get(sq).color != king.color
            && !enemy_attacks.contains(&sq)
        {
            out.push(Move::new(king.pos, sq));
        }
    }

    // Castling: king and rook unmoved, every square between them empty, and
    // neither the transit square nor the destination attacked. Being in
    // check rules both sides out.
    if !king.can_castle || king.pos != king_home(king.color) || constraints.in_check {
        return;
    }
    let row = king.pos.row;
    let sides: [(i8, &[i8], &[i8]); 2] = [
        // (rook file, between files, files that must be safe)
        (7, &[5, 6], &[5, 6]),
        (0, &[1, 2, 3], &[2, 3]),
    ];
    for (rook_col, between, safe) in sides {
        let rook = board.get(Pos::new(row, rook_col));
        if rook.kind != PieceKind::Rook || rook.color != king.color || !rook.can_castle {
            continue;
        }
        if between.iter().any(|&c| !board.get(Pos::new(row, c)).is_empty()) {
            continue;
        }
        if safe.iter().any(|&c| enemy_attacks.contains(&Pos::new(row, c))) {
            continue;
        }
        let end_col = if rook_col == 7 { 6 } else { 2 };
        out.push(Move::new(king.pos, Pos::new(row, end_col)));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Pos {
        Pos::from_algebraic(name).unwrap()
    }

    fn mv(from: &str, to: &str) -> Move {
        Move::new(sq(from), sq(to))
    }

    fn r#gen(layout: &str) -> Generation {
        generate_all_valid_moves(&Board::from_layout(layout).unwrap(), 0)
    }

    fn moves_of(g: &Generation, color: Color, board: &Board) -> Vec<Move> {
        g.moves
            .iter()
            .copied()
            .filter(|m| board.get(m.start).color == color)
            .collect()
    }

    // ===================================================================
    // Baseline counts
    // ===================================================================

    #[test]
    fn starting_position_has_twenty_moves_per_side() {
        let board = Board::starting();
        let g = generate_all_valid_moves(&board, 0);
        assert_eq!(moves_of(&g, Color::White, &board).len(), 20);
        assert_eq!(moves_of(&g, Color::Black, &board).len(), 20);
    }

    #[test]
    fn starting_knights_and_pawns() {
        let board = Board::starting();
        let g = generate_all_valid_moves(&board, 0);
        assert!(g.moves.contains(&mv("g1", "f3")));
        assert!(g.moves.contains(&mv("e2", "e4")));
        assert!(g.moves.contains(&mv("e2", "e3")));
        assert!(g.moves.contains(&mv("b8", "c6")));
        // Sliders are boxed in.
        assert!(g.moves_from(sq("a1")).next().is_none());
        assert!(g.moves_from(sq("d1")).next().is_none());
    }

    // ===================================================================
    // Attack maps
    // ===================================================================

    #[test]
    fn pawn_attacks_diagonals_even_when_empty() {
        let g = r#gen("4k3/8/8/8/4P3/8/8/4K3");
        assert!(g.white_attacks.contains(&sq("d5")));
        assert!(g.white_attacks.contains(&sq("f5")));
        assert!(!g.white_attacks.contains(&sq("e5")));
    }

    #[test]
    fn attack_map_includes_defended_allies() {
        // The rook defends its own pawn; the square counts as attacked.
        let g = r#gen("4k3/8/8/8/8/8/R2P4/4K3");
        assert!(g.white_attacks.contains(&sq("d2")));
    }

    #[test]
    fn slider_xrays_through_enemy_king() {
        // Rook e8 checks the king on e4; e3 behind it must still read as
        // attacked so the king cannot retreat along the ray.
        let b = Board::from_layout("k3r3/8/8/8/4K3/8/8/8").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        assert!(g.black_attacks.contains(&sq("e3")));
        assert!(!g.moves.contains(&mv("e4", "e3")));
    }

    // ===================================================================
    // Pins and checks
    // ===================================================================

    #[test]
    fn pinned_rook_stays_on_the_file() {
        let b = Board::from_layout("4k3/4r3/8/8/8/8/4R3/4K3").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        let rook_moves: Vec<Move> = g.moves_from(sq("e2")).collect();
        assert!(!rook_moves.is_empty());
        assert!(rook_moves.iter().all(|m| m.end.col == 4));
        assert!(rook_moves.contains(&mv("e2", "e7")));
    }

    #[test]
    fn pinned_knight_cannot_move_at_all() {
        let b = Board::from_layout("4k3/4r3/8/8/8/8/4N3/4K3").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        assert!(g.moves_from(sq("e2")).next().is_none());
    }

    #[test]
    fn check_restricts_to_block_or_capture() {
        // Black rook e5 checks e1; the a3 rook may block on e3 or nothing
        // else; the king has d1/d2/f1/f2 minus attacked squares.
        let b = Board::from_layout("4k3/8/8/4r3/8/R7/8/4K3").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        let white: Vec<Move> = moves_of(&g, Color::White, &b);
        assert!(white.contains(&mv("a3", "e3")));
        assert!(white.iter().filter(|m| m.start == sq("a3")).count() == 1);
        // King may leave the file but not stay on it.
        assert!(white.contains(&mv("e1", "d1")));
        assert!(white.contains(&mv("e1", "d2")));
        assert!(white.contains(&mv("e1", "f1")));
        assert!(white.contains(&mv("e1", "f2")));
        assert_eq!(white.len(), 5);
    }

    #[test]
    fn double_check_only_king_moves() {
        // Rook h1 and knight f3 both check e1; the a1 rook may not help.
        let b = Board::from_layout("4k3/8/8/8/8/5n2/8/R3K2r").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        let white: Vec<Move> = moves_of(&g, Color::White, &b);
        assert!(white.iter().all(|m| m.start == sq("e1")));
        // d1 and f1 stay on the x-rayed rank, d2 is covered by the knight;
        // only e2 and f2 remain.
        assert_eq!(white.len(), 2);
        assert!(white.contains(&mv("e1", "e2")));
        assert!(white.contains(&mv("e1", "f2")));
    }

    #[test]
    fn checkmate_generates_no_moves_for_the_mated_side() {
        // Back-rank mate: king h8 boxed by its own pawns, rook on e8.
        let b = Board::from_layout("4R2k/6pp/8/8/8/8/8/4K3").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        assert!(moves_of(&g, Color::Black, &b).is_empty());
        assert!(g.report.black.in_check);
    }

    #[test]
    fn stalemate_generates_no_moves_without_check() {
        // Corner stalemate: the black king is not in check but a7, b7 and
        // b8 are all covered.
        let b = Board::from_layout("k7/2Q5/1K6/8/8/8/8/8").unwrap();
        let g = generate_all_valid_moves(&b, 0);
        assert!(!g.report.black.in_check);
        assert!(moves_of(&g, Color::Black, &b).is_empty());
    }

    // ===================================================================
    // Pawns
    // ===================================================================

    #[test]
    fn pawn_pushes_blocked_by_any_piece() {
        let g = r#gen("4k3/8/8/8/4p3/8/4P3/4K3");
        assert!(g.moves.contains(&mv("e2", "e3")));
        assert!(!g.moves.contains(&mv("e2", "e4")));
    }

    #[test]
    fn pawn_never_captures_forward() {
        let g = r#gen("4k3/8/8/8/8/4p3/4P3/4K3");
        let pawn_moves: Vec<Move> = g.moves_from(sq("e2")).collect();
        assert!(pawn_moves.is_empty());
    }

    #[test]
    fn pawn_diagonal_captures() {
        let g = r#gen("4k3/8/8/8/8/3p1p2/4P3/4K3");
        let pawn_moves: Vec<Move> = g.moves_from(sq("e2")).collect();
        assert!(pawn_moves.contains(&mv("e2", "d3")));
        assert!(pawn_moves.contains(&mv("e2", "f3")));
        assert!(pawn_moves.contains(&mv("e2", "e3")));
        assert!(pawn_moves.contains(&mv("e2", "e4")));
        assert_eq!(pawn_moves.len(), 4);
    }

    #[test]
    fn en_passant_requires_open_window() {
        // Black pawn d5 just double-stepped on move 2; white pawn e5.
        let mut b = Board::from_layout("4k3/8/8/3pP3/8/8/8/4K3").unwrap();
        {
            let pawn = b.get_mut(sq("d5"));
            pawn.ep_capturable = true;
            pawn.ep_set_on = 2;
        }
        let open = generate_all_valid_moves(&b, 2);
        assert!(open.moves.contains(&mv("e5", "d6")));
        let expired = generate_all_valid_moves(&b, 4);
        assert!(!expired.moves.contains(&mv("e5", "d6")));
    }

    // ===================================================================
    // Castling
    // ===================================================================

    #[test]
    fn castling_both_sides_when_clear() {
        let g = r#gen("4k3/8/8/8/8/8/8/R3K2R");
        assert!(g.moves.contains(&mv("e1", "g1")));
        assert!(g.moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn castling_blocked_by_between_piece() {
        let g = r#gen("4k3/8/8/8/8/8/8/RN2K2R");
        assert!(g.moves.contains(&mv("e1", "g1")));
        assert!(!g.moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn castling_through_attack_forbidden() {
        // Black rook f7 covers f1: no kingside castle; queenside is fine.
        let g = r#gen("4k3/5r2/8/8/8/8/8/R3K2R");
        assert!(!g.moves.contains(&mv("e1", "g1")));
        assert!(g.moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn castling_forbidden_in_check() {
        let g = r#gen("4k3/4r3/8/8/8/8/8/R3K2R");
        assert!(!g.moves.contains(&mv("e1", "g1")));
        assert!(!g.moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn castling_requires_rook_rights() {
        let mut b = Board::from_layout("4k3/8/8/8/8/8/8/R3K2R").unwrap();
        b.get_mut(sq("h1")).can_castle = false;
        let g = generate_all_valid_moves(&b, 0);
        assert!(!g.moves.contains(&mv("e1", "g1")));
        assert!(g.moves.contains(&mv("e1", "c1")));
    }

    #[test]
    fn queenside_b_file_attack_does_not_block() {
        // b1 may be attacked; the king never crosses it.
        let g = r#gen("1r2k3/8/8/8/8/8/8/R3K3");
        assert!(g.moves.contains(&mv("e1", "c1")));
    }
}
