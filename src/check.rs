//! Check and pin detection.
//!
//! `analyze` is a pure function of the board: it casts rays and knight/pawn
//! probes outward from each king and reports, per colour, whether that king
//! is in check, how many pieces check it, which allied pieces are pinned (and
//! to which line), and which squares resolve a single check. The move
//! generator consumes the report; nothing here mutates the board.

use crate::board::Board;
use crate::piece::{DIAGONAL_DIRS, KNIGHT_OFFSETS, ORTHOGONAL_DIRS, PieceKind, pawn_forward};
use crate::types::{Color, Pos};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// An allied piece that may not leave its king→attacker line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pin {
    /// Where the pinned piece stands.
    pub square: Pos,
    /// Every square of the pinning line, the attacker's square included. The
    /// pinned piece may only move within this set.
    pub allowed: Vec<Pos>,
}

/// Everything one side's move generation must respect.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColorConstraints {
    /// The king is currently attacked.
    pub in_check: bool,
    /// Number of distinct checking pieces.
    pub checker_count: u8,
    /// Pinned allied pieces with their allowed lines.
    pub pins: Vec<Pin>,
    /// Squares that resolve a single check: the checker's square plus any
    /// interposition square. Meaningless under double check, where only the
    /// king may move.
    pub evasions: Vec<Pos>,
}

impl ColorConstraints {
    /// Two or more checkers: every non-king move is illegal.
    #[inline]
    pub fn double_check(&self) -> bool {
        self.checker_count >= 2
    }

    /// The allowed line for a pinned piece on `square`, if it is pinned.
    pub fn pin_line(&self, square: Pos) -> Option<&[Pos]> {
        self.pins
            .iter()
            .find(|p| p.square == square)
            .map(|p| p.allowed.as_slice())
    }
}

/// The detector's full output: constraints for both sides plus the squares
/// of kings currently in check.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub white: ColorConstraints,
    pub black: ColorConstraints,
    /// King squares under attack, for rendering layers.
    pub checked_squares: Vec<Pos>,
}

impl CheckReport {
    pub fn for_color(&self, color: Color) -> &ColorConstraints {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
            Color::Empty => unreachable!("vacant colour has no constraints"),
        }
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Analyze both kings' surroundings and produce the full report.
pub fn analyze(board: &Board) -> CheckReport {
    let white = constraints_for(board, Color::White);
    let black = constraints_for(board, Color::Black);
    let mut checked_squares = Vec::new();
    if white.in_check {
        checked_squares.push(board.king(Color::White));
    }
    if black.in_check {
        checked_squares.push(board.king(Color::Black));
    }
    CheckReport {
        white,
        black,
        checked_squares,
    }
}

fn constraints_for(board: &Board, color: Color) -> ColorConstraints {
    let king = board.king(color);
    let enemy = color.opponent();
    let mut out = ColorConstraints::default();

    // Slider rays. A first allied piece on the ray is a pin candidate; a
    // second kills the ray. An enemy slider of the matching kind either pins
    // the candidate or checks the king.
    scan_rays(board, king, color, &ORTHOGONAL_DIRS, PieceKind::Rook, &mut out);
    scan_rays(board, king, color, &DIAGONAL_DIRS, PieceKind::Bishop, &mut out);

    // Knights.
    for &off in &KNIGHT_OFFSETS {
        let sq = king.offset(off.0, off.1);
        if !sq.in_bounds() {
            continue;
        }
        let p = board.get(sq);
        if p.color == enemy && p.kind == PieceKind::Knight {
            out.checker_count += 1;
            out.evasions.push(sq);
        }
    }

    // Pawns: an enemy pawn on either capture diagonal. The pawn stands one
    // row against its own direction of travel from the king.
    let pawn_row = king.row - pawn_forward(enemy);
    for d_col in [-1, 1] {
        let sq = Pos::new(pawn_row, king.col + d_col);
        if !sq.in_bounds() {
            continue;
        }
        let p = board.get(sq);
        if p.color == enemy && p.kind == PieceKind::Pawn {
            out.checker_count += 1;
            out.evasions.push(sq);
        }
    }

    out.in_check = out.checker_count > 0;
    out
}

/// Walk each ray in `dirs` from the king, recording pins and checks from
/// enemy sliders whose kind matches `matching` (or is a queen).
fn scan_rays(
    board: &Board,
    king: Pos,
    color: Color,
    dirs: &[(i8, i8)],
    matching: PieceKind,
    out: &mut ColorConstraints,
) {
    let enemy = color.opponent();
    for &dir in dirs {
        let mut line: Vec<Pos> = Vec::new();
        let mut shield: Option<Pos> = None;
        for n in 1..8 {
            let sq = king.step(dir, n);
            if !sq.in_bounds() {
                break;
            }
            line.push(sq);
            let p = board.get(sq);
            if p.is_empty() {
                continue;
            }
            if p.color == color {
                if shield.is_some() {
                    // Two allies block the ray; no pin possible.
                    break;
                }
                shield = Some(sq);
                continue;
            }
            // Enemy piece.
            if p.kind == matching || p.kind == PieceKind::Queen {
                match shield {
                    Some(pinned) => out.pins.push(Pin {
                        square: pinned,
                        allowed: line.clone(),
                    }),
                    None => {
                        out.checker_count += 1;
                        out.evasions.extend_from_slice(&line);
                    }
                }
            }
            break;
        }
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

    fn report(layout: &str) -> CheckReport {
        analyze(&Board::from_layout(layout).unwrap())
    }

    #[test]
    fn starting_position_is_quiet() {
        let r = analyze(&Board::starting());
        assert!(!r.white.in_check);
        assert!(!r.black.in_check);
        assert!(r.white.pins.is_empty());
        assert!(r.black.pins.is_empty());
        assert!(r.checked_squares.is_empty());
    }

    #[test]
    fn rook_check_along_file() {
        // Black rook on e8 checks the white king on e1.
        let r = report("k3r3/8/8/8/8/8/8/4K3");
        assert!(r.white.in_check);
        assert_eq!(r.white.checker_count, 1);
        // Evasions: every square between e1 and e8, attacker included.
        assert_eq!(r.white.evasions.len(), 7);
        assert!(r.white.evasions.contains(&sq("e8")));
        assert!(r.white.evasions.contains(&sq("e5")));
        assert!(!r.white.evasions.contains(&sq("e1")));
        assert_eq!(r.checked_squares, vec![sq("e1")]);
    }

    #[test]
    fn bishop_check_on_diagonal() {
        // Black bishop a5, white king e1: a5-b4-c3-d2-e1 diagonal.
        let r = report("4k3/8/8/b7/8/8/8/4K3");
        assert!(r.white.in_check);
        assert_eq!(r.white.checker_count, 1);
        assert!(r.white.evasions.contains(&sq("a5")));
        assert!(r.white.evasions.contains(&sq("c3")));
        assert_eq!(r.white.evasions.len(), 4);
    }

    #[test]
    fn knight_check_has_single_evasion() {
        let r = report("4k3/8/8/8/8/3n4/8/4K3");
        assert!(r.white.in_check);
        assert_eq!(r.white.evasions, vec![sq("d3")]);
    }

    #[test]
    fn pawn_check_is_detected() {
        // Black pawn d2 attacks e1.
        let r = report("4k3/8/8/8/8/8/3p4/4K3");
        assert!(r.white.in_check);
        assert_eq!(r.white.evasions, vec![sq("d2")]);
        // White pawn d7 attacks e8 symmetrically.
        let r = report("4k3/3P4/8/8/8/8/8/4K3");
        assert!(r.black.in_check);
        assert_eq!(r.black.evasions, vec![sq("d7")]);
    }

    #[test]
    fn pawn_in_front_does_not_check() {
        // A pawn pushes straight but never checks straight.
        let r = report("4k3/8/8/8/8/8/4p3/4K3");
        assert!(!r.white.in_check);
    }

    #[test]
    fn vertical_pin_records_line() {
        // White rook e2 shields its king from the black rook e7.
        let r = report("4k3/4r3/8/8/8/8/4R3/4K3");
        assert!(!r.white.in_check);
        assert_eq!(r.white.pins.len(), 1);
        let pin = &r.white.pins[0];
        assert_eq!(pin.square, sq("e2"));
        assert!(pin.allowed.contains(&sq("e7")));
        assert!(pin.allowed.contains(&sq("e5")));
        assert!(!pin.allowed.contains(&sq("d2")));
        assert_eq!(r.white.pin_line(sq("e2")).unwrap().len(), 6);
    }

    #[test]
    fn two_shields_break_the_pin() {
        // Rook e2 and knight e3 both stand on the file; neither is pinned.
        let r = report("4k3/4r3/8/8/8/4N3/4R3/4K3");
        assert!(r.white.pins.is_empty());
    }

    #[test]
    fn non_matching_slider_does_not_pin() {
        // A black bishop on the e-file has no orthogonal reach.
        let r = report("4k3/4b3/8/8/8/8/4R3/4K3");
        assert!(r.white.pins.is_empty());
        assert!(!r.white.in_check);
    }

    #[test]
    fn queen_pins_on_both_axes() {
        let r = report("4k3/4q3/8/8/8/8/4R3/4K3");
        assert_eq!(r.white.pins.len(), 1);
        let r = report("4k3/8/8/q7/8/8/3B4/4K3");
        assert_eq!(r.white.pins.len(), 1);
        assert_eq!(r.white.pins[0].square, sq("d2"));
    }

    #[test]
    fn double_check_counted() {
        // Black rook e8 and knight f3 both attack the white king on e1.
        let r = report("k3r3/8/8/8/8/5n2/8/4K3");
        assert!(r.white.in_check);
        assert!(r.white.double_check());
        assert_eq!(r.white.checker_count, 2);
    }

    #[test]
    fn both_kings_reported_independently() {
        // Black rook a1 checks the white king along rank 1; the black king
        // is untouched.
        let r = report("4k3/8/8/8/8/8/8/r3K2R");
        assert!(r.white.in_check);
        assert!(!r.black.in_check);
    }
}
