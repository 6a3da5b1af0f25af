//! The 8×8 board: a dumb grid of piece records plus cached king positions.
//!
//! `Board` performs no legality checking. Every square always holds a
//! `Piece`; vacancy is the `Empty` variant. The only intelligence here is
//! layout-string parsing (with hard validation) and keeping the king caches
//! and per-piece `pos` fields consistent through `place`.

use crate::piece::{Piece, PieceKind};
use crate::types::{ChessError, Color, Move, Pos};

/// Standard starting arrangement, Black's back rank first.
pub const STARTING_LAYOUT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// An 8×8 grid of pieces with cached king positions for both sides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    grid: [[Piece; 8]; 8],
    white_king: Pos,
    black_king: Pos,
}

impl Board {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Standard starting position.
    pub fn starting() -> Self {
        Self::from_layout(STARTING_LAYOUT).expect("starting layout is always valid")
    }

    /// Parse a compact layout string: ranks separated by `/` from Black's
    /// back rank down, digits for runs of empty squares, letters for pieces
    /// (uppercase White, lowercase Black).
    ///
    /// Malformed input is a construction-time contract violation and fails
    /// hard; it is never swallowed.
    pub fn from_layout(layout: &str) -> Result<Self, ChessError> {
        let layout = layout.trim();
        let ranks: Vec<&str> = layout.split('/').collect();
        if ranks.len() != 8 {
            return Err(ChessError::InvalidLayout(format!(
                "expected 8 ranks, got {}",
                ranks.len()
            )));
        }

        let mut grid =
            std::array::from_fn(|row| std::array::from_fn(|col| Piece::empty(Pos::new(row as i8, col as i8))));
        let mut white_king = None;
        let mut black_king = None;

        for (row, rank_str) in ranks.iter().enumerate() {
            let mut col: i8 = 0;
            for ch in rank_str.chars() {
                if col > 7 {
                    return Err(ChessError::InvalidLayout(format!(
                        "too many squares in rank {}",
                        8 - row
                    )));
                }
                if let Some(digit) = ch.to_digit(10) {
                    if !(1..=8).contains(&digit) {
                        return Err(ChessError::InvalidLayout(format!(
                            "invalid empty-square count '{ch}' in rank {}",
                            8 - row
                        )));
                    }
                    col += digit as i8;
                } else if let Some((color, kind)) = PieceKind::from_char(ch) {
                    let pos = Pos::new(row as i8, col);
                    if kind == PieceKind::King {
                        let slot = match color {
                            Color::White => &mut white_king,
                            _ => &mut black_king,
                        };
                        if slot.is_some() {
                            return Err(ChessError::InvalidLayout(format!(
                                "more than one {color} king"
                            )));
                        }
                        *slot = Some(pos);
                    }
                    grid[row][col as usize] = Piece::new(kind, color, pos);
                    col += 1;
                } else {
                    return Err(ChessError::InvalidLayout(format!(
                        "unrecognized character '{ch}'"
                    )));
                }
            }
            if col != 8 {
                return Err(ChessError::InvalidLayout(format!(
                    "rank {} has {} squares instead of 8",
                    8 - row,
                    col
                )));
            }
        }

        let white_king = white_king
            .ok_or_else(|| ChessError::InvalidLayout("no white king".to_string()))?;
        let black_king = black_king
            .ok_or_else(|| ChessError::InvalidLayout("no black king".to_string()))?;

        Ok(Board {
            grid,
            white_king,
            black_king,
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// The piece on a square (the `Empty` variant for vacancies).
    ///
    /// Out-of-range positions are a caller contract violation; all internal
    /// callers produce in-range coordinates.
    #[inline]
    pub fn get(&self, pos: Pos) -> &Piece {
        debug_assert!(pos.in_bounds(), "out-of-range square {pos:?}");
        &self.grid[pos.row as usize][pos.col as usize]
    }

    /// Mutable access to the piece on a square.
    #[inline]
    pub fn get_mut(&mut self, pos: Pos) -> &mut Piece {
        debug_assert!(pos.in_bounds(), "out-of-range square {pos:?}");
        &mut self.grid[pos.row as usize][pos.col as usize]
    }

    /// Cached position of a side's king.
    #[inline]
    pub fn king(&self, color: Color) -> Pos {
        match color {
            Color::White => self.white_king,
            Color::Black => self.black_king,
            Color::Empty => unreachable!("vacant colour has no king"),
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Write a piece to a square, keeping the piece's own `pos` field and the
    /// king caches consistent with the grid.
    pub fn place(&mut self, pos: Pos, mut piece: Piece) {
        debug_assert!(pos.in_bounds(), "out-of-range square {pos:?}");
        piece.pos = pos;
        if piece.kind == PieceKind::King {
            match piece.color {
                Color::White => self.white_king = pos,
                Color::Black => self.black_king = pos,
                Color::Empty => {}
            }
        }
        self.grid[pos.row as usize][pos.col as usize] = piece;
    }

    /// Apply a move at grid level: `moving` lands on `mv.end`, `vacating`
    /// (typically an empty placeholder) fills `mv.start`.
    pub fn move_piece(&mut self, mv: Move, moving: Piece, vacating: Piece) {
        self.place(mv.end, moving);
        self.place(mv.start, vacating);
    }

    // -----------------------------------------------------------------------
    // Display
    // -----------------------------------------------------------------------

    /// Render the board as an 8-line text grid (rank 8 at top), for
    /// debugging and tests.
    pub fn board_string(&self) -> String {
        let mut s = String::with_capacity(200);
        for row in 0..8 {
            s.push((b'8' - row as u8) as char);
            s.push(' ');
            for col in 0..8 {
                s.push(self.grid[row][col].to_char());
                if col < 7 {
                    s.push(' ');
                }
            }
            s.push('\n');
        }
        s.push_str("  a b c d e f g h");
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.board_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
