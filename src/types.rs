use std::fmt;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// The two sides in a chess game, plus the sentinel colour of vacant squares.
///
/// Every square of the board holds a piece record; vacant squares hold the
/// `Empty` piece kind with the `Empty` colour, so movement code can compare
/// colours three ways (ally / enemy / vacant) without optionals.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    White,
    Black,
    Empty,
}

impl Color {
    /// The opposing side. `Empty` has no opponent and maps to itself.
    #[inline]
    pub const fn opponent(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
            Color::Empty => Color::Empty,
        }
    }

    /// Whether this is an actual side (not the vacancy sentinel).
    #[inline]
    pub const fn is_side(self) -> bool {
        !matches!(self, Color::Empty)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
            Color::Empty => write!(f, "empty"),
        }
    }
}

// ---------------------------------------------------------------------------
// Pos
// ---------------------------------------------------------------------------

/// A board coordinate: `(row, col)`, each valid in `[0, 8)`.
///
/// Row 0 is Black's back rank (rank 8), row 7 is White's (rank 1), matching
/// the top-down order of the layout string. Signed components let ray walks
/// step off the board and test `in_bounds` afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pos {
    pub row: i8,
    pub col: i8,
}

impl Pos {
    #[inline]
    pub const fn new(row: i8, col: i8) -> Self {
        Pos { row, col }
    }

    /// Whether both coordinates are on the board.
    #[inline]
    pub const fn in_bounds(self) -> bool {
        self.row >= 0 && self.row < 8 && self.col >= 0 && self.col < 8
    }

    /// This position displaced by `(d_row, d_col)`. May leave the board.
    #[inline]
    pub const fn offset(self, d_row: i8, d_col: i8) -> Self {
        Pos::new(self.row + d_row, self.col + d_col)
    }

    /// `n` steps along a direction vector. May leave the board.
    #[inline]
    pub const fn step(self, dir: (i8, i8), n: i8) -> Self {
        Pos::new(self.row + dir.0 * n, self.col + dir.1 * n)
    }

    /// Parse algebraic notation like "e4".
    pub fn from_algebraic(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return None;
        }
        let col = bytes[0].wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if col < 8 && rank < 8 {
            Some(Pos::new(7 - rank as i8, col as i8))
        } else {
            None
        }
    }

    /// Convert to algebraic notation like "e4".
    pub fn to_algebraic(self) -> String {
        let file = (b'a' + self.col as u8) as char;
        let rank = (b'1' + (7 - self.row) as u8) as char;
        format!("{file}{rank}")
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.in_bounds() {
            write!(f, "{}", self.to_algebraic())
        } else {
            write!(f, "({}, {})", self.row, self.col)
        }
    }
}

// ---------------------------------------------------------------------------
// Move
// ---------------------------------------------------------------------------

/// An ordered pair of squares: where a piece starts and where it lands.
///
/// Carries no flags; special moves (castling, en passant, promotion) are
/// classified by static predicates on the mover and the squares involved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Move {
    pub start: Pos,
    pub end: Pos,
}

impl Move {
    #[inline]
    pub const fn new(start: Pos, end: Pos) -> Self {
        Move { start, end }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Domain errors for the rules engine.
///
/// Illegal moves and empty-history undos are *not* errors: they are silent
/// no-ops by contract. Only construction-time contract violations surface.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("invalid layout string: {0}")]
    InvalidLayout(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
