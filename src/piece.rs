//! Piece model: kinds, movement capabilities, and the per-square record.
//!
//! Every square of the board holds one `Piece` value; vacancy is the `Empty`
//! kind, never a null. Kind-specific state (castling right, en-passant flag,
//! checked flag) lives in flat fields so the record stays `Copy` and the move
//! log can store true value snapshots.

use std::fmt;

use crate::types::{Color, Pos};

// ---------------------------------------------------------------------------
// Direction templates
// ---------------------------------------------------------------------------

/// Rook / orthogonal ray directions.
pub const ORTHOGONAL_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Bishop / diagonal ray directions.
pub const DIAGONAL_DIRS: [(i8, i8); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];

/// Queen and king directions: all eight.
pub const ROYAL_DIRS: [(i8, i8); 8] = [
    (1, 1),
    (-1, 1),
    (1, -1),
    (-1, -1),
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
];

/// Knight jump offsets.
pub const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (1, -2),
    (-1, 2),
    (-1, -2),
];

// ---------------------------------------------------------------------------
// PieceKind
// ---------------------------------------------------------------------------

/// The closed set of square occupants, including the vacancy variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PieceKind {
    Empty,
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

/// How a kind generates moves. Dispatch point for the four generator shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveCapability {
    /// Walks rays until blocked (bishop, rook, queen).
    Sliding,
    /// Single jumps to fixed offsets (knight).
    Stepping,
    /// Forward pushes, diagonal captures, en passant.
    PawnMoves,
    /// Single steps plus castling, constrained by enemy attacks.
    KingMoves,
    /// Generates nothing (vacant squares).
    None,
}

impl PieceKind {
    /// All real piece kinds, vacancy excluded.
    pub const ALL: [PieceKind; 6] = [
        PieceKind::Pawn,
        PieceKind::Knight,
        PieceKind::Bishop,
        PieceKind::Rook,
        PieceKind::Queen,
        PieceKind::King,
    ];

    /// Movement capability class for this kind.
    pub const fn capability(self) -> MoveCapability {
        match self {
            PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen => MoveCapability::Sliding,
            PieceKind::Knight => MoveCapability::Stepping,
            PieceKind::Pawn => MoveCapability::PawnMoves,
            PieceKind::King => MoveCapability::KingMoves,
            PieceKind::Empty => MoveCapability::None,
        }
    }

    /// Static movement-direction template. Knights return jump offsets,
    /// pawns return nothing (their geometry is colour-dependent).
    pub const fn directions(self) -> &'static [(i8, i8)] {
        match self {
            PieceKind::Bishop => &DIAGONAL_DIRS,
            PieceKind::Rook => &ORTHOGONAL_DIRS,
            PieceKind::Queen | PieceKind::King => &ROYAL_DIRS,
            PieceKind::Knight => &KNIGHT_OFFSETS,
            PieceKind::Pawn | PieceKind::Empty => &[],
        }
    }

    /// Single letter for the layout string: uppercase White, lowercase Black.
    pub fn to_char(self, color: Color) -> char {
        let c = match self {
            PieceKind::Empty => return '.',
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };
        match color {
            Color::White => c.to_ascii_uppercase(),
            _ => c,
        }
    }

    /// Parse a layout-string letter into (colour, kind).
    pub fn from_char(c: char) -> Option<(Color, PieceKind)> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let kind = match c.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return None,
        };
        Some((color, kind))
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PieceKind::Empty => write!(f, "empty"),
            PieceKind::Pawn => write!(f, "pawn"),
            PieceKind::Knight => write!(f, "knight"),
            PieceKind::Bishop => write!(f, "bishop"),
            PieceKind::Rook => write!(f, "rook"),
            PieceKind::Queen => write!(f, "queen"),
            PieceKind::King => write!(f, "king"),
        }
    }
}

// ---------------------------------------------------------------------------
// Colour-dependent geometry
// ---------------------------------------------------------------------------

/// Row delta of a pawn advance: White moves toward row 0, Black toward row 7.
pub const fn pawn_forward(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
        Color::Empty => 0,
    }
}

/// The row a pawn double-steps from.
pub const fn pawn_start_row(color: Color) -> i8 {
    match color {
        Color::White => 6,
        _ => 1,
    }
}

/// The row a freshly double-stepped pawn stands on, i.e. the only row it can
/// be captured en passant from.
pub const fn pawn_ep_row(color: Color) -> i8 {
    match color {
        Color::White => 4,
        _ => 3,
    }
}

/// The row where a pawn promotes.
pub const fn promotion_row(color: Color) -> i8 {
    match color {
        Color::White => 0,
        _ => 7,
    }
}

/// The king's home square for a colour.
pub const fn king_home(color: Color) -> Pos {
    match color {
        Color::White => Pos::new(7, 4),
        _ => Pos::new(0, 4),
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// One square's occupant: kind, colour, its own position, and the
/// kind-specific flags.
///
/// `can_castle` is meaningful for rooks and kings, `ep_capturable` /
/// `ep_set_on` for pawns, `checked` for kings; the remaining kinds carry the
/// fields at their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub pos: Pos,
    /// Rook/king: still eligible for castling. Cleared on any move.
    pub can_castle: bool,
    /// Pawn: completed a double step and may be captured en passant.
    pub ep_capturable: bool,
    /// Pawn: the engine move number at which `ep_capturable` was set. The
    /// capture window is open only while the move counter still equals it.
    pub ep_set_on: u32,
    /// King: currently in check (synced from the detector each generation).
    pub checked: bool,
}

impl Piece {
    /// A vacant-square placeholder.
    pub const fn empty(pos: Pos) -> Self {
        Piece {
            kind: PieceKind::Empty,
            color: Color::Empty,
            pos,
            can_castle: false,
            ep_capturable: false,
            ep_set_on: 0,
            checked: false,
        }
    }

    /// A fresh piece. Rooks and kings start with their castling right.
    pub const fn new(kind: PieceKind, color: Color, pos: Pos) -> Self {
        Piece {
            kind,
            color,
            pos,
            can_castle: matches!(kind, PieceKind::Rook | PieceKind::King),
            ep_capturable: false,
            ep_set_on: 0,
            checked: false,
        }
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        matches!(self.kind, PieceKind::Empty)
    }

    /// Layout-string letter for this piece ('.' for vacancy).
    pub fn to_char(&self) -> char {
        self.kind.to_char(self.color)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} on {}", self.color, self.kind, self.pos)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
