//! Track piece definitions and their connection algebra.
//!
//! Each non-empty piece joins exactly two of its four neighbours. The
//! connection table is the single source of truth: render symbols, name
//! parsing and the solver's feasibility checks all derive from it.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::Point;

/// A track segment occupying one grid cell, or an empty cell.
///
/// Discriminants match the piece codes used when puzzles are built from a
/// flat array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Piece {
    Empty = 0,
    /// Runs west to east.
    Horizontal = 3,
    /// Runs north to south.
    Vertical = 4,
    /// Turns between north and east.
    CornerNE = 5,
    /// Turns between south and east.
    CornerSE = 6,
    /// Turns between south and west.
    CornerSW = 7,
    /// Turns between north and west.
    CornerNW = 8,
}

/// The placeable pieces in canonical order.
///
/// The pre-solver tries these first to last; the path solver tries them last
/// to first so that corners are explored before straights.
pub const VALID_PIECES: [Piece; 6] = [
    Piece::Horizontal,
    Piece::Vertical,
    Piece::CornerNE,
    Piece::CornerSE,
    Piece::CornerSW,
    Piece::CornerNW,
];

impl Piece {
    /// The unit directions this piece connects toward. Empty cells connect
    /// nowhere.
    pub fn connections(self) -> &'static [Point] {
        const HORIZONTAL: [Point; 2] = [Point::LEFT, Point::RIGHT];
        const VERTICAL: [Point; 2] = [Point::UP, Point::DOWN];
        const CORNER_NE: [Point; 2] = [Point::UP, Point::RIGHT];
        const CORNER_SE: [Point; 2] = [Point::DOWN, Point::RIGHT];
        const CORNER_SW: [Point; 2] = [Point::DOWN, Point::LEFT];
        const CORNER_NW: [Point; 2] = [Point::UP, Point::LEFT];

        match self {
            Piece::Empty => &[],
            Piece::Horizontal => &HORIZONTAL,
            Piece::Vertical => &VERTICAL,
            Piece::CornerNE => &CORNER_NE,
            Piece::CornerSE => &CORNER_SE,
            Piece::CornerSW => &CORNER_SW,
            Piece::CornerNW => &CORNER_NW,
        }
    }

    /// Whether this piece connects toward the given unit direction.
    #[inline]
    pub fn connects_to(self, direction: Point) -> bool {
        self.connections().contains(&direction)
    }

    /// The unique piece connecting toward both directions, or `Empty` when
    /// no piece joins that pair.
    pub fn from_directions(a: Point, b: Point) -> Piece {
        VALID_PIECES
            .into_iter()
            .find(|p| p.connects_to(a) && p.connects_to(b))
            .unwrap_or(Piece::Empty)
    }

    /// Decodes a flat-array piece code.
    pub fn from_code(code: u8) -> Option<Piece> {
        match code {
            0 => Some(Piece::Empty),
            3 => Some(Piece::Horizontal),
            4 => Some(Piece::Vertical),
            5 => Some(Piece::CornerNE),
            6 => Some(Piece::CornerSE),
            7 => Some(Piece::CornerSW),
            8 => Some(Piece::CornerNW),
            _ => None,
        }
    }

    /// The flat-array code for this piece.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self == Piece::Empty
    }

    /// The single-character terminal symbol.
    pub fn symbol(self) -> char {
        match self {
            Piece::Empty => ' ',
            Piece::Horizontal => '─',
            Piece::Vertical => '│',
            Piece::CornerNE => '└',
            Piece::CornerNW => '┘',
            Piece::CornerSE => '┌',
            Piece::CornerSW => '┐',
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Error returned when a puzzle file names a piece that does not exist.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown piece name {0:?}")]
pub struct UnknownPiece(pub String);

impl FromStr for Piece {
    type Err = UnknownPiece;

    /// Parses the piece names used in puzzle files. Names are case
    /// sensitive and `Empty` is not a valid name.
    fn from_str(s: &str) -> Result<Piece, UnknownPiece> {
        match s {
            "Horizontal" => Ok(Piece::Horizontal),
            "Vertical" => Ok(Piece::Vertical),
            "CornerNE" => Ok(Piece::CornerNE),
            "CornerNW" => Ok(Piece::CornerNW),
            "CornerSE" => Ok(Piece::CornerSE),
            "CornerSW" => Ok(Piece::CornerSW),
            _ => Err(UnknownPiece(s.to_string())),
        }
    }
}
