//! Puzzle definitions and the text-format loader.
//!
//! On-disk format:
//! - `#`-prefixed lines are comments
//! - `ROWS: n1 n2 ...` — row demands, top to bottom
//! - `COLS: n1 n2 ...` — column demands, left to right
//! - `FIXED:` starts the fixed-piece section; each following line is
//!   `x,y: Name` with the piece names from [`Piece`]'s `FromStr`
//!
//! The grid is as wide as the COLS line and as tall as the ROWS line.
//! A puzzle without both lines is rejected.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::geometry::Point;
use crate::pieces::{Piece, UnknownPiece};

/// A puzzle as loaded: demand vectors plus the fixed starting pieces.
///
/// Validation beyond basic shape (demand totals, entry/exit extraction,
/// piece alignment) happens when a [`Grid`](crate::grid::Grid) is built
/// from the puzzle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Puzzle {
    /// Track cells required in each row, top to bottom.
    pub row_demands: Vec<u32>,
    /// Track cells required in each column, left to right.
    pub col_demands: Vec<u32>,
    /// The starting grid, row-major; `Empty` everywhere a piece is not fixed.
    pub start: Vec<Piece>,
}

/// Errors from loading or assembling a puzzle.
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("puzzle has no ROWS line")]
    MissingRows,
    #[error("puzzle has no COLS line")]
    MissingCols,
    #[error("invalid demand value {0:?}")]
    InvalidDemand(String),
    #[error("malformed fixed piece line {0:?}")]
    MalformedFixed(String),
    #[error(transparent)]
    UnknownPiece(#[from] UnknownPiece),
    #[error("fixed piece at {point} is outside the {width}x{height} grid")]
    FixedOutOfBounds {
        point: Point,
        width: usize,
        height: usize,
    },
    #[error("invalid piece code {0}")]
    InvalidCode(u8),
    #[error("expected {expected} piece codes, found {found}")]
    CodeCount { expected: usize, found: usize },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Puzzle {
    /// Creates a puzzle with the given demands and no fixed pieces.
    pub fn new(row_demands: Vec<u32>, col_demands: Vec<u32>) -> Puzzle {
        let start = vec![Piece::Empty; row_demands.len() * col_demands.len()];
        Puzzle {
            row_demands,
            col_demands,
            start,
        }
    }

    /// Builds a puzzle from a flat array of piece codes
    /// (0 Empty, 3 Horizontal, 4 Vertical, 5 NE, 6 SE, 7 SW, 8 NW).
    pub fn from_codes(
        row_demands: Vec<u32>,
        col_demands: Vec<u32>,
        codes: &[u8],
    ) -> Result<Puzzle, PuzzleError> {
        let expected = row_demands.len() * col_demands.len();
        if codes.len() != expected {
            return Err(PuzzleError::CodeCount {
                expected,
                found: codes.len(),
            });
        }
        let start = codes
            .iter()
            .map(|&code| Piece::from_code(code).ok_or(PuzzleError::InvalidCode(code)))
            .collect::<Result<_, _>>()?;
        Ok(Puzzle {
            row_demands,
            col_demands,
            start,
        })
    }

    /// Reads a puzzle from a file in the text format.
    pub fn load(path: impl AsRef<Path>) -> Result<Puzzle, PuzzleError> {
        fs::read_to_string(path)?.parse()
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.col_demands.len()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.row_demands.len()
    }

    /// Fixes a piece on the starting grid. The point must be in bounds.
    pub fn set(&mut self, point: Point, piece: Piece) {
        let width = self.width();
        assert!(
            (point.x as usize) < width && (point.y as usize) < self.height(),
            "fixed piece at {point} is outside the grid"
        );
        self.start[point.index(width as i32)] = piece;
    }
}

impl FromStr for Puzzle {
    type Err = PuzzleError;

    fn from_str(s: &str) -> Result<Puzzle, PuzzleError> {
        let mut row_demands: Option<Vec<u32>> = None;
        let mut col_demands: Option<Vec<u32>> = None;
        let mut fixed: Vec<(Point, Piece)> = Vec::new();
        let mut in_fixed = false;

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if in_fixed {
                fixed.push(parse_fixed_line(line)?);
            } else if let Some(rest) = line.strip_prefix("ROWS:") {
                row_demands = Some(parse_demands(rest)?);
            } else if let Some(rest) = line.strip_prefix("COLS:") {
                col_demands = Some(parse_demands(rest)?);
            } else if line == "FIXED:" {
                in_fixed = true;
            }
        }

        let row_demands = row_demands.filter(|d| !d.is_empty()).ok_or(PuzzleError::MissingRows)?;
        let col_demands = col_demands.filter(|d| !d.is_empty()).ok_or(PuzzleError::MissingCols)?;

        let mut puzzle = Puzzle::new(row_demands, col_demands);
        for (point, piece) in fixed {
            let in_bounds = point.x >= 0
                && point.y >= 0
                && (point.x as usize) < puzzle.width()
                && (point.y as usize) < puzzle.height();
            if !in_bounds {
                return Err(PuzzleError::FixedOutOfBounds {
                    point,
                    width: puzzle.width(),
                    height: puzzle.height(),
                });
            }
            puzzle.set(point, piece);
        }
        Ok(puzzle)
    }
}

fn parse_demands(rest: &str) -> Result<Vec<u32>, PuzzleError> {
    rest.split_whitespace()
        .map(|token| {
            token
                .parse()
                .map_err(|_| PuzzleError::InvalidDemand(token.to_string()))
        })
        .collect()
}

/// Parses one `x,y: Name` line from the FIXED section.
fn parse_fixed_line(line: &str) -> Result<(Point, Piece), PuzzleError> {
    let malformed = || PuzzleError::MalformedFixed(line.to_string());
    let (coords, name) = line.split_once(':').ok_or_else(malformed)?;
    let (x, y) = coords.split_once(',').ok_or_else(malformed)?;
    let x = x.trim().parse().map_err(|_| malformed())?;
    let y = y.trim().parse().map_err(|_| malformed())?;
    let piece = name.trim().parse::<Piece>()?;
    Ok((Point::new(x, y), piece))
}
