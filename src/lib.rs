//! Train Tracks Puzzle Solver Library
//!
//! A puzzle is a rectangular grid where every row and column demands an
//! exact number of track cells, a handful of cells hold fixed pieces, and
//! two of those pieces point off the grid to mark the entry and exit.
//! Solving first deduces the placements the demands force, then threads a
//! single connected track from entry to exit that meets every demand.

pub mod geometry;
pub mod grid;
pub mod pieces;
pub mod puzzle;
pub mod render;
pub mod solver;

mod deduce;

pub use geometry::Point;
pub use grid::{Grid, GridError};
pub use pieces::{Piece, VALID_PIECES};
pub use puzzle::{Puzzle, PuzzleError};
pub use render::Renderer;
pub use solver::{PathSolver, Progress};
