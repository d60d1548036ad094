//! Terminal rendering for grids.
//!
//! A [`Grid`] displays as one newline-terminated row of piece symbols per
//! grid row. [`Renderer`] layers the optional extras on top: a header of
//! column demands with a leading demand per row, and ANSI-bold entry and
//! exit cells.

use std::fmt;

use crossterm::style::Stylize;

use crate::geometry::Point;
use crate::grid::Grid;

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height() {
            for x in 0..self.width() {
                write!(f, "{}", self.at(Point::new(x, y)).symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Grid renderer with the display options the CLI exposes.
#[derive(Clone, Copy)]
pub struct Renderer<'a> {
    grid: &'a Grid,
    constraints: bool,
    bold_endpoints: bool,
}

impl<'a> Renderer<'a> {
    pub fn new(grid: &'a Grid) -> Renderer<'a> {
        Renderer {
            grid,
            constraints: false,
            bold_endpoints: false,
        }
    }

    /// Shows the column demands above the grid and each row demand before
    /// its row.
    pub fn constraints(mut self, on: bool) -> Self {
        self.constraints = on;
        self
    }

    /// Emphasises the entry and exit cells with the terminal bold attribute.
    pub fn bold_endpoints(mut self, on: bool) -> Self {
        self.bold_endpoints = on;
        self
    }
}

impl fmt::Display for Renderer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grid = self.grid;
        if self.constraints {
            write!(f, "  ")?;
            for x in 0..grid.width() {
                write!(f, "{} ", grid.col_demand(x))?;
            }
            writeln!(f)?;
        }
        for y in 0..grid.height() {
            if self.constraints {
                write!(f, "{} ", grid.row_demand(y))?;
            }
            for x in 0..grid.width() {
                let pt = Point::new(x, y);
                let symbol = grid.at(pt).symbol();
                if self.bold_endpoints && (pt == grid.entry() || pt == grid.exit()) {
                    write!(f, "{}", symbol.bold())?;
                } else {
                    write!(f, "{symbol}")?;
                }
                if self.constraints {
                    write!(f, " ")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
