//! Train Tracks Puzzle Solver
//!
//! Loads a puzzle file, deduces the placements the demands force, then
//! searches for the single track joining the entry to the exit and prints
//! the outcome.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use tracks::{Grid, PathSolver, Progress, Puzzle, Renderer};

/// Solves Train Tracks puzzles from demand-and-fixed-piece files.
#[derive(Parser)]
#[command(name = "tracks")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle and print the finished track.
    Solve(SolveArgs),
    /// Print a puzzle's grid after deduction, without solving.
    Show(ViewArgs),
}

#[derive(Args)]
struct ViewArgs {
    /// Puzzle file to load.
    file: PathBuf,
    /// Surround the grid with its row and column demands.
    #[arg(long)]
    constraints: bool,
    /// Bold the entry and exit cells.
    #[arg(long)]
    bold: bool,
}

#[derive(Args)]
struct SolveArgs {
    #[command(flatten)]
    view: ViewArgs,
    /// Print the step count every N search steps.
    #[arg(long, value_name = "N")]
    progress: Option<u64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Solve(args) => run_solve(args),
        Command::Show(args) => run_show(args),
    }
}

/// Prints the running step count so long searches show signs of life.
struct ConsoleReporter {
    every: u64,
}

impl Progress for ConsoleReporter {
    fn interval(&self) -> u64 {
        self.every
    }

    fn report(&mut self, steps: u64) {
        println!("{steps} steps");
    }
}

fn run_solve(args: SolveArgs) -> ExitCode {
    let Some(mut grid) = load_grid(&args.view.file) else {
        return ExitCode::FAILURE;
    };

    let solved = match args.progress {
        Some(every) => {
            let mut reporter = ConsoleReporter { every };
            let mut solver = PathSolver::with_reporter(&mut reporter);
            solver.solve(&mut grid)
        }
        None => PathSolver::new().solve(&mut grid),
    };

    print!("{}", renderer(&grid, &args.view));
    if solved {
        println!("Solved");
        ExitCode::SUCCESS
    } else {
        println!("Unable to solve");
        ExitCode::FAILURE
    }
}

fn run_show(args: ViewArgs) -> ExitCode {
    let Some(grid) = load_grid(&args.file) else {
        return ExitCode::FAILURE;
    };
    print!("{}", renderer(&grid, &args));
    ExitCode::SUCCESS
}

/// Loads the puzzle and builds the validated grid, reporting failures to
/// stderr.
fn load_grid(file: &Path) -> Option<Grid> {
    let puzzle = match Puzzle::load(file) {
        Ok(puzzle) => puzzle,
        Err(e) => {
            eprintln!("failed to load {}: {e}", file.display());
            return None;
        }
    };
    match Grid::new(&puzzle) {
        Ok(grid) => Some(grid),
        Err(e) => {
            eprintln!("invalid puzzle: {e}");
            None
        }
    }
}

fn renderer<'a>(grid: &'a Grid, view: &ViewArgs) -> Renderer<'a> {
    Renderer::new(grid)
        .constraints(view.constraints)
        .bold_endpoints(view.bold)
}
