//! Triangular Peg Solitaire Solver Library
//!
//! Finds the longest chain of jumps on a triangular peg solitaire board by
//! exhaustive backtracking from each distinct starting hole, with the starting
//! holes searched in parallel.

pub mod board;
pub mod geometry;
pub mod report;
pub mod search;
pub mod solver;

pub use board::{Board, JumpTable, Move, Symmetries, MAX_BOARD_ROWS};
pub use report::format_solution;
pub use search::{
    replay, solve, solve_hole, starting_holes, ReplayError, Solution, SolverConfig,
    StartSelection,
};
pub use solver::{SolveStats, Solver, SolverOutcome};
