//! Text rendering of search results.

use crate::search::Solution;

/// Formats a solution for the command line.
///
/// The first line is `(start, pegs left)`, followed by one `(origin,
/// destination)` line per capture. All hole numbers are 1-based. The opening
/// removal is not listed.
pub fn format_solution(solution: &Solution) -> String {
    let mut output = format!("({}, {})\n", solution.start + 1, solution.pegs_remaining);
    for jump in &solution.moves {
        output.push_str(&format!("{jump}\n"));
    }
    output
}
