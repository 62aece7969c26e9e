//! Backtracking search from a single starting hole.
//!
//! The solver walks every legal jump sequence depth-first, applying each jump
//! in place and undoing it on the way back. It keeps the dead end with the
//! fewest pegs left, which is the longest chain of captures.
//!
//! At each position the legal jumps are tried in order of how many pegs they
//! leave isolated, then by how close the jumping peg sits to an edge. Good
//! finishes turn up early, so the floor prune below fires quickly.
//!
//! Two prunes keep the search tractable without changing its answer:
//! - The three-coloring parity fixes the fewest pegs a start can end with
//!   (`peg_floor`). Once the record reaches it the rest of the tree is skipped.
//! - Board states are remembered in an FxHashSet keyed by their canonical
//!   symmetric image. Every dead end below a state, or below any rotation or
//!   reflection of it, was already scored the first time it was explored. The
//!   record only ever shrinks, so a revisit cannot produce a strict
//!   improvement.

use log::{debug, trace};
use rustc_hash::FxHashSet;

use crate::board::{Board, JumpTable, Move, Symmetries};
use crate::geometry::peg_floor;

/// Counters gathered during one solver run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveStats {
    /// Board states entered, including pruned ones.
    pub nodes: u64,
    /// States with no legal jump.
    pub dead_ends: u64,
    /// Times the record improved.
    pub records: u64,
}

/// Best sequence found from one starting hole.
#[derive(Debug, Clone)]
pub struct SolverOutcome {
    /// Moves from the full board; the first entry is the opening removal.
    pub moves: Vec<Move>,
    /// Pegs left after the last move.
    pub pegs_remaining: usize,
    pub stats: SolveStats,
}

/// Exhaustive search state for one starting hole.
///
/// Owns its board and move stack outright; only the read-only jump table is
/// borrowed, so independent solvers can run on separate threads.
pub struct Solver<'a> {
    table: &'a JumpTable,
    board: Board,
    /// Moves applied so far along the current search path.
    moves: Vec<Move>,
    /// Fewest pegs seen at a dead end, `None` before the first one.
    best_pegs: Option<usize>,
    /// Copy of `moves` taken when `best_pegs` was set.
    best_moves: Vec<Move>,
    /// Canonical keys of board states already explored.
    seen: FxHashSet<u64>,
    symmetries: Symmetries,
    /// Fewest pegs reachable from the current start.
    floor: usize,
    /// Candidate jumps per search depth, reused across siblings.
    candidates: Vec<Vec<(usize, usize, Move)>>,
    prune: bool,
    stats: SolveStats,
}

impl<'a> Solver<'a> {
    /// Creates a solver for `board`, which should be full.
    ///
    /// With `prune` off every state is expanded; the answer is the same but
    /// the search can be much slower.
    pub fn new(board: Board, table: &'a JumpTable, prune: bool) -> Self {
        Self {
            table,
            board,
            moves: Vec::with_capacity(board.total()),
            best_pegs: None,
            best_moves: Vec::new(),
            seen: FxHashSet::default(),
            symmetries: Symmetries::new(table.rows()),
            floor: 0,
            candidates: Vec::new(),
            prune,
            stats: SolveStats::default(),
        }
    }

    /// Removes the peg at `start` and searches every jump sequence from there.
    ///
    /// `start` must be a hole on the board.
    pub fn run(mut self, start: usize) -> SolverOutcome {
        debug_assert!(start < self.board.total(), "start hole {start} is off the board");

        self.floor = peg_floor(self.table.rows(), start);
        let opening = Move::opening(start);
        self.push(opening);
        self.explore();
        self.pop(opening);

        // a dead end is always reached, even if it is the opening position
        let pegs_remaining = self.best_pegs.unwrap_or(self.board.total() - 1);
        debug!(
            "hole {}: {} pegs left (floor {}) after {} captures ({} nodes, {} dead ends)",
            start + 1,
            pegs_remaining,
            self.floor,
            self.best_moves.len().saturating_sub(1),
            self.stats.nodes,
            self.stats.dead_ends
        );

        SolverOutcome {
            moves: self.best_moves,
            pegs_remaining,
            stats: self.stats,
        }
    }

    fn explore(&mut self) {
        self.stats.nodes += 1;

        if self.prune {
            if self.best_pegs.is_some_and(|best| best <= self.floor) {
                return;
            }
            if !self.seen.insert(self.symmetries.canonical(self.board.bits())) {
                return;
            }
        }

        let depth = self.moves.len();
        let mut candidates = self.take_candidates(depth);
        if candidates.is_empty() {
            self.record_dead_end();
        }
        for &(_, _, jump) in &candidates {
            self.push(jump);
            self.explore();
            self.pop(jump);
        }
        candidates.clear();
        self.candidates[depth] = candidates;
    }

    /// Legal jumps from the current position, best first.
    ///
    /// Ties keep board order: origins ascending, then `DIRECTIONS` order.
    fn take_candidates(&mut self, depth: usize) -> Vec<(usize, usize, Move)> {
        if self.candidates.len() <= depth {
            self.candidates.resize_with(depth + 1, Vec::new);
        }
        let mut candidates = std::mem::take(&mut self.candidates[depth]);

        let table = self.table;
        for origin in 0..self.board.total() {
            if !self.board.is_occupied(origin) {
                continue;
            }
            for &jump in table.jumps_from(origin) {
                if !self.board.can_jump(&jump) {
                    continue;
                }
                self.board.apply(&jump);
                let isolated = self.isolated_pegs();
                self.board.undo(&jump);
                candidates.push((isolated, table.edge_distance(origin), jump));
            }
        }
        candidates.sort_by_key(|&(isolated, edge, _)| (isolated, edge));
        candidates
    }

    /// Pegs with no peg on any adjacent hole.
    fn isolated_pegs(&self) -> usize {
        let bits = self.board.bits();
        let mut rest = bits;
        let mut isolated = 0;
        while rest != 0 {
            let hole = rest.trailing_zeros() as usize;
            if bits & self.table.neighbors(hole) == 0 {
                isolated += 1;
            }
            rest &= rest - 1;
        }
        isolated
    }

    /// Scores a position with no legal jump against the record.
    fn record_dead_end(&mut self) {
        self.stats.dead_ends += 1;

        let pegs = self.board.pegs();
        if self.best_pegs.map_or(true, |best| pegs < best) {
            trace!("new record: {} pegs after {} moves", pegs, self.moves.len());
            self.best_pegs = Some(pegs);
            self.best_moves = self.moves.clone();
            self.stats.records += 1;
        }
    }

    #[inline(always)]
    fn push(&mut self, jump: Move) {
        self.board.apply(&jump);
        self.moves.push(jump);
    }

    #[inline(always)]
    fn pop(&mut self, jump: Move) {
        self.board.undo(&jump);
        self.moves.pop();
    }
}
