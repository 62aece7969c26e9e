//! Board state and moves for triangular peg solitaire.
//!
//! The board is a bitmask where bit `i` is set if hole `i` holds a peg. A
//! 10-row board has 55 holes, so a `u64` covers every supported size.

use std::fmt;

use crate::geometry::{
    coord_of, edge_distance, jump_target, peg_index, total_pegs, transform, DIRECTIONS,
    SYMMETRIES,
};

/// Largest board that fits in the `u64` occupancy mask.
pub const MAX_BOARD_ROWS: usize = 10;

/// A jump from `origin` over `removed` into `destination`.
///
/// The opening move that empties the starting hole is encoded with all three
/// fields equal; applying it clears that single hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub origin: usize,
    pub destination: usize,
    pub removed: usize,
}

impl Move {
    pub const fn new(origin: usize, destination: usize, removed: usize) -> Self {
        Self {
            origin,
            destination,
            removed,
        }
    }

    /// The degenerate move that removes the peg at `hole` to start a game.
    pub const fn opening(hole: usize) -> Self {
        Self::new(hole, hole, hole)
    }

    /// Returns true for the starting-hole removal rather than a capture.
    pub const fn is_opening(&self) -> bool {
        self.origin == self.destination && self.destination == self.removed
    }
}

/// Formats as `(origin, destination)` with 1-based hole numbers.
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.origin + 1, self.destination + 1)
    }
}

/// Pre-computed on-board jumps and neighborhoods for every hole.
///
/// `jumps[origin]` lists each jump whose landing hole lies on the board, in
/// `DIRECTIONS` order. Occupancy is not considered here.
#[derive(Debug, Clone)]
pub struct JumpTable {
    rows: usize,
    jumps: Vec<Vec<Move>>,
    /// Mask of the on-board holes adjacent to each hole.
    neighbors: Vec<u64>,
    edge: Vec<usize>,
}

impl JumpTable {
    pub fn new(rows: usize) -> Self {
        let total = total_pegs(rows);
        let jumps: Vec<Vec<Move>> = (0..total)
            .map(|origin| {
                DIRECTIONS
                    .iter()
                    .filter_map(|&direction| jump_target(origin, direction))
                    .filter(|&(landing, _)| landing < total)
                    .map(|(landing, jumped)| Move::new(origin, landing, jumped))
                    .collect()
            })
            .collect();
        // the jumped holes of all six directions are the adjacent holes
        let neighbors = (0..total)
            .map(|hole| {
                DIRECTIONS
                    .iter()
                    .filter_map(|&(_, _, jump_row, jump_disp)| {
                        let (row, displacement) = coord_of(hole)?;
                        peg_index(row as i32 + jump_row, displacement as i32 + jump_disp)
                    })
                    .filter(|&adjacent| adjacent < total)
                    .fold(0u64, |mask, adjacent| mask | 1 << adjacent)
            })
            .collect();
        let edge = (0..total)
            .map(|hole| edge_distance(rows, hole).unwrap_or(0))
            .collect();

        Self {
            rows,
            jumps,
            neighbors,
            edge,
        }
    }

    /// Number of rows the table was built for.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// All on-board jumps starting at `origin`.
    #[inline(always)]
    pub fn jumps_from(&self, origin: usize) -> &[Move] {
        &self.jumps[origin]
    }

    /// Mask of the holes adjacent to `hole`.
    #[inline(always)]
    pub fn neighbors(&self, hole: usize) -> u64 {
        self.neighbors[hole]
    }

    /// Distance from `hole` to the nearest side of the board.
    #[inline(always)]
    pub fn edge_distance(&self, hole: usize) -> usize {
        self.edge[hole]
    }

    /// Returns true if `jump` is one of the geometric jumps of this board.
    pub fn contains(&self, jump: &Move) -> bool {
        self.jumps
            .get(jump.origin)
            .is_some_and(|jumps| jumps.contains(jump))
    }
}

/// Hole permutations for the rotations and reflections of one board size.
///
/// Two positions related by a symmetry have the same jumps up to relabeling,
/// so they reach dead ends with the same peg counts.
#[derive(Debug, Clone)]
pub struct Symmetries {
    /// `maps[k][hole]` is the image of `hole` under symmetry `k`; the
    /// identity is left out.
    maps: Vec<Vec<u8>>,
}

impl Symmetries {
    pub fn new(rows: usize) -> Self {
        let total = total_pegs(rows);
        let maps = (1..SYMMETRIES)
            .map(|k| {
                (0..total)
                    .map(|hole| transform(rows, hole, k).unwrap_or(hole) as u8)
                    .collect()
            })
            .collect();

        Self { maps }
    }

    /// Smallest occupancy mask among all symmetric images of `bits`.
    #[inline]
    pub fn canonical(&self, bits: u64) -> u64 {
        self.maps
            .iter()
            .map(|map| permute(bits, map))
            .fold(bits, u64::min)
    }
}

#[inline(always)]
fn permute(mut bits: u64, map: &[u8]) -> u64 {
    let mut image = 0u64;
    while bits != 0 {
        let hole = bits.trailing_zeros() as usize;
        image |= 1 << map[hole];
        bits &= bits - 1;
    }
    image
}

/// Peg occupancy of a triangular board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Board {
    total: usize,
    /// Bit `i` set if hole `i` holds a peg.
    occupied: u64,
    /// Number of set bits in `occupied`.
    pegs: usize,
}

impl Board {
    /// Creates a board with every hole filled.
    ///
    /// Returns `None` for zero rows or more than `MAX_BOARD_ROWS`.
    pub fn full(rows: usize) -> Option<Self> {
        if rows == 0 || rows > MAX_BOARD_ROWS {
            return None;
        }
        let total = total_pegs(rows);
        Some(Self {
            total,
            occupied: (1u64 << total) - 1,
            pegs: total,
        })
    }

    /// Number of holes on the board.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pegs currently on the board.
    pub fn pegs(&self) -> usize {
        self.pegs
    }

    /// Raw occupancy mask, usable as a state key.
    #[inline(always)]
    pub fn bits(&self) -> u64 {
        self.occupied
    }

    #[inline(always)]
    pub fn is_occupied(&self, hole: usize) -> bool {
        hole < self.total && self.occupied & (1 << hole) != 0
    }

    #[inline(always)]
    fn set(&mut self, hole: usize, peg: bool) {
        if peg {
            self.occupied |= 1 << hole;
        } else {
            self.occupied &= !(1 << hole);
        }
    }

    /// Checks occupancy for a jump already known to be geometrically valid.
    ///
    /// Origin and midpoint must hold pegs and the landing hole must be empty.
    #[inline(always)]
    pub fn can_jump(&self, jump: &Move) -> bool {
        self.is_occupied(jump.origin)
            && self.is_occupied(jump.removed)
            && jump.destination < self.total
            && !self.is_occupied(jump.destination)
    }

    /// Applies a move. The caller is responsible for legality.
    ///
    /// Writes happen in origin, destination, removed order so the opening move
    /// leaves its hole empty.
    #[inline(always)]
    pub fn apply(&mut self, jump: &Move) {
        self.set(jump.origin, false);
        self.set(jump.destination, true);
        self.set(jump.removed, false);
        self.pegs -= 1;
    }

    /// Reverses `apply` for the same move.
    #[inline(always)]
    pub fn undo(&mut self, jump: &Move) {
        self.set(jump.origin, true);
        self.set(jump.destination, false);
        self.set(jump.removed, true);
        self.pegs += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_board_bounds() {
        assert!(Board::full(0).is_none());
        assert!(Board::full(MAX_BOARD_ROWS + 1).is_none());

        let board = Board::full(MAX_BOARD_ROWS).unwrap();
        assert_eq!(board.total(), 55);
        assert_eq!(board.pegs(), 55);
        assert_eq!(board.bits().count_ones(), 55);
    }

    #[test]
    fn test_opening_move_empties_one_hole() {
        let mut board = Board::full(5).unwrap();
        board.apply(&Move::opening(4));

        assert!(!board.is_occupied(4));
        assert_eq!(board.pegs(), 14);
        assert_eq!(board.bits().count_ones(), 14);
    }

    #[test]
    fn test_apply_then_undo_restores_board() {
        let table = JumpTable::new(5);
        let mut board = Board::full(5).unwrap();
        board.apply(&Move::opening(0));

        for origin in 0..board.total() {
            for jump in table.jumps_from(origin) {
                if !board.can_jump(jump) {
                    continue;
                }
                let before = board;
                board.apply(jump);
                assert_ne!(board, before);
                assert_eq!(board.pegs(), before.pegs() - 1);
                assert_eq!(board.bits().count_ones() as usize, board.pegs());
                board.undo(jump);
                assert_eq!(board, before, "undo of {jump:?} did not restore the board");
            }
        }
    }

    #[test]
    fn test_jump_legality_from_apex_hole() {
        let table = JumpTable::new(5);
        let mut board = Board::full(5).unwrap();
        board.apply(&Move::opening(0));

        let legal: Vec<Move> = (0..board.total())
            .flat_map(|origin| table.jumps_from(origin).iter().copied())
            .filter(|jump| board.can_jump(jump))
            .collect();

        // holes 3 and 5 can jump into the apex over 1 and 2
        assert_eq!(legal, vec![Move::new(3, 0, 1), Move::new(5, 0, 2)]);
    }

    #[test]
    fn test_jump_table_stays_on_board() {
        let table = JumpTable::new(5);
        assert_eq!(table.jumps_from(0).len(), 2);
        for origin in 0..15 {
            for jump in table.jumps_from(origin) {
                assert!(jump.destination < 15);
                assert!(table.contains(jump));
            }
        }
        assert!(!table.contains(&Move::new(0, 1, 2)));
    }

    #[test]
    fn test_neighbor_masks() {
        let table = JumpTable::new(5);
        assert_eq!(table.rows(), 5);
        assert_eq!(table.neighbors(0), 0b110);
        // hole 4 sits in the middle of row 2 and has all six neighbors
        assert_eq!(table.neighbors(4).count_ones(), 6);
        assert_eq!(table.neighbors(14).count_ones(), 2);
        for hole in 0..15 {
            for other in 0..15 {
                let forward = table.neighbors(hole) & (1 << other) != 0;
                let backward = table.neighbors(other) & (1 << hole) != 0;
                assert_eq!(forward, backward, "{hole} and {other}");
            }
        }
        assert_eq!(table.edge_distance(4), 1);
        assert_eq!(table.edge_distance(10), 0);
    }

    #[test]
    fn test_move_display_is_one_based() {
        assert_eq!(Move::new(3, 0, 1).to_string(), "(4, 1)");
        assert!(Move::opening(2).is_opening());
        assert!(!Move::new(3, 0, 1).is_opening());
    }

    #[test]
    fn test_canonical_key_is_shared_by_symmetric_boards() {
        let symmetries = Symmetries::new(5);
        // openings at the three corners are rotations of one another
        let keys: Vec<u64> = [0, 10, 14]
            .iter()
            .map(|&corner| {
                let mut board = Board::full(5).unwrap();
                board.apply(&Move::opening(corner));
                symmetries.canonical(board.bits())
            })
            .collect();
        assert!(keys.iter().all(|&key| key == keys[0]));

        let mut edge = Board::full(5).unwrap();
        edge.apply(&Move::opening(1));
        assert_ne!(symmetries.canonical(edge.bits()), keys[0]);
        assert_eq!(symmetries.canonical(edge.bits()).count_ones(), 14);
    }

    #[test]
    fn test_canonical_key_is_idempotent() {
        let symmetries = Symmetries::new(4);
        let full = Board::full(4).unwrap().bits();
        assert_eq!(symmetries.canonical(full), full);
        assert_eq!(symmetries.canonical(0), 0);
        for bits in [0b1, 0b1011, 0b10_0110_0101] {
            let key = symmetries.canonical(bits);
            assert!(key <= bits);
            assert_eq!(symmetries.canonical(key), key);
        }
    }
}
