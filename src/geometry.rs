//! Triangular board geometry.
//!
//! Holes are numbered row-major from the apex: row `r` (0-based) starts at the
//! triangular number `T(r) = r * (r + 1) / 2` and holds `r + 1` holes. A hole
//! is addressed either by its linear index or by `(row, displacement)` where
//! the displacement counts from the left edge of its row.
//!
//! Every function here is total: off-board coordinates yield `None` so the
//! solver can look up neighbors without bounds checks of its own.

/// Triangular numbers for rows 0 through 17.
///
/// `TRIANGULAR[r]` is both the index of the first hole in row `r` and the
/// number of holes on a board with `r` rows.
pub const TRIANGULAR: [usize; 18] = [
    0, 1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 66, 78, 91, 105, 120, 136, 153,
];

/// One jump direction as `(land_row, land_disp, jump_row, jump_disp)` offsets.
///
/// The landing hole is two hops from the origin and the jumped hole is the
/// midpoint.
pub type Direction = (i32, i32, i32, i32);

/// The six jump directions of the triangular grid.
///
/// The order is fixed (up, right, down-right, down, left, up-left) so the
/// search visits moves deterministically.
pub const DIRECTIONS: [Direction; 6] = [
    (-2, 0, -1, 0),
    (0, 2, 0, 1),
    (2, 2, 1, 1),
    (2, 0, 1, 0),
    (0, -2, 0, -1),
    (-2, -2, -1, -1),
];

/// Number of holes on a board with `rows` rows.
#[inline]
pub const fn total_pegs(rows: usize) -> usize {
    rows * (rows + 1) / 2
}

/// Converts `(row, displacement)` to a linear hole index.
///
/// Returns `None` if the row is outside the precomputed table or the
/// displacement is not in `0..=row`.
#[inline]
pub fn peg_index(row: i32, displacement: i32) -> Option<usize> {
    if row < 0 || row as usize >= TRIANGULAR.len() || displacement < 0 || displacement > row {
        return None;
    }
    Some(TRIANGULAR[row as usize] + displacement as usize)
}

/// One past the last hole of the last tabulated row.
const TABLE_HOLES: usize = TRIANGULAR[TRIANGULAR.len() - 1] + TRIANGULAR.len();

/// Returns the row containing `index`.
///
/// This is the largest row whose first hole is at or before `index`.
/// Indices past the last tabulated row yield `None`.
#[inline]
pub fn row_of(index: usize) -> Option<usize> {
    if index >= TABLE_HOLES {
        return None;
    }
    // first row starting after index, minus one
    let next_row = TRIANGULAR.partition_point(|&start| start <= index);
    Some(next_row - 1)
}

/// Returns the displacement of `index` within its row.
#[inline]
pub fn displacement_of(index: usize) -> Option<usize> {
    row_of(index).map(|row| index - TRIANGULAR[row])
}

/// Returns `(row, displacement)` for `index`.
#[inline]
pub fn coord_of(index: usize) -> Option<(usize, usize)> {
    row_of(index).map(|row| (row, index - TRIANGULAR[row]))
}

/// Reflects a hole across the board's vertical axis: `(r, d) -> (r, r - d)`.
pub fn mirror(index: usize) -> Option<usize> {
    let (row, displacement) = coord_of(index)?;
    Some(TRIANGULAR[row] + row - displacement)
}

/// Returns `(landing, jumped)` for a jump from `origin` in `direction`.
///
/// Either hole may be off the tabulated triangle, in which case `None` is
/// returned. The caller still has to check the landing hole against its own
/// board size.
#[inline]
pub fn jump_target(origin: usize, direction: Direction) -> Option<(usize, usize)> {
    let (row, displacement) = coord_of(origin)?;
    let (row, displacement) = (row as i32, displacement as i32);
    let (land_row, land_disp, jump_row, jump_disp) = direction;

    let landing = peg_index(row + land_row, displacement + land_disp)?;
    let jumped = peg_index(row + jump_row, displacement + jump_disp)?;
    Some((landing, jumped))
}

/// Number of rotations and reflections of the triangle, identity included.
pub const SYMMETRIES: usize = 6;

/// Maps `index` on a `rows`-row board through symmetry `k`.
///
/// A hole `(r, d)` has distances `(d, r - d, rows - 1 - r)` to the three
/// sides; each symmetry permutes those distances. `k == 0` is the identity and
/// `k == 1` is `mirror`. Holes off the board and `k >= SYMMETRIES` yield
/// `None`.
pub fn transform(rows: usize, index: usize, k: usize) -> Option<usize> {
    let (row, displacement) = coord_of(index)?;
    if row >= rows {
        return None;
    }
    let (a, b, c) = (displacement, row - displacement, rows - 1 - row);
    let (left, bottom) = match k {
        0 => (a, c),
        1 => (b, c),
        2 => (a, b),
        3 => (c, b),
        4 => (b, a),
        5 => (c, a),
        _ => return None,
    };
    peg_index((rows - 1 - bottom) as i32, left as i32)
}

/// Distance from `index` to the nearest side of a `rows`-row board.
///
/// Corners and edge holes are at distance 0.
pub fn edge_distance(rows: usize, index: usize) -> Option<usize> {
    let (row, displacement) = coord_of(index)?;
    if row >= rows {
        return None;
    }
    Some(displacement.min(row - displacement).min(rows - 1 - row))
}

/// Color of a hole under the three-coloring `(row + displacement) mod 3`.
///
/// Every jump lines up three consecutive holes, one of each color.
#[inline]
pub fn color_of(index: usize) -> Option<usize> {
    coord_of(index).map(|(row, displacement)| (row + displacement) % 3)
}

/// Fewest pegs any game on `rows` rows started at `start` can end with.
///
/// A jump takes one peg from each of two colors and adds one to the third,
/// so the parities of the three color counts all flip together. When they
/// are equal after the opening removal they stay equal, and a single peg
/// (one odd count) can never be reached.
pub fn peg_floor(rows: usize, start: usize) -> usize {
    let total = total_pegs(rows);
    if total <= 1 {
        return 0;
    }
    let mut counts = [0usize; 3];
    for hole in (0..total).filter(|&hole| hole != start) {
        if let Some(color) = color_of(hole) {
            counts[color] += 1;
        }
    }
    let parity = counts.map(|count| count % 2);
    if parity[0] == parity[1] && parity[1] == parity[2] {
        2
    } else {
        1
    }
}
