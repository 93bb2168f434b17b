//! The shared Sudoku board: generation, legality checking, completeness and
//! rendering.
//!
//! The board is plain data. It is only ever mutated through the coordinator's
//! write lock, so none of the methods here need their own synchronization.

use rand::seq::SliceRandom;
use rand::Rng;
use shared::{BOX_SIZE, GRID_SIZE, MAX_VALUE, MIN_VALUE};

/// Number of pre-filled immutable cells left after carving a generated
/// solution down to a playable puzzle.
pub const GIVEN_COUNT: usize = 36;

/// A 9x9 Sudoku grid with immutable "given" cells.
///
/// Givens are fixed at construction time and can never be overwritten;
/// every other cell may be claimed and re-claimed by players as long as
/// the placed digit keeps the grid consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<u8>; GRID_SIZE]; GRID_SIZE],
    givens: [[bool; GRID_SIZE]; GRID_SIZE],
}

impl Board {
    /// Generates a playable puzzle: fills a complete valid solution by
    /// randomized backtracking, then blanks cells until [`GIVEN_COUNT`]
    /// givens remain.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
        let filled = fill_solution(&mut cells, 0, rng);
        debug_assert!(filled, "backtracking must always produce a solution");

        let mut positions: Vec<(usize, usize)> = (0..GRID_SIZE)
            .flat_map(|row| (0..GRID_SIZE).map(move |col| (row, col)))
            .collect();
        positions.shuffle(rng);
        for &(row, col) in positions.iter().take(GRID_SIZE * GRID_SIZE - GIVEN_COUNT) {
            cells[row][col] = None;
        }

        Self::from_cells(cells)
    }

    /// Builds a board from explicit rows, where `0` means blank and any
    /// digit is an immutable given. Used by tests that need a known grid.
    pub fn with_givens(rows: [[u8; GRID_SIZE]; GRID_SIZE]) -> Self {
        let mut cells = [[None; GRID_SIZE]; GRID_SIZE];
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value != 0 {
                    cells[row][col] = Some(value);
                }
            }
        }
        Self::from_cells(cells)
    }

    fn from_cells(cells: [[Option<u8>; GRID_SIZE]; GRID_SIZE]) -> Self {
        let mut givens = [[false; GRID_SIZE]; GRID_SIZE];
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                givens[row][col] = cells[row][col].is_some();
            }
        }
        Board { cells, givens }
    }

    /// Whether placing `value` at `(row, col)` is allowed: the cell is not a
    /// given and the digit does not conflict with any *other* cell in the
    /// same row, column or box. Re-placing the digit a cell already holds is
    /// legal, which makes re-claiming a cell a harmless no-op upstream.
    pub fn is_legal_placement(&self, row: usize, col: usize, value: u8) -> bool {
        if self.givens[row][col] {
            return false;
        }
        if !(MIN_VALUE..=MAX_VALUE).contains(&value) {
            return false;
        }
        !conflicts(&self.cells, row, col, value)
    }

    /// Writes `value` into `(row, col)`. Callers must have checked
    /// [`Board::is_legal_placement`] first.
    pub fn place(&mut self, row: usize, col: usize, value: u8) {
        debug_assert!(self.is_legal_placement(row, col, value));
        self.cells[row][col] = Some(value);
    }

    pub fn is_given(&self, row: usize, col: usize) -> bool {
        self.givens[row][col]
    }

    pub fn value_at(&self, row: usize, col: usize) -> Option<u8> {
        self.cells[row][col]
    }

    /// True once every cell is filled. Placements are legality-checked on
    /// entry, so a full board is consistent by construction.
    pub fn is_complete(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_some()))
    }

    /// Renders the grid as 11 text lines: 9 digit rows (`.` for blank,
    /// ` | ` between boxes) with a separator line after rows 2 and 5.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(GRID_SIZE + 2);
        for (row, values) in self.cells.iter().enumerate() {
            let mut line = String::new();
            for (col, cell) in values.iter().enumerate() {
                match cell {
                    Some(value) => line.push(char::from(b'0' + value)),
                    None => line.push('.'),
                }
                if col == GRID_SIZE - 1 {
                    continue;
                }
                if col % BOX_SIZE == BOX_SIZE - 1 {
                    line.push_str(" | ");
                } else {
                    line.push(' ');
                }
            }
            lines.push(line);
            if row % BOX_SIZE == BOX_SIZE - 1 && row != GRID_SIZE - 1 {
                lines.push("------+-------+------".to_string());
            }
        }
        lines.join("\n")
    }
}

/// True if any cell other than `(row, col)` in the same row, column or box
/// already holds `value`.
fn conflicts(
    cells: &[[Option<u8>; GRID_SIZE]; GRID_SIZE],
    row: usize,
    col: usize,
    value: u8,
) -> bool {
    for i in 0..GRID_SIZE {
        if i != col && cells[row][i] == Some(value) {
            return true;
        }
        if i != row && cells[i][col] == Some(value) {
            return true;
        }
    }
    let box_row = row - row % BOX_SIZE;
    let box_col = col - col % BOX_SIZE;
    for r in box_row..box_row + BOX_SIZE {
        for c in box_col..box_col + BOX_SIZE {
            if (r, c) != (row, col) && cells[r][c] == Some(value) {
                return true;
            }
        }
    }
    false
}

/// Fills cells `index..81` in reading order with a valid solution, trying
/// candidate digits in shuffled order. Returns false if the prefix admits no
/// completion, which makes the caller backtrack.
fn fill_solution<R: Rng>(
    cells: &mut [[Option<u8>; GRID_SIZE]; GRID_SIZE],
    index: usize,
    rng: &mut R,
) -> bool {
    if index == GRID_SIZE * GRID_SIZE {
        return true;
    }
    let (row, col) = (index / GRID_SIZE, index % GRID_SIZE);

    let mut candidates: Vec<u8> = (MIN_VALUE..=MAX_VALUE).collect();
    candidates.shuffle(rng);
    for value in candidates {
        if !conflicts(cells, row, col, value) {
            cells[row][col] = Some(value);
            if fill_solution(cells, index + 1, rng) {
                return true;
            }
            cells[row][col] = None;
        }
    }
    false
}

// A known valid complete solution, used by tests across the crate to build
// deterministic boards.
#[cfg(test)]
pub(crate) const SOLVED: [[u8; GRID_SIZE]; GRID_SIZE] = [
    [5, 3, 4, 6, 7, 8, 9, 1, 2],
    [6, 7, 2, 1, 9, 5, 3, 4, 8],
    [1, 9, 8, 3, 4, 2, 5, 6, 7],
    [8, 5, 9, 7, 6, 1, 4, 2, 3],
    [4, 2, 6, 8, 5, 3, 7, 9, 1],
    [7, 1, 3, 9, 2, 4, 8, 5, 6],
    [9, 6, 1, 5, 3, 7, 2, 8, 4],
    [2, 8, 7, 4, 1, 9, 6, 3, 5],
    [3, 4, 5, 2, 8, 6, 1, 7, 9],
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn nearly_solved() -> Board {
        let mut rows = SOLVED;
        rows[8][8] = 0;
        Board::with_givens(rows)
    }

    #[test]
    fn test_generate_leaves_given_count_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        let board = Board::generate(&mut rng);

        let filled: usize = (0..GRID_SIZE)
            .flat_map(|r| (0..GRID_SIZE).map(move |c| (r, c)))
            .filter(|&(r, c)| board.value_at(r, c).is_some())
            .count();
        assert_eq!(filled, GIVEN_COUNT);

        // Every filled cell of a fresh board is a given.
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                assert_eq!(board.value_at(row, col).is_some(), board.is_given(row, col));
            }
        }
    }

    #[test]
    fn test_generated_board_is_consistent() {
        let mut rng = StdRng::seed_from_u64(42);
        let board = Board::generate(&mut rng);

        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                if let Some(value) = board.value_at(row, col) {
                    let mut cells = board.cells;
                    cells[row][col] = None;
                    assert!(
                        !conflicts(&cells, row, col, value),
                        "given at ({}, {}) conflicts with the rest of the grid",
                        row,
                        col
                    );
                }
            }
        }
    }

    #[test]
    fn test_generation_is_deterministic_for_a_seed() {
        let board_a = Board::generate(&mut StdRng::seed_from_u64(3));
        let board_b = Board::generate(&mut StdRng::seed_from_u64(3));
        assert_eq!(board_a, board_b);
    }

    #[test]
    fn test_givens_are_immutable() {
        let board = Board::with_givens(SOLVED);
        assert!(!board.is_legal_placement(0, 0, 5));
        assert!(!board.is_legal_placement(0, 0, 1));
    }

    #[test]
    fn test_row_col_and_box_conflicts() {
        let mut rows = [[0u8; GRID_SIZE]; GRID_SIZE];
        rows[0][0] = 5;
        let board = Board::with_givens(rows);

        assert!(!board.is_legal_placement(0, 8, 5)); // same row
        assert!(!board.is_legal_placement(8, 0, 5)); // same column
        assert!(!board.is_legal_placement(1, 1, 5)); // same box
        assert!(board.is_legal_placement(1, 1, 6));
        assert!(board.is_legal_placement(4, 4, 5)); // unrelated cell
    }

    #[test]
    fn test_replacing_a_cells_own_value_is_legal() {
        let mut board = Board::with_givens([[0u8; GRID_SIZE]; GRID_SIZE]);
        board.place(2, 3, 4);
        assert!(board.is_legal_placement(2, 3, 4));
    }

    #[test]
    fn test_overwriting_a_filled_cell_with_a_legal_digit() {
        let mut board = Board::with_givens([[0u8; GRID_SIZE]; GRID_SIZE]);
        board.place(2, 3, 4);
        assert!(board.is_legal_placement(2, 3, 7));
        board.place(2, 3, 7);
        assert_eq!(board.value_at(2, 3), Some(7));
    }

    #[test]
    fn test_out_of_digit_range_values_are_illegal() {
        let board = Board::with_givens([[0u8; GRID_SIZE]; GRID_SIZE]);
        assert!(!board.is_legal_placement(0, 0, 0));
        assert!(!board.is_legal_placement(0, 0, 10));
    }

    #[test]
    fn test_completeness() {
        let mut board = nearly_solved();
        let value = SOLVED[8][8];
        assert!(!board.is_complete());
        assert!(board.is_legal_placement(8, 8, value));
        board.place(8, 8, value);
        assert!(board.is_complete());
    }

    #[test]
    fn test_solved_fixture_is_a_valid_complete_board() {
        let board = Board::with_givens(SOLVED);
        assert!(board.is_complete());

        // Every cell must be consistent with the rest of the grid, and
        // blanking any single cell must leave its solution value legal to
        // place back.
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let mut cells = board.cells;
                cells[row][col] = None;
                assert!(
                    !conflicts(&cells, row, col, SOLVED[row][col]),
                    "fixture digit at ({}, {}) conflicts with the rest of the grid",
                    row,
                    col
                );

                let mut rows = SOLVED;
                rows[row][col] = 0;
                let carved = Board::with_givens(rows);
                assert!(carved.is_legal_placement(row, col, SOLVED[row][col]));
            }
        }
    }

    #[test]
    fn test_render_shape() {
        let board = Board::with_givens([[0u8; GRID_SIZE]; GRID_SIZE]);
        let rendering = board.render();
        let lines: Vec<&str> = rendering.lines().collect();

        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], ". . . | . . . | . . .");
        assert_eq!(lines[3], "------+-------+------");
        assert_eq!(lines[7], "------+-------+------");
        assert!(lines.iter().all(|line| line.len() == 21));
    }

    #[test]
    fn test_render_cell_addressing() {
        let mut rows = [[0u8; GRID_SIZE]; GRID_SIZE];
        rows[0][0] = 5;
        rows[0][8] = 2;
        rows[8][4] = 9;
        let board = Board::with_givens(rows);
        let rendering = board.render();
        let lines: Vec<&str> = rendering.lines().collect();

        assert_eq!(lines[0], "5 . . | . . . | . . 2");
        assert_eq!(lines[10], ". . . | . 9 . | . . .");
    }
}
