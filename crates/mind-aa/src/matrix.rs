//! Symmetric association matrix.
//!
//! Cells start unset (`None`). A row is complete once its diagonal holds
//! `1.0`; the diagonal is written last, after every cell of the cross.

/// Score stored on the diagonal of a computed row.
pub const SELF_SIMILARITY: f32 = 1.0;

/// N×N grid of pairwise association scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AaMatrix {
    dimension: usize,
    cells: Vec<Option<f32>>,
}

impl AaMatrix {
    /// Creates an empty (0×0) matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an N×N matrix of unset cells.
    pub fn with_dimension(n: usize) -> Self {
        let mut matrix = Self::new();
        matrix.reset(n);
        matrix
    }

    /// Resizes to N×N and unsets every cell.
    ///
    /// The allocation is kept when the dimension does not change.
    pub fn reset(&mut self, n: usize) {
        self.dimension = n;
        self.cells.clear();
        self.cells.resize(n * n, None);
    }

    /// Drops the buffer entirely.
    pub fn release(&mut self) {
        self.dimension = 0;
        self.cells = Vec::new();
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn is_empty(&self) -> bool {
        self.dimension == 0
    }

    /// Returns the score of a pair, `None` when unset or out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.offset(x, y).and_then(|i| self.cells[i])
    }

    /// Writes a score into both `[x][y]` and `[y][x]`.
    pub fn set_pair(&mut self, x: usize, y: usize, score: f32) {
        if let (Some(a), Some(b)) = (self.offset(x, y), self.offset(y, x)) {
            self.cells[a] = Some(score);
            self.cells[b] = Some(score);
        }
    }

    /// Returns true once row `y` has been fully computed.
    pub fn is_row_done(&self, y: usize) -> bool {
        self.get(y, y) == Some(SELF_SIMILARITY)
    }

    /// Flags row `y` as complete.
    pub fn mark_row_done(&mut self, y: usize) {
        if let Some(i) = self.offset(y, y) {
            self.cells[i] = Some(SELF_SIMILARITY);
        }
    }

    /// Copies out row `y`.
    pub fn row(&self, y: usize) -> Vec<Option<f32>> {
        if y >= self.dimension {
            return Vec::new();
        }
        let start = y * self.dimension;
        self.cells[start..start + self.dimension].to_vec()
    }

    /// Number of rows flagged complete.
    pub fn rows_done(&self) -> usize {
        (0..self.dimension).filter(|&y| self.is_row_done(y)).count()
    }

    /// Checks `[x][y] == [y][x]` for every pair.
    pub fn is_symmetric(&self) -> bool {
        (0..self.dimension)
            .all(|y| (y + 1..self.dimension).all(|x| self.get(x, y) == self.get(y, x)))
    }

    fn offset(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.dimension && y < self.dimension).then(|| y * self.dimension + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_matrix_is_unset() {
        let m = AaMatrix::with_dimension(3);
        assert_eq!(m.dimension(), 3);
        assert_eq!(m.get(0, 1), None);
        assert!(!m.is_row_done(0));
        assert!(m.is_symmetric());
    }

    #[test]
    fn set_pair_mirrors() {
        let mut m = AaMatrix::with_dimension(3);
        m.set_pair(0, 2, 0.4);
        assert_eq!(m.get(0, 2), Some(0.4));
        assert_eq!(m.get(2, 0), Some(0.4));
        assert!(m.is_symmetric());
    }

    #[test]
    fn diagonal_marks_row_done() {
        let mut m = AaMatrix::with_dimension(2);
        m.mark_row_done(1);
        assert!(m.is_row_done(1));
        assert!(!m.is_row_done(0));
        assert_eq!(m.rows_done(), 1);
        assert_eq!(m.row(1), vec![None, Some(1.0)]);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut m = AaMatrix::with_dimension(2);
        m.set_pair(5, 0, 0.9);
        m.mark_row_done(7);
        assert_eq!(m.get(5, 0), None);
        assert!(m.row(7).is_empty());
    }

    #[test]
    fn reset_unsets_and_release_drops() {
        let mut m = AaMatrix::with_dimension(2);
        m.set_pair(0, 1, 0.5);
        m.reset(2);
        assert_eq!(m.get(0, 1), None);

        m.release();
        assert!(m.is_empty());
        assert_eq!(m.get(0, 0), None);
    }
}
