//! Top-K extraction over one matrix row.

/// Fixed-capacity, descending list of `(matrix index, score)` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaderboard {
    capacity: usize,
    slots: Vec<(usize, f32)>,
}

impl Leaderboard {
    /// Creates an empty leaderboard holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slots: Vec::with_capacity(capacity),
        }
    }

    /// Offers a candidate; returns true if it made the board.
    ///
    /// Bounded insertion sort: the candidate is placed below every entry
    /// whose score is greater or equal, so ties keep first-found order.
    pub fn offer(&mut self, index: usize, score: f32) -> bool {
        if self.capacity == 0 {
            return false;
        }
        if self.slots.len() == self.capacity {
            match self.slots.last() {
                Some(&(_, worst)) if score > worst => {}
                _ => return false,
            }
        }

        let position = self
            .slots
            .iter()
            .position(|&(_, s)| score > s)
            .unwrap_or(self.slots.len());
        if self.slots.len() == self.capacity {
            self.slots.pop();
        }
        self.slots.insert(position, (index, score));
        true
    }

    /// Builds the board of row `row`, skipping `exclude`, unset cells and
    /// non-positive scores.
    pub fn extract(row: &[Option<f32>], exclude: usize, capacity: usize) -> Self {
        let mut board = Self::new(capacity);
        for (index, cell) in row.iter().enumerate() {
            if index == exclude {
                continue;
            }
            match *cell {
                Some(score) if score > 0.0 => {
                    board.offer(index, score);
                }
                _ => {}
            }
        }
        board
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Occupied slots, best first.
    pub fn entries(&self) -> &[(usize, f32)] {
        &self.slots
    }

    pub fn into_entries(self) -> Vec<(usize, f32)> {
        self.slots
    }
}
