//! Uniform ranges of global indices

/// The global indices `start, start + step, ...` below `stop`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalSlice {
    /// First index
    pub start: usize,
    /// Exclusive upper bound
    pub stop: usize,
    /// Distance between consecutive indices
    pub step: usize,
}

impl GlobalSlice {
    /// Create new
    pub fn new(start: usize, stop: usize, step: usize) -> Self {
        debug_assert!(step > 0);
        Self { start, stop, step }
    }

    /// Number of indices in the slice
    pub fn len(&self) -> usize {
        if self.stop <= self.start {
            0
        } else {
            (self.stop - self.start - 1) / self.step + 1
        }
    }

    /// Is the slice empty?
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Does the slice contain `index`?
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.stop && (index - self.start) % self.step == 0
    }

    /// Iterate over the indices of the slice
    pub fn iter(&self) -> std::iter::StepBy<std::ops::Range<usize>> {
        (self.start..self.stop.max(self.start)).step_by(self.step)
    }
}
