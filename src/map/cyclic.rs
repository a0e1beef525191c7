//! Cyclic maps
use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, ConstructionError, DistType, GlobalSlice, IndexError},
};

/// Map owning every `grid_size`-th global index, starting at `grid_rank`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CyclicMap {
    global_size: usize,
    grid_size: usize,
    grid_rank: usize,
}

impl CyclicMap {
    /// Create new
    ///
    /// `start` must equal `grid_rank`: a cyclic map always starts at its own grid position.
    pub fn new(
        global_size: usize,
        grid_size: usize,
        grid_rank: usize,
        start: usize,
    ) -> Result<Self, ConstructionError> {
        if grid_size == 0 {
            return Err(ConstructionError::ZeroGridSize);
        }
        if start != grid_rank {
            return Err(ConstructionError::CyclicStartMismatch { start, grid_rank });
        }
        if start >= grid_size {
            return Err(ConstructionError::CyclicStartOutOfGrid { start, grid_size });
        }
        Ok(Self {
            global_size,
            grid_size,
            grid_rank,
        })
    }

    /// First owned global index
    pub fn start(&self) -> usize {
        self.grid_rank
    }
}

impl AxisMap for CyclicMap {
    type GlobalIter<'a> = std::iter::StepBy<std::ops::Range<usize>>;

    fn dist_type(&self) -> DistType {
        DistType::Cyclic
    }
    fn global_size(&self) -> usize {
        self.global_size
    }
    fn grid_size(&self) -> usize {
        self.grid_size
    }
    fn grid_rank(&self) -> usize {
        self.grid_rank
    }
    fn local_size(&self) -> usize {
        if self.grid_rank >= self.global_size {
            0
        } else {
            (self.global_size - 1 - self.grid_rank) / self.grid_size + 1
        }
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.global_size {
            return Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.global_size,
            });
        }
        let start = self.start();
        if global_index < start || (global_index - start) % self.grid_size != 0 {
            Err(IndexError::NotOwned {
                index: global_index,
            })
        } else {
            Ok((global_index - start) / self.grid_size)
        }
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        if local_index >= self.local_size() {
            Err(IndexError::LocalOutOfRange {
                index: local_index,
                local_size: self.local_size(),
            })
        } else {
            Ok(local_index * self.grid_size + self.start())
        }
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        (self.start().min(self.global_size)..self.global_size).step_by(self.grid_size)
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        Some(GlobalSlice::new(
            self.start().min(self.global_size),
            self.global_size,
            self.grid_size,
        ))
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        AxisDescriptor::cyclic(self.global_size, self.grid_rank, self.grid_size)
    }
}
