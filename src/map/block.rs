//! Block maps
use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, ConstructionError, DistType, GlobalSlice, IndexError},
};

/// Map owning the contiguous global range `[start, stop)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockMap {
    global_size: usize,
    grid_size: usize,
    grid_rank: usize,
    start: usize,
    stop: usize,
}

impl BlockMap {
    /// Create new
    pub fn new(
        global_size: usize,
        grid_size: usize,
        grid_rank: usize,
        start: usize,
        stop: usize,
    ) -> Result<Self, ConstructionError> {
        if grid_size == 0 {
            return Err(ConstructionError::ZeroGridSize);
        }
        if grid_rank >= grid_size {
            return Err(ConstructionError::GridRankOutOfRange {
                grid_rank,
                grid_size,
            });
        }
        if start > stop || stop > global_size {
            return Err(ConstructionError::InvalidBlockBounds {
                start,
                stop,
                size: global_size,
            });
        }
        Ok(Self {
            global_size,
            grid_size,
            grid_rank,
            start,
            stop,
        })
    }

    /// Create the map of `grid_rank` when the axis is split into chunks of equal size
    ///
    /// Chunks hold `ceil(global_size / grid_size)` elements; the last non-empty chunk may be
    /// shorter and trailing chunks may be empty.
    pub fn even(
        global_size: usize,
        grid_size: usize,
        grid_rank: usize,
    ) -> Result<Self, ConstructionError> {
        if grid_size == 0 {
            return Err(ConstructionError::ZeroGridSize);
        }
        let (start, stop) = even_bounds(global_size, grid_size, grid_rank);
        Self::new(global_size, grid_size, grid_rank, start, stop)
    }

    /// First owned global index
    pub fn start(&self) -> usize {
        self.start
    }

    /// One past the last owned global index
    pub fn stop(&self) -> usize {
        self.stop
    }
}

/// The bounds of chunk `grid_rank` when `global_size` is split into `grid_size` chunks
pub(crate) fn even_bounds(global_size: usize, grid_size: usize, grid_rank: usize) -> (usize, usize) {
    let chunk = num::Integer::div_ceil(&global_size, &grid_size);
    (
        usize::min(grid_rank * chunk, global_size),
        usize::min((grid_rank + 1) * chunk, global_size),
    )
}

impl AxisMap for BlockMap {
    type GlobalIter<'a> = std::ops::Range<usize>;

    fn dist_type(&self) -> DistType {
        DistType::Block
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
        self.stop - self.start
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.global_size {
            Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.global_size,
            })
        } else if global_index < self.start || global_index >= self.stop {
            Err(IndexError::NotOwned {
                index: global_index,
            })
        } else {
            Ok(global_index - self.start)
        }
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        if local_index >= self.local_size() {
            Err(IndexError::LocalOutOfRange {
                index: local_index,
                local_size: self.local_size(),
            })
        } else {
            Ok(self.start + local_index)
        }
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        self.start..self.stop
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        Some(GlobalSlice::new(self.start, self.stop, 1))
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        AxisDescriptor::block(
            self.global_size,
            self.grid_rank,
            self.grid_size,
            self.start,
            self.stop,
        )
    }
}
