//! Axes that are not distributed
use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, DistType, GlobalSlice, IndexError},
};

/// Map of an axis held whole by every process
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotDistributedMap {
    size: usize,
}

impl NotDistributedMap {
    /// Create new
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl AxisMap for NotDistributedMap {
    type GlobalIter<'a> = std::ops::Range<usize>;

    fn dist_type(&self) -> DistType {
        DistType::NotDistributed
    }
    fn global_size(&self) -> usize {
        self.size
    }
    fn grid_size(&self) -> usize {
        1
    }
    fn grid_rank(&self) -> usize {
        0
    }
    fn local_size(&self) -> usize {
        self.size
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.size {
            Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.size,
            })
        } else {
            Ok(global_index)
        }
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        if local_index >= self.size {
            Err(IndexError::LocalOutOfRange {
                index: local_index,
                local_size: self.size,
            })
        } else {
            Ok(local_index)
        }
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        0..self.size
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        Some(GlobalSlice::new(0, self.size, 1))
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        AxisDescriptor::not_distributed(self.size)
    }
}
