//! Unstructured maps
use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, ConstructionError, DistType, GlobalSlice, IndexError},
};
use std::collections::HashMap;

/// Map owning an explicit list of global indices
///
/// The order of `indices` is the local order.
#[derive(Debug, Clone)]
pub struct UnstructuredMap {
    global_size: usize,
    grid_size: usize,
    grid_rank: usize,
    indices: Vec<usize>,
    local_indices: HashMap<usize, usize>,
}

impl UnstructuredMap {
    /// Create new
    pub fn new(
        global_size: usize,
        grid_size: usize,
        grid_rank: usize,
        indices: Vec<usize>,
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
        let mut local_indices = HashMap::with_capacity(indices.len());
        for (local, global) in indices.iter().enumerate() {
            if *global >= global_size {
                return Err(ConstructionError::IndexOutOfRange {
                    index: *global,
                    size: global_size,
                });
            }
            if local_indices.insert(*global, local).is_some() {
                return Err(ConstructionError::DuplicateIndex { index: *global });
            }
        }
        Ok(Self {
            global_size,
            grid_size,
            grid_rank,
            indices,
            local_indices,
        })
    }

    /// Owned global indices, in local order
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl PartialEq for UnstructuredMap {
    fn eq(&self, other: &Self) -> bool {
        self.global_size == other.global_size
            && self.grid_size == other.grid_size
            && self.grid_rank == other.grid_rank
            && self.indices == other.indices
    }
}
impl Eq for UnstructuredMap {}

impl AxisMap for UnstructuredMap {
    type GlobalIter<'a> = std::iter::Copied<std::slice::Iter<'a, usize>>;

    fn dist_type(&self) -> DistType {
        DistType::Unstructured
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
        self.indices.len()
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.global_size {
            return Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.global_size,
            });
        }
        self.local_indices
            .get(&global_index)
            .copied()
            .ok_or(IndexError::NotOwned {
                index: global_index,
            })
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        self.indices
            .get(local_index)
            .copied()
            .ok_or(IndexError::LocalOutOfRange {
                index: local_index,
                local_size: self.indices.len(),
            })
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        self.indices.iter().copied()
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        None
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        AxisDescriptor::unstructured(
            self.global_size,
            self.grid_rank,
            self.grid_size,
            self.indices.clone(),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_local_and_global() {
        let m = UnstructuredMap::new(10, 3, 0, vec![5, 1, 9]).unwrap();
        assert_eq!(m.local_from_global(1), Ok(1));
        assert_eq!(m.local_from_global(9), Ok(2));
        assert_eq!(m.global_from_local(0), Ok(5));
        assert_eq!(m.owned_globals().collect::<Vec<_>>(), vec![5, 1, 9]);
        assert_eq!(m.local_from_global(2), Err(IndexError::NotOwned { index: 2 }));
        assert!(m.global_from_local(3).is_err());
    }

    #[test]
    fn test_invalid() {
        assert_eq!(
            UnstructuredMap::new(10, 3, 0, vec![5, 1, 5]).unwrap_err(),
            ConstructionError::DuplicateIndex { index: 5 }
        );
        assert_eq!(
            UnstructuredMap::new(10, 3, 0, vec![10]).unwrap_err(),
            ConstructionError::IndexOutOfRange { index: 10, size: 10 }
        );
    }

    #[test]
    fn test_order_matters_for_equality() {
        let a = UnstructuredMap::new(10, 2, 0, vec![5, 1]).unwrap();
        let b = UnstructuredMap::new(10, 2, 0, vec![1, 5]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }
}
