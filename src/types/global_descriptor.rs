//! Global axis descriptors
use super::{AxisDescriptor, ConstructionError, DistType};

#[cfg(feature = "serde")]
fn default_block_size() -> usize {
    1
}

/// Description of how one axis is partitioned, for every position of its process grid axis
/// at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GlobalAxisDescriptor {
    /// Not distributed
    #[cfg_attr(feature = "serde", serde(rename = "n"))]
    NotDistributed {
        /// Global size
        size: usize,
    },
    /// Contiguous blocks
    ///
    /// `bounds` starts at 0 and ends at the global size; successive pairs are the start and
    /// stop of each block.
    #[cfg_attr(feature = "serde", serde(rename = "b"))]
    Block {
        /// Block boundaries
        bounds: Vec<usize>,
    },
    /// Round-robin over blocks of `block_size` elements
    #[cfg_attr(feature = "serde", serde(rename = "c"))]
    Cyclic {
        /// Global size
        size: usize,
        /// Number of partitions
        proc_grid_size: usize,
        /// Size of each block
        #[cfg_attr(feature = "serde", serde(default = "default_block_size"))]
        block_size: usize,
    },
    /// One explicit index list per partition
    #[cfg_attr(feature = "serde", serde(rename = "u"))]
    Unstructured {
        /// Owned indices of each partition, in local order
        indices: Vec<Vec<usize>>,
    },
}

impl GlobalAxisDescriptor {
    /// Distribution type
    pub fn dist_type(&self) -> DistType {
        match self {
            GlobalAxisDescriptor::NotDistributed { .. } => DistType::NotDistributed,
            GlobalAxisDescriptor::Block { .. } => DistType::Block,
            GlobalAxisDescriptor::Cyclic { .. } => DistType::Cyclic,
            GlobalAxisDescriptor::Unstructured { .. } => DistType::Unstructured,
        }
    }

    /// Global size of the axis
    pub fn size(&self) -> usize {
        match self {
            GlobalAxisDescriptor::NotDistributed { size } => *size,
            GlobalAxisDescriptor::Block { bounds } => bounds.last().copied().unwrap_or(0),
            GlobalAxisDescriptor::Cyclic { size, .. } => *size,
            GlobalAxisDescriptor::Unstructured { indices } => indices.iter().map(Vec::len).sum(),
        }
    }

    /// Number of partitions of the axis
    pub fn grid_size(&self) -> usize {
        match self {
            GlobalAxisDescriptor::NotDistributed { .. } => 1,
            GlobalAxisDescriptor::Block { bounds } => bounds.len().saturating_sub(1),
            GlobalAxisDescriptor::Cyclic { proc_grid_size, .. } => *proc_grid_size,
            GlobalAxisDescriptor::Unstructured { indices } => indices.len(),
        }
    }

    /// The descriptor of the partition at `grid_rank`
    pub fn descriptor(&self, grid_rank: usize) -> Result<AxisDescriptor, ConstructionError> {
        let grid_size = self.grid_size();
        if grid_size == 0 {
            return Err(match self {
                GlobalAxisDescriptor::Block { bounds } => ConstructionError::InvalidGlobalBounds {
                    bounds: bounds.clone(),
                },
                _ => ConstructionError::ZeroGridSize,
            });
        }
        if grid_rank >= grid_size {
            return Err(ConstructionError::GridRankOutOfRange {
                grid_rank,
                grid_size,
            });
        }
        Ok(match self {
            GlobalAxisDescriptor::NotDistributed { size } => AxisDescriptor::not_distributed(*size),
            GlobalAxisDescriptor::Block { bounds } => {
                if bounds[0] != 0 || bounds.windows(2).any(|w| w[0] > w[1]) {
                    return Err(ConstructionError::InvalidGlobalBounds {
                        bounds: bounds.clone(),
                    });
                }
                AxisDescriptor::block(
                    self.size(),
                    grid_rank,
                    grid_size,
                    bounds[grid_rank],
                    bounds[grid_rank + 1],
                )
            }
            GlobalAxisDescriptor::Cyclic {
                size, block_size, ..
            } => {
                if *block_size == 1 {
                    AxisDescriptor::cyclic(*size, grid_rank, grid_size)
                } else {
                    AxisDescriptor::block_cyclic(*size, grid_rank, grid_size, *block_size)
                }
            }
            GlobalAxisDescriptor::Unstructured { indices } => AxisDescriptor::unstructured(
                self.size(),
                grid_rank,
                grid_size,
                indices[grid_rank].clone(),
            ),
        })
    }
}
