//! Axis descriptors
use super::DistType;

#[cfg(feature = "serde")]
fn default_grid_size() -> usize {
    1
}

/// Portable description of how one axis is partitioned, seen from one rank.
///
/// This is the record exchanged between processes and written to disk. It carries exactly
/// the fields needed to rebuild the axis map of one rank without reference to any other
/// rank. Which optional fields are used depends on `dist_type`:
///
/// | `dist_type` | fields |
/// |---|---|
/// | `n` | `size` |
/// | `b` | `size`, `proc_grid_rank`, `proc_grid_size`, `start`, `stop` |
/// | `c` | `size`, `proc_grid_rank`, `proc_grid_size`, `start`, `block_size` (1 if omitted) |
/// | `u` | `size`, `proc_grid_rank`, `proc_grid_size`, `indices` |
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AxisDescriptor {
    /// Distribution type
    pub dist_type: DistType,
    /// Global size of the axis
    pub size: usize,
    /// Position of the rank along the process grid axis
    #[cfg_attr(feature = "serde", serde(default))]
    pub proc_grid_rank: usize,
    /// Number of partitions along the process grid axis
    #[cfg_attr(feature = "serde", serde(default = "default_grid_size"))]
    pub proc_grid_size: usize,
    /// First owned global index
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub start: Option<usize>,
    /// One past the last owned global index
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub stop: Option<usize>,
    /// Size of the blocks dealt round-robin
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub block_size: Option<usize>,
    /// Owned global indices, in local order
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub indices: Option<Vec<usize>>,
}

impl AxisDescriptor {
    fn new(dist_type: DistType, size: usize, proc_grid_rank: usize, proc_grid_size: usize) -> Self {
        Self {
            dist_type,
            size,
            proc_grid_rank,
            proc_grid_size,
            start: None,
            stop: None,
            block_size: None,
            indices: None,
        }
    }

    /// Descriptor of an axis that is not distributed
    pub fn not_distributed(size: usize) -> Self {
        Self::new(DistType::NotDistributed, size, 0, 1)
    }

    /// Descriptor of a block of the range `[start, stop)`
    pub fn block(
        size: usize,
        proc_grid_rank: usize,
        proc_grid_size: usize,
        start: usize,
        stop: usize,
    ) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
            ..Self::new(DistType::Block, size, proc_grid_rank, proc_grid_size)
        }
    }

    /// Descriptor of a cyclic partition starting at `proc_grid_rank`
    pub fn cyclic(size: usize, proc_grid_rank: usize, proc_grid_size: usize) -> Self {
        Self {
            start: Some(proc_grid_rank),
            ..Self::new(DistType::Cyclic, size, proc_grid_rank, proc_grid_size)
        }
    }

    /// Descriptor of a block-cyclic partition
    ///
    /// If the first owned index does not fit in a `usize`, `start` saturates and the
    /// descriptor is rejected when a map is built from it.
    pub fn block_cyclic(
        size: usize,
        proc_grid_rank: usize,
        proc_grid_size: usize,
        block_size: usize,
    ) -> Self {
        Self {
            start: Some(proc_grid_rank.saturating_mul(block_size)),
            block_size: Some(block_size),
            ..Self::new(DistType::Cyclic, size, proc_grid_rank, proc_grid_size)
        }
    }

    /// Descriptor of an explicit list of owned indices
    pub fn unstructured(
        size: usize,
        proc_grid_rank: usize,
        proc_grid_size: usize,
        indices: Vec<usize>,
    ) -> Self {
        Self {
            indices: Some(indices),
            ..Self::new(DistType::Unstructured, size, proc_grid_rank, proc_grid_size)
        }
    }

    /// The block size, with an omitted block size read as 1
    pub fn block_size_or_default(&self) -> usize {
        self.block_size.unwrap_or(1)
    }
}
