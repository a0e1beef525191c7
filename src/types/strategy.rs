//! Partitioning strategies for fresh distributions
use super::{DistType, Error};
use crate::distribution::DescriptorTable;

/// How to partition one axis of a freshly created array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AxisStrategy {
    /// Keep the whole axis on every process
    NotDistributed,
    /// Split the axis into contiguous chunks of (at most) `ceil(size / grid_size)` elements
    Block,
    /// Deal single elements round-robin
    Cyclic,
    /// Deal blocks of `block_size` elements round-robin
    BlockCyclic {
        /// Elements per block
        block_size: usize,
    },
}

impl AxisStrategy {
    /// The distribution type of axes partitioned with this strategy
    pub fn dist_type(&self) -> DistType {
        match self {
            AxisStrategy::NotDistributed => DistType::NotDistributed,
            AxisStrategy::Block => DistType::Block,
            AxisStrategy::Cyclic | AxisStrategy::BlockCyclic { .. } => DistType::Cyclic,
        }
    }

    /// Is the axis split over more than one process?
    pub fn is_distributed(&self) -> bool {
        !matches!(self, AxisStrategy::NotDistributed)
    }
}

/// Configuration of a fresh distribution
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionConfig {
    /// Global shape of the array
    pub shape: Vec<usize>,
    /// Strategy of each axis
    pub strategies: Vec<AxisStrategy>,
    /// Process grid shape; chosen automatically if not given
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub grid_shape: Option<Vec<usize>>,
}

impl DistributionConfig {
    /// Create new
    pub fn new(shape: &[usize], strategies: &[AxisStrategy]) -> Self {
        Self {
            shape: shape.to_vec(),
            strategies: strategies.to_vec(),
            grid_shape: None,
        }
    }

    /// Use an explicit process grid
    pub fn with_grid_shape(mut self, grid_shape: &[usize]) -> Self {
        self.grid_shape = Some(grid_shape.to_vec());
        self
    }

    /// Build the descriptor table for `nprocs` processes
    pub fn build_table(&self, nprocs: usize) -> Result<DescriptorTable, Error> {
        DescriptorTable::from_strategies(
            &self.shape,
            &self.strategies,
            nprocs,
            self.grid_shape.as_deref(),
        )
    }

    /// Parse from a RON string
    #[cfg(feature = "serde")]
    pub fn from_ron_str(s: &str) -> Result<Self, Error> {
        Ok(ron::from_str(s)?)
    }
}
