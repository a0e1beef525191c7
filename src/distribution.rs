//! Distributions of n-dimensional arrays
mod partition;
mod table;

pub use partition::AxisPartition;
pub use table::DescriptorTable;

use crate::{
    map::IndexMap,
    process_grid::ProcessGrid,
    traits::AxisMap,
    types::{AxisDescriptor, AxisStrategy, DistType, Error, GlobalAxisDescriptor, IndexError},
};
use itertools::{izip, Either, Itertools};
use std::ops::Range;
use std::sync::Arc;

/// The distribution of an n-dimensional array, seen from one rank
///
/// A distribution holds the map of every axis for every grid position, so that ownership of
/// any index can be answered locally. It is immutable; [`Distribution::for_rank`] gives the
/// same distribution seen from another rank without copying the maps.
#[derive(Debug, Clone)]
pub struct Distribution {
    rank: usize,
    coords: Vec<usize>,
    grid: ProcessGrid,
    partitions: Arc<Vec<AxisPartition>>,
}

impl Distribution {
    /// Create from a descriptor table
    ///
    /// The table is validated before the distribution is built.
    pub fn from_descriptor_table(table: &DescriptorTable, rank: usize) -> Result<Self, Error> {
        let (grid, partitions) = table.partitions()?;
        let coords = grid.coords_from_rank(rank)?;
        tracing::debug!("built distribution for rank {rank} at grid position {coords:?}");
        Ok(Self {
            rank,
            coords,
            grid,
            partitions: Arc::new(partitions),
        })
    }

    /// Create the distribution of a fresh array
    pub fn from_strategies(
        global_shape: &[usize],
        strategies: &[AxisStrategy],
        nprocs: usize,
        grid_shape: Option<&[usize]>,
        rank: usize,
    ) -> Result<Self, Error> {
        let table = DescriptorTable::from_strategies(global_shape, strategies, nprocs, grid_shape)?;
        Self::from_descriptor_table(&table, rank)
    }

    /// Create from one global descriptor per axis
    pub fn from_global_descriptors(
        axes: &[GlobalAxisDescriptor],
        rank: usize,
    ) -> Result<Self, Error> {
        Self::from_descriptor_table(&DescriptorTable::from_global_descriptors(axes)?, rank)
    }

    /// The same distribution, seen from another rank
    pub fn for_rank(&self, rank: usize) -> Result<Self, IndexError> {
        Ok(Self {
            rank,
            coords: self.grid.coords_from_rank(rank)?,
            grid: self.grid.clone(),
            partitions: Arc::clone(&self.partitions),
        })
    }

    /// The rank this distribution is seen from
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of processes
    pub fn nprocs(&self) -> usize {
        self.grid.size()
    }

    /// Number of array axes
    pub fn ndim(&self) -> usize {
        self.partitions.len()
    }

    /// The process grid
    pub fn grid(&self) -> &ProcessGrid {
        &self.grid
    }

    /// Number of partitions along each axis
    pub fn grid_shape(&self) -> &[usize] {
        self.grid.shape()
    }

    /// Position of this rank in the process grid
    pub fn grid_coords(&self) -> &[usize] {
        &self.coords
    }

    /// Shape of the whole array
    pub fn global_shape(&self) -> Vec<usize> {
        self.partitions.iter().map(|p| p.global_size()).collect()
    }

    /// Shape of the part of the array owned by this rank
    pub fn local_shape(&self) -> Vec<usize> {
        self.maps().map(|m| m.local_size()).collect()
    }

    /// Number of elements owned by this rank
    pub fn local_len(&self) -> usize {
        self.maps().map(|m| m.local_size()).product()
    }

    /// The distribution type of each axis
    pub fn dist_types(&self) -> Vec<DistType> {
        self.maps().map(|m| m.dist_type()).collect()
    }

    /// This rank's map of one axis
    pub fn map(&self, axis: usize) -> Option<&IndexMap> {
        self.partitions
            .get(axis)
            .and_then(|p| p.map(self.coords[axis]))
    }

    /// This rank's map of each axis
    pub fn maps(&self) -> impl Iterator<Item = &IndexMap> + '_ {
        izip!(self.partitions.iter(), &self.coords).filter_map(|(p, c)| p.map(*c))
    }

    /// The maps of one axis for every grid position
    pub fn partition(&self, axis: usize) -> Option<&AxisPartition> {
        self.partitions.get(axis)
    }

    /// This rank's descriptor of each axis
    pub fn descriptors(&self) -> Vec<AxisDescriptor> {
        self.maps().map(|m| m.to_descriptor()).collect()
    }

    /// The descriptors of every rank
    pub fn descriptor_table(&self) -> DescriptorTable {
        DescriptorTable::new(
            self.grid
                .all_coords()
                .map(|coords| {
                    izip!(self.partitions.iter(), coords)
                        .filter_map(|(p, c)| p.map(c).map(|m| m.to_descriptor()))
                        .collect()
                })
                .collect(),
        )
    }

    /// One global descriptor per axis
    pub fn global_descriptors(&self) -> Vec<GlobalAxisDescriptor> {
        self.partitions.iter().map(|p| p.global_descriptor()).collect()
    }

    fn check_ndim(&self, n: usize) -> Result<(), IndexError> {
        if n != self.ndim() {
            Err(IndexError::DimensionMismatch {
                expected: self.ndim(),
                actual: n,
            })
        } else {
            Ok(())
        }
    }

    /// The local index of an owned global index
    pub fn local_from_global(&self, global_index: &[usize]) -> Result<Vec<usize>, IndexError> {
        self.check_ndim(global_index.len())?;
        izip!(self.maps(), global_index)
            .enumerate()
            .map(|(axis, (m, g))| m.local_from_global(*g).map_err(|e| e.on_axis(axis)))
            .collect()
    }

    /// The global index of a local index
    pub fn global_from_local(&self, local_index: &[usize]) -> Result<Vec<usize>, IndexError> {
        self.check_ndim(local_index.len())?;
        izip!(self.maps(), local_index)
            .enumerate()
            .map(|(axis, (m, l))| m.global_from_local(*l).map_err(|e| e.on_axis(axis)))
            .collect()
    }

    /// Is a global index owned by this rank?
    pub fn is_owned(&self, global_index: &[usize]) -> bool {
        self.local_from_global(global_index).is_ok()
    }

    /// The ranks owning a global index
    ///
    /// An index is owned by exactly one rank, so the result always has one entry.
    pub fn owning_ranks(&self, global_index: &[usize]) -> Result<Vec<usize>, IndexError> {
        self.check_ndim(global_index.len())?;
        let coords = izip!(self.partitions.iter(), global_index)
            .enumerate()
            .map(|(axis, (p, g))| p.owner(*g).map_err(|e| e.on_axis(axis)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(vec![self.grid.rank_from_coords(&coords)?])
    }

    /// The ranks owning at least one index of a rectangular region, ascending
    pub fn owning_ranks_in(&self, region: &[Range<usize>]) -> Result<Vec<usize>, IndexError> {
        self.check_ndim(region.len())?;
        let positions = izip!(self.partitions.iter(), region)
            .enumerate()
            .map(|(axis, (p, r))| p.owners_in(r).map_err(|e| e.on_axis(axis)))
            .collect::<Result<Vec<_>, _>>()?;
        self.grid.ranks_in(&positions)
    }

    /// Iterator over the global indices owned by this rank
    ///
    /// Indices come in row-major order of their local index.
    pub fn owned_global_indices(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        if self.ndim() == 0 {
            Either::Left(std::iter::once(vec![]))
        } else {
            Either::Right(self.maps().map(|m| m.owned_globals()).multi_cartesian_product())
        }
    }
}

impl PartialEq for Distribution {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.grid == other.grid && self.partitions == other.partitions
    }
}
impl Eq for Distribution {}
