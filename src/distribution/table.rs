//! Descriptor tables
use super::AxisPartition;
use crate::{
    map::{even_bounds, IndexMap},
    process_grid::ProcessGrid,
    traits::AxisMap,
    types::{
        AxisDescriptor, AxisStrategy, ConsistencyError, ConstructionError, DistType, Error,
        GlobalAxisDescriptor,
    },
};
use itertools::izip;
use std::collections::HashMap;

/// The axis descriptors of every rank
///
/// Entry `r` holds one descriptor per array axis, as seen from rank `r`. Together with the
/// element type, this table is all that is needed to rebuild a distribution on any process.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DescriptorTable {
    ranks: Vec<Vec<AxisDescriptor>>,
}

impl DescriptorTable {
    /// Create new
    ///
    /// The table is not checked until it is used to build a distribution, or
    /// [`DescriptorTable::validate`] is called.
    pub fn new(ranks: Vec<Vec<AxisDescriptor>>) -> Self {
        Self { ranks }
    }

    /// The table of a freshly created array
    ///
    /// If `grid_shape` is `None`, a process grid is chosen with
    /// [`ProcessGrid::for_strategies`].
    pub fn from_strategies(
        global_shape: &[usize],
        strategies: &[AxisStrategy],
        nprocs: usize,
        grid_shape: Option<&[usize]>,
    ) -> Result<Self, Error> {
        if global_shape.len() != strategies.len() {
            return Err(ConstructionError::StrategyCountMismatch {
                expected: global_shape.len(),
                actual: strategies.len(),
            }
            .into());
        }
        let grid = match grid_shape {
            Some(shape) => {
                if shape.len() != global_shape.len() {
                    return Err(ConstructionError::GridDimensionMismatch {
                        expected: global_shape.len(),
                        actual: shape.len(),
                    }
                    .into());
                }
                let grid = ProcessGrid::new(shape)?;
                if grid.size() != nprocs {
                    return Err(ConstructionError::GridShapeMismatch {
                        grid_shape: shape.to_vec(),
                        nprocs,
                    }
                    .into());
                }
                for (s, n) in izip!(strategies, shape) {
                    if !s.is_distributed() && *n != 1 {
                        return Err(
                            ConstructionError::DistributedNotDistributed { grid_size: *n }.into(),
                        );
                    }
                }
                grid
            }
            None => ProcessGrid::for_strategies(global_shape, strategies, nprocs)?,
        };

        let mut ranks = vec![];
        for coords in grid.all_coords() {
            ranks.push(
                izip!(global_shape, strategies, grid.shape(), &coords)
                    .map(|(size, strategy, n, c)| match strategy {
                        AxisStrategy::NotDistributed => AxisDescriptor::not_distributed(*size),
                        AxisStrategy::Block => {
                            let (start, stop) = even_bounds(*size, *n, *c);
                            AxisDescriptor::block(*size, *c, *n, start, stop)
                        }
                        AxisStrategy::Cyclic => AxisDescriptor::cyclic(*size, *c, *n),
                        AxisStrategy::BlockCyclic { block_size } => {
                            AxisDescriptor::block_cyclic(*size, *c, *n, *block_size)
                        }
                    })
                    .collect(),
            );
        }
        let table = Self { ranks };
        table.validate()?;
        Ok(table)
    }

    /// The table described by one global descriptor per axis
    pub fn from_global_descriptors(axes: &[GlobalAxisDescriptor]) -> Result<Self, Error> {
        let grid_shape = axes.iter().map(|a| a.grid_size()).collect::<Vec<_>>();
        let grid = ProcessGrid::new(&grid_shape)?;
        let mut ranks = vec![];
        for (rank, coords) in grid.all_coords().enumerate() {
            ranks.push(
                izip!(axes, &coords)
                    .enumerate()
                    .map(|(axis, (a, c))| {
                        a.descriptor(*c)
                            .map_err(|source| Error::Descriptor { rank, axis, source })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            );
        }
        let table = Self { ranks };
        table.validate()?;
        Ok(table)
    }

    /// Number of ranks
    pub fn nprocs(&self) -> usize {
        self.ranks.len()
    }

    /// Number of array axes
    pub fn ndim(&self) -> usize {
        self.ranks.first().map_or(0, Vec::len)
    }

    /// Global shape of the array, as described by rank 0
    pub fn global_shape(&self) -> Vec<usize> {
        self.ranks
            .first()
            .map_or(vec![], |r| r.iter().map(|d| d.size).collect())
    }

    /// Process grid shape, as described by rank 0
    pub fn grid_shape(&self) -> Vec<usize> {
        self.ranks
            .first()
            .map_or(vec![], |r| r.iter().map(|d| d.proc_grid_size).collect())
    }

    /// The descriptors of one rank
    pub fn rank(&self, rank: usize) -> Option<&[AxisDescriptor]> {
        self.ranks.get(rank).map(Vec::as_slice)
    }

    /// The descriptors of every rank
    pub fn ranks(&self) -> &[Vec<AxisDescriptor>] {
        &self.ranks
    }

    /// One global descriptor per axis
    pub fn global_descriptors(&self) -> Result<Vec<GlobalAxisDescriptor>, Error> {
        let (_, partitions) = self.partitions()?;
        Ok(partitions.iter().map(|p| p.global_descriptor()).collect())
    }

    /// Check that the descriptors of all ranks describe one consistent distribution
    pub fn validate(&self) -> Result<(), Error> {
        self.partitions().map(|_| ())
    }

    /// Validate the table and build the partition of each axis
    pub(crate) fn partitions(&self) -> Result<(ProcessGrid, Vec<AxisPartition>), Error> {
        let first = self.ranks.first().ok_or(ConsistencyError::EmptyTable)?;
        let ndim = first.len();
        for (rank, descriptors) in self.ranks.iter().enumerate() {
            if descriptors.len() != ndim {
                return Err(ConsistencyError::DimensionMismatch {
                    rank,
                    expected: ndim,
                    actual: descriptors.len(),
                }
                .into());
            }
        }
        for axis in 0..ndim {
            self.check_axis_agreement(axis)?;
        }

        let grid = ProcessGrid::new(&self.grid_shape())?;
        if grid.size() != self.nprocs() {
            return Err(ConsistencyError::RankCountMismatch {
                expected: grid.size(),
                actual: self.nprocs(),
            }
            .into());
        }
        let coords = grid.all_coords().collect::<Vec<_>>();

        let mut partitions = Vec::with_capacity(ndim);
        for axis in 0..ndim {
            // The first rank found at each grid position stands for all ranks there
            let mut representatives = vec![None; grid.shape()[axis]];
            for (rank, c) in coords.iter().enumerate() {
                let d = &self.ranks[rank][axis];
                if d.proc_grid_rank != c[axis] {
                    return Err(ConsistencyError::GridPositionMismatch {
                        axis,
                        rank,
                        expected: c[axis],
                        actual: d.proc_grid_rank,
                    }
                    .into());
                }
                match representatives[c[axis]] {
                    None => representatives[c[axis]] = Some(rank),
                    Some(other) => {
                        if self.ranks[other][axis] != *d {
                            return Err(ConsistencyError::ReplicaMismatch {
                                axis,
                                ranks: (other, rank),
                            }
                            .into());
                        }
                    }
                }
            }
            let representatives = representatives.into_iter().flatten().collect::<Vec<_>>();
            let maps = representatives
                .iter()
                .map(|rank| {
                    IndexMap::from_descriptor(&self.ranks[*rank][axis]).map_err(|source| {
                        Error::Descriptor {
                            rank: *rank,
                            axis,
                            source,
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            check_tiling(axis, &maps, &representatives)?;
            partitions.push(AxisPartition::new(maps));
        }
        tracing::debug!(
            "validated descriptor table for {} rank(s) on process grid {:?}",
            self.nprocs(),
            grid.shape()
        );
        Ok((grid, partitions))
    }

    /// Check that every rank agrees with rank 0 on the parameters shared by an axis
    fn check_axis_agreement(&self, axis: usize) -> Result<(), ConsistencyError> {
        let d0 = &self.ranks[0][axis];
        for (rank, descriptors) in self.ranks.iter().enumerate().skip(1) {
            let d = &descriptors[axis];
            let ranks = (0, rank);
            if d.dist_type != d0.dist_type {
                return Err(ConsistencyError::DistTypeMismatch { axis, ranks });
            }
            if d.size != d0.size {
                return Err(ConsistencyError::GlobalSizeMismatch { axis, ranks });
            }
            if d.proc_grid_size != d0.proc_grid_size {
                return Err(ConsistencyError::GridSizeMismatch { axis, ranks });
            }
            if d.dist_type == DistType::Cyclic
                && d.block_size_or_default() != d0.block_size_or_default()
            {
                return Err(ConsistencyError::BlockSizeMismatch { axis, ranks });
            }
        }
        Ok(())
    }
}

/// Check that the maps of grid positions `0, 1, ...` cover an axis exactly once
///
/// `ranks` holds the rank each map was read from, for error reporting.
fn check_tiling(axis: usize, maps: &[IndexMap], ranks: &[usize]) -> Result<(), ConsistencyError> {
    let size = maps[0].global_size();
    match maps[0].dist_type() {
        DistType::Block => {
            let mut previous_stop = 0;
            for (p, m) in maps.iter().enumerate() {
                let (start, stop) = match m {
                    IndexMap::Block(b) => (b.start(), b.stop()),
                    _ => continue,
                };
                if p == 0 && start != 0 {
                    return Err(ConsistencyError::BlockCoverage {
                        axis,
                        rank: ranks[p],
                        bound: start,
                        size,
                    });
                }
                if p > 0 && start > previous_stop {
                    return Err(ConsistencyError::BlockGap {
                        axis,
                        ranks: (ranks[p - 1], ranks[p]),
                        stop: previous_stop,
                        start,
                    });
                }
                if p > 0 && start < previous_stop {
                    return Err(ConsistencyError::BlockOverlap {
                        axis,
                        ranks: (ranks[p - 1], ranks[p]),
                        start,
                        stop: previous_stop,
                    });
                }
                previous_stop = stop;
            }
            if previous_stop != size {
                return Err(ConsistencyError::BlockCoverage {
                    axis,
                    rank: ranks[ranks.len() - 1],
                    bound: previous_stop,
                    size,
                });
            }
        }
        DistType::Unstructured => {
            let owned = maps
                .iter()
                .map(|m| m.local_size())
                .fold(0, usize::saturating_add);
            if owned < size {
                // Too few indices to cover the axis, so find the gap without a table of `size`
                let mut owner = HashMap::with_capacity(owned);
                for (m, rank) in izip!(maps, ranks) {
                    for g in m.owned_globals() {
                        if let Some(other) = owner.insert(g, *rank) {
                            return Err(ConsistencyError::DuplicateIndex {
                                axis,
                                index: g,
                                ranks: (other, *rank),
                            });
                        }
                    }
                }
                let index = (0..=owned)
                    .find(|g| !owner.contains_key(g))
                    .unwrap_or(owned);
                return Err(ConsistencyError::MissingIndex { axis, index });
            }
            let mut owner = vec![None; size];
            for (m, rank) in izip!(maps, ranks) {
                for g in m.owned_globals() {
                    if let Some(other) = owner[g] {
                        return Err(ConsistencyError::DuplicateIndex {
                            axis,
                            index: g,
                            ranks: (other, *rank),
                        });
                    }
                    owner[g] = Some(*rank);
                }
            }
            if let Some(index) = owner.iter().position(Option::is_none) {
                return Err(ConsistencyError::MissingIndex { axis, index });
            }
        }
        // Construction of each map already ties its start to its grid position
        DistType::Cyclic | DistType::NotDistributed => {}
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    fn block_table(bounds: &[(usize, usize)], size: usize) -> DescriptorTable {
        let n = bounds.len();
        DescriptorTable::new(
            bounds
                .iter()
                .enumerate()
                .map(|(r, (s, e))| vec![AxisDescriptor::block(size, r, n, *s, *e)])
                .collect(),
        )
    }

    fn consistency_error(table: &DescriptorTable) -> ConsistencyError {
        match table.validate() {
            Err(Error::Consistency(e)) => e,
            other => panic!("expected a consistency error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_block_table() {
        block_table(&[(0, 3), (3, 3), (3, 10)], 10).validate().unwrap();
    }

    #[test]
    fn test_block_gap() {
        assert_eq!(
            consistency_error(&block_table(&[(0, 3), (4, 10)], 10)),
            ConsistencyError::BlockGap {
                axis: 0,
                ranks: (0, 1),
                stop: 3,
                start: 4
            }
        );
    }

    #[test]
    fn test_block_overlap() {
        assert_eq!(
            consistency_error(&block_table(&[(0, 5), (4, 10)], 10)),
            ConsistencyError::BlockOverlap {
                axis: 0,
                ranks: (0, 1),
                start: 4,
                stop: 5
            }
        );
    }

    #[test]
    fn test_block_coverage() {
        assert!(matches!(
            consistency_error(&block_table(&[(1, 5), (5, 10)], 10)),
            ConsistencyError::BlockCoverage { rank: 0, bound: 1, .. }
        ));
        assert!(matches!(
            consistency_error(&block_table(&[(0, 5), (5, 9)], 10)),
            ConsistencyError::BlockCoverage { rank: 1, bound: 9, .. }
        ));
    }

    #[test]
    fn test_rank_count() {
        let mut table = block_table(&[(0, 5), (5, 10)], 10);
        table.ranks.pop();
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::RankCountMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            consistency_error(&DescriptorTable::new(vec![])),
            ConsistencyError::EmptyTable
        );
    }

    #[test]
    fn test_disagreement() {
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::cyclic(10, 0, 2)],
            vec![AxisDescriptor::cyclic(11, 1, 2)],
        ]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::GlobalSizeMismatch {
                axis: 0,
                ranks: (0, 1)
            }
        );
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::cyclic(10, 0, 2)],
            vec![AxisDescriptor::block(10, 1, 2, 5, 10)],
        ]);
        assert!(matches!(
            consistency_error(&table),
            ConsistencyError::DistTypeMismatch { .. }
        ));
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::block_cyclic(12, 0, 2, 2)],
            vec![AxisDescriptor::block_cyclic(12, 1, 2, 3)],
        ]);
        assert!(matches!(
            consistency_error(&table),
            ConsistencyError::BlockSizeMismatch { .. }
        ));
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::cyclic(10, 0, 2)],
            vec![AxisDescriptor::cyclic(10, 1, 2), AxisDescriptor::not_distributed(3)],
        ]);
        assert!(matches!(
            consistency_error(&table),
            ConsistencyError::DimensionMismatch { rank: 1, .. }
        ));
    }

    #[test]
    fn test_grid_position() {
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::cyclic(10, 1, 2)],
            vec![AxisDescriptor::cyclic(10, 0, 2)],
        ]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::GridPositionMismatch {
                axis: 0,
                rank: 0,
                expected: 0,
                actual: 1
            }
        );
    }

    #[test]
    fn test_replicas() {
        // Grid (2, 2): ranks 0 and 1 share row position 0
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::block(4, 0, 2, 0, 2), AxisDescriptor::cyclic(4, 0, 2)],
            vec![AxisDescriptor::block(4, 0, 2, 0, 3), AxisDescriptor::cyclic(4, 1, 2)],
            vec![AxisDescriptor::block(4, 1, 2, 2, 4), AxisDescriptor::cyclic(4, 0, 2)],
            vec![AxisDescriptor::block(4, 1, 2, 2, 4), AxisDescriptor::cyclic(4, 1, 2)],
        ]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::ReplicaMismatch {
                axis: 0,
                ranks: (0, 1)
            }
        );
    }

    #[test]
    fn test_unstructured() {
        let table = |indices: [Vec<usize>; 2]| {
            DescriptorTable::new(
                indices
                    .into_iter()
                    .enumerate()
                    .map(|(r, i)| vec![AxisDescriptor::unstructured(5, r, 2, i)])
                    .collect(),
            )
        };
        table([vec![4, 0], vec![2, 1, 3]]).validate().unwrap();
        assert_eq!(
            consistency_error(&table([vec![4, 0, 2], vec![2, 1, 3]])),
            ConsistencyError::DuplicateIndex {
                axis: 0,
                index: 2,
                ranks: (0, 1)
            }
        );
        assert_eq!(
            consistency_error(&table([vec![4, 0], vec![1, 3]])),
            ConsistencyError::MissingIndex { axis: 0, index: 2 }
        );
    }

    #[test]
    fn test_unstructured_size_beyond_indices() {
        let table = DescriptorTable::new(vec![vec![AxisDescriptor::unstructured(
            1 << 44,
            0,
            1,
            vec![],
        )]]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::MissingIndex { axis: 0, index: 0 }
        );
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::unstructured(1 << 44, 0, 2, vec![0, 1, 3])],
            vec![AxisDescriptor::unstructured(1 << 44, 1, 2, vec![2, 1])],
        ]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::DuplicateIndex {
                axis: 0,
                index: 1,
                ranks: (0, 1)
            }
        );
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::unstructured(1 << 44, 0, 2, vec![0, 1, 3])],
            vec![AxisDescriptor::unstructured(1 << 44, 1, 2, vec![2])],
        ]);
        assert_eq!(
            consistency_error(&table),
            ConsistencyError::MissingIndex { axis: 0, index: 4 }
        );
    }

    #[test]
    fn test_grid_size_overflow() {
        let table = DescriptorTable::new(vec![vec![
            AxisDescriptor::cyclic(4, 0, 1 << 33),
            AxisDescriptor::cyclic(4, 0, 1 << 33),
        ]]);
        assert!(matches!(
            table.validate(),
            Err(Error::Construction(ConstructionError::GridSizeOverflow { .. }))
        ));
        assert!(matches!(
            DescriptorTable::from_strategies(
                &[4, 4],
                &[AxisStrategy::Cyclic, AxisStrategy::Cyclic],
                4,
                Some(&[1 << 33, 1 << 33]),
            ),
            Err(Error::Construction(ConstructionError::GridSizeOverflow { .. }))
        ));
    }

    #[test]
    fn test_bad_descriptor_names_rank_and_axis() {
        let table = DescriptorTable::new(vec![
            vec![AxisDescriptor::block_cyclic(16, 0, 2, 2)],
            vec![AxisDescriptor {
                start: Some(3),
                ..AxisDescriptor::block_cyclic(16, 1, 2, 2)
            }],
        ]);
        assert!(matches!(
            table.validate(),
            Err(Error::Descriptor { rank: 1, axis: 0, .. })
        ));
    }

    #[test]
    fn test_from_strategies() {
        let table = DescriptorTable::from_strategies(
            &[31, 6],
            &[AxisStrategy::Block, AxisStrategy::BlockCyclic { block_size: 3 }],
            8,
            Some(&[4, 2]),
        )
        .unwrap();
        assert_eq!(table.nprocs(), 8);
        assert_eq!(table.grid_shape(), vec![4, 2]);
        assert_eq!(table.global_shape(), vec![31, 6]);
        assert_eq!(table.rank(3).unwrap()[0], AxisDescriptor::block(31, 1, 4, 8, 16));
        assert_eq!(table.rank(3).unwrap()[1], AxisDescriptor::block_cyclic(6, 1, 2, 3));
    }

    #[test]
    fn test_from_strategies_errors() {
        use AxisStrategy::{Block, NotDistributed};
        assert!(matches!(
            DescriptorTable::from_strategies(&[4, 4], &[Block, Block], 4, Some(&[2, 3])),
            Err(Error::Construction(ConstructionError::GridShapeMismatch { .. }))
        ));
        assert!(matches!(
            DescriptorTable::from_strategies(&[4, 4], &[Block, NotDistributed], 4, Some(&[2, 2])),
            Err(Error::Construction(ConstructionError::DistributedNotDistributed { .. }))
        ));
        assert!(matches!(
            DescriptorTable::from_strategies(&[4, 4], &[Block, Block], 4, Some(&[4])),
            Err(Error::Construction(ConstructionError::GridDimensionMismatch { .. }))
        ));
        assert!(matches!(
            DescriptorTable::from_strategies(
                &[5],
                &[AxisStrategy::BlockCyclic { block_size: 2 }],
                2,
                None
            ),
            Err(Error::Descriptor { rank: 0, .. })
        ));
    }

    #[test]
    fn test_global_descriptors_round_trip() {
        let axes = vec![
            GlobalAxisDescriptor::Block {
                bounds: vec![0, 2, 7],
            },
            GlobalAxisDescriptor::Cyclic {
                size: 9,
                proc_grid_size: 3,
                block_size: 3,
            },
            GlobalAxisDescriptor::NotDistributed { size: 4 },
            GlobalAxisDescriptor::Unstructured {
                indices: vec![vec![1], vec![0, 2]],
            },
        ];
        let table = DescriptorTable::from_global_descriptors(&axes).unwrap();
        assert_eq!(table.nprocs(), 12);
        assert_eq!(table.grid_shape(), vec![2, 3, 1, 2]);
        assert_eq!(table.global_shape(), vec![7, 9, 4, 3]);
        assert_eq!(table.global_descriptors().unwrap(), axes);
    }
}
