//! Axis maps
//!
//! One map describes the part of one array axis owned by one position of the process grid.
//! [`IndexMap`] is the closed set of map kinds; [`IndexMap::from_descriptor`] is the only
//! place where a descriptor is turned into a map.
mod block;
mod block_cyclic;
mod cyclic;
mod not_distributed;
mod unstructured;

pub(crate) use block::even_bounds;
pub use block::BlockMap;
pub use block_cyclic::{BlockCyclicIter, BlockCyclicMap};
pub use cyclic::CyclicMap;
pub use not_distributed::NotDistributedMap;
pub use unstructured::UnstructuredMap;

use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, ConstructionError, DistType, GlobalSlice, IndexError},
};

/// Map of one axis, for any distribution type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexMap {
    /// Not distributed
    NotDistributed(NotDistributedMap),
    /// Block
    Block(BlockMap),
    /// Cyclic
    Cyclic(CyclicMap),
    /// Block-cyclic
    BlockCyclic(BlockCyclicMap),
    /// Unstructured
    Unstructured(UnstructuredMap),
}

impl IndexMap {
    /// Build the map described by a descriptor
    pub fn from_descriptor(descriptor: &AxisDescriptor) -> Result<Self, ConstructionError> {
        let d = descriptor;
        let missing = |field| ConstructionError::MissingField {
            dist_type: d.dist_type,
            field,
        };
        match d.dist_type {
            DistType::NotDistributed => {
                if d.proc_grid_size != 1 {
                    Err(ConstructionError::DistributedNotDistributed {
                        grid_size: d.proc_grid_size,
                    })
                } else if d.proc_grid_rank != 0 {
                    Err(ConstructionError::GridRankOutOfRange {
                        grid_rank: d.proc_grid_rank,
                        grid_size: 1,
                    })
                } else {
                    Ok(IndexMap::NotDistributed(NotDistributedMap::new(d.size)))
                }
            }
            DistType::Block => BlockMap::new(
                d.size,
                d.proc_grid_size,
                d.proc_grid_rank,
                d.start.ok_or_else(|| missing("start"))?,
                d.stop.ok_or_else(|| missing("stop"))?,
            )
            .map(IndexMap::Block),
            DistType::Cyclic => {
                let block_size = d.block_size_or_default();
                let start = match d.start {
                    Some(start) => start,
                    None => d.proc_grid_rank.checked_mul(block_size).ok_or(
                        ConstructionError::BlockStartOverflow {
                            grid_rank: d.proc_grid_rank,
                            block_size,
                        },
                    )?,
                };
                if block_size == 1 {
                    CyclicMap::new(d.size, d.proc_grid_size, d.proc_grid_rank, start)
                        .map(IndexMap::Cyclic)
                } else {
                    BlockCyclicMap::new(
                        d.size,
                        d.proc_grid_size,
                        d.proc_grid_rank,
                        start,
                        block_size,
                    )
                    .map(IndexMap::BlockCyclic)
                }
            }
            DistType::Unstructured => UnstructuredMap::new(
                d.size,
                d.proc_grid_size,
                d.proc_grid_rank,
                d.indices.clone().ok_or_else(|| missing("indices"))?,
            )
            .map(IndexMap::Unstructured),
        }
    }
}

impl From<NotDistributedMap> for IndexMap {
    fn from(m: NotDistributedMap) -> Self {
        IndexMap::NotDistributed(m)
    }
}
impl From<BlockMap> for IndexMap {
    fn from(m: BlockMap) -> Self {
        IndexMap::Block(m)
    }
}
impl From<CyclicMap> for IndexMap {
    fn from(m: CyclicMap) -> Self {
        IndexMap::Cyclic(m)
    }
}
impl From<BlockCyclicMap> for IndexMap {
    fn from(m: BlockCyclicMap) -> Self {
        IndexMap::BlockCyclic(m)
    }
}
impl From<UnstructuredMap> for IndexMap {
    fn from(m: UnstructuredMap) -> Self {
        IndexMap::Unstructured(m)
    }
}

/// Iterator over the owned global indices of an [`IndexMap`]
#[derive(Debug, Clone)]
pub enum IndexMapIter<'a> {
    /// Contiguous range
    Range(std::ops::Range<usize>),
    /// Strided range
    Strided(std::iter::StepBy<std::ops::Range<usize>>),
    /// Blocks dealt round-robin
    BlockCyclic(BlockCyclicIter),
    /// Explicit list
    Explicit(std::iter::Copied<std::slice::Iter<'a, usize>>),
}

impl Iterator for IndexMapIter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        match self {
            IndexMapIter::Range(i) => i.next(),
            IndexMapIter::Strided(i) => i.next(),
            IndexMapIter::BlockCyclic(i) => i.next(),
            IndexMapIter::Explicit(i) => i.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            IndexMapIter::Range(i) => i.size_hint(),
            IndexMapIter::Strided(i) => i.size_hint(),
            IndexMapIter::BlockCyclic(i) => i.size_hint(),
            IndexMapIter::Explicit(i) => i.size_hint(),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $m:ident => $e:expr) => {
        match $self {
            IndexMap::NotDistributed($m) => $e,
            IndexMap::Block($m) => $e,
            IndexMap::Cyclic($m) => $e,
            IndexMap::BlockCyclic($m) => $e,
            IndexMap::Unstructured($m) => $e,
        }
    };
}

impl AxisMap for IndexMap {
    type GlobalIter<'a> = IndexMapIter<'a>;

    fn dist_type(&self) -> DistType {
        dispatch!(self, m => m.dist_type())
    }
    fn global_size(&self) -> usize {
        dispatch!(self, m => m.global_size())
    }
    fn grid_size(&self) -> usize {
        dispatch!(self, m => m.grid_size())
    }
    fn grid_rank(&self) -> usize {
        dispatch!(self, m => m.grid_rank())
    }
    fn local_size(&self) -> usize {
        dispatch!(self, m => m.local_size())
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        dispatch!(self, m => m.local_from_global(global_index))
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        dispatch!(self, m => m.global_from_local(local_index))
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        match self {
            IndexMap::NotDistributed(m) => IndexMapIter::Range(m.owned_globals()),
            IndexMap::Block(m) => IndexMapIter::Range(m.owned_globals()),
            IndexMap::Cyclic(m) => IndexMapIter::Strided(m.owned_globals()),
            IndexMap::BlockCyclic(m) => IndexMapIter::BlockCyclic(m.owned_globals()),
            IndexMap::Unstructured(m) => IndexMapIter::Explicit(m.owned_globals()),
        }
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        dispatch!(self, m => m.global_slice())
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        dispatch!(self, m => m.to_descriptor())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn example_maps_block(rank: usize) -> IndexMap {
        BlockMap::even(31, 4, rank).unwrap().into()
    }
    fn example_maps_cyclic(rank: usize) -> IndexMap {
        CyclicMap::new(17, 4, rank, rank).unwrap().into()
    }
    fn example_maps_block_cyclic(rank: usize) -> IndexMap {
        BlockCyclicMap::new(18, 4, rank, 3 * rank, 3).unwrap().into()
    }
    fn example_maps_unstructured(rank: usize) -> IndexMap {
        let indices = [vec![7, 0, 3], vec![1, 9], vec![], vec![8, 2, 6, 4, 5]];
        UnstructuredMap::new(10, 4, rank, indices[rank].clone())
            .unwrap()
            .into()
    }
    fn example_maps_not_distributed(rank: usize) -> IndexMap {
        assert_eq!(rank, 0);
        NotDistributedMap::new(12).into()
    }

    macro_rules! make_tests {
        ($name:ident, $nparts:expr) => {
            paste::item! {
                #[test]
                fn [< test_bijection_ $name >]() {
                    //! Test that global_from_local inverts local_from_global
                    for rank in 0..$nparts {
                        let m = [< example_maps_ $name >](rank);
                        for l in 0..m.local_size() {
                            let g = m.global_from_local(l).unwrap();
                            assert_eq!(m.local_from_global(g), Ok(l));
                        }
                    }
                }
                #[test]
                fn [< test_partition_ $name >]() {
                    //! Test that the partitions exactly cover the axis
                    let mut owner = vec![None; [< example_maps_ $name >](0).global_size()];
                    for rank in 0..$nparts {
                        let m = [< example_maps_ $name >](rank);
                        assert_eq!(m.grid_size(), $nparts);
                        assert_eq!(m.grid_rank(), rank);
                        for g in m.owned_globals() {
                            assert_eq!(owner[g], None);
                            owner[g] = Some(rank);
                        }
                    }
                    assert!(owner.iter().all(|o| o.is_some()));
                }
                #[test]
                fn [< test_round_trip_ $name >]() {
                    //! Test that a map can be rebuilt from its descriptor
                    for rank in 0..$nparts {
                        let m = [< example_maps_ $name >](rank);
                        let m2 = IndexMap::from_descriptor(&m.to_descriptor()).unwrap();
                        assert_eq!(m, m2);
                        for g in 0..m.global_size() {
                            assert_eq!(m.local_from_global(g), m2.local_from_global(g));
                        }
                    }
                }
                #[test]
                fn [< test_boundary_ $name >]() {
                    //! Test that unowned and out of range indices are rejected
                    for rank in 0..$nparts {
                        let m = [< example_maps_ $name >](rank);
                        let owned = m.owned_globals().collect::<Vec<_>>();
                        for g in 0..m.global_size() + 3 {
                            assert_eq!(m.local_from_global(g).is_ok(), owned.contains(&g));
                            assert_eq!(m.is_owned(g), owned.contains(&g));
                        }
                        for l in m.local_size()..m.local_size() + 3 {
                            assert!(m.global_from_local(l).is_err());
                        }
                    }
                }
                #[test]
                fn [< test_restartable_ $name >]() {
                    //! Test that iterating owned globals twice gives the same sequence
                    for rank in 0..$nparts {
                        let m = [< example_maps_ $name >](rank);
                        let first = m.owned_globals().collect::<Vec<_>>();
                        let second = m.owned_globals().collect::<Vec<_>>();
                        assert_eq!(first, second);
                        assert_eq!(first.len(), m.local_size());
                        assert_eq!(m.owned_globals().size_hint(), (m.local_size(), Some(m.local_size())));
                        if let Some(s) = m.global_slice() {
                            assert_eq!(s.iter().collect::<Vec<_>>(), first);
                        }
                    }
                }
            }
        };
    }

    make_tests!(block, 4);
    make_tests!(cyclic, 4);
    make_tests!(block_cyclic, 4);
    make_tests!(unstructured, 4);
    make_tests!(not_distributed, 1);

    #[test]
    fn test_factory_variants() {
        let d = AxisDescriptor::cyclic(16, 2, 4);
        assert!(matches!(IndexMap::from_descriptor(&d), Ok(IndexMap::Cyclic(_))));
        let d = AxisDescriptor::block_cyclic(16, 1, 4, 2);
        assert!(matches!(
            IndexMap::from_descriptor(&d),
            Ok(IndexMap::BlockCyclic(_))
        ));
        let d = AxisDescriptor {
            block_size: Some(1),
            ..AxisDescriptor::cyclic(16, 2, 4)
        };
        assert!(matches!(IndexMap::from_descriptor(&d), Ok(IndexMap::Cyclic(_))));
    }

    #[test]
    fn test_factory_missing_fields() {
        let d = AxisDescriptor {
            stop: None,
            ..AxisDescriptor::block(10, 0, 2, 0, 5)
        };
        assert_eq!(
            IndexMap::from_descriptor(&d),
            Err(ConstructionError::MissingField {
                dist_type: DistType::Block,
                field: "stop"
            })
        );
        let d = AxisDescriptor {
            indices: None,
            ..AxisDescriptor::unstructured(10, 0, 1, vec![])
        };
        assert!(IndexMap::from_descriptor(&d).is_err());
    }

    #[test]
    fn test_factory_cyclic_default_start() {
        let d = AxisDescriptor {
            start: None,
            ..AxisDescriptor::block_cyclic(16, 3, 4, 2)
        };
        let m = IndexMap::from_descriptor(&d).unwrap();
        assert_eq!(m.owned_globals().collect::<Vec<_>>(), vec![6, 7, 14, 15]);
    }

    #[test]
    fn test_factory_rejects_bad_parameters() {
        let d = AxisDescriptor {
            start: Some(1),
            ..AxisDescriptor::cyclic(16, 2, 4)
        };
        assert_eq!(
            IndexMap::from_descriptor(&d),
            Err(ConstructionError::CyclicStartMismatch {
                start: 1,
                grid_rank: 2
            })
        );
        let d = AxisDescriptor {
            proc_grid_size: 2,
            ..AxisDescriptor::not_distributed(4)
        };
        assert!(IndexMap::from_descriptor(&d).is_err());
        let d = AxisDescriptor::block_cyclic(15, 1, 4, 2);
        assert!(IndexMap::from_descriptor(&d).is_err());
    }

    #[test]
    fn test_factory_rejects_huge_block_start() {
        let d = AxisDescriptor {
            start: None,
            ..AxisDescriptor::block_cyclic(1 << 40, 1 << 40, 1 << 41, 1 << 40)
        };
        assert_eq!(
            IndexMap::from_descriptor(&d),
            Err(ConstructionError::BlockStartOverflow {
                grid_rank: 1 << 40,
                block_size: 1 << 40
            })
        );
        let d = AxisDescriptor::block_cyclic(1 << 40, 1 << 40, 1 << 41, 1 << 40);
        assert_eq!(d.start, Some(usize::MAX));
        assert!(IndexMap::from_descriptor(&d).is_err());
    }

    #[test]
    fn test_block_cyclic_equivalent_to_cyclic() {
        for rank in 0..4 {
            let bc = BlockCyclicMap::new(17, 4, rank, rank, 1).unwrap();
            let c = CyclicMap::new(17, 4, rank, rank).unwrap();
            assert_eq!(bc.local_size(), c.local_size());
            for g in 0..17 {
                assert_eq!(bc.local_from_global(g), c.local_from_global(g));
            }
            assert_eq!(
                bc.owned_globals().collect::<Vec<_>>(),
                c.owned_globals().collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn test_block_cyclic_equivalent_to_block() {
        for block_size in [1, 2, 4, 8, 16] {
            let bc = BlockCyclicMap::new(16, 1, 0, 0, block_size).unwrap();
            let b = BlockMap::new(16, 1, 0, 0, 16).unwrap();
            assert_eq!(bc.local_size(), b.local_size());
            for g in 0..16 {
                assert_eq!(bc.local_from_global(g), b.local_from_global(g));
            }
        }
    }

    #[test]
    fn test_block_cyclic_with_one_block_per_rank_matches_block() {
        let bc = BlockCyclicMap::new(16, 4, 1, 4, 4).unwrap();
        let b = BlockMap::new(16, 4, 1, 4, 8).unwrap();
        for g in 0..16 {
            assert_eq!(bc.local_from_global(g).ok(), b.local_from_global(g).ok());
        }
    }
}
