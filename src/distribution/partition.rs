//! The partition of one axis over all of its grid positions
use crate::{
    map::IndexMap,
    traits::AxisMap,
    types::{DistType, GlobalAxisDescriptor, IndexError},
};
use std::collections::HashMap;
use std::ops::Range;

#[derive(Debug, Clone)]
enum Owners {
    Whole,
    Stops(Vec<usize>),
    Cyclic { grid_size: usize, block_size: usize },
    Lookup(HashMap<usize, usize>),
}

/// Every grid position's map of one axis
///
/// Answers which grid position owns a global index without a search for block and cyclic
/// axes, and through an inverted index for unstructured axes.
#[derive(Debug, Clone)]
pub struct AxisPartition {
    maps: Vec<IndexMap>,
    owners: Owners,
}

impl AxisPartition {
    /// Create from the maps of grid positions `0, 1, ...`
    ///
    /// The maps must already tile the axis.
    pub(crate) fn new(maps: Vec<IndexMap>) -> Self {
        let owners = match &maps[0] {
            IndexMap::NotDistributed(_) => Owners::Whole,
            IndexMap::Block(_) => Owners::Stops(
                maps.iter()
                    .filter_map(|m| match m {
                        IndexMap::Block(b) => Some(b.stop()),
                        _ => None,
                    })
                    .collect(),
            ),
            IndexMap::Cyclic(m) => Owners::Cyclic {
                grid_size: m.grid_size(),
                block_size: 1,
            },
            IndexMap::BlockCyclic(m) => Owners::Cyclic {
                grid_size: m.grid_size(),
                block_size: m.block_size(),
            },
            IndexMap::Unstructured(_) => Owners::Lookup(
                maps.iter()
                    .enumerate()
                    .flat_map(|(p, m)| m.owned_globals().map(move |g| (g, p)))
                    .collect(),
            ),
        };
        Self { maps, owners }
    }

    /// Distribution type
    pub fn dist_type(&self) -> DistType {
        self.maps[0].dist_type()
    }

    /// Size of the axis
    pub fn global_size(&self) -> usize {
        self.maps[0].global_size()
    }

    /// Number of grid positions
    pub fn grid_size(&self) -> usize {
        self.maps.len()
    }

    /// The map of one grid position
    pub fn map(&self, grid_rank: usize) -> Option<&IndexMap> {
        self.maps.get(grid_rank)
    }

    /// The maps of all grid positions
    pub fn maps(&self) -> &[IndexMap] {
        &self.maps
    }

    /// The grid position that owns a global index
    pub fn owner(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.global_size() {
            return Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.global_size(),
            });
        }
        Ok(match &self.owners {
            Owners::Whole => 0,
            Owners::Stops(stops) => stops.partition_point(|s| *s <= global_index),
            Owners::Cyclic {
                grid_size,
                block_size,
            } => global_index / block_size % grid_size,
            Owners::Lookup(lookup) => *lookup
                .get(&global_index)
                .ok_or(IndexError::NotOwned {
                    index: global_index,
                })?,
        })
    }

    /// The grid positions owning at least one index in `range`, ascending
    pub fn owners_in(&self, range: &Range<usize>) -> Result<Vec<usize>, IndexError> {
        if range.end > self.global_size() {
            return Err(IndexError::GlobalOutOfBounds {
                index: range.end - 1,
                size: self.global_size(),
            });
        }
        if range.is_empty() {
            return Ok(vec![]);
        }
        let first = self.owner(range.start)?;
        let last = self.owner(range.end - 1)?;
        Ok(match &self.owners {
            Owners::Whole => vec![0],
            Owners::Stops(_) => (first..=last)
                .filter(|p| self.maps[*p].local_size() > 0)
                .collect(),
            Owners::Cyclic {
                grid_size,
                block_size,
            } => {
                let first_block = range.start / block_size;
                let last_block = (range.end - 1) / block_size;
                if last_block - first_block + 1 >= *grid_size {
                    (0..*grid_size).collect()
                } else {
                    let mut positions = (first_block..=last_block)
                        .map(|b| b % grid_size)
                        .collect::<Vec<_>>();
                    positions.sort_unstable();
                    positions
                }
            }
            Owners::Lookup(_) => {
                let mut positions = range
                    .clone()
                    .map(|g| self.owner(g))
                    .collect::<Result<Vec<_>, _>>()?;
                positions.sort_unstable();
                positions.dedup();
                positions
            }
        })
    }

    /// Description of the axis for all grid positions at once
    pub fn global_descriptor(&self) -> GlobalAxisDescriptor {
        match &self.maps[0] {
            IndexMap::NotDistributed(m) => GlobalAxisDescriptor::NotDistributed {
                size: m.global_size(),
            },
            IndexMap::Block(_) => GlobalAxisDescriptor::Block {
                bounds: std::iter::once(0)
                    .chain(self.maps.iter().filter_map(|m| match m {
                        IndexMap::Block(b) => Some(b.stop()),
                        _ => None,
                    }))
                    .collect(),
            },
            IndexMap::Cyclic(m) => GlobalAxisDescriptor::Cyclic {
                size: m.global_size(),
                proc_grid_size: m.grid_size(),
                block_size: 1,
            },
            IndexMap::BlockCyclic(m) => GlobalAxisDescriptor::Cyclic {
                size: m.global_size(),
                proc_grid_size: m.grid_size(),
                block_size: m.block_size(),
            },
            IndexMap::Unstructured(_) => GlobalAxisDescriptor::Unstructured {
                indices: self
                    .maps
                    .iter()
                    .map(|m| m.owned_globals().collect())
                    .collect(),
            },
        }
    }
}

impl PartialEq for AxisPartition {
    fn eq(&self, other: &Self) -> bool {
        self.maps == other.maps
    }
}
impl Eq for AxisPartition {}
