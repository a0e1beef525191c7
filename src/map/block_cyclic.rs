//! Block-cyclic maps
use crate::{
    traits::AxisMap,
    types::{AxisDescriptor, ConstructionError, DistType, GlobalSlice, IndexError},
};
use num::Integer;

/// Map owning every `grid_size`-th block of `block_size` global indices
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockCyclicMap {
    global_size: usize,
    grid_size: usize,
    grid_rank: usize,
    block_size: usize,
}

impl BlockCyclicMap {
    /// Create new
    ///
    /// `global_size` must be a multiple of `block_size`. A block-cyclic map starts at its own
    /// grid position: `start` must be the first index of block `grid_rank`, so the owner of
    /// any block is its block number modulo `grid_size`.
    pub fn new(
        global_size: usize,
        grid_size: usize,
        grid_rank: usize,
        start: usize,
        block_size: usize,
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
        if block_size == 0 {
            return Err(ConstructionError::ZeroBlockSize);
        }
        if global_size % block_size != 0 {
            return Err(ConstructionError::PartialTrailingBlock {
                size: global_size,
                block_size,
            });
        }
        if start % block_size != 0 {
            return Err(ConstructionError::UnalignedBlockStart { start, block_size });
        }
        if start / block_size != grid_rank {
            return Err(ConstructionError::BlockCyclicStartMismatch {
                start_block: start / block_size,
                grid_rank,
            });
        }
        Ok(Self {
            global_size,
            grid_size,
            grid_rank,
            block_size,
        })
    }

    /// First owned global index
    pub fn start(&self) -> usize {
        self.start_block() * self.block_size
    }

    /// Number of elements in each block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    fn start_block(&self) -> usize {
        self.grid_rank
    }

    fn local_block_count(&self) -> usize {
        let global_blocks = self.global_size / self.block_size;
        if self.start_block() >= global_blocks {
            0
        } else {
            (global_blocks - 1 - self.start_block()) / self.grid_size + 1
        }
    }
}

/// Iterator over the global indices of a block-cyclic map
#[derive(Debug, Clone)]
pub struct BlockCyclicIter {
    block_size: usize,
    grid_size: usize,
    start_block: usize,
    locals: std::ops::Range<usize>,
}

impl Iterator for BlockCyclicIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.locals.next().map(|l| {
            let (local_block, offset) = l.div_rem(&self.block_size);
            (local_block * self.grid_size + self.start_block) * self.block_size + offset
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.locals.size_hint()
    }
}

impl ExactSizeIterator for BlockCyclicIter {}

impl AxisMap for BlockCyclicMap {
    type GlobalIter<'a> = BlockCyclicIter;

    fn dist_type(&self) -> DistType {
        DistType::Cyclic
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
        self.local_block_count() * self.block_size
    }
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError> {
        if global_index >= self.global_size {
            return Err(IndexError::GlobalOutOfBounds {
                index: global_index,
                size: self.global_size,
            });
        }
        let (global_block, offset) = global_index.div_rem(&self.block_size);
        if global_block < self.start_block()
            || (global_block - self.start_block()) % self.grid_size != 0
        {
            return Err(IndexError::NotOwned {
                index: global_index,
            });
        }
        Ok((global_block - self.start_block()) / self.grid_size * self.block_size + offset)
    }
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError> {
        if local_index >= self.local_size() {
            return Err(IndexError::LocalOutOfRange {
                index: local_index,
                local_size: self.local_size(),
            });
        }
        let (local_block, offset) = local_index.div_rem(&self.block_size);
        let global_block = local_block * self.grid_size + self.start_block();
        Ok(global_block * self.block_size + offset)
    }
    fn owned_globals(&self) -> Self::GlobalIter<'_> {
        BlockCyclicIter {
            block_size: self.block_size,
            grid_size: self.grid_size,
            start_block: self.start_block(),
            locals: 0..self.local_size(),
        }
    }
    fn global_slice(&self) -> Option<GlobalSlice> {
        None
    }
    fn to_descriptor(&self) -> AxisDescriptor {
        AxisDescriptor::block_cyclic(
            self.global_size,
            self.grid_rank,
            self.grid_size,
            self.block_size,
        )
    }
}
