//! Errors
use super::DistType;
use thiserror::Error;

/// Error returned when the parameters of an axis map are malformed or inconsistent.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstructionError {
    /// A process grid axis must contain at least one partition.
    #[error("grid size must be > 0")]
    ZeroGridSize,

    /// The grid rank of a map lies outside its process grid axis.
    #[error("grid rank {grid_rank} is out of range for grid size {grid_size}")]
    GridRankOutOfRange { grid_rank: usize, grid_size: usize },

    /// A not-distributed axis was given a grid of more than one partition.
    #[error("a not-distributed axis must have grid size 1, got {grid_size}")]
    DistributedNotDistributed { grid_size: usize },

    /// Block bounds must satisfy `start <= stop <= size`.
    #[error("block bounds [{start}, {stop}) are invalid for an axis of size {size}")]
    InvalidBlockBounds { start: usize, stop: usize, size: usize },

    /// The start of a cyclic map must equal its grid rank.
    #[error("start value (given {start}) does not equal grid rank (given {grid_rank})")]
    CyclicStartMismatch { start: usize, grid_rank: usize },

    /// The start of a cyclic map must lie inside the process grid axis.
    #[error("start ({start}) is greater than or equal to grid size ({grid_size})")]
    CyclicStartOutOfGrid { start: usize, grid_size: usize },

    /// Block-cyclic blocks must contain at least one element.
    #[error("block size must be > 0")]
    ZeroBlockSize,

    /// The global size of a block-cyclic axis must be a multiple of its block size.
    #[error("size {size} is not a multiple of block size {block_size}")]
    PartialTrailingBlock { size: usize, block_size: usize },

    /// The start of a block-cyclic map must fall on a block boundary.
    #[error("start {start} is not a multiple of block size {block_size}")]
    UnalignedBlockStart { start: usize, block_size: usize },

    /// The start block of a block-cyclic map must be its grid rank.
    #[error("start block {start_block} does not equal grid rank {grid_rank}")]
    BlockCyclicStartMismatch { start_block: usize, grid_rank: usize },

    /// An unstructured map lists the same global index twice.
    #[error("global index {index} is listed more than once")]
    DuplicateIndex { index: usize },

    /// An unstructured map lists a global index outside the axis.
    #[error("global index {index} is out of range for an axis of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    /// A descriptor lacks a field its distribution type requires.
    #[error("'{dist_type}' descriptor is missing field '{field}'")]
    MissingField { dist_type: DistType, field: &'static str },

    /// A global block descriptor has malformed bounds.
    #[error("block bounds {bounds:?} must start at 0 and be nondecreasing")]
    InvalidGlobalBounds { bounds: Vec<usize> },

    /// A process grid does not match the number of processes.
    #[error("grid shape {grid_shape:?} does not multiply to {nprocs} process(es)")]
    GridShapeMismatch { grid_shape: Vec<usize>, nprocs: usize },

    /// The number of processes in a grid does not fit in a `usize`.
    #[error("grid shape {grid_shape:?} has too many processes")]
    GridSizeOverflow { grid_shape: Vec<usize> },

    /// The first index of a block-cyclic map does not fit in a `usize`.
    #[error("start of block {grid_rank} with block size {block_size} is out of range")]
    BlockStartOverflow { grid_rank: usize, block_size: usize },

    /// A process grid does not have one entry per array axis.
    #[error("grid shape has {actual} axis/axes, but the array has {expected}")]
    GridDimensionMismatch { expected: usize, actual: usize },

    /// The number of strategies does not match the number of array axes.
    #[error("expected {expected} axis strategies, but got {actual}")]
    StrategyCountMismatch { expected: usize, actual: usize },

    /// More than one process was requested but no axis is distributed.
    #[error("cannot spread {nprocs} processes over an array with no distributed axis")]
    NoDistributedAxis { nprocs: usize },
}

/// Error returned when an index is not owned by, or not within, a map.
///
/// Lookup errors are always recoverable: callers route to a different owner or report a
/// bounds violation for the whole array.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IndexError {
    /// The global index is not owned by this map.
    #[error("global index {index} is not owned")]
    NotOwned { index: usize },

    /// The local index is past the end of the local data.
    #[error("local index {index} is out of range for local size {local_size}")]
    LocalOutOfRange { index: usize, local_size: usize },

    /// The global index is past the end of the axis.
    #[error("global index {index} is out of bounds for an axis of size {size}")]
    GlobalOutOfBounds { index: usize, size: usize },

    /// An index tuple has the wrong length.
    #[error("expected an index with {expected} component(s), but got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A rank or grid coordinate lies outside the process grid.
    #[error("rank {rank} is out of range for {nprocs} process(es)")]
    RankOutOfRange { rank: usize, nprocs: usize },

    /// A component of an index tuple was rejected by its axis.
    #[error("axis {axis}: {source}")]
    Axis {
        axis: usize,
        #[source]
        source: Box<IndexError>,
    },
}

impl IndexError {
    /// Attach the axis on which this error happened
    pub fn on_axis(self, axis: usize) -> Self {
        IndexError::Axis {
            axis,
            source: Box::new(self),
        }
    }
}

/// Error returned when the descriptors of different ranks do not describe one consistent
/// distribution.
#[derive(Error, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConsistencyError {
    /// The descriptor table is empty.
    #[error("the descriptor table has no ranks")]
    EmptyTable,

    /// The descriptor table does not have one entry per rank of the process grid.
    #[error("the process grid has {expected} rank(s), but the table has {actual} entries")]
    RankCountMismatch { expected: usize, actual: usize },

    /// A rank describes a different number of axes than rank 0.
    #[error("rank {rank} describes {actual} axis/axes, but rank 0 describes {expected}")]
    DimensionMismatch { rank: usize, expected: usize, actual: usize },

    /// Two ranks disagree on the distribution type of an axis.
    #[error("axis {axis}: ranks {ranks:?} disagree on the distribution type")]
    DistTypeMismatch { axis: usize, ranks: (usize, usize) },

    /// Two ranks disagree on the global size of an axis.
    #[error("axis {axis}: ranks {ranks:?} disagree on the global size")]
    GlobalSizeMismatch { axis: usize, ranks: (usize, usize) },

    /// Two ranks disagree on the grid size of an axis.
    #[error("axis {axis}: ranks {ranks:?} disagree on the grid size")]
    GridSizeMismatch { axis: usize, ranks: (usize, usize) },

    /// Two ranks disagree on the block size of a cyclic axis.
    #[error("axis {axis}: ranks {ranks:?} disagree on the block size")]
    BlockSizeMismatch { axis: usize, ranks: (usize, usize) },

    /// A rank's grid rank does not match its position in the process grid.
    #[error("axis {axis}: rank {rank} has grid rank {actual}, but its grid position is {expected}")]
    GridPositionMismatch {
        axis: usize,
        rank: usize,
        expected: usize,
        actual: usize,
    },

    /// Two ranks at the same grid position describe different partitions.
    #[error("axis {axis}: ranks {ranks:?} share a grid position but describe different partitions")]
    ReplicaMismatch { axis: usize, ranks: (usize, usize) },

    /// Neighbouring block bounds leave a gap.
    #[error("axis {axis}: ranks {ranks:?} leave a gap between {stop} and {start}")]
    BlockGap {
        axis: usize,
        ranks: (usize, usize),
        stop: usize,
        start: usize,
    },

    /// Neighbouring block bounds overlap.
    #[error("axis {axis}: ranks {ranks:?} overlap between {start} and {stop}")]
    BlockOverlap {
        axis: usize,
        ranks: (usize, usize),
        start: usize,
        stop: usize,
    },

    /// The blocks of an axis do not cover it from 0 to its global size.
    #[error("axis {axis}: rank {rank} ends the axis at {bound}, but its bounds are [0, {size})")]
    BlockCoverage {
        axis: usize,
        rank: usize,
        bound: usize,
        size: usize,
    },

    /// The same global index is owned by two ranks of an unstructured axis.
    #[error("axis {axis}: global index {index} is owned by both ranks {ranks:?}")]
    DuplicateIndex {
        axis: usize,
        index: usize,
        ranks: (usize, usize),
    },

    /// A global index of an unstructured axis is owned by no rank.
    #[error("axis {axis}: global index {index} is not owned by any rank")]
    MissingIndex { axis: usize, index: usize },
}

/// Umbrella error for operations that can fail in more than one way
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed axis parameters
    #[error(transparent)]
    Construction(#[from] ConstructionError),

    /// An index that is not owned
    #[error(transparent)]
    Index(#[from] IndexError),

    /// An inconsistent descriptor table
    #[error(transparent)]
    Consistency(#[from] ConsistencyError),

    /// A descriptor failed to construct an axis map for a rank
    #[error("rank {rank}, axis {axis}: {source}")]
    Descriptor {
        rank: usize,
        axis: usize,
        #[source]
        source: ConstructionError,
    },

    /// File I/O
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// RON encoding
    #[cfg(feature = "serde")]
    #[error(transparent)]
    RonEncode(#[from] ron::Error),

    /// RON decoding
    #[cfg(feature = "serde")]
    #[error(transparent)]
    RonDecode(#[from] ron::error::SpannedError),

    /// The number of ranks stored with a distribution does not match the communicator
    #[error("expected {expected} MPI rank(s), but the communicator has {actual}")]
    RankCount { expected: usize, actual: usize },
}
