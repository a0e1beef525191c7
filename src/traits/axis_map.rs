//! Traits for the map of one distributed axis
use crate::types::{AxisDescriptor, DistType, GlobalSlice, IndexError};
use std::iter::Iterator;

/// The partition of one array axis owned by one position of the process grid
pub trait AxisMap {
    /// Iterator over owned global indices
    type GlobalIter<'a>: Iterator<Item = usize>
    where
        Self: 'a;

    /// Distribution type
    fn dist_type(&self) -> DistType;

    /// Size of the whole axis
    fn global_size(&self) -> usize;

    /// Number of partitions of the axis
    fn grid_size(&self) -> usize;

    /// The partition this map represents
    fn grid_rank(&self) -> usize;

    /// Number of global indices owned by this map
    fn local_size(&self) -> usize;

    /// The local index of an owned global index
    fn local_from_global(&self, global_index: usize) -> Result<usize, IndexError>;

    /// The global index of a local index
    fn global_from_local(&self, local_index: usize) -> Result<usize, IndexError>;

    /// Iterator over the owned global indices, in local order
    ///
    /// Every call starts a fresh iteration.
    fn owned_globals(&self) -> Self::GlobalIter<'_>;

    /// The owned global indices as a uniform range
    ///
    /// Returns `None` if the owned set is not a single strided range, in which case
    /// [`AxisMap::owned_globals`] must be used.
    fn global_slice(&self) -> Option<GlobalSlice>;

    /// Portable descriptor of this map
    fn to_descriptor(&self) -> AxisDescriptor;

    /// Is the global index owned by this map?
    fn is_owned(&self, global_index: usize) -> bool {
        self.local_from_global(global_index).is_ok()
    }
}
