//! Traits

mod axis_map;
#[cfg(feature = "serde")]
mod io;
#[cfg(feature = "mpi")]
mod parallel;

pub use axis_map::AxisMap;
#[cfg(feature = "serde")]
pub use io::{ConvertToSerializable, RONExport, RONImport};
#[cfg(feature = "mpi")]
pub use io::{RONExportParallel, RONImportParallel};
#[cfg(feature = "mpi")]
pub use parallel::ParallelDistribution;
