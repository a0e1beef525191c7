//! Index maps for n-dimensional arrays distributed over a process grid
//!
//! Each axis of an array is partitioned over one axis of a process grid, either as
//! contiguous blocks, round-robin (cyclic and block-cyclic) or by an explicit list of
//! indices. A [`Distribution`] combines the axes and translates between global and local
//! indices, and finds the ranks that own an index or a region.
#![cfg_attr(feature = "strict", deny(warnings), deny(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod distribution;
mod io;
pub mod map;
#[cfg(feature = "mpi")]
pub mod parallel;
pub mod process_grid;
pub mod traits;
pub mod types;

pub use distribution::{AxisPartition, DescriptorTable, Distribution};
#[cfg(feature = "serde")]
pub use io::SerializableDistribution;
pub use map::IndexMap;
#[cfg(feature = "mpi")]
pub use parallel::{gather_descriptor_table, ParallelDistributionImpl};
pub use process_grid::ProcessGrid;
