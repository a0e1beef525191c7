//! Types

mod descriptor;
mod dist_type;
mod errors;
mod global_descriptor;
mod global_slice;
mod strategy;

pub use descriptor::AxisDescriptor;
pub use dist_type::DistType;
pub use errors::{ConsistencyError, ConstructionError, Error, IndexError};
pub use global_descriptor::GlobalAxisDescriptor;
pub use global_slice::GlobalSlice;
pub use strategy::{AxisStrategy, DistributionConfig};
