//! RON I/O
use crate::{
    distribution::{DescriptorTable, Distribution},
    traits::{ConvertToSerializable, RONExport, RONImport},
    types::Error,
};
#[cfg(feature = "mpi")]
use crate::traits::{ParallelDistribution, RONExportParallel};
#[cfg(feature = "mpi")]
use mpi::traits::Communicator;

impl<S: ConvertToSerializable> RONExport for S {
    fn to_ron_string(&self) -> Result<String, Error> {
        Ok(ron::to_string(&self.to_serializable())?)
    }
}

impl<S: ConvertToSerializable> RONImport for S {
    fn from_ron_string(s: &str) -> Result<Self, Error> {
        Self::from_serializable(ron::from_str(s)?)
    }
}

#[cfg(feature = "mpi")]
impl<C: Communicator, D: ParallelDistribution<C>> RONExportParallel<C> for D {}

impl ConvertToSerializable for DescriptorTable {
    type SerializableType = DescriptorTable;
    fn to_serializable(&self) -> DescriptorTable {
        self.clone()
    }
    fn from_serializable(s: DescriptorTable) -> Result<Self, Error> {
        s.validate()?;
        Ok(s)
    }
}

#[derive(serde::Serialize, Debug, serde::Deserialize)]
/// A serde serializable distribution
pub struct SerializableDistribution {
    rank: usize,
    table: DescriptorTable,
}

impl ConvertToSerializable for Distribution {
    type SerializableType = SerializableDistribution;
    fn to_serializable(&self) -> SerializableDistribution {
        SerializableDistribution {
            rank: self.rank(),
            table: self.descriptor_table(),
        }
    }
    fn from_serializable(s: SerializableDistribution) -> Result<Self, Error> {
        Distribution::from_descriptor_table(&s.table, s.rank)
    }
}
