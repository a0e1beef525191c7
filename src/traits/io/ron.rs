//! RON I/O
use crate::types::Error;
#[cfg(feature = "mpi")]
use crate::{traits::ParallelDistribution, types::AxisDescriptor};
#[cfg(feature = "mpi")]
use mpi::traits::Communicator;
use std::fs;

pub trait ConvertToSerializable: Sized {
    //! Convert to/from a serializable type

    /// Serializable type
    type SerializableType: serde::Serialize + serde::de::DeserializeOwned;
    /// Convert to the serializable type
    fn to_serializable(&self) -> Self::SerializableType;
    /// Convert from the serializable type
    ///
    /// Deserialized data comes from outside the library, so it is validated again here.
    fn from_serializable(s: Self::SerializableType) -> Result<Self, Error>;
}

pub trait RONExport {
    //! Export as RON

    /// Generate the RON string
    fn to_ron_string(&self) -> Result<String, Error>;

    /// Export as RON
    fn export_as_ron(&self, filename: &str) -> Result<(), Error> {
        fs::write(filename, self.to_ron_string()?)?;
        tracing::debug!("exported {filename}");
        Ok(())
    }
}

pub trait RONImport: Sized {
    //! Import from RON

    /// Create from a RON string
    fn from_ron_string(s: &str) -> Result<Self, Error>;

    /// Import from RON
    fn import_from_ron(filename: &str) -> Result<Self, Error> {
        let content = fs::read_to_string(filename)?;
        tracing::debug!("importing {filename}");
        Self::from_ron_string(&content)
    }
}

/// Name of the file holding the data of one rank: `name.ron` becomes `name.<rank>.ron`
#[cfg(feature = "mpi")]
fn rank_filename(filename: &str, rank: i32) -> String {
    match filename.rsplit_once('.') {
        Some((stem, extension)) => format!("{stem}.{rank}.{extension}"),
        None => format!("{filename}.{rank}"),
    }
}

#[cfg(feature = "mpi")]
#[derive(Debug, serde::Serialize, serde::Deserialize)]
/// Summary I/O data for a parallel distribution
struct ParallelSummaryData {
    mpi_ranks: i32,
}

#[cfg(feature = "mpi")]
pub trait RONExportParallel<C: Communicator>: ParallelDistribution<C> {
    //! Parallel distribution export for RON
    //!
    //! Every process writes its own descriptors; process 0 also writes a summary file.

    /// Export as RON
    fn export_as_ron(&self, filename: &str) -> Result<(), Error> {
        let rank = self.comm().rank();
        let sub_filename = rank_filename(filename, rank);
        fs::write(
            &sub_filename,
            ron::to_string(&self.distribution().descriptors())?,
        )?;
        if rank == 0 {
            let summary = ParallelSummaryData {
                mpi_ranks: self.comm().size(),
            };
            fs::write(filename, ron::to_string(&summary)?)?;
        }
        tracing::debug!("exported {sub_filename}");
        Ok(())
    }
}

#[cfg(feature = "mpi")]
pub trait RONImportParallel<'a, C: Communicator + 'a>: Sized {
    //! Parallel distribution import for RON

    /// Create from the communicator and the descriptors of the current process
    fn create_from_ron_info(
        comm: &'a C,
        local_descriptors: Vec<AxisDescriptor>,
    ) -> Result<Self, Error>;

    /// Import from RON
    ///
    /// The communicator must have as many processes as the one used for the export.
    fn import_from_ron(comm: &'a C, filename: &str) -> Result<Self, Error> {
        let summary: ParallelSummaryData = ron::from_str(&fs::read_to_string(filename)?)?;
        if summary.mpi_ranks != comm.size() {
            return Err(Error::RankCount {
                expected: summary.mpi_ranks as usize,
                actual: comm.size() as usize,
            });
        }
        let sub_filename = rank_filename(filename, comm.rank());
        let local_descriptors = ron::from_str(&fs::read_to_string(&sub_filename)?)?;
        tracing::debug!("importing {sub_filename}");
        Self::create_from_ron_info(comm, local_descriptors)
    }
}
