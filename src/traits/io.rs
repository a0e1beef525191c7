mod ron;

pub use ron::{ConvertToSerializable, RONExport, RONImport};
#[cfg(feature = "mpi")]
pub use ron::{RONExportParallel, RONImportParallel};
