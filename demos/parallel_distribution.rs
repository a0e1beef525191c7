#[cfg(feature = "mpi")]
use mpi::{collective::CommunicatorCollectives, environment::Universe, traits::Communicator};
#[cfg(feature = "mpi")]
use nddist::{
    traits::{ParallelDistribution, RONExportParallel, RONImportParallel},
    types::AxisStrategy,
    ParallelDistributionImpl,
};

/// Parallel distributions
///
/// Demonstration of distributing an array over MPI processes
///
/// Serial use is demonstrated in the example `serial_distribution.rs`
#[cfg(feature = "mpi")]
fn main() {
    let universe: Universe = mpi::initialize().unwrap();
    let comm = universe.world();
    let rank = comm.rank();

    // Every process computes the same distribution, seen from itself
    let d = ParallelDistributionImpl::from_strategies(
        &comm,
        &[64, 64],
        &[AxisStrategy::Block, AxisStrategy::Cyclic],
        None,
    )
    .unwrap();

    println!(
        "Process {rank} owns a {:?} slice of a {:?} array",
        d.distribution().local_shape(),
        d.distribution().global_shape()
    );

    // A distribution can also be assembled from the descriptors held by each process
    let descriptors = d.distribution().descriptors();
    let d2 = ParallelDistributionImpl::from_local_descriptors(&comm, &descriptors).unwrap();
    assert_eq!(d.distribution(), d2.distribution());

    // If the serde option is used, the descriptors can be exported in RON format
    d.export_as_ron("_parallel_distribution.ron").unwrap();

    // Wait for export to finish
    comm.barrier();

    // It must be imported on the same number of processes as it was exported using
    let d3 = ParallelDistributionImpl::import_from_ron(&comm, "_parallel_distribution.ron").unwrap();
    assert_eq!(d.distribution(), d3.distribution());

    if rank == 0 {
        println!(
            "Index [40, 7] is owned by process {:?}",
            d.distribution().owning_ranks(&[40, 7]).unwrap()
        );
    }
}
#[cfg(not(feature = "mpi"))]
fn main() {}
