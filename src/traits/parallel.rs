//! Traits for MPI parallel distributions
use crate::distribution::Distribution;
use mpi::traits::Communicator;

pub trait ParallelDistribution<C: Communicator> {
    //! A distribution whose ranks are the processes of an MPI communicator

    /// MPI communicator
    fn comm(&self) -> &C;

    /// The distribution, seen from the current process
    fn distribution(&self) -> &Distribution;
}
