//! MPI parallel distributions
use crate::{
    distribution::{DescriptorTable, Distribution},
    traits::{ParallelDistribution, RONImportParallel},
    types::{AxisDescriptor, AxisStrategy, Error},
};
use itertools::{izip, Itertools};
use mpi::{
    datatype::PartitionMut,
    traits::{Communicator, CommunicatorCollectives},
    Count,
};

/// Gather the descriptors of every process into a descriptor table
///
/// Each process passes its own descriptor sequence. The descriptors are RON encoded, so
/// processes may send sequences of different lengths. The gathered table is validated.
pub fn gather_descriptor_table<C: Communicator>(
    comm: &C,
    local_descriptors: &[AxisDescriptor],
) -> Result<DescriptorTable, Error> {
    let data = ron::to_string(local_descriptors)?.into_bytes();

    let mut counts = vec![0 as Count; comm.size() as usize];
    comm.all_gather_into(&(data.len() as Count), &mut counts[..]);

    let displacements = counts
        .iter()
        .scan(0, |acc, &x| {
            let old = *acc;
            *acc += x;
            Some(old)
        })
        .collect_vec();

    let mut receive_data = vec![0u8; counts.iter().sum::<Count>() as usize];
    {
        let mut receive_partition =
            PartitionMut::new(&mut receive_data[..], &counts[..], &displacements[..]);
        comm.all_gather_varcount_into(&data[..], &mut receive_partition);
    }

    let ranks = izip!(&counts, &displacements)
        .map(|(count, displacement)| {
            let start = *displacement as usize;
            ron::de::from_bytes(&receive_data[start..start + *count as usize])
        })
        .collect::<Result<Vec<Vec<AxisDescriptor>>, _>>()?;

    let table = DescriptorTable::new(ranks);
    table.validate()?;
    tracing::debug!(
        "gathered descriptor table of {} process(es) on rank {}",
        table.nprocs(),
        comm.rank()
    );
    Ok(table)
}

impl Distribution {
    /// Create from the descriptors of the current process
    ///
    /// The descriptors of all processes are gathered, so this must be called on every
    /// process of the communicator.
    pub fn from_local_descriptors<C: Communicator>(
        comm: &C,
        local_descriptors: &[AxisDescriptor],
    ) -> Result<Self, Error> {
        let table = gather_descriptor_table(comm, local_descriptors)?;
        Distribution::from_descriptor_table(&table, comm.rank() as usize)
    }
}

/// A distribution over the processes of an MPI communicator
#[derive(Debug)]
pub struct ParallelDistributionImpl<'a, C: Communicator> {
    comm: &'a C,
    distribution: Distribution,
}

impl<'a, C: Communicator> ParallelDistributionImpl<'a, C> {
    /// Create new
    ///
    /// The distribution must have one rank per process and be seen from the current process.
    pub fn new(comm: &'a C, distribution: Distribution) -> Result<Self, Error> {
        if distribution.nprocs() != comm.size() as usize {
            return Err(Error::RankCount {
                expected: distribution.nprocs(),
                actual: comm.size() as usize,
            });
        }
        let distribution = if distribution.rank() == comm.rank() as usize {
            distribution
        } else {
            distribution.for_rank(comm.rank() as usize)?
        };
        Ok(Self { comm, distribution })
    }

    /// Create the distribution of a fresh array
    ///
    /// Every process computes the same descriptor table, so no communication is needed.
    pub fn from_strategies(
        comm: &'a C,
        global_shape: &[usize],
        strategies: &[AxisStrategy],
        grid_shape: Option<&[usize]>,
    ) -> Result<Self, Error> {
        let distribution = Distribution::from_strategies(
            global_shape,
            strategies,
            comm.size() as usize,
            grid_shape,
            comm.rank() as usize,
        )?;
        Ok(Self { comm, distribution })
    }

    /// Create from the descriptors of the current process
    pub fn from_local_descriptors(
        comm: &'a C,
        local_descriptors: &[AxisDescriptor],
    ) -> Result<Self, Error> {
        Ok(Self {
            comm,
            distribution: Distribution::from_local_descriptors(comm, local_descriptors)?,
        })
    }
}

impl<C: Communicator> ParallelDistribution<C> for ParallelDistributionImpl<'_, C> {
    fn comm(&self) -> &C {
        self.comm
    }
    fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

impl<'a, C: Communicator + 'a> RONImportParallel<'a, C> for ParallelDistributionImpl<'a, C> {
    fn create_from_ron_info(
        comm: &'a C,
        local_descriptors: Vec<AxisDescriptor>,
    ) -> Result<Self, Error> {
        Self::from_local_descriptors(comm, &local_descriptors)
    }
}
