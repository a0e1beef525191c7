use nddist::traits::{AxisMap, RONExport, RONImport};
use nddist::types::{AxisStrategy, GlobalAxisDescriptor};
use nddist::Distribution;

/// Distributions in serial
///
/// Demonstration of creating a distribution and querying it as seen from every rank
///
/// Distributing over MPI processes is demonstrated in the example `parallel_distribution.rs`
fn main() {
    // A 31 x 6 array over 8 ranks: rows are split into blocks, columns are dealt round-robin
    // in blocks of 3. The process grid is chosen automatically.
    let d = Distribution::from_strategies(
        &[31, 6],
        &[AxisStrategy::Block, AxisStrategy::BlockCyclic { block_size: 3 }],
        8,
        None,
        0,
    )
    .unwrap();
    println!("Process grid: {:?}", d.grid_shape());

    for rank in 0..d.nprocs() {
        let d = d.for_rank(rank).unwrap();
        println!(
            "Rank {rank} at {:?} owns a {:?} slice",
            d.grid_coords(),
            d.local_shape()
        );
    }

    // Find who owns an index, and translate it to the owner's local index
    let index = [17, 4];
    let owner = d.owning_ranks(&index).unwrap()[0];
    let local = d.for_rank(owner).unwrap().local_from_global(&index).unwrap();
    println!("{index:?} is owned by rank {owner} at local index {local:?}");

    // The ranks that hold part of a region
    println!(
        "Ranks owning [10, 20) x [0, 3): {:?}",
        d.owning_ranks_in(&[10..20, 0..3]).unwrap()
    );

    // Each axis can also be described for all ranks at once
    let d2 = Distribution::from_global_descriptors(
        &[
            GlobalAxisDescriptor::Block {
                bounds: vec![0, 3, 10],
            },
            GlobalAxisDescriptor::Unstructured {
                indices: vec![vec![4, 0], vec![1, 3, 2]],
            },
        ],
        3,
    )
    .unwrap();
    for (axis, map) in d2.maps().enumerate() {
        println!(
            "Rank 3, axis {axis}: {} map owning {:?}",
            map.dist_type(),
            map.owned_globals().collect::<Vec<_>>()
        );
    }

    // If the serde option is used, a distribution can be exported in RON format
    d2.export_as_ron("_serial_distribution.ron").unwrap();
    let d3 = Distribution::import_from_ron("_serial_distribution.ron").unwrap();
    assert_eq!(d2, d3);
}
