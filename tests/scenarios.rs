//! Test the documented behaviour of each distribution type
use nddist::{
    map::UnstructuredMap,
    traits::AxisMap,
    types::{AxisDescriptor, AxisStrategy, GlobalAxisDescriptor, IndexError},
    DescriptorTable, Distribution, IndexMap,
};

#[test]
fn test_block() {
    let d = Distribution::from_strategies(&[31], &[AxisStrategy::Block], 4, None, 0).unwrap();
    assert_eq!(
        d.owned_global_indices().collect::<Vec<_>>(),
        (0..8).map(|i| vec![i]).collect::<Vec<_>>()
    );
    assert_eq!(d.owning_ranks(&[9]).unwrap(), vec![1]);
    assert_eq!(d.for_rank(3).unwrap().local_shape(), vec![7]);
}

#[test]
fn test_cyclic() {
    let m = IndexMap::from_descriptor(&AxisDescriptor::cyclic(16, 2, 4)).unwrap();
    assert_eq!(m.owned_globals().collect::<Vec<_>>(), vec![2, 6, 10, 14]);
    assert_eq!(m.local_from_global(10), Ok(2));
    assert_eq!(m.local_from_global(3), Err(IndexError::NotOwned { index: 3 }));
}

#[test]
fn test_block_cyclic() {
    let m = IndexMap::from_descriptor(&AxisDescriptor::block_cyclic(16, 1, 4, 2)).unwrap();
    assert!(matches!(m, IndexMap::BlockCyclic(_)));
    assert_eq!(m.owned_globals().collect::<Vec<_>>(), vec![2, 3, 10, 11]);
    assert_eq!(m.local_from_global(3), Ok(1));
}

#[test]
fn test_unstructured() {
    let m = UnstructuredMap::new(10, 3, 0, vec![5, 1, 9]).unwrap();
    assert_eq!(m.local_from_global(1), Ok(1));
    assert_eq!(m.global_from_local(0), Ok(5));
    assert_eq!(m.owned_globals().collect::<Vec<_>>(), vec![5, 1, 9]);
}

#[test]
fn test_cyclic_2d() {
    let d = Distribution::from_strategies(
        &[3, 5],
        &[AxisStrategy::Cyclic, AxisStrategy::Cyclic],
        4,
        Some(&[2, 2]),
        0,
    )
    .unwrap();
    assert_eq!(d.owning_ranks(&[2, 3]).unwrap(), vec![1]);
    let d1 = d.for_rank(1).unwrap();
    assert_eq!(d1.local_shape(), vec![2, 2]);
    assert_eq!(d1.local_from_global(&[2, 3]).unwrap(), vec![1, 1]);
}

#[test]
fn test_mixed_table() {
    // Block rows with uneven bounds, unstructured columns
    let rows = [(0, 1), (1, 4)];
    let columns = [vec![3, 0], vec![2, 1]];
    let mut ranks = vec![];
    for (i, (start, stop)) in rows.iter().enumerate() {
        for (j, indices) in columns.iter().enumerate() {
            ranks.push(vec![
                AxisDescriptor::block(4, i, 2, *start, *stop),
                AxisDescriptor::unstructured(4, j, 2, indices.clone()),
            ]);
        }
    }
    let table = DescriptorTable::new(ranks);
    let d = Distribution::from_descriptor_table(&table, 2).unwrap();
    assert_eq!(d.local_shape(), vec![3, 2]);
    assert_eq!(d.global_from_local(&[0, 0]).unwrap(), vec![1, 3]);
    assert_eq!(d.owning_ranks(&[0, 2]).unwrap(), vec![1]);
    assert_eq!(d.owning_ranks_in(&[0..4, 0..1]).unwrap(), vec![0, 2]);
    assert_eq!(
        d.global_descriptors(),
        vec![
            GlobalAxisDescriptor::Block {
                bounds: vec![0, 1, 4]
            },
            GlobalAxisDescriptor::Unstructured {
                indices: vec![vec![3, 0], vec![2, 1]]
            },
        ]
    );
}
