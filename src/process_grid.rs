//! Process grids
use crate::types::{AxisStrategy, ConstructionError, IndexError};
use itertools::Itertools;

/// A grid of processes with one axis per array axis
///
/// Ranks are laid out row-major: the last axis varies fastest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "Vec<usize>", into = "Vec<usize>")
)]
pub struct ProcessGrid {
    shape: Vec<usize>,
    size: usize,
}

impl ProcessGrid {
    /// Create new
    pub fn new(shape: &[usize]) -> Result<Self, ConstructionError> {
        if shape.contains(&0) {
            return Err(ConstructionError::ZeroGridSize);
        }
        let size = shape
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n))
            .ok_or_else(|| ConstructionError::GridSizeOverflow {
                grid_shape: shape.to_vec(),
            })?;
        Ok(Self {
            shape: shape.to_vec(),
            size,
        })
    }

    /// Choose a grid for `nprocs` processes over an array with the given strategies
    ///
    /// Axes that are not distributed get one partition. The processes are factored over the
    /// distributed axes as evenly as possible, and larger factors go to larger axes.
    pub fn for_strategies(
        global_shape: &[usize],
        strategies: &[AxisStrategy],
        nprocs: usize,
    ) -> Result<Self, ConstructionError> {
        if global_shape.len() != strategies.len() {
            return Err(ConstructionError::StrategyCountMismatch {
                expected: global_shape.len(),
                actual: strategies.len(),
            });
        }
        if nprocs == 0 {
            return Err(ConstructionError::ZeroGridSize);
        }
        let mut distributed = (0..strategies.len())
            .filter(|i| strategies[*i].is_distributed())
            .collect::<Vec<_>>();
        let mut shape = vec![1; strategies.len()];
        if distributed.is_empty() {
            if nprocs != 1 {
                return Err(ConstructionError::NoDistributedAxis { nprocs });
            }
            return Self::new(&shape);
        }

        let factors = factorizations(nprocs, distributed.len(), nprocs)
            .into_iter()
            .min_by_key(|f| (f[0], f[0] - f[f.len() - 1]))
            .ok_or(ConstructionError::ZeroGridSize)?;

        // Stable sort keeps earlier axes first among axes of equal size
        distributed.sort_by_key(|i| std::cmp::Reverse(global_shape[*i]));
        for (axis, factor) in distributed.iter().zip(factors) {
            shape[*axis] = factor;
        }
        tracing::trace!("chose process grid {shape:?} for {nprocs} process(es)");
        Self::new(&shape)
    }

    /// Number of partitions along each axis
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of axes
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of processes
    pub fn size(&self) -> usize {
        self.size
    }

    /// The grid position of a rank
    pub fn coords_from_rank(&self, rank: usize) -> Result<Vec<usize>, IndexError> {
        if rank >= self.size() {
            return Err(IndexError::RankOutOfRange {
                rank,
                nprocs: self.size(),
            });
        }
        Ok(self.coords_of(rank))
    }

    /// The grid positions of ranks `0, 1, ...`
    pub fn all_coords(&self) -> impl Iterator<Item = Vec<usize>> + '_ {
        (0..self.size).map(|rank| self.coords_of(rank))
    }

    fn coords_of(&self, rank: usize) -> Vec<usize> {
        let mut coords = vec![0; self.ndim()];
        let mut r = rank;
        for (c, n) in coords.iter_mut().zip(&self.shape).rev() {
            *c = r % n;
            r /= n;
        }
        coords
    }

    /// The rank at a grid position
    pub fn rank_from_coords(&self, coords: &[usize]) -> Result<usize, IndexError> {
        if coords.len() != self.ndim() {
            return Err(IndexError::DimensionMismatch {
                expected: self.ndim(),
                actual: coords.len(),
            });
        }
        let mut rank = 0;
        for (axis, (c, n)) in coords.iter().zip(&self.shape).enumerate() {
            if c >= n {
                return Err(IndexError::RankOutOfRange {
                    rank: *c,
                    nprocs: *n,
                }
                .on_axis(axis));
            }
            rank = rank * n + c;
        }
        Ok(rank)
    }

    /// The ranks at every combination of the given per-axis grid positions, ascending
    ///
    /// The positions of each axis must be sorted and in range.
    pub fn ranks_in(&self, positions: &[Vec<usize>]) -> Result<Vec<usize>, IndexError> {
        if positions.len() != self.ndim() {
            return Err(IndexError::DimensionMismatch {
                expected: self.ndim(),
                actual: positions.len(),
            });
        }
        if self.ndim() == 0 {
            return Ok(vec![0]);
        }
        positions
            .iter()
            .map(|p| p.iter().copied())
            .multi_cartesian_product()
            .map(|coords| self.rank_from_coords(&coords))
            .collect()
    }
}

impl TryFrom<Vec<usize>> for ProcessGrid {
    type Error = ConstructionError;
    fn try_from(shape: Vec<usize>) -> Result<Self, ConstructionError> {
        Self::new(&shape)
    }
}

impl From<ProcessGrid> for Vec<usize> {
    fn from(grid: ProcessGrid) -> Self {
        grid.shape
    }
}

/// Non-increasing factorizations of `n` into `k` factors, each at most `max`
fn factorizations(n: usize, k: usize, max: usize) -> Vec<Vec<usize>> {
    if k == 1 {
        return if n <= max { vec![vec![n]] } else { vec![] };
    }
    let mut result = vec![];
    for f in (1..=usize::min(n, max)).rev() {
        if n % f == 0 {
            for mut rest in factorizations(n / f, k - 1, f) {
                rest.insert(0, f);
                result.push(rest);
            }
        }
    }
    result
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_row_major() {
        let g = ProcessGrid::new(&[2, 3]).unwrap();
        assert_eq!(g.size(), 6);
        assert_eq!(g.coords_from_rank(0).unwrap(), vec![0, 0]);
        assert_eq!(g.coords_from_rank(1).unwrap(), vec![0, 1]);
        assert_eq!(g.coords_from_rank(3).unwrap(), vec![1, 0]);
        assert_eq!(g.coords_from_rank(5).unwrap(), vec![1, 2]);
        assert_eq!(g.rank_from_coords(&[1, 1]).unwrap(), 4);
        for rank in 0..6 {
            assert_eq!(
                g.rank_from_coords(&g.coords_from_rank(rank).unwrap()).unwrap(),
                rank
            );
        }
    }

    #[test]
    fn test_out_of_range() {
        let g = ProcessGrid::new(&[2, 3]).unwrap();
        assert!(g.coords_from_rank(6).is_err());
        assert!(g.rank_from_coords(&[0, 3]).is_err());
        assert!(g.rank_from_coords(&[0]).is_err());
        assert!(ProcessGrid::new(&[2, 0]).is_err());
    }

    #[test]
    fn test_size_overflow() {
        assert_eq!(
            ProcessGrid::new(&[1 << 33, 1 << 33]),
            Err(ConstructionError::GridSizeOverflow {
                grid_shape: vec![1 << 33, 1 << 33]
            })
        );
        assert_eq!(ProcessGrid::new(&[1 << 33, 1]).unwrap().size(), 1 << 33);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_ron() {
        let g = ProcessGrid::new(&[2, 3]).unwrap();
        let s = ron::to_string(&g).unwrap();
        assert_eq!(ron::from_str::<ProcessGrid>(&s).unwrap(), g);
        assert!(ron::from_str::<ProcessGrid>("[8589934592,8589934592]").is_err());
    }

    #[test]
    fn test_all_coords() {
        let g = ProcessGrid::new(&[2, 3]).unwrap();
        let coords = g.all_coords().collect::<Vec<_>>();
        assert_eq!(coords.len(), 6);
        for (rank, c) in coords.iter().enumerate() {
            assert_eq!(g.coords_from_rank(rank).unwrap(), *c);
        }
        assert_eq!(
            ProcessGrid::new(&[]).unwrap().all_coords().collect::<Vec<_>>(),
            vec![Vec::<usize>::new()]
        );
    }

    #[test]
    fn test_ranks_in() {
        let g = ProcessGrid::new(&[2, 3]).unwrap();
        assert_eq!(g.ranks_in(&[vec![1], vec![0, 2]]).unwrap(), vec![3, 5]);
        assert_eq!(
            g.ranks_in(&[vec![0, 1], vec![1, 2]]).unwrap(),
            vec![1, 2, 4, 5]
        );
        assert_eq!(g.ranks_in(&[vec![], vec![1]]).unwrap(), Vec::<usize>::new());
        assert_eq!(ProcessGrid::new(&[]).unwrap().ranks_in(&[]).unwrap(), vec![0]);
    }

    #[test]
    fn test_factorizations() {
        assert_eq!(factorizations(12, 2, 12), vec![vec![12, 1], vec![6, 2], vec![4, 3]]);
        assert_eq!(factorizations(7, 1, 7), vec![vec![7]]);
    }

    #[test]
    fn test_for_strategies() {
        use AxisStrategy::{Block, Cyclic, NotDistributed};
        let g = ProcessGrid::for_strategies(&[31, 53], &[Block, NotDistributed], 4).unwrap();
        assert_eq!(g.shape(), &[4, 1]);
        let g = ProcessGrid::for_strategies(&[3, 5], &[Block, Block], 4).unwrap();
        assert_eq!(g.shape(), &[2, 2]);
        let g = ProcessGrid::for_strategies(&[10, 20], &[Block, Cyclic], 8).unwrap();
        assert_eq!(g.shape(), &[2, 4]);
        let g = ProcessGrid::for_strategies(&[10, 10, 10], &[Block, Block, Block], 12).unwrap();
        assert_eq!(g.shape(), &[3, 2, 2]);
        let g = ProcessGrid::for_strategies(&[10], &[NotDistributed], 1).unwrap();
        assert_eq!(g.shape(), &[1]);
        assert_eq!(
            ProcessGrid::for_strategies(&[10], &[NotDistributed], 2),
            Err(ConstructionError::NoDistributedAxis { nprocs: 2 })
        );
        assert!(ProcessGrid::for_strategies(&[10], &[Block, Block], 2).is_err());
    }
}
