use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices of the two partitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffles `0..n` with a seeded RNG and takes the first `ceil(n * test_fraction)`
/// indices as the test partition. With `n >= 2` both partitions are non-empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let mut n_test = (n as f64 * test_fraction.clamp(0.0, 1.0)).ceil() as usize;
    if n >= 2 {
        n_test = n_test.clamp(1, n - 1);
    } else {
        n_test = n_test.min(n);
    }

    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));
    let train = indices.split_off(n_test);
    TrainTestSplit {
        train,
        test: indices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_split() {
        let a = train_test_split(100, 0.2, 42);
        let b = train_test_split(100, 0.2, 42);
        assert_eq!(a, b);
        assert_eq!(a.test.len(), 20);
        assert_eq!(a.train.len(), 80);
    }

    #[test]
    fn test_partitions_cover_all_rows_once() {
        let split = train_test_split(37, 0.2, 7);
        assert_eq!(split.test.len(), 8);
        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..37).collect::<Vec<_>>());
    }

    #[test]
    fn test_different_seed_changes_split() {
        assert_ne!(train_test_split(50, 0.2, 1), train_test_split(50, 0.2, 2));
    }

    #[test]
    fn test_tiny_inputs_keep_both_partitions() {
        let split = train_test_split(2, 0.2, 42);
        assert_eq!((split.train.len(), split.test.len()), (1, 1));
        let single = train_test_split(1, 0.2, 42);
        assert_eq!(single.test.len(), 1);
        assert!(single.train.is_empty());
    }
}
