use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::data_handling::Dataset;

/// Row indices for one cross-validation round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

/// Stratified K-fold splitter with seeded shuffling.
///
/// Each class is shuffled and dealt round-robin over the folds. The starting
/// fold carries over from one class to the next, so total fold sizes differ by
/// at most one even when every class is smaller than `n_splits`.
#[derive(Debug, Clone)]
pub struct StratifiedKFold {
    n_splits: usize,
    seed: u64,
}

impl StratifiedKFold {
    pub fn new(n_splits: usize, seed: u64) -> Self {
        StratifiedKFold { n_splits, seed }
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate folds over `data`.
    ///
    /// With `n_splits <= 1` a single fold is returned whose training and
    /// validation sets are both every row. `n_splits` larger than the number
    /// of rows is clamped to the number of rows.
    pub fn split(&self, data: &Dataset) -> Vec<Fold> {
        let n_samples = data.n_samples();
        if n_samples == 0 {
            return Vec::new();
        }

        if self.n_splits <= 1 {
            let all: Vec<usize> = (0..n_samples).collect();
            return vec![Fold {
                train: all.clone(),
                validation: all,
            }];
        }

        let n_splits = if self.n_splits > n_samples {
            log::warn!(
                "Requested {} folds but only {} training rows; using {} folds",
                self.n_splits,
                n_samples,
                n_samples
            );
            n_samples
        } else {
            self.n_splits
        };

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut assignment = vec![0usize; n_samples];
        let mut offset = 0usize;

        for mut indices in data.class_indices() {
            indices.shuffle(&mut rng);
            for (i, &row) in indices.iter().enumerate() {
                assignment[row] = (offset + i) % n_splits;
            }
            offset = (offset + indices.len()) % n_splits;
        }

        (0..n_splits)
            .map(|fold| {
                let (validation, train): (Vec<usize>, Vec<usize>) =
                    (0..n_samples).partition(|&row| assignment[row] == fold);
                Fold { train, validation }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labelled(labels: &[&str]) -> Dataset {
        let rows: Vec<Vec<f64>> = (0..labels.len()).map(|i| vec![i as f64]).collect();
        Dataset::from_rows(&rows, labels, vec!["f".to_string()]).unwrap()
    }

    #[test]
    fn folds_partition_rows_and_stay_balanced() {
        let data = labelled(&["a", "a", "a", "a", "a", "b", "b", "b", "c", "c"]);
        let folds = StratifiedKFold::new(3, 7).split(&data);
        assert_eq!(folds.len(), 3);

        let mut seen: Vec<usize> = folds.iter().flat_map(|f| f.validation.clone()).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());

        let sizes: Vec<usize> = folds.iter().map(|f| f.validation.len()).collect();
        let max = *sizes.iter().max().unwrap();
        let min = *sizes.iter().min().unwrap();
        assert!(max - min <= 1, "fold sizes {:?}", sizes);

        for fold in &folds {
            assert_eq!(fold.train.len() + fold.validation.len(), 10);
            assert!(fold.train.iter().all(|r| !fold.validation.contains(r)));
        }
    }

    #[test]
    fn same_seed_same_folds() {
        let data = labelled(&["x", "y", "x", "y", "x", "y", "x", "y"]);
        let a = StratifiedKFold::new(4, 11).split(&data);
        let b = StratifiedKFold::new(4, 11).split(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn single_fold_is_resubstitution() {
        let data = labelled(&["x", "y", "z"]);
        let folds = StratifiedKFold::new(1, 0).split(&data);
        assert_eq!(folds.len(), 1);
        assert_eq!(folds[0].train, vec![0, 1, 2]);
        assert_eq!(folds[0].validation, vec![0, 1, 2]);
    }

    #[test]
    fn too_many_folds_are_clamped() {
        let data = labelled(&["x", "y", "x"]);
        let folds = StratifiedKFold::new(10, 0).split(&data);
        assert_eq!(folds.len(), 3);
        assert!(folds.iter().all(|f| f.validation.len() == 1));
    }
}
