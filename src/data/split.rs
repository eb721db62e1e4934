//! Train/test splitting

use crate::error::{PardepError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// A single holdout split
#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

/// Shuffled holdout split with a seeded RNG.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &Array1<f64>,
    test_ratio: f64,
    random_state: Option<u64>,
) -> Result<TrainTestSplit> {
    if x.nrows() != y.len() {
        return Err(PardepError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if !(0.0..1.0).contains(&test_ratio) || test_ratio == 0.0 {
        return Err(PardepError::ValidationError(format!(
            "test_ratio must be in (0, 1), got {}",
            test_ratio
        )));
    }

    let n = x.nrows();
    let n_test = ((n as f64) * test_ratio).round() as usize;
    if n_test == 0 || n_test >= n {
        return Err(PardepError::ValidationError(format!(
            "split of {} samples at ratio {} leaves an empty side",
            n, test_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match random_state {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    };
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(TrainTestSplit {
        x_train: x.select(Axis(0), train_idx),
        y_train: Array1::from_vec(train_idx.iter().map(|&i| y[i]).collect()),
        x_test: x.select(Axis(0), test_idx),
        y_test: Array1::from_vec(test_idx.iter().map(|&i| y[i]).collect()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64);
        let y = Array1::from_shape_fn(n, |i| i as f64);
        (x, y)
    }

    #[test]
    fn test_split_sizes() {
        let (x, y) = data(100);
        let split = train_test_split(&x, &y, 0.2, Some(0)).unwrap();
        assert_eq!(split.x_test.nrows(), 20);
        assert_eq!(split.x_train.nrows(), 80);
        assert_eq!(split.y_test.len(), 20);
        assert_eq!(split.y_train.len(), 80);
    }

    #[test]
    fn test_rows_stay_aligned() {
        let (x, y) = data(50);
        let split = train_test_split(&x, &y, 0.3, Some(1)).unwrap();
        // y was the row index; every row must still carry its own label
        for (row, &label) in split.x_train.rows().into_iter().zip(split.y_train.iter()) {
            assert_eq!(row[0], label * 3.0);
        }
    }

    #[test]
    fn test_seed_reproducible() {
        let (x, y) = data(40);
        let a = train_test_split(&x, &y, 0.25, Some(9)).unwrap();
        let b = train_test_split(&x, &y, 0.25, Some(9)).unwrap();
        assert_eq!(a.y_test, b.y_test);
    }

    #[test]
    fn test_bad_ratio_rejected() {
        let (x, y) = data(10);
        assert!(train_test_split(&x, &y, 0.0, None).is_err());
        assert!(train_test_split(&x, &y, 1.0, None).is_err());
    }
}
