//! Partial Dependence and Individual Conditional Expectation

use crate::error::{PardepError, Result};
use ndarray::{Array1, Array2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of Partial Dependence computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdpResult {
    /// Feature index
    pub feature_index: usize,
    /// Feature name (if provided)
    pub feature_name: Option<String>,
    /// Grid values for the feature
    pub grid_values: Vec<f64>,
    /// Average predictions at each grid point
    pub average_predictions: Vec<f64>,
    /// Standard deviation of predictions at each grid point
    pub std_predictions: Vec<f64>,
}

/// Individual Conditional Expectation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceResult {
    /// Feature index
    pub feature_index: usize,
    /// Feature name (if provided)
    pub feature_name: Option<String>,
    /// Grid values for the feature
    pub grid_values: Vec<f64>,
    /// Individual predictions: shape (n_samples, n_grid_points)
    pub individual_predictions: Vec<Vec<f64>>,
}

impl IceResult {
    /// Reduce ICE curves to the average (PDP) with per-point spread
    pub fn to_pdp(&self) -> PdpResult {
        let n_samples = self.individual_predictions.len();
        let n_grid = self.grid_values.len();

        let mut average = vec![0.0; n_grid];
        let mut std = vec![0.0; n_grid];

        for grid_idx in 0..n_grid {
            let values: Vec<f64> = self
                .individual_predictions
                .iter()
                .map(|pred| pred[grid_idx])
                .collect();

            let mean = values.iter().sum::<f64>() / n_samples as f64;
            average[grid_idx] = mean;

            let variance =
                values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n_samples as f64;
            std[grid_idx] = variance.sqrt();
        }

        PdpResult {
            feature_index: self.feature_index,
            feature_name: self.feature_name.clone(),
            grid_values: self.grid_values.clone(),
            average_predictions: average,
            std_predictions: std,
        }
    }
}

/// Result of 2D Partial Dependence computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pdp2dResult {
    /// Feature indices (feature_1, feature_2)
    pub feature_indices: (usize, usize),
    /// Feature names (if provided)
    pub feature_names: (Option<String>, Option<String>),
    /// Grid values for feature 1
    pub grid_values_1: Vec<f64>,
    /// Grid values for feature 2
    pub grid_values_2: Vec<f64>,
    /// Predictions grid: shape (n_grid_1, n_grid_2)
    pub predictions: Vec<Vec<f64>>,
}

impl Pdp2dResult {
    /// H-statistic style interaction strength: share of surface variance not
    /// explained by the two 1D effects added together. All terms are
    /// mean-centered, so a purely additive surface scores zero.
    pub fn interaction_strength(&self, pdp_1: &PdpResult, pdp_2: &PdpResult) -> f64 {
        let n1 = self.grid_values_1.len();
        let n2 = self.grid_values_2.len();

        let total_mean = self
            .predictions
            .iter()
            .flat_map(|row| row.iter())
            .sum::<f64>()
            / (n1 * n2) as f64;
        let mean_1 = pdp_1.average_predictions.iter().sum::<f64>() / n1 as f64;
        let mean_2 = pdp_2.average_predictions.iter().sum::<f64>() / n2 as f64;

        let mut ss_residual = 0.0;
        let mut ss_total = 0.0;

        for (i, row) in self.predictions.iter().enumerate() {
            for (j, &pred) in row.iter().enumerate() {
                let centered = pred - total_mean;
                let additive = (pdp_1.average_predictions[i] - mean_1)
                    + (pdp_2.average_predictions[j] - mean_2);
                let residual = centered - additive;
                ss_residual += residual.powi(2);
                ss_total += centered.powi(2);
            }
        }

        if ss_total > 0.0 {
            ss_residual / ss_total
        } else {
            0.0
        }
    }
}

/// Partial Dependence calculator over a prediction function
pub struct PartialDependence<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Sync,
{
    /// Prediction function
    predict_fn: F,
    /// Number of grid points per feature
    n_grid_points: usize,
    /// Percentile range for grid
    percentile_range: (f64, f64),
    /// Feature names
    feature_names: Option<Vec<String>>,
    /// Evaluate grid points on the rayon pool
    parallel: bool,
}

impl<F> PartialDependence<F>
where
    F: Fn(&Array2<f64>) -> Result<Array1<f64>> + Sync,
{
    /// Create new PDP calculator
    pub fn new(predict_fn: F) -> Self {
        Self {
            predict_fn,
            n_grid_points: 50,
            percentile_range: (5.0, 95.0),
            feature_names: None,
            parallel: true,
        }
    }

    /// Set number of grid points
    pub fn with_grid_points(mut self, n: usize) -> Self {
        self.n_grid_points = n.max(2);
        self
    }

    /// Set percentile range for grid
    pub fn with_percentile_range(mut self, low: f64, high: f64) -> Self {
        self.percentile_range = (low.clamp(0.0, 100.0), high.clamp(0.0, 100.0));
        self
    }

    /// Set feature names
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        self.feature_names = Some(names);
        self
    }

    /// Hint whether grid evaluation may fan out over the worker pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Compute PDP for a single feature
    pub fn compute(&self, x: &Array2<f64>, feature_index: usize) -> Result<PdpResult> {
        let ice = self.compute_ice(x, feature_index)?;
        Ok(ice.to_pdp())
    }

    /// Compute ICE curves for a single feature
    pub fn compute_ice(&self, x: &Array2<f64>, feature_index: usize) -> Result<IceResult> {
        if feature_index >= x.ncols() {
            return Err(PardepError::ValidationError(format!(
                "Feature index {} out of bounds (n_features={})",
                feature_index,
                x.ncols()
            )));
        }
        if x.nrows() == 0 {
            return Err(PardepError::ValidationError(
                "cannot compute partial dependence on empty data".to_string(),
            ));
        }

        let grid_values = self.create_grid(x, feature_index);
        let n_samples = x.nrows();
        let n_grid = grid_values.len();

        // One prediction batch per grid point; each batch is the full sample
        // set with the target column overwritten.
        let evaluate = |&grid_val: &f64| -> Result<Array1<f64>> {
            let mut x_modified = x.clone();
            for i in 0..n_samples {
                x_modified[[i, feature_index]] = grid_val;
            }
            (self.predict_fn)(&x_modified)
        };

        let per_grid: Vec<Array1<f64>> = if self.parallel {
            grid_values
                .par_iter()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        } else {
            grid_values
                .iter()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        };

        let mut individual_predictions = vec![vec![0.0; n_grid]; n_samples];
        for (grid_idx, predictions) in per_grid.iter().enumerate() {
            for (sample_idx, &pred) in predictions.iter().enumerate() {
                individual_predictions[sample_idx][grid_idx] = pred;
            }
        }

        let feature_name = self
            .feature_names
            .as_ref()
            .and_then(|names| names.get(feature_index).cloned());

        Ok(IceResult {
            feature_index,
            feature_name,
            grid_values,
            individual_predictions,
        })
    }

    /// Compute PDP for multiple features
    pub fn compute_batch(
        &self,
        x: &Array2<f64>,
        feature_indices: &[usize],
    ) -> Result<Vec<PdpResult>> {
        feature_indices
            .iter()
            .map(|&idx| self.compute(x, idx))
            .collect()
    }

    /// Compute 2D PDP for feature interactions
    pub fn compute_2d(
        &self,
        x: &Array2<f64>,
        feature_1: usize,
        feature_2: usize,
    ) -> Result<Pdp2dResult> {
        if feature_1 >= x.ncols() || feature_2 >= x.ncols() {
            return Err(PardepError::ValidationError(format!(
                "Feature index out of bounds (n_features={})",
                x.ncols()
            )));
        }
        if feature_1 == feature_2 {
            return Err(PardepError::ValidationError(
                "2D partial dependence needs two distinct features".to_string(),
            ));
        }
        if x.nrows() == 0 {
            return Err(PardepError::ValidationError(
                "cannot compute partial dependence on empty data".to_string(),
            ));
        }

        let grid_1 = self.create_grid(x, feature_1);
        let grid_2 = self.create_grid(x, feature_2);
        let n_samples = x.nrows();

        // Fan rows of the surface out over the pool; each row walks grid_2.
        let compute_row = |&val_1: &f64| -> Result<Vec<f64>> {
            grid_2
                .iter()
                .map(|&val_2| {
                    let mut x_modified = x.clone();
                    for k in 0..n_samples {
                        x_modified[[k, feature_1]] = val_1;
                        x_modified[[k, feature_2]] = val_2;
                    }
                    let preds = (self.predict_fn)(&x_modified)?;
                    Ok(preds.mean().unwrap_or(0.0))
                })
                .collect()
        };

        let predictions: Vec<Vec<f64>> = if self.parallel {
            grid_1
                .par_iter()
                .map(compute_row)
                .collect::<Result<Vec<_>>>()?
        } else {
            grid_1
                .iter()
                .map(compute_row)
                .collect::<Result<Vec<_>>>()?
        };

        let name_1 = self
            .feature_names
            .as_ref()
            .and_then(|n| n.get(feature_1).cloned());
        let name_2 = self
            .feature_names
            .as_ref()
            .and_then(|n| n.get(feature_2).cloned());

        Ok(Pdp2dResult {
            feature_indices: (feature_1, feature_2),
            feature_names: (name_1, name_2),
            grid_values_1: grid_1,
            grid_values_2: grid_2,
            predictions,
        })
    }

    // Evenly spaced grid between the configured percentiles of the column.
    fn create_grid(&self, x: &Array2<f64>, feature_index: usize) -> Vec<f64> {
        let mut values: Vec<f64> = x.column(feature_index).iter().copied().collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let n = values.len();
        let (low_pct, high_pct) = self.percentile_range;

        let low_idx = ((low_pct / 100.0) * (n - 1) as f64) as usize;
        let high_idx = ((high_pct / 100.0) * (n - 1) as f64) as usize;

        let low_val = values[low_idx];
        let high_val = values[high_idx];

        let step = (high_val - low_val) / (self.n_grid_points - 1) as f64;
        (0..self.n_grid_points)
            .map(|i| low_val + i as f64 * step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdp_linear_model() {
        // y = x0 + 2*x1: PDP over x0 should be linear with slope 1
        let predict_fn = |x: &Array2<f64>| -> Result<Array1<f64>> {
            let preds: Vec<f64> = x
                .rows()
                .into_iter()
                .map(|row| row[0] + 2.0 * row[1])
                .collect();
            Ok(Array1::from_vec(preds))
        };

        let x = Array2::from_shape_vec(
            (10, 2),
            vec![
                0.0, 0.0, 1.0, 0.5, 2.0, 1.0, 3.0, 1.5, 4.0, 2.0, 5.0, 2.5, 6.0, 3.0, 7.0, 3.5,
                8.0, 4.0, 9.0, 4.5,
            ],
        )
        .unwrap();

        let pdp = PartialDependence::new(predict_fn)
            .with_grid_points(10)
            .with_percentile_range(0.0, 100.0);

        let result = pdp.compute(&x, 0).unwrap();

        assert_eq!(result.feature_index, 0);
        assert_eq!(result.grid_values.len(), 10);
        // Difference between consecutive averages must equal the grid step
        let step = result.grid_values[1] - result.grid_values[0];
        for pair in result.average_predictions.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let predict_fn = |x: &Array2<f64>| -> Result<Array1<f64>> {
            let preds: Vec<f64> = x
                .rows()
                .into_iter()
                .map(|row| row[0].sin() + row[1])
                .collect();
            Ok(Array1::from_vec(preds))
        };

        let x = Array2::from_shape_fn((30, 2), |(i, j)| (i * 2 + j) as f64 * 0.3);

        let serial = PartialDependence::new(predict_fn)
            .with_grid_points(15)
            .with_parallel(false)
            .compute(&x, 0)
            .unwrap();
        let parallel = PartialDependence::new(predict_fn)
            .with_grid_points(15)
            .with_parallel(true)
            .compute(&x, 0)
            .unwrap();

        for (a, b) in serial
            .average_predictions
            .iter()
            .zip(parallel.average_predictions.iter())
        {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_ice_shape() {
        let predict_fn =
            |x: &Array2<f64>| -> Result<Array1<f64>> { Ok(x.column(0).to_owned()) };

        let x =
            Array2::from_shape_vec((5, 2), vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0, 4.0, 0.0, 5.0, 0.0])
                .unwrap();

        let pdp = PartialDependence::new(predict_fn).with_grid_points(5);
        let ice = pdp.compute_ice(&x, 0).unwrap();

        assert_eq!(ice.individual_predictions.len(), 5);
        assert_eq!(ice.individual_predictions[0].len(), 5);
    }

    #[test]
    fn test_pdp_2d() {
        let predict_fn = |x: &Array2<f64>| -> Result<Array1<f64>> {
            let preds: Vec<f64> = x.rows().into_iter().map(|row| row[0] * row[1]).collect();
            Ok(Array1::from_vec(preds))
        };

        let x = Array2::from_shape_vec(
            (6, 2),
            vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0, 4.0, 5.0, 5.0, 6.0, 6.0],
        )
        .unwrap();

        let pdp = PartialDependence::new(predict_fn).with_grid_points(5);
        let result = pdp.compute_2d(&x, 0, 1).unwrap();

        assert_eq!(result.predictions.len(), 5);
        assert_eq!(result.predictions[0].len(), 5);
    }

    #[test]
    fn test_multiplicative_interaction_detected() {
        // y = x0 * x1 is pure interaction; y = x0 + x1 has none
        let x = Array2::from_shape_fn((20, 2), |(i, j)| (i + j) as f64 * 0.5);

        let multiplicative = |x: &Array2<f64>| -> Result<Array1<f64>> {
            Ok(x.rows().into_iter().map(|r| r[0] * r[1]).collect())
        };
        let additive = |x: &Array2<f64>| -> Result<Array1<f64>> {
            Ok(x.rows().into_iter().map(|r| r[0] + r[1]).collect())
        };

        let pdp_m = PartialDependence::new(multiplicative).with_grid_points(8);
        let surface = pdp_m.compute_2d(&x, 0, 1).unwrap();
        let h_m = surface.interaction_strength(
            &pdp_m.compute(&x, 0).unwrap(),
            &pdp_m.compute(&x, 1).unwrap(),
        );

        let pdp_a = PartialDependence::new(additive).with_grid_points(8);
        let surface_a = pdp_a.compute_2d(&x, 0, 1).unwrap();
        let h_a = surface_a.interaction_strength(
            &pdp_a.compute(&x, 0).unwrap(),
            &pdp_a.compute(&x, 1).unwrap(),
        );

        assert!(h_m > h_a);
        assert!(h_a < 1e-9, "additive model should show no interaction: {}", h_a);
    }

    #[test]
    fn test_out_of_bounds_feature() {
        let predict_fn =
            |x: &Array2<f64>| -> Result<Array1<f64>> { Ok(x.column(0).to_owned()) };
        let x = Array2::zeros((4, 2));

        let pdp = PartialDependence::new(predict_fn);
        assert!(pdp.compute(&x, 5).is_err());
        assert!(pdp.compute_2d(&x, 0, 5).is_err());
        assert!(pdp.compute_2d(&x, 1, 1).is_err());
    }

    #[test]
    fn test_batch() {
        let predict_fn =
            |x: &Array2<f64>| -> Result<Array1<f64>> { Ok(x.column(0).to_owned()) };
        let x = Array2::from_shape_fn((10, 3), |(i, j)| (i + j) as f64);

        let pdp = PartialDependence::new(predict_fn).with_grid_points(4);
        let results = pdp.compute_batch(&x, &[0, 1, 2]).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1].feature_index, 1);
    }
}
