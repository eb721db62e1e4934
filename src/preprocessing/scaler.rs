//! Feature scaling implementations

use crate::error::{PardepError, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Type of scaler to use
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalerType {
    /// Standard scaling (z-score normalization): (x - mean) / std
    Standard,
    /// Min-Max scaling: (x - min) / (max - min)
    MinMax,
    /// Robust scaling using median and IQR
    Robust,
    /// No scaling
    None,
}

/// Parameters for one fitted column
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    center: f64, // mean, min, or median
    scale: f64,  // std, range, or IQR
}

/// Per-column feature scaler over a sample matrix
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    scaler_type: ScalerType,
    params: Vec<ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    /// Create a new scaler
    pub fn new(scaler_type: ScalerType) -> Self {
        Self {
            scaler_type,
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the data
    pub fn fit(&mut self, x: &Array2<f64>) -> Result<&mut Self> {
        if x.nrows() == 0 {
            return Err(PardepError::ValidationError(
                "cannot fit scaler on empty data".to_string(),
            ));
        }

        self.params = (0..x.ncols())
            .map(|j| {
                let column: Vec<f64> = x.column(j).iter().copied().collect();
                self.compute_params(&column)
            })
            .collect();
        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_fitted(x)?;
        let mut out = x.clone();
        for (j, params) in self.params.iter().enumerate() {
            let mut column = out.column_mut(j);
            column.mapv_inplace(|v| (v - params.center) / params.scale);
        }
        Ok(out)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Inverse transform the data
    pub fn inverse_transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        self.check_fitted(x)?;
        let mut out = x.clone();
        for (j, params) in self.params.iter().enumerate() {
            let mut column = out.column_mut(j);
            column.mapv_inplace(|v| v * params.scale + params.center);
        }
        Ok(out)
    }

    fn check_fitted(&self, x: &Array2<f64>) -> Result<()> {
        if !self.is_fitted {
            return Err(PardepError::ModelNotFitted);
        }
        if x.ncols() != self.params.len() {
            return Err(PardepError::ShapeError {
                expected: format!("{} columns", self.params.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(())
    }

    fn compute_params(&self, column: &[f64]) -> ScalerParams {
        match self.scaler_type {
            ScalerType::Standard => {
                let n = column.len() as f64;
                let mean = column.iter().sum::<f64>() / n;
                let var = column.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                ScalerParams {
                    center: mean,
                    scale: if std == 0.0 { 1.0 } else { std },
                }
            }
            ScalerType::MinMax => {
                let min = column.iter().copied().fold(f64::INFINITY, f64::min);
                let max = column.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let range = max - min;
                ScalerParams {
                    center: min,
                    scale: if range == 0.0 { 1.0 } else { range },
                }
            }
            ScalerType::Robust => {
                let mut sorted = column.to_vec();
                sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                let median = percentile(&sorted, 50.0);
                let iqr = percentile(&sorted, 75.0) - percentile(&sorted, 25.0);
                ScalerParams {
                    center: median,
                    scale: if iqr == 0.0 { 1.0 } else { iqr },
                }
            }
            ScalerType::None => ScalerParams {
                center: 0.0,
                scale: 1.0,
            },
        }
    }
}

// Linear-interpolated percentile over a sorted slice.
fn percentile(sorted: &[f64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (pct / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        let frac = pos - lo as f64;
        sorted[lo] * (1.0 - frac) + sorted[hi] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let x = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0], [4.0, 40.0], [5.0, 50.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();

        for j in 0..2 {
            let mean: f64 = scaled.column(j).iter().sum::<f64>() / 5.0;
            assert!(mean.abs() < 1e-10); // Mean should be ~0
        }
    }

    #[test]
    fn test_minmax_scaler() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let mut scaler = Scaler::new(ScalerType::MinMax);
        let scaled = scaler.fit_transform(&x).unwrap();

        let min = scaled.column(0).iter().copied().fold(f64::INFINITY, f64::min);
        let max = scaled.column(0).iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!((min - 0.0).abs() < 1e-10);
        assert!((max - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_inverse_transform() {
        let x = array![[1.0, 7.0], [2.0, 5.0], [3.0, 3.0], [4.0, 1.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();
        let restored = scaler.inverse_transform(&scaled).unwrap();

        for (o, r) in x.iter().zip(restored.iter()) {
            assert!((o - r).abs() < 1e-10);
        }
    }

    #[test]
    fn test_constant_column() {
        let x = array![[2.0], [2.0], [2.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        let scaled = scaler.fit_transform(&x).unwrap();
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unfitted_rejected() {
        let x = array![[1.0], [2.0]];
        let scaler = Scaler::new(ScalerType::Standard);
        assert!(matches!(
            scaler.transform(&x),
            Err(PardepError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_column_mismatch_rejected() {
        let x = array![[1.0, 2.0], [3.0, 4.0]];
        let mut scaler = Scaler::new(ScalerType::Standard);
        scaler.fit(&x).unwrap();
        let narrow = array![[1.0], [2.0]];
        assert!(scaler.transform(&narrow).is_err());
    }
}
