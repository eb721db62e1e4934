//! California housing table

use crate::error::{PardepError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Feature columns, in matrix order.
pub const FEATURE_NAMES: [&str; 8] = [
    "MedInc",
    "HouseAge",
    "AveRooms",
    "AveBedrms",
    "Population",
    "AveOccup",
    "Latitude",
    "Longitude",
];

/// Target column: median house value in $100k.
pub const TARGET_NAME: &str = "MedHouseVal";

/// In-memory housing dataset: feature matrix plus target vector.
///
/// Rows of `features` and entries of `target` correspond one to one; the
/// constructors enforce that.
#[derive(Debug, Clone)]
pub struct HousingData {
    pub features: Array2<f64>,
    pub target: Array1<f64>,
}

impl HousingData {
    /// Build from parts, checking the row-count invariant.
    pub fn new(features: Array2<f64>, target: Array1<f64>) -> Result<Self> {
        if features.nrows() != target.len() {
            return Err(PardepError::ShapeError {
                expected: format!("target length = {}", features.nrows()),
                actual: format!("target length = {}", target.len()),
            });
        }
        if features.nrows() == 0 {
            return Err(PardepError::DataError("dataset is empty".to_string()));
        }
        Ok(Self { features, target })
    }

    /// Load from a CSV file with the standard column names.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| {
            PardepError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(100))
            .into_reader_with_file_handle(file)
            .finish()?;

        let n = df.height();
        let mut features = Array2::zeros((n, FEATURE_NAMES.len()));
        for (j, name) in FEATURE_NAMES.iter().enumerate() {
            let values = numeric_column(&df, name)?;
            for (i, v) in values.into_iter().enumerate() {
                features[[i, j]] = v;
            }
        }
        let target = Array1::from_vec(numeric_column(&df, TARGET_NAME)?);

        Self::new(features, target)
    }

    /// Conventional cache location for the downloaded table.
    pub fn default_cache_path() -> Option<PathBuf> {
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".cache/pardep/california_housing.csv"))
    }

    /// Index of a named feature.
    pub fn feature_index(name: &str) -> Result<usize> {
        FEATURE_NAMES
            .iter()
            .position(|&f| f == name)
            .ok_or_else(|| PardepError::FeatureNotFound(name.to_string()))
    }

    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    /// Owned feature-name list, in matrix order.
    pub fn feature_names() -> Vec<String> {
        FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
    }
}

fn numeric_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let series = df
        .column(name)
        .map_err(|_| PardepError::FeatureNotFound(name.to_string()))?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    let ca = series.f64().map_err(|e| PardepError::DataError(e.to_string()))?;

    ca.into_iter()
        .enumerate()
        .map(|(i, opt)| {
            opt.ok_or_else(|| {
                PardepError::DataError(format!("null value in column {} at row {}", name, i))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_row_count_invariant() {
        let features = Array2::zeros((3, 8));
        let target = array![1.0, 2.0];
        assert!(HousingData::new(features, target).is_err());
    }

    #[test]
    fn test_empty_rejected() {
        let features = Array2::zeros((0, 8));
        let target = Array1::zeros(0);
        assert!(HousingData::new(features, target).is_err());
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(HousingData::feature_index("MedInc").unwrap(), 0);
        assert_eq!(HousingData::feature_index("Longitude").unwrap(), 7);
        assert!(HousingData::feature_index("NoSuchColumn").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = HousingData::load_csv(Path::new("/nonexistent/housing.csv"));
        assert!(result.is_err());
    }
}
