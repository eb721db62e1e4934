//! pardep - Partial dependence analysis for tabular regression
//!
//! This crate fits regression models on the California-housing table and
//! visualizes how one or two features drive their predictions:
//! - [`data`] - Dataset loading, synthesis, and splitting
//! - [`preprocessing`] - Feature scaling
//! - [`training`] - Gradient boosting and MLP regressors, metrics
//! - [`explainability`] - Partial dependence and ICE computation
//! - [`plot`] - Curve, heatmap, and 3D-surface rendering to PNG
//!
//! The `pardep` binary runs the whole pipeline end to end.

// Core error handling
pub mod error;

// Data and models
pub mod data;
pub mod preprocessing;
pub mod training;

// Analysis and rendering
pub mod explainability;
pub mod plot;

pub use error::{PardepError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::data::{train_test_split, HousingData, SyntheticConfig, FEATURE_NAMES};
    pub use crate::error::{PardepError, Result};
    pub use crate::explainability::{PartialDependence, Pdp2dResult, PdpResult};
    pub use crate::plot::{save_png, CurvePlot, HeatmapPlot, SurfacePlot};
    pub use crate::preprocessing::{Scaler, ScalerType};
    pub use crate::training::{
        GradientBoostingConfig, GradientBoostingRegressor, MlpConfig, MlpRegressor,
        RegressionMetrics, Regressor,
    };
}
