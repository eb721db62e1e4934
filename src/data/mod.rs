//! Dataset loading and splitting
//!
//! Provides the California-housing table (CSV via polars, or a seeded
//! synthetic stand-in with the same schema) and train/test splitting.

mod housing;
mod split;
mod synthetic;

pub use housing::{HousingData, FEATURE_NAMES, TARGET_NAME};
pub use split::{train_test_split, TrainTestSplit};
pub use synthetic::SyntheticConfig;
