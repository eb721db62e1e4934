//! Model explainability
//!
//! Partial dependence plots (PDP) and individual conditional expectation
//! (ICE) over an arbitrary prediction function.

mod pdp;

pub use pdp::{IceResult, PartialDependence, Pdp2dResult, PdpResult};
