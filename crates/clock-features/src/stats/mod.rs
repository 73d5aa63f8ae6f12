//! Statistical primitives used by the feature-selection analyses.
//!
//! - [`regression`]: simple linear regression of one variable on another

pub mod regression;

pub use regression::{LinearFit, linregress};
