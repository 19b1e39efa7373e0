//! Numerical utilities.

pub mod collinear;

pub use collinear::{independent_columns, COLLINEAR_TOLERANCE};
