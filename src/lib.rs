//! # anofox-deterministic
//!
//! Deterministic terms for time series models.
//!
//! Provides constants, polynomial time trends, seasonal dummies and Fourier
//! harmonics over integer, calendar-period and datetime indices, aligned to
//! the in-sample index and to any out-of-sample extension. Custom terms plug
//! in through the [`deterministic::DeterministicTerm`] trait, and
//! [`models::AutoRegDesign`] assembles the regressors of an autoregression.

pub mod core;
pub mod deterministic;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{DeterministicError, Result};

pub mod prelude {
    pub use crate::core::{DeterministicFrame, Frequency, RangeBound, TimeIndex};
    pub use crate::deterministic::{
        Constant, DeterministicProcess, DeterministicTerm, Fourier, Seasonality, TimeTrend,
    };
    pub use crate::error::{DeterministicError, Result};
    pub use crate::models::{AutoRegDesign, AutoRegSpec, Trend};
}
