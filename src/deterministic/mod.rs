//! Deterministic terms and the process that combines them.
//!
//! Built-in terms cover constants, polynomial trends, seasonal dummies and
//! Fourier harmonics. Custom terms implement [`DeterministicTerm`] and are
//! added to a [`DeterministicProcess`] alongside the built-ins.

mod custom;
mod process;
mod seasonal;
mod term;
mod trend;

pub use custom::{BrokenTimeTrend, ExogenousTerm};
pub use process::{DeterministicProcess, DeterministicProcessBuilder};
pub use seasonal::{Fourier, Seasonality};
pub use term::{ConfigValue, DataKey, DeterministicTerm, TermConfig};
pub use trend::{Constant, TimeTrend};
