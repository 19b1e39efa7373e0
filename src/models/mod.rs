//! Model-side consumers of deterministic processes.

mod autoreg;

pub use autoreg::{AutoRegDesign, AutoRegSpec, Trend};
