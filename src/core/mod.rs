//! Core data structures: time indices and generated frames.

mod frame;
mod index;

pub use frame::DeterministicFrame;
pub use index::{extend_index, Frequency, IndexLabel, RangeBound, TimeIndex};
