//! Ready-made custom terms: a broken time trend and an exogenous-data wrapper.

use super::term::{positional_frame, DataKey, DeterministicTerm, TermConfig};
use crate::core::{extend_index, DeterministicFrame, TimeIndex};
use crate::error::{DeterministicError, Result};
use std::fmt;
use std::sync::Arc;

/// A constant and a time trend that switch on at `break_period`.
///
/// Before the break both columns are zero. From the break on, `const_break`
/// is 1 and `trend_break` is the 1-based observation number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrokenTimeTrend {
    break_period: usize,
}

impl BrokenTimeTrend {
    pub fn new(break_period: usize) -> Self {
        Self { break_period }
    }

    pub fn break_period(&self) -> usize {
        self.break_period
    }

    fn generate(&self, index: &TimeIndex, offset: usize) -> Result<DeterministicFrame> {
        let columns = vec!["const_break".to_string(), "trend_break".to_string()];
        positional_frame(index, offset, columns, |c, p| match (c, p >= self.break_period) {
            (_, false) => 0.0,
            (0, true) => 1.0,
            (_, true) => (p + 1) as f64,
        })
    }
}

impl fmt::Display for BrokenTimeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Broken Time Trend (break at {})", self.break_period)
    }
}

impl DeterministicTerm for BrokenTimeTrend {
    fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
        self.generate(index, 0)
    }

    fn out_of_sample(
        &self,
        steps: usize,
        index: &TimeIndex,
        forecast_index: Option<&TimeIndex>,
    ) -> Result<DeterministicFrame> {
        let fcast = extend_index(index, steps, forecast_index)?;
        self.generate(&fcast, index.len())
    }

    fn config(&self) -> TermConfig {
        TermConfig::new("BrokenTimeTrend").with("break_period", self.break_period)
    }
}

/// External data treated as if it were deterministic.
///
/// Rows are looked up by index label, so the data must cover both the
/// in-sample index and every forecast horizon that will be requested.
/// Equality compares the data itself: two terms wrapping equal tables are
/// equal even when the tables are separate allocations.
#[derive(Debug, Clone, PartialEq)]
pub struct ExogenousTerm {
    data: DataKey,
}

impl ExogenousTerm {
    pub fn new(data: DeterministicFrame) -> Result<Self> {
        if data.ncols() == 0 {
            return Err(DeterministicError::InvalidParameter(
                "exogenous data must have at least one column".to_string(),
            ));
        }
        Ok(Self {
            data: DataKey::new(Arc::new(data)),
        })
    }

    pub fn data(&self) -> &DeterministicFrame {
        self.data.data()
    }

    fn lookup(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
        let data = self.data();
        let available = data.nrows();
        let rows = (0..index.len())
            .map(|i| {
                let label = index.label(i)?;
                let pos = data.index().position_of(&label)?;
                if pos >= available {
                    return Err(DeterministicError::RangeError(format!(
                        "label {label} is beyond the end of the exogenous data"
                    )));
                }
                Ok(pos)
            })
            .collect::<Result<Vec<usize>>>()?;
        let values = data
            .values_by_column()
            .iter()
            .map(|column| rows.iter().map(|&r| column[r]).collect())
            .collect();
        DeterministicFrame::new(index.clone(), data.columns().to_vec(), values)
    }
}

impl fmt::Display for ExogenousTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Custom Exog Process {:?}", self.data().columns())
    }
}

impl DeterministicTerm for ExogenousTerm {
    fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
        self.lookup(index)
    }

    fn out_of_sample(
        &self,
        steps: usize,
        index: &TimeIndex,
        forecast_index: Option<&TimeIndex>,
    ) -> Result<DeterministicFrame> {
        let fcast = extend_index(index, steps, forecast_index)?;
        self.lookup(&fcast)
    }

    fn config(&self) -> TermConfig {
        TermConfig::new("ExogenousTerm").with("data", self.data.clone())
    }
}
