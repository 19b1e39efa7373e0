//! Constant and polynomial time trend terms.

use super::term::{positional_frame, DeterministicTerm, TermConfig};
use crate::core::{extend_index, DeterministicFrame, TimeIndex};
use crate::error::{DeterministicError, Result};
use std::fmt;

/// A single column of ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constant;

impl Constant {
    pub fn new() -> Self {
        Self
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Constant")
    }
}

impl DeterministicTerm for Constant {
    fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
        positional_frame(index, 0, vec!["const".to_string()], |_, _| 1.0)
    }

    fn out_of_sample(
        &self,
        steps: usize,
        index: &TimeIndex,
        forecast_index: Option<&TimeIndex>,
    ) -> Result<DeterministicFrame> {
        let fcast = extend_index(index, steps, forecast_index)?;
        positional_frame(&fcast, index.len(), vec!["const".to_string()], |_, _| 1.0)
    }

    fn config(&self) -> TermConfig {
        TermConfig::new("Constant")
    }

    fn has_constant(&self) -> bool {
        true
    }
}

/// Polynomial time trend `1, t, t^2, ..., t^order`.
///
/// `t` is 1 at the first in-sample observation and keeps counting through
/// any out-of-sample extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeTrend {
    constant: bool,
    order: usize,
}

impl TimeTrend {
    /// Create a time trend. At least one of `constant` or `order > 0` is required.
    pub fn new(constant: bool, order: usize) -> Result<Self> {
        if !constant && order == 0 {
            return Err(DeterministicError::InvalidParameter(
                "a time trend needs a constant or a positive order".to_string(),
            ));
        }
        Ok(Self { constant, order })
    }

    /// Parse a trend code: `c`, `t`, `ct` or `ctt`.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "c" => Self::new(true, 0),
            "t" => Self::new(false, 1),
            "ct" => Self::new(true, 1),
            "ctt" => Self::new(true, 2),
            other => Err(DeterministicError::InvalidParameter(format!(
                "unknown trend code '{other}'"
            ))),
        }
    }

    pub fn constant(&self) -> bool {
        self.constant
    }

    pub fn order(&self) -> usize {
        self.order
    }

    /// Column names in generation order.
    pub fn column_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.order + 1);
        if self.constant {
            names.push("const".to_string());
        }
        for power in 1..=self.order {
            names.push(match power {
                1 => "trend".to_string(),
                2 => "trend_squared".to_string(),
                p => format!("trend**{p}"),
            });
        }
        names
    }

    fn generate(&self, index: &TimeIndex, offset: usize) -> Result<DeterministicFrame> {
        let shift = usize::from(!self.constant);
        positional_frame(index, offset, self.column_names(), |c, p| {
            let t = (p + 1) as f64;
            t.powi((c + shift) as i32)
        })
    }
}

impl fmt::Display for TimeTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config().fmt(f)
    }
}

impl DeterministicTerm for TimeTrend {
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
        TermConfig::new("TimeTrend")
            .with("constant", self.constant)
            .with("order", self.order)
    }

    fn has_constant(&self) -> bool {
        self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linear_trend_with_constant() {
        let tt = TimeTrend::new(true, 1).unwrap();
        let frame = tt.in_sample(&TimeIndex::range(5)).unwrap();

        assert_eq!(frame.columns(), &["const", "trend"]);
        assert_eq!(frame.column("const").unwrap(), &[1.0; 5]);
        assert_eq!(frame.column("trend").unwrap(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn higher_order_column_names() {
        let tt = TimeTrend::new(false, 3).unwrap();
        assert_eq!(tt.column_names(), vec!["trend", "trend_squared", "trend**3"]);

        let frame = tt.in_sample(&TimeIndex::range(3)).unwrap();
        assert_relative_eq!(frame.column("trend**3").unwrap()[2], 27.0);
        assert_relative_eq!(frame.column("trend_squared").unwrap()[1], 4.0);
    }

    #[test]
    fn trend_continues_out_of_sample() {
        let tt = TimeTrend::new(true, 2).unwrap();
        let index = TimeIndex::range(10);
        let frame = tt.out_of_sample(3, &index, None).unwrap();

        assert_eq!(frame.nrows(), 3);
        assert_eq!(frame.column("trend").unwrap(), &[11.0, 12.0, 13.0]);
        assert_eq!(frame.column("trend_squared").unwrap(), &[121.0, 144.0, 169.0]);
        assert_eq!(frame.index(), &TimeIndex::range_with_step(10, 1, 3).unwrap());
    }

    #[test]
    fn trend_requires_constant_or_order() {
        assert!(matches!(
            TimeTrend::new(false, 0),
            Err(DeterministicError::InvalidParameter(_))
        ));
    }

    #[test]
    fn trend_codes_parse() {
        assert_eq!(TimeTrend::from_code("ct").unwrap(), TimeTrend::new(true, 1).unwrap());
        assert_eq!(TimeTrend::from_code("ctt").unwrap().order(), 2);
        assert!(TimeTrend::from_code("n").is_err());
    }

    #[test]
    fn constant_out_of_sample_is_ones() {
        let frame = Constant
            .out_of_sample(4, &TimeIndex::range(2), None)
            .unwrap();
        assert_eq!(frame.column("const").unwrap(), &[1.0; 4]);
        assert!(Constant.has_constant());
    }

    #[test]
    fn equality_is_by_configuration() {
        let a: Box<dyn DeterministicTerm> = Box::new(TimeTrend::new(true, 1).unwrap());
        let b: Box<dyn DeterministicTerm> = Box::new(TimeTrend::new(true, 1).unwrap());
        let c: Box<dyn DeterministicTerm> = Box::new(TimeTrend::new(true, 2).unwrap());
        assert!(*a == *b);
        assert!(*a != *c);
        assert_eq!(a.to_string(), "TimeTrend(constant=true, order=1)");
    }
}
