//! Seasonal dummies and Fourier harmonics.

use super::term::{positional_frame, DeterministicTerm, TermConfig};
use crate::core::{extend_index, DeterministicFrame, TimeIndex};
use crate::error::{DeterministicError, Result};
use std::f64::consts::PI;
use std::fmt;

/// One indicator column per phase of a seasonal cycle.
///
/// Column `s(i,period)` is 1 when the observation is in phase `i`. The first
/// observation is in phase `initial_period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seasonality {
    period: usize,
    initial_period: usize,
}

impl Seasonality {
    pub fn new(period: usize) -> Result<Self> {
        Self::with_initial_period(period, 1)
    }

    /// Seasonal dummies whose first observation falls in `initial_period` (1-based).
    pub fn with_initial_period(period: usize, initial_period: usize) -> Result<Self> {
        if period < 2 {
            return Err(DeterministicError::InvalidParameter(format!(
                "seasonal period must be at least 2, got {period}"
            )));
        }
        if !(1..=period).contains(&initial_period) {
            return Err(DeterministicError::InvalidParameter(format!(
                "initial_period must be between 1 and {period}, got {initial_period}"
            )));
        }
        Ok(Self {
            period,
            initial_period,
        })
    }

    pub fn period(&self) -> usize {
        self.period
    }

    pub fn initial_period(&self) -> usize {
        self.initial_period
    }

    /// Zero-based phase of an absolute position.
    pub fn phase(&self, position: usize) -> usize {
        (position + self.initial_period - 1) % self.period
    }

    pub fn column_names(&self) -> Vec<String> {
        (1..=self.period)
            .map(|i| format!("s({i},{})", self.period))
            .collect()
    }

    fn generate(&self, index: &TimeIndex, offset: usize) -> Result<DeterministicFrame> {
        positional_frame(index, offset, self.column_names(), |c, p| {
            if self.phase(p) == c {
                1.0
            } else {
                0.0
            }
        })
    }
}

impl fmt::Display for Seasonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config().fmt(f)
    }
}

impl DeterministicTerm for Seasonality {
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
        TermConfig::new("Seasonality")
            .with("period", self.period)
            .with("initial_period", self.initial_period)
    }

    fn is_dummy(&self) -> bool {
        true
    }
}

/// Sine/cosine pairs at the first `order` harmonics of `period`.
///
/// The period may be fractional, e.g. 365.25 for an annual cycle in daily data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fourier {
    period: f64,
    order: usize,
}

impl Fourier {
    pub fn new(period: f64, order: usize) -> Result<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(DeterministicError::InvalidParameter(format!(
                "Fourier period must be positive, got {period}"
            )));
        }
        if order == 0 {
            return Err(DeterministicError::InvalidParameter(
                "Fourier order must be at least 1".to_string(),
            ));
        }
        if 2.0 * order as f64 > period {
            return Err(DeterministicError::InvalidParameter(format!(
                "2 * order ({}) must not exceed the period ({period})",
                2 * order
            )));
        }
        Ok(Self { period, order })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn column_names(&self) -> Vec<String> {
        (1..=self.order)
            .flat_map(|k| {
                [
                    format!("sin({k},{})", self.period),
                    format!("cos({k},{})", self.period),
                ]
            })
            .collect()
    }

    fn generate(&self, index: &TimeIndex, offset: usize) -> Result<DeterministicFrame> {
        positional_frame(index, offset, self.column_names(), |c, p| {
            let k = (c / 2 + 1) as f64;
            let angle = 2.0 * PI * k * p as f64 / self.period;
            if c % 2 == 0 {
                angle.sin()
            } else {
                angle.cos()
            }
        })
    }
}

impl fmt::Display for Fourier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.config().fmt(f)
    }
}

impl DeterministicTerm for Fourier {
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
        TermConfig::new("Fourier")
            .with("period", self.period)
            .with("order", self.order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn seasonal_dummies_repeat_with_period() {
        let seas = Seasonality::new(5).unwrap();
        let frame = seas.in_sample(&TimeIndex::range(12)).unwrap();

        assert_eq!(frame.ncols(), 5);
        assert_eq!(frame.columns()[0], "s(1,5)");
        assert_eq!(frame.row(0).unwrap(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(frame.row(5).unwrap(), vec![1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(frame.row(7).unwrap(), vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        for row in frame.to_rows() {
            assert_relative_eq!(row.iter().sum::<f64>(), 1.0);
        }
    }

    #[test]
    fn seasonal_phase_continues_out_of_sample() {
        let seas = Seasonality::new(4).unwrap();
        let frame = seas.out_of_sample(3, &TimeIndex::range(10), None).unwrap();
        // Positions 10, 11, 12 are phases 2, 3, 0.
        assert_eq!(frame.row(0).unwrap(), vec![0.0, 0.0, 1.0, 0.0]);
        assert_eq!(frame.row(2).unwrap(), vec![1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn initial_period_shifts_phase() {
        let seas = Seasonality::with_initial_period(7, 3).unwrap();
        let frame = seas.in_sample(&TimeIndex::range(2)).unwrap();
        assert_eq!(frame.column("s(3,7)").unwrap(), &[1.0, 0.0]);
        assert_eq!(frame.column("s(4,7)").unwrap(), &[0.0, 1.0]);
        assert!(Seasonality::with_initial_period(7, 8).is_err());
        assert!(Seasonality::new(1).is_err());
    }

    #[test]
    fn fourier_repeats_every_period() {
        let four = Fourier::new(4.0, 1).unwrap();
        let frame = four.in_sample(&TimeIndex::range(8)).unwrap();

        assert_eq!(frame.columns(), &["sin(1,4)", "cos(1,4)"]);
        let sin = frame.column("sin(1,4)").unwrap();
        let cos = frame.column("cos(1,4)").unwrap();
        for i in 0..4 {
            assert_relative_eq!(sin[i], sin[i + 4], epsilon = 1e-12);
            assert_relative_eq!(cos[i], cos[i + 4], epsilon = 1e-12);
        }
        assert_relative_eq!(sin[1], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cos[0], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn fourier_columns_interleave_harmonics() {
        let four = Fourier::new(365.25, 2).unwrap();
        assert_eq!(
            four.column_names(),
            vec!["sin(1,365.25)", "cos(1,365.25)", "sin(2,365.25)", "cos(2,365.25)"]
        );
    }

    #[test]
    fn fourier_out_of_sample_matches_longer_in_sample() {
        let four = Fourier::new(12.0, 3).unwrap();
        let long = four.in_sample(&TimeIndex::range(30)).unwrap();
        let oos = four.out_of_sample(10, &TimeIndex::range(20), None).unwrap();
        for c in 0..6 {
            for i in 0..10 {
                assert_relative_eq!(
                    oos.values_by_column()[c][i],
                    long.values_by_column()[c][20 + i],
                    epsilon = 1e-9
                );
            }
        }
    }

    #[test]
    fn fourier_validates_order_against_period() {
        assert!(Fourier::new(4.0, 3).is_err());
        assert!(Fourier::new(0.0, 1).is_err());
        assert!(Fourier::new(f64::NAN, 1).is_err());
        assert!(Fourier::new(12.0, 0).is_err());
    }
}
