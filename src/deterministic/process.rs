//! An ordered set of deterministic terms over a fixed index.

use super::seasonal::{Fourier, Seasonality};
use super::term::DeterministicTerm;
use super::trend::TimeTrend;
use crate::core::{extend_index, DeterministicFrame, RangeBound, TimeIndex};
use crate::error::{DeterministicError, Result};
use crate::utils::collinear::{independent_columns, COLLINEAR_TOLERANCE};
use std::sync::Arc;
use tracing::{debug, trace};

/// Deterministic terms bound to an in-sample index.
///
/// The process is immutable once built. Every generation method is a pure
/// read, so a process can be cloned cheaply and shared across threads.
///
/// # Example
///
/// ```
/// use anofox_deterministic::core::TimeIndex;
/// use anofox_deterministic::deterministic::DeterministicProcess;
///
/// let process = DeterministicProcess::builder(TimeIndex::range(100))
///     .constant(true)
///     .order(1)
///     .seasonal(true)
///     .period(5.0)
///     .build()
///     .unwrap();
///
/// let in_sample = process.in_sample().unwrap();
/// assert_eq!(in_sample.nrows(), 100);
/// // const, trend and four seasonal dummies
/// assert_eq!(in_sample.ncols(), 6);
///
/// let forecast = process.out_of_sample(15).unwrap();
/// assert_eq!(forecast.column("trend").unwrap()[0], 101.0);
///
/// let mixed = process.range(190, 210).unwrap();
/// assert_eq!(mixed.nrows(), 21);
/// ```
#[derive(Debug, Clone)]
pub struct DeterministicProcess {
    index: TimeIndex,
    terms: Vec<Arc<dyn DeterministicTerm>>,
    retained: Option<Vec<String>>,
}

impl DeterministicProcess {
    /// Build a process from explicit terms.
    pub fn new(index: TimeIndex, terms: Vec<Arc<dyn DeterministicTerm>>) -> Result<Self> {
        Self::builder(index).additional_terms(terms).build()
    }

    pub fn builder(index: TimeIndex) -> DeterministicProcessBuilder {
        DeterministicProcessBuilder::new(index)
    }

    /// Get the in-sample index.
    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Get the terms in column order.
    pub fn terms(&self) -> &[Arc<dyn DeterministicTerm>] {
        &self.terms
    }

    /// Whether any term contributes a constant.
    pub fn has_constant(&self) -> bool {
        self.terms.iter().any(|t| t.has_constant())
    }

    /// Columns kept after dropping collinear columns, if `drop` was requested
    /// and something was dropped.
    pub fn retained_columns(&self) -> Option<&[String]> {
        self.retained.as_deref()
    }

    /// Names of the generated columns.
    pub fn column_names(&self) -> Result<Vec<String>> {
        Ok(self.in_sample()?.columns().to_vec())
    }

    /// Index of the `steps` entries following the in-sample index.
    pub fn extend_index(&self, steps: usize) -> Result<TimeIndex> {
        extend_index(&self.index, steps, None)
    }

    /// Deterministic values over the in-sample index.
    pub fn in_sample(&self) -> Result<DeterministicFrame> {
        let expected = self.index.len();
        let frames = self
            .terms
            .iter()
            .map(|term| {
                let frame = term.in_sample(&self.index)?;
                check_rows(term.as_ref(), expected, &frame)?;
                Ok(frame)
            })
            .collect::<Result<Vec<_>>>()?;
        self.assemble(self.index.clone(), frames)
    }

    /// Deterministic values for the `steps` observations after the sample.
    pub fn out_of_sample(&self, steps: usize) -> Result<DeterministicFrame> {
        let fcast = extend_index(&self.index, steps, None)?;
        let frames = self
            .terms
            .iter()
            .map(|term| {
                let frame = term.out_of_sample(steps, &self.index, Some(&fcast))?;
                check_rows(term.as_ref(), steps, &frame)?;
                Ok(frame)
            })
            .collect::<Result<Vec<_>>>()?;
        self.assemble(fcast, frames)
    }

    /// Deterministic values for positions `start..=stop`.
    ///
    /// `stop` is included. Bounds may be positions, index labels or text
    /// labels such as `"2025-01"`, and may extend past the end of the sample.
    pub fn range(
        &self,
        start: impl Into<RangeBound>,
        stop: impl Into<RangeBound>,
    ) -> Result<DeterministicFrame> {
        let start = self.index.resolve(&start.into())?;
        let stop = self.index.resolve(&stop.into())?;
        if stop < start {
            return Err(DeterministicError::RangeError(format!(
                "stop ({stop}) precedes start ({start})"
            )));
        }

        let nobs = self.index.len();
        trace!(start, stop, nobs, "resolved deterministic range");
        if stop < nobs {
            return self.in_sample()?.slice_rows(start, stop);
        }

        let fcast = self.out_of_sample(stop - nobs + 1)?;
        if start >= nobs {
            return fcast.slice_rows(start - nobs, stop - nobs);
        }
        self.in_sample()?.slice_rows(start, nobs - 1)?.vstack(fcast)
    }

    /// Concatenate per-term frames, adjusting dummy sets and applying the
    /// retained column set.
    fn assemble(
        &self,
        index: TimeIndex,
        frames: Vec<DeterministicFrame>,
    ) -> Result<DeterministicFrame> {
        // A constant, or a first full set of dummies, spans the intercept;
        // every later dummy set loses its first column.
        let mut intercept_spanned = self.has_constant();
        let frames = self
            .terms
            .iter()
            .zip(frames)
            .map(|(term, frame)| {
                if !term.is_dummy() || frame.ncols() == 0 {
                    return Ok(frame);
                }
                if intercept_spanned {
                    frame.select(&frame.columns()[1..])
                } else {
                    intercept_spanned = true;
                    Ok(frame)
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let frame = DeterministicFrame::hconcat(index, frames)?;
        match &self.retained {
            Some(columns) => frame.select(columns),
            None => Ok(frame),
        }
    }
}

fn check_rows(term: &dyn DeterministicTerm, expected: usize, frame: &DeterministicFrame) -> Result<()> {
    if frame.nrows() != expected {
        return Err(DeterministicError::shape(term.to_string(), expected, frame.nrows()));
    }
    Ok(())
}

/// Builder for [`DeterministicProcess`].
///
/// Built-in terms are added in the order trend, seasonal dummies, Fourier,
/// followed by any additional terms.
#[derive(Debug, Clone)]
pub struct DeterministicProcessBuilder {
    index: TimeIndex,
    constant: bool,
    order: usize,
    seasonal: bool,
    period: Option<f64>,
    fourier: usize,
    additional_terms: Vec<Arc<dyn DeterministicTerm>>,
    drop: bool,
}

impl DeterministicProcessBuilder {
    pub fn new(index: TimeIndex) -> Self {
        Self {
            index,
            constant: false,
            order: 0,
            seasonal: false,
            period: None,
            fourier: 0,
            additional_terms: Vec::new(),
            drop: false,
        }
    }

    /// Include a constant.
    pub fn constant(mut self, constant: bool) -> Self {
        self.constant = constant;
        self
    }

    /// Order of the polynomial time trend (0 for none).
    pub fn order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Include seasonal dummies.
    pub fn seasonal(mut self, seasonal: bool) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Seasonal period. Defaults to the period implied by the index frequency.
    pub fn period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    /// Number of Fourier harmonics (0 for none).
    pub fn fourier(mut self, order: usize) -> Self {
        self.fourier = order;
        self
    }

    /// Append a term after the built-in terms.
    pub fn additional_term<T: DeterministicTerm + 'static>(mut self, term: T) -> Self {
        self.additional_terms.push(Arc::new(term));
        self
    }

    /// Append several terms after the built-in terms.
    pub fn additional_terms(mut self, terms: Vec<Arc<dyn DeterministicTerm>>) -> Self {
        self.additional_terms.extend(terms);
        self
    }

    /// Drop columns that are perfectly collinear with earlier columns.
    pub fn drop(mut self, drop: bool) -> Self {
        self.drop = drop;
        self
    }

    pub fn build(self) -> Result<DeterministicProcess> {
        if self.index.is_empty() {
            return Err(DeterministicError::EmptyIndex);
        }

        let mut terms: Vec<Arc<dyn DeterministicTerm>> = Vec::new();
        if self.constant || self.order > 0 {
            terms.push(Arc::new(TimeTrend::new(self.constant, self.order)?));
        }
        if self.seasonal || self.fourier > 0 {
            let period = self
                .period
                .or_else(|| self.index.seasonal_period().map(|p| p as f64))
                .ok_or_else(|| {
                    DeterministicError::ConfigurationError(
                        "a period is required for seasonal or Fourier terms when the index has no frequency"
                            .to_string(),
                    )
                })?;
            if self.seasonal {
                if period.fract() != 0.0 || period < 2.0 {
                    return Err(DeterministicError::ConfigurationError(format!(
                        "seasonal dummies need an integer period of at least 2, got {period}"
                    )));
                }
                terms.push(Arc::new(Seasonality::new(period as usize)?));
            }
            if self.fourier > 0 {
                terms.push(Arc::new(Fourier::new(period, self.fourier)?));
            }
        }
        for term in self.additional_terms {
            if terms.iter().any(|t| **t == *term) {
                debug!(term = %term, "skipping duplicate deterministic term");
                continue;
            }
            terms.push(term);
        }

        let mut process = DeterministicProcess {
            index: self.index,
            terms,
            retained: None,
        };

        if self.drop {
            let raw = process.in_sample()?;
            let keep = independent_columns(raw.values_by_column(), COLLINEAR_TOLERANCE);
            if keep.len() < raw.ncols() {
                let retained: Vec<String> =
                    keep.iter().map(|&i| raw.columns()[i].clone()).collect();
                debug!(
                    dropped = raw.ncols() - retained.len(),
                    ?retained,
                    "dropping collinear deterministic columns"
                );
                process.retained = Some(retained);
            }
        }

        debug!(
            index = %process.index,
            terms = process.terms.len(),
            "built deterministic process"
        );
        Ok(process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;
    use crate::deterministic::{BrokenTimeTrend, Constant};
    use approx::assert_relative_eq;

    #[derive(Debug)]
    struct ShortTerm;

    impl std::fmt::Display for ShortTerm {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("ShortTerm")
        }
    }

    impl DeterministicTerm for ShortTerm {
        fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
            let short = index.with_len(index.len() - 1);
            DeterministicFrame::new(short.clone(), vec!["x".into()], vec![vec![0.0; short.len()]])
        }

        fn out_of_sample(
            &self,
            steps: usize,
            index: &TimeIndex,
            forecast_index: Option<&TimeIndex>,
        ) -> Result<DeterministicFrame> {
            let fcast = extend_index(index, steps, forecast_index)?;
            DeterministicFrame::new(fcast, vec!["x".into()], vec![vec![0.0; steps]])
        }

        fn config(&self) -> crate::deterministic::TermConfig {
            crate::deterministic::TermConfig::new("ShortTerm")
        }
    }

    #[test]
    fn constant_trend_and_seasonal_columns() {
        let process = DeterministicProcess::builder(TimeIndex::range(100))
            .constant(true)
            .order(1)
            .seasonal(true)
            .period(5.0)
            .build()
            .unwrap();

        let frame = process.in_sample().unwrap();
        assert_eq!(
            frame.columns(),
            &["const", "trend", "s(2,5)", "s(3,5)", "s(4,5)", "s(5,5)"]
        );
        assert_eq!(frame.row(0).unwrap(), vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(frame.row(1).unwrap(), vec![1.0, 2.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn seasonal_without_constant_keeps_all_dummies() {
        let process = DeterministicProcess::builder(TimeIndex::range(12))
            .seasonal(true)
            .period(5.0)
            .build()
            .unwrap();
        let frame = process.in_sample().unwrap();
        assert_eq!(frame.ncols(), 5);
        assert_eq!(frame.column("s(1,5)").unwrap()[0], 1.0);
        assert_eq!(frame.column("s(1,5)").unwrap()[5], 1.0);
    }

    #[test]
    fn second_dummy_set_loses_first_column() {
        let process = DeterministicProcess::builder(TimeIndex::range(20))
            .additional_term(Seasonality::new(4).unwrap())
            .additional_term(Seasonality::new(5).unwrap())
            .build()
            .unwrap();
        let frame = process.in_sample().unwrap();
        assert_eq!(frame.ncols(), 4 + 4);
        assert!(frame.column("s(1,4)").is_some());
        assert!(frame.column("s(1,5)").is_none());
    }

    #[test]
    fn period_defaults_to_index_frequency() {
        let index = TimeIndex::parse_period_range("2020-03", Frequency::Monthly, 60).unwrap();
        let process = DeterministicProcess::builder(index)
            .constant(true)
            .fourier(2)
            .build()
            .unwrap();
        let frame = process.in_sample().unwrap();
        assert_eq!(
            frame.columns(),
            &["const", "sin(1,12)", "cos(1,12)", "sin(2,12)", "cos(2,12)"]
        );
    }

    #[test]
    fn seasonal_without_period_is_configuration_error() {
        let result = DeterministicProcess::builder(TimeIndex::range(10))
            .seasonal(true)
            .build();
        assert!(matches!(result, Err(DeterministicError::ConfigurationError(_))));

        let result = DeterministicProcess::builder(TimeIndex::range(10))
            .seasonal(true)
            .period(7.5)
            .build();
        assert!(matches!(result, Err(DeterministicError::ConfigurationError(_))));
    }

    #[test]
    fn empty_index_is_rejected() {
        let result = DeterministicProcess::builder(TimeIndex::range(0))
            .constant(true)
            .build();
        assert_eq!(result.unwrap_err(), DeterministicError::EmptyIndex);
    }

    #[test]
    fn out_of_sample_follows_sample() {
        let process = DeterministicProcess::builder(TimeIndex::range(100))
            .constant(true)
            .order(1)
            .build()
            .unwrap();
        let frame = process.out_of_sample(15).unwrap();
        assert_eq!(frame.nrows(), 15);
        assert_eq!(frame.index(), &process.extend_index(15).unwrap());
        assert_eq!(frame.column("trend").unwrap()[14], 115.0);
    }

    #[test]
    fn range_spans_in_and_out_of_sample() {
        let process = DeterministicProcess::builder(TimeIndex::range(100))
            .constant(true)
            .order(1)
            .seasonal(true)
            .period(5.0)
            .build()
            .unwrap();

        let mixed = process.range(95, 104).unwrap();
        assert_eq!(mixed.nrows(), 10);
        let trend: Vec<f64> = (96..=105).map(|t| t as f64).collect();
        assert_eq!(mixed.column("trend").unwrap(), trend.as_slice());

        let beyond = process.range(190, 210).unwrap();
        assert_eq!(beyond.nrows(), 21);
        assert_relative_eq!(beyond.column("trend").unwrap()[0], 191.0);

        let inside = process.range(10, 10).unwrap();
        assert_eq!(inside.nrows(), 1);
    }

    #[test]
    fn range_rejects_reversed_bounds() {
        let process = DeterministicProcess::builder(TimeIndex::range(10))
            .constant(true)
            .build()
            .unwrap();
        assert!(matches!(
            process.range(5, 3),
            Err(DeterministicError::RangeError(_))
        ));
    }

    #[test]
    fn short_term_is_shape_mismatch() {
        let process = DeterministicProcess::builder(TimeIndex::range(10))
            .additional_term(ShortTerm)
            .build()
            .unwrap();
        match process.in_sample() {
            Err(DeterministicError::ShapeMismatch {
                context,
                expected,
                got,
            }) => {
                assert_eq!(context, "ShortTerm");
                assert_eq!(expected, 10);
                assert_eq!(got, 9);
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn duplicate_terms_are_skipped() {
        let process = DeterministicProcess::builder(TimeIndex::range(10))
            .constant(true)
            .order(1)
            .additional_term(TimeTrend::new(true, 1).unwrap())
            .additional_term(BrokenTimeTrend::new(5))
            .additional_term(BrokenTimeTrend::new(5))
            .build()
            .unwrap();
        assert_eq!(process.terms().len(), 2);
        assert_eq!(
            process.column_names().unwrap(),
            vec!["const", "trend", "const_break", "trend_break"]
        );
    }

    #[test]
    fn drop_removes_collinear_columns() {
        // The break lies after the sample, so both break columns are zero in sample.
        let process = DeterministicProcess::builder(TimeIndex::range(20))
            .constant(true)
            .order(1)
            .additional_term(BrokenTimeTrend::new(25))
            .drop(true)
            .build()
            .unwrap();

        assert_eq!(
            process.retained_columns().unwrap(),
            &["const".to_string(), "trend".to_string()]
        );
        assert_eq!(process.in_sample().unwrap().ncols(), 2);
        assert_eq!(process.out_of_sample(10).unwrap().ncols(), 2);
    }

    #[test]
    fn drop_removes_break_columns_matching_trend() {
        // A break at 0 repeats const and trend exactly.
        let process = DeterministicProcess::builder(TimeIndex::range(20))
            .constant(true)
            .order(1)
            .additional_term(BrokenTimeTrend::new(0))
            .drop(true)
            .build()
            .unwrap();
        assert_eq!(
            process.retained_columns().unwrap(),
            &["const".to_string(), "trend".to_string()]
        );
    }

    #[test]
    fn drop_removes_nested_seasonal_dummy() {
        // s(4,4) = s(2,2) - s(2,4)
        let process = DeterministicProcess::builder(TimeIndex::range(20))
            .additional_term(Seasonality::new(2).unwrap())
            .additional_term(Seasonality::new(4).unwrap())
            .drop(true)
            .build()
            .unwrap();
        assert_eq!(
            process.retained_columns().unwrap(),
            &["s(1,2)", "s(2,2)", "s(2,4)", "s(3,4)"]
        );
        let oos = process.out_of_sample(8).unwrap();
        assert_eq!(oos.columns(), process.retained_columns().unwrap());
    }

    #[test]
    fn overlapping_constant_columns_collide() {
        let process = DeterministicProcess::builder(TimeIndex::range(5))
            .constant(true)
            .additional_term(Constant)
            .build()
            .unwrap();
        assert!(matches!(
            process.in_sample(),
            Err(DeterministicError::DuplicateColumn(_))
        ));
    }

    #[test]
    fn in_sample_is_idempotent() {
        let process = DeterministicProcess::builder(TimeIndex::range(30))
            .constant(true)
            .order(2)
            .fourier(2)
            .period(7.0)
            .build()
            .unwrap();
        assert_eq!(process.in_sample().unwrap(), process.in_sample().unwrap());
    }
}
