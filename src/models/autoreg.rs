//! Regressor assembly for autoregressive models.
//!
//! An autoregression regresses `y_t` on deterministic terms, its own lags
//! `y_{t-1}, ..., y_{t-p}` and optional exogenous regressors. This module
//! validates the model options and builds the aligned regressor matrix; the
//! estimation itself is left to the caller.

use crate::core::{DeterministicFrame, RangeBound, TimeIndex};
use crate::deterministic::DeterministicProcess;
use crate::error::{DeterministicError, Result};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Built-in trend specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    /// No deterministic trend (`n`).
    None,
    /// Constant only (`c`).
    #[default]
    Constant,
    /// Time trend without a constant (`t`).
    Trend,
    /// Constant and time trend (`ct`).
    ConstantTrend,
}

impl Trend {
    pub fn code(&self) -> &'static str {
        match self {
            Trend::None => "n",
            Trend::Constant => "c",
            Trend::Trend => "t",
            Trend::ConstantTrend => "ct",
        }
    }

    pub fn has_constant(&self) -> bool {
        matches!(self, Trend::Constant | Trend::ConstantTrend)
    }

    pub fn order(&self) -> usize {
        match self {
            Trend::Trend | Trend::ConstantTrend => 1,
            Trend::None | Trend::Constant => 0,
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Trend {
    type Err = DeterministicError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "n" => Ok(Trend::None),
            "c" => Ok(Trend::Constant),
            "t" => Ok(Trend::Trend),
            "ct" => Ok(Trend::ConstantTrend),
            other => Err(DeterministicError::InvalidParameter(format!(
                "unknown trend '{other}', expected one of n, c, t, ct"
            ))),
        }
    }
}

/// Options of an autoregressive model.
///
/// A custom deterministic process replaces the built-in trend and seasonal
/// options, so it can only be combined with `Trend::None` and no seasonal
/// dummies.
#[derive(Debug, Clone)]
pub struct AutoRegSpec {
    lags: Vec<usize>,
    trend: Trend,
    seasonal: bool,
    period: Option<usize>,
    deterministic: Option<DeterministicProcess>,
    exog: Option<DeterministicFrame>,
}

impl AutoRegSpec {
    /// Model with lags `1..=lags` and a constant.
    pub fn new(lags: usize) -> Self {
        Self::with_lags((1..=lags).collect())
    }

    /// Model with an explicit set of lags.
    pub fn with_lags(mut lags: Vec<usize>) -> Self {
        lags.sort_unstable();
        lags.dedup();
        Self {
            lags,
            trend: Trend::default(),
            seasonal: false,
            period: None,
            deterministic: None,
            exog: None,
        }
    }

    pub fn trend(mut self, trend: Trend) -> Self {
        self.trend = trend;
        self
    }

    /// Include seasonal dummies.
    pub fn seasonal(mut self, seasonal: bool) -> Self {
        self.seasonal = seasonal;
        self
    }

    /// Seasonal period. Defaults to the period implied by the index frequency.
    pub fn period(mut self, period: usize) -> Self {
        self.period = Some(period);
        self
    }

    /// Use a custom deterministic process for all deterministic terms.
    pub fn deterministic(mut self, process: DeterministicProcess) -> Self {
        self.deterministic = Some(process);
        self
    }

    /// Exogenous regressors, one row per observation.
    pub fn exog(mut self, exog: DeterministicFrame) -> Self {
        self.exog = Some(exog);
        self
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    /// Check option combinations that do not depend on the data.
    pub fn validate(&self) -> Result<()> {
        if self.lags.first() == Some(&0) {
            return Err(DeterministicError::InvalidParameter(
                "lags must be positive".to_string(),
            ));
        }
        if self.deterministic.is_some() && (self.trend != Trend::None || self.seasonal) {
            return Err(DeterministicError::ConfigurationError(format!(
                "a custom deterministic process requires trend 'n' and no seasonal dummies, got trend '{}' and seasonal={}",
                self.trend, self.seasonal
            )));
        }
        if let Some(period) = self.period {
            if self.seasonal && period < 2 {
                return Err(DeterministicError::ConfigurationError(format!(
                    "seasonal period must be at least 2, got {period}"
                )));
            }
        }
        Ok(())
    }
}

/// Aligned endogenous values and regressors of an autoregression.
///
/// The first `hold_back` observations (the largest lag) are dropped so that
/// every row has all of its lags.
#[derive(Debug, Clone)]
pub struct AutoRegDesign {
    lags: Vec<usize>,
    trend: Trend,
    hold_back: usize,
    process: DeterministicProcess,
    endog: Vec<f64>,
    regressors: DeterministicFrame,
}

impl AutoRegDesign {
    pub fn new(endog: &[f64], index: TimeIndex, spec: AutoRegSpec) -> Result<Self> {
        spec.validate()?;
        if index.is_empty() {
            return Err(DeterministicError::EmptyIndex);
        }
        if endog.len() != index.len() {
            return Err(DeterministicError::shape("endog", index.len(), endog.len()));
        }

        let process = match spec.deterministic {
            Some(process) => {
                if process.index() != &index {
                    return Err(DeterministicError::ConfigurationError(format!(
                        "deterministic process index {} does not match data index {index}",
                        process.index()
                    )));
                }
                process
            }
            None => {
                let mut builder = DeterministicProcess::builder(index.clone())
                    .constant(spec.trend.has_constant())
                    .order(spec.trend.order());
                if spec.seasonal {
                    let period = spec.period.or_else(|| index.seasonal_period()).ok_or_else(|| {
                        DeterministicError::ConfigurationError(
                            "seasonal dummies need a period when the index has no frequency"
                                .to_string(),
                        )
                    })?;
                    builder = builder.seasonal(true).period(period as f64);
                }
                builder.build()?
            }
        };

        let nobs = endog.len();
        let hold_back = spec.lags.last().copied().unwrap_or(0);
        if nobs <= hold_back {
            return Err(DeterministicError::InsufficientData {
                needed: hold_back + 1,
                got: nobs,
            });
        }

        let sample = index.slice(hold_back, nobs - 1)?;
        let mut blocks = vec![process.in_sample()?.slice_rows(hold_back, nobs - 1)?];

        let lag_names = spec.lags.iter().map(|k| format!("y.L{k}")).collect();
        let lag_values = spec
            .lags
            .iter()
            .map(|&k| (hold_back..nobs).map(|t| endog[t - k]).collect())
            .collect();
        blocks.push(DeterministicFrame::new(sample.clone(), lag_names, lag_values)?);

        if let Some(exog) = spec.exog {
            if exog.nrows() != nobs {
                return Err(DeterministicError::shape("exog", nobs, exog.nrows()));
            }
            let exog = exog
                .with_index(index.clone())?
                .slice_rows(hold_back, nobs - 1)?;
            blocks.push(exog);
        }

        let regressors = DeterministicFrame::hconcat(sample, blocks)?;
        debug!(
            nobs,
            hold_back,
            regressors = regressors.ncols(),
            trend = %spec.trend,
            "assembled autoregression design"
        );

        Ok(Self {
            lags: spec.lags,
            trend: spec.trend,
            hold_back,
            process,
            endog: endog[hold_back..].to_vec(),
            regressors,
        })
    }

    pub fn lags(&self) -> &[usize] {
        &self.lags
    }

    pub fn trend(&self) -> Trend {
        self.trend
    }

    /// Number of leading observations dropped to form the lags.
    pub fn hold_back(&self) -> usize {
        self.hold_back
    }

    /// Endogenous values aligned with the regressor rows.
    pub fn endog(&self) -> &[f64] {
        &self.endog
    }

    /// Regressor matrix: deterministic columns, lags, then exogenous columns.
    pub fn regressors(&self) -> &DeterministicFrame {
        &self.regressors
    }

    /// Deterministic process supplying the deterministic columns.
    pub fn process(&self) -> &DeterministicProcess {
        &self.process
    }

    /// Deterministic regressors for the `steps` periods after the sample.
    pub fn deterministic_forecast(&self, steps: usize) -> Result<DeterministicFrame> {
        self.process.out_of_sample(steps)
    }

    /// Deterministic regressors over an inclusive range of the full index.
    pub fn deterministic_range(
        &self,
        start: impl Into<RangeBound>,
        stop: impl Into<RangeBound>,
    ) -> Result<DeterministicFrame> {
        self.process.range(start, stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Frequency;

    fn series(n: usize) -> Vec<f64> {
        (0..n).map(|i| (i as f64 * 0.7).sin() + i as f64 * 0.1).collect()
    }

    #[test]
    fn trend_codes_round_trip() {
        for code in ["n", "c", "t", "ct"] {
            assert_eq!(code.parse::<Trend>().unwrap().code(), code);
        }
        assert!("ctt".parse::<Trend>().is_err());
    }

    #[test]
    fn design_aligns_lags_with_endog() {
        let y = series(20);
        let design = AutoRegDesign::new(&y, TimeIndex::range(20), AutoRegSpec::new(3)).unwrap();

        assert_eq!(design.hold_back(), 3);
        assert_eq!(design.endog().len(), 17);
        assert_eq!(
            design.regressors().columns(),
            &["const", "y.L1", "y.L2", "y.L3"]
        );
        assert_eq!(design.regressors().column("y.L1").unwrap()[0], y[2]);
        assert_eq!(design.regressors().column("y.L3").unwrap()[0], y[0]);
        assert_eq!(design.endog()[0], y[3]);
        assert_eq!(
            design.regressors().index(),
            &TimeIndex::range_with_step(3, 1, 17).unwrap()
        );
    }

    #[test]
    fn seasonal_dummies_use_index_frequency() {
        let index = TimeIndex::parse_period_range("1959-02", Frequency::Monthly, 48).unwrap();
        let spec = AutoRegSpec::new(2).trend(Trend::ConstantTrend).seasonal(true);
        let design = AutoRegDesign::new(&series(48), index, spec).unwrap();

        // const, trend, 11 dummies, 2 lags
        assert_eq!(design.regressors().ncols(), 15);
        assert_eq!(design.regressors().column("trend").unwrap()[0], 3.0);
    }

    #[test]
    fn custom_process_excludes_builtin_options() {
        let index = TimeIndex::range(50);
        let process = DeterministicProcess::builder(index.clone())
            .constant(true)
            .fourier(2)
            .period(12.0)
            .build()
            .unwrap();

        let spec = AutoRegSpec::new(1).deterministic(process.clone());
        assert!(matches!(
            AutoRegDesign::new(&series(50), index.clone(), spec),
            Err(DeterministicError::ConfigurationError(_))
        ));

        let spec = AutoRegSpec::new(1)
            .trend(Trend::None)
            .seasonal(true)
            .deterministic(process.clone());
        assert!(matches!(
            spec.validate(),
            Err(DeterministicError::ConfigurationError(_))
        ));

        let spec = AutoRegSpec::new(1).trend(Trend::None).deterministic(process);
        let design = AutoRegDesign::new(&series(50), index, spec).unwrap();
        assert_eq!(design.regressors().ncols(), 6);
        assert_eq!(design.deterministic_forecast(12).unwrap().nrows(), 12);
    }

    #[test]
    fn custom_process_must_share_index() {
        let process = DeterministicProcess::builder(TimeIndex::range(40))
            .constant(true)
            .build()
            .unwrap();
        let spec = AutoRegSpec::new(1).trend(Trend::None).deterministic(process);
        assert!(matches!(
            AutoRegDesign::new(&series(50), TimeIndex::range(50), spec),
            Err(DeterministicError::ConfigurationError(_))
        ));
    }

    #[test]
    fn seasonal_without_period_fails_on_range_index() {
        let spec = AutoRegSpec::new(1).seasonal(true);
        assert!(matches!(
            AutoRegDesign::new(&series(30), TimeIndex::range(30), spec),
            Err(DeterministicError::ConfigurationError(_))
        ));
    }

    #[test]
    fn too_few_observations() {
        let spec = AutoRegSpec::new(5);
        assert_eq!(
            AutoRegDesign::new(&series(5), TimeIndex::range(5), spec).unwrap_err(),
            DeterministicError::InsufficientData { needed: 6, got: 5 }
        );
    }

    #[test]
    fn endog_length_must_match_index() {
        let result = AutoRegDesign::new(&series(9), TimeIndex::range(10), AutoRegSpec::new(1));
        assert!(matches!(result, Err(DeterministicError::ShapeMismatch { .. })));
    }

    #[test]
    fn explicit_lags_and_exog() {
        let n = 30;
        let exog = DeterministicFrame::new(
            TimeIndex::range(n),
            vec!["x".into()],
            vec![(0..n).map(|i| i as f64 * 2.0).collect()],
        )
        .unwrap();
        let spec = AutoRegSpec::with_lags(vec![4, 1, 4])
            .trend(Trend::None)
            .exog(exog);
        let design = AutoRegDesign::new(&series(n), TimeIndex::range(n), spec).unwrap();

        assert_eq!(design.lags(), &[1, 4]);
        assert_eq!(design.regressors().columns(), &["y.L1", "y.L4", "x"]);
        assert_eq!(design.regressors().column("x").unwrap()[0], 8.0);
    }

    #[test]
    fn zero_lag_is_invalid() {
        let spec = AutoRegSpec::with_lags(vec![0, 1]);
        assert!(matches!(
            spec.validate(),
            Err(DeterministicError::InvalidParameter(_))
        ));
    }
}
