//! Time indices for deterministic terms.
//!
//! A [`TimeIndex`] is generative: it stores a start label, a fixed step and a
//! length, so the label at any position, including positions past the end of
//! the sample, can be computed. This is what makes out-of-sample extension a
//! pure function of the base index and the number of steps.

use crate::error::{DeterministicError, Result};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::fmt;
use std::str::FromStr;

/// Calendar frequency of a period index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Conventional seasonal period for data sampled at this frequency.
    pub fn seasonal_period(&self) -> usize {
        match self {
            Frequency::Daily => 7,
            Frequency::Weekly => 52,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::Annual => 1,
        }
    }

    /// Short frequency code.
    pub fn code(&self) -> &'static str {
        match self {
            Frequency::Daily => "D",
            Frequency::Weekly => "W",
            Frequency::Monthly => "M",
            Frequency::Quarterly => "Q",
            Frequency::Annual => "A",
        }
    }

    /// First day of the period containing `date`.
    ///
    /// Weeks start on Monday.
    pub fn period_start(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Daily => date,
            Frequency::Weekly => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            Frequency::Monthly => {
                NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
            }
            Frequency::Quarterly => {
                let month = (date.month() - 1) / 3 * 3 + 1;
                NaiveDate::from_ymd_opt(date.year(), month, 1).unwrap_or(date)
            }
            Frequency::Annual => NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date),
        }
    }

    /// Move a period start `n` periods forward (or backward when negative).
    pub fn advance(&self, date: NaiveDate, n: i64) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => date.checked_add_signed(Duration::days(n)),
            Frequency::Weekly => date.checked_add_signed(Duration::weeks(n)),
            Frequency::Monthly => shift_months(date, n),
            Frequency::Quarterly => shift_months(date, n.checked_mul(3)?),
            Frequency::Annual => shift_months(date, n.checked_mul(12)?),
        }
    }

    /// Number of whole periods from `from` to `to`, both period starts.
    pub fn periods_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
        match self {
            Frequency::Daily => (to - from).num_days(),
            Frequency::Weekly => (to - from).num_days() / 7,
            Frequency::Monthly => months(to) - months(from),
            Frequency::Quarterly => (months(to) - months(from)) / 3,
            Frequency::Annual => i64::from(to.year()) - i64::from(from.year()),
        }
    }

    /// Parse a period label such as `2025-01`, `2025Q1`, `2025` or a full date.
    pub fn parse_period(&self, text: &str) -> Result<NaiveDate> {
        let text = text.trim();
        let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok())
            .or_else(|| NaiveDate::parse_from_str(&format!("{text}-01-01"), "%Y-%m-%d").ok())
            .or_else(|| parse_quarter(text))
            .ok_or_else(|| {
                DeterministicError::RangeError(format!(
                    "cannot parse '{text}' as a period with frequency {}",
                    self.code()
                ))
            })?;
        Ok(self.period_start(date))
    }

    fn format_period(&self, date: NaiveDate) -> String {
        match self {
            Frequency::Daily | Frequency::Weekly => date.format("%Y-%m-%d").to_string(),
            Frequency::Monthly => date.format("%Y-%m").to_string(),
            Frequency::Quarterly => format!("{}Q{}", date.year(), date.month0() / 3 + 1),
            Frequency::Annual => date.year().to_string(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Frequency {
    type Err = DeterministicError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "D" | "DAILY" => Ok(Frequency::Daily),
            "W" | "WEEKLY" => Ok(Frequency::Weekly),
            "M" | "MS" | "MONTHLY" => Ok(Frequency::Monthly),
            "Q" | "QS" | "QUARTERLY" => Ok(Frequency::Quarterly),
            "A" | "AS" | "Y" | "YS" | "ANNUAL" | "YEARLY" => Ok(Frequency::Annual),
            other => Err(DeterministicError::InvalidParameter(format!(
                "unknown frequency '{other}'"
            ))),
        }
    }
}

fn shift_months(date: NaiveDate, n: i64) -> Option<NaiveDate> {
    let months = Months::new(u32::try_from(n.unsigned_abs()).ok()?);
    if n >= 0 {
        date.checked_add_months(months)
    } else {
        date.checked_sub_months(months)
    }
}

fn parse_quarter(text: &str) -> Option<NaiveDate> {
    let (year, quarter) = text.split_once('Q')?;
    let year: i32 = year.trim_end_matches('-').parse().ok()?;
    let quarter: u32 = quarter.parse().ok()?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// A single label on a [`TimeIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexLabel {
    /// Integer label of a range index.
    Int(i64),
    /// Calendar period, identified by its first day.
    Period { start: NaiveDate, freq: Frequency },
    /// UTC timestamp.
    Timestamp(DateTime<Utc>),
}

impl fmt::Display for IndexLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexLabel::Int(v) => write!(f, "{v}"),
            IndexLabel::Period { start, freq } => f.write_str(&freq.format_period(*start)),
            IndexLabel::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A bound passed to `range`: a position, a label, or text parsed against the index.
#[derive(Debug, Clone, PartialEq)]
pub enum RangeBound {
    /// Zero-based position, possibly beyond the end of the index.
    Position(i64),
    /// An index label.
    Label(IndexLabel),
    /// Text such as `"2025-01"`, parsed according to the index kind.
    Text(String),
}

impl From<i32> for RangeBound {
    fn from(v: i32) -> Self {
        RangeBound::Position(i64::from(v))
    }
}

impl From<i64> for RangeBound {
    fn from(v: i64) -> Self {
        RangeBound::Position(v)
    }
}

impl From<usize> for RangeBound {
    fn from(v: usize) -> Self {
        RangeBound::Position(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<&str> for RangeBound {
    fn from(v: &str) -> Self {
        RangeBound::Text(v.to_string())
    }
}

impl From<String> for RangeBound {
    fn from(v: String) -> Self {
        RangeBound::Text(v)
    }
}

impl From<IndexLabel> for RangeBound {
    fn from(v: IndexLabel) -> Self {
        RangeBound::Label(v)
    }
}

impl From<DateTime<Utc>> for RangeBound {
    fn from(v: DateTime<Utc>) -> Self {
        RangeBound::Label(IndexLabel::Timestamp(v))
    }
}

/// An ordered, gap-free index with a fixed step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimeIndex {
    /// Integer labels `start + step * i`.
    Range { start: i64, step: i64, len: usize },
    /// Calendar periods of a fixed frequency.
    Period {
        start: NaiveDate,
        freq: Frequency,
        len: usize,
    },
    /// UTC timestamps separated by a fixed duration.
    Datetime {
        start: DateTime<Utc>,
        step: Duration,
        len: usize,
    },
}

impl TimeIndex {
    /// Integer index `0..len`.
    pub fn range(len: usize) -> Self {
        TimeIndex::Range {
            start: 0,
            step: 1,
            len,
        }
    }

    /// Integer index with an explicit start and positive step.
    pub fn range_with_step(start: i64, step: i64, len: usize) -> Result<Self> {
        if step <= 0 {
            return Err(DeterministicError::InvalidIndex(format!(
                "step must be positive, got {step}"
            )));
        }
        Ok(TimeIndex::Range { start, step, len })
    }

    /// Period index of `len` periods starting at the period containing `start`.
    pub fn period_range(start: NaiveDate, freq: Frequency, len: usize) -> Self {
        TimeIndex::Period {
            start: freq.period_start(start),
            freq,
            len,
        }
    }

    /// Period index from a textual start such as `"2020-03"`.
    pub fn parse_period_range(start: &str, freq: Frequency, len: usize) -> Result<Self> {
        let start = freq
            .parse_period(start)
            .map_err(|e| DeterministicError::InvalidIndex(e.to_string()))?;
        Ok(TimeIndex::Period { start, freq, len })
    }

    /// Datetime index with a fixed positive step of whole milliseconds.
    pub fn datetime_range(start: DateTime<Utc>, step: Duration, len: usize) -> Result<Self> {
        if step.num_milliseconds() <= 0 {
            return Err(DeterministicError::InvalidIndex(
                "step must be at least one millisecond".to_string(),
            ));
        }
        if !whole_millis(step) {
            return Err(DeterministicError::InvalidIndex(format!(
                "step must be a whole number of milliseconds, got {step}"
            )));
        }
        Ok(TimeIndex::Datetime { start, step, len })
    }

    /// Build a datetime index from explicit timestamps.
    ///
    /// The timestamps must be strictly increasing with a constant spacing.
    pub fn from_timestamps(timestamps: &[DateTime<Utc>]) -> Result<Self> {
        let first = *timestamps.first().ok_or(DeterministicError::EmptyIndex)?;
        if timestamps.len() < 2 {
            return Err(DeterministicError::InvalidIndex(
                "cannot infer a step from a single timestamp".to_string(),
            ));
        }
        let step = timestamps[1] - timestamps[0];
        for w in timestamps.windows(2) {
            let diff = w[1] - w[0];
            if diff <= Duration::zero() {
                return Err(DeterministicError::InvalidIndex(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
            if diff != step {
                return Err(DeterministicError::InvalidIndex(format!(
                    "timestamps must have a fixed step: found {diff} after {step}"
                )));
            }
        }
        Self::datetime_range(first, step, timestamps.len())
    }

    /// Build a range index from explicit integer labels with a constant step.
    pub fn from_labels(labels: &[i64]) -> Result<Self> {
        let first = *labels.first().ok_or(DeterministicError::EmptyIndex)?;
        let step = match labels.get(1) {
            Some(second) => second - first,
            None => 1,
        };
        if labels.windows(2).any(|w| w[1] - w[0] != step) {
            return Err(DeterministicError::InvalidIndex(
                "labels must have a fixed step".to_string(),
            ));
        }
        Self::range_with_step(first, step, labels.len())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        match self {
            TimeIndex::Range { len, .. }
            | TimeIndex::Period { len, .. }
            | TimeIndex::Datetime { len, .. } => *len,
        }
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calendar frequency, for period indices.
    pub fn frequency(&self) -> Option<Frequency> {
        match self {
            TimeIndex::Period { freq, .. } => Some(*freq),
            _ => None,
        }
    }

    /// Seasonal period implied by the index frequency, if any.
    pub fn seasonal_period(&self) -> Option<usize> {
        self.frequency().map(|f| f.seasonal_period())
    }

    /// Label at `position`. Positions past the end are valid.
    pub fn label(&self, position: usize) -> Result<IndexLabel> {
        let offset = i64::try_from(position).map_err(|_| overflow())?;
        match self {
            TimeIndex::Range { start, step, .. } => step
                .checked_mul(offset)
                .and_then(|d| start.checked_add(d))
                .map(IndexLabel::Int)
                .ok_or_else(overflow),
            TimeIndex::Period { start, freq, .. } => freq
                .advance(*start, offset)
                .map(|start| IndexLabel::Period { start, freq: *freq })
                .ok_or_else(overflow),
            TimeIndex::Datetime { start, step, .. } => step
                .num_milliseconds()
                .checked_mul(offset)
                .and_then(|ms| start.checked_add_signed(Duration::milliseconds(ms)))
                .map(IndexLabel::Timestamp)
                .ok_or_else(overflow),
        }
    }

    /// All labels of the index.
    pub fn labels(&self) -> Result<Vec<IndexLabel>> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    /// Zero-based position of `label`, which may lie past the end of the index.
    ///
    /// Fails with `RangeError` if the label precedes the start, is of a
    /// different kind, or does not fall on the index grid.
    pub fn position_of(&self, label: &IndexLabel) -> Result<usize> {
        let offset = match (self, label) {
            (TimeIndex::Range { start, step, .. }, IndexLabel::Int(v)) => {
                let diff = v.checked_sub(*start).ok_or_else(|| {
                    DeterministicError::RangeError(format!(
                        "label {v} is too far from the index start {start}"
                    ))
                })?;
                if diff % step != 0 {
                    return Err(DeterministicError::RangeError(format!(
                        "label {v} is not on the index grid (start {start}, step {step})"
                    )));
                }
                diff / step
            }
            (
                TimeIndex::Period { start, freq, .. },
                IndexLabel::Period {
                    start: date,
                    freq: label_freq,
                },
            ) => {
                if freq != label_freq {
                    return Err(DeterministicError::RangeError(format!(
                        "label frequency {label_freq} does not match index frequency {freq}"
                    )));
                }
                freq.periods_between(*start, freq.period_start(*date))
            }
            (TimeIndex::Datetime { start, step, .. }, IndexLabel::Timestamp(ts)) => {
                let delta = *ts - *start;
                let diff = delta.num_milliseconds();
                let step = step.num_milliseconds();
                if !whole_millis(delta) || diff % step != 0 {
                    return Err(DeterministicError::RangeError(format!(
                        "timestamp {} is not on the index grid",
                        label
                    )));
                }
                diff / step
            }
            _ => {
                return Err(DeterministicError::RangeError(format!(
                    "label {label} does not match the index kind"
                )))
            }
        };
        usize::try_from(offset).map_err(|_| {
            DeterministicError::RangeError(format!("label {label} precedes the start of the index"))
        })
    }

    /// Parse text into a label of this index's kind.
    pub fn parse_label(&self, text: &str) -> Result<IndexLabel> {
        match self {
            TimeIndex::Range { .. } => text.trim().parse::<i64>().map(IndexLabel::Int).map_err(|_| {
                DeterministicError::RangeError(format!("cannot parse '{text}' as an integer label"))
            }),
            TimeIndex::Period { freq, .. } => Ok(IndexLabel::Period {
                start: freq.parse_period(text)?,
                freq: *freq,
            }),
            TimeIndex::Datetime { .. } => parse_timestamp(text)
                .map(IndexLabel::Timestamp)
                .ok_or_else(|| {
                    DeterministicError::RangeError(format!("cannot parse '{text}' as a timestamp"))
                }),
        }
    }

    /// Resolve a range bound to a zero-based position.
    pub fn resolve(&self, bound: &RangeBound) -> Result<usize> {
        match bound {
            RangeBound::Position(p) => usize::try_from(*p).map_err(|_| {
                DeterministicError::RangeError(format!("position {p} must be non-negative"))
            }),
            RangeBound::Label(label) => self.position_of(label),
            RangeBound::Text(text) => self.position_of(&self.parse_label(text)?),
        }
    }

    /// Index covering positions `start..=stop`, which may extend past the end.
    pub fn slice(&self, start: usize, stop: usize) -> Result<TimeIndex> {
        if stop < start {
            return Err(DeterministicError::RangeError(format!(
                "stop ({stop}) precedes start ({start})"
            )));
        }
        self.shifted(start, stop - start + 1)
    }

    /// Index of `steps` entries immediately following this one.
    pub fn extend(&self, steps: usize) -> Result<TimeIndex> {
        self.shifted(self.len(), steps)
    }

    /// Same index truncated or lengthened to `len` entries.
    pub fn with_len(&self, len: usize) -> TimeIndex {
        let mut index = self.clone();
        match &mut index {
            TimeIndex::Range { len: l, .. }
            | TimeIndex::Period { len: l, .. }
            | TimeIndex::Datetime { len: l, .. } => *l = len,
        }
        index
    }

    fn shifted(&self, offset: usize, len: usize) -> Result<TimeIndex> {
        let first = self.label(offset)?;
        Ok(match (self, first) {
            (TimeIndex::Range { step, .. }, IndexLabel::Int(start)) => TimeIndex::Range {
                start,
                step: *step,
                len,
            },
            (TimeIndex::Period { freq, .. }, IndexLabel::Period { start, .. }) => {
                TimeIndex::Period {
                    start,
                    freq: *freq,
                    len,
                }
            }
            (TimeIndex::Datetime { step, .. }, IndexLabel::Timestamp(start)) => {
                TimeIndex::Datetime {
                    start,
                    step: *step,
                    len,
                }
            }
            _ => return Err(overflow()),
        })
    }
}

impl fmt::Display for TimeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeIndex::Range { start, step, len } => {
                write!(f, "RangeIndex(start={start}, step={step}, len={len})")
            }
            TimeIndex::Period { start, freq, len } => write!(
                f,
                "PeriodIndex(start={}, freq={freq}, len={len})",
                freq.format_period(*start)
            ),
            TimeIndex::Datetime { start, step, len } => write!(
                f,
                "DatetimeIndex(start={}, step={step}, len={len})",
                start.format("%Y-%m-%d %H:%M:%S")
            ),
        }
    }
}

fn whole_millis(d: Duration) -> bool {
    d == Duration::milliseconds(d.num_milliseconds())
}

fn overflow() -> DeterministicError {
    DeterministicError::InvalidIndex("index position overflows the label range".to_string())
}

/// Compute the out-of-sample index following `index`.
///
/// Every term that generates out-of-sample values goes through this function.
/// When `forecast_index` is supplied it is returned as-is after checking that
/// it has exactly `steps` entries.
pub fn extend_index(
    index: &TimeIndex,
    steps: usize,
    forecast_index: Option<&TimeIndex>,
) -> Result<TimeIndex> {
    if steps == 0 {
        return Err(DeterministicError::InvalidParameter(
            "steps must be positive".to_string(),
        ));
    }
    match forecast_index {
        Some(fcast) if fcast.len() != steps => {
            Err(DeterministicError::shape("forecast index", steps, fcast.len()))
        }
        Some(fcast) => Ok(fcast.clone()),
        None => index.extend(steps),
    }
}
