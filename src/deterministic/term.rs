//! The capability every deterministic term implements.

use crate::core::{DeterministicFrame, TimeIndex};
use crate::error::Result;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A generator of deterministic regressor columns.
///
/// Implementations must be pure: the same index always yields the same frame.
/// Out-of-sample generation receives the in-sample index and, when the caller
/// already computed it, the forecast index. Terms that are not handed a
/// forecast index derive it with [`crate::core::extend_index`] so every term
/// extends the index the same way.
///
/// # Example
///
/// ```
/// use anofox_deterministic::core::{extend_index, DeterministicFrame, TimeIndex};
/// use anofox_deterministic::deterministic::{DeterministicTerm, TermConfig};
/// use anofox_deterministic::Result;
///
/// /// A single column counting down from the number of in-sample observations.
/// #[derive(Debug)]
/// struct Countdown;
///
/// impl std::fmt::Display for Countdown {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("Countdown")
///     }
/// }
///
/// impl DeterministicTerm for Countdown {
///     fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame> {
///         let n = index.len();
///         let values = (0..n).map(|i| (n - i) as f64).collect();
///         DeterministicFrame::new(index.clone(), vec!["countdown".into()], vec![values])
///     }
///
///     fn out_of_sample(
///         &self,
///         steps: usize,
///         index: &TimeIndex,
///         forecast_index: Option<&TimeIndex>,
///     ) -> Result<DeterministicFrame> {
///         let fcast = extend_index(index, steps, forecast_index)?;
///         let values = (1..=steps).map(|i| -(i as f64)).collect();
///         DeterministicFrame::new(fcast, vec!["countdown".into()], vec![values])
///     }
///
///     fn config(&self) -> TermConfig {
///         TermConfig::new("Countdown")
///     }
/// }
///
/// let frame = Countdown.out_of_sample(2, &TimeIndex::range(5), None).unwrap();
/// assert_eq!(frame.column("countdown").unwrap(), &[-1.0, -2.0]);
/// ```
pub trait DeterministicTerm: fmt::Debug + fmt::Display + Send + Sync {
    /// Values aligned to `index`, one row per entry.
    fn in_sample(&self, index: &TimeIndex) -> Result<DeterministicFrame>;

    /// Values for the `steps` entries following `index`.
    fn out_of_sample(
        &self,
        steps: usize,
        index: &TimeIndex,
        forecast_index: Option<&TimeIndex>,
    ) -> Result<DeterministicFrame>;

    /// Configuration that identifies this term.
    ///
    /// Two terms are equal when their configurations are equal.
    fn config(&self) -> TermConfig;

    /// Whether the columns are a full set of indicator dummies.
    fn is_dummy(&self) -> bool {
        false
    }

    /// Whether one of the columns is a constant.
    fn has_constant(&self) -> bool {
        false
    }
}

impl PartialEq for dyn DeterministicTerm {
    fn eq(&self, other: &Self) -> bool {
        self.config() == other.config()
    }
}

impl Eq for dyn DeterministicTerm {}

impl Hash for dyn DeterministicTerm {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.config().hash(state);
    }
}

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    /// Bit pattern of a float, with `-0.0` folded into `0.0`.
    Float(u64),
    Text(String),
    /// Data held by the term, compared by value.
    Data(DataKey),
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Int(v)
    }
}

impl From<usize> for ConfigValue {
    fn from(v: usize) -> Self {
        ConfigValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        ConfigValue::Float(v.to_bits())
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::Text(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::Text(v)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{v}"),
            ConfigValue::Int(v) => write!(f, "{v}"),
            ConfigValue::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            ConfigValue::Text(v) => write!(f, "{v:?}"),
            ConfigValue::Data(v) => write!(f, "{:016x}", v.digest),
        }
    }
}

impl From<DataKey> for ConfigValue {
    fn from(v: DataKey) -> Self {
        ConfigValue::Data(v)
    }
}

/// A shared table that takes part in a term's configuration.
///
/// Two keys are equal when their tables hold the same index, column names
/// and value bit patterns (`-0.0` folded into `0.0`). The digest only
/// short-circuits unequal tables and feeds `Hash`.
#[derive(Debug, Clone)]
pub struct DataKey {
    data: Arc<DeterministicFrame>,
    digest: u64,
}

impl DataKey {
    pub fn new(data: Arc<DeterministicFrame>) -> Self {
        let digest = digest(&data);
        Self { data, digest }
    }

    pub fn data(&self) -> &DeterministicFrame {
        &self.data
    }
}

impl PartialEq for DataKey {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        self.digest == other.digest
            && self.data.index() == other.data.index()
            && self.data.columns() == other.data.columns()
            && self
                .data
                .values_by_column()
                .iter()
                .zip(other.data.values_by_column())
                .all(|(a, b)| a.iter().map(|v| bits(*v)).eq(b.iter().map(|v| bits(*v))))
    }
}

impl Eq for DataKey {}

impl Hash for DataKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.digest.hash(state);
    }
}

fn bits(v: f64) -> u64 {
    if v == 0.0 {
        0.0f64.to_bits()
    } else {
        v.to_bits()
    }
}

fn digest(data: &DeterministicFrame) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.index().hash(&mut hasher);
    data.columns().hash(&mut hasher);
    for column in data.values_by_column() {
        for v in column {
            bits(*v).hash(&mut hasher);
        }
    }
    hasher.finish()
}

/// Identity of a term: its kind plus named parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TermConfig {
    kind: &'static str,
    params: Vec<(&'static str, ConfigValue)>,
}

impl TermConfig {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            params: Vec::new(),
        }
    }

    /// Add a named parameter.
    pub fn with(mut self, name: &'static str, value: impl Into<ConfigValue>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    pub fn kind(&self) -> &str {
        self.kind
    }

    pub fn params(&self) -> &[(&'static str, ConfigValue)] {
        &self.params
    }
}

impl fmt::Display for TermConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        f.write_str(")")
    }
}

/// Build a frame whose values depend only on the column and the absolute
/// position, `offset` being the position of the first row of `index`.
pub(crate) fn positional_frame<F>(
    index: &TimeIndex,
    offset: usize,
    columns: Vec<String>,
    value: F,
) -> Result<DeterministicFrame>
where
    F: Fn(usize, usize) -> f64,
{
    let values = (0..columns.len())
        .map(|c| (0..index.len()).map(|i| value(c, offset + i)).collect())
        .collect();
    DeterministicFrame::new(index.clone(), columns, values)
}
