//! Column-major numeric table aligned to a [`TimeIndex`].

use crate::core::TimeIndex;
use crate::error::{DeterministicError, Result};
use std::collections::HashSet;
use std::fmt;

/// Generated deterministic values, one row per index entry.
#[derive(Debug, Clone, PartialEq)]
pub struct DeterministicFrame {
    index: TimeIndex,
    columns: Vec<String>,
    /// Values stored in column-major format: values[column][row]
    values: Vec<Vec<f64>>,
}

impl DeterministicFrame {
    /// Create a frame from column-major values.
    pub fn new(index: TimeIndex, columns: Vec<String>, values: Vec<Vec<f64>>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(DeterministicError::InvalidParameter(format!(
                "{} column names for {} columns",
                columns.len(),
                values.len()
            )));
        }
        for (name, column) in columns.iter().zip(&values) {
            if column.len() != index.len() {
                return Err(DeterministicError::shape(
                    format!("column '{name}'"),
                    index.len(),
                    column.len(),
                ));
            }
        }
        check_unique(&columns)?;
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Create a frame from row-major values.
    pub fn from_rows(index: TimeIndex, columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if rows.len() != index.len() {
            return Err(DeterministicError::shape("rows", index.len(), rows.len()));
        }
        for row in &rows {
            if row.len() != columns.len() {
                return Err(DeterministicError::InvalidParameter(format!(
                    "row has {} values for {} columns",
                    row.len(),
                    columns.len()
                )));
            }
        }
        let values = (0..columns.len())
            .map(|c| rows.iter().map(|row| row[c]).collect())
            .collect();
        Self::new(index, columns, values)
    }

    /// A frame with no columns.
    pub fn empty(index: TimeIndex) -> Self {
        Self {
            index,
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Concatenate frames column-wise onto `index`.
    ///
    /// Every frame must have `index.len()` rows; column names must stay unique.
    pub fn hconcat(index: TimeIndex, frames: Vec<DeterministicFrame>) -> Result<Self> {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        for frame in frames {
            if frame.nrows() != index.len() {
                return Err(DeterministicError::shape(
                    format!("columns {:?}", frame.columns),
                    index.len(),
                    frame.nrows(),
                ));
            }
            columns.extend(frame.columns);
            values.extend(frame.values);
        }
        check_unique(&columns)?;
        Ok(Self {
            index,
            columns,
            values,
        })
    }

    /// Append `other` below this frame.
    ///
    /// Both frames need identical columns, and `other` must start right after
    /// the last row of this frame.
    pub fn vstack(mut self, other: DeterministicFrame) -> Result<Self> {
        if self.columns != other.columns {
            return Err(DeterministicError::InvalidParameter(format!(
                "cannot stack frames with columns {:?} and {:?}",
                self.columns, other.columns
            )));
        }
        if other.nrows() > 0 && self.index.extend(other.nrows())? != other.index {
            return Err(DeterministicError::InvalidIndex(format!(
                "{} does not follow {}",
                other.index, self.index
            )));
        }
        let rows = self.nrows() + other.nrows();
        for (column, tail) in self.values.iter_mut().zip(other.values) {
            column.extend(tail);
        }
        self.index = self.index.with_len(rows);
        Ok(self)
    }

    /// Rows `start..=stop` as a new frame.
    pub fn slice_rows(&self, start: usize, stop: usize) -> Result<Self> {
        if stop < start {
            return Err(DeterministicError::RangeError(format!(
                "stop ({stop}) precedes start ({start})"
            )));
        }
        if stop >= self.nrows() {
            return Err(DeterministicError::IndexOutOfBounds {
                index: stop,
                size: self.nrows(),
            });
        }
        Ok(Self {
            index: self.index.slice(start, stop)?,
            columns: self.columns.clone(),
            values: self
                .values
                .iter()
                .map(|c| c[start..=stop].to_vec())
                .collect(),
        })
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[String]) -> Result<Self> {
        let values = names
            .iter()
            .map(|name| {
                self.column(name).map(|c| c.to_vec()).ok_or_else(|| {
                    DeterministicError::InvalidParameter(format!("unknown column '{name}'"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(self.index.clone(), names.to_vec(), values)
    }

    /// Replace the index with one of the same length.
    pub fn with_index(mut self, index: TimeIndex) -> Result<Self> {
        if index.len() != self.nrows() {
            return Err(DeterministicError::shape("index", self.nrows(), index.len()));
        }
        self.index = index;
        Ok(self)
    }

    /// Get the index.
    pub fn index(&self) -> &TimeIndex {
        &self.index
    }

    /// Get column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn nrows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns.
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    /// Check if the frame has no rows or no columns.
    pub fn is_empty(&self) -> bool {
        self.nrows() == 0 || self.ncols() == 0
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i].as_slice())
    }

    /// Get all values organized by column.
    pub fn values_by_column(&self) -> &[Vec<f64>] {
        &self.values
    }

    /// Get a row (values across all columns).
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        if index >= self.nrows() {
            return Err(DeterministicError::IndexOutOfBounds {
                index,
                size: self.nrows(),
            });
        }
        Ok(self.values.iter().map(|c| c[index]).collect())
    }

    /// Row-major copy of the values.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.nrows())
            .map(|i| self.values.iter().map(|c| c[i]).collect())
            .collect()
    }
}

impl fmt::Display for DeterministicFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = (0..self.nrows())
            .map(|i| {
                self.index
                    .label(i)
                    .map(|l| l.to_string())
                    .unwrap_or_default()
            })
            .collect();
        let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let widths: Vec<usize> = self.columns.iter().map(|c| c.len().max(9)).collect();

        write!(f, "{:label_width$}", "")?;
        for (name, width) in self.columns.iter().zip(widths.iter().copied()) {
            write!(f, "  {name:>width$}")?;
        }
        writeln!(f)?;
        for (i, label) in labels.iter().enumerate() {
            write!(f, "{label:<label_width$}")?;
            for (column, width) in self.values.iter().zip(widths.iter().copied()) {
                write!(f, "  {:>width$.4}", column[i])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn check_unique(columns: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for name in columns {
        if !seen.insert(name.as_str()) {
            return Err(DeterministicError::DuplicateColumn(name.clone()));
        }
    }
    Ok(())
}
