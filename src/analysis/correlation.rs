//! Pearson correlation analysis over numeric training columns
//!
//! Strongly correlated features carry the same signal twice; one of each
//! flagged pair can usually be dropped.
//!
//! ```text
//! r(X, Y) = Σ (x_i - x̄)(y_i - ȳ) / sqrt(Σ (x_i - x̄)² · Σ (y_i - ȳ)²)
//! ```
//!
//! A column with zero variance has no defined correlation: its off-diagonal
//! cells are NaN and never flagged. The diagonal is always 1.

use arrow::array::{Array, ArrayRef, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
#[cfg(feature = "rayon")]
use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::{Error, Result};

/// One named numeric feature column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericColumn {
    name: String,
    values: Vec<f64>,
}

impl NumericColumn {
    /// Create a column.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values in row order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Row-aligned numeric columns extracted from a training snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumericColumns {
    columns: Vec<NumericColumn>,
}

impl NumericColumns {
    /// Wrap columns that are already extracted.
    #[must_use]
    pub fn new(columns: Vec<NumericColumn>) -> Self {
        Self { columns }
    }

    /// Extract numeric columns from one record batch.
    ///
    /// With `names`, exactly those columns are taken in that order; otherwise
    /// every float and integer column in schema order.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if a named column is missing or not
    /// numeric, or any selected column contains nulls.
    pub fn from_record_batch(batch: &RecordBatch, names: Option<&[String]>) -> Result<Self> {
        Self::from_batches(std::slice::from_ref(batch), names)
    }

    /// Extract numeric columns from several batches sharing one schema.
    ///
    /// # Errors
    ///
    /// As [`from_record_batch`](Self::from_record_batch), plus
    /// `Error::DimensionMismatch` if the batch schemas differ. Requesting
    /// named columns from an empty batch list is `Error::InvalidInput`.
    pub fn from_batches(batches: &[RecordBatch], names: Option<&[String]>) -> Result<Self> {
        let Some(first) = batches.first() else {
            return match names {
                Some(names) if !names.is_empty() => Err(Error::InvalidInput(format!(
                    "columns {names:?} requested from an empty snapshot"
                ))),
                _ => Ok(Self::default()),
            };
        };
        let schema = first.schema();
        for batch in &batches[1..] {
            if batch.schema() != schema {
                return Err(Error::DimensionMismatch {
                    expected: format!("schema {schema:?}"),
                    actual: format!("schema {:?}", batch.schema()),
                });
            }
        }

        let indices: Vec<usize> = match names {
            Some(names) => names
                .iter()
                .map(|name| -> Result<usize> {
                    let index = schema.index_of(name).map_err(|_| {
                        Error::InvalidInput(format!("column '{name}' not found in snapshot"))
                    })?;
                    if is_numeric(schema.field(index).data_type()) {
                        Ok(index)
                    } else {
                        Err(Error::InvalidInput(format!(
                            "column '{name}' is {} and cannot be correlated",
                            schema.field(index).data_type()
                        )))
                    }
                })
                .collect::<Result<_>>()?,
            None => schema
                .fields()
                .iter()
                .enumerate()
                .filter(|(_, field)| is_numeric(field.data_type()))
                .map(|(index, _)| index)
                .collect(),
        };

        let rows: usize = batches.iter().map(RecordBatch::num_rows).sum();
        let mut columns = Vec::with_capacity(indices.len());
        for index in indices {
            let name = schema.field(index).name();
            let mut values = Vec::with_capacity(rows);
            for batch in batches {
                append_values(name, batch.column(index), &mut values)?;
            }
            columns.push(NumericColumn::new(name.clone(), values));
        }

        debug!(columns = columns.len(), rows, "extracted numeric columns");
        Ok(Self { columns })
    }

    /// Add a column.
    pub fn push(&mut self, column: NumericColumn) {
        self.columns.push(column);
    }

    /// Columns in order.
    #[must_use]
    pub fn columns(&self) -> &[NumericColumn] {
        &self.columns
    }

    /// Column names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(NumericColumn::name).collect()
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

const fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

#[allow(clippy::cast_precision_loss)]
fn append_values(name: &str, column: &ArrayRef, out: &mut Vec<f64>) -> Result<()> {
    if column.null_count() > 0 {
        return Err(Error::InvalidInput(format!(
            "column '{name}' contains {} null values",
            column.null_count()
        )));
    }

    let downcast_failed = || Error::Other(format!("Failed to downcast column '{name}'"));
    match column.data_type() {
        DataType::Float64 => {
            let array = column
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(downcast_failed)?;
            out.extend(array.values().iter().copied());
        }
        DataType::Float32 => {
            let array = column
                .as_any()
                .downcast_ref::<Float32Array>()
                .ok_or_else(downcast_failed)?;
            out.extend(array.values().iter().map(|&v| f64::from(v)));
        }
        DataType::Int32 => {
            let array = column
                .as_any()
                .downcast_ref::<Int32Array>()
                .ok_or_else(downcast_failed)?;
            out.extend(array.values().iter().map(|&v| f64::from(v)));
        }
        DataType::Int64 => {
            let array = column
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(downcast_failed)?;
            out.extend(array.values().iter().map(|&v| v as f64));
        }
        dt if is_numeric(dt) => {
            let widened = cast(column, &DataType::Float64)?;
            let array = widened
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(downcast_failed)?;
            out.extend(array.values().iter().copied());
        }
        dt => {
            return Err(Error::InvalidInput(format!(
                "column '{name}' has non-numeric type {dt}"
            )))
        }
    }
    Ok(())
}

/// Symmetric Pearson correlation matrix with its header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    header: Vec<String>,
    values: Vec<f64>,
}

impl CorrelationMatrix {
    /// Feature names, one per row and column.
    #[must_use]
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Number of features.
    #[must_use]
    pub fn size(&self) -> usize {
        self.header.len()
    }

    /// Correlation between features `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        let n = self.size();
        assert!(i < n && j < n, "index ({i}, {j}) out of bounds for {n}x{n} matrix");
        self.values[i * n + j]
    }

    /// Row `i` of the matrix.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        let n = self.size();
        assert!(i < n, "row {i} out of bounds for {n}x{n} matrix");
        &self.values[i * n..(i + 1) * n]
    }
}

/// Pearson correlation of two equally long series.
///
/// Returns NaN when either series has zero variance or is empty. The result
/// is clamped to `[-1, 1]` against rounding drift.
///
/// # Errors
///
/// Returns `Error::DimensionMismatch` if the lengths differ.
///
/// ```rust
/// use vigia::analysis::pearson;
///
/// let r = pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0])?;
/// assert!((r - 1.0).abs() < 1e-12);
/// # Ok::<(), vigia::Error>(())
/// ```
pub fn pearson(x: &[f64], y: &[f64]) -> Result<f64> {
    if x.len() != y.len() {
        return Err(Error::DimensionMismatch {
            expected: format!("{} values in x", x.len()),
            actual: format!("{} values in y", y.len()),
        });
    }
    Ok(Centered::new(x).correlate(&Centered::new(y)))
}

struct Centered {
    deviations: Vec<f64>,
    norm: f64,
}

impl Centered {
    #[allow(clippy::cast_precision_loss)]
    fn new(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                deviations: Vec::new(),
                norm: 0.0,
            };
        }
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let deviations: Vec<f64> = values.iter().map(|v| v - mean).collect();
        let norm = deviations.iter().map(|d| d * d).sum::<f64>().sqrt();
        Self { deviations, norm }
    }

    fn correlate(&self, other: &Self) -> f64 {
        if self.norm == 0.0 || other.norm == 0.0 {
            return f64::NAN;
        }
        let dot: f64 = self
            .deviations
            .iter()
            .zip(&other.deviations)
            .map(|(a, b)| a * b)
            .sum();
        (dot / (self.norm * other.norm)).clamp(-1.0, 1.0)
    }
}

/// Full Pearson correlation matrix over row-aligned columns.
///
/// # Errors
///
/// Returns `Error::DimensionMismatch` if the columns differ in length.
pub fn correlation_matrix(columns: &NumericColumns) -> Result<CorrelationMatrix> {
    let cols = columns.columns();
    if let Some(first) = cols.first() {
        let rows = first.values().len();
        if let Some(bad) = cols.iter().find(|c| c.values().len() != rows) {
            return Err(Error::DimensionMismatch {
                expected: format!("{rows} rows in every column (from '{}')", first.name()),
                actual: format!("{} rows in '{}'", bad.values().len(), bad.name()),
            });
        }
    }

    let n = cols.len();

    #[cfg(feature = "rayon")]
    let centered: Vec<Centered> = cols.par_iter().map(|c| Centered::new(c.values())).collect();
    #[cfg(not(feature = "rayon"))]
    let centered: Vec<Centered> = cols.iter().map(|c| Centered::new(c.values())).collect();

    // Upper triangle only, row i holds j in (i, n)
    let upper_row = |i: usize| -> Vec<f64> {
        (i + 1..n)
            .map(|j| centered[i].correlate(&centered[j]))
            .collect()
    };
    #[cfg(feature = "rayon")]
    let upper: Vec<Vec<f64>> = (0..n).into_par_iter().map(upper_row).collect();
    #[cfg(not(feature = "rayon"))]
    let upper: Vec<Vec<f64>> = (0..n).map(upper_row).collect();

    let mut values = vec![0.0; n * n];
    for (i, row) in upper.iter().enumerate() {
        values[i * n + i] = 1.0;
        for (offset, &r) in row.iter().enumerate() {
            let j = i + 1 + offset;
            values[i * n + j] = r;
            values[j * n + i] = r;
        }
    }

    Ok(CorrelationMatrix {
        header: cols.iter().map(|c| c.name().to_string()).collect(),
        values,
    })
}

/// Two features whose correlation exceeds the threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelatedPair {
    /// Row feature.
    pub feature_a: String,
    /// Column feature.
    pub feature_b: String,
    /// Correlation coefficient.
    pub correlation: f64,
}

/// Pairs `i < j` with `|r| > threshold`, in row-major order.
#[must_use]
pub fn flag_pairs(matrix: &CorrelationMatrix, threshold: f64) -> Vec<CorrelatedPair> {
    let n = matrix.size();
    let header = matrix.header();
    let mut pairs = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            let r = matrix.get(i, j);
            if r.abs() > threshold {
                pairs.push(CorrelatedPair {
                    feature_a: header[i].clone(),
                    feature_b: header[j].clone(),
                    correlation: r,
                });
            }
        }
    }
    pairs
}

/// Correlation matrix plus the pairs flagged at a threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationReport {
    matrix: CorrelationMatrix,
    threshold: f64,
    pairs: Vec<CorrelatedPair>,
}

impl CorrelationReport {
    /// Compute the matrix and flag pairs above `threshold`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for a threshold outside `[0, 1]`, or as
    /// [`correlation_matrix`].
    pub fn build(columns: &NumericColumns, threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(Error::InvalidInput(format!(
                "correlation threshold must lie in [0, 1], got {threshold}"
            )));
        }
        let matrix = correlation_matrix(columns)?;
        let pairs = flag_pairs(&matrix, threshold);
        debug!(
            features = matrix.size(),
            flagged = pairs.len(),
            threshold,
            "correlation analysis done"
        );
        Ok(Self {
            matrix,
            threshold,
            pairs,
        })
    }

    /// The full matrix.
    #[must_use]
    pub const fn matrix(&self) -> &CorrelationMatrix {
        &self.matrix
    }

    /// Threshold the pairs were flagged at.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Flagged pairs in row-major order.
    #[must_use]
    pub fn pairs(&self) -> &[CorrelatedPair] {
        &self.pairs
    }

    /// Render the legend and one numbered row per flagged pair.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        let mut lines = vec![
            "  We can remove one of the next high correlated features!".to_string(),
            "    - closer to  0 => low correlated features".to_string(),
            "    - closer to  1 => direct high correlated features".to_string(),
            "    - closer to -1 => inverted high correlated features".to_string(),
            format!(
                "  {:>4} {:<15} vs. {:<15} {:>15}",
                "No", "Feature", "Feature", "Rate"
            ),
        ];
        lines.extend(self.pairs.iter().enumerate().map(|(n, p)| {
            format!(
                "  {:>3}. {:<15} vs. {:<15} {:>15.4}",
                n + 1,
                p.feature_a,
                p.feature_b,
                p.correlation
            )
        }));
        lines
    }
}
