// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Frame Module** - *Labeled 2-D Table*
//!
//! Columnar table with a row index and a column index. Columns may hold
//! different dtypes, in which case the frame is "mixed".
//!
//! Binary operators are bound in [`crate::ops::registry`]; the alignment
//! logic lives in [`crate::kernels::broadcast::frame`].

use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[cfg(feature = "parallel_proc")]
use rayon::iter::IntoParallelRefIterator;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::scalar::Scalar;
use crate::structs::column::Column;
use crate::structs::index::{Label, LabelIndex};

/// # Frame
///
/// ## Structure
/// - `cols`: one column per column label, each `index.len()` long.
/// - `columns`: column labels.
/// - `index`: row labels.
///
/// ## Notes
/// - Columns sit behind `Arc`, so clones and column reuse are cheap.
/// - Operations return new frames and never mutate their inputs.
#[derive(Debug, Clone)]
pub struct Frame {
    pub cols: Vec<Arc<Column>>,
    pub columns: LabelIndex,
    pub index: LabelIndex,
}

impl Frame {
    /// Builds a frame, checking every column against the row and column indexes.
    pub fn new(
        cols: Vec<Column>,
        columns: LabelIndex,
        index: LabelIndex,
    ) -> Result<Self, OpsError> {
        if cols.len() != columns.len() {
            return Err(OpsError::LengthMismatch {
                context: "Frame::new columns",
                left: cols.len(),
                right: columns.len(),
            });
        }
        if let Some(bad) = cols.iter().find(|c| c.len() != index.len()) {
            return Err(OpsError::LengthMismatch {
                context: "Frame::new rows",
                left: bad.len(),
                right: index.len(),
            });
        }
        Ok(Self {
            cols: cols.into_iter().map(Arc::new).collect(),
            columns,
            index,
        })
    }

    /// Frame from labeled columns over a `0..n_rows` index.
    pub fn from_columns<L: Into<Label>>(pairs: Vec<(L, Column)>) -> Result<Self, OpsError> {
        let n_rows = pairs.first().map(|(_, c)| c.len()).unwrap_or(0);
        let (labels, cols): (Vec<Label>, Vec<Column>) =
            pairs.into_iter().map(|(l, c)| (l.into(), c)).unzip();
        Frame::new(cols, LabelIndex::new(labels), LabelIndex::range(n_rows))
    }

    /// Result constructor used by the operator wrappers. Shapes are already aligned.
    pub(crate) fn from_parts(cols: Vec<Arc<Column>>, columns: LabelIndex, index: LabelIndex) -> Self {
        debug_assert_eq!(cols.len(), columns.len());
        Self {
            cols,
            columns,
            index,
        }
    }

    /// Frame of all-missing float columns over the given axes.
    pub fn all_missing(columns: LabelIndex, index: LabelIndex) -> Self {
        let col = Arc::new(Column::all_missing(DType::Float64, index.len()));
        let cols = vec![col; columns.len()];
        Self::from_parts(cols, columns, index)
    }

    #[inline]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    #[inline]
    pub fn n_cols(&self) -> usize {
        self.cols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_cols() == 0 || self.n_rows() == 0
    }

    #[inline]
    pub fn col(&self, j: usize) -> &Column {
        &self.cols[j]
    }

    /// Column by label, first match.
    pub fn column(&self, label: impl Into<Label>) -> Option<&Column> {
        self.columns.position(&label.into()).map(|j| self.col(j))
    }

    /// Value at `(row, col)` positions.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Scalar {
        self.cols[col].get(row)
    }

    /// Value at `(row label, column label)`, first match on each axis.
    pub fn at(&self, row: impl Into<Label>, col: impl Into<Label>) -> Option<Scalar> {
        let i = self.index.position(&row.into())?;
        let j = self.columns.position(&col.into())?;
        Some(self.get(i, j))
    }

    /// The shared dtype of every column, or `None` when mixed or without columns.
    pub fn single_dtype(&self) -> Option<DType> {
        let first = self.cols.first()?.dtype();
        self.cols.iter().all(|c| c.dtype() == first).then_some(first)
    }

    /// True when columns hold more than one dtype.
    pub fn is_mixed_type(&self) -> bool {
        self.n_cols() > 1 && self.single_dtype().is_none()
    }

    /// Remaps rows and columns onto new axes through join position maps.
    /// A `None` map keeps that axis as is. Columns absent on this side become all missing.
    pub fn reindex(
        &self,
        rows: Option<&[Option<usize>]>,
        index: &LabelIndex,
        cols: Option<&[Option<usize>]>,
        columns: &LabelIndex,
    ) -> Frame {
        let take_rows = |col: &Arc<Column>| match rows {
            None => col.clone(),
            Some(p) => Arc::new(col.take(p)),
        };
        let out: Vec<Arc<Column>> = match cols {
            None => self.cols.iter().map(take_rows).collect(),
            Some(p) => p
                .iter()
                .map(|pos| match pos {
                    Some(j) => take_rows(&self.cols[*j]),
                    None => Arc::new(Column::all_missing(DType::Float64, index.len())),
                })
                .collect(),
        };
        Frame::from_parts(out, columns.clone(), index.clone())
    }

    /// Concatenates every column into one buffer, column-major.
    /// All columns must share a dtype.
    pub fn bulk_values(&self) -> Result<Column, OpsError> {
        let parts: Vec<&Column> = self.cols.iter().map(|c| c.as_ref()).collect();
        Column::concat(&parts)
    }

    /// Inverse of [`Frame::bulk_values`].
    pub fn from_bulk(values: &Column, columns: LabelIndex, index: LabelIndex) -> Frame {
        let lens = vec![index.len(); columns.len()];
        let cols = values.split(&lens).into_iter().map(Arc::new).collect();
        Frame::from_parts(cols, columns, index)
    }

    /// Parallel iterator over the columns.
    #[cfg(feature = "parallel_proc")]
    #[inline]
    pub fn par_iter(&self) -> rayon::slice::Iter<'_, Arc<Column>> {
        self.cols.par_iter()
    }
}

impl Display for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const MAX_PREVIEW: usize = 20;
        writeln!(f, "Frame [{} rows × {} cols]", self.n_rows(), self.n_cols())?;
        write!(f, "{:<12}", "")?;
        for label in self.columns.labels() {
            write!(f, " {:>14}", label.to_string())?;
        }
        writeln!(f)?;
        for i in 0..usize::min(self.n_rows(), MAX_PREVIEW) {
            let label = self.index.get(i).map(|l| l.to_string()).unwrap_or_default();
            write!(f, "{:<12}", label)?;
            for col in &self.cols {
                write!(f, " {:>14}", col.get(i).to_string())?;
            }
            writeln!(f)?;
        }
        if self.n_rows() > MAX_PREVIEW {
            writeln!(f, "…")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns(vec![
            ("a", Column::from(vec![1i64, 2, 3])),
            ("b", Column::from(vec![1.5, 2.5, 3.5])),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_validates_shapes() {
        let err = Frame::new(
            vec![Column::from(vec![1i64, 2])],
            LabelIndex::new(vec![Label::from("a")]),
            LabelIndex::range(3),
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::LengthMismatch { .. }));
    }

    #[test]
    fn test_mixed_type_and_single_dtype() {
        let f = sample();
        assert!(f.is_mixed_type());
        assert_eq!(f.single_dtype(), None);
        let g = Frame::from_columns(vec![("x", Column::from(vec![1.0])), ("y", Column::from(vec![2.0]))])
            .unwrap();
        assert!(!g.is_mixed_type());
        assert_eq!(g.single_dtype(), Some(DType::Float64));
    }

    #[test]
    fn test_reindex_fills_missing_columns() {
        let f = sample();
        let columns: LabelIndex = ["a", "z"].into_iter().collect();
        let index = LabelIndex::range(2);
        let r = f.reindex(Some(&[Some(2), Some(0)]), &index, Some(&[Some(0), None]), &columns);
        assert_eq!(r.get(0, 0), Scalar::Int64(3));
        assert!(r.get(1, 1).is_null());
        assert_eq!(r.n_cols(), 2);
    }

    #[test]
    fn test_bulk_round_trip() {
        let g = Frame::from_columns(vec![
            ("x", Column::from(vec![1.0, 2.0])),
            ("y", Column::from(vec![3.0, 4.0])),
        ])
        .unwrap();
        let bulk = g.bulk_values().unwrap();
        assert_eq!(bulk, Column::from(vec![1.0, 2.0, 3.0, 4.0]));
        let back = Frame::from_bulk(&bulk, g.columns.clone(), g.index.clone());
        assert_eq!(back.at(1, "y"), Some(Scalar::Float64(4.0)));
        assert!(sample().bulk_values().is_err());
    }
}
