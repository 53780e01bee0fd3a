// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Frame Broadcast Module** - *2-D Receivers*
//!
//! ## Operand handling
//! - **Frame**: rows and columns are outer-joined, both sides reindexed, and
//!   one-sided positions end up missing. When both reindexed frames hold a
//!   single shared dtype the whole table is evaluated in one bulk call.
//! - **Series**: broadcast along an axis. `Axis::Columns` aligns the series
//!   against the column labels and applies it down every row, `Axis::Index`
//!   aligns it against the row labels and applies it to every column. With no
//!   axis it is inferred: row-wise when both indexes hold only timestamps.
//! - **List / NdArray**: wrapped in the receiver's labels first. 1-D operands
//!   become a series over the row index for `Axis::Index`, else over the
//!   columns. 2-D operands must match the receiver's shape.
//! - **Scalar**: applied to every column.
//!
//! Mixed-dtype receivers never take the accelerated path.
//!
//! Columns are evaluated on the rayon pool with `parallel_proc`.

use std::sync::Arc;

#[cfg(feature = "parallel_proc")]
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::enums::error::OpsError;
use crate::enums::operand::Operand;
use crate::enums::operators::{Axis, OpKind};
use crate::enums::scalar::Scalar;
use crate::kernels::broadcast::{
    arith_realigned, arith_values, bool_values, compare_values, declined, fill_one_sided,
};
use crate::kernels::elementwise::Values;
use crate::kernels::evaluate::can_use_accelerated_frame;
use crate::kernels::settings::EvalSettings;
use crate::ops::descriptor::{OpArgs, OpDescriptor};
use crate::structs::column::Column;
use crate::structs::frame::Frame;
use crate::structs::series::Series;

/// Kernel run on aligned column values.
type Kernel =
    fn(&OpDescriptor, &Column, Values<'_>, &EvalSettings) -> Result<Column, OpsError>;

/// An operator bound to its kernel and the settings snapshot for one call.
struct Binop<'a> {
    desc: &'a OpDescriptor,
    kernel: Kernel,
    settings: EvalSettings,
}

impl<'a> Binop<'a> {
    fn new(desc: &'a OpDescriptor, kernel: Kernel, left: &Frame, settings: &EvalSettings) -> Self {
        let settings = if left.is_mixed_type() {
            EvalSettings {
                use_accelerated: false,
                ..*settings
            }
        } else {
            *settings
        };
        Self {
            desc,
            kernel,
            settings,
        }
    }

    #[inline]
    fn call(&self, x: &Column, y: Values<'_>) -> Result<Column, OpsError> {
        (self.kernel)(self.desc, x, y, &self.settings)
    }

    /// Runs one column pair of two reindexed frames. `before` holds the
    /// source columns, `None` where the column label is absent from that frame.
    ///
    /// Arithmetic classifies temporal operands on the source columns. A
    /// temporal column meeting an absent one, with nothing filled in, is all NaT.
    fn call_pair(
        &self,
        x: &Column,
        y: &Column,
        before: (Option<&Column>, Option<&Column>),
        filled: bool,
    ) -> Result<Column, OpsError> {
        if !self.is_arith() {
            return self.call(x, Values::Array(y));
        }
        if !filled {
            let present = match before {
                (Some(_), None) => Some(x),
                (None, Some(_)) => Some(y),
                _ => None,
            };
            if let Some(out) = present.and_then(|c| self.against_absent(c)) {
                return Ok(out);
            }
        }
        arith_realigned(self.desc, x, y, before, &self.settings)
    }

    #[inline]
    fn is_arith(&self) -> bool {
        self.desc.op().kind() == OpKind::Arithmetic
    }

    /// Result of arithmetic between `present` and a label absent from the
    /// other operand, when `present` is temporal.
    fn against_absent(&self, present: &Column) -> Option<Column> {
        (self.is_arith() && present.dtype().is_temporal())
            .then(|| Column::all_missing(present.dtype(), present.len()))
    }
}

/// A list or raw buffer wrapped in the receiver's labels.
enum Wrapped {
    Series(Series),
    Frame(Frame),
}

/// `left <op> other` for an arithmetic operator.
///
/// `args.axis` falls back to the descriptor's default axis. A `fill_value`
/// is only honored against another frame.
pub fn arith(
    desc: &OpDescriptor,
    left: &Frame,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Frame, OpsError> {
    aligned(&Binop::new(desc, arith_values, left, settings), left, other, args)
}

/// `left <op> other` for a logical operator, aligned like arithmetic.
pub fn boolean(
    desc: &OpDescriptor,
    left: &Frame,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Frame, OpsError> {
    aligned(&Binop::new(desc, bool_values, left, settings), left, other, args)
}

/// Flexible comparison. Frames are union-aligned and every position absent
/// on either side resolves to the masker: `true` for `ne`, else `false`.
pub fn flex_compare(
    desc: &OpDescriptor,
    left: &Frame,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Frame, OpsError> {
    aligned(&Binop::new(desc, compare_values, left, settings), left, other, args)
}

/// Operator-form comparison.
///
/// - Frames must be identically labeled.
/// - A series infers its axis.
/// - Against a scalar, a column whose comparison fails becomes all `true`.
pub fn compare(
    desc: &OpDescriptor,
    left: &Frame,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Frame, OpsError> {
    args.check_level()?;
    let b = Binop::new(desc, compare_values, left, settings);
    match other {
        Operand::Frame(right) => {
            left.index.ensure_identical(&right.index, "DataFrame objects")?;
            left.columns.ensure_identical(&right.columns, "DataFrame objects")?;
            combine_frame(&b, left, right, None)
        }
        Operand::Scalar(s) => {
            let n = left.n_rows();
            let cols = map_columns(left.n_cols(), |j| match b.call(left.col(j), Values::Scalar(s)) {
                Ok(col) => Ok(col),
                Err(e) => {
                    debug!(op = %desc.name, column = j, error = %e, "column comparison failed, filling with true");
                    Ok(Column::full(&Scalar::Boolean(true), n))
                }
            })?;
            Ok(Frame::from_parts(cols, left.columns.clone(), left.index.clone()))
        }
        _ => aligned(&b, left, other, args),
    }
}

fn aligned(b: &Binop<'_>, left: &Frame, other: &Operand, args: &OpArgs) -> Result<Frame, OpsError> {
    args.check_level()?;
    let axis = args.axis.or(b.desc.default_axis);
    let fill = args.fill_value.as_ref();
    match other {
        Operand::Frame(right) => combine_frame(b, left, right, fill),
        Operand::Series(s) => {
            reject_series_fill(fill)?;
            combine_series(b, left, s, axis)
        }
        Operand::List(_) | Operand::Array(_) => match wrap(b.desc, left, other, axis)? {
            Wrapped::Series(s) => {
                reject_series_fill(fill)?;
                combine_series(b, left, &s, axis)
            }
            Wrapped::Frame(f) => combine_frame(b, left, &f, fill),
        },
        Operand::Scalar(s) => combine_const(b, left, s),
        Operand::Panel(_) => Err(declined(b.desc, "Frame", other.kind_name())),
    }
}

fn reject_series_fill(fill: Option<&Scalar>) -> Result<(), OpsError> {
    match fill {
        None => Ok(()),
        Some(_) => Err(OpsError::NotImplemented {
            message: "fill_value is not supported between a Frame and a Series".to_string(),
        }),
    }
}

/// Wraps a list or raw buffer in the receiver's labels.
fn wrap(
    desc: &OpDescriptor,
    left: &Frame,
    other: &Operand,
    axis: Option<Axis>,
) -> Result<Wrapped, OpsError> {
    match other {
        Operand::List(items) => {
            wrap_1d(left, Column::from_scalars(items.clone()), vec![items.len()], axis)
        }
        Operand::Array(arr) => match arr.ndim() {
            1 => wrap_1d(left, arr.data.clone(), arr.shape.clone(), axis),
            2 => {
                if arr.shape != [left.n_rows(), left.n_cols()] {
                    return Err(OpsError::Shape {
                        shape: arr.shape.clone(),
                        message: format!(
                            "Unable to coerce to Frame, shape must be [{}, {}]",
                            left.n_rows(),
                            left.n_cols()
                        ),
                    });
                }
                let cols = (0..left.n_cols()).map(|j| Arc::new(arr.column(j))).collect();
                Ok(Wrapped::Frame(Frame::from_parts(
                    cols,
                    left.columns.clone(),
                    left.index.clone(),
                )))
            }
            _ => Err(OpsError::Shape {
                shape: arr.shape.clone(),
                message: "Incompatible argument shape".to_string(),
            }),
        },
        _ => Err(declined(desc, "Frame", other.kind_name())),
    }
}

fn wrap_1d(
    left: &Frame,
    values: Column,
    shape: Vec<usize>,
    axis: Option<Axis>,
) -> Result<Wrapped, OpsError> {
    let labels = match axis {
        Some(Axis::Index) => &left.index,
        _ => &left.columns,
    };
    if values.len() != labels.len() {
        return Err(OpsError::Shape {
            shape,
            message: format!("Unable to coerce to Series, length must be {}", labels.len()),
        });
    }
    Ok(Wrapped::Series(Series::from_parts(values, labels.clone(), None)))
}

/// Frame against frame over the union of both axes.
fn combine_frame(
    b: &Binop<'_>,
    left: &Frame,
    right: &Frame,
    fill: Option<&Scalar>,
) -> Result<Frame, OpsError> {
    let rows = left.index.join(&right.index);
    let cols = left.columns.join(&right.columns);
    let l = left.reindex(rows.left.as_deref(), &rows.index, cols.left.as_deref(), &cols.index);
    let r = right.reindex(rows.right.as_deref(), &rows.index, cols.right.as_deref(), &cols.index);

    if fill.is_none() {
        if let (Some(a), Some(c)) = (l.single_dtype(), r.single_dtype()) {
            if a == c {
                trace!(op = %b.desc.name, rows = l.n_rows(), cols = l.n_cols(), dtype = %a, "bulk frame evaluation");
                let out = b.call(&l.bulk_values()?, Values::Array(&r.bulk_values()?))?;
                return Ok(Frame::from_bulk(&out, cols.index, rows.index));
            }
        }
    }

    trace!(op = %b.desc.name, rows = l.n_rows(), cols = l.n_cols(), "per-column frame evaluation");
    let out = map_columns(l.n_cols(), |j| {
        let before = (
            source(left, cols.left.as_deref(), j),
            source(right, cols.right.as_deref(), j),
        );
        match fill {
            Some(fill) => {
                let (x, y) = fill_one_sided(l.col(j), r.col(j), fill);
                b.call_pair(&x, &y, before, true)
            }
            None => b.call_pair(l.col(j), r.col(j), before, false),
        }
    })?;
    Ok(Frame::from_parts(out, cols.index, rows.index))
}

/// Source column of output column `j`, `None` when the label is absent.
fn source<'a>(frame: &'a Frame, map: Option<&[Option<usize>]>, j: usize) -> Option<&'a Column> {
    match map {
        None => Some(frame.col(j)),
        Some(p) => p[j].map(|k| frame.col(k)),
    }
}

/// Frame against a series broadcast along `axis`.
fn combine_series(
    b: &Binop<'_>,
    left: &Frame,
    series: &Series,
    axis: Option<Axis>,
) -> Result<Frame, OpsError> {
    match axis {
        Some(Axis::Index) => match_index(b, left, series),
        Some(Axis::Columns) => match_columns(b, left, series),
        None => {
            if series.is_empty() {
                return Ok(Frame::all_missing(left.columns.clone(), left.index.clone()));
            }
            if left.n_rows() == 0 {
                return Ok(left.clone());
            }
            if left.index.is_all_dates() && series.index.is_all_dates() {
                debug!(op = %b.desc.name, "both indexes hold timestamps, broadcasting row-wise");
                match_index(b, left, series)
            } else {
                match_columns(b, left, series)
            }
        }
    }
}

fn match_index(b: &Binop<'_>, left: &Frame, series: &Series) -> Result<Frame, OpsError> {
    let joined = left.index.join(&series.index);
    let l = left.reindex(joined.left.as_deref(), &joined.index, None, &left.columns);
    let s = series.reindexed(joined.right.as_deref(), &joined.index);
    let out = map_columns(l.n_cols(), |j| {
        b.call_pair(l.col(j), &s.values, (Some(left.col(j)), Some(&*series.values)), false)
    })?;
    Ok(Frame::from_parts(out, left.columns.clone(), joined.index))
}

fn match_columns(b: &Binop<'_>, left: &Frame, series: &Series) -> Result<Frame, OpsError> {
    let joined = left.columns.join(&series.index);
    let l = left.reindex(None, &left.index, joined.left.as_deref(), &joined.index);
    let s = series.reindexed(joined.right.as_deref(), &joined.index);
    let out = map_columns(l.n_cols(), |j| {
        let v = match joined.right.as_deref().map_or(Some(j), |p| p[j]) {
            // temporal columns read the source series, integers stay integers
            Some(k) if l.col(j).dtype().is_temporal() => series.get(k),
            Some(_) => s.get(j),
            None => match b.against_absent(l.col(j)) {
                Some(out) => return Ok(out),
                None => s.get(j),
            },
        };
        b.call(l.col(j), Values::Scalar(&v))
    })?;
    Ok(Frame::from_parts(out, joined.index, left.index.clone()))
}

/// Frame against a scalar. Uniform numeric frames above the threshold run as one bulk call.
fn combine_const(b: &Binop<'_>, left: &Frame, s: &Scalar) -> Result<Frame, OpsError> {
    if left.n_cols() > 1 && can_use_accelerated_frame(b.desc.str_rep, left, &b.settings) {
        trace!(op = %b.desc.name, rows = left.n_rows(), cols = left.n_cols(), "bulk scalar evaluation");
        let out = b.call(&left.bulk_values()?, Values::Scalar(s))?;
        return Ok(Frame::from_bulk(&out, left.columns.clone(), left.index.clone()));
    }

    #[cfg(feature = "parallel_proc")]
    let out = left
        .par_iter()
        .map(|c| b.call(c, Values::Scalar(s)).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(not(feature = "parallel_proc"))]
    let out = left
        .cols
        .iter()
        .map(|c| b.call(c, Values::Scalar(s)).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Frame::from_parts(out, left.columns.clone(), left.index.clone()))
}

fn map_columns<F>(n: usize, f: F) -> Result<Vec<Arc<Column>>, OpsError>
where
    F: Fn(usize) -> Result<Column, OpsError> + Send + Sync,
{
    #[cfg(feature = "parallel_proc")]
    {
        (0..n).into_par_iter().map(|j| f(j).map(Arc::new)).collect()
    }

    #[cfg(not(feature = "parallel_proc"))]
    {
        (0..n).map(|j| f(j).map(Arc::new)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::operators::{BinaryFunc, BinaryOperator};
    use crate::structs::index::LabelIndex;
    use crate::structs::ndarray::NdArray;

    fn desc(op: BinaryOperator, axis: Option<Axis>) -> OpDescriptor {
        OpDescriptor::new(BinaryFunc::new(op), op.key(), true).with_default_axis(axis)
    }

    fn frame(cols: &[&str], rows: &[i64], values: Vec<Vec<f64>>) -> Frame {
        Frame::new(
            values.into_iter().map(Column::from).collect(),
            cols.iter().copied().collect(),
            rows.iter().copied().collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_union_of_both_axes() {
        let a = frame(&["A", "B"], &[0, 1], vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = frame(&["B", "C"], &[1, 2], vec![vec![10.0, 20.0], vec![30.0, 40.0]]);
        let out = arith(&desc(BinaryOperator::Add, None), &a, &(&b).into(), &OpArgs::new(), &EvalSettings::plain())
            .unwrap();
        assert_eq!(out.columns, ["A", "B", "C"].into_iter().collect::<LabelIndex>());
        assert_eq!(out.index, [0i64, 1, 2].into_iter().collect::<LabelIndex>());
        assert_eq!(out.at(1i64, "B"), Some(Scalar::Float64(14.0)));
        assert!(out.at(0i64, "C").is_some_and(|v| v.is_null()));
        assert!(out.at(2i64, "A").is_some_and(|v| v.is_null()));
    }

    #[test]
    fn test_flex_compare_absent_positions() {
        let a = frame(&["A"], &[0, 1], vec![vec![1.0, 2.0]]);
        let b = frame(&["A"], &[1, 2], vec![vec![2.0, 3.0]]);
        let s = EvalSettings::plain();
        let eq = flex_compare(&desc(BinaryOperator::Equal, Some(Axis::Columns)), &a, &(&b).into(), &OpArgs::new(), &s)
            .unwrap();
        assert_eq!(eq.col(0), &Column::from(vec![false, true, false]));
        let ne = flex_compare(&desc(BinaryOperator::NotEqual, Some(Axis::Columns)), &a, &(&b).into(), &OpArgs::new(), &s)
            .unwrap();
        assert_eq!(ne.col(0), &Column::from(vec![true, false, true]));
    }

    #[test]
    fn test_operator_compare_requires_identical_labels() {
        let a = frame(&["A"], &[0, 1], vec![vec![1.0, 2.0]]);
        let b = frame(&["A"], &[1, 2], vec![vec![2.0, 3.0]]);
        let err = compare(&desc(BinaryOperator::Equal, None), &a, &(&b).into(), &OpArgs::new(), &EvalSettings::plain());
        assert!(matches!(err, Err(OpsError::Validation { .. })));
    }

    #[test]
    fn test_operator_compare_scalar_failure_fills_true() {
        let a = Frame::from_columns(vec![
            ("n", Column::from(vec![1i64, 5])),
            ("s", Column::from(vec![Scalar::from("x"), Scalar::from("y")])),
        ])
        .unwrap();
        let out = compare(
            &desc(BinaryOperator::LessThan, None),
            &a,
            &Operand::from(3i64),
            &OpArgs::new(),
            &EvalSettings::plain(),
        )
        .unwrap();
        assert_eq!(out.col(0), &Column::from(vec![true, false]));
        assert_eq!(out.col(1), &Column::from(vec![true, true]));
    }

    #[test]
    fn test_series_broadcast_axes() {
        let a = frame(&["A", "B"], &[0, 1], vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let by_col = Series::new(vec![10.0, 100.0], ["A", "B"].into_iter().collect(), None).unwrap();
        let out = arith(
            &desc(BinaryOperator::Multiply, Some(Axis::Columns)),
            &a,
            &(&by_col).into(),
            &OpArgs::new(),
            &EvalSettings::plain(),
        )
        .unwrap();
        assert_eq!(out.col(0), &Column::from(vec![10.0, 20.0]));
        assert_eq!(out.col(1), &Column::from(vec![300.0, 400.0]));

        let by_row = Series::from_values(vec![1.0, -1.0]);
        let out = arith(
            &desc(BinaryOperator::Multiply, Some(Axis::Columns)),
            &a,
            &(&by_row).into(),
            &OpArgs::new().axis(Axis::Index),
            &EvalSettings::plain(),
        )
        .unwrap();
        assert_eq!(out.col(0), &Column::from(vec![1.0, -2.0]));
        assert_eq!(out.col(1), &Column::from(vec![3.0, -4.0]));
    }

    #[test]
    fn test_raw_operands_wrapped() {
        let a = frame(&["A", "B"], &[0, 1], vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let s = EvalSettings::plain();
        let d = desc(BinaryOperator::Add, Some(Axis::Columns));

        let list = Operand::List(vec![Scalar::Int64(1), Scalar::Int64(2)]);
        let out = arith(&d, &a, &list, &OpArgs::new(), &s).unwrap();
        assert_eq!(out.col(0), &Column::from(vec![2.0, 3.0]));
        assert_eq!(out.col(1), &Column::from(vec![5.0, 6.0]));

        let grid = NdArray::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]).unwrap();
        let out = arith(&d, &a, &Operand::Array(grid), &OpArgs::new(), &s).unwrap();
        assert_eq!(out.col(0), &Column::from(vec![2.0, 5.0]));
        assert_eq!(out.col(1), &Column::from(vec![5.0, 8.0]));

        let cube = NdArray::new(vec![0.0; 8], vec![2, 2, 2]).unwrap();
        let err = arith(&d, &a, &Operand::Array(cube), &OpArgs::new(), &s);
        assert!(matches!(err, Err(OpsError::Shape { .. })));

        let short = Operand::List(vec![Scalar::Int64(1)]);
        assert!(matches!(arith(&d, &a, &short, &OpArgs::new(), &s), Err(OpsError::Shape { .. })));
    }

    #[test]
    fn test_fill_value_with_series_declined() {
        let a = frame(&["A"], &[0], vec![vec![1.0]]);
        let s = Series::from_values(vec![1.0]);
        let err = arith(
            &desc(BinaryOperator::Add, Some(Axis::Columns)),
            &a,
            &(&s).into(),
            &OpArgs::new().fill_value(0.0),
            &EvalSettings::plain(),
        )
        .unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn test_mixed_frame_matches_per_column_result() {
        let a = Frame::from_columns(vec![
            ("i", Column::from((0..50).collect::<Vec<i64>>())),
            ("f", Column::from((0..50).map(|x| x as f64).collect::<Vec<_>>())),
        ])
        .unwrap();
        let fast = arith(
            &desc(BinaryOperator::Subtract, None),
            &a,
            &Operand::from(1i64),
            &OpArgs::new(),
            &EvalSettings::accelerated(10),
        )
        .unwrap();
        assert_eq!(fast.col(0), &Column::from((-1..49).collect::<Vec<i64>>()));
        assert_eq!(fast.col(1), &Column::from((0..50).map(|x| x as f64 - 1.0).collect::<Vec<_>>()));
    }
}
