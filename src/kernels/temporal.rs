// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Temporal Module** - *Datetime and Time-Delta Coercion*
//!
//! Prepares arithmetic where either operand is a datetime or time-delta column.
//! Operands are classified, the operator is checked against the legal
//! combinations, both sides become `i64` ticks (or `f64` for time-delta
//! ratios), and a [`TemporalOperationContext`] carries the missing mask and the
//! result dtype through to [`TemporalOperationContext::wrap_results`].
//!
//! ## Legal combinations
//! | left | right | operators |
//! |---|---|---|
//! | time-delta | integer, or the reverse | `mul`, `truediv`, `floordiv` |
//! | datetime | datetime | `sub` |
//! | time-delta | time-delta | `add`, `sub`, `truediv`, `floordiv` |
//! | datetime | time-delta | `add`, `sub` |
//! | time-delta | datetime | `add` |
//!
//! Fixed date offsets count as time-deltas. Calendar offsets have no fixed
//! length and are rejected. Reflected operators are declined with
//! [`OpsError::UnsupportedReflection`] so the caller can try the other operand.

use std::fmt::{Display, Formatter};

use num_traits::cast;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::operators::{BinaryFunc, BinaryOperator};
use crate::enums::scalar::{NAT, Scalar};
use crate::kernels::elementwise::Values;
use crate::structs::bitmask::Bitmask;
use crate::structs::column::Column;

/// Operand classification for temporal arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalKind {
    Datetime,
    Timedelta,
    Integer,
    Offset,
    Incompatible,
}

impl TemporalKind {
    /// Classifies an operand by dtype, or by element kinds for object columns.
    pub fn of(v: Values<'_>) -> TemporalKind {
        match v {
            Values::Scalar(s) => Self::of_scalar(s),
            Values::Array(col) => match col {
                Column::Datetime(_) => TemporalKind::Datetime,
                Column::Timedelta(_) => TemporalKind::Timedelta,
                Column::Int64(_) => TemporalKind::Integer,
                Column::Object(items) => Self::infer(items),
                Column::Boolean(_) | Column::Float64(_) => TemporalKind::Incompatible,
            },
        }
    }

    fn of_scalar(s: &Scalar) -> TemporalKind {
        match s {
            Scalar::Datetime(_) => TemporalKind::Datetime,
            Scalar::Timedelta(_) => TemporalKind::Timedelta,
            Scalar::Int64(_) => TemporalKind::Integer,
            Scalar::Offset(_) => TemporalKind::Offset,
            _ => TemporalKind::Incompatible,
        }
    }

    fn infer(items: &[Scalar]) -> TemporalKind {
        let mut kinds = items.iter().filter(|s| !s.is_null()).map(Self::of_scalar);
        let Some(first) = kinds.next() else {
            return TemporalKind::Incompatible;
        };
        kinds.try_fold(first, |acc, k| match (acc, k) {
            (a, b) if a == b => Some(a),
            (TemporalKind::Timedelta | TemporalKind::Offset, TemporalKind::Timedelta | TemporalKind::Offset) => {
                Some(TemporalKind::Offset)
            }
            _ => None,
        })
        .unwrap_or(TemporalKind::Incompatible)
    }

    #[inline]
    fn is_delta(self) -> bool {
        matches!(self, TemporalKind::Timedelta | TemporalKind::Offset)
    }

    #[inline]
    fn is_temporal(self) -> bool {
        matches!(self, TemporalKind::Datetime | TemporalKind::Timedelta)
    }
}

impl Display for TemporalKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TemporalKind::Datetime => "datetime64[ns]",
            TemporalKind::Timedelta => "timedelta64[ns]",
            TemporalKind::Integer => "integer",
            TemporalKind::Offset => "DateOffset",
            TemporalKind::Incompatible => "incompatible",
        })
    }
}

/// Whether the combination is legal for `op`.
pub fn is_legal(op: BinaryOperator, left: TemporalKind, right: TemporalKind) -> bool {
    use BinaryOperator::*;
    use TemporalKind::*;
    match (left, right) {
        (l, Integer) if l.is_delta() => matches!(op, Multiply | TrueDivide | FloorDivide),
        (Integer, r) if r.is_delta() => matches!(op, Multiply | TrueDivide | FloorDivide),
        (Datetime, Datetime) => op == Subtract,
        (l, r) if l.is_delta() && r.is_delta() => {
            matches!(op, Add | Subtract | TrueDivide | FloorDivide)
        }
        (Datetime, r) if r.is_delta() => matches!(op, Add | Subtract),
        (l, Datetime) if l.is_delta() => op == Add,
        _ => false,
    }
}

/// Right-hand operand after conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Converted {
    Array(Column),
    Scalar(Scalar),
}

impl Converted {
    pub fn values(&self) -> Values<'_> {
        match self {
            Converted::Array(c) => Values::Array(c),
            Converted::Scalar(s) => Values::Scalar(s),
        }
    }
}

/// Per-call state of a temporal operation.
#[derive(Debug, Clone, PartialEq)]
pub struct TemporalOperationContext {
    pub left: Column,
    pub right: Converted,
    /// Set where either original operand was missing.
    pub mask: Bitmask,
    pub dtype: DType,
    pub fill: Scalar,
}

fn non_absolute(offset: &impl Display) -> OpsError {
    OpsError::Validation {
        op: None,
        message: format!("cannot use a non-absolute DateOffset in datetime/timedelta operations [{offset}]"),
    }
}

fn scalar_ticks(s: &Scalar) -> Result<i64, OpsError> {
    match s {
        Scalar::Offset(o) => o.delta().ok_or_else(|| non_absolute(o)),
        Scalar::Int64(v) => Ok(*v),
        other => Ok(other.try_ticks().unwrap_or(NAT)),
    }
}

fn to_ticks(col: &Column) -> Result<Column, OpsError> {
    Ok(match col {
        Column::Datetime(v) | Column::Timedelta(v) | Column::Int64(v) => Column::Int64(v.clone()),
        // integers upcast by reindexing
        Column::Float64(v) => Column::Int64(v.iter().map(|&f| cast::<f64, i64>(f).unwrap_or(NAT)).collect()),
        Column::Object(items) => Column::Int64(items.iter().map(scalar_ticks).collect::<Result<_, _>>()?),
        other => other.clone(),
    })
}

/// Ticks as floats, with missing ticks reading as NaN.
fn ticks_to_f64(col: &Column, missing: &Bitmask) -> Result<Column, OpsError> {
    let mut values = col.cast_f64()?;
    for i in missing.iter_set() {
        values[i] = f64::NAN;
    }
    Ok(Column::Float64(values))
}

impl TemporalOperationContext {
    /// Classifies and converts the operands of `func(left, right)`.
    ///
    /// Returns `Ok(None)` when neither side is a datetime or time-delta column.
    pub fn prepare(
        func: BinaryFunc,
        left: &Column,
        right: Values<'_>,
    ) -> Result<Option<Self>, OpsError> {
        let kinds = (TemporalKind::of(Values::Array(left)), TemporalKind::of(right));
        Self::prepare_as(func, left, right, kinds)
    }

    /// [`prepare`](Self::prepare) with the operand kinds given by the caller.
    ///
    /// Aligned operands pass the kinds of their columns before reindexing:
    /// an integer column with absent labels arrives as `Float64` with NaN
    /// holes and still counts as `Integer`. Its holes become NaT.
    pub fn prepare_as(
        func: BinaryFunc,
        left: &Column,
        right: Values<'_>,
        (lk, rk): (TemporalKind, TemporalKind),
    ) -> Result<Option<Self>, OpsError> {
        let right_is_temporal = matches!(right, Values::Array(c) if c.dtype().is_temporal());
        if !lk.is_temporal() && !right_is_temporal {
            return Ok(None);
        }
        if func.reflected {
            return Err(OpsError::UnsupportedReflection {
                op: func.special_name(),
                dtype: left.dtype().name(),
            });
        }
        let op = func.op;
        if !is_legal(op, lk, rk) {
            return Err(OpsError::validation(
                op.key(),
                format!("cannot operate on {} with {} using '{}'", lk, rk, op.key()),
            ));
        }

        let n = left.len();
        if let Some(m) = right.len().filter(|&m| m != n) {
            return Err(OpsError::LengthMismatch {
                context: "temporal operands",
                left: n,
                right: m,
            });
        }
        let mask = &left.isnull() | &right.notnull(n).invert();

        let dtype = match (lk, rk) {
            (TemporalKind::Datetime, TemporalKind::Datetime) => DType::Timedelta,
            (TemporalKind::Datetime, _) | (_, TemporalKind::Datetime) => DType::Datetime,
            (l, r) if op == BinaryOperator::TrueDivide && l.is_delta() && r.is_delta() => DType::Float64,
            _ => DType::Timedelta,
        };
        let fill = match dtype {
            DType::Float64 => Scalar::Float64(f64::NAN),
            DType::Datetime => Scalar::Datetime(NAT),
            _ => Scalar::Timedelta(NAT),
        };

        let mut left = to_ticks(left)?;
        let mut right = match right {
            Values::Array(c) => Converted::Array(to_ticks(c)?),
            Values::Scalar(s) => Converted::Scalar(Scalar::Int64(scalar_ticks(s)?)),
        };
        if dtype == DType::Float64 {
            left = ticks_to_f64(&left, &mask)?;
            right = match right {
                Converted::Array(c) => Converted::Array(ticks_to_f64(&c, &mask)?),
                Converted::Scalar(s) => Converted::Scalar(match s.try_i64() {
                    Some(NAT) | None => Scalar::Float64(f64::NAN),
                    Some(t) => Scalar::Float64(t as f64),
                }),
            };
        }

        Ok(Some(Self {
            left,
            right,
            mask,
            dtype,
            fill,
        }))
    }

    /// Retypes a raw result buffer and writes the fill at masked positions.
    pub fn wrap_results(&self, raw: Column) -> Result<Column, OpsError> {
        if self.dtype == DType::Float64 {
            return ticks_to_f64(&raw, &self.mask);
        }
        let mut ticks = match raw {
            Column::Int64(v) => v,
            other => other
                .cast_f64()?
                .iter()
                .map(|&f| cast::<f64, i64>(f.trunc()).unwrap_or(NAT))
                .collect(),
        };
        for i in self.mask.iter_set() {
            ticks[i] = NAT;
        }
        Ok(match self.dtype {
            DType::Datetime => Column::Datetime(ticks),
            _ => Column::Timedelta(ticks),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::time_units::{DateOffset, NANOS_PER_DAY};
    use crate::kernels::elementwise::apply;

    fn run(func: BinaryFunc, left: &Column, right: Values<'_>) -> Result<Column, OpsError> {
        let ctx = TemporalOperationContext::prepare(func, left, right)?.unwrap();
        let raw = apply(func.op, Values::Array(&ctx.left), ctx.right.values())?;
        ctx.wrap_results(raw)
    }

    #[test]
    fn test_non_temporal_passes_through() {
        let a = Column::from(vec![1i64]);
        let out = TemporalOperationContext::prepare(BinaryOperator::Add.into(), &a, (&a).into()).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_datetime_minus_datetime() {
        let a = Column::datetime([10, NAT, 30]);
        let b = Column::datetime([4, 5, 6]);
        let func = BinaryOperator::Subtract.into();
        let ctx = TemporalOperationContext::prepare(func, &a, (&b).into()).unwrap().unwrap();
        assert_eq!(ctx.dtype, DType::Timedelta);
        let raw = apply(func.op, Values::Array(&ctx.left), ctx.right.values()).unwrap();
        let out = ctx.wrap_results(raw).unwrap();
        assert_eq!(out, Column::timedelta([6, NAT, 24]));
    }

    #[test]
    fn test_timedelta_ratio_is_float() {
        let a = Column::timedelta([10, NAT]);
        let b = Scalar::Timedelta(4);
        let func = BinaryOperator::TrueDivide.into();
        let ctx = TemporalOperationContext::prepare(func, &a, (&b).into()).unwrap().unwrap();
        assert_eq!(ctx.dtype, DType::Float64);
        let raw = apply(func.op, Values::Array(&ctx.left), ctx.right.values()).unwrap();
        let out = ctx.wrap_results(raw).unwrap();
        assert_eq!(out.get(0), Scalar::Float64(2.5));
        assert!(out.get(1).is_null());
    }

    #[test]
    fn test_timedelta_by_integer_truncates() {
        let a = Column::timedelta([10, 7]);
        let two = Scalar::Int64(2);
        let func = BinaryOperator::TrueDivide.into();
        let ctx = TemporalOperationContext::prepare(func, &a, (&two).into()).unwrap().unwrap();
        assert_eq!(ctx.dtype, DType::Timedelta);
        let raw = apply(func.op, Values::Array(&ctx.left), ctx.right.values()).unwrap();
        assert_eq!(ctx.wrap_results(raw).unwrap(), Column::timedelta([5, 3]));
    }

    #[test]
    fn test_offsets() {
        let a = Column::datetime([0, NANOS_PER_DAY]);
        let day = Scalar::Offset(DateOffset::days(1));
        let out = run(BinaryOperator::Add.into(), &a, (&day).into()).unwrap();
        assert_eq!(out, Column::datetime([NANOS_PER_DAY, 2 * NANOS_PER_DAY]));

        let month = Scalar::Offset(DateOffset::months(1));
        let err = TemporalOperationContext::prepare(BinaryOperator::Add.into(), &a, (&month).into())
            .unwrap_err();
        match err {
            OpsError::Validation { message, .. } => assert!(message.contains("non-absolute")),
            _ => panic!("expected a validation error"),
        }

        let deltas = Column::Object(vec![Scalar::Offset(DateOffset::hours(1)), Scalar::Timedelta(5)]);
        assert_eq!(TemporalKind::of((&deltas).into()), TemporalKind::Offset);
    }

    #[test]
    fn test_illegal_and_reflected() {
        let a = Column::datetime([1]);
        let err = TemporalOperationContext::prepare(BinaryOperator::Add.into(), &a, (&a).into()).unwrap_err();
        assert!(matches!(err, OpsError::Validation { .. }));

        let td = Column::timedelta([1]);
        let err = TemporalOperationContext::prepare(
            BinaryFunc::reflected(BinaryOperator::Add),
            &td,
            (&td).into(),
        )
        .unwrap_err();
        assert!(matches!(err, OpsError::UnsupportedReflection { .. }));

        let f = Column::from(vec![1.5]);
        assert!(TemporalOperationContext::prepare(BinaryOperator::Multiply.into(), &td, (&f).into()).is_err());
    }

    #[test]
    fn test_integer_times_timedelta_from_either_side() {
        let ints = Column::from(vec![2i64, 3]);
        let td = Column::timedelta([10, NAT]);
        let out = run(BinaryOperator::Multiply.into(), &ints, (&td).into()).unwrap();
        assert_eq!(out, Column::timedelta([20, NAT]));
    }

    #[test]
    fn test_reindexed_integers_keep_their_kind() {
        let td = Column::timedelta([10, 20, NAT]);
        let ints = Column::from(vec![f64::NAN, 3.0, 4.0]);
        let func = BinaryOperator::Multiply.into();
        let kinds = (TemporalKind::Timedelta, TemporalKind::Integer);
        let ctx = TemporalOperationContext::prepare_as(func, &td, (&ints).into(), kinds)
            .unwrap()
            .unwrap();
        assert_eq!(ctx.mask.to_bools(), vec![true, false, true]);
        let raw = apply(func.op, Values::Array(&ctx.left), ctx.right.values()).unwrap();
        assert_eq!(ctx.wrap_results(raw).unwrap(), Column::timedelta([NAT, 60, NAT]));

        let err = TemporalOperationContext::prepare(func, &td, (&ints).into()).unwrap_err();
        assert!(matches!(err, OpsError::Validation { .. }));
    }

    #[test]
    fn test_legal_table() {
        use BinaryOperator::*;
        use TemporalKind::*;
        assert!(is_legal(Subtract, Datetime, Datetime));
        assert!(!is_legal(Add, Datetime, Datetime));
        assert!(is_legal(Add, Timedelta, Datetime));
        assert!(!is_legal(Subtract, Timedelta, Datetime));
        assert!(is_legal(FloorDivide, Timedelta, Integer));
        assert!(!is_legal(Add, Timedelta, Integer));
        assert!(!is_legal(Add, Datetime, Incompatible));
    }
}
