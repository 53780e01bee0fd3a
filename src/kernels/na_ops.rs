// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **NA Ops Module** - *Missing-Value Aware Executors*
//!
//! Wraps [`evaluate`] with the missing-value policy shared by every container:
//! - **Arithmetic** ([`na_arith`]): typed kernels first; on a type
//!   incompatibility, a masked per-element pass over the positions where both
//!   operands are present. Then the zero-division fill.
//! - **Comparison** ([`na_compare`]): object columns compare per element,
//!   other dtypes try the typed kernels first. Missing positions resolve to the
//!   operator's masker, `true` for `ne` and `false` otherwise.
//! - **Logical** ([`na_bool`]): typed kernels first, then per element with
//!   missing operands propagating as missing.
//!
//! The masked pass is pure. [`masked_binop`] returns the new values together
//! with an explicit missing mask.

use tracing::debug;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::operators::{BinaryFunc, BinaryOperator};
use crate::enums::scalar::Scalar;
use crate::kernels::elementwise::{Values, compare_scalars, scalar_binop};
use crate::kernels::evaluate::evaluate;
use crate::kernels::settings::EvalSettings;
use crate::structs::bitmask::Bitmask;
use crate::structs::column::Column;

/// Output of the masked per-element pass.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedResult {
    /// One value per position, `Scalar::Null` where `missing` is set.
    pub values: Vec<Scalar>,
    /// Set where either operand was missing.
    pub missing: Bitmask,
}

impl MaskedResult {
    /// Collapses into a column. The dtype is inferred from the computed
    /// positions, then missing positions take the sentinel through
    /// [`Column::upcast_putmask`]: integers move to `Float64`, booleans to `Object`.
    pub fn into_column(self) -> Column {
        let Some(filler) = (0..self.values.len())
            .find(|&i| !self.missing.get(i))
            .map(|i| self.values[i].clone())
        else {
            return Column::from_scalars(self.values);
        };
        let missing = self.missing;
        let dense = self
            .values
            .into_iter()
            .enumerate()
            .map(|(i, v)| if missing.get(i) { filler.clone() } else { v })
            .collect();
        Column::from_scalars(dense).upcast_putmask(&missing)
    }
}

/// Rewrites a per-element type failure as a surfaced validation error.
fn unsupported(func: BinaryFunc, e: OpsError) -> OpsError {
    match e {
        OpsError::TypeIncompatibility { left, right, .. } => OpsError::validation(
            func.key(),
            format!("unsupported operand type(s) for {}: '{}' and '{}'", func, left, right),
        ),
        other => other,
    }
}

#[inline]
fn ordered(func: BinaryFunc, x: Scalar, y: Scalar) -> (Scalar, Scalar) {
    if func.reflected { (y, x) } else { (x, y) }
}

fn check_len(x: &Column, y: Values<'_>) -> Result<(), OpsError> {
    match y.len() {
        Some(n) if n != x.len() => Err(OpsError::LengthMismatch {
            context: "element-wise operands",
            left: x.len(),
            right: n,
        }),
        _ => Ok(()),
    }
}

/// Computes `func(x, y)` per element at the positions where both sides are present.
pub fn masked_binop(func: BinaryFunc, x: &Column, y: Values<'_>) -> Result<MaskedResult, OpsError> {
    check_len(x, y)?;
    let n = x.len();
    let present = &x.notnull() & &y.notnull(n);
    let mut values = Vec::with_capacity(n);
    for i in 0..n {
        if present.get(i) {
            let (l, r) = ordered(func, x.get(i), y.get(i));
            values.push(scalar_binop(func.op, &l, &r).map_err(|e| unsupported(func, e))?);
        } else {
            values.push(Scalar::Null);
        }
    }
    Ok(MaskedResult {
        values,
        missing: present.invert(),
    })
}

/// Arithmetic with the missing-value policy.
///
/// `fill_zeros` is the value written where an integer divisor is zero,
/// `None` disables the fill.
pub fn na_arith(
    func: BinaryFunc,
    symbol: Option<&str>,
    x: &Column,
    y: Values<'_>,
    fill_zeros: Option<f64>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    if let Values::Scalar(s) = y {
        if matches!(s, Scalar::Null) {
            let dtype = if x.dtype() == DType::Object { DType::Object } else { DType::Float64 };
            return Ok(Column::all_missing(dtype, x.len()));
        }
    }
    let result = match evaluate(func, symbol, x, y, settings) {
        Ok(col) => col,
        Err(e) if e.is_type_incompatibility() => {
            debug!(op = %func, error = %e, "typed kernels declined, masked element-wise fallback");
            masked_binop(func, x, y)?.into_column()
        }
        Err(e) => return Err(e),
    };
    Ok(match fill_zeros {
        Some(fill) => fill_zero_division(result, func, x, y, fill),
        None => result,
    })
}

fn is_integer_zero(v: Values<'_>, i: usize) -> bool {
    match v {
        Values::Array(Column::Int64(d)) => d[i] == 0,
        Values::Array(Column::Boolean(d)) => !d[i],
        Values::Scalar(Scalar::Int64(d)) => *d == 0,
        Values::Scalar(Scalar::Boolean(d)) => !*d,
        _ => false,
    }
}

/// Overwrites division-by-zero positions with `fill`.
///
/// Applies where the divisor is an integer zero and the dividend is present.
/// The standard fills are `+inf` for true and floor division and `NaN` for
/// modulo. Float divisors already follow IEEE rules. The result becomes
/// `Float64` when anything is filled.
pub fn fill_zero_division(result: Column, func: BinaryFunc, x: &Column, y: Values<'_>, fill: f64) -> Column {
    let (dividend, divisor) = if func.reflected {
        (y, Values::Array(x))
    } else {
        (Values::Array(x), y)
    };
    let n = result.len();
    let zeroed = Bitmask::from_fn(n, |i| is_integer_zero(divisor, i) && !dividend.get(i).is_null());
    if !zeroed.any() {
        return result;
    }
    match result.cast_f64() {
        Ok(mut values) => {
            for i in zeroed.iter_set() {
                values[i] = fill;
            }
            Column::Float64(values)
        }
        Err(_) => result,
    }
}

/// Comparison with the missing-value policy. Always returns a boolean column,
/// with `masker` at every position missing on either side.
pub fn na_compare(
    op: BinaryOperator,
    symbol: Option<&str>,
    x: &Column,
    y: Values<'_>,
    masker: bool,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    check_len(x, y)?;
    let n = x.len();
    let func = BinaryFunc::new(op);
    let native = if x.dtype() == DType::Object {
        None
    } else {
        match evaluate(func, symbol, x, y, settings) {
            Ok(Column::Boolean(b)) => Some(b),
            Ok(_) => None,
            Err(e) if e.is_type_incompatibility() => {
                debug!(op = %op, error = %e, "typed comparison declined, comparing per element");
                None
            }
            Err(e) => return Err(e),
        }
    };
    let mut out = match native {
        Some(b) => b,
        None => (0..n)
            .map(|i| {
                compare_scalars(op, &x.get(i), &y.get(i)).map_err(|e| match e {
                    OpsError::TypeIncompatibility { left, right, .. } => OpsError::validation(
                        op.key(),
                        format!("Cannot compare type '{}' with type '{}'", left, right),
                    ),
                    other => other,
                })
            })
            .collect::<Result<_, _>>()?,
    };
    let missing = &x.isnull() | &y.notnull(n).invert();
    for i in missing.iter_set() {
        out[i] = masker;
    }
    Ok(Column::Boolean(out))
}

/// Logical operators with the missing-value policy.
pub fn na_bool(
    func: BinaryFunc,
    symbol: Option<&str>,
    x: &Column,
    y: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    check_len(x, y)?;
    match evaluate(func, symbol, x, y, settings) {
        Ok(col) => return Ok(col),
        Err(e) if e.is_type_incompatibility() => {
            debug!(op = %func, error = %e, "typed logic declined, combining per element");
        }
        Err(e) => return Err(e),
    }
    let values = (0..x.len())
        .map(|i| {
            let (l, r) = ordered(func, x.get(i), y.get(i));
            if l.is_null() || r.is_null() {
                return Ok(Scalar::Null);
            }
            scalar_binop(func.op, &l, &r).map_err(|e| unsupported(func, e))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Column::from_scalars(values))
}
