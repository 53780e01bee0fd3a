// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Elementwise Module** - *Typed Kernels and Per-Element Fallback*
//!
//! Two layers:
//! - **Typed kernels** over whole buffers: [`apply`] and [`apply_with`]. These
//!   accept boolean, integer and float operands (plus temporal operands for
//!   comparisons) and decline everything else with
//!   [`OpsError::TypeIncompatibility`].
//! - **Scalar kernels**: [`scalar_binop`] and [`compare_scalars`], the
//!   per-element rules used for object columns and for the masked fallback.
//!
//! ## Numeric rules
//! - Booleans promote to integers for arithmetic and mixed-kind operations.
//! - Integer arithmetic wraps on overflow. True division always yields floats.
//! - Floor division and modulo follow the sign of the divisor. Integer floor
//!   division or modulo by zero yields `0`; the executor's zero-division fill
//!   then decides the visible value.
//! - Integer powers with a negative exponent are a validation error on the
//!   typed path and produce a float on the per-element path.
//! - Comparisons involving NaN are `false`, except `ne` which is `true`.
//!
//! The typed kernels are generic over a [`Runner`], which is how the
//! accelerated backend reuses the exact same element functions.

use std::borrow::Cow;
use std::cmp::Ordering;

use num_traits::Float;
use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::operators::{BinaryOperator, OpKind};
use crate::enums::scalar::{NAT, Scalar};
use crate::structs::bitmask::Bitmask;
use crate::structs::column::Column;

/// One side of a binary kernel: a whole column or a broadcast scalar.
#[derive(Debug, Clone, Copy)]
pub enum Values<'a> {
    Array(&'a Column),
    Scalar(&'a Scalar),
}

impl<'a> Values<'a> {
    /// Element count of an array side, `None` for a scalar.
    #[inline]
    pub fn len(&self) -> Option<usize> {
        match self {
            Values::Array(c) => Some(c.len()),
            Values::Scalar(_) => None,
        }
    }

    /// Dtype of the array, or the dtype a scalar would broadcast into.
    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            Values::Array(c) => c.dtype(),
            Values::Scalar(s) => s.dtype().unwrap_or(DType::Object),
        }
    }

    /// Element `i`, the scalar itself for a scalar side.
    #[inline]
    pub fn get(&self, i: usize) -> Scalar {
        match self {
            Values::Array(c) => c.get(i),
            Values::Scalar(s) => (*s).clone(),
        }
    }

    /// Validity over `n` positions.
    pub fn notnull(&self, n: usize) -> Bitmask {
        match self {
            Values::Array(c) => c.notnull(),
            Values::Scalar(s) => Bitmask::new_set_all(n, !s.is_null()),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.dtype().name()
    }
}

impl<'a> From<&'a Column> for Values<'a> {
    fn from(c: &'a Column) -> Self {
        Values::Array(c)
    }
}

impl<'a> From<&'a Scalar> for Values<'a> {
    fn from(s: &'a Scalar) -> Self {
        Values::Scalar(s)
    }
}

/// A typed view of one kernel side, borrowed when no conversion was needed.
#[derive(Debug, Clone)]
pub enum Side<'a, T: Clone> {
    Slice(Cow<'a, [T]>),
    Scalar(T),
}

impl<'a, T: Clone> Side<'a, T> {
    #[inline(always)]
    pub fn at(&self, i: usize) -> T {
        match self {
            Side::Slice(s) => s[i].clone(),
            Side::Scalar(v) => v.clone(),
        }
    }

    fn any(&self, pred: impl Fn(&T) -> bool) -> bool {
        match self {
            Side::Slice(s) => s.iter().any(pred),
            Side::Scalar(v) => pred(v),
        }
    }
}

/// Executes a binary element function over `n` positions.
pub trait Runner {
    fn map2<A, B, O, F>(&self, n: usize, l: &Side<'_, A>, r: &Side<'_, B>, f: F) -> Vec64<O>
    where
        A: Clone + Send + Sync,
        B: Clone + Send + Sync,
        O: Clone + Default + Send + Sync,
        F: Fn(A, B) -> O + Send + Sync;
}

/// Single pass on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sequential;

impl Runner for Sequential {
    #[inline]
    fn map2<A, B, O, F>(&self, n: usize, l: &Side<'_, A>, r: &Side<'_, B>, f: F) -> Vec64<O>
    where
        A: Clone + Send + Sync,
        B: Clone + Send + Sync,
        O: Clone + Default + Send + Sync,
        F: Fn(A, B) -> O + Send + Sync,
    {
        (0..n).map(|i| f(l.at(i), r.at(i))).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum NumKind {
    Bool,
    Int,
    Float,
}

fn num_kind(v: Values<'_>) -> Option<NumKind> {
    match v.dtype() {
        DType::Boolean => Some(NumKind::Bool),
        DType::Int64 => Some(NumKind::Int),
        DType::Float64 => Some(NumKind::Float),
        _ => None,
    }
}

fn bool_side(v: Values<'_>) -> Option<Side<'_, bool>> {
    match v {
        Values::Array(Column::Boolean(b)) => Some(Side::Slice(Cow::Borrowed(b.as_slice()))),
        Values::Scalar(Scalar::Boolean(b)) => Some(Side::Scalar(*b)),
        _ => None,
    }
}

fn i64_side(v: Values<'_>) -> Option<Side<'_, i64>> {
    match v {
        Values::Array(Column::Int64(x)) => Some(Side::Slice(Cow::Borrowed(x.as_slice()))),
        Values::Array(Column::Boolean(b)) => {
            Some(Side::Slice(Cow::Owned(b.iter().map(|&x| x as i64).collect())))
        }
        Values::Scalar(s) => s.try_i64().map(Side::Scalar),
        _ => None,
    }
}

fn f64_side(v: Values<'_>) -> Option<Side<'_, f64>> {
    match v {
        Values::Array(Column::Float64(x)) => Some(Side::Slice(Cow::Borrowed(x.as_slice()))),
        Values::Array(Column::Int64(x)) => {
            Some(Side::Slice(Cow::Owned(x.iter().map(|&v| v as f64).collect())))
        }
        Values::Array(Column::Boolean(b)) => {
            Some(Side::Slice(Cow::Owned(b.iter().map(|&v| v as i64 as f64).collect())))
        }
        Values::Scalar(s) if s.is_numeric() => s.try_f64().map(Side::Scalar),
        _ => None,
    }
}

/// Raw ticks of a datetime or time-delta side, with its dtype.
fn tick_side(v: Values<'_>) -> Option<(DType, Side<'_, i64>)> {
    match v {
        Values::Array(c) => match c {
            Column::Datetime(x) | Column::Timedelta(x) => {
                Some((c.dtype(), Side::Slice(Cow::Borrowed(x.as_slice()))))
            }
            _ => None,
        },
        Values::Scalar(s) => match s {
            Scalar::Datetime(x) | Scalar::Timedelta(x) => s.dtype().map(|d| (d, Side::Scalar(*x))),
            _ => None,
        },
    }
}

// Element functions

/// Floor division rounding toward negative infinity. Division by zero yields 0.
#[inline]
pub fn floordiv_i64(a: i64, b: i64) -> i64 {
    if b == 0 {
        return 0;
    }
    let q = a.wrapping_div(b);
    if a.wrapping_rem(b) != 0 && ((a < 0) != (b < 0)) {
        q.wrapping_sub(1)
    } else {
        q
    }
}

/// Modulo taking the sign of the divisor. Modulo by zero yields 0.
#[inline]
pub fn mod_i64(a: i64, b: i64) -> i64 {
    if b == 0 {
        return 0;
    }
    let r = a.wrapping_rem(b);
    if r != 0 && ((r < 0) != (b < 0)) {
        r.wrapping_add(b)
    } else {
        r
    }
}

/// Wrapping integer power. Callers reject negative exponents beforehand.
#[inline]
pub fn pow_i64(a: i64, b: i64) -> i64 {
    a.wrapping_pow(b.clamp(0, u32::MAX as i64) as u32)
}

/// Float modulo taking the sign of the divisor.
#[inline]
pub fn mod_float<T: Float>(a: T, b: T) -> T {
    let zero = T::zero();
    let m = a % b;
    if m != zero {
        if (b < zero) != (m < zero) { m + b } else { m }
    } else {
        zero.copysign(b)
    }
}

/// Float floor division, consistent with [`mod_float`] so that `a == b * (a // b) + a % b`.
#[inline]
pub fn floordiv_float<T: Float>(a: T, b: T) -> T {
    let zero = T::zero();
    if b == zero {
        return a / b;
    }
    let m = a % b;
    let mut div = (a - m) / b;
    if m != zero && ((b < zero) != (m < zero)) {
        div = div - T::one();
    }
    if div != zero {
        let floored = div.floor();
        let half = T::one() / (T::one() + T::one());
        if div - floored > half { floored + T::one() } else { floored }
    } else {
        zero.copysign(a / b)
    }
}

fn int_kernel(op: BinaryOperator) -> Option<fn(i64, i64) -> i64> {
    match op {
        BinaryOperator::Add => Some(i64::wrapping_add),
        BinaryOperator::Subtract => Some(i64::wrapping_sub),
        BinaryOperator::Multiply => Some(i64::wrapping_mul),
        BinaryOperator::FloorDivide => Some(floordiv_i64),
        BinaryOperator::Remainder => Some(mod_i64),
        BinaryOperator::Power => Some(pow_i64),
        _ => None,
    }
}

fn float_kernel(op: BinaryOperator) -> Option<fn(f64, f64) -> f64> {
    match op {
        BinaryOperator::Add => Some(|a, b| a + b),
        BinaryOperator::Subtract => Some(|a, b| a - b),
        BinaryOperator::Multiply => Some(|a, b| a * b),
        BinaryOperator::TrueDivide => Some(|a, b| a / b),
        BinaryOperator::FloorDivide => Some(floordiv_float::<f64>),
        BinaryOperator::Remainder => Some(mod_float::<f64>),
        BinaryOperator::Power => Some(f64::powf),
        _ => None,
    }
}

fn cmp_kernel<T: PartialOrd>(op: BinaryOperator) -> Option<fn(T, T) -> bool> {
    match op {
        BinaryOperator::Equal => Some(|a, b| a == b),
        BinaryOperator::NotEqual => Some(|a, b| a != b),
        BinaryOperator::LessThan => Some(|a, b| a < b),
        BinaryOperator::GreaterThan => Some(|a, b| a > b),
        BinaryOperator::LessEqual => Some(|a, b| a <= b),
        BinaryOperator::GreaterEqual => Some(|a, b| a >= b),
        _ => None,
    }
}

fn bool_logic(op: BinaryOperator) -> Option<fn(bool, bool) -> bool> {
    match op {
        BinaryOperator::And => Some(|a, b| a & b),
        BinaryOperator::Or => Some(|a, b| a | b),
        BinaryOperator::Xor => Some(|a, b| a ^ b),
        _ => None,
    }
}

fn int_logic(op: BinaryOperator) -> Option<fn(i64, i64) -> i64> {
    match op {
        BinaryOperator::And => Some(|a, b| a & b),
        BinaryOperator::Or => Some(|a, b| a | b),
        BinaryOperator::Xor => Some(|a, b| a ^ b),
        _ => None,
    }
}

// Typed kernels

#[inline]
fn incompatible(op: BinaryOperator, left: &'static str, right: &'static str) -> OpsError {
    OpsError::TypeIncompatibility {
        op: op.key(),
        left,
        right,
    }
}

fn output_len(left: Values<'_>, right: Values<'_>) -> Result<usize, OpsError> {
    match (left.len(), right.len()) {
        (Some(l), Some(r)) if l != r => Err(OpsError::LengthMismatch {
            context: "elementwise kernel",
            left: l,
            right: r,
        }),
        (Some(n), _) | (None, Some(n)) => Ok(n),
        (None, None) => Err(OpsError::Validation {
            op: None,
            message: "elementwise kernels need at least one array operand".into(),
        }),
    }
}

/// Applies `op` element-wise on the calling thread.
///
/// Computes `op(left, right)`. Callers swap the arguments for reflected operators.
pub fn apply(op: BinaryOperator, left: Values<'_>, right: Values<'_>) -> Result<Column, OpsError> {
    apply_with(op, left, right, &Sequential)
}

/// Applies `op` element-wise through the given runner.
pub fn apply_with<R: Runner>(
    op: BinaryOperator,
    left: Values<'_>,
    right: Values<'_>,
    runner: &R,
) -> Result<Column, OpsError> {
    let n = output_len(left, right)?;

    if op.kind() == OpKind::Comparison {
        if let (Some((ld, l)), Some((rd, r))) = (tick_side(left), tick_side(right)) {
            if ld == rd {
                let f = cmp_kernel::<i64>(op).ok_or(incompatible(op, ld.name(), rd.name()))?;
                return Ok(Column::Boolean(runner.map2(n, &l, &r, f)));
            }
        }
    }

    let (Some(lk), Some(rk)) = (num_kind(left), num_kind(right)) else {
        return Err(incompatible(op, left.type_name(), right.type_name()));
    };
    let kind = lk.max(rk);
    let mismatch = || incompatible(op, left.type_name(), right.type_name());

    match op.kind() {
        OpKind::Arithmetic => {
            if kind == NumKind::Float || op == BinaryOperator::TrueDivide {
                let (l, r) = (f64_side(left).ok_or_else(mismatch)?, f64_side(right).ok_or_else(mismatch)?);
                let f = float_kernel(op).ok_or_else(mismatch)?;
                return Ok(Column::Float64(runner.map2(n, &l, &r, f)));
            }
            let (l, r) = (i64_side(left).ok_or_else(mismatch)?, i64_side(right).ok_or_else(mismatch)?);
            if op == BinaryOperator::Power && r.any(|&e| e < 0) {
                return Err(OpsError::validation(
                    op.key(),
                    "Integers to negative integer powers are not allowed.",
                ));
            }
            let f = int_kernel(op).ok_or_else(mismatch)?;
            Ok(Column::Int64(runner.map2(n, &l, &r, f)))
        }
        OpKind::Comparison => {
            if kind == NumKind::Float {
                let (l, r) = (f64_side(left).ok_or_else(mismatch)?, f64_side(right).ok_or_else(mismatch)?);
                let f = cmp_kernel::<f64>(op).ok_or_else(mismatch)?;
                Ok(Column::Boolean(runner.map2(n, &l, &r, f)))
            } else {
                let (l, r) = (i64_side(left).ok_or_else(mismatch)?, i64_side(right).ok_or_else(mismatch)?);
                let f = cmp_kernel::<i64>(op).ok_or_else(mismatch)?;
                Ok(Column::Boolean(runner.map2(n, &l, &r, f)))
            }
        }
        OpKind::Logical => match kind {
            NumKind::Bool => {
                let (l, r) = (bool_side(left).ok_or_else(mismatch)?, bool_side(right).ok_or_else(mismatch)?);
                let f = bool_logic(op).ok_or_else(mismatch)?;
                Ok(Column::Boolean(runner.map2(n, &l, &r, f)))
            }
            NumKind::Int => {
                let (l, r) = (i64_side(left).ok_or_else(mismatch)?, i64_side(right).ok_or_else(mismatch)?);
                let f = int_logic(op).ok_or_else(mismatch)?;
                Ok(Column::Int64(runner.map2(n, &l, &r, f)))
            }
            NumKind::Float => Err(mismatch()),
        },
    }
}

/// Element-wise selection: `cond ? a : b`. Both branches must share a numeric dtype.
pub fn select_with<R: Runner>(
    cond: &[bool],
    a: Values<'_>,
    b: Values<'_>,
    runner: &R,
) -> Result<Column, OpsError> {
    let n = cond.len();
    for side in [a, b] {
        if let Some(len) = side.len() {
            if len != n {
                return Err(OpsError::LengthMismatch {
                    context: "where",
                    left: n,
                    right: len,
                });
            }
        }
    }
    let c: Side<'_, bool> = Side::Slice(Cow::Borrowed(cond));
    let (Some(ak), Some(bk)) = (num_kind(a), num_kind(b)) else {
        return Err(incompatible(BinaryOperator::Equal, a.type_name(), b.type_name()));
    };
    let mismatch = || incompatible(BinaryOperator::Equal, a.type_name(), b.type_name());
    macro_rules! pick {
        ($side:ident, $variant:ident) => {{
            let (x, y) = ($side(a).ok_or_else(mismatch)?, $side(b).ok_or_else(mismatch)?);
            let idx: Side<'_, usize> = Side::Slice(Cow::Owned((0..n).collect()));
            let picks = runner.map2(n, &c, &idx, |take_a, i| if take_a { x.at(i) } else { y.at(i) });
            Ok(Column::$variant(picks))
        }};
    }
    match ak.max(bk) {
        NumKind::Float => pick!(f64_side, Float64),
        NumKind::Int => pick!(i64_side, Int64),
        NumKind::Bool => pick!(bool_side, Boolean),
    }
}

// Per-element kernels

#[inline]
fn scalar_incompatible(op: BinaryOperator, l: &Scalar, r: &Scalar) -> OpsError {
    incompatible(op, l.type_name(), r.type_name())
}

/// Applies `op` to two scalars under per-element rules.
///
/// Covers numeric mixes, string concatenation and repetition, temporal
/// arithmetic, comparisons across kinds and bitwise logic on booleans and
/// integers. Missing operands in arithmetic or logic are a type
/// incompatibility, which callers resolve by masking.
pub fn scalar_binop(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<Scalar, OpsError> {
    match op.kind() {
        OpKind::Comparison => compare_scalars(op, l, r).map(Scalar::Boolean),
        OpKind::Logical => logical_scalars(op, l, r),
        OpKind::Arithmetic => arith_scalars(op, l, r),
    }
}

/// Compares two scalars.
///
/// A missing side compares `false`, or `true` for `ne`. Equality between
/// unrelated kinds is `false`; ordering between them is a type incompatibility.
pub fn compare_scalars(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<bool, OpsError> {
    if l.is_null() || r.is_null() {
        return Ok(op == BinaryOperator::NotEqual);
    }
    let ordering = match (l, r) {
        (Scalar::Int64(_) | Scalar::Boolean(_), Scalar::Int64(_) | Scalar::Boolean(_)) => {
            match (l.try_i64(), r.try_i64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            }
        }
        _ if l.is_numeric() && r.is_numeric() => match (l.try_f64(), r.try_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
        (Scalar::String(a), Scalar::String(b)) => Some(a.cmp(b)),
        (Scalar::Datetime(a), Scalar::Datetime(b)) | (Scalar::Timedelta(a), Scalar::Timedelta(b)) => {
            Some(a.cmp(b))
        }
        (Scalar::Offset(a), Scalar::Offset(b)) => match (a.delta(), b.delta()) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => {
                return match op {
                    BinaryOperator::Equal => Ok(a == b),
                    BinaryOperator::NotEqual => Ok(a != b),
                    _ => Err(scalar_incompatible(op, l, r)),
                };
            }
        },
        _ => {
            return match op {
                BinaryOperator::Equal => Ok(false),
                BinaryOperator::NotEqual => Ok(true),
                _ => Err(scalar_incompatible(op, l, r)),
            };
        }
    };
    Ok(match ordering {
        None => op == BinaryOperator::NotEqual,
        Some(o) => match op {
            BinaryOperator::Equal => o == Ordering::Equal,
            BinaryOperator::NotEqual => o != Ordering::Equal,
            BinaryOperator::LessThan => o == Ordering::Less,
            BinaryOperator::GreaterThan => o == Ordering::Greater,
            BinaryOperator::LessEqual => o != Ordering::Greater,
            BinaryOperator::GreaterEqual => o != Ordering::Less,
            _ => return Err(scalar_incompatible(op, l, r)),
        },
    })
}

fn logical_scalars(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<Scalar, OpsError> {
    match (l, r) {
        (Scalar::Boolean(a), Scalar::Boolean(b)) => bool_logic(op)
            .map(|f| Scalar::Boolean(f(*a, *b)))
            .ok_or_else(|| scalar_incompatible(op, l, r)),
        _ => match (l.try_i64(), r.try_i64(), int_logic(op)) {
            (Some(a), Some(b), Some(f)) => Ok(Scalar::Int64(f(a, b))),
            _ => Err(scalar_incompatible(op, l, r)),
        },
    }
}

fn arith_scalars(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<Scalar, OpsError> {
    use BinaryOperator::*;
    match (l, r) {
        _ if l.is_numeric() && r.is_numeric() => numeric_scalars(op, l, r),
        (Scalar::String(a), Scalar::String(b)) if op == Add => Ok(Scalar::String(format!("{a}{b}"))),
        (Scalar::String(s), n) | (n, Scalar::String(s))
            if op == Multiply && matches!(n, Scalar::Int64(_) | Scalar::Boolean(_)) =>
        {
            let times = n.try_i64().unwrap_or(0).max(0) as usize;
            Ok(Scalar::String(s.repeat(times)))
        }
        _ => temporal_scalars(op, l, r),
    }
}

fn numeric_scalars(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<Scalar, OpsError> {
    let any_float = matches!(l, Scalar::Float64(_)) || matches!(r, Scalar::Float64(_));
    let negative_power = op == BinaryOperator::Power && r.try_i64().is_some_and(|e| e < 0);
    if any_float || op == BinaryOperator::TrueDivide || negative_power {
        let (a, b) = match (l.try_f64(), r.try_f64()) {
            (Some(a), Some(b)) => (a, b),
            _ => return Err(scalar_incompatible(op, l, r)),
        };
        let f = float_kernel(op).ok_or_else(|| scalar_incompatible(op, l, r))?;
        return Ok(Scalar::Float64(f(a, b)));
    }
    match (l.try_i64(), r.try_i64(), int_kernel(op)) {
        (Some(a), Some(b), Some(f)) => Ok(Scalar::Int64(f(a, b))),
        _ => Err(scalar_incompatible(op, l, r)),
    }
}

/// NaT-propagating tick arithmetic.
#[inline]
fn ticks(a: i64, b: i64, f: fn(i64, i64) -> i64) -> i64 {
    if a == NAT || b == NAT { NAT } else { f(a, b) }
}

fn temporal_scalars(op: BinaryOperator, l: &Scalar, r: &Scalar) -> Result<Scalar, OpsError> {
    use BinaryOperator::*;
    let err = || scalar_incompatible(op, l, r);
    let offset_ticks = |s: &Scalar| match s {
        Scalar::Timedelta(t) => Some(*t),
        Scalar::Offset(o) => o.delta(),
        _ => None,
    };
    let add_or_sub = |op: BinaryOperator| -> fn(i64, i64) -> i64 {
        if op == Subtract { i64::wrapping_sub } else { i64::wrapping_add }
    };
    match (op, l, r) {
        (Subtract, Scalar::Datetime(a), Scalar::Datetime(b)) => {
            Ok(Scalar::Timedelta(ticks(*a, *b, i64::wrapping_sub)))
        }
        (Add | Subtract, Scalar::Datetime(a), delta) => {
            let d = offset_ticks(delta).ok_or_else(err)?;
            Ok(Scalar::Datetime(ticks(*a, d, add_or_sub(op))))
        }
        (Add, delta, Scalar::Datetime(b)) => {
            let d = offset_ticks(delta).ok_or_else(err)?;
            Ok(Scalar::Datetime(ticks(d, *b, i64::wrapping_add)))
        }
        (Add | Subtract, Scalar::Timedelta(a), delta) => {
            let d = offset_ticks(delta).ok_or_else(err)?;
            Ok(Scalar::Timedelta(ticks(*a, d, add_or_sub(op))))
        }
        (Add, Scalar::Offset(_), Scalar::Timedelta(b)) => {
            let d = offset_ticks(l).ok_or_else(err)?;
            Ok(Scalar::Timedelta(ticks(d, *b, i64::wrapping_add)))
        }
        (Multiply, Scalar::Timedelta(a), n) | (Multiply, n, Scalar::Timedelta(a))
            if matches!(n, Scalar::Int64(_) | Scalar::Boolean(_)) =>
        {
            let k = n.try_i64().ok_or_else(err)?;
            Ok(Scalar::Timedelta(ticks(*a, k, i64::wrapping_mul)))
        }
        (TrueDivide, Scalar::Timedelta(a), Scalar::Timedelta(b)) => {
            if *a == NAT || *b == NAT {
                Ok(Scalar::Float64(f64::NAN))
            } else {
                Ok(Scalar::Float64(*a as f64 / *b as f64))
            }
        }
        (FloorDivide, Scalar::Timedelta(a), Scalar::Timedelta(b)) => {
            if *a == NAT || *b == NAT {
                Ok(Scalar::Float64(f64::NAN))
            } else {
                Ok(Scalar::Int64(floordiv_i64(*a, *b)))
            }
        }
        (TrueDivide | FloorDivide, Scalar::Timedelta(a), Scalar::Int64(k)) => {
            Ok(Scalar::Timedelta(ticks(*a, *k, floordiv_i64)))
        }
        _ => Err(err()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::time_units::DateOffset;

    fn f64s(c: &Column) -> Vec<f64> {
        c.as_f64().unwrap().to_vec()
    }

    #[test]
    fn test_python_division_rules() {
        assert_eq!(floordiv_i64(7, 2), 3);
        assert_eq!(floordiv_i64(-7, 2), -4);
        assert_eq!(floordiv_i64(7, -2), -4);
        assert_eq!(floordiv_i64(5, 0), 0);
        assert_eq!(mod_i64(-7, 2), 1);
        assert_eq!(mod_i64(7, -2), -1);
        assert_eq!(mod_i64(5, 0), 0);
        assert_eq!(floordiv_i64(i64::MIN, -1), i64::MIN);
        assert_eq!(floordiv_float(7.0, 2.0), 3.0);
        assert_eq!(floordiv_float(-7.0, 2.0), -4.0);
        assert_eq!(floordiv_float(1.0, 0.1), 9.0);
        assert_eq!(mod_float(-7.0, 2.0), 1.0);
        assert!(mod_float(1.0, 0.0).is_nan());
        assert_eq!(floordiv_float(1.0, 0.0), f64::INFINITY);
    }

    #[test]
    fn test_int_arithmetic_and_promotion() {
        let a = Column::from(vec![1i64, 2, 3]);
        let b = Column::from(vec![2i64, 2, 2]);
        let sum = apply(BinaryOperator::Add, (&a).into(), (&b).into()).unwrap();
        assert_eq!(sum, Column::from(vec![3i64, 4, 5]));

        let div = apply(BinaryOperator::TrueDivide, (&a).into(), (&b).into()).unwrap();
        assert_eq!(f64s(&div), vec![0.5, 1.0, 1.5]);

        let half = Scalar::Float64(0.5);
        let mixed = apply(BinaryOperator::Multiply, (&a).into(), (&half).into()).unwrap();
        assert_eq!(f64s(&mixed), vec![0.5, 1.0, 1.5]);

        let flags = Column::from(vec![true, false, true]);
        let bump = apply(BinaryOperator::Add, (&flags).into(), (&a).into()).unwrap();
        assert_eq!(bump, Column::from(vec![2i64, 2, 4]));
    }

    #[test]
    fn test_negative_int_power_rejected() {
        let a = Column::from(vec![2i64, 3]);
        let e = Scalar::Int64(-1);
        let err = apply(BinaryOperator::Power, (&a).into(), (&e).into()).unwrap_err();
        assert!(matches!(err, OpsError::Validation { .. }));
        let sq = apply(BinaryOperator::Power, (&a).into(), (&Scalar::Int64(2)).into()).unwrap();
        assert_eq!(sq, Column::from(vec![4i64, 9]));
    }

    #[test]
    fn test_comparisons_with_nan() {
        let a = Column::from(vec![1.0, f64::NAN, 3.0]);
        let two = Scalar::Float64(2.0);
        let gt = apply(BinaryOperator::GreaterThan, (&a).into(), (&two).into()).unwrap();
        assert_eq!(gt, Column::from(vec![false, false, true]));
        let ne = apply(BinaryOperator::NotEqual, (&a).into(), (&two).into()).unwrap();
        assert_eq!(ne, Column::from(vec![true, true, true]));
    }

    #[test]
    fn test_temporal_comparison_on_ticks() {
        let a = Column::datetime([1, 5]);
        let b = Column::datetime([2, 5]);
        let le = apply(BinaryOperator::LessEqual, (&a).into(), (&b).into()).unwrap();
        assert_eq!(le, Column::from(vec![true, true]));
        let c = Column::timedelta([2, 5]);
        let err = apply(BinaryOperator::LessEqual, (&a).into(), (&c).into()).unwrap_err();
        assert!(err.is_type_incompatibility());
    }

    #[test]
    fn test_logical_kernels() {
        let a = Column::from(vec![true, true, false]);
        let b = Column::from(vec![true, false, false]);
        assert_eq!(
            apply(BinaryOperator::Xor, (&a).into(), (&b).into()).unwrap(),
            Column::from(vec![false, true, false])
        );
        let i = Column::from(vec![6i64, 3]);
        let mask = Scalar::Int64(2);
        assert_eq!(
            apply(BinaryOperator::And, (&i).into(), (&mask).into()).unwrap(),
            Column::from(vec![2i64, 2])
        );
        let f = Column::from(vec![1.0]);
        assert!(apply(BinaryOperator::Or, (&f).into(), (&f).into())
            .unwrap_err()
            .is_type_incompatibility());
    }

    #[test]
    fn test_object_declines_and_length_checked() {
        let o = Column::Object(vec![Scalar::from("a")]);
        let one = Scalar::Int64(1);
        assert!(apply(BinaryOperator::Add, (&o).into(), (&one).into())
            .unwrap_err()
            .is_type_incompatibility());
        let a = Column::from(vec![1i64]);
        let b = Column::from(vec![1i64, 2]);
        assert!(matches!(
            apply(BinaryOperator::Add, (&a).into(), (&b).into()),
            Err(OpsError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_select() {
        let a = Column::from(vec![1i64, 2, 3]);
        let b = Scalar::Float64(0.5);
        let out = select_with(&[true, false, true], (&a).into(), (&b).into(), &Sequential).unwrap();
        assert_eq!(f64s(&out), vec![1.0, 0.5, 3.0]);
    }

    #[test]
    fn test_scalar_strings_and_mixed_kinds() {
        let s = scalar_binop(BinaryOperator::Add, &Scalar::from("ab"), &Scalar::from("c")).unwrap();
        assert_eq!(s, Scalar::from("abc"));
        let rep = scalar_binop(BinaryOperator::Multiply, &Scalar::Int64(2), &Scalar::from("x")).unwrap();
        assert_eq!(rep, Scalar::from("xx"));
        assert_eq!(
            scalar_binop(BinaryOperator::Equal, &Scalar::from("1"), &Scalar::Int64(1)).unwrap(),
            Scalar::Boolean(false)
        );
        assert!(compare_scalars(BinaryOperator::LessThan, &Scalar::from("a"), &Scalar::Int64(1))
            .unwrap_err()
            .is_type_incompatibility());
        assert!(compare_scalars(BinaryOperator::NotEqual, &Scalar::Null, &Scalar::Null).unwrap());
        assert!(scalar_binop(BinaryOperator::Add, &Scalar::Null, &Scalar::Int64(1))
            .unwrap_err()
            .is_type_incompatibility());
        assert_eq!(
            scalar_binop(BinaryOperator::Power, &Scalar::Int64(2), &Scalar::Int64(-1)).unwrap(),
            Scalar::Float64(0.5)
        );
    }

    #[test]
    fn test_scalar_temporal() {
        let day = DateOffset::days(1).delta().unwrap();
        let dt = Scalar::Datetime(10 * day);
        let td = Scalar::Timedelta(day);
        assert_eq!(
            scalar_binop(BinaryOperator::Subtract, &dt, &Scalar::Datetime(7 * day)).unwrap(),
            Scalar::Timedelta(3 * day)
        );
        assert_eq!(
            scalar_binop(BinaryOperator::Add, &td, &dt).unwrap(),
            Scalar::Datetime(11 * day)
        );
        assert_eq!(
            scalar_binop(BinaryOperator::Add, &dt, &Scalar::Offset(DateOffset::days(2))).unwrap(),
            Scalar::Datetime(12 * day)
        );
        assert!(scalar_binop(BinaryOperator::Add, &dt, &Scalar::Offset(DateOffset::months(1))).is_err());
        assert_eq!(
            scalar_binop(BinaryOperator::TrueDivide, &Scalar::Timedelta(3), &Scalar::Timedelta(2))
                .unwrap(),
            Scalar::Float64(1.5)
        );
        assert_eq!(
            scalar_binop(BinaryOperator::Multiply, &Scalar::Int64(2), &td).unwrap(),
            Scalar::Timedelta(2 * day)
        );
        assert_eq!(
            scalar_binop(BinaryOperator::Add, &Scalar::Datetime(NAT), &td).unwrap(),
            Scalar::Datetime(NAT)
        );
        assert!(scalar_binop(BinaryOperator::Add, &dt, &dt).is_err());
    }
}
