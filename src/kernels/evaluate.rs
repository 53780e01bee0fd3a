// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Evaluate Module** - *Accelerated or Plain Dispatch*
//!
//! Chooses, per binary operation, between the accelerated backend in
//! [`crate::kernels::accelerated`] and the plain element-wise kernels in
//! [`crate::kernels::elementwise`].
//!
//! ## Gate
//! The accelerated path is attempted only when all of these hold:
//! - acceleration is enabled in the passed [`EvalSettings`],
//! - the operator has a symbolic form,
//! - the left operand holds strictly more than `min_elements` values,
//!   and so does the right operand when it is an array,
//! - both operands are boolean, integer or float buffers.
//!
//! Any refusal by the backend is logged at `debug` and the plain path
//! recomputes. Both paths return identical buffers.

use tracing::{debug, trace};

use crate::enums::error::OpsError;
use crate::enums::operators::BinaryFunc;
use crate::kernels::accelerated;
use crate::kernels::elementwise::{self, Sequential, Values};
use crate::kernels::settings::EvalSettings;
use crate::structs::column::Column;
use crate::structs::frame::Frame;

/// Whether `left <op> right` qualifies for the accelerated path.
pub fn can_use_accelerated(
    symbol: Option<&str>,
    left: &Column,
    right: Values<'_>,
    settings: &EvalSettings,
) -> bool {
    if !settings.use_accelerated || symbol.is_none() {
        return false;
    }
    if left.len() <= settings.min_elements {
        return false;
    }
    if right.len().is_some_and(|n| n <= settings.min_elements) {
        return false;
    }
    left.dtype().is_numeric() && right.dtype().is_numeric()
}

/// Table-level gate. Mixed tables never qualify.
pub fn can_use_accelerated_frame(
    symbol: Option<&str>,
    frame: &Frame,
    settings: &EvalSettings,
) -> bool {
    if !settings.use_accelerated || symbol.is_none() {
        return false;
    }
    match frame.single_dtype() {
        Some(dtype) => dtype.is_numeric() && frame.n_rows() * frame.n_cols() > settings.min_elements,
        None => false,
    }
}

/// Evaluates `func(left, right)` and returns the raw result buffer.
///
/// `left` is the receiving container's values. A reflected `func` computes
/// `op(right, left)`; the gate still measures `left`.
pub fn evaluate(
    func: BinaryFunc,
    symbol: Option<&str>,
    left: &Column,
    right: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    let (a, b) = if func.reflected {
        (right, Values::Array(left))
    } else {
        (Values::Array(left), right)
    };

    if let Some(sym) = symbol.filter(|_| can_use_accelerated(symbol, left, right, settings)) {
        trace!(op = %func, len = left.len(), threads = settings.threads, "accelerated path");
        match accelerated::evaluate_expr(sym, a, b, settings.threads) {
            Ok(out) => return Ok(out),
            Err(e) => debug!(op = %func, error = %e, "accelerated backend declined, recomputing"),
        }
    } else {
        trace!(op = %func, len = left.len(), "plain path");
    }
    elementwise::apply(func.op, a, b)
}

/// Element-wise `cond ? a : b`, gated like [`evaluate`] on the length of `cond`.
pub fn where_values(
    cond: &[bool],
    a: Values<'_>,
    b: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    let large = |v: Values<'_>| v.len().is_none_or(|n| n > settings.min_elements);
    let eligible = settings.use_accelerated
        && cond.len() > settings.min_elements
        && large(a)
        && large(b)
        && a.dtype().is_numeric()
        && b.dtype().is_numeric();

    if eligible {
        trace!(len = cond.len(), "accelerated where");
        match accelerated::evaluate_where(cond, a, b, settings.threads) {
            Ok(out) => return Ok(out),
            Err(e) => debug!(error = %e, "accelerated where declined, recomputing"),
        }
    }
    elementwise::select_with(cond, a, b, &Sequential)
}
