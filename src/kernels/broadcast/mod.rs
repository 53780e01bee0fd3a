// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Broadcast Module** - *Alignment-Aware Binary Operator Wrappers*
//!
//! Wrappers that align labeled operands, then hand the aligned buffers to the
//! NA-aware kernels in [`crate::kernels::na_ops`]. One submodule per receiver:
//! - [`series`]: 1-D receivers. Arithmetic aligns by outer join; comparisons
//!   and logical operators are positional.
//! - [`frame`]: 2-D receivers. Unions both axes against another frame, or
//!   broadcasts a 1-D operand along an axis.
//! - [`panel`]: 3-D receivers. Scalars only, except identically labeled
//!   panel comparisons.
//!
//! Every wrapper takes an [`OpDescriptor`] for the operator and an
//! [`EvalSettings`] snapshot that it threads into the dispatcher.

pub mod frame;
pub mod panel;
pub mod series;

use crate::enums::error::OpsError;
use crate::enums::scalar::Scalar;
use crate::kernels::elementwise::Values;
use crate::kernels::na_ops::{na_arith, na_bool, na_compare};
use crate::kernels::settings::EvalSettings;
use crate::kernels::temporal::{TemporalKind, TemporalOperationContext};
use crate::ops::descriptor::OpDescriptor;
use crate::structs::bitmask::Bitmask;
use crate::structs::column::Column;

/// Arithmetic on aligned values. Temporal operands go through the coercion engine.
pub(crate) fn arith_values(
    desc: &OpDescriptor,
    x: &Column,
    y: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    let kinds = (TemporalKind::of(Values::Array(x)), TemporalKind::of(y));
    arith_classified(desc, x, y, kinds, settings)
}

/// Arithmetic on columns reindexed from `before`.
///
/// Reindexing upcasts an integer column with absent labels to `Float64`, so
/// the temporal kinds come from the columns before alignment. A side with
/// no source column classifies as what it holds now.
pub(crate) fn arith_realigned(
    desc: &OpDescriptor,
    x: &Column,
    y: &Column,
    before: (Option<&Column>, Option<&Column>),
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    let kind = |src: Option<&Column>, now: &Column| TemporalKind::of(Values::Array(src.unwrap_or(now)));
    let kinds = (kind(before.0, x), kind(before.1, y));
    arith_classified(desc, x, Values::Array(y), kinds, settings)
}

fn arith_classified(
    desc: &OpDescriptor,
    x: &Column,
    y: Values<'_>,
    kinds: (TemporalKind, TemporalKind),
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    match TemporalOperationContext::prepare_as(desc.func, x, y, kinds)? {
        Some(ctx) => {
            let raw = na_arith(
                desc.func,
                desc.str_rep,
                &ctx.left,
                ctx.right.values(),
                desc.fill_zeros,
                settings,
            )?;
            ctx.wrap_results(raw)
        }
        None => na_arith(desc.func, desc.str_rep, x, y, desc.fill_zeros, settings),
    }
}

/// Comparison on aligned values, masked with the operator's masker.
pub(crate) fn compare_values(
    desc: &OpDescriptor,
    x: &Column,
    y: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    na_compare(desc.op(), desc.str_rep, x, y, desc.masker, settings)
}

/// Logical operator on aligned values.
pub(crate) fn bool_values(
    desc: &OpDescriptor,
    x: &Column,
    y: Values<'_>,
    settings: &EvalSettings,
) -> Result<Column, OpsError> {
    na_bool(desc.func, desc.str_rep, x, y, settings)
}

/// Substitutes `fill` wherever exactly one side is missing.
/// Positions missing on both sides stay missing.
pub(crate) fn fill_one_sided(x: &Column, y: &Column, fill: &Scalar) -> (Column, Column) {
    let xnull = x.isnull();
    let ynull = y.isnull();
    let only_x = &xnull & &ynull.invert();
    let only_y = &ynull & &xnull.invert();
    (substitute(x, &only_x, fill), substitute(y, &only_y, fill))
}

fn substitute(col: &Column, at: &Bitmask, fill: &Scalar) -> Column {
    if !at.any() {
        return col.clone();
    }
    let mut values = col.to_scalars();
    for i in at.iter_set() {
        values[i] = fill.clone();
    }
    Column::from_scalars(values)
}

/// Result name of a 1-D binary operation: kept only when both sides agree.
pub(crate) fn match_name(a: &Option<String>, b: &Option<String>) -> Option<String> {
    if a == b { a.clone() } else { None }
}

/// Error for an operand kind a wrapper does not handle, letting dispatch
/// try the other operand.
pub(crate) fn declined(desc: &OpDescriptor, receiver: &str, other: &str) -> OpsError {
    OpsError::NotImplemented {
        message: format!("{} {} {} is not handled by the {} operand", receiver, desc.name, other, receiver),
    }
}
