// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Panel Broadcast Module** - *3-D Receivers*
//!
//! Panels do not align. Arithmetic and logical operators take scalars only,
//! comparisons take a scalar or an identically labeled panel. Each item's
//! frame runs through the frame wrappers.

use crate::enums::error::OpsError;
use crate::enums::operand::Operand;
use crate::kernels::broadcast::frame;
use crate::kernels::settings::EvalSettings;
use crate::ops::descriptor::{OpArgs, OpDescriptor};
use crate::structs::panel::Panel;

/// `panel <op> scalar` for an arithmetic operator.
pub fn arith(
    desc: &OpDescriptor,
    panel: &Panel,
    other: &Operand,
    settings: &EvalSettings,
) -> Result<Panel, OpsError> {
    scalar_only(desc, other)?;
    let frames = panel
        .frames
        .iter()
        .map(|f| frame::arith(desc, f, other, &OpArgs::default(), settings))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Panel::from_parts(panel.items.clone(), frames))
}

/// `panel <op> scalar` for a logical operator.
pub fn boolean(
    desc: &OpDescriptor,
    panel: &Panel,
    other: &Operand,
    settings: &EvalSettings,
) -> Result<Panel, OpsError> {
    scalar_only(desc, other)?;
    let frames = panel
        .frames
        .iter()
        .map(|f| frame::boolean(desc, f, other, &OpArgs::default(), settings))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Panel::from_parts(panel.items.clone(), frames))
}

/// Comparison against a scalar or an identically labeled panel.
/// Missing positions take the masker.
pub fn compare(
    desc: &OpDescriptor,
    panel: &Panel,
    other: &Operand,
    settings: &EvalSettings,
) -> Result<Panel, OpsError> {
    let args = OpArgs::default();
    let frames = match other {
        Operand::Panel(right) => {
            if !panel.is_identically_labeled(right) {
                return Err(OpsError::validation(
                    &desc.name,
                    "Can only compare identically-labeled Panel objects",
                ));
            }
            panel
                .frames
                .iter()
                .zip(&right.frames)
                .map(|(l, r)| frame::flex_compare(desc, l, &Operand::from(r), &args, settings))
                .collect::<Result<Vec<_>, _>>()?
        }
        Operand::Scalar(_) => panel
            .frames
            .iter()
            .map(|f| frame::flex_compare(desc, f, other, &args, settings))
            .collect::<Result<Vec<_>, _>>()?,
        _ => {
            return Err(OpsError::validation(
                &desc.name,
                "input needs alignment for this object [Panel]",
            ));
        }
    };
    Ok(Panel::from_parts(panel.items.clone(), frames))
}

fn scalar_only(desc: &OpDescriptor, other: &Operand) -> Result<(), OpsError> {
    match other {
        Operand::Scalar(_) => Ok(()),
        _ => Err(OpsError::validation(
            &desc.name,
            "Simple arithmetic with Panel can only be done with scalar values",
        )),
    }
}
