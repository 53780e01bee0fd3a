// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Descriptor Module** - *Per-Operator Metadata*
//!
//! [`OpDescriptor`] carries what an alignment wrapper needs to know about the
//! operator it runs. [`OpArgs`] carries the per-call options of the flexible
//! methods.

use crate::enums::error::OpsError;
use crate::enums::operators::{Axis, BinaryFunc, BinaryOperator};
use crate::enums::scalar::Scalar;
use crate::structs::index::Label;

/// # OpDescriptor
///
/// - `func`: base operator plus operand order.
/// - `name`: the bound method name, e.g. `"__rsub__"` or `"multiply"`.
/// - `str_rep`: symbol handed to the accelerated backend, `None` disables it.
/// - `fill_zeros`: value written where an integer divisor is zero.
/// - `default_axis`: broadcast axis when the caller passes none. `None` infers it.
/// - `masker`: comparison result at missing positions.
#[derive(Debug, Clone, PartialEq)]
pub struct OpDescriptor {
    pub func: BinaryFunc,
    pub name: String,
    pub str_rep: Option<&'static str>,
    pub fill_zeros: Option<f64>,
    pub default_axis: Option<Axis>,
    pub masker: bool,
}

impl OpDescriptor {
    /// Descriptor with the standard metadata for `func`.
    pub fn new(func: BinaryFunc, name: impl Into<String>, use_symbol: bool) -> Self {
        Self {
            func,
            name: name.into(),
            str_rep: if use_symbol { str_rep(func) } else { None },
            fill_zeros: func.op.zero_division_fill(),
            default_axis: None,
            masker: func.op.masker(),
        }
    }

    pub fn with_default_axis(mut self, axis: Option<Axis>) -> Self {
        self.default_axis = axis;
        self
    }

    #[inline]
    pub fn op(&self) -> BinaryOperator {
        self.func.op
    }
}

/// Symbol of `func` for the accelerated backend.
///
/// Reflected operators have none except `radd`. Modulo and `xor` have none.
pub fn str_rep(func: BinaryFunc) -> Option<&'static str> {
    if func.reflected && func.op != BinaryOperator::Add {
        return None;
    }
    func.op.symbol()
}

/// # OpArgs
///
/// Options accepted by the flexible methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpArgs {
    pub axis: Option<Axis>,
    pub level: Option<Label>,
    pub fill_value: Option<Scalar>,
}

impl OpArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn level(mut self, level: impl Into<Label>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn fill_value(mut self, fill: impl Into<Scalar>) -> Self {
        self.fill_value = Some(fill.into());
        self
    }

    /// Hierarchical indexes are not modeled, so any `level` is declined.
    pub fn check_level(&self) -> Result<(), OpsError> {
        match &self.level {
            None => Ok(()),
            Some(level) => Err(OpsError::NotImplemented {
                message: format!("level broadcasting is not supported (level={})", level),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_rep_table() {
        use BinaryOperator::*;
        let fwd = |op| str_rep(BinaryFunc::new(op));
        let rev = |op| str_rep(BinaryFunc::reflected(op));
        assert_eq!(fwd(Add), Some("+"));
        assert_eq!(rev(Add), Some("+"));
        assert_eq!(fwd(FloorDivide), Some("//"));
        assert_eq!(fwd(Power), Some("**"));
        assert_eq!(fwd(Remainder), None);
        assert_eq!(rev(Subtract), None);
        assert_eq!(rev(TrueDivide), None);
        assert_eq!(fwd(And), Some("&"));
        assert_eq!(fwd(Xor), None);
    }

    #[test]
    fn test_descriptor_metadata() {
        let d = OpDescriptor::new(BinaryFunc::reflected(BinaryOperator::FloorDivide), "rfloordiv", true);
        assert_eq!(d.fill_zeros, Some(f64::INFINITY));
        assert_eq!(d.str_rep, None);
        assert!(!d.masker);
        let ne = OpDescriptor::new(BinaryFunc::new(BinaryOperator::NotEqual), "ne", false);
        assert!(ne.masker);
        assert_eq!(ne.str_rep, None);
    }

    #[test]
    fn test_level_declined() {
        assert!(OpArgs::new().check_level().is_ok());
        let err = OpArgs::new().level("a").check_level().unwrap_err();
        assert!(err.is_not_implemented());
    }
}
