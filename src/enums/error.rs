// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Error Module - Custom *Minframe* Error Type
//!
//! Defines the unified error type for the operator engine.
//!
//! ## Taxonomy
//! - `Validation` and `LengthMismatch`: illegal operand combinations, mismatched
//! lengths, conflicting binder options. Always surfaced.
//! - `Shape`: operand rank or length does not fit the broadcast rule. Always surfaced.
//! - `TypeIncompatibility`: the typed kernels cannot apply the operator to these
//! element types. Recovered internally by the masked element-wise fallback.
//! - `UnsupportedReflection` and `NotImplemented`: this implementation declines the
//! operation, so the dispatch protocol may try the other operand.
//! - `Config`: invalid process-wide settings.

use std::error::Error;
use std::fmt;

/// Catch all error type for `Minframe`
#[derive(Debug, Clone, PartialEq)]
pub enum OpsError {
    Validation {
        op: Option<String>,
        message: String,
    },
    LengthMismatch {
        context: &'static str,
        left: usize,
        right: usize,
    },
    Shape {
        shape: Vec<usize>,
        message: String,
    },
    TypeIncompatibility {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },
    UnsupportedReflection {
        op: String,
        dtype: &'static str,
    },
    NotImplemented {
        message: String,
    },
    Config {
        message: String,
    },
}

impl OpsError {
    /// Shorthand for a validation error tied to an operator name.
    pub fn validation(op: impl Into<String>, message: impl Into<String>) -> Self {
        OpsError::Validation {
            op: Some(op.into()),
            message: message.into(),
        }
    }

    /// Returns true when the error means "this implementation declines",
    /// so the caller may try the reflected implementation of the other operand.
    pub fn is_not_implemented(&self) -> bool {
        matches!(
            self,
            OpsError::UnsupportedReflection { .. } | OpsError::NotImplemented { .. }
        )
    }

    /// Returns true for the recoverable type-incompatibility signal.
    pub fn is_type_incompatibility(&self) -> bool {
        matches!(self, OpsError::TypeIncompatibility { .. })
    }
}

impl fmt::Display for OpsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpsError::Validation { op, message } => {
                if let Some(op) = op {
                    write!(f, "Validation error in operator [{}]: {}", op, message)
                } else {
                    write!(f, "Validation error: {}", message)
                }
            }
            OpsError::LengthMismatch { context, left, right } => {
                write!(
                    f,
                    "Length mismatch in {}: left has {} elements, right has {}.",
                    context, left, right
                )
            }
            OpsError::Shape { shape, message } => {
                write!(f, "Incompatible argument shape {:?}: {}", shape, message)
            }
            OpsError::TypeIncompatibility { op, left, right } => {
                write!(
                    f,
                    "Type incompatibility: operator '{}' is not defined between '{}' and '{}'.",
                    op, left, right
                )
            }
            OpsError::UnsupportedReflection { op, dtype } => {
                write!(
                    f,
                    "Not implemented: reflected operator [{}] is not supported for '{}' operands.",
                    op, dtype
                )
            }
            OpsError::NotImplemented { message } => {
                write!(f, "Not implemented: {}", message)
            }
            OpsError::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}

impl Error for OpsError {}
