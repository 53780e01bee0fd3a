// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **DType Module** - *Column Element Types*
//!
//! The closed set of element types a labeled container can hold.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// # DType
///
/// Logical element type of a [`Column`](crate::Column).
///
/// `Boolean` and `Int64` have no missing sentinel. A missing value forces an
/// upcast to `Object` or `Float64` respectively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    Boolean,
    Int64,
    Float64,
    Datetime,
    Timedelta,
    Object,
}

impl DType {
    /// Short lowercase name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            DType::Boolean => "bool",
            DType::Int64 => "int64",
            DType::Float64 => "float64",
            DType::Datetime => "datetime64[ns]",
            DType::Timedelta => "timedelta64[ns]",
            DType::Object => "object",
        }
    }

    /// Boolean, integer and float buffers. These are the dtypes the accelerated backend accepts.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, DType::Boolean | DType::Int64 | DType::Float64)
    }

    #[inline]
    pub const fn is_temporal(self) -> bool {
        matches!(self, DType::Datetime | DType::Timedelta)
    }

    /// Whether a missing value fits without changing the dtype.
    #[inline]
    pub const fn has_sentinel(self) -> bool {
        !matches!(self, DType::Boolean | DType::Int64)
    }

    /// The dtype a missing value forces this dtype into.
    #[inline]
    pub const fn upcast_for_missing(self) -> DType {
        match self {
            DType::Int64 => DType::Float64,
            DType::Boolean => DType::Object,
            other => other,
        }
    }
}

impl Display for DType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}
