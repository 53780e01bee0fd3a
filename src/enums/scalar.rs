// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # Scalar Module - *Single Value Container*
//!
//! Contains the Scalar type for holding a single value.
//!
//! ## Purpose
//! - Right-hand operand for broadcast operations, e.g. `series + 1.5`.
//! - Element type of object columns, which may mix kinds freely.
//! - Unit of the element-wise fallback when typed kernels decline.

use std::convert::From;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::enums::dtype::DType;
use crate::enums::time_units::{DateOffset, TimeUnit};

/// Missing-value sentinel for datetime and time-delta ticks.
pub const NAT: i64 = i64::MIN;

/// # Scalar
///
/// Scalar literals (single values) covering all supported element kinds.
///
/// ## Description
/// - `Datetime` holds nanoseconds since the Unix epoch, `Timedelta` a nanosecond
///   duration. Both use [`NAT`] as the missing sentinel.
/// - `Offset` is a date offset object, valid only inside object columns or as
///   a right operand of temporal arithmetic.
/// - The `try_<type>` accessors convert gracefully, returning `None` when the
///   value cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Boolean(bool),
    Int64(i64),
    Float64(f64),
    Datetime(i64),
    Timedelta(i64),
    String(String),
    Offset(DateOffset),
}

impl Scalar {
    /// Datetime from a count of `unit` since the epoch.
    #[inline]
    pub fn datetime(count: i64, unit: TimeUnit) -> Self {
        Scalar::Datetime(unit.to_ticks(count))
    }

    /// Time-delta of `count` units.
    #[inline]
    pub fn timedelta(count: i64, unit: TimeUnit) -> Self {
        Scalar::Timedelta(unit.to_ticks(count))
    }

    /// Type-specific null predicate: `Null`, float NaN and NaT are missing.
    #[inline]
    pub fn is_null(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float64(v) => v.is_nan(),
            Scalar::Datetime(v) | Scalar::Timedelta(v) => *v == NAT,
            _ => false,
        }
    }

    /// Short kind name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Boolean(_) => "bool",
            Scalar::Int64(_) => "int",
            Scalar::Float64(_) => "float",
            Scalar::Datetime(_) => "datetime",
            Scalar::Timedelta(_) => "timedelta",
            Scalar::String(_) => "str",
            Scalar::Offset(_) => "offset",
        }
    }

    /// The column dtype this scalar broadcasts into, or `None` for `Null`.
    pub fn dtype(&self) -> Option<DType> {
        match self {
            Scalar::Null => None,
            Scalar::Boolean(_) => Some(DType::Boolean),
            Scalar::Int64(_) => Some(DType::Int64),
            Scalar::Float64(_) => Some(DType::Float64),
            Scalar::Datetime(_) => Some(DType::Datetime),
            Scalar::Timedelta(_) => Some(DType::Timedelta),
            Scalar::String(_) | Scalar::Offset(_) => Some(DType::Object),
        }
    }

    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Boolean(_) | Scalar::Int64(_) | Scalar::Float64(_))
    }

    /// Attempts to read the value as a bool. Integers map non-zero to `true`.
    #[inline]
    pub fn try_bool(&self) -> Option<bool> {
        match self {
            Scalar::Boolean(v) => Some(*v),
            Scalar::Int64(v) => Some(*v != 0),
            _ => None,
        }
    }

    /// Attempts to read the value as an i64. Booleans map to 0 and 1.
    #[inline]
    pub fn try_i64(&self) -> Option<i64> {
        match self {
            Scalar::Boolean(v) => Some(*v as i64),
            Scalar::Int64(v) => Some(*v),
            _ => None,
        }
    }

    /// Attempts to read the value as an f64. `Null` reads as NaN.
    #[inline]
    pub fn try_f64(&self) -> Option<f64> {
        match self {
            Scalar::Null => Some(f64::NAN),
            Scalar::Boolean(v) => Some(*v as i64 as f64),
            Scalar::Int64(v) => Some(*v as f64),
            Scalar::Float64(v) => Some(*v),
            _ => None,
        }
    }

    #[inline]
    pub fn try_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Raw ticks of a temporal value, with `Null` reading as [`NAT`].
    #[inline]
    pub fn try_ticks(&self) -> Option<i64> {
        match self {
            Scalar::Null => Some(NAT),
            Scalar::Datetime(v) | Scalar::Timedelta(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(feature = "datetime_ops")]
mod datetime_conversions {
    use time::{Duration, OffsetDateTime};

    use super::{NAT, Scalar};

    impl Scalar {
        /// Datetime scalar from a `time` timestamp, saturating outside the i64 nanosecond range.
        pub fn from_datetime(dt: OffsetDateTime) -> Self {
            let nanos = dt.unix_timestamp_nanos();
            let ticks = nanos.clamp((NAT as i128) + 1, i64::MAX as i128) as i64;
            Scalar::Datetime(ticks)
        }

        /// Time-delta scalar from a `time` duration, saturating outside the i64 nanosecond range.
        pub fn from_duration(d: Duration) -> Self {
            let nanos = d.whole_nanoseconds();
            let ticks = nanos.clamp((NAT as i128) + 1, i64::MAX as i128) as i64;
            Scalar::Timedelta(ticks)
        }

        /// Converts a non-missing datetime back into a `time` timestamp.
        pub fn to_datetime(&self) -> Option<OffsetDateTime> {
            match self {
                Scalar::Datetime(v) if *v != NAT => {
                    OffsetDateTime::from_unix_timestamp_nanos(*v as i128).ok()
                }
                _ => None,
            }
        }

        /// Converts a non-missing time-delta back into a `time` duration.
        pub fn to_duration(&self) -> Option<Duration> {
            match self {
                Scalar::Timedelta(v) if *v != NAT => Some(Duration::nanoseconds(*v)),
                _ => None,
            }
        }
    }
}

impl Display for Scalar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Boolean(v) => write!(f, "{}", v),
            Scalar::Int64(v) => write!(f, "{}", v),
            Scalar::Float64(v) => write!(f, "{}", v),
            Scalar::Datetime(v) if *v == NAT => f.write_str("NaT"),
            Scalar::Timedelta(v) if *v == NAT => f.write_str("NaT"),
            Scalar::Datetime(v) => write!(f, "Datetime({}ns)", v),
            Scalar::Timedelta(v) => write!(f, "Timedelta({}ns)", v),
            Scalar::String(s) => write!(f, "{:?}", s),
            Scalar::Offset(o) => write!(f, "{}", o),
        }
    }
}

macro_rules! impl_scalar_from {
    ($variant:ident: $($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Scalar {
                #[inline] fn from(v: $t) -> Self { Scalar::$variant(v.into()) }
            }
        )+
    };
}

impl_scalar_from!(Boolean: bool);
impl_scalar_from!(Int64: i64, i32);
impl_scalar_from!(Float64: f64, f32);
impl_scalar_from!(String: String, &str);
impl_scalar_from!(Offset: DateOffset);
