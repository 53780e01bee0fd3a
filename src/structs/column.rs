// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Column Module** - *Typed Value Storage*
//!
//! `Column` is the value buffer behind every labeled container. Primitive
//! dtypes live in 64-byte aligned `Vec64` buffers. Object columns hold one
//! [`Scalar`] per position and may mix element kinds.
//!
//! ## Missing values
//! | dtype | sentinel |
//! |---|---|
//! | `Float64` | `NaN` |
//! | `Datetime`, `Timedelta` | [`NAT`] |
//! | `Object` | `Scalar::Null`, NaN or NaT elements |
//! | `Int64`, `Boolean` | none, upcast to `Float64` / `Object` |
//!
//! Every operation here is pure and returns a new column.

use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::scalar::{NAT, Scalar};
use crate::structs::bitmask::Bitmask;

/// # Column
///
/// Typed storage for one 1-D buffer of values.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Boolean(Vec64<bool>),
    Int64(Vec64<i64>),
    Float64(Vec64<f64>),
    Datetime(Vec64<i64>),
    Timedelta(Vec64<i64>),
    Object(Vec<Scalar>),
}

/// Applies the same expression to the buffer of every variant, rebuilding the same variant.
macro_rules! map_same_variant {
    ($col:expr, |$v:ident| $body:expr) => {
        match $col {
            Column::Boolean($v) => Column::Boolean($body),
            Column::Int64($v) => Column::Int64($body),
            Column::Float64($v) => Column::Float64($body),
            Column::Datetime($v) => Column::Datetime($body),
            Column::Timedelta($v) => Column::Timedelta($body),
            Column::Object($v) => Column::Object($body),
        }
    };
}

impl Column {
    /// Datetime column from nanosecond ticks since the epoch.
    pub fn datetime(ticks: impl IntoIterator<Item = i64>) -> Self {
        Column::Datetime(ticks.into_iter().collect())
    }

    /// Time-delta column from nanosecond ticks.
    pub fn timedelta(ticks: impl IntoIterator<Item = i64>) -> Self {
        Column::Timedelta(ticks.into_iter().collect())
    }

    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Column::Boolean(v) => v.len(),
            Column::Int64(v) => v.len(),
            Column::Float64(v) => v.len(),
            Column::Datetime(v) | Column::Timedelta(v) => v.len(),
            Column::Object(v) => v.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        match self {
            Column::Boolean(_) => DType::Boolean,
            Column::Int64(_) => DType::Int64,
            Column::Float64(_) => DType::Float64,
            Column::Datetime(_) => DType::Datetime,
            Column::Timedelta(_) => DType::Timedelta,
            Column::Object(_) => DType::Object,
        }
    }

    /// Value at position `i` as a scalar.
    ///
    /// # Panics
    /// When `i` is out of bounds.
    pub fn get(&self, i: usize) -> Scalar {
        match self {
            Column::Boolean(v) => Scalar::Boolean(v[i]),
            Column::Int64(v) => Scalar::Int64(v[i]),
            Column::Float64(v) => Scalar::Float64(v[i]),
            Column::Datetime(v) => Scalar::Datetime(v[i]),
            Column::Timedelta(v) => Scalar::Timedelta(v[i]),
            Column::Object(v) => v[i].clone(),
        }
    }

    /// Iterator over the values as scalars.
    pub fn iter(&self) -> impl Iterator<Item = Scalar> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }

    /// Materialises every value as a scalar.
    pub fn to_scalars(&self) -> Vec<Scalar> {
        match self {
            Column::Object(v) => v.clone(),
            _ => self.iter().collect(),
        }
    }

    /// Missing mask, set where the value is missing.
    pub fn isnull(&self) -> Bitmask {
        match self {
            Column::Boolean(v) => Bitmask::new_set_all(v.len(), false),
            Column::Int64(v) => Bitmask::new_set_all(v.len(), false),
            Column::Float64(v) => Bitmask::from_fn(v.len(), |i| v[i].is_nan()),
            Column::Datetime(v) | Column::Timedelta(v) => {
                Bitmask::from_fn(v.len(), |i| v[i] == NAT)
            }
            Column::Object(v) => Bitmask::from_fn(v.len(), |i| v[i].is_null()),
        }
    }

    /// Validity mask, set where the value is present.
    #[inline]
    pub fn notnull(&self) -> Bitmask {
        self.isnull().invert()
    }

    /// Column of `len` copies of `value`. A `Null` scalar produces an object column.
    pub fn full(value: &Scalar, len: usize) -> Column {
        match value {
            Scalar::Boolean(b) => Column::Boolean(std::iter::repeat(*b).take(len).collect()),
            Scalar::Int64(x) => Column::Int64(std::iter::repeat(*x).take(len).collect()),
            Scalar::Float64(x) => Column::Float64(std::iter::repeat(*x).take(len).collect()),
            Scalar::Datetime(x) => Column::Datetime(std::iter::repeat(*x).take(len).collect()),
            Scalar::Timedelta(x) => Column::Timedelta(std::iter::repeat(*x).take(len).collect()),
            other => Column::Object(vec![other.clone(); len]),
        }
    }

    /// Column of `len` missing values, in the dtype `dtype` upcasts to for missing values.
    pub fn all_missing(dtype: DType, len: usize) -> Column {
        match dtype.upcast_for_missing() {
            DType::Float64 => Column::Float64(std::iter::repeat(f64::NAN).take(len).collect()),
            DType::Datetime => Column::Datetime(std::iter::repeat(NAT).take(len).collect()),
            DType::Timedelta => Column::Timedelta(std::iter::repeat(NAT).take(len).collect()),
            _ => Column::Object(vec![Scalar::Null; len]),
        }
    }

    /// Gathers values by position. `None` positions become missing, upcasting
    /// integers to float and booleans to object when any position is absent.
    pub fn take(&self, positions: &[Option<usize>]) -> Column {
        let any_absent = positions.iter().any(Option::is_none);
        if !any_absent {
            return map_same_variant!(self, |v| positions
                .iter()
                .flatten()
                .map(|&i| v[i].clone())
                .collect());
        }
        match self {
            Column::Boolean(v) => Column::Object(
                positions
                    .iter()
                    .map(|p| p.map_or(Scalar::Null, |i| Scalar::Boolean(v[i])))
                    .collect(),
            ),
            Column::Int64(v) => Column::Float64(
                positions
                    .iter()
                    .map(|p| p.map_or(f64::NAN, |i| v[i] as f64))
                    .collect(),
            ),
            Column::Float64(v) => {
                Column::Float64(positions.iter().map(|p| p.map_or(f64::NAN, |i| v[i])).collect())
            }
            Column::Datetime(v) => {
                Column::Datetime(positions.iter().map(|p| p.map_or(NAT, |i| v[i])).collect())
            }
            Column::Timedelta(v) => {
                Column::Timedelta(positions.iter().map(|p| p.map_or(NAT, |i| v[i])).collect())
            }
            Column::Object(v) => Column::Object(
                positions
                    .iter()
                    .map(|p| p.map_or(Scalar::Null, |i| v[i].clone()))
                    .collect(),
            ),
        }
    }

    /// Writes the missing sentinel wherever `missing` is set, upcasting when
    /// the dtype cannot hold it. Returns a clone when nothing is masked.
    pub fn upcast_putmask(&self, missing: &Bitmask) -> Column {
        debug_assert_eq!(missing.len(), self.len());
        if !missing.any() {
            return self.clone();
        }
        let n = self.len();
        match self {
            Column::Boolean(v) => Column::Object(
                (0..n)
                    .map(|i| {
                        if missing.get(i) {
                            Scalar::Null
                        } else {
                            Scalar::Boolean(v[i])
                        }
                    })
                    .collect(),
            ),
            Column::Int64(v) => Column::Float64(
                (0..n)
                    .map(|i| if missing.get(i) { f64::NAN } else { v[i] as f64 })
                    .collect(),
            ),
            Column::Float64(v) => Column::Float64(
                (0..n)
                    .map(|i| if missing.get(i) { f64::NAN } else { v[i] })
                    .collect(),
            ),
            Column::Datetime(v) => {
                Column::Datetime((0..n).map(|i| if missing.get(i) { NAT } else { v[i] }).collect())
            }
            Column::Timedelta(v) => {
                Column::Timedelta((0..n).map(|i| if missing.get(i) { NAT } else { v[i] }).collect())
            }
            Column::Object(v) => Column::Object(
                (0..n)
                    .map(|i| {
                        if missing.get(i) {
                            Scalar::Null
                        } else {
                            v[i].clone()
                        }
                    })
                    .collect(),
            ),
        }
    }

    /// Contiguous window `[offset, offset + len)`.
    pub fn slice(&self, offset: usize, len: usize) -> Column {
        map_same_variant!(self, |v| v[offset..offset + len].iter().cloned().collect())
    }

    /// Values as `f64`. Temporal NaT and object nulls read as NaN.
    ///
    /// Object columns holding non-numeric values are a type incompatibility.
    pub fn cast_f64(&self) -> Result<Vec64<f64>, OpsError> {
        match self {
            Column::Boolean(v) => Ok(v.iter().map(|&b| b as i64 as f64).collect()),
            Column::Int64(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            Column::Float64(v) => Ok(v.clone()),
            Column::Datetime(v) | Column::Timedelta(v) => Ok(v
                .iter()
                .map(|&x| if x == NAT { f64::NAN } else { x as f64 })
                .collect()),
            Column::Object(v) => v
                .iter()
                .map(|s| {
                    if s.is_null() {
                        Ok(f64::NAN)
                    } else {
                        s.try_f64().ok_or(OpsError::TypeIncompatibility {
                            op: "astype(float64)",
                            left: s.type_name(),
                            right: "float64",
                        })
                    }
                })
                .collect(),
        }
    }

    /// Builds a column from scalars, inferring the narrowest dtype that holds them.
    ///
    /// - booleans only: `Boolean`; with a missing value: `Object`
    /// - integers only: `Int64`; mixed with floats or missing values: `Float64`
    /// - datetimes (or time-deltas) with missing values: `Datetime` (`Timedelta`)
    /// - all missing, or empty: `Float64`
    /// - anything else: `Object`
    pub fn from_scalars(values: Vec<Scalar>) -> Column {
        let (mut bools, mut ints, mut dts, mut tds, mut nulls, mut other) =
            (0usize, 0usize, 0usize, 0usize, 0usize, 0usize);
        for s in &values {
            match s {
                Scalar::Null => nulls += 1,
                Scalar::Boolean(_) => bools += 1,
                Scalar::Int64(_) => ints += 1,
                Scalar::Float64(_) => {}
                Scalar::Datetime(_) => dts += 1,
                Scalar::Timedelta(_) => tds += 1,
                Scalar::String(_) | Scalar::Offset(_) => other += 1,
            }
        }
        let n = values.len();
        if other > 0 {
            return Column::Object(values);
        }
        if bools == n && n > 0 {
            return Column::Boolean(values.iter().filter_map(Scalar::try_bool).collect());
        }
        if dts > 0 && dts + nulls == n {
            return Column::Datetime(values.iter().map(|s| s.try_ticks().unwrap_or(NAT)).collect());
        }
        if tds > 0 && tds + nulls == n {
            return Column::Timedelta(values.iter().map(|s| s.try_ticks().unwrap_or(NAT)).collect());
        }
        if bools == 0 && dts == 0 && tds == 0 {
            if ints == n && n > 0 {
                return Column::Int64(values.iter().filter_map(Scalar::try_i64).collect());
            }
            return Column::Float64(
                values
                    .iter()
                    .map(|s| s.try_f64().unwrap_or(f64::NAN))
                    .collect(),
            );
        }
        Column::Object(values)
    }

    /// Joins columns end to end. All parts must share a dtype.
    pub fn concat(parts: &[&Column]) -> Result<Column, OpsError> {
        let Some(first) = parts.first() else {
            return Ok(Column::Float64(Vec64::with_capacity(0)));
        };
        let dtype = first.dtype();
        if let Some(bad) = parts.iter().find(|c| c.dtype() != dtype) {
            return Err(OpsError::Validation {
                op: None,
                message: format!(
                    "cannot concatenate columns of dtype {} and {}",
                    dtype,
                    bad.dtype()
                ),
            });
        }
        macro_rules! concat_variant {
            ($variant:ident) => {{
                let mut out = Vec64::with_capacity(parts.iter().map(|c| c.len()).sum());
                for part in parts {
                    if let Column::$variant(v) = part {
                        out.extend_from_slice(v.as_slice());
                    }
                }
                Column::$variant(out)
            }};
        }
        Ok(match dtype {
            DType::Boolean => concat_variant!(Boolean),
            DType::Int64 => concat_variant!(Int64),
            DType::Float64 => concat_variant!(Float64),
            DType::Datetime => concat_variant!(Datetime),
            DType::Timedelta => concat_variant!(Timedelta),
            DType::Object => {
                let mut out = Vec::with_capacity(parts.iter().map(|c| c.len()).sum());
                for part in parts {
                    if let Column::Object(v) = part {
                        out.extend(v.iter().cloned());
                    }
                }
                Column::Object(out)
            }
        })
    }

    /// Splits into consecutive pieces of the given lengths.
    pub fn split(&self, lens: &[usize]) -> Vec<Column> {
        let mut offset = 0;
        lens.iter()
            .map(|&len| {
                let piece = self.slice(offset, len);
                offset += len;
                piece
            })
            .collect()
    }

    #[inline]
    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            Column::Float64(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<Vec64<bool>> for Column {
    fn from(v: Vec64<bool>) -> Self {
        Column::Boolean(v)
    }
}

impl From<Vec64<i64>> for Column {
    fn from(v: Vec64<i64>) -> Self {
        Column::Int64(v)
    }
}

impl From<Vec64<f64>> for Column {
    fn from(v: Vec64<f64>) -> Self {
        Column::Float64(v)
    }
}

impl From<Vec<bool>> for Column {
    fn from(v: Vec<bool>) -> Self {
        Column::Boolean(v.into_iter().collect())
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int64(v.into_iter().collect())
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float64(v.into_iter().collect())
    }
}

/// Object column holding the scalars as given. Use [`Column::from_scalars`] to infer a dtype.
impl From<Vec<Scalar>> for Column {
    fn from(v: Vec<Scalar>) -> Self {
        Column::Object(v)
    }
}
