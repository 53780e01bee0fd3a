// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Series Module** - *Labeled 1-D Array*
//!
//! A value column paired with a row index and an optional name.
//! Binary operators are bound in [`crate::ops::registry`].

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::scalar::Scalar;
use crate::structs::column::Column;
use crate::structs::index::{Label, LabelIndex};

/// # Series
///
/// ## Structure
/// - `values`: the column, shared behind an `Arc` so clones are cheap.
/// - `index`: row labels, same length as `values`. Need not be unique.
/// - `name`: optional name, kept by binary operations only when both sides agree.
#[derive(Debug, Clone)]
pub struct Series {
    pub values: Arc<Column>,
    pub index: LabelIndex,
    pub name: Option<String>,
}

impl Series {
    /// Builds a series, checking that values and index have the same length.
    pub fn new(
        values: impl Into<Column>,
        index: LabelIndex,
        name: Option<String>,
    ) -> Result<Self, OpsError> {
        let values = values.into();
        if values.len() != index.len() {
            return Err(OpsError::LengthMismatch {
                context: "Series::new",
                left: values.len(),
                right: index.len(),
            });
        }
        Ok(Self {
            values: Arc::new(values),
            index,
            name,
        })
    }

    /// Series over a `0..n` index.
    pub fn from_values(values: impl Into<Column>) -> Self {
        let values = values.into();
        let index = LabelIndex::range(values.len());
        Self {
            values: Arc::new(values),
            index,
            name: None,
        }
    }

    /// Result constructor used by the operator wrappers. Lengths are already aligned.
    pub(crate) fn from_parts(values: Column, index: LabelIndex, name: Option<String>) -> Self {
        debug_assert_eq!(values.len(), index.len());
        Self {
            values: Arc::new(values),
            index,
            name,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn dtype(&self) -> DType {
        self.values.dtype()
    }

    #[inline]
    pub fn values(&self) -> &Column {
        &self.values
    }

    #[inline]
    pub fn get(&self, i: usize) -> Scalar {
        self.values.get(i)
    }

    /// Value at the first occurrence of `label`.
    pub fn at(&self, label: impl Into<Label>) -> Option<Scalar> {
        self.index.position(&label.into()).map(|i| self.values.get(i))
    }

    /// Values remapped onto `index` through a join position map.
    /// `None` for the map means the series already matches `index`.
    pub fn reindexed(&self, positions: Option<&[Option<usize>]>, index: &LabelIndex) -> Series {
        match positions {
            None => Series {
                values: self.values.clone(),
                index: index.clone(),
                name: self.name.clone(),
            },
            Some(p) => Series::from_parts(self.values.take(p), index.clone(), self.name.clone()),
        }
    }
}

impl Display for Series {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const MAX_PREVIEW: usize = 20;
        for i in 0..usize::min(self.len(), MAX_PREVIEW) {
            let label = self
                .index
                .get(i)
                .map(|l| l.to_string())
                .unwrap_or_default();
            writeln!(f, "{:<12} {}", label, self.get(i))?;
        }
        if self.len() > MAX_PREVIEW {
            writeln!(f, "…")?;
        }
        match &self.name {
            Some(name) => write!(f, "Name: {}, dtype: {}", name, self.dtype()),
            None => write!(f, "dtype: {}", self.dtype()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_checks_length() {
        let err = Series::new(vec![1i64, 2], LabelIndex::range(3), None).unwrap_err();
        assert!(matches!(err, OpsError::LengthMismatch { left: 2, right: 3, .. }));
    }

    #[test]
    fn test_reindexed() {
        let s = Series::from_values(vec![1.0, 2.0]).with_name("x");
        let target = LabelIndex::range(3);
        let r = s.reindexed(Some(&[Some(1), None, Some(0)]), &target);
        assert_eq!(r.get(0), Scalar::Float64(2.0));
        assert!(r.get(1).is_null());
        assert_eq!(r.name.as_deref(), Some("x"));

        let same = s.reindexed(None, &s.index);
        assert!(Arc::ptr_eq(&same.values, &s.values));
    }
}
