// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **NdArray Module** - *Unlabeled Buffers*
//!
//! A raw value buffer with an explicit row-major shape. Tables combine with
//! these by first wrapping them in the table's own labels.

use crate::enums::error::OpsError;
use crate::structs::column::Column;

/// # NdArray
///
/// Row-major buffer of `shape.iter().product()` values.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    pub data: Column,
    pub shape: Vec<usize>,
}

impl NdArray {
    /// Checks that `shape` covers exactly the buffer.
    pub fn new(data: impl Into<Column>, shape: Vec<usize>) -> Result<Self, OpsError> {
        let data = data.into();
        let n: usize = shape.iter().product();
        if n != data.len() {
            return Err(OpsError::Shape {
                shape,
                message: format!("cannot reshape a buffer of {} values", data.len()),
            });
        }
        Ok(Self { data, shape })
    }

    /// 1-D array over the whole buffer.
    pub fn from_1d(data: impl Into<Column>) -> Self {
        let data = data.into();
        let shape = vec![data.len()];
        Self { data, shape }
    }

    #[inline]
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Column `j` of a 2-D array.
    pub fn column(&self, j: usize) -> Column {
        let (rows, cols) = (self.shape[0], self.shape[1]);
        let positions: Vec<Option<usize>> = (0..rows).map(|i| Some(i * cols + j)).collect();
        self.data.take(&positions)
    }
}
