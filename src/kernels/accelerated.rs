// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Accelerated Module** - *Chunked Expression Backend*
//!
//! Evaluates a single binary expression given by its operator symbol, e.g.
//! `"+"` or `"<="`, by splitting the output into one chunk per worker.
//! With `parallel_proc` the chunks run on the rayon pool; otherwise they run
//! in sequence on the calling thread.
//!
//! The backend reuses the element functions of
//! [`crate::kernels::elementwise`], so any value it produces is identical to
//! the plain path. It accepts boolean, integer and float operands only and
//! has no floor division. Every refusal comes back as an [`AccelError`] and the
//! dispatcher in [`crate::kernels::evaluate`] recomputes on the plain path.

use std::error::Error;
use std::fmt;

#[cfg(feature = "parallel_proc")]
use rayon::prelude::*;
use vec64::Vec64;

use crate::enums::dtype::DType;
use crate::enums::error::OpsError;
use crate::enums::operators::BinaryOperator;
use crate::kernels::elementwise::{Runner, Side, Values, apply_with, select_with};
use crate::structs::column::Column;

/// Below this many elements per chunk the split costs more than it saves.
const MIN_CHUNK: usize = 1024;

/// Why the accelerated backend refused or failed an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum AccelError {
    UnsupportedOperator(String),
    UnsupportedDtype(&'static str),
    Shape { left: usize, right: usize },
    Kernel(OpsError),
}

impl fmt::Display for AccelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccelError::UnsupportedOperator(s) => write!(f, "unsupported operator '{s}'"),
            AccelError::UnsupportedDtype(d) => write!(f, "unsupported dtype '{d}'"),
            AccelError::Shape { left, right } => {
                write!(f, "operands could not be broadcast together: {left} vs {right}")
            }
            AccelError::Kernel(e) => write!(f, "kernel failed: {e}"),
        }
    }
}

impl Error for AccelError {}

impl From<OpsError> for AccelError {
    fn from(e: OpsError) -> Self {
        match e {
            OpsError::LengthMismatch { left, right, .. } => AccelError::Shape { left, right },
            OpsError::TypeIncompatibility { left, .. } => AccelError::UnsupportedDtype(left),
            other => AccelError::Kernel(other),
        }
    }
}

/// Runs element functions in `threads` chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunked {
    pub threads: usize,
}

impl Chunked {
    fn chunk_len(&self, n: usize) -> usize {
        n.div_ceil(self.threads.max(1)).max(MIN_CHUNK)
    }
}

#[inline]
fn fill<A, B, O, F>(dst: &mut [O], offset: usize, l: &Side<'_, A>, r: &Side<'_, B>, f: &F)
where
    A: Clone,
    B: Clone,
    F: Fn(A, B) -> O,
{
    for (k, slot) in dst.iter_mut().enumerate() {
        let i = offset + k;
        *slot = f(l.at(i), r.at(i));
    }
}

impl Runner for Chunked {
    fn map2<A, B, O, F>(&self, n: usize, l: &Side<'_, A>, r: &Side<'_, B>, f: F) -> Vec64<O>
    where
        A: Clone + Send + Sync,
        B: Clone + Send + Sync,
        O: Clone + Default + Send + Sync,
        F: Fn(A, B) -> O + Send + Sync,
    {
        let mut out: Vec64<O> = Vec64::with_capacity(n);
        out.resize(n, O::default());
        if n == 0 {
            return out;
        }
        let chunk = self.chunk_len(n);

        #[cfg(feature = "parallel_proc")]
        out.par_chunks_mut(chunk)
            .enumerate()
            .for_each(|(c, dst)| fill(dst, c * chunk, l, r, &f));

        #[cfg(not(feature = "parallel_proc"))]
        out.chunks_mut(chunk)
            .enumerate()
            .for_each(|(c, dst)| fill(dst, c * chunk, l, r, &f));

        out
    }
}

/// Operators the backend compiles.
fn compile(symbol: &str) -> Result<BinaryOperator, AccelError> {
    match BinaryOperator::from_symbol(symbol.trim()) {
        Some(BinaryOperator::FloorDivide) | None => {
            Err(AccelError::UnsupportedOperator(symbol.to_string()))
        }
        Some(op) => Ok(op),
    }
}

fn check_dtype(v: Values<'_>) -> Result<(), AccelError> {
    match v.dtype() {
        DType::Boolean | DType::Int64 | DType::Float64 => Ok(()),
        other => Err(AccelError::UnsupportedDtype(other.name())),
    }
}

/// Evaluates `a <symbol> b`.
pub fn evaluate_expr(
    symbol: &str,
    a: Values<'_>,
    b: Values<'_>,
    threads: usize,
) -> Result<Column, AccelError> {
    let op = compile(symbol)?;
    check_dtype(a)?;
    check_dtype(b)?;
    if let (Some(l), Some(r)) = (a.len(), b.len()) {
        if l != r {
            return Err(AccelError::Shape { left: l, right: r });
        }
    }
    Ok(apply_with(op, a, b, &Chunked { threads })?)
}

/// Evaluates `where(cond, a, b)`.
pub fn evaluate_where(
    cond: &[bool],
    a: Values<'_>,
    b: Values<'_>,
    threads: usize,
) -> Result<Column, AccelError> {
    check_dtype(a)?;
    check_dtype(b)?;
    Ok(select_with(cond, a, b, &Chunked { threads })?)
}
