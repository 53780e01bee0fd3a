// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Operators Module** - *Binary Operator Vocabulary*
//!
//! The closed set of binary operators the engine synthesizes, their
//! canonical keys, the symbolic strings understood by the accelerated
//! backend, and the reflection and axis vocabulary shared by the
//! alignment wrappers and the operator suite factory.

use std::fmt::{Display, Formatter, Result as FmtResult};

/// Operator family, which decides the executor variant and result dtype rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Arithmetic,
    Comparison,
    Logical,
}

/// # BinaryOperator
///
/// Every base operator the engine supports. Reflection is carried separately
/// by [`BinaryFunc`] so that `rsub` is `Subtract` with swapped operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    TrueDivide,
    FloorDivide,
    Remainder,
    Power,
    Equal,
    NotEqual,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    And,
    Or,
    Xor,
}

impl BinaryOperator {
    pub const ARITHMETIC: [BinaryOperator; 7] = [
        BinaryOperator::Add,
        BinaryOperator::Subtract,
        BinaryOperator::Multiply,
        BinaryOperator::TrueDivide,
        BinaryOperator::FloorDivide,
        BinaryOperator::Remainder,
        BinaryOperator::Power,
    ];

    pub const COMPARISON: [BinaryOperator; 6] = [
        BinaryOperator::Equal,
        BinaryOperator::NotEqual,
        BinaryOperator::LessThan,
        BinaryOperator::GreaterThan,
        BinaryOperator::LessEqual,
        BinaryOperator::GreaterEqual,
    ];

    pub const LOGICAL: [BinaryOperator; 3] =
        [BinaryOperator::And, BinaryOperator::Or, BinaryOperator::Xor];

    /// Canonical method key, e.g. `"truediv"` or `"and_"`.
    pub const fn key(self) -> &'static str {
        match self {
            BinaryOperator::Add => "add",
            BinaryOperator::Subtract => "sub",
            BinaryOperator::Multiply => "mul",
            BinaryOperator::TrueDivide => "truediv",
            BinaryOperator::FloorDivide => "floordiv",
            BinaryOperator::Remainder => "mod",
            BinaryOperator::Power => "pow",
            BinaryOperator::Equal => "eq",
            BinaryOperator::NotEqual => "ne",
            BinaryOperator::LessThan => "lt",
            BinaryOperator::GreaterThan => "gt",
            BinaryOperator::LessEqual => "le",
            BinaryOperator::GreaterEqual => "ge",
            BinaryOperator::And => "and_",
            BinaryOperator::Or => "or_",
            BinaryOperator::Xor => "xor",
        }
    }

    /// Parses a canonical key, accepting `div` as an alias of true division.
    pub fn from_key(key: &str) -> Option<Self> {
        let op = match key {
            "add" => BinaryOperator::Add,
            "sub" => BinaryOperator::Subtract,
            "mul" => BinaryOperator::Multiply,
            "truediv" | "div" => BinaryOperator::TrueDivide,
            "floordiv" => BinaryOperator::FloorDivide,
            "mod" => BinaryOperator::Remainder,
            "pow" => BinaryOperator::Power,
            "eq" => BinaryOperator::Equal,
            "ne" => BinaryOperator::NotEqual,
            "lt" => BinaryOperator::LessThan,
            "gt" => BinaryOperator::GreaterThan,
            "le" => BinaryOperator::LessEqual,
            "ge" => BinaryOperator::GreaterEqual,
            "and_" => BinaryOperator::And,
            "or_" => BinaryOperator::Or,
            "xor" => BinaryOperator::Xor,
            _ => return None,
        };
        Some(op)
    }

    /// Symbolic string for the accelerated backend.
    ///
    /// Remainder and xor have no accelerated form and always evaluate on the plain path.
    pub const fn symbol(self) -> Option<&'static str> {
        match self {
            BinaryOperator::Add => Some("+"),
            BinaryOperator::Subtract => Some("-"),
            BinaryOperator::Multiply => Some("*"),
            BinaryOperator::TrueDivide => Some("/"),
            BinaryOperator::FloorDivide => Some("//"),
            BinaryOperator::Remainder => None,
            BinaryOperator::Power => Some("**"),
            BinaryOperator::Equal => Some("=="),
            BinaryOperator::NotEqual => Some("!="),
            BinaryOperator::LessThan => Some("<"),
            BinaryOperator::GreaterThan => Some(">"),
            BinaryOperator::LessEqual => Some("<="),
            BinaryOperator::GreaterEqual => Some(">="),
            BinaryOperator::And => Some("&"),
            BinaryOperator::Or => Some("|"),
            BinaryOperator::Xor => None,
        }
    }

    /// Inverse of [`BinaryOperator::symbol`].
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        let op = match symbol {
            "+" => BinaryOperator::Add,
            "-" => BinaryOperator::Subtract,
            "*" => BinaryOperator::Multiply,
            "/" => BinaryOperator::TrueDivide,
            "//" => BinaryOperator::FloorDivide,
            "**" => BinaryOperator::Power,
            "==" => BinaryOperator::Equal,
            "!=" => BinaryOperator::NotEqual,
            "<" => BinaryOperator::LessThan,
            ">" => BinaryOperator::GreaterThan,
            "<=" => BinaryOperator::LessEqual,
            ">=" => BinaryOperator::GreaterEqual,
            "&" => BinaryOperator::And,
            "|" => BinaryOperator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub const fn kind(self) -> OpKind {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::Multiply
            | BinaryOperator::TrueDivide
            | BinaryOperator::FloorDivide
            | BinaryOperator::Remainder
            | BinaryOperator::Power => OpKind::Arithmetic,
            BinaryOperator::Equal
            | BinaryOperator::NotEqual
            | BinaryOperator::LessThan
            | BinaryOperator::GreaterThan
            | BinaryOperator::LessEqual
            | BinaryOperator::GreaterEqual => OpKind::Comparison,
            BinaryOperator::And | BinaryOperator::Or | BinaryOperator::Xor => OpKind::Logical,
        }
    }

    /// The comparison that gives the same answer with operands swapped, `a < b` == `b > a`.
    pub const fn swapped_comparison(self) -> Option<Self> {
        match self {
            BinaryOperator::Equal => Some(BinaryOperator::Equal),
            BinaryOperator::NotEqual => Some(BinaryOperator::NotEqual),
            BinaryOperator::LessThan => Some(BinaryOperator::GreaterThan),
            BinaryOperator::GreaterThan => Some(BinaryOperator::LessThan),
            BinaryOperator::LessEqual => Some(BinaryOperator::GreaterEqual),
            BinaryOperator::GreaterEqual => Some(BinaryOperator::LessEqual),
            _ => None,
        }
    }

    /// Zero-division fill value. `+inf` for true and floor division, `NaN` for modulo.
    pub fn zero_division_fill(self) -> Option<f64> {
        match self {
            BinaryOperator::TrueDivide | BinaryOperator::FloorDivide => Some(f64::INFINITY),
            BinaryOperator::Remainder => Some(f64::NAN),
            _ => None,
        }
    }

    /// Value written at missing positions of a comparison result.
    /// Only `ne` treats absence as a difference.
    pub const fn masker(self) -> bool {
        matches!(self, BinaryOperator::NotEqual)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.key())
    }
}

/// # BinaryFunc
///
/// A base operator plus its operand order. `reflected` computes `op(right, left)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinaryFunc {
    pub op: BinaryOperator,
    pub reflected: bool,
}

impl BinaryFunc {
    #[inline]
    pub const fn new(op: BinaryOperator) -> Self {
        Self { op, reflected: false }
    }

    #[inline]
    pub const fn reflected(op: BinaryOperator) -> Self {
        Self { op, reflected: true }
    }

    /// Method key including the reflection marker, e.g. `"rsub"`.
    pub fn key(&self) -> String {
        if self.reflected {
            format!("r{}", self.op.key())
        } else {
            self.op.key().to_string()
        }
    }

    /// Operator-overload name, e.g. `"__rsub__"` or `"__and__"`.
    pub fn special_name(&self) -> String {
        special_name(&self.key())
    }
}

impl From<BinaryOperator> for BinaryFunc {
    fn from(op: BinaryOperator) -> Self {
        BinaryFunc::new(op)
    }
}

impl Display for BinaryFunc {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.key())
    }
}

/// Wraps a key as a double-underscore name. Keys with a trailing underscore
/// (`and_`, `or_`) keep a single extra underscore, giving `__and__`.
pub fn special_name(key: &str) -> String {
    if key.ends_with('_') {
        format!("__{}_", key)
    } else {
        format!("__{}__", key)
    }
}

/// # Axis
///
/// Broadcast axis for combining a table with a 1-D operand.
/// - `Index`: the 1-D operand aligns against row labels, broadcast across columns.
/// - `Columns`: the 1-D operand aligns against column labels, broadcast down rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    Index,
    #[default]
    Columns,
}

impl Axis {
    /// `0` is the row axis, `1` the column axis.
    pub fn from_number(n: usize) -> Option<Self> {
        match n {
            0 => Some(Axis::Index),
            1 => Some(Axis::Columns),
            _ => None,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "index" | "rows" => Some(Axis::Index),
            "columns" => Some(Axis::Columns),
            _ => None,
        }
    }
}
