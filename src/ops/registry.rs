// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Registry Module** - *Bound Operator Suites*
//!
//! Each container type owns one process-wide [`MethodTable`], built on first
//! use from its factories:
//!
//! | Type     | Operator suite                     | Flexible suite             |
//! |----------|------------------------------------|----------------------------|
//! | `Series` | aligned arithmetic, positional comparison and logic | arithmetic, comparison |
//! | `Frame`  | aligned arithmetic and logic, identically labeled comparison | arithmetic, union-aligned comparison |
//! | `Panel`  | scalar arithmetic and logic, panel or scalar comparison | none |
//!
//! On top of the tables this module generates:
//! - the `std::ops` impls (`+ - * / % & | ^`) for `&Series`, `&Frame` and
//!   `&Panel`, each returning a `Result`,
//! - the flexible methods (`add`, `rsub`, `multiply`, `eq`, ..) on `Series`
//!   and `Frame`, taking [`OpArgs`],
//! - [`dispatch`] over [`Operand`], which defers to the right operand's
//!   reflected method when the left operand declines.
//!
//! ```rust
//! use minframe::{OpArgs, Series};
//!
//! let a = Series::from_values(vec![1.0, 2.0]);
//! let b = Series::from_values(vec![10.0, 20.0]);
//! let sum = (&a + &b).unwrap();
//! let fill = a.add(&b, &OpArgs::new().fill_value(0.0)).unwrap();
//! assert_eq!(sum.get(1), fill.get(1));
//! ```

use std::ops::{Add, BitAnd, BitOr, BitXor, Div, Mul, Rem, Sub};
use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::enums::error::OpsError;
use crate::enums::operand::Operand;
use crate::enums::operators::{BinaryFunc, BinaryOperator, OpKind};
use crate::enums::scalar::Scalar;
use crate::kernels::broadcast::{frame, panel, series};
use crate::kernels::elementwise::{compare_scalars, scalar_binop};
use crate::kernels::settings::settings;
use crate::ops::descriptor::{OpArgs, OpDescriptor};
use crate::ops::factory::{
    BindOptions, Method, MethodFactories, MethodTable, add_flex_methods, add_special_methods,
    method,
};
use crate::structs::frame::Frame;
use crate::structs::panel::Panel;
use crate::structs::series::Series;

type Table<T> = OnceLock<Result<MethodTable<T>, OpsError>>;

static SERIES_METHODS: Table<Series> = OnceLock::new();
static FRAME_METHODS: Table<Frame> = OnceLock::new();
static PANEL_METHODS: Table<Panel> = OnceLock::new();

/// Containers with a bound operator suite.
pub trait BinaryOps: Sized + 'static {
    /// The operator table for this type.
    fn methods() -> Result<&'static MethodTable<Self>, OpsError>;

    /// Invokes the bound method `name`, e.g. `"__add__"` or `"rsub"`.
    fn binary(&self, name: &str, other: &Operand, args: &OpArgs) -> Result<Self, OpsError> {
        Self::methods()?.call(name, self, other, args)
    }
}

fn cached<T>(
    cell: &'static Table<T>,
    build: fn() -> Result<MethodTable<T>, OpsError>,
) -> Result<&'static MethodTable<T>, OpsError> {
    cell.get_or_init(build).as_ref().map_err(Clone::clone)
}

// Series

fn series_arith(desc: OpDescriptor) -> Method<Series> {
    method(move |s: &Series, other: &Operand, args: &OpArgs| {
        series::arith(&desc, s, other, args, &settings())
    })
}

fn series_comp(desc: OpDescriptor) -> Method<Series> {
    method(move |s: &Series, other: &Operand, args: &OpArgs| {
        series::compare(&desc, s, other, args, &settings())
    })
}

fn series_bool(desc: OpDescriptor) -> Method<Series> {
    method(move |s: &Series, other: &Operand, args: &OpArgs| {
        series::boolean(&desc, s, other, args, &settings())
    })
}

fn build_series() -> Result<MethodTable<Series>, OpsError> {
    let mut table = MethodTable::new();
    let special = MethodFactories {
        arith: series_arith,
        radd: None,
        comp: Some(series_comp),
        boolean: Some(series_bool),
    };
    let flex = MethodFactories {
        boolean: None,
        ..special.clone()
    };
    add_special_methods(&mut table, &special, &BindOptions::default())?;
    add_flex_methods(&mut table, &flex, &BindOptions::default())?;
    debug!(methods = table.len(), "bound Series operators");
    Ok(table)
}

impl BinaryOps for Series {
    fn methods() -> Result<&'static MethodTable<Self>, OpsError> {
        cached(&SERIES_METHODS, build_series)
    }
}

// Frame

fn frame_arith(desc: OpDescriptor) -> Method<Frame> {
    method(move |f: &Frame, other: &Operand, args: &OpArgs| {
        frame::arith(&desc, f, other, args, &settings())
    })
}

fn frame_comp(desc: OpDescriptor) -> Method<Frame> {
    method(move |f: &Frame, other: &Operand, args: &OpArgs| {
        frame::compare(&desc, f, other, args, &settings())
    })
}

fn frame_flex_comp(desc: OpDescriptor) -> Method<Frame> {
    method(move |f: &Frame, other: &Operand, args: &OpArgs| {
        frame::flex_compare(&desc, f, other, args, &settings())
    })
}

fn frame_bool(desc: OpDescriptor) -> Method<Frame> {
    method(move |f: &Frame, other: &Operand, args: &OpArgs| {
        frame::boolean(&desc, f, other, args, &settings())
    })
}

fn build_frame() -> Result<MethodTable<Frame>, OpsError> {
    let mut table = MethodTable::new();
    let special = MethodFactories {
        arith: frame_arith,
        radd: None,
        comp: Some(frame_comp),
        boolean: Some(frame_bool),
    };
    let flex = MethodFactories {
        arith: frame_arith,
        radd: None,
        comp: Some(frame_flex_comp),
        boolean: None,
    };
    add_special_methods(&mut table, &special, &BindOptions::default())?;
    add_flex_methods(&mut table, &flex, &BindOptions::default())?;
    debug!(methods = table.len(), "bound Frame operators");
    Ok(table)
}

impl BinaryOps for Frame {
    fn methods() -> Result<&'static MethodTable<Self>, OpsError> {
        cached(&FRAME_METHODS, build_frame)
    }
}

// Panel

fn panel_arith(desc: OpDescriptor) -> Method<Panel> {
    method(move |p: &Panel, other: &Operand, args: &OpArgs| {
        args.check_level()?;
        panel::arith(&desc, p, other, &settings())
    })
}

fn panel_comp(desc: OpDescriptor) -> Method<Panel> {
    method(move |p: &Panel, other: &Operand, args: &OpArgs| {
        args.check_level()?;
        panel::compare(&desc, p, other, &settings())
    })
}

fn panel_bool(desc: OpDescriptor) -> Method<Panel> {
    method(move |p: &Panel, other: &Operand, args: &OpArgs| {
        args.check_level()?;
        panel::boolean(&desc, p, other, &settings())
    })
}

fn build_panel() -> Result<MethodTable<Panel>, OpsError> {
    let mut table = MethodTable::new();
    let special = MethodFactories {
        arith: panel_arith,
        radd: None,
        comp: Some(panel_comp),
        boolean: Some(panel_bool),
    };
    add_special_methods(&mut table, &special, &BindOptions::default())?;
    debug!(methods = table.len(), "bound Panel operators");
    Ok(table)
}

impl BinaryOps for Panel {
    fn methods() -> Result<&'static MethodTable<Self>, OpsError> {
        cached(&PANEL_METHODS, build_panel)
    }
}

/// Implements `std::ops` operator traits for a container reference through
/// its operator-overload methods.
macro_rules! impl_operator_traits {
    ($ty:ty) => {
        impl_operator_traits!(@op $ty, Add, add, "__add__");
        impl_operator_traits!(@op $ty, Sub, sub, "__sub__");
        impl_operator_traits!(@op $ty, Mul, mul, "__mul__");
        impl_operator_traits!(@op $ty, Div, div, "__truediv__");
        impl_operator_traits!(@op $ty, Rem, rem, "__mod__");
        impl_operator_traits!(@op $ty, BitAnd, bitand, "__and__");
        impl_operator_traits!(@op $ty, BitOr, bitor, "__or__");
        impl_operator_traits!(@op $ty, BitXor, bitxor, "__xor__");
    };
    (@op $ty:ty, $trait:ident, $method:ident, $name:literal) => {
        impl<R: Into<Operand>> $trait<R> for &$ty {
            type Output = Result<$ty, OpsError>;

            #[inline]
            fn $method(self, rhs: R) -> Self::Output {
                self.binary($name, &rhs.into(), &OpArgs::default())
            }
        }
    };
}

impl_operator_traits!(Series);
impl_operator_traits!(Frame);
impl_operator_traits!(Panel);

/// Generates the flexible methods of a container.
macro_rules! impl_flex_methods {
    ($ty:ty; $($method:ident => $name:literal),+ $(,)?) => {
        impl $ty {
            $(
                #[doc = concat!("Flexible `", $name, "`. See [`OpArgs`] for `axis`, `level` and `fill_value`.")]
                pub fn $method(&self, other: impl Into<Operand>, args: &OpArgs) -> Result<$ty, OpsError> {
                    self.binary($name, &other.into(), args)
                }
            )+
        }
    };
}

macro_rules! impl_flex_suite {
    ($($ty:ty),+) => {
        $(
            impl_flex_methods!($ty;
                add => "add", radd => "radd",
                sub => "sub", rsub => "rsub", subtract => "subtract",
                mul => "mul", rmul => "rmul", multiply => "multiply",
                truediv => "truediv", rtruediv => "rtruediv",
                floordiv => "floordiv", rfloordiv => "rfloordiv",
                r#mod => "mod", rmod => "rmod",
                pow => "pow", rpow => "rpow",
                div => "div", rdiv => "rdiv", divide => "divide",
                eq => "eq", ne => "ne", lt => "lt", gt => "gt", le => "le", ge => "ge",
            );
        )+
    };
}

impl_flex_suite!(Series, Frame);

/// Evaluates `left <op> right` over any operand pair.
///
/// The left operand's operator method runs first. If it declines, the right
/// operand's reflected method runs with the operands swapped: arithmetic uses
/// `__rX__`, comparisons swap direction (`lt` and `gt`, `le` and `ge`), and
/// logical operators are symmetric. Two scalars compute directly.
pub fn dispatch(op: BinaryOperator, left: &Operand, right: &Operand) -> Result<Operand, OpsError> {
    if let (Operand::Scalar(a), Operand::Scalar(b)) = (left, right) {
        return scalar_pair(op, a, b).map(Operand::Scalar);
    }
    let args = OpArgs::default();
    match call_receiver(left, &BinaryFunc::new(op).special_name(), right, &args) {
        Err(e) if e.is_not_implemented() => {
            let name = reflected_name(op);
            trace!(op = %op, left = left.kind_name(), right = right.kind_name(), method = %name, "deferring to right operand");
            call_receiver(right, &name, left, &args)
        }
        other => other,
    }
}

fn call_receiver(
    receiver: &Operand,
    name: &str,
    other: &Operand,
    args: &OpArgs,
) -> Result<Operand, OpsError> {
    match receiver {
        Operand::Series(s) => s.binary(name, other, args).map(Operand::Series),
        Operand::Frame(f) => f.binary(name, other, args).map(Operand::Frame),
        Operand::Panel(p) => p.binary(name, other, args).map(Operand::Panel),
        Operand::Scalar(_) | Operand::List(_) | Operand::Array(_) => Err(OpsError::NotImplemented {
            message: format!(
                "unsupported operand types for {}: {} and {}",
                name,
                receiver.kind_name(),
                other.kind_name()
            ),
        }),
    }
}

fn reflected_name(op: BinaryOperator) -> String {
    match op.kind() {
        OpKind::Arithmetic => BinaryFunc::reflected(op).special_name(),
        OpKind::Comparison => BinaryFunc::new(op.swapped_comparison().unwrap_or(op)).special_name(),
        OpKind::Logical => BinaryFunc::new(op).special_name(),
    }
}

fn scalar_pair(op: BinaryOperator, a: &Scalar, b: &Scalar) -> Result<Scalar, OpsError> {
    match op.kind() {
        OpKind::Comparison => compare_scalars(op, a, b).map(Scalar::Boolean),
        OpKind::Arithmetic | OpKind::Logical => scalar_binop(op, a, b),
    }
}

macro_rules! impl_operand_operators {
    ($($trait:ident, $method:ident, $op:expr);+ $(;)?) => {
        $(
            impl $trait for Operand {
                type Output = Result<Operand, OpsError>;

                #[inline]
                fn $method(self, rhs: Operand) -> Self::Output {
                    dispatch($op, &self, &rhs)
                }
            }

            impl $trait<&Operand> for &Operand {
                type Output = Result<Operand, OpsError>;

                #[inline]
                fn $method(self, rhs: &Operand) -> Self::Output {
                    dispatch($op, self, rhs)
                }
            }
        )+
    };
}

impl_operand_operators!(
    Add, add, BinaryOperator::Add;
    Sub, sub, BinaryOperator::Subtract;
    Mul, mul, BinaryOperator::Multiply;
    Div, div, BinaryOperator::TrueDivide;
    Rem, rem, BinaryOperator::Remainder;
    BitAnd, bitand, BinaryOperator::And;
    BitOr, bitor, BinaryOperator::Or;
    BitXor, bitxor, BinaryOperator::Xor;
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::column::Column;

    #[test]
    fn test_tables_bind_expected_names() {
        let s = Series::methods().unwrap();
        for name in ["__add__", "__radd__", "__iadd__", "__and__", "__eq__", "add", "multiply", "eq"] {
            assert!(s.contains(name), "{name}");
        }
        assert!(!s.contains("and_"));

        let f = Frame::methods().unwrap();
        assert!(f.contains("__xor__") && f.contains("divide") && f.contains("ge"));

        let p = Panel::methods().unwrap();
        assert!(p.contains("__lt__"));
        assert!(!p.contains("add"));
    }

    #[test]
    fn test_scalar_minus_series_defers_to_reflected() {
        let s = Series::from_values(vec![1i64, 2, 3]);
        let out = dispatch(BinaryOperator::Subtract, &Operand::from(10i64), &Operand::from(&s)).unwrap();
        assert_eq!(out.into_series().unwrap().values.as_ref(), &Column::from(vec![9i64, 8, 7]));
    }

    #[test]
    fn test_comparison_defers_with_swapped_direction() {
        let s = Series::from_values(vec![1i64, 5]);
        let out = dispatch(BinaryOperator::LessThan, &Operand::from(3i64), &Operand::from(&s)).unwrap();
        assert_eq!(out.into_series().unwrap().values.as_ref(), &Column::from(vec![false, true]));
    }

    #[test]
    fn test_series_plus_frame_defers_to_frame() {
        let s = Series::new(vec![1.0, 2.0], ["a", "b"].into_iter().collect(), None).unwrap();
        let f = Frame::from_columns(vec![
            ("a", Column::from(vec![10.0, 20.0])),
            ("b", Column::from(vec![30.0, 40.0])),
        ])
        .unwrap();
        assert!((&s + &f).unwrap_err().is_not_implemented());
        let out = (Operand::from(&s) + Operand::from(&f)).unwrap().into_frame().unwrap();
        assert_eq!(out.col(0), &Column::from(vec![11.0, 21.0]));
        assert_eq!(out.col(1), &Column::from(vec![32.0, 42.0]));
    }

    #[test]
    fn test_two_scalars() {
        let out = dispatch(BinaryOperator::Multiply, &Operand::from("ab"), &Operand::from(2i64)).unwrap();
        assert!(matches!(out, Operand::Scalar(Scalar::String(ref s)) if s == "abab"));
        let out = dispatch(BinaryOperator::GreaterEqual, &Operand::from(2.5), &Operand::from(2i64)).unwrap();
        assert!(matches!(out, Operand::Scalar(Scalar::Boolean(true))));
    }

    #[test]
    fn test_operator_traits_and_flex_methods() {
        let a = Series::from_values(vec![6i64, 7]);
        let r = (&a % 4i64).unwrap();
        assert_eq!(r.values.as_ref(), &Column::from(vec![2i64, 3]));
        let r = a.rsub(10i64, &OpArgs::new()).unwrap();
        assert_eq!(r.values.as_ref(), &Column::from(vec![4i64, 3]));
        let r = a.r#mod(4i64, &OpArgs::new()).unwrap();
        assert_eq!(r.values.as_ref(), &Column::from(vec![2i64, 3]));
        let r = a.divide(2i64, &OpArgs::new()).unwrap();
        assert_eq!(r.values.as_ref(), &Column::from(vec![3.0, 3.5]));
    }
}
