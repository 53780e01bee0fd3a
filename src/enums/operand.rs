// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Operand Module** - *Binary Operator Inputs*
//!
//! `Operand` is the closed set of values that can stand on either side of a
//! binary operator. Operator dispatch over it lives in [`crate::ops::registry`].

use crate::enums::scalar::Scalar;
use crate::structs::frame::Frame;
use crate::structs::ndarray::NdArray;
use crate::structs::panel::Panel;
use crate::structs::series::Series;

/// # Operand
///
/// - `Scalar`: broadcast against every element.
/// - `Series`, `Frame`, `Panel`: labeled containers, aligned by label.
/// - `List`: a literal sequence, wrapped with the receiver's labels before use.
/// - `Array`: an unlabeled 1-D or 2-D buffer, wrapped likewise.
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(Scalar),
    Series(Series),
    Frame(Frame),
    Panel(Panel),
    List(Vec<Scalar>),
    Array(NdArray),
}

impl Operand {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operand::Scalar(_) => "Scalar",
            Operand::Series(_) => "Series",
            Operand::Frame(_) => "Frame",
            Operand::Panel(_) => "Panel",
            Operand::List(_) => "List",
            Operand::Array(_) => "NdArray",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Operand::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_series(&self) -> Option<&Series> {
        match self {
            Operand::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_frame(&self) -> Option<&Frame> {
        match self {
            Operand::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_panel(&self) -> Option<&Panel> {
        match self {
            Operand::Panel(p) => Some(p),
            _ => None,
        }
    }

    /// The series inside a dispatch result, if that is what it holds.
    pub fn into_series(self) -> Option<Series> {
        match self {
            Operand::Series(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_frame(self) -> Option<Frame> {
        match self {
            Operand::Frame(f) => Some(f),
            _ => None,
        }
    }

    pub fn into_panel(self) -> Option<Panel> {
        match self {
            Operand::Panel(p) => Some(p),
            _ => None,
        }
    }
}

macro_rules! impl_operand_from {
    ($variant:ident: $($t:ty),+ $(,)?) => {
        $(
            impl From<$t> for Operand {
                #[inline] fn from(v: $t) -> Self { Operand::$variant(v.into()) }
            }
        )+
    };
}

impl_operand_from!(Scalar: Scalar, bool, i64, i32, f64, &str, String);
impl_operand_from!(Series: Series);
impl_operand_from!(Frame: Frame);
impl_operand_from!(Panel: Panel);
impl_operand_from!(List: Vec<Scalar>);
impl_operand_from!(Array: NdArray);

impl From<&Series> for Operand {
    fn from(v: &Series) -> Self {
        Operand::Series(v.clone())
    }
}

impl From<&Frame> for Operand {
    fn from(v: &Frame) -> Self {
        Operand::Frame(v.clone())
    }
}

impl From<&Panel> for Operand {
    fn from(v: &Panel) -> Self {
        Operand::Panel(v.clone())
    }
}
