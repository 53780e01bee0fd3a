// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Series Broadcast Module** - *1-D Receivers*
//!
//! - Arithmetic against another series outer-joins the indexes. Equal indexes
//!   skip the join and the left index is reused.
//! - Comparisons and logical operators are positional and need equal lengths.
//! - A frame or panel operand is declined so dispatch can defer to it.

use crate::enums::error::OpsError;
use crate::enums::operand::Operand;
use crate::enums::scalar::Scalar;
use crate::kernels::broadcast::{
    arith_realigned, arith_values, bool_values, compare_values, declined, fill_one_sided,
    match_name,
};
use crate::kernels::elementwise::Values;
use crate::kernels::settings::EvalSettings;
use crate::ops::descriptor::{OpArgs, OpDescriptor};
use crate::structs::column::Column;
use crate::structs::series::Series;

/// `left <op> other` for an arithmetic operator.
///
/// With `fill_value`, a position missing on exactly one side takes the fill
/// before the operator runs.
pub fn arith(
    desc: &OpDescriptor,
    left: &Series,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Series, OpsError> {
    args.check_level()?;
    match other {
        Operand::Series(right) => aligned(desc, left, right, args.fill_value.as_ref(), settings),
        Operand::Scalar(s) => {
            let out = arith_values(desc, &left.values, Values::Scalar(s), settings)?;
            Ok(Series::from_parts(out, left.index.clone(), left.name.clone()))
        }
        Operand::List(_) | Operand::Array(_) => {
            let values = one_dim(desc, left, other, "Lengths must be equal")?;
            let right = Series::from_parts(values, left.index.clone(), None);
            aligned(desc, left, &right, args.fill_value.as_ref(), settings)
        }
        Operand::Frame(_) | Operand::Panel(_) => Err(declined(desc, "Series", other.kind_name())),
    }
}

fn aligned(
    desc: &OpDescriptor,
    left: &Series,
    right: &Series,
    fill: Option<&Scalar>,
    settings: &EvalSettings,
) -> Result<Series, OpsError> {
    let joined = left.index.join(&right.index);
    let lvals = left.reindexed(joined.left.as_deref(), &joined.index).values;
    let rvals = right.reindexed(joined.right.as_deref(), &joined.index).values;
    let before = (Some(&*left.values), Some(&*right.values));
    let out = match fill {
        Some(fill) => {
            let (l, r) = fill_one_sided(&lvals, &rvals, fill);
            arith_realigned(desc, &l, &r, before, settings)?
        }
        None => arith_realigned(desc, &lvals, &rvals, before, settings)?,
    };
    Ok(Series::from_parts(
        out,
        joined.index,
        match_name(&left.name, &right.name),
    ))
}

/// `left <op> other` for a comparison. Missing positions take the masker.
pub fn compare(
    desc: &OpDescriptor,
    left: &Series,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Series, OpsError> {
    args.check_level()?;
    match other {
        Operand::Series(right) => {
            if left.len() != right.len() {
                return Err(OpsError::validation(&desc.name, "Series lengths must match to compare"));
            }
            let out = compare_values(desc, &left.values, Values::Array(&*right.values), settings)?;
            Ok(Series::from_parts(
                out,
                left.index.clone(),
                match_name(&left.name, &right.name),
            ))
        }
        Operand::Scalar(s) => {
            let out = compare_values(desc, &left.values, Values::Scalar(s), settings)?;
            Ok(Series::from_parts(out, left.index.clone(), left.name.clone()))
        }
        Operand::List(_) | Operand::Array(_) => {
            let values = one_dim(desc, left, other, "Lengths must match to compare")?;
            let out = compare_values(desc, &left.values, Values::Array(&values), settings)?;
            Ok(Series::from_parts(out, left.index.clone(), left.name.clone()))
        }
        Operand::Frame(_) | Operand::Panel(_) => Err(declined(desc, "Series", other.kind_name())),
    }
}

/// `left <op> other` for a logical operator. Positional.
pub fn boolean(
    desc: &OpDescriptor,
    left: &Series,
    other: &Operand,
    args: &OpArgs,
    settings: &EvalSettings,
) -> Result<Series, OpsError> {
    args.check_level()?;
    let (out, name) = match other {
        Operand::Series(right) => {
            if left.len() != right.len() {
                return Err(OpsError::LengthMismatch {
                    context: "Series logical operator",
                    left: left.len(),
                    right: right.len(),
                });
            }
            (
                bool_values(desc, &left.values, Values::Array(&*right.values), settings)?,
                match_name(&left.name, &right.name),
            )
        }
        Operand::Scalar(s) => (
            bool_values(desc, &left.values, Values::Scalar(s), settings)?,
            left.name.clone(),
        ),
        Operand::List(_) | Operand::Array(_) => {
            let values = one_dim(desc, left, other, "Lengths must be equal")?;
            (
                bool_values(desc, &left.values, Values::Array(&values), settings)?,
                left.name.clone(),
            )
        }
        Operand::Frame(_) | Operand::Panel(_) => {
            return Err(declined(desc, "Series", other.kind_name()));
        }
    };
    Ok(Series::from_parts(out, left.index.clone(), name))
}

/// Values of a list or 1-D array operand, checked against the receiver's length.
fn one_dim(
    desc: &OpDescriptor,
    left: &Series,
    other: &Operand,
    length_message: &str,
) -> Result<Column, OpsError> {
    let values = match other {
        Operand::List(items) => Column::from_scalars(items.clone()),
        Operand::Array(arr) if arr.ndim() == 1 => arr.data.clone(),
        Operand::Array(arr) => {
            return Err(OpsError::Shape {
                shape: arr.shape.clone(),
                message: "Incompatible argument shape".to_string(),
            });
        }
        _ => return Err(declined(desc, "Series", other.kind_name())),
    };
    if values.len() != left.len() {
        return Err(OpsError::validation(&desc.name, length_message));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enums::operators::{BinaryFunc, BinaryOperator};
    use crate::structs::index::LabelIndex;

    fn desc(op: BinaryOperator) -> OpDescriptor {
        OpDescriptor::new(BinaryFunc::new(op), op.key(), true)
    }

    fn labeled(values: Vec<f64>, labels: &[&str], name: Option<&str>) -> Series {
        Series::new(
            values,
            labels.iter().copied().collect::<LabelIndex>(),
            name.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn test_outer_join_and_names() {
        let a = labeled(vec![1.0, 2.0], &["a", "b"], Some("x"));
        let b = labeled(vec![10.0, 20.0], &["b", "c"], Some("x"));
        let s = EvalSettings::plain();
        let out = arith(&desc(BinaryOperator::Add), &a, &(&b).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(out.index, ["a", "b", "c"].into_iter().collect::<LabelIndex>());
        assert!(out.get(0).is_null());
        assert_eq!(out.get(1), Scalar::Float64(12.0));
        assert!(out.get(2).is_null());
        assert_eq!(out.name.as_deref(), Some("x"));

        let c = b.clone().with_name("y");
        let out = arith(&desc(BinaryOperator::Add), &a, &(&c).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(out.name, None);
    }

    #[test]
    fn test_fill_value_one_sided() {
        let a = labeled(vec![1.0, f64::NAN], &["a", "b"], None);
        let b = labeled(vec![f64::NAN, 5.0], &["b", "c"], None);
        let args = OpArgs::new().fill_value(0.0);
        let out = arith(&desc(BinaryOperator::Add), &a, &(&b).into(), &args, &EvalSettings::plain()).unwrap();
        assert_eq!(out.get(0), Scalar::Float64(1.0));
        assert!(out.get(1).is_null());
        assert_eq!(out.get(2), Scalar::Float64(5.0));
    }

    #[test]
    fn test_list_operand_wraps_with_receiver_index() {
        let a = labeled(vec![1.0, 2.0], &["a", "b"], None);
        let list = Operand::List(vec![Scalar::Int64(1), Scalar::Int64(1)]);
        let out = arith(&desc(BinaryOperator::Subtract), &a, &list, &OpArgs::new(), &EvalSettings::plain()).unwrap();
        assert!(out.index.ptr_eq(&a.index));
        assert_eq!(out.values.as_ref(), &Column::from(vec![0.0, 1.0]));

        let short = Operand::List(vec![Scalar::Int64(1)]);
        let err = arith(&desc(BinaryOperator::Subtract), &a, &short, &OpArgs::new(), &EvalSettings::plain());
        assert!(matches!(err, Err(OpsError::Validation { .. })));
    }

    #[test]
    fn test_compare_positional() {
        let a = labeled(vec![1.0, f64::NAN, 3.0], &["a", "b", "c"], None);
        let b = labeled(vec![1.0, 2.0, 4.0], &["x", "y", "z"], None);
        let s = EvalSettings::plain();
        let eq = compare(&desc(BinaryOperator::Equal), &a, &(&b).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(eq.values.as_ref(), &Column::from(vec![true, false, false]));
        let ne = compare(&desc(BinaryOperator::NotEqual), &a, &(&b).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(ne.values.as_ref(), &Column::from(vec![false, true, true]));

        let short = labeled(vec![1.0], &["a"], None);
        let err = compare(&desc(BinaryOperator::Equal), &a, &(&short).into(), &OpArgs::new(), &s);
        assert!(matches!(err, Err(OpsError::Validation { .. })));
    }

    #[test]
    fn test_frame_operand_declined() {
        let a = labeled(vec![1.0], &["a"], None);
        let f = crate::structs::frame::Frame::from_columns(vec![("a", Column::from(vec![1.0]))]).unwrap();
        let err = arith(&desc(BinaryOperator::Add), &a, &(&f).into(), &OpArgs::new(), &EvalSettings::plain())
            .unwrap_err();
        assert!(err.is_not_implemented());
    }

    #[test]
    fn test_boolean_positional() {
        let a = Series::from_values(vec![true, false, true]);
        let b = Series::from_values(vec![true, true, false]);
        let s = EvalSettings::plain();
        let and = boolean(&desc(BinaryOperator::And), &a, &(&b).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(and.values.as_ref(), &Column::from(vec![true, false, false]));
        let xor = boolean(&desc(BinaryOperator::Xor), &a, &(&b).into(), &OpArgs::new(), &s).unwrap();
        assert_eq!(xor.values.as_ref(), &Column::from(vec![false, true, true]));
    }
}
