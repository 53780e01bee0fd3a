//! The accelerated path must return exactly what the plain path returns.
//! Properties run the dispatcher directly with explicit settings, plus one
//! end-to-end check through the process-wide settings.

use minframe::kernels::elementwise::Values;
use minframe::kernels::settings::{set_min_elements, set_threads, set_use_accelerated};
use minframe::{
    BinaryFunc, BinaryOperator, Column, EvalSettings, Frame, LabelIndex, OpArgs, Scalar, Series,
    SettingsGuard, can_use_accelerated, can_use_accelerated_frame, evaluate, where_values,
};
use proptest::prelude::*;

fn same(a: &Column, b: &Column) -> bool {
    a.dtype() == b.dtype()
        && a.len() == b.len()
        && a.iter().zip(b.iter()).all(|(x, y)| (x.is_null() && y.is_null()) || x == y)
}

fn int_column() -> impl Strategy<Value = Column> {
    proptest::collection::vec(-1_000i64..1_000, 1..400).prop_map(Column::from)
}

fn float_column() -> impl Strategy<Value = Column> {
    proptest::collection::vec(
        prop_oneof![
            8 => (-1.0e6f64..1.0e6).boxed(),
            1 => Just(f64::NAN).boxed(),
            1 => Just(0.0f64).boxed(),
        ],
        1..400,
    )
    .prop_map(Column::from)
}

fn operator() -> impl Strategy<Value = BinaryOperator> {
    prop_oneof![
        Just(BinaryOperator::Add),
        Just(BinaryOperator::Subtract),
        Just(BinaryOperator::Multiply),
        Just(BinaryOperator::TrueDivide),
        Just(BinaryOperator::FloorDivide),
        Just(BinaryOperator::Remainder),
        Just(BinaryOperator::Equal),
        Just(BinaryOperator::NotEqual),
        Just(BinaryOperator::LessThan),
        Just(BinaryOperator::GreaterEqual),
    ]
}

fn both_paths(func: BinaryFunc, left: &Column, right: Values<'_>) -> (Column, Column) {
    let symbol = func.op.symbol();
    let plain = evaluate(func, symbol, left, right, &EvalSettings::plain()).unwrap();
    let fast = evaluate(func, symbol, left, right, &EvalSettings::accelerated(0)).unwrap();
    (plain, fast)
}

proptest! {
    #[test]
    fn prop_float_arrays_match(op in operator(), left in float_column(), seed in any::<u64>()) {
        let right: Column = left
            .iter()
            .enumerate()
            .map(|(i, v)| v.try_f64().unwrap_or(0.0) * 0.5 + ((seed as usize + i) % 7) as f64)
            .collect::<Vec<f64>>()
            .into();
        let (plain, fast) = both_paths(op.into(), &left, Values::Array(&right));
        prop_assert!(same(&plain, &fast));
    }

    #[test]
    fn prop_int_scalars_match(op in operator(), left in int_column(), k in -5i64..5, reflected in any::<bool>()) {
        let func = if reflected { BinaryFunc::reflected(op) } else { BinaryFunc::new(op) };
        let k = Scalar::Int64(k);
        let (plain, fast) = both_paths(func, &left, Values::Scalar(&k));
        prop_assert!(same(&plain, &fast));
    }

    #[test]
    fn prop_where_matches(cond in proptest::collection::vec(any::<bool>(), 1..300), k in -10.0f64..10.0) {
        let a = Column::from((0..cond.len()).map(|i| i as f64).collect::<Vec<_>>());
        let b = Scalar::Float64(k);
        let plain = where_values(&cond, Values::Array(&a), Values::Scalar(&b), &EvalSettings::plain()).unwrap();
        let fast = where_values(&cond, Values::Array(&a), Values::Scalar(&b), &EvalSettings::accelerated(0)).unwrap();
        prop_assert!(same(&plain, &fast));
    }
}

#[test]
fn test_gate_threshold_is_strict() {
    let settings = EvalSettings::accelerated(4);
    let four = Column::from(vec![1.0; 4]);
    let five = Column::from(vec![1.0; 5]);
    let k = Scalar::Float64(1.0);
    assert!(!can_use_accelerated(Some("+"), &four, Values::Scalar(&k), &settings));
    assert!(can_use_accelerated(Some("+"), &five, Values::Scalar(&k), &settings));
    assert!(!can_use_accelerated(None, &five, Values::Scalar(&k), &settings));
    assert!(!can_use_accelerated(Some("+"), &five, Values::Array(&four), &settings));

    let objects = Column::from(vec![Scalar::from("a"); 5]);
    assert!(!can_use_accelerated(Some("+"), &objects, Values::Scalar(&k), &settings));
}

#[test]
fn test_mixed_frames_never_qualify() {
    let settings = EvalSettings::accelerated(0);
    let mixed = Frame::from_columns(vec![
        ("i", Column::from(vec![1i64, 2])),
        ("f", Column::from(vec![1.0, 2.0])),
    ])
    .unwrap();
    assert!(!can_use_accelerated_frame(Some("+"), &mixed, &settings));

    let uniform = Frame::from_columns(vec![
        ("a", Column::from(vec![1.0, 2.0])),
        ("b", Column::from(vec![3.0, 4.0])),
    ])
    .unwrap();
    assert!(can_use_accelerated_frame(Some("+"), &uniform, &settings));
}

#[test]
fn test_large_int_frame_comparison_matches_plain() {
    let n = 5_000;
    let cols: Vec<Column> = (0..4)
        .map(|j| Column::from((0..n).map(|i| (i * (j + 1)) % 97).collect::<Vec<i64>>()))
        .collect();
    let frame = Frame::new(cols, ["a", "b", "c", "d"].into_iter().collect(), LabelIndex::range(n as usize)).unwrap();

    let _guard = SettingsGuard::new();
    set_use_accelerated(false);
    let plain = frame.gt(50i64, &OpArgs::default()).unwrap();

    set_use_accelerated(true);
    set_min_elements(1_000);
    set_threads(3).unwrap();
    let fast = frame.gt(50i64, &OpArgs::default()).unwrap();

    for j in 0..4 {
        assert_eq!(plain.col(j), fast.col(j));
    }
}

#[test]
fn test_large_series_division_matches_plain() {
    let n = 20_001;
    let a = Series::from_values((0..n).map(|i| i % 13 - 6).collect::<Vec<i64>>());
    let b = Series::from_values((0..n).map(|i| i % 5).collect::<Vec<i64>>());

    let _guard = SettingsGuard::new();
    set_use_accelerated(false);
    let plain = (&a / &b).unwrap();
    set_use_accelerated(true);
    set_min_elements(100);
    let fast = (&a / &b).unwrap();
    assert!(same(&plain.values, &fast.values));
}
