//! Binding operator suites onto a downstream container type through the
//! public factory API, and the shape of the built-in tables.

use minframe::{
    BinaryOps, BindOptions, Column, Frame, Method, MethodFactories, MethodTable, Naming, OpArgs,
    OpDescriptor, Operand, OpsError, Panel, Scalar, Series, add_flex_methods, add_special_methods,
    create_methods, method,
};

/// A series wrapper that forwards every operator to the series suite.
#[derive(Debug, Clone)]
struct Reading(Series);

fn forward(desc: OpDescriptor) -> Method<Reading> {
    method(move |r: &Reading, other: &Operand, args: &OpArgs| {
        r.0.binary(&desc.name, other, args).map(Reading)
    })
}

fn reading_table() -> Result<MethodTable<Reading>, OpsError> {
    let factories = MethodFactories {
        arith: forward,
        radd: None,
        comp: Some(forward),
        boolean: None,
    };
    let mut table = MethodTable::new();
    add_special_methods(&mut table, &factories, &BindOptions::default())?;
    add_flex_methods(&mut table, &factories, &BindOptions::exclude(["pow", "rpow"]))?;
    Ok(table)
}

#[test]
fn test_downstream_type_binds_and_forwards() {
    let table = reading_table().unwrap();
    assert!(table.contains("__radd__") && table.contains("divide"));
    assert!(!table.contains("pow"));
    assert!(!table.contains("__and__"));

    let r = Reading(Series::from_values(vec![1.0, 2.0]));
    let out = table.call("rsub", &r, &10.0.into(), &OpArgs::default()).unwrap();
    assert_eq!(out.0.values.as_ref(), &Column::from(vec![9.0, 8.0]));

    let out = table.call("__iadd__", &r, &1.0.into(), &OpArgs::default()).unwrap();
    assert_eq!(out.0.get(1), Scalar::Float64(3.0));

    let err = table.call("pow", &r, &2.0.into(), &OpArgs::default()).unwrap_err();
    assert!(err.is_not_implemented());
}

#[test]
fn test_rebinding_keeps_existing_methods_unless_forced() {
    let mut table = reading_table().unwrap();
    let factories = MethodFactories {
        arith: forward,
        radd: None,
        comp: None,
        boolean: None,
    };
    let bound = add_flex_methods(&mut table, &factories, &BindOptions::default()).unwrap();
    assert_eq!(bound, vec!["pow".to_string(), "rpow".to_string()]);

    let bound = add_flex_methods(&mut table, &factories, &BindOptions::forced()).unwrap();
    assert_eq!(bound.len(), create_methods(&factories, Naming::Flex).len() + 3);
}

#[test]
fn test_builtin_tables() {
    let series = Series::methods().unwrap();
    let frame = Frame::methods().unwrap();
    let panel = Panel::methods().unwrap();

    for name in ["__add__", "__rtruediv__", "__ifloordiv__", "__xor__", "__ge__"] {
        let expected = name != "__ifloordiv__";
        assert_eq!(series.contains(name), expected, "{name}");
        assert_eq!(frame.contains(name), expected, "{name}");
        assert_eq!(panel.contains(name), expected, "{name}");
    }
    assert!(series.same_method("__imul__", "__mul__"));
    assert!(frame.same_method("divide", "div"));
    assert!(!series.contains("and_") && !frame.contains("xor"));
    assert!(panel.names().all(|n| n.starts_with("__")));
}
