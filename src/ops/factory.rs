// Copyright Peter Bower 2025. All Rights Reserved.
// Licensed under MIT License.

//! # **Factory Module** - *Operator Suite Synthesis and Binding*
//!
//! Builds the full operator suite of a container type from up to four
//! factories, then binds it into the type's [`MethodTable`].
//!
//! ## Suites
//! - arithmetic: `add radd sub mul truediv floordiv mod pow rmul rsub rtruediv
//!   rfloordiv rpow rmod div rdiv`
//! - comparison: `eq ne lt gt le ge`
//! - logical: `and_ or_ xor`
//!
//! [`Naming::Special`] wraps each key as an operator-overload name, e.g.
//! `__add__` or `__and__`, and adds the in-place aliases. [`Naming::Flex`]
//! keeps bare keys, defaults frame operations to the column axis and adds
//! the `multiply`, `subtract` and `divide` aliases.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::enums::error::OpsError;
use crate::enums::operand::Operand;
use crate::enums::operators::{Axis, BinaryFunc, BinaryOperator, special_name};
use crate::ops::descriptor::{OpArgs, OpDescriptor};

/// A bound operator implementation for receivers of type `T`.
pub type Method<T> = Arc<dyn Fn(&T, &Operand, &OpArgs) -> Result<T, OpsError> + Send + Sync>;

/// Builds one method from its descriptor.
pub type MethodFactory<T> = fn(OpDescriptor) -> Method<T>;

/// Boxes a closure as a [`Method`].
pub fn method<T, F>(f: F) -> Method<T>
where
    F: Fn(&T, &Operand, &OpArgs) -> Result<T, OpsError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// # MethodFactories
///
/// - `arith`: required, builds every arithmetic method.
/// - `radd`: replaces the operator behind `radd`. Defaults to reflected addition.
/// - `comp`, `boolean`: optional. Their suites are skipped when absent.
pub struct MethodFactories<T> {
    pub arith: MethodFactory<T>,
    pub radd: Option<BinaryFunc>,
    pub comp: Option<MethodFactory<T>>,
    pub boolean: Option<MethodFactory<T>>,
}

impl<T> Clone for MethodFactories<T> {
    fn clone(&self) -> Self {
        Self {
            arith: self.arith,
            radd: self.radd,
            comp: self.comp,
            boolean: self.boolean,
        }
    }
}

/// Naming convention of a generated suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Naming {
    Special,
    Flex,
}

impl Naming {
    fn name(self, key: &str) -> String {
        match self {
            Naming::Special => special_name(key),
            Naming::Flex => key.to_string(),
        }
    }

    fn default_axis(self) -> Option<Axis> {
        match self {
            Naming::Special => None,
            Naming::Flex => Some(Axis::Columns),
        }
    }
}

/// # MethodTable
///
/// The operator namespace of one container type, keyed by method name.
pub struct MethodTable<T> {
    methods: BTreeMap<String, Method<T>>,
}

impl<T> MethodTable<T> {
    pub fn new() -> Self {
        Self {
            methods: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Method<T>> {
        self.methods.get(name)
    }

    /// Method names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: impl Into<String>, method: Method<T>) {
        self.methods.insert(name.into(), method);
    }

    /// Whether two names resolve to the same implementation.
    pub fn same_method(&self, a: &str, b: &str) -> bool {
        match (self.methods.get(a), self.methods.get(b)) {
            (Some(x), Some(y)) => Arc::ptr_eq(x, y),
            _ => false,
        }
    }

    /// Invokes `name` on `receiver`.
    pub fn call(&self, name: &str, receiver: &T, other: &Operand, args: &OpArgs) -> Result<T, OpsError> {
        match self.methods.get(name) {
            Some(m) => m(receiver, other, args),
            None => Err(OpsError::NotImplemented {
                message: format!("no method '{}' for {} operands", name, other.kind_name()),
            }),
        }
    }

    fn alias(&mut self, alias: &str, target: &str) {
        if let Some(m) = self.methods.get(target).cloned() {
            self.methods.insert(alias.to_string(), m);
        }
    }
}

impl<T> Default for MethodTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for MethodTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.methods.keys()).finish()
    }
}

/// Keys of the arithmetic suite with the operator each runs.
fn arith_suite(radd: BinaryFunc) -> [(&'static str, BinaryFunc); 16] {
    use BinaryOperator::*;
    [
        ("add", BinaryFunc::new(Add)),
        ("radd", radd),
        ("sub", BinaryFunc::new(Subtract)),
        ("mul", BinaryFunc::new(Multiply)),
        ("truediv", BinaryFunc::new(TrueDivide)),
        ("floordiv", BinaryFunc::new(FloorDivide)),
        ("mod", BinaryFunc::new(Remainder)),
        ("pow", BinaryFunc::new(Power)),
        ("rmul", BinaryFunc::reflected(Multiply)),
        ("rsub", BinaryFunc::reflected(Subtract)),
        ("rtruediv", BinaryFunc::reflected(TrueDivide)),
        ("rfloordiv", BinaryFunc::reflected(FloorDivide)),
        ("rpow", BinaryFunc::reflected(Power)),
        ("rmod", BinaryFunc::reflected(Remainder)),
        ("div", BinaryFunc::new(TrueDivide)),
        ("rdiv", BinaryFunc::reflected(TrueDivide)),
    ]
}

/// Generates one suite from `factories` under `naming`.
pub fn create_methods<T>(factories: &MethodFactories<T>, naming: Naming) -> MethodTable<T> {
    let mut table = MethodTable::new();
    let mut emit = |key: &str, func: BinaryFunc, factory: MethodFactory<T>| {
        let name = naming.name(key);
        let desc = OpDescriptor::new(func, name.clone(), true).with_default_axis(naming.default_axis());
        table.insert(name, factory(desc));
    };

    let radd = factories.radd.unwrap_or(BinaryFunc::reflected(BinaryOperator::Add));
    for (key, func) in arith_suite(radd) {
        emit(key, func, factories.arith);
    }
    if let Some(comp) = factories.comp {
        for op in BinaryOperator::COMPARISON {
            emit(op.key(), BinaryFunc::new(op), comp);
        }
    }
    if let Some(boolean) = factories.boolean {
        for op in BinaryOperator::LOGICAL {
            emit(op.key(), BinaryFunc::new(op), boolean);
        }
    }
    table
}

/// # BindOptions
///
/// - `force`: overwrite names already bound.
/// - `select`: bind only these names.
/// - `exclude`: bind everything except these names.
///
/// `select` and `exclude` are mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindOptions {
    pub force: bool,
    pub select: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}

impl BindOptions {
    pub fn forced() -> Self {
        Self {
            force: true,
            ..Self::default()
        }
    }

    pub fn select<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            select: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn exclude<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            exclude: Some(names.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }
}

/// Binds `methods` into `target` under `opts`. Returns the bound names.
pub fn add_methods<T>(
    target: &mut MethodTable<T>,
    methods: MethodTable<T>,
    opts: &BindOptions,
) -> Result<Vec<String>, OpsError> {
    if opts.select.is_some() && opts.exclude.is_some() {
        return Err(OpsError::Config {
            message: "May only pass either select or exclude".to_string(),
        });
    }
    let select: Option<BTreeSet<&str>> =
        opts.select.as_ref().map(|s| s.iter().map(String::as_str).collect());
    let exclude: BTreeSet<&str> = opts
        .exclude
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();

    let mut bound = Vec::new();
    for (name, m) in methods.methods {
        if select.as_ref().is_some_and(|s| !s.contains(name.as_str())) || exclude.contains(name.as_str()) {
            continue;
        }
        if target.contains(&name) && !opts.force {
            trace!(method = %name, "already bound, skipping");
            continue;
        }
        target.insert(name.clone(), m);
        bound.push(name);
    }
    Ok(bound)
}

/// Binds the operator-overload suite plus the in-place aliases.
pub fn add_special_methods<T>(
    target: &mut MethodTable<T>,
    factories: &MethodFactories<T>,
    opts: &BindOptions,
) -> Result<Vec<String>, OpsError> {
    let mut methods = create_methods(factories, Naming::Special);
    for (alias, key) in [
        ("__iadd__", "__add__"),
        ("__isub__", "__sub__"),
        ("__imul__", "__mul__"),
        ("__itruediv__", "__truediv__"),
        ("__ipow__", "__pow__"),
    ] {
        methods.alias(alias, key);
    }
    add_methods(target, methods, opts)
}

/// Binds the flexible suite plus the `multiply`, `subtract` and `divide` aliases.
pub fn add_flex_methods<T>(
    target: &mut MethodTable<T>,
    factories: &MethodFactories<T>,
    opts: &BindOptions,
) -> Result<Vec<String>, OpsError> {
    let mut methods = create_methods(factories, Naming::Flex);
    for (alias, key) in [("multiply", "mul"), ("subtract", "sub"), ("divide", "div")] {
        methods.alias(alias, key);
    }
    add_methods(target, methods, opts)
}

/// Canonical operator key of a method name: strips underscores and the
/// reflection marker, e.g. `"__rsub__"` gives `"sub"` and `"rand_"` gives `"and_"`.
pub fn cleanup_name(name: &str) -> String {
    let mut key = name.trim_matches('_');
    if BinaryOperator::from_key(key).is_none() {
        if let Some(stripped) = key.strip_prefix('r') {
            key = stripped;
        }
    }
    match key {
        "and" | "or" => format!("{}_", key),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag(String);

    fn echo(desc: OpDescriptor) -> Method<Tag> {
        method(move |_: &Tag, _: &Operand, _: &OpArgs| Ok(Tag(desc.name.clone())))
    }

    fn echo_axis(desc: OpDescriptor) -> Method<Tag> {
        method(move |_: &Tag, _: &Operand, _: &OpArgs| Ok(Tag(format!("{:?}", desc.default_axis))))
    }

    fn factories(comp: bool, boolean: bool) -> MethodFactories<Tag> {
        MethodFactories {
            arith: echo,
            radd: None,
            comp: comp.then_some(echo as MethodFactory<Tag>),
            boolean: boolean.then_some(echo as MethodFactory<Tag>),
        }
    }

    #[test]
    fn test_suite_keys() {
        let flex = create_methods(&factories(true, true), Naming::Flex);
        let names: Vec<&str> = flex.names().collect();
        for key in [
            "add", "radd", "sub", "mul", "truediv", "floordiv", "mod", "pow", "rmul", "rsub",
            "rtruediv", "rfloordiv", "rpow", "rmod", "div", "rdiv", "eq", "ne", "lt", "gt", "le",
            "ge", "and_", "or_", "xor",
        ] {
            assert!(names.contains(&key), "{key}");
        }
        assert_eq!(flex.len(), 25);

        let arith_only = create_methods(&factories(false, false), Naming::Special);
        assert_eq!(arith_only.len(), 16);
        assert!(arith_only.contains("__rfloordiv__"));
        assert!(!arith_only.contains("__eq__"));
    }

    #[test]
    fn test_special_aliases_share_implementation() {
        let mut t = MethodTable::new();
        add_special_methods(&mut t, &factories(true, true), &BindOptions::default()).unwrap();
        assert!(t.contains("__and__"));
        assert!(t.same_method("__iadd__", "__add__"));
        assert!(t.same_method("__ipow__", "__pow__"));
        assert!(!t.same_method("__iadd__", "__radd__"));
        let out = t.call("__itruediv__", &Tag(String::new()), &Operand::from(1i64), &OpArgs::new()).unwrap();
        assert_eq!(out, Tag("__truediv__".into()));
    }

    #[test]
    fn test_flex_aliases_and_default_axis() {
        let mut t = MethodTable::new();
        let f = MethodFactories {
            arith: echo_axis,
            radd: None,
            comp: None,
            boolean: None,
        };
        add_flex_methods(&mut t, &f, &BindOptions::default()).unwrap();
        assert!(t.same_method("multiply", "mul"));
        assert!(t.same_method("subtract", "sub"));
        assert!(t.same_method("divide", "div"));
        let out = t.call("add", &Tag(String::new()), &Operand::from(1i64), &OpArgs::new()).unwrap();
        assert_eq!(out, Tag("Some(Columns)".into()));

        let mut s = MethodTable::new();
        add_special_methods(&mut s, &f, &BindOptions::default()).unwrap();
        let out = s.call("__add__", &Tag(String::new()), &Operand::from(1i64), &OpArgs::new()).unwrap();
        assert_eq!(out, Tag("None".into()));
    }

    #[test]
    fn test_binding_rules() {
        let mut t: MethodTable<Tag> = MethodTable::new();
        let custom = method(|_: &Tag, _: &Operand, _: &OpArgs| Ok(Tag("custom".into())));
        t.insert("add", custom);
        let f = factories(false, false);

        add_flex_methods(&mut t, &f, &BindOptions::default()).unwrap();
        let p = Tag(String::new());
        let one = Operand::from(1i64);
        assert_eq!(t.call("add", &p, &one, &OpArgs::new()).unwrap(), Tag("custom".into()));

        add_flex_methods(&mut t, &f, &BindOptions::forced()).unwrap();
        assert_eq!(t.call("add", &p, &one, &OpArgs::new()).unwrap(), Tag("add".into()));

        let mut sel = MethodTable::new();
        let bound = add_flex_methods(&mut sel, &f, &BindOptions::select(["sub", "pow"])).unwrap();
        assert_eq!(bound, vec!["pow".to_string(), "sub".to_string()]);
        assert_eq!(sel.len(), 2);

        let mut exc = MethodTable::new();
        add_flex_methods(&mut exc, &f, &BindOptions::exclude(["sub"])).unwrap();
        assert!(!exc.contains("sub"));
        assert!(exc.contains("subtract"));

        let both = BindOptions {
            select: Some(vec!["add".into()]),
            exclude: Some(vec!["sub".into()]),
            ..BindOptions::default()
        };
        let err = add_flex_methods(&mut MethodTable::new(), &f, &both).unwrap_err();
        assert!(matches!(err, OpsError::Config { .. }));
    }

    #[test]
    fn test_radd_override() {
        let f = MethodFactories {
            arith: echo,
            radd: Some(BinaryFunc::new(BinaryOperator::Add)),
            comp: None,
            boolean: None,
        };
        let t = create_methods(&f, Naming::Flex);
        assert!(t.contains("radd"));
    }

    #[test]
    fn test_cleanup_name() {
        assert_eq!(cleanup_name("__rsub__"), "sub");
        assert_eq!(cleanup_name("rand_"), "and_");
        assert_eq!(cleanup_name("__and__"), "and_");
        assert_eq!(cleanup_name("__or_"), "or_");
        assert_eq!(cleanup_name("truediv"), "truediv");
        assert_eq!(cleanup_name("__rpow__"), "pow");
    }

    #[test]
    fn test_missing_method_declines() {
        let t: MethodTable<Tag> = MethodTable::new();
        let err = t.call("__add__", &Tag(String::new()), &Operand::from(1i64), &OpArgs::new()).unwrap_err();
        assert!(err.is_not_implemented());
    }
}
