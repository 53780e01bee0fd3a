//! Copyright © 2025 Peter Garfield Bower. All rights reserved.
//!
//! # **Minframe** - *Label-Aligned Binary Operators*
//!
//! Binary operators for labeled 1-D (`Series`), 2-D (`Frame`) and 3-D
//! (`Panel`) containers:
//! - operands are aligned on their labels by outer join before computing,
//! - missing values propagate, with a masked element-wise fallback for
//!   mixed element types,
//! - datetime and time-delta columns go through a temporal coercion engine,
//! - large homogeneous inputs take an accelerated chunked path that returns
//!   exactly what the plain path returns.
//!
//! Process-wide acceleration settings live in [`kernels::settings`].

pub mod enums {
    pub mod dtype;
    pub mod error;
    pub mod operand;
    pub mod operators;
    pub mod scalar;
    pub mod time_units;
}

pub mod structs {
    pub mod bitmask;
    pub mod column;
    pub mod frame;
    pub mod index;
    pub mod ndarray;
    pub mod panel;
    pub mod series;
}

pub mod kernels {
    pub mod accelerated;
    pub mod broadcast;
    pub mod elementwise;
    pub mod evaluate;
    pub mod na_ops;
    pub mod settings;
    pub mod temporal;
}

pub mod ops {
    pub mod descriptor;
    pub mod factory;
    pub mod registry;
}

pub use enums::dtype::DType;
pub use enums::error::OpsError;
pub use enums::operand::Operand;
pub use enums::operators::{Axis, BinaryFunc, BinaryOperator, OpKind};
pub use enums::scalar::{NAT, Scalar};
pub use enums::time_units::{DateOffset, TimeUnit};

pub use structs::bitmask::Bitmask;
pub use structs::column::Column;
pub use structs::frame::Frame;
pub use structs::index::{JoinResult, Label, LabelIndex};
pub use structs::ndarray::NdArray;
pub use structs::panel::Panel;
pub use structs::series::Series;

pub use kernels::evaluate::{can_use_accelerated, can_use_accelerated_frame, evaluate, where_values};
pub use kernels::settings::{EvalSettings, SettingsGuard};

pub use ops::descriptor::{OpArgs, OpDescriptor};
pub use ops::factory::{
    BindOptions, Method, MethodFactories, MethodFactory, MethodTable, Naming, add_flex_methods,
    add_methods, add_special_methods, cleanup_name, create_methods, method,
};
pub use ops::registry::{BinaryOps, dispatch};
