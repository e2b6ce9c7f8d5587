// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Type descriptors, dynamic values, and records.

mod builder;
mod descriptor;
mod record;
mod value;

pub use builder::StructBuilder;
pub use descriptor::{
    ElemKind, FieldDescriptor, FieldKind, Layout, LenPolicy, ScalarKind, StructDescriptor,
};
pub use record::Record;
pub use value::{FromValue, Value};
