// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A record pairs one descriptor with the values of one instance.

use crate::error::{Error, Result};
use crate::schema::descriptor::StructDescriptor;
use crate::schema::value::{FromValue, Value};
use std::sync::Arc;

/// One instance of a composite type: a shared descriptor plus a value tree.
///
/// A fresh record starts out fully default-initialized, so every declared
/// field is present and writable immediately.
#[derive(Debug, Clone)]
pub struct Record {
    descriptor: Arc<StructDescriptor>,
    value: Value,
}

impl Record {
    /// New record with every field set to its default value.
    pub fn new(descriptor: Arc<StructDescriptor>) -> Self {
        let value = Value::default_struct(&descriptor);
        Self { descriptor, value }
    }

    pub(crate) fn from_parts(descriptor: Arc<StructDescriptor>, value: Value) -> Self {
        Self { descriptor, value }
    }

    pub fn descriptor(&self) -> &Arc<StructDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    /// Typed field read.
    pub fn get<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get_value(name)?;
        T::from_value(value).ok_or_else(|| Error::TypeMismatch {
            field: name.to_string(),
            expected: "requested type".into(),
            found: value.kind_name().into(),
        })
    }

    /// Untyped field read.
    pub fn get_value(&self, name: &str) -> Result<&Value> {
        self.value
            .get_field(name)
            .ok_or_else(|| Error::MissingValue {
                field: name.to_string(),
            })
    }

    /// Set a field's value. The field must exist in the descriptor.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if self.descriptor.field(name).is_none() {
            return Err(Error::MissingValue {
                field: name.to_string(),
            });
        }
        self.value.set_field(name, value.into());
        Ok(())
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::builder::StructBuilder;
    use crate::schema::descriptor::ScalarKind;

    fn point() -> Arc<StructDescriptor> {
        StructBuilder::new("Point")
            .field("x", ScalarKind::I32)
            .field("y", ScalarKind::I32)
            .build()
            .expect("resolve")
    }

    #[test]
    fn test_new_record_is_default_initialized() {
        let rec = Record::new(point());
        assert_eq!(rec.get::<i32>("x").expect("default"), 0);
        assert_eq!(rec.get::<i32>("y").expect("default"), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut rec = Record::new(point());
        rec.set("x", 42i32).expect("known field");
        assert_eq!(rec.get::<i32>("x").expect("typed"), 42);
    }

    #[test]
    fn test_set_unknown_field_fails() {
        let mut rec = Record::new(point());
        match rec.set("z", 1i32) {
            Err(Error::MissingValue { field }) => assert_eq!(field, "z"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_into_value_keeps_set_fields() {
        let mut rec = Record::new(point());
        rec.set("x", 5i32).expect("known field");
        let value = rec.into_value();
        assert_eq!(value.get_field("x").and_then(Value::as_i32), Some(5));
        assert_eq!(value.get_field("y").and_then(Value::as_i32), Some(0));
    }

    #[test]
    fn test_get_wrong_type_fails() {
        let rec = Record::new(point());
        match rec.get::<String>("x") {
            Err(Error::TypeMismatch { field, .. }) => assert_eq!(field, "x"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
