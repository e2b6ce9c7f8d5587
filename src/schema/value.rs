// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dynamic values carried through the dispatcher.

use crate::decimal::Decimal128;
use crate::schema::descriptor::{FieldKind, ScalarKind, StructDescriptor};
use std::collections::HashMap;

/// A dynamic value matching one field's resolved type category.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal128),
    Char(char),
    Str(String),
    /// Enum value widened to i64; the underlying width lives in the
    /// descriptor.
    Enum(i64),
    Struct(HashMap<String, Value>),
    Array(Vec<Value>),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Self::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i8(&self) -> Option<i8> {
        match self {
            Self::I8(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i16(&self) -> Option<i16> {
        match self {
            Self::I16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::F32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal128> {
        match self {
            Self::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<i64> {
        match self {
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Coerce to an element count for anchor resolution: any integer or
    /// enum value widens to i64.
    pub fn as_count(&self) -> Option<i64> {
        match self {
            Self::U8(v) => Some(i64::from(*v)),
            Self::U16(v) => Some(i64::from(*v)),
            Self::U32(v) => Some(i64::from(*v)),
            Self::U64(v) => i64::try_from(*v).ok(),
            Self::I8(v) => Some(i64::from(*v)),
            Self::I16(v) => Some(i64::from(*v)),
            Self::I32(v) => Some(i64::from(*v)),
            Self::I64(v) => Some(*v),
            Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    /// Struct field lookup.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Struct(fields) => fields.get(name),
            _ => None,
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut Value> {
        match self {
            Self::Struct(fields) => fields.get_mut(name),
            _ => None,
        }
    }

    /// Insert a struct field; returns false for non-struct values.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self {
            Self::Struct(fields) => {
                fields.insert(name.into(), value);
                true
            }
            _ => false,
        }
    }

    pub(crate) fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "decimal",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Enum(_) => "enum",
            Self::Struct(_) => "struct",
            Self::Array(_) => "array",
        }
    }

    /// Zero/empty value for a scalar category.
    pub(crate) fn default_scalar(kind: ScalarKind) -> Value {
        match kind {
            ScalarKind::Bool => Self::Bool(false),
            ScalarKind::U8 => Self::U8(0),
            ScalarKind::U16 => Self::U16(0),
            ScalarKind::U32 => Self::U32(0),
            ScalarKind::U64 => Self::U64(0),
            ScalarKind::I8 => Self::I8(0),
            ScalarKind::I16 => Self::I16(0),
            ScalarKind::I32 => Self::I32(0),
            ScalarKind::I64 => Self::I64(0),
            ScalarKind::F32 => Self::F32(0.0),
            ScalarKind::F64 => Self::F64(0.0),
            ScalarKind::Decimal => Self::Decimal(Decimal128::default()),
            ScalarKind::Char => Self::Char('\0'),
        }
    }

    /// Default value for a field category; nested structs default all of
    /// their own declared fields recursively.
    pub(crate) fn default_for(kind: &FieldKind) -> Value {
        match kind {
            FieldKind::Scalar(k) => Self::default_scalar(*k),
            FieldKind::Enum(_) => Self::Enum(0),
            FieldKind::String(_) => Self::Str(String::new()),
            FieldKind::Array(_, _) => Self::Array(Vec::new()),
            FieldKind::Struct(desc) => Self::default_struct(desc),
        }
    }

    pub(crate) fn default_struct(desc: &StructDescriptor) -> Value {
        let mut map = HashMap::new();
        for field in desc.fields() {
            map.insert(field.name.clone(), Self::default_for(&field.kind));
        }
        Self::Struct(map)
    }
}

macro_rules! impl_from_value {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_value!(bool, Bool);
impl_from_value!(u8, U8);
impl_from_value!(u16, U16);
impl_from_value!(u32, U32);
impl_from_value!(u64, U64);
impl_from_value!(i8, I8);
impl_from_value!(i16, I16);
impl_from_value!(i32, I32);
impl_from_value!(i64, I64);
impl_from_value!(f32, F32);
impl_from_value!(f64, F64);
impl_from_value!(Decimal128, Decimal);
impl_from_value!(char, Char);
impl_from_value!(String, Str);

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Into::into).collect())
    }
}

/// Extraction from a [`Value`] for typed record access.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value_trait {
    ($ty:ty, $getter:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                value.$getter()
            }
        }
    };
}

impl_from_value_trait!(bool, as_bool);
impl_from_value_trait!(u8, as_u8);
impl_from_value_trait!(u16, as_u16);
impl_from_value_trait!(u32, as_u32);
impl_from_value_trait!(u64, as_u64);
impl_from_value_trait!(i8, as_i8);
impl_from_value_trait!(i16, as_i16);
impl_from_value_trait!(i32, as_i32);
impl_from_value_trait!(i64, as_i64);
impl_from_value_trait!(f32, as_f32);
impl_from_value_trait!(f64, as_f64);
impl_from_value_trait!(Decimal128, as_decimal);
impl_from_value_trait!(char, as_char);

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(ToString::to_string)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_value).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors_reject_wrong_variant() {
        let v = Value::from(42u32);
        assert_eq!(v.as_u32(), Some(42));
        assert_eq!(v.as_i32(), None);
        assert_eq!(v.as_str(), None);
    }

    #[test]
    fn test_count_coercion() {
        assert_eq!(Value::U8(5).as_count(), Some(5));
        assert_eq!(Value::I64(-3).as_count(), Some(-3));
        assert_eq!(Value::Enum(7).as_count(), Some(7));
        assert_eq!(Value::U64(u64::MAX).as_count(), None);
        assert_eq!(Value::F32(1.0).as_count(), None);
        assert_eq!(Value::Str("5".into()).as_count(), None);
    }

    #[test]
    fn test_struct_field_access() {
        let mut v = Value::Struct(HashMap::new());
        assert!(v.set_field("x", Value::I32(10)));
        assert_eq!(v.get_field("x").and_then(Value::as_i32), Some(10));
        assert!(v.get_field("y").is_none());
        assert!(!Value::I32(0).set_field("x", Value::I32(1)));
    }

    #[test]
    fn test_vec_conversion() {
        let v = Value::from(vec![1u32, 2, 3]);
        assert_eq!(v.as_array().map(<[Value]>::len), Some(3));
        let back: Vec<u32> = Vec::from_value(&v).expect("typed array");
        assert_eq!(back, vec![1, 2, 3]);
    }

    #[test]
    fn test_default_scalar_values() {
        assert_eq!(Value::default_scalar(ScalarKind::U32), Value::U32(0));
        assert_eq!(Value::default_scalar(ScalarKind::Char), Value::Char('\0'));
        assert_eq!(Value::default_scalar(ScalarKind::Bool), Value::Bool(false));
    }
}
