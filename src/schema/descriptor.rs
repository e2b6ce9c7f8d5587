// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved field descriptors for composite types.
//!
//! A [`StructDescriptor`] is built once per type shape (see
//! [`StructBuilder`](crate::schema::StructBuilder)), is immutable afterwards,
//! and is shared behind an [`Arc`]. Building is a pure function of the
//! declared shape: re-running it yields an identical descriptor with no side
//! effects, so descriptors are safe to cache and share across threads.

use crate::encoding::TextEncoding;
use crate::endian::BoolWidth;
use crate::error::{Error, Result};
use crate::schema::value::Value;
use crate::traits::CustomCodec;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Leaf scalar categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Bool,
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Decimal,
    Char,
}

impl ScalarKind {
    /// Fixed byte width, or `None` when the width comes from context state
    /// (`Bool` from the boolean width, `Char` from the encoding).
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::U8 | Self::I8 => Some(1),
            Self::U16 | Self::I16 => Some(2),
            Self::U32 | Self::I32 | Self::F32 => Some(4),
            Self::U64 | Self::I64 | Self::F64 => Some(8),
            Self::Decimal => Some(16),
            Self::Bool | Self::Char => None,
        }
    }

    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
        )
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Char => "char",
        }
    }
}

/// Element/character count policy for variable-size fields.
///
/// Exactly one policy applies per field; declaring both a fixed constant and
/// an anchor is a configuration error caught at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LenPolicy {
    /// Compile-time constant count.
    Fixed(usize),
    /// Count taken from the named sibling field's current value at the
    /// moment the dependent field is processed.
    Anchor(String),
    /// Strings only: content ends at a zero-valued terminator character.
    NullTerminated,
}

impl LenPolicy {
    /// Resolve the count against the sibling values available so far.
    pub(crate) fn resolve(
        &self,
        field: &str,
        siblings: &HashMap<String, Value>,
    ) -> Result<usize> {
        match self {
            Self::Fixed(n) => Ok(*n),
            Self::Anchor(anchor) => {
                let value = siblings.get(anchor).ok_or_else(|| Error::MissingAnchor {
                    field: field.to_string(),
                    anchor: anchor.clone(),
                })?;
                let count = value.as_count().ok_or_else(|| Error::TypeMismatch {
                    field: field.to_string(),
                    expected: "integer anchor value".into(),
                    found: value.kind_name().into(),
                })?;
                usize::try_from(count).map_err(|_| Error::InvalidLength {
                    field: field.to_string(),
                    reason: format!("anchor '{}' holds negative count {}", anchor, count),
                })
            }
            Self::NullTerminated => Err(Error::InvalidLength {
                field: field.to_string(),
                reason: "null-terminated policy carries no count".into(),
            }),
        }
    }
}

/// Element category for array fields.
#[derive(Debug, Clone)]
pub enum ElemKind {
    Scalar(ScalarKind),
    /// Enum element with its underlying integer kind.
    Enum(ScalarKind),
    /// String element with its per-element length policy.
    String(LenPolicy),
    Struct(Arc<StructDescriptor>),
}

/// Resolved type category of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Scalar(ScalarKind),
    /// Enum resolved to its underlying integer kind.
    Enum(ScalarKind),
    String(LenPolicy),
    Array(ElemKind, LenPolicy),
    Struct(Arc<StructDescriptor>),
}

impl FieldKind {
    pub(crate) fn name(&self) -> String {
        match self {
            Self::Scalar(k) => k.name().to_string(),
            Self::Enum(k) => format!("enum({})", k.name()),
            Self::String(_) => "string".to_string(),
            Self::Array(_, _) => "array".to_string(),
            Self::Struct(d) => format!("struct {}", d.name()),
        }
    }
}

/// Field placement mode of a composite type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Fields are laid out back to back in declaration order.
    Sequential,
    /// Every field declares a byte offset from the composite's start and the
    /// dispatcher seeks there before each field. Offsets are taken as given:
    /// overlapping or gapped regions are legal, and the composite's extent is
    /// the maximum `offset + width` among its fields, not the sum.
    Explicit,
}

/// One resolved field of a composite type.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// Static per-field encoding override; unset fields pick up the context
    /// default current at the time of use.
    pub encoding: Option<TextEncoding>,
    /// Static per-field boolean width override.
    pub bool_width: Option<BoolWidth>,
    /// Excluded entirely from both read and write.
    pub ignore: bool,
    /// Byte offset from the composite's start (explicit layout only).
    pub offset: Option<u64>,
}

/// Immutable descriptor list for one composite type shape.
pub struct StructDescriptor {
    name: String,
    layout: Layout,
    fields: Vec<FieldDescriptor>,
    custom: Option<Arc<dyn CustomCodec>>,
}

impl StructDescriptor {
    pub(crate) fn from_parts(
        name: String,
        layout: Layout,
        fields: Vec<FieldDescriptor>,
        custom: Option<Arc<dyn CustomCodec>>,
    ) -> Self {
        Self {
            name,
            layout,
            fields,
            custom,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Get field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Get field index by name.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// The self-describing escape hatch, if the type supplies one.
    pub fn custom_codec(&self) -> Option<&Arc<dyn CustomCodec>> {
        self.custom.as_ref()
    }
}

impl fmt::Debug for StructDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructDescriptor")
            .field("name", &self.name)
            .field("layout", &self.layout)
            .field("fields", &self.fields)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_widths() {
        assert_eq!(ScalarKind::U8.fixed_width(), Some(1));
        assert_eq!(ScalarKind::I16.fixed_width(), Some(2));
        assert_eq!(ScalarKind::F32.fixed_width(), Some(4));
        assert_eq!(ScalarKind::U64.fixed_width(), Some(8));
        assert_eq!(ScalarKind::Decimal.fixed_width(), Some(16));
        assert_eq!(ScalarKind::Bool.fixed_width(), None);
        assert_eq!(ScalarKind::Char.fixed_width(), None);
    }

    #[test]
    fn test_integer_kinds() {
        assert!(ScalarKind::U32.is_integer());
        assert!(ScalarKind::I8.is_integer());
        assert!(!ScalarKind::F64.is_integer());
        assert!(!ScalarKind::Bool.is_integer());
        assert!(!ScalarKind::Char.is_integer());
    }

    #[test]
    fn test_len_policy_fixed() {
        let siblings = HashMap::new();
        assert_eq!(
            LenPolicy::Fixed(7).resolve("f", &siblings).expect("fixed"),
            7
        );
    }

    #[test]
    fn test_len_policy_anchor_resolves_current_value() {
        let mut siblings = HashMap::new();
        siblings.insert("count".to_string(), Value::U32(5));
        let policy = LenPolicy::Anchor("count".into());
        assert_eq!(policy.resolve("items", &siblings).expect("anchor"), 5);
    }

    #[test]
    fn test_len_policy_missing_anchor() {
        let siblings = HashMap::new();
        let policy = LenPolicy::Anchor("count".into());
        match policy.resolve("items", &siblings) {
            Err(Error::MissingAnchor { field, anchor }) => {
                assert_eq!(field, "items");
                assert_eq!(anchor, "count");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_len_policy_negative_anchor() {
        let mut siblings = HashMap::new();
        siblings.insert("count".to_string(), Value::I32(-1));
        let policy = LenPolicy::Anchor("count".into());
        match policy.resolve("items", &siblings) {
            Err(Error::InvalidLength { field, .. }) => assert_eq!(field, "items"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_len_policy_non_integer_anchor() {
        let mut siblings = HashMap::new();
        siblings.insert("count".to_string(), Value::F32(2.0));
        let policy = LenPolicy::Anchor("count".into());
        match policy.resolve("items", &siblings) {
            Err(Error::TypeMismatch { field, .. }) => assert_eq!(field, "items"),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
