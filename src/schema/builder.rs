// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fluent builder for [`StructDescriptor`].
//!
//! Fields are declared in serialization order; configuration methods
//! (`fixed_len`, `len_from`, `encoding`, ...) apply to the most recently
//! declared field, mirroring per-field annotations. `build()` performs field
//! descriptor resolution and reports configuration errors naming the
//! offending field.

use crate::encoding::TextEncoding;
use crate::endian::BoolWidth;
use crate::error::{Error, Result};
use crate::schema::descriptor::{
    ElemKind, FieldDescriptor, FieldKind, Layout, LenPolicy, ScalarKind, StructDescriptor,
};
use crate::traits::CustomCodec;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum FieldDecl {
    Scalar(ScalarKind),
    Enum(ScalarKind),
    String,
    Array(ElemDecl),
    Struct(Arc<StructDescriptor>),
}

#[derive(Debug, Clone)]
enum ElemDecl {
    Scalar(ScalarKind),
    Enum(ScalarKind),
    String,
    Struct(Arc<StructDescriptor>),
}

#[derive(Debug, Clone)]
struct PendingField {
    name: String,
    decl: FieldDecl,
    fixed_len: Option<usize>,
    anchor: Option<String>,
    null_terminated: bool,
    /// Per-element fixed char count for string arrays.
    elem_chars: Option<usize>,
    encoding: Option<TextEncoding>,
    bool_width: Option<BoolWidth>,
    ignore: bool,
    offset: Option<u64>,
}

impl PendingField {
    fn new(name: String, decl: FieldDecl) -> Self {
        Self {
            name,
            decl,
            fixed_len: None,
            anchor: None,
            null_terminated: false,
            elem_chars: None,
            encoding: None,
            bool_width: None,
            ignore: false,
            offset: None,
        }
    }
}

/// Builder for composite type descriptors.
pub struct StructBuilder {
    name: String,
    layout: Layout,
    fields: Vec<PendingField>,
    custom: Option<Arc<dyn CustomCodec>>,
}

impl StructBuilder {
    /// Start a sequential-layout struct.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layout: Layout::Sequential,
            fields: Vec::new(),
            custom: None,
        }
    }

    /// Switch to explicit layout: every field must then declare a byte
    /// offset via [`at_offset`](Self::at_offset).
    pub fn explicit_layout(mut self) -> Self {
        self.layout = Layout::Explicit;
        self
    }

    /// Attach a self-describing codec invoked instead of the generic field
    /// walk for both read and write.
    pub fn with_custom_codec(mut self, codec: Arc<dyn CustomCodec>) -> Self {
        self.custom = Some(codec);
        self
    }

    /// Declare a scalar field.
    pub fn field(mut self, name: impl Into<String>, kind: ScalarKind) -> Self {
        self.fields
            .push(PendingField::new(name.into(), FieldDecl::Scalar(kind)));
        self
    }

    /// Declare an enum field with its underlying integer kind.
    pub fn enum_field(mut self, name: impl Into<String>, underlying: ScalarKind) -> Self {
        self.fields
            .push(PendingField::new(name.into(), FieldDecl::Enum(underlying)));
        self
    }

    /// Declare a string field (null-terminated unless a length is set).
    pub fn string_field(mut self, name: impl Into<String>) -> Self {
        self.fields
            .push(PendingField::new(name.into(), FieldDecl::String));
        self
    }

    /// Declare an array of scalars; a length policy is required.
    pub fn array_field(mut self, name: impl Into<String>, elem: ScalarKind) -> Self {
        self.fields.push(PendingField::new(
            name.into(),
            FieldDecl::Array(ElemDecl::Scalar(elem)),
        ));
        self
    }

    /// Declare an array of enums over the given underlying integer kind.
    pub fn enum_array_field(mut self, name: impl Into<String>, underlying: ScalarKind) -> Self {
        self.fields.push(PendingField::new(
            name.into(),
            FieldDecl::Array(ElemDecl::Enum(underlying)),
        ));
        self
    }

    /// Declare an array of strings. Elements are null-terminated unless
    /// [`elem_chars`](Self::elem_chars) sets a per-element char count.
    pub fn string_array_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(PendingField::new(
            name.into(),
            FieldDecl::Array(ElemDecl::String),
        ));
        self
    }

    /// Declare a nested composite field.
    pub fn struct_field(mut self, name: impl Into<String>, nested: Arc<StructDescriptor>) -> Self {
        self.fields
            .push(PendingField::new(name.into(), FieldDecl::Struct(nested)));
        self
    }

    /// Declare an array of nested composites; a length policy is required.
    pub fn struct_array_field(
        mut self,
        name: impl Into<String>,
        nested: Arc<StructDescriptor>,
    ) -> Self {
        self.fields.push(PendingField::new(
            name.into(),
            FieldDecl::Array(ElemDecl::Struct(nested)),
        ));
        self
    }

    fn last_field(&mut self) -> &mut PendingField {
        self.fields
            .last_mut()
            .expect("field configuration called before any field was declared")
    }

    /// Constant element/char count for the last declared field.
    pub fn fixed_len(mut self, count: usize) -> Self {
        self.last_field().fixed_len = Some(count);
        self
    }

    /// Take the last declared field's count from the named sibling field's
    /// value at call time.
    pub fn len_from(mut self, anchor: impl Into<String>) -> Self {
        self.last_field().anchor = Some(anchor.into());
        self
    }

    /// Mark the last declared string field as null-terminated (the default
    /// for strings with no length configuration).
    pub fn null_terminated(mut self) -> Self {
        self.last_field().null_terminated = true;
        self
    }

    /// Per-element fixed char count for a string array.
    pub fn elem_chars(mut self, count: usize) -> Self {
        self.last_field().elem_chars = Some(count);
        self
    }

    /// Text encoding override for the last declared field.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.last_field().encoding = Some(encoding);
        self
    }

    /// Boolean width override for the last declared field.
    pub fn bool_width(mut self, width: BoolWidth) -> Self {
        self.last_field().bool_width = Some(width);
        self
    }

    /// Exclude the last declared field from both read and write.
    pub fn ignore(mut self) -> Self {
        self.last_field().ignore = true;
        self
    }

    /// Byte offset from the composite's start (explicit layout only).
    pub fn at_offset(mut self, offset: u64) -> Self {
        self.last_field().offset = Some(offset);
        self
    }

    /// Resolve the declared fields into an immutable descriptor.
    pub fn build(self) -> Result<Arc<StructDescriptor>> {
        let mut resolved: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len());

        for (index, pending) in self.fields.iter().enumerate() {
            let kind = Self::resolve_kind(pending)?;
            Self::check_offset(self.layout, pending)?;
            Self::check_anchor(&self.fields, index, &kind)?;
            resolved.push(FieldDescriptor {
                name: pending.name.clone(),
                kind,
                encoding: pending.encoding,
                bool_width: pending.bool_width,
                ignore: pending.ignore,
                offset: pending.offset,
            });
        }

        log::debug!(
            "resolved descriptor '{}': {} fields, {:?} layout",
            self.name,
            resolved.len(),
            self.layout
        );
        Ok(Arc::new(StructDescriptor::from_parts(
            self.name,
            self.layout,
            resolved,
            self.custom,
        )))
    }

    fn resolve_kind(pending: &PendingField) -> Result<FieldKind> {
        if pending.fixed_len.is_some() && pending.anchor.is_some() {
            return Err(Error::ConflictingLengthConfig {
                field: pending.name.clone(),
            });
        }

        match &pending.decl {
            FieldDecl::Scalar(kind) => Ok(FieldKind::Scalar(*kind)),
            FieldDecl::Enum(underlying) => {
                Self::check_enum_underlying(&pending.name, *underlying)?;
                Ok(FieldKind::Enum(*underlying))
            }
            FieldDecl::String => Ok(FieldKind::String(Self::string_policy(pending))),
            FieldDecl::Struct(nested) => Ok(FieldKind::Struct(nested.clone())),
            FieldDecl::Array(elem) => {
                let count = Self::array_count_policy(pending)?;
                let elem_kind = match elem {
                    ElemDecl::Scalar(kind) => ElemKind::Scalar(*kind),
                    ElemDecl::Enum(underlying) => {
                        Self::check_enum_underlying(&pending.name, *underlying)?;
                        ElemKind::Enum(*underlying)
                    }
                    ElemDecl::String => ElemKind::String(match pending.elem_chars {
                        Some(chars) => LenPolicy::Fixed(chars),
                        None => LenPolicy::NullTerminated,
                    }),
                    ElemDecl::Struct(nested) => ElemKind::Struct(nested.clone()),
                };
                Ok(FieldKind::Array(elem_kind, count))
            }
        }
    }

    /// Fixed wins if present, else anchor, else null-terminated.
    fn string_policy(pending: &PendingField) -> LenPolicy {
        if let Some(n) = pending.fixed_len {
            LenPolicy::Fixed(n)
        } else if let Some(anchor) = &pending.anchor {
            LenPolicy::Anchor(anchor.clone())
        } else {
            LenPolicy::NullTerminated
        }
    }

    /// Arrays have no default length: absence of any policy is ambiguous.
    fn array_count_policy(pending: &PendingField) -> Result<LenPolicy> {
        if let Some(n) = pending.fixed_len {
            Ok(LenPolicy::Fixed(n))
        } else if let Some(anchor) = &pending.anchor {
            Ok(LenPolicy::Anchor(anchor.clone()))
        } else {
            Err(Error::InvalidLength {
                field: pending.name.clone(),
                reason: "array field declares no length policy".into(),
            })
        }
    }

    fn check_enum_underlying(field: &str, underlying: ScalarKind) -> Result<()> {
        if underlying.is_integer() {
            Ok(())
        } else {
            Err(Error::UnsupportedType {
                field: field.to_string(),
                detail: format!("enum underlying kind {} is not an integer", underlying.name()),
            })
        }
    }

    fn check_offset(layout: Layout, pending: &PendingField) -> Result<()> {
        match layout {
            Layout::Explicit => {
                if pending.offset.is_none() && !pending.ignore {
                    return Err(Error::MissingOffset {
                        field: pending.name.clone(),
                    });
                }
            }
            Layout::Sequential => {
                if pending.offset.is_some() {
                    return Err(Error::UnexpectedOffset {
                        field: pending.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Anchors must name an existing, non-ignored, integer-kinded sibling
    /// declared before their dependent.
    fn check_anchor(fields: &[PendingField], index: usize, kind: &FieldKind) -> Result<()> {
        let anchor_name = match kind {
            FieldKind::String(LenPolicy::Anchor(a)) | FieldKind::Array(_, LenPolicy::Anchor(a)) => a,
            _ => return Ok(()),
        };
        let dependent = &fields[index].name;

        let target_index = fields.iter().position(|f| &f.name == anchor_name);
        let Some(target_index) = target_index else {
            return Err(Error::MissingAnchor {
                field: dependent.clone(),
                anchor: anchor_name.clone(),
            });
        };
        let target = &fields[target_index];
        if target.ignore {
            return Err(Error::MissingAnchor {
                field: dependent.clone(),
                anchor: anchor_name.clone(),
            });
        }
        if target_index >= index {
            return Err(Error::AnchorOrdering {
                field: dependent.clone(),
                anchor: anchor_name.clone(),
            });
        }
        let integer = match &target.decl {
            FieldDecl::Scalar(k) => k.is_integer(),
            FieldDecl::Enum(_) => true,
            _ => false,
        };
        if !integer {
            return Err(Error::TypeMismatch {
                field: dependent.clone(),
                expected: "integer anchor field".into(),
                found: format!("'{}' is not integer-kinded", anchor_name),
            });
        }
        Ok(())
    }
}
