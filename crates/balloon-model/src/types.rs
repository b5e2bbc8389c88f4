//! Type descriptors and type references.
//!
//! A [`TypeDescriptor`] is one named entry of the type registry. Its
//! [`TypeKind`] carries only the data that kind needs: primitives (and
//! aliases of them) name a base type, enums add ordered variants, structs
//! own ordered fields, and unit-tagged types name a unit and the variant's
//! base type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Built-in primitive names with their wire size in bytes.
///
/// `None` marks variable-length primitives.
pub const PRIMITIVE_TYPES: &[(&str, Option<usize>)] = &[
    ("bool", Some(1)),
    ("char", Some(1)),
    ("int8", Some(1)),
    ("uint8", Some(1)),
    ("int16", Some(2)),
    ("uint16", Some(2)),
    ("int32", Some(4)),
    ("uint32", Some(4)),
    ("int64", Some(8)),
    ("uint64", Some(8)),
    ("float", Some(4)),
    ("float32", Some(4)),
    ("double", Some(8)),
    ("float64", Some(8)),
    ("bytes", None),
    ("string", None),
];

pub fn is_primitive(name: &str) -> bool {
    PRIMITIVE_TYPES.iter().any(|(primitive, _)| *primitive == name)
}

/// Fixed wire size of a primitive, `None` for unknown or variable-length types.
pub fn primitive_size(name: &str) -> Option<usize> {
    PRIMITIVE_TYPES
        .iter()
        .find(|(primitive, _)| *primitive == name)
        .and_then(|(_, size)| *size)
}

/// Primitives whose values are stored as plain text rather than JSON.
pub fn is_text_primitive(name: &str) -> bool {
    matches!(name, "char" | "bytes" | "string")
}

/// Keys the type tree uses for metadata; they cannot name struct fields.
pub const RESERVED_FIELD_NAMES: [&str; 4] = ["__type__", "__doc__", "__value__", "__values__"];

/// Default of a type: a literal or the name of a shared constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DefaultValue {
    Literal(Value),
    Constant(String),
}

impl DefaultValue {
    /// The value as written under `__value__` in the type tree.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Constant(name) => Value::String(name.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumVariant {
    pub name: String,
    pub description: Option<String>,
}

impl EnumVariant {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// An empty description is the same as none.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }
}

/// A reference from a schema entry to a type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// A registered type, a primitive, or a derived type.
    Named { name: String },
    /// One variant of a unit, selected by its base type.
    Unit { unit: String, base_type: String },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named { name: name.into() }
    }

    pub fn unit(unit: impl Into<String>, base_type: impl Into<String>) -> Self {
        Self::Unit {
            unit: unit.into(),
            base_type: base_type.into(),
        }
    }

    /// The bare name: the type name or the unit name.
    pub fn name(&self) -> &str {
        match self {
            Self::Named { name } => name,
            Self::Unit { unit, .. } => unit,
        }
    }
}

/// Type of a struct field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldType {
    /// A type known to the schema, optionally with its own description and default.
    Reference {
        type_ref: TypeRef,
        description: Option<String>,
        default: Option<DefaultValue>,
    },
    /// An anonymous enum or struct defined in place.
    Inline { descriptor: Box<TypeDescriptor> },
}

impl FieldType {
    pub fn reference(type_ref: TypeRef) -> Self {
        Self::Reference {
            type_ref,
            description: None,
            default: None,
        }
    }

    pub fn inline(descriptor: TypeDescriptor) -> Self {
        Self::Inline {
            descriptor: Box::new(descriptor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub field_type: FieldType,
}

impl StructField {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeKind {
    Primitive {
        base_type: String,
    },
    Enum {
        base_type: String,
        variants: Vec<EnumVariant>,
    },
    Struct {
        fields: Vec<StructField>,
    },
    Unit {
        unit: String,
        base_type: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub default: Option<DefaultValue>,
    pub kind: TypeKind,
}

impl TypeDescriptor {
    /// A primitive, or an alias of one when `name` differs from `base_type`.
    pub fn primitive(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            TypeKind::Primitive {
                base_type: base_type.into(),
            },
        )
    }

    pub fn enumeration(
        name: impl Into<String>,
        base_type: impl Into<String>,
        variants: Vec<EnumVariant>,
    ) -> Self {
        Self::with_kind(
            name,
            TypeKind::Enum {
                base_type: base_type.into(),
                variants,
            },
        )
    }

    pub fn structure(name: impl Into<String>, fields: Vec<StructField>) -> Self {
        Self::with_kind(name, TypeKind::Struct { fields })
    }

    pub fn unit(name: impl Into<String>, base_type: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(
            name.clone(),
            TypeKind::Unit {
                unit: name,
                base_type: base_type.into(),
            },
        )
    }

    fn with_kind(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            description: None,
            default: None,
            kind,
        }
    }

    /// An empty description is the same as none.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Underlying type name. Structs are their own base.
    pub fn base_type_name(&self) -> &str {
        match &self.kind {
            TypeKind::Primitive { base_type }
            | TypeKind::Enum { base_type, .. }
            | TypeKind::Unit { base_type, .. } => base_type,
            TypeKind::Struct { .. } => &self.name,
        }
    }

    /// Bring a descriptor into the form the type tree can reproduce.
    ///
    /// Empty descriptions become `None` and inline descriptors take the
    /// name of the field that holds them, at every nesting level.
    pub fn normalize(&mut self) {
        if self.description.as_deref() == Some("") {
            self.description = None;
        }
        match &mut self.kind {
            TypeKind::Enum { variants, .. } => {
                for variant in variants {
                    if variant.description.as_deref() == Some("") {
                        variant.description = None;
                    }
                }
            }
            TypeKind::Struct { fields } => {
                for field in fields {
                    match &mut field.field_type {
                        FieldType::Reference { description, .. } => {
                            if description.as_deref() == Some("") {
                                *description = None;
                            }
                        }
                        FieldType::Inline { descriptor } => {
                            descriptor.name.clone_from(&field.name);
                            descriptor.normalize();
                        }
                    }
                }
            }
            TypeKind::Primitive { .. } | TypeKind::Unit { .. } => {}
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            TypeKind::Primitive { .. } => "primitive",
            TypeKind::Enum { .. } => "enum",
            TypeKind::Struct { .. } => "struct",
            TypeKind::Unit { .. } => "unit",
        }
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}
