//! JSON codec for the shared data type tree.
//!
//! Each registered type maps to either a bare base type name or an object.
//! Objects use reserved keys for metadata; any other key is a struct field:
//!
//! ```text
//! "Voltage": "uint16",
//! "Mode": {"__type__": "uint8", "__values__": ["IDLE", "ASCENT"]},
//! "Status": {"__doc__": "...", "mode": "Mode", "heater": {"__type__": "bool", "__value__": false}}
//! ```

use std::collections::BTreeSet;

use balloon_model::registry::split_unit_variant;
use balloon_model::{
    DefaultValue, EnumVariant, FieldType, RESERVED_FIELD_NAMES, Schema, StructField,
    TypeDescriptor, TypeKind, TypeRef,
};
use serde_json::{Map, Value};

const TYPE_KEY: &str = "__type__";
const DOC_KEY: &str = "__doc__";
const VALUE_KEY: &str = "__value__";
const VALUES_KEY: &str = "__values__";

fn is_reserved_key(key: &str) -> bool {
    RESERVED_FIELD_NAMES.contains(&key)
}

/// Serialize every user-defined type of `schema`.
pub(crate) fn types_to_json(schema: &Schema) -> Value {
    let mut tree = Map::new();
    for descriptor in schema.types().user_types() {
        tree.insert(descriptor.name.clone(), serialize_type(schema, descriptor));
    }
    Value::Object(tree)
}

fn serialize_type(schema: &Schema, descriptor: &TypeDescriptor) -> Value {
    let mut object = Map::new();
    insert_basic_info(
        &mut object,
        descriptor.description.as_deref(),
        descriptor.default.as_ref(),
    );
    match &descriptor.kind {
        TypeKind::Enum {
            base_type,
            variants,
        } => {
            object.insert(TYPE_KEY.to_string(), Value::String(base_type.clone()));
            object.insert(VALUES_KEY.to_string(), serialize_variants(variants));
        }
        TypeKind::Struct { fields } => {
            for field in fields {
                object.insert(
                    field.name.clone(),
                    serialize_field(schema, &field.field_type),
                );
            }
        }
        TypeKind::Primitive { base_type } => {
            if object.is_empty() {
                return Value::String(base_type.clone());
            }
            object.insert(TYPE_KEY.to_string(), Value::String(base_type.clone()));
        }
        TypeKind::Unit { unit, base_type } => {
            let name = schema.display_name(&TypeRef::unit(unit.clone(), base_type.clone()));
            if object.is_empty() {
                return Value::String(name);
            }
            object.insert(TYPE_KEY.to_string(), Value::String(name));
        }
    }
    Value::Object(object)
}

fn serialize_field(schema: &Schema, field_type: &FieldType) -> Value {
    match field_type {
        FieldType::Reference {
            type_ref,
            description,
            default,
        } => {
            let name = schema.display_name(type_ref);
            let mut object = Map::new();
            insert_basic_info(&mut object, description.as_deref(), default.as_ref());
            if object.is_empty() {
                return Value::String(name);
            }
            object.insert(TYPE_KEY.to_string(), Value::String(name));
            Value::Object(object)
        }
        FieldType::Inline { descriptor } => serialize_type(schema, descriptor),
    }
}

fn serialize_variants(variants: &[EnumVariant]) -> Value {
    let documented = variants
        .iter()
        .any(|variant| variant.description.as_deref().is_some_and(|d| !d.is_empty()));
    if !documented {
        return Value::Array(
            variants
                .iter()
                .map(|variant| Value::String(variant.name.clone()))
                .collect(),
        );
    }
    let mut values = Map::new();
    for variant in variants {
        let mut entry = Map::new();
        insert_basic_info(&mut entry, variant.description.as_deref(), None);
        values.insert(variant.name.clone(), Value::Object(entry));
    }
    Value::Object(values)
}

fn insert_basic_info(
    object: &mut Map<String, Value>,
    description: Option<&str>,
    default: Option<&DefaultValue>,
) {
    if let Some(description) = description.filter(|d| !d.is_empty()) {
        object.insert(DOC_KEY.to_string(), Value::String(description.to_string()));
    }
    if let Some(default) = default {
        object.insert(VALUE_KEY.to_string(), default.to_json());
    }
}

/// Decodes a type tree against a schema that already holds the units.
///
/// References are resolved leniently; dangling ones are left for
/// [`Schema::validate`] to report.
pub(crate) struct TypeTreeDecoder<'a> {
    schema: &'a Schema,
    declared: BTreeSet<&'a str>,
    constant_names: &'a BTreeSet<String>,
}

impl<'a> TypeTreeDecoder<'a> {
    pub(crate) fn new(
        schema: &'a Schema,
        tree: &'a Map<String, Value>,
        constant_names: &'a BTreeSet<String>,
    ) -> Self {
        Self {
            schema,
            declared: tree.keys().map(String::as_str).collect(),
            constant_names,
        }
    }

    pub(crate) fn decode_all(
        &self,
        tree: &Map<String, Value>,
    ) -> Result<Vec<TypeDescriptor>, String> {
        tree.iter()
            .map(|(name, value)| self.decode_type(name, value))
            .collect()
    }

    fn decode_type(&self, name: &str, value: &Value) -> Result<TypeDescriptor, String> {
        let object = match value {
            Value::String(base_type) => return Ok(TypeDescriptor::primitive(name, base_type)),
            Value::Object(object) => object,
            _ => return Err(format!("type {name}: expected a type name or an object")),
        };
        let mut descriptor = if let Some(values) = object.get(VALUES_KEY) {
            let base_type = object
                .get(TYPE_KEY)
                .and_then(Value::as_str)
                .ok_or_else(|| format!("enum {name}: missing {TYPE_KEY}"))?;
            TypeDescriptor::enumeration(name, base_type, decode_variants(name, values)?)
        } else if let Some(base_type) = object.get(TYPE_KEY) {
            let base_type = base_type
                .as_str()
                .ok_or_else(|| format!("type {name}: {TYPE_KEY} must be a string"))?;
            TypeDescriptor::primitive(name, base_type)
        } else {
            let fields = object
                .iter()
                .filter(|(key, _)| !is_reserved_key(key))
                .map(|(field, value)| {
                    self.decode_field(field, value)
                        .map(|field_type| StructField::new(field, field_type))
                })
                .collect::<Result<Vec<_>, String>>()
                .map_err(|message| format!("struct {name}: {message}"))?;
            TypeDescriptor::structure(name, fields)
        };
        descriptor.description = decode_doc(object).map_err(|m| format!("type {name}: {m}"))?;
        descriptor.default = self.decode_default(object);
        Ok(descriptor)
    }

    fn decode_field(&self, name: &str, value: &Value) -> Result<FieldType, String> {
        let object = match value {
            Value::String(type_name) => return Ok(FieldType::reference(self.reference(type_name))),
            Value::Object(object) => object,
            _ => return Err(format!("field {name}: expected a type name or an object")),
        };
        if object.contains_key(VALUES_KEY) || !object.contains_key(TYPE_KEY) {
            return self.decode_type(name, value).map(FieldType::inline);
        }
        let type_name = object
            .get(TYPE_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| format!("field {name}: {TYPE_KEY} must be a string"))?;
        Ok(FieldType::Reference {
            type_ref: self.reference(type_name),
            description: decode_doc(object).map_err(|m| format!("field {name}: {m}"))?,
            default: self.decode_default(object),
        })
    }

    fn decode_default(&self, object: &Map<String, Value>) -> Option<DefaultValue> {
        object.get(VALUE_KEY).map(|value| match value {
            Value::String(name) if self.constant_names.contains(name) => {
                DefaultValue::Constant(name.clone())
            }
            other => DefaultValue::Literal(other.clone()),
        })
    }

    fn reference(&self, text: &str) -> TypeRef {
        if let Some((base_type, unit)) = split_unit_variant(text) {
            if self.schema.units().contains(unit) {
                return TypeRef::unit(unit, base_type);
            }
        }
        if self.declared.contains(text) || self.schema.types().contains(text) {
            return TypeRef::named(text);
        }
        match self.schema.units().get(text) {
            Some(unit) => TypeRef::unit(text, unit.canonical().base_type.clone()),
            None => TypeRef::named(text),
        }
    }
}

fn decode_doc(object: &Map<String, Value>) -> Result<Option<String>, String> {
    match object.get(DOC_KEY) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(doc)) if doc.is_empty() => Ok(None),
        Some(Value::String(doc)) => Ok(Some(doc.clone())),
        Some(_) => Err(format!("{DOC_KEY} must be a string")),
    }
}

fn decode_variants(name: &str, values: &Value) -> Result<Vec<EnumVariant>, String> {
    match values {
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(EnumVariant::new)
                    .ok_or_else(|| format!("enum {name}: variant names must be strings"))
            })
            .collect(),
        Value::Object(entries) => entries
            .iter()
            .map(|(variant, entry)| {
                let description = match entry {
                    Value::Null => None,
                    Value::Object(entry) => {
                        decode_doc(entry).map_err(|m| format!("enum {name} {variant}: {m}"))?
                    }
                    _ => return Err(format!("enum {name} {variant}: expected an object")),
                };
                Ok(EnumVariant {
                    name: variant.clone(),
                    description,
                })
            })
            .collect(),
        _ => Err(format!("enum {name}: {VALUES_KEY} must be a list or an object")),
    }
}
