//! Types and constants implied by the element collections.

use serde_json::{Map, Value, json};

use crate::collection::ElementCollection;
use crate::constants::{
    Constant, DEFAULT_CONFIGURATION, MAX_TELECOMMAND_DATA_SIZE, MAX_TELECOMMAND_RESPONSE_SIZE,
    NUM_CONFIGURATIONS,
};
use crate::elements::{Configuration, ValueType};
use crate::registry::{
    CONFIGURATION_ID_TYPE, CONFIGURATION_TYPE, TELECOMMAND_TYPE, TELEMETRY_TYPE_TYPE,
};
use crate::schema::Schema;
use crate::types::{
    EnumVariant, FieldType, StructField, TypeDescriptor, TypeKind, TypeRef, primitive_size,
};

/// Identifier enums are carried in one byte on the wire.
const IDENTIFIER_BASE_TYPE: &str = "uint8";
const SIZE_TYPE: &str = "uint16";
const MAX_TYPE_DEPTH: usize = 32;

impl Schema {
    /// Regenerate every derived type and constant from the current contents.
    pub(crate) fn refresh_derived(&mut self) {
        let configuration_ids = identifier_enum(
            CONFIGURATION_ID_TYPE,
            self.configurations()
                .iter()
                .map(|c| (c.name.as_str(), c.description.as_str())),
        );
        let configuration_struct = TypeDescriptor::structure(
            CONFIGURATION_TYPE,
            self.configurations()
                .iter()
                .map(|c| StructField::new(&c.name, FieldType::reference(c.type_ref.clone())))
                .collect(),
        );
        let telecommand_ids = identifier_enum(
            TELECOMMAND_TYPE,
            self.telecommands()
                .iter()
                .map(|t| (t.name.as_str(), t.description.as_str())),
        );
        let telemetry_ids = identifier_enum(
            TELEMETRY_TYPE_TYPE,
            self.telemetry_types()
                .iter()
                .map(|t| (t.name.as_str(), t.description.as_str())),
        );

        let num_configurations = derived_constant(
            NUM_CONFIGURATIONS,
            json!(self.configurations().len()),
            TypeRef::named(IDENTIFIER_BASE_TYPE),
            "Number of configuration items",
        );
        let default_configuration = derived_constant(
            DEFAULT_CONFIGURATION,
            default_configuration(self.configurations()),
            TypeRef::named(CONFIGURATION_TYPE),
            "Default values of all configuration items",
        );
        let max_data_size = derived_constant(
            MAX_TELECOMMAND_DATA_SIZE,
            json!(self.max_telecommand_data_size()),
            TypeRef::named(SIZE_TYPE),
            "Largest telecommand argument payload in bytes",
        );
        let max_response_size = derived_constant(
            MAX_TELECOMMAND_RESPONSE_SIZE,
            json!(self.max_telecommand_response_size()),
            TypeRef::named(SIZE_TYPE),
            "Largest telecommand response payload in bytes",
        );

        let types = self.types_mut();
        types.set_derived(configuration_ids);
        types.set_derived(configuration_struct);
        types.set_derived(telecommand_ids);
        types.set_derived(telemetry_ids);
        let constants = self.constants_mut();
        constants.set_derived(num_configurations);
        constants.set_derived(default_configuration);
        constants.set_derived(max_data_size);
        constants.set_derived(max_response_size);
    }

    /// Fixed wire size of a type, `None` when unknown or variable-length.
    pub fn byte_size(&self, type_ref: &TypeRef) -> Option<usize> {
        let descriptor = self.resolve_type(type_ref).ok()?;
        self.descriptor_size(&descriptor, 0)
    }

    fn descriptor_size(&self, descriptor: &TypeDescriptor, depth: usize) -> Option<usize> {
        if depth > MAX_TYPE_DEPTH {
            return None;
        }
        match &descriptor.kind {
            TypeKind::Primitive { base_type } if *base_type == descriptor.name => {
                primitive_size(base_type)
            }
            TypeKind::Primitive { base_type }
            | TypeKind::Enum { base_type, .. }
            | TypeKind::Unit { base_type, .. } => {
                let base = self.types().resolve(base_type).ok()?;
                self.descriptor_size(&base, depth + 1)
            }
            TypeKind::Struct { fields } => fields
                .iter()
                .map(|field| match &field.field_type {
                    FieldType::Reference { type_ref, .. } => {
                        let resolved = self.resolve_type(type_ref).ok()?;
                        self.descriptor_size(&resolved, depth + 1)
                    }
                    FieldType::Inline { descriptor } => self.descriptor_size(descriptor, depth + 1),
                })
                .sum(),
        }
    }

    fn value_size(&self, value_type: &ValueType) -> usize {
        match value_type {
            ValueType::Typed { type_ref } => self.byte_size(type_ref).unwrap_or(0),
            ValueType::Configuration => self
                .configurations()
                .iter()
                .filter_map(|c| self.byte_size(&c.type_ref))
                .max()
                .unwrap_or(0),
        }
    }

    fn max_telecommand_data_size(&self) -> usize {
        self.telecommands()
            .iter()
            .map(|telecommand| {
                telecommand
                    .arguments
                    .iter()
                    .map(|argument| self.value_size(&argument.value_type))
                    .sum::<usize>()
            })
            .max()
            .unwrap_or(0)
    }

    fn max_telecommand_response_size(&self) -> usize {
        self.telecommands()
            .iter()
            .filter_map(|telecommand| telecommand.response.as_ref())
            .map(|response| self.value_size(&response.value_type))
            .max()
            .unwrap_or(0)
    }
}

fn identifier_enum<'a>(
    name: &str,
    elements: impl Iterator<Item = (&'a str, &'a str)>,
) -> TypeDescriptor {
    let variants = elements
        .map(|(element, description)| {
            let variant = EnumVariant::new(element);
            if description.is_empty() {
                variant
            } else {
                variant.with_description(description)
            }
        })
        .collect();
    TypeDescriptor::enumeration(name, IDENTIFIER_BASE_TYPE, variants)
}

fn default_configuration(configurations: &ElementCollection<Configuration>) -> Value {
    let mut defaults = Map::new();
    for configuration in configurations {
        defaults.insert(
            configuration.name.clone(),
            configuration.default_value.clone(),
        );
    }
    Value::Object(defaults)
}

fn derived_constant(name: &str, value: Value, type_ref: TypeRef, description: &str) -> Constant {
    Constant {
        name: name.to_string(),
        value,
        type_ref,
        description: description.to_string(),
    }
}
