//! The type registry: named type descriptors and type-name formatting.

use std::collections::BTreeMap;

use crate::error::{EntryKind, Result, SchemaError, validate_name};
use crate::types::{TypeDescriptor, TypeKind, TypeRef, is_primitive};
use crate::units::UnitTable;

pub const CONFIGURATION_ID_TYPE: &str = "ConfigurationId";
pub const CONFIGURATION_TYPE: &str = "Configuration";
pub const TELECOMMAND_TYPE: &str = "Telecommand";
pub const TELEMETRY_TYPE_TYPE: &str = "TelemetryType";

/// Types derived from the element collections; never authored or exported.
pub const AUTOGENERATED_TYPE_NAMES: [&str; 4] = [
    CONFIGURATION_ID_TYPE,
    CONFIGURATION_TYPE,
    TELECOMMAND_TYPE,
    TELEMETRY_TYPE_TYPE,
];

pub fn is_autogenerated_type(name: &str) -> bool {
    AUTOGENERATED_TYPE_NAMES.contains(&name)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user-defined type.
    ///
    /// Unit-tagged types are not registered here; they resolve through the
    /// unit table. The stored descriptor is normalized first.
    pub fn register(&mut self, mut descriptor: TypeDescriptor) -> Result<()> {
        validate_name(EntryKind::Type, &descriptor.name)?;
        if is_autogenerated_type(&descriptor.name) {
            return Err(SchemaError::ReservedName {
                name: descriptor.name,
            });
        }
        if matches!(descriptor.kind, TypeKind::Unit { .. }) {
            return Err(SchemaError::Unsupported {
                operation: "registering a unit-tagged type (add a unit instead)",
            });
        }
        if self.types.contains_key(&descriptor.name) || is_primitive(&descriptor.name) {
            return Err(SchemaError::DuplicateName {
                kind: EntryKind::Type,
                name: descriptor.name,
            });
        }
        descriptor.normalize();
        tracing::debug!(name = %descriptor.name, kind = descriptor.kind_label(), "registered type");
        self.types.insert(descriptor.name.clone(), descriptor);
        Ok(())
    }

    pub(crate) fn set_derived(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Look up a registered or primitive type by name.
    pub fn resolve(&self, name: &str) -> Result<TypeDescriptor> {
        if let Some(descriptor) = self.types.get(name) {
            return Ok(descriptor.clone());
        }
        if is_primitive(name) {
            return Ok(TypeDescriptor::primitive(name, name));
        }
        Err(SchemaError::unresolved_type(name, "type registry"))
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// True for registered types (derived ones included) and primitives.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name) || is_primitive(name)
    }

    /// All registered types, derived ones included.
    pub fn iter(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Registered types excluding the derived ones.
    pub fn user_types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types
            .values()
            .filter(|descriptor| !is_autogenerated_type(&descriptor.name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Name used for a type reference in listings and files.
///
/// Unit variants other than the canonical one are written as
/// `"{base_type} ({unit})"`. A reference to a unit that no longer exists
/// falls back to the bare name.
pub fn display_name(type_ref: &TypeRef, units: &UnitTable) -> String {
    match type_ref {
        TypeRef::Named { name } => name.clone(),
        TypeRef::Unit { unit, base_type } => match units.get(unit) {
            Some(known) if known.canonical().base_type != *base_type => {
                format!("{base_type} ({unit})")
            }
            Some(_) => unit.clone(),
            None => {
                tracing::warn!(unit = %unit, "display name requested for a missing unit");
                unit.clone()
            }
        },
    }
}

/// Split a `"{base_type} ({unit})"` display name into its parts.
pub fn split_unit_variant(text: &str) -> Option<(&str, &str)> {
    let inner = text.strip_suffix(')')?;
    let (base_type, unit) = inner.split_once(" (")?;
    if base_type.is_empty() || unit.is_empty() || base_type.contains(' ') {
        return None;
    }
    Some((base_type, unit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumVariant;

    #[test]
    fn register_rejects_duplicates_and_reserved() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::primitive("Voltage", "uint16"))
            .unwrap();
        assert!(matches!(
            registry.register(TypeDescriptor::primitive("Voltage", "uint8")),
            Err(SchemaError::DuplicateName { .. })
        ));
        assert!(matches!(
            registry.register(TypeDescriptor::primitive("uint8", "uint8")),
            Err(SchemaError::DuplicateName { .. })
        ));
        assert!(matches!(
            registry.register(TypeDescriptor::enumeration(
                TELECOMMAND_TYPE,
                "uint8",
                vec![EnumVariant::new("PING")]
            )),
            Err(SchemaError::ReservedName { .. })
        ));
        assert!(matches!(
            registry.register(TypeDescriptor::unit("Temperature", "float32")),
            Err(SchemaError::Unsupported { .. })
        ));
    }

    #[test]
    fn resolves_registered_and_primitive_types() {
        let mut registry = TypeRegistry::new();
        registry
            .register(TypeDescriptor::primitive("Voltage", "uint16"))
            .unwrap();
        assert_eq!(registry.resolve("Voltage").unwrap().base_type_name(), "uint16");
        assert_eq!(registry.resolve("int32").unwrap().name, "int32");
        assert!(registry.resolve("Missing").unwrap_err().is_reference());
    }

    #[test]
    fn display_name_marks_non_canonical_unit_variants() {
        let mut units = UnitTable::new();
        units.add_unit("Temperature", "float32", "deg C").unwrap();
        units.add_unit("Temperature", "int16", "raw ADC").unwrap();

        assert_eq!(
            display_name(&TypeRef::unit("Temperature", "int16"), &units),
            "int16 (Temperature)"
        );
        assert_eq!(
            display_name(&TypeRef::unit("Temperature", "float32"), &units),
            "Temperature"
        );
        assert_eq!(
            display_name(&TypeRef::unit("Humidity", "uint8"), &units),
            "Humidity"
        );
        assert_eq!(display_name(&TypeRef::named("uint8"), &units), "uint8");
    }

    #[test]
    fn splits_unit_variant_names() {
        assert_eq!(
            split_unit_variant("int16 (Temperature)"),
            Some(("int16", "Temperature"))
        );
        assert_eq!(split_unit_variant("Temperature"), None);
        assert_eq!(split_unit_variant("()"), None);
    }
}
