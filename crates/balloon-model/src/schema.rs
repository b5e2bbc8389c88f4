//! The schema aggregate.
//!
//! [`Schema`] is the single entry point for mutation so that the derived
//! types and constants always agree with the element collections.

use std::collections::BTreeSet;

use serde_json::Value;

use crate::collection::{ElementCollection, ElementId};
use crate::constants::ConstantTable;
use crate::elements::{Configuration, Telecommand, TelemetryType, ValueType};
use crate::error::{EntryKind, Result, SchemaError};
use crate::registry::{TypeRegistry, display_name, is_autogenerated_type, split_unit_variant};
use crate::types::{
    DefaultValue, FieldType, RESERVED_FIELD_NAMES, TypeDescriptor, TypeKind, TypeRef,
};
use crate::units::UnitTable;

#[derive(Debug, Clone)]
pub struct Schema {
    types: TypeRegistry,
    units: UnitTable,
    constants: ConstantTable,
    configurations: ElementCollection<Configuration>,
    telecommands: ElementCollection<Telecommand>,
    telemetry_types: ElementCollection<TelemetryType>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    pub fn new() -> Self {
        let mut schema = Self {
            types: TypeRegistry::new(),
            units: UnitTable::new(),
            constants: ConstantTable::new(),
            configurations: ElementCollection::new(),
            telecommands: ElementCollection::new(),
            telemetry_types: ElementCollection::new(),
        };
        schema.refresh_derived();
        schema
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    pub fn units(&self) -> &UnitTable {
        &self.units
    }

    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }

    pub fn configurations(&self) -> &ElementCollection<Configuration> {
        &self.configurations
    }

    pub fn telecommands(&self) -> &ElementCollection<Telecommand> {
        &self.telecommands
    }

    pub fn telemetry_types(&self) -> &ElementCollection<TelemetryType> {
        &self.telemetry_types
    }

    /// Register a user type. Type and unit names share one namespace.
    pub fn register_type(&mut self, descriptor: TypeDescriptor) -> Result<()> {
        if self.units.contains(&descriptor.name) {
            return Err(SchemaError::DuplicateName {
                kind: EntryKind::Type,
                name: descriptor.name,
            });
        }
        self.types.register(descriptor)?;
        self.refresh_derived();
        Ok(())
    }

    pub fn add_unit(
        &mut self,
        name: impl Into<String>,
        base_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        if is_autogenerated_type(&name) {
            return Err(SchemaError::ReservedName { name });
        }
        if self.types.contains(&name) {
            return Err(SchemaError::DuplicateName {
                kind: EntryKind::Unit,
                name,
            });
        }
        self.units.add_unit(name, base_type, description)?;
        self.refresh_derived();
        Ok(())
    }

    pub fn add_constant(
        &mut self,
        name: impl Into<String>,
        value: Value,
        type_ref: TypeRef,
        description: impl Into<String>,
    ) -> Result<()> {
        self.constants
            .add_constant(name, value, type_ref, description)
    }

    pub fn append_configuration(&mut self, configuration: Configuration) -> Result<ElementId> {
        let id = self.configurations.append(configuration)?;
        self.refresh_derived();
        Ok(id)
    }

    pub fn replace_configuration(
        &mut self,
        index: usize,
        configuration: Configuration,
    ) -> Result<ElementId> {
        let id = self.configurations.replace_at(index, configuration)?;
        self.refresh_derived();
        Ok(id)
    }

    pub fn append_telecommand(&mut self, telecommand: Telecommand) -> Result<ElementId> {
        let id = self.telecommands.append(telecommand)?;
        self.refresh_derived();
        Ok(id)
    }

    pub fn replace_telecommand(&mut self, index: usize, telecommand: Telecommand) -> Result<ElementId> {
        let id = self.telecommands.replace_at(index, telecommand)?;
        self.refresh_derived();
        Ok(id)
    }

    pub fn append_telemetry_type(&mut self, telemetry: TelemetryType) -> Result<ElementId> {
        let id = self.telemetry_types.append(telemetry)?;
        self.refresh_derived();
        Ok(id)
    }

    pub fn replace_telemetry_type(
        &mut self,
        index: usize,
        telemetry: TelemetryType,
    ) -> Result<ElementId> {
        let id = self.telemetry_types.replace_at(index, telemetry)?;
        self.refresh_derived();
        Ok(id)
    }

    pub(crate) fn types_mut(&mut self) -> &mut TypeRegistry {
        &mut self.types
    }

    pub(crate) fn constants_mut(&mut self) -> &mut ConstantTable {
        &mut self.constants
    }

    pub fn display_name(&self, type_ref: &TypeRef) -> String {
        display_name(type_ref, &self.units)
    }

    /// Parse a type name as written in listings back into a reference.
    ///
    /// Registered, primitive and derived types win over units of the same
    /// name; `"{base} ({unit})"` selects a unit variant.
    pub fn parse_type_ref(&self, text: &str) -> Result<TypeRef> {
        let text = text.trim();
        if let Some((base_type, unit)) = split_unit_variant(text) {
            let known = self
                .units
                .get(unit)
                .is_some_and(|candidate| candidate.variant(base_type).is_some());
            if known {
                return Ok(TypeRef::unit(unit, base_type));
            }
            return Err(SchemaError::unresolved_type(text, "unit variant reference"));
        }
        if self.types.contains(text) {
            return Ok(TypeRef::named(text));
        }
        if let Some(unit) = self.units.get(text) {
            return Ok(TypeRef::unit(text, unit.canonical().base_type.clone()));
        }
        Err(SchemaError::unresolved_type(text, "type reference"))
    }

    pub fn resolve_type(&self, type_ref: &TypeRef) -> Result<TypeDescriptor> {
        match type_ref {
            TypeRef::Named { name } => self.types.resolve(name),
            TypeRef::Unit { unit, base_type } => {
                let variant = self
                    .units
                    .get(unit)
                    .and_then(|known| known.variant(base_type))
                    .ok_or_else(|| {
                        SchemaError::unresolved_type(self.display_name(type_ref), "unit table")
                    })?;
                Ok(TypeDescriptor::unit(unit.clone(), base_type.clone())
                    .with_description(variant.description.clone()))
            }
        }
    }

    /// Check every reference in the schema; stops at the first dangling one.
    pub fn validate(&self) -> Result<()> {
        for unit in self.units.iter() {
            for variant in unit.variants() {
                self.check_primitive_base(&variant.base_type, &format!("unit {}", unit.name()))?;
            }
        }
        for descriptor in self.types.user_types() {
            self.check_descriptor(descriptor, &format!("type {}", descriptor.name))?;
        }
        for constant in self.constants.user_constants() {
            self.check_type_ref(&constant.type_ref, &format!("constant {}", constant.name))?;
        }
        for configuration in &self.configurations {
            self.check_type_ref(
                &configuration.type_ref,
                &format!("configuration {}", configuration.name),
            )?;
        }
        for telecommand in &self.telecommands {
            let context = format!("telecommand {}", telecommand.name);
            check_unique(
                EntryKind::Argument,
                telecommand.arguments.iter().map(|argument| argument.name.as_str()),
            )?;
            for argument in &telecommand.arguments {
                self.check_value_type(
                    &argument.value_type,
                    &format!("{context} argument {}", argument.name),
                )?;
            }
            if let Some(response) = &telecommand.response {
                self.check_value_type(&response.value_type, &format!("{context} response"))?;
            }
        }
        for telemetry in &self.telemetry_types {
            check_unique(
                EntryKind::DataPoint,
                telemetry.data.iter().map(|point| point.name.as_str()),
            )?;
            for point in &telemetry.data {
                self.check_type_ref(
                    &point.type_ref,
                    &format!("telemetry type {} data point {}", telemetry.name, point.name),
                )?;
            }
        }
        Ok(())
    }

    fn check_type_ref(&self, type_ref: &TypeRef, context: &str) -> Result<()> {
        let resolves = match type_ref {
            TypeRef::Named { name } => self.types.contains(name),
            TypeRef::Unit { unit, base_type } => self
                .units
                .get(unit)
                .is_some_and(|known| known.variant(base_type).is_some()),
        };
        if resolves {
            Ok(())
        } else {
            Err(SchemaError::unresolved_type(self.display_name(type_ref), context))
        }
    }

    fn check_value_type(&self, value_type: &ValueType, context: &str) -> Result<()> {
        match value_type {
            ValueType::Typed { type_ref } => self.check_type_ref(type_ref, context),
            ValueType::Configuration => Ok(()),
        }
    }

    fn check_primitive_base(&self, name: &str, context: &str) -> Result<()> {
        match self.types.resolve(name) {
            Ok(TypeDescriptor {
                kind: TypeKind::Primitive { .. },
                ..
            }) => Ok(()),
            _ => Err(SchemaError::unresolved_type(
                name,
                format!("{context} (base type must be primitive)"),
            )),
        }
    }

    fn check_default(&self, default: Option<&DefaultValue>, context: &str) -> Result<()> {
        match default {
            Some(DefaultValue::Constant(name)) if !self.constants.contains(name) => {
                Err(SchemaError::UnresolvedConstant {
                    name: name.clone(),
                    context: context.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    fn check_descriptor(&self, descriptor: &TypeDescriptor, context: &str) -> Result<()> {
        self.check_default(descriptor.default.as_ref(), context)?;
        match &descriptor.kind {
            TypeKind::Primitive { base_type } => {
                if *base_type != descriptor.name {
                    self.check_primitive_base(base_type, context)?;
                }
            }
            TypeKind::Enum {
                base_type,
                variants,
            } => {
                self.check_primitive_base(base_type, context)?;
                check_unique(
                    EntryKind::EnumVariant,
                    variants.iter().map(|variant| variant.name.as_str()),
                )?;
            }
            TypeKind::Struct { fields } => {
                check_unique(
                    EntryKind::Field,
                    fields.iter().map(|field| field.name.as_str()),
                )?;
                if let Some(field) = fields
                    .iter()
                    .find(|field| RESERVED_FIELD_NAMES.contains(&field.name.as_str()))
                {
                    return Err(SchemaError::InvalidName {
                        kind: EntryKind::Field,
                        name: field.name.clone(),
                        reason: "name is a reserved type tree key",
                    });
                }
                for field in fields {
                    let field_context = format!("{context} field {}", field.name);
                    match &field.field_type {
                        FieldType::Reference {
                            type_ref, default, ..
                        } => {
                            self.check_type_ref(type_ref, &field_context)?;
                            self.check_default(default.as_ref(), &field_context)?;
                        }
                        FieldType::Inline { descriptor } => {
                            self.check_descriptor(descriptor, &field_context)?;
                        }
                    }
                }
            }
            TypeKind::Unit { unit, base_type } => {
                self.check_type_ref(&TypeRef::unit(unit.clone(), base_type.clone()), context)?;
            }
        }
        Ok(())
    }
}

fn check_unique<'a>(kind: EntryKind, names: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(SchemaError::DuplicateName {
                kind,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::elements::{Argument, DataPoint, Response};
    use crate::types::{EnumVariant, StructField};

    #[test]
    fn parses_unit_references_from_display_names() {
        let mut schema = Schema::new();
        schema.add_unit("Temperature", "float32", "deg C").unwrap();
        schema.add_unit("Temperature", "int16", "raw ADC").unwrap();

        let raw = schema.parse_type_ref("int16 (Temperature)").unwrap();
        assert_eq!(raw, TypeRef::unit("Temperature", "int16"));
        assert_eq!(schema.display_name(&raw), "int16 (Temperature)");

        let canonical = schema.parse_type_ref("Temperature").unwrap();
        assert_eq!(canonical, TypeRef::unit("Temperature", "float32"));
        assert_eq!(schema.display_name(&canonical), "Temperature");

        assert!(schema.parse_type_ref("uint8 (Temperature)").is_err());
        assert_eq!(schema.parse_type_ref("uint8").unwrap(), TypeRef::named("uint8"));
        assert!(schema.parse_type_ref("Nope").unwrap_err().is_reference());
    }

    #[test]
    fn resolves_unit_variant_descriptors() {
        let mut schema = Schema::new();
        schema.add_unit("Temperature", "float32", "deg C").unwrap();
        let descriptor = schema
            .resolve_type(&TypeRef::unit("Temperature", "float32"))
            .unwrap();
        assert_eq!(descriptor.kind_label(), "unit");
        assert_eq!(descriptor.description.as_deref(), Some("deg C"));
    }

    #[test]
    fn validate_reports_dangling_configuration_type() {
        let mut schema = Schema::new();
        schema
            .append_configuration(Configuration::new(
                "beacon_interval",
                TypeRef::named("Seconds"),
                json!(10),
                "",
            ))
            .unwrap();
        let err = schema.validate().unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnresolvedType {
                reference: "Seconds".to_string(),
                context: "configuration beacon_interval".to_string(),
            }
        );
    }

    #[test]
    fn validate_accepts_complete_schema() {
        let mut schema = Schema::new();
        schema.add_unit("Temperature", "float32", "deg C").unwrap();
        schema
            .register_type(TypeDescriptor::enumeration(
                "Mode",
                "uint8",
                vec![EnumVariant::new("IDLE"), EnumVariant::new("ASCENT")],
            ))
            .unwrap();
        schema
            .register_type(TypeDescriptor::structure(
                "Status",
                vec![
                    StructField::new("mode", FieldType::reference(TypeRef::named("Mode"))),
                    StructField::new(
                        "temperature",
                        FieldType::reference(TypeRef::unit("Temperature", "float32")),
                    ),
                ],
            ))
            .unwrap();
        schema
            .append_configuration(Configuration::new(
                "mode",
                TypeRef::named("Mode"),
                json!("IDLE"),
                "",
            ))
            .unwrap();
        schema
            .append_telecommand(
                Telecommand::new("GET_CONFIG", "")
                    .with_argument(Argument::new("item", ValueType::Configuration, ""))
                    .with_response(Response {
                        name: "value".to_string(),
                        description: String::new(),
                        value_type: ValueType::Configuration,
                    }),
            )
            .unwrap();
        schema
            .append_telemetry_type(TelemetryType::new("STATUS", "").with_data_point(
                DataPoint::new("status", TypeRef::named("Status"), ""),
            ))
            .unwrap();
        schema.validate().unwrap();
    }

    #[test]
    fn validate_rejects_duplicate_arguments() {
        let mut schema = Schema::new();
        let argument = Argument::new("x", ValueType::typed(TypeRef::named("uint8")), "");
        schema
            .append_telecommand(
                Telecommand::new("MOVE", "")
                    .with_argument(argument.clone())
                    .with_argument(argument),
            )
            .unwrap();
        assert_eq!(
            schema.validate().unwrap_err(),
            SchemaError::DuplicateName {
                kind: EntryKind::Argument,
                name: "x".to_string(),
            }
        );
    }

    #[test]
    fn validate_rejects_enum_over_struct() {
        let mut schema = Schema::new();
        schema
            .register_type(TypeDescriptor::structure("Pair", vec![]))
            .unwrap();
        schema
            .register_type(TypeDescriptor::enumeration(
                "Broken",
                "Pair",
                vec![EnumVariant::new("A")],
            ))
            .unwrap();
        assert!(schema.validate().unwrap_err().is_reference());
    }

    #[test]
    fn validate_rejects_missing_default_constant() {
        let mut schema = Schema::new();
        schema
            .register_type(
                TypeDescriptor::primitive("Altitude", "uint32")
                    .with_default(DefaultValue::Constant("MAX_ALTITUDE".to_string())),
            )
            .unwrap();
        assert!(matches!(
            schema.validate(),
            Err(SchemaError::UnresolvedConstant { .. })
        ));
        schema
            .add_constant("MAX_ALTITUDE", json!(35000), TypeRef::named("uint32"), "")
            .unwrap();
        schema.validate().unwrap();
    }

    #[test]
    fn unit_names_cannot_shadow_types() {
        let mut schema = Schema::new();
        schema
            .register_type(TypeDescriptor::primitive("Seconds", "uint32"))
            .unwrap();

        for name in ["Seconds", "uint8"] {
            assert_eq!(
                schema.add_unit(name, "float32", "").unwrap_err(),
                SchemaError::DuplicateName {
                    kind: EntryKind::Unit,
                    name: name.to_string(),
                }
            );
        }
        assert!(matches!(
            schema.add_unit("Telecommand", "uint8", ""),
            Err(SchemaError::ReservedName { .. })
        ));
        assert!(schema.units().is_empty());
    }

    #[test]
    fn type_names_cannot_shadow_units() {
        let mut schema = Schema::new();
        schema.add_unit("Temperature", "float32", "deg C").unwrap();

        assert_eq!(
            schema
                .register_type(TypeDescriptor::primitive("Temperature", "int16"))
                .unwrap_err(),
            SchemaError::DuplicateName {
                kind: EntryKind::Type,
                name: "Temperature".to_string(),
            }
        );
        assert_eq!(
            schema.parse_type_ref("Temperature").unwrap(),
            TypeRef::unit("Temperature", "float32")
        );
        schema.add_unit("Temperature", "int16", "raw ADC").unwrap();
    }

    #[test]
    fn validate_rejects_reserved_field_names() {
        for reserved in RESERVED_FIELD_NAMES {
            let mut schema = Schema::new();
            schema
                .register_type(TypeDescriptor::structure(
                    "Header",
                    vec![StructField::new(
                        reserved,
                        FieldType::reference(TypeRef::named("uint8")),
                    )],
                ))
                .unwrap();
            let err = schema.validate().unwrap_err();
            assert!(err.is_validation(), "{err:?}");
            assert!(matches!(
                err,
                SchemaError::InvalidName { kind: EntryKind::Field, ref name, .. } if name == reserved
            ));
        }
    }

    #[test]
    fn registered_types_are_normalized() {
        let mut schema = Schema::new();
        schema
            .register_type(TypeDescriptor::structure(
                "Housekeeping",
                vec![StructField::new(
                    "gps",
                    FieldType::inline(TypeDescriptor::structure("GpsFix", vec![])),
                )],
            ))
            .unwrap();
        let stored = schema.types().get("Housekeeping").unwrap();
        let TypeKind::Struct { fields } = &stored.kind else {
            panic!("expected a struct");
        };
        let FieldType::Inline { descriptor } = &fields[0].field_type else {
            panic!("expected an inline field");
        };
        assert_eq!(descriptor.name, "gps");
    }
}
