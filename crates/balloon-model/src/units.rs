//! Physical units and their base-type overloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{EntryKind, Result, SchemaError, validate_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitVariant {
    pub base_type: String,
    pub description: String,
}

/// A named unit. The first variant is canonical for the name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UnitRecord")]
pub struct Unit {
    name: String,
    variants: Vec<UnitVariant>,
}

#[derive(Deserialize)]
struct UnitRecord {
    name: String,
    variants: Vec<UnitVariant>,
}

impl TryFrom<UnitRecord> for Unit {
    type Error = SchemaError;

    fn try_from(record: UnitRecord) -> Result<Self> {
        validate_name(EntryKind::Unit, &record.name)?;
        if record.variants.is_empty() {
            return Err(SchemaError::InvalidName {
                kind: EntryKind::Unit,
                name: record.name,
                reason: "unit has no variants",
            });
        }
        for (index, variant) in record.variants.iter().enumerate() {
            if record.variants[..index]
                .iter()
                .any(|earlier| earlier.base_type == variant.base_type)
            {
                return Err(SchemaError::DuplicateName {
                    kind: EntryKind::UnitVariant,
                    name: format!("{} ({})", variant.base_type, record.name),
                });
            }
        }
        Ok(Self {
            name: record.name,
            variants: record.variants,
        })
    }
}

impl Unit {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variants(&self) -> &[UnitVariant] {
        &self.variants
    }

    pub fn canonical(&self) -> &UnitVariant {
        // Units are only built with at least one variant.
        &self.variants[0]
    }

    pub fn variant(&self, base_type: &str) -> Option<&UnitVariant> {
        self.variants
            .iter()
            .find(|variant| variant.base_type == base_type)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitTable {
    units: BTreeMap<String, Unit>,
}

impl UnitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a unit, or a new base-type variant of an existing unit.
    ///
    /// Adding the same base type twice to one unit is rejected.
    pub fn add_unit(
        &mut self,
        name: impl Into<String>,
        base_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        let base_type = base_type.into();
        validate_name(EntryKind::Unit, &name)?;
        let variant = UnitVariant {
            base_type,
            description: description.into(),
        };
        match self.units.get_mut(&name) {
            Some(unit) => {
                if unit.variant(&variant.base_type).is_some() {
                    return Err(SchemaError::DuplicateName {
                        kind: EntryKind::UnitVariant,
                        name: format!("{} ({name})", variant.base_type),
                    });
                }
                tracing::debug!(unit = %name, base_type = %variant.base_type, "added unit variant");
                unit.variants.push(variant);
            }
            None => {
                self.units.insert(
                    name.clone(),
                    Unit {
                        name,
                        variants: vec![variant],
                    },
                );
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.units.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overloads_share_one_entry() {
        let mut units = UnitTable::new();
        units.add_unit("Temperature", "float32", "deg C").unwrap();
        units.add_unit("Temperature", "int16", "raw ADC").unwrap();

        assert_eq!(units.len(), 1);
        let unit = units.get("Temperature").unwrap();
        assert_eq!(unit.canonical().base_type, "float32");
        assert_eq!(unit.variants().len(), 2);
        assert_eq!(unit.variant("int16").unwrap().description, "raw ADC");
    }

    #[test]
    fn rejects_repeated_variant() {
        let mut units = UnitTable::new();
        units.add_unit("Pressure", "float32", "hPa").unwrap();
        let err = units.add_unit("Pressure", "float32", "again").unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateName {
                kind: EntryKind::UnitVariant,
                name: "float32 (Pressure)".to_string(),
            }
        );
        assert_eq!(units.get("Pressure").unwrap().variants().len(), 1);
    }

    #[test]
    fn deserializing_checks_variants() {
        let unit: Unit = serde_json::from_value(serde_json::json!({
            "name": "Pressure",
            "variants": [{"base_type": "float32", "description": "hPa"}],
        }))
        .unwrap();
        assert_eq!(unit.canonical().base_type, "float32");

        let empty = serde_json::from_value::<Unit>(serde_json::json!({
            "name": "Pressure",
            "variants": [],
        }));
        assert!(empty.unwrap_err().to_string().contains("unit has no variants"));

        let repeated = serde_json::from_value::<Unit>(serde_json::json!({
            "name": "Pressure",
            "variants": [
                {"base_type": "float32", "description": ""},
                {"base_type": "float32", "description": ""},
            ],
        }));
        assert!(repeated.is_err());
    }
}
