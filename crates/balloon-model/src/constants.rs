use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EntryKind, Result, SchemaError, validate_name};
use crate::types::TypeRef;

pub const NUM_CONFIGURATIONS: &str = "NUM_CONFIGURATIONS";
pub const DEFAULT_CONFIGURATION: &str = "DEFAULT_CONFIGURATION";
pub const MAX_TELECOMMAND_DATA_SIZE: &str = "MAX_TELECOMMAND_DATA_SIZE";
pub const MAX_TELECOMMAND_RESPONSE_SIZE: &str = "MAX_TELECOMMAND_RESPONSE_SIZE";

/// Constants derived from the element collections; never authored or exported.
pub const AUTOGENERATED_CONSTANT_NAMES: [&str; 4] = [
    NUM_CONFIGURATIONS,
    DEFAULT_CONFIGURATION,
    MAX_TELECOMMAND_DATA_SIZE,
    MAX_TELECOMMAND_RESPONSE_SIZE,
];

pub fn is_autogenerated_constant(name: &str) -> bool {
    AUTOGENERATED_CONSTANT_NAMES.contains(&name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    pub name: String,
    pub value: Value,
    pub type_ref: TypeRef,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstantTable {
    constants: BTreeMap<String, Constant>,
}

impl ConstantTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_constant(
        &mut self,
        name: impl Into<String>,
        value: Value,
        type_ref: TypeRef,
        description: impl Into<String>,
    ) -> Result<()> {
        let name = name.into();
        validate_name(EntryKind::Constant, &name)?;
        if is_autogenerated_constant(&name) {
            return Err(SchemaError::ReservedName { name });
        }
        if self.constants.contains_key(&name) {
            return Err(SchemaError::DuplicateName {
                kind: EntryKind::Constant,
                name,
            });
        }
        self.constants.insert(
            name.clone(),
            Constant {
                name,
                value,
                type_ref,
                description: description.into(),
            },
        );
        Ok(())
    }

    pub(crate) fn set_derived(&mut self, constant: Constant) {
        self.constants.insert(constant.name.clone(), constant);
    }

    pub fn get(&self, name: &str) -> Option<&Constant> {
        self.constants.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    /// All constants, derived ones included.
    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.values()
    }

    /// Authored constants only.
    pub fn user_constants(&self) -> impl Iterator<Item = &Constant> {
        self.constants
            .values()
            .filter(|constant| !is_autogenerated_constant(&constant.name))
    }

    pub fn len(&self) -> usize {
        self.constants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constants.is_empty()
    }
}
