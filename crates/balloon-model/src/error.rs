use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The kind of schema entry an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Type,
    Unit,
    UnitVariant,
    Constant,
    Configuration,
    Telecommand,
    TelemetryType,
    Argument,
    DataPoint,
    Field,
    EnumVariant,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Type => "type",
            Self::Unit => "unit",
            Self::UnitVariant => "unit variant",
            Self::Constant => "constant",
            Self::Configuration => "configuration",
            Self::Telecommand => "telecommand",
            Self::TelemetryType => "telemetry type",
            Self::Argument => "argument",
            Self::DataPoint => "data point",
            Self::Field => "field",
            Self::EnumVariant => "enum variant",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("duplicate {kind} name: {name}")]
    DuplicateName { kind: EntryKind, name: String },

    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidName {
        kind: EntryKind,
        name: String,
        reason: &'static str,
    },

    #[error("{name} is reserved for derived schema entries")]
    ReservedName { name: String },

    #[error("index {index} is out of range for {kind} collection of length {len}")]
    IndexOutOfRange {
        kind: EntryKind,
        index: usize,
        len: usize,
    },

    #[error("cannot replace an element of the empty {kind} collection")]
    EmptyCollection { kind: EntryKind },

    #[error("{operation} is not supported")]
    Unsupported { operation: &'static str },

    #[error("unresolved type reference {reference:?} in {context}")]
    UnresolvedType { reference: String, context: String },

    #[error("unresolved constant reference {name:?} in {context}")]
    UnresolvedConstant { name: String, context: String },
}

impl SchemaError {
    /// Errors raised before any mutation because the request itself is invalid.
    pub fn is_validation(&self) -> bool {
        !self.is_reference()
    }

    /// Errors raised because a name does not resolve against the schema.
    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedType { .. } | Self::UnresolvedConstant { .. }
        )
    }

    pub(crate) fn unresolved_type(reference: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnresolvedType {
            reference: reference.into(),
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;

/// Check that `name` can be used as an entry name.
///
/// Element names become file names in the serialized layout, so path
/// separators are rejected along with blank names.
pub fn validate_name(kind: EntryKind, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::InvalidName {
            kind,
            name: name.to_string(),
            reason: "name is empty",
        });
    }
    if name.trim() != name {
        return Err(SchemaError::InvalidName {
            kind,
            name: name.to_string(),
            reason: "name has leading or trailing whitespace",
        });
    }
    if name.contains(['/', '\\']) {
        return Err(SchemaError::InvalidName {
            kind,
            name: name.to_string(),
            reason: "name contains a path separator",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_and_path_like_names() {
        assert!(validate_name(EntryKind::Telecommand, "PING").is_ok());
        assert!(validate_name(EntryKind::Telecommand, "  ").is_err());
        assert!(validate_name(EntryKind::Telecommand, " PING").is_err());
        assert!(validate_name(EntryKind::Telecommand, "a/b").is_err());
        assert!(validate_name(EntryKind::Telecommand, "a\\b").is_err());
    }

    #[test]
    fn classifies_taxonomy() {
        let duplicate = SchemaError::DuplicateName {
            kind: EntryKind::Constant,
            name: "X".to_string(),
        };
        assert!(duplicate.is_validation());
        let dangling = SchemaError::unresolved_type("Foo", "configuration Bar");
        assert!(dangling.is_reference());
        assert_eq!(
            dangling.to_string(),
            "unresolved type reference \"Foo\" in configuration Bar"
        );
    }
}
