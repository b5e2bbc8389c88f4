//! Configurations, telecommands and telemetry record types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::{Element, ElementId};
use crate::error::EntryKind;
use crate::types::TypeRef;

/// Type marker written for values bound to a configuration item.
pub const CONFIGURATION_VALUE_MARKER: &str = "config?";

/// Type of an argument or response value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValueType {
    Typed { type_ref: TypeRef },
    /// The value is, or selects, a configuration item.
    Configuration,
}

impl ValueType {
    pub fn typed(type_ref: TypeRef) -> Self {
        Self::Typed { type_ref }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    id: ElementId,
    pub name: String,
    pub type_ref: TypeRef,
    pub default_value: Value,
    pub description: String,
}

impl Configuration {
    pub fn new(
        name: impl Into<String>,
        type_ref: TypeRef,
        default_value: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: ElementId::default(),
            name: name.into(),
            type_ref,
            default_value,
            description: description.into(),
        }
    }
}

impl Element for Configuration {
    const KIND: EntryKind = EntryKind::Configuration;

    fn id(&self) -> ElementId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn with_id(self, id: ElementId) -> Self {
        Self { id, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Argument {
    pub name: String,
    pub value_type: ValueType,
    pub default: Option<Value>,
    pub description: String,
}

impl Argument {
    pub fn new(name: impl Into<String>, value_type: ValueType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: None,
            description: description.into(),
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    pub description: String,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telecommand {
    id: ElementId,
    pub name: String,
    pub is_debug: bool,
    pub description: String,
    pub arguments: Vec<Argument>,
    pub response: Option<Response>,
}

impl Telecommand {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: ElementId::default(),
            name: name.into(),
            is_debug: false,
            description: description.into(),
            arguments: Vec::new(),
            response: None,
        }
    }

    #[must_use]
    pub fn debug(mut self, is_debug: bool) -> Self {
        self.is_debug = is_debug;
        self
    }

    #[must_use]
    pub fn with_argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    #[must_use]
    pub fn with_response(mut self, response: Response) -> Self {
        self.response = Some(response);
        self
    }
}

impl Element for Telecommand {
    const KIND: EntryKind = EntryKind::Telecommand;

    fn id(&self) -> ElementId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn with_id(self, id: ElementId) -> Self {
        Self { id, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataPoint {
    pub name: String,
    pub type_ref: TypeRef,
    pub description: String,
}

impl DataPoint {
    pub fn new(name: impl Into<String>, type_ref: TypeRef, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref,
            description: description.into(),
        }
    }
}

/// A kind of telemetry record sent by the balloon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryType {
    id: ElementId,
    pub name: String,
    pub description: String,
    pub data: Vec<DataPoint>,
}

impl TelemetryType {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: ElementId::default(),
            name: name.into(),
            description: description.into(),
            data: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_data_point(mut self, data_point: DataPoint) -> Self {
        self.data.push(data_point);
        self
    }
}

impl Element for TelemetryType {
    const KIND: EntryKind = EntryKind::TelemetryType;

    fn id(&self) -> ElementId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn with_id(self, id: ElementId) -> Self {
        Self { id, ..self }
    }
}
