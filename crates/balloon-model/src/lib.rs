#![deny(unsafe_code)]

//! In-memory model of the balloon communication schema: units, constants,
//! data types, configuration items, telecommands and telemetry types.

pub mod collection;
pub mod constants;
mod derived;
pub mod elements;
pub mod equality;
pub mod error;
pub mod registry;
pub mod schema;
pub mod types;
pub mod units;

pub use collection::{Element, ElementCollection, ElementId};
pub use constants::{AUTOGENERATED_CONSTANT_NAMES, Constant, ConstantTable, is_autogenerated_constant};
pub use elements::{
    Argument, CONFIGURATION_VALUE_MARKER, Configuration, DataPoint, Response, Telecommand,
    TelemetryType, ValueType,
};
pub use equality::{SchemaDifference, Section, diff, equals};
pub use error::{EntryKind, Result, SchemaError};
pub use registry::{AUTOGENERATED_TYPE_NAMES, TypeRegistry, display_name, is_autogenerated_type};
pub use schema::Schema;
pub use types::{
    DefaultValue, EnumVariant, FieldType, RESERVED_FIELD_NAMES, StructField, TypeDescriptor,
    TypeKind, TypeRef, is_primitive, is_text_primitive,
};
pub use units::{Unit, UnitTable, UnitVariant};
