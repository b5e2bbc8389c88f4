#![deny(unsafe_code)]

//! On-disk storage for balloon communication schemas.
//!
//! A schema directory holds one CSV table per section plus a JSON type tree:
//!
//! ```text
//! units.csv               Name, Type, Description
//! sharedConstants.csv     Name, Value, Type, Description
//! configuration.csv       Name, Type, Default Value, Description
//! telemetry.csv           Name, Description
//! telemetryArguments/     one table per telemetry type with data points
//! commands.csv            Name, Debug, Description, Response name/type/description
//! commandArguments/       one table per telecommand with arguments
//! sharedDataTypes.json    user-defined types
//! ```
//!
//! Derived types and constants are never written; they are rebuilt from the
//! element tables on load.

mod csv_utils;
pub mod error;
pub mod layout;
mod load;
mod save;
mod type_tree;

pub use error::{Result, StoreError};
pub use load::load_schema;
pub use save::save_schema;
