//! Schema loading operations.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use balloon_model::{
    Argument, CONFIGURATION_VALUE_MARKER, Configuration, DataPoint, Response, Schema, Telecommand,
    TelemetryType, TypeRef, ValueType, is_text_primitive,
};
use serde_json::Value;

use crate::csv_utils::{Row, get_field, read_csv_rows};
use crate::error::{Result, StoreError};
use crate::layout;
use crate::type_tree::TypeTreeDecoder;

/// Load a schema from a directory written by [`save_schema`](crate::save_schema).
///
/// Missing tables are empty sections. Every reference is checked once the
/// whole tree is read; the first dangling one fails the load.
pub fn load_schema(dir: &Path) -> Result<Schema> {
    if !dir.is_dir() {
        return Err(StoreError::io(
            "open directory",
            dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut schema = Schema::new();
    load_units(&mut schema, dir)?;
    let constants_path = dir.join(layout::CONSTANTS_FILE);
    let constant_rows =
        read_csv_rows(&constants_path, &layout::CONSTANTS_HEADER)?.unwrap_or_default();
    let constant_names: BTreeSet<String> = constant_rows
        .iter()
        .map(|row| get_field(row, layout::NAME).to_string())
        .collect();
    load_types(&mut schema, dir, &constant_names)?;
    load_constants(&mut schema, &constants_path, &constant_rows)?;
    load_configurations(&mut schema, dir)?;
    load_telemetry_types(&mut schema, dir)?;
    load_telecommands(&mut schema, dir)?;

    schema
        .validate()
        .map_err(|source| StoreError::schema(dir, source))?;

    tracing::info!(
        path = %dir.display(),
        types = schema.types().user_types().count(),
        units = schema.units().len(),
        configurations = schema.configurations().len(),
        telecommands = schema.telecommands().len(),
        telemetry_types = schema.telemetry_types().len(),
        "loaded schema"
    );
    Ok(schema)
}

fn load_units(schema: &mut Schema, dir: &Path) -> Result<()> {
    let path = dir.join(layout::UNITS_FILE);
    for row in read_csv_rows(&path, &layout::UNITS_HEADER)?.unwrap_or_default() {
        schema
            .add_unit(
                get_field(&row, layout::NAME),
                get_field(&row, layout::TYPE),
                get_field(&row, layout::DESCRIPTION),
            )
            .map_err(|source| StoreError::schema(&path, source))?;
    }
    Ok(())
}

fn load_types(schema: &mut Schema, dir: &Path, constant_names: &BTreeSet<String>) -> Result<()> {
    let path = dir.join(layout::TYPES_FILE);
    if !path.is_file() {
        return Ok(());
    }
    let text = fs::read_to_string(&path).map_err(|source| StoreError::io("read", &path, source))?;
    let tree: Value = serde_json::from_str(&text).map_err(|source| StoreError::Json {
        path: path.clone(),
        source,
    })?;
    let Value::Object(tree) = tree else {
        return Err(StoreError::invalid(&path, "type tree must be a JSON object"));
    };
    let descriptors = TypeTreeDecoder::new(schema, &tree, constant_names)
        .decode_all(&tree)
        .map_err(|message| StoreError::invalid(&path, message))?;
    for descriptor in descriptors {
        schema
            .register_type(descriptor)
            .map_err(|source| StoreError::schema(&path, source))?;
    }
    tracing::debug!(path = %path.display(), types = tree.len(), "read type tree");
    Ok(())
}

fn load_constants(schema: &mut Schema, path: &Path, rows: &[Row]) -> Result<()> {
    for row in rows {
        let type_ref = parse_type(schema, path, get_field(row, layout::TYPE))?;
        let text_typed = schema
            .resolve_type(&type_ref)
            .is_ok_and(|descriptor| is_text_primitive(descriptor.base_type_name()));
        let raw = get_field(row, layout::VALUE);
        let value = if text_typed {
            Value::String(raw.to_string())
        } else {
            parse_value(raw)
        };
        schema
            .add_constant(
                get_field(row, layout::NAME),
                value,
                type_ref,
                get_field(row, layout::DESCRIPTION),
            )
            .map_err(|source| StoreError::schema(path, source))?;
    }
    Ok(())
}

fn load_configurations(schema: &mut Schema, dir: &Path) -> Result<()> {
    let path = dir.join(layout::CONFIGURATIONS_FILE);
    for row in read_csv_rows(&path, &layout::CONFIGURATIONS_HEADER)?.unwrap_or_default() {
        let configuration = Configuration::new(
            get_field(&row, layout::NAME),
            parse_type(schema, &path, get_field(&row, layout::TYPE))?,
            parse_value(get_field(&row, layout::DEFAULT_VALUE)),
            get_field(&row, layout::DESCRIPTION),
        );
        schema
            .append_configuration(configuration)
            .map_err(|source| StoreError::schema(&path, source))?;
    }
    Ok(())
}

fn load_telemetry_types(schema: &mut Schema, dir: &Path) -> Result<()> {
    let path = dir.join(layout::TELEMETRY_FILE);
    let arguments_dir = dir.join(layout::TELEMETRY_ARGUMENTS_DIR);
    for row in read_csv_rows(&path, &layout::TELEMETRY_HEADER)?.unwrap_or_default() {
        let name = get_field(&row, layout::NAME);
        let mut telemetry = TelemetryType::new(name, get_field(&row, layout::DESCRIPTION));
        let arguments_path = arguments_dir.join(layout::arguments_file_name(name));
        let points = read_csv_rows(&arguments_path, &layout::TELEMETRY_ARGUMENTS_HEADER)?
            .unwrap_or_default();
        for point in points {
            telemetry.data.push(DataPoint::new(
                get_field(&point, layout::NAME),
                parse_type(schema, &arguments_path, get_field(&point, layout::TYPE))?,
                get_field(&point, layout::DESCRIPTION),
            ));
        }
        schema
            .append_telemetry_type(telemetry)
            .map_err(|source| StoreError::schema(&path, source))?;
    }
    warn_stray_argument_files(&arguments_dir, &schema.telemetry_types().names())
}

fn load_telecommands(schema: &mut Schema, dir: &Path) -> Result<()> {
    let path = dir.join(layout::TELECOMMANDS_FILE);
    let arguments_dir = dir.join(layout::TELECOMMAND_ARGUMENTS_DIR);
    for row in read_csv_rows(&path, &layout::TELECOMMANDS_HEADER)?.unwrap_or_default() {
        let name = get_field(&row, layout::NAME);
        let is_debug = match get_field(&row, layout::DEBUG).trim() {
            "true" => true,
            "false" => false,
            other => {
                return Err(StoreError::invalid(
                    &path,
                    format!("telecommand {name}: debug flag must be true or false, got {other:?}"),
                ));
            }
        };
        let mut telecommand =
            Telecommand::new(name, get_field(&row, layout::DESCRIPTION)).debug(is_debug);

        let response_name = get_field(&row, layout::RESPONSE_NAME);
        let response_type = get_field(&row, layout::RESPONSE_TYPE);
        if !response_name.is_empty() || !response_type.is_empty() {
            telecommand.response = Some(Response {
                name: response_name.to_string(),
                description: get_field(&row, layout::RESPONSE_DESCRIPTION).to_string(),
                value_type: parse_value_type(schema, &path, response_type)?,
            });
        }

        let arguments_path = arguments_dir.join(layout::arguments_file_name(name));
        let arguments = read_csv_rows(&arguments_path, &layout::TELECOMMAND_ARGUMENTS_HEADER)?
            .unwrap_or_default();
        for row in arguments {
            let mut argument = Argument::new(
                get_field(&row, layout::NAME),
                parse_value_type(schema, &arguments_path, get_field(&row, layout::TYPE))?,
                get_field(&row, layout::DESCRIPTION),
            );
            let default = get_field(&row, layout::DEFAULT);
            if !default.is_empty() {
                argument = argument.with_default(parse_value(default));
            }
            telecommand.arguments.push(argument);
        }

        schema
            .append_telecommand(telecommand)
            .map_err(|source| StoreError::schema(&path, source))?;
    }
    warn_stray_argument_files(&arguments_dir, &schema.telecommands().names())
}

fn parse_type(schema: &Schema, path: &Path, text: &str) -> Result<TypeRef> {
    schema
        .parse_type_ref(text)
        .map_err(|source| StoreError::schema(path, source))
}

fn parse_value_type(schema: &Schema, path: &Path, text: &str) -> Result<ValueType> {
    if text.trim() == CONFIGURATION_VALUE_MARKER {
        return Ok(ValueType::Configuration);
    }
    parse_type(schema, path, text).map(ValueType::typed)
}

/// Cells hold JSON; anything that does not parse is taken as a bare string.
fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

fn warn_stray_argument_files(dir: &Path, owners: &[&str]) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(source) => return Err(StoreError::io("read directory", dir, source)),
    };
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::io("read directory", dir, source))?;
        let path = entry.path();
        let owned = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| owners.contains(&stem));
        if !owned {
            tracing::warn!(path = %path.display(), "ignoring argument file with no owning element");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn cell_values_fall_back_to_strings() {
        assert_eq!(parse_value("5"), json!(5));
        assert_eq!(parse_value("[1, 2]"), json!([1, 2]));
        assert_eq!(parse_value("\"IDLE\""), json!("IDLE"));
        assert_eq!(parse_value("IDLE"), json!("IDLE"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_schema(&dir.path().join("absent")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }

    #[test]
    fn empty_directory_is_an_empty_schema() {
        let dir = tempfile::tempdir().unwrap();
        let schema = load_schema(dir.path()).unwrap();
        assert!(schema.configurations().is_empty());
        assert!(schema.telecommands().is_empty());
        assert_eq!(schema.types().user_types().count(), 0);
    }

    #[test]
    fn rejects_unknown_debug_flag() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(layout::TELECOMMANDS_FILE),
            "Name,Debug,Description,Response name,Response type,Response description\n\
             PING,maybe,,,,\n",
        )
        .unwrap();
        let err = load_schema(dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { .. }));
    }

    #[test]
    fn debug_flag_and_config_response_are_read() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(layout::CONFIGURATIONS_FILE),
            "Name,Type,Default Value,Description\nbeacon_interval,uint16,10,Seconds\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(layout::TELECOMMANDS_FILE),
            "Name,Debug,Description,Response name,Response type,Response description\n\
             GET_CONFIG,true,Read one item,value,config?,Current value\n",
        )
        .unwrap();
        let schema = load_schema(dir.path()).unwrap();

        let command = schema.telecommands().by_name("GET_CONFIG").unwrap();
        assert!(command.is_debug);
        let response = command.response.as_ref().unwrap();
        assert_eq!(response.value_type, ValueType::Configuration);
        assert_eq!(
            schema.configurations().get(0).unwrap().default_value,
            json!(10)
        );
    }
}
