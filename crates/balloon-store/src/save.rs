//! Schema saving operations.

use std::fs;
use std::path::{Path, PathBuf};

use balloon_model::{CONFIGURATION_VALUE_MARKER, Schema, ValueType, is_text_primitive};
use serde_json::Value;

use crate::csv_utils::write_csv;
use crate::error::{Result, StoreError};
use crate::layout;
use crate::type_tree::types_to_json;

const STAGING_PREFIX: &str = ".balloon-schema-";

/// Save a schema to a directory, replacing whatever the directory held.
///
/// The tree is staged in a sibling temporary directory and swapped into
/// place with renames, so an interrupted save leaves either the previous
/// contents or the new ones.
pub fn save_schema(schema: &Schema, dir: &Path) -> Result<()> {
    let target = resolve_target(dir)?;
    replace_dir(&target, |root| write_tree(schema, root))?;

    tracing::info!(
        path = %target.display(),
        types = schema.types().user_types().count(),
        configurations = schema.configurations().len(),
        telecommands = schema.telecommands().len(),
        telemetry_types = schema.telemetry_types().len(),
        "saved schema"
    );
    Ok(())
}

/// Absolute form of the save target, so `.` and `..` name a real directory.
fn resolve_target(dir: &Path) -> Result<PathBuf> {
    let resolved = if dir.exists() {
        fs::canonicalize(dir)
    } else {
        std::path::absolute(dir)
    }
    .map_err(|source| StoreError::io("resolve save target", dir, source))?;
    if resolved.file_name().is_none() {
        return Err(StoreError::invalid(dir, "save target must name a directory"));
    }
    Ok(resolved)
}

/// Fill a staging directory with `write` and swap it in for `target`.
fn replace_dir(target: &Path, write: impl FnOnce(&Path) -> Result<()>) -> Result<()> {
    let (Some(name), Some(parent)) = (target.file_name(), target.parent()) else {
        return Err(StoreError::invalid(target, "save target must name a directory"));
    };
    fs::create_dir_all(parent)
        .map_err(|source| StoreError::io("create directory", parent, source))?;

    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(|source| StoreError::io("create staging directory", parent, source))?;
    write(staging.path())?;

    let staged = staging.keep();
    let backup = parent.join(format!(".{}.previous", name.to_string_lossy()));
    swap_into_place(&staged, target, &backup)
}

fn swap_into_place(staged: &Path, target: &Path, backup: &Path) -> Result<()> {
    let had_previous = target.exists();
    if had_previous {
        if backup.exists() {
            fs::remove_dir_all(backup)
                .map_err(|source| StoreError::io("remove stale backup", backup, source))?;
        }
        if let Err(source) = fs::rename(target, backup) {
            discard(staged);
            return Err(StoreError::AtomicSwapFailed {
                staged: staged.to_path_buf(),
                target: target.to_path_buf(),
                source,
            });
        }
    }

    if let Err(source) = fs::rename(staged, target) {
        if had_previous {
            if let Err(error) = fs::rename(backup, target) {
                tracing::error!(
                    backup = %backup.display(),
                    %error,
                    "failed to restore previous schema directory"
                );
            }
        }
        discard(staged);
        return Err(StoreError::AtomicSwapFailed {
            staged: staged.to_path_buf(),
            target: target.to_path_buf(),
            source,
        });
    }

    if had_previous {
        discard(backup);
    }
    Ok(())
}

fn discard(path: &Path) {
    if let Err(error) = fs::remove_dir_all(path) {
        tracing::warn!(path = %path.display(), %error, "failed to remove directory");
    }
}

fn write_tree(schema: &Schema, root: &Path) -> Result<()> {
    write_units(schema, root)?;
    write_constants(schema, root)?;
    write_configurations(schema, root)?;
    write_telemetry_types(schema, root)?;
    write_telecommands(schema, root)?;
    write_types(schema, root)
}

fn write_units(schema: &Schema, root: &Path) -> Result<()> {
    // One row per variant; the first row of a unit is its canonical variant.
    let rows = schema.units().iter().flat_map(|unit| {
        unit.variants().iter().map(|variant| {
            vec![
                unit.name().to_string(),
                variant.base_type.clone(),
                variant.description.clone(),
            ]
        })
    });
    write_csv(&root.join(layout::UNITS_FILE), &layout::UNITS_HEADER, rows)
}

fn write_constants(schema: &Schema, root: &Path) -> Result<()> {
    if schema.constants().user_constants().next().is_none() {
        return Ok(());
    }
    let path = root.join(layout::CONSTANTS_FILE);
    let mut rows = Vec::new();
    for constant in schema.constants().user_constants() {
        let text_typed = schema
            .resolve_type(&constant.type_ref)
            .is_ok_and(|descriptor| is_text_primitive(descriptor.base_type_name()));
        let value = match &constant.value {
            Value::String(text) if text_typed => text.clone(),
            other => json_cell(&path, other)?,
        };
        rows.push(vec![
            constant.name.clone(),
            value,
            schema.display_name(&constant.type_ref),
            constant.description.clone(),
        ]);
    }
    write_csv(&path, &layout::CONSTANTS_HEADER, rows)
}

fn write_configurations(schema: &Schema, root: &Path) -> Result<()> {
    if schema.configurations().is_empty() {
        return Ok(());
    }
    let path = root.join(layout::CONFIGURATIONS_FILE);
    let mut rows = Vec::new();
    for configuration in schema.configurations() {
        rows.push(vec![
            configuration.name.clone(),
            schema.display_name(&configuration.type_ref),
            json_cell(&path, &configuration.default_value)?,
            configuration.description.clone(),
        ]);
    }
    write_csv(&path, &layout::CONFIGURATIONS_HEADER, rows)
}

fn write_telemetry_types(schema: &Schema, root: &Path) -> Result<()> {
    let arguments_dir = create_dir(root, layout::TELEMETRY_ARGUMENTS_DIR)?;
    if schema.telemetry_types().is_empty() {
        return Ok(());
    }
    let rows = schema
        .telemetry_types()
        .iter()
        .map(|telemetry| vec![telemetry.name.clone(), telemetry.description.clone()]);
    write_csv(&root.join(layout::TELEMETRY_FILE), &layout::TELEMETRY_HEADER, rows)?;

    for telemetry in schema.telemetry_types().iter().filter(|t| !t.data.is_empty()) {
        let rows = telemetry.data.iter().map(|point| {
            vec![
                point.name.clone(),
                schema.display_name(&point.type_ref),
                point.description.clone(),
            ]
        });
        write_csv(
            &arguments_dir.join(layout::arguments_file_name(&telemetry.name)),
            &layout::TELEMETRY_ARGUMENTS_HEADER,
            rows,
        )?;
    }
    Ok(())
}

fn write_telecommands(schema: &Schema, root: &Path) -> Result<()> {
    let arguments_dir = create_dir(root, layout::TELECOMMAND_ARGUMENTS_DIR)?;
    if schema.telecommands().is_empty() {
        return Ok(());
    }
    let rows = schema.telecommands().iter().map(|telecommand| {
        let (name, value_type, description) = match &telecommand.response {
            Some(response) => (
                response.name.clone(),
                value_type_cell(schema, &response.value_type),
                response.description.clone(),
            ),
            None => Default::default(),
        };
        vec![
            telecommand.name.clone(),
            telecommand.is_debug.to_string(),
            telecommand.description.clone(),
            name,
            value_type,
            description,
        ]
    });
    write_csv(
        &root.join(layout::TELECOMMANDS_FILE),
        &layout::TELECOMMANDS_HEADER,
        rows,
    )?;

    for telecommand in schema
        .telecommands()
        .iter()
        .filter(|t| !t.arguments.is_empty())
    {
        let path = arguments_dir.join(layout::arguments_file_name(&telecommand.name));
        let mut rows = Vec::with_capacity(telecommand.arguments.len());
        for argument in &telecommand.arguments {
            let default = match &argument.default {
                Some(value) => json_cell(&path, value)?,
                None => String::new(),
            };
            rows.push(vec![
                argument.name.clone(),
                value_type_cell(schema, &argument.value_type),
                default,
                argument.description.clone(),
            ]);
        }
        write_csv(&path, &layout::TELECOMMAND_ARGUMENTS_HEADER, rows)?;
    }
    Ok(())
}

fn write_types(schema: &Schema, root: &Path) -> Result<()> {
    let path = root.join(layout::TYPES_FILE);
    let mut text = serde_json::to_string_pretty(&types_to_json(schema)).map_err(|source| {
        StoreError::Json {
            path: path.clone(),
            source,
        }
    })?;
    text.push('\n');
    fs::write(&path, text).map_err(|source| StoreError::io("write", &path, source))?;
    tracing::debug!(path = %path.display(), "wrote type tree");
    Ok(())
}

fn value_type_cell(schema: &Schema, value_type: &ValueType) -> String {
    match value_type {
        ValueType::Typed { type_ref } => schema.display_name(type_ref),
        ValueType::Configuration => CONFIGURATION_VALUE_MARKER.to_string(),
    }
}

fn json_cell(path: &Path, value: &Value) -> Result<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn create_dir(root: &Path, name: &str) -> Result<PathBuf> {
    let dir = root.join(name);
    fs::create_dir_all(&dir).map_err(|source| StoreError::io("create directory", &dir, source))?;
    Ok(dir)
}
