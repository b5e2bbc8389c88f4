//! Subcommand implementations. Each returns data; printing lives in `main`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use balloon_model::{
    AUTOGENERATED_CONSTANT_NAMES, Schema, SchemaDifference, TypeRef, diff, is_autogenerated_type,
};
use balloon_store::{load_schema, save_schema};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

/// Environment variable naming the default schema directory.
pub const SCHEMA_DIR_ENV_VAR: &str = "BALLOON_SCHEMA_DIR";

/// Use the explicit directory, or fall back to `BALLOON_SCHEMA_DIR`.
pub fn resolve_schema_dir(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    std::env::var_os(SCHEMA_DIR_ENV_VAR)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("no schema directory given and {SCHEMA_DIR_ENV_VAR} is not set"))
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub path: PathBuf,
    pub units: usize,
    pub constants: usize,
    pub types: usize,
    pub configurations: usize,
    pub telecommands: usize,
    pub telemetry_types: usize,
    /// Values of the constants derived from the element tables.
    pub derived_constants: BTreeMap<String, Value>,
}

impl CheckReport {
    fn new(path: &Path, schema: &Schema) -> Self {
        let derived_constants = AUTOGENERATED_CONSTANT_NAMES
            .iter()
            .filter_map(|name| {
                schema
                    .constants()
                    .get(name)
                    .map(|constant| ((*name).to_string(), constant.value.clone()))
            })
            .collect();
        Self {
            path: path.to_path_buf(),
            units: schema.units().len(),
            constants: schema.constants().user_constants().count(),
            types: schema.types().user_types().count(),
            configurations: schema.configurations().len(),
            telecommands: schema.telecommands().len(),
            telemetry_types: schema.telemetry_types().len(),
            derived_constants,
        }
    }
}

/// One row of the `show` listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRow {
    pub name: String,
    pub kind: &'static str,
    pub base_type: String,
    pub derived: bool,
    pub description: String,
}

fn load(dir: &Path) -> Result<Schema> {
    load_schema(dir).with_context(|| format!("load schema from {}", dir.display()))
}

pub fn run_check(dir: &Path) -> Result<CheckReport> {
    let schema = load(dir)?;
    Ok(CheckReport::new(dir, &schema))
}

/// Load `dir` and save it to `output`, or back to `dir` when no output is given.
pub fn run_normalize(dir: &Path, output: Option<&Path>) -> Result<PathBuf> {
    let schema = load(dir)?;
    let target = output.unwrap_or(dir);
    save_schema(&schema, target)
        .with_context(|| format!("save schema to {}", target.display()))?;
    info!(source = %dir.display(), target = %target.display(), "normalized schema");
    Ok(target.to_path_buf())
}

pub fn run_diff(left: &Path, right: &Path) -> Result<Vec<SchemaDifference>> {
    let left_schema = load(left)?;
    let right_schema = load(right)?;
    Ok(diff(&left_schema, &right_schema))
}

pub fn run_show(dir: &Path, include_derived: bool) -> Result<Vec<TypeRow>> {
    let schema = load(dir)?;
    let mut rows: Vec<TypeRow> = schema
        .types()
        .iter()
        .filter(|descriptor| include_derived || !is_autogenerated_type(&descriptor.name))
        .map(|descriptor| TypeRow {
            name: descriptor.name.clone(),
            kind: descriptor.kind_label(),
            base_type: descriptor.base_type_name().to_string(),
            derived: is_autogenerated_type(&descriptor.name),
            description: descriptor.description.clone().unwrap_or_default(),
        })
        .collect();
    for unit in schema.units().iter() {
        for variant in unit.variants() {
            let type_ref = TypeRef::unit(unit.name(), variant.base_type.clone());
            rows.push(TypeRow {
                name: schema.display_name(&type_ref),
                kind: "unit",
                base_type: variant.base_type.clone(),
                derived: false,
                description: variant.description.clone(),
            });
        }
    }
    Ok(rows)
}
