//! Integration tests for the CLI subcommands.

use std::fs;
use std::path::Path;

use balloon_cli::commands::{resolve_schema_dir, run_check, run_diff, run_normalize, run_show};
use balloon_model::{
    Argument, Configuration, Schema, Section, Telecommand, TypeDescriptor, TypeRef, ValueType,
};
use balloon_store::{layout, save_schema};
use serde_json::json;

fn write_sample(dir: &Path) {
    let mut schema = Schema::new();
    schema.add_unit("Temperature", "float32", "deg C").unwrap();
    schema.add_unit("Temperature", "int16", "raw ADC").unwrap();
    schema
        .register_type(TypeDescriptor::primitive("Voltage", "uint16"))
        .unwrap();
    schema
        .append_configuration(Configuration::new(
            "beacon_interval",
            TypeRef::named("uint16"),
            json!(10),
            "",
        ))
        .unwrap();
    schema
        .append_telecommand(
            Telecommand::new("SET_HEATER", "").with_argument(Argument::new(
                "on",
                ValueType::typed(TypeRef::named("bool")),
                "",
            )),
        )
        .unwrap();
    save_schema(&schema, dir).unwrap();
}

#[test]
fn check_counts_sections_and_reports_derived_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let schema_dir = dir.path().join("schema");
    write_sample(&schema_dir);

    let report = run_check(&schema_dir).unwrap();
    assert_eq!(report.units, 1);
    assert_eq!(report.types, 1);
    assert_eq!(report.configurations, 1);
    assert_eq!(report.telecommands, 1);
    assert_eq!(report.telemetry_types, 0);
    assert_eq!(report.derived_constants["NUM_CONFIGURATIONS"], json!(1));
    assert_eq!(report.derived_constants["MAX_TELECOMMAND_DATA_SIZE"], json!(1));
}

#[test]
fn check_fails_with_path_context() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join(layout::CONFIGURATIONS_FILE),
        "Name,Type,Default Value,Description\nbeacon_interval,Seconds,10,\n",
    )
    .unwrap();

    let err = run_check(dir.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.starts_with("load schema from"), "{message}");
    assert!(message.contains("Seconds"), "{message}");
}

#[test]
fn normalize_rewrites_into_output_directory() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source");
    let output = dir.path().join("normalized");
    write_sample(&source);
    fs::write(source.join("README.txt"), "notes").unwrap();

    let target = run_normalize(&source, Some(&output)).unwrap();
    assert_eq!(target, output);
    assert!(output.join(layout::TYPES_FILE).is_file());
    assert!(!output.join("README.txt").exists());
    assert!(run_diff(&source, &output).unwrap().is_empty());
}

#[test]
fn diff_reports_changed_sections() {
    let dir = tempfile::tempdir().unwrap();
    let left = dir.path().join("left");
    let right = dir.path().join("right");
    write_sample(&left);
    write_sample(&right);
    fs::write(
        right.join(layout::CONFIGURATIONS_FILE),
        "Name,Type,Default Value,Description\nbeacon_interval,uint16,30,\n",
    )
    .unwrap();

    let differences = run_diff(&left, &right).unwrap();
    assert_eq!(differences.len(), 1);
    assert_eq!(differences[0].section, Section::Configurations);
}

#[test]
fn show_lists_unit_variants_by_display_name() {
    let dir = tempfile::tempdir().unwrap();
    let schema_dir = dir.path().join("schema");
    write_sample(&schema_dir);

    let rows = run_show(&schema_dir, false).unwrap();
    let names: Vec<&str> = rows.iter().map(|row| row.name.as_str()).collect();
    assert_eq!(names, vec!["Voltage", "Temperature", "int16 (Temperature)"]);
    assert!(rows.iter().all(|row| !row.derived));

    let all = run_show(&schema_dir, true).unwrap();
    assert!(all.iter().any(|row| row.derived && row.name == "Telecommand"));
}

#[test]
fn explicit_directory_wins() {
    let dir = resolve_schema_dir(Some(Path::new("schemas/flight"))).unwrap();
    assert_eq!(dir, Path::new("schemas/flight"));
}
