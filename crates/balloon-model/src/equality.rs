//! Structural comparison of two schemas.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::collection::{Element, ElementCollection};
use crate::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Units,
    Constants,
    Types,
    Configurations,
    Telecommands,
    TelemetryTypes,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Units => "units",
            Self::Constants => "constants",
            Self::Types => "types",
            Self::Configurations => "configurations",
            Self::Telecommands => "telecommands",
            Self::TelemetryTypes => "telemetry types",
        };
        f.write_str(label)
    }
}

/// One difference between two schemas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDifference {
    pub section: Section,
    pub entry: String,
    pub detail: String,
}

impl SchemaDifference {
    fn new(section: Section, entry: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            section,
            entry: entry.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for SchemaDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.section, self.entry, self.detail)
    }
}

/// List every difference between `left` and `right`.
///
/// Derived types and constants are skipped; they follow from the
/// collections, which are compared position by position including
/// identifiers.
pub fn diff(left: &Schema, right: &Schema) -> Vec<SchemaDifference> {
    let mut out = Vec::new();
    diff_entries(
        Section::Units,
        left.units().iter().map(|unit| (unit.name(), unit)),
        right.units().iter().map(|unit| (unit.name(), unit)),
        &mut out,
    );
    diff_entries(
        Section::Constants,
        left.constants()
            .user_constants()
            .map(|constant| (constant.name.as_str(), constant)),
        right
            .constants()
            .user_constants()
            .map(|constant| (constant.name.as_str(), constant)),
        &mut out,
    );
    diff_entries(
        Section::Types,
        left.types()
            .user_types()
            .map(|descriptor| (descriptor.name.as_str(), descriptor)),
        right
            .types()
            .user_types()
            .map(|descriptor| (descriptor.name.as_str(), descriptor)),
        &mut out,
    );
    diff_collection(
        Section::Configurations,
        left.configurations(),
        right.configurations(),
        &mut out,
    );
    diff_collection(
        Section::Telecommands,
        left.telecommands(),
        right.telecommands(),
        &mut out,
    );
    diff_collection(
        Section::TelemetryTypes,
        left.telemetry_types(),
        right.telemetry_types(),
        &mut out,
    );
    out
}

pub fn equals(left: &Schema, right: &Schema) -> bool {
    diff(left, right).is_empty()
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        equals(self, other)
    }
}

fn diff_entries<'a, V: PartialEq + 'a>(
    section: Section,
    left: impl Iterator<Item = (&'a str, &'a V)>,
    right: impl Iterator<Item = (&'a str, &'a V)>,
    out: &mut Vec<SchemaDifference>,
) {
    let left: BTreeMap<&str, &V> = left.collect();
    let right: BTreeMap<&str, &V> = right.collect();
    for (name, value) in &left {
        match right.get(name) {
            None => out.push(SchemaDifference::new(section, *name, "only on the left")),
            Some(other) if other != value => {
                out.push(SchemaDifference::new(section, *name, "definitions differ"));
            }
            Some(_) => {}
        }
    }
    for name in right.keys().filter(|name| !left.contains_key(*name)) {
        out.push(SchemaDifference::new(section, *name, "only on the right"));
    }
}

fn diff_collection<T: Element + PartialEq>(
    section: Section,
    left: &ElementCollection<T>,
    right: &ElementCollection<T>,
    out: &mut Vec<SchemaDifference>,
) {
    if left.len() != right.len() {
        out.push(SchemaDifference::new(
            section,
            "length",
            format!("{} != {}", left.len(), right.len()),
        ));
    }
    for (position, (l, r)) in left.iter().zip(right.iter()).enumerate() {
        if l.id() != r.id() {
            out.push(SchemaDifference::new(
                section,
                l.name(),
                format!("identifier {} != {}", l.id(), r.id()),
            ));
        }
        if l.name() != r.name() {
            out.push(SchemaDifference::new(
                section,
                format!("#{position}"),
                format!("name {} != {}", l.name(), r.name()),
            ));
        } else if l != r {
            out.push(SchemaDifference::new(section, l.name(), "fields differ"));
        }
    }
}
