//! File names and column headers of a schema directory.

pub const UNITS_FILE: &str = "units.csv";
pub const CONSTANTS_FILE: &str = "sharedConstants.csv";
pub const CONFIGURATIONS_FILE: &str = "configuration.csv";
pub const TELEMETRY_FILE: &str = "telemetry.csv";
pub const TELEMETRY_ARGUMENTS_DIR: &str = "telemetryArguments";
pub const TELECOMMANDS_FILE: &str = "commands.csv";
pub const TELECOMMAND_ARGUMENTS_DIR: &str = "commandArguments";
pub const TYPES_FILE: &str = "sharedDataTypes.json";

pub const NAME: &str = "Name";
pub const TYPE: &str = "Type";
pub const VALUE: &str = "Value";
pub const DESCRIPTION: &str = "Description";
pub const DEFAULT: &str = "Default";
pub const DEFAULT_VALUE: &str = "Default Value";
pub const DEBUG: &str = "Debug";
pub const RESPONSE_NAME: &str = "Response name";
pub const RESPONSE_TYPE: &str = "Response type";
pub const RESPONSE_DESCRIPTION: &str = "Response description";

pub const UNITS_HEADER: [&str; 3] = [NAME, TYPE, DESCRIPTION];
pub const CONSTANTS_HEADER: [&str; 4] = [NAME, VALUE, TYPE, DESCRIPTION];
pub const CONFIGURATIONS_HEADER: [&str; 4] = [NAME, TYPE, DEFAULT_VALUE, DESCRIPTION];
pub const TELEMETRY_HEADER: [&str; 2] = [NAME, DESCRIPTION];
pub const TELEMETRY_ARGUMENTS_HEADER: [&str; 3] = [NAME, TYPE, DESCRIPTION];
pub const TELECOMMANDS_HEADER: [&str; 6] = [
    NAME,
    DEBUG,
    DESCRIPTION,
    RESPONSE_NAME,
    RESPONSE_TYPE,
    RESPONSE_DESCRIPTION,
];
pub const TELECOMMAND_ARGUMENTS_HEADER: [&str; 4] = [NAME, TYPE, DEFAULT, DESCRIPTION];

/// File name of the per-element argument table.
pub fn arguments_file_name(element_name: &str) -> String {
    format!("{element_name}.csv")
}
