//! On-disk project storage: the TOML configuration, the annotation CSV and
//! the project directory tying them together.

mod config;
pub mod csv;
mod project;

pub use config::{parse_delimiter, EventConfig, ProjectConfig, TimelineConfig};
pub use csv::{export_csv, import_csv, import_csv_str, to_csv_string, ImportReport, CSV_HEADERS};
pub use project::Project;

/// Configuration file name inside a project directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Annotation file name inside a project directory.
pub const CSV_FILE: &str = "annotations.csv";
