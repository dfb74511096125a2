//! TOML project configuration.
//!
//! Stores per-project settings:
//! - The timelines and their event catalogs (name and color per label)
//! - The CSV delimiter used for `annotations.csv`
//! - The coders who worked on the project
//!
//! The file lives next to the annotations as `config.toml`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::coders::Coders;
use crate::color::Rgba;
use crate::error::{ConfigError, CoreError, ModelError};
use crate::timeline::{Event, EventId, TimelineRegistry};

/// One label of a timeline's catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventConfig {
    pub name: String,
    /// `#rrggbb` or `#rrggbbaa`.
    #[serde(default = "default_color")]
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineConfig {
    pub name: String,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

/// Project configuration.
///
/// Serialized to/from TOML at `<project>/config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default = "default_delimiter", alias = "csv-delimiter")]
    pub csv_delimiter: char,
    #[serde(default)]
    pub timelines: Vec<TimelineConfig>,
    #[serde(default)]
    pub coders: Coders,
}

fn default_delimiter() -> char {
    ','
}

fn default_color() -> String {
    Rgba::WHITE.to_hex()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            csv_delimiter: default_delimiter(),
            timelines: Vec::new(),
            coders: Coders::new(),
        }
    }
}

impl ProjectConfig {
    fn get_json_value_by_path<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: ProjectConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        debug!(path = %path.display(), timelines = cfg.timelines.len(), "project config loaded");
        Ok(cfg)
    }

    /// Load from disk, falling back to the default when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Replace the timeline section with the registry's current timelines
    /// and catalogs. Labels are written in id order so that reloading keeps
    /// their relative numbering.
    pub fn sync_timelines(&mut self, registry: &TimelineRegistry) {
        self.timelines = registry
            .timelines()
            .iter()
            .map(|t| {
                let mut events: Vec<&Event> = t.events().iter().collect();
                events.sort_by_key(|e| e.id);
                TimelineConfig {
                    name: t.name().to_string(),
                    events: events
                        .into_iter()
                        .map(|e| EventConfig {
                            name: e.name.clone(),
                            color: e.color.to_hex(),
                        })
                        .collect(),
                }
            })
            .collect();
    }

    /// A default configuration describing the registry's timelines.
    pub fn from_registry(registry: &TimelineRegistry) -> Self {
        let mut cfg = Self::default();
        cfg.sync_timelines(registry);
        cfg
    }

    /// Create the configured timelines and catalogs in `registry`.
    ///
    /// Label ids follow file order starting at 0. The last timeline created
    /// ends up selected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a malformed color and a
    /// model error for duplicate timeline or label names.
    pub fn apply_to(&self, registry: &mut TimelineRegistry) -> Result<(), CoreError> {
        for (t_index, timeline) in self.timelines.iter().enumerate() {
            let id = registry.add_timeline(timeline.name.as_str())?;
            for (index, event) in timeline.events.iter().enumerate() {
                let color: Rgba = event.color.parse().map_err(|e| ConfigError::InvalidValue {
                    key: format!("timelines.{t_index}.events.{index}.color"),
                    message: format!("{e}"),
                })?;
                let t = registry.timeline_mut(id)?;
                if t.event_by_name(&event.name).is_some() {
                    return Err(ModelError::DuplicateEvent {
                        timeline: timeline.name.clone(),
                        event: event.name.clone(),
                    }
                    .into());
                }
                t.insert_event(Event::new(EventId(index as u32), event.name.as_str(), color));
            }
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key. List entries are
    /// addressed by index, e.g. `timelines.0.name`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a scalar top-level value by key. Returns an error if the key is
    /// unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        match key {
            "csv_delimiter" | "csv-delimiter" => {
                let delimiter = parse_delimiter(value).ok_or_else(|| {
                    invalid(format!("expected a single character or \\t, got '{value}'"))
                })?;
                if delimiter == '"' || delimiter == '\n' || delimiter == '\r' {
                    return Err(invalid(format!("'{}' cannot delimit fields", delimiter.escape_default())));
                }
                self.csv_delimiter = delimiter;
                Ok(())
            }
            _ => Err(invalid("unknown config key".into())),
        }
    }
}

/// Parse a delimiter argument; `\t` and `tab` name the tab character.
pub fn parse_delimiter(value: &str) -> Option<char> {
    match value {
        "\\t" | "tab" => Some('\t'),
        _ => {
            let mut chars = value.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    const SAMPLE: &str = indoc! {r##"
        csv_delimiter = ";"

        [[timelines]]
        name = "Gaze"

        [[timelines.events]]
        name = "Look"
        color = "#0000ff"

        [[timelines.events]]
        name = "Away"
        color = "#ff000080"

        [[timelines]]
        name = "Gesture"
    "##};

    #[test]
    fn default_config_roundtrip() {
        let cfg = ProjectConfig::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: ProjectConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.csv_delimiter, ',');
        assert!(parsed.timelines.is_empty());
    }

    #[test]
    fn apply_creates_timelines_with_file_order_ids() {
        let cfg: ProjectConfig = toml::from_str(SAMPLE).unwrap();
        let mut reg = TimelineRegistry::new();
        cfg.apply_to(&mut reg).unwrap();

        assert_eq!(reg.timelines().len(), 2);
        assert_eq!(reg.selected_timeline().unwrap().name(), "Gesture");
        let gaze = reg.timeline_by_name("Gaze").unwrap();
        assert_eq!(gaze.event_by_name("Look").unwrap().id, EventId(0));
        assert_eq!(gaze.event_by_name("Away").unwrap().id, EventId(1));
        assert_eq!(gaze.event_by_name("Away").unwrap().color, Rgba::new(255, 0, 0, 128));
        // Catalog order is by name.
        assert_eq!(gaze.events()[0].name, "Away");
    }

    #[test]
    fn hyphenated_delimiter_key_is_accepted() {
        let cfg: ProjectConfig = toml::from_str("csv-delimiter = \"|\"").unwrap();
        assert_eq!(cfg.csv_delimiter, '|');
    }

    #[test]
    fn malformed_color_is_an_invalid_value() {
        let cfg: ProjectConfig = toml::from_str(indoc! {r#"
            [[timelines]]
            name = "Gaze"
            events = [{ name = "Look", color = "blue" }]
        "#})
        .unwrap();
        let err = cfg.apply_to(&mut TimelineRegistry::new()).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let cfg: ProjectConfig = toml::from_str(indoc! {r##"
            [[timelines]]
            name = "Gaze"
            events = [{ name = "Look", color = "#ffffff" }, { name = "Look", color = "#000000" }]
        "##})
        .unwrap();
        let err = cfg.apply_to(&mut TimelineRegistry::new()).unwrap_err();
        assert!(matches!(err, CoreError::Model(ModelError::DuplicateEvent { .. })));
    }

    #[test]
    fn from_registry_preserves_catalogs() {
        let cfg: ProjectConfig = toml::from_str(SAMPLE).unwrap();
        let mut reg = TimelineRegistry::new();
        cfg.apply_to(&mut reg).unwrap();

        let exported = ProjectConfig::from_registry(&reg);
        assert_eq!(exported.timelines, cfg.timelines);
    }

    #[test]
    fn get_and_set_by_key() {
        let mut cfg: ProjectConfig = toml::from_str(SAMPLE).unwrap();
        assert_eq!(cfg.get("csv_delimiter").as_deref(), Some(";"));
        assert_eq!(cfg.get("timelines.0.events.1.name").as_deref(), Some("Away"));
        assert_eq!(cfg.get("timelines.5.name"), None);

        cfg.set("csv_delimiter", "\\t").unwrap();
        assert_eq!(cfg.csv_delimiter, '\t');
        assert!(cfg.set("csv_delimiter", "ab").is_err());
        assert!(cfg.set("csv_delimiter", "\"").is_err());
        assert!(cfg.set("nonexistent", "x").is_err());
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg: ProjectConfig = toml::from_str(SAMPLE).unwrap();
        cfg.save(&path).unwrap();
        assert_eq!(ProjectConfig::load(&path).unwrap(), cfg);

        let missing = dir.path().join("missing.toml");
        assert!(matches!(ProjectConfig::load(&missing), Err(ConfigError::LoadFailed { .. })));
        assert_eq!(ProjectConfig::load_or_default(&missing).unwrap(), ProjectConfig::default());
    }
}
