//! A project directory: `config.toml` plus `annotations.csv`.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::csv::{export_csv, import_csv_str, ImportReport};
use super::{ProjectConfig, CONFIG_FILE, CSV_FILE};
use crate::error::{ConfigError, Result};
use crate::timeline::TimelineRegistry;

/// An opened project: its configuration and the registry built from it.
#[derive(Debug)]
pub struct Project {
    dir: PathBuf,
    config: ProjectConfig,
    registry: TimelineRegistry,
    last_import: Option<ImportReport>,
}

impl Project {
    /// Create a project with a default configuration and a header-only CSV.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AlreadyExists`] if the directory already holds
    /// a configuration, or an IO error if files cannot be written.
    pub fn init(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config_path = dir.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(ConfigError::AlreadyExists(config_path).into());
        }
        fs::create_dir_all(&dir)?;

        let project = Self {
            dir,
            config: ProjectConfig::default(),
            registry: TimelineRegistry::new(),
            last_import: None,
        };
        project.config.save(&config_path)?;
        project.write_csv()?;
        info!(dir = %project.dir.display(), "project initialized");
        Ok(project)
    }

    /// Load the configuration, then import the CSV when there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is missing or invalid, or if the
    /// CSV cannot be parsed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let config = ProjectConfig::load(&dir.join(CONFIG_FILE))?;
        let mut registry = TimelineRegistry::new();
        config.apply_to(&mut registry)?;

        let csv_path = dir.join(CSV_FILE);
        let last_import = if csv_path.exists() {
            let text = fs::read_to_string(&csv_path)?;
            if text.trim().is_empty() {
                None
            } else {
                Some(import_csv_str(&mut registry, &text, config.csv_delimiter)?)
            }
        } else {
            None
        };
        registry.mark_saved();
        debug!(dir = %dir.display(), timelines = registry.timelines().len(), "project opened");

        Ok(Self {
            dir,
            config,
            registry,
            last_import,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(CSV_FILE)
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ProjectConfig {
        &mut self.config
    }

    pub fn registry(&self) -> &TimelineRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut TimelineRegistry {
        &mut self.registry
    }

    /// Report of the CSV import done by [`Project::open`].
    pub fn last_import(&self) -> Option<ImportReport> {
        self.last_import
    }

    pub fn needs_save(&self) -> bool {
        self.registry.needs_save()
    }

    /// Write the configuration (timelines taken from the registry) and the
    /// CSV. `coder` is recorded as having saved now.
    pub fn save(&mut self, coder: Option<(&str, &str)>) -> Result<()> {
        self.config.sync_timelines(&self.registry);
        if let Some((name, email)) = coder {
            self.config.coders.touch(name, email);
        }
        self.config.save(&self.config_path())?;
        self.write_csv()?;
        self.registry.mark_saved();
        debug!(dir = %self.dir.display(), "project saved");
        Ok(())
    }

    /// Export the annotations to an arbitrary file using the project's
    /// delimiter. Returns the number of rows written.
    pub fn export_to(&self, path: &Path) -> Result<usize> {
        let mut file = fs::File::create(path)?;
        export_csv(&self.registry, &mut file, self.config.csv_delimiter)
    }

    fn write_csv(&self) -> Result<usize> {
        self.export_to(&self.csv_path())
    }
}
