//! Runtime configuration resolved from flags and the environment.

use std::path::PathBuf;
use std::sync::Arc;

use tafel_core::SeededRandom;
use tafel_engine::{RollService, TableService, TemplateService};
use tafel_store::{FileTableRepository, FileTemplateRepository};

/// Data directory used when neither `--data-dir` nor `TAFEL_DATA_DIR` is set.
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Configuration shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding table and template files.
    pub data_dir: PathBuf,
    /// RNG seed for reproducible rolls; entropy when unset.
    pub seed: Option<u64>,
    /// Print JSON instead of formatted text.
    pub json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            seed: None,
            json: false,
        }
    }
}

impl CliConfig {
    /// Set the data directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable JSON output.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// A random source honoring the configured seed.
    pub fn rng(&self) -> SeededRandom {
        match self.seed {
            Some(seed) => SeededRandom::from_seed(seed),
            None => SeededRandom::from_entropy(),
        }
    }

    fn tables(&self) -> Arc<FileTableRepository> {
        Arc::new(FileTableRepository::new(&self.data_dir))
    }

    /// Table CRUD over the data directory.
    pub fn table_service(&self) -> TableService {
        TableService::new(self.tables())
    }

    /// Rolls over the data directory.
    pub fn roll_service(&self) -> RollService {
        RollService::new(self.tables())
    }

    /// Template CRUD and evaluation over the data directory.
    pub fn template_service(&self) -> TemplateService {
        TemplateService::new(
            Arc::new(FileTemplateRepository::new(&self.data_dir)),
            self.tables(),
        )
    }
}
