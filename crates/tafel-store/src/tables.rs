//! Tables stored as `<data_dir>/<id>.json`.

use std::path::{Path, PathBuf};

use tafel_core::RandomTable;
use tafel_engine::{RepoError, TableFilter, TableRepository};

use crate::json_dir::JsonDir;

/// [`TableRepository`] over a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileTableRepository {
    docs: JsonDir<RandomTable>,
}

impl FileTableRepository {
    /// Store tables directly inside `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs: JsonDir::new(data_dir, "table"),
        }
    }

    /// The directory holding the table files.
    pub fn data_dir(&self) -> &Path {
        self.docs.dir()
    }
}

impl TableRepository for FileTableRepository {
    fn save(&self, table: &RandomTable) -> Result<(), RepoError> {
        self.docs.write(table.id(), table)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<RandomTable>, RepoError> {
        self.docs.read(id)
    }

    fn update(&self, table: &RandomTable) -> Result<(), RepoError> {
        if !self.docs.exists(table.id())? {
            return Err(self.docs.not_found(table.id()));
        }
        self.docs.write(table.id(), table)
    }

    fn list(&self, filter: &TableFilter) -> Result<Vec<RandomTable>, RepoError> {
        let mut tables = self.docs.read_all()?;
        tables.retain(|t| filter.matches(t));
        Ok(tables)
    }

    fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.docs.remove(id)
    }
}
