//! Saved templates stored as `<data_dir>/templates/<id>.json`.

use std::path::PathBuf;

use tafel_core::SavedTemplate;
use tafel_engine::{RepoError, TemplateFilter, TemplateRepository};

use crate::json_dir::JsonDir;

/// Subdirectory of the data directory holding template files.
pub const TEMPLATES_SUBDIR: &str = "templates";

/// [`TemplateRepository`] over a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FileTemplateRepository {
    docs: JsonDir<SavedTemplate>,
}

impl FileTemplateRepository {
    /// Store templates in the `templates` subdirectory of `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs: JsonDir::new(data_dir.into().join(TEMPLATES_SUBDIR), "template"),
        }
    }
}

impl TemplateRepository for FileTemplateRepository {
    fn save(&self, template: &SavedTemplate) -> Result<(), RepoError> {
        self.docs.write(template.id(), template)
    }

    fn get_by_id(&self, id: &str) -> Result<Option<SavedTemplate>, RepoError> {
        self.docs.read(id)
    }

    fn update(&self, template: &SavedTemplate) -> Result<(), RepoError> {
        if !self.docs.exists(template.id())? {
            return Err(self.docs.not_found(template.id()));
        }
        self.docs.write(template.id(), template)
    }

    fn list(&self, filter: &TemplateFilter) -> Result<Vec<SavedTemplate>, RepoError> {
        let mut templates = self.docs.read_all()?;
        templates.retain(|t| filter.matches(t));
        Ok(templates)
    }

    fn delete(&self, id: &str) -> Result<(), RepoError> {
        self.docs.remove(id)
    }
}
