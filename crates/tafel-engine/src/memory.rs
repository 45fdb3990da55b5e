//! In-memory repositories, preserving insertion order.

use std::sync::{PoisonError, RwLock};

use tafel_core::{RandomTable, SavedTemplate};

use crate::error::RepoError;
use crate::ports::{TableFilter, TableRepository, TemplateFilter, TemplateRepository};

fn poisoned<T>(operation: &'static str) -> impl FnOnce(PoisonError<T>) -> RepoError {
    move |e: PoisonError<T>| RepoError::Storage {
        operation,
        message: e.to_string(),
    }
}

/// Tables held in a `Vec` behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryTableRepository {
    tables: RwLock<Vec<RandomTable>>,
}

impl InMemoryTableRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every table.
    pub fn clear(&self) -> Result<(), RepoError> {
        self.tables.write().map_err(poisoned("clear"))?.clear();
        Ok(())
    }
}

impl TableRepository for InMemoryTableRepository {
    fn save(&self, table: &RandomTable) -> Result<(), RepoError> {
        let mut tables = self.tables.write().map_err(poisoned("save"))?;
        match tables.iter_mut().find(|t| t.id() == table.id()) {
            Some(slot) => *slot = table.clone(),
            None => tables.push(table.clone()),
        }
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<RandomTable>, RepoError> {
        let tables = self.tables.read().map_err(poisoned("get_by_id"))?;
        Ok(tables.iter().find(|t| t.id() == id).cloned())
    }

    fn update(&self, table: &RandomTable) -> Result<(), RepoError> {
        let mut tables = self.tables.write().map_err(poisoned("update"))?;
        let slot = tables
            .iter_mut()
            .find(|t| t.id() == table.id())
            .ok_or_else(|| RepoError::NotFound {
                entity_type: "table",
                id: table.id().to_string(),
            })?;
        *slot = table.clone();
        Ok(())
    }

    fn list(&self, filter: &TableFilter) -> Result<Vec<RandomTable>, RepoError> {
        let tables = self.tables.read().map_err(poisoned("list"))?;
        Ok(tables.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut tables = self.tables.write().map_err(poisoned("delete"))?;
        let before = tables.len();
        tables.retain(|t| t.id() != id);
        if tables.len() == before {
            return Err(RepoError::NotFound {
                entity_type: "table",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

/// Saved templates held in a `Vec` behind a lock.
#[derive(Debug, Default)]
pub struct InMemoryTemplateRepository {
    templates: RwLock<Vec<SavedTemplate>>,
}

impl InMemoryTemplateRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every template.
    pub fn clear(&self) -> Result<(), RepoError> {
        self.templates.write().map_err(poisoned("clear"))?.clear();
        Ok(())
    }
}

impl TemplateRepository for InMemoryTemplateRepository {
    fn save(&self, template: &SavedTemplate) -> Result<(), RepoError> {
        let mut templates = self.templates.write().map_err(poisoned("save"))?;
        match templates.iter_mut().find(|t| t.id() == template.id()) {
            Some(slot) => *slot = template.clone(),
            None => templates.push(template.clone()),
        }
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<SavedTemplate>, RepoError> {
        let templates = self.templates.read().map_err(poisoned("get_by_id"))?;
        Ok(templates.iter().find(|t| t.id() == id).cloned())
    }

    fn update(&self, template: &SavedTemplate) -> Result<(), RepoError> {
        let mut templates = self.templates.write().map_err(poisoned("update"))?;
        let slot = templates
            .iter_mut()
            .find(|t| t.id() == template.id())
            .ok_or_else(|| RepoError::NotFound {
                entity_type: "template",
                id: template.id().to_string(),
            })?;
        *slot = template.clone();
        Ok(())
    }

    fn list(&self, filter: &TemplateFilter) -> Result<Vec<SavedTemplate>, RepoError> {
        let templates = self.templates.read().map_err(poisoned("list"))?;
        Ok(templates.iter().filter(|t| filter.matches(t)).cloned().collect())
    }

    fn delete(&self, id: &str) -> Result<(), RepoError> {
        let mut templates = self.templates.write().map_err(poisoned("delete"))?;
        let before = templates.len();
        templates.retain(|t| t.id() != id);
        if templates.len() == before {
            return Err(RepoError::NotFound {
                entity_type: "template",
                id: id.to_string(),
            });
        }
        Ok(())
    }
}
