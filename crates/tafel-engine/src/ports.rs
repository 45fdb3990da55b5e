//! Repository ports consumed by the use cases.
//!
//! Only `get_by_id` and `list` are needed for resolution; the rest serve the
//! CRUD services. Implementations live in this crate ([`crate::memory`]) and
//! in `tafel-store`.

use serde::{Deserialize, Serialize};
use tafel_core::{RandomTable, SavedTemplate};

use crate::error::RepoError;

/// Exact-match criteria for listing tables. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableFilter {
    /// Table name must equal this.
    #[serde(default)]
    pub name: Option<String>,
    /// Table must hold exactly this many entries.
    #[serde(default)]
    pub entry_count: Option<usize>,
}

impl TableFilter {
    /// Filter on an exact table name.
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// True if `table` satisfies every set criterion.
    pub fn matches(&self, table: &RandomTable) -> bool {
        self.name.as_deref().is_none_or(|n| table.name() == n)
            && self.entry_count.is_none_or(|c| table.len() == c)
    }
}

/// Exact-match criteria for listing saved templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFilter {
    /// Template name must equal this.
    #[serde(default)]
    pub name: Option<String>,
}

impl TemplateFilter {
    /// True if `template` satisfies every set criterion.
    pub fn matches(&self, template: &SavedTemplate) -> bool {
        self.name.as_deref().is_none_or(|n| template.name() == n)
    }
}

/// Storage for random tables.
#[cfg_attr(test, mockall::automock)]
pub trait TableRepository: Send + Sync {
    /// Insert or replace a table.
    fn save(&self, table: &RandomTable) -> Result<(), RepoError>;
    /// Fetch a table, `None` if absent.
    fn get_by_id(&self, id: &str) -> Result<Option<RandomTable>, RepoError>;
    /// Replace an existing table. Fails with `NotFound` if absent.
    fn update(&self, table: &RandomTable) -> Result<(), RepoError>;
    /// All tables matching `filter`.
    fn list(&self, filter: &TableFilter) -> Result<Vec<RandomTable>, RepoError>;
    /// Remove a table. Fails with `NotFound` if absent.
    fn delete(&self, id: &str) -> Result<(), RepoError>;
}

/// Storage for saved templates.
#[cfg_attr(test, mockall::automock)]
pub trait TemplateRepository: Send + Sync {
    /// Insert or replace a template.
    fn save(&self, template: &SavedTemplate) -> Result<(), RepoError>;
    /// Fetch a template, `None` if absent.
    fn get_by_id(&self, id: &str) -> Result<Option<SavedTemplate>, RepoError>;
    /// Replace an existing template. Fails with `NotFound` if absent.
    fn update(&self, template: &SavedTemplate) -> Result<(), RepoError>;
    /// All templates matching `filter`.
    fn list(&self, filter: &TemplateFilter) -> Result<Vec<SavedTemplate>, RepoError>;
    /// Remove a template. Fails with `NotFound` if absent.
    fn delete(&self, id: &str) -> Result<(), RepoError>;
}
