//! Table lifecycle: create, read, patch, delete.

use std::sync::Arc;

use tafel_core::{EntryPatch, RandomTable, TableEntry};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ports::{TableFilter, TableRepository};

/// Changes applied by [`TableService::update_table`].
///
/// Name and description are applied first, then entries are added, then
/// patched, then removed. The first invalid step aborts the whole update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableUpdate {
    /// New table name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// Entries to append.
    pub add: Vec<TableEntry>,
    /// `(entry ID, patch)` pairs.
    pub update: Vec<(String, EntryPatch)>,
    /// IDs of entries to remove.
    pub remove: Vec<String>,
}

/// CRUD over stored tables.
pub struct TableService {
    tables: Arc<dyn TableRepository>,
}

impl TableService {
    /// Create a service over `tables`.
    pub fn new(tables: Arc<dyn TableRepository>) -> Self {
        Self { tables }
    }

    /// Create and store a table under a fresh UUID.
    pub fn create_table(
        &self,
        name: &str,
        description: &str,
        entries: Vec<TableEntry>,
    ) -> EngineResult<RandomTable> {
        let id = Uuid::new_v4().to_string();
        let table = RandomTable::with_entries(id, name, description, entries)?;
        self.tables.save(&table)?;
        debug!(table = table.id(), entries = table.len(), "created table");
        Ok(table)
    }

    /// Store a fully built table as-is, replacing any table with its ID.
    pub fn import_table(&self, table: &RandomTable) -> EngineResult<()> {
        self.tables.save(table)?;
        debug!(table = table.id(), entries = table.len(), "imported table");
        Ok(())
    }

    /// Fetch a table by ID.
    pub fn get_table(&self, id: &str) -> EngineResult<Option<RandomTable>> {
        require_id(id)?;
        Ok(self.tables.get_by_id(id)?)
    }

    /// All tables matching `filter`.
    pub fn list_tables(&self, filter: &TableFilter) -> EngineResult<Vec<RandomTable>> {
        Ok(self.tables.list(filter)?)
    }

    /// Apply `changes` to the table `id` and store the result.
    pub fn update_table(&self, id: &str, changes: TableUpdate) -> EngineResult<RandomTable> {
        require_id(id)?;
        let mut table = self
            .tables
            .get_by_id(id)?
            .ok_or_else(|| EngineError::table_not_found(id))?;

        if let Some(name) = changes.name {
            table.rename(name)?;
        }
        if let Some(description) = changes.description {
            table.set_description(description);
        }
        for entry in changes.add {
            table.add_entry(entry)?;
        }
        for (entry_id, patch) in &changes.update {
            table.update_entry(entry_id, patch)?;
        }
        for entry_id in &changes.remove {
            table.remove_entry(entry_id)?;
        }

        self.tables.update(&table)?;
        debug!(table = id, entries = table.len(), "updated table");
        Ok(table)
    }

    /// Delete the table `id`.
    pub fn delete_table(&self, id: &str) -> EngineResult<()> {
        require_id(id)?;
        if self.tables.get_by_id(id)?.is_none() {
            return Err(EngineError::table_not_found(id));
        }
        self.tables.delete(id)?;
        debug!(table = id, "deleted table");
        Ok(())
    }
}

fn require_id(id: &str) -> EngineResult<()> {
    if id.is_empty() {
        return Err(EngineError::InvalidArgument(
            "table ID is required".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryTableRepository;
    use tafel_core::CoreError;

    fn service() -> TableService {
        TableService::new(Arc::new(InMemoryTableRepository::new()))
    }

    #[test]
    fn create_assigns_uuid_and_stores() {
        let svc = service();
        let table = svc
            .create_table("Colors", "", vec![TableEntry::simple("red", "Red")])
            .unwrap();
        assert!(Uuid::parse_str(table.id()).is_ok());
        assert_eq!(svc.get_table(table.id()).unwrap(), Some(table));
    }

    #[test]
    fn create_validates() {
        let svc = service();
        assert!(matches!(
            svc.create_table("", "", vec![]),
            Err(EngineError::Domain(CoreError::MissingTableName))
        ));
        assert!(svc.list_tables(&TableFilter::default()).unwrap().is_empty());
    }

    #[test]
    fn update_applies_changes_in_order() {
        let svc = service();
        let table = svc
            .create_table(
                "Colors",
                "",
                vec![TableEntry::simple("red", "Red"), TableEntry::simple("blue", "Blue")],
            )
            .unwrap();

        let updated = svc
            .update_table(
                table.id(),
                TableUpdate {
                    name: Some("Hues".to_string()),
                    description: Some("warm and cool".to_string()),
                    add: vec![TableEntry::simple("green", "Green")],
                    update: vec![(
                        "green".to_string(),
                        EntryPatch {
                            content: Some("Emerald".to_string()),
                            ..EntryPatch::default()
                        },
                    )],
                    remove: vec!["red".to_string()],
                },
            )
            .unwrap();

        assert_eq!(updated.name(), "Hues");
        assert_eq!(updated.description(), "warm and cool");
        let ids: Vec<&str> = updated.entries().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec!["blue", "green"]);
        assert_eq!(updated.entry("green").unwrap().content(), "Emerald");
        assert_eq!(svc.get_table(table.id()).unwrap(), Some(updated));
    }

    #[test]
    fn failed_update_stores_nothing() {
        let svc = service();
        let table = svc
            .create_table("Colors", "", vec![TableEntry::simple("red", "Red")])
            .unwrap();
        let result = svc.update_table(
            table.id(),
            TableUpdate {
                name: Some("Changed".to_string()),
                remove: vec!["missing".to_string()],
                ..TableUpdate::default()
            },
        );
        assert!(matches!(
            result,
            Err(EngineError::Domain(CoreError::EntryNotFound(_)))
        ));
        assert_eq!(svc.get_table(table.id()).unwrap().unwrap().name(), "Colors");
    }

    #[test]
    fn update_and_delete_missing_table() {
        let svc = service();
        assert!(matches!(
            svc.update_table("nope", TableUpdate::default()),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            svc.delete_table("nope"),
            Err(EngineError::NotFound { .. })
        ));
        assert!(matches!(
            svc.get_table(""),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn import_keeps_id_and_delete_removes() {
        let svc = service();
        let table = RandomTable::new("colors", "Colors", "").unwrap();
        svc.import_table(&table).unwrap();
        assert!(svc.get_table("colors").unwrap().is_some());
        svc.delete_table("colors").unwrap();
        assert!(svc.get_table("colors").unwrap().is_none());
    }
}
