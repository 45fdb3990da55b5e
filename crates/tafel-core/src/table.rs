use serde::{Deserialize, Serialize};

use crate::entry::{EntryPatch, TableEntry};
use crate::error::{CoreError, CoreResult};
use crate::random::RandomSource;
use crate::roll::RollResult;

/// A named, rollable collection of weighted and/or ranged entries.
///
/// Entries keep insertion order; both selection passes walk them in that
/// order, so the order is part of a table's observable behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable")]
pub struct RandomTable {
    id: String,
    name: String,
    description: String,
    entries: Vec<TableEntry>,
}

#[derive(Deserialize)]
struct RawTable {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    entries: Vec<TableEntry>,
}

impl TryFrom<RawTable> for RandomTable {
    type Error = CoreError;

    fn try_from(raw: RawTable) -> CoreResult<Self> {
        RandomTable::with_entries(raw.id, raw.name, raw.description, raw.entries)
    }
}

impl RandomTable {
    /// Create an empty table. ID and name must be non-empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> CoreResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.is_empty() {
            return Err(CoreError::MissingTableId);
        }
        if name.is_empty() {
            return Err(CoreError::MissingTableName);
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            entries: Vec::new(),
        })
    }

    /// Create a table and add `entries` in order, rejecting duplicate IDs.
    pub fn with_entries(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        entries: impl IntoIterator<Item = TableEntry>,
    ) -> CoreResult<Self> {
        let mut table = Self::new(id, name, description)?;
        for entry in entries {
            table.add_entry(entry)?;
        }
        Ok(table)
    }

    /// Table identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Table name, used as a fallback lookup key by references.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[TableEntry] {
        &self.entries
    }

    /// Look up an entry by ID.
    pub fn entry(&self, entry_id: &str) -> Option<&TableEntry> {
        self.entries.iter().find(|e| e.id() == entry_id)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all entry weights; 0 for an empty table.
    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(TableEntry::weight).sum()
    }

    /// Rename the table. The name must stay non-empty.
    pub fn rename(&mut self, name: impl Into<String>) -> CoreResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(CoreError::MissingTableName);
        }
        self.name = name;
        Ok(())
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Append an entry. Fails if its ID is already taken.
    pub fn add_entry(&mut self, entry: TableEntry) -> CoreResult<()> {
        if self.entry(entry.id()).is_some() {
            return Err(CoreError::DuplicateEntry(entry.id().to_string()));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove an entry and return it.
    pub fn remove_entry(&mut self, entry_id: &str) -> CoreResult<TableEntry> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id() == entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        Ok(self.entries.remove(index))
    }

    /// Replace an entry with a patched copy, keeping its position.
    pub fn update_entry(&mut self, entry_id: &str, patch: &EntryPatch) -> CoreResult<()> {
        let slot = self
            .entries
            .iter_mut()
            .find(|e| e.id() == entry_id)
            .ok_or_else(|| CoreError::EntryNotFound(entry_id.to_string()))?;
        *slot = slot.update(patch)?;
        Ok(())
    }

    /// Select one entry using a single draw `u` from `rng`.
    ///
    /// If any entry declares a range, `v = floor(u * M) + 1` is computed
    /// where `M` is the largest declared upper bound, and the first entry
    /// whose range contains `v` wins. When no range contains `v` (gaps in
    /// coverage) or no entry declares a range, a weighted pick over *all*
    /// entries is made instead: `r = u * total_weight` is walked down by
    /// each entry's weight until it reaches `<= 0`. If rounding leaves `r`
    /// positive after the last entry, the first entry is returned.
    pub fn roll<R>(&self, rng: &mut R) -> CoreResult<RollResult>
    where
        R: RandomSource + ?Sized,
    {
        let first = self
            .entries
            .first()
            .ok_or_else(|| CoreError::EmptyTable(self.id.clone()))?;

        let draw = rng.uniform();

        if let Some(max) = self.entries.iter().filter_map(|e| e.range()).map(|r| r.max()).max() {
            let value = (draw * max as f64).floor() as i64 + 1;
            if let Some(entry) = self.entries.iter().find(|e| e.is_in_range(value)) {
                return Ok(self.result_for(entry));
            }
        }

        let mut remaining = draw * self.total_weight();
        for entry in &self.entries {
            remaining -= entry.weight();
            if remaining <= 0.0 {
                return Ok(self.result_for(entry));
            }
        }

        Ok(self.result_for(first))
    }

    fn result_for(&self, entry: &TableEntry) -> RollResult {
        RollResult::new(
            self.id.clone(),
            entry.id(),
            entry.content(),
            entry.is_template(),
        )
    }
}
