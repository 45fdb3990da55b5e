//! Ad-hoc rolls on a stored table.

use std::sync::Arc;

use tafel_core::{RandomSource, RollResult};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::ports::TableRepository;
use crate::resolver::TemplateResolver;

/// Rolls on tables and resolves any template results.
pub struct RollService {
    tables: Arc<dyn TableRepository>,
}

impl RollService {
    /// Create a service over `tables`.
    pub fn new(tables: Arc<dyn TableRepository>) -> Self {
        Self { tables }
    }

    /// Roll `count` times on the table `table_id`.
    ///
    /// Each result whose content is a template carries its resolved text in
    /// `resolved_content`. Rejects an empty ID or a zero count before
    /// touching the repository.
    pub fn roll(
        &self,
        table_id: &str,
        count: u32,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<Vec<RollResult>> {
        if table_id.is_empty() {
            return Err(EngineError::InvalidArgument(
                "table ID is required".to_string(),
            ));
        }
        if count == 0 {
            return Err(EngineError::InvalidArgument(
                "count must be at least 1".to_string(),
            ));
        }

        let table = self
            .tables
            .get_by_id(table_id)?
            .ok_or_else(|| EngineError::table_not_found(table_id))?;

        let mut results = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let result = table.roll(&mut *rng)?;
            debug!(table = table_id, entry = %result.entry_id, "rolled");
            let result = TemplateResolver::new(self.tables.as_ref(), &mut *rng)
                .resolve_roll(&table, result)?;
            results.push(result);
        }
        Ok(results)
    }
}
