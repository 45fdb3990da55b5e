//! Saved templates and their evaluation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tafel_core::{RandomSource, RollTemplate, SavedTemplate};
use tracing::debug;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::ports::{TableRepository, TemplateFilter, TemplateRepository};
use crate::resolver::TemplateResolver;

/// One evaluation of a saved template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateEvaluation {
    /// The stored template text.
    pub original_template: String,
    /// The text after resolution.
    pub evaluated_template: String,
}

/// Changes applied by [`TemplateService::update_template`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateUpdate {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New template text.
    pub template: Option<String>,
}

/// CRUD over saved templates, plus evaluation against stored tables.
pub struct TemplateService {
    templates: Arc<dyn TemplateRepository>,
    tables: Arc<dyn TableRepository>,
}

impl TemplateService {
    /// Create a service over both repositories.
    pub fn new(templates: Arc<dyn TemplateRepository>, tables: Arc<dyn TableRepository>) -> Self {
        Self { templates, tables }
    }

    /// Create and store a template under a fresh UUID.
    pub fn create_template(
        &self,
        name: &str,
        description: &str,
        template: &str,
    ) -> EngineResult<SavedTemplate> {
        let saved = SavedTemplate::new(Uuid::new_v4().to_string(), name, description, template)?;
        self.templates.save(&saved)?;
        debug!(template = saved.id(), "created template");
        Ok(saved)
    }

    /// Fetch a template by ID.
    pub fn get_template(&self, id: &str) -> EngineResult<Option<SavedTemplate>> {
        require_id(id)?;
        Ok(self.templates.get_by_id(id)?)
    }

    /// All templates matching `filter`.
    pub fn list_templates(&self, filter: &TemplateFilter) -> EngineResult<Vec<SavedTemplate>> {
        Ok(self.templates.list(filter)?)
    }

    /// Apply `changes` to the template `id` and store the result.
    pub fn update_template(
        &self,
        id: &str,
        changes: TemplateUpdate,
    ) -> EngineResult<SavedTemplate> {
        let current = self.require_template(id)?;
        let updated = SavedTemplate::new(
            current.id(),
            changes.name.as_deref().unwrap_or(current.name()),
            changes.description.as_deref().unwrap_or(current.description()),
            changes
                .template
                .map(RollTemplate::from)
                .unwrap_or_else(|| current.template().clone()),
        )?;
        self.templates.update(&updated)?;
        debug!(template = id, "updated template");
        Ok(updated)
    }

    /// Delete the template `id`.
    pub fn delete_template(&self, id: &str) -> EngineResult<()> {
        self.require_template(id)?;
        self.templates.delete(id)?;
        debug!(template = id, "deleted template");
        Ok(())
    }

    /// Evaluate the template `id` `count` times.
    ///
    /// Every evaluation is an independent resolution chain; nothing about
    /// visited tables carries over from one to the next.
    pub fn evaluate_template(
        &self,
        id: &str,
        count: u32,
        rng: &mut dyn RandomSource,
    ) -> EngineResult<Vec<TemplateEvaluation>> {
        require_id(id)?;
        if count == 0 {
            return Err(EngineError::InvalidArgument(
                "count must be at least 1".to_string(),
            ));
        }
        let saved = self.require_template(id)?;

        let mut resolver = TemplateResolver::new(self.tables.as_ref(), rng);
        let mut evaluations = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let evaluated = resolver.resolve_template(saved.template())?;
            evaluations.push(TemplateEvaluation {
                original_template: saved.template().to_string(),
                evaluated_template: evaluated,
            });
        }
        debug!(template = id, count, "evaluated template");
        Ok(evaluations)
    }

    fn require_template(&self, id: &str) -> EngineResult<SavedTemplate> {
        require_id(id)?;
        self.templates
            .get_by_id(id)?
            .ok_or_else(|| EngineError::template_not_found(id))
    }
}

fn require_id(id: &str) -> EngineResult<()> {
    if id.is_empty() {
        return Err(EngineError::InvalidArgument(
            "template ID is required".to_string(),
        ));
    }
    Ok(())
}
