use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::range::Range;
use crate::template::RollTemplate;

/// One item inside a [`RandomTable`](crate::RandomTable).
///
/// Entries are immutable: [`TableEntry::update`] returns a new entry that
/// keeps the same `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEntry")]
pub struct TableEntry {
    id: String,
    content: String,
    weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    range: Option<Range>,
}

#[derive(Deserialize)]
struct RawEntry {
    id: String,
    content: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    range: Option<Range>,
}

fn default_weight() -> f64 {
    1.0
}

impl TryFrom<RawEntry> for TableEntry {
    type Error = CoreError;

    fn try_from(raw: RawEntry) -> CoreResult<Self> {
        TableEntry::new(raw.id, raw.content, raw.weight, raw.range)
    }
}

/// A partial update applied by [`TableEntry::update`]. `None` keeps the
/// current value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
    /// Replacement content.
    #[serde(default)]
    pub content: Option<String>,
    /// Replacement weight, validated like a fresh entry.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Replacement range.
    #[serde(default)]
    pub range: Option<Range>,
}

impl TableEntry {
    /// Create an entry. Fails unless `weight > 0`.
    pub fn new(
        id: impl Into<String>,
        content: impl Into<String>,
        weight: f64,
        range: Option<Range>,
    ) -> CoreResult<Self> {
        if weight.is_nan() || weight <= 0.0 {
            return Err(CoreError::InvalidWeight(weight));
        }
        Ok(Self {
            id: id.into(),
            content: content.into(),
            weight,
            range,
        })
    }

    /// Create an entry with the default weight of 1 and no range.
    pub fn simple(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            weight: default_weight(),
            range: None,
        }
    }

    /// Attach a range, keeping every other field.
    pub fn with_range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Entry identifier, unique within its table.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Raw content, possibly a template.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Selection weight (always > 0).
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Declared range, if any.
    pub fn range(&self) -> Option<&Range> {
        self.range.as_ref()
    }

    /// True if this entry declares a range containing `value`.
    /// Entries without a range never match.
    pub fn is_in_range(&self, value: i64) -> bool {
        self.range.is_some_and(|r| r.contains(value))
    }

    /// True if the content embeds at least one `{{...}}` reference.
    pub fn is_template(&self) -> bool {
        RollTemplate::is_template(&self.content)
    }

    /// Return a copy with the patch applied.
    pub fn update(&self, patch: &EntryPatch) -> CoreResult<Self> {
        Self::new(
            self.id.clone(),
            patch.content.clone().unwrap_or_else(|| self.content.clone()),
            patch.weight.unwrap_or(self.weight),
            patch.range.or(self.range),
        )
    }
}
