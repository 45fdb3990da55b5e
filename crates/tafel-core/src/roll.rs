use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The outcome of one roll on a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollResult {
    /// Table that was rolled on.
    pub table_id: String,
    /// Entry that was selected.
    pub entry_id: String,
    /// Raw entry content, references included.
    pub content: String,
    /// Whether `content` embeds references.
    pub is_template: bool,
    /// Content after reference resolution; only set when resolution ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_content: Option<String>,
    /// When the roll happened.
    pub timestamp: DateTime<Utc>,
}

impl RollResult {
    /// Create an unresolved result stamped with the current time.
    pub fn new(
        table_id: impl Into<String>,
        entry_id: impl Into<String>,
        content: impl Into<String>,
        is_template: bool,
    ) -> Self {
        Self {
            table_id: table_id.into(),
            entry_id: entry_id.into(),
            content: content.into(),
            is_template,
            resolved_content: None,
            timestamp: Utc::now(),
        }
    }

    /// A copy carrying `resolved` as its resolved content.
    pub fn with_resolved_content(&self, resolved: impl Into<String>) -> Self {
        Self {
            resolved_content: Some(resolved.into()),
            ..self.clone()
        }
    }

    /// The text to show: resolved content when present, raw content otherwise.
    pub fn display_content(&self) -> &str {
        self.resolved_content.as_deref().unwrap_or(&self.content)
    }
}
