//! A single `{{title::tableId::tableName::rollCount::separator}}` reference.
//!
//! The short form `{{title::tableId::tableName}}` stands for a roll count of
//! 1 joined with `", "`. [`TemplateReference`]'s `Display` emits the short
//! form only when both trailing fields hold their defaults, so the string it
//! produces is the text that will be searched for during substitution.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Separator used when a reference does not name one.
pub const DEFAULT_SEPARATOR: &str = ", ";

/// Roll count used when a reference does not name one.
pub const DEFAULT_ROLL_COUNT: u32 = 1;

const FIELD_DELIMITER: &str = "::";

/// Parsed representation of one embedded table reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateReference {
    /// Free-form label for the reference.
    pub title: String,
    /// Primary lookup key.
    pub table_id: String,
    /// Fallback lookup key, matched exactly against table names.
    pub table_name: String,
    /// How many times to roll on the referenced table (>= 1).
    pub roll_count: u32,
    /// Joins the results of multiple rolls.
    pub separator: String,
}

impl TemplateReference {
    /// Create a reference with explicit count and separator.
    pub fn new(
        title: impl Into<String>,
        table_id: impl Into<String>,
        table_name: impl Into<String>,
        roll_count: u32,
        separator: impl Into<String>,
    ) -> CoreResult<Self> {
        if roll_count == 0 {
            return Err(CoreError::InvalidRollCount);
        }
        Ok(Self {
            title: title.into(),
            table_id: table_id.into(),
            table_name: table_name.into(),
            roll_count,
            separator: separator.into(),
        })
    }

    /// Create a reference with the default count and separator.
    pub fn short(
        title: impl Into<String>,
        table_id: impl Into<String>,
        table_name: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            table_id: table_id.into(),
            table_name: table_name.into(),
            roll_count: DEFAULT_ROLL_COUNT,
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Parse the body of a reference (the text between `{{` and `}}`).
    ///
    /// Never fails: absent or empty fields become empty strings, a roll count
    /// that is not a positive integer becomes 1, and an absent or empty
    /// separator becomes `", "`. Segments past the fifth are ignored.
    pub fn parse_body(body: &str) -> Self {
        let parts: Vec<&str> = body.split(FIELD_DELIMITER).collect();
        let field = |i: usize| parts.get(i).copied().unwrap_or("");

        let roll_count = field(3)
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1)
            .unwrap_or(DEFAULT_ROLL_COUNT);
        let separator = match field(4) {
            "" => DEFAULT_SEPARATOR,
            s => s,
        };

        Self {
            title: field(0).to_string(),
            table_id: field(1).to_string(),
            table_name: field(2).to_string(),
            roll_count,
            separator: separator.to_string(),
        }
    }

    /// True if the count and separator are both the defaults, i.e. the
    /// canonical form is the 3-field short form.
    pub fn is_short_form(&self) -> bool {
        self.roll_count == DEFAULT_ROLL_COUNT && self.separator == DEFAULT_SEPARATOR
    }

    /// True if neither a table ID nor a table name is given. Such references
    /// cannot be resolved and are left untouched.
    pub fn is_unresolvable(&self) -> bool {
        self.table_id.is_empty() && self.table_name.is_empty()
    }

    /// The 5-field form regardless of defaults.
    pub fn to_full_string(&self) -> String {
        format!(
            "{{{{{}::{}::{}::{}::{}}}}}",
            self.title, self.table_id, self.table_name, self.roll_count, self.separator
        )
    }
}

impl fmt::Display for TemplateReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_short_form() {
            write!(
                f,
                "{{{{{}::{}::{}}}}}",
                self.title, self.table_id, self.table_name
            )
        } else {
            f.write_str(&self.to_full_string())
        }
    }
}

impl FromStr for TemplateReference {
    type Err = std::convert::Infallible;

    /// Accepts either a bare body or a braced `{{...}}` reference.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let body = s
            .strip_prefix("{{")
            .and_then(|rest| rest.strip_suffix("}}"))
            .unwrap_or(s);
        Ok(Self::parse_body(body))
    }
}
