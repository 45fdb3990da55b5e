use std::fmt;
use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::reference::TemplateReference;

/// Ceiling on recursive resolution depth, shared by every resolution chain.
pub const MAX_RESOLUTION_DEPTH: u32 = 5;

// Leftmost, non-overlapping `{{...}}` spans; the body may be empty.
static REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([^}]*)\}\}").expect("valid regex"));

/// A string that may embed zero or more table references.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollTemplate {
    template: String,
}

impl RollTemplate {
    /// Wrap a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// True if `text` contains at least one `{{...}}` span.
    pub fn is_template(text: &str) -> bool {
        REFERENCE_RE.is_match(text)
    }

    /// The raw template text.
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Consume the template and return its text.
    pub fn into_string(self) -> String {
        self.template
    }

    /// All references in left-to-right order, including empty `{{}}` ones.
    pub fn extract_references(&self) -> Vec<TemplateReference> {
        REFERENCE_RE
            .captures_iter(&self.template)
            .map(|caps| TemplateReference::parse_body(caps.get(1).map_or("", |m| m.as_str())))
            .collect()
    }

    /// Replace the first occurrence of `reference`'s canonical text with
    /// `value`. Returns an unchanged copy if the text is not present.
    pub fn replace_reference(&self, reference: &TemplateReference, value: &str) -> Self {
        let needle = reference.to_string();
        match self.template.find(&needle) {
            Some(index) => {
                let mut replaced = String::with_capacity(self.template.len() + value.len());
                replaced.push_str(&self.template[..index]);
                replaced.push_str(value);
                replaced.push_str(&self.template[index + needle.len()..]);
                Self::new(replaced)
            }
            None => self.clone(),
        }
    }

    /// True while any reference syntax remains in the text.
    pub fn has_unresolved_references(&self) -> bool {
        Self::is_template(&self.template)
    }
}

impl fmt::Display for RollTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

impl From<&str> for RollTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for RollTemplate {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A named, persisted template with identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSavedTemplate")]
pub struct SavedTemplate {
    id: String,
    name: String,
    description: String,
    template: RollTemplate,
}

#[derive(Deserialize)]
struct RawSavedTemplate {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    template: RollTemplate,
}

impl TryFrom<RawSavedTemplate> for SavedTemplate {
    type Error = CoreError;

    fn try_from(raw: RawSavedTemplate) -> CoreResult<Self> {
        SavedTemplate::new(raw.id, raw.name, raw.description, raw.template)
    }
}

impl SavedTemplate {
    /// Create a saved template. ID and name must be non-empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        template: impl Into<RollTemplate>,
    ) -> CoreResult<Self> {
        let id = id.into();
        let name = name.into();
        if id.is_empty() {
            return Err(CoreError::MissingTemplateId);
        }
        if name.is_empty() {
            return Err(CoreError::MissingTemplateName);
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            template: template.into(),
        })
    }

    /// Template identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The template text.
    pub fn template(&self) -> &RollTemplate {
        &self.template
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_references() {
        assert!(RollTemplate::is_template("a {{x::y::z}} b"));
        assert!(RollTemplate::is_template("{{}}"));
        assert!(!RollTemplate::is_template("no refs { here }"));
        assert!(!RollTemplate::is_template("{{unterminated"));
    }

    #[test]
    fn extracts_in_order() {
        let t = RollTemplate::new("{{A::a::Alpha}} and {{B::b::Beta::2:: / }}");
        let refs = t.extract_references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0], TemplateReference::short("A", "a", "Alpha"));
        assert_eq!(refs[1].table_id, "b");
        assert_eq!(refs[1].roll_count, 2);
        assert_eq!(refs[1].separator, " / ");
    }

    #[test]
    fn extracts_adjacent_and_empty() {
        let t = RollTemplate::new("{{A::a::Alpha}}{{}}{{B::b::Beta}}");
        let refs = t.extract_references();
        assert_eq!(refs.len(), 3);
        assert!(refs[1].is_unresolvable());
        assert_eq!(refs[2].table_id, "b");
    }

    #[test]
    fn no_references() {
        assert!(RollTemplate::new("plain text").extract_references().is_empty());
    }

    #[test]
    fn replace_first_occurrence_only() {
        let r = TemplateReference::short("C", "colors", "Colors");
        let t = RollTemplate::new("{{C::colors::Colors}} vs {{C::colors::Colors}}");

        let once = t.replace_reference(&r, "Red");
        assert_eq!(once.as_str(), "Red vs {{C::colors::Colors}}");
        assert!(once.has_unresolved_references());

        let twice = once.replace_reference(&r, "Blue");
        assert_eq!(twice.as_str(), "Red vs Blue");
        assert!(!twice.has_unresolved_references());
    }

    #[test]
    fn replace_uses_full_form_for_non_defaults() {
        let t = RollTemplate::new("Colors: {{C::colors::Colors::3::, }}");
        let refs = t.extract_references();
        let replaced = t.replace_reference(&refs[0], "Red, Blue, Green");
        assert_eq!(replaced.as_str(), "Colors: Red, Blue, Green");
    }

    #[test]
    fn replace_missing_reference_is_noop() {
        let t = RollTemplate::new("nothing to see");
        let r = TemplateReference::short("x", "y", "z");
        assert_eq!(t.replace_reference(&r, "v"), t);
    }

    #[test]
    fn saved_template_requires_id_and_name() {
        assert_eq!(
            SavedTemplate::new("", "n", "", "t"),
            Err(CoreError::MissingTemplateId)
        );
        assert_eq!(
            SavedTemplate::new("id", "", "", "t"),
            Err(CoreError::MissingTemplateName)
        );
        let saved = SavedTemplate::new("id", "Greeting", "", "Hello {{W::w::World}}").unwrap();
        assert_eq!(saved.template().extract_references().len(), 1);
    }

    #[test]
    fn saved_template_json_shape() {
        let saved = SavedTemplate::new("t1", "Pets", "a pet", "I have {{Pet::pets::Pets}}").unwrap();
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["template"], "I have {{Pet::pets::Pets}}");
        let back: SavedTemplate = serde_json::from_value(json).unwrap();
        assert_eq!(back, saved);
    }
}
