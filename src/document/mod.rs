// Review document model
//
// A `ReviewDocument` is exactly what the generation service returned. It is
// never edited in place; `DocumentEditor` owns the mutable working copy.

mod editor;

pub use editor::DocumentEditor;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The structured case review returned by generate/improve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewDocument {
    #[serde(rename = "case_title")]
    pub title: String,
    /// Full-text rendering; sent back verbatim as the original case on improvement
    #[serde(rename = "review_content")]
    pub narrative: String,
    pub sections: ReviewSections,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSections {
    pub brief_description: String,
    /// Capability name to generated justification, in generation order
    pub capabilities: IndexMap<String, String>,
    pub reflection: String,
    pub learning_needs: String,
}

impl ReviewDocument {
    /// Capability keys in document order.
    pub fn capability_keys(&self) -> Vec<String> {
        self.sections.capabilities.keys().cloned().collect()
    }

    /// Current text of a section. The capabilities section renders as every
    /// entry joined by a blank line, which is also what "copy all" writes.
    pub fn section_text(&self, key: SectionKey) -> String {
        match key {
            SectionKey::BriefDescription => self.sections.brief_description.clone(),
            SectionKey::Reflection => self.sections.reflection.clone(),
            SectionKey::LearningNeeds => self.sections.learning_needs.clone(),
            SectionKey::Capabilities => self
                .sections
                .capabilities
                .values()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("\n\n"),
        }
    }

    /// Text behind a copy target, if the target exists in this document.
    pub fn target_text(&self, target: &CopyTarget) -> Option<String> {
        match target {
            CopyTarget::Section(key) => Some(self.section_text(*key)),
            CopyTarget::Capability(name) => self.sections.capabilities.get(name).cloned(),
        }
    }
}

/// The fixed set of named sections, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    BriefDescription,
    Capabilities,
    Reflection,
    LearningNeeds,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        SectionKey::BriefDescription,
        SectionKey::Capabilities,
        SectionKey::Reflection,
        SectionKey::LearningNeeds,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::BriefDescription => "brief_description",
            SectionKey::Capabilities => "capabilities",
            SectionKey::Reflection => "reflection",
            SectionKey::LearningNeeds => "learning_needs",
        }
    }

    /// Display heading: first letter upper-cased, underscores as spaces.
    pub fn title(&self) -> String {
        let spaced = self.as_str().replace('_', " ");
        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Whether the section is a single free-text field.
    pub fn is_text(&self) -> bool {
        !matches!(self, SectionKey::Capabilities)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown section {0:?}")]
pub struct UnknownSection(pub String);

impl FromStr for SectionKey {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}

/// What a "copied" mark is keyed by: a whole section or one capability entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CopyTarget {
    Section(SectionKey),
    Capability(String),
}

impl fmt::Display for CopyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CopyTarget::Section(key) => write!(f, "{}", key),
            CopyTarget::Capability(name) => write!(f, "capabilities.{}", name),
        }
    }
}

impl FromStr for CopyTarget {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix("capabilities.") {
            Some(name) if !name.is_empty() => Ok(CopyTarget::Capability(name.to_string())),
            _ => s.parse().map(CopyTarget::Section),
        }
    }
}

impl From<SectionKey> for CopyTarget {
    fn from(key: SectionKey) -> Self {
        CopyTarget::Section(key)
    }
}
