// Working-copy editor
//
// Edits replace only the field they touch. The narrative captured at load
// time is what improvement requests send upstream; section edits do not
// feed back into it.

use super::{ReviewDocument, SectionKey};

#[derive(Debug, Clone)]
pub struct DocumentEditor {
    loaded: ReviewDocument,
    working: ReviewDocument,
}

impl DocumentEditor {
    /// Start editing a structural copy of `document`.
    pub fn load(document: &ReviewDocument) -> Self {
        Self {
            loaded: document.clone(),
            working: document.clone(),
        }
    }

    /// Replace a top-level text section. Returns false (and changes nothing)
    /// for the capabilities section, which is edited per entry.
    pub fn set_field(&mut self, key: SectionKey, text: impl Into<String>) -> bool {
        let sections = &mut self.working.sections;
        let slot = match key {
            SectionKey::BriefDescription => &mut sections.brief_description,
            SectionKey::Reflection => &mut sections.reflection,
            SectionKey::LearningNeeds => &mut sections.learning_needs,
            SectionKey::Capabilities => {
                tracing::debug!("set_field called with the capabilities section, ignoring");
                return false;
            }
        };
        *slot = text.into();
        true
    }

    /// Replace one capability entry. Names that are not current keys are a
    /// stale reference from the caller and are ignored.
    pub fn set_capability_field(&mut self, name: &str, text: impl Into<String>) -> bool {
        match self.working.sections.capabilities.get_mut(name) {
            Some(slot) => {
                *slot = text.into();
                true
            }
            None => {
                tracing::debug!("Ignoring edit of absent capability {:?}", name);
                false
            }
        }
    }

    /// Narrative as it was when the document was loaded.
    pub fn current_narrative_snapshot(&self) -> &str {
        &self.loaded.narrative
    }

    /// The full current working document.
    pub fn snapshot(&self) -> ReviewDocument {
        self.working.clone()
    }

    /// Borrowing view of the working document, for rendering.
    pub fn working(&self) -> &ReviewDocument {
        &self.working
    }

    pub fn capability_keys(&self) -> Vec<String> {
        self.working.capability_keys()
    }

    pub fn section_text(&self, key: SectionKey) -> String {
        self.working.section_text(key)
    }

    /// Whether any field differs from the document as loaded.
    pub fn is_dirty(&self) -> bool {
        self.working != self.loaded
    }
}
