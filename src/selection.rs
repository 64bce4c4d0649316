// Capability selection
//
// An insertion-ordered set of at most three catalog names. Mutation is
// toggle-only; the size cap is enforced here even though the UI also
// disables further additions once the selection is saturated.

use std::sync::Arc;

use crate::catalog::CapabilityCatalog;
use crate::config::constants::MAX_SELECTED_CAPABILITIES;
use crate::errors::ValidationError;

/// What a `toggle` call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Already at the maximum; nothing changed.
    Saturated,
    /// Not a catalog capability; nothing changed.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct CapabilitySelection {
    catalog: Arc<CapabilityCatalog>,
    names: Vec<String>,
}

impl CapabilitySelection {
    pub fn new(catalog: Arc<CapabilityCatalog>) -> Self {
        Self {
            catalog,
            names: Vec::new(),
        }
    }

    /// Remove `name` if selected, otherwise append it when there is room.
    pub fn toggle(&mut self, name: &str) -> ToggleOutcome {
        if let Some(pos) = self.names.iter().position(|n| n == name) {
            self.names.remove(pos);
            return ToggleOutcome::Removed;
        }
        if !self.catalog.contains(name) {
            tracing::debug!("Ignoring toggle of unknown capability {:?}", name);
            return ToggleOutcome::Unknown;
        }
        if self.is_saturated() {
            return ToggleOutcome::Saturated;
        }
        self.names.push(name.to_string());
        ToggleOutcome::Added
    }

    pub fn validate_for_submit(&self) -> Result<(), ValidationError> {
        if self.names.is_empty() {
            return Err(ValidationError::EmptySelection);
        }
        if self.names.len() > MAX_SELECTED_CAPABILITIES {
            return Err(ValidationError::TooManySelections {
                max: MAX_SELECTED_CAPABILITIES,
            });
        }
        Ok(())
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// True once no further capability can be added.
    pub fn is_saturated(&self) -> bool {
        self.names.len() >= MAX_SELECTED_CAPABILITIES
    }

    pub fn catalog(&self) -> &Arc<CapabilityCatalog> {
        &self.catalog
    }

    pub fn clear(&mut self) {
        self.names.clear();
    }
}
