// Portfolio Review - structured case review generation and editing
// Library exports

pub mod catalog;
pub mod cli;
pub mod clipboard;
pub mod config;
pub mod document;
pub mod errors;
pub mod selection;
pub mod service;
pub mod workflow;

pub use catalog::CapabilityCatalog;
pub use document::{CopyTarget, DocumentEditor, ReviewDocument, ReviewSections, SectionKey};
pub use errors::{ReviewError, ServiceError, ValidationError};
pub use selection::{CapabilitySelection, ToggleOutcome};
pub use workflow::{GenerationWorkflow, Outcome, WorkflowState};
