// Session state machine
//
// One value holds the phase, the live document (inside the phase), the
// active selection and the pending instruction. Async dispatch is split
// into `begin_*` and `finish_*` so the lock is never held across a service
// call; the ticket handed out by `begin_*` decides whether a completion is
// still wanted.

use std::mem;

use crate::config::constants::MIN_DESCRIPTION_CHARS;
use crate::document::{DocumentEditor, ReviewDocument, SectionKey};
use crate::errors::{ServiceError, ValidationError};
use crate::selection::CapabilitySelection;
use crate::service::{GenerateRequest, ImproveRequest};

/// Observable workflow state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// No document
    Idle,
    /// Document loaded
    Viewing,
    /// Improvement prompt open over the (still editable) document
    Improving,
}

impl WorkflowState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowState::Idle => "idle",
            WorkflowState::Viewing => "viewing",
            WorkflowState::Improving => "improving",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Generate,
    Improve,
}

/// Tag carried by an in-flight request: the session generation it was
/// dispatched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    pub generation: u64,
    pub kind: RequestKind,
}

/// How a completed request was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    /// The session moved on while the request was in flight.
    Discarded,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Viewing(DocumentEditor),
    Improving(DocumentEditor),
}

#[derive(Debug)]
pub struct Session {
    phase: Phase,
    selection: CapabilitySelection,
    instruction: String,
    generation: u64,
    in_flight: Option<RequestTicket>,
    last_error: Option<String>,
}

impl Session {
    pub fn new(selection: CapabilitySelection) -> Self {
        Self {
            phase: Phase::Idle,
            selection,
            instruction: String::new(),
            generation: 0,
            in_flight: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        match self.phase {
            Phase::Idle => WorkflowState::Idle,
            Phase::Viewing(_) => WorkflowState::Viewing,
            Phase::Improving(_) => WorkflowState::Improving,
        }
    }

    pub fn selection(&self) -> &CapabilitySelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut CapabilitySelection {
        &mut self.selection
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn set_instruction(&mut self, text: impl Into<String>) {
        self.instruction = text.into();
    }

    pub fn in_flight(&self) -> Option<RequestTicket> {
        self.in_flight
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn editor(&self) -> Option<&DocumentEditor> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Viewing(editor) | Phase::Improving(editor) => Some(editor),
        }
    }

    /// Mutable working copy. Refused while an improvement is in flight,
    /// since its result replaces the whole document.
    fn editor_mut(&mut self) -> Result<&mut DocumentEditor, ValidationError> {
        if matches!(self.in_flight, Some(t) if t.kind == RequestKind::Improve) {
            return Err(ValidationError::AlreadyInFlight);
        }
        let actual = self.state().as_str();
        match &mut self.phase {
            Phase::Viewing(editor) | Phase::Improving(editor) => Ok(editor),
            Phase::Idle => Err(ValidationError::InvalidState {
                expected: "viewing",
                actual,
            }),
        }
    }

    fn issue(&mut self, kind: RequestKind) -> RequestTicket {
        let ticket = RequestTicket {
            generation: self.generation,
            kind,
        };
        self.in_flight = Some(ticket);
        self.last_error = None;
        ticket
    }

    fn is_current(&self, ticket: RequestTicket) -> bool {
        self.generation == ticket.generation && self.in_flight == Some(ticket)
    }

    pub fn begin_generate(
        &mut self,
        description: &str,
        selection: &CapabilitySelection,
    ) -> Result<(RequestTicket, GenerateRequest), ValidationError> {
        if self.in_flight.is_some() {
            return Err(ValidationError::AlreadyInFlight);
        }
        if self.state() != WorkflowState::Idle {
            return Err(ValidationError::InvalidState {
                expected: "idle",
                actual: self.state().as_str(),
            });
        }
        if description.trim().chars().count() < MIN_DESCRIPTION_CHARS {
            return Err(ValidationError::DescriptionTooShort {
                min: MIN_DESCRIPTION_CHARS,
            });
        }
        selection.validate_for_submit()?;

        self.selection = selection.clone();
        let request = GenerateRequest {
            case_description: description.to_string(),
            selected_capabilities: selection.names().to_vec(),
        };
        Ok((self.issue(RequestKind::Generate), request))
    }

    pub fn finish_generate(
        &mut self,
        ticket: RequestTicket,
        requested: &[String],
        result: Result<ReviewDocument, ServiceError>,
    ) -> Result<Outcome, ServiceError> {
        if !self.is_current(ticket) {
            tracing::debug!("Dropping stale generate completion {:?}", ticket);
            return Ok(Outcome::Discarded);
        }
        self.in_flight = None;

        match result {
            Ok(mut document) => {
                retain_requested(&mut document, requested);
                tracing::info!("Generated review {:?}", document.title);
                self.phase = Phase::Viewing(DocumentEditor::load(&document));
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.last_error = Some(e.message().to_string());
                Err(e)
            }
        }
    }

    pub fn enter_improve(&mut self) -> Result<(), ValidationError> {
        self.phase = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Viewing(editor) | Phase::Improving(editor) => Phase::Improving(editor),
            Phase::Idle => {
                return Err(ValidationError::InvalidState {
                    expected: "viewing",
                    actual: WorkflowState::Idle.as_str(),
                })
            }
        };
        Ok(())
    }

    /// Close the improvement prompt. An improvement still in flight is
    /// superseded and its result will be dropped.
    pub fn cancel_improve(&mut self) -> Result<(), ValidationError> {
        self.phase = match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Viewing(editor) | Phase::Improving(editor) => Phase::Viewing(editor),
            Phase::Idle => {
                return Err(ValidationError::InvalidState {
                    expected: "improving",
                    actual: WorkflowState::Idle.as_str(),
                })
            }
        };
        if matches!(self.in_flight, Some(t) if t.kind == RequestKind::Improve) {
            self.supersede();
        }
        self.last_error = None;
        Ok(())
    }

    pub fn begin_improve(
        &mut self,
        instruction: &str,
    ) -> Result<(RequestTicket, ImproveRequest), ValidationError> {
        if self.in_flight.is_some() {
            return Err(ValidationError::AlreadyInFlight);
        }
        let editor = match &self.phase {
            Phase::Improving(editor) => editor,
            _ => {
                return Err(ValidationError::InvalidState {
                    expected: "improving",
                    actual: self.state().as_str(),
                })
            }
        };
        let request = ImproveRequest {
            original_case: editor.current_narrative_snapshot().to_string(),
            improvement_prompt: instruction.to_string(),
            selected_capabilities: editor.capability_keys(),
        };

        self.instruction = instruction.to_string();
        if instruction.trim().is_empty() {
            return Err(ValidationError::EmptyInstruction);
        }
        Ok((self.issue(RequestKind::Improve), request))
    }

    pub fn finish_improve(
        &mut self,
        ticket: RequestTicket,
        requested: &[String],
        result: Result<ReviewDocument, ServiceError>,
    ) -> Result<Outcome, ServiceError> {
        if !self.is_current(ticket) {
            tracing::debug!("Dropping stale improve completion {:?}", ticket);
            return Ok(Outcome::Discarded);
        }
        self.in_flight = None;

        match result {
            Ok(mut document) => {
                retain_requested(&mut document, requested);
                tracing::info!("Improved review {:?}", document.title);
                if self.editor().is_some_and(DocumentEditor::is_dirty) {
                    tracing::info!("Replacing edited working copy with improved review");
                }
                self.phase = Phase::Viewing(DocumentEditor::load(&document));
                self.instruction.clear();
                Ok(Outcome::Applied)
            }
            Err(e) => {
                self.last_error = Some(e.message().to_string());
                Err(e)
            }
        }
    }

    /// Back to `Idle`, dropping document, selection and instruction. Any
    /// request in flight is superseded.
    pub fn new_case(&mut self) {
        self.supersede();
        self.phase = Phase::Idle;
        self.selection.clear();
        self.instruction.clear();
        self.last_error = None;
    }

    pub fn set_field(&mut self, key: SectionKey, text: impl Into<String>) -> Result<bool, ValidationError> {
        Ok(self.editor_mut()?.set_field(key, text))
    }

    pub fn set_capability_field(
        &mut self,
        name: &str,
        text: impl Into<String>,
    ) -> Result<bool, ValidationError> {
        Ok(self.editor_mut()?.set_capability_field(name, text))
    }

    /// Release a ticket whose caller stopped waiting for the response.
    pub fn abandon(&mut self, ticket: RequestTicket) {
        if self.is_current(ticket) {
            tracing::debug!("Request {:?} abandoned by caller", ticket);
            self.in_flight = None;
        }
    }

    fn supersede(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }
}

/// Drop capability entries the request did not ask for, keeping the
/// document's keys a subset of the selection it was produced for.
fn retain_requested(document: &mut ReviewDocument, requested: &[String]) {
    let before = document.sections.capabilities.len();
    document
        .sections
        .capabilities
        .retain(|name, _| requested.iter().any(|r| r == name));
    let dropped = before - document.sections.capabilities.len();
    if dropped > 0 {
        tracing::warn!("Service returned {} unrequested capability section(s)", dropped);
    }
}
