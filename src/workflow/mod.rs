// Generation workflow
//
// Cloneable handle over one `Session`. The session lock is taken to begin
// and to finish a request and released while the service call is pending,
// so `new_case`, edits and copies stay responsive during a round trip.

mod session;

pub use session::{Outcome, RequestKind, RequestTicket, Session, WorkflowState};

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::CapabilityCatalog;
use crate::document::{ReviewDocument, SectionKey};
use crate::errors::{ReviewError, ServiceError, ValidationError};
use crate::selection::{CapabilitySelection, ToggleOutcome};
use crate::service::ReviewService;

#[derive(Clone)]
pub struct GenerationWorkflow {
    service: Arc<dyn ReviewService>,
    catalog: Arc<CapabilityCatalog>,
    session: Arc<RwLock<Session>>,
}

impl GenerationWorkflow {
    pub fn new(service: Arc<dyn ReviewService>, catalog: Arc<CapabilityCatalog>) -> Self {
        let session = Session::new(CapabilitySelection::new(Arc::clone(&catalog)));
        Self {
            service,
            catalog,
            session: Arc::new(RwLock::new(session)),
        }
    }

    /// Fetch the catalog from the service, then start an idle session.
    pub async fn connect(service: Arc<dyn ReviewService>) -> Result<Self, ServiceError> {
        let catalog = service.fetch_capabilities().await?;
        tracing::info!("Loaded {} capabilities", catalog.len());
        Ok(Self::new(service, Arc::new(catalog)))
    }

    pub fn catalog(&self) -> &Arc<CapabilityCatalog> {
        &self.catalog
    }

    pub async fn state(&self) -> WorkflowState {
        self.session.read().await.state()
    }

    pub async fn is_in_flight(&self) -> bool {
        self.session.read().await.in_flight().is_some()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.session.read().await.last_error().map(str::to_string)
    }

    /// Toggle a capability on the session's selection.
    pub async fn toggle_capability(&self, name: &str) -> ToggleOutcome {
        self.session.write().await.selection_mut().toggle(name)
    }

    pub async fn selection(&self) -> CapabilitySelection {
        self.session.read().await.selection().clone()
    }

    /// Generate a review for `description` scoped to `selection`.
    pub async fn generate(
        &self,
        description: &str,
        selection: &CapabilitySelection,
    ) -> Result<Outcome, ReviewError> {
        let (ticket, request) = self
            .session
            .write()
            .await
            .begin_generate(description, selection)?;
        tracing::info!(
            "Generating review with {} capabilities",
            request.selected_capabilities.len()
        );

        let mut guard = InFlightGuard::new(Arc::clone(&self.session), ticket);
        let result = self.service.generate_review(&request).await;

        let outcome = self.session.write().await.finish_generate(
            ticket,
            &request.selected_capabilities,
            result,
        );
        guard.disarm();
        Ok(outcome?)
    }

    pub async fn enter_improve(&self) -> Result<(), ValidationError> {
        self.session.write().await.enter_improve()
    }

    pub async fn cancel_improve(&self) -> Result<(), ValidationError> {
        self.session.write().await.cancel_improve()
    }

    /// Update the instruction text without submitting it.
    pub async fn set_instruction(&self, text: &str) {
        self.session.write().await.set_instruction(text);
    }

    pub async fn instruction(&self) -> String {
        self.session.read().await.instruction().to_string()
    }

    /// Regenerate the document from its narrative snapshot and `instruction`.
    pub async fn improve(&self, instruction: &str) -> Result<Outcome, ReviewError> {
        let (ticket, request) = self.session.write().await.begin_improve(instruction)?;
        tracing::info!("Improving review");

        let mut guard = InFlightGuard::new(Arc::clone(&self.session), ticket);
        let result = self.service.improve_review(&request).await;

        let outcome = self.session.write().await.finish_improve(
            ticket,
            &request.selected_capabilities,
            result,
        );
        guard.disarm();
        Ok(outcome?)
    }

    /// Discard everything and return to `Idle`. No confirmation.
    pub async fn new_case(&self) {
        self.session.write().await.new_case();
        tracing::info!("Started new case");
    }

    pub async fn set_field(&self, key: SectionKey, text: &str) -> Result<bool, ValidationError> {
        self.session.write().await.set_field(key, text)
    }

    pub async fn set_capability_field(
        &self,
        name: &str,
        text: &str,
    ) -> Result<bool, ValidationError> {
        self.session.write().await.set_capability_field(name, text)
    }

    /// The current working document, if any.
    pub async fn snapshot(&self) -> Option<ReviewDocument> {
        self.session.read().await.editor().map(|e| e.snapshot())
    }

    pub async fn narrative_snapshot(&self) -> Option<String> {
        self.session
            .read()
            .await
            .editor()
            .map(|e| e.current_narrative_snapshot().to_string())
    }
}

/// Releases a request ticket when the future driving it is dropped before
/// the response is applied.
struct InFlightGuard {
    session: Arc<RwLock<Session>>,
    ticket: Option<RequestTicket>,
}

impl InFlightGuard {
    fn new(session: Arc<RwLock<Session>>, ticket: RequestTicket) -> Self {
        Self {
            session,
            ticket: Some(ticket),
        }
    }

    fn disarm(&mut self) {
        self.ticket = None;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let Some(ticket) = self.ticket.take() else {
            return;
        };
        if let Ok(mut session) = self.session.try_write() {
            session.abandon(ticket);
            return;
        }
        // Lock is busy; finish the release on the runtime.
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let session = Arc::clone(&self.session);
                handle.spawn(async move {
                    session.write().await.abandon(ticket);
                });
            }
            Err(_) => tracing::warn!("Could not release abandoned request {:?}", ticket),
        }
    }
}
