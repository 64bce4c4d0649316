// Shared test doubles for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

use portfolio_review::service::{GenerateRequest, ImproveRequest, ReviewService};
use portfolio_review::{CapabilityCatalog, ReviewDocument, ReviewSections, ServiceError};

pub fn catalog(names: &[&str]) -> CapabilityCatalog {
    let entries: IndexMap<String, Vec<String>> = names
        .iter()
        .map(|n| {
            (
                n.to_string(),
                vec![format!("{} first point", n), format!("{} second point", n)],
            )
        })
        .collect();
    CapabilityCatalog::new(entries)
}

pub fn document(title: &str, capabilities: &[&str]) -> ReviewDocument {
    ReviewDocument {
        title: title.to_string(),
        narrative: format!("{} narrative", title),
        sections: ReviewSections {
            brief_description: format!("{} brief", title),
            capabilities: capabilities
                .iter()
                .map(|c| (c.to_string(), format!("{} on {}", title, c)))
                .collect(),
            reflection: format!("{} reflection", title),
            learning_needs: format!("{} learning", title),
        },
    }
}

/// In-process `ReviewService` that replays queued responses and records
/// every request. With a gate, each call waits for a permit before
/// answering.
pub struct ScriptedService {
    catalog: CapabilityCatalog,
    generate: Mutex<VecDeque<Result<ReviewDocument, ServiceError>>>,
    improve: Mutex<VecDeque<Result<ReviewDocument, ServiceError>>>,
    generate_requests: Mutex<Vec<GenerateRequest>>,
    improve_requests: Mutex<Vec<ImproveRequest>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedService {
    pub fn new(catalog: CapabilityCatalog) -> Self {
        Self {
            catalog,
            generate: Mutex::new(VecDeque::new()),
            improve: Mutex::new(VecDeque::new()),
            generate_requests: Mutex::new(Vec::new()),
            improve_requests: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    pub fn gated(catalog: CapabilityCatalog) -> (Self, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let service = Self {
            gate: Some(Arc::clone(&gate)),
            ..Self::new(catalog)
        };
        (service, gate)
    }

    pub fn push_generate(&self, response: Result<ReviewDocument, ServiceError>) {
        self.generate.lock().unwrap().push_back(response);
    }

    pub fn push_improve(&self, response: Result<ReviewDocument, ServiceError>) {
        self.improve.lock().unwrap().push_back(response);
    }

    pub fn generate_requests(&self) -> Vec<GenerateRequest> {
        self.generate_requests.lock().unwrap().clone()
    }

    pub fn improve_requests(&self) -> Vec<ImproveRequest> {
        self.improve_requests.lock().unwrap().clone()
    }

    async fn wait_for_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

#[async_trait]
impl ReviewService for ScriptedService {
    async fn fetch_capabilities(&self) -> Result<CapabilityCatalog, ServiceError> {
        Ok(self.catalog.clone())
    }

    async fn generate_review(
        &self,
        request: &GenerateRequest,
    ) -> Result<ReviewDocument, ServiceError> {
        self.generate_requests.lock().unwrap().push(request.clone());
        self.wait_for_gate().await;
        self.generate
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no scripted response".to_string())))
    }

    async fn improve_review(&self, request: &ImproveRequest) -> Result<ReviewDocument, ServiceError> {
        self.improve_requests.lock().unwrap().push(request.clone());
        self.wait_for_gate().await;
        self.improve
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ServiceError::Transport("no scripted response".to_string())))
    }
}
