// Generation service abstraction
//
// The workflow only ever talks to `ReviewService`; the HTTP implementation
// is one backend, tests plug in scripted ones.

use async_trait::async_trait;

mod http;
pub mod retry;
pub mod types;

pub use http::HttpReviewService;
pub use types::{CapabilitiesResponse, GenerateRequest, ImproveRequest};

use crate::catalog::CapabilityCatalog;
use crate::document::ReviewDocument;
use crate::errors::ServiceError;

#[async_trait]
pub trait ReviewService: Send + Sync {
    /// Fetch the capability catalog. Called once per session.
    async fn fetch_capabilities(&self) -> Result<CapabilityCatalog, ServiceError>;

    /// Generate a review from a case description and selected capabilities.
    async fn generate_review(&self, request: &GenerateRequest)
        -> Result<ReviewDocument, ServiceError>;

    /// Regenerate a review from prior content plus an instruction. The
    /// result is a full replacement.
    async fn improve_review(&self, request: &ImproveRequest) -> Result<ReviewDocument, ServiceError>;
}
