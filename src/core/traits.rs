//! Seams between the controller and its collaborators

use crate::api::GatewayError;
use crate::core::intake::IntakeForm;
use crate::infrastructure::entities::{MessageEntry, SelectedFile};
use async_trait::async_trait;

/// The remote chat service.
///
/// Implementations only move requests and replies; turning failures into timeline entries is
/// the controller's job.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    /// Sends a chat message and returns the reply text.
    async fn send_message(&self, message: &str) -> Result<String, GatewayError>;

    /// Uploads a single file and returns the server's analysis.
    ///
    /// An upload the service answers with `success: false` is `Err(GatewayError::Rejected)`.
    async fn upload_file(&self, file: &SelectedFile) -> Result<String, GatewayError>;

    /// Sends the raw intake form to the deprecated analysis endpoint.
    async fn analyze_bazi(&self, form: &IntakeForm) -> Result<String, GatewayError>;
}

/// Presentation of the timeline.
pub trait TimelineView: Send + Sync {
    /// Called with the full timeline after every append or removal.
    fn render(&self, entries: &[MessageEntry]);

    /// Called right after `render` so the newest entry is visible.
    fn scroll_to_end(&self, _len: usize) {}
}

/// View for headless sessions.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl TimelineView for NullView {
    fn render(&self, _entries: &[MessageEntry]) {}
}
