//! Chat session controller.
//!
//! Every flow follows the same sequence: optional user entry, pending bot entry, one request to
//! the [`ChatGateway`], then the pending entry is swapped for the final reply or a fixed error
//! text. Failures never escape a flow; they end up in the timeline and the log.

use crate::api::GatewayError;
use crate::core::drop_zone::{DragEvent, DropZone};
use crate::core::intake::{IntakeError, IntakeForm, IntakePrompts};
use crate::core::timeline::TimelineStore;
use crate::core::traits::{ChatGateway, TimelineView};
use crate::infrastructure::config::{ClientConfig, IntakeRoute, PendingRemoval};
use crate::infrastructure::entities::{EntryId, EntryKind, MessageEntry, SelectedFile, Sender};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const THINKING_TEXT: &str = "千机AI正在思考...";
pub const CHAT_FAILURE_TEXT: &str = "抱歉，处理您的请求时出现了问题。请稍后重试。";
pub const UPLOADING_TEXT: &str = "正在上传文件...";
pub const UPLOAD_REJECTED_TEXT: &str = "文件上传失败，请重试。";
pub const UPLOAD_FAILURE_TEXT: &str = "上传过程中出现错误。";
pub const INTAKE_INCOMPLETE_TEXT: &str = "请填写完整的八字信息！";
pub const ANALYZING_TEXT: &str = "千机AI正在分析...";
pub const BAZI_FAILURE_TEXT: &str = "八字分析失败，请重试。";

pub fn upload_success_text(analysis: &str) -> String {
    format!("文件上传成功！分析结果：{analysis}")
}

/// How a single flow invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Nothing to send; the timeline is untouched.
    Ignored,
    /// Rejected locally before any request was made.
    Invalid,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowOptions {
    pub pending_removal: PendingRemoval,
    pub intake_route: IntakeRoute,
}

impl From<&ClientConfig> for FlowOptions {
    fn from(config: &ClientConfig) -> Self {
        FlowOptions {
            pending_removal: config.pending_removal,
            intake_route: config.intake_route,
        }
    }
}

/// Controller of one chat session. Cloning yields another handle to the same session, so
/// flows can be spawned and overlap freely.
#[derive(Clone)]
pub struct ChatController {
    gateway: Arc<dyn ChatGateway>,
    timeline: Arc<Mutex<TimelineStore>>,
    drop_zone: Arc<Mutex<DropZone>>,
    prompts: Arc<IntakePrompts>,
    options: FlowOptions,
}

impl ChatController {
    /// Starts a session with an empty timeline.
    pub fn new(
        gateway: Arc<dyn ChatGateway>,
        view: Arc<dyn TimelineView>,
        options: FlowOptions,
    ) -> Result<Self, IntakeError> {
        Ok(ChatController {
            gateway,
            timeline: Arc::new(Mutex::new(TimelineStore::new(view))),
            drop_zone: Arc::new(Mutex::new(DropZone::new())),
            prompts: Arc::new(IntakePrompts::new()?),
            options,
        })
    }

    pub fn options(&self) -> FlowOptions {
        self.options
    }

    /// Snapshot of the timeline.
    pub async fn entries(&self) -> Vec<MessageEntry> {
        self.timeline.lock().await.entries().to_vec()
    }

    pub async fn pending_count(&self) -> usize {
        self.timeline.lock().await.pending_count()
    }

    pub async fn is_drop_zone_highlighted(&self) -> bool {
        self.drop_zone.lock().await.is_highlighted()
    }

    /// Chat flow. Blank input is ignored.
    pub async fn submit_message(&self, text: &str) -> FlowOutcome {
        let message = text.trim();
        if message.is_empty() {
            return FlowOutcome::Ignored;
        }

        self.append(message, Sender::User, EntryKind::Final).await;
        self.dispatch_chat(message).await
    }

    /// Upload flow for a single file.
    pub async fn submit_file(&self, file: SelectedFile) -> FlowOutcome {
        let pending = self.append(UPLOADING_TEXT, Sender::Bot, EntryKind::Pending).await;

        match self.gateway.upload_file(&file).await {
            Ok(analysis) => {
                info!("upload of `{}` analysed", file.name);
                self.resolve(pending, upload_success_text(&analysis)).await;
                FlowOutcome::Succeeded
            }
            Err(GatewayError::Rejected) => {
                error!("upload of `{}` was rejected by the service", file.name);
                self.resolve(pending, UPLOAD_REJECTED_TEXT).await;
                FlowOutcome::Failed
            }
            Err(e) => {
                error!("upload of `{}` failed: {e}", file.name);
                self.resolve(pending, UPLOAD_FAILURE_TEXT).await;
                FlowOutcome::Failed
            }
        }
    }

    /// Intake flow: validate, echo the mapped summary, then send the analysis request.
    pub async fn submit_intake(&self, form: &IntakeForm) -> FlowOutcome {
        if form.validate().is_err() {
            self.append(INTAKE_INCOMPLETE_TEXT, Sender::Bot, EntryKind::Final)
                .await;
            return FlowOutcome::Invalid;
        }
        debug!("intake form submitted");

        let (echo, prompt) = match self.compose_intake(form) {
            Ok(texts) => texts,
            Err(e) => {
                error!("failed to compose intake request: {e}");
                self.append(BAZI_FAILURE_TEXT, Sender::Bot, EntryKind::Final)
                    .await;
                return FlowOutcome::Failed;
            }
        };

        self.append(echo, Sender::User, EntryKind::Final).await;

        match self.options.intake_route {
            IntakeRoute::Chat => self.dispatch_chat(&prompt).await,
            IntakeRoute::LegacyBazi => self.dispatch_bazi(form).await,
        }
    }

    /// Drag lifecycle of the drop zone. A drop carrying files starts the upload flow with the
    /// first file and returns its outcome.
    pub async fn handle_drag(&self, event: DragEvent) -> Option<FlowOutcome> {
        let outcome = self.drop_zone.lock().await.handle(event);
        match outcome.selected {
            Some(file) => Some(self.submit_file(file).await),
            None => None,
        }
    }

    /// Files chosen through the picker; only the first is uploaded.
    pub async fn pick_files(&self, files: Vec<SelectedFile>) -> Option<FlowOutcome> {
        let selected = self.drop_zone.lock().await.pick(files);
        match selected {
            Some(file) => Some(self.submit_file(file).await),
            None => None,
        }
    }

    fn compose_intake(&self, form: &IntakeForm) -> Result<(String, String), IntakeError> {
        Ok((
            self.prompts.echo(form)?,
            self.prompts.analysis_prompt(form)?,
        ))
    }

    /// Shared tail of the chat and intake flows.
    async fn dispatch_chat(&self, message: &str) -> FlowOutcome {
        let pending = self.append(THINKING_TEXT, Sender::Bot, EntryKind::Pending).await;
        debug!("sending chat message ({} chars)", message.chars().count());

        match self.gateway.send_message(message).await {
            Ok(reply) => {
                self.resolve(pending, reply).await;
                FlowOutcome::Succeeded
            }
            Err(e) => {
                error!("chat request failed: {e}");
                self.resolve(pending, CHAT_FAILURE_TEXT).await;
                FlowOutcome::Failed
            }
        }
    }

    async fn dispatch_bazi(&self, form: &IntakeForm) -> FlowOutcome {
        let pending = self.append(ANALYZING_TEXT, Sender::Bot, EntryKind::Pending).await;

        match self.gateway.analyze_bazi(form).await {
            Ok(reply) => {
                self.resolve(pending, reply).await;
                FlowOutcome::Succeeded
            }
            Err(e) => {
                error!("bazi analysis failed: {e}");
                self.resolve(pending, BAZI_FAILURE_TEXT).await;
                FlowOutcome::Failed
            }
        }
    }

    async fn append(&self, text: impl Into<String>, sender: Sender, kind: EntryKind) -> EntryId {
        self.timeline.lock().await.append(text, sender, kind)
    }

    /// Retracts the request's placeholder and appends its final entry under one lock.
    async fn resolve(&self, pending: EntryId, text: impl Into<String>) {
        let mut timeline = self.timeline.lock().await;

        match self.options.pending_removal {
            PendingRemoval::ByHandle => {
                if !timeline.remove_pending(pending) {
                    debug!("pending entry {pending} was already gone");
                }
            }
            PendingRemoval::LastBotEntry => {
                timeline.remove_last_pending(Sender::Bot);
            }
        }

        timeline.append(text, Sender::Bot, EntryKind::Final);
    }
}
