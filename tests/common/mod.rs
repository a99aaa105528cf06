//! Shared test doubles for controller tests

#![allow(dead_code)]

use async_trait::async_trait;
use qianji_chat_client::api::GatewayError;
use qianji_chat_client::core::intake::IntakeForm;
use qianji_chat_client::core::traits::{ChatGateway, TimelineView};
use qianji_chat_client::infrastructure::entities::{MessageEntry, SelectedFile};
use qianji_chat_client::{ChatController, FlowOptions};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

pub type Reply = Result<String, GatewayError>;

enum Scripted {
    Now(Reply),
    Later(oneshot::Receiver<Reply>),
}

impl Scripted {
    async fn settle(self) -> Reply {
        match self {
            Scripted::Now(reply) => reply,
            // A dropped sender behaves like a request that fails at the transport level.
            Scripted::Later(receiver) => receiver.await.unwrap_or(Err(GatewayError::Status(599))),
        }
    }
}

/// Gateway with queued replies. Requests without a queued reply succeed with `reply to <msg>`.
#[derive(Default)]
pub struct ScriptedGateway {
    pub chat_requests: Mutex<Vec<String>>,
    pub uploads: Mutex<Vec<SelectedFile>>,
    pub bazi_requests: Mutex<Vec<IntakeForm>>,
    chat_replies: Mutex<VecDeque<Scripted>>,
    upload_replies: Mutex<VecDeque<Scripted>>,
    bazi_replies: Mutex<VecDeque<Scripted>>,
}

impl ScriptedGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply_chat(&self, reply: Reply) {
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Scripted::Now(reply));
    }

    pub fn reply_upload(&self, reply: Reply) {
        self.upload_replies
            .lock()
            .unwrap()
            .push_back(Scripted::Now(reply));
    }

    pub fn reply_bazi(&self, reply: Reply) {
        self.bazi_replies
            .lock()
            .unwrap()
            .push_back(Scripted::Now(reply));
    }

    /// The next chat request waits until the returned sender is used.
    pub fn defer_chat(&self) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.chat_replies
            .lock()
            .unwrap()
            .push_back(Scripted::Later(receiver));
        sender
    }

    /// The next upload waits until the returned sender is used.
    pub fn defer_upload(&self) -> oneshot::Sender<Reply> {
        let (sender, receiver) = oneshot::channel();
        self.upload_replies
            .lock()
            .unwrap()
            .push_back(Scripted::Later(receiver));
        sender
    }

    pub fn chat_requests(&self) -> Vec<String> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<SelectedFile> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn bazi_requests(&self) -> Vec<IntakeForm> {
        self.bazi_requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.chat_requests().len() + self.uploads().len() + self.bazi_requests().len()
    }
}

#[async_trait]
impl ChatGateway for ScriptedGateway {
    async fn send_message(&self, message: &str) -> Reply {
        self.chat_requests.lock().unwrap().push(message.to_owned());
        let scripted = self.chat_replies.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => scripted.settle().await,
            None => Ok(format!("reply to {message}")),
        }
    }

    async fn upload_file(&self, file: &SelectedFile) -> Reply {
        self.uploads.lock().unwrap().push(file.clone());
        let scripted = self.upload_replies.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => scripted.settle().await,
            None => Ok(format!("analysis of {}", file.name)),
        }
    }

    async fn analyze_bazi(&self, form: &IntakeForm) -> Reply {
        self.bazi_requests.lock().unwrap().push(form.clone());
        let scripted = self.bazi_replies.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => scripted.settle().await,
            None => Ok(format!("analysis for {}", form.birth_date)),
        }
    }
}

/// Counts view refreshes.
#[derive(Default)]
pub struct RecordingView {
    pub renders: Mutex<usize>,
    pub scrolled_to: Mutex<Vec<usize>>,
}

impl TimelineView for RecordingView {
    fn render(&self, _entries: &[MessageEntry]) {
        *self.renders.lock().unwrap() += 1;
    }

    fn scroll_to_end(&self, len: usize) {
        self.scrolled_to.lock().unwrap().push(len);
    }
}

pub fn controller_with(
    gateway: Arc<ScriptedGateway>,
    options: FlowOptions,
) -> (ChatController, Arc<RecordingView>) {
    let view = Arc::new(RecordingView::default());
    let controller = ChatController::new(gateway, view.clone(), options).unwrap();
    (controller, view)
}

pub fn controller(gateway: Arc<ScriptedGateway>) -> ChatController {
    controller_with(gateway, FlowOptions::default()).0
}

pub fn texts(entries: &[MessageEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.text.clone()).collect()
}
