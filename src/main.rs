//! Terminal front end for the Qianji chat service
//!
//! (c) Softlandia 2025

use qianji_chat_client::core::drop_zone::DragEvent;
use qianji_chat_client::core::intake::IntakeForm;
use qianji_chat_client::core::traits::{ChatGateway, TimelineView};
use qianji_chat_client::infrastructure::config::ClientConfig;
use qianji_chat_client::infrastructure::entities::{EntryId, MessageEntry, SelectedFile, Sender};
use qianji_chat_client::{ChatController, FlowOptions, HttpChatGateway};

use anyhow::anyhow;
use di::{Injectable, ServiceCollection};
use log::{error, info};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::{Builder, Runtime};
use tokio::task::JoinSet;

fn main() -> anyhow::Result<()> {
    // initialize tracing
    tracing_subscriber::fmt::init();

    let runtime: Runtime = Builder::new_multi_thread().enable_all().build()?;

    runtime.block_on(session_task())
}

async fn session_task() -> anyhow::Result<()> {
    let provider = ServiceCollection::new()
        .add(ClientConfig::singleton())
        .add(HttpChatGateway::singleton())
        .build_provider()
        .map_err(|e| anyhow!("invalid service registrations: {e:?}"))?;

    let config = provider.get_required::<ClientConfig>();
    let gateway = provider.get_required::<dyn ChatGateway>();
    info!("chat service at {}", config.service_url);

    let controller = ChatController::new(
        gateway,
        Arc::new(TerminalView::default()),
        FlowOptions::from(&*config),
    )?;

    let mut flows = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let controller = controller.clone();

        match Command::parse(&line) {
            Command::Quit => {
                flows.shutdown().await;
                return Ok(());
            }
            Command::Message(text) => {
                flows.spawn(async move {
                    controller.submit_message(&text).await;
                });
            }
            Command::Intake(form) => {
                flows.spawn(async move {
                    controller.submit_intake(&form).await;
                });
            }
            Command::Upload(paths) => {
                let files = read_files(&paths).await;
                flows.spawn(async move {
                    controller.pick_files(files).await;
                });
            }
            Command::Drop(paths) => {
                let files = read_files(&paths).await;
                flows.spawn(async move {
                    controller.handle_drag(DragEvent::Enter).await;
                    controller.handle_drag(DragEvent::Drop(files)).await;
                });
            }
        }
    }

    // stdin closed: let in-flight requests settle
    while flows.join_next().await.is_some() {}
    info!("Shutting down...");

    Ok(())
}

async fn read_files(paths: &[String]) -> Vec<SelectedFile> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        match SelectedFile::read(path).await {
            Ok(file) => files.push(file),
            Err(e) => error!("cannot read `{path}`: {e}"),
        }
    }
    files
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Message(String),
    Upload(Vec<String>),
    Drop(Vec<String>),
    Intake(IntakeForm),
    Quit,
}

impl Command {
    fn parse(line: &str) -> Command {
        let mut words = line.split_whitespace();

        match words.next() {
            Some("/quit") => Command::Quit,
            Some("/upload") => Command::Upload(words.map(str::to_owned).collect()),
            Some("/drop") => Command::Drop(words.map(str::to_owned).collect()),
            Some("/intake") => {
                let mut field = || words.next().unwrap_or_default().to_owned();
                let birth_date = field();
                let birth_time = field();
                let gender = field();
                let location = words.collect::<Vec<_>>().join(" ");

                Command::Intake(IntakeForm::new(birth_date, birth_time, gender, location))
            }
            _ => Command::Message(line.to_owned()),
        }
    }
}

/// Prints every entry once, when it first shows up in the timeline.
#[derive(Default)]
struct TerminalView {
    printed: Mutex<HashSet<EntryId>>,
}

impl TimelineView for TerminalView {
    fn render(&self, entries: &[MessageEntry]) {
        let Ok(mut printed) = self.printed.lock() else {
            return;
        };

        for entry in entries {
            if printed.insert(entry.id) {
                let who = match entry.sender {
                    Sender::User => "you",
                    Sender::Bot => "千机",
                };
                println!("[{}] {who}: {}", entry.created_at.format("%H:%M:%S"), entry.text);
            }
        }
    }
}
