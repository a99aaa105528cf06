//! Timeline entities

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Opaque handle of a timeline entry.
///
/// Flows keep the handle of their pending entry so that resolution removes exactly that entry,
/// whatever else was appended in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        EntryId(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Permanent once rendered.
    Final,
    /// Placeholder shown while a request is in flight.
    Pending,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageEntry {
    pub id: EntryId,
    pub text: String,
    pub sender: Sender,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

impl MessageEntry {
    pub fn new(text: impl Into<String>, sender: Sender, kind: EntryKind) -> Self {
        MessageEntry {
            id: EntryId::new(),
            text: text.into(),
            sender,
            kind,
            created_at: Utc::now(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.kind == EntryKind::Pending
    }

    /// Markup for the message body. Only newlines are rewritten; the text is NOT escaped.
    pub fn to_html(&self) -> String {
        self.text.replace('\n', "<br>")
    }
}

/// A file chosen through the drop zone or the file picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        SelectedFile {
            name: name.into(),
            mime_type: None,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    pub async fn read(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());

        Ok(SelectedFile::new(name, bytes))
    }
}
