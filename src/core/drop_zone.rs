//! Drag-and-drop and file picker capture

use crate::infrastructure::entities::SelectedFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragEvent {
    Enter,
    Over,
    Leave,
    Drop(Vec<SelectedFile>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragOutcome {
    /// The platform's default handling (opening the dropped file) must be suppressed.
    pub prevent_default: bool,
    /// File to hand to the upload flow.
    pub selected: Option<SelectedFile>,
}

/// Highlight state of the drop target. Highlighting is presentation only.
#[derive(Debug, Default, Clone)]
pub struct DropZone {
    highlighted: bool,
}

impl DropZone {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn handle(&mut self, event: DragEvent) -> DragOutcome {
        let selected = match event {
            DragEvent::Enter | DragEvent::Over => {
                self.highlighted = true;
                None
            }
            DragEvent::Leave => {
                self.highlighted = false;
                None
            }
            DragEvent::Drop(files) => {
                self.highlighted = false;
                first_file(files)
            }
        };

        DragOutcome {
            prevent_default: true,
            selected,
        }
    }

    /// Files chosen through the native picker.
    pub fn pick(&self, files: Vec<SelectedFile>) -> Option<SelectedFile> {
        first_file(files)
    }
}

/// Only the first file is used; the rest are dropped without notice.
fn first_file(files: Vec<SelectedFile>) -> Option<SelectedFile> {
    files.into_iter().next()
}
