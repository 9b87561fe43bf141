//! Event dispatch for the edit control.
//!
//! [`dispatch`] consumes one normalized event to completion against an
//! [`EditControl`], composing selection, cursor, mutation and undo. The
//! control never reaches outward on its own: the clipboard and the word
//! classifier arrive per call inside a [`DispatchContext`], and the
//! recurring auto-scroll timer is owned by the host, which forwards
//! `Event::Tick` while `needs_recurring_tick()` reports true.

use core_state::{EditControl, EditError};
use core_text::{BreakClassifier, DefaultBreaks};

pub mod dispatcher;

pub use dispatcher::dispatch;

/// Narrow clipboard adapter. Failures propagate to the caller; buffer
/// contents are never changed on a failed paste.
pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<(), EditError>;
    fn paste(&mut self) -> Result<String, EditError>;
}

/// Collaborators borrowed for the duration of one dispatch.
pub struct DispatchContext<'a> {
    pub clipboard: Option<&'a mut dyn Clipboard>,
    pub classifier: &'a dyn BreakClassifier,
}

impl<'a> DispatchContext<'a> {
    pub fn new(clipboard: Option<&'a mut dyn Clipboard>) -> Self {
        Self {
            clipboard,
            classifier: &DefaultBreaks,
        }
    }
}

impl Default for DispatchContext<'_> {
    fn default() -> Self {
        Self::new(None)
    }
}

/// Whether the event was consumed by the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub handled: bool,
}

impl DispatchOutcome {
    pub fn handled() -> Self {
        Self { handled: true }
    }

    pub fn ignored() -> Self {
        Self { handled: false }
    }
}

/// In-memory clipboard used by tests and as a fallback when the platform
/// clipboard is unavailable.
#[derive(Debug, Default, Clone)]
pub struct LocalClipboard {
    contents: String,
}

impl LocalClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

impl Clipboard for LocalClipboard {
    fn copy(&mut self, text: &str) -> Result<(), EditError> {
        self.contents.clear();
        self.contents.push_str(text);
        Ok(())
    }

    fn paste(&mut self) -> Result<String, EditError> {
        Ok(self.contents.clone())
    }
}

/// Delete the active selection (if any), leaving the cursor at its start.
/// Returns true when something was deleted.
pub fn delete_selection(ctrl: &mut EditControl) -> bool {
    let Some((first, last)) = ctrl.selection().span() else {
        return false;
    };
    ctrl.delete_range(first, last, false, false);
    ctrl.clear_selection();
    ctrl.clear_desired();
    ctrl.set_cursor(first.line, first.offset);
    true
}
