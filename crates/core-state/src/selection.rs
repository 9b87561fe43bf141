//! Selection state machine.
//!
//! Five active states plus inactive: keyboard and mouse selections each
//! track whether they grew top-down or bottom-up (the anchor is recovered
//! from the direction), and a finished mouse selection parks in
//! `MouseComplete`. Keyboard selections are strictly non-empty; mouse
//! selections tolerate a caret-only drag.

use crate::EditControl;
use core_text::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Inactive,
    KeyboardTopDown,
    KeyboardBottomUp,
    MouseTopDown,
    MouseBottomUp,
    MouseComplete,
}

impl SelectionState {
    pub fn is_active(self) -> bool {
        self != SelectionState::Inactive
    }

    pub fn is_keyboard(self) -> bool {
        matches!(
            self,
            SelectionState::KeyboardTopDown | SelectionState::KeyboardBottomUp
        )
    }

    pub fn is_mouse(self) -> bool {
        matches!(
            self,
            SelectionState::MouseTopDown
                | SelectionState::MouseBottomUp
                | SelectionState::MouseComplete
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionKind {
    Keyboard,
    Mouse,
}

/// Active selection endpoints. Invariant: when active, `first <= last`
/// lexicographically, strictly so for keyboard selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub state: SelectionState,
    pub first: Location,
    pub last: Location,
}

impl Selection {
    pub(crate) fn keyboard(first: Location, last: Location) -> Self {
        Self {
            state: SelectionState::KeyboardTopDown,
            first,
            last,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Normalized endpoints when active.
    pub fn span(&self) -> Option<(Location, Location)> {
        if self.is_active() {
            Some((self.first, self.last))
        } else {
            None
        }
    }

    /// The fixed end of the selection; the other end follows the cursor.
    fn anchor(&self) -> Location {
        match self.state {
            SelectionState::KeyboardTopDown
            | SelectionState::MouseTopDown
            | SelectionState::MouseComplete
            | SelectionState::Inactive => self.first,
            SelectionState::KeyboardBottomUp | SelectionState::MouseBottomUp => self.last,
        }
    }
}

impl EditControl {
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn selection_active(&self) -> bool {
        self.selection.is_active()
    }

    /// Begin a selection of the given kind at the cursor. A live selection
    /// of the other input kind is cleared first; an existing selection of
    /// the same kind is left for `extend_selection_to_cursor` to grow.
    pub fn start_selection(&mut self, kind: SelectionKind) {
        let state = self.selection.state;
        let mismatch = match kind {
            SelectionKind::Keyboard => state.is_mouse(),
            SelectionKind::Mouse => state.is_keyboard() || state == SelectionState::MouseComplete,
        };
        if mismatch {
            self.clear_selection();
        }
        if !self.selection.is_active() {
            self.selection.first = self.cursor;
            self.selection.last = self.cursor;
            self.selection.state = match kind {
                SelectionKind::Keyboard => SelectionState::KeyboardTopDown,
                SelectionKind::Mouse => SelectionState::MouseTopDown,
            };
        }
    }

    /// Re-anchor the selection so it spans from the anchor to the cursor.
    /// A keyboard selection shrinking to a caret clears itself; a mouse
    /// selection keeps a caret-only span alive while the drag continues.
    pub fn extend_selection_to_cursor(&mut self) {
        if !self.selection.is_active() {
            return;
        }
        let anchor = self.selection.anchor();
        let keyboard = self.selection.state.is_keyboard();
        let old = (self.selection.first.line, self.selection.last.line);
        if self.cursor < anchor {
            self.selection.first = self.cursor;
            self.selection.last = anchor;
            self.selection.state = if keyboard {
                SelectionState::KeyboardBottomUp
            } else {
                SelectionState::MouseBottomUp
            };
        } else if self.cursor > anchor {
            self.selection.first = anchor;
            self.selection.last = self.cursor;
            self.selection.state = if keyboard {
                SelectionState::KeyboardTopDown
            } else {
                SelectionState::MouseTopDown
            };
        } else if keyboard {
            self.clear_selection();
            return;
        } else {
            self.selection.first = anchor;
            self.selection.last = anchor;
        }
        let new = (self.selection.first.line, self.selection.last.line);
        self.dirty
            .expand(old.0.min(new.0), old.1.max(new.1));
    }

    /// End a mouse drag: a caret-only selection dissolves, anything else
    /// parks in `MouseComplete`. The auto-scroll timer is disarmed.
    pub fn finish_mouse_selection(&mut self) {
        self.disarm_drag_repeat();
        self.button_down = false;
        if !self.selection.state.is_mouse() {
            return;
        }
        if self.selection.first == self.selection.last {
            self.clear_selection();
        } else {
            self.selection.state = SelectionState::MouseComplete;
        }
    }

    /// Deactivate the selection, repainting the lines it covered.
    pub fn clear_selection(&mut self) {
        if let Some((first, last)) = self.selection.span() {
            self.dirty.expand(first.line, last.line);
        }
        self.selection = Selection::default();
    }
}
