//! The edit control model: line store, cursor, selection, viewport, undo.
//!
//! [`EditControl`] owns the five coupled pieces of state every editing
//! operation must keep consistent: line storage, cursor position, selection
//! range, viewport origin, and the undo/redo stacks. Mutations funnel
//! through three range functions (`insert_range`, `overwrite_range`,
//! `delete_range` in [`edit`]) which log typed undo records, widen the
//! dirty range, and set the modify bit; navigation and selection transitions
//! live in [`cursor`] and [`selection`].
//!
//! Core invariants (must hold after every public call):
//! * `store.populated() <= store.allocated()`.
//! * `cursor.line == 0` or `cursor.line < store.populated()`.
//! * An active keyboard selection has `first < last`; an active mouse
//!   selection has `first <= last` (a caret-only drag is tolerated).
//! * While auto-indent is applied, the cursor sits exactly at
//!   `(applied_line, source_length)`; any other cursor position clears it.
//! * The dirty range only widens between paints; `consume` resets it.
//!
//! The control performs no I/O and never blocks: the paint driver, clipboard
//! and timer are external collaborators reached through narrow traits owned
//! by sibling crates.

use core_text::{Line, LineStore, Location, NavigationStyle};
use thiserror::Error;

pub mod cursor;
pub mod dirty;
pub mod edit;
pub mod selection;
pub mod undo;

pub use dirty::{DirtyRange, LAST_LINE};
pub use selection::{Selection, SelectionKind, SelectionState};
pub use undo::{SplitBuffer, UndoRecord};

/// Error taxonomy of the control. Bounds violations are clamped, never
/// errors; internal inconsistencies are debug assertions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// Size arithmetic overflowed while growing a buffer or the line table.
    #[error("allocation size overflow")]
    Allocation,
    /// The platform clipboard is unavailable for this operation.
    #[error("clipboard unavailable")]
    ClipboardUnavailable,
}

/// Text attribute in the classic 4-bit foreground / 4-bit background
/// encoding the paint layer maps onto the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttr(pub u16);

impl CellAttr {
    /// Light gray on black.
    pub const TEXT: CellAttr = CellAttr(0x07);
    /// Black on light gray (inverse).
    pub const SELECTED: CellAttr = CellAttr(0x70);

    pub fn foreground(self) -> u8 {
        (self.0 & 0x0f) as u8
    }
    pub fn background(self) -> u8 {
        ((self.0 >> 4) & 0x0f) as u8
    }
}

/// Transient auto-indent bookkeeping: set when an inserted line break
/// copied leading whitespace, cleared by any cursor move away from the
/// applied position. While set, backspace dedents instead of deleting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoIndentState {
    /// Line whose whitespace prefix was copied.
    pub source_line: usize,
    /// Number of copied indent characters.
    pub source_length: usize,
    /// Line the indent was prepended to.
    pub applied_line: usize,
}

/// Last mouse-drag position, clamped into the client rectangle, with flags
/// recording which edges the true position escaped past. Re-applied on
/// every timer tick while armed so dragging outside the control keeps
/// scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragPosition {
    pub x: u16,
    pub y: u16,
    pub above: bool,
    pub below: bool,
    pub left: bool,
    pub right: bool,
}

impl DragPosition {
    pub fn outside(&self) -> bool {
        self.above || self.below || self.left || self.right
    }
}

/// The multiline edit control model.
pub struct EditControl {
    pub(crate) store: LineStore,
    pub(crate) cursor: Location,
    pub(crate) display_cursor_offset: usize,
    pub(crate) desired_display_offset: Option<usize>,
    pub(crate) viewport_top: usize,
    pub(crate) viewport_left: usize,
    pub(crate) client_width: u16,
    pub(crate) client_height: u16,
    pub(crate) selection: Selection,
    pub(crate) undo: undo::UndoEngine,
    pub(crate) dirty: DirtyRange,
    pub(crate) caption: String,
    pub(crate) text_attr: CellAttr,
    pub(crate) selected_attr: CellAttr,
    pub(crate) tab_width: usize,
    pub(crate) insert_mode: bool,
    pub(crate) auto_indent: bool,
    pub(crate) nav_style: NavigationStyle,
    pub(crate) read_only: bool,
    pub(crate) user_modified: bool,
    pub(crate) auto_indent_state: Option<AutoIndentState>,
    pub(crate) focused: bool,
    pub(crate) button_down: bool,
    pub(crate) drag_repeat: Option<DragPosition>,
    pub(crate) compose: Option<u32>,
    pub(crate) scrollbar_stale: bool,
    pub(crate) on_cursor_move: Option<Box<dyn FnMut(Location)>>,
}

impl Default for EditControl {
    fn default() -> Self {
        Self::new()
    }
}

impl EditControl {
    /// Create an empty control: no lines, empty undo/redo, origin cursor.
    pub fn new() -> Self {
        Self {
            store: LineStore::new(),
            cursor: Location::origin(),
            display_cursor_offset: 0,
            desired_display_offset: None,
            viewport_top: 0,
            viewport_left: 0,
            client_width: 0,
            client_height: 0,
            selection: Selection::default(),
            undo: undo::UndoEngine::default(),
            dirty: DirtyRange::default(),
            caption: String::new(),
            text_attr: CellAttr::TEXT,
            selected_attr: CellAttr::SELECTED,
            tab_width: 4,
            insert_mode: true,
            auto_indent: false,
            nav_style: NavigationStyle::Modern,
            read_only: false,
            user_modified: false,
            auto_indent_state: None,
            focused: false,
            button_down: false,
            drag_repeat: None,
            compose: None,
            scrollbar_stale: true,
            on_cursor_move: None,
        }
    }

    /// Test/bootstrap convenience: a control seeded with the given lines.
    pub fn with_lines(lines: &[&str]) -> Self {
        let mut ctrl = Self::new();
        ctrl.store = LineStore::from_lines(lines);
        ctrl
    }

    // ------------------------------------------------------------------
    // Read-only inspection
    // ------------------------------------------------------------------

    pub fn store(&self) -> &LineStore {
        &self.store
    }

    pub fn get_line_count(&self) -> usize {
        self.store.populated()
    }

    pub fn get_line_by_index(&self, idx: usize) -> Option<&str> {
        self.store.line(idx).map(Line::as_str)
    }

    pub fn line_len(&self, idx: usize) -> usize {
        self.store.line_len(idx)
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    pub fn navigation_style(&self) -> NavigationStyle {
        self.nav_style
    }

    pub fn auto_indent(&self) -> bool {
        self.auto_indent
    }

    pub fn auto_indent_state(&self) -> Option<AutoIndentState> {
        self.auto_indent_state
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn insert_mode(&self) -> bool {
        self.insert_mode
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn colors(&self) -> (CellAttr, CellAttr) {
        (self.text_attr, self.selected_attr)
    }

    // ------------------------------------------------------------------
    // Host-facing operations
    // ------------------------------------------------------------------

    /// Insert arbitrary (possibly multiline) text at the cursor, moving the
    /// cursor to the end of the insertion. No-op when read-only.
    pub fn insert_text_at_cursor(&mut self, text: &str) -> Result<(), EditError> {
        if self.read_only {
            return Ok(());
        }
        let end = self.insert_range(self.cursor, text, false)?;
        self.clear_desired();
        self.set_cursor(end.line, end.offset);
        self.ensure_visible();
        Ok(())
    }

    /// Owned copy of the selected region, lines joined with `sep`; empty
    /// when no selection is active.
    pub fn get_selected_text(&self, sep: &str) -> String {
        match self.selection.span() {
            Some((first, last)) => self.get_range_text(first, last, sep),
            None => String::new(),
        }
    }

    /// Programmatic selection. Endpoints are normalized and clamped; the
    /// result behaves like a keyboard selection anchored at the start.
    pub fn set_selection_range(
        &mut self,
        start_line: usize,
        start_offset: usize,
        end_line: usize,
        end_offset: usize,
    ) {
        self.clear_selection();
        let mut a = self.clamp_location(Location::new(start_line, start_offset));
        let mut b = self.clamp_location(Location::new(end_line, end_offset));
        if b < a {
            std::mem::swap(&mut a, &mut b);
        }
        if a == b {
            return;
        }
        self.selection = Selection::keyboard(a, b);
        self.dirty.expand(a.line, b.line);
    }

    pub fn get_cursor_location(&self) -> Location {
        self.cursor
    }

    /// Move the cursor programmatically; the line index is clamped to the
    /// populated set.
    pub fn set_cursor_location(&mut self, line: usize, offset: usize) {
        self.clear_desired();
        self.set_cursor(line, offset);
        self.ensure_visible();
    }

    pub fn get_viewport_location(&self) -> (usize, usize) {
        (self.viewport_top, self.viewport_left)
    }

    /// Move the viewport without moving the cursor.
    pub fn set_viewport_location(&mut self, top: usize, left: usize) {
        self.scroll_viewport_to(top, left);
    }

    /// Reset to a pristine empty control, dropping contents and history.
    pub fn clear(&mut self) {
        self.store.clear();
        self.undo.clear();
        self.selection = Selection::default();
        self.cursor = Location::origin();
        self.display_cursor_offset = 0;
        self.desired_display_offset = None;
        self.viewport_top = 0;
        self.viewport_left = 0;
        self.auto_indent_state = None;
        self.user_modified = false;
        self.dirty.expand(0, LAST_LINE);
        self.scrollbar_stale = true;
    }

    pub fn set_caption(&mut self, caption: &str) {
        self.caption.clear();
        self.caption.push_str(caption);
        self.dirty.expand(0, LAST_LINE);
    }

    pub fn set_color(&mut self, text_attr: CellAttr, selected_attr: CellAttr) {
        self.text_attr = text_attr;
        self.selected_attr = selected_attr;
        self.dirty.expand(0, LAST_LINE);
    }

    /// Tab width affects display mapping only; buffer offsets are stable.
    pub fn set_tab_width(&mut self, width: usize) {
        let width = width.max(1);
        if width == self.tab_width {
            return;
        }
        self.tab_width = width;
        self.recompute_display_cursor();
        self.dirty.expand(0, LAST_LINE);
    }

    pub fn set_traditional_navigation(&mut self, traditional: bool) {
        self.nav_style = if traditional {
            NavigationStyle::Traditional
        } else {
            NavigationStyle::Modern
        };
    }

    pub fn set_auto_indent(&mut self, enabled: bool) {
        self.auto_indent = enabled;
        if !enabled {
            self.auto_indent_state = None;
        }
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn get_modify_state(&self) -> bool {
        self.user_modified
    }

    pub fn set_modify_state(&mut self, modified: bool) {
        self.user_modified = modified;
    }

    pub fn is_undo_available(&self) -> bool {
        self.undo.is_undo_available()
    }

    pub fn is_redo_available(&self) -> bool {
        self.undo.is_redo_available()
    }

    /// Toggle between insert and overwrite mode (cursor shape changes).
    pub fn toggle_insert_mode(&mut self) {
        self.insert_mode = !self.insert_mode;
    }

    /// Resize the client area, re-clamping the viewport and forcing a full
    /// repaint.
    pub fn reposition(&mut self, width: u16, height: u16) {
        self.client_width = width;
        self.client_height = height;
        self.ensure_visible();
        self.dirty.expand(0, LAST_LINE);
        self.scrollbar_stale = true;
    }

    pub fn client_size(&self) -> (u16, u16) {
        (self.client_width, self.client_height)
    }

    /// Install a callback invoked from `set_cursor` whenever the cursor
    /// actually moves.
    pub fn set_on_cursor_move(&mut self, cb: Box<dyn FnMut(Location)>) {
        self.on_cursor_move = Some(cb);
    }

    // ------------------------------------------------------------------
    // Focus / mouse / timer bookkeeping used by the event handler
    // ------------------------------------------------------------------

    pub fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn set_button_down(&mut self, down: bool) {
        self.button_down = down;
    }

    pub fn is_button_down(&self) -> bool {
        self.button_down
    }

    /// True while the host should keep delivering recurring timer ticks.
    pub fn needs_recurring_tick(&self) -> bool {
        self.drag_repeat.is_some()
    }

    pub fn arm_drag_repeat(&mut self, pos: DragPosition) {
        self.drag_repeat = Some(pos);
    }

    pub fn disarm_drag_repeat(&mut self) {
        self.drag_repeat = None;
    }

    pub fn drag_repeat(&self) -> Option<DragPosition> {
        self.drag_repeat
    }

    /// Numeric-keypad compose accumulator (Alt held).
    pub fn compose_begin(&mut self) {
        self.compose = Some(0);
    }

    pub fn compose_push_digit(&mut self, digit: u32) {
        if let Some(v) = self.compose {
            self.compose = Some(v.wrapping_mul(10).wrapping_add(digit));
        }
    }

    pub fn compose_active(&self) -> bool {
        self.compose.is_some()
    }

    /// Take the accumulated value, deactivating compose.
    pub fn compose_take(&mut self) -> Option<u32> {
        self.compose.take()
    }

    // ------------------------------------------------------------------
    // Paint support
    // ------------------------------------------------------------------

    /// Consume the dirty range (empty after the call).
    pub fn consume_dirty(&mut self) -> Option<(usize, usize)> {
        self.dirty.consume()
    }

    pub fn dirty_is_empty(&self) -> bool {
        self.dirty.is_empty()
    }

    /// Whether the scroll bar needs a position refresh; reading resets it.
    pub fn take_scrollbar_stale(&mut self) -> bool {
        std::mem::replace(&mut self.scrollbar_stale, false)
    }

    // ------------------------------------------------------------------
    // Shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn clamp_location(&self, loc: Location) -> Location {
        let populated = self.store.populated();
        if populated == 0 {
            return Location::origin();
        }
        let line = loc.line.min(populated - 1);
        let offset = loc.offset.min(self.store.line_len(line));
        Location::new(line, offset)
    }
}
