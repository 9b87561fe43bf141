//! Cursor and viewport maintenance.
//!
//! The cursor lives in buffer space; `display_cursor_offset` is derived
//! after every change. `desired_display_offset` is populated by the first
//! vertical move and survives further vertical navigation; horizontal
//! motion, Home/End and edits clear it through `clear_desired`.

use crate::{EditControl, LAST_LINE};
use core_text::{Location, buffer_from_display, display_from_buffer};

impl EditControl {
    pub fn display_cursor_offset(&self) -> usize {
        self.display_cursor_offset
    }

    /// Move the cursor, clamping the line index to the populated set. A
    /// no-op when the target equals the current position. Clears the
    /// auto-indent-applied state unless the new position is exactly the
    /// applied one, and fires the `on_cursor_move` callback.
    pub fn set_cursor(&mut self, line: usize, offset: usize) {
        let populated = self.store.populated();
        let line = if populated == 0 {
            0
        } else {
            line.min(populated - 1)
        };
        let loc = Location::new(line, offset);
        if loc == self.cursor {
            return;
        }
        self.cursor = loc;
        self.recompute_display_cursor();
        match self.auto_indent_state {
            Some(st) if st.applied_line == line && st.source_length == offset => {}
            _ => self.auto_indent_state = None,
        }
        if let Some(cb) = self.on_cursor_move.as_mut() {
            cb(loc);
        }
    }

    pub(crate) fn recompute_display_cursor(&mut self) {
        self.display_cursor_offset = display_from_buffer(
            self.store.line_str(self.cursor.line),
            self.cursor.offset,
            self.tab_width,
        );
    }

    /// Remember the current display column as the one vertical navigation
    /// should re-acquire. Only the first vertical move populates it.
    pub fn populate_desired(&mut self) {
        if self.desired_display_offset.is_none() {
            self.desired_display_offset = Some(self.display_cursor_offset);
        }
    }

    pub fn clear_desired(&mut self) {
        self.desired_display_offset = None;
    }

    pub fn desired_display_offset(&self) -> Option<usize> {
        self.desired_display_offset
    }

    /// Vertical navigation: move `delta` lines, re-acquiring the desired
    /// display column on the target line. Returns false at the buffer
    /// edges.
    pub fn move_vertical(&mut self, delta: isize) -> bool {
        let populated = self.store.populated();
        if populated == 0 {
            return false;
        }
        self.populate_desired();
        let target = (self.cursor.line as isize + delta).clamp(0, populated as isize - 1) as usize;
        if target == self.cursor.line {
            return false;
        }
        let desired = self
            .desired_display_offset
            .unwrap_or(self.display_cursor_offset);
        let offset = buffer_from_display(
            self.store.line_str(target),
            desired,
            self.tab_width,
            self.nav_style,
        );
        self.set_cursor(target, offset);
        true
    }

    /// Minimal viewport adjustment so the cursor (and, for a single-line
    /// selection, its endpoints where they fit) is visible. Any viewport
    /// change invalidates the whole client area and the scroll bar.
    pub fn ensure_visible(&mut self) {
        let h = self.client_height as usize;
        let w = self.client_width as usize;
        if h == 0 || w == 0 {
            return;
        }
        let mut top = self.viewport_top;
        let mut left = self.viewport_left;

        if self.cursor.line < top {
            top = self.cursor.line;
        } else if self.cursor.line >= top + h {
            top = self.cursor.line + 1 - h;
        }

        let col = self.display_cursor_offset;
        if col < left {
            left = col;
        } else if col >= left + w {
            left = col + 1 - w;
        }

        if let Some((a, b)) = self.selection.span()
            && a.line == b.line
        {
            let line = self.store.line_str(a.line);
            let ca = display_from_buffer(line, a.offset, self.tab_width);
            let cb = display_from_buffer(line, b.offset, self.tab_width);
            // Pull endpoints into view without ever losing the cursor.
            if ca < left {
                left = ca.max(col.saturating_sub(w - 1));
            }
            if cb >= left + w {
                left = (cb + 1 - w).clamp(col.saturating_sub(w - 1), col);
            }
        }

        if top != self.viewport_top || left != self.viewport_left {
            self.viewport_top = top;
            self.viewport_left = left;
            self.dirty.expand(0, LAST_LINE);
            self.scrollbar_stale = true;
        }
    }

    /// Move the viewport without touching the cursor (wheel / programmatic
    /// scrolling). The top is clamped to the populated set.
    pub fn scroll_viewport_to(&mut self, top: usize, left: usize) {
        let max_top = self.store.populated().saturating_sub(1);
        let top = top.min(max_top);
        if top == self.viewport_top && left == self.viewport_left {
            return;
        }
        self.viewport_top = top;
        self.viewport_left = left;
        self.dirty.expand(0, LAST_LINE);
        self.scrollbar_stale = true;
    }

    /// Relative vertical scroll (positive is down).
    pub fn scroll_viewport_by(&mut self, delta: isize) {
        let top = if delta.is_negative() {
            self.viewport_top.saturating_sub(delta.unsigned_abs())
        } else {
            self.viewport_top.saturating_add(delta as usize)
        };
        self.scroll_viewport_to(top, self.viewport_left);
    }
}
