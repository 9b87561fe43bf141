//! Editing key handlers: printable characters, Backspace/Delete, line
//! deletion, and the clipboard commands.
//!
//! A selection, when present, is consumed first (typing replaces it); the
//! selection is cleared only after the deletion has been applied. All
//! handlers are no-ops in read-only mode but still consume their key.

use super::clipboard_copy;
use crate::{DispatchContext, DispatchOutcome, delete_selection};
use core_state::EditControl;
use core_text::Location;
use tracing::trace;

pub(crate) fn handle_char(ctrl: &mut EditControl, ch: char) -> DispatchOutcome {
    if ctrl.is_read_only() {
        return DispatchOutcome::handled();
    }
    delete_selection(ctrl);
    let at = ctrl.get_cursor_location();
    let mut buf = [0u8; 4];
    let text: &str = ch.encode_utf8(&mut buf);
    let result = if ctrl.insert_mode() {
        ctrl.insert_range(at, text, false)
    } else {
        ctrl.overwrite_range(at, text, false)
    };
    match result {
        Ok(end) => {
            ctrl.clear_desired();
            ctrl.set_cursor(end.line, end.offset);
            ctrl.ensure_visible();
        }
        Err(err) => {
            trace!(target: "actions.dispatch", %err, "char_insert_failed");
        }
    }
    DispatchOutcome::handled()
}

pub(crate) fn handle_backspace(ctrl: &mut EditControl) -> DispatchOutcome {
    if ctrl.is_read_only() {
        return DispatchOutcome::handled();
    }
    if delete_selection(ctrl) {
        ctrl.ensure_visible();
        return DispatchOutcome::handled();
    }
    if ctrl.retreat_auto_indent() {
        ctrl.ensure_visible();
        return DispatchOutcome::handled();
    }
    let cur = ctrl.get_cursor_location();
    if cur.offset == 0 {
        if cur.line > 0 {
            let prev_len = ctrl.line_len(cur.line - 1);
            ctrl.delete_range(
                Location::new(cur.line - 1, prev_len),
                Location::new(cur.line, 0),
                true,
                false,
            );
            ctrl.clear_desired();
            ctrl.set_cursor(cur.line - 1, prev_len);
        }
    } else if cur.offset > ctrl.line_len(cur.line) {
        // Beyond end-of-line (traditional navigation): nothing to delete,
        // the cursor just steps left through virtual space.
        ctrl.clear_desired();
        ctrl.set_cursor(cur.line, cur.offset - 1);
    } else {
        ctrl.delete_range(
            Location::new(cur.line, cur.offset - 1),
            Location::new(cur.line, cur.offset),
            true,
            false,
        );
        ctrl.clear_desired();
        ctrl.set_cursor(cur.line, cur.offset - 1);
    }
    ctrl.ensure_visible();
    DispatchOutcome::handled()
}

pub(crate) fn handle_delete(ctrl: &mut EditControl) -> DispatchOutcome {
    if ctrl.is_read_only() {
        return DispatchOutcome::handled();
    }
    if delete_selection(ctrl) {
        ctrl.ensure_visible();
        return DispatchOutcome::handled();
    }
    let cur = ctrl.get_cursor_location();
    let len = ctrl.line_len(cur.line);
    if cur.offset >= len {
        if cur.line + 1 < ctrl.get_line_count() {
            ctrl.delete_range(
                Location::new(cur.line, len),
                Location::new(cur.line + 1, 0),
                false,
                false,
            );
        }
    } else {
        ctrl.delete_range(
            Location::new(cur.line, cur.offset),
            Location::new(cur.line, cur.offset + 1),
            false,
            false,
        );
    }
    ctrl.clear_desired();
    ctrl.ensure_visible();
    DispatchOutcome::handled()
}

/// Ctrl+Y: delete the cursor line (including its terminator when a
/// successor exists).
pub(crate) fn handle_delete_line(ctrl: &mut EditControl) -> DispatchOutcome {
    if ctrl.is_read_only() || ctrl.get_line_count() == 0 {
        return DispatchOutcome::handled();
    }
    ctrl.clear_selection();
    let cur = ctrl.get_cursor_location();
    if cur.line + 1 < ctrl.get_line_count() {
        ctrl.delete_range(
            Location::new(cur.line, 0),
            Location::new(cur.line + 1, 0),
            false,
            false,
        );
    } else {
        ctrl.delete_range(
            Location::new(cur.line, 0),
            Location::new(cur.line, ctrl.line_len(cur.line)),
            false,
            false,
        );
    }
    ctrl.clear_desired();
    ctrl.set_cursor(cur.line, 0);
    ctrl.ensure_visible();
    DispatchOutcome::handled()
}

pub(crate) fn handle_copy(
    ctrl: &mut EditControl,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    let text = ctrl.get_selected_text("\n");
    if !text.is_empty() {
        clipboard_copy(&mut ctx.clipboard, &text);
    }
    DispatchOutcome::handled()
}

pub(crate) fn handle_cut(ctrl: &mut EditControl, ctx: &mut DispatchContext<'_>) -> DispatchOutcome {
    let text = ctrl.get_selected_text("\n");
    if text.is_empty() {
        return DispatchOutcome::handled();
    }
    if !clipboard_copy(&mut ctx.clipboard, &text) {
        return DispatchOutcome::handled();
    }
    if !ctrl.is_read_only() {
        delete_selection(ctrl);
        ctrl.ensure_visible();
    }
    DispatchOutcome::handled()
}

pub(crate) fn handle_paste(
    ctrl: &mut EditControl,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    if ctrl.is_read_only() {
        return DispatchOutcome::handled();
    }
    let text = match ctx.clipboard.as_mut() {
        Some(cb) => match cb.paste() {
            Ok(text) => text,
            Err(err) => {
                trace!(target: "actions.dispatch", %err, "paste_failed");
                return DispatchOutcome::handled();
            }
        },
        None => return DispatchOutcome::handled(),
    };
    handle_paste_text(ctrl, &text)
}

/// Shared by Ctrl+V and bracketed paste from the terminal.
pub(crate) fn handle_paste_text(ctrl: &mut EditControl, text: &str) -> DispatchOutcome {
    if ctrl.is_read_only() || text.is_empty() {
        return DispatchOutcome::handled();
    }
    delete_selection(ctrl);
    let at = ctrl.get_cursor_location();
    match ctrl.insert_range(at, text, false) {
        Ok(end) => {
            ctrl.clear_desired();
            ctrl.set_cursor(end.line, end.offset);
            ctrl.ensure_visible();
        }
        Err(err) => {
            trace!(target: "actions.dispatch", %err, "paste_insert_failed");
        }
    }
    DispatchOutcome::handled()
}
