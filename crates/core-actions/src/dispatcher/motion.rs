//! Cursor motion handlers.
//!
//! Horizontal motion, Home/End and page jumps clear the desired display
//! offset; vertical motion populates and preserves it. Shift extends a
//! keyboard selection anchored before the move; any unshifted motion
//! clears the selection.

use crate::DispatchOutcome;
use core_state::{EditControl, SelectionKind};
use core_text::{BreakClassifier, NavigationStyle};

pub(crate) fn with_selection<F>(ctrl: &mut EditControl, shift: bool, motion: F) -> DispatchOutcome
where
    F: FnOnce(&mut EditControl),
{
    if shift {
        ctrl.start_selection(SelectionKind::Keyboard);
    } else {
        ctrl.clear_selection();
    }
    motion(ctrl);
    if shift {
        ctrl.extend_selection_to_cursor();
    }
    ctrl.ensure_visible();
    DispatchOutcome::handled()
}

pub(crate) fn with_selection_vertical(
    ctrl: &mut EditControl,
    shift: bool,
    delta: isize,
) -> DispatchOutcome {
    with_selection(ctrl, shift, |c| {
        c.move_vertical(delta);
    })
}

/// Page motion moves the cursor a viewport height; `ensure_visible` then
/// drags the viewport along, which keeps the cursor on the same screen row
/// away from the buffer edges.
pub(crate) fn page(ctrl: &mut EditControl, shift: bool, direction: isize) -> DispatchOutcome {
    let height = ctrl.client_size().1.max(1) as isize;
    with_selection_vertical(ctrl, shift, direction * height)
}

pub(crate) fn char_left(ctrl: &mut EditControl) {
    ctrl.clear_desired();
    let cur = ctrl.get_cursor_location();
    match ctrl.navigation_style() {
        NavigationStyle::Traditional => {
            if cur.offset > 0 {
                ctrl.set_cursor(cur.line, cur.offset - 1);
            }
        }
        NavigationStyle::Modern => {
            if cur.offset > 0 {
                ctrl.set_cursor(cur.line, cur.offset - 1);
            } else if cur.line > 0 {
                let len = ctrl.line_len(cur.line - 1);
                ctrl.set_cursor(cur.line - 1, len);
            }
        }
    }
}

pub(crate) fn char_right(ctrl: &mut EditControl) {
    ctrl.clear_desired();
    let cur = ctrl.get_cursor_location();
    match ctrl.navigation_style() {
        NavigationStyle::Traditional => {
            ctrl.set_cursor(cur.line, cur.offset + 1);
        }
        NavigationStyle::Modern => {
            if cur.offset < ctrl.line_len(cur.line) {
                ctrl.set_cursor(cur.line, cur.offset + 1);
            } else if cur.line + 1 < ctrl.get_line_count() {
                ctrl.set_cursor(cur.line + 1, 0);
            }
        }
    }
}

pub(crate) fn home(ctrl: &mut EditControl, buffer_wide: bool) {
    ctrl.clear_desired();
    if buffer_wide {
        ctrl.set_cursor(0, 0);
    } else {
        let cur = ctrl.get_cursor_location();
        ctrl.set_cursor(cur.line, 0);
    }
}

pub(crate) fn end(ctrl: &mut EditControl, buffer_wide: bool) {
    ctrl.clear_desired();
    if buffer_wide {
        let last = ctrl.get_line_count().saturating_sub(1);
        let len = ctrl.line_len(last);
        ctrl.set_cursor(last, len);
    } else {
        let cur = ctrl.get_cursor_location();
        ctrl.set_cursor(cur.line, ctrl.line_len(cur.line));
    }
}

/// Jump to the start of the previous word, skipping any break characters
/// between. Modern navigation crosses line boundaries.
pub(crate) fn word_left(ctrl: &mut EditControl, cls: &dyn BreakClassifier) {
    ctrl.clear_desired();
    let cur = ctrl.get_cursor_location();
    let mut line = cur.line;
    let mut off = cur.offset.min(ctrl.line_len(line));
    if off == 0 {
        if matches!(ctrl.navigation_style(), NavigationStyle::Modern) && line > 0 {
            line -= 1;
            off = ctrl.line_len(line);
        } else {
            ctrl.set_cursor(line, 0);
            return;
        }
    }
    let chars: Vec<char> = ctrl.get_line_by_index(line).unwrap_or("").chars().collect();
    while off > 0 && cls.is_word_break(chars[off - 1]) {
        off -= 1;
    }
    while off > 0 && !cls.is_word_break(chars[off - 1]) {
        off -= 1;
    }
    ctrl.set_cursor(line, off);
}

/// Jump past the current word and the break run after it. Modern
/// navigation crosses line boundaries at end-of-line.
pub(crate) fn word_right(ctrl: &mut EditControl, cls: &dyn BreakClassifier) {
    ctrl.clear_desired();
    let cur = ctrl.get_cursor_location();
    let mut line = cur.line;
    let mut off = cur.offset.min(ctrl.line_len(line));
    if off >= ctrl.line_len(line) {
        if matches!(ctrl.navigation_style(), NavigationStyle::Modern)
            && line + 1 < ctrl.get_line_count()
        {
            line += 1;
            off = 0;
        } else {
            ctrl.set_cursor(line, off);
            return;
        }
    }
    let chars: Vec<char> = ctrl.get_line_by_index(line).unwrap_or("").chars().collect();
    let len = chars.len();
    while off < len && !cls.is_word_break(chars[off]) {
        off += 1;
    }
    while off < len && cls.is_word_break(chars[off]) {
        off += 1;
    }
    ctrl.set_cursor(line, off);
}
