//! Mouse handling: caret placement, drag selection with auto-scroll, and
//! double-click word selection.
//!
//! While the button is held, positions outside the client rectangle are
//! clamped back in and the escaped edges recorded; each application of the
//! drag scrolls one line or column past the hit edge and extends the
//! selection. The clamped position is re-armed as the tick repeat payload
//! so the host timer keeps the scroll going until the pointer returns or
//! the button is released.

use crate::{DispatchContext, DispatchOutcome};
use core_events::{MouseButton, MouseEvent, MouseEventKind};
use core_state::{DragPosition, EditControl, SelectionKind};
use core_text::{Location, buffer_from_display};

pub(crate) fn handle_mouse(
    ctrl: &mut EditControl,
    ev: &MouseEvent,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    match ev.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let loc = location_at(ctrl, ev.column, ev.row);
            ctrl.clear_selection();
            ctrl.clear_desired();
            ctrl.set_cursor(loc.line, loc.offset);
            ctrl.start_selection(SelectionKind::Mouse);
            ctrl.set_button_down(true);
            ctrl.ensure_visible();
            DispatchOutcome::handled()
        }
        MouseEventKind::Drag(MouseButton::Left) => drag(ctrl, ev.column, ev.row),
        MouseEventKind::Moved if ctrl.is_button_down() => drag(ctrl, ev.column, ev.row),
        MouseEventKind::Up(MouseButton::Left) => {
            ctrl.finish_mouse_selection();
            DispatchOutcome::handled()
        }
        MouseEventKind::DoubleClick(MouseButton::Left) => double_click(ctrl, ev, ctx),
        _ => DispatchOutcome::ignored(),
    }
}

/// Recurring timer tick: repeat the last out-of-bounds drag position for
/// continuous scroll.
pub fn handle_tick(ctrl: &mut EditControl) {
    if let Some(pos) = ctrl.drag_repeat() {
        apply_drag(ctrl, pos);
    }
}

/// Translate a client-relative cell to a buffer location.
fn location_at(ctrl: &EditControl, column: i32, row: i32) -> Location {
    let (top, left) = ctrl.get_viewport_location();
    let populated = ctrl.get_line_count();
    let line_target = top + row.max(0) as usize;
    let line = if populated == 0 {
        0
    } else {
        line_target.min(populated - 1)
    };
    let display = left + column.max(0) as usize;
    let offset = buffer_from_display(
        ctrl.get_line_by_index(line).unwrap_or(""),
        display,
        ctrl.tab_width(),
        ctrl.navigation_style(),
    );
    Location::new(line, offset)
}

fn drag(ctrl: &mut EditControl, column: i32, row: i32) -> DispatchOutcome {
    if !ctrl.is_button_down() {
        return DispatchOutcome::ignored();
    }
    let (w, h) = ctrl.client_size();
    if w == 0 || h == 0 {
        return DispatchOutcome::handled();
    }
    let pos = DragPosition {
        x: column.clamp(0, w as i32 - 1) as u16,
        y: row.clamp(0, h as i32 - 1) as u16,
        above: row < 0,
        below: row >= h as i32,
        left: column < 0,
        right: column >= w as i32,
    };
    apply_drag(ctrl, pos);
    if pos.outside() {
        ctrl.arm_drag_repeat(pos);
    } else {
        ctrl.disarm_drag_repeat();
    }
    DispatchOutcome::handled()
}

/// One application of a (possibly clamped) drag position: move the cursor
/// one line or column past any hit edge, extend the selection, and let
/// `ensure_visible` perform the actual scroll.
fn apply_drag(ctrl: &mut EditControl, pos: DragPosition) {
    let (w, h) = ctrl.client_size();
    let (top, left) = ctrl.get_viewport_location();
    let populated = ctrl.get_line_count();

    let line_target = if pos.above {
        top.saturating_sub(1)
    } else if pos.below {
        top + h as usize
    } else {
        top + pos.y as usize
    };
    let line = if populated == 0 {
        0
    } else {
        line_target.min(populated - 1)
    };

    let column = if pos.left {
        left.saturating_sub(1)
    } else if pos.right {
        left + w as usize
    } else {
        left + pos.x as usize
    };

    let offset = buffer_from_display(
        ctrl.get_line_by_index(line).unwrap_or(""),
        column,
        ctrl.tab_width(),
        ctrl.navigation_style(),
    );
    ctrl.clear_desired();
    ctrl.set_cursor(line, offset);
    ctrl.extend_selection_to_cursor();
    ctrl.ensure_visible();
}

/// Double-click selects the word under the pointer by expanding in both
/// directions; a click on a break character selects the break run instead.
fn double_click(
    ctrl: &mut EditControl,
    ev: &MouseEvent,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    let loc = location_at(ctrl, ev.column, ev.row);
    let chars: Vec<char> = ctrl
        .get_line_by_index(loc.line)
        .unwrap_or("")
        .chars()
        .collect();
    let len = chars.len();
    if len == 0 {
        ctrl.clear_selection();
        ctrl.clear_desired();
        ctrl.set_cursor(loc.line, 0);
        return DispatchOutcome::handled();
    }
    let probe = loc.offset.min(len - 1);
    let cls = ctx.classifier;
    let in_break = cls.is_word_break(chars[probe]);
    let mut start = probe;
    let mut end = probe;
    while start > 0 && cls.is_word_break(chars[start - 1]) == in_break {
        start -= 1;
    }
    while end < len && cls.is_word_break(chars[end]) == in_break {
        end += 1;
    }

    ctrl.clear_selection();
    ctrl.clear_desired();
    ctrl.set_cursor(loc.line, start);
    ctrl.start_selection(SelectionKind::Mouse);
    ctrl.set_cursor(loc.line, end);
    ctrl.extend_selection_to_cursor();
    ctrl.finish_mouse_selection();
    ctrl.ensure_visible();
    DispatchOutcome::handled()
}
