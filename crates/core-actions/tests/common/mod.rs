#![allow(dead_code)] // Shared across many integration tests; each test binary uses a subset of helpers.

use core_actions::{DispatchContext, DispatchOutcome, LocalClipboard, dispatch};
use core_events::{Event, InputEvent, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind, WheelEvent};
use core_state::EditControl;

/// Control seeded with lines and a client area, focused, auto-indent on,
/// modern navigation, tab width 4 (the end-to-end scenario defaults).
pub fn control(lines: &[&str]) -> EditControl {
    let mut c = EditControl::with_lines(lines);
    c.reposition(40, 10);
    c.set_focus(true);
    c.set_auto_indent(true);
    c
}

pub fn key(code: KeyCode) -> Event {
    Event::Input(InputEvent::Key(KeyEvent::new(code)))
}

pub fn ch(c: char) -> Event {
    key(KeyCode::Char(c))
}

pub fn shift(code: KeyCode) -> Event {
    Event::Input(InputEvent::Key(KeyEvent::with_mods(code, KeyModifiers::SHIFT)))
}

pub fn ctrl_key(code: KeyCode) -> Event {
    Event::Input(InputEvent::Key(KeyEvent::with_mods(code, KeyModifiers::CTRL)))
}

pub fn mouse(kind: MouseEventKind, column: i32, row: i32) -> Event {
    Event::Input(InputEvent::Mouse(MouseEvent {
        kind,
        column,
        row,
        mods: KeyModifiers::empty(),
    }))
}

pub fn mouse_down(column: i32, row: i32) -> Event {
    mouse(MouseEventKind::Down(MouseButton::Left), column, row)
}

pub fn mouse_drag(column: i32, row: i32) -> Event {
    mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
}

pub fn mouse_up(column: i32, row: i32) -> Event {
    mouse(MouseEventKind::Up(MouseButton::Left), column, row)
}

pub fn double_click(column: i32, row: i32) -> Event {
    mouse(MouseEventKind::DoubleClick(MouseButton::Left), column, row)
}

pub fn wheel(lines: i32) -> Event {
    Event::Input(InputEvent::Wheel(WheelEvent { lines }))
}

/// Dispatch without a clipboard.
pub fn send(ctrl: &mut EditControl, event: &Event) -> DispatchOutcome {
    let mut ctx = DispatchContext::default();
    dispatch(ctrl, event, &mut ctx)
}

/// Dispatch a sequence without a clipboard.
pub fn send_all(ctrl: &mut EditControl, events: &[Event]) {
    for ev in events {
        send(ctrl, ev);
    }
}

/// Dispatch against a clipboard.
pub fn send_with_clipboard(
    ctrl: &mut EditControl,
    clipboard: &mut LocalClipboard,
    event: &Event,
) -> DispatchOutcome {
    let mut ctx = DispatchContext::new(Some(clipboard));
    dispatch(ctrl, event, &mut ctx)
}

/// Type a string one printable key at a time.
pub fn type_str(ctrl: &mut EditControl, text: &str) {
    for c in text.chars() {
        send(ctrl, &ch(c));
    }
}

pub fn lines(ctrl: &EditControl) -> Vec<String> {
    (0..ctrl.get_line_count())
        .map(|i| ctrl.get_line_by_index(i).unwrap_or("").to_string())
        .collect()
}

pub fn cursor(ctrl: &EditControl) -> (usize, usize) {
    let loc = ctrl.get_cursor_location();
    (loc.line, loc.offset)
}
