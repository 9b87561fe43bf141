//! Central event dispatch.
//!
//! One event is processed to completion before the next arrives (the host
//! loop is single-threaded); every state change a handler performs is
//! visible to the next event in the order it was made. Key handlers fire on
//! key-down only, except the numeric-keypad compose commit which fires on
//! Alt release.

use crate::{Clipboard, DispatchContext, DispatchOutcome};
use core_events::{Event, InputEvent, KeyCode, KeyEvent, KeyModifiers};
use core_state::EditControl;
use tracing::trace;

mod edit;
mod motion;
mod mouse;

pub use mouse::handle_tick;

/// Dispatch one event against the control.
pub fn dispatch(
    ctrl: &mut EditControl,
    event: &Event,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    match event {
        Event::Input(InputEvent::Key(key)) => handle_key(ctrl, key, ctx),
        Event::Input(InputEvent::KeyRelease(key)) => handle_key_release(ctrl, key),
        Event::Input(InputEvent::Mouse(ev)) => mouse::handle_mouse(ctrl, ev, ctx),
        Event::Input(InputEvent::Wheel(ev)) => {
            ctrl.scroll_viewport_by(ev.lines as isize);
            DispatchOutcome::handled()
        }
        Event::Input(InputEvent::Paste(text)) => edit::handle_paste_text(ctrl, text),
        Event::Input(InputEvent::FocusGained) => {
            ctrl.set_focus(true);
            DispatchOutcome::handled()
        }
        Event::Input(InputEvent::FocusLost) => {
            ctrl.set_focus(false);
            DispatchOutcome::handled()
        }
        Event::Tick => {
            mouse::handle_tick(ctrl);
            DispatchOutcome::handled()
        }
        // Geometry is the host's concern; it calls `reposition` itself.
        Event::Resize(..) | Event::Shutdown => DispatchOutcome::ignored(),
    }
}

fn handle_key(
    ctrl: &mut EditControl,
    key: &KeyEvent,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    // Alt+numpad digits accumulate a numeric value translated on release.
    if key.mods.contains(KeyModifiers::ALT)
        && key.keypad
        && let KeyCode::Char(c @ '0'..='9') = key.code
    {
        if !ctrl.compose_active() {
            ctrl.compose_begin();
        }
        ctrl.compose_push_digit(c as u32 - '0' as u32);
        return DispatchOutcome::handled();
    }

    let shift = key.mods.contains(KeyModifiers::SHIFT);
    let control = key.mods.contains(KeyModifiers::CTRL);

    match key.code {
        KeyCode::Left => motion::with_selection(ctrl, shift, |c| {
            if control {
                motion::word_left(c, ctx.classifier);
            } else {
                motion::char_left(c);
            }
        }),
        KeyCode::Right => motion::with_selection(ctrl, shift, |c| {
            if control {
                motion::word_right(c, ctx.classifier);
            } else {
                motion::char_right(c);
            }
        }),
        KeyCode::Up => motion::with_selection_vertical(ctrl, shift, -1),
        KeyCode::Down => motion::with_selection_vertical(ctrl, shift, 1),
        KeyCode::Home => motion::with_selection(ctrl, shift, |c| motion::home(c, control)),
        KeyCode::End => motion::with_selection(ctrl, shift, |c| motion::end(c, control)),
        KeyCode::PageUp => motion::page(ctrl, shift, -1),
        KeyCode::PageDown => motion::page(ctrl, shift, 1),
        KeyCode::Backspace => edit::handle_backspace(ctrl),
        KeyCode::Delete => edit::handle_delete(ctrl),
        KeyCode::Insert => {
            ctrl.toggle_insert_mode();
            DispatchOutcome::handled()
        }
        KeyCode::Enter => edit::handle_char(ctrl, '\r'),
        KeyCode::Esc => {
            ctrl.clear_selection();
            DispatchOutcome::handled()
        }
        KeyCode::Tab => edit::handle_char(ctrl, '\t'),
        // Alt chords that are not keypad compose belong to the host menu.
        KeyCode::Char(_) if key.mods.contains(KeyModifiers::ALT) => DispatchOutcome::ignored(),
        KeyCode::Char(c) if control => handle_shortcut(ctrl, c, ctx),
        KeyCode::Char(c) => edit::handle_char(ctrl, c),
        KeyCode::Alt | KeyCode::F(_) => DispatchOutcome::ignored(),
    }
}

/// Only the Alt release is meaningful: it commits a pending numeric-keypad
/// composition.
fn handle_key_release(ctrl: &mut EditControl, key: &KeyEvent) -> DispatchOutcome {
    if !matches!(key.code, KeyCode::Alt) {
        return DispatchOutcome::ignored();
    }
    let Some(value) = ctrl.compose_take() else {
        return DispatchOutcome::ignored();
    };
    match char::from_u32(value) {
        Some(ch) if ch != '\0' => {
            trace!(target: "actions.dispatch", value, "compose_commit");
            edit::handle_char(ctrl, ch)
        }
        _ => DispatchOutcome::handled(),
    }
}

fn handle_shortcut(
    ctrl: &mut EditControl,
    c: char,
    ctx: &mut DispatchContext<'_>,
) -> DispatchOutcome {
    match c.to_ascii_lowercase() {
        'a' => {
            let populated = ctrl.get_line_count();
            if populated > 0 {
                let last = populated - 1;
                let len = ctrl.line_len(last);
                ctrl.set_selection_range(0, 0, last, len);
                ctrl.clear_desired();
                ctrl.set_cursor(last, len);
                ctrl.ensure_visible();
            }
            DispatchOutcome::handled()
        }
        'c' => edit::handle_copy(ctrl, ctx),
        'x' => edit::handle_cut(ctrl, ctx),
        'v' => edit::handle_paste(ctrl, ctx),
        'y' => edit::handle_delete_line(ctrl),
        'z' => {
            if !ctrl.is_read_only() {
                ctrl.undo();
            }
            DispatchOutcome::handled()
        }
        'r' => {
            if !ctrl.is_read_only() {
                ctrl.redo();
            }
            DispatchOutcome::handled()
        }
        _ => DispatchOutcome::ignored(),
    }
}

/// Copy text into the clipboard if one is attached; logs and reports
/// unavailability otherwise.
pub(crate) fn clipboard_copy(
    clipboard: &mut Option<&mut dyn Clipboard>,
    text: &str,
) -> bool {
    match clipboard {
        Some(cb) => match cb.copy(text) {
            Ok(()) => true,
            Err(err) => {
                trace!(target: "actions.dispatch", %err, "clipboard_copy_failed");
                false
            }
        },
        None => false,
    }
}
