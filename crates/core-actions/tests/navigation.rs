mod common;

use common::*;
use core_events::{Event, InputEvent, KeyCode, KeyEvent, KeyModifiers};

fn ctrl_shift(code: KeyCode) -> Event {
    Event::Input(InputEvent::Key(KeyEvent::with_mods(
        code,
        KeyModifiers::CTRL | KeyModifiers::SHIFT,
    )))
}

#[test]
fn ctrl_end_jumps_to_buffer_end() {
    let mut c = control(&["line1", "line2", "line3"]);
    send(&mut c, &ctrl_key(KeyCode::End));
    assert_eq!(cursor(&c), (2, 5));
    send(&mut c, &ctrl_key(KeyCode::Home));
    assert_eq!(cursor(&c), (0, 0));
}

#[test]
fn home_and_end_stay_on_line() {
    let mut c = control(&["abc", "defgh"]);
    c.set_cursor_location(1, 2);
    send(&mut c, &key(KeyCode::End));
    assert_eq!(cursor(&c), (1, 5));
    send(&mut c, &key(KeyCode::Home));
    assert_eq!(cursor(&c), (1, 0));
}

#[test]
fn left_right_cross_lines_in_modern_mode() {
    let mut c = control(&["ab", "cd"]);
    c.set_cursor_location(0, 2);
    send(&mut c, &key(KeyCode::Right));
    assert_eq!(cursor(&c), (1, 0));
    send(&mut c, &key(KeyCode::Left));
    assert_eq!(cursor(&c), (0, 2));
}

#[test]
fn left_right_stay_on_line_in_traditional_mode() {
    let mut c = control(&["ab", "cd"]);
    c.set_traditional_navigation(true);
    c.set_cursor_location(0, 2);
    send(&mut c, &key(KeyCode::Right));
    assert_eq!(cursor(&c), (0, 3), "cursor rests beyond end-of-line");
    c.set_cursor_location(1, 0);
    send(&mut c, &key(KeyCode::Left));
    assert_eq!(cursor(&c), (1, 0));
}

#[test]
fn vertical_moves_keep_desired_column() {
    let mut c = control(&["a long first line", "x", "a long third line"]);
    c.set_cursor_location(0, 10);
    send(&mut c, &key(KeyCode::Down));
    assert_eq!(cursor(&c), (1, 1));
    send(&mut c, &key(KeyCode::Down));
    assert_eq!(cursor(&c), (2, 10));
    // Horizontal motion forgets the desired column.
    send(&mut c, &key(KeyCode::Left));
    send(&mut c, &key(KeyCode::Up));
    assert_eq!(cursor(&c), (1, 1));
    send(&mut c, &key(KeyCode::Up));
    assert_eq!(cursor(&c), (0, 9));
}

#[test]
fn ctrl_right_jumps_word_boundaries() {
    let mut c = control(&["one two-three  four"]);
    c.set_cursor_location(0, 0);
    send(&mut c, &ctrl_key(KeyCode::Right));
    assert_eq!(cursor(&c), (0, 4)); // start of "two"
    send(&mut c, &ctrl_key(KeyCode::Right));
    assert_eq!(cursor(&c), (0, 8)); // '-' is a break: start of "three"
    send(&mut c, &ctrl_key(KeyCode::Right));
    assert_eq!(cursor(&c), (0, 15)); // past the double space
}

#[test]
fn ctrl_left_jumps_back_and_crosses_lines() {
    let mut c = control(&["one two", "three"]);
    c.set_cursor_location(1, 0);
    send(&mut c, &ctrl_key(KeyCode::Left));
    assert_eq!(cursor(&c), (0, 4)); // start of "two"
    send(&mut c, &ctrl_key(KeyCode::Left));
    assert_eq!(cursor(&c), (0, 0));
}

#[test]
fn page_keys_move_a_viewport_height() {
    let lines_data: Vec<String> = (0..50).map(|i| format!("line {i}")).collect();
    let refs: Vec<&str> = lines_data.iter().map(String::as_str).collect();
    let mut c = control(&refs);
    send(&mut c, &key(KeyCode::PageDown));
    assert_eq!(cursor(&c).0, 10);
    let (top, _) = c.get_viewport_location();
    assert_eq!(top, 1); // cursor pulled the viewport one line past the fold
    send(&mut c, &key(KeyCode::PageUp));
    assert_eq!(cursor(&c).0, 0);
}

#[test]
fn shift_ctrl_end_selects_to_buffer_end() {
    let mut c = control(&["ab", "cd"]);
    c.set_cursor_location(0, 1);
    send(&mut c, &ctrl_shift(KeyCode::End));
    assert_eq!(c.get_selected_text("\n"), "b\ncd");
}

#[test]
fn wheel_scrolls_viewport_not_cursor() {
    let lines_data: Vec<String> = (0..40).map(|i| format!("l{i}")).collect();
    let refs: Vec<&str> = lines_data.iter().map(String::as_str).collect();
    let mut c = control(&refs);
    send(&mut c, &wheel(3));
    assert_eq!(c.get_viewport_location().0, 3);
    assert_eq!(cursor(&c), (0, 0));
    send(&mut c, &wheel(-5));
    assert_eq!(c.get_viewport_location().0, 0);
}

#[test]
fn focus_events_toggle_focus() {
    let mut c = control(&["x"]);
    send(&mut c, &Event::Input(InputEvent::FocusLost));
    assert!(!c.is_focused());
    send(&mut c, &Event::Input(InputEvent::FocusGained));
    assert!(c.is_focused());
}
