mod common;

use common::*;
use core_events::Event;
use core_state::SelectionState;

#[test]
fn click_places_cursor_and_clears_selection() {
    let mut c = control(&["hello world", "second"]);
    c.set_selection_range(0, 0, 0, 5);
    send(&mut c, &mouse_down(3, 1));
    assert_eq!(cursor(&c), (1, 3));
    // A fresh mouse selection is a caret until the drag moves.
    assert_eq!(c.selection().state, SelectionState::MouseTopDown);
    assert_eq!(c.get_selected_text("\n"), "");
}

#[test]
fn click_through_tab_lands_on_tab_cell() {
    let mut c = control(&["\tabc"]);
    // Tab width 4: cells 0..4 are the tab.
    send(&mut c, &mouse_down(2, 0));
    assert_eq!(cursor(&c), (0, 0));
    send(&mut c, &mouse_down(5, 0));
    assert_eq!(cursor(&c), (0, 2));
}

#[test]
fn drag_extends_mouse_selection() {
    let mut c = control(&["hello world"]);
    send(&mut c, &mouse_down(1, 0));
    send(&mut c, &mouse_drag(6, 0));
    assert_eq!(c.selection().state, SelectionState::MouseTopDown);
    assert_eq!(c.get_selected_text("\n"), "ello ");
    send(&mut c, &mouse_up(6, 0));
    assert_eq!(c.selection().state, SelectionState::MouseComplete);
    assert_eq!(c.get_selected_text("\n"), "ello ");
}

#[test]
fn drag_upward_builds_bottom_up_selection() {
    let mut c = control(&["abc", "def", "ghi"]);
    send(&mut c, &mouse_down(2, 2));
    send(&mut c, &mouse_drag(1, 0));
    assert_eq!(c.selection().state, SelectionState::MouseBottomUp);
    assert_eq!(c.get_selected_text("\n"), "bc\ndef\ngh");
}

#[test]
fn caret_only_drag_dissolves_on_release() {
    let mut c = control(&["abc"]);
    send(&mut c, &mouse_down(1, 0));
    send(&mut c, &mouse_drag(1, 0));
    send(&mut c, &mouse_up(1, 0));
    assert!(!c.selection_active());
}

#[test]
fn drag_below_client_arms_timer_and_ticks_scroll() {
    let data: Vec<String> = (0..40).map(|i| format!("line{i}")).collect();
    let refs: Vec<&str> = data.iter().map(String::as_str).collect();
    let mut c = control(&refs); // client is 40x10
    send(&mut c, &mouse_down(2, 0));
    assert!(!c.needs_recurring_tick());

    // Drag below the client rectangle: position clamps in, timer arms.
    send(&mut c, &mouse_drag(2, 25));
    assert!(c.needs_recurring_tick());
    let (top_after_drag, _) = c.get_viewport_location();
    assert_eq!(top_after_drag, 1, "one line per edge hit");

    // Each tick repeats the out-of-bounds position and scrolls one more.
    send(&mut c, &Event::Tick);
    send(&mut c, &Event::Tick);
    let (top, _) = c.get_viewport_location();
    assert_eq!(top, 3);
    assert!(c.selection_active());
    let sel = c.selection();
    assert_eq!(sel.first.line, 0);
    assert!(sel.last.line >= 12);

    // Release: timer disarmed, selection finalized.
    send(&mut c, &mouse_up(2, 9));
    assert!(!c.needs_recurring_tick());
    assert_eq!(c.selection().state, SelectionState::MouseComplete);
}

#[test]
fn drag_back_inside_disarms_timer() {
    let data: Vec<String> = (0..40).map(|i| format!("line{i}")).collect();
    let refs: Vec<&str> = data.iter().map(String::as_str).collect();
    let mut c = control(&refs);
    send(&mut c, &mouse_down(2, 0));
    send(&mut c, &mouse_drag(2, 30));
    assert!(c.needs_recurring_tick());
    send(&mut c, &mouse_drag(2, 5));
    assert!(!c.needs_recurring_tick());
}

#[test]
fn drag_above_scrolls_up() {
    let data: Vec<String> = (0..40).map(|i| format!("line{i}")).collect();
    let refs: Vec<&str> = data.iter().map(String::as_str).collect();
    let mut c = control(&refs);
    c.set_cursor_location(20, 0);
    c.set_viewport_location(15, 0);
    send(&mut c, &mouse_down(2, 3)); // buffer line 18
    send(&mut c, &mouse_drag(2, -2));
    assert!(c.needs_recurring_tick());
    let (top, _) = c.get_viewport_location();
    assert_eq!(top, 14);
    send(&mut c, &Event::Tick);
    assert_eq!(c.get_viewport_location().0, 13);
}

#[test]
fn double_click_selects_word() {
    let mut c = control(&["one two-three"]);
    send(&mut c, &double_click(5, 0)); // inside "two"
    assert_eq!(c.get_selected_text("\n"), "two");
    assert_eq!(c.selection().state, SelectionState::MouseComplete);
}

#[test]
fn double_click_on_break_selects_break_run() {
    let mut c = control(&["one  two"]);
    send(&mut c, &double_click(3, 0));
    assert_eq!(c.get_selected_text("\n"), "  ");
}

#[test]
fn tick_without_armed_timer_is_inert() {
    let mut c = control(&["abc"]);
    let before = cursor(&c);
    send(&mut c, &Event::Tick);
    assert_eq!(cursor(&c), before);
    assert!(!c.selection_active());
}
