//! The paint driver: flush dirty lines to the screen writer and shape the
//! cursor.
//!
//! For each viewport row whose buffer line falls inside the consumed dirty
//! range the line is re-rendered: tabs expand inline to spaces, embedded
//! NULs are written as spaces, cells covered by the selection use the
//! selected attribute, and the remainder of the row is cleared with
//! spaces. Cursor state and position go out only when they changed since
//! the previous paint.

use crate::{ScreenWriter, ScrollBarHost};
use core_state::{CellAttr, EditControl};
use core_text::display_from_buffer;
use tracing::trace;

/// Cursor fill percentage in insert mode.
const CURSOR_INSERT_PCT: u8 = 20;
/// Cursor fill percentage in overwrite mode.
const CURSOR_OVERWRITE_PCT: u8 = 50;

/// Stateful paint driver; owns only the change-detection caches for the
/// external cursor positioner.
#[derive(Debug, Default)]
pub struct Painter {
    last_cursor_pos: Option<(u16, u16)>,
    last_cursor_state: Option<(bool, u8)>,
}

impl Painter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paint everything the control accumulated since the last call: dirty
    /// lines, caption, scroll-bar position, and the cursor.
    pub fn paint(
        &mut self,
        ctrl: &mut EditControl,
        writer: &mut dyn ScreenWriter,
        mut scrollbar: Option<&mut dyn ScrollBarHost>,
    ) {
        let (w, h) = ctrl.client_size();
        if w == 0 || h == 0 {
            ctrl.consume_dirty();
            return;
        }
        let (top, _) = ctrl.get_viewport_location();

        if let Some((first_dirty, last_dirty)) = ctrl.consume_dirty() {
            let mut painted = 0usize;
            for row in 0..h {
                let line_idx = top + row as usize;
                if line_idx < first_dirty || line_idx > last_dirty {
                    continue;
                }
                self.render_line(ctrl, writer, row, line_idx);
                painted += 1;
            }
            self.paint_caption(ctrl, writer);
            trace!(target: "render.paint", painted, first_dirty, last_dirty, "lines_flushed");
        }

        if ctrl.take_scrollbar_stale()
            && let Some(sb) = scrollbar.as_mut()
        {
            sb.set_position(top, h as usize, ctrl.get_line_count());
        }

        self.place_cursor(ctrl, writer);
    }

    fn render_line(
        &self,
        ctrl: &EditControl,
        writer: &mut dyn ScreenWriter,
        row: u16,
        line_idx: usize,
    ) {
        let (w, _) = ctrl.client_size();
        let (_, left) = ctrl.get_viewport_location();
        let (text_attr, sel_attr) = ctrl.colors();
        let tab_width = ctrl.tab_width();
        let line = ctrl.get_line_by_index(line_idx).unwrap_or("");

        // Selection bounds on this line, in display columns. Interior lines
        // of a multi-line selection highlight their full text.
        let sel_span = ctrl.selection().span().and_then(|(first, last)| {
            if line_idx < first.line || line_idx > last.line {
                return None;
            }
            let start = if line_idx == first.line {
                display_from_buffer(line, first.offset, tab_width)
            } else {
                0
            };
            let end = if line_idx == last.line {
                display_from_buffer(line, last.offset, tab_width)
            } else {
                core_text::display_width(line, tab_width)
            };
            Some((start, end))
        });

        let attr_at = |col: usize| -> CellAttr {
            match sel_span {
                Some((s, e)) if col >= s && col < e => sel_attr,
                _ => text_attr,
            }
        };

        let mut col = 0usize; // display column, before horizontal scroll
        for ch in line.chars() {
            let (cell, width) = match ch {
                '\t' => (' ', tab_width),
                // The platform cell writer chokes on embedded NULs.
                '\0' => (' ', 1),
                _ => (ch, 1),
            };
            let attr = attr_at(col);
            for i in 0..width {
                let c = col + i;
                if c >= left && c - left < w as usize {
                    writer.set_client_cell((c - left) as u16, row, cell, attr);
                }
            }
            col += width;
            if col >= left + w as usize {
                break;
            }
        }
        // Clear the remainder of the row.
        let start = col.max(left);
        for c in start..left + w as usize {
            writer.set_client_cell((c - left) as u16, row, ' ', text_attr);
        }
    }

    /// Caption is centered on the non-client row above the client area.
    fn paint_caption(&self, ctrl: &EditControl, writer: &mut dyn ScreenWriter) {
        if ctrl.caption().is_empty() {
            return;
        }
        let (w, _) = ctrl.client_size();
        let (text_attr, _) = ctrl.colors();
        let caption: Vec<char> = ctrl.caption().chars().collect();
        let shown = caption.len().min(w as usize);
        let pad = (w as usize - shown) / 2;
        for x in 0..w as usize {
            let ch = if x >= pad && x < pad + shown {
                caption[x - pad]
            } else {
                ' '
            };
            writer.set_nonclient_cell(x as u16, 0, ch, text_attr);
        }
    }

    /// Decide cursor visibility, shape and position; push to the writer
    /// only on change.
    fn place_cursor(&mut self, ctrl: &EditControl, writer: &mut dyn ScreenWriter) {
        let (w, h) = ctrl.client_size();
        let (top, left) = ctrl.get_viewport_location();
        let cursor = ctrl.get_cursor_location();
        let col = ctrl.display_cursor_offset();

        let in_view = cursor.line >= top
            && cursor.line < top + h as usize
            && col >= left
            && col < left + w as usize;
        let visible = ctrl.is_focused() && in_view;
        let shape = if ctrl.insert_mode() {
            CURSOR_INSERT_PCT
        } else {
            CURSOR_OVERWRITE_PCT
        };

        let state = (visible, shape);
        if self.last_cursor_state != Some(state) {
            writer.set_cursor_state(visible, shape);
            self.last_cursor_state = Some(state);
        }
        if in_view {
            let pos = ((col - left) as u16, (cursor.line - top) as u16);
            if self.last_cursor_pos != Some(pos) {
                writer.set_cursor_location(pos.0, pos.1);
                self.last_cursor_pos = Some(pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_state::CellAttr;

    /// Captures cells into a grid for assertions.
    struct MockScreen {
        w: u16,
        h: u16,
        cells: Vec<Vec<(char, CellAttr)>>,
        nonclient: Vec<(u16, u16, char)>,
        cursor_states: Vec<(bool, u8)>,
        cursor_moves: Vec<(u16, u16)>,
    }

    impl MockScreen {
        fn new(w: u16, h: u16) -> Self {
            Self {
                w,
                h,
                cells: vec![vec![(' ', CellAttr::TEXT); w as usize]; h as usize],
                nonclient: Vec::new(),
                cursor_states: Vec::new(),
                cursor_moves: Vec::new(),
            }
        }

        fn row_text(&self, y: usize) -> String {
            self.cells[y].iter().map(|(c, _)| *c).collect()
        }
    }

    impl ScreenWriter for MockScreen {
        fn set_client_cell(&mut self, x: u16, y: u16, ch: char, attr: CellAttr) {
            self.cells[y as usize][x as usize] = (ch, attr);
        }
        fn set_nonclient_cell(&mut self, x: u16, y: u16, ch: char, _attr: CellAttr) {
            self.nonclient.push((x, y, ch));
        }
        fn set_cursor_state(&mut self, visible: bool, shape_pct: u8) {
            self.cursor_states.push((visible, shape_pct));
        }
        fn set_cursor_location(&mut self, x: u16, y: u16) {
            self.cursor_moves.push((x, y));
        }
        fn client_size(&self) -> (u16, u16) {
            (self.w, self.h)
        }
    }

    fn control(lines: &[&str], w: u16, h: u16) -> EditControl {
        let mut c = EditControl::with_lines(lines);
        c.reposition(w, h);
        c
    }

    #[test]
    fn paints_lines_and_clears_tails() {
        let mut c = control(&["hello", "hi"], 8, 2);
        let mut screen = MockScreen::new(8, 2);
        Painter::new().paint(&mut c, &mut screen, None);
        assert_eq!(screen.row_text(0), "hello   ");
        assert_eq!(screen.row_text(1), "hi      ");
        assert!(c.dirty_is_empty());
    }

    #[test]
    fn tabs_expand_to_spaces() {
        let mut c = control(&["a\tb"], 10, 1);
        let mut screen = MockScreen::new(10, 1);
        Painter::new().paint(&mut c, &mut screen, None);
        assert_eq!(screen.row_text(0), "a    b    ");
    }

    #[test]
    fn nul_cells_become_spaces() {
        let mut c = control(&["a\0b"], 5, 1);
        let mut screen = MockScreen::new(5, 1);
        Painter::new().paint(&mut c, &mut screen, None);
        assert_eq!(screen.row_text(0), "a b  ");
    }

    #[test]
    fn selection_cells_use_selected_attr() {
        let mut c = control(&["abcdef"], 8, 1);
        c.set_selection_range(0, 1, 0, 4);
        let mut screen = MockScreen::new(8, 1);
        Painter::new().paint(&mut c, &mut screen, None);
        let attrs: Vec<CellAttr> = screen.cells[0].iter().map(|(_, a)| *a).collect();
        assert_eq!(attrs[0], CellAttr::TEXT);
        assert_eq!(attrs[1], CellAttr::SELECTED);
        assert_eq!(attrs[3], CellAttr::SELECTED);
        assert_eq!(attrs[4], CellAttr::TEXT);
    }

    #[test]
    fn cursor_shape_follows_mode_and_updates_on_change_only() {
        let mut c = control(&["abc"], 8, 1);
        c.set_focus(true);
        let mut screen = MockScreen::new(8, 1);
        let mut painter = Painter::new();
        painter.paint(&mut c, &mut screen, None);
        assert_eq!(screen.cursor_states, vec![(true, 20)]);

        // Nothing changed: a second paint emits no cursor traffic.
        painter.paint(&mut c, &mut screen, None);
        assert_eq!(screen.cursor_states.len(), 1);

        c.toggle_insert_mode();
        painter.paint(&mut c, &mut screen, None);
        assert_eq!(screen.cursor_states.last(), Some(&(true, 50)));
    }

    #[test]
    fn cursor_hidden_when_scrolled_out() {
        let lines: Vec<String> = (0..30).map(|i| format!("l{i}")).collect();
        let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
        let mut c = EditControl::with_lines(&refs);
        c.reposition(8, 4);
        c.set_focus(true);
        let mut screen = MockScreen::new(8, 4);
        let mut painter = Painter::new();
        painter.paint(&mut c, &mut screen, None);
        // Scroll the cursor (line 0) out of view without moving it.
        c.set_viewport_location(20, 0);
        painter.paint(&mut c, &mut screen, None);
        assert_eq!(screen.cursor_states.last(), Some(&(false, 20)));
    }

    #[test]
    fn caption_paints_centered_on_nonclient_row() {
        let mut c = control(&["x"], 10, 1);
        c.set_caption("hi");
        let mut screen = MockScreen::new(10, 1);
        Painter::new().paint(&mut c, &mut screen, None);
        let drawn: String = screen
            .nonclient
            .iter()
            .filter(|(_, y, _)| *y == 0)
            .map(|(_, _, ch)| *ch)
            .collect();
        assert_eq!(drawn.trim(), "hi");
    }

    #[test]
    fn scrollbar_refreshed_once_per_change() {
        struct Bar(Vec<(usize, usize, usize)>);
        impl ScrollBarHost for Bar {
            fn set_position(&mut self, top: usize, visible: usize, max: usize) {
                self.0.push((top, visible, max));
            }
        }
        let mut c = control(&["a", "b", "c", "d"], 8, 2);
        let mut screen = MockScreen::new(8, 2);
        let mut bar = Bar(Vec::new());
        let mut painter = Painter::new();
        painter.paint(&mut c, &mut screen, Some(&mut bar));
        assert_eq!(bar.0, vec![(0, 2, 4)]);
        painter.paint(&mut c, &mut screen, Some(&mut bar));
        assert_eq!(bar.0.len(), 1, "no viewport change, no refresh");
        c.set_viewport_location(2, 0);
        painter.paint(&mut c, &mut screen, Some(&mut bar));
        assert_eq!(bar.0.last(), Some(&(2, 2, 4)));
    }
}
