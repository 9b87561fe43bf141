//! Range mutation: every user-visible edit funnels through three functions.
//!
//! `insert_range` / `overwrite_range` / `delete_range` operate on
//! `(line, offset)` rectangles with an exclusive end, log typed undo records
//! unless they are replaying one, widen the dirty range, and set the modify
//! bit. Text arguments recognize `\r`, `\n` and `\r\n` as line terminators
//! (`\r\n` advances exactly one line). `get_range_text` is the read-only
//! sibling used by selection capture and undo mirroring.
//!
//! Bounds are clamped, never errors: deleting past end-of-line clamps to
//! the line length, and an end line at `lines_populated` with offset 0
//! merges no trailing line. Inserting at a line index beyond the populated
//! set silently extends it with empty lines.

use crate::{AutoIndentState, EditControl, EditError};
use core_text::Location;
use tracing::trace;

/// Shape of a text block: terminator count and character count of the
/// final (possibly empty) segment.
pub(crate) struct TextShape {
    pub line_count: usize,
    pub last_line_chars: usize,
}

pub(crate) fn measure_text(text: &str) -> TextShape {
    let mut line_count = 0usize;
    let mut last_line_chars = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                line_count += 1;
                last_line_chars = 0;
            }
            '\n' => {
                line_count += 1;
                last_line_chars = 0;
            }
            _ => last_line_chars += 1,
        }
    }
    TextShape {
        line_count,
        last_line_chars,
    }
}

/// Split on line terminators; always yields `line_count + 1` segments.
pub(crate) fn split_segments(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut segs = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\r' => {
                segs.push(&text[start..i]);
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            b'\n' => {
                segs.push(&text[start..i]);
                i += 1;
                start = i;
            }
            _ => i += 1,
        }
    }
    segs.push(&text[start..]);
    segs
}

/// Ending location of `text` inserted at `start` (no auto-indent).
pub(crate) fn end_of_text(start: Location, text: &str) -> Location {
    let shape = measure_text(text);
    if shape.line_count == 0 {
        Location::new(start.line, start.offset + shape.last_line_chars)
    } else {
        Location::new(start.line + shape.line_count, shape.last_line_chars)
    }
}

impl EditControl {
    /// Insert `text` at `at`, shifting existing characters right and down.
    /// Returns the end of the inserted block. When auto-indent is enabled
    /// and the text ends exactly at the start of a new line, the leading
    /// whitespace of the origin line (left of the cursor) is copied onto
    /// the final inserted line.
    pub fn insert_range(
        &mut self,
        at: Location,
        text: &str,
        processing_undo: bool,
    ) -> Result<Location, EditError> {
        if text.is_empty() {
            return Ok(at);
        }
        let shape = measure_text(text);
        let segs = split_segments(text);

        let mut indent = String::new();
        if self.auto_indent
            && shape.line_count > 0
            && shape.last_line_chars == 0
            && !processing_undo
            && let Some(line) = self.store.line(at.line)
        {
            let ws = line.leading_whitespace_len().min(at.offset);
            indent.push_str(line.slice(0, ws));
        }
        let indent_len = indent.chars().count();

        let populated_before = self.store.populated();
        if !self.store.ensure_line(at.line) {
            self.flush_history();
            return Err(EditError::Allocation);
        }
        // Extending the populated set (and any space padding up to the
        // insertion offset) belongs to the same undoable rectangle, so the
        // record anchors where real content used to end.
        let record_start = if at.line >= populated_before {
            if populated_before == 0 {
                Location::origin()
            } else {
                Location::new(
                    populated_before - 1,
                    self.store.line_len(populated_before - 1),
                )
            }
        } else {
            Location::new(at.line, at.offset.min(self.store.line_len(at.line)))
        };

        let end;
        if shape.line_count == 0 {
            if let Some(line) = self.store.line_mut(at.line) {
                line.insert_text(at.offset, segs[0]);
            }
            end = Location::new(at.line, at.offset + shape.last_line_chars);
            self.dirty.expand_line(at.line);
        } else {
            // The tail of the first line moves to the end of the last
            // inserted line.
            let tail = match self.store.line_mut(at.line) {
                Some(line) if at.offset < line.len() => {
                    let t = line.slice(at.offset, line.len()).to_string();
                    line.truncate_chars(at.offset);
                    t
                }
                Some(line) => {
                    line.pad_to(at.offset);
                    String::new()
                }
                None => String::new(),
            };
            if !self.store.insert_empty_lines(at.line + 1, shape.line_count) {
                self.flush_history();
                return Err(EditError::Allocation);
            }
            if let Some(line) = self.store.line_mut(at.line) {
                line.insert_text(at.offset, segs[0]);
            }
            for (i, seg) in segs.iter().enumerate().take(shape.line_count).skip(1) {
                if let Some(line) = self.store.line_mut(at.line + i) {
                    line.push_text(seg);
                }
            }
            if let Some(line) = self.store.line_mut(at.line + shape.line_count) {
                line.reserve_for(indent.len() + segs[shape.line_count].len() + tail.len());
                line.push_text(&indent);
                line.push_text(segs[shape.line_count]);
                line.push_text(&tail);
            }
            end = Location::new(at.line + shape.line_count, indent_len + shape.last_line_chars);
            self.dirty.expand_to_end(at.line);
        }

        if indent_len > 0 {
            self.auto_indent_state = Some(AutoIndentState {
                source_line: at.line,
                source_length: indent_len,
                applied_line: end.line,
            });
        }
        if !processing_undo {
            self.undo.record_insert(record_start, end);
            self.user_modified = true;
        }
        self.clear_selection();
        trace!(
            target: "state.edit",
            line = at.line,
            offset = at.offset,
            lines_added = shape.line_count,
            "insert_range"
        );
        Ok(end)
    }

    /// Replace characters in place starting at `at`; a line terminator in
    /// `text` migrates the remainder of the current line to the next, as
    /// Enter does in overwrite mode. Returns the end of the overwrite.
    pub fn overwrite_range(
        &mut self,
        at: Location,
        text: &str,
        processing_undo: bool,
    ) -> Result<Location, EditError> {
        let populated_before = self.store.populated();
        if !self.store.ensure_line(at.line) {
            self.flush_history();
            return Err(EditError::Allocation);
        }
        if !processing_undo && at.line >= populated_before {
            let anchor = if populated_before == 0 {
                Location::origin()
            } else {
                Location::new(
                    populated_before - 1,
                    self.store.line_len(populated_before - 1),
                )
            };
            let extension_end = Location::new(at.line, 0);
            if anchor < extension_end {
                self.undo.record_insert(anchor, extension_end);
            }
        }
        let segs = split_segments(text);
        let mut cur = at;
        for (i, seg) in segs.iter().enumerate() {
            if !seg.is_empty() {
                let seg_chars = seg.chars().count();
                let end_off = cur.offset + seg_chars;
                if !processing_undo {
                    let (snapshot, line_len) = {
                        let line = self.store.line_str(cur.line);
                        (line.to_string(), self.store.line_len(cur.line))
                    };
                    self.undo
                        .record_overwrite(cur.line, cur.offset, end_off, &snapshot, line_len);
                }
                if let Some(line) = self.store.line_mut(cur.line) {
                    line.pad_to(cur.offset);
                    line.replace_span(cur.offset, end_off, seg);
                }
                self.dirty.expand_line(cur.line);
                cur.offset = end_off;
            }
            if i + 1 < segs.len() {
                let split_at = cur.offset.min(self.store.line_len(cur.line));
                if !self.store.split_line(cur.line, split_at) {
                    self.flush_history();
                    return Err(EditError::Allocation);
                }
                if !processing_undo {
                    self.undo.record_insert(
                        Location::new(cur.line, split_at),
                        Location::new(cur.line + 1, 0),
                    );
                }
                self.dirty.expand_to_end(cur.line);
                cur = Location::new(cur.line + 1, 0);
            }
        }
        if !processing_undo {
            self.user_modified = true;
        }
        self.clear_selection();
        trace!(
            target: "state.edit",
            line = at.line,
            offset = at.offset,
            "overwrite_range"
        );
        Ok(cur)
    }

    /// Delete the rectangle `[first, last)` (end exclusive). Out-of-range
    /// coordinates are clamped. `processing_backspace` preserves the
    /// auto-indent-applied state; `processing_undo` suppresses record
    /// logging.
    pub fn delete_range(
        &mut self,
        first: Location,
        last: Location,
        processing_backspace: bool,
        processing_undo: bool,
    ) {
        if !processing_backspace {
            self.auto_indent_state = None;
        }
        let populated = self.store.populated();
        if populated == 0 {
            return;
        }
        let max_line = populated - 1;
        let mut first = first;
        let mut last = last;
        if first.line > max_line {
            return;
        }
        first.offset = first.offset.min(self.store.line_len(first.line));
        if last.line > max_line {
            last = Location::new(max_line, self.store.line_len(max_line));
        } else {
            last.offset = last.offset.min(self.store.line_len(last.line));
        }
        if first >= last {
            return;
        }

        if !processing_undo {
            let captured = self.get_range_text(first, last, "\n");
            if !self.undo.record_delete(first, last, &captured) {
                self.flush_history();
            }
        }

        if first.line == last.line {
            if let Some(line) = self.store.line_mut(first.line) {
                line.remove_span(first.offset, last.offset);
            }
            self.dirty.expand_line(first.line);
        } else {
            let suffix = self
                .store
                .line(last.line)
                .map(|l| l.slice(last.offset, l.len()).to_string())
                .unwrap_or_default();
            if let Some(line) = self.store.line_mut(first.line) {
                line.truncate_chars(first.offset);
                line.reserve_for(suffix.len());
                line.push_text(&suffix);
            }
            self.store.remove_lines(first.line + 1, last.line);
            self.dirty.expand_to_end(first.line);
        }
        if !processing_undo {
            self.user_modified = true;
        }
        self.clear_selection();
        trace!(
            target: "state.edit",
            first_line = first.line,
            last_line = last.line,
            "delete_range"
        );
    }

    /// Backspace while auto-indent is applied: instead of deleting one
    /// character, retreat the indentation to the nearest earlier line whose
    /// whitespace prefix is shorter and matches. Returns false when the
    /// state is not set.
    pub fn retreat_auto_indent(&mut self) -> bool {
        let Some(st) = self.auto_indent_state else {
            return false;
        };
        let line = st.applied_line;
        let cur_len = st.source_length;
        let current_indent: String = self.store.line_str(line).chars().take(cur_len).collect();
        let mut best = 0usize;
        let mut best_line = st.source_line;
        for ln in (0..line).rev() {
            let text = self.store.line_str(ln);
            let ws_len = text
                .chars()
                .take_while(|c| *c == ' ' || *c == '\t')
                .count();
            if ws_len == 0 || ws_len >= cur_len {
                continue;
            }
            if current_indent.chars().take(ws_len).eq(text.chars().take(ws_len)) {
                best = ws_len;
                best_line = ln;
                break;
            }
        }
        self.delete_range(
            Location::new(line, best),
            Location::new(line, cur_len),
            true,
            false,
        );
        self.auto_indent_state = if best > 0 {
            Some(AutoIndentState {
                source_line: best_line,
                source_length: best,
                applied_line: line,
            })
        } else {
            None
        };
        self.clear_desired();
        self.set_cursor(line, best);
        true
    }

    /// Concatenate the rectangle `[first, last)` with `sep` between lines.
    /// The byte count is computed up front so the result allocates once.
    pub fn get_range_text(&self, first: Location, last: Location, sep: &str) -> String {
        let populated = self.store.populated();
        if populated == 0 {
            return String::new();
        }
        let max_line = populated - 1;
        let mut first = first;
        let mut last = last;
        if first.line > max_line {
            return String::new();
        }
        first.offset = first.offset.min(self.store.line_len(first.line));
        if last.line > max_line {
            last = Location::new(max_line, self.store.line_len(max_line));
        } else {
            last.offset = last.offset.min(self.store.line_len(last.line));
        }
        if first >= last {
            return String::new();
        }

        if first.line == last.line {
            return self
                .store
                .line(first.line)
                .map(|l| l.slice(first.offset, last.offset).to_string())
                .unwrap_or_default();
        }

        let mut bytes = sep.len() * (last.line - first.line);
        if let Some(l) = self.store.line(first.line) {
            bytes += l.slice(first.offset, l.len()).len();
        }
        for idx in first.line + 1..last.line {
            bytes += self.store.line_str(idx).len();
        }
        if let Some(l) = self.store.line(last.line) {
            bytes += l.slice(0, last.offset).len();
        }

        let mut out = String::with_capacity(bytes);
        if let Some(l) = self.store.line(first.line) {
            out.push_str(l.slice(first.offset, l.len()));
        }
        for idx in first.line + 1..last.line {
            out.push_str(sep);
            out.push_str(self.store.line_str(idx));
        }
        out.push_str(sep);
        if let Some(l) = self.store.line(last.line) {
            out.push_str(l.slice(0, last.offset));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(ctrl: &EditControl) -> Vec<&str> {
        (0..ctrl.get_line_count())
            .map(|i| ctrl.get_line_by_index(i).unwrap_or(""))
            .collect()
    }

    #[test]
    fn insert_single_line_shifts_right() {
        let mut c = EditControl::with_lines(&["held"]);
        let end = c.insert_range(Location::new(0, 2), "lo wor", false).unwrap();
        assert_eq!(lines(&c), vec!["helo word"]);
        assert_eq!(end, Location::new(0, 8));
    }

    #[test]
    fn insert_multiline_moves_tail_to_last_line() {
        let mut c = EditControl::with_lines(&["abdef"]);
        let end = c.insert_range(Location::new(0, 2), "c\nxy", false).unwrap();
        assert_eq!(lines(&c), vec!["abc", "xydef"]);
        assert_eq!(end, Location::new(1, 2));
    }

    #[test]
    fn insert_crlf_advances_one_line() {
        let mut c = EditControl::with_lines(&["ab"]);
        let end = c.insert_range(Location::new(0, 1), "x\r\ny", false).unwrap();
        assert_eq!(lines(&c), vec!["ax", "yb"]);
        assert_eq!(end, Location::new(1, 1));
    }

    #[test]
    fn insert_beyond_line_end_pads_with_spaces() {
        let mut c = EditControl::with_lines(&["ab"]);
        c.insert_range(Location::new(0, 5), "x", false).unwrap();
        assert_eq!(lines(&c), vec!["ab   x"]);
    }

    #[test]
    fn insert_beyond_populated_extends_buffer() {
        let mut c = EditControl::with_lines(&["a"]);
        c.insert_range(Location::new(3, 0), "x", false).unwrap();
        assert_eq!(lines(&c), vec!["a", "", "", "x"]);
    }

    #[test]
    fn insert_into_empty_buffer() {
        let mut c = EditControl::new();
        let end = c.insert_range(Location::origin(), "a\nb", false).unwrap();
        assert_eq!(lines(&c), vec!["a", "b"]);
        assert_eq!(end, Location::new(1, 1));
    }

    #[test]
    fn auto_indent_copies_leading_whitespace() {
        let mut c = EditControl::with_lines(&["    foo"]);
        c.set_auto_indent(true);
        let end = c.insert_range(Location::new(0, 7), "\r", false).unwrap();
        assert_eq!(lines(&c), vec!["    foo", "    "]);
        assert_eq!(end, Location::new(1, 4));
        let st = c.auto_indent_state().unwrap();
        assert_eq!(st.source_line, 0);
        assert_eq!(st.source_length, 4);
        assert_eq!(st.applied_line, 1);
    }

    #[test]
    fn auto_indent_clamps_to_cursor_offset() {
        let mut c = EditControl::with_lines(&["    foo"]);
        c.set_auto_indent(true);
        let end = c.insert_range(Location::new(0, 2), "\n", false).unwrap();
        assert_eq!(lines(&c), vec!["  ", "    foo"]);
        assert_eq!(end, Location::new(1, 2));
    }

    #[test]
    fn auto_indent_keeps_tail_after_indent() {
        let mut c = EditControl::with_lines(&["  foobar"]);
        c.set_auto_indent(true);
        let end = c.insert_range(Location::new(0, 5), "\n", false).unwrap();
        assert_eq!(lines(&c), vec!["  foo", "  bar"]);
        assert_eq!(end, Location::new(1, 2));
    }

    #[test]
    fn auto_indent_skipped_during_undo_replay() {
        let mut c = EditControl::with_lines(&["    foo"]);
        c.set_auto_indent(true);
        c.insert_range(Location::new(0, 7), "\n", true).unwrap();
        assert_eq!(lines(&c), vec!["    foo", ""]);
        assert!(c.auto_indent_state().is_none());
    }

    #[test]
    fn delete_within_line() {
        let mut c = EditControl::with_lines(&["abcdef"]);
        c.delete_range(Location::new(0, 1), Location::new(0, 4), false, false);
        assert_eq!(lines(&c), vec!["aef"]);
    }

    #[test]
    fn delete_across_lines_merges() {
        let mut c = EditControl::with_lines(&["abc", "def", "ghi"]);
        c.delete_range(Location::new(0, 2), Location::new(2, 1), false, false);
        assert_eq!(lines(&c), vec!["abhi"]);
    }

    #[test]
    fn delete_entire_buffer_leaves_one_empty_line() {
        let mut c = EditControl::with_lines(&["abc", "def"]);
        c.delete_range(Location::new(0, 0), Location::new(2, 0), false, false);
        assert_eq!(lines(&c), vec![""]);
    }

    #[test]
    fn delete_clamps_offset_past_line_end() {
        let mut c = EditControl::with_lines(&["ab", "cd"]);
        c.delete_range(Location::new(0, 1), Location::new(0, 99), false, false);
        assert_eq!(lines(&c), vec!["a", "cd"]);
    }

    #[test]
    fn delete_end_at_populated_with_zero_offset_merges_nothing() {
        let mut c = EditControl::with_lines(&["ab", "cd"]);
        c.delete_range(Location::new(1, 1), Location::new(2, 0), false, false);
        assert_eq!(lines(&c), vec!["ab", "c"]);
    }

    #[test]
    fn overwrite_replaces_in_place() {
        let mut c = EditControl::with_lines(&["abcdef"]);
        let end = c.overwrite_range(Location::new(0, 1), "XY", false).unwrap();
        assert_eq!(lines(&c), vec!["aXYdef"]);
        assert_eq!(end, Location::new(0, 3));
    }

    #[test]
    fn overwrite_past_line_end_appends() {
        let mut c = EditControl::with_lines(&["ab"]);
        let end = c.overwrite_range(Location::new(0, 1), "XYZ", false).unwrap();
        assert_eq!(lines(&c), vec!["aXYZ"]);
        assert_eq!(end, Location::new(0, 4));
    }

    #[test]
    fn overwrite_newline_migrates_remainder() {
        let mut c = EditControl::with_lines(&["abcdef"]);
        let end = c.overwrite_range(Location::new(0, 3), "\r", false).unwrap();
        assert_eq!(lines(&c), vec!["abc", "def"]);
        assert_eq!(end, Location::new(1, 0));
    }

    #[test]
    fn overwrite_multiline_walks_lines() {
        let mut c = EditControl::with_lines(&["abcdef"]);
        let end = c.overwrite_range(Location::new(0, 2), "XY\nZ", false).unwrap();
        assert_eq!(lines(&c), vec!["abXY", "Zf"]);
        assert_eq!(end, Location::new(1, 1));
    }

    #[test]
    fn get_range_text_single_and_multi() {
        let c = EditControl::with_lines(&["abc", "def", "ghi"]);
        assert_eq!(
            c.get_range_text(Location::new(0, 1), Location::new(0, 3), "\n"),
            "bc"
        );
        assert_eq!(
            c.get_range_text(Location::new(0, 2), Location::new(2, 1), "\n"),
            "c\ndef\ng"
        );
        assert_eq!(
            c.get_range_text(Location::new(0, 0), Location::new(0, 0), "\n"),
            ""
        );
    }

    #[test]
    fn range_text_round_trips_through_delete_and_insert() {
        // (R2): capture, delete, re-insert restores the original buffer.
        let mut c = EditControl::with_lines(&["alpha", "beta", "gamma"]);
        let a = Location::new(0, 3);
        let b = Location::new(2, 2);
        let captured = c.get_range_text(a, b, "\n");
        c.delete_range(a, b, false, false);
        let end = c.insert_range(a, &captured, false).unwrap();
        assert_eq!(lines(&c), vec!["alpha", "beta", "gamma"]);
        assert_eq!(end, b);
    }

    #[test]
    fn insert_then_delete_is_identity() {
        // (R1): insert followed by deleting the returned rectangle.
        let mut c = EditControl::with_lines(&["hello", "world"]);
        let at = Location::new(0, 2);
        let end = c.insert_range(at, "one\ntwo", false).unwrap();
        c.delete_range(at, end, false, false);
        assert_eq!(lines(&c), vec!["hello", "world"]);
    }

    #[test]
    fn edits_widen_dirty_through_end_on_line_shift() {
        let mut c = EditControl::with_lines(&["a", "b"]);
        c.consume_dirty();
        c.insert_range(Location::new(0, 1), "\n", false).unwrap();
        let (first, last) = c.consume_dirty().unwrap();
        assert_eq!(first, 0);
        assert_eq!(last, crate::LAST_LINE);
    }
}
