//! Typed undo/redo records with adjacency coalescing.
//!
//! Three record kinds mirror the three mutation families. A record grows in
//! place while consecutive edits stay adjacent to it; any non-adjacent edit
//! starts a fresh record. Applying a record never logs a new one
//! (`processing_undo` flows into the mutation functions); instead a mirror
//! record is synthesized from the buffer *before* application and pushed on
//! the opposite stack, which is what makes undo/redo an involution.
//!
//! `DeleteText` captures removed text in a [`SplitBuffer`]: an owning byte
//! buffer with slack on both sides of the live slice, so backspace runs
//! prepend and delete runs append without shuffling the saved block.

use crate::EditControl;
use crate::edit::{end_of_text, measure_text};
use core_text::{Location, grow_to_at_least};
use tracing::trace;

/// Slack kept on each side of the live slice of a `DeleteText` capture.
const SPLIT_SLACK: usize = 1024;

/// Owning buffer plus two indices marking the live slice inside it.
pub struct SplitBuffer {
    buf: Vec<u8>,
    start: usize,
    end: usize,
}

impl SplitBuffer {
    pub fn with_text(text: &str) -> Self {
        let mut buf = vec![0u8; text.len() + 2 * SPLIT_SLACK];
        buf[SPLIT_SLACK..SPLIT_SLACK + text.len()].copy_from_slice(text.as_bytes());
        Self {
            buf,
            start: SPLIT_SLACK,
            end: SPLIT_SLACK + text.len(),
        }
    }

    pub fn as_str(&self) -> &str {
        // The live slice only ever receives whole &str blocks.
        std::str::from_utf8(&self.buf[self.start..self.end]).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Copy `text` in front of the live slice, growing when the front gap
    /// is exhausted. Returns false on size-arithmetic overflow.
    pub fn prepend(&mut self, text: &str) -> bool {
        if text.len() > self.start && !self.regrow(text.len(), 0) {
            return false;
        }
        self.start -= text.len();
        self.buf[self.start..self.start + text.len()].copy_from_slice(text.as_bytes());
        true
    }

    /// Copy `text` after the live slice, growing when the back gap is
    /// exhausted. Returns false on size-arithmetic overflow.
    pub fn append(&mut self, text: &str) -> bool {
        if self.end + text.len() > self.buf.len() && !self.regrow(0, text.len()) {
            return false;
        }
        self.buf[self.end..self.end + text.len()].copy_from_slice(text.as_bytes());
        self.end += text.len();
        true
    }

    fn regrow(&mut self, front: usize, back: usize) -> bool {
        let live = self.end - self.start;
        let needed = match live
            .checked_add(front)
            .and_then(|n| n.checked_add(back))
            .and_then(|n| n.checked_add(2 * SPLIT_SLACK))
        {
            Some(n) => n,
            None => return false,
        };
        let Some(cap) = grow_to_at_least(self.buf.len(), needed) else {
            return false;
        };
        let mut grown = vec![0u8; cap];
        let new_start = SPLIT_SLACK + front;
        grown[new_start..new_start + live].copy_from_slice(&self.buf[self.start..self.end]);
        self.buf = grown;
        self.start = new_start;
        self.end = new_start + live;
        true
    }
}

impl std::fmt::Debug for SplitBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitBuffer")
            .field("live", &self.as_str())
            .field("front_gap", &self.start)
            .field("back_gap", &(self.buf.len() - self.end))
            .finish()
    }
}

/// One undoable operation. Rectangles are `[first, last)` in buffer
/// coordinates (end exclusive).
#[derive(Debug)]
pub enum UndoRecord {
    /// Inserted rectangle; undo deletes it.
    InsertText { first: Location, last: Location },
    /// Deleted block; undo re-inserts `text` at `first`.
    DeleteText { first: Location, text: SplitBuffer },
    /// Overwritten span; undo deletes `[first, last)` and re-inserts the
    /// saved `text` at `origin`. The saved block is the entire original
    /// line, so the restore range may exceed the user-modified
    /// `[first_modified, last_modified)` span on the last line.
    OverwriteText {
        first: Location,
        last: Location,
        origin: Location,
        text: String,
        first_modified: usize,
        last_modified: usize,
    },
}

#[derive(Default)]
pub(crate) struct UndoEngine {
    undo: Vec<UndoRecord>,
    redo: Vec<UndoRecord>,
}

impl UndoEngine {
    pub(crate) fn is_undo_available(&self) -> bool {
        !self.undo.is_empty()
    }

    pub(crate) fn is_redo_available(&self) -> bool {
        !self.redo.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub(crate) fn pop_undo(&mut self) -> Option<UndoRecord> {
        self.undo.pop()
    }

    pub(crate) fn pop_redo(&mut self) -> Option<UndoRecord> {
        self.redo.pop()
    }

    pub(crate) fn push_undo(&mut self, rec: UndoRecord) {
        self.undo.push(rec);
    }

    pub(crate) fn push_redo(&mut self, rec: UndoRecord) {
        self.redo.push(rec);
    }

    /// Log an insertion of `[first, last)`, extending the top record when
    /// the new rectangle starts exactly where it ended.
    pub(crate) fn record_insert(&mut self, first: Location, last: Location) {
        self.redo.clear();
        if let Some(UndoRecord::InsertText { last: rec_last, .. }) = self.undo.last_mut()
            && *rec_last == first
        {
            *rec_last = last;
            trace!(target: "state.undo", line = first.line, "insert_coalesced");
            return;
        }
        trace!(target: "state.undo", depth = self.undo.len() + 1, "insert_record");
        self.undo.push(UndoRecord::InsertText { first, last });
    }

    /// Log a deletion of `[first, last)` whose captured text is `text`.
    /// Backspace runs end exactly at the top record's origin (prepend);
    /// delete-key runs start there (append). Returns false when the split
    /// buffer cannot grow; the caller flushes history.
    pub(crate) fn record_delete(&mut self, first: Location, last: Location, text: &str) -> bool {
        self.redo.clear();
        if let Some(UndoRecord::DeleteText {
            first: rec_first,
            text: saved,
        }) = self.undo.last_mut()
        {
            if last == *rec_first {
                if !saved.prepend(text) {
                    return false;
                }
                *rec_first = first;
                trace!(target: "state.undo", line = first.line, "delete_coalesced_front");
                return true;
            }
            if first == *rec_first {
                if !saved.append(text) {
                    return false;
                }
                trace!(target: "state.undo", line = first.line, "delete_coalesced_back");
                return true;
            }
        }
        trace!(target: "state.undo", depth = self.undo.len() + 1, "delete_record");
        self.undo.push(UndoRecord::DeleteText {
            first,
            text: SplitBuffer::with_text(text),
        });
        true
    }

    /// Log an overwrite of `[start, end)` on `line`. The first stroke
    /// snapshots the entire original line; later strokes that resume at the
    /// last modified offset only advance the modified span and the
    /// rectangle extent.
    pub(crate) fn record_overwrite(
        &mut self,
        line: usize,
        start: usize,
        end: usize,
        original_line: &str,
        line_len: usize,
    ) {
        self.redo.clear();
        if let Some(UndoRecord::OverwriteText {
            last,
            last_modified,
            ..
        }) = self.undo.last_mut()
            && last.line == line
            && *last_modified == start
        {
            *last_modified = end;
            last.offset = last.offset.max(end);
            trace!(target: "state.undo", line, "overwrite_coalesced");
            return;
        }
        trace!(target: "state.undo", depth = self.undo.len() + 1, line, "overwrite_record");
        self.undo.push(UndoRecord::OverwriteText {
            first: Location::new(line, 0),
            last: Location::new(line, line_len.max(end)),
            origin: Location::new(line, 0),
            text: original_line.to_string(),
            first_modified: start,
            last_modified: end,
        });
    }
}

impl EditControl {
    /// Undo the most recent record: mirror it onto the redo stack, apply
    /// it, drop it. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(rec) = self.undo.pop_undo() else {
            return false;
        };
        trace!(target: "state.undo", depth = self.undo.undo.len(), "undo_pop");
        self.clear_selection();
        let mirror = self.mirror_record(&rec);
        self.apply_record(&rec);
        self.undo.push_redo(mirror);
        self.clear_desired();
        self.ensure_visible();
        true
    }

    /// Redo the most recently undone record; symmetric with [`undo`].
    ///
    /// [`undo`]: EditControl::undo
    pub fn redo(&mut self) -> bool {
        let Some(rec) = self.undo.pop_redo() else {
            return false;
        };
        trace!(target: "state.undo", depth = self.undo.redo.len(), "redo_pop");
        self.clear_selection();
        let mirror = self.mirror_record(&rec);
        self.apply_record(&rec);
        self.undo.push_undo(mirror);
        self.clear_desired();
        self.ensure_visible();
        true
    }

    /// Synthesize the inverse of `rec` by capturing the buffer region it is
    /// about to affect. Must run before `apply_record`.
    fn mirror_record(&self, rec: &UndoRecord) -> UndoRecord {
        match rec {
            UndoRecord::InsertText { first, last } => UndoRecord::DeleteText {
                first: *first,
                text: SplitBuffer::with_text(&self.get_range_text(*first, *last, "\n")),
            },
            UndoRecord::DeleteText { first, text } => UndoRecord::InsertText {
                first: *first,
                last: end_of_text(*first, text.as_str()),
            },
            UndoRecord::OverwriteText {
                first,
                last,
                origin,
                text,
                first_modified,
                last_modified,
            } => UndoRecord::OverwriteText {
                first: *origin,
                last: end_of_text(*origin, text),
                origin: *origin,
                text: self.get_range_text(*first, *last, "\n"),
                first_modified: *first_modified,
                last_modified: *last_modified,
            },
        }
    }

    /// Replay `rec` against the buffer with `processing_undo = true` so no
    /// new record is logged, then reposition the cursor per the record.
    fn apply_record(&mut self, rec: &UndoRecord) {
        match rec {
            UndoRecord::InsertText { first, last } => {
                self.delete_range(*first, *last, false, true);
                self.set_cursor(first.line, first.offset);
            }
            UndoRecord::DeleteText { first, text } => {
                match self.insert_range(*first, text.as_str(), true) {
                    Ok(end) => self.set_cursor(end.line, end.offset),
                    Err(_) => self.flush_history(),
                }
            }
            UndoRecord::OverwriteText {
                first,
                last,
                origin,
                text,
                last_modified,
                ..
            } => {
                self.delete_range(*first, *last, false, true);
                match self.insert_range(*origin, text, true) {
                    Ok(_) => self.set_cursor(origin.line, *last_modified),
                    Err(_) => self.flush_history(),
                }
            }
        }
    }

    /// Drop both stacks. Used when record construction cannot proceed, so
    /// history never disagrees with what actually happened to the buffer.
    pub(crate) fn flush_history(&mut self) {
        trace!(target: "state.undo", "history_flushed");
        self.undo.clear();
    }

    /// Measure how many records the undo stack currently holds.
    pub fn undo_depth(&self) -> usize {
        self.undo.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.undo.redo.len()
    }
}
