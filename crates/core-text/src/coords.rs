//! Buffer offset ↔ display column translation.
//!
//! Two coordinate spaces share `(line, column)` shape but differ in meaning:
//! a buffer offset indexes characters (tab = 1), a display offset counts
//! terminal cells (tab = `tab_width`). Both directions clamp on truncated
//! lines; what happens past end-of-line depends on the navigation style.

/// How the cursor behaves relative to end-of-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationStyle {
    /// Cursor is clamped to the line contents; horizontal motion crosses
    /// line boundaries.
    #[default]
    Modern,
    /// Cursor may rest beyond end-of-line; horizontal motion stays on the
    /// line.
    Traditional,
}

/// Display column of character `offset` in `line`. Offsets beyond the line
/// extend the column by the excess (virtual space is single-width).
pub fn display_from_buffer(line: &str, offset: usize, tab_width: usize) -> usize {
    let mut col = 0usize;
    let mut idx = 0usize;
    for ch in line.chars() {
        if idx >= offset {
            return col;
        }
        col += cell_width(ch, tab_width);
        idx += 1;
    }
    col + (offset - idx)
}

/// Total display width of `line`.
pub fn display_width(line: &str, tab_width: usize) -> usize {
    line.chars().map(|c| cell_width(c, tab_width)).sum()
}

/// Buffer offset of display column `column` in `line`. A column landing
/// inside a tab's cells resolves to the tab itself (nearest boundary at or
/// left of the column). Past the rendered width, `Modern` clamps to the
/// line length and `Traditional` returns the excess so the cursor can rest
/// beyond end-of-line.
pub fn buffer_from_display(
    line: &str,
    column: usize,
    tab_width: usize,
    style: NavigationStyle,
) -> usize {
    let mut col = 0usize;
    let mut idx = 0usize;
    for ch in line.chars() {
        let w = cell_width(ch, tab_width);
        if col + w > column {
            return idx;
        }
        col += w;
        idx += 1;
    }
    match style {
        NavigationStyle::Modern => idx,
        NavigationStyle::Traditional => idx + (column - col),
    }
}

fn cell_width(ch: char, tab_width: usize) -> usize {
    if ch == '\t' { tab_width } else { 1 }
}
