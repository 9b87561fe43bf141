//! Paint driver and screen collaborator interfaces.
//!
//! The control never talks to the terminal directly: the painter walks the
//! dirty lines and emits cells through the narrow [`ScreenWriter`] trait,
//! and viewport changes surface through [`ScrollBarHost`]. The crossterm
//! implementation in [`term`] batches cell writes and flushes once per
//! paint.

use core_state::CellAttr;

pub mod paint;
pub mod term;

pub use paint::Painter;
pub use term::CrosstermScreen;

/// Cell-level output interface of the host screen. Coordinates are
/// relative: client cells to the text area origin, non-client cells to the
/// control frame origin.
pub trait ScreenWriter {
    fn set_client_cell(&mut self, x: u16, y: u16, ch: char, attr: CellAttr);
    fn set_nonclient_cell(&mut self, x: u16, y: u16, ch: char, attr: CellAttr);
    /// Cursor visibility and shape, as a fill percentage from the bottom of
    /// the cell (20 = insert caret, 50 = overwrite block).
    fn set_cursor_state(&mut self, visible: bool, shape_pct: u8);
    fn set_cursor_location(&mut self, x: u16, y: u16);
    fn client_size(&self) -> (u16, u16);
}

/// Scroll-bar collaborator: told where the viewport sits whenever it moves
/// or the line count changes.
pub trait ScrollBarHost {
    fn set_position(&mut self, top: usize, visible: usize, max: usize);
}
