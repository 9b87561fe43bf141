//! Crossterm-backed screen writer.
//!
//! Cell writes are queued and flushed once per paint; the classic 4-bit
//! attribute pair maps onto the 16-color ANSI palette. Cursor state and
//! location persist across paints: cell output moves the terminal cursor
//! around, so every flush ends by re-asserting the last requested cursor
//! position and visibility.

use crate::ScreenWriter;
use anyhow::Result;
use core_state::CellAttr;
use crossterm::{
    cursor::{Hide, MoveTo, SetCursorStyle, Show},
    queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
};
use std::io::{Write, stdout};

/// CGA color index to ANSI terminal color.
const PALETTE: [Color; 16] = [
    Color::Black,
    Color::DarkBlue,
    Color::DarkGreen,
    Color::DarkCyan,
    Color::DarkRed,
    Color::DarkMagenta,
    Color::DarkYellow,
    Color::Grey,
    Color::DarkGrey,
    Color::Blue,
    Color::Green,
    Color::Cyan,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
    Color::White,
];

#[derive(Debug, Clone, Copy)]
struct Cell {
    x: u16,
    y: u16,
    ch: char,
    attr: CellAttr,
}

/// Buffered writer for one control placed at fixed terminal coordinates.
/// `frame_origin` addresses non-client cells (caption row); the client
/// area begins below it when a caption is present.
pub struct CrosstermScreen {
    frame_origin: (u16, u16),
    client_origin: (u16, u16),
    size: (u16, u16),
    cells: Vec<Cell>,
    cursor_pos: Option<(u16, u16)>,
    cursor_visible: bool,
    cursor_shape_pct: u8,
}

impl CrosstermScreen {
    pub fn new(frame_origin: (u16, u16), client_origin: (u16, u16), size: (u16, u16)) -> Self {
        Self {
            frame_origin,
            client_origin,
            size,
            cells: Vec::new(),
            cursor_pos: None,
            cursor_visible: false,
            cursor_shape_pct: 20,
        }
    }

    pub fn resize(&mut self, size: (u16, u16)) {
        self.size = size;
    }

    /// Emit queued cells, then re-assert cursor shape, position and
    /// visibility, and flush stdout.
    pub fn flush(&mut self) -> Result<()> {
        let mut out = stdout();
        for cell in self.cells.drain(..) {
            queue!(
                out,
                MoveTo(cell.x, cell.y),
                SetForegroundColor(PALETTE[cell.attr.foreground() as usize & 0x0f]),
                SetBackgroundColor(PALETTE[cell.attr.background() as usize & 0x0f]),
                Print(cell.ch)
            )?;
        }
        if self.cursor_visible {
            let style = if self.cursor_shape_pct >= 50 {
                SetCursorStyle::SteadyBlock
            } else {
                SetCursorStyle::SteadyUnderScore
            };
            if let Some((x, y)) = self.cursor_pos {
                queue!(out, MoveTo(x, y))?;
            }
            queue!(out, style, Show)?;
        } else {
            queue!(out, Hide)?;
        }
        out.flush()?;
        Ok(())
    }
}

impl ScreenWriter for CrosstermScreen {
    fn set_client_cell(&mut self, x: u16, y: u16, ch: char, attr: CellAttr) {
        self.cells.push(Cell {
            x: self.client_origin.0 + x,
            y: self.client_origin.1 + y,
            ch,
            attr,
        });
    }

    fn set_nonclient_cell(&mut self, x: u16, y: u16, ch: char, attr: CellAttr) {
        self.cells.push(Cell {
            x: self.frame_origin.0 + x,
            y: self.frame_origin.1 + y,
            ch,
            attr,
        });
    }

    fn set_cursor_state(&mut self, visible: bool, shape_pct: u8) {
        self.cursor_visible = visible;
        self.cursor_shape_pct = shape_pct;
    }

    fn set_cursor_location(&mut self, x: u16, y: u16) {
        self.cursor_pos = Some((
            self.client_origin.0 + x,
            self.client_origin.1 + y,
        ));
    }

    fn client_size(&self) -> (u16, u16) {
        self.size
    }
}
