//! Event types consumed by the edit control's dispatcher, plus the async
//! sources the host uses to feed its event loop.
//!
//! The control itself is single-threaded and cooperative: it never polls
//! and never owns a timer. The host runs a bounded channel, forwards input
//! events in arrival order, and delivers [`Event::Tick`] from a
//! [`TickEventSource`] while the control reports that it needs recurring
//! ticks (drag auto-scroll).

use std::sync::atomic::AtomicU64;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

// The event loop uses a bounded mpsc channel sized by `EVENT_CHANNEL_CAP`.
// A single blocking input producer uses `blocking_send`, parking rather
// than dropping events; motion fidelity matters more than shedding load.
pub const EVENT_CHANNEL_CAP: usize = 8192;

/// Period of the recurring auto-scroll tick delivered while a mouse drag
/// sits outside the client area.
pub const AUTO_SCROLL_TICK_MS: u64 = 100;

// Minimal telemetry counters, inspected by tests and periodic logging.
pub static CHANNEL_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static TICKS_EMITTED: AtomicU64 = AtomicU64::new(0);

/// Top-level event enum consumed by the host event loop.
#[derive(Debug, Clone)]
pub enum Event {
    Input(InputEvent),
    /// Recurring timer tick; repeats the last out-of-bounds drag position
    /// for continuous scroll.
    Tick,
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
    Shutdown,
}

/// Normalized input events delivered to the dispatcher.
#[derive(Debug, Clone)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Key release; only modifier releases are dispatched (numeric-keypad
    /// compose commits on Alt release).
    KeyRelease(KeyEvent),
    Mouse(MouseEvent),
    Wheel(WheelEvent),
    /// Bracketed paste delivered whole by the terminal.
    Paste(String),
    FocusGained,
    FocusLost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
    /// True for keys reported from the numeric keypad (Alt-compose input).
    pub keypad: bool,
}

impl KeyEvent {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::empty(),
            keypad: false,
        }
    }

    pub fn with_mods(code: KeyCode, mods: KeyModifiers) -> Self {
        Self {
            code,
            mods,
            keypad: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    /// A bare modifier (seen mostly as a release for compose commit).
    Alt,
    F(u8),
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL  = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const SHIFT = 0b0000_0100;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MouseEvent {
    pub kind: MouseEventKind,
    /// Column relative to the control's client origin; may be negative
    /// while dragging left of the control.
    pub column: i32,
    /// Row relative to the control's client origin.
    pub row: i32,
    pub mods: KeyModifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseEventKind {
    Down(MouseButton),
    Up(MouseButton),
    Drag(MouseButton),
    Moved,
    DoubleClick(MouseButton),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Wheel scroll in whole lines; positive scrolls the viewport down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WheelEvent {
    pub lines: i32,
}

/// Trait implemented by any async event producer. Implementors spawn one
/// background task that pushes `Event`s into the shared channel and exit
/// promptly when the channel closes.
pub trait AsyncEventSource: Send + 'static {
    fn name(&self) -> &'static str;
    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()>;
}

/// Built-in monotonic tick source. Emits `Event::Tick` every interval; the
/// consumer decides whether a tick is currently meaningful, so the source
/// stays trivially stateless.
pub struct TickEventSource {
    interval: std::time::Duration,
}

impl TickEventSource {
    pub fn new(interval: std::time::Duration) -> Self {
        Self { interval }
    }

    pub fn auto_scroll() -> Self {
        Self::new(std::time::Duration::from_millis(AUTO_SCROLL_TICK_MS))
    }
}

impl AsyncEventSource for TickEventSource {
    fn name(&self) -> &'static str {
        "tick"
    }

    fn spawn(self: Box<Self>, tx: Sender<Event>) -> JoinHandle<()> {
        let dur = self.interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(dur);
            loop {
                interval.tick().await;
                TICKS_EMITTED.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                if tx.send(Event::Tick).await.is_err() {
                    break;
                }
            }
        })
    }
}

/// Registry of event sources spawned together at startup.
#[derive(Default)]
pub struct EventSourceRegistry {
    sources: Vec<Box<dyn AsyncEventSource>>,
}

impl EventSourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<S: AsyncEventSource>(&mut self, src: S) {
        self.sources.push(Box::new(src));
    }

    /// Spawn all registered sources. Each receives its own `Sender` clone;
    /// dropping the caller's final clone closes the channel and the sources
    /// exit cooperatively.
    pub fn spawn_all(&mut self, tx: &Sender<Event>) -> Vec<JoinHandle<()>> {
        let mut out = Vec::with_capacity(self.sources.len());
        for src in self.sources.drain(..) {
            tracing::info!(target: "runtime.events", source = src.name(), "spawning event source");
            out.push(src.spawn(tx.clone()));
        }
        out
    }
}
