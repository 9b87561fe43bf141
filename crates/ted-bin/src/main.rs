//! termedit entrypoint: a host application embedding the multiline edit
//! control.
//!
//! The host owns everything the control deliberately does not: the
//! terminal session, the event loop and its channel, the recurring
//! auto-scroll timer, the system clipboard, file I/O, and control layout
//! (caption row on top, scroll bar on the right edge). Ctrl+Q quits,
//! Ctrl+S saves.

use anyhow::{Context, Result};
use clap::Parser;
use core_actions::{Clipboard, DispatchContext, LocalClipboard, dispatch};
use core_config::Config;
use core_events::{
    EVENT_CHANNEL_CAP, Event, EventSourceRegistry, InputEvent, KeyCode, KeyEvent, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind, TickEventSource, WheelEvent,
};
use core_render::{CrosstermScreen, Painter, ScreenWriter, ScrollBarHost};
use core_state::{CellAttr, EditControl, EditError};
use core_terminal::{CrosstermBackend, TerminalBackend};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{error, info, trace};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Two clicks this close together (and on the same cell) are a
/// double-click.
const DOUBLE_CLICK_WINDOW: Duration = Duration::from_millis(400);
/// Wheel notches scroll this many lines.
const WHEEL_LINES: i32 = 3;

#[derive(Parser, Debug)]
#[command(name = "termedit", version, about = "Terminal multiline edit control demo")]
struct Args {
    /// Optional UTF-8 text file to load at startup.
    pub path: Option<PathBuf>,
    /// Configuration file path (overrides discovery of `termedit.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Open read-only regardless of configuration.
    #[arg(long = "read-only")]
    pub read_only: bool,
}

fn init_logging(config: &Config) -> Result<WorkerGuard> {
    let appender = tracing_appender::rolling::never(".", "termedit.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = match (std::env::var("RUST_LOG").ok(), &config.file.log.filter) {
        (Some(env), _) => EnvFilter::new(env),
        (None, Some(cfg)) => EnvFilter::new(cfg.clone()),
        (None, None) => EnvFilter::new("info"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(guard)
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(target: "runtime", %info, "panic");
        previous(info);
    }));
}

/// System clipboard when available, in-process fallback otherwise.
enum HostClipboard {
    System(arboard::Clipboard),
    Local(LocalClipboard),
}

impl HostClipboard {
    fn new() -> Self {
        match arboard::Clipboard::new() {
            Ok(cb) => Self::System(cb),
            Err(err) => {
                info!(target: "runtime", %err, "system clipboard unavailable, using local");
                Self::Local(LocalClipboard::new())
            }
        }
    }
}

impl Clipboard for HostClipboard {
    fn copy(&mut self, text: &str) -> Result<(), EditError> {
        match self {
            Self::System(cb) => cb
                .set_text(text.to_string())
                .map_err(|_| EditError::ClipboardUnavailable),
            Self::Local(cb) => cb.copy(text),
        }
    }

    fn paste(&mut self) -> Result<String, EditError> {
        match self {
            Self::System(cb) => cb.get_text().map_err(|_| EditError::ClipboardUnavailable),
            Self::Local(cb) => cb.paste(),
        }
    }
}

/// Records the viewport geometry the painter reports and draws a thumb on
/// the right edge.
#[derive(Debug, Default)]
struct ScrollBar {
    top: usize,
    visible: usize,
    max: usize,
    changed: bool,
}

impl ScrollBarHost for ScrollBar {
    fn set_position(&mut self, top: usize, visible: usize, max: usize) {
        self.top = top;
        self.visible = visible;
        self.max = max;
        self.changed = true;
    }
}

impl ScrollBar {
    fn draw(&mut self, screen: &mut CrosstermScreen, column: u16, height: u16) {
        if height == 0 {
            return;
        }
        let track = height as usize;
        let max = self.max.max(1);
        let thumb_len = ((self.visible * track) / max).clamp(1, track);
        let thumb_top = if max > self.visible {
            (self.top * (track - thumb_len)) / (max - self.visible).max(1)
        } else {
            0
        };
        for row in 0..track {
            let ch = if row >= thumb_top && row < thumb_top + thumb_len {
                '█'
            } else {
                '░'
            };
            screen.set_nonclient_cell(column, 1 + row as u16, ch, CellAttr::TEXT);
        }
        self.changed = false;
    }
}

/// Control layout inside the terminal: caption row 0, scroll bar in the
/// last column, client area in between.
fn layout(ctrl: &mut EditControl, screen: &mut CrosstermScreen, cols: u16, rows: u16) {
    let client_w = cols.saturating_sub(1);
    let client_h = rows.saturating_sub(1);
    screen.resize((client_w, client_h));
    ctrl.reposition(client_w, client_h);
}

fn translate_key(ev: crossterm::event::KeyEvent) -> Option<InputEvent> {
    use crossterm::event::{
        KeyCode as CtKey, KeyEventKind, KeyEventState, KeyModifiers as CtMods, ModifierKeyCode,
    };
    let mut mods = KeyModifiers::empty();
    if ev.modifiers.contains(CtMods::CONTROL) {
        mods |= KeyModifiers::CTRL;
    }
    if ev.modifiers.contains(CtMods::ALT) {
        mods |= KeyModifiers::ALT;
    }
    if ev.modifiers.contains(CtMods::SHIFT) {
        mods |= KeyModifiers::SHIFT;
    }
    let code = match ev.code {
        CtKey::Char(c) => KeyCode::Char(c),
        CtKey::Enter => KeyCode::Enter,
        CtKey::Esc => KeyCode::Esc,
        CtKey::Backspace => KeyCode::Backspace,
        CtKey::Tab => KeyCode::Tab,
        CtKey::Up => KeyCode::Up,
        CtKey::Down => KeyCode::Down,
        CtKey::Left => KeyCode::Left,
        CtKey::Right => KeyCode::Right,
        CtKey::Home => KeyCode::Home,
        CtKey::End => KeyCode::End,
        CtKey::PageUp => KeyCode::PageUp,
        CtKey::PageDown => KeyCode::PageDown,
        CtKey::Insert => KeyCode::Insert,
        CtKey::Delete => KeyCode::Delete,
        CtKey::F(n) => KeyCode::F(n),
        CtKey::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) => KeyCode::Alt,
        _ => return None,
    };
    let key = KeyEvent {
        code,
        mods,
        keypad: ev.state.contains(KeyEventState::KEYPAD),
    };
    match ev.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => Some(InputEvent::Key(key)),
        KeyEventKind::Release => Some(InputEvent::KeyRelease(key)),
    }
}

fn translate_mouse(ev: crossterm::event::MouseEvent) -> Option<InputEvent> {
    use crossterm::event::{MouseButton as CtButton, MouseEventKind as CtKind};
    let button = |b: CtButton| match b {
        CtButton::Left => MouseButton::Left,
        CtButton::Middle => MouseButton::Middle,
        CtButton::Right => MouseButton::Right,
    };
    let mut mods = KeyModifiers::empty();
    if ev
        .modifiers
        .contains(crossterm::event::KeyModifiers::SHIFT)
    {
        mods |= KeyModifiers::SHIFT;
    }
    let kind = match ev.kind {
        CtKind::Down(b) => MouseEventKind::Down(button(b)),
        CtKind::Up(b) => MouseEventKind::Up(button(b)),
        CtKind::Drag(b) => MouseEventKind::Drag(button(b)),
        CtKind::Moved => MouseEventKind::Moved,
        CtKind::ScrollUp => return Some(InputEvent::Wheel(WheelEvent { lines: -WHEEL_LINES })),
        CtKind::ScrollDown => return Some(InputEvent::Wheel(WheelEvent { lines: WHEEL_LINES })),
        _ => return None,
    };
    Some(InputEvent::Mouse(MouseEvent {
        kind,
        column: ev.column as i32,
        row: ev.row as i32,
        mods,
    }))
}

/// Blocking input thread: translate crossterm events and push them into
/// the bounded channel, parking on backpressure rather than dropping.
fn spawn_input_thread(tx: mpsc::Sender<Event>) {
    std::thread::spawn(move || {
        loop {
            let ev = match crossterm::event::read() {
                Ok(ev) => ev,
                Err(err) => {
                    error!(target: "runtime.input", %err, "input read failed");
                    break;
                }
            };
            let translated = match ev {
                crossterm::event::Event::Key(k) => translate_key(k),
                crossterm::event::Event::Mouse(m) => translate_mouse(m),
                crossterm::event::Event::Paste(text) => Some(InputEvent::Paste(text)),
                crossterm::event::Event::FocusGained => Some(InputEvent::FocusGained),
                crossterm::event::Event::FocusLost => Some(InputEvent::FocusLost),
                crossterm::event::Event::Resize(w, h) => {
                    if tx.blocking_send(Event::Resize(w, h)).is_err() {
                        break;
                    }
                    continue;
                }
            };
            if let Some(input) = translated
                && tx.blocking_send(Event::Input(input)).is_err()
            {
                break;
            }
        }
    });
}

fn load_file(ctrl: &mut EditControl, path: &Path) -> Result<()> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    ctrl.insert_text_at_cursor(&text)?;
    ctrl.set_cursor_location(0, 0);
    ctrl.set_modify_state(false);
    Ok(())
}

fn save_file(ctrl: &mut EditControl, path: &Path) -> Result<()> {
    let mut out = String::new();
    for i in 0..ctrl.get_line_count() {
        out.push_str(ctrl.get_line_by_index(i).unwrap_or(""));
        out.push('\n');
    }
    std::fs::write(path, out).with_context(|| format!("writing {}", path.display()))?;
    ctrl.set_modify_state(false);
    info!(target: "runtime", path = %path.display(), "saved");
    Ok(())
}

/// Turn a second left-button press on the same cell inside the window into
/// a double-click.
struct ClickTracker {
    last: Option<(Instant, i32, i32)>,
}

impl ClickTracker {
    fn new() -> Self {
        Self { last: None }
    }

    fn observe(&mut self, ev: &MouseEvent) -> MouseEventKind {
        if let MouseEventKind::Down(MouseButton::Left) = ev.kind {
            let now = Instant::now();
            let double = matches!(
                self.last,
                Some((at, col, row))
                    if now.duration_since(at) <= DOUBLE_CLICK_WINDOW
                        && col == ev.column
                        && row == ev.row
            );
            if double {
                self.last = None;
                return MouseEventKind::DoubleClick(MouseButton::Left);
            }
            self.last = Some((now, ev.column, ev.row));
        }
        ev.kind
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = core_config::load(args.config.clone())?;
    let _log_guard = init_logging(&config)?;
    install_panic_hook();
    info!(target: "runtime", "startup");

    let mut backend = CrosstermBackend::new();
    let caption = args
        .path
        .as_ref()
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "untitled".to_string());
    backend.set_title(&format!("termedit - {caption}"))?;
    let guard = backend.enter_guard()?;
    let result = run(&args, &config, caption).await;
    drop(guard);
    result
}

async fn run(args: &Args, config: &Config, caption: String) -> Result<()> {
    let mut ctrl = EditControl::new();
    ctrl.set_tab_width(config.file.editor.tab_width);
    ctrl.set_auto_indent(config.file.editor.auto_indent);
    ctrl.set_traditional_navigation(config.file.editor.traditional_navigation);
    ctrl.set_color(
        CellAttr(config.file.colors.text_attr),
        CellAttr(config.file.colors.selected_attr),
    );
    ctrl.set_caption(&caption);

    if let Some(path) = &args.path
        && path.is_file()
    {
        load_file(&mut ctrl, path)?;
    }
    ctrl.set_read_only(config.file.editor.read_only || args.read_only);
    ctrl.set_focus(true);

    let (cols, rows) = crossterm::terminal::size()?;
    let mut screen = CrosstermScreen::new((0, 0), (0, 1), (0, 0));
    layout(&mut ctrl, &mut screen, cols, rows);

    let (tx, mut rx) = mpsc::channel::<Event>(EVENT_CHANNEL_CAP);
    let mut registry = EventSourceRegistry::new();
    registry.register(TickEventSource::auto_scroll());
    let _source_handles = registry.spawn_all(&tx);
    spawn_input_thread(tx.clone());
    drop(tx);

    let mut clipboard = HostClipboard::new();
    let mut painter = Painter::new();
    let mut scrollbar = ScrollBar::default();
    let mut clicks = ClickTracker::new();
    let mut term_size = (cols, rows);

    painter.paint(&mut ctrl, &mut screen, Some(&mut scrollbar));
    if scrollbar.changed {
        scrollbar.draw(&mut screen, term_size.0.saturating_sub(1), term_size.1.saturating_sub(1));
    }
    screen.flush()?;

    while let Some(event) = rx.recv().await {
        match event {
            Event::Shutdown => break,
            Event::Tick => {
                if !ctrl.needs_recurring_tick() {
                    continue;
                }
                let mut ctx = DispatchContext::new(Some(&mut clipboard));
                dispatch(&mut ctrl, &Event::Tick, &mut ctx);
            }
            Event::Resize(w, h) => {
                term_size = (w, h);
                layout(&mut ctrl, &mut screen, w, h);
            }
            Event::Input(InputEvent::Key(key))
                if key.mods.contains(KeyModifiers::CTRL)
                    && matches!(key.code, KeyCode::Char('q')) =>
            {
                break;
            }
            Event::Input(InputEvent::Key(key))
                if key.mods.contains(KeyModifiers::CTRL)
                    && matches!(key.code, KeyCode::Char('s')) =>
            {
                if let Some(path) = &args.path
                    && let Err(err) = save_file(&mut ctrl, path)
                {
                    error!(target: "runtime", %err, "save failed");
                }
            }
            Event::Input(InputEvent::Mouse(mouse)) => {
                // Terminal coordinates arrive absolute; the dispatcher
                // wants them client-relative.
                let client = MouseEvent {
                    kind: clicks.observe(&mouse),
                    column: mouse.column,
                    row: mouse.row - 1,
                    mods: mouse.mods,
                };
                let mut ctx = DispatchContext::new(Some(&mut clipboard));
                let outcome = dispatch(
                    &mut ctrl,
                    &Event::Input(InputEvent::Mouse(client)),
                    &mut ctx,
                );
                trace!(target: "runtime", handled = outcome.handled, "mouse dispatched");
            }
            ref ev @ Event::Input(_) => {
                let mut ctx = DispatchContext::new(Some(&mut clipboard));
                dispatch(&mut ctrl, ev, &mut ctx);
            }
        }
        painter.paint(&mut ctrl, &mut screen, Some(&mut scrollbar));
        if scrollbar.changed {
            scrollbar.draw(
                &mut screen,
                term_size.0.saturating_sub(1),
                term_size.1.saturating_sub(1),
            );
        }
        screen.flush()?;
    }

    info!(target: "runtime", modified = ctrl.get_modify_state(), "shutdown");
    Ok(())
}
