// ABOUTME: Terminal instance wrapping alacritty_terminal.
// ABOUTME: Owns the engine state, paints layer canvases, and emits terminal events.

use alacritty_terminal::event::{Event, EventListener};
use alacritty_terminal::grid::Dimensions;
use alacritty_terminal::index::{Column, Line, Point, Side};
use alacritty_terminal::selection::{Selection, SelectionType};
use alacritty_terminal::sync::FairMutex;
use alacritty_terminal::term::{Term, TermMode};
use alacritty_terminal::vte::ansi::Processor;
use glitch_core::{LayerRole, TerminalOptions};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use crate::addon::Addon;
use crate::atlas::{CellMetrics, GlyphAtlas, GlyphSource};
use crate::element::{ContentBox, PointerEvent, TerminalElement};
use crate::events::{Emitter, Subscription};
use crate::fonts::{self, FontError};
use crate::links::{LinkProvider, LinkSpan};
use crate::painter::Painter;
use crate::snapshot::ScreenSnapshot;

/// Engine notifications, forwarded from whichever thread produced them
#[derive(Debug)]
enum EngineEvent {
    Wakeup,
    Title(String),
    ResetTitle,
    PtyWrite(String),
    Bell,
    Exit,
}

/// Proxy for terminal events
#[derive(Clone)]
pub(crate) struct EventProxy {
    sender: Sender<EngineEvent>,
}

impl EventListener for EventProxy {
    fn send_event(&self, event: Event) {
        let event = match event {
            Event::Wakeup => EngineEvent::Wakeup,
            Event::Title(title) => EngineEvent::Title(title),
            Event::ResetTitle => EngineEvent::ResetTitle,
            Event::PtyWrite(text) => EngineEvent::PtyWrite(text),
            Event::Bell => EngineEvent::Bell,
            Event::Exit => EngineEvent::Exit,
            _ => return,
        };
        // The receiver is gone once the terminal is dropped
        let _ = self.sender.send(event);
    }
}

/// Simple size type that implements Dimensions
pub(crate) struct TermSize {
    columns: usize,
    lines: usize,
}

impl TermSize {
    pub(crate) fn new(columns: usize, lines: usize) -> Self {
        Self { columns, lines }
    }
}

impl Dimensions for TermSize {
    fn columns(&self) -> usize {
        self.columns
    }

    fn screen_lines(&self) -> usize {
        self.lines
    }

    fn total_lines(&self) -> usize {
        self.lines
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TerminalError {
    #[error(transparent)]
    Font(#[from] FontError),

    #[error("Failed to create PTY: {0}")]
    PtyError(#[from] std::io::Error),
}

/// Rows repainted by a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderRange {
    pub start: usize,
    pub end: usize,
}

#[derive(Default)]
struct Emitters {
    data: Emitter<String>,
    render: Emitter<RenderRange>,
    cursor_move: Emitter<(usize, usize)>,
    selection_change: Emitter<()>,
    resize: Emitter<(u16, u16)>,
    title_change: Emitter<String>,
    exit: Emitter<()>,
    pty_write: Emitter<String>,
    link_hover: Emitter<Option<String>>,
}

impl Emitters {
    fn clear(&self) {
        self.data.clear();
        self.render.clear();
        self.cursor_move.clear();
        self.selection_change.clear();
        self.resize.clear();
        self.title_change.clear();
        self.exit.clear();
        self.pty_write.clear();
        self.link_hover.clear();
    }
}

struct View {
    element: TerminalElement,
    painter: Painter,
    snapshot: Option<ScreenSnapshot>,
}

struct HoveredLink {
    provider: usize,
    span: LinkSpan,
}

#[derive(Default)]
struct PointerState {
    button_down: bool,
    anchor: Option<(Point, Side)>,
    hovered: Option<HoveredLink>,
}

/// Terminal instance: engine state, layer canvases, and event emitters.
/// No PTY is attached; see `Pty` for that.
pub struct Terminal {
    options: TerminalOptions,
    term: Arc<FairMutex<Term<EventProxy>>>,
    proxy: EventProxy,
    events: Receiver<EngineEvent>,
    parser: Processor,
    view: Option<View>,
    addons: Vec<Box<dyn Addon>>,
    link_providers: Vec<Box<dyn LinkProvider>>,
    pointer: PointerState,
    last_cursor: Option<(usize, usize)>,
    title: Option<String>,
    exited: bool,
    disposed: bool,
    emitters: Emitters,
}

impl Terminal {
    pub fn new(options: TerminalOptions) -> Self {
        let (sender, events) = mpsc::channel();
        let proxy = EventProxy { sender };

        let term_size = TermSize::new(options.columns.max(1) as usize, options.rows.max(1) as usize);
        let term_config = alacritty_terminal::term::Config {
            scrolling_history: options.scrollback_lines,
            ..Default::default()
        };
        let term = Term::new(term_config, &term_size, proxy.clone());

        Self {
            options,
            term: Arc::new(FairMutex::new(term)),
            proxy,
            events,
            parser: Processor::new(),
            view: None,
            addons: Vec::new(),
            link_providers: Vec::new(),
            pointer: PointerState::default(),
            last_cursor: None,
            title: None,
            exited: false,
            disposed: false,
            emitters: Emitters::default(),
        }
    }

    pub fn options(&self) -> &TerminalOptions {
        &self.options
    }

    /// User input (keystrokes, pastes). Each call is one `on_data` unit.
    pub fn input(&self, data: &str) {
        if self.disposed {
            return;
        }
        self.emitters.data.emit(&data.to_string());
    }

    /// Feed program output to the engine directly
    pub fn write(&mut self, bytes: &[u8]) {
        if self.disposed {
            return;
        }
        {
            let mut term = self.term.lock();
            self.parser.advance(&mut *term, bytes);
        }
        let _ = self.proxy.sender.send(EngineEvent::Wakeup);
    }

    /// Create the element inside a container, rasterizing the configured font
    pub fn open(&mut self, content_box: ContentBox) -> Result<(), TerminalError> {
        let (path, data) = fonts::load_font_data(self.options.font_path.as_deref())?;
        let font_size = self.options.font_size * content_box.scale_factor as f32;
        let atlas = GlyphAtlas::new(&data, font_size)?;
        tracing::info!("Using font {} at {:.1}px", path.display(), font_size);
        self.open_with_glyphs(content_box, Box::new(atlas));
        Ok(())
    }

    pub fn open_with_glyphs(&mut self, content_box: ContentBox, glyphs: Box<dyn GlyphSource>) {
        if self.view.is_some() {
            tracing::warn!("Terminal already opened");
            return;
        }
        let element = TerminalElement::new(content_box);
        let (width, height) = element.size();
        tracing::debug!("Opened terminal element {}x{} device pixels", width, height);

        self.view = Some(View {
            element,
            painter: Painter::new(glyphs, self.options.color_scheme.clone()),
            snapshot: None,
        });
        self.repaint(true, true);
        self.last_cursor = self.snapshot().and_then(|s| s.cursor);
    }

    /// The opened element, `None` until `open`
    pub fn element(&self) -> Option<&TerminalElement> {
        self.view.as_ref().map(|v| &v.element)
    }

    pub fn cell_metrics(&self) -> Option<CellMetrics> {
        self.view.as_ref().map(|v| v.painter.metrics())
    }

    /// Last painted screen
    pub fn snapshot(&self) -> Option<&ScreenSnapshot> {
        self.view.as_ref().and_then(|v| v.snapshot.as_ref())
    }

    pub fn load_addon(&mut self, mut addon: Box<dyn Addon>) {
        tracing::debug!("Loading addon {}", addon.name());
        addon.activate(self);
        self.addons.push(addon);
    }

    pub fn register_link_provider(&mut self, provider: Box<dyn LinkProvider>) {
        self.link_providers.push(provider);
    }

    /// Drain engine notifications and repaint if content changed
    pub fn process_events(&mut self) {
        let mut wakeup = false;
        while let Ok(event) = self.events.try_recv() {
            match event {
                EngineEvent::Wakeup => wakeup = true,
                EngineEvent::Title(title) => {
                    self.emitters.title_change.emit(&title);
                    self.title = Some(title);
                }
                EngineEvent::ResetTitle => {
                    self.title = None;
                    self.emitters.title_change.emit(&String::new());
                }
                EngineEvent::PtyWrite(text) => self.emitters.pty_write.emit(&text),
                EngineEvent::Bell => tracing::debug!("Bell"),
                EngineEvent::Exit => {
                    if !self.exited {
                        self.exited = true;
                        tracing::info!("Terminal process exited");
                        self.emitters.exit.emit(&());
                    }
                }
            }
        }

        if wakeup && !self.disposed {
            self.refresh_content();
        }
    }

    fn refresh_content(&mut self) {
        if self.view.is_none() {
            return;
        }
        self.repaint(true, false);

        let Some((rows, cursor)) = self.snapshot().map(|s| (s.rows, s.cursor)) else {
            return;
        };
        self.emitters.render.emit(&RenderRange {
            start: 0,
            end: rows.saturating_sub(1),
        });
        if cursor != self.last_cursor {
            self.last_cursor = cursor;
            if let Some(position) = cursor {
                self.emitters.cursor_move.emit(&position);
            }
        }
    }

    fn repaint(&mut self, content: bool, link: bool) {
        let Some(view) = self.view.as_mut() else {
            return;
        };
        let snapshot = {
            let term = self.term.lock();
            ScreenSnapshot::capture(&*term, view.painter.scheme())
        };

        if content {
            if let Some(canvas) = view.element.canvas_mut(LayerRole::Screen) {
                view.painter.paint_screen(&snapshot, canvas);
            }
            if let Some(canvas) = view.element.canvas_mut(LayerRole::Cursor) {
                view.painter.paint_cursor(&snapshot, canvas);
            }
        }
        if link {
            let hovered = self.pointer.hovered.as_ref().map(|h| &h.span);
            if let Some(canvas) = view.element.canvas_mut(LayerRole::Link) {
                view.painter.paint_link(&snapshot, hovered, canvas);
            }
        }
        view.snapshot = Some(snapshot);
    }

    fn point_at(&self, x: f64, y: f64) -> Option<(Point, Side)> {
        let view = self.view.as_ref()?;
        let snapshot = view.snapshot.as_ref()?;
        let (col, row, right_half) = view.painter.cell_at(snapshot, x, y);
        let side = if right_half { Side::Right } else { Side::Left };
        Some((Point::new(Line(row as i32), Column(col)), side))
    }

    fn link_at(&self, x: f64, y: f64) -> Option<HoveredLink> {
        let view = self.view.as_ref()?;
        let snapshot = view.snapshot.as_ref()?;
        let (col, row, _) = view.painter.cell_at(snapshot, x, y);
        let text = snapshot.row_text(row);
        self.link_providers
            .iter()
            .enumerate()
            .find_map(|(provider, p)| {
                p.provide_links(row, &text)
                    .into_iter()
                    .find(|span| span.contains(col, row))
                    .map(|span| HoveredLink { provider, span })
            })
    }

    /// Button pressed over the element. With `activate_links`, a press on a
    /// link opens it instead of starting a selection.
    pub fn mouse_down(&mut self, x: f64, y: f64, activate_links: bool) {
        if self.view.is_none() || self.disposed {
            return;
        }
        let event = PointerEvent { x, y };

        if activate_links {
            if let Some(hit) = self.link_at(x, y) {
                if let Some(provider) = self.link_providers.get(hit.provider) {
                    provider.activate(&hit.span);
                }
                self.emit_pointer(event, PointerKind::Down);
                return;
            }
        }

        self.pointer.button_down = true;
        self.pointer.anchor = self.point_at(x, y);

        let had_selection = self.term.lock().selection.take().is_some();
        if had_selection {
            self.repaint(false, true);
            self.emitters.selection_change.emit(&());
        }
        self.emit_pointer(event, PointerKind::Down);
    }

    pub fn mouse_move(&mut self, x: f64, y: f64) {
        if self.view.is_none() || self.disposed {
            return;
        }

        if self.pointer.button_down {
            let (Some((anchor, anchor_side)), Some((point, side))) = (self.pointer.anchor, self.point_at(x, y))
            else {
                return;
            };
            {
                let mut term = self.term.lock();
                match term.selection.as_mut() {
                    Some(selection) => selection.update(point, side),
                    None => {
                        let mut selection = Selection::new(SelectionType::Simple, anchor, anchor_side);
                        selection.update(point, side);
                        term.selection = Some(selection);
                    }
                }
            }
            self.repaint(false, true);
            self.emitters.selection_change.emit(&());
            self.emit_pointer(PointerEvent { x, y }, PointerKind::Drag);
            return;
        }

        let hit = self.link_at(x, y);
        let changed = match (&hit, &self.pointer.hovered) {
            (Some(a), Some(b)) => a.span != b.span,
            (None, None) => false,
            _ => true,
        };
        if changed {
            let uri = hit.as_ref().map(|h| h.span.uri.clone());
            self.pointer.hovered = hit;
            self.repaint(false, true);
            self.emitters.link_hover.emit(&uri);
        }
    }

    pub fn mouse_up(&mut self, x: f64, y: f64) {
        if self.view.is_none() || self.disposed {
            return;
        }
        self.pointer.button_down = false;
        self.pointer.anchor = None;
        self.emit_pointer(PointerEvent { x, y }, PointerKind::Up);
    }

    fn emit_pointer(&self, event: PointerEvent, kind: PointerKind) {
        let Some(element) = self.element() else {
            return;
        };
        match kind {
            PointerKind::Down => element.emit_mouse_down(event),
            PointerKind::Up => element.emit_mouse_up(event),
            PointerKind::Drag => element.emit_drag(event),
        }
    }

    pub fn has_selection(&self) -> bool {
        self.term.lock().selection.is_some()
    }

    /// Selected text, `None` when nothing is selected
    pub fn selection_text(&self) -> Option<String> {
        self.term
            .lock()
            .selection_to_string()
            .filter(|text| !text.is_empty())
    }

    pub fn clear_selection(&mut self) {
        if self.term.lock().selection.take().is_some() {
            self.repaint(false, true);
            self.emitters.selection_change.emit(&());
        }
    }

    /// Resize the grid
    pub fn resize(&mut self, columns: u16, rows: u16) {
        let columns = columns.max(1);
        let rows = rows.max(1);
        self.term
            .lock()
            .resize(TermSize::new(columns as usize, rows as usize));
        self.pointer.hovered = None;
        tracing::debug!("Terminal resized to {}x{}", columns, rows);

        self.repaint(true, true);
        self.emitters.resize.emit(&(columns, rows));
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        let term = self.term.lock();
        let grid = term.grid();
        (grid.columns() as u16, grid.screen_lines() as u16)
    }

    pub fn mode(&self) -> TermMode {
        *self.term.lock().mode()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Tear down: drop the element, addons, and every listener
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        for addon in self.addons.iter_mut() {
            addon.dispose();
        }
        self.addons.clear();
        self.link_providers.clear();
        if let Some(view) = self.view.take() {
            view.element.clear_listeners();
        }
        self.emitters.clear();
        self.disposed = true;
        tracing::debug!("Terminal disposed");
    }

    pub(crate) fn term_handle(&self) -> Arc<FairMutex<Term<EventProxy>>> {
        Arc::clone(&self.term)
    }

    pub(crate) fn event_proxy(&self) -> EventProxy {
        self.proxy.clone()
    }

    pub fn on_data(&self, mut listener: impl FnMut(&str) + 'static) -> Subscription {
        self.emitters.data.subscribe(move |data: &String| listener(data))
    }

    pub fn on_render(&self, listener: impl FnMut(&RenderRange) + 'static) -> Subscription {
        self.emitters.render.subscribe(listener)
    }

    /// Cursor moved to (column, row)
    pub fn on_cursor_move(&self, listener: impl FnMut(&(usize, usize)) + 'static) -> Subscription {
        self.emitters.cursor_move.subscribe(listener)
    }

    pub fn on_selection_change(&self, listener: impl FnMut(&()) + 'static) -> Subscription {
        self.emitters.selection_change.subscribe(listener)
    }

    /// New (columns, rows)
    pub fn on_resize(&self, listener: impl FnMut(&(u16, u16)) + 'static) -> Subscription {
        self.emitters.resize.subscribe(listener)
    }

    pub fn on_title_change(&self, mut listener: impl FnMut(&str) + 'static) -> Subscription {
        self.emitters.title_change.subscribe(move |title: &String| listener(title))
    }

    pub fn on_exit(&self, listener: impl FnMut(&()) + 'static) -> Subscription {
        self.emitters.exit.subscribe(listener)
    }

    /// Answer-back text the engine wants written to the PTY
    pub fn on_pty_write(&self, mut listener: impl FnMut(&str) + 'static) -> Subscription {
        self.emitters.pty_write.subscribe(move |text: &String| listener(text))
    }

    /// Hovered link changed; `None` when the pointer left a link
    pub fn on_link_hover(&self, listener: impl FnMut(&Option<String>) + 'static) -> Subscription {
        self.emitters.link_hover.subscribe(listener)
    }
}

enum PointerKind {
    Down,
    Up,
    Drag,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::LinkAddon;
    use crate::painter::tests::BlockGlyphs;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn opened(columns: u16, rows: u16) -> Terminal {
        let options = TerminalOptions {
            columns,
            rows,
            ..Default::default()
        };
        let mut terminal = Terminal::new(options);
        let content = ContentBox::new(columns as f32 * 8.0, rows as f32 * 16.0, 1.0);
        terminal.open_with_glyphs(content, Box::new(BlockGlyphs::new(8.0, 16.0)));
        terminal
    }

    fn counter<T: 'static>() -> (Rc<Cell<usize>>, impl FnMut(&T) + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move |_: &T| inner.set(inner.get() + 1))
    }

    #[test]
    fn input_emits_each_call_once_in_order() {
        let terminal = Terminal::new(TerminalOptions::default());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            terminal.on_data(move |data| seen.borrow_mut().push(data.to_string()))
        };

        terminal.input("ls");
        terminal.input("\r");
        terminal.input("pasted\ntext");

        assert_eq!(*seen.borrow(), vec!["ls", "\r", "pasted\ntext"]);
    }

    #[test]
    fn element_exists_only_after_open() {
        let mut terminal = Terminal::new(TerminalOptions::default());
        assert!(terminal.element().is_none());

        terminal.open_with_glyphs(ContentBox::new(80.0, 32.0, 1.0), Box::new(BlockGlyphs::new(8.0, 16.0)));
        let element = terminal.element().unwrap();
        assert_eq!(element.canvases().len(), 3);
        assert_eq!(element.size(), (80, 32));
    }

    #[test]
    fn output_repaints_and_emits_render() {
        let mut terminal = opened(10, 2);
        let renders = Rc::new(RefCell::new(Vec::new()));
        let moves = Rc::new(RefCell::new(Vec::new()));
        let _render = {
            let renders = Rc::clone(&renders);
            terminal.on_render(move |range| renders.borrow_mut().push(*range))
        };
        let _cursor = {
            let moves = Rc::clone(&moves);
            terminal.on_cursor_move(move |pos| moves.borrow_mut().push(*pos))
        };

        terminal.write(b"hi");
        terminal.process_events();

        assert_eq!(*renders.borrow(), vec![RenderRange { start: 0, end: 1 }]);
        assert_eq!(*moves.borrow(), vec![(2, 0)]);

        let screen = terminal.element().unwrap().canvas(LayerRole::Screen).unwrap();
        let fg = terminal.options().color_scheme.foreground;
        let expected = [
            (fg[0] * 255.0).round() as u8,
            (fg[1] * 255.0).round() as u8,
            (fg[2] * 255.0).round() as u8,
            255,
        ];
        assert_eq!(screen.pixel(3, 8), expected);
    }

    #[test]
    fn no_events_means_no_render() {
        let mut terminal = opened(10, 2);
        let (count, listener) = counter();
        let _sub = terminal.on_render(listener);

        terminal.process_events();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn resize_emits_new_dimensions() {
        let mut terminal = opened(10, 2);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let seen = Rc::clone(&seen);
            terminal.on_resize(move |size| seen.borrow_mut().push(*size))
        };

        terminal.resize(20, 5);

        assert_eq!(terminal.size(), (20, 5));
        assert_eq!(*seen.borrow(), vec![(20, 5)]);
    }

    #[test]
    fn drag_selects_text() {
        let mut terminal = opened(20, 2);
        terminal.write(b"hello world");
        terminal.process_events();

        let (changes, listener) = counter();
        let _selection = terminal.on_selection_change(listener);
        let (drags, drag_listener) = counter();
        let _drag = terminal.element().unwrap().on_drag(drag_listener);

        terminal.mouse_down(1.0, 1.0, false);
        terminal.mouse_move(4.0 * 8.0 + 7.0, 8.0);
        terminal.mouse_up(4.0 * 8.0 + 7.0, 8.0);

        assert_eq!(terminal.selection_text().as_deref(), Some("hello"));
        assert_eq!(changes.get(), 1);
        assert_eq!(drags.get(), 1);

        // The highlight lands on the link layer
        let link = terminal.element().unwrap().canvas(LayerRole::Link).unwrap();
        assert!(link.pixel(4, 8)[3] > 0);
        assert_eq!(link.pixel(4 + 8 * 6, 8)[3], 0);

        // A new press clears it
        terminal.mouse_down(1.0, 20.0, false);
        assert!(terminal.selection_text().is_none());
        assert_eq!(changes.get(), 2);
    }

    #[test]
    fn hovering_and_ctrl_clicking_links() {
        let mut terminal = opened(30, 2);
        let opened_uris = Rc::new(RefCell::new(Vec::new()));
        {
            let opened_uris = Rc::clone(&opened_uris);
            terminal.load_addon(Box::new(LinkAddon::with_opener(Rc::new(move |uri: &str| {
                opened_uris.borrow_mut().push(uri.to_string())
            }))));
        }
        terminal.write(b"go https://a.io now");
        terminal.process_events();

        let hovers = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let hovers = Rc::clone(&hovers);
            terminal.on_link_hover(move |uri| hovers.borrow_mut().push(uri.clone()))
        };

        // Column 5 is inside the link, column 0 is not
        terminal.mouse_move(5.0 * 8.0 + 2.0, 8.0);
        terminal.mouse_move(5.0 * 8.0 + 3.0, 8.0);
        terminal.mouse_move(2.0, 8.0);
        assert_eq!(
            *hovers.borrow(),
            vec![Some("https://a.io".to_string()), None]
        );

        terminal.mouse_down(5.0 * 8.0 + 2.0, 8.0, true);
        assert_eq!(*opened_uris.borrow(), vec!["https://a.io".to_string()]);
        assert!(!terminal.has_selection());

        // Without the modifier the press starts a selection instead
        terminal.mouse_down(5.0 * 8.0 + 2.0, 8.0, false);
        assert_eq!(opened_uris.borrow().len(), 1);
    }

    #[test]
    fn title_sequences_are_forwarded() {
        let mut terminal = opened(10, 2);
        let titles = Rc::new(RefCell::new(Vec::new()));
        let _sub = {
            let titles = Rc::clone(&titles);
            terminal.on_title_change(move |title| titles.borrow_mut().push(title.to_string()))
        };

        terminal.write(b"\x1b]2;build\x07");
        terminal.process_events();

        assert_eq!(*titles.borrow(), vec!["build".to_string()]);
        assert_eq!(terminal.title(), Some("build"));
    }

    #[test]
    fn dispose_drops_element_and_listeners() {
        let mut terminal = opened(10, 2);
        let count = Rc::new(Cell::new(0));
        let _sub = {
            let count = Rc::clone(&count);
            terminal.on_data(move |_| count.set(count.get() + 1))
        };

        terminal.dispose();
        terminal.input("x");

        assert!(terminal.element().is_none());
        assert!(terminal.is_disposed());
        assert_eq!(count.get(), 0);
    }
}
