// ABOUTME: Main application entry point.
// ABOUTME: Hosts a GlitchTerm in a fixed-size window, wired to a shell and the clipboard.

mod component;
mod input;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use arboard::Clipboard;
use glitch_core::Config;
use glitch_terminal::{ContentBox, Pty, PtyWriter, Subscription};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, ModifiersState};
#[cfg(target_os = "linux")]
use winit::platform::x11::WindowAttributesExtX11;
use winit::window::{Window, WindowAttributes, WindowId};

use component::{GlitchTerm, GlitchTermProps};

/// How long to sleep when nothing is scheduled
const IDLE_WAKE: Duration = Duration::from_millis(50);

struct App {
    config: Config,
    window: Option<Arc<Window>>,
    component: Option<GlitchTerm>,
    pty: Option<Pty>,
    /// The data callback writes here once the shell is running
    pty_writer: Rc<RefCell<Option<PtyWriter>>>,
    subscriptions: Vec<Subscription>,
    shell_exited: Rc<Cell<bool>>,
    modifiers: ModifiersState,
    mouse_pos: (f64, f64),
    clipboard: Option<Clipboard>,
    closing: bool,
}

impl App {
    fn new() -> Self {
        let config = Config::load_or_default();
        tracing::info!("Loaded config: variant={:?}", config.glitch.variant);

        // First run: write the defaults out so there is a file to edit
        if Config::default_path().is_some_and(|path| !path.exists()) {
            match config.save_to_default() {
                Ok(path) => tracing::info!("Wrote default config to {}", path.display()),
                Err(e) => tracing::warn!("Failed to write default config: {}", e),
            }
        }

        Self {
            config,
            window: None,
            component: None,
            pty: None,
            pty_writer: Rc::new(RefCell::new(None)),
            subscriptions: Vec::new(),
            shell_exited: Rc::new(Cell::new(false)),
            modifiers: ModifiersState::empty(),
            mouse_pos: (0.0, 0.0),
            clipboard: Clipboard::new().ok(),
            closing: false,
        }
    }

    fn create_window(&self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>> {
        let size = &self.config.window;
        #[allow(unused_mut)]
        let mut attrs = WindowAttributes::default()
            .with_title("glitchterm")
            .with_inner_size(LogicalSize::new(size.width, size.height))
            .with_resizable(false);

        #[cfg(target_os = "linux")]
        {
            if let Some(class_name) = &self.config.class_name {
                attrs = attrs.with_name(class_name.clone(), class_name.clone());
            }
        }

        Ok(Arc::new(event_loop.create_window(attrs)?))
    }

    fn mount(&mut self, window: Arc<Window>) -> Result<()> {
        let writer_slot = Rc::clone(&self.pty_writer);
        let props = GlitchTermProps {
            class_name: self.config.class_name.clone(),
            options: self.config.terminal.clone(),
            addons: self.config.addons.clone(),
            profile: self.config.glitch.profile(),
            on_data: Some(Box::new(move |data: &str| {
                if let Some(writer) = writer_slot.borrow().as_ref() {
                    writer.write(data);
                }
            })),
        };
        let mut component = GlitchTerm::new(props);

        let content_box = ContentBox::new(
            self.config.window.width as f32,
            self.config.window.height as f32,
            window.scale_factor(),
        );
        component.mount(Arc::clone(&window), None, content_box)?;
        if !component.is_overlay_running() {
            tracing::warn!("Glitch overlay not running, showing nothing");
        }

        // The shell starts at the fitted size
        let shell = self.config.terminal.shell.as_deref();
        let pty = Pty::spawn(component.terminal(), shell)?;
        let writer = pty.writer();
        *self.pty_writer.borrow_mut() = Some(writer.clone());

        let terminal = component.terminal();
        let answer = writer.clone();
        self.subscriptions.push(terminal.on_pty_write(move |text| answer.write(text)));
        let resize = writer;
        self.subscriptions
            .push(terminal.on_resize(move |&(columns, rows)| resize.resize(columns, rows)));
        let title_window = Arc::clone(&window);
        self.subscriptions.push(terminal.on_title_change(move |title| {
            let title = if title.is_empty() { "glitchterm" } else { title };
            title_window.set_title(title);
        }));
        let exited = Rc::clone(&self.shell_exited);
        self.subscriptions.push(terminal.on_exit(move |_| exited.set(true)));

        component.fade_in(self.config.behavior.fade_in_steps, Instant::now());

        self.pty = Some(pty);
        self.component = Some(component);
        Ok(())
    }

    fn copy_selection(&mut self) {
        let Some(text) = self.component.as_ref().and_then(|c| c.terminal().selection_text()) else {
            return;
        };
        if let Some(clipboard) = &mut self.clipboard {
            if let Err(e) = clipboard.set_text(&text) {
                tracing::error!("Failed to copy to clipboard: {}", e);
            } else {
                tracing::info!("Copied {} chars to clipboard", text.len());
            }
        }
    }

    fn paste(&mut self) {
        let Some(clipboard) = &mut self.clipboard else {
            return;
        };
        match clipboard.get_text() {
            // One paste is one unit of input
            Ok(text) => {
                if let Some(component) = &self.component {
                    component.terminal().input(&text);
                }
            }
            Err(e) => tracing::warn!("Failed to read clipboard: {}", e),
        }
    }

    fn shutdown(&mut self) {
        self.subscriptions.clear();
        *self.pty_writer.borrow_mut() = None;
        self.pty = None;
        if let Some(mut component) = self.component.take() {
            component.unmount();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match self.create_window(event_loop) {
            Ok(window) => window,
            Err(e) => {
                tracing::error!("Failed to create window: {:#}", e);
                event_loop.exit();
                return;
            }
        };
        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            window.scale_factor()
        );

        self.window = Some(Arc::clone(&window));
        if let Err(e) = self.mount(window) {
            tracing::error!("Failed to mount terminal: {:#}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if self.closing {
                    return;
                }
                self.closing = true;
                tracing::info!("Close requested, fading out");
                match &mut self.component {
                    Some(component) => {
                        component.fade_out(self.config.behavior.fade_out_steps, Instant::now())
                    }
                    None => event_loop.exit(),
                }
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state();
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.mouse_pos = (position.x, position.y);
                if let Some(component) = &mut self.component {
                    component.terminal_mut().mouse_move(position.x, position.y);
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let (x, y) = self.mouse_pos;
                let ctrl = self.modifiers.control_key();
                let Some(component) = &mut self.component else {
                    return;
                };
                match state {
                    ElementState::Pressed => component.terminal_mut().mouse_down(x, y, ctrl),
                    ElementState::Released => {
                        component.terminal_mut().mouse_up(x, y);
                        // Auto-copy on selection release
                        if self.config.behavior.auto_copy_selection {
                            self.copy_selection();
                        }
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || self.closing {
                    return;
                }
                let ctrl = self.modifiers.control_key();
                let shift = self.modifiers.shift_key();

                // Ctrl+Shift+V: paste
                if ctrl && shift {
                    if let Key::Character(c) = &event.logical_key {
                        if c.eq_ignore_ascii_case("v") {
                            self.paste();
                            return;
                        }
                    }
                }

                let Some(component) = &self.component else {
                    return;
                };
                let terminal = component.terminal();
                if let Some(data) = input::encode_key(&event.logical_key, self.modifiers, terminal.mode()) {
                    terminal.input(&data);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        let Some(component) = &mut self.component else {
            return;
        };

        if let Err(e) = component.frame(now) {
            tracing::error!("Render failed: {}", e);
        }

        let faded_out = self.closing && !component.is_animating();
        if faded_out || self.shell_exited.get() {
            tracing::info!("Exiting");
            self.shutdown();
            event_loop.exit();
            return;
        }

        let wake = component.next_wake().unwrap_or(now + IDLE_WAKE);
        event_loop.set_control_flow(ControlFlow::WaitUntil(wake));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting glitchterm");

    let event_loop = EventLoop::new()?;
    let mut app = App::new();

    event_loop.run_app(&mut app)?;

    Ok(())
}
