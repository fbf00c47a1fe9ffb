// ABOUTME: The GlitchTerm component: a terminal whose layers are composited through the glitch overlay.
// ABOUTME: Owns the terminal, the glitch controller and, once mounted, the overlay and its frame loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use glitch_core::{keycodes, AddonKind, GlitchProfile, TerminalOptions};
use glitch_renderer::{
    AnimationDriver, GlitchController, GlitchOverlay, RefreshBridge, RefreshTrigger, RenderError,
};
use glitch_terminal::{ContentBox, FitAddon, GlyphSource, LinkAddon, Subscription, Terminal};
use winit::window::Window;

pub type DataCallback = Box<dyn FnMut(&str)>;

pub struct GlitchTermProps {
    /// Class name of the container
    pub class_name: Option<String>,
    /// Passed to the terminal engine unchanged
    pub options: TerminalOptions,
    pub addons: Vec<AddonKind>,
    pub profile: GlitchProfile,
    pub on_data: Option<DataCallback>,
}

impl Default for GlitchTermProps {
    fn default() -> Self {
        Self {
            class_name: None,
            options: TerminalOptions::default(),
            addons: vec![AddonKind::Fit, AddonKind::Links],
            profile: GlitchProfile::default(),
            on_data: None,
        }
    }
}

struct Pipeline {
    overlay: GlitchOverlay,
    refresh: RefreshBridge,
    _subscriptions: Vec<Subscription>,
}

pub struct GlitchTerm {
    terminal: Terminal,
    class_name: Option<String>,
    addons: Vec<AddonKind>,
    profile: GlitchProfile,
    glitch: Rc<RefCell<GlitchController>>,
    driver: AnimationDriver,
    pipeline: Option<Pipeline>,
    _data: Subscription,
}

impl GlitchTerm {
    pub fn new(props: GlitchTermProps) -> Self {
        let GlitchTermProps {
            class_name,
            options,
            addons,
            profile,
            mut on_data,
        } = props;

        let terminal = Terminal::new(options);
        let glitch = Rc::new(RefCell::new(GlitchController::new(profile)));

        let trigger = Rc::clone(&glitch);
        let data = terminal.on_data(move |data| {
            if keycodes::is_glitch_trigger(data) {
                trigger.borrow_mut().trigger(Instant::now());
            }
            // Without a callback the data goes nowhere
            if let Some(callback) = on_data.as_mut() {
                callback(data);
            }
        });

        Self {
            terminal,
            class_name,
            addons,
            profile,
            glitch,
            driver: AnimationDriver::for_profile(&profile),
            pipeline: None,
            _data: data,
        }
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut Terminal {
        &mut self.terminal
    }

    /// Open the terminal in `container`, load addons, and start the overlay on
    /// `target` (the container itself when `None`)
    pub fn mount(
        &mut self,
        container: Arc<Window>,
        target: Option<Arc<Window>>,
        content_box: ContentBox,
    ) -> Result<()> {
        self.open(content_box, None)?;
        let target = target.unwrap_or(container);
        self.start_overlay(target)
    }

    /// Open the element and load the configured addons. Fit runs here, once.
    pub fn open(&mut self, content_box: ContentBox, glyphs: Option<Box<dyn GlyphSource>>) -> Result<()> {
        match glyphs {
            Some(glyphs) => self.terminal.open_with_glyphs(content_box, glyphs),
            None => self.terminal.open(content_box)?,
        }
        for kind in &self.addons {
            match kind {
                AddonKind::Fit => self.terminal.load_addon(Box::new(FitAddon)),
                AddonKind::Links => self.terminal.load_addon(Box::new(LinkAddon::new())),
            }
        }
        let (columns, rows) = self.terminal.size();
        tracing::info!(
            "Mounted terminal {} at {}x{} cells",
            self.class_name.as_deref().unwrap_or("(unnamed)"),
            columns,
            rows
        );
        Ok(())
    }

    fn start_overlay(&mut self, target: Arc<Window>) -> Result<()> {
        let Some(element) = self.terminal.element() else {
            tracing::debug!("No terminal element, skipping overlay init");
            return Ok(());
        };

        let overlay = pollster::block_on(GlitchOverlay::new(
            target,
            element.canvases(),
            &self.profile,
        ))?;
        self.glitch.borrow_mut().bind(overlay.registry());

        let refresh = RefreshBridge::new(self.profile.refresh, overlay.dirty_flags());
        let subscriptions = install_refresh(&self.terminal, &refresh);

        self.driver.start(Instant::now());
        self.pipeline = Some(Pipeline {
            overlay,
            refresh,
            _subscriptions: subscriptions,
        });
        tracing::info!("Glitch overlay started");
        Ok(())
    }

    pub fn is_overlay_running(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Drain terminal events, advance glitch ramps, and render if a frame is due
    pub fn frame(&mut self, now: Instant) -> Result<(), RenderError> {
        self.terminal.process_events();
        self.glitch.borrow_mut().tick(now);

        let Some(pipeline) = self.pipeline.as_mut() else {
            return Ok(());
        };
        let frame = if pipeline.refresh.take_render_request() {
            self.driver.force(now)
        } else {
            self.driver.tick(now)
        };
        let Some(frame) = frame else {
            return Ok(());
        };

        if let Some(element) = self.terminal.element() {
            pipeline.overlay.sync_textures(element.canvases());
        }
        pipeline.overlay.render(frame.time, frame.delta)
    }

    /// When the event loop should call `frame` again
    pub fn next_wake(&self) -> Option<Instant> {
        let frame = self.driver.next_deadline();
        let write = self.glitch.borrow().next_write();
        match (frame, write) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn fade_in(&mut self, steps: u32, now: Instant) {
        self.glitch.borrow_mut().fade_in(steps, now);
    }

    pub fn fade_out(&mut self, steps: u32, now: Instant) {
        self.glitch.borrow_mut().fade_out(steps, now);
    }

    pub fn is_animating(&self) -> bool {
        self.glitch.borrow().is_animating()
    }

    pub fn glitch_triggers(&self) -> u64 {
        self.glitch.borrow().trigger_count()
    }

    /// Stop the frame loop and tear everything down
    pub fn unmount(&mut self) {
        self.driver.stop();
        self.glitch.borrow_mut().cancel();
        self.pipeline = None;
        self.terminal.dispose();
        tracing::info!("Unmounted terminal");
    }
}

/// Mark layer textures from terminal and element events
pub fn install_refresh(terminal: &Terminal, refresh: &RefreshBridge) -> Vec<Subscription> {
    let mut subscriptions = Vec::new();

    let bridge = refresh.clone();
    subscriptions.push(terminal.on_render(move |_| bridge.trigger(RefreshTrigger::Render)));
    let bridge = refresh.clone();
    subscriptions.push(terminal.on_cursor_move(move |_| bridge.trigger(RefreshTrigger::CursorMove)));
    let bridge = refresh.clone();
    subscriptions.push(
        terminal.on_selection_change(move |_| bridge.trigger(RefreshTrigger::SelectionChange)),
    );
    let bridge = refresh.clone();
    subscriptions.push(terminal.on_link_hover(move |_| bridge.trigger(RefreshTrigger::LinkHover)));

    if let Some(element) = terminal.element() {
        let bridge = refresh.clone();
        subscriptions.push(element.on_mouse_down(move |_| bridge.trigger(RefreshTrigger::MouseDown)));
        let bridge = refresh.clone();
        subscriptions.push(element.on_mouse_up(move |_| bridge.trigger(RefreshTrigger::MouseUp)));
        let bridge = refresh.clone();
        subscriptions.push(element.on_drag(move |_| bridge.trigger(RefreshTrigger::Drag)));
    }

    subscriptions
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitch_core::{LayerRole, RefreshPolicy};
    use glitch_renderer::DirtyFlag;
    use glitch_terminal::atlas::Glyph;
    use glitch_terminal::CellMetrics;

    struct SolidGlyphs {
        glyph: Glyph,
    }

    impl SolidGlyphs {
        fn boxed() -> Box<dyn GlyphSource> {
            Box::new(Self {
                glyph: Glyph {
                    width: 6,
                    height: 14,
                    offset_x: 1,
                    offset_y: 0,
                    coverage: vec![255; 6 * 14],
                },
            })
        }
    }

    impl GlyphSource for SolidGlyphs {
        fn metrics(&self) -> CellMetrics {
            CellMetrics {
                width: 8.0,
                height: 16.0,
                ascent: 15.0,
            }
        }

        fn glyph(&mut self, _c: char) -> &Glyph {
            &self.glyph
        }
    }

    fn recording_props(profile: GlitchProfile) -> (GlitchTermProps, Rc<RefCell<Vec<String>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let props = GlitchTermProps {
            profile,
            on_data: Some(Box::new(move |data: &str| sink.borrow_mut().push(data.to_string()))),
            ..Default::default()
        };
        (props, seen)
    }

    fn flags() -> Vec<(LayerRole, DirtyFlag)> {
        [LayerRole::Link, LayerRole::Cursor, LayerRole::Screen]
            .into_iter()
            .map(|role| (role, DirtyFlag::new(false)))
            .collect()
    }

    fn dirty(flags: &[(LayerRole, DirtyFlag)]) -> Vec<LayerRole> {
        flags
            .iter()
            .filter(|(_, flag)| flag.take())
            .map(|(role, _)| *role)
            .collect()
    }

    #[test]
    fn data_is_forwarded_in_order() {
        let (props, seen) = recording_props(GlitchProfile::shaded());
        let component = GlitchTerm::new(props);

        component.terminal().input("l");
        component.terminal().input("s");
        component.terminal().input("\r");

        assert_eq!(*seen.borrow(), vec!["l", "s", "\r"]);
    }

    #[test]
    fn enter_and_tab_trigger_a_glitch() {
        let (props, seen) = recording_props(GlitchProfile::shaded());
        let component = GlitchTerm::new(props);

        component.terminal().input("a");
        assert_eq!(component.glitch_triggers(), 0);

        component.terminal().input("\r");
        component.terminal().input("\tmore");
        assert_eq!(component.glitch_triggers(), 2);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn missing_callback_drops_data_silently() {
        let component = GlitchTerm::new(GlitchTermProps::default());
        component.terminal().input("\r");
        assert_eq!(component.glitch_triggers(), 1);
    }

    #[test]
    fn open_loads_addons_and_fits() {
        let mut component = GlitchTerm::new(GlitchTermProps::default());
        component
            .open(ContentBox::new(160.0, 48.0, 1.0), Some(SolidGlyphs::boxed()))
            .unwrap();

        assert_eq!(component.terminal().size(), (20, 3));
        assert!(component.terminal().element().is_some());
        assert!(!component.is_overlay_running());
    }

    #[test]
    fn frame_without_overlay_still_drains_events() {
        let mut component = GlitchTerm::new(GlitchTermProps::default());
        component
            .open(ContentBox::new(160.0, 48.0, 1.0), Some(SolidGlyphs::boxed()))
            .unwrap();

        let renders = Rc::new(RefCell::new(0));
        let count = Rc::clone(&renders);
        let _sub = component.terminal().on_render(move |_| *count.borrow_mut() += 1);

        component.terminal_mut().write(b"hi");
        assert!(component.frame(Instant::now()).is_ok());
        assert_eq!(*renders.borrow(), 1);
        assert_eq!(component.next_wake(), None);
    }

    #[test]
    fn per_layer_refresh_splits_content_and_pointer() {
        let mut component = GlitchTerm::new(GlitchTermProps::default());
        component
            .open(ContentBox::new(160.0, 48.0, 1.0), Some(SolidGlyphs::boxed()))
            .unwrap();
        let flags = flags();
        let bridge = RefreshBridge::new(RefreshPolicy::PerLayer, flags.clone());
        let _subs = install_refresh(component.terminal(), &bridge);

        component.terminal_mut().write(b"x");
        component.terminal_mut().process_events();
        assert_eq!(dirty(&flags), vec![LayerRole::Cursor, LayerRole::Screen]);

        component.terminal_mut().mouse_down(1.0, 1.0, false);
        assert_eq!(dirty(&flags), vec![LayerRole::Link]);

        component.terminal_mut().mouse_move(20.0, 1.0);
        assert_eq!(dirty(&flags), vec![LayerRole::Link]);

        component.terminal_mut().mouse_up(20.0, 1.0);
        assert_eq!(dirty(&flags), vec![LayerRole::Link]);
    }

    #[test]
    fn refresh_all_requests_a_render_for_pointer_events() {
        let mut component = GlitchTerm::new(GlitchTermProps::default());
        component
            .open(ContentBox::new(160.0, 48.0, 1.0), Some(SolidGlyphs::boxed()))
            .unwrap();
        let flags = flags();
        let bridge = RefreshBridge::new(RefreshPolicy::All, flags.clone());
        let _subs = install_refresh(component.terminal(), &bridge);

        component.terminal_mut().mouse_down(1.0, 1.0, false);
        assert_eq!(dirty(&flags).len(), 3);
        assert!(bridge.take_render_request());
    }

    #[test]
    fn unmount_disposes_the_terminal() {
        let (props, seen) = recording_props(GlitchProfile::classic());
        let mut component = GlitchTerm::new(props);
        component
            .open(ContentBox::new(160.0, 48.0, 1.0), Some(SolidGlyphs::boxed()))
            .unwrap();
        component.fade_in(10, Instant::now());
        assert!(component.is_animating());

        component.unmount();
        assert!(!component.is_animating());
        assert!(component.terminal().is_disposed());
        component.terminal().input("after");
        assert!(seen.borrow().is_empty());
    }
}
