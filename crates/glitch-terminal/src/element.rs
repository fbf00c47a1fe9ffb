// ABOUTME: The opened terminal's element: its layer canvases and pointer emitters.
// ABOUTME: Canvases are kept in stacking order link, cursor, screen.

use glitch_core::{Canvas, LayerRole};

use crate::events::{Emitter, Subscription};

/// The container's content box in logical pixels, plus its display scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentBox {
    pub width: f32,
    pub height: f32,
    pub scale_factor: f64,
}

impl ContentBox {
    pub fn new(width: f32, height: f32, scale_factor: f64) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Size in device pixels
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = self.scale_factor as f32;
        (
            (self.width * scale).round().max(1.0) as u32,
            (self.height * scale).round().max(1.0) as u32,
        )
    }
}

/// A pointer event over the element, in device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
}

pub struct TerminalElement {
    content_box: ContentBox,
    canvases: Vec<Canvas>,
    mouse_down: Emitter<PointerEvent>,
    mouse_up: Emitter<PointerEvent>,
    drag: Emitter<PointerEvent>,
}

impl TerminalElement {
    pub fn new(content_box: ContentBox) -> Self {
        let (width, height) = content_box.physical_size();
        Self {
            content_box,
            canvases: vec![
                Canvas::new(LayerRole::Link, width, height).with_z_index(2),
                Canvas::new(LayerRole::Cursor, width, height).with_z_index(3),
                Canvas::new(LayerRole::Screen, width, height),
            ],
            mouse_down: Emitter::new(),
            mouse_up: Emitter::new(),
            drag: Emitter::new(),
        }
    }

    pub fn content_box(&self) -> ContentBox {
        self.content_box
    }

    /// Device-pixel size shared by every canvas
    pub fn size(&self) -> (u32, u32) {
        self.content_box.physical_size()
    }

    pub fn canvases(&self) -> &[Canvas] {
        &self.canvases
    }

    pub fn canvas(&self, role: LayerRole) -> Option<&Canvas> {
        self.canvases.iter().find(|c| c.role() == role)
    }

    pub fn canvas_mut(&mut self, role: LayerRole) -> Option<&mut Canvas> {
        self.canvases.iter_mut().find(|c| c.role() == role)
    }

    pub fn on_mouse_down(&self, listener: impl FnMut(&PointerEvent) + 'static) -> Subscription {
        self.mouse_down.subscribe(listener)
    }

    pub fn on_mouse_up(&self, listener: impl FnMut(&PointerEvent) + 'static) -> Subscription {
        self.mouse_up.subscribe(listener)
    }

    /// Pointer moved while a button is held
    pub fn on_drag(&self, listener: impl FnMut(&PointerEvent) + 'static) -> Subscription {
        self.drag.subscribe(listener)
    }

    pub(crate) fn emit_mouse_down(&self, event: PointerEvent) {
        self.mouse_down.emit(&event);
    }

    pub(crate) fn emit_mouse_up(&self, event: PointerEvent) {
        self.mouse_up.emit(&event);
    }

    pub(crate) fn emit_drag(&self, event: PointerEvent) {
        self.drag.emit(&event);
    }

    pub(crate) fn clear_listeners(&self) {
        self.mouse_down.clear();
        self.mouse_up.clear();
        self.drag.clear();
    }
}
