// ABOUTME: Routes terminal and pointer events to the layer textures they invalidate.
// ABOUTME: Per-layer refresh splits content from pointer layers; refresh-all marks everything and renders.

use std::cell::Cell;
use std::rc::Rc;

use glitch_core::{LayerRole, RefreshPolicy};

use crate::texture::DirtyFlag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Render,
    CursorMove,
    SelectionChange,
    MouseDown,
    MouseUp,
    Drag,
    LinkHover,
}

impl RefreshTrigger {
    pub const ALL: [RefreshTrigger; 7] = [
        RefreshTrigger::Render,
        RefreshTrigger::CursorMove,
        RefreshTrigger::SelectionChange,
        RefreshTrigger::MouseDown,
        RefreshTrigger::MouseUp,
        RefreshTrigger::Drag,
        RefreshTrigger::LinkHover,
    ];
}

const CONTENT_LAYERS: &[LayerRole] = &[LayerRole::Screen, LayerRole::Cursor];
const POINTER_LAYERS: &[LayerRole] = &[LayerRole::Link];
const ALL_LAYERS: &[LayerRole] = &[LayerRole::Screen, LayerRole::Cursor, LayerRole::Link];

pub fn layers_for(trigger: RefreshTrigger, policy: RefreshPolicy) -> &'static [LayerRole] {
    match (policy, trigger) {
        (RefreshPolicy::All, _) => ALL_LAYERS,
        (RefreshPolicy::PerLayer, RefreshTrigger::Render | RefreshTrigger::CursorMove) => CONTENT_LAYERS,
        (RefreshPolicy::PerLayer, _) => POINTER_LAYERS,
    }
}

/// Cloneable handle the component moves into its event subscriptions
#[derive(Debug, Clone)]
pub struct RefreshBridge {
    policy: RefreshPolicy,
    flags: Rc<Vec<(LayerRole, DirtyFlag)>>,
    render_requested: Rc<Cell<bool>>,
}

impl RefreshBridge {
    pub fn new(policy: RefreshPolicy, flags: Vec<(LayerRole, DirtyFlag)>) -> Self {
        Self {
            policy,
            flags: Rc::new(flags),
            render_requested: Rc::new(Cell::new(false)),
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    pub fn trigger(&self, trigger: RefreshTrigger) {
        let layers = layers_for(trigger, self.policy);
        for (role, flag) in self.flags.iter() {
            if layers.contains(role) {
                flag.mark();
            }
        }
        if self.policy == RefreshPolicy::All {
            self.render_requested.set(true);
        }
    }

    /// Whether a trigger asked for an immediate render since the last call
    pub fn take_render_request(&self) -> bool {
        self.render_requested.replace(false)
    }
}
