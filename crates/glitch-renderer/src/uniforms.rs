// ABOUTME: Shared shader parameter handles and the registry that indexes them by name.
// ABOUTME: Passes expose handles; the glitch controller and driver write through the registry.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

/// Name of the per-frame time uniform every effect pass carries
pub const TIME: &str = "time";

/// Scale factor of the first effect of an effect pass
pub const SCALE_FACTOR: &str = "e0ScaleFactor";

/// A float parameter shared between its pass and whoever drives it
#[derive(Debug, Clone, Default)]
pub struct Uniform(Rc<Cell<f32>>);

impl Uniform {
    pub fn new(value: f32) -> Self {
        Self(Rc::new(Cell::new(value)))
    }

    pub fn get(&self) -> f32 {
        self.0.get()
    }

    pub fn set(&self, value: f32) {
        self.0.set(value);
    }

    pub fn ptr_eq(&self, other: &Uniform) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Uniform name to every handle exposing it
#[derive(Debug, Default)]
pub struct ParamRegistry {
    params: HashMap<String, Vec<Uniform>>,
}

impl ParamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_uniforms(uniforms: impl IntoIterator<Item = (String, Uniform)>) -> Self {
        let mut registry = Self::new();
        for (name, uniform) in uniforms {
            registry.insert(name, uniform);
        }
        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, uniform: Uniform) {
        self.params.entry(name.into()).or_default().push(uniform);
    }

    pub fn get(&self, name: &str) -> &[Uniform] {
        self.params.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Write `value` to every handle named `name`. Returns how many were written.
    pub fn set(&self, name: &str, value: f32) -> usize {
        let handles = self.get(name);
        for handle in handles {
            handle.set(value);
        }
        handles.len()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
