// ABOUTME: Shared types and configuration for glitchterm.
// ABOUTME: Defines colors, canvases, keycodes, glitch profiles, and config file handling.

pub mod canvas;
pub mod color;
pub mod config;
pub mod keycodes;
pub mod profile;

pub use canvas::{Canvas, LayerRole};
pub use color::ColorScheme;
pub use config::{AddonKind, Config, ConfigError, GlitchSettings, TerminalOptions};
pub use profile::{GlitchProfile, GlitchTrigger, LayerOrder, RefreshPolicy, TimeMapping, Variant};
