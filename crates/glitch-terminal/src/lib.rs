// ABOUTME: Terminal emulation, painted layer canvases, addons and PTY handling.
// ABOUTME: Wraps alacritty_terminal and exposes the element the overlay composites.

pub mod addon;
pub mod atlas;
pub mod element;
pub mod events;
pub mod fit;
pub mod fonts;
pub mod links;
pub mod painter;
pub mod pty;
pub mod snapshot;
pub mod terminal;

pub use addon::Addon;
pub use alacritty_terminal::term::TermMode;
pub use atlas::{CellMetrics, GlyphAtlas, GlyphSource};
pub use element::{ContentBox, PointerEvent, TerminalElement};
pub use events::{Emitter, Subscription};
pub use fit::FitAddon;
pub use fonts::FontError;
pub use links::{LinkAddon, LinkProvider, LinkSpan};
pub use pty::{Pty, PtyWriter};
pub use terminal::{RenderRange, Terminal, TerminalError};
