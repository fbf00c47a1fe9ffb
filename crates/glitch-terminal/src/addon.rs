// ABOUTME: Terminal extensions activated against an opened terminal.
// ABOUTME: The terminal keeps loaded addons until it is disposed.

use crate::terminal::Terminal;

pub trait Addon {
    fn name(&self) -> &'static str;

    /// Called once by `Terminal::load_addon`
    fn activate(&mut self, terminal: &mut Terminal);

    fn dispose(&mut self) {}
}
