// ABOUTME: PTY session driving a Terminal's engine from a shell process.
// ABOUTME: Output is parsed on alacritty's I/O thread; input and resizes go through PtyWriter.

use alacritty_terminal::event::WindowSize;
use alacritty_terminal::event_loop::{EventLoop, EventLoopSender, Msg};
use alacritty_terminal::tty;
use std::borrow::Cow;

use crate::terminal::{Terminal, TerminalError};

/// Handle for sending input, resizes and shutdown to the PTY thread
#[derive(Clone)]
pub struct PtyWriter {
    sender: EventLoopSender,
    cell_size: (u16, u16),
}

impl PtyWriter {
    /// Send input bytes to the shell
    pub fn write(&self, data: &str) {
        if data.is_empty() {
            return;
        }
        let bytes: Cow<'static, [u8]> = Cow::Owned(data.as_bytes().to_vec());
        if self.sender.send(Msg::Input(bytes)).is_err() {
            tracing::warn!("PTY closed, dropped {} bytes of input", data.len());
        }
    }

    /// Tell the shell the grid changed size
    pub fn resize(&self, columns: u16, rows: u16) {
        let _ = self
            .sender
            .send(Msg::Resize(window_size(columns, rows, self.cell_size)));
    }

    pub fn shutdown(&self) {
        let _ = self.sender.send(Msg::Shutdown);
    }
}

/// A shell attached to a terminal's engine
pub struct Pty {
    writer: PtyWriter,
}

impl Pty {
    /// Spawn `shell` (the user's login shell when `None`) at the terminal's size
    pub fn spawn(terminal: &Terminal, shell: Option<&str>) -> Result<Self, TerminalError> {
        let (columns, rows) = terminal.size();
        let cell_size = terminal
            .cell_metrics()
            .map(|m| (m.width as u16, m.height as u16))
            .unwrap_or((1, 1));

        let pty_config = tty::Options {
            shell: shell.map(|program| tty::Shell::new(program.to_string(), Vec::new())),
            working_directory: None,
            drain_on_exit: true,
            env: std::collections::HashMap::new(),
        };

        let pty = tty::new(&pty_config, window_size(columns, rows, cell_size), 0)?;

        let event_loop = EventLoop::new(terminal.term_handle(), terminal.event_proxy(), pty, true, false)?;
        let sender = event_loop.channel();

        // Runs on its own I/O thread until the shell exits or Shutdown arrives
        event_loop.spawn();
        tracing::info!(
            "Spawned {} at {}x{}",
            shell.unwrap_or("login shell"),
            columns,
            rows
        );

        Ok(Self {
            writer: PtyWriter { sender, cell_size },
        })
    }

    pub fn writer(&self) -> PtyWriter {
        self.writer.clone()
    }
}

impl Drop for Pty {
    fn drop(&mut self) {
        self.writer.shutdown();
    }
}

fn window_size(columns: u16, rows: u16, cell_size: (u16, u16)) -> WindowSize {
    WindowSize {
        num_cols: columns,
        num_lines: rows,
        cell_width: cell_size.0.max(1),
        cell_height: cell_size.1.max(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_size_never_has_zero_cells() {
        let size = window_size(80, 24, (0, 0));
        assert_eq!(size.num_cols, 80);
        assert_eq!(size.num_lines, 24);
        assert_eq!(size.cell_width, 1);
        assert_eq!(size.cell_height, 1);
    }
}
