//! RAII terminal mode guard.
//!
//! Entering raw mode and the alternate screen must always be undone, including
//! on early return and panic unwinding. [`TerminalGuard`] restores the
//! terminal in `Drop`.

use std::io::{self, Write};

use crossterm::{cursor, execute, terminal};

/// Raw mode + alternate screen + hidden cursor for the guard's lifetime.
#[derive(Debug)]
pub struct TerminalGuard {
    raw_mode: bool,
    alternate_screen: bool,
}

impl TerminalGuard {
    /// Take over the terminal.
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        tracing::info!("terminal raw mode enabled");
        let mut guard = Self {
            raw_mode: true,
            alternate_screen: false,
        };
        let mut stdout = io::stdout();
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide,
            cursor::MoveTo(0, 0)
        )?;
        guard.alternate_screen = true;
        tracing::info!("alternate screen enabled");
        Ok(guard)
    }

    /// Current terminal size in cells.
    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn cleanup(&mut self) {
        let mut stdout = io::stdout();
        if self.alternate_screen {
            let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
            self.alternate_screen = false;
        }
        if self.raw_mode {
            let _ = terminal::disable_raw_mode();
            self.raw_mode = false;
        }
        let _ = stdout.flush();
        tracing::info!("terminal restored");
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Restore the terminal before the default panic message is printed.
///
/// Release builds abort on panic, so `Drop` never runs there.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        previous(info);
    }));
}
