//! Terminal window title, kept in sync with scan progress.

use std::io::{self, IsTerminal};

use crossterm::execute;
use crossterm::terminal::SetTitle;
use tracing::trace;

const IDLE_TITLE: &str = "sniscan";

/// Sets the title for the duration of a scan and restores a neutral one
/// when dropped. Does nothing when stderr is not a terminal.
pub struct TitleGuard {
    enabled: bool,
}

impl TitleGuard {
    pub fn new(initial: &str) -> Self {
        let enabled = io::stderr().is_terminal();
        let guard = Self { enabled };
        guard.set(initial);
        guard
    }

    pub fn set(&self, title: &str) {
        set_title(self.enabled, title);
    }

    /// A detached setter for tasks that cannot borrow the guard.
    pub fn setter(&self) -> impl Fn(&str) + Send + Sync + 'static {
        let enabled = self.enabled;
        move |title: &str| set_title(enabled, title)
    }
}

impl Drop for TitleGuard {
    fn drop(&mut self) {
        set_title(self.enabled, IDLE_TITLE);
    }
}

fn set_title(enabled: bool, title: &str) {
    if !enabled {
        return;
    }
    if let Err(e) = execute!(io::stderr(), SetTitle(title)) {
        trace!("Failed to set terminal title: {e}");
    }
}
