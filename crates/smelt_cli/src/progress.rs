//! Single-line build progress bar drawn on stderr.

use std::io::Write;

/// Columns taken by the `nnn/nnn [` prefix and the closing bracket.
const DECORATION: usize = 12;

/// Terminal width assumed when the real width cannot be queried.
const FALLBACK_COLUMNS: u16 = 80;

/// Progress over a fixed number of build steps.
#[derive(Debug)]
pub struct ProgressBar {
    done: usize,
    total: usize,
    width: usize,
}

impl ProgressBar {
    /// Creates a bar for `total` steps sized to the current terminal.
    pub fn new(total: usize) -> Self {
        let (columns, _) = crossterm::terminal::size().unwrap_or((FALLBACK_COLUMNS, 24));
        Self::with_columns(total, columns as usize)
    }

    /// Creates a bar for `total` steps in a terminal `columns` wide.
    pub fn with_columns(total: usize, columns: usize) -> Self {
        Self {
            done: 0,
            total: total.max(1),
            width: columns.saturating_sub(DECORATION),
        }
    }

    /// Formats the current state, e.g. ` 2/  4 [====>     ]`.
    pub fn render(&self) -> String {
        let filled = self.width * self.done.min(self.total) / self.total;
        format!(
            "{:3}/{:3} [{}>{}]",
            self.done,
            self.total,
            "=".repeat(filled),
            " ".repeat(self.width - filled)
        )
    }

    /// Redraws the bar in place without advancing it.
    pub fn draw(&self) {
        let mut err = std::io::stderr().lock();
        let _ = write!(err, "\r{}", self.render());
        let _ = err.flush();
    }

    /// Advances one step and redraws.
    pub fn tick(&mut self) {
        self.done += 1;
        self.draw();
    }

    /// Ends the progress line.
    pub fn finish(&self) {
        eprintln!();
    }
}
