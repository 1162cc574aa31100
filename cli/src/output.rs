//! Styled terminal output.

use std::fmt::Display;

use console::{Term, style};

/// Terminal output helper for consistent styled output.
pub struct Output {
    term: Term,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }

    /// Output on stderr, for notices that must not mix with piped data.
    pub fn stderr() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn line(&self, line: &str) {
        drop(self.term.write_line(line));
    }

    pub fn success(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("✓").green().bold()));
    }

    pub fn error(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("✗").red().bold()));
    }

    pub fn warning(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("⚠").yellow().bold()));
    }

    pub fn info(&self, message: impl Display) {
        self.line(&format!("{} {message}", style("ℹ").blue().bold()));
    }

    pub fn print(&self, message: impl Display) {
        self.line(&message.to_string());
    }

    pub fn header(&self, message: impl Display) {
        self.line(&style(message).bold().cyan().to_string());
    }

    pub fn dim(&self, message: impl Display) {
        self.line(&style(message).dim().to_string());
    }

    /// `label: value`, indented by `indent` spaces.
    pub fn labeled_indent(&self, label: impl Display, value: impl Display, indent: usize) {
        let spaces = " ".repeat(indent);
        self.line(&format!("{spaces}{}: {value}", style(label).dim()));
    }

    /// Footer for paged lists.
    pub fn page_footer(&self, page: u32, total_pages: u32, total_count: u64) {
        self.line(&format!(
            "\nPage {} of {} ({} user(s))",
            style(page).cyan().bold(),
            style(total_pages.max(1)).cyan(),
            style(total_count).cyan()
        ));
    }
}
