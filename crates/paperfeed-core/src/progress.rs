//! Fetch progress on a terminal; nothing at all elsewhere.

use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

const RUN_TEMPLATE: &str = "{prefix:.cyan.bold} [{bar:32.green/dim}] {pos}/{len} papers {msg:.dim}";

/// Owns the bars of one process. `bars` is `None` when stderr is not a terminal.
pub struct ProgressContext {
    bars: Option<MultiProgress>,
}

impl ProgressContext {
    /// Detect whether stderr is a terminal.
    pub fn new() -> Self {
        Self::for_terminal(std::io::stderr().is_terminal())
    }

    fn for_terminal(is_tty: bool) -> Self {
        Self {
            bars: is_tty.then(MultiProgress::new),
        }
    }

    /// Bar counting the articles of one run, sized to the requested maximum
    pub fn run_bar(&self, label: &str, len: u64) -> ProgressBar {
        let Some(bars) = &self.bars else {
            return ProgressBar::hidden();
        };
        let pb = bars.add(ProgressBar::new(len));
        if let Ok(style) = ProgressStyle::with_template(RUN_TEMPLATE) {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_prefix(label.to_string());
        pb
    }

    /// Bars for the log bridge; `None` off a terminal
    pub fn multi(&self) -> Option<&MultiProgress> {
        self.bars.as_ref()
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

pub type SharedProgress = Arc<ProgressContext>;

/// `1234567` as `1,234,567`
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
