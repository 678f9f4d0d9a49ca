use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::time::Duration;

/// Spinner shown while a one-shot scan runs. Silent when not attached to a
/// terminal; structured logs carry progress there.
pub struct ScanUI {
    spinner: Option<ProgressBar>,
}

impl ScanUI {
    pub fn start(message: impl Into<String>, enabled: bool) -> Self {
        if !enabled || !is_interactive() {
            tracing::debug!(operation = "ui_init", mode = "non_interactive", "Progress spinner disabled");
            return Self { spinner: None };
        }

        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
            spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        Self { spinner: Some(spinner) }
    }

    pub fn finish(self) {
        if let Some(spinner) = self.spinner {
            spinner.finish_and_clear();
        }
    }
}

pub fn is_interactive() -> bool {
    std::io::stdout().is_terminal() && std::io::stderr().is_terminal()
}
