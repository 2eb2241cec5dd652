use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Braille frames; the last entry is shown once the spinner is finished.
const TICK_STRINGS: [&str; 11] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"];
const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Progress indicator shown while the request is in flight. Dropping an
/// unfinished spinner clears it, so an early return leaves no ticker behind.
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    /// Draws on stderr; indicatif hides the bar when stderr is not a terminal.
    pub fn start(message: &str) -> Self {
        Self::with_draw_target(message, ProgressDrawTarget::stderr())
    }

    pub fn with_draw_target(message: &str, target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(None, target);
        bar.set_style(ProgressStyle::default_spinner().tick_strings(&TICK_STRINGS));
        bar.set_message(message.to_string());
        bar.enable_steady_tick(FRAME_INTERVAL);
        Self { bar }
    }

    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }

    pub fn finish(self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
