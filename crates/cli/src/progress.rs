//! Progress indicators
//!
//! Spinners for network calls and a bar for batch geocoding.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for a single request
pub fn spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.blue} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    let pb = ProgressBar::new_spinner().with_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Create a progress bar for resolving `total` addresses
pub fn geocode_progress(total: u64) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} addresses ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░");
    let pb = ProgressBar::new(total).with_style(style);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with a success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {message}"));
}

/// Finish a progress bar with an error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.abandon_with_message(format!("✗ {message}"));
}
