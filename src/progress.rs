use indicatif::{ProgressBar, ProgressStyle};

/// Counted bar for a known number of items, hidden when `enabled` is false.
pub fn counted_bar(len: u64, message: String, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] {msg} {wide_bar} {pos}/{len} ({eta})",
    ) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
    }
    pb.set_message(message);
    pb
}

/// Spinner for streams of unknown length (line-delimited files).
pub fn spinner(message: String, enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg} {pos} lines") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb
}
