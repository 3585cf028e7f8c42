//! Terminal feedback for page fetches.
//!
//! A single page gets a spinner; an album's song list gets a bar whose
//! message names the song being fetched. In log-only mode nothing is drawn
//! and batch progress is logged every few pages instead.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

static LOG_ONLY: AtomicBool = AtomicBool::new(false);

/// Pages between two log lines in log-only mode.
const LOG_INTERVAL: u64 = 5;

pub fn set_log_only(value: bool) {
    LOG_ONLY.store(value, Ordering::Relaxed);
}

fn log_only() -> bool {
    LOG_ONLY.load(Ordering::Relaxed)
}

/// Seconds under a minute keep one decimal; longer runs read as `3m 07s`.
pub fn format_elapsed(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.1}s", seconds)
    } else {
        let whole = seconds.round() as u64;
        format!("{}m {:02}s", whole / 60, whole % 60)
    }
}

/// Spinner for one top-level page ("song", "album", "artist albums").
pub fn page_spinner(kind: &str, url: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_message(format!("Scraping {}: {}", kind, url));
    if log_only() {
        spinner.set_draw_target(ProgressDrawTarget::hidden());
        info!("Scraping {}: {}", kind, url);
        return spinner;
    }
    if let Ok(style) = ProgressStyle::default_spinner().template("{msg} {spinner} [{elapsed_precise}]") {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

// ============================================================================
// Song Batch
// ============================================================================

/// Position within one album's song links.
pub struct SongBatch {
    bar: ProgressBar,
    album: String,
    current: u64,
    total: u64,
}

impl SongBatch {
    pub fn new(album: &str, total: usize) -> Self {
        let bar = ProgressBar::new(total as u64);
        if log_only() {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        } else if let Ok(style) =
            ProgressStyle::default_bar().template("{msg} [{bar:40.cyan/blue}] {pos}/{len} (ETA: {eta})")
        {
            bar.set_style(style.progress_chars("=> "));
        }
        Self {
            bar,
            album: album.to_string(),
            current: 0,
            total: total as u64,
        }
    }

    /// Move to the next song and announce its URL.
    pub fn next_song(&mut self, url: &str) {
        self.current += 1;
        let message = format!("Scraping song {}: {}", self.position(), url);
        if log_only() {
            info!("{}", message);
        }
        self.bar.set_message(message);
    }

    /// `(i/n)` for the song currently being fetched.
    pub fn position(&self) -> String {
        format!("({}/{})", self.current, self.total)
    }

    /// Mark the current song done, whatever its outcome.
    pub fn song_done(&self) {
        self.bar.inc(1);
        if log_only() && (self.current % LOG_INTERVAL == 0 || self.current == self.total) {
            let pct = 100.0 * self.current as f64 / self.total.max(1) as f64;
            info!(
                "[{}] {}/{} songs ({:.1}%)",
                self.album, self.current, self.total, pct
            );
        }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(2.5), "2.5s");
        assert_eq!(format_elapsed(59.94), "59.9s");
        assert_eq!(format_elapsed(187.0), "3m 07s");
    }

    #[test]
    fn test_song_batch_position() {
        let mut batch = SongBatch::new("Hndrxx", 3);
        batch.next_song("https://genius.com/one");
        assert_eq!(batch.position(), "(1/3)");
        batch.song_done();
        batch.next_song("https://genius.com/two");
        assert_eq!(batch.position(), "(2/3)");
        batch.song_done();
        assert_eq!(batch.bar.position(), 2);
        batch.finish();
    }
}
