use std::time::Instant;

/// Observer for long-running frame operations (importing a range into
/// memory, exporting footage).
///
/// Decouples the operations from specific output mechanisms so callers can
/// route progress to logs, a GUI, or nowhere.
pub trait ProgressReporter {
    /// Report frame-level progress.
    fn progress(&mut self, current: usize, total: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-operation summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent reporter that discards all events.
pub struct NullProgress;

impl ProgressReporter for NullProgress {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
}

/// Reporter that writes through the `log` facade.
///
/// Progress lines are throttled to every `throttle_frames` frames to avoid
/// excessive output on long sequences.
pub struct LogProgress {
    throttle_frames: usize,
    start_time: Instant,
    last_current: usize,
    total_frames: usize,
    messages: Vec<String>,
}

impl LogProgress {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            start_time: Instant::now(),
            last_current: 0,
            total_frames: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if nothing was reported.
    pub fn summary_string(&self) -> Option<String> {
        if self.total_frames == 0 {
            return None;
        }
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let mut line = format!(
            "{}/{} frames in {:.1}s",
            self.last_current, self.total_frames, elapsed
        );
        if elapsed > 0.0 && self.last_current > 0 {
            let fps = self.last_current as f64 / elapsed;
            line.push_str(&format!(" ({fps:.1} fps)"));
        }
        Some(line)
    }

    fn should_log(&self, current: usize, total: usize) -> bool {
        total > 0 && (current % self.throttle_frames == 0 || current == total)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new(10)
    }
}

impl ProgressReporter for LogProgress {
    fn progress(&mut self, current: usize, total: usize) {
        self.total_frames = total;
        self.last_current = current;
        if self.should_log(current, total) {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Frames: {current}/{total} ({pct:.1}%)");
        }
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("{text}");
        }
    }
}
