/// Cross-cutting logger for pipeline orchestration events.
///
/// Decouples the use case from specific output mechanisms so callers can
/// observe a run without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 when the source doesn't
    /// know its frame count.
    fn progress(&mut self, current: usize, total: usize);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Log a recoverable problem.
    fn warn(&mut self, message: &str);
}

/// Silent logger that discards all events. Used by tests.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn info(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}

/// Logger backed by the `log` facade.
///
/// Progress output is throttled to every `throttle_frames` frames
/// to avoid excessive I/O on large videos.
pub struct LogPipelineLogger {
    throttle_frames: usize,
    warnings: usize,
}

impl LogPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            warnings: 0,
        }
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }

    fn should_report(&self, current: usize, total: usize) -> bool {
        current % self.throttle_frames == 0 || (total > 0 && current == total)
    }
}

impl Default for LogPipelineLogger {
    fn default() -> Self {
        Self::new(100)
    }
}

impl PipelineLogger for LogPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        if !self.should_report(current, total) {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        } else {
            log::info!("Processing: {current} frames");
        }
    }

    fn info(&mut self, message: &str) {
        log::info!("{message}");
    }

    fn warn(&mut self, message: &str) {
        self.warnings += 1;
        log::warn!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.info("hello");
        logger.warn("careful");
    }

    #[test]
    fn test_progress_throttled() {
        let logger = LogPipelineLogger::new(10);
        let reported: Vec<usize> = (1..=25).filter(|&i| logger.should_report(i, 25)).collect();
        assert_eq!(reported, vec![10, 20, 25]);
    }

    #[test]
    fn test_progress_without_total() {
        let logger = LogPipelineLogger::new(10);
        assert!(!logger.should_report(5, 0));
        assert!(logger.should_report(10, 0));
    }

    #[test]
    fn test_warn_counts() {
        let mut logger = LogPipelineLogger::default();
        logger.warn("a");
        logger.warn("b");
        logger.info("c");
        assert_eq!(logger.warnings(), 2);
    }

    #[test]
    fn test_zero_throttle_clamped() {
        assert_eq!(LogPipelineLogger::new(0).throttle_frames, 1);
    }
}
