use std::fmt;
use std::time::{Duration, Instant};

/// Per-run timing accumulator.
///
/// Owned by one pipeline run and discarded with it; nothing here is global.
#[derive(Debug, Clone)]
pub struct RunProfiler {
    started: Instant,
    detect_times: Vec<Duration>,
    recognize_times: Vec<Duration>,
}

impl RunProfiler {
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(started: Instant) -> Self {
        Self {
            started,
            detect_times: Vec::new(),
            recognize_times: Vec::new(),
        }
    }

    pub fn record_detection(&mut self, elapsed: Duration) {
        self.detect_times.push(elapsed);
    }

    /// Only called for frames where matching actually ran.
    pub fn record_recognition(&mut self, elapsed: Duration) {
        self.recognize_times.push(elapsed);
    }

    pub fn summary(&self, frames: usize) -> ProfileSummary {
        self.summary_at(frames, Instant::now())
    }

    fn summary_at(&self, frames: usize, now: Instant) -> ProfileSummary {
        let total_secs = now.duration_since(self.started).as_secs_f64();
        ProfileSummary {
            frames,
            total_secs,
            fps: rate(frames as f64, total_secs),
            detection: StageTiming::from_samples(&self.detect_times),
            recognition: StageTiming::from_samples(&self.recognize_times),
        }
    }
}

/// Mean per-frame cost of one stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageTiming {
    pub frames: usize,
    pub mean_secs: f64,
    pub fps: f64,
}

impl StageTiming {
    fn from_samples(samples: &[Duration]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let mean_secs =
            samples.iter().map(Duration::as_secs_f64).sum::<f64>() / samples.len() as f64;
        Some(Self {
            frames: samples.len(),
            mean_secs,
            fps: rate(1.0, mean_secs),
        })
    }
}

/// End-of-run profiling report.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub frames: usize,
    pub total_secs: f64,
    pub fps: f64,
    pub detection: Option<StageTiming>,
    /// `None` when no frame went through matching.
    pub recognition: Option<StageTiming>,
}

fn rate(count: f64, secs: f64) -> f64 {
    if secs > 0.0 {
        count / secs
    } else {
        0.0
    }
}

impl fmt::Display for ProfileSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total processing runtime: {:.1} sec for {} frames ({:.1} fps).",
            self.total_secs, self.frames, self.fps
        )?;
        if let Some(d) = &self.detection {
            write!(
                f,
                "\nAverage detection time: {:.4} sec per frame for {} frames ({:.1} fps).",
                d.mean_secs, d.frames, d.fps
            )?;
        }
        match &self.recognition {
            Some(r) => write!(
                f,
                "\nAverage recognition time: {:.4} sec per frame for {} frames ({:.1} fps).",
                r.mean_secs, r.frames, r.fps
            ),
            None => write!(f, "\nRecognition did not run."),
        }
    }
}
