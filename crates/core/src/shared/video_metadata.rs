use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub codec: String,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Same resolution and source, re-timed to `fps`.
    pub fn with_fps(&self, fps: f64) -> VideoMetadata {
        VideoMetadata {
            fps,
            ..self.clone()
        }
    }
}
