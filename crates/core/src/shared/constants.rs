use std::time::Duration;

pub const YOLO_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const YOLO_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/w600k_r50.onnx";

pub const CASCADE_MODEL_NAME: &str = "seeta_fd_frontal_v1.0.bin";
pub const CASCADE_MODEL_URL: &str =
    "https://github.com/atomashpolskiy/rustface/raw/master/model/seeta_fd_frontal_v1.0.bin";

/// Output videos are always encoded at this rate, whatever the source rate.
pub const OUTPUT_FPS: f64 = 30.0;

pub const SOURCE_EXTENSIONS: &[&str] = &["mov", "mp4"];
pub const OUTPUT_EXTENSION: &str = "mp4";

/// Reference images considered when building the gallery.
pub const GALLERY_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

pub const BLUR_KERNEL_SIZE: usize = 25;
pub const BLUR_SIGMA: f64 = 25.0;

/// Maximum Euclidean distance between two L2-normalized ArcFace vectors
/// for them to count as the same person (cosine similarity ~0.4).
pub const DEFAULT_MATCH_THRESHOLD: f64 = 1.1;

pub const DEFAULT_FRAME_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest per-frame timeout accepted.
pub const MAX_FRAME_TIMEOUT: Duration = Duration::from_secs(24 * 60 * 60);
