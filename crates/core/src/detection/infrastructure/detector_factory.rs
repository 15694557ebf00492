use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::{
    CASCADE_MODEL_NAME, CASCADE_MODEL_URL, YOLO_MODEL_NAME, YOLO_MODEL_URL,
};
use crate::shared::model_resolver::{self, ProgressFn};

use super::onnx_yolo_detector::OnnxYoloDetector;
use super::rustface_detector::RustfaceDetector;

/// Which detection backend to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    /// YOLO face model through ONNX Runtime.
    Neural,
    /// SeetaFace cascade through rustface.
    Cascade,
}

impl DetectorKind {
    pub fn from_flag(use_cascade: bool) -> Self {
        if use_cascade {
            DetectorKind::Cascade
        } else {
            DetectorKind::Neural
        }
    }

    fn model(self) -> (&'static str, &'static str) {
        match self {
            DetectorKind::Neural => (YOLO_MODEL_NAME, YOLO_MODEL_URL),
            DetectorKind::Cascade => (CASCADE_MODEL_NAME, CASCADE_MODEL_URL),
        }
    }
}

/// Resolves the model for `kind` and builds the detector, loading it once.
///
/// The caller only ever sees a `Box<dyn FaceDetector>`.
pub fn create_detector(
    kind: DetectorKind,
    confidence: f64,
    progress: Option<ProgressFn>,
) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error>> {
    let (name, url) = kind.model();
    log::info!("Resolving model: {name}");
    let model_path = model_resolver::resolve(name, url, None, progress)?;

    match kind {
        DetectorKind::Neural => {
            log::info!("Using neural face detector (confidence={confidence})");
            Ok(Box::new(OnnxYoloDetector::new(&model_path, confidence)?))
        }
        DetectorKind::Cascade => {
            log::info!("Using cascade face detector");
            Ok(Box::new(RustfaceDetector::new(&model_path)?))
        }
    }
}
