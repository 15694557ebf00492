/// Classical face detector: the SeetaFace funnel-structured cascade through
/// the `rustface` crate.
///
/// Deterministic and CPU only. Faster than the neural detector with lower
/// recall, which makes it the lightweight choice for long batch jobs.
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const MIN_FACE_SIZE: u32 = 20;
const SCORE_THRESH: f64 = 2.0;
const PYRAMID_SCALE_FACTOR: f32 = 0.8;
const SLIDE_WINDOW_STEP: u32 = 4;

pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let file = File::open(model_path)
            .map_err(|e| format!("Cannot open cascade model {}: {e}", model_path.display()))?;
        let model = rustface::read_model(BufReader::new(file))?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        if frame.channels() < 3 {
            return Err(format!("Expected a 3-channel frame, got {}", frame.channels()).into());
        }
        let gray = to_luma(frame.data(), frame.channels() as usize);

        // rustface detectors are not Send; build one per call from the shared model
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(MIN_FACE_SIZE);
        detector.set_score_thresh(SCORE_THRESH);
        detector.set_pyramid_scale_factor(PYRAMID_SCALE_FACTOR);
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let faces =
            detector.detect(&rustface::ImageData::new(&gray, frame.width(), frame.height()));

        Ok(faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                to_region(
                    bbox.x(),
                    bbox.y(),
                    bbox.width(),
                    bbox.height(),
                    frame.width(),
                    frame.height(),
                )
            })
            .collect())
    }
}

/// BT.601 luma from packed RGB.
fn to_luma(rgb: &[u8], channels: usize) -> Vec<u8> {
    rgb.chunks_exact(channels)
        .map(|px| ((77 * px[0] as u32 + 150 * px[1] as u32 + 29 * px[2] as u32) >> 8) as u8)
        .collect()
}

fn to_region(x: i32, y: i32, w: u32, h: u32, frame_w: u32, frame_h: u32) -> Option<Region> {
    Region::from_corners(
        x as f64,
        y as f64,
        x as f64 + w as f64,
        y as f64 + h as f64,
        frame_w,
        frame_h,
    )
}
