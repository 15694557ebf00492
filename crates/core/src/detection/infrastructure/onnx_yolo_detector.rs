/// Neural face detector: a YOLO face model run through ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference, confidence filtering and NMS.
/// The session is built once in [`OnnxYoloDetector::new`] and reused for
/// every frame.
use std::path::Path;

use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::execution_provider::preferred_execution_providers;

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for face detection.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

const NMS_IOU_THRESH: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

pub struct OnnxYoloDetector {
    session: ort::session::Session,
    confidence: f64,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's NCHW input shape and
    /// falls back to 640 when the shape is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            confidence,
            input_size,
        })
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("YOLO model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape().to_vec();
        if shape.len() != 3 {
            return Err(format!("Unexpected YOLO output shape: {shape:?}").into());
        }

        // [1, features, detections] (transposed) or [1, detections, features]
        let transposed = shape[1] < shape[2];
        let (num_dets, num_feats) = if transposed {
            (shape[2], shape[1])
        } else {
            (shape[1], shape[2])
        };
        if num_feats < 5 {
            return Ok(Vec::new());
        }

        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let feature = |det: usize, feat: usize| -> f64 {
            if transposed {
                data[feat * num_dets + det] as f64
            } else {
                data[det * num_feats + feat] as f64
            }
        };

        let mut raw_dets = Vec::new();
        for i in 0..num_dets {
            let conf = feature(i, 4);
            if conf < self.confidence {
                continue;
            }
            let (cx, cy, w, h) = (feature(i, 0), feature(i, 1), feature(i, 2), feature(i, 3));
            raw_dets.push(RawDetection {
                x1: ((cx - w / 2.0) - pad_x as f64) / scale,
                y1: ((cy - h / 2.0) - pad_y as f64) / scale,
                x2: ((cx + w / 2.0) - pad_x as f64) / scale,
                y2: ((cy + h / 2.0) - pad_y as f64) / scale,
                confidence: conf,
            });
        }

        let kept = nms(&mut raw_dets, NMS_IOU_THRESH);
        Ok(kept
            .iter()
            .filter_map(|d| {
                Region::from_corners(d.x1, d.y1, d.x2, d.y2, frame.width(), frame.height())
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` x `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = ndarray::Array4::<f32>::from_elem(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize into the padded canvas
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// NMS
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    confidence: f64,
}

impl RawDetection {
    fn bbox(&self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(dets: &mut [RawDetection], iou_thresh: f64) -> Vec<RawDetection> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; dets.len()];

    for i in 0..dets.len() {
        if suppressed[i] {
            continue;
        }
        keep.push(dets[i].clone());
        for j in (i + 1)..dets.len() {
            if !suppressed[j] && bbox_iou(&dets[i].bbox(), &dets[j].bbox()) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

fn bbox_iou(a: &[f64; 4], b: &[f64; 4]) -> f64 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }
    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(x1: f64, y1: f64, x2: f64, y2: f64, confidence: f64) -> RawDetection {
        RawDetection {
            x1,
            y1,
            x2,
            y2,
            confidence,
        }
    }

    #[test]
    fn test_letterbox_preserves_aspect_ratio() {
        // 200x100 -> scale 3.2, content 640x320, pad_y 160
        let frame = Frame::new(vec![128u8; 200 * 100 * 3], 200, 100, 3, 0);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);

        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((scale - 3.2).abs() < 0.01);
        assert_eq!(pad_x, 0);
        assert_eq!(pad_y, 160);
    }

    #[test]
    fn test_letterbox_values_normalized() {
        let frame = Frame::new(vec![255u8; 100 * 50 * 3], 100, 50, 3, 0);
        let (tensor, _, pad_x, pad_y) = letterbox(&frame, 640);

        let y = pad_y as usize + 1;
        let x = pad_x as usize + 1;
        assert!((tensor[[0, 0, y, x]] - 1.0).abs() < 0.01);
        assert!((tensor[[0, 0, 0, 0]] - PAD_VALUE).abs() < 0.01);
    }

    #[test]
    fn test_nms_suppresses_overlapping_keeps_most_confident() {
        let mut dets = vec![
            det(0.0, 0.0, 100.0, 100.0, 0.5),
            det(2.0, 2.0, 102.0, 102.0, 0.9),
        ];
        let kept = nms(&mut dets, 0.3);
        assert_eq!(kept.len(), 1);
        assert!((kept[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let mut dets = vec![
            det(0.0, 0.0, 50.0, 50.0, 0.9),
            det(200.0, 200.0, 250.0, 250.0, 0.8),
        ];
        assert_eq!(nms(&mut dets, 0.3).len(), 2);
    }

    #[test]
    fn test_nms_empty_input() {
        let mut dets: Vec<RawDetection> = Vec::new();
        assert!(nms(&mut dets, 0.3).is_empty());
    }

    #[test]
    fn test_bbox_iou_bounds() {
        let b = [0.0, 0.0, 10.0, 10.0];
        assert!((bbox_iou(&b, &b) - 1.0).abs() < 1e-9);
        assert_eq!(bbox_iou(&b, &[20.0, 20.0, 30.0, 30.0]), 0.0);
    }
}
