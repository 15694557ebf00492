use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::detection::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::recognition::domain::face_matcher::FaceMatcher;
use crate::recognition::domain::gallery::Gallery;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// A recoverable problem while analyzing one frame.
///
/// The frame is still written; the anomaly only decides which faces are
/// known and is counted in the run report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameAnomaly {
    #[error("face detection failed: {0}")]
    DetectionFailed(String),
    #[error("face embedding failed: {0}")]
    EmbeddingFailed(String),
    #[error("embedder returned {descriptors} descriptors for {regions} faces")]
    MisalignedDescriptors { regions: usize, descriptors: usize },
    #[error("analysis exceeded {0:?}")]
    TimedOut(Duration),
}

/// Everything the pipeline learned about one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameAnalysis {
    pub regions: Vec<Region>,
    /// One flag per region when matching ran. `None` means every face is
    /// treated as unknown.
    pub matches: Option<Vec<bool>>,
    pub detect_time: Duration,
    /// Set only for frames where matching ran.
    pub recognize_time: Option<Duration>,
    pub anomaly: Option<FrameAnomaly>,
}

impl FrameAnalysis {
    pub fn failed(anomaly: FrameAnomaly, detect_time: Duration) -> Self {
        Self {
            detect_time,
            anomaly: Some(anomaly),
            ..Self::default()
        }
    }
}

/// Detects faces in a frame and decides which of them are known.
///
/// Never fails: per-frame problems are reported through
/// [`FrameAnalysis::anomaly`].
pub trait FrameAnalyzer: Send {
    fn analyze(&mut self, frame: &Frame) -> FrameAnalysis;
}

/// Embedder, gallery and matcher used for identity decisions.
pub struct Recognition {
    pub embedder: Box<dyn FaceEmbedder>,
    pub gallery: Arc<Gallery>,
    pub matcher: FaceMatcher,
}

/// Runs detection and, when a gallery is available, recognition on the
/// calling thread.
pub struct SequentialFrameAnalyzer {
    detector: Box<dyn FaceDetector>,
    recognition: Option<Recognition>,
}

impl SequentialFrameAnalyzer {
    pub fn new(detector: Box<dyn FaceDetector>, recognition: Option<Recognition>) -> Self {
        let recognition = recognition.filter(|r| !r.gallery.is_empty());
        Self {
            detector,
            recognition,
        }
    }

    pub fn recognizes(&self) -> bool {
        self.recognition.is_some()
    }
}

impl FrameAnalyzer for SequentialFrameAnalyzer {
    fn analyze(&mut self, frame: &Frame) -> FrameAnalysis {
        let detect_start = Instant::now();
        let detected = self.detector.detect(frame);
        let detect_time = detect_start.elapsed();

        let regions = match detected {
            Ok(regions) => regions,
            Err(e) => {
                let anomaly = FrameAnomaly::DetectionFailed(e.to_string());
                return FrameAnalysis::failed(anomaly, detect_time);
            }
        };

        let mut analysis = FrameAnalysis {
            regions,
            detect_time,
            ..FrameAnalysis::default()
        };
        let Some(recognition) = self.recognition.as_mut() else {
            return analysis;
        };
        if analysis.regions.is_empty() {
            return analysis;
        }

        let recognize_start = Instant::now();
        match recognition.embedder.embed(frame, &analysis.regions) {
            Err(e) => {
                analysis.anomaly = Some(FrameAnomaly::EmbeddingFailed(e.to_string()));
            }
            Ok(descriptors) if descriptors.len() != analysis.regions.len() => {
                analysis.anomaly = Some(FrameAnomaly::MisalignedDescriptors {
                    regions: analysis.regions.len(),
                    descriptors: descriptors.len(),
                });
            }
            Ok(descriptors) => {
                let matches = recognition.matcher.match_all(&descriptors, &recognition.gallery);
                analysis.matches = Some(matches);
                analysis.recognize_time = Some(recognize_start.elapsed());
            }
        }
        analysis
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::descriptor::Descriptor;
    use crate::recognition::domain::gallery::GalleryEntry;
    use std::sync::Mutex;

    // --- Stubs ---

    struct FixedDetector(Vec<Region>);

    impl FaceDetector for FixedDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Ok(self.0.clone())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&mut self, _frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
            Err("detector error".into())
        }
    }

    /// Descriptor is the region's x coordinate.
    struct XEmbedder {
        calls: Arc<Mutex<usize>>,
        drop_last: bool,
    }

    impl XEmbedder {
        fn new() -> Self {
            Self {
                calls: Arc::new(Mutex::new(0)),
                drop_last: false,
            }
        }
    }

    impl FaceEmbedder for XEmbedder {
        fn embed(
            &mut self,
            _frame: &Frame,
            regions: &[Region],
        ) -> Result<Vec<Descriptor>, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            if regions.is_empty() {
                return Err("no regions".into());
            }
            let mut out: Vec<Descriptor> = regions
                .iter()
                .map(|r| Descriptor::new(vec![r.x as f32]))
                .collect();
            if self.drop_last {
                out.pop();
            }
            Ok(out)
        }
    }

    struct FailingEmbedder;

    impl FaceEmbedder for FailingEmbedder {
        fn embed(
            &mut self,
            _frame: &Frame,
            _regions: &[Region],
        ) -> Result<Vec<Descriptor>, Box<dyn std::error::Error>> {
            Err("embedder error".into())
        }
    }

    // --- Helpers ---

    fn frame() -> Frame {
        Frame::new(vec![0; 64 * 64 * 3], 64, 64, 3, 0)
    }

    fn faces() -> Vec<Region> {
        vec![Region::new(0, 0, 8, 8), Region::new(20, 0, 8, 8), Region::new(40, 0, 8, 8)]
    }

    /// Knows the faces at x=0 and x=40.
    fn gallery() -> Arc<Gallery> {
        Arc::new(Gallery::new(vec![
            GalleryEntry {
                label: "left".into(),
                descriptor: Descriptor::new(vec![0.0]),
            },
            GalleryEntry {
                label: "right".into(),
                descriptor: Descriptor::new(vec![40.0]),
            },
        ]))
    }

    fn recognition(embedder: Box<dyn FaceEmbedder>, gallery: Arc<Gallery>) -> Option<Recognition> {
        Some(Recognition {
            embedder,
            gallery,
            matcher: FaceMatcher::new(1.0),
        })
    }

    // --- Tests ---

    #[test]
    fn test_without_gallery_matches_absent() {
        let mut analyzer = SequentialFrameAnalyzer::new(Box::new(FixedDetector(faces())), None);
        let analysis = analyzer.analyze(&frame());
        assert_eq!(analysis.regions, faces());
        assert!(analysis.matches.is_none());
        assert!(analysis.recognize_time.is_none());
        assert!(analysis.anomaly.is_none());
    }

    #[test]
    fn test_matches_are_index_aligned() {
        let mut analyzer = SequentialFrameAnalyzer::new(
            Box::new(FixedDetector(faces())),
            recognition(Box::new(XEmbedder::new()), gallery()),
        );
        let analysis = analyzer.analyze(&frame());
        let matches = analysis.matches.unwrap();
        assert_eq!(matches.len(), analysis.regions.len());
        assert_eq!(matches, vec![true, false, true]);
        assert!(analysis.recognize_time.is_some());
    }

    #[test]
    fn test_no_faces_skips_embedding() {
        let embedder = XEmbedder::new();
        let calls = embedder.calls.clone();
        let mut analyzer = SequentialFrameAnalyzer::new(
            Box::new(FixedDetector(Vec::new())),
            recognition(Box::new(embedder), gallery()),
        );
        let analysis = analyzer.analyze(&frame());
        assert!(analysis.regions.is_empty());
        assert!(analysis.recognize_time.is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_empty_gallery_disables_recognition() {
        let embedder = XEmbedder::new();
        let calls = embedder.calls.clone();
        let mut analyzer = SequentialFrameAnalyzer::new(
            Box::new(FixedDetector(faces())),
            recognition(Box::new(embedder), Arc::new(Gallery::default())),
        );
        assert!(!analyzer.recognizes());
        let analysis = analyzer.analyze(&frame());
        assert!(analysis.matches.is_none());
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_detector_failure_is_zero_regions_with_anomaly() {
        let mut analyzer = SequentialFrameAnalyzer::new(Box::new(FailingDetector), None);
        let analysis = analyzer.analyze(&frame());
        assert!(analysis.regions.is_empty());
        assert!(matches!(analysis.anomaly, Some(FrameAnomaly::DetectionFailed(_))));
    }

    #[test]
    fn test_embedder_failure_keeps_regions_unmatched() {
        let mut analyzer = SequentialFrameAnalyzer::new(
            Box::new(FixedDetector(faces())),
            recognition(Box::new(FailingEmbedder), gallery()),
        );
        let analysis = analyzer.analyze(&frame());
        assert_eq!(analysis.regions.len(), 3);
        assert!(analysis.matches.is_none());
        assert!(matches!(analysis.anomaly, Some(FrameAnomaly::EmbeddingFailed(_))));
    }

    #[test]
    fn test_short_descriptor_list_is_misaligned() {
        let mut embedder = XEmbedder::new();
        embedder.drop_last = true;
        let mut analyzer = SequentialFrameAnalyzer::new(
            Box::new(FixedDetector(faces())),
            recognition(Box::new(embedder), gallery()),
        );
        let analysis = analyzer.analyze(&frame());
        assert!(analysis.matches.is_none());
        assert_eq!(
            analysis.anomaly,
            Some(FrameAnomaly::MisalignedDescriptors {
                regions: 3,
                descriptors: 2
            })
        );
    }

    #[test]
    fn test_anomaly_messages() {
        assert_eq!(
            FrameAnomaly::DetectionFailed("boom".into()).to_string(),
            "face detection failed: boom"
        );
        assert_eq!(
            FrameAnomaly::MisalignedDescriptors {
                regions: 2,
                descriptors: 1
            }
            .to_string(),
            "embedder returned 1 descriptors for 2 faces"
        );
    }
}
