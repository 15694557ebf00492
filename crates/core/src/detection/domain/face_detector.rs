use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face detection on one RGB frame.
///
/// Returned regions lie inside the frame; an empty list is a normal result.
/// Implementations may keep scratch state between calls, hence `&mut self`.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
