use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for drawing a visible "known face" marker.
///
/// Markers are drawn in place; implementations may only touch pixels inside
/// the frame.
pub trait FaceMarker: Send {
    fn mark(&self, frame: &mut Frame, regions: &[Region])
        -> Result<(), Box<dyn std::error::Error>>;
}
