use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for obscuring face regions within a frame.
///
/// Implementations modify the frame in place and must leave every pixel
/// outside the given regions untouched.
pub trait FrameBlurrer: Send {
    fn blur(&self, frame: &mut Frame, regions: &[Region])
        -> Result<(), Box<dyn std::error::Error>>;
}
