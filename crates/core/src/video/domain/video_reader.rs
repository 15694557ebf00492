use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Frame Source: decodes a container into frames in presentation order.
///
/// Implementations own codec and container details; the pipeline only sees
/// [`Frame`] and [`VideoMetadata`]. Each frame is tagged with the channel
/// order it was decoded in.
pub trait VideoReader: Send {
    /// Opens a video or image file and returns its metadata.
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>>;

    /// Returns an iterator over frames in decode order, ending at end-of-stream.
    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_>;

    /// Releases any resources held by the reader. Safe to call more than once.
    fn close(&mut self);
}
