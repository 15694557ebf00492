use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;

/// Frame Sink: encodes frames into an output container in the order given.
pub trait VideoWriter: Send {
    /// Opens `path` for writing at the resolution and frame rate in `metadata`.
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>>;

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;

    /// Flushes pending packets and finalizes the container.
    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}
