use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::descriptor::Descriptor;

/// Domain interface for turning face regions into identity descriptors.
///
/// The result is index-aligned with `regions`. Callers must pass at least
/// one region; implementations reject an empty slice with an error.
pub trait FaceEmbedder: Send {
    fn embed(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<Vec<Descriptor>, Box<dyn std::error::Error>>;
}
