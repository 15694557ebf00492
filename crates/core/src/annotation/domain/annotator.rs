use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::face_marker::FaceMarker;

/// What [`annotate_and_obscure`] did to one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnnotationCounts {
    pub blurred: usize,
    pub marked: usize,
}

/// Blurs unknown faces and marks known ones.
///
/// `matches[i]` is the decision for `regions[i]`. Without decisions, or when
/// the decisions don't line up with the regions, every region is blurred.
/// Known faces are marked after blurring so a blurred neighbour never
/// smears the outline.
pub fn annotate_and_obscure(
    frame: &mut Frame,
    regions: &[Region],
    matches: Option<&[bool]>,
    blurrer: &dyn FrameBlurrer,
    marker: &dyn FaceMarker,
) -> Result<AnnotationCounts, Box<dyn std::error::Error>> {
    if regions.is_empty() {
        return Ok(AnnotationCounts::default());
    }

    let (known, unknown): (Vec<Region>, Vec<Region>) = match matches {
        Some(flags) if flags.len() == regions.len() => {
            let mut known = Vec::new();
            let mut unknown = Vec::new();
            for (region, is_known) in regions.iter().zip(flags) {
                if *is_known {
                    known.push(*region);
                } else {
                    unknown.push(*region);
                }
            }
            (known, unknown)
        }
        Some(flags) => {
            log::warn!(
                "Frame {}: {} match flags for {} faces, blurring all",
                frame.index(),
                flags.len(),
                regions.len()
            );
            (Vec::new(), regions.to_vec())
        }
        None => (Vec::new(), regions.to_vec()),
    };

    if !unknown.is_empty() {
        blurrer.blur(frame, &unknown)?;
    }
    if !known.is_empty() {
        marker.mark(frame, &known)?;
    }

    Ok(AnnotationCounts {
        blurred: unknown.len(),
        marked: known.len(),
    })
}
