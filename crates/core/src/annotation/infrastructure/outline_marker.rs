use image::{ImageBuffer, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::annotation::domain::face_marker::FaceMarker;
use crate::shared::color_space::ChannelOrder;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

const DEFAULT_COLOR: [u8; 3] = [0, 255, 0];
const DEFAULT_THICKNESS: u32 = 2;

/// Draws a hollow rectangle just inside each region's box.
pub struct OutlineMarker {
    color: [u8; 3],
    thickness: u32,
}

impl OutlineMarker {
    /// `color` is given in RGB regardless of the frame's channel order.
    pub fn new(color: [u8; 3], thickness: u32) -> Self {
        Self {
            color,
            thickness: thickness.max(1),
        }
    }
}

impl Default for OutlineMarker {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR, DEFAULT_THICKNESS)
    }
}

impl FaceMarker for OutlineMarker {
    fn mark(
        &self,
        frame: &mut Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!("Expected a 3-channel frame, got {}", frame.channels()).into());
        }
        let [r, g, b] = self.color;
        let color = match frame.channel_order() {
            ChannelOrder::Rgb => Rgb([r, g, b]),
            ChannelOrder::Bgr => Rgb([b, g, r]),
        };
        let (w, h) = (frame.width(), frame.height());
        let mut canvas = ImageBuffer::<Rgb<u8>, &mut [u8]>::from_raw(w, h, frame.data_mut())
            .ok_or("Frame buffer does not match its dimensions")?;

        for region in regions {
            let clamped = region.clamped(w, h);
            for inset in 0..self.thickness as i32 {
                let rw = clamped.width - 2 * inset;
                let rh = clamped.height - 2 * inset;
                if rw <= 0 || rh <= 0 {
                    break;
                }
                let rect = Rect::at(clamped.x + inset, clamped.y + inset)
                    .of_size(rw as u32, rh as u32);
                draw_hollow_rect_mut(&mut canvas, rect, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(frame: &Frame, x: u32, y: u32) -> [u8; 3] {
        let i = ((y * frame.width() + x) * 3) as usize;
        [frame.data()[i], frame.data()[i + 1], frame.data()[i + 2]]
    }

    #[test]
    fn test_outline_drawn_on_border_only() {
        let mut frame = Frame::new(vec![0; 50 * 50 * 3], 50, 50, 3, 0);
        OutlineMarker::default()
            .mark(&mut frame, &[Region::new(10, 10, 20, 20)])
            .unwrap();

        assert_eq!(pixel(&frame, 10, 10), [0, 255, 0]);
        assert_eq!(pixel(&frame, 11, 20), [0, 255, 0]);
        assert_eq!(pixel(&frame, 29, 29), [0, 255, 0]);
        // Interior and outside untouched
        assert_eq!(pixel(&frame, 20, 20), [0, 0, 0]);
        assert_eq!(pixel(&frame, 9, 9), [0, 0, 0]);
        assert_eq!(pixel(&frame, 30, 30), [0, 0, 0]);
    }

    #[test]
    fn test_color_follows_channel_order() {
        let mut frame =
            Frame::with_order(vec![0; 20 * 20 * 3], 20, 20, 3, 0, ChannelOrder::Bgr);
        OutlineMarker::new([255, 0, 0], 1)
            .mark(&mut frame, &[Region::new(0, 0, 10, 10)])
            .unwrap();
        assert_eq!(pixel(&frame, 0, 0), [0, 0, 255]);
    }

    #[test]
    fn test_region_past_edge_is_clipped() {
        let mut frame = Frame::new(vec![0; 20 * 20 * 3], 20, 20, 3, 0);
        OutlineMarker::default()
            .mark(&mut frame, &[Region::new(15, 15, 30, 30)])
            .unwrap();
        assert_eq!(pixel(&frame, 19, 19), [0, 255, 0]);
        assert_eq!(pixel(&frame, 14, 14), [0, 0, 0]);
    }

    #[test]
    fn test_tiny_region_does_not_panic() {
        let mut frame = Frame::new(vec![0; 10 * 10 * 3], 10, 10, 3, 0);
        OutlineMarker::new([255, 255, 255], 5)
            .mark(&mut frame, &[Region::new(2, 2, 1, 1), Region::new(50, 50, 4, 4)])
            .unwrap();
        assert_eq!(pixel(&frame, 2, 2), [255, 255, 255]);
    }
}
