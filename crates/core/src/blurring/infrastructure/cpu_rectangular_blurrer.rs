use std::cell::RefCell;

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::constants::{BLUR_KERNEL_SIZE, BLUR_SIGMA};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

use super::gaussian::{self, RoiRect};

/// CPU rectangular blurrer using separable Gaussian blur.
///
/// Each region's box is blurred on its own, so the kernel never samples
/// pixels outside the region and nothing outside it is written.
pub struct CpuRectangularBlurrer {
    kernel: Vec<f32>,
    roi_buf: RefCell<Vec<u8>>,
    blur_temp: RefCell<Vec<f32>>,
}

impl CpuRectangularBlurrer {
    /// `kernel_size` is rounded up to the next odd number.
    pub fn new(kernel_size: usize, sigma: f64) -> Self {
        Self {
            kernel: gaussian::gaussian_kernel_1d(kernel_size.max(1) | 1, sigma),
            roi_buf: RefCell::new(Vec::new()),
            blur_temp: RefCell::new(Vec::new()),
        }
    }
}

impl Default for CpuRectangularBlurrer {
    fn default() -> Self {
        Self::new(BLUR_KERNEL_SIZE, BLUR_SIGMA)
    }
}

impl FrameBlurrer for CpuRectangularBlurrer {
    fn blur(
        &self,
        frame: &mut Frame,
        regions: &[Region],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());
        let channels = frame.channels() as usize;
        let data = frame.data_mut();

        for r in regions {
            let clamped = r.clamped(fw, fh);
            if clamped.is_empty() {
                continue;
            }
            let rect = RoiRect {
                x: clamped.x as usize,
                y: clamped.y as usize,
                w: clamped.width as usize,
                h: clamped.height as usize,
            };

            let mut roi = self.roi_buf.borrow_mut();
            let mut temp = self.blur_temp.borrow_mut();
            gaussian::extract_roi(data, fw as usize, channels, rect, &mut roi);
            gaussian::separable_gaussian_blur_with_kernel(
                &mut roi,
                rect.w,
                rect.h,
                channels,
                &self.kernel,
                &mut temp,
            );
            gaussian::write_roi_back(data, &roi, fw as usize, channels, rect);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_frame(width: u32, height: u32, value: u8) -> Frame {
        let data = vec![value; (width * height * 3) as usize];
        Frame::new(data, width, height, 3, 0)
    }

    /// Frame with a distinct value per pixel so any change is visible.
    fn gradient_frame(width: u32, height: u32) -> Frame {
        let data = (0..width * height * 3).map(|i| (i * 7 % 251) as u8).collect();
        Frame::new(data, width, height, 3, 0)
    }

    fn assert_unchanged_outside(before: &[u8], after: &Frame, regions: &[Region]) {
        let w = after.width() as i32;
        for y in 0..after.height() as i32 {
            for x in 0..w {
                if regions.iter().any(|r| r.contains(x, y)) {
                    continue;
                }
                let i = ((y * w + x) * 3) as usize;
                assert_eq!(&after.data()[i..i + 3], &before[i..i + 3], "pixel ({x},{y}) changed");
            }
        }
    }

    #[test]
    fn test_no_regions_frame_unchanged() {
        let mut frame = gradient_frame(40, 30);
        let original = frame.data().to_vec();
        CpuRectangularBlurrer::default().blur(&mut frame, &[]).unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_preserves_frame_index() {
        let mut frame = Frame::new(vec![128u8; 100 * 100 * 3], 100, 100, 3, 42);
        CpuRectangularBlurrer::default().blur(&mut frame, &[Region::new(0, 0, 10, 10)]).unwrap();
        assert_eq!(frame.index(), 42);
    }

    #[test]
    fn test_blur_modifies_region_pixels() {
        let mut frame = make_frame(100, 100, 0);
        let data = frame.data_mut();
        for y in 10..15 {
            for x in 10..15 {
                let idx = (y * 100 + x) * 3;
                data[idx..idx + 3].copy_from_slice(&[255, 255, 255]);
            }
        }

        let blurrer = CpuRectangularBlurrer::new(5, 0.0);
        blurrer.blur(&mut frame, &[Region::new(5, 5, 30, 30)]).unwrap();

        let neighbor = (9 * 100 + 12) * 3;
        assert!(frame.data()[neighbor] > 0, "blur should spread to adjacent pixels");
    }

    #[test]
    fn test_pixels_outside_regions_bit_identical() {
        let mut frame = gradient_frame(64, 48);
        let original = frame.data().to_vec();
        let regions = [Region::new(5, 5, 20, 15), Region::new(40, 30, 16, 16)];

        CpuRectangularBlurrer::default().blur(&mut frame, &regions).unwrap();

        assert_unchanged_outside(&original, &frame, &regions);
        assert_ne!(frame.data(), &original[..]);
    }

    #[test]
    fn test_region_past_frame_edge_is_clamped() {
        let mut frame = gradient_frame(32, 32);
        let original = frame.data().to_vec();
        let regions = [Region::new(20, -5, 40, 20)];

        CpuRectangularBlurrer::default().blur(&mut frame, &regions).unwrap();

        assert_unchanged_outside(&original, &frame, &regions);
    }

    #[test]
    fn test_region_outside_frame_skipped() {
        let mut frame = gradient_frame(32, 32);
        let original = frame.data().to_vec();
        CpuRectangularBlurrer::default()
            .blur(&mut frame, &[Region::new(100, 100, 10, 10)])
            .unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_zero_size_region_skipped() {
        let mut frame = make_frame(100, 100, 128);
        let original = frame.data().to_vec();
        CpuRectangularBlurrer::default()
            .blur(&mut frame, &[Region::new(10, 10, 0, 20)])
            .unwrap();
        assert_eq!(frame.data(), &original[..]);
    }

    #[test]
    fn test_default_kernel_size() {
        let blurrer = CpuRectangularBlurrer::default();
        assert_eq!(blurrer.kernel.len(), BLUR_KERNEL_SIZE);
    }

    #[test]
    fn test_even_kernel_size_rounded_up() {
        assert_eq!(CpuRectangularBlurrer::new(24, 5.0).kernel.len(), 25);
    }
}
