/// ROI rectangle within a frame, used to pass region coordinates without many arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

/// Precompute a normalized 1D Gaussian kernel.
///
/// `kernel_size` must be odd and >= 1. A non-positive `sigma` is derived
/// from the kernel size with OpenCV's convention.
pub fn gaussian_kernel_1d(kernel_size: usize, sigma: f64) -> Vec<f32> {
    debug_assert!(kernel_size >= 1 && kernel_size % 2 == 1);
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((kernel_size as f64 - 1.0) * 0.5 - 1.0) + 0.8
    };
    let half = (kernel_size / 2) as f64;
    let mut kernel_f64: Vec<f64> = (0..kernel_size)
        .map(|i| {
            let x = i as f64 - half;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let sum: f64 = kernel_f64.iter().sum();
    for v in &mut kernel_f64 {
        *v /= sum;
    }
    kernel_f64.iter().map(|&v| v as f32).collect()
}

/// Apply a separable Gaussian blur using a pre-computed kernel, reusing `temp`.
///
/// Borders replicate the edge pixel, so only pixels inside `data` are read.
pub fn separable_gaussian_blur_with_kernel(
    data: &mut [u8],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &[f32],
    temp: &mut Vec<f32>,
) {
    let kernel_size = kernel.len();
    if kernel_size <= 1 || width == 0 || height == 0 {
        return;
    }
    let half = kernel_size / 2;

    let needed = width * height * channels;
    temp.resize(needed, 0.0);

    // Horizontal pass: data → temp
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sx = (x as isize + k as isize - half as isize)
                        .max(0)
                        .min((width - 1) as isize) as usize;
                    sum += data[(y * width + sx) * channels + c] as f32 * w;
                }
                temp[(y * width + x) * channels + c] = sum;
            }
        }
    }

    // Vertical pass: temp → data
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let mut sum = 0.0f32;
                for (k, &w) in kernel.iter().enumerate() {
                    let sy = (y as isize + k as isize - half as isize)
                        .max(0)
                        .min((height - 1) as isize) as usize;
                    sum += temp[(sy * width + x) * channels + c] * w;
                }
                data[(y * width + x) * channels + c] = sum.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Extract a rectangular ROI from frame data into a reusable buffer.
pub fn extract_roi(
    data: &[u8],
    frame_width: usize,
    channels: usize,
    rect: RoiRect,
    roi: &mut Vec<u8>,
) {
    roi.resize(rect.w * rect.h * channels, 0);
    for row in 0..rect.h {
        let src_offset = ((rect.y + row) * frame_width + rect.x) * channels;
        let dst_offset = row * rect.w * channels;
        roi[dst_offset..dst_offset + rect.w * channels]
            .copy_from_slice(&data[src_offset..src_offset + rect.w * channels]);
    }
}

/// Write a blurred ROI buffer back into frame data.
pub fn write_roi_back(
    data: &mut [u8],
    roi: &[u8],
    frame_width: usize,
    channels: usize,
    rect: RoiRect,
) {
    for row in 0..rect.h {
        let dst_offset = ((rect.y + row) * frame_width + rect.x) * channels;
        let src_offset = row * rect.w * channels;
        data[dst_offset..dst_offset + rect.w * channels]
            .copy_from_slice(&roi[src_offset..src_offset + rect.w * channels]);
    }
}
