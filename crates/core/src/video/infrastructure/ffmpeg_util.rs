use crate::shared::color_space::ChannelOrder;

/// Packed 24-bit pixel format matching a channel order.
pub(super) fn packed_format(order: ChannelOrder) -> ffmpeg_next::format::Pixel {
    match order {
        ChannelOrder::Rgb => ffmpeg_next::format::Pixel::RGB24,
        ChannelOrder::Bgr => ffmpeg_next::format::Pixel::BGR24,
    }
}

/// Copies a packed 3-channel ffmpeg frame into a tightly packed buffer.
///
/// ffmpeg rows may carry padding (stride > width*3); the padding is dropped.
pub(super) fn extract_packed_pixels(
    frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = frame.stride(0);
    let data = frame.data(0);
    let row_bytes = width as usize * 3;

    let mut pixels = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + row_bytes]);
    }
    pixels
}
