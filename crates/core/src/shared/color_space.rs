use super::frame::Frame;

/// Byte order of the three color channels in a [`Frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelOrder {
    Rgb,
    Bgr,
}

/// Converts a frame to `target` channel order in place.
///
/// RGB and BGR differ only in which end the red channel sits, so the
/// conversion is a swap of channels 0 and 2 and is its own inverse.
/// Frames already in `target` order are left untouched.
pub fn convert(frame: &mut Frame, target: ChannelOrder) {
    if frame.channel_order() == target {
        return;
    }
    let channels = frame.channels() as usize;
    if channels >= 3 {
        for px in frame.data_mut().chunks_exact_mut(channels) {
            px.swap(0, 2);
        }
    }
    frame.set_channel_order(target);
}
