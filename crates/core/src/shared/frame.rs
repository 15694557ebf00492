use ndarray::{ArrayView3, ArrayViewMut3};

use super::color_space::ChannelOrder;

/// A single video/image frame: contiguous 8-bit pixels in row-major order.
///
/// The channel order travels with the pixels so the color-space adapter can
/// tell whether a frame is ready for the detection models (RGB) or for the
/// encoder (the source's native order).
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
    order: ChannelOrder,
}

impl Frame {
    /// Creates an RGB frame.
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        Self::with_order(data, width, height, channels, index, ChannelOrder::Rgb)
    }

    pub fn with_order(
        data: Vec<u8>,
        width: u32,
        height: u32,
        channels: u8,
        index: usize,
        order: ChannelOrder,
    ) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
            order,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn channel_order(&self) -> ChannelOrder {
        self.order
    }

    pub(crate) fn set_channel_order(&mut self, order: ChannelOrder) {
        self.order = order;
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
