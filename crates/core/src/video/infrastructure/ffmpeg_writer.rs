use std::path::Path;

use crate::shared::color_space::ChannelOrder;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;

use super::ffmpeg_util::packed_format;

const FALLBACK_FPS: i32 = 30;

/// Encodes frames to MPEG-4 Part 2 via ffmpeg-next.
///
/// The container is chosen from the output extension. Frames must arrive in
/// the writer's input channel order (BGR unless configured otherwise); the
/// writer does not reorder channels itself.
pub struct FfmpegWriter {
    octx: Option<ffmpeg_next::format::context::Output>,
    encoder: Option<ffmpeg_next::codec::encoder::video::Encoder>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    input_order: ChannelOrder,
    width: u32,
    height: u32,
    fps: i32,
    frame_count: usize,
}

// Safety: FfmpegWriter is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegWriter {}

impl FfmpegWriter {
    pub fn new() -> Self {
        Self::with_channel_order(ChannelOrder::Bgr)
    }

    pub fn with_channel_order(input_order: ChannelOrder) -> Self {
        Self {
            octx: None,
            encoder: None,
            scaler: None,
            input_order,
            width: 0,
            height: 0,
            fps: FALLBACK_FPS,
            frame_count: 0,
        }
    }
}

impl Default for FfmpegWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn rounded_fps(fps: f64) -> i32 {
    let fps_i = fps.round() as i32;
    if fps_i <= 0 {
        FALLBACK_FPS
    } else {
        fps_i
    }
}

fn drain_packets(
    encoder: &mut ffmpeg_next::codec::encoder::video::Encoder,
    octx: &mut ffmpeg_next::format::context::Output,
    fps: i32,
) -> Result<(), Box<dyn std::error::Error>> {
    let ost_time_base = octx.stream(0).ok_or("Output stream missing")?.time_base();
    let mut encoded = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut encoded).is_ok() {
        encoded.set_stream(0);
        encoded.rescale_ts(ffmpeg_next::Rational(1, fps), ost_time_base);
        encoded.write_interleaved(octx)?;
    }
    Ok(())
}

impl VideoWriter for FfmpegWriter {
    fn open(
        &mut self,
        path: &Path,
        metadata: &VideoMetadata,
    ) -> Result<(), Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        self.width = metadata.width;
        self.height = metadata.height;
        self.fps = rounded_fps(metadata.fps);

        let mut octx = ffmpeg_next::format::output(path)?;

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4)
            .ok_or("MPEG4 encoder not found")?;

        let mut ost = octx.add_stream(Some(codec))?;

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()?;

        encoder_ctx.set_width(metadata.width);
        encoder_ctx.set_height(metadata.height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, self.fps));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(self.fps, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let encoder = encoder_ctx.open_with(ffmpeg_next::Dictionary::new())?;
        ost.set_parameters(&encoder);

        octx.write_header()?;

        let scaler = ffmpeg_next::software::scaling::Context::get(
            packed_format(self.input_order),
            metadata.width,
            metadata.height,
            ffmpeg_next::format::Pixel::YUV420P,
            metadata.width,
            metadata.height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        self.octx = Some(octx);
        self.encoder = Some(encoder);
        self.scaler = Some(scaler);
        self.frame_count = 0;

        Ok(())
    }

    fn write(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        let (Some(encoder), Some(scaler), Some(octx)) = (
            self.encoder.as_mut(),
            self.scaler.as_mut(),
            self.octx.as_mut(),
        ) else {
            return Err("FfmpegWriter: not opened".into());
        };

        if frame.channel_order() != self.input_order {
            return Err(format!(
                "FfmpegWriter expects {:?} frames, got {:?}",
                self.input_order,
                frame.channel_order()
            )
            .into());
        }
        if frame.width() != self.width || frame.height() != self.height {
            return Err(format!(
                "Frame {} is {}x{}, writer was opened at {}x{}",
                frame.index(),
                frame.width(),
                frame.height(),
                self.width,
                self.height
            )
            .into());
        }

        let mut packed = ffmpeg_next::util::frame::video::Video::new(
            packed_format(self.input_order),
            self.width,
            self.height,
        );

        let stride = packed.stride(0);
        let row_bytes = self.width as usize * 3;
        let data = packed.data_mut(0);
        let src = frame.data();
        for row in 0..self.height as usize {
            let src_start = row * row_bytes;
            let dst_start = row * stride;
            data[dst_start..dst_start + row_bytes]
                .copy_from_slice(&src[src_start..src_start + row_bytes]);
        }

        let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
        scaler.run(&packed, &mut yuv_frame)?;
        yuv_frame.set_pts(Some(self.frame_count as i64));

        encoder.send_frame(&yuv_frame)?;
        drain_packets(encoder, octx, self.fps)?;

        self.frame_count += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if let (Some(encoder), Some(octx)) = (self.encoder.as_mut(), self.octx.as_mut()) {
            encoder.send_eof()?;
            drain_packets(encoder, octx, self.fps)?;
            octx.write_trailer()?;
            log::debug!("Output finalized after {} frames", self.frame_count);
        }

        self.octx = None;
        self.encoder = None;
        self.scaler = None;

        Ok(())
    }
}
