use std::path::Path;

use crate::shared::color_space::ChannelOrder;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

use super::ffmpeg_util::{extract_packed_pixels, packed_format};

/// Decodes video frames via ffmpeg-next (libavformat + libavcodec).
///
/// Frames come out packed in the reader's native channel order, BGR unless
/// configured otherwise; the pipeline converts to RGB for the models.
pub struct FfmpegReader {
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    video_stream_index: usize,
    order: ChannelOrder,
}

// Safety: FfmpegReader is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegReader {}

impl FfmpegReader {
    pub fn new() -> Self {
        Self::with_channel_order(ChannelOrder::Bgr)
    }

    pub fn with_channel_order(order: ChannelOrder) -> Self {
        Self {
            input_ctx: None,
            video_stream_index: 0,
            order,
        }
    }

    fn decode_state(&mut self) -> Result<FfmpegFrameIter<'_>, Box<dyn std::error::Error>> {
        let order = self.order;
        let video_stream_index = self.video_stream_index;
        let ictx = self.input_ctx.as_mut().ok_or("FfmpegReader: not opened")?;

        let stream = ictx
            .stream(video_stream_index)
            .ok_or("FfmpegReader: video stream disappeared")?;
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            packed_format(order),
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(FfmpegFrameIter {
            ictx,
            decoder,
            scaler,
            width,
            height,
            order,
            video_stream_index,
            frame_index: 0,
            flushing: false,
            done: false,
        })
    }
}

impl Default for FfmpegReader {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoReader for FfmpegReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            total_frames: stream.frames().max(0) as usize,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            source_path: Some(path.to_path_buf()),
        };

        self.video_stream_index = video_stream_index;
        self.input_ctx = Some(ictx);

        Ok(metadata)
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        match self.decode_state() {
            Ok(iter) => Box::new(iter),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
    }
}

/// Lazy iterator that decodes one frame at a time, so the whole video is
/// never buffered in memory.
struct FfmpegFrameIter<'a> {
    ictx: &'a mut ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    order: ChannelOrder,
    video_stream_index: usize,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

impl FfmpegFrameIter<'_> {
    fn try_receive(&mut self) -> Option<Result<Frame, Box<dyn std::error::Error>>> {
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if self.decoder.receive_frame(&mut decoded).is_err() {
            return None;
        }

        let mut packed = ffmpeg_next::util::frame::video::Video::empty();
        if let Err(e) = self.scaler.run(&decoded, &mut packed) {
            return Some(Err(Box::new(e)));
        }

        let pixels = extract_packed_pixels(&packed, self.width, self.height);
        let frame = Frame::with_order(
            pixels,
            self.width,
            self.height,
            3,
            self.frame_index,
            self.order,
        );
        self.frame_index += 1;
        Some(Ok(frame))
    }
}

impl Iterator for FfmpegFrameIter<'_> {
    type Item = Result<Frame, Box<dyn std::error::Error>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        if let Some(result) = self.try_receive() {
            return Some(result);
        }

        if self.flushing {
            self.done = true;
            return None;
        }

        loop {
            let Some((stream, packet)) = self.ictx.packets().next() else {
                let _ = self.decoder.send_eof();
                self.flushing = true;
                if let Some(result) = self.try_receive() {
                    return Some(result);
                }
                self.done = true;
                return None;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.send_packet(&packet).is_err() {
                continue;
            }

            if let Some(result) = self.try_receive() {
                return Some(result);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_video::write_test_video;

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mp4");
        write_test_video(&path, 5, 160, 120, 25);

        let mut reader = FfmpegReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps > 0.0);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_is_error() {
        let mut reader = FfmpegReader::new();
        assert!(reader.open(Path::new("/nonexistent/test.mp4")).is_err());
    }

    #[test]
    fn test_frames_yields_every_frame_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mp4");
        write_test_video(&path, 5, 160, 120, 30);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<Frame> = reader.frames().map(|f| f.unwrap()).collect();
        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.index(), i);
        }
    }

    #[test]
    fn test_frames_are_packed_bgr_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mp4");
        write_test_video(&path, 1, 160, 120, 30);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();

        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.channel_order(), ChannelOrder::Bgr);
        assert_eq!(frame.data().len(), 160 * 120 * 3);
    }

    #[test]
    fn test_configured_rgb_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mp4");
        write_test_video(&path, 1, 160, 120, 30);

        let mut reader = FfmpegReader::with_channel_order(ChannelOrder::Rgb);
        reader.open(&path).unwrap();

        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.channel_order(), ChannelOrder::Rgb);
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = FfmpegReader::new();
        let result = reader.frames().next().unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.mp4");
        write_test_video(&path, 1, 160, 120, 30);

        let mut reader = FfmpegReader::new();
        reader.open(&path).unwrap();
        reader.close();
        reader.close();
    }
}
