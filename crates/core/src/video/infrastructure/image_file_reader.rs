use std::path::Path;

use crate::shared::color_space::ChannelOrder;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;

use super::ffmpeg_util::{extract_packed_pixels, packed_format};

/// Adapts a single still image to the [`VideoReader`] interface.
///
/// The image is a one-frame video with `fps=0` and `total_frames=1`, decoded
/// straight to RGB. Uses ffmpeg rather than the `image` crate since it is
/// considerably faster on large JPEGs.
pub struct ImageFileReader {
    frame: Option<Frame>,
}

impl ImageFileReader {
    pub fn new() -> Self {
        Self { frame: None }
    }
}

impl Default for ImageFileReader {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_single_frame(
    ictx: &mut ffmpeg_next::format::context::Input,
    decoder: &mut ffmpeg_next::decoder::Video,
    scaler: &mut ffmpeg_next::software::scaling::Context,
    video_stream_index: usize,
) -> Result<Frame, Box<dyn std::error::Error>> {
    for (stream, packet) in ictx.packets() {
        if stream.index() != video_stream_index {
            continue;
        }
        decoder.send_packet(&packet)?;
        if let Some(frame) = try_receive_frame(decoder, scaler)? {
            return Ok(frame);
        }
    }

    // Some formats only release the frame on flush
    let _ = decoder.send_eof();
    try_receive_frame(decoder, scaler)?.ok_or_else(|| "Failed to decode image".into())
}

fn try_receive_frame(
    decoder: &mut ffmpeg_next::decoder::Video,
    scaler: &mut ffmpeg_next::software::scaling::Context,
) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
    let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
    if decoder.receive_frame(&mut decoded).is_err() {
        return Ok(None);
    }
    let (width, height) = (decoder.width(), decoder.height());
    let mut rgb = ffmpeg_next::util::frame::video::Video::empty();
    scaler.run(&decoded, &mut rgb)?;
    let pixels = extract_packed_pixels(&rgb, width, height);
    Ok(Some(Frame::new(pixels, width, height, 3, 0)))
}

impl VideoReader for ImageFileReader {
    fn open(&mut self, path: &Path) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut ictx = ffmpeg_next::format::input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No image data found")?;
        let video_stream_index = stream.index();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let mut decoder = codec_ctx.decoder().video()?;

        let width = decoder.width();
        let height = decoder.height();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            packed_format(ChannelOrder::Rgb),
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let frame = decode_single_frame(&mut ictx, &mut decoder, &mut scaler, video_stream_index)?;
        self.frame = Some(frame);

        Ok(VideoMetadata {
            width,
            height,
            fps: 0.0,
            total_frames: 1,
            codec: String::new(),
            source_path: Some(path.to_path_buf()),
        })
    }

    fn frames(
        &mut self,
    ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
        if self.frame.is_none() {
            return Box::new(std::iter::once(Err("ImageFileReader: not opened".into())));
        }
        Box::new(self.frame.take().into_iter().map(Ok))
    }

    fn close(&mut self) {
        self.frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_open_returns_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);
        let mut reader = ImageFileReader::new();
        let meta = reader.open(&path).unwrap();
        assert_eq!(meta.width, 100);
        assert_eq!(meta.height, 80);
        assert_eq!(meta.fps, 0.0);
        assert_eq!(meta.total_frames, 1);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_open_nonexistent_is_error() {
        let mut reader = ImageFileReader::new();
        assert!(reader.open(Path::new("/nonexistent/test.png")).is_err());
    }

    #[test]
    fn test_frame_is_rgb() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);
        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();

        let frames: Vec<_> = reader.frames().collect();
        assert_eq!(frames.len(), 1);
        let frame = frames.into_iter().next().unwrap().unwrap();
        assert_eq!(frame.channel_order(), ChannelOrder::Rgb);
        assert_eq!(&frame.data()[..3], &[50, 100, 200]);
    }

    #[test]
    fn test_decodes_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "face.jpg", 64, 48);
        let mut reader = ImageFileReader::new();
        reader.open(&path).unwrap();
        let frame = reader.frames().next().unwrap().unwrap();
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 48);
        assert_eq!(frame.channels(), 3);
    }

    #[test]
    fn test_frames_without_open_returns_error() {
        let mut reader = ImageFileReader::new();
        assert!(reader.frames().next().unwrap().is_err());
    }
}
