use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::annotation::domain::annotator::annotate_and_obscure;
use crate::annotation::domain::face_marker::FaceMarker;
use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::color_space::{self, ChannelOrder};
use crate::shared::constants::OUTPUT_FPS;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_reader::VideoReader;
use crate::video::domain::video_writer::VideoWriter;

use super::frame_analyzer::FrameAnalyzer;
use super::pipeline_logger::PipelineLogger;
use super::run_profiler::{ProfileSummary, RunProfiler};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("pipeline already executed")]
    AlreadyExecuted,
    #[error("failed to create output directory {}: {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open output {}: {message}", .path.display())]
    OpenWriter { path: PathBuf, message: String },
    #[error("failed to read frame {frame}: {message}")]
    Read { frame: usize, message: String },
    #[error("failed to obscure frame {frame}: {message}")]
    Annotate { frame: usize, message: String },
    #[error("failed to write frame {frame}: {message}")]
    Write { frame: usize, message: String },
    #[error("failed to finalize output: {0}")]
    Close(String),
}

/// What happened during one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub frames_read: usize,
    pub frames_written: usize,
    pub frames_with_faces: usize,
    pub faces_blurred: usize,
    pub faces_marked: usize,
    /// Frames whose analysis hit a recoverable problem.
    pub anomalies: usize,
    pub profile: Option<ProfileSummary>,
}

/// Orchestrates one anonymization run over an opened video.
///
/// Per frame: read, convert to RGB, analyze, blur unknown faces and mark
/// known ones, convert back to the source order, write. Every frame read is
/// written exactly once and in order. This is a single-use struct: `execute`
/// consumes the reader and writer, so calling it twice fails.
pub struct AnonymizeVideoUseCase {
    reader: Option<Box<dyn VideoReader>>,
    writer: Option<Box<dyn VideoWriter>>,
    analyzer: Box<dyn FrameAnalyzer>,
    blurrer: Box<dyn FrameBlurrer>,
    marker: Box<dyn FaceMarker>,
    logger: Box<dyn PipelineLogger>,
    profiler: Option<RunProfiler>,
}

impl AnonymizeVideoUseCase {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reader: Box<dyn VideoReader>,
        writer: Box<dyn VideoWriter>,
        analyzer: Box<dyn FrameAnalyzer>,
        blurrer: Box<dyn FrameBlurrer>,
        marker: Box<dyn FaceMarker>,
        logger: Box<dyn PipelineLogger>,
        profiler: Option<RunProfiler>,
    ) -> Self {
        Self {
            reader: Some(reader),
            writer: Some(writer),
            analyzer,
            blurrer,
            marker,
            logger,
            profiler,
        }
    }

    /// Runs the loop to end-of-stream. `metadata` is what the reader
    /// reported when it was opened.
    pub fn execute(
        &mut self,
        metadata: &VideoMetadata,
        output_path: &Path,
    ) -> Result<RunReport, PipelineError> {
        let mut reader = self.reader.take().ok_or(PipelineError::AlreadyExecuted)?;
        let mut writer = self.writer.take().ok_or(PipelineError::AlreadyExecuted)?;

        if let Err(e) = open_output(writer.as_mut(), metadata, output_path) {
            reader.close();
            return Err(e);
        }
        self.logger.info(&format!(
            "Writing {}x{} at {OUTPUT_FPS} fps to {}",
            metadata.width,
            metadata.height,
            output_path.display()
        ));

        let looped = self.run_loop(reader.as_mut(), writer.as_mut(), metadata.total_frames);
        reader.close();
        let closed = writer.close().map_err(|e| PipelineError::Close(e.to_string()));

        let mut report = match looped.and_then(|report| closed.map(|()| report)) {
            Ok(report) => report,
            Err(e) => {
                self.discard_partial_output(output_path);
                return Err(e);
            }
        };

        if report.anomalies > 0 {
            self.logger.warn(&format!(
                "{} of {} frames had analysis anomalies",
                report.anomalies, report.frames_read
            ));
        }
        report.profile = self.profiler.take().map(|p| p.summary(report.frames_read));
        Ok(report)
    }

    fn run_loop(
        &mut self,
        reader: &mut dyn VideoReader,
        writer: &mut dyn VideoWriter,
        total_frames: usize,
    ) -> Result<RunReport, PipelineError> {
        let mut report = RunReport::default();

        for item in reader.frames() {
            let mut frame = item.map_err(|e| PipelineError::Read {
                frame: report.frames_read,
                message: e.to_string(),
            })?;
            report.frames_read += 1;
            let index = frame.index();

            let source_order = frame.channel_order();
            color_space::convert(&mut frame, ChannelOrder::Rgb);

            let analysis = self.analyzer.analyze(&frame);
            if let Some(profiler) = self.profiler.as_mut() {
                profiler.record_detection(analysis.detect_time);
                if let Some(elapsed) = analysis.recognize_time {
                    profiler.record_recognition(elapsed);
                }
            }
            if let Some(anomaly) = &analysis.anomaly {
                report.anomalies += 1;
                self.logger.warn(&format!("Frame {index}: {anomaly}"));
            }
            if !analysis.regions.is_empty() {
                report.frames_with_faces += 1;
            }

            let counts = annotate_and_obscure(
                &mut frame,
                &analysis.regions,
                analysis.matches.as_deref(),
                self.blurrer.as_ref(),
                self.marker.as_ref(),
            )
            .map_err(|e| PipelineError::Annotate {
                frame: index,
                message: e.to_string(),
            })?;
            report.faces_blurred += counts.blurred;
            report.faces_marked += counts.marked;

            color_space::convert(&mut frame, source_order);
            writer.write(&frame).map_err(|e| PipelineError::Write {
                frame: index,
                message: e.to_string(),
            })?;
            report.frames_written += 1;

            self.logger.progress(report.frames_read, total_frames);
        }

        Ok(report)
    }

    /// Removes whatever the writer produced before the run failed.
    fn discard_partial_output(&mut self, output_path: &Path) {
        match fs::remove_file(output_path) {
            Ok(()) => self.logger.warn(&format!(
                "Removed incomplete output {}",
                output_path.display()
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => self.logger.warn(&format!(
                "Could not remove incomplete output {}: {e}",
                output_path.display()
            )),
        }
    }
}

/// Creates the output directory and opens the writer at the fixed output rate.
fn open_output(
    writer: &mut dyn VideoWriter,
    metadata: &VideoMetadata,
    output_path: &Path,
) -> Result<(), PipelineError> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| PipelineError::CreateOutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    writer
        .open(output_path, &metadata.with_fps(OUTPUT_FPS))
        .map_err(|e| PipelineError::OpenWriter {
            path: output_path.to_path_buf(),
            message: e.to_string(),
        })
}
