use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use anonymize_core::annotation::infrastructure::outline_marker::OutlineMarker;
use anonymize_core::blurring::infrastructure::cpu_rectangular_blurrer::CpuRectangularBlurrer;
use anonymize_core::detection::domain::face_detector::FaceDetector;
use anonymize_core::detection::infrastructure::detector_factory::{create_detector, DetectorKind};
use anonymize_core::detection::infrastructure::onnx_yolo_detector::DEFAULT_CONFIDENCE;
use anonymize_core::pipeline::anonymize_video_use_case::AnonymizeVideoUseCase;
use anonymize_core::pipeline::build_gallery_use_case::BuildGalleryUseCase;
use anonymize_core::pipeline::frame_analyzer::{FrameAnalyzer, Recognition, SequentialFrameAnalyzer};
use anonymize_core::pipeline::infrastructure::timeout_frame_analyzer::TimeoutFrameAnalyzer;
use anonymize_core::pipeline::input_validation::validate_paths;
use anonymize_core::pipeline::pipeline_logger::LogPipelineLogger;
use anonymize_core::pipeline::run_profiler::RunProfiler;
use anonymize_core::recognition::domain::face_embedder::FaceEmbedder;
use anonymize_core::recognition::domain::face_matcher::FaceMatcher;
use anonymize_core::recognition::domain::multi_face_policy::MultiFacePolicy;
use anonymize_core::recognition::infrastructure::lazy_face_embedder::{
    EmbedderLoader, LazyFaceEmbedder,
};
use anonymize_core::recognition::infrastructure::onnx_arcface_embedder::OnnxArcFaceEmbedder;
use anonymize_core::shared::constants::{
    DEFAULT_FRAME_TIMEOUT, DEFAULT_MATCH_THRESHOLD, MAX_FRAME_TIMEOUT,
};
use anonymize_core::video::domain::video_reader::VideoReader;
use anonymize_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use anonymize_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use anonymize_core::video::infrastructure::image_file_reader::ImageFileReader;

const PROGRESS_THROTTLE_FRAMES: usize = 100;

/// Anonymize a video by blurring unrecognized faces.
#[derive(Parser, Debug)]
#[command(name = "anonymize-vid")]
struct Cli {
    /// Path to video (.mov or .mp4).
    src: PathBuf,

    /// Path to save processed video (.mp4).
    dst: PathBuf,

    /// Directory containing JPG images of faces to not blur.
    #[arg(long)]
    known_faces_loc: Option<PathBuf>,

    /// Use the classical cascade detector instead of the neural one
    /// (faster, less accurate).
    #[arg(long)]
    use_viola_jones: bool,

    /// Frames per batch. Accepted for compatibility; frames are processed
    /// one at a time.
    #[arg(long, num_args = 0..=1, default_value_t = 1, default_missing_value = "1")]
    batch_size: usize,

    /// Print a timing summary when the run finishes.
    #[arg(long)]
    profile: bool,

    /// Maximum descriptor distance for a face to count as known.
    #[arg(long, default_value_t = DEFAULT_MATCH_THRESHOLD)]
    match_threshold: f64,

    /// Neural detector confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Per-frame analysis timeout in seconds (0 disables, at most one day).
    #[arg(long, default_value_t = DEFAULT_FRAME_TIMEOUT.as_secs_f64())]
    frame_timeout: f64,

    /// What to do with reference images showing several faces:
    /// largest, first, reject or all.
    #[arg(long, default_value = "largest")]
    multi_face_policy: MultiFacePolicy,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let profiler = cli.profile.then(RunProfiler::start);
    if cli.batch_size != 1 {
        log::info!(
            "Batch size {} requested; frames are processed one at a time",
            cli.batch_size
        );
    }

    let mut detector = create_detector(
        DetectorKind::from_flag(cli.use_viola_jones),
        cli.confidence,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let recognition = match &cli.known_faces_loc {
        Some(dir) => build_recognition(dir, detector.as_mut(), &cli)?,
        None => None,
    };

    let mut reader: Box<dyn VideoReader> = Box::new(FfmpegReader::new());
    let metadata = reader.open(&cli.src)?;
    log::info!(
        "{}: {}x{}, {} frames at {:.2} fps",
        cli.src.display(),
        metadata.width,
        metadata.height,
        metadata.total_frames,
        metadata.fps
    );

    let mut use_case = AnonymizeVideoUseCase::new(
        reader,
        Box::new(FfmpegWriter::new()),
        build_analyzer(detector, recognition, cli.frame_timeout)?,
        Box::new(CpuRectangularBlurrer::default()),
        Box::new(OutlineMarker::default()),
        Box::new(LogPipelineLogger::new(PROGRESS_THROTTLE_FRAMES)),
        profiler,
    );
    let report = use_case.execute(&metadata, &cli.dst)?;

    log::info!(
        "Output written to {} ({} frames, {} faces blurred, {} faces marked)",
        cli.dst.display(),
        report.frames_written,
        report.faces_blurred,
        report.faces_marked
    );
    if report.anomalies > 0 {
        log::warn!("{} frames had analysis anomalies", report.anomalies);
    }
    if let Some(profile) = report.profile {
        println!("\n{profile}");
    }

    Ok(())
}

fn build_recognition(
    dir: &Path,
    detector: &mut dyn FaceDetector,
    cli: &Cli,
) -> Result<Option<Recognition>, Box<dyn std::error::Error>> {
    // Only resolved once a reference image actually has a face to embed
    let loader: EmbedderLoader = Box::new(|| {
        let embedder = OnnxArcFaceEmbedder::from_cache(Some(Box::new(download_progress)))?;
        eprintln!();
        Ok(Box::new(embedder) as Box<dyn FaceEmbedder>)
    });
    let mut embedder = LazyFaceEmbedder::new(loader);

    let mut image_reader = ImageFileReader::new();
    let outcome = BuildGalleryUseCase::new(
        &mut image_reader,
        detector,
        &mut embedder,
        cli.multi_face_policy,
    )
    .execute(dir);

    let Some(gallery) = outcome.into_gallery() else {
        return Ok(None);
    };
    let matcher = FaceMatcher::new(cli.match_threshold);
    log::info!(
        "Recognizing {} known identities (match threshold {})",
        gallery.labels().len(),
        matcher.threshold()
    );
    Ok(Some(Recognition {
        embedder: Box::new(embedder),
        gallery: Arc::new(gallery),
        matcher,
    }))
}

fn build_analyzer(
    detector: Box<dyn FaceDetector>,
    recognition: Option<Recognition>,
    timeout_secs: f64,
) -> Result<Box<dyn FrameAnalyzer>, Box<dyn std::error::Error>> {
    let sequential = Box::new(SequentialFrameAnalyzer::new(detector, recognition));
    if !sequential.recognizes() {
        log::info!("No known faces loaded; every detected face will be blurred");
    }
    if timeout_secs > 0.0 {
        let timeout = Duration::try_from_secs_f64(timeout_secs)?;
        Ok(Box::new(TimeoutFrameAnalyzer::new(sequential, timeout)))
    } else {
        Ok(sequential)
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    validate_paths(&cli.src, &cli.dst)?;
    if !cli.src.exists() {
        return Err(format!("Input file not found: {}", cli.src.display()).into());
    }
    if cli.batch_size == 0 {
        return Err("Batch size must be at least 1".into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if !cli.match_threshold.is_finite() || cli.match_threshold <= 0.0 {
        return Err(format!(
            "Match threshold must be a positive number, got {}",
            cli.match_threshold
        )
        .into());
    }
    let max_timeout = MAX_FRAME_TIMEOUT.as_secs_f64();
    if !(0.0..=max_timeout).contains(&cli.frame_timeout) {
        return Err(format!(
            "Frame timeout must be between 0 and {max_timeout} seconds, got {}",
            cli.frame_timeout
        )
        .into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
