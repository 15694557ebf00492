pub mod anonymize_video_use_case;
pub mod build_gallery_use_case;
pub mod frame_analyzer;
pub mod infrastructure;
pub mod input_validation;
pub mod pipeline_logger;
pub mod run_profiler;
