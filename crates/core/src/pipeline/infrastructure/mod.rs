pub mod timeout_frame_analyzer;
