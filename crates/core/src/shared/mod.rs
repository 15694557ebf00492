pub mod color_space;
pub mod constants;
pub mod frame;
pub mod model_resolver;
pub mod region;
pub mod video_metadata;
