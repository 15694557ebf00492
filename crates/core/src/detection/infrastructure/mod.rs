pub mod detector_factory;
pub mod execution_provider;
pub mod onnx_yolo_detector;
pub mod rustface_detector;
