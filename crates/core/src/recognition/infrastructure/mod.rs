pub mod lazy_face_embedder;
pub mod onnx_arcface_embedder;
