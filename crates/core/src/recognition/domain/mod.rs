pub mod descriptor;
pub mod face_embedder;
pub mod face_matcher;
pub mod gallery;
pub mod multi_face_policy;
