/// ArcFace identity embedder using ONNX Runtime.
///
/// Each region is cropped from the RGB frame, resampled to 112x112,
/// normalized to `[-1, 1]` and run through the model. Output vectors are
/// L2-normalized so Euclidean distance between two descriptors lies in
/// `[0, 2]`.
use std::path::Path;

use crate::recognition::domain::descriptor::Descriptor;
use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::shared::constants::{EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL};
use crate::shared::frame::Frame;
use crate::shared::model_resolver::{self, ProgressFn};
use crate::shared::region::Region;

use crate::detection::infrastructure::execution_provider::preferred_execution_providers;

const INPUT_SIZE: usize = 112;
const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 127.5;

pub struct OnnxArcFaceEmbedder {
    session: ort::session::Session,
}

impl OnnxArcFaceEmbedder {
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)?
            .with_inter_threads(1)?
            .with_intra_threads(intra_threads)?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;
        Ok(Self { session })
    }

    /// Resolves the ArcFace model through the model cache and loads it.
    pub fn from_cache(progress: Option<ProgressFn>) -> Result<Self, Box<dyn std::error::Error>> {
        log::info!("Resolving model: {EMBEDDING_MODEL_NAME}");
        let path =
            model_resolver::resolve(EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL, None, progress)?;
        Self::new(&path)
    }

    fn embed_one(
        &mut self,
        frame: &Frame,
        region: &Region,
    ) -> Result<Descriptor, Box<dyn std::error::Error>> {
        let tensor = preprocess(frame, region)?;
        let input_value = ort::value::Tensor::from_array(tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("ArcFace model produced no outputs".into());
        }
        let embedding_array = outputs[0].try_extract_array::<f32>()?;
        let embedding_slice = embedding_array
            .as_slice()
            .ok_or("Cannot get embedding slice")?;

        let mut embedding = embedding_slice.to_vec();
        l2_normalize(&mut embedding);
        Ok(Descriptor::new(embedding))
    }
}

impl FaceEmbedder for OnnxArcFaceEmbedder {
    fn embed(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<Vec<Descriptor>, Box<dyn std::error::Error>> {
        if regions.is_empty() {
            return Err("embed called with no regions".into());
        }
        regions
            .iter()
            .map(|region| self.embed_one(frame, region))
            .collect()
    }
}

/// Samples `region` of the frame into a 112x112 NCHW tensor (nearest
/// neighbour at pixel centres).
fn preprocess(
    frame: &Frame,
    region: &Region,
) -> Result<ndarray::Array4<f32>, Box<dyn std::error::Error>> {
    let crop = region.clamped(frame.width(), frame.height());
    if crop.is_empty() {
        return Err(format!("Region {region:?} lies outside the frame").into());
    }
    let (x0, y0) = (crop.x as usize, crop.y as usize);
    let (crop_w, crop_h) = (crop.width as usize, crop.height as usize);

    let src = frame.as_ndarray();
    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, INPUT_SIZE, INPUT_SIZE));

    for y in 0..INPUT_SIZE {
        let src_y = y0
            + (((y as f64 + 0.5) * crop_h as f64 / INPUT_SIZE as f64) as usize).min(crop_h - 1);
        for x in 0..INPUT_SIZE {
            let src_x = x0
                + (((x as f64 + 0.5) * crop_w as f64 / INPUT_SIZE as f64) as usize)
                    .min(crop_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD;
            }
        }
    }

    Ok(tensor)
}

pub fn l2_normalize(v: &mut [f32]) {
    let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
