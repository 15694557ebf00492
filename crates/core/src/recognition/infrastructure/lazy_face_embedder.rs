use crate::recognition::domain::descriptor::Descriptor;
use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

pub type EmbedderLoader =
    Box<dyn FnOnce() -> Result<Box<dyn FaceEmbedder>, Box<dyn std::error::Error>> + Send>;

/// Defers building an embedder until the first face needs one.
///
/// A gallery directory without usable images then never resolves (or
/// downloads) the embedding model. The loader runs at most once; a load
/// failure is remembered and returned from every later `embed` call.
pub struct LazyFaceEmbedder {
    loader: Option<EmbedderLoader>,
    loaded: Option<Result<Box<dyn FaceEmbedder>, String>>,
}

impl LazyFaceEmbedder {
    pub fn new(loader: EmbedderLoader) -> Self {
        Self {
            loader: Some(loader),
            loaded: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.loaded, Some(Ok(_)))
    }

    fn get(&mut self) -> Result<&mut Box<dyn FaceEmbedder>, Box<dyn std::error::Error>> {
        if let Some(loader) = self.loader.take() {
            self.loaded = Some(loader().map_err(|e| e.to_string()));
        }
        match self.loaded.as_mut() {
            Some(Ok(embedder)) => Ok(embedder),
            Some(Err(message)) => Err(format!("embedder unavailable: {message}").into()),
            None => Err("embedder unavailable".into()),
        }
    }
}

impl FaceEmbedder for LazyFaceEmbedder {
    fn embed(
        &mut self,
        frame: &Frame,
        regions: &[Region],
    ) -> Result<Vec<Descriptor>, Box<dyn std::error::Error>> {
        self.get()?.embed(frame, regions)
    }
}
