use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::detection::domain::face_detector::FaceDetector;
use crate::recognition::domain::face_embedder::FaceEmbedder;
use crate::recognition::domain::gallery::{Gallery, GalleryEntry, GalleryOutcome};
use crate::recognition::domain::multi_face_policy::MultiFacePolicy;
use crate::shared::constants::GALLERY_IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::video_reader::VideoReader;

/// Builds the gallery of known identities from a directory of reference
/// images, once, before any video frame is processed.
///
/// Every eligible image is decoded, detected and embedded. The label of each
/// entry is the image's file stem. Problems with individual images are
/// logged and skipped; problems with the directory as a whole yield
/// [`GalleryOutcome::Absent`] so the run continues with every face blurred.
pub struct BuildGalleryUseCase<'a> {
    reader: &'a mut dyn VideoReader,
    detector: &'a mut dyn FaceDetector,
    embedder: &'a mut dyn FaceEmbedder,
    policy: MultiFacePolicy,
}

impl<'a> BuildGalleryUseCase<'a> {
    pub fn new(
        reader: &'a mut dyn VideoReader,
        detector: &'a mut dyn FaceDetector,
        embedder: &'a mut dyn FaceEmbedder,
        policy: MultiFacePolicy,
    ) -> Self {
        Self {
            reader,
            detector,
            embedder,
            policy,
        }
    }

    pub fn execute(&mut self, directory: &Path) -> GalleryOutcome {
        let images = match collect_images(directory) {
            Ok(images) => images,
            Err(e) => {
                return absent(format!(
                    "Cannot read known faces directory {}: {e}",
                    directory.display()
                ))
            }
        };
        if images.is_empty() {
            return absent(format!(
                "{} contains no reference images ({} files only)",
                directory.display(),
                GALLERY_IMAGE_EXTENSIONS.join("/")
            ));
        }

        let mut entries = Vec::new();
        for path in &images {
            match self.embed_image(path) {
                Ok(mut found) => entries.append(&mut found),
                Err(e) => log::warn!("Skipping reference image {}: {e}", path.display()),
            }
        }

        if entries.is_empty() {
            return absent(format!(
                "No faces could be embedded from {} reference images",
                images.len()
            ));
        }

        let gallery = Gallery::new(entries);
        log::info!(
            "Gallery ready: {} descriptors for {} identities",
            gallery.len(),
            gallery.labels().len()
        );
        GalleryOutcome::Ready(gallery)
    }

    fn embed_image(
        &mut self,
        path: &Path,
    ) -> Result<Vec<GalleryEntry>, Box<dyn std::error::Error>> {
        let frame = self.decode(path)?;
        let regions = self.detector.detect(&frame)?;
        if regions.is_empty() {
            return Err("no face detected".into());
        }

        let selected = self.policy.select(&regions);
        if selected.is_empty() {
            return Err(format!(
                "{} faces detected and multi-face policy is {}",
                regions.len(),
                self.policy
            )
            .into());
        }
        if regions.len() > 1 {
            log::info!(
                "{}: {} faces detected, keeping {} ({})",
                path.display(),
                regions.len(),
                selected.len(),
                self.policy
            );
        }

        let descriptors = self.embedder.embed(&frame, &selected)?;
        if descriptors.len() != selected.len() {
            return Err(format!(
                "embedder returned {} descriptors for {} faces",
                descriptors.len(),
                selected.len()
            )
            .into());
        }

        let label = label_for(path);
        Ok(descriptors
            .into_iter()
            .map(|descriptor| GalleryEntry {
                label: label.clone(),
                descriptor,
            })
            .collect())
    }

    fn decode(&mut self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        self.reader.open(path)?;
        let frame = self.reader.frames().next();
        self.reader.close();
        frame.ok_or("image produced no frame")?
    }
}

fn absent(reason: String) -> GalleryOutcome {
    log::warn!("{reason}; all detected faces will be blurred");
    GalleryOutcome::Absent(reason)
}

fn label_for(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn is_gallery_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| GALLERY_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Recursively lists reference images under `dir`, sorted by path.
///
/// Symlinked directories are not descended into; symlinked image files are
/// kept.
fn collect_images(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if (!file_type.is_symlink() || path.is_file()) && is_gallery_image(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
