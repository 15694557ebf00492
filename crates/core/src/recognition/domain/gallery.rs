use super::descriptor::Descriptor;

/// One known identity.
#[derive(Clone, Debug, PartialEq)]
pub struct GalleryEntry {
    pub label: String,
    pub descriptor: Descriptor,
}

/// Ordered set of known identities, built once before the frame loop and
/// shared read-only afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
}

impl Gallery {
    pub fn new(entries: Vec<GalleryEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct labels in first-seen order.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !labels.contains(&entry.label.as_str()) {
                labels.push(&entry.label);
            }
        }
        labels
    }
}

/// Result of the one-time gallery build.
#[derive(Clone, Debug, PartialEq)]
pub enum GalleryOutcome {
    /// At least one reference descriptor was produced.
    Ready(Gallery),
    /// No usable gallery; every detected face will be blurred.
    Absent(String),
}

impl GalleryOutcome {
    pub fn into_gallery(self) -> Option<Gallery> {
        match self {
            GalleryOutcome::Ready(gallery) => Some(gallery),
            GalleryOutcome::Absent(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, GalleryOutcome::Ready(_))
    }
}
