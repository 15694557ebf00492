use super::descriptor::Descriptor;
use super::gallery::{Gallery, GalleryEntry};

/// Decides whether a face descriptor belongs to a known identity.
///
/// A query matches when its distance to at least one gallery entry is
/// strictly below `threshold`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceMatcher {
    threshold: f64,
}

impl FaceMatcher {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// One flag per query, index-aligned with `queries`.
    pub fn match_all(&self, queries: &[Descriptor], gallery: &Gallery) -> Vec<bool> {
        if gallery.is_empty() {
            return vec![false; queries.len()];
        }
        queries
            .iter()
            .map(|query| match self.nearest(query, gallery) {
                Some((entry, distance)) => {
                    let known = distance < self.threshold;
                    log::debug!(
                        "nearest={} distance={distance:.4} known={known}",
                        entry.label
                    );
                    known
                }
                None => false,
            })
            .collect()
    }

    /// Closest gallery entry and its distance. Ties keep the earlier entry.
    pub fn nearest<'g>(
        &self,
        query: &Descriptor,
        gallery: &'g Gallery,
    ) -> Option<(&'g GalleryEntry, f64)> {
        let mut best: Option<(&GalleryEntry, f64)> = None;
        for entry in gallery.entries() {
            let distance = query.euclidean_distance(&entry.descriptor);
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((entry, distance)),
            }
        }
        best
    }
}
