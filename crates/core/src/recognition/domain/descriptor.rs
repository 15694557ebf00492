/// Fixed-length identity vector for one face.
///
/// Descriptors are only ever compared through [`Descriptor::euclidean_distance`].
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor(Vec<f32>);

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// L2 distance. Descriptors of different lengths come from different
    /// embedding spaces and are infinitely far apart.
    pub fn euclidean_distance(&self, other: &Descriptor) -> f64 {
        if self.0.len() != other.0.len() {
            return f64::INFINITY;
        }
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| {
                let d = *a as f64 - *b as f64;
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self::new(values)
    }
}
