use serde::{Deserialize, Serialize};

use crate::normalize::{l2_norm, l2_normalize_in_place};

/// Tolerance used when checking that a vector has unit length.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-3;

/// Dense, L2-normalized text embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    vector: Vec<f32>,
}

impl Embedding {
    /// Build an embedding from raw model output, normalizing it to unit length.
    pub fn new(mut vector: Vec<f32>) -> Self {
        l2_normalize_in_place(&mut vector);
        Self { vector }
    }

    /// Wrap a vector the caller already normalized. No check is performed.
    pub fn from_normalized(vector: Vec<f32>) -> Self {
        Self { vector }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.vector
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Whether the Euclidean norm is 1 within [`UNIT_NORM_TOLERANCE`].
    pub fn is_normalized(&self) -> bool {
        (l2_norm(&self.vector) - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Inner product with another embedding of the same dimension.
    ///
    /// Both sides are unit vectors, so this is the cosine similarity. Returns
    /// `None` when the dimensions differ.
    pub fn dot(&self, other: &Embedding) -> Option<f32> {
        if self.vector.len() != other.vector.len() {
            return None;
        }
        Some(dot(&self.vector, &other.vector))
    }
}

/// Plain inner product over equal-length slices.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
