//! Embedding vectors and provider routes.

use std::fmt;

use serde::{Serialize, Serializer};

/// Numeric precision of an embedding vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Float32,
    Float64,
}

impl Precision {
    /// Stable tag reported to clients as `quantization`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Precision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Which provider computes the embedding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Embedding library linked into the gateway process.
    InProcess,
    /// Remote inference backend.
    Remote,
}

/// Static mapping from a client-visible model id to its provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderRoute {
    /// Identifier clients send in `model`.
    pub model: &'static str,
    pub provider: ProviderKind,
    /// Name the provider itself knows the model by.
    pub backend_model: &'static str,
    pub precision: Precision,
}

/// Raw vector storage, one variant per precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum VectorData {
    Float32(Vec<f32>),
    Float64(Vec<f64>),
}

impl VectorData {
    pub fn len(&self) -> usize {
        match self {
            Self::Float32(v) => v.len(),
            Self::Float64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    const fn precision(&self) -> Precision {
        match self {
            Self::Float32(_) => Precision::Float32,
            Self::Float64(_) => Precision::Float64,
        }
    }

    /// Convert to the requested precision.
    #[allow(clippy::cast_possible_truncation)]
    fn into_precision(self, precision: Precision) -> Self {
        match (self, precision) {
            (Self::Float64(v), Precision::Float32) => {
                Self::Float32(v.into_iter().map(|x| x as f32).collect())
            }
            (Self::Float32(v), Precision::Float64) => {
                Self::Float64(v.into_iter().map(f64::from).collect())
            }
            (data, _) => data,
        }
    }
}

/// An embedding produced for one request.
///
/// Immutable once built: the precision tag and dimension count always
/// describe the stored data.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingVector {
    data: VectorData,
}

impl EmbeddingVector {
    /// Wrap a vector, converting it to `precision` if needed.
    pub fn new(data: VectorData, precision: Precision) -> Self {
        Self {
            data: data.into_precision(precision),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.data.len()
    }

    pub const fn precision(&self) -> Precision {
        self.data.precision()
    }

    pub const fn data(&self) -> &VectorData {
        &self.data
    }

    pub fn into_data(self) -> VectorData {
        self.data
    }
}
