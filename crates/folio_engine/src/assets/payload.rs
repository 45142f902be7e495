//! Decoded asset payloads

use crate::assets::{AssetError, ImageData};

/// Result of one asset load, as stored in the loaded item store
///
/// A failed load is still a payload: the session counts it as completed.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetPayload {
    /// Decoded texture
    Image(ImageData),
    /// Parsed glTF document
    Gltf(GltfSummary),
    /// Undecoded bytes handed to the rendering engine as-is (Draco, FBX)
    Binary {
        /// Format suffix the bytes were loaded for
        format: String,
        /// File contents
        bytes: Vec<u8>,
    },
    /// The handler could not produce data
    Failed(String),
}

impl AssetPayload {
    /// True for [`AssetPayload::Failed`]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Decoded image, if this payload is one
    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            Self::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Parsed glTF summary, if this payload is one
    pub fn as_gltf(&self) -> Option<&GltfSummary> {
        match self {
            Self::Gltf(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Structure of a glTF document, enough to wire scene objects to mesh names
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GltfSummary {
    /// Mesh names in document order (unnamed meshes are `mesh_<index>`)
    pub meshes: Vec<String>,
    /// Number of nodes
    pub node_count: usize,
    /// Number of animations
    pub animation_count: usize,
    /// Whether a binary chunk was embedded (`.glb`)
    pub has_binary_chunk: bool,
}

impl GltfSummary {
    /// Parse a `.glb` or `.gltf` document
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssetError> {
        let gltf = gltf::Gltf::from_slice(bytes)
            .map_err(|e| AssetError::LoadFailed(format!("Failed to parse glTF: {}", e)))?;

        let meshes = gltf
            .document
            .meshes()
            .map(|mesh| {
                mesh.name()
                    .map_or_else(|| format!("mesh_{}", mesh.index()), str::to_string)
            })
            .collect();

        Ok(Self {
            meshes,
            node_count: gltf.document.nodes().count(),
            animation_count: gltf.document.animations().count(),
            has_binary_chunk: gltf.blob.is_some(),
        })
    }
}
