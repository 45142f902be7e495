//! Asset descriptors and the startup manifest

use crate::assets::AssetError;
use crate::config::parse_by_extension;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Named pointer to a loadable asset
///
/// The format suffix is the trailing run of lowercase ASCII letters after the
/// last `.` in the source; `"car.glb"` has suffix `glb`, `"car.GLB"` has none.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetDescriptor {
    name: String,
    source: String,
}

impl AssetDescriptor {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Unique key used in the loaded item store
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Locator of the asset, relative to the loader's asset root
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Format suffix used to pick a handler
    pub fn suffix(&self) -> Option<&str> {
        let (_, suffix) = self.source.rsplit_once('.')?;
        let valid = !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_lowercase());
        valid.then_some(suffix)
    }
}

/// Static list of assets requested at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetManifest {
    /// Descriptors in submission order
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
}

impl AssetManifest {
    /// Load a manifest from a `.ron` or `.toml` file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let manifest: Self = parse_by_extension(path, &contents)?;
        log::info!(
            "Loaded manifest {} with {} asset(s)",
            path.display(),
            manifest.assets.len()
        );
        Ok(manifest)
    }

    /// Number of descriptors
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// True when the manifest lists nothing
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_extraction() {
        assert_eq!(AssetDescriptor::new("a", "models/car.glb").suffix(), Some("glb"));
        assert_eq!(AssetDescriptor::new("a", "textures/v1.2/matcap.png").suffix(), Some("png"));
        assert_eq!(AssetDescriptor::new("a", "README").suffix(), None);
        assert_eq!(AssetDescriptor::new("a", "trailing.").suffix(), None);
        assert_eq!(AssetDescriptor::new("a", "upper.PNG").suffix(), None);
        assert_eq!(AssetDescriptor::new("a", "digits.mp4").suffix(), None);
    }

    #[test]
    fn test_manifest_from_ron_and_toml() {
        let dir = tempfile::tempdir().unwrap();

        let ron_path = dir.path().join("manifest.ron");
        std::fs::write(
            &ron_path,
            r#"(assets: [(name: "a", source: "a.png"), (name: "b", source: "b.glb")])"#,
        )
        .unwrap();
        let from_ron = AssetManifest::load(&ron_path).unwrap();

        let toml_path = dir.path().join("manifest.toml");
        std::fs::write(
            &toml_path,
            "[[assets]]\nname = \"a\"\nsource = \"a.png\"\n\n[[assets]]\nname = \"b\"\nsource = \"b.glb\"\n",
        )
        .unwrap();
        let from_toml = AssetManifest::load(&toml_path).unwrap();

        assert_eq!(from_ron, from_toml);
        assert_eq!(from_ron.len(), 2);
        assert_eq!(from_ron.assets[1].name(), "b");
    }

    #[test]
    fn test_manifest_missing_file() {
        let result = AssetManifest::load("definitely/not/here.ron");
        assert!(matches!(result, Err(AssetError::Io(_))));
    }
}
