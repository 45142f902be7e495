//! Shade materials
//!
//! Every shaded surface uses a matcap material whose reveal-progress
//! parameter sweeps from 0 to 1 while the world is revealed.

use crate::assets::LoadedItems;

/// Matcap shades, matched against loaded `matcap<Shade>Texture` items
pub const SHADES: &[&str] = &[
    "white",
    "orangeRed",
    "orange",
    "pureRed",
    "red",
    "emeraldGreen",
    "green",
    "brown",
    "gray",
    "beige",
    "yellow",
    "metal",
    "black",
];

/// A matcap material
#[derive(Debug, Clone, PartialEq)]
pub struct ShadeMaterial {
    name: String,
    has_matcap: bool,
    reveal_progress: f32,
    revision: u64,
}

impl ShadeMaterial {
    /// Shade name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True if the matcap texture was loaded
    pub fn has_matcap(&self) -> bool {
        self.has_matcap
    }

    /// Current reveal-progress parameter
    pub fn reveal_progress(&self) -> f32 {
        self.reveal_progress
    }

    /// Number of parameter uploads so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Upload a new reveal-progress value
    pub fn set_reveal_progress(&mut self, value: f32) {
        self.reveal_progress = value;
        self.revision += 1;
    }
}

/// Material library
#[derive(Debug, Default)]
pub struct Materials {
    shades: Vec<ShadeMaterial>,
}

impl Materials {
    /// Build one shade material per known shade
    pub fn new(items: &LoadedItems) -> Self {
        let shades: Vec<ShadeMaterial> = SHADES
            .iter()
            .map(|shade| {
                let texture = matcap_texture_name(shade);
                let has_matcap = items.get(&texture).is_some_and(|payload| !payload.is_failed());
                if !has_matcap {
                    log::debug!("No matcap texture '{}', shade '{}' stays flat", texture, shade);
                }
                ShadeMaterial {
                    name: (*shade).to_string(),
                    has_matcap,
                    reveal_progress: 0.0,
                    revision: 0,
                }
            })
            .collect();

        log::debug!("Created {} shade materials", shades.len());
        Self { shades }
    }

    /// All shade materials
    pub fn shades(&self) -> &[ShadeMaterial] {
        &self.shades
    }

    /// Mutable shade materials
    pub fn shades_mut(&mut self) -> &mut [ShadeMaterial] {
        &mut self.shades
    }

    /// Shade by name
    pub fn shade(&self, name: &str) -> Option<&ShadeMaterial> {
        self.shades.iter().find(|shade| shade.name == name)
    }
}

/// Item name of a shade's matcap texture (`orangeRed` -> `matcapOrangeRedTexture`)
pub fn matcap_texture_name(shade: &str) -> String {
    let mut chars = shade.chars();
    let capitalized: String = chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default();
    format!("matcap{}Texture", capitalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_names() {
        assert_eq!(matcap_texture_name("orangeRed"), "matcapOrangeRedTexture");
        assert_eq!(matcap_texture_name("white"), "matcapWhiteTexture");
    }

    #[test]
    fn test_every_shade_starts_hidden() {
        let materials = Materials::new(&LoadedItems::default());
        assert_eq!(materials.shades().len(), SHADES.len());
        assert!(materials.shades().iter().all(|s| s.reveal_progress() == 0.0 && s.revision() == 0));
        assert!(!materials.shade("metal").unwrap().has_matcap());
    }
}
