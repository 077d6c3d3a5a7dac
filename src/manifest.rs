//! Asset manifest
//!
//! Maps source file names to published logo names and carries the per-asset
//! overrides some artwork needs. Example:
//!
//! ```json
//! {
//!   "assets": {
//!     "430px-Lisk-logo.png": { "target": "lisk" },
//!     "avado_new.png": {
//!       "target": "avado",
//!       "keying": { "mode": "near_white", "threshold": 240 },
//!       "trim_to_content": true
//!     },
//!     "swarm.city-logo.png": { "target": "swarm-city", "crop_top_fraction": 0.7 }
//!   }
//! }
//! ```

use crate::{
    config::HexColor,
    error::{LogoError, Result},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// How the background of one asset is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum KeyingMode {
    /// Corner-sampled reference color with adaptive tolerance
    #[default]
    Corner,
    /// Key every pixel whose channels are all at or above `threshold`
    NearWhite {
        #[serde(default = "default_near_white_threshold")]
        threshold: u8,
    },
    /// Majority color of the four corners, keyed when the summed channel
    /// difference is below `threshold`
    CornerMajority {
        #[serde(default = "default_corner_majority_threshold")]
        threshold: u16,
    },
    /// Source already has a transparent background
    Skip,
}

fn default_corner_majority_threshold() -> u16 {
    30
}

fn default_near_white_threshold() -> u8 {
    240
}

/// Replace visible near-white pixels with a solid color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Recolor {
    pub threshold: u8,
    pub color: HexColor,
}

/// Overrides for a single asset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetOverrides {
    /// Output base name; defaults to the source stem without `-dark`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Keep only this fraction of the rows, from the top
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_top_fraction: Option<f64>,
    /// Crop to visible content after keying
    #[serde(default)]
    pub trim_to_content: bool,
    /// Background reference color instead of the corner sample
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<HexColor>,
    #[serde(default)]
    pub keying: KeyingMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recolor_near_white: Option<Recolor>,
    /// Keep original content polarity
    #[serde(default)]
    pub skip_normalize: bool,
}

impl AssetOverrides {
    pub fn validate(&self, source: &str) -> Result<()> {
        if let Some(target) = &self.target {
            if target.is_empty()
                || target.contains(['/', '\\'])
                || target == "."
                || target == ".."
            {
                return Err(LogoError::manifest(format!(
                    "asset '{}': target '{}' must be a plain file name",
                    source, target
                )));
            }
        }

        if let Some(fraction) = self.crop_top_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(LogoError::manifest(format!(
                    "asset '{}': crop_top_fraction {} must be in (0, 1]",
                    source, fraction
                )));
            }
        }

        Ok(())
    }
}

/// Source file name to overrides, in file-name order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub assets: BTreeMap<String, AssetOverrides>,
}

impl Manifest {
    /// Read and validate a manifest file
    ///
    /// # Errors
    /// - Manifest file cannot be read
    /// - Invalid JSON or unknown fields
    /// - Entry with an invalid target or crop fraction
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogoError::read_error("read manifest", path, &e))?;
        let manifest = Self::from_json(&content).map_err(|e| match e {
            LogoError::Manifest(msg) => {
                LogoError::manifest(format!("{}: {}", path.display(), msg))
            },
            other => other,
        })?;
        Ok(manifest)
    }

    /// Parse and validate manifest JSON
    ///
    /// # Errors
    /// - Invalid JSON or unknown fields
    /// - Entry with an invalid target or crop fraction
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self =
            serde_json::from_str(json).map_err(|e| LogoError::manifest(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        for (source, overrides) in &self.assets {
            overrides.validate(source)?;
        }
        Ok(())
    }

    /// Overrides registered for a source file name
    #[must_use]
    pub fn overrides_for(&self, file_name: &str) -> Option<&AssetOverrides> {
        self.assets.get(file_name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"{
        "assets": {
            "430px-Lisk-logo.png": { "target": "lisk" },
            "avado_new.png": {
                "target": "avado",
                "keying": { "mode": "near_white" },
                "trim_to_content": true,
                "recolor_near_white": { "threshold": 240, "color": "#3c3c3c" }
            },
            "swarm.city-logo.png": { "target": "swarm-city", "crop_top_fraction": 0.7 },
            "proxeus.jpeg": { "background": "#000000", "skip_normalize": true }
        }
    }"##;

    #[test]
    fn test_parse_sample_manifest() {
        let manifest = Manifest::from_json(SAMPLE).unwrap();
        assert_eq!(manifest.len(), 4);

        let lisk = manifest.overrides_for("430px-Lisk-logo.png").unwrap();
        assert_eq!(lisk.target.as_deref(), Some("lisk"));
        assert_eq!(lisk.keying, KeyingMode::Corner);
        assert!(!lisk.trim_to_content);

        let avado = manifest.overrides_for("avado_new.png").unwrap();
        assert_eq!(avado.keying, KeyingMode::NearWhite { threshold: 240 });
        assert!(avado.trim_to_content);
        assert_eq!(
            avado.recolor_near_white,
            Some(Recolor {
                threshold: 240,
                color: HexColor([60, 60, 60])
            })
        );

        let swarm = manifest.overrides_for("swarm.city-logo.png").unwrap();
        assert_eq!(swarm.crop_top_fraction, Some(0.7));

        let proxeus = manifest.overrides_for("proxeus.jpeg").unwrap();
        assert_eq!(proxeus.background, Some(HexColor([0, 0, 0])));
        assert!(proxeus.skip_normalize);
        assert!(proxeus.target.is_none());
    }

    #[test]
    fn test_entries_are_sorted() {
        let manifest = Manifest::from_json(SAMPLE).unwrap();
        let names: Vec<_> = manifest.assets.keys().cloned().collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{ "assets": { "a.png": { "tagret": "a" } } }"#;
        assert!(matches!(
            Manifest::from_json(json),
            Err(LogoError::Manifest(_))
        ));
    }

    #[test]
    fn test_invalid_entries_are_rejected() {
        let json = r#"{ "assets": { "a.png": { "target": "../a" } } }"#;
        assert!(Manifest::from_json(json).is_err());

        let json = r#"{ "assets": { "a.png": { "crop_top_fraction": 0.0 } } }"#;
        assert!(Manifest::from_json(json).is_err());

        let json = r#"{ "assets": { "a.png": { "background": "white" } } }"#;
        assert!(Manifest::from_json(json).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Manifest::load("/definitely/not/here/logos.json");
        assert!(matches!(result, Err(LogoError::Read(_))));
    }

    #[test]
    fn test_skip_keying_mode() {
        let json = r#"{ "assets": { "a.png": { "keying": { "mode": "skip" } } } }"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(
            manifest.overrides_for("a.png").unwrap().keying,
            KeyingMode::Skip
        );
    }

    #[test]
    fn test_corner_majority_keying_mode() {
        let json = r#"{ "assets": {
            "a.png": { "keying": { "mode": "corner_majority" } },
            "b.png": { "keying": { "mode": "corner_majority", "threshold": 45 } }
        } }"#;
        let manifest = Manifest::from_json(json).unwrap();
        assert_eq!(
            manifest.overrides_for("a.png").unwrap().keying,
            KeyingMode::CornerMajority { threshold: 30 }
        );
        assert_eq!(
            manifest.overrides_for("b.png").unwrap().keying,
            KeyingMode::CornerMajority { threshold: 45 }
        );
    }
}
