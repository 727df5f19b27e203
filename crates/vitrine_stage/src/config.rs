//! Transition target configuration
//!
//! Screens describe where their objects and camera should sit via partial
//! pose configs: only the channels a config names are touched, so a screen
//! can reposition a shared object without disturbing its scale. Configs are
//! plain data and serde-serializable, so presentations can keep their
//! transition targets in data files.

use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Partial pose override for one object on one screen
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseConfig {
    /// Target position, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Target scale, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<Vec3>,
    /// Target orientation, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
}

impl PoseConfig {
    /// Empty config (touches nothing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target position (builder)
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the target scale (builder)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set the target orientation (builder)
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }
}

/// Per-screen target pose for a shared object
///
/// The base config applies to every transition; entries in `per_character`
/// take precedence when the transition runs with that active character.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SharedObjectConfig {
    /// Default target pose
    #[serde(flatten)]
    pub base: PoseConfig,
    /// Character-specific target poses, keyed by character name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub per_character: IndexMap<String, PoseConfig>,
}

impl SharedObjectConfig {
    /// Config that applies the given pose for every character
    pub fn new(base: PoseConfig) -> Self {
        Self {
            base,
            per_character: IndexMap::new(),
        }
    }

    /// Add a character-specific override (builder)
    pub fn with_character(mut self, character: impl Into<String>, config: PoseConfig) -> Self {
        self.per_character.insert(character.into(), config);
        self
    }

    /// Resolve the config for a transition's active character
    pub fn for_character(&self, character: Option<&str>) -> &PoseConfig {
        character
            .and_then(|name| self.per_character.get(name))
            .unwrap_or(&self.base)
    }
}

/// Per-screen camera framing
///
/// Unlike shared-object configs the camera config is never keyed by
/// character; every screen frames its content one way.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Target camera position, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Vec3>,
    /// Target camera orientation, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<Quat>,
    /// Target field of view in radians, when configured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fov: Option<f32>,
}

impl CameraConfig {
    /// Empty config (camera holds its pose)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target position (builder)
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = Some(position);
        self
    }

    /// Set the target orientation (builder)
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = Some(rotation);
        self
    }

    /// Set the target field of view (builder)
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = Some(fov);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_resolution() {
        let config = SharedObjectConfig::new(PoseConfig::new().with_scale(Vec3::ONE))
            .with_character("narrator", PoseConfig::new().with_scale(Vec3::splat(2.0)));

        assert_eq!(config.for_character(None).scale, Some(Vec3::ONE));
        assert_eq!(
            config.for_character(Some("narrator")).scale,
            Some(Vec3::splat(2.0))
        );
        // Unknown characters fall back to the base config.
        assert_eq!(config.for_character(Some("extra")).scale, Some(Vec3::ONE));
    }

    #[test]
    fn test_config_round_trip() {
        let config = SharedObjectConfig::new(
            PoseConfig::new()
                .with_position(Vec3::new(1.0, 2.0, 3.0))
                .with_scale(Vec3::splat(0.5)),
        )
        .with_character("guide", PoseConfig::new().with_position(Vec3::X));

        let json = serde_json::to_string(&config).unwrap();
        let parsed: SharedObjectConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.base, config.base);
        assert_eq!(parsed.per_character.len(), 1);
        assert_eq!(
            parsed.for_character(Some("guide")).position,
            Some(Vec3::X)
        );
    }

    #[test]
    fn test_partial_config_omits_unset_channels() {
        let json = serde_json::to_string(&PoseConfig::new().with_scale(Vec3::ONE)).unwrap();
        assert!(!json.contains("position"));
        assert!(!json.contains("rotation"));
    }
}
