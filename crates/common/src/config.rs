//! Scene constants.
//!
//! Everything the demo draws is fixed at compile time; these structs only
//! group the values so the binaries can print them and tests can shrink the
//! grid.

use crate::Rgb;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// The full set of scene parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    pub cloth: ClothConfig,
    pub wave: WaveConfig,
    pub camera: CameraConfig,
    pub spot_light: SpotLightConfig,
    pub ambient_light: AmbientLightConfig,
    pub surface: SurfaceConfig,
}

impl SceneConfig {
    /// Same scene with a different noise seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.wave.seed = seed;
        self
    }
}

/// Plane geometry and its material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClothConfig {
    pub width: f32,
    pub height: f32,
    pub segments: u32,
    /// Euler rotation (XYZ order) in radians.
    pub rotation: Vec3,
    pub color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Rgb,
    pub double_sided: bool,
    pub wireframe: bool,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl Default for ClothConfig {
    fn default() -> Self {
        Self {
            width: 5.0,
            height: 8.0,
            segments: 100,
            rotation: Vec3::new(-PI / 3.0, 0.0, -PI / 4.0),
            color: Rgb::from_u32(0xffaaa5),
            metalness: 0.6,
            roughness: 1.0,
            emissive: Rgb::BLACK,
            double_sided: true,
            wireframe: true,
            cast_shadow: true,
            receive_shadow: true,
        }
    }
}

/// Noise displacement parameters: `z = noise(x / scale_x, y / scale_y + elapsed_ms * speed)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    pub speed: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub seed: u32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            speed: 0.0003,
            scale_x: 6.0,
            scale_y: 12.0,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 20.0,
            near: 1.0,
            far: 1000.0,
            position: Vec3::new(0.0, 0.0, 20.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpotLightConfig {
    pub color: Rgb,
    pub intensity: f32,
    /// Distance at which the light has faded to zero.
    pub range: f32,
    /// Cone half-angle in radians.
    pub angle: f32,
    pub penumbra: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for SpotLightConfig {
    fn default() -> Self {
        Self {
            color: Rgb::from_u32(0xfdffab),
            intensity: 2.0,
            range: 1000.0,
            angle: PI / 3.0,
            penumbra: 0.0,
            position: Vec3::new(0.0, 0.0, 30.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmbientLightConfig {
    pub color: Rgb,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: Rgb::WHITE,
            intensity: 0.5,
        }
    }
}

/// Drawing-surface options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    pub clear_color: Rgb,
    pub antialias: bool,
    pub transparent: bool,
    pub shadows: bool,
    pub shadow_map_size: u32,
    pub msaa_samples: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            clear_color: Rgb::from_u32(0x5d5d5d),
            antialias: true,
            transparent: true,
            shadows: true,
            shadow_map_size: 1024,
            msaa_samples: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_scene_constants() {
        let cfg = SceneConfig::default();
        assert_eq!(cfg.cloth.segments, 100);
        assert_eq!((cfg.cloth.width, cfg.cloth.height), (5.0, 8.0));
        assert_eq!(cfg.wave.speed, 0.0003);
        assert_eq!((cfg.wave.scale_x, cfg.wave.scale_y), (6.0, 12.0));
        assert_eq!(cfg.camera.fov_degrees, 20.0);
        assert_eq!(cfg.surface.clear_color.to_string(), "#5d5d5d");
    }

    #[test]
    fn with_seed_only_touches_seed() {
        let cfg = SceneConfig::default().with_seed(9);
        assert_eq!(cfg.wave.seed, 9);
        assert_eq!(cfg.cloth, ClothConfig::default());
    }

    #[test]
    fn config_serializes_to_json() {
        let json = serde_json::to_string(&SceneConfig::default()).unwrap();
        assert!(json.contains("\"#ffaaa5\""));
        let back: SceneConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SceneConfig::default());
    }
}
