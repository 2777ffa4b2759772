//! Shared types for the clothwave workspace.
//!
//! # Invariants
//! - Scene constants live in one place (`SceneConfig::default()`).
//! - Colors are stored as sRGB and converted to linear only at shading time.

mod color;
mod config;
mod types;

pub use color::{ColorError, Rgb};
pub use config::{
    AmbientLightConfig, CameraConfig, ClothConfig, SceneConfig, SpotLightConfig, SurfaceConfig,
    WaveConfig,
};
pub use types::Viewport;

pub fn crate_info() -> &'static str {
    "clothwave-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
