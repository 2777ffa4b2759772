//! Rendering Adapter: renderer-agnostic scene, camera and surface state.
//!
//! # Invariants
//! - The scene holds exactly one cloth object, one spot light and one ambient light.
//! - Renderers only read the scene, apart from consuming the mesh's dirty flag.
//! - Camera projection is a pure function of fov, aspect, near and far.
//!
//! A text renderer implements the same trait as the GPU backend so the whole
//! frame pipeline runs without a display.

mod camera;
mod renderer;
mod scene;
mod surface;

pub use camera::PerspectiveCamera;
pub use renderer::{DebugTextRenderer, Renderer};
pub use scene::{AmbientLight, ClothObject, PhysicalMaterial, Scene, Side, SpotLight};
pub use surface::SurfaceState;

pub fn crate_info() -> &'static str {
    "clothwave-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
