//! wgpu render backend for the cloth scene.
//!
//! Draws the cloth as a wireframe line list shaded with a metal/roughness
//! BRDF, one spot light with a PCF-filtered shadow map and an ambient term.
//!
//! # Invariants
//! - Vertex data is uploaded only when the mesh is flagged dirty.
//! - Surface, depth and MSAA targets always share the surface size.
//! - A lost or outdated surface is reconfigured and the frame is skipped.

mod gpu;
mod shaders;
mod shadow;

pub use gpu::{RenderError, WgpuRenderer};
pub use shadow::ShadowMap;
