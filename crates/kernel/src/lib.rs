//! Cloth kernel: grid geometry, noise field, per-frame wave displacement.
//!
//! # Invariants
//! - Vertex count and topology are fixed once a mesh is built.
//! - Only z and the derived normals change between frames.
//! - A noise field never reseeds; equal inputs give equal heights.

pub mod cloth;
pub mod field;
pub mod wave;

pub use cloth::{ClothMesh, MeshError};
pub use field::{HeightField, SimplexField};
pub use wave::Wave;

pub fn crate_info() -> &'static str {
    "clothwave-kernel v0.1.0"
}
