use clothwave_common::ClothConfig;
use glam::Vec3;

/// Errors from building a cloth grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeshError {
    #[error("grid needs at least one segment")]
    NoSegments,
    #[error("grid size must be positive, got {width} x {height}")]
    BadSize { width: f32, height: f32 },
}

/// A planar grid mesh in the XY plane, centered at the origin.
///
/// Vertices are stored row-major: row 0 is the top edge (`y = +height/2`),
/// and each row runs from `x = -width/2` to `x = +width/2`. Positions and
/// normals are mutated in place; `dirty` tells the GPU side to re-upload.
#[derive(Debug, Clone)]
pub struct ClothMesh {
    width: f32,
    height: f32,
    segments: u32,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<u32>,
    edges: Vec<u32>,
    dirty: bool,
}

impl ClothMesh {
    /// Build a flat `segments` x `segments` grid of the given size.
    pub fn new(width: f32, height: f32, segments: u32) -> Result<Self, MeshError> {
        if segments == 0 {
            return Err(MeshError::NoSegments);
        }
        if !(width > 0.0 && height > 0.0) {
            return Err(MeshError::BadSize { width, height });
        }

        let row = segments + 1;
        let mut positions = Vec::with_capacity((row * row) as usize);
        for iy in 0..row {
            // Fractions keep the center vertex at exactly (0, 0) for even segment counts.
            let y = height * 0.5 - (iy as f32 / segments as f32) * height;
            for ix in 0..row {
                let x = (ix as f32 / segments as f32) * width - width * 0.5;
                positions.push(Vec3::new(x, y, 0.0));
            }
        }

        let mut mesh = Self {
            width,
            height,
            segments,
            normals: vec![Vec3::Z; positions.len()],
            positions,
            triangles: grid_triangles(segments),
            edges: grid_edges(segments),
            dirty: true,
        };
        mesh.compute_vertex_normals();
        tracing::debug!(
            segments,
            vertices = mesh.vertex_count(),
            "cloth mesh created"
        );
        Ok(mesh)
    }

    pub fn from_config(cfg: &ClothConfig) -> Result<Self, MeshError> {
        Self::new(cfg.width, cfg.height, cfg.segments)
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    /// Always `(segments + 1)^2`.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Two counter-clockwise triangles per cell, facing +Z when flat.
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangles
    }

    /// Every unique triangle edge as a line list.
    pub fn edge_indices(&self) -> &[u32] {
        &self.edges
    }

    /// Row-major index of grid point `(ix, iy)`.
    pub fn index(&self, ix: u32, iy: u32) -> usize {
        (iy * (self.segments + 1) + ix) as usize
    }

    /// Index of the vertex whose planar coordinates are closest to `(x, y)`.
    pub fn nearest_index(&self, x: f32, y: f32) -> usize {
        let s = self.segments as f32;
        let fx = ((x + self.width * 0.5) / self.width * s).round();
        let fy = ((self.height * 0.5 - y) / self.height * s).round();
        let ix = fx.clamp(0.0, s) as u32;
        let iy = fy.clamp(0.0, s) as u32;
        self.index(ix, iy)
    }

    /// Overwrite every vertex's z from its fixed (x, y). Marks the mesh dirty.
    pub fn set_heights(&mut self, mut height_at: impl FnMut(f32, f32) -> f32) {
        for p in &mut self.positions {
            p.z = height_at(p.x, p.y);
        }
        self.dirty = true;
    }

    /// Area-weighted vertex normals from the current triangle positions.
    pub fn compute_vertex_normals(&mut self) {
        for n in &mut self.normals {
            *n = Vec3::ZERO;
        }
        for tri in self.triangles.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let pa = self.positions[a];
            // Unnormalized cross product: length is twice the face area.
            let face = (self.positions[b] - pa).cross(self.positions[c] - pa);
            self.normals[a] += face;
            self.normals[b] += face;
            self.normals[c] += face;
        }
        for n in &mut self.normals {
            *n = n.try_normalize().unwrap_or(Vec3::Z);
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether the mesh needed an upload and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    /// Lowest and highest z across all vertices.
    pub fn z_range(&self) -> (f32, f32) {
        self.positions
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p.z), hi.max(p.z))
            })
    }

    /// FNV-1a hash over segment count and all positions, for golden comparisons.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.segments.to_le_bytes());
        for p in &self.positions {
            mix(&mut h, &p.x.to_le_bytes());
            mix(&mut h, &p.y.to_le_bytes());
            mix(&mut h, &p.z.to_le_bytes());
        }
        h
    }
}

fn grid_triangles(segments: u32) -> Vec<u32> {
    let row = segments + 1;
    let mut indices = Vec::with_capacity((segments * segments * 6) as usize);
    for iy in 0..segments {
        for ix in 0..segments {
            let a = ix + row * iy;
            let b = ix + row * (iy + 1);
            let c = (ix + 1) + row * (iy + 1);
            let d = (ix + 1) + row * iy;
            indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
    indices
}

fn grid_edges(segments: u32) -> Vec<u32> {
    let row = segments + 1;
    let mut edges = Vec::with_capacity(((3 * segments * segments + 2 * segments) * 2) as usize);
    // Horizontal
    for iy in 0..row {
        for ix in 0..segments {
            edges.extend_from_slice(&[ix + row * iy, ix + 1 + row * iy]);
        }
    }
    // Vertical
    for iy in 0..segments {
        for ix in 0..row {
            edges.extend_from_slice(&[ix + row * iy, ix + row * (iy + 1)]);
        }
    }
    // Diagonal shared by each cell's two triangles
    for iy in 0..segments {
        for ix in 0..segments {
            edges.extend_from_slice(&[ix + row * (iy + 1), ix + 1 + row * iy]);
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_is_segments_plus_one_squared() {
        for s in [1, 2, 7, 100] {
            let mesh = ClothMesh::new(5.0, 8.0, s).unwrap();
            assert_eq!(mesh.vertex_count(), ((s + 1) * (s + 1)) as usize);
            assert_eq!(mesh.normals().len(), mesh.vertex_count());
        }
    }

    #[test]
    fn rejects_degenerate_grids() {
        assert_eq!(ClothMesh::new(5.0, 8.0, 0).unwrap_err(), MeshError::NoSegments);
        assert!(matches!(
            ClothMesh::new(0.0, 8.0, 4),
            Err(MeshError::BadSize { .. })
        ));
        assert!(matches!(
            ClothMesh::new(5.0, f32::NAN, 4),
            Err(MeshError::BadSize { .. })
        ));
    }

    #[test]
    fn layout_is_row_major_from_top_left() {
        let mesh = ClothMesh::new(4.0, 2.0, 2).unwrap();
        let p = mesh.positions();
        assert_eq!(p[0], Vec3::new(-2.0, 1.0, 0.0));
        assert_eq!(p[1], Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(p[2], Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(p[3], Vec3::new(-2.0, 0.0, 0.0));
        assert_eq!(p[8], Vec3::new(2.0, -1.0, 0.0));
    }

    #[test]
    fn center_vertex_is_at_origin() {
        let mesh = ClothMesh::new(5.0, 8.0, 100).unwrap();
        let center = mesh.index(50, 50);
        assert_eq!(mesh.positions()[center], Vec3::ZERO);
        assert_eq!(mesh.nearest_index(0.0, 0.0), center);
    }

    #[test]
    fn nearest_index_clamps_to_grid() {
        let mesh = ClothMesh::new(5.0, 8.0, 10).unwrap();
        assert_eq!(mesh.nearest_index(-100.0, 100.0), 0);
        assert_eq!(mesh.nearest_index(100.0, -100.0), mesh.vertex_count() - 1);
    }

    #[test]
    fn index_counts_match_topology() {
        let s = 6u32;
        let mesh = ClothMesh::new(5.0, 8.0, s).unwrap();
        assert_eq!(mesh.triangle_indices().len(), (s * s * 6) as usize);
        assert_eq!(mesh.edge_indices().len(), ((3 * s * s + 2 * s) * 2) as usize);
        let max = mesh.vertex_count() as u32;
        assert!(mesh.triangle_indices().iter().all(|&i| i < max));
        assert!(mesh.edge_indices().iter().all(|&i| i < max));
    }

    #[test]
    fn edges_are_unique() {
        let mesh = ClothMesh::new(1.0, 1.0, 5).unwrap();
        let mut seen = std::collections::BTreeSet::new();
        for e in mesh.edge_indices().chunks_exact(2) {
            let key = (e[0].min(e[1]), e[0].max(e[1]));
            assert!(seen.insert(key), "duplicate edge {key:?}");
        }
    }

    #[test]
    fn flat_mesh_normals_face_plus_z() {
        let mesh = ClothMesh::new(5.0, 8.0, 4).unwrap();
        assert!(mesh.normals().iter().all(|n| (*n - Vec3::Z).length() < 1e-6));
    }

    #[test]
    fn set_heights_only_changes_z() {
        let mut mesh = ClothMesh::new(5.0, 8.0, 8).unwrap();
        let before: Vec<Vec3> = mesh.positions().to_vec();
        mesh.take_dirty();
        mesh.set_heights(|x, y| x * 0.1 + y * 0.2);
        assert!(mesh.is_dirty());
        for (a, b) in before.iter().zip(mesh.positions()) {
            assert_eq!((a.x, a.y), (b.x, b.y));
            assert_eq!(b.z, b.x * 0.1 + b.y * 0.2);
        }
    }

    #[test]
    fn normals_are_unit_length_after_displacement() {
        let mut mesh = ClothMesh::new(5.0, 8.0, 12).unwrap();
        mesh.set_heights(|x, y| (x * 3.0).sin() * (y * 2.0).cos());
        mesh.compute_vertex_normals();
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn tilted_plane_normals_follow_slope() {
        let mut mesh = ClothMesh::new(2.0, 2.0, 4).unwrap();
        // z = x tilts the surface; the normal leans toward -x.
        mesh.set_heights(|x, _| x);
        mesh.compute_vertex_normals();
        let expected = Vec3::new(-1.0, 0.0, 1.0).normalize();
        for n in mesh.normals() {
            assert!((*n - expected).length() < 1e-5);
        }
    }

    #[test]
    fn take_dirty_clears_flag() {
        let mut mesh = ClothMesh::new(1.0, 1.0, 1).unwrap();
        assert!(mesh.take_dirty());
        assert!(!mesh.take_dirty());
        mesh.mark_dirty();
        assert!(mesh.is_dirty());
    }

    #[test]
    fn z_range_and_state_hash() {
        let mut a = ClothMesh::new(5.0, 8.0, 4).unwrap();
        let b = a.clone();
        assert_eq!(a.z_range(), (0.0, 0.0));
        assert_eq!(a.state_hash(), b.state_hash());

        a.set_heights(|x, _| x);
        assert_eq!(a.z_range(), (-2.5, 2.5));
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
