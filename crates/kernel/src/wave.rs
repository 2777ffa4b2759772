use crate::cloth::ClothMesh;
use crate::field::HeightField;
use clothwave_common::WaveConfig;
use std::time::Duration;

/// Maps elapsed time and planar position to a cloth height.
///
/// `z = field(x / scale_x, y / scale_y + offset)` with `offset = elapsed_ms * speed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub speed: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Default for Wave {
    fn default() -> Self {
        Self::from_config(&WaveConfig::default())
    }
}

impl Wave {
    pub fn from_config(cfg: &WaveConfig) -> Self {
        Self {
            speed: cfg.speed,
            scale_x: cfg.scale_x,
            scale_y: cfg.scale_y,
        }
    }

    /// Time offset for the given elapsed wall-clock time.
    pub fn offset(&self, elapsed: Duration) -> f64 {
        elapsed.as_secs_f64() * 1000.0 * self.speed
    }

    pub fn height_at(&self, field: &impl HeightField, x: f32, y: f32, offset: f64) -> f32 {
        field.sample(x as f64 / self.scale_x, y as f64 / self.scale_y + offset) as f32
    }

    /// Rewrite every vertex height, flag the mesh for upload and refresh its normals.
    pub fn displace(&self, mesh: &mut ClothMesh, field: &impl HeightField, offset: f64) {
        mesh.set_heights(|x, y| self.height_at(field, x, y, offset));
        mesh.mark_dirty();
        mesh.compute_vertex_normals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::SimplexField;

    #[test]
    fn offset_scales_elapsed_milliseconds() {
        let wave = Wave::default();
        assert_eq!(wave.offset(Duration::ZERO), 0.0);
        assert!((wave.offset(Duration::from_millis(1000)) - 0.3).abs() < 1e-12);
        assert!((wave.offset(Duration::from_millis(10)) - 0.003).abs() < 1e-12);
    }

    #[test]
    fn zero_offset_samples_scaled_position() {
        let field = SimplexField::new(5);
        let wave = Wave::default();
        let mut mesh = ClothMesh::new(5.0, 8.0, 10).unwrap();
        wave.displace(&mut mesh, &field, 0.0);
        for p in mesh.positions() {
            let expected = field.sample(p.x as f64 / 6.0, p.y as f64 / 12.0) as f32;
            assert_eq!(p.z, expected);
        }
    }

    #[test]
    fn displacement_is_repeatable() {
        let field = SimplexField::new(5);
        let wave = Wave::default();
        let mut a = ClothMesh::new(5.0, 8.0, 16).unwrap();
        let mut b = ClothMesh::new(5.0, 8.0, 16).unwrap();
        wave.displace(&mut a, &field, 0.42);
        wave.displace(&mut b, &field, 0.42);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn displacement_keeps_planar_coordinates() {
        let field = SimplexField::new(0);
        let wave = Wave::default();
        let mut mesh = ClothMesh::new(5.0, 8.0, 20).unwrap();
        let planar: Vec<(f32, f32)> = mesh.positions().iter().map(|p| (p.x, p.y)).collect();
        for frame in 0..5 {
            wave.displace(&mut mesh, &field, frame as f64 * 0.1);
            assert_eq!(mesh.vertex_count(), 21 * 21);
            let now: Vec<(f32, f32)> = mesh.positions().iter().map(|p| (p.x, p.y)).collect();
            assert_eq!(now, planar);
        }
    }

    #[test]
    fn displacement_marks_dirty() {
        let wave = Wave::default();
        let mut mesh = ClothMesh::new(1.0, 1.0, 2).unwrap();
        mesh.take_dirty();
        wave.displace(&mut mesh, &|_: f64, _: f64| 0.25, 0.0);
        assert!(mesh.take_dirty());
        assert!(mesh.positions().iter().all(|p| p.z == 0.25));
    }

    #[test]
    fn offset_moves_along_y() {
        // A field that only depends on y shows the offset directly.
        let field = |_: f64, y: f64| y;
        let wave = Wave::default();
        assert_eq!(wave.height_at(&field, 0.0, 0.0, 0.5), 0.5);
        assert_eq!(wave.height_at(&field, 0.0, 12.0, 0.5), 1.5);
    }
}
