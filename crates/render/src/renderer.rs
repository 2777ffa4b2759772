use crate::camera::PerspectiveCamera;
use crate::scene::Scene;
use crate::surface::SurfaceState;
use clothwave_common::{SurfaceConfig, Viewport};

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads the scene through a camera and produces one frame. The
/// only scene state it touches is the cloth mesh's dirty flag, which it
/// consumes when it uploads new vertex data.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame of the scene as seen by the camera.
    fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> Self::Output;

    /// Resize the drawing surface to the given viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Current surface state.
    fn surface(&self) -> &SurfaceState;
}

/// Headless text renderer.
///
/// Produces a human-readable summary of each frame. Used by the CLI and by
/// tests that drive the animation without a display.
#[derive(Debug)]
pub struct DebugTextRenderer {
    surface: SurfaceState,
    frames: u64,
    uploads: u64,
}

impl DebugTextRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_config(viewport, SurfaceConfig::default())
    }

    pub fn with_config(viewport: Viewport, config: SurfaceConfig) -> Self {
        Self {
            surface: SurfaceState::new(viewport, config),
            frames: 0,
            uploads: 0,
        }
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames that found the mesh dirty.
    pub fn uploads(&self) -> u64 {
        self.uploads
    }
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &mut Scene, camera: &PerspectiveCamera) -> String {
        let uploaded = scene.cloth.mesh.take_dirty();
        if uploaded {
            self.uploads += 1;
        }
        self.frames += 1;

        let mesh = &scene.cloth.mesh;
        let (z_min, z_max) = mesh.z_range();
        let (w, h) = self.surface.size();
        let spot = &scene.spot_light;
        let p = camera.position;

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} ({}x{} @{:.2}x, clear={}) ===\n",
            self.frames,
            w,
            h,
            self.surface.pixel_ratio(),
            self.surface.config().clear_color
        ));
        out.push_str(&format!(
            "Cloth: vertices={} segments={} z=[{:.4}, {:.4}] uploaded={}\n",
            mesh.vertex_count(),
            mesh.segments(),
            z_min,
            z_max,
            uploaded
        ));
        out.push_str(&format!(
            "Camera: pos=({:.1}, {:.1}, {:.1}) fov={:.0} aspect={:.4}\n",
            p.x, p.y, p.z, camera.fov_degrees, camera.aspect
        ));
        out.push_str(&format!(
            "Lights: spot {} x{:.1} at ({:.1}, {:.1}, {:.1}) | ambient {} x{:.1}\n",
            spot.color,
            spot.intensity,
            spot.position.x,
            spot.position.y,
            spot.position.z,
            scene.ambient_light.color,
            scene.ambient_light.intensity
        ));

        tracing::trace!(frame = self.frames, uploaded, "debug frame rendered");
        out
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.surface.resize(viewport) {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "debug surface resized"
            );
        }
    }

    fn surface(&self) -> &SurfaceState {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clothwave_common::SceneConfig;

    fn small_scene() -> Scene {
        let mut cfg = SceneConfig::default();
        cfg.cloth.segments = 4;
        Scene::from_config(&cfg).unwrap()
    }

    #[test]
    fn debug_renderer_reports_scene() {
        let mut scene = small_scene();
        let camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::new(Viewport::new(640, 480));
        let output = renderer.render(&mut scene, &camera);

        assert!(output.contains("Frame 1 (640x480"));
        assert!(output.contains("vertices=25"));
        assert!(output.contains("clear=#5d5d5d"));
        assert!(output.contains("fov=20"));
        assert!(output.contains("spot #fdffab"));
    }

    #[test]
    fn debug_renderer_consumes_dirty_flag() {
        let mut scene = small_scene();
        let camera = PerspectiveCamera::default();
        let mut renderer = DebugTextRenderer::default();

        // Fresh meshes start dirty.
        let first = renderer.render(&mut scene, &camera);
        assert!(first.contains("uploaded=true"));
        let second = renderer.render(&mut scene, &camera);
        assert!(second.contains("uploaded=false"));

        scene.cloth.mesh.mark_dirty();
        renderer.render(&mut scene, &camera);
        assert_eq!(renderer.frames(), 3);
        assert_eq!(renderer.uploads(), 2);
    }

    #[test]
    fn resize_updates_surface() {
        let mut renderer = DebugTextRenderer::default();
        renderer.resize(Viewport::new(300, 200));
        assert_eq!(renderer.surface().size(), (300, 200));
    }
}
