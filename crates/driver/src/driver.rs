use crate::scheduler::FrameInfo;
use crate::timer::FrameTimer;
use clothwave_common::{SceneConfig, Viewport};
use clothwave_kernel::{HeightField, MeshError, SimplexField, Wave};
use clothwave_render::{PerspectiveCamera, Renderer, Scene};
use std::time::Duration;

/// Everything a frame reads or writes, owned in one place.
#[derive(Debug)]
pub struct SceneContext<F = SimplexField> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub field: F,
    pub wave: Wave,
}

impl SceneContext<SimplexField> {
    /// Build the scene, camera and a simplex field seeded from the config.
    pub fn from_config(cfg: &SceneConfig, viewport: Viewport) -> Result<Self, MeshError> {
        Self::with_field(cfg, viewport, SimplexField::new(cfg.wave.seed))
    }
}

impl<F: HeightField> SceneContext<F> {
    pub fn with_field(cfg: &SceneConfig, viewport: Viewport, field: F) -> Result<Self, MeshError> {
        Ok(Self {
            scene: Scene::from_config(cfg)?,
            camera: PerspectiveCamera::from_config(&cfg.camera, viewport.aspect()),
            field,
            wave: Wave::from_config(&cfg.wave),
        })
    }
}

/// Advances the cloth once per frame and hands the result to a renderer.
#[derive(Debug)]
pub struct AnimationDriver<F = SimplexField> {
    context: SceneContext<F>,
    timer: FrameTimer,
    last_report: Duration,
}

const REPORT_INTERVAL: Duration = Duration::from_secs(1);

impl<F: HeightField> AnimationDriver<F> {
    pub fn new(context: SceneContext<F>) -> Self {
        Self {
            context,
            timer: FrameTimer::default(),
            last_report: Duration::ZERO,
        }
    }

    pub fn context(&self) -> &SceneContext<F> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut SceneContext<F> {
        &mut self.context
    }

    pub fn timer(&self) -> &FrameTimer {
        &self.timer
    }

    /// One animation step at `elapsed` wall-clock time.
    ///
    /// Displaces every vertex, refreshes normals and the dirty flag, updates
    /// the camera projection and submits exactly one render.
    pub fn tick<R: Renderer>(&mut self, elapsed: Duration, renderer: &mut R) -> R::Output {
        let _span = tracing::trace_span!("cloth_tick", elapsed_ms = elapsed.as_millis() as u64)
            .entered();
        let ctx = &mut self.context;

        let offset = ctx.wave.offset(elapsed);
        ctx.wave.displace(&mut ctx.scene.cloth.mesh, &ctx.field, offset);
        ctx.camera.update_projection_matrix();

        tracing::trace!(offset, "cloth displaced");
        renderer.render(&mut ctx.scene, &ctx.camera)
    }

    /// Scheduler entry point: `tick` plus frame-time bookkeeping.
    pub fn frame<R: Renderer>(&mut self, info: FrameInfo, renderer: &mut R) -> R::Output {
        if info.index > 0 {
            self.timer.record(info.delta);
        }
        if info.elapsed.saturating_sub(self.last_report) >= REPORT_INTERVAL {
            self.last_report = info.elapsed;
            tracing::debug!(
                frame = info.index,
                fps = self.timer.fps(),
                avg = ?self.timer.average(),
                max = ?self.timer.max(),
                "frame stats"
            );
        }
        self.tick(info.elapsed, renderer)
    }

    /// Apply the size delivered by a resize notification.
    ///
    /// A zero-area viewport (minimized window) keeps the previous camera aspect.
    pub fn resize<R: Renderer>(&mut self, viewport: Viewport, renderer: &mut R) {
        renderer.resize(viewport);
        if viewport.is_empty() {
            tracing::debug!(
                width = viewport.width,
                height = viewport.height,
                "zero-area viewport, camera unchanged"
            );
            return;
        }
        let camera = &mut self.context.camera;
        camera.aspect = viewport.aspect();
        camera.update_projection_matrix();
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            aspect = camera.aspect,
            "viewport resized"
        );
    }
}
