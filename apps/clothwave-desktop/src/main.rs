use anyhow::{Context, Result};
use clap::Parser;
use clothwave_common::{SceneConfig, Viewport};
use clothwave_driver::{AnimationDriver, FrameScheduler, SceneContext, TickOutcome};
use clothwave_render_wgpu::WgpuRenderer;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "clothwave-desktop", about = "Animated wireframe cloth")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Noise seed for the cloth surface
    #[arg(long, default_value_t = 0)]
    seed: u32,
}

/// Window, renderer and driver, created together once the event loop resumes.
struct Running {
    window: Arc<Window>,
    renderer: WgpuRenderer,
    driver: AnimationDriver,
}

struct ClothApp {
    config: SceneConfig,
    scheduler: FrameScheduler,
    running: Option<Running>,
    error: Option<anyhow::Error>,
}

impl ClothApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            config,
            scheduler: FrameScheduler::realtime(),
            running: None,
            error: None,
        }
    }

    fn start(&self, event_loop: &ActiveEventLoop) -> Result<Running> {
        let attrs = Window::default_attributes()
            .with_title("Clothwave")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );
        let viewport = window_viewport(&window);

        let context = SceneContext::from_config(&self.config, viewport)
            .context("failed to build cloth scene")?;
        let renderer = pollster::block_on(WgpuRenderer::new(
            window.clone(),
            viewport,
            self.config.surface.clone(),
            &context.scene,
        ))
        .context("failed to initialize renderer")?;

        Ok(Running {
            window,
            renderer,
            driver: AnimationDriver::new(context),
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(err);
        self.scheduler.token().cancel();
        event_loop.exit();
    }
}

fn window_viewport(window: &Window) -> Viewport {
    let size = window.inner_size();
    Viewport::new(size.width, size.height).with_scale_factor(window.scale_factor())
}

impl ApplicationHandler for ClothApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }
        match self.start(event_loop) {
            Ok(running) => self.running = Some(running),
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(frames = self.scheduler.frames(), "close requested");
                self.scheduler.token().cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let viewport = Viewport::new(size.width, size.height)
                    .with_scale_factor(running.window.scale_factor());
                running.driver.resize(viewport, &mut running.renderer);
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let viewport = window_viewport(&running.window);
                running.driver.resize(viewport, &mut running.renderer);
            }
            WindowEvent::RedrawRequested => {
                let Running {
                    renderer, driver, ..
                } = running;
                let outcome = self.scheduler.tick(|f| driver.frame(f, renderer));
                // Lost and outdated surfaces are recovered inside the renderer.
                if let TickOutcome::Rendered(Err(e)) = outcome {
                    self.fail(event_loop, anyhow::Error::new(e).context("frame failed"));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.scheduler.is_cancelled() {
            return;
        }
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(seed = cli.seed, "clothwave-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ClothApp::new(SceneConfig::default().with_seed(cli.seed));
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
