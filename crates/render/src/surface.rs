use clothwave_common::{SurfaceConfig, Viewport};

/// Backend-independent drawing-surface state: current size and options.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceState {
    viewport: Viewport,
    config: SurfaceConfig,
}

impl SurfaceState {
    pub fn new(viewport: Viewport, config: SurfaceConfig) -> Self {
        Self { viewport, config }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    /// Surface dimensions in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.viewport.width, self.viewport.height)
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.viewport.scale_factor
    }

    /// Adopt the size carried by a resize notification. Returns false if nothing changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if self.viewport == viewport {
            return false;
        }
        self.viewport = viewport;
        true
    }

    /// MSAA sample count, 1 when antialiasing is off.
    pub fn sample_count(&self) -> u32 {
        if self.config.antialias {
            self.config.msaa_samples.max(1)
        } else {
            1
        }
    }
}
