use serde::{Deserialize, Serialize};

/// Drawing-surface size in physical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale_factor: 1.0,
        }
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Width over height, or 1 for a zero-area (minimized) viewport.
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    /// True when either dimension is zero, as for a minimized window.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in logical (CSS-like) pixels.
    pub fn logical_size(&self) -> (f64, f64) {
        (
            self.width as f64 / self.scale_factor,
            self.height as f64 / self.scale_factor,
        )
    }

    /// Surface-safe size: wgpu rejects zero-sized surfaces.
    pub fn clamped(&self) -> (u32, u32) {
        (self.width.max(1), self.height.max(1))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_is_width_over_height() {
        let v = Viewport::new(1600, 800);
        assert_eq!(v.aspect(), 2.0);
    }

    #[test]
    fn zero_area_viewport_has_unit_aspect() {
        let v = Viewport::new(640, 0);
        assert!(v.is_empty());
        assert_eq!(v.aspect(), 1.0);
        assert_eq!(v.clamped(), (640, 1));

        let minimized = Viewport::new(0, 0);
        assert_eq!(minimized.aspect(), 1.0);
        assert_eq!(Viewport::new(0, 480).aspect(), 1.0);
        assert!(!Viewport::new(1, 1).is_empty());
    }

    #[test]
    fn logical_size_uses_scale_factor() {
        let v = Viewport::new(2560, 1440).with_scale_factor(2.0);
        assert_eq!(v.logical_size(), (1280.0, 720.0));
    }
}
