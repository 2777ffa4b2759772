//! Animation driver: owns the scene context and advances it once per frame.
//!
//! # Invariants
//! - One logical thread; resize and ticks never interleave.
//! - A cancelled scheduler never runs another frame.
//! - Frame output depends only on elapsed time, the seed and the viewport.

mod driver;
mod scheduler;
mod timer;

pub use driver::{AnimationDriver, SceneContext};
pub use scheduler::{
    CancellationToken, FrameClock, FrameInfo, FrameScheduler, ManualClock, SystemClock,
    TickOutcome,
};
pub use timer::FrameTimer;

pub fn crate_info() -> &'static str {
    "clothwave-driver v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("driver"));
    }
}
