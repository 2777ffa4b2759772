use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Source of elapsed time since the animation started.
pub trait FrameClock {
    fn now(&mut self) -> Duration;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&mut self) -> Duration {
        self.start.elapsed()
    }
}

/// Deterministic clock for headless runs and tests.
///
/// Each reading returns the current time and then advances it by `step`.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Duration,
    step: Duration,
}

impl ManualClock {
    /// A clock that stays where it is until `advance` or `set` is called.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock that moves forward by `step` after every reading.
    pub fn with_step(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }

    pub fn advance(&mut self, by: Duration) {
        self.now = self.now.saturating_add(by);
    }

    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }
}

impl FrameClock for ManualClock {
    fn now(&mut self) -> Duration {
        let t = self.now;
        self.now = self.now.saturating_add(self.step);
        t
    }
}

/// Shared stop flag for a frame scheduler.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Timing handed to each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Zero-based frame number.
    pub index: u64,
    /// Time since the scheduler's clock started.
    pub elapsed: Duration,
    /// Time since the previous frame (zero for the first).
    pub delta: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome<T> {
    Rendered(T),
    Cancelled,
}

/// Runs "render one frame" once per host refresh until cancelled.
///
/// The host (a winit redraw callback, or a plain loop when headless) decides
/// when to call `tick`; the scheduler supplies the timing and the stop flag.
#[derive(Debug)]
pub struct FrameScheduler<C = SystemClock> {
    clock: C,
    token: CancellationToken,
    frame_index: u64,
    last: Option<Duration>,
}

impl FrameScheduler<SystemClock> {
    pub fn realtime() -> Self {
        Self::new(SystemClock::new())
    }
}

impl<C: FrameClock> FrameScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            token: CancellationToken::new(),
            frame_index: 0,
            last: None,
        }
    }

    /// A handle that stops this scheduler when cancelled.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Frames run so far.
    pub fn frames(&self) -> u64 {
        self.frame_index
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Run one frame unless the token has been cancelled.
    pub fn tick<T>(&mut self, frame: impl FnOnce(FrameInfo) -> T) -> TickOutcome<T> {
        if self.token.is_cancelled() {
            return TickOutcome::Cancelled;
        }
        let elapsed = self.clock.now();
        let delta = self
            .last
            .map(|prev| elapsed.saturating_sub(prev))
            .unwrap_or(Duration::ZERO);
        let info = FrameInfo {
            index: self.frame_index,
            elapsed,
            delta,
        };
        self.last = Some(elapsed);
        self.frame_index += 1;
        TickOutcome::Rendered(frame(info))
    }

    /// Run up to `max_frames` frames back to back. Returns how many ran.
    pub fn run(&mut self, max_frames: u64, mut frame: impl FnMut(FrameInfo)) -> u64 {
        let mut ran = 0;
        while ran < max_frames {
            match self.tick(&mut frame) {
                TickOutcome::Rendered(()) => ran += 1,
                TickOutcome::Cancelled => {
                    tracing::debug!(ran, "frame loop cancelled");
                    break;
                }
            }
        }
        ran
    }
}
