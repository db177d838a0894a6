use std::time::Instant;

/// Increment applied to the time uniform each frame under the stepped clock.
pub const DEFAULT_TIME_STEP: f32 = 0.01;

/// How the `iTime` uniform should advance.
///
/// * `Stepped` adds a fixed increment per rendered frame, so playback speed
///   tracks the achieved frame rate rather than wall-clock time. This is
///   the default.
/// * `Wall` reports monotonic elapsed seconds regardless of frame rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockPolicy {
    Stepped { step: f32 },
    Wall,
}

impl Default for ClockPolicy {
    fn default() -> Self {
        Self::Stepped {
            step: DEFAULT_TIME_STEP,
        }
    }
}

/// Snapshot of the time state supplied to the shader uniforms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    /// Elapsed stepped or wall-clock time in seconds.
    pub seconds: f32,
    /// Monotonic frame counter for the running session.
    pub frame_index: u64,
}

impl TimeSample {
    /// Creates a new time sample.
    pub fn new(seconds: f32, frame_index: u64) -> Self {
        Self {
            seconds,
            frame_index,
        }
    }
}

/// Abstraction over where time values originate from.
pub trait TimeSource: Send {
    /// Resets the source to its initial state.
    fn reset(&mut self);
    /// Produces a time sample for the next frame.
    fn sample(&mut self) -> TimeSample;
}

/// Time source that advances by a fixed increment per sampled frame.
#[derive(Debug, Clone, Copy)]
pub struct SteppedTimeSource {
    step: f32,
    elapsed: f32,
    frame: u64,
}

impl SteppedTimeSource {
    /// Creates a stepped source; non-positive steps fall back to the default.
    pub fn new(step: f32) -> Self {
        let step = if step > 0.0 { step } else { DEFAULT_TIME_STEP };
        Self {
            step,
            elapsed: 0.0,
            frame: 0,
        }
    }
}

impl Default for SteppedTimeSource {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}

impl TimeSource for SteppedTimeSource {
    fn reset(&mut self) {
        self.elapsed = 0.0;
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        self.elapsed += self.step;
        let sample = TimeSample::new(self.elapsed, self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Time source backed by the system monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct WallClockTimeSource {
    origin: Instant,
    frame: u64,
}

impl WallClockTimeSource {
    /// Creates a wall-clock source initialised to `Instant::now()`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for WallClockTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
            frame: 0,
        }
    }
}

impl TimeSource for WallClockTimeSource {
    fn reset(&mut self) {
        self.origin = Instant::now();
        self.frame = 0;
    }

    fn sample(&mut self) -> TimeSample {
        let sample = TimeSample::new(self.origin.elapsed().as_secs_f32(), self.frame);
        self.frame = self.frame.saturating_add(1);
        sample
    }
}

/// Convenient alias for owning time sources behind trait objects.
pub type BoxedTimeSource = Box<dyn TimeSource + Send>;

/// Builds a time source suited to the requested clock policy.
pub fn time_source_for_policy(policy: ClockPolicy) -> BoxedTimeSource {
    match policy {
        ClockPolicy::Stepped { step } => Box::new(SteppedTimeSource::new(step)),
        ClockPolicy::Wall => Box::new(WallClockTimeSource::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepped_source_advances_by_fixed_increment() {
        let mut source = SteppedTimeSource::new(0.01);
        let mut previous = 0.0_f32;
        for expected_frame in 0..100 {
            let sample = source.sample();
            assert!((sample.seconds - previous - 0.01).abs() < 1e-6);
            assert_eq!(sample.frame_index, expected_frame);
            assert!(sample.seconds > previous);
            previous = sample.seconds;
        }
    }

    #[test]
    fn stepped_source_never_resets_while_sampling() {
        let mut source = SteppedTimeSource::default();
        let first = source.sample().seconds;
        let later = (0..50).map(|_| source.sample().seconds).last().unwrap();
        assert!(later > first);
    }

    #[test]
    fn stepped_source_rejects_non_positive_step() {
        let mut source = SteppedTimeSource::new(0.0);
        let sample = source.sample();
        assert!((sample.seconds - DEFAULT_TIME_STEP).abs() < 1e-6);
    }

    #[test]
    fn reset_returns_to_origin() {
        let mut source = SteppedTimeSource::new(0.5);
        source.sample();
        source.sample();
        source.reset();
        let sample = source.sample();
        assert!((sample.seconds - 0.5).abs() < 1e-6);
        assert_eq!(sample.frame_index, 0);
    }

    #[test]
    fn wall_clock_is_monotonic() {
        let mut source = WallClockTimeSource::new();
        let first = source.sample();
        let second = source.sample();
        assert!(second.seconds >= first.seconds);
        assert_eq!(second.frame_index, first.frame_index + 1);
    }

    #[test]
    fn policy_selects_matching_source() {
        let mut stepped = time_source_for_policy(ClockPolicy::Stepped { step: 2.0 });
        assert!((stepped.sample().seconds - 2.0).abs() < 1e-6);

        let mut wall = time_source_for_policy(ClockPolicy::Wall);
        assert!(wall.sample().seconds < 1.0);
    }
}
