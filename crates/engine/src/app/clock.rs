use std::time::{Duration, Instant};

const FALLBACK_MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Simulation work owed for one rendered frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FrameSteps {
    pub(crate) ticks: u32,
    /// Backlog thrown away because the per-frame tick cap was hit.
    pub(crate) dropped: Duration,
    pub(crate) frame_delta: Duration,
}

/// Fixed-timestep accumulator. Frame time is clamped before it is banked and
/// at most `max_ticks` steps are paid out per frame.
#[derive(Debug)]
pub(crate) struct FixedStepClock {
    step: Duration,
    max_frame_delta: Duration,
    max_ticks: u32,
    banked: Duration,
    last_frame: Instant,
}

impl FixedStepClock {
    pub(crate) fn new(ticks_per_second: u32, max_frame_delta: Duration, max_ticks: u32) -> Self {
        Self {
            step: Duration::from_secs_f64(1.0 / f64::from(ticks_per_second.max(1))),
            max_frame_delta: if max_frame_delta.is_zero() {
                FALLBACK_MAX_FRAME_DELTA
            } else {
                max_frame_delta
            },
            max_ticks: max_ticks.max(1),
            banked: Duration::ZERO,
            last_frame: Instant::now(),
        }
    }

    pub(crate) fn max_ticks(&self) -> u32 {
        self.max_ticks
    }

    pub(crate) fn frame(&mut self, now: Instant) -> FrameSteps {
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        self.bank(delta)
    }

    fn bank(&mut self, frame_delta: Duration) -> FrameSteps {
        self.banked += frame_delta.min(self.max_frame_delta);

        let mut ticks = 0;
        while ticks < self.max_ticks && self.banked >= self.step {
            self.banked -= self.step;
            ticks += 1;
        }
        let dropped = if self.banked >= self.step {
            std::mem::take(&mut self.banked)
        } else {
            Duration::ZERO
        };

        FrameSteps {
            ticks,
            dropped,
            frame_delta,
        }
    }
}

/// Sleeps out the rest of a frame when presenting faster than the cap.
#[derive(Debug)]
pub(crate) struct RenderPacer {
    frame_budget: Option<Duration>,
    last_present: Instant,
}

impl RenderPacer {
    /// `None` or `Some(0)` leaves rendering uncapped.
    pub(crate) fn new(max_fps: Option<u32>) -> Self {
        Self {
            frame_budget: max_fps
                .filter(|fps| *fps > 0)
                .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps))),
            last_present: Instant::now(),
        }
    }

    pub(crate) fn cap_label(&self) -> String {
        match self.frame_budget {
            Some(budget) => format!("{:.0}", 1.0 / budget.as_secs_f64()),
            None => "off".to_string(),
        }
    }

    pub(crate) fn remaining(&self, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_present);
        self.frame_budget
            .map_or(Duration::ZERO, |budget| budget.saturating_sub(elapsed))
    }

    pub(crate) fn presented(&mut self, now: Instant) {
        self.last_present = now;
    }
}
