use std::time::{Duration, Instant};

/// Loop rates averaged over one reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    pub dropped_backlog_ms: u64,
}

#[derive(Debug, Clone, Copy, Default)]
struct WindowCounts {
    frames: u32,
    ticks: u32,
    frame_time: Duration,
    dropped: Duration,
}

impl WindowCounts {
    fn rates(&self, span: Duration) -> LoopMetricsSnapshot {
        let seconds = span.as_secs_f32().max(f32::EPSILON);
        let mean_frame_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms: mean_frame_ms,
            dropped_backlog_ms: self.dropped.as_millis() as u64,
        }
    }
}

/// Collects frame and tick counts and reports them once per window.
#[derive(Debug)]
pub(crate) struct MetricsWindow {
    length: Duration,
    opened_at: Instant,
    counts: WindowCounts,
}

impl MetricsWindow {
    pub(crate) fn new(length: Duration, now: Instant) -> Self {
        Self {
            length: if length.is_zero() {
                Duration::from_secs(1)
            } else {
                length
            },
            opened_at: now,
            counts: WindowCounts::default(),
        }
    }

    pub(crate) fn length(&self) -> Duration {
        self.length
    }

    pub(crate) fn frame(&mut self, frame_time: Duration) {
        self.counts.frames += 1;
        self.counts.frame_time += frame_time;
    }

    pub(crate) fn ticks(&mut self, ticks: u32, dropped: Duration) {
        self.counts.ticks += ticks;
        self.counts.dropped += dropped;
    }

    /// Closes the window and starts a new one once `length` has passed.
    pub(crate) fn close_if_due(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let span = now.saturating_duration_since(self.opened_at);
        if span < self.length {
            return None;
        }
        let snapshot = std::mem::take(&mut self.counts).rates(span);
        self.opened_at = now;
        Some(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rates_cover_the_whole_window() {
        let start = Instant::now();
        let mut window = MetricsWindow::new(Duration::from_secs(2), start);
        for _ in 0..4 {
            window.frame(Duration::from_millis(20));
        }
        window.ticks(6, Duration::ZERO);
        window.ticks(2, Duration::from_millis(30));

        let snapshot = window
            .close_if_due(start + Duration::from_secs(2))
            .expect("window closed");

        assert!((snapshot.fps - 2.0).abs() < 1e-4);
        assert!((snapshot.tps - 4.0).abs() < 1e-4);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 1e-3);
        assert_eq!(snapshot.dropped_backlog_ms, 30);
    }

    #[test]
    fn nothing_is_reported_before_the_window_ends() {
        let start = Instant::now();
        let mut window = MetricsWindow::new(Duration::from_secs(1), start);
        window.frame(Duration::from_millis(16));

        assert_eq!(window.close_if_due(start + Duration::from_millis(999)), None);
        assert!(window.close_if_due(start + Duration::from_secs(1)).is_some());

        let empty = window
            .close_if_due(start + Duration::from_secs(2))
            .expect("second window");
        assert_eq!(empty, LoopMetricsSnapshot::default());
    }

    #[test]
    fn zero_length_uses_one_second() {
        let window = MetricsWindow::new(Duration::ZERO, Instant::now());
        assert_eq!(window.length(), Duration::from_secs(1));
    }
}
