use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous accepted frame, clamped.
    pub dt: f32,

    /// Timestamp the frame was accepted at.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Gates the host loop to a target frame rate.
///
/// [`tick`](Self::tick) accepts a frame only once at least `1 / fps` has passed since
/// the previous accepted one. Delta time is clamped so stalls (debugger, minimized
/// window) do not leak huge steps into animation.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    last: Option<Instant>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FramePacer {
    pub const DEFAULT_FPS: u32 = 60;

    /// Pacer for `fps` frames per second. Zero is treated as one.
    pub fn new(fps: u32) -> Self {
        Self::with_clamps(fps, Duration::from_micros(100), Duration::from_millis(250))
    }

    pub fn with_clamps(fps: u32, dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            interval: Duration::from_secs_f64(1.0 / fps.max(1) as f64),
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    #[inline]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Forgets the last accepted frame; the next tick is accepted immediately.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn is_due(&self, now: Instant) -> bool {
        match self.last {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Earliest instant at which the next frame is accepted.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.last.map(|last| last + self.interval)
    }

    /// Accepts a frame at `now` if one is due.
    pub fn tick(&mut self, now: Instant) -> Option<FrameTime> {
        if !self.is_due(now) {
            return None;
        }

        let elapsed = match self.last {
            Some(last) => now.saturating_duration_since(last),
            None => self.interval,
        };
        let dt = elapsed.clamp(self.dt_min, self.dt_max);
        self.last = Some(now);

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        Some(ft)
    }
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FPS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_is_accepted() {
        let mut pacer = FramePacer::new(60);
        let ft = pacer.tick(Instant::now()).unwrap();
        assert_eq!(ft.frame_index, 0);
        assert!((ft.dt - 1.0 / 60.0).abs() < 1e-4);
    }

    #[test]
    fn ticks_inside_interval_are_rejected() {
        let mut pacer = FramePacer::new(10);
        let t0 = Instant::now();
        pacer.tick(t0).unwrap();

        assert!(pacer.tick(t0 + Duration::from_millis(50)).is_none());
        let ft = pacer.tick(t0 + Duration::from_millis(100)).unwrap();
        assert_eq!(ft.frame_index, 1);
        assert!((ft.dt - 0.1).abs() < 1e-4);
        assert_eq!(pacer.next_deadline(), Some(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn long_stall_is_clamped() {
        let mut pacer = FramePacer::new(60);
        let t0 = Instant::now();
        pacer.tick(t0).unwrap();
        let ft = pacer.tick(t0 + Duration::from_secs(5)).unwrap();
        assert!((ft.dt - 0.25).abs() < 1e-6);
    }

    #[test]
    fn reset_accepts_next_tick() {
        let mut pacer = FramePacer::new(1);
        let t0 = Instant::now();
        pacer.tick(t0).unwrap();
        pacer.reset();
        assert!(pacer.tick(t0 + Duration::from_millis(1)).is_some());
    }
}
