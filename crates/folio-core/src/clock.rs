/// Elapsed time since the first frame and time since the previous frame, in
/// seconds. Both come from the same timestamp so damping and idle motion
/// never drift apart.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameTime {
    pub elapsed: f32,
    pub delta: f32,
}

/// Turns frame-callback timestamps (milliseconds) into [`FrameTime`]s.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    start_ms: Option<f64>,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, now_ms: f64) -> FrameTime {
        let start = *self.start_ms.get_or_insert(now_ms);
        let last = self.last_ms.replace(now_ms).unwrap_or(now_ms);
        FrameTime {
            elapsed: ((now_ms - start).max(0.0) / 1000.0) as f32,
            delta: ((now_ms - last).max(0.0) / 1000.0) as f32,
        }
    }
}
