use bevy::math::Vec3;

/// Exponential damping of the influence point toward the raw pointer target.
///
/// Each step covers a fixed fraction of the remaining gap, so the distance to
/// the target shrinks by `1 - factor` per step and never overshoots.
#[derive(Debug, Clone, Copy)]
pub struct TargetSmoother {
    /// Fraction of the gap covered per step, in (0, 1)
    pub factor: f32,
    /// When set, `factor` is treated as tuned for this many steps per second
    /// and rescaled by the actual frame time.
    pub reference_fps: Option<f32>,
    current: Vec3,
}

impl TargetSmoother {
    pub fn new(factor: f32, start: Vec3) -> Self {
        Self {
            factor,
            reference_fps: None,
            current: start,
        }
    }

    pub fn frame_rate_independent(mut self, reference_fps: f32) -> Self {
        self.reference_fps = Some(reference_fps);
        self
    }

    #[cfg(test)]
    pub fn current(&self) -> Vec3 {
        self.current
    }

    /// Fraction of the gap to cover for a frame lasting `dt` seconds
    pub fn step_factor(&self, dt: f32) -> f32 {
        match self.reference_fps {
            None => self.factor,
            Some(fps) => 1.0 - (1.0 - self.factor).powf(dt * fps),
        }
    }

    /// Advance one frame and return the new influence point
    pub fn step(&mut self, target: Vec3, dt: f32) -> Vec3 {
        self.current = self.current.lerp(target, self.step_factor(dt));
        self.current
    }
}
