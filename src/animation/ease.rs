/// Timing curve of an opacity fade, mapping linear progress to eased progress.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Constant speed.
    Linear,
    /// Starts slow and speeds up (`t^2`).
    Accelerate,
    /// Starts fast and slows down (`1 - (1 - t)^2`).
    Decelerate,
    /// Slow at both ends (`0.5 - cos(pi * t) / 2`).
    #[default]
    InOutSine,
}

impl Ease {
    /// Map progress `t` (clamped to `[0, 1]`) through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Accelerate => t * t,
            Self::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutSine => 0.5 - (std::f64::consts::PI * t).cos() / 2.0,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
