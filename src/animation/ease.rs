use std::str::FromStr;

use crate::foundation::error::GridError;

/// Easing curve applied to each half of a square's cycle.
///
/// JSON accepts both the variant names and the `powerN.*` spellings common in web
/// animation libraries (`power1.out` is [`Ease::OutQuad`], the usual default).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Ease {
    /// Constant speed.
    #[serde(alias = "none", alias = "linear")]
    Linear,
    /// Quadratic ease-in.
    #[serde(alias = "power1.in")]
    InQuad,
    /// Quadratic ease-out.
    #[default]
    #[serde(alias = "power1.out")]
    OutQuad,
    /// Quadratic ease-in-out.
    #[serde(alias = "power1.inOut")]
    InOutQuad,
    /// Cubic ease-in.
    #[serde(alias = "power2.in")]
    InCubic,
    /// Cubic ease-out.
    #[serde(alias = "power2.out")]
    OutCubic,
    /// Cubic ease-in-out.
    #[serde(alias = "power2.inOut")]
    InOutCubic,
}

impl Ease {
    /// Every curve, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Linear,
        Self::InQuad,
        Self::OutQuad,
        Self::InOutQuad,
        Self::InCubic,
        Self::OutCubic,
        Self::InOutCubic,
    ];

    /// Map linear progress `t` in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InQuad => t * t,
            Self::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Self::InOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::InCubic => t * t * t,
            Self::OutCubic => 1.0 - (1.0 - t).powi(3),
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }

    /// Eased progress when the same curve is played backwards (yoyo half).
    pub fn apply_reversed(self, t: f64) -> f64 {
        self.apply(1.0 - t.clamp(0.0, 1.0))
    }
}

impl FromStr for Ease {
    type Err = GridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ease = match s.trim() {
            "Linear" | "linear" | "none" => Self::Linear,
            "InQuad" | "power1.in" => Self::InQuad,
            "OutQuad" | "power1.out" | "power1" => Self::OutQuad,
            "InOutQuad" | "power1.inOut" => Self::InOutQuad,
            "InCubic" | "power2.in" => Self::InCubic,
            "OutCubic" | "power2.out" | "power2" => Self::OutCubic,
            "InOutCubic" | "power2.inOut" => Self::InOutCubic,
            other => {
                return Err(GridError::validation(format!("unknown ease '{other}'")));
            }
        };
        Ok(ease)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
