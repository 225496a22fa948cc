use std::{collections::BTreeMap, path::Path};

use anyhow::Context as _;

use crate::{
    animation::ease::Ease,
    foundation::error::{GridError, GridResult},
};

/// Default class list of the root element; `class_name` is merged after it.
pub const BASE_CLASS: &str = "pointer-events-none absolute inset-0 h-full w-full fill-gray-400/30 stroke-gray-400/30";

/// Largest `num_squares` accepted by [`GridPatternOptions::validate`]; the component
/// clamps larger counts to it.
pub const MAX_SQUARES: usize = 1_000_000;

/// How `repeat_delay` feeds into the per-cell tween.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatDelayMode {
    /// Accepted but not applied to the tween.
    #[default]
    Ignored,
    /// Applied as the pause between the fade-in and the mirrored fade-out.
    BetweenHalves,
}

/// A color plus its opacity, as written into SVG presentation attributes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Paint {
    /// Any SVG color string (`#rrggbb`, named color, `currentColor`).
    pub color: String,
    /// Opacity in `[0, 1]`.
    #[serde(default = "one")]
    pub opacity: f64,
}

impl Paint {
    /// Build a paint from a color and opacity.
    pub fn new(color: impl Into<String>, opacity: f64) -> Self {
        Self {
            color: color.into(),
            opacity,
        }
    }
}

fn one() -> f64 {
    1.0
}

// gray-400
const GRAY: &str = "#9ca3af";

/// Configuration of a [`crate::GridPattern`].
///
/// Every field is optional in JSON; missing fields take the defaults below. Values are
/// trusted: zero or negative sizes and durations produce degenerate output, never errors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridPatternOptions {
    /// Cell width in pixels.
    pub width: f64,
    /// Cell height in pixels.
    pub height: f64,
    /// Horizontal pattern offset.
    pub x: f64,
    /// Vertical pattern offset.
    pub y: f64,
    /// Dash pattern of the grid lines; empty means solid.
    pub stroke_dasharray: Vec<f64>,
    /// Number of concurrently animated cells.
    pub num_squares: usize,
    /// Peak opacity reached per cycle.
    pub max_opacity: f64,
    /// Seconds for the fade-in; the fade-out mirrors it.
    pub duration: f64,
    /// Seconds of pause between halves, see [`RepeatDelayMode`].
    pub repeat_delay: f64,
    /// Whether `repeat_delay` is applied.
    pub repeat_delay_mode: RepeatDelayMode,
    /// Per-index start delay in seconds.
    pub stagger: f64,
    /// Easing applied to each half of the cycle.
    pub ease: Ease,
    /// Opacity of a freshly attached square element.
    pub initial_opacity: f64,
    /// Extra classes merged after [`BASE_CLASS`].
    pub class_name: Option<String>,
    /// Extra attributes copied verbatim onto the root element.
    pub attributes: BTreeMap<String, String>,
    /// Paint of the grid lines.
    pub line: Paint,
    /// Paint of the pattern fill.
    pub fill: Paint,
    /// Color resolved by `currentColor` on the squares.
    pub foreground: String,
    /// Seed for the randomness source; entropy when absent.
    pub seed: Option<u64>,
}

impl Default for GridPatternOptions {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 40.0,
            x: -1.0,
            y: -1.0,
            stroke_dasharray: Vec::new(),
            num_squares: 50,
            max_opacity: 0.5,
            duration: 4.0,
            repeat_delay: 0.5,
            repeat_delay_mode: RepeatDelayMode::Ignored,
            stagger: 0.1,
            ease: Ease::OutQuad,
            initial_opacity: 0.0,
            class_name: None,
            attributes: BTreeMap::new(),
            line: Paint::new(GRAY, 0.3),
            fill: Paint::new(GRAY, 0.3),
            foreground: GRAY.to_string(),
            seed: None,
        }
    }
}

impl GridPatternOptions {
    /// Parse options from JSON text.
    pub fn from_json(s: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Read and parse a JSON options file.
    pub fn from_path(path: &Path) -> GridResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Root class list: [`BASE_CLASS`] followed by `class_name`, whitespace-normalized.
    pub fn class_list(&self) -> String {
        let mut out = String::from(BASE_CLASS);
        if let Some(extra) = &self.class_name {
            for token in extra.split_whitespace() {
                out.push(' ');
                out.push_str(token);
            }
        }
        out
    }

    /// Seconds between the start of the fade-in and the start of the fade-out.
    pub fn effective_repeat_delay(&self) -> f64 {
        match self.repeat_delay_mode {
            RepeatDelayMode::Ignored => 0.0,
            RepeatDelayMode::BetweenHalves => self.repeat_delay.max(0.0),
        }
    }

    /// Check values that only make sense when supplied by hand (CLI, config files).
    ///
    /// The component accepts anything; this is used at the edges to reject NaN and
    /// infinities that would otherwise leak into SVG text, and counts above
    /// [`MAX_SQUARES`].
    pub fn validate(&self) -> GridResult<()> {
        let finite = [
            ("width", self.width),
            ("height", self.height),
            ("x", self.x),
            ("y", self.y),
            ("max_opacity", self.max_opacity),
            ("duration", self.duration),
            ("repeat_delay", self.repeat_delay),
            ("stagger", self.stagger),
            ("initial_opacity", self.initial_opacity),
            ("line.opacity", self.line.opacity),
            ("fill.opacity", self.fill.opacity),
        ];
        for (name, v) in finite {
            if !v.is_finite() {
                return Err(GridError::validation(format!("{name} must be finite")));
            }
        }
        if self.num_squares > MAX_SQUARES {
            return Err(GridError::validation(format!(
                "num_squares {} exceeds the maximum of {MAX_SQUARES}",
                self.num_squares
            )));
        }
        if let Some(bad) = self.stroke_dasharray.iter().find(|v| !v.is_finite()) {
            return Err(GridError::validation(format!(
                "stroke_dasharray contains non-finite value {bad}"
            )));
        }
        if let Some(key) = self
            .attributes
            .keys()
            .find(|k| k.is_empty() || k.chars().any(|c| c.is_whitespace() || c == '='))
        {
            return Err(GridError::validation(format!(
                "invalid attribute name '{key}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/options.rs"]
mod tests;
