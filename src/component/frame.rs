use crate::{
    config::options::GridPatternOptions,
    foundation::core::{Bounds, CellId, Generation, GridCoord, Rect},
};

/// Lifecycle of one animated cell.
///
/// `Unpositioned -> FadingIn` when its element attaches, `FadingIn -> FadingOut` once the
/// fade-in has run, `FadingOut -> Relocating` on completion, then straight back to
/// `Unpositioned` with a new coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellPhase {
    /// Has a coordinate but no attached element yet.
    Unpositioned,
    /// Element attached; waiting out its stagger or rising to the peak.
    FadingIn,
    /// Falling back from the peak.
    FadingOut,
    /// Cycle finished; a new coordinate is being assigned.
    Relocating,
}

/// One square as drawn in a frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SquareFrame {
    /// Cell identity.
    pub id: CellId,
    /// Render key; changes whenever the element is recreated.
    pub key: String,
    /// Grid coordinate.
    pub coord: GridCoord,
    /// Drawn rectangle, in pattern space.
    pub rect: Rect,
    /// Current opacity.
    pub opacity: f64,
    /// Lifecycle phase.
    pub phase: CellPhase,
}

/// Everything needed to draw the component at one instant.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatternFrame {
    /// Seconds since mount.
    pub time: f64,
    /// Observed surface size.
    pub bounds: Bounds,
    /// Unique id of the tiled pattern definition.
    pub pattern_id: String,
    /// Generation of the cell collection.
    pub generation: Generation,
    /// Options the frame was drawn with.
    pub options: GridPatternOptions,
    /// One entry per cell, in id order.
    pub squares: Vec<SquareFrame>,
}

impl PatternFrame {
    /// Squares that are currently visible (opacity above zero).
    pub fn visible_squares(&self) -> impl Iterator<Item = &SquareFrame> {
        self.squares.iter().filter(|s| s.opacity > 0.0)
    }
}
