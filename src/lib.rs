//! Gridpulse is a deterministic, time-driven animated grid backdrop.
//!
//! A [`GridPattern`] covers a host [`Surface`] with a tiled grid of thin lines and keeps a
//! fixed number of highlighted squares pulsing on it. Each square fades in, fades out and
//! then jumps to a fresh random cell, forever. Time only moves when the host calls
//! [`GridPattern::advance`], so every frame is reproducible from a seed.
//!
//! # Pipeline overview
//!
//! 1. **Observe**: the [`Surface`] reports its content size; the component regenerates its
//!    cells whenever both dimensions are non-zero.
//! 2. **Animate**: a [`Timeline`] runs one mirrored [`Tween`] per attached square and reports
//!    completions tagged with the generation they were issued under.
//! 3. **Snapshot**: [`GridPattern::frame`] captures a serializable [`PatternFrame`].
//! 4. **Render** (optional): [`render_svg`] turns a frame into SVG text, [`rasterize`] into
//!    premultiplied RGBA8 pixels.
//!
//! Randomness is injectable: [`GridPattern::mount_with_rng`] accepts any [`rand::Rng`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod component;
mod config;
mod foundation;
mod grid;
mod host;
mod render;

pub use animation::ease::Ease;
pub use animation::timeline::{Completion, Timeline, TweenTarget};
pub use animation::tween::{Tween, TweenSample, TweenState};
pub use component::frame::{CellPhase, PatternFrame, SquareFrame};
pub use component::grid_pattern::{GridPattern, GridStats, TickReport};
pub use config::options::{
    BASE_CLASS, GridPatternOptions, MAX_SQUARES, Paint, RepeatDelayMode,
};
pub use foundation::core::{Bounds, CellId, Fps, Generation, GridCoord, Rect};
pub use foundation::error::{GridError, GridResult};
pub use grid::cells::{Cell, CellSet, cell_rect, random_coord};
pub use host::surface::{ObserverId, Surface};
pub use render::pipeline::{
    RenderStats, RenderThreading, capture_frame_at, capture_frames, render_frame,
    render_frames, render_frames_with_stats, write_png_sequence,
};
pub use render::raster::{FrameRGBA, rasterize, write_png};
pub use render::svg::render_svg;
