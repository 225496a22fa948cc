use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rand::Rng;
use rayon::prelude::*;

use crate::{
    component::{frame::PatternFrame, grid_pattern::GridPattern},
    foundation::{
        core::Fps,
        error::{GridError, GridResult},
        math::fingerprint_text,
    },
    host::surface::Surface,
    render::{
        raster::{FrameRGBA, rasterize, write_png},
        svg::render_svg,
    },
};

/// Drive a mounted pattern forward at `fps` and snapshot `count` frames.
///
/// Frame `i` is captured at `i / fps` seconds after the pattern's current time; the first
/// frame is taken after a zero-length tick so pending resize entries and element
/// attachments are already applied.
#[tracing::instrument(skip(pattern, surface))]
pub fn capture_frames<R: Rng>(
    pattern: &mut GridPattern<R>,
    surface: &mut Surface,
    fps: Fps,
    count: u64,
) -> Vec<PatternFrame> {
    let dt = fps.frame_duration_secs();
    let mut out = Vec::with_capacity(count.min(4096) as usize);
    for i in 0..count {
        pattern.advance(surface, frame_step(i, dt));
        out.push(pattern.frame());
    }
    tracing::debug!(frames = out.len(), "captured pattern frames");
    out
}

/// Step a mounted pattern through frames `0..=index` at `fps` and snapshot only the last.
///
/// Equivalent to the last frame of `capture_frames(.., index + 1)` without keeping the
/// intermediate frames.
#[tracing::instrument(skip(pattern, surface))]
pub fn capture_frame_at<R: Rng>(
    pattern: &mut GridPattern<R>,
    surface: &mut Surface,
    fps: Fps,
    index: u64,
) -> PatternFrame {
    let dt = fps.frame_duration_secs();
    for i in 0..=index {
        pattern.advance(surface, frame_step(i, dt));
    }
    pattern.frame()
}

fn frame_step(i: u64, dt: f64) -> f64 {
    if i == 0 { 0.0 } else { dt }
}

/// Render one captured frame to pixels.
pub fn render_frame(frame: &PatternFrame, background: Option<[u8; 4]>) -> GridResult<FrameRGBA> {
    let svg = render_svg(frame)?;
    rasterize(&svg, background)
}

/// How [`render_frames_with_stats`] spreads work.
#[derive(Clone, Debug, Default)]
pub struct RenderThreading {
    /// Rasterize on a rayon pool instead of the calling thread.
    pub parallel: bool,
    /// Pool size; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Rasterize identical SVG output once and reuse the pixels.
    pub static_frame_elision: bool,
}

/// Counters from a batch render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames requested.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames reused from an identical earlier frame.
    pub frames_elided: u64,
}

/// Render a batch of captured frames sequentially.
pub fn render_frames(
    frames: &[PatternFrame],
    background: Option<[u8; 4]>,
) -> GridResult<Vec<FrameRGBA>> {
    render_frames_with_stats(frames, background, &RenderThreading::default()).map(|(f, _)| f)
}

/// Render a batch of captured frames, reporting how much work was skipped.
#[tracing::instrument(skip(frames), fields(frames = frames.len()))]
pub fn render_frames_with_stats(
    frames: &[PatternFrame],
    background: Option<[u8; 4]>,
    threading: &RenderThreading,
) -> GridResult<(Vec<FrameRGBA>, RenderStats)> {
    let svgs = frames.iter().map(render_svg).collect::<GridResult<Vec<_>>>()?;

    // `source[i]` is the index of the frame whose pixels frame `i` reuses.
    let mut source = Vec::with_capacity(svgs.len());
    let mut unique = Vec::new();
    if threading.static_frame_elision {
        let mut seen: HashMap<u64, usize> = HashMap::new();
        for (i, svg) in svgs.iter().enumerate() {
            let slot = *seen.entry(fingerprint_text(svg)).or_insert_with(|| {
                unique.push(i);
                unique.len() - 1
            });
            source.push(slot);
        }
    } else {
        source.extend(0..svgs.len());
        unique.extend(0..svgs.len());
    }

    let rendered = if threading.parallel {
        let pool = build_thread_pool(threading.threads)?;
        pool.install(|| {
            unique
                .par_iter()
                .map(|&i| rasterize(&svgs[i], background))
                .collect::<Vec<_>>()
        })
        .into_iter()
        .collect::<GridResult<Vec<_>>>()?
    } else {
        unique
            .iter()
            .map(|&i| rasterize(&svgs[i], background))
            .collect::<GridResult<Vec<_>>>()?
    };

    let out = source
        .iter()
        .map(|&slot| rendered[slot].clone())
        .collect::<Vec<_>>();
    let stats = RenderStats {
        frames_total: out.len() as u64,
        frames_rendered: rendered.len() as u64,
        frames_elided: (out.len() - rendered.len()) as u64,
    };
    tracing::debug!(
        rendered = stats.frames_rendered,
        elided = stats.frames_elided,
        "rendered frame batch"
    );
    Ok((out, stats))
}

/// Write frames as `<prefix>_00000.png`, `<prefix>_00001.png`, ... under `dir`.
pub fn write_png_sequence(
    frames: &[FrameRGBA],
    dir: &Path,
    prefix: &str,
) -> GridResult<Vec<PathBuf>> {
    if prefix.is_empty() || prefix.contains(['/', '\\']) {
        return Err(GridError::validation(format!(
            "png sequence prefix must be a plain file stem, got '{prefix}'"
        )));
    }
    frames
        .iter()
        .enumerate()
        .map(|(i, frame)| {
            let path = dir.join(format!("{prefix}_{i:05}.png"));
            write_png(frame, &path)?;
            Ok(path)
        })
        .collect()
}

fn build_thread_pool(threads: Option<usize>) -> GridResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(GridError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| GridError::render(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
