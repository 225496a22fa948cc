use std::sync::atomic::{AtomicU64, Ordering};

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    animation::{
        timeline::{Timeline, TweenTarget},
        tween::{Tween, TweenState},
    },
    component::frame::{CellPhase, PatternFrame, SquareFrame},
    config::options::{GridPatternOptions, MAX_SQUARES},
    foundation::core::{Bounds, CellId},
    grid::cells::{CellSet, cell_rect},
    host::surface::{ObserverId, Surface},
};

static NEXT_PATTERN_ID: AtomicU64 = AtomicU64::new(0);

fn next_pattern_id() -> String {
    let n = NEXT_PATTERN_ID.fetch_add(1, Ordering::Relaxed);
    format!("gridpulse-pattern-{n}")
}

/// Counters accumulated over the lifetime of a mounted component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridStats {
    /// Full replacements of the cell collection.
    pub regenerations: u64,
    /// Single-cell relocations after a finished cycle.
    pub relocations: u64,
    /// Completions ignored because the collection or element had moved on.
    pub stale_completions: u64,
}

/// What one [`GridPattern::advance`] call did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Resize notifications that caused a regeneration.
    pub regenerations: u32,
    /// Elements attached (tweens started) before the clock moved.
    pub attached: usize,
    /// Cells relocated by completions during this tick, in completion order.
    pub relocated: Vec<CellId>,
    /// Completions ignored as stale.
    pub stale: u32,
}

/// Animated grid background: a tiled line pattern plus `num_squares` cells that fade in,
/// fade out and jump to a new random cell, forever.
///
/// The component is driven by its host: [`GridPattern::advance`] is one scheduler tick
/// (drain resize notifications, attach elements, step tweens, deliver completions), and
/// [`GridPattern::frame`] captures what should be drawn.
///
/// Randomness is injected through `R`; [`GridPattern::mount`] uses a [`StdRng`] seeded
/// from [`GridPatternOptions::seed`], or from entropy.
pub struct GridPattern<R = StdRng> {
    options: GridPatternOptions,
    pattern_id: String,
    bounds: Bounds,
    cells: CellSet,
    // Epoch of the element attached for each cell; `None` while awaiting attachment.
    attached: Vec<Option<u64>>,
    timeline: Timeline,
    rng: R,
    observer: Option<ObserverId>,
    stats: GridStats,
}

impl GridPattern<StdRng> {
    /// Mount on `surface` with the default randomness source.
    pub fn mount(options: GridPatternOptions, surface: &mut Surface) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::mount_with_rng(options, rng, surface)
    }
}

impl<R: Rng> GridPattern<R> {
    /// Mount on `surface`, drawing coordinates from `rng`.
    ///
    /// The collection starts empty; it is populated on the first tick that sees a
    /// measured surface.
    pub fn mount_with_rng(options: GridPatternOptions, rng: R, surface: &mut Surface) -> Self {
        let observer = surface.observe();
        let pattern_id = next_pattern_id();
        tracing::debug!(
            pattern_id = %pattern_id,
            num_squares = options.num_squares,
            "grid pattern mounted"
        );
        Self {
            options,
            pattern_id,
            bounds: Bounds::ZERO,
            cells: CellSet::empty(),
            attached: Vec::new(),
            timeline: Timeline::new(),
            rng,
            observer: Some(observer),
            stats: GridStats::default(),
        }
    }

    /// Tear down: unsubscribe from `surface` and drop every running tween.
    pub fn unmount(mut self, surface: &mut Surface) -> GridStats {
        if let Some(id) = self.observer.take() {
            surface.unobserve(id);
        }
        self.timeline.kill_all();
        tracing::debug!(
            pattern_id = %self.pattern_id,
            stats = ?self.stats,
            "grid pattern unmounted"
        );
        self.stats
    }

    /// Current options.
    pub fn options(&self) -> &GridPatternOptions {
        &self.options
    }

    /// Last observed surface size.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Current cell collection.
    pub fn cells(&self) -> &CellSet {
        &self.cells
    }

    /// Seconds since mount.
    pub fn time(&self) -> f64 {
        self.timeline.now()
    }

    /// Lifetime counters.
    pub fn stats(&self) -> GridStats {
        self.stats
    }

    /// Id of the tiled pattern definition, unique per mount.
    pub fn pattern_id(&self) -> &str {
        &self.pattern_id
    }

    /// Replace the whole collection with `num_squares` fresh cells, at most
    /// [`MAX_SQUARES`].
    ///
    /// In-flight tweens are dropped; every element re-attaches on the next commit.
    #[tracing::instrument(skip(self), fields(pattern_id = %self.pattern_id))]
    pub fn regenerate(&mut self) {
        let generation = self.cells.generation().next();
        let count = self.options.num_squares.min(MAX_SQUARES);
        if count < self.options.num_squares {
            tracing::warn!(
                requested = self.options.num_squares,
                count,
                "num_squares clamped"
            );
        }
        self.cells = CellSet::generate(
            &mut self.rng,
            generation,
            count,
            self.bounds,
            self.options.width,
            self.options.height,
        );
        self.timeline.kill_all();
        self.attached = vec![None; self.cells.len()];
        self.stats.regenerations += 1;
        tracing::debug!(
            generation = generation.0,
            count = self.cells.len(),
            width = self.bounds.width,
            height = self.bounds.height,
            "cells regenerated"
        );
    }

    /// Handle one resize notification. Returns whether the collection was regenerated.
    ///
    /// Bounds are always updated; regeneration only happens once both dimensions are
    /// non-zero, so a collapse to zero keeps the previous coordinates.
    pub fn on_resize(&mut self, bounds: Bounds) -> bool {
        self.bounds = bounds;
        if !bounds.is_measured() {
            tracing::trace!(
                width = bounds.width,
                height = bounds.height,
                "unmeasured bounds"
            );
            return false;
        }
        self.regenerate();
        true
    }

    /// Change the requested cell count. A different count regenerates (once measured).
    pub fn set_num_squares(&mut self, count: usize) {
        if count == self.options.num_squares {
            return;
        }
        self.options.num_squares = count;
        if self.bounds.is_measured() {
            self.regenerate();
        }
    }

    /// Replace the options.
    ///
    /// Only a count change triggers regeneration. Tween settings apply to tweens started
    /// afterwards; cosmetic settings apply to the next frame.
    pub fn set_options(&mut self, options: GridPatternOptions) {
        let count = options.num_squares;
        let seed = self.options.seed;
        self.options = GridPatternOptions {
            num_squares: self.options.num_squares,
            seed,
            ..options
        };
        self.set_num_squares(count);
    }

    fn cycle_tween(&self, index: usize) -> Tween {
        Tween {
            repeat_delay: self.options.effective_repeat_delay(),
            ..Tween::mirrored(
                self.options.initial_opacity,
                self.options.max_opacity,
                self.options.duration,
                index as f64 * self.options.stagger,
                self.options.ease,
            )
        }
    }

    /// Attach every element whose cell has no element for its current epoch, starting
    /// its cycle tween at the current time. Returns how many were attached.
    pub fn commit(&mut self) -> usize {
        let generation = self.cells.generation();
        let mut count = 0;
        for (index, cell) in self.cells.cells().iter().enumerate() {
            let Some(slot) = self.attached.get(index) else {
                continue;
            };
            if *slot == Some(cell.epoch) {
                continue;
            }
            let target = TweenTarget {
                cell: cell.id,
                generation,
                epoch: cell.epoch,
            };
            let tween = self.cycle_tween(index);
            self.timeline.start(target, tween);
            if let Some(slot) = self.attached.get_mut(index) {
                *slot = Some(cell.epoch);
            }
            count += 1;
        }
        count
    }

    /// Completion callback of a cell's cycle tween.
    ///
    /// Relocates the cell and detaches its element so the next commit restarts the cycle.
    /// Completions issued for an older generation or a replaced element are ignored.
    pub fn complete(&mut self, target: TweenTarget) -> bool {
        let current_epoch = self.cells.get(target.cell).map(|c| c.epoch);
        if target.generation != self.cells.generation() || current_epoch != Some(target.epoch) {
            self.stats.stale_completions += 1;
            tracing::debug!(
                cell = target.cell.0,
                issued_under = target.generation.0,
                current = self.cells.generation().0,
                "stale completion ignored"
            );
            return false;
        }

        let moved = self.cells.relocate(
            &mut self.rng,
            target.cell,
            target.generation,
            self.bounds,
            self.options.width,
            self.options.height,
        );
        let Some(cell) = moved else {
            return false;
        };
        if let Some(slot) = self.attached.get_mut(cell.id.index()) {
            *slot = None;
        }
        self.stats.relocations += 1;
        tracing::trace!(
            cell = cell.id.0,
            column = cell.coord.column,
            row = cell.coord.row,
            epoch = cell.epoch,
            "cell relocated"
        );
        true
    }

    /// One host tick of `dt` seconds.
    pub fn advance(&mut self, surface: &mut Surface, dt: f64) -> TickReport {
        let mut report = TickReport::default();

        if let Some(id) = self.observer {
            for bounds in surface.take_entries(id) {
                if self.on_resize(bounds) {
                    report.regenerations += 1;
                }
            }
        }

        report.attached = self.commit();

        for done in self.timeline.advance(dt) {
            if self.complete(done.target) {
                report.relocated.push(done.target.cell);
            } else {
                report.stale += 1;
            }
        }
        report
    }

    /// Lifecycle phase of a cell, `None` for unknown ids.
    pub fn phase(&self, id: CellId) -> Option<CellPhase> {
        let cell = self.cells.get(id)?;
        let attached = self.attached.get(id.index()).copied().flatten();
        if attached != Some(cell.epoch) {
            return Some(CellPhase::Unpositioned);
        }
        let phase = match self.timeline.sample(id).map(|s| s.state) {
            Some(TweenState::Delayed) => CellPhase::FadingIn,
            Some(TweenState::Active { reversed, .. }) => {
                if reversed {
                    CellPhase::FadingOut
                } else {
                    CellPhase::FadingIn
                }
            }
            Some(TweenState::Complete) | None => CellPhase::Relocating,
        };
        Some(phase)
    }

    fn opacity_of(&self, id: CellId) -> f64 {
        self.timeline
            .sample(id)
            .filter(|_| self.phase(id) != Some(CellPhase::Unpositioned))
            .map_or(self.options.initial_opacity, |s| s.value)
    }

    /// Capture what should be drawn right now.
    pub fn frame(&self) -> PatternFrame {
        let squares = self
            .cells
            .cells()
            .iter()
            .enumerate()
            .map(|(index, cell)| SquareFrame {
                id: cell.id,
                key: format!(
                    "{}-{}-{}-{}",
                    cell.coord.column, cell.coord.row, index, cell.epoch
                ),
                coord: cell.coord,
                rect: cell_rect(cell.coord, self.options.width, self.options.height),
                opacity: self.opacity_of(cell.id),
                phase: self.phase(cell.id).unwrap_or(CellPhase::Unpositioned),
            })
            .collect();

        PatternFrame {
            time: self.timeline.now(),
            bounds: self.bounds,
            pattern_id: self.pattern_id.clone(),
            generation: self.cells.generation(),
            options: self.options.clone(),
            squares,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/component/grid_pattern.rs"]
mod tests;
