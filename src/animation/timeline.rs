use crate::{
    animation::tween::{Tween, TweenSample},
    foundation::core::{CellId, Generation},
};

/// What a running tween animates: one element of one cell.
///
/// `generation` and `epoch` identify the element instance the tween was started for, so
/// a completion can be matched against the component state it was issued under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TweenTarget {
    /// Animated cell.
    pub cell: CellId,
    /// Cell collection the element belongs to.
    pub generation: Generation,
    /// Relocation count of the cell when the element was attached.
    pub epoch: u64,
}

/// A tween that ran to completion during [`Timeline::advance`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Completion {
    /// Target of the finished tween.
    pub target: TweenTarget,
    /// Timeline time at which it finished.
    pub at: f64,
}

#[derive(Clone, Debug)]
struct Running {
    target: TweenTarget,
    tween: Tween,
    started_at: f64,
    seq: u64,
}

impl Running {
    fn finishes_at(&self) -> f64 {
        self.started_at + self.tween.total_duration()
    }
}

/// Run-to-completion tween scheduler.
///
/// One tween per cell, stored in a slot indexed by the cell id: starting a tween for a
/// cell replaces whatever was running for it. Completions are reported in
/// completion-time order, ties broken by start order.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    now: f64,
    slots: Vec<Option<Running>>,
    running: usize,
    next_seq: u64,
}

impl Timeline {
    /// Empty timeline at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current timeline time in seconds.
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Number of running tweens.
    pub fn len(&self) -> usize {
        self.running
    }

    /// No tween is running.
    pub fn is_empty(&self) -> bool {
        self.running == 0
    }

    /// Start `tween` for `target` at the current time.
    pub fn start(&mut self, target: TweenTarget, tween: Tween) {
        let index = target.cell.index();
        if index >= self.slots.len() {
            self.slots.resize_with(index + 1, || None);
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        let previous = self.slots[index].replace(Running {
            target,
            tween,
            started_at: self.now,
            seq,
        });
        if previous.is_none() {
            self.running += 1;
        }
    }

    /// Drop the tween running for `cell`, if any.
    pub fn kill_cell(&mut self, cell: CellId) {
        if let Some(slot) = self.slots.get_mut(cell.index())
            && slot.take().is_some()
        {
            self.running -= 1;
        }
    }

    /// Drop every running tween.
    pub fn kill_all(&mut self) {
        self.slots.clear();
        self.running = 0;
    }

    /// Target of the tween running for `cell`.
    pub fn target_of(&self, cell: CellId) -> Option<TweenTarget> {
        self.find(cell).map(|r| r.target)
    }

    /// Sample the tween running for `cell` at the current time.
    pub fn sample(&self, cell: CellId) -> Option<TweenSample> {
        self.find(cell)
            .map(|r| r.tween.sample(self.now - r.started_at))
    }

    fn find(&self, cell: CellId) -> Option<&Running> {
        self.slots.get(cell.index())?.as_ref()
    }

    /// Move the clock forward by `dt` seconds and collect finished tweens.
    ///
    /// Negative steps are ignored. Finished tweens are removed before returning.
    pub fn advance(&mut self, dt: f64) -> Vec<Completion> {
        if dt.is_finite() && dt > 0.0 {
            self.now += dt;
        }

        let now = self.now;
        let mut done = Vec::new();
        for slot in &mut self.slots {
            if slot.as_ref().is_some_and(|r| r.finishes_at() <= now)
                && let Some(r) = slot.take()
            {
                done.push(r);
            }
        }
        self.running -= done.len();

        done.sort_by(|a, b| {
            a.finishes_at()
                .total_cmp(&b.finishes_at())
                .then(a.seq.cmp(&b.seq))
        });
        done.into_iter()
            .map(|r| Completion {
                target: r.target,
                at: r.finishes_at(),
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/timeline.rs"]
mod tests;
