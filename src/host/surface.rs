use std::collections::{BTreeMap, VecDeque};

use crate::foundation::core::Bounds;

/// Handle returned by [`Surface::observe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

/// A rendering surface whose content box can change size.
///
/// Observers receive one entry when they subscribe and one per actual size change
/// afterwards. Entries queue until the observer drains them.
#[derive(Clone, Debug, Default)]
pub struct Surface {
    content: Bounds,
    observers: BTreeMap<ObserverId, VecDeque<Bounds>>,
    next_id: u64,
}

impl Surface {
    /// A surface with the given content box.
    pub fn new(content: Bounds) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }

    /// Current content box.
    pub fn content(&self) -> Bounds {
        self.content
    }

    /// Subscribe to size changes. The current size is queued immediately.
    pub fn observe(&mut self) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.insert(id, VecDeque::from([self.content]));
        tracing::debug!(observer = id.0, "surface observer attached");
        id
    }

    /// Unsubscribe. Pending entries are dropped; unknown ids are ignored.
    pub fn unobserve(&mut self, id: ObserverId) {
        if self.observers.remove(&id).is_some() {
            tracing::debug!(observer = id.0, "surface observer detached");
        }
    }

    /// Number of live subscriptions.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Change the content box, notifying observers if the size actually changed.
    pub fn resize(&mut self, width: f64, height: f64) {
        let next = Bounds::new(width, height);
        if next == self.content {
            return;
        }
        self.content = next;
        for queue in self.observers.values_mut() {
            queue.push_back(next);
        }
        tracing::trace!(width, height, "surface resized");
    }

    /// Drain the pending entries of one observer, oldest first.
    pub fn take_entries(&mut self, id: ObserverId) -> Vec<Bounds> {
        self.observers
            .get_mut(&id)
            .map(|q| q.drain(..).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/surface.rs"]
mod tests;
