//! Deadline-keyed deferred actions.
//!
//! Gameplay that happens "a moment later" (knockback after a hit lands, a
//! speed boost wearing off, a hazard's cleanup) is queued as data on the
//! entity it affects and drained by the owning system once per fixed tick.
//! Deadlines are absolute times on the fixed clock (`Time::elapsed_secs`), so
//! an action never fires before its deadline and fires on the first tick at
//! or after it.

use bevy::prelude::*;

#[derive(Component, Debug, Clone, PartialEq)]
pub struct DeferredQueue<A> {
    pending: Vec<(f32, A)>,
}

impl<A> Default for DeferredQueue<A> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<A> DeferredQueue<A> {
    pub fn schedule(&mut self, deadline: f32, action: A) {
        self.pending.push((deadline, action));
    }

    /// Remove and return every action due at `now`, earliest deadline first.
    ///
    /// Actions sharing a deadline come out in the order they were scheduled.
    pub fn drain_due(&mut self, now: f32) -> Vec<A> {
        let mut due: Vec<(f32, A)> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, action)| action).collect()
    }

    /// Drop every pending action matching `predicate`.
    pub fn cancel(&mut self, predicate: impl Fn(&A) -> bool) {
        self.pending.retain(|(_, action)| !predicate(action));
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nothing_fires_before_deadline() {
        let mut q = DeferredQueue::default();
        q.schedule(1.0, "knockback");
        assert!(q.drain_due(0.99).is_empty());
        assert_eq!(q.drain_due(1.0), vec!["knockback"]);
        assert!(q.is_empty());
    }

    #[test]
    fn due_actions_come_out_in_deadline_order() {
        let mut q = DeferredQueue::default();
        q.schedule(0.5, 2);
        q.schedule(0.2, 1);
        q.schedule(0.5, 3);
        q.schedule(9.0, 4);
        assert_eq!(q.drain_due(1.0), vec![1, 2, 3]);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn cancel_drops_matching_actions() {
        let mut q = DeferredQueue::default();
        q.schedule(1.0, 'a');
        q.schedule(1.0, 'b');
        q.cancel(|c| *c == 'a');
        assert_eq!(q.drain_due(2.0), vec!['b']);
    }
}
