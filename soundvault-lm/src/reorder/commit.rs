//! Two-phase optimistic commit helper
//!
//! An optimistic mutation replaces the visible collection immediately and
//! keeps the displaced state in a handle. After the persistence call
//! resolves, the handle is either confirmed (previous state discarded) or
//! resolved as a failure, where the batch policy the mutation was applied
//! under decides what happens to the optimistic state.

/// Failure policy of the batch write backing an optimistic mutation
///
/// The two reorder paths differ deliberately. A per-item-tolerant write
/// can partially succeed, so a failed one means the local state has
/// drifted from the store and must be reconciled with a fresh fetch. An
/// all-or-nothing write persisted nothing on failure, so the optimistic
/// state stays on screen and the user repeats the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPolicy {
    PerItemTolerant,
    AllOrNothing,
}

/// Saved pre-mutation state for one optimistic update
#[must_use = "an unresolved commit leaves no way to roll back"]
pub struct CommitHandle<T> {
    previous: Vec<T>,
    policy: BatchPolicy,
}

impl<T> CommitHandle<T> {
    /// The server confirmed the write: the optimistic state is now
    /// authoritative and the saved state can be dropped.
    pub fn confirm(self) {}

    /// The write failed: resolve `slot` according to the batch policy.
    ///
    /// Per-item-tolerant: restore from a fresh authoritative fetch,
    /// falling back to the saved pre-mutation state when the fetch itself
    /// failed. All-or-nothing: nothing was persisted, keep the optimistic
    /// state.
    pub fn resolve_failure(self, slot: &mut Vec<T>, fresh: Option<Vec<T>>) {
        match self.policy {
            BatchPolicy::PerItemTolerant => *slot = fresh.unwrap_or(self.previous),
            BatchPolicy::AllOrNothing => {}
        }
    }

    /// Saved state, for diagnostics
    pub fn previous(&self) -> &[T] {
        &self.previous
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }
}

pub struct OptimisticCommit;

impl OptimisticCommit {
    /// Replace `slot` with `new_state`, returning a handle holding the
    /// displaced state. The caller must resolve the handle.
    pub fn apply<T>(slot: &mut Vec<T>, new_state: Vec<T>, policy: BatchPolicy) -> CommitHandle<T> {
        let previous = std::mem::replace(slot, new_state);
        CommitHandle { previous, policy }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_makes_new_state_visible_immediately() {
        let mut slot = vec![1, 2, 3];
        let handle = OptimisticCommit::apply(&mut slot, vec![3, 2, 1], BatchPolicy::PerItemTolerant);

        assert_eq!(slot, vec![3, 2, 1]);
        assert_eq!(handle.previous(), &[1, 2, 3]);
        handle.confirm();
        assert_eq!(slot, vec![3, 2, 1]);
    }

    #[test]
    fn tolerant_failure_prefers_fresh_state() {
        let mut slot = vec![1, 2, 3];
        let handle = OptimisticCommit::apply(&mut slot, vec![3, 2, 1], BatchPolicy::PerItemTolerant);

        handle.resolve_failure(&mut slot, Some(vec![9, 9]));
        assert_eq!(slot, vec![9, 9]);
    }

    #[test]
    fn tolerant_failure_falls_back_to_previous_state() {
        let mut slot = vec![1, 2, 3];
        let handle = OptimisticCommit::apply(&mut slot, vec![3, 2, 1], BatchPolicy::PerItemTolerant);

        handle.resolve_failure(&mut slot, None);
        assert_eq!(slot, vec![1, 2, 3]);
    }

    #[test]
    fn all_or_nothing_failure_keeps_optimistic_state() {
        let mut slot = vec![1, 2, 3];
        let handle = OptimisticCommit::apply(&mut slot, vec![3, 2, 1], BatchPolicy::AllOrNothing);

        // Even a fresh copy is ignored: nothing was persisted
        handle.resolve_failure(&mut slot, Some(vec![9, 9]));
        assert_eq!(slot, vec![3, 2, 1]);
    }
}
