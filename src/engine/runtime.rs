//! Per-state runtime: the hook buckets attached to one state.

use crate::core::{HookEvent, HookId, HookPhase, HookPoint};
use crate::engine::Engine;

/// Boxed hook callback. Captured values are the hook's own context.
pub type HookFn<C> = Box<dyn FnMut(&mut Engine<C>, &HookEvent)>;

struct HookEntry<C> {
    id: HookId,
    oneshot: bool,
    /// `None` while the hook is running.
    callback: Option<HookFn<C>>,
}

/// Six FIFO hook buckets of one state, indexed by point and phase.
///
/// Ids grow monotonically and entries are only ever appended, so each bucket
/// stays sorted by id. Iteration resumes from the last id that ran rather than
/// from a position, which keeps it correct when hooks are removed mid-dispatch.
pub(crate) struct StateRuntime<C> {
    buckets: [[Vec<HookEntry<C>>; 2]; 3],
}

impl<C> StateRuntime<C> {
    pub(crate) fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| std::array::from_fn(|_| Vec::new())),
        }
    }

    fn bucket(&self, point: HookPoint, phase: HookPhase) -> &Vec<HookEntry<C>> {
        &self.buckets[point_index(point)][phase_index(phase)]
    }

    fn bucket_mut(&mut self, point: HookPoint, phase: HookPhase) -> &mut Vec<HookEntry<C>> {
        &mut self.buckets[point_index(point)][phase_index(phase)]
    }

    pub(crate) fn push(
        &mut self,
        point: HookPoint,
        phase: HookPhase,
        id: HookId,
        oneshot: bool,
        callback: HookFn<C>,
    ) {
        self.bucket_mut(point, phase).push(HookEntry {
            id,
            oneshot,
            callback: Some(callback),
        });
    }

    pub(crate) fn remove(&mut self, point: HookPoint, phase: HookPhase, id: HookId) -> bool {
        let bucket = self.bucket_mut(point, phase);
        match bucket.iter().position(|entry| entry.id == id) {
            Some(index) => {
                bucket.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn len(&self, point: HookPoint, phase: HookPhase) -> usize {
        self.bucket(point, phase).len()
    }

    /// Take the callback of the first hook after `after` that was registered
    /// before `limit`.
    pub(crate) fn take_next(
        &mut self,
        point: HookPoint,
        phase: HookPhase,
        after: Option<HookId>,
        limit: HookId,
    ) -> Option<(HookId, bool, HookFn<C>)> {
        self.bucket_mut(point, phase)
            .iter_mut()
            .filter(|entry| entry.id < limit && after.map_or(true, |last| entry.id > last))
            .find_map(|entry| {
                entry
                    .callback
                    .take()
                    .map(|callback| (entry.id, entry.oneshot, callback))
            })
    }

    /// Hand a callback back after it ran. Returns it if the hook was removed
    /// in the meantime, so the caller drops it outside the bucket borrow.
    pub(crate) fn restore(
        &mut self,
        point: HookPoint,
        phase: HookPhase,
        id: HookId,
        callback: HookFn<C>,
    ) -> Option<HookFn<C>> {
        match self
            .bucket_mut(point, phase)
            .iter_mut()
            .find(|entry| entry.id == id)
        {
            Some(entry) => {
                entry.callback = Some(callback);
                None
            }
            None => Some(callback),
        }
    }
}

fn point_index(point: HookPoint) -> usize {
    match point {
        HookPoint::Enter => 0,
        HookPoint::Process => 1,
        HookPoint::Exit => 2,
    }
}

fn phase_index(phase: HookPhase) -> usize {
    match phase {
        HookPhase::Pre => 0,
        HookPhase::Post => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> HookFn<()> {
        Box::new(|_: &mut Engine<()>, _: &HookEvent| {})
    }

    #[test]
    fn buckets_are_independent() {
        let mut runtime = StateRuntime::<()>::new();
        runtime.push(HookPoint::Enter, HookPhase::Pre, HookId(1), false, noop());
        runtime.push(HookPoint::Exit, HookPhase::Post, HookId(2), true, noop());

        assert_eq!(runtime.len(HookPoint::Enter, HookPhase::Pre), 1);
        assert_eq!(runtime.len(HookPoint::Enter, HookPhase::Post), 0);
        assert_eq!(runtime.len(HookPoint::Exit, HookPhase::Post), 1);
        assert_eq!(runtime.len(HookPoint::Process, HookPhase::Pre), 0);
    }

    #[test]
    fn take_next_walks_in_registration_order() {
        let mut runtime = StateRuntime::<()>::new();
        for id in 1..=3 {
            runtime.push(HookPoint::Enter, HookPhase::Pre, HookId(id), false, noop());
        }

        let limit = HookId(10);
        let (first, _, cb) = runtime
            .take_next(HookPoint::Enter, HookPhase::Pre, None, limit)
            .unwrap();
        assert_eq!(first, HookId(1));
        assert!(runtime
            .restore(HookPoint::Enter, HookPhase::Pre, first, cb)
            .is_none());

        // Removing the next hook while the cursor sits on the first skips it.
        assert!(runtime.remove(HookPoint::Enter, HookPhase::Pre, HookId(2)));
        let (second, _, _) = runtime
            .take_next(HookPoint::Enter, HookPhase::Pre, Some(first), limit)
            .unwrap();
        assert_eq!(second, HookId(3));
    }

    #[test]
    fn take_next_respects_limit() {
        let mut runtime = StateRuntime::<()>::new();
        runtime.push(HookPoint::Process, HookPhase::Post, HookId(5), false, noop());

        assert!(runtime
            .take_next(HookPoint::Process, HookPhase::Post, None, HookId(5))
            .is_none());
    }

    #[test]
    fn restore_after_removal_returns_callback() {
        let mut runtime = StateRuntime::<()>::new();
        runtime.push(HookPoint::Exit, HookPhase::Pre, HookId(1), false, noop());

        let (id, _, cb) = runtime
            .take_next(HookPoint::Exit, HookPhase::Pre, None, HookId(2))
            .unwrap();
        assert!(runtime.remove(HookPoint::Exit, HookPhase::Pre, id));
        assert!(runtime.restore(HookPoint::Exit, HookPhase::Pre, id, cb).is_some());
        assert!(!runtime.remove(HookPoint::Exit, HookPhase::Pre, id));
    }
}
