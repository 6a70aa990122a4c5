//! Controller ingest (C5): turns decoded [`ControllerState`] datagrams into
//! calls against a [`GamepadInjector`], rejecting reordered or duplicate
//! packets per slot and creating each slot's virtual target lazily on
//! first use. Grounded on the original's `ControllerInjector::inject`.

use std::sync::Mutex;

use rdesk_core::controller::{ControllerState, MAX_SLOT};
use rdesk_core::seq::is_newer;
use tracing::{trace, warn};

use crate::injector::{GamepadInjector, GamepadReport};

const SLOT_COUNT: usize = MAX_SLOT as usize + 1;

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    last_seq: Option<u16>,
}

struct Inner<I: GamepadInjector> {
    injector: I,
    slots: [SlotState; SLOT_COUNT],
    /// Whether we've already warned that the injector is unavailable —
    /// logged once per session, not once per dropped packet.
    unavailable_logged: bool,
}

/// Owns the injector and the per-slot sequence state for all four
/// controller slots behind one mutex, matching the original's single
/// `mutex_` guarding both `targets_` and `last_seq_`.
pub struct ControllerIngest<I: GamepadInjector> {
    inner: Mutex<Inner<I>>,
}

impl<I: GamepadInjector> ControllerIngest<I> {
    pub fn new(mut injector: I) -> Self {
        if let Err(e) = injector.initialize() {
            warn!(error = %e, "controller injector unavailable");
        }
        Self {
            inner: Mutex::new(Inner {
                injector,
                slots: [SlotState::default(); SLOT_COUNT],
                unavailable_logged: false,
            }),
        }
    }

    /// Apply one decoded controller datagram. Out-of-range slots, and
    /// reordered or duplicate sequence numbers, are dropped silently
    /// (matching the C++ `diff <= 0` check — never an error).
    pub fn handle(&self, state: ControllerState) {
        if !state.slot_in_range() {
            warn!(slot = state.slot, "controller datagram targets an out-of-range slot");
            return;
        }

        let mut inner = self.inner.lock().expect("controller ingest mutex poisoned");
        let idx = state.slot as usize;

        if let Some(last) = inner.slots[idx].last_seq {
            if !is_newer(state.seq, last) {
                trace!(slot = state.slot, seq = state.seq, last, "dropping stale/duplicate controller datagram");
                return;
            }
        }
        inner.slots[idx].last_seq = Some(state.seq);

        if let Err(e) = inner.injector.create_target(state.slot) {
            if !inner.unavailable_logged {
                warn!(error = %e, "controller injector unavailable, dropping input");
                inner.unavailable_logged = true;
            }
            return;
        }

        let report = GamepadReport::from(state);
        if let Err(e) = inner.injector.update(state.slot, report) {
            if !inner.unavailable_logged {
                warn!(error = %e, "controller injector update failed");
                inner.unavailable_logged = true;
            }
        }
    }

    /// Tear down every created virtual target.
    pub fn release(&self) {
        self.inner.lock().expect("controller ingest mutex poisoned").injector.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injector::RecordingInjector;

    fn state(slot: u8, seq: u16) -> ControllerState {
        ControllerState {
            slot,
            seq,
            buttons: 0,
            left_trigger: 0,
            right_trigger: 0,
            left_thumb_x: 0,
            left_thumb_y: 0,
            right_thumb_x: 0,
            right_thumb_y: 0,
        }
    }

    #[test]
    fn first_packet_creates_target_and_updates() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 1));
        let inner = ingest.inner.lock().unwrap();
        assert_eq!(inner.injector.created_slots, vec![0]);
        assert_eq!(inner.injector.updates.len(), 1);
    }

    #[test]
    fn duplicate_sequence_is_dropped() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 5));
        ingest.handle(state(0, 5));
        let inner = ingest.inner.lock().unwrap();
        assert_eq!(inner.injector.updates.len(), 1);
    }

    #[test]
    fn reordered_sequence_is_dropped() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 10));
        ingest.handle(state(0, 9));
        let inner = ingest.inner.lock().unwrap();
        assert_eq!(inner.injector.updates.len(), 1);
    }

    #[test]
    fn newer_sequence_after_wraparound_is_accepted() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 65535));
        ingest.handle(state(0, 0));
        let inner = ingest.inner.lock().unwrap();
        assert_eq!(inner.injector.updates.len(), 2);
    }

    #[test]
    fn slots_are_independent() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 1));
        ingest.handle(state(1, 1));
        let inner = ingest.inner.lock().unwrap();
        assert_eq!(inner.injector.created_slots.len(), 2);
        assert_eq!(inner.injector.updates.len(), 2);
    }

    #[test]
    fn out_of_range_slot_is_dropped() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(7, 1));
        let inner = ingest.inner.lock().unwrap();
        assert!(inner.injector.updates.is_empty());
    }

    #[test]
    fn release_clears_created_slots() {
        let ingest = ControllerIngest::new(RecordingInjector::default());
        ingest.handle(state(0, 1));
        ingest.release();
        let inner = ingest.inner.lock().unwrap();
        assert!(inner.injector.released);
        assert!(inner.injector.created_slots.is_empty());
    }
}
