use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

// ─── Ticket ───────────────────────────────────────────────────────────────

/// Generation number handed out when a submission starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

// ─── ReportSlot ───────────────────────────────────────────────────────────

/// Holds the latest result of one report generator.
///
/// Each submission calls [`ReportSlot::begin`] before invoking its flow and
/// [`ReportSlot::publish`] with the result. A result is stored only if its
/// ticket is newer than the stored one, so a slow response from an earlier
/// submission can never overwrite a newer result regardless of arrival
/// order. Failed submissions simply never publish.
#[derive(Debug)]
pub struct ReportSlot<T> {
    issued: AtomicU64,
    state: Mutex<SlotState<T>>,
}

#[derive(Debug)]
struct SlotState<T> {
    generation: u64,
    value: Option<T>,
}

impl<T> Default for ReportSlot<T> {
    fn default() -> Self {
        Self {
            issued: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                generation: 0,
                value: None,
            }),
        }
    }
}

impl<T: Clone> ReportSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket for a new submission. Tickets increase monotonically.
    pub fn begin(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Store `value` if `ticket` is newer than the stored result.
    /// Returns whether the value was stored.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if ticket.0 <= state.generation {
            tracing::debug!(
                ticket = ticket.0,
                stored = state.generation,
                "discarding stale report"
            );
            return false;
        }
        state.generation = ticket.0;
        state.value = Some(value);
        true
    }

    pub fn latest(&self) -> Option<T> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.value.clone()
    }

    /// Generation of the stored result (0 when empty).
    pub fn generation(&self) -> u64 {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.generation
    }

    /// Drop the stored result. Tickets issued before the clear can still
    /// publish if they are newer than the cleared result.
    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.value = None;
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────
