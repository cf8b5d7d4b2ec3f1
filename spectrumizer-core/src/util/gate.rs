//! Counting admission gate.
//!
//! At most `capacity` permits are outstanding at any time. A permit is
//! returned when it is dropped, so a task that panics or returns early still
//! frees its slot.

use std::sync::{Condvar, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct GateState {
    in_flight: usize,
    peak: usize,
}

/// Bounded-capacity gate limiting how many tasks run at once.
#[derive(Debug)]
pub struct AdmissionGate {
    capacity: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

/// RAII slot held while a task runs.
#[derive(Debug)]
pub struct SlotPermit<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    /// Creates a gate with `capacity` slots (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(GateState::default()),
            released: Condvar::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Blocks until a slot is free and takes it.
    pub fn acquire(&self) -> SlotPermit<'_> {
        let mut state = self.lock();
        while state.in_flight >= self.capacity {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        state.in_flight += 1;
        state.peak = state.peak.max(state.in_flight);
        SlotPermit { gate: self }
    }

    /// Number of permits currently held.
    pub fn in_flight(&self) -> usize {
        self.lock().in_flight
    }

    /// Highest number of permits ever held at the same time.
    pub fn peak(&self) -> usize {
        self.lock().peak
    }

    fn release(&self) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        drop(state);
        self.released.notify_one();
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for SlotPermit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_zero_capacity_is_one() {
        assert_eq!(AdmissionGate::new(0).capacity(), 1);
    }

    #[test]
    fn test_permit_released_on_drop() {
        let gate = AdmissionGate::new(2);
        {
            let _a = gate.acquire();
            let _b = gate.acquire();
            assert_eq!(gate.in_flight(), 2);
        }
        assert_eq!(gate.in_flight(), 0);
        assert_eq!(gate.peak(), 2);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let gate = AdmissionGate::new(3);
        let observed_max = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..12 {
                s.spawn(|| {
                    let _permit = gate.acquire();
                    observed_max.fetch_max(gate.in_flight(), Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(5));
                });
            }
        });

        assert!(observed_max.load(Ordering::SeqCst) <= 3);
        assert!(gate.peak() <= 3);
        assert_eq!(gate.in_flight(), 0);
    }

    #[test]
    fn test_permit_released_on_panic() {
        let gate = AdmissionGate::new(1);
        let result = thread::scope(|s| {
            s.spawn(|| {
                let _permit = gate.acquire();
                panic!("converter crashed");
            })
            .join()
        });
        assert!(result.is_err());
        assert_eq!(gate.in_flight(), 0);
        let _again = gate.acquire();
    }
}
