use crossbeam_channel::{Receiver, Sender, bounded};

/// Counting admission gate. Each in-flight holder occupies one slot of a
/// bounded channel; acquiring blocks while every slot is taken.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    slots: Sender<()>,
    release: Receiver<()>,
}

/// Releases its slot when dropped.
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a AdmissionGate,
}

impl AdmissionGate {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (slots, release) = bounded(capacity);
        Self { slots, release }
    }

    pub fn acquire(&self) -> Permit<'_> {
        // Both channel ends live in `self`, so this only ever blocks, never fails.
        let _ = self.slots.send(());
        Permit { gate: self }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let _ = self.gate.release.try_recv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    impl AdmissionGate {
        fn capacity(&self) -> usize {
            self.slots.capacity().unwrap_or(0)
        }

        fn in_flight(&self) -> usize {
            self.slots.len()
        }

        fn try_acquire(&self) -> Option<Permit<'_>> {
            self.slots.try_send(()).ok().map(|_| Permit { gate: self })
        }
    }

    #[test]
    fn test_gate_limits_holders() {
        let gate = AdmissionGate::new(2);
        let a = gate.acquire();
        let _b = gate.acquire();
        assert_eq!(gate.in_flight(), 2);
        assert!(gate.try_acquire().is_none());

        drop(a);
        assert_eq!(gate.in_flight(), 1);
        assert!(gate.try_acquire().is_some());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(AdmissionGate::new(0).capacity(), 1);
    }

    #[test]
    fn test_gate_bounds_concurrent_threads() {
        let gate = Arc::new(AdmissionGate::new(3));
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let current = Arc::clone(&current);
                let peak = Arc::clone(&peak);
                thread::spawn(move || {
                    let _permit = gate.acquire();
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    thread::sleep(Duration::from_millis(10));
                    current.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(gate.in_flight(), 0);
    }
}
