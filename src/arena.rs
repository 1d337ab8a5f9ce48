use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

/// Index value meaning "no successor" in a node's next field.
pub const NIL: usize = usize::MAX;

/// One queue node: a value and the index of its successor.
///
/// Both fields are atomics so a slot can be published to consumers through
/// a compare-exchange on its predecessor's `next` without any lock. The
/// value is written before the slot is linked (Release on the link CAS),
/// so a Relaxed load after an Acquire read of the link always sees it.
pub struct Slot {
    value: AtomicI64,
    next: AtomicUsize,
}

impl Slot {
    fn new() -> Self {
        Slot {
            value: AtomicI64::new(0),
            next: AtomicUsize::new(NIL),
        }
    }

    pub fn value(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn next(&self) -> &AtomicUsize {
        &self.next
    }
}

/// Fixed-capacity slab of queue nodes handed out by a monotonic cursor
///
/// - Slots are identified by index, never by pointer, so linking the queue
///   is plain safe Rust: compare-exchange on index-typed fields
/// - Indices are never reused, which makes the queue's CAS loops immune to
///   ABA without any reclamation scheme
/// - There is no free: slot storage lives until the arena is dropped,
///   matching the run-length lifetime of the pipeline
pub struct NodeArena {
    slots: Box<[Slot]>,
    cursor: AtomicUsize,
}

impl NodeArena {
    /// Preallocate `capacity` slots. The capacity must cover every integer
    /// the producer will enqueue, plus one slot for the queue's sentinel.
    pub fn with_capacity(capacity: usize) -> Self {
        let slots: Box<[Slot]> = (0..capacity).map(|_| Slot::new()).collect();
        NodeArena {
            slots,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Hand out the next slot, initialized to `value` with no successor.
    ///
    /// Panics when the arena is exhausted: the arena being sized smaller
    /// than the input stream is a configuration error, not a transient
    /// condition, so the process terminates with a diagnostic rather than
    /// retrying.
    pub fn allocate(&self, value: i64) -> usize {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed);
        if idx >= self.slots.len() {
            panic!(
                "node arena exhausted: {} slots allocated, capacity is {}",
                idx + 1,
                self.slots.len()
            );
        }
        let slot = &self.slots[idx];
        slot.value.store(value, Ordering::Relaxed);
        slot.next.store(NIL, Ordering::Relaxed);
        idx
    }

    pub fn slot(&self, idx: usize) -> &Slot {
        &self.slots[idx]
    }

    /// Number of slots handed out so far.
    pub fn allocated(&self) -> usize {
        self.cursor.load(Ordering::Relaxed).min(self.slots.len())
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
