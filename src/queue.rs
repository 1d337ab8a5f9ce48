use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::arena::{NIL, NodeArena};

/// Lock-free multi-producer/multi-consumer FIFO queue of integers
///
/// Michael–Scott algorithm over arena indices instead of raw pointers:
/// - One dummy sentinel node: `head` always points at a node that is not
///   logically in the queue; its `next` is the first real element
/// - `tail` may lag the true last node transiently; any thread that
///   observes the lag advances it (cooperative catch-up)
/// - All progress is via compare-exchange retries, never a lock
/// - Arena indices are never reused, so the CAS loops cannot suffer ABA
///
/// The `size` counter is advisory: it is adjusted only after a successful
/// structural link/unlink and is used for backpressure and the workers'
/// termination heuristic. Emptiness for correctness is decided by the
/// structural head/tail test inside `dequeue` (and `is_empty`).
pub struct LockFreeQueue {
    arena: NodeArena,
    head: AtomicUsize,
    tail: AtomicUsize,
    size: AtomicUsize,
}

impl LockFreeQueue {
    /// Create a queue backed by an arena of `arena_capacity` slots. One
    /// slot is consumed immediately by the sentinel, so the queue can
    /// carry at most `arena_capacity - 1` values over its lifetime.
    pub fn with_capacity(arena_capacity: usize) -> Self {
        let arena = NodeArena::with_capacity(arena_capacity);
        let dummy = arena.allocate(0);
        LockFreeQueue {
            arena,
            head: AtomicUsize::new(dummy),
            tail: AtomicUsize::new(dummy),
            size: AtomicUsize::new(0),
        }
    }

    /// Append `value` at the tail. Lock-free: retries its CAS until the
    /// node is linked, helping a lagging tail along the way.
    pub fn enqueue(&self, value: i64) {
        let node = self.arena.allocate(value);

        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let next = self.arena.slot(tail).next().load(Ordering::Acquire);

            // Re-read to make sure the snapshot was consistent
            if tail != self.tail.load(Ordering::Acquire) {
                continue;
            }

            if next == NIL {
                // Tail is the real last node: try to link after it
                if self
                    .arena
                    .slot(tail)
                    .next()
                    .compare_exchange(NIL, node, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    // Best effort: a competing thread may already have
                    // advanced the tail, which is not an error
                    let _ = self.tail.compare_exchange(
                        tail,
                        node,
                        Ordering::AcqRel,
                        Ordering::Acquire,
                    );
                    self.size.fetch_add(1, Ordering::Release);
                    return;
                }
            } else {
                // Tail lags behind the true last node: help advance it
                let _ =
                    self.tail
                        .compare_exchange(tail, next, Ordering::AcqRel, Ordering::Acquire);
            }
        }
    }

    /// Remove and return the oldest value, or `None` when the queue is
    /// empty. Emptiness is a normal condition, not an error. Safe for any
    /// number of concurrent consumers: the head CAS has exactly one winner
    /// per node.
    pub fn dequeue(&self) -> Option<i64> {
        loop {
            let head = self.head.load(Ordering::Acquire);
            let tail = self.tail.load(Ordering::Acquire);
            let next = self.arena.slot(head).next().load(Ordering::Acquire);

            if head != self.head.load(Ordering::Acquire) {
                continue;
            }

            if head == tail {
                if next == NIL {
                    return None;
                }
                // Tail lags: help advance it, then retry
                let _ =
                    self.tail
                        .compare_exchange(tail, next, Ordering::AcqRel, Ordering::Acquire);
            } else {
                // Read the value before winning the node; the old head slot
                // is retired to the arena either way (never reused)
                let value = self.arena.slot(next).value();
                if self
                    .head
                    .compare_exchange(head, next, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    self.size.fetch_sub(1, Ordering::Release);
                    return Some(value);
                }
            }
        }
    }

    /// Advisory element count, used for backpressure and the workers'
    /// stop heuristic. May be stale by the time the caller acts on it.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    /// Authoritative structural emptiness test.
    pub fn is_empty(&self) -> bool {
        let head = self.head.load(Ordering::Acquire);
        head == self.tail.load(Ordering::Acquire)
            && self.arena.slot(head).next().load(Ordering::Acquire) == NIL
    }

    pub fn arena(&self) -> &NodeArena {
        &self.arena
    }
}

/// Mutex-based reference queue with the same surface as `LockFreeQueue`
///
/// Correctness-first variant (variation 1): a plain `Mutex<VecDeque>`.
/// Unbounded growth is prevented by the same producer-side backpressure
/// the lock-free queue uses, so no capacity is tracked here.
pub struct LockedQueue {
    items: Mutex<VecDeque<i64>>,
}

impl LockedQueue {
    pub fn new() -> Self {
        LockedQueue {
            items: Mutex::new(VecDeque::new()),
        }
    }

    pub fn enqueue(&self, value: i64) {
        self.items.lock().unwrap().push_back(value);
    }

    pub fn dequeue(&self) -> Option<i64> {
        self.items.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }
}
