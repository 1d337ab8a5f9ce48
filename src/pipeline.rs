use std::io::BufRead;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use crate::primality::is_prime;
use crate::queue::{LockFreeQueue, LockedQueue};

/// Soft bound on the advisory queue size; the producer backs off once the
/// queue reaches it. Keeps the in-flight window small enough to stay cache
/// and memory friendly.
pub const DEFAULT_SOFT_CAPACITY: usize = 256;

/// Default arena capacity: one slot per expected input integer plus the
/// sentinel. Sized for the expected stream length; exceeding it is fatal.
pub const DEFAULT_ARENA_CAPACITY: usize = 10_000_000;

/// How long producer and workers pause when they find the queue full or
/// empty. A tunable trading latency for idle CPU.
const POLL_INTERVAL: Duration = Duration::from_micros(10);

/// Pipeline parameters, fixed at startup.
pub struct Config {
    pub workers: usize,
    pub soft_capacity: usize,
    pub arena_capacity: usize,
    pub variation: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            workers: detect_workers(),
            soft_capacity: DEFAULT_SOFT_CAPACITY,
            arena_capacity: DEFAULT_ARENA_CAPACITY,
            variation: 2,
        }
    }
}

/// Number of worker threads to use when none is requested: one per
/// available execution unit, minimum 1.
pub fn detect_workers() -> usize {
    thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

/// Queue selected by the variation flag.
///
/// Variation 1 is the mutex-based reference design (correctness over
/// throughput); variation 2 is the lock-free arena-backed queue. Both see
/// the same producer/worker protocol.
enum QueueImpl {
    Locked(LockedQueue),
    LockFree(LockFreeQueue),
}

impl QueueImpl {
    fn enqueue(&self, value: i64) {
        match self {
            QueueImpl::Locked(q) => q.enqueue(value),
            QueueImpl::LockFree(q) => q.enqueue(value),
        }
    }

    fn dequeue(&self) -> Option<i64> {
        match self {
            QueueImpl::Locked(q) => q.dequeue(),
            QueueImpl::LockFree(q) => q.dequeue(),
        }
    }

    fn len(&self) -> usize {
        match self {
            QueueImpl::Locked(q) => q.len(),
            QueueImpl::LockFree(q) => q.len(),
        }
    }
}

/// Flips the done flag when dropped, so workers are released even if the
/// producer panics mid-stream (e.g. arena exhaustion) instead of spinning
/// on a flag that will never be set.
struct DoneGuard<'a>(&'a AtomicBool);

impl Drop for DoneGuard<'_> {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Count the primes in a whitespace-separated integer stream
///
/// One producer (the calling thread) reads `input` and enqueues each
/// integer, backing off while the queue sits at its soft capacity. A fixed
/// pool of workers drains the queue, testing each value and accumulating a
/// shared atomic counter. Shutdown is a drain protocol:
///
/// 1. Running: producer still reading, `done` is false
/// 2. Draining: producer hit end of input and stored `done = true` (once)
/// 3. Stopped: every worker has seen `done` with an empty queue and
///    returned; the scope join below is the producer's only blocking wait
///
/// A worker exits only after a failed dequeue with `done` set and the
/// advisory size at zero, so no enqueued value is ever left untested.
/// Returns the final prime count; the result is independent of worker
/// count and interleaving.
pub fn count_primes<R: BufRead>(input: R, config: &Config) -> usize {
    let queue = match config.variation {
        1 => QueueImpl::Locked(LockedQueue::new()),
        2 => QueueImpl::LockFree(LockFreeQueue::with_capacity(config.arena_capacity)),
        other => {
            eprintln!("Unknown variation {}, using variation 2", other);
            QueueImpl::LockFree(LockFreeQueue::with_capacity(config.arena_capacity))
        }
    };

    let total_primes = AtomicUsize::new(0);
    let done = AtomicBool::new(false);
    let workers = config.workers.max(1);
    let soft_capacity = config.soft_capacity.max(1);

    thread::scope(|scope| {
        for _ in 0..workers {
            let queue = &queue;
            let done = &done;
            let total_primes = &total_primes;

            scope.spawn(move || {
                loop {
                    match queue.dequeue() {
                        Some(value) => {
                            if is_prime(value) {
                                total_primes.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        None => {
                            // Size is rechecked after done so an item linked
                            // before the flag flip cannot be abandoned
                            if done.load(Ordering::Acquire) && queue.len() == 0 {
                                break;
                            }
                            thread::sleep(POLL_INTERVAL);
                        }
                    }
                }
            });
        }

        // Producer: parse and enqueue on the calling thread
        let _guard = DoneGuard(&done);
        for line in input.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    eprintln!("Error reading input: {}", e);
                    break;
                }
            };

            for value in line.split_whitespace().filter_map(|tok| tok.parse::<i64>().ok()) {
                // Backpressure: hold off while the queue sits at capacity
                while queue.len() >= soft_capacity {
                    thread::sleep(POLL_INTERVAL);
                }
                queue.enqueue(value);
            }
        }
        // Guard drops here: Running -> Draining. The scope exit joins all
        // workers: Draining -> Stopped.
    });

    total_primes.load(Ordering::Acquire)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn config(workers: usize, variation: u32) -> Config {
        Config {
            workers,
            soft_capacity: DEFAULT_SOFT_CAPACITY,
            arena_capacity: 100_000,
            variation,
        }
    }

    fn count(input: &str, cfg: &Config) -> usize {
        count_primes(Cursor::new(input.to_string()), cfg)
    }

    #[test]
    fn test_mixed_input_counts_four_primes() {
        // Primes: 2, 3, 5, 7
        assert_eq!(count("2 3 4 5 6 7 8 9 10", &config(4, 2)), 4);
    }

    #[test]
    fn test_all_composite_input_counts_zero() {
        assert_eq!(count("4 6 8 9 10", &config(4, 2)), 0);
    }

    #[test]
    fn test_empty_input_terminates_with_zero() {
        assert_eq!(count("", &config(4, 2)), 0);
    }

    #[test]
    fn test_whitespace_and_newlines_are_token_separators() {
        assert_eq!(count("2\n3\t5\n\n  7   11\n", &config(2, 2)), 5);
    }

    #[test]
    fn test_negative_and_zero_values_are_not_prime() {
        assert_eq!(count("-7 -2 0 1 2", &config(2, 2)), 1);
    }

    #[test]
    fn test_duplicates_are_counted_per_occurrence() {
        assert_eq!(count("7 7 7 8 8", &config(3, 2)), 3);
    }

    #[test]
    fn test_single_worker_pipeline() {
        assert_eq!(count("2 3 4 5 6 7 8 9 10", &config(1, 2)), 4);
    }

    #[test]
    fn test_locked_variation_matches_lock_free() {
        // Primes: 2, 3, 5, 7, 11, 13
        let input = "2 3 4 5 6 7 8 9 10 11 12 13";
        assert_eq!(count(input, &config(4, 1)), count(input, &config(4, 2)));
        assert_eq!(count(input, &config(4, 1)), 6);
    }

    #[test]
    fn test_unknown_variation_falls_back_to_lock_free() {
        assert_eq!(count("2 3 4", &config(2, 99)), 2);
    }

    #[test]
    fn test_concurrent_count_matches_sequential_count() {
        // Deterministic pseudo-random multiset, large enough to exercise
        // real interleaving between the producer and several workers
        let mut state: u64 = 0x9e3779b97f4a7c15;
        let mut values = Vec::with_capacity(50_000);
        for _ in 0..50_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            values.push((state % 100_000) as i64);
        }

        let expected = values.iter().filter(|&&v| crate::primality::is_prime(v)).count();
        let input = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        for variation in [1, 2] {
            for workers in [1, 2, 8] {
                let cfg = Config {
                    workers,
                    soft_capacity: DEFAULT_SOFT_CAPACITY,
                    arena_capacity: values.len() + 1,
                    variation,
                };
                assert_eq!(
                    count(&input, &cfg),
                    expected,
                    "variation {} with {} workers disagreed with sequential count",
                    variation,
                    workers
                );
            }
        }
    }

    #[test]
    fn test_tiny_soft_capacity_forces_backpressure_without_loss() {
        // With capacity 4 the producer must back off constantly; every
        // value still gets classified exactly once
        let input = (0..5_000).map(|v| v.to_string()).collect::<Vec<_>>().join("\n");
        let expected = (0..5_000).filter(|&v| crate::primality::is_prime(v)).count();
        let cfg = Config {
            workers: 4,
            soft_capacity: 4,
            arena_capacity: 5_001,
            variation: 2,
        };
        assert_eq!(count_primes(Cursor::new(input), &cfg), expected);
    }

    #[test]
    fn test_detect_workers_is_at_least_one() {
        assert!(detect_workers() >= 1);
    }
}
