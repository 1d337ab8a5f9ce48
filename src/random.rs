use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hash, Hasher};
use std::io::{self, Write};

/// Write `count` pseudo-random integers in [0, max) to `writer`, one per
/// line, for piping into the counter.
///
/// Randomness comes from hashing a counter through a freshly seeded
/// `RandomState`, which is plenty for generating test workloads without
/// pulling in a dedicated RNG. Output is built in a reused string buffer
/// with itoa and flushed in large batches.
pub fn write_random_integers<W: Write>(writer: &mut W, count: usize, max: u64) -> io::Result<()> {
    const BATCH_BYTES: usize = 64 * 1024;

    let bound = max.max(1);
    let random_state = RandomState::new();
    let mut itoa_buf = itoa::Buffer::new();
    let mut batch = String::with_capacity(BATCH_BYTES + 32);

    for i in 0..count {
        let mut hasher = random_state.build_hasher();
        i.hash(&mut hasher);
        let value = hasher.finish() % bound;

        batch.push_str(itoa_buf.format(value));
        batch.push('\n');

        if batch.len() >= BATCH_BYTES {
            writer.write_all(batch.as_bytes())?;
            batch.clear();
        }
    }

    writer.write_all(batch.as_bytes())?;
    writer.flush()
}
