use anyhow::Context;
use rand::Rng;

use crate::{clock::now_ns, Index, Nanos, Record};

/// Zero-filled integers probed by the measurement loop. Never resized.
#[derive(Debug)]
pub struct SampleBuffer {
    data: Box<[i32]>,
}
impl SampleBuffer {
    /// Allocates as many `i32`s as fit in `size_bytes`.
    pub fn with_byte_budget(size_bytes: usize) -> anyhow::Result<Self> {
        Self::with_len(size_bytes / core::mem::size_of::<i32>())
    }
    pub fn with_len(len: usize) -> anyhow::Result<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .with_context(|| format!("Failed to allocate sample buffer of {len} integers"))?;
        data.resize(len, 0);
        let data = data.into_boxed_slice();
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn as_slice(&self) -> &[i32] {
        &self.data
    }
}

/// Times a single read of `buffer[index]`.
///
/// The duration includes the cost of both clock reads.
#[inline(never)]
pub fn measure_access(buffer: &[i32], index: Index) -> Nanos {
    // Bounds check stays outside the timed window.
    let slot: *const i32 = &buffer[index];

    let start = now_ns();
    let value = unsafe { core::ptr::read_volatile(slot) };
    let end = now_ns();

    core::hint::black_box(value);
    end.saturating_sub(start)
}

/// Performs `access_count` timed reads at uniformly random indices.
pub fn run<R>(buffer: &[i32], access_count: usize, rng: &mut R) -> anyhow::Result<Vec<Record>>
where
    R: Rng,
{
    let mut records = Vec::new();
    records
        .try_reserve_exact(access_count)
        .context("Failed to allocate memory for records array")?;
    if access_count != 0 {
        anyhow::ensure!(!buffer.is_empty(), "Cannot probe an empty buffer");
    }
    for _ in 0..access_count {
        let index = rng.random_range(0..buffer.len());
        let duration = measure_access(buffer, index);
        records.push(Record { index, duration });
    }
    Ok(records)
}
