//! Allocation cycles that deliberately retain every buffer they create.
//!
//! Each cycle allocates a fresh buffer of `slots` integers, writes one
//! pseudo-random value into slot 0 and hands back a [`RetainedSlot`]. Holding
//! on to the slot keeps the whole buffer alive, which is what a heap profile
//! taken at exit is meant to show.

use std::mem;
use std::ops::{Deref, RangeInclusive};

use rand::Rng;
use tracing::debug;

/// Integer slots per buffer (65536 * 8 bytes = 512 KiB).
pub const DEFAULT_SLOTS: usize = 65536;

/// Values stamped into slot 0: every non-negative `i64`.
pub const VALUE_RANGE: RangeInclusive<i64> = 0..=i64::MAX;

/// Handle to the first slot of a retained buffer.
///
/// Owns the buffer so the slot can never outlive it.
#[derive(Debug)]
pub struct RetainedSlot {
    buffer: Box<[i64]>,
}

impl RetainedSlot {
    pub fn value(&self) -> i64 {
        self.buffer[0]
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    pub fn buffer_bytes(&self) -> usize {
        mem::size_of_val(&*self.buffer)
    }
}

impl Deref for RetainedSlot {
    type Target = i64;

    fn deref(&self) -> &i64 {
        &self.buffer[0]
    }
}

/// Every slot retained by a run, in allocation order.
#[derive(Debug)]
pub struct RetainedSet {
    slots: Vec<RetainedSlot>,
}

impl RetainedSet {
    pub fn push(&mut self, slot: RetainedSlot) {
        self.slots.push(slot);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RetainedSlot> {
        self.slots.iter()
    }

    pub fn values(&self) -> Vec<i64> {
        self.slots.iter().map(RetainedSlot::value).collect()
    }

    pub fn retained_bytes(&self) -> u64 {
        self.slots.iter().map(|s| s.buffer_bytes() as u64).sum()
    }
}

/// Bytes a run of `cycles` buffers of `slots` integers keeps alive, or `None`
/// if that does not fit in a `u64`.
pub fn retained_bytes_for(cycles: usize, slots: usize) -> Option<u64> {
    let slot_bytes = mem::size_of::<i64>() as u64;
    (cycles as u64)
        .checked_mul(slots as u64)
        .and_then(|n| n.checked_mul(slot_bytes))
}

/// Allocates one zeroed buffer and stamps a random non-negative value into
/// slot 0.
///
/// # Panics
///
/// Panics if `slots` is zero.
pub fn allocate_cycle<R: Rng + ?Sized>(slots: usize, rng: &mut R) -> RetainedSlot {
    assert!(slots > 0, "a buffer needs at least one slot");
    let mut buffer = vec![0i64; slots].into_boxed_slice();
    buffer[0] = rng.gen_range(VALUE_RANGE);
    RetainedSlot { buffer }
}

/// Runs `cycles` allocation cycles, retaining every slot.
pub fn run_cycles<R: Rng + ?Sized>(cycles: usize, slots: usize, rng: &mut R) -> RetainedSet {
    let mut retained = RetainedSet {
        slots: Vec::with_capacity(cycles),
    };
    for cycle in 0..cycles {
        let slot = allocate_cycle(slots, rng);
        debug!(cycle, value = slot.value(), "allocated buffer");
        retained.push(slot);
    }
    retained
}
