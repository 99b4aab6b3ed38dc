//! Bounded lock-free multi-producer / multi-consumer queue
//!
//! A ring of slots, each carrying a sequence number that tells producers and
//! consumers which lap of the ring the slot belongs to. A slot at index `i`
//! starts with sequence `i`; a producer claiming position `p` publishes
//! `p + 1` once the value is stored, and a consumer taking position `p`
//! releases the slot for the next lap by publishing `p + capacity`.
//!
//! Cursors only ever grow and are compared with wrapping arithmetic.

use super::error::{LoggerError, Result};
use crossbeam_utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Pause taken by a consumer that lost a race for a slot to another consumer
const READ_CONTENTION_PAUSE: Duration = Duration::from_micros(100);

struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<MaybeUninit<T>>,
}

pub struct BoundedQueue<T> {
    slots: Box<[Slot<T>]>,
    mask: usize,
    read: CachePadded<AtomicUsize>,
    write: CachePadded<AtomicUsize>,
}

// Values are moved in by exactly one producer and out by exactly one consumer;
// slot ownership is handed over through the sequence numbers.
unsafe impl<T: Send> Send for BoundedQueue<T> {}
unsafe impl<T: Send> Sync for BoundedQueue<T> {}

impl<T> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items
    ///
    /// `capacity` must be a power of two and at least 2.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity < 2 || !capacity.is_power_of_two() {
            return Err(LoggerError::invalid_capacity(capacity));
        }

        let slots = (0..capacity)
            .map(|i| Slot {
                sequence: AtomicUsize::new(i),
                value: UnsafeCell::new(MaybeUninit::uninit()),
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Ok(Self {
            slots,
            mask: capacity - 1,
            read: CachePadded::new(AtomicUsize::new(0)),
            write: CachePadded::new(AtomicUsize::new(0)),
        })
    }

    /// Append an item, handing it back if the queue is full
    pub fn write(&self, item: T) -> std::result::Result<(), T> {
        let mut pos = self.write.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[pos & self.mask];
            let sequence = slot.sequence.load(Ordering::Acquire);
            let diff = sequence.wrapping_sub(pos) as isize;

            if diff == 0 {
                match self.write.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the successful CAS gives this producer sole
                        // ownership of the slot until the sequence is published.
                        unsafe { (*slot.value.get()).write(item) };
                        slot.sequence.store(pos.wrapping_add(1), Ordering::Release);
                        return Ok(());
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return Err(item);
            } else {
                pos = self.write.load(Ordering::Relaxed);
            }
        }
    }

    /// Take the oldest item, `None` when the queue is empty
    pub fn read(&self) -> Option<T> {
        let mut pos = self.read.load(Ordering::Relaxed);
        loop {
            let slot = &self.slots[pos & self.mask];
            let sequence = slot.sequence.load(Ordering::Acquire);
            let diff = sequence.wrapping_sub(pos.wrapping_add(1)) as isize;

            if diff == 0 {
                match self.read.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // SAFETY: the sequence proves a producer published this
                        // slot and the CAS makes this consumer its only reader.
                        let value = unsafe { (*slot.value.get()).assume_init_read() };
                        slot.sequence.store(
                            pos.wrapping_add(self.mask).wrapping_add(1),
                            Ordering::Release,
                        );
                        return Some(value);
                    }
                    Err(current) => pos = current,
                }
            } else if diff < 0 {
                return None;
            } else {
                thread::sleep(READ_CONTENTION_PAUSE);
                pos = self.read.load(Ordering::Relaxed);
            }
        }
    }

    /// True when no item is stored or being stored
    pub fn is_empty(&self) -> bool {
        loop {
            let write = self.write.load(Ordering::Acquire);
            let read = self.read.load(Ordering::Acquire);
            if self.write.load(Ordering::Acquire) == write {
                return read == write;
            }
        }
    }

    /// Approximate number of stored items
    pub fn len(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        write.wrapping_sub(read).min(self.capacity())
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.mask + 1
    }
}

impl<T> Drop for BoundedQueue<T> {
    fn drop(&mut self) {
        while self.read().is_some() {}
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .finish()
    }
}
