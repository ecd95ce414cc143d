use super::RingError;
use super::slots::{advance_mirrored, into_cells, mirrored_distance, mirrored_index, validate};
use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lock-free single-producer/single-consumer ring of record references.
///
/// Occupancy is derived from two counters, each written by exactly one side,
/// so nothing is read-modify-written across contexts. Use [`split`] to get
/// the producer and consumer handles.
///
/// [`split`]: SpscRingBuffer::split
pub struct SpscRingBuffer<'s, T> {
    slots: &'s [UnsafeCell<Option<T>>],
    capacity: usize,
    write: AtomicUsize,
    read: AtomicUsize,
}

// SAFETY: a slot is written only by the producer while it lies outside the
// occupied range and read only by the consumer while inside it; the range is
// published through Release/Acquire on the two counters.
unsafe impl<T: Send> Send for SpscRingBuffer<'_, T> {}
unsafe impl<T: Send> Sync for SpscRingBuffer<'_, T> {}

impl<'s, T> SpscRingBuffer<'s, T> {
    pub fn new(storage: &'s mut [Option<T>]) -> Result<Self, RingError> {
        let capacity = storage.len();
        Self::init(storage, capacity)
    }

    /// Binds the ring to `storage`, which must hold exactly `capacity` slots.
    pub fn init(storage: &'s mut [Option<T>], capacity: usize) -> Result<Self, RingError> {
        validate(storage, capacity)?;
        if capacity > usize::MAX / 2 {
            return Err(RingError::InvalidCapacity {
                capacity,
                reason: "too large for mirrored cursors",
            });
        }

        let mut ring = Self {
            slots: into_cells(storage),
            capacity,
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
        };
        ring.reset();
        Ok(ring)
    }

    /// Returns the ring to the empty state. Needs `&mut self`, so no producer
    /// or consumer handle can be alive.
    pub fn reset(&mut self) {
        for slot in self.slots {
            // SAFETY: `&mut self` rules out any live handle touching the slots.
            unsafe { *slot.get() = None };
        }
        *self.write.get_mut() = 0;
        *self.read.get_mut() = 0;
        tracing::debug!(capacity = self.capacity, "spsc ring buffer reset");
    }

    /// Hands out the one producer and the one consumer for this ring.
    pub fn split(&mut self) -> (Producer<'_, 's, T>, Consumer<'_, 's, T>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn count(&self) -> usize {
        let read = self.read.load(Ordering::Acquire);
        let write = self.write.load(Ordering::Acquire);
        mirrored_distance(write, read, self.capacity)
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.capacity - self.count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.count() == self.capacity
    }

    #[inline]
    pub fn read_cursor(&self) -> usize {
        mirrored_index(self.read.load(Ordering::Acquire), self.capacity)
    }

    #[inline]
    pub fn write_cursor(&self) -> usize {
        mirrored_index(self.write.load(Ordering::Acquire), self.capacity)
    }
}

pub struct Producer<'r, 's, T> {
    ring: &'r SpscRingBuffer<'s, T>,
}

pub struct Consumer<'r, 's, T> {
    ring: &'r SpscRingBuffer<'s, T>,
}

impl<T> Producer<'_, '_, T> {
    /// Stores `item` at the write cursor, or hands it back with `Overflow`
    /// when the consumer has not freed a slot.
    #[inline]
    pub fn insert(&mut self, item: T) -> Result<(), (RingError, T)> {
        let capacity = self.ring.capacity;
        let write = self.ring.write.load(Ordering::Relaxed);
        let read = self.ring.read.load(Ordering::Acquire);

        if mirrored_distance(write, read, capacity) == capacity {
            return Err((RingError::Overflow { capacity }, item));
        }

        let slot = &self.ring.slots[mirrored_index(write, capacity)];
        // SAFETY: the slot is outside the occupied range, so the consumer
        // will not look at it until the store below publishes it.
        unsafe { *slot.get() = Some(item) };

        self.ring
            .write
            .store(advance_mirrored(write, capacity), Ordering::Release);
        Ok(())
    }

    /// Free slots as seen by the producer; never more than it can insert.
    #[inline]
    pub fn free_count(&self) -> usize {
        self.ring.free_count()
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }
}

impl<T> Consumer<'_, '_, T> {
    #[inline]
    pub fn remove(&mut self) -> Result<T, RingError> {
        let capacity = self.ring.capacity;
        let read = self.ring.read.load(Ordering::Relaxed);
        let write = self.ring.write.load(Ordering::Acquire);

        if write == read {
            return Err(RingError::Underflow);
        }

        let slot = &self.ring.slots[mirrored_index(read, capacity)];
        // SAFETY: the slot is inside the occupied range, which the producer
        // does not write until the store below releases it.
        let item = unsafe { (*slot.get()).take() }.ok_or(RingError::Underflow)?;

        self.ring
            .read
            .store(advance_mirrored(read, capacity), Ordering::Release);
        Ok(item)
    }

    /// Borrows the oldest record without consuming it.
    #[inline]
    pub fn peek(&self) -> Result<&T, RingError> {
        let capacity = self.ring.capacity;
        let read = self.ring.read.load(Ordering::Relaxed);
        let write = self.ring.write.load(Ordering::Acquire);

        if write == read {
            return Err(RingError::Underflow);
        }

        let slot = &self.ring.slots[mirrored_index(read, capacity)];
        // SAFETY: as in `remove`; the borrow of `self` keeps `remove` from
        // releasing the slot while the reference lives.
        unsafe { (*slot.get()).as_ref() }.ok_or(RingError::Underflow)
    }

    /// Records available to the consumer; never more than it can remove.
    #[inline]
    pub fn count(&self) -> usize {
        self.ring.count()
    }

    #[inline]
    pub fn free_count(&self) -> usize {
        self.ring.free_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.ring.capacity
    }
}
