use super::slots::{advance, validate};
use super::{OverflowPolicy, RingError};
use crate::ring::RingBuffer;

impl<'s, T> RingBuffer<'s, T> {
    /// Binds the ring to `storage`, taking the capacity from its length.
    pub fn new(storage: &'s mut [Option<T>]) -> Result<Self, RingError> {
        let capacity = storage.len();
        Self::init(storage, capacity)
    }

    /// Binds the ring to `storage`, which must hold exactly `capacity` slots.
    ///
    /// Anything left in `storage` is dropped and every slot starts vacant.
    pub fn init(storage: &'s mut [Option<T>], capacity: usize) -> Result<Self, RingError> {
        Self::with_policy(storage, capacity, OverflowPolicy::Reject)
    }

    pub fn with_policy(
        storage: &'s mut [Option<T>],
        capacity: usize,
        policy: OverflowPolicy,
    ) -> Result<Self, RingError> {
        validate(storage, capacity)?;

        let mut ring = Self {
            storage,
            capacity,
            write_cursor: 0,
            read_cursor: 0,
            count: 0,
            policy,
        };
        ring.reset();
        Ok(ring)
    }

    /// Returns the ring to the empty state without looking at what it held.
    pub fn reset(&mut self) {
        self.storage.iter_mut().for_each(|slot| *slot = None);
        self.write_cursor = 0;
        self.read_cursor = 0;
        self.count = 0;
        tracing::debug!(capacity = self.capacity, policy = ?self.policy, "ring buffer reset");
    }

    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub fn free_count(&self) -> usize {
        self.capacity - self.count
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline(always)]
    pub fn is_full(&self) -> bool {
        self.count == self.capacity
    }

    #[inline(always)]
    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    #[inline(always)]
    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Stores `item` at the write cursor.
    ///
    /// On a full ring this fails under [`OverflowPolicy::Reject`], handing
    /// `item` back so it can be retried, or evicts and returns the oldest
    /// record under [`OverflowPolicy::OverwriteOldest`].
    #[inline]
    pub fn insert(&mut self, item: T) -> Result<Option<T>, (RingError, T)> {
        let evicted = if self.is_full() {
            match self.policy {
                OverflowPolicy::Reject => {
                    return Err((
                        RingError::Overflow {
                            capacity: self.capacity,
                        },
                        item,
                    ));
                }
                OverflowPolicy::OverwriteOldest => {
                    let oldest = self.storage[self.read_cursor].take();
                    self.read_cursor = advance(self.read_cursor, self.capacity);
                    self.count -= 1;
                    tracing::trace!(capacity = self.capacity, "overwrote oldest record");
                    oldest
                }
            }
        } else {
            None
        };

        self.storage[self.write_cursor] = Some(item);
        self.write_cursor = advance(self.write_cursor, self.capacity);
        self.count += 1;
        Ok(evicted)
    }

    #[inline]
    pub fn remove(&mut self) -> Result<T, RingError> {
        if self.is_empty() {
            return Err(RingError::Underflow);
        }

        let item = self.storage[self.read_cursor]
            .take()
            .ok_or(RingError::Underflow)?;
        self.read_cursor = advance(self.read_cursor, self.capacity);
        self.count -= 1;
        Ok(item)
    }

    #[inline]
    pub fn peek(&self) -> Result<&T, RingError> {
        if self.is_empty() {
            return Err(RingError::Underflow);
        }
        self.storage[self.read_cursor]
            .as_ref()
            .ok_or(RingError::Underflow)
    }
}
