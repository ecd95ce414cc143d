/// What `insert` does when every slot is occupied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail with [`RingError::Overflow`](super::RingError::Overflow).
    #[default]
    Reject,
    /// Evict the oldest unread record and hand it back to the caller.
    OverwriteOldest,
}

/// Ring of record references with exclusive (`&mut self`) access.
///
/// Sharing one between an interrupt and a main loop needs an outer critical
/// section; see [`SpscRingBuffer`](super::SpscRingBuffer) for the lock-free split.
pub struct RingBuffer<'s, T> {
    pub(crate) storage: &'s mut [Option<T>],
    pub(crate) capacity: usize,
    pub(crate) write_cursor: usize,
    pub(crate) read_cursor: usize,
    pub(crate) count: usize,
    pub(crate) policy: OverflowPolicy,
}
