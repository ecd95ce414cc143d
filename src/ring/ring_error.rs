use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    #[error("Ring buffer overflow: all {capacity} slots are occupied")]
    Overflow { capacity: usize },

    #[error("Ring buffer underflow: no record to read")]
    Underflow,

    #[error("Invalid capacity {capacity}: {reason}")]
    InvalidCapacity {
        capacity: usize,
        reason: &'static str,
    },

    #[error("Storage has {storage_len} slots but capacity is {capacity}")]
    StorageMismatch { capacity: usize, storage_len: usize },
}
