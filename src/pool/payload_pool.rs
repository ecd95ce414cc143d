use super::PoolError;
use crate::record::Record;
use memmap2::MmapMut;
use std::io;

/// Fixed arena of equally sized payload blocks, mapped once up front.
///
/// Records queued in a ring borrow their payload from here, so the producer
/// path never allocates.
pub struct PayloadPool {
    map: MmapMut,
    block_size: usize,
    lens: Box<[usize]>,
}

impl PayloadPool {
    pub fn new(block_size: usize, blocks: usize) -> Result<Self, PoolError> {
        if block_size == 0 || blocks == 0 {
            return Err(PoolError::ZeroGeometry { block_size, blocks });
        }

        let len = block_size.checked_mul(blocks).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "pool size overflows usize")
        })?;
        let map = MmapMut::map_anon(len)?;

        tracing::debug!(block_size, blocks, bytes = len, "payload pool mapped");

        Ok(Self {
            map,
            block_size,
            lens: vec![0; blocks].into_boxed_slice(),
        })
    }

    #[inline]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    #[inline]
    pub fn blocks(&self) -> usize {
        self.lens.len()
    }

    /// Copies `payload` into block `index`, replacing what was there.
    pub fn write(&mut self, index: usize, payload: &[u8]) -> Result<(), PoolError> {
        self.check_index(index)?;
        if payload.len() > self.block_size {
            return Err(PoolError::PayloadTooLarge {
                payload_len: payload.len(),
                block_size: self.block_size,
            });
        }

        let start = index * self.block_size;
        self.map[start..start + payload.len()].copy_from_slice(payload);
        self.lens[index] = payload.len();
        Ok(())
    }

    /// The bytes last written to block `index`.
    pub fn payload(&self, index: usize) -> Option<&[u8]> {
        let len = *self.lens.get(index)?;
        let start = index * self.block_size;
        Some(&self.map[start..start + len])
    }

    pub fn record(&self, index: usize, addr: u16) -> Option<Record<'_>> {
        self.payload(index).map(|payload| Record::new(addr, payload))
    }

    /// Locks the mapping in RAM so reads from an interrupt path cannot fault.
    pub fn pin(&self) -> Result<(), PoolError> {
        let result = unsafe { libc::mlock(self.map.as_ptr() as *const libc::c_void, self.map.len()) };

        if result == 0 {
            Ok(())
        } else {
            Err(PoolError::Io(io::Error::last_os_error()))
        }
    }

    fn check_index(&self, index: usize) -> Result<(), PoolError> {
        if index < self.blocks() {
            Ok(())
        } else {
            Err(PoolError::BlockOutOfRange {
                index,
                blocks: self.blocks(),
            })
        }
    }
}
