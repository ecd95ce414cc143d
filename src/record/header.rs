use super::Record;
use std::mem::size_of;

/// Packed wire/memory layout of a queued record: a 16-bit address immediately
/// followed by a pointer to the payload, no padding.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy)]
pub struct RecordHeader {
    pub addr: u16,
    pub payload: *const u8,
}

impl RecordHeader {
    pub const SIZE: usize = size_of::<u16>() + size_of::<usize>();

    pub fn new(addr: u16, payload: *const u8) -> Self {
        Self { addr, payload }
    }

    #[inline]
    pub fn addr(&self) -> u16 {
        self.addr
    }

    #[inline]
    pub fn payload_ptr(&self) -> *const u8 {
        self.payload
    }

    /// Native-endian bytes, as a C producer on the same target lays them out.
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[..2].copy_from_slice(&self.addr().to_ne_bytes());
        out[2..].copy_from_slice(&(self.payload_ptr() as usize).to_ne_bytes());
        out
    }

    pub fn from_bytes(bytes: &[u8; Self::SIZE]) -> Self {
        let mut addr = [0u8; 2];
        addr.copy_from_slice(&bytes[..2]);
        let mut ptr = [0u8; size_of::<usize>()];
        ptr.copy_from_slice(&bytes[2..]);
        Self::new(
            u16::from_ne_bytes(addr),
            usize::from_ne_bytes(ptr) as *const u8,
        )
    }

    /// # Safety
    /// `payload_ptr()` must point to `len` initialised bytes that stay valid
    /// and unmodified for `'p`.
    pub unsafe fn as_record<'p>(&self, len: usize) -> Record<'p> {
        let payload = if len == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(self.payload_ptr(), len) }
        };
        Record::new(self.addr(), payload)
    }
}

impl From<&Record<'_>> for RecordHeader {
    fn from(record: &Record<'_>) -> Self {
        Self::new(record.addr, record.payload.as_ptr())
    }
}
