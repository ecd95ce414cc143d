use super::RecordHeader;

/// Borrowed view of a record whose payload lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'p> {
    pub addr: u16,
    pub payload: &'p [u8],
}

impl<'p> Record<'p> {
    pub fn new(addr: u16, payload: &'p [u8]) -> Self {
        Self { addr, payload }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn header(&self) -> RecordHeader {
        RecordHeader::from(self)
    }
}
