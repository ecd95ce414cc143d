use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Pool geometry must be non-zero: block_size={block_size}, blocks={blocks}")]
    ZeroGeometry { block_size: usize, blocks: usize },

    #[error("Block {index} out of range: pool has {blocks} blocks")]
    BlockOutOfRange { index: usize, blocks: usize },

    #[error("Payload too large: {payload_len} bytes exceeds block size of {block_size} bytes")]
    PayloadTooLarge {
        payload_len: usize,
        block_size: usize,
    },

    #[error("Pool mapping failed: {0}")]
    Io(#[from] io::Error),
}
