pub mod buffer;
pub mod ops;
pub mod ring_error;
mod slots;
pub mod spsc;

pub use buffer::{OverflowPolicy, RingBuffer};
pub use ring_error::*;
pub use spsc::*;
