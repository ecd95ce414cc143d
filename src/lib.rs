//! Fixed-capacity circular queue of record references for handing records
//! from one producer context (an interrupt, a capture thread) to one consumer
//! context (a main loop) without allocating or blocking.
//!
//! Storage is supplied by the caller. [`ring::RingBuffer`] is the exclusive
//! flavour with an opt-in overwrite-oldest policy; [`ring::SpscRingBuffer`]
//! splits into a lock-free [`ring::Producer`] and [`ring::Consumer`].

pub mod pool;
pub mod record;
pub mod ring;
pub mod sink;
