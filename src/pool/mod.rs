pub mod payload_pool;
pub mod pool_error;

pub use payload_pool::PayloadPool;
pub use pool_error::PoolError;
