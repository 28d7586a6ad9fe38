pub mod pool;
pub mod worker;

// * Re-exports for convenient access
pub use pool::WorkerPool;
pub use worker::Worker;
