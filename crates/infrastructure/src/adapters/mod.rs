//! Port adapters backed by real I/O.

mod reqwest_executor;
mod system_clock;

pub use reqwest_executor::ReqwestExecutor;
pub use system_clock::SystemClock;
