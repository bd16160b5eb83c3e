//! Async runtime adapter: executes store effects and posts their completions back
//! onto the kernel bus.

mod async_runtime;
mod executor;

pub use async_runtime::{AsyncRuntime, EffectRunner};
pub use executor::{execute, failed_completion};
