//! Services layer (ports + adapters).
//!
//! - `ports`: collaborator contracts and data types the store depends on.
//! - `adapters`: the async effect runner, settings IO and the JSON reference adapters.

pub mod adapters;
pub mod bus;
pub mod host;
pub mod ports;

pub use bus::{kernel_bus, KernelBusReceiver, KernelBusSender, KernelMessage};
pub use host::Collaborators;
