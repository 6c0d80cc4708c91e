//! Application layer wiring parameter contracts, adapters and the capability registry.

pub mod dispatcher;
pub mod dtos;
pub mod registry;
pub mod services;

pub use dispatcher::{Dispatcher, ToolOutput};
pub use registry::{Capability, CapabilityRegistry};
pub use services::Workspace;
