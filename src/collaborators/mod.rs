// External collaborators - alert transport and screen navigation

pub mod traits;
pub mod tracing_impl;

pub use traits::{AlertTransport, ExitHandler, ExitReason};
pub use tracing_impl::{TracingExitHandler, TracingTransport};

#[cfg(test)]
pub use traits::{MockAlertTransport, MockExitHandler};
