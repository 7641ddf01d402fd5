//! Pluggable audit drivers.
//!
//! The driver contract, configuration, registry, and built-in backends.

pub mod backends;
pub mod config;
pub mod interface;
pub mod registry;

pub use config::{AuditConfig, ConsoleConfig, FileConfig, MemoryConfig};
pub use interface::AuditDriver;
pub use registry::{DriverFactory, DriverRegistry, ExternalConstructor};
