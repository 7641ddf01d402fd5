//! Built-in audit drivers.

pub mod console;
pub mod file;
pub mod memory;

pub use console::ConsoleDriver;
pub use file::FileDriver;
pub use memory::MemoryDriver;
