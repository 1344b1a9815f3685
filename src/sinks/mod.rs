//! Sink implementations

pub mod console;
pub mod file;
pub mod rotate;

pub use console::{ConsoleRoute, ConsoleSink};
pub use file::FileSink;
pub use rotate::{FileRotateConfig, RotateWriter};

// Re-export the trait next to its implementations
pub use crate::core::Sink;
