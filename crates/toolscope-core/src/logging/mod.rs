//! Logging abstractions
//!
//! Components take an injected [`SharedLogger`]; the global file logger is
//! for traces from places that have no logger handle.

mod traits;
mod noop;
mod console;
mod memory;
pub mod file_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use memory::MemoryLogger;

pub use file_logger::{
    log, trace, debug, info, warn, error,
    log_file_path, clear_log, FileLogger, LogLevel,
};
