//! Process-level setup shared by the library's binaries.

mod logger;

pub use logger::init_logger_with;
