pub mod conversion;
pub mod debug_report;
pub mod error;
pub mod platform;
pub mod settings;
pub mod storage;
pub mod user;

// Re-export common error type
pub use error::WfconvError;
