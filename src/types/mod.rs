//! Type definitions module
//!
//! Core types shared by the pipeline and the terminal front-end.

pub mod messages;

// Re-export commonly used types
pub use messages::{Message, Role};
