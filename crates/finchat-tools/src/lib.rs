//! Tool management and execution framework for finchat
//!
//! This crate provides the [`Tool`] trait the model-callable functions
//! implement, the descriptors sent to the model, and the [`ToolRegistry`]
//! that turns every tool outcome into bounded text.

pub mod registry;
pub mod result;
pub mod tool;

pub use registry::{DEFAULT_MAX_RESULT_CHARS, ToolRegistry};
pub use result::{TRUNCATION_MARKER, ToolResult, truncate_chars};
pub use tool::{Tool, ToolDescriptor, ToolError, ToolParameter};
