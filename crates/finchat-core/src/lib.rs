//! Core types for finchat
//!
//! This crate defines the turn-level error type shared by the LLM layer, the
//! tool registry and the orchestration runtime.

pub mod error;

pub use error::{Error, Result};
