//! Error handling for decoding operations
//!
//! The error type lives in [`crate::common`]; this module re-exports it so
//! callers can write `wolfx::error::Result`.

pub use crate::common::Result;
pub use crate::common::WolfError;
