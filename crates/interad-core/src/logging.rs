#![forbid(unsafe_code)]

//! Logging and tracing support.
//!
//! Re-exports of the tracing macros used across the workspace so downstream
//! crates can pull them from one place.

pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
