//! # Perfshot Common
//!
//! Shared error types and result aliases for the perfshot harness.
//!
//! All other perfshot crates build on the types defined here.

pub mod errors;

pub use errors::{HarnessError, HarnessResult, ProcessError, ProcessResult};
