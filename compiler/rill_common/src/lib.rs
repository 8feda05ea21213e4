//! Shared utilities for the Rill language compiler
//!
//! This crate provides common functionality used across all compiler components:
//! - The pipeline-wide error shape and result alias
//! - Source location tracking
//! - Non-fatal finding collection
//! - The monotonic `Sequence` counter used for compiler-generated names

pub mod error;
pub mod notice;
pub mod sequence;
pub mod span;

pub use error::*;
pub use notice::*;
pub use sequence::*;
pub use span::*;
