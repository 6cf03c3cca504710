//! Shared types

pub mod error;

pub use error::{AvasaraError, Result};
