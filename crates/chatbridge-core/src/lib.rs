//! Shared error and text primitives for chatbridge.

pub mod error;
pub mod text;
