//! Shared primitive types used across the composer

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
