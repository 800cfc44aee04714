//! Shared primitives for the Quartz hardware construction library.
//!
//! This crate provides the two things every other Quartz crate needs:
//! interned [`Ident`]s for cheap name handling, and the [`InternalError`]
//! type for failures that indicate a bug in Quartz rather than a problem
//! with the design being built.

#![warn(missing_docs)]

pub mod ident;
pub mod result;

pub use ident::{Ident, Interner};
pub use result::{InternalError, QuartzResult};
