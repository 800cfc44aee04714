//! Traversal and transformation machinery for Quartz designs.
//!
//! [`Visitor`] walks a generator hierarchy depth-first from the top;
//! [`PassManager`] runs an ordered list of named passes over a design,
//! stopping at the first error.

#![warn(missing_docs)]

pub mod manager;
pub mod visitor;

pub use manager::PassManager;
pub use visitor::{reachable_generators, Visitor};
