//! Opaque ID newtypes and cross-generator reference pairs.
//!
//! Plain IDs ([`VarId`], [`StmtId`]) index into the arenas of one
//! [`Generator`](crate::generator::Generator) and are meaningless without
//! it. [`VarRef`] and [`StmtRef`] bundle the generator in, and are the
//! handles the builder API hands out and accepts.

use crate::arena::ArenaId;
use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl ArenaId for $name {
            fn from_raw(index: u32) -> Self {
                Self(index)
            }

            fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// ID of a generator (module) in a design.
    GeneratorId
);

define_id!(
    /// ID of a variable within a generator.
    VarId
);

define_id!(
    /// ID of a statement within a generator.
    StmtId
);

define_id!(
    /// ID of an interface definition in a design.
    InterfaceId
);

/// A variable handle that carries its owning generator.
///
/// This is what the builder API returns: it lets a parent generator refer
/// to a child's port without any shared-pointer machinery.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct VarRef {
    /// The generator owning the variable.
    pub generator: GeneratorId,
    /// The variable within that generator.
    pub var: VarId,
}

impl VarRef {
    /// Pairs a generator with one of its variables.
    pub fn new(generator: GeneratorId, var: VarId) -> Self {
        Self { generator, var }
    }
}

/// A statement handle that carries its owning generator.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct StmtRef {
    /// The generator owning the statement.
    pub generator: GeneratorId,
    /// The statement within that generator.
    pub stmt: StmtId,
}

impl StmtRef {
    /// Pairs a generator with one of its statements.
    pub fn new(generator: GeneratorId, stmt: StmtId) -> Self {
        Self { generator, stmt }
    }
}
