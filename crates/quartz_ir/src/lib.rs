//! QuartzIR — the in-memory hardware representation behind the Quartz
//! SystemVerilog emitter.
//!
//! A host program builds a tree of [`Generator`]s (hardware modules) inside
//! a [`Design`], wiring [`Var`]s together with expressions and assignment
//! statements, and then hands the design to `quartz_codegen` for emission.
//!
//! # Architecture
//!
//! - **[`Arena`]** provides dense, ID-indexed storage; every IR entity is
//!   referred to by an opaque `Copy` ID ([`GeneratorId`], [`VarId`],
//!   [`StmtId`], [`InterfaceId`]).
//! - **Tagged variants** ([`VarKind`], [`StmtKind`]) carry the per-kind
//!   payload next to a common attribute struct; consumers dispatch with a
//!   flat `match`.
//! - **[`VarRef`]/[`StmtRef`]** pair an ID with its owning generator so
//!   assignments may cross module boundaries (a parent driving a child
//!   port) while expressions stay within one generator.
//! - Construction goes through [`Design`] builder methods, which enforce
//!   the IR invariants (name uniqueness, constant ranges, slice bounds,
//!   assignment-kind discipline) and report violations as [`IrError`].
//!
//! All types derive `Serialize`/`Deserialize` so a design can be dumped or
//! shipped across a stage boundary.

#![warn(missing_docs)]

pub mod arena;
pub mod build;
pub mod design;
pub mod error;
pub mod expr;
pub mod generator;
pub mod ids;
pub mod interface;
pub mod render;
pub mod stmt;
pub mod var;

pub use arena::{Arena, ArenaId};
pub use design::Design;
pub use error::IrError;
pub use expr::ExprOp;
pub use generator::{EnumDef, Generator};
pub use ids::{GeneratorId, InterfaceId, StmtId, StmtRef, VarId, VarRef};
pub use interface::{IfacePort, IfaceVar, InterfaceDefinition, InterfaceInst, ModPort};
pub use render::const_text;
pub use stmt::{
    Assign, AssignKind, Block, BlockKind, EdgeType, FunctionBlock, IfStmt, InterfaceInstantiation,
    ModuleInstantiation, Stmt, StmtKind, StmtParent, Switch, SwitchCase,
};
pub use var::{PortDirection, PortType, Var, VarKind};
