//! Variables: every value-level node in the IR.
//!
//! A [`Var`] is a named wire, a port, a constant, a parameter, or an
//! anonymous view (expression, slice, concatenation, signed cast). The
//! payload distinguishing the kinds lives in [`VarKind`]; the attributes
//! shared by all kinds (width, signedness, array shape, driver/reader
//! sets) live on [`Var`] itself.

use crate::expr::ExprOp;
use crate::ids::{StmtRef, VarId, VarRef};
use quartz_common::Ident;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The direction of a module port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Data flows into the module.
    In,
    /// Data flows out of the module.
    Out,
    /// Bidirectional.
    InOut,
}

impl PortDirection {
    /// The SystemVerilog keyword for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            PortDirection::In => "input",
            PortDirection::Out => "output",
            PortDirection::InOut => "inout",
        }
    }
}

/// The semantic role of a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortType {
    /// An ordinary data port.
    Data,
    /// A clock input.
    Clock,
    /// An asynchronous reset.
    AsyncReset,
    /// A synchronous reset.
    Reset,
    /// A clock enable.
    ClockEnable,
}

/// The kind-specific payload of a [`Var`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VarKind {
    /// A plain named wire/reg declared inside the generator.
    Base,
    /// A module I/O.
    Port {
        /// Direction of data flow.
        direction: PortDirection,
        /// Semantic role.
        port_type: PortType,
        /// When set, the port is a placeholder for the named interface
        /// instance and collapses into one bundle emission.
        interface: Option<Ident>,
    },
    /// An integer literal, validated against the (width, signed) range.
    Const {
        /// The literal value.
        value: i64,
    },
    /// A module parameter.
    Param {
        /// The resolved value.
        value: i64,
        /// A parameter of the instantiating generator this one chains to.
        parent: Option<VarRef>,
    },
    /// The result of an operator application.
    Expression {
        /// The operator.
        op: ExprOp,
        /// The left (or sole) operand.
        left: VarId,
        /// The right operand; `None` for unary operators.
        right: Option<VarId>,
    },
    /// A function call usable as an expression or a call statement.
    Call {
        /// The function name.
        function: Ident,
        /// Argument variables in port order.
        args: Vec<VarId>,
    },
    /// A bit range `parent[high:low]` over another variable.
    Slice {
        /// The variable being sliced.
        parent: VarId,
        /// High bit, inclusive.
        high: u32,
        /// Low bit, inclusive.
        low: u32,
    },
    /// A concatenation `{a, b, …}`.
    Concat {
        /// The components, outermost first.
        parts: Vec<VarId>,
    },
    /// A `$signed(parent)` view; never assignable.
    Signed {
        /// The variable being cast.
        parent: VarId,
    },
}

/// A value-level IR node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Var {
    /// This variable's ID within its generator.
    pub id: VarId,
    /// The declared name; `None` for anonymous nodes (constants,
    /// expressions, slices, concatenations, signed views).
    pub name: Option<Ident>,
    /// Bit width of one element.
    pub width: u32,
    /// Whether arithmetic on this variable is signed.
    pub signed: bool,
    /// Array dimensions; `[1]` for scalars.
    pub size: Vec<u32>,
    /// Whether array dimensions are packed (emitted before the name).
    pub packed: bool,
    /// Forces array emission even when every dimension is 1.
    pub explicit_array: bool,
    /// A parameter variable whose name replaces the numeric width in
    /// declarations (`[<param>-1:0]`).
    pub width_param: Option<VarId>,
    /// The enum type this variable is declared with, if any.
    pub enum_ty: Option<Ident>,
    /// A comment emitted on the line before the declaration.
    pub comment: Option<String>,
    /// Kind-specific payload.
    pub kind: VarKind,
    /// Assignments driving this variable (it appears on the left).
    pub sources: BTreeSet<StmtRef>,
    /// Assignments reading this variable (it appears on the right).
    pub sinks: BTreeSet<StmtRef>,
    /// Memoized slices keyed by `(high, low)`.
    pub slices: BTreeMap<(u32, u32), VarId>,
    /// Memoized `$signed` view.
    pub signed_view: Option<VarId>,
    /// Concatenations whose first component is this variable.
    pub concats: Vec<VarId>,
}

impl Var {
    /// Creates a variable with scalar defaults; the builder fills in the
    /// kind-specific attributes afterwards.
    pub fn new(id: VarId, name: Option<Ident>, width: u32, signed: bool, kind: VarKind) -> Self {
        Self {
            id,
            name,
            width,
            signed,
            size: vec![1],
            packed: false,
            explicit_array: false,
            width_param: None,
            enum_ty: None,
            comment: None,
            kind,
            sources: BTreeSet::new(),
            sinks: BTreeSet::new(),
            slices: BTreeMap::new(),
            signed_view: None,
            concats: Vec::new(),
        }
    }

    /// Returns `true` if the variable is declared as an array.
    pub fn is_array(&self) -> bool {
        self.size.first().copied().unwrap_or(1) > 1 || self.size.len() > 1 || self.explicit_array
    }

    /// Returns `true` if this is a port.
    pub fn is_port(&self) -> bool {
        matches!(self.kind, VarKind::Port { .. })
    }

    /// Returns `true` if this port is backed by an interface instance.
    pub fn is_interface_port(&self) -> bool {
        matches!(
            self.kind,
            VarKind::Port {
                interface: Some(_),
                ..
            }
        )
    }

    /// The port direction, if this is a port.
    pub fn port_direction(&self) -> Option<PortDirection> {
        match self.kind {
            VarKind::Port { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Returns `true` if the variable may appear on the left of an
    /// assignment. Constants, parameters, expressions, calls,
    /// concatenations, and signed views may not.
    pub fn is_assignable(&self) -> bool {
        matches!(
            self.kind,
            VarKind::Base | VarKind::Port { .. } | VarKind::Slice { .. }
        )
    }

    /// Returns `true` if the variable may be rewired by
    /// `move_src_to`/`move_sink_to`. Expression-like and constant nodes
    /// may not.
    pub fn is_rewirable(&self) -> bool {
        !matches!(
            self.kind,
            VarKind::Const { .. }
                | VarKind::Param { .. }
                | VarKind::Expression { .. }
                | VarKind::Call { .. }
                | VarKind::Concat { .. }
        )
    }
}
