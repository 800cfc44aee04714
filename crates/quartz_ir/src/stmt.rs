//! Statements: assignments, blocks, control flow, and instantiations.
//!
//! A [`Stmt`] pairs a [`StmtKind`] payload with the attributes every
//! statement shares: its attachment parent and an optional comment. Block
//! statements own their children as ordered `StmtId` lists.

use crate::ids::{GeneratorId, StmtId, VarId, VarRef};
use indexmap::IndexMap;
use quartz_common::Ident;
use serde::{Deserialize, Serialize};

/// How an assignment is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignKind {
    /// `=`, continuous or blocking.
    Blocking,
    /// `<=`, non-blocking, sequential blocks only.
    NonBlocking,
    /// Not yet committed; resolved when the statement is attached or when
    /// another driver of the same destination commits.
    Undefined,
}

/// A clock edge in a sensitivity list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Rising edge.
    Posedge,
    /// Falling edge.
    Negedge,
}

impl EdgeType {
    /// The SystemVerilog keyword for this edge.
    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Posedge => "posedge",
            EdgeType::Negedge => "negedge",
        }
    }
}

/// Where a statement is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StmtParent {
    /// Not attached anywhere yet.
    Detached,
    /// Attached directly to the generator body (a top-level statement).
    Generator,
    /// Owned by another statement (a block, an if, or a switch).
    Stmt(StmtId),
}

/// An assignment `left ← right`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assign {
    /// The destination. May live in another generator (a child port).
    pub left: VarRef,
    /// The driven value.
    pub right: VarRef,
    /// The assignment kind.
    pub kind: AssignKind,
}

/// The payload of a function block: signature and emission hints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionBlock {
    /// The function name.
    pub name: Ident,
    /// Function ports by name, in declaration order.
    pub ports: IndexMap<Ident, VarId>,
    /// Optional explicit port ordering; alphabetical when absent.
    pub ordering: Option<Vec<Ident>>,
    /// Whether the function returns a value (`void` is emitted otherwise).
    pub has_return: bool,
    /// DPI imports are declared elsewhere and skipped by emission.
    pub dpi: bool,
}

/// How a statement block is rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BlockKind {
    /// `always_ff @(edge sig, …)`.
    Sequential {
        /// The sensitivity list as `(edge, variable)` pairs.
        sensitivity: Vec<(EdgeType, VarId)>,
    },
    /// `always_comb`.
    Combinational,
    /// `initial`.
    Initial,
    /// A plain `begin … end` scope.
    Scoped,
    /// A function body.
    Function(FunctionBlock),
}

/// An ordered container of statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Rendering flavor and flavor-specific payload.
    pub kind: BlockKind,
    /// Children in execution order.
    pub children: Vec<StmtId>,
    /// Optional label, rendered as `begin :label` / `end :label`.
    pub label: Option<Ident>,
}

/// An if-else statement. Both bodies are scoped blocks; an else body with
/// exactly one child renders as `else if`/`else <stmt>` on one line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IfStmt {
    /// The condition.
    pub predicate: VarId,
    /// The scoped block executed when the predicate holds.
    pub then_body: StmtId,
    /// The scoped block executed otherwise (may be empty).
    pub else_body: StmtId,
}

/// One arm of a switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchCase {
    /// The matched constant; `None` marks the default arm.
    pub value: Option<VarId>,
    /// The scoped block executed on a match.
    pub body: StmtId,
}

/// A `unique case` statement. Arms are kept in insertion order and sorted
/// by constant value at emission, default last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Switch {
    /// The subject expression.
    pub target: VarId,
    /// The arms, at most one of which is the default.
    pub cases: Vec<SwitchCase>,
}

/// An instantiation of a child generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleInstantiation {
    /// The instantiated generator.
    pub target: GeneratorId,
    /// Connections `(child port, parent-side value)`, sorted by port name
    /// at emission.
    pub connections: Vec<(VarId, VarRef)>,
}

/// An instantiation of an interface bundle inside a generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterfaceInstantiation {
    /// The interface instance name, registered on the generator.
    pub instance: Ident,
    /// Connections `(interface port name, local variable)`.
    pub connections: Vec<(Ident, VarId)>,
}

/// The kind-specific payload of a [`Stmt`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StmtKind {
    /// `left = right` / `left <= right` / `assign left = right`.
    Assign(Assign),
    /// A statement block.
    Block(Block),
    /// `if (pred) … else …`.
    If(IfStmt),
    /// `unique case (target) … endcase`.
    Switch(Switch),
    /// `child_module #(…) instance (…);`.
    ModuleInstantiation(ModuleInstantiation),
    /// `bus_if the_bus(…);`.
    InterfaceInstantiation(InterfaceInstantiation),
    /// A function call in statement position.
    FunctionCall {
        /// The call expression variable.
        call: VarId,
    },
    /// `return value;`.
    Return {
        /// The returned value.
        value: VarId,
    },
    /// `assert (value) [else …];`.
    AssertValue {
        /// The asserted value.
        value: VarId,
        /// An optional statement dispatched inline after `else`.
        else_stmt: Option<StmtId>,
    },
    /// One `// …` line per entry.
    Comment {
        /// The comment lines, without the `//` prefix.
        lines: Vec<String>,
    },
    /// Verbatim lines, indented but otherwise untouched.
    RawString {
        /// The raw lines.
        lines: Vec<String>,
    },
}

/// A statement node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stmt {
    /// This statement's ID within its generator.
    pub id: StmtId,
    /// Where the statement is attached.
    pub parent: StmtParent,
    /// A comment emitted on the line before the statement.
    pub comment: Option<String>,
    /// Kind-specific payload.
    pub kind: StmtKind,
}

impl Stmt {
    /// Creates a detached statement.
    pub fn new(id: StmtId, kind: StmtKind) -> Self {
        Self {
            id,
            parent: StmtParent::Detached,
            comment: None,
            kind,
        }
    }

    /// Returns the assignment payload, if this is an assignment.
    pub fn as_assign(&self) -> Option<&Assign> {
        match &self.kind {
            StmtKind::Assign(a) => Some(a),
            _ => None,
        }
    }

    /// Returns the block payload, if this is a block.
    pub fn as_block(&self) -> Option<&Block> {
        match &self.kind {
            StmtKind::Block(b) => Some(b),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::VarRef;

    fn assign_stmt(kind: AssignKind) -> Stmt {
        let g = GeneratorId::from_raw(0);
        Stmt::new(
            StmtId::from_raw(0),
            StmtKind::Assign(Assign {
                left: VarRef::new(g, VarId::from_raw(0)),
                right: VarRef::new(g, VarId::from_raw(1)),
                kind,
            }),
        )
    }

    #[test]
    fn new_statements_are_detached() {
        let stmt = assign_stmt(AssignKind::Undefined);
        assert_eq!(stmt.parent, StmtParent::Detached);
        assert!(stmt.comment.is_none());
    }

    #[test]
    fn as_assign_accessor() {
        let stmt = assign_stmt(AssignKind::NonBlocking);
        assert_eq!(stmt.as_assign().unwrap().kind, AssignKind::NonBlocking);
        assert!(stmt.as_block().is_none());
    }

    #[test]
    fn sequential_block_keeps_sensitivity_order() {
        let block = Block {
            kind: BlockKind::Sequential {
                sensitivity: vec![
                    (EdgeType::Posedge, VarId::from_raw(0)),
                    (EdgeType::Negedge, VarId::from_raw(1)),
                ],
            },
            children: Vec::new(),
            label: None,
        };
        if let BlockKind::Sequential { sensitivity } = &block.kind {
            assert_eq!(sensitivity[0].0, EdgeType::Posedge);
            assert_eq!(sensitivity[1].0, EdgeType::Negedge);
        } else {
            panic!("expected Sequential");
        }
    }

    #[test]
    fn edge_keywords() {
        assert_eq!(EdgeType::Posedge.as_str(), "posedge");
        assert_eq!(EdgeType::Negedge.as_str(), "negedge");
    }

    #[test]
    fn switch_default_is_none_key() {
        let sw = Switch {
            target: VarId::from_raw(0),
            cases: vec![
                SwitchCase {
                    value: Some(VarId::from_raw(1)),
                    body: StmtId::from_raw(1),
                },
                SwitchCase {
                    value: None,
                    body: StmtId::from_raw(2),
                },
            ],
        };
        assert_eq!(sw.cases.iter().filter(|c| c.value.is_none()).count(), 1);
    }

    #[test]
    fn stmt_serde_roundtrip() {
        let stmt = assign_stmt(AssignKind::Blocking);
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Stmt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_assign().unwrap().kind, AssignKind::Blocking);
    }
}
