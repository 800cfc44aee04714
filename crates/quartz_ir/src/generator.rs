//! Generators: the module-level scope of the IR.
//!
//! A [`Generator`] owns the arenas of its variables and statements plus
//! the named registries (ports, parameters, enums, functions, interface
//! instances) and the ordered top-level statement body. Generators form a
//! hierarchy through module instantiation statements.

use crate::arena::Arena;
use crate::ids::{GeneratorId, StmtId, VarId};
use crate::interface::InterfaceInst;
use crate::stmt::Stmt;
use crate::var::{Var, VarKind};
use indexmap::IndexMap;
use quartz_common::Ident;
use serde::{Deserialize, Serialize};

/// A typed enumeration declared inside a generator.
///
/// `values` maps member names to `Const` variables in declaration order;
/// emission sorts members by constant value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumDef {
    /// The enum type name.
    pub name: Ident,
    /// Bit width of the underlying logic vector.
    pub width: u32,
    /// Member name → `Const` variable, in declaration order.
    pub values: IndexMap<Ident, VarId>,
}

/// A hardware module under construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generator {
    /// This generator's ID in the design.
    pub id: GeneratorId,
    /// The module name.
    pub name: Ident,
    /// The instance name used when this generator is instantiated.
    pub instance_name: Option<Ident>,
    /// External generators are declared elsewhere; emission skips them.
    pub external: bool,
    /// When set, emission records output line numbers for this generator's
    /// statements and declarations.
    pub debug: bool,
    /// Every value-level node of this generator.
    pub vars: Arena<VarId, Var>,
    /// Every statement of this generator, attached or not.
    pub stmts: Arena<StmtId, Stmt>,
    /// Named variables (ports, wires, parameters) in declaration order.
    /// Names are unique across all three.
    pub named: IndexMap<Ident, VarId>,
    /// Port variables in declaration order.
    pub ports: Vec<VarId>,
    /// Parameters by name, in declaration order.
    pub params: IndexMap<Ident, VarId>,
    /// Enum definitions by name, in declaration order.
    pub enums: IndexMap<Ident, EnumDef>,
    /// Function blocks by name, in declaration order.
    pub functions: IndexMap<Ident, StmtId>,
    /// Interface instances by reference name.
    pub interfaces: IndexMap<Ident, InterfaceInst>,
    /// Instantiated child generators, in instantiation order.
    pub children: Vec<GeneratorId>,
    /// Top-level statements in attachment order.
    pub body: Vec<StmtId>,
    /// Labeled blocks by label.
    pub named_blocks: IndexMap<Ident, StmtId>,
}

impl Generator {
    /// Creates an empty generator.
    pub fn new(id: GeneratorId, name: Ident) -> Self {
        Self {
            id,
            name,
            instance_name: None,
            external: false,
            debug: false,
            vars: Arena::new(),
            stmts: Arena::new(),
            named: IndexMap::new(),
            ports: Vec::new(),
            params: IndexMap::new(),
            enums: IndexMap::new(),
            functions: IndexMap::new(),
            interfaces: IndexMap::new(),
            children: Vec::new(),
            body: Vec::new(),
            named_blocks: IndexMap::new(),
        }
    }

    /// Looks up a named variable (port, wire, or parameter).
    pub fn find_var(&self, name: Ident) -> Option<VarId> {
        self.named.get(&name).copied()
    }

    /// The number of top-level statements.
    pub fn stmts_count(&self) -> usize {
        self.body.len()
    }

    /// The `index`-th top-level statement.
    pub fn get_stmt(&self, index: usize) -> Option<StmtId> {
        self.body.get(index).copied()
    }

    /// Iterates the top-level statements in attachment order.
    pub fn stmts_iter(&self) -> impl Iterator<Item = StmtId> + '_ {
        self.body.iter().copied()
    }

    /// Port names in declaration order. Emission sorts them.
    pub fn get_port_names(&self) -> Vec<Ident> {
        self.ports
            .iter()
            .filter_map(|&id| self.vars[id].name)
            .collect()
    }

    /// Names of all named variables in declaration order.
    pub fn get_vars(&self) -> Vec<Ident> {
        self.named.keys().copied().collect()
    }

    /// Names of variables declared as plain wires (kind `Base`), in
    /// declaration order. These are the declarations a module body emits.
    pub fn base_var_names(&self) -> Vec<Ident> {
        self.named
            .iter()
            .filter(|(_, &id)| matches!(self.vars[id].kind, VarKind::Base))
            .map(|(&name, _)| name)
            .collect()
    }

    /// Labels of all labeled blocks, in declaration order.
    pub fn named_blocks_labels(&self) -> Vec<Ident> {
        self.named_blocks.keys().copied().collect()
    }

    /// Looks up a labeled block.
    pub fn get_named_block(&self, label: Ident) -> Option<StmtId> {
        self.named_blocks.get(&label).copied()
    }

    /// The function blocks in declaration order.
    pub fn get_functions(&self) -> impl Iterator<Item = (Ident, StmtId)> + '_ {
        self.functions.iter().map(|(&name, &id)| (name, id))
    }

    /// The enum definitions in declaration order.
    pub fn get_enums(&self) -> impl Iterator<Item = &EnumDef> {
        self.enums.values()
    }

    /// The parameters in declaration order.
    pub fn get_params(&self) -> impl Iterator<Item = (Ident, VarId)> + '_ {
        self.params.iter().map(|(&name, &id)| (name, id))
    }
}
