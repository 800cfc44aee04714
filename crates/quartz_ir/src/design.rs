//! The top-level design container.
//!
//! A [`Design`] owns every generator, every interface definition, and the
//! string interner behind all names. It is the single argument threaded
//! through passes and emission.

use crate::arena::Arena;
use crate::generator::Generator;
use crate::ids::{GeneratorId, InterfaceId, StmtRef, VarRef};
use crate::interface::InterfaceDefinition;
use crate::stmt::Stmt;
use crate::var::Var;
use quartz_common::{Ident, Interner};
use serde::{Deserialize, Serialize};

/// A complete hardware design under construction.
#[derive(Serialize, Deserialize)]
pub struct Design {
    /// The interner backing every [`Ident`] in the design.
    pub interner: Interner,
    /// All generators; hierarchy is expressed by instantiation statements.
    pub generators: Arena<GeneratorId, Generator>,
    /// All interface definitions.
    pub interfaces: Arena<InterfaceId, InterfaceDefinition>,
    /// The root of the hierarchy. The first generator added becomes the
    /// top unless overridden with [`set_top`](Self::set_top).
    pub top: Option<GeneratorId>,
}

impl Design {
    /// Creates an empty design.
    pub fn new() -> Self {
        Self {
            interner: Interner::new(),
            generators: Arena::new(),
            interfaces: Arena::new(),
            top: None,
        }
    }

    /// Interns a name.
    pub fn intern(&self, s: &str) -> Ident {
        self.interner.intern(s)
    }

    /// Resolves an interned name.
    pub fn resolve(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    /// Adds an empty generator. The first one added becomes the top.
    pub fn add_generator(&mut self, name: &str) -> GeneratorId {
        let ident = self.intern(name);
        let id = self.generators.next_id();
        self.generators.alloc(Generator::new(id, ident));
        if self.top.is_none() {
            self.top = Some(id);
        }
        id
    }

    /// Overrides the top generator.
    pub fn set_top(&mut self, id: GeneratorId) {
        self.top = Some(id);
    }

    /// Returns a generator.
    pub fn generator(&self, id: GeneratorId) -> &Generator {
        &self.generators[id]
    }

    /// Returns a generator mutably.
    pub fn generator_mut(&mut self, id: GeneratorId) -> &mut Generator {
        &mut self.generators[id]
    }

    /// The resolved name of a generator.
    pub fn generator_name(&self, id: GeneratorId) -> &str {
        self.resolve(self.generators[id].name)
    }

    /// Returns the variable behind a handle.
    pub fn var_data(&self, r: VarRef) -> &Var {
        &self.generators[r.generator].vars[r.var]
    }

    /// Returns the variable behind a handle mutably.
    pub fn var_mut(&mut self, r: VarRef) -> &mut Var {
        &mut self.generators[r.generator].vars[r.var]
    }

    /// Returns the statement behind a handle.
    pub fn stmt(&self, r: StmtRef) -> &Stmt {
        &self.generators[r.generator].stmts[r.stmt]
    }

    /// Returns the statement behind a handle mutably.
    pub fn stmt_mut(&mut self, r: StmtRef) -> &mut Stmt {
        &mut self.generators[r.generator].stmts[r.stmt]
    }

    /// Marks a generator as externally defined (skipped by emission).
    pub fn set_external(&mut self, id: GeneratorId, external: bool) {
        self.generators[id].external = external;
    }

    /// Enables line-number recording for a generator's emission.
    pub fn set_debug(&mut self, id: GeneratorId, debug: bool) {
        self.generators[id].debug = debug;
    }
}

impl Default for Design {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Design {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Design")
            .field("generators", &self.generators.len())
            .field("interfaces", &self.interfaces.len())
            .field("top", &self.top)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_generator_becomes_top() {
        let mut d = Design::new();
        let a = d.add_generator("top");
        let _b = d.add_generator("child");
        assert_eq!(d.top, Some(a));
        assert_eq!(d.generator_name(a), "top");
    }

    #[test]
    fn set_top_overrides() {
        let mut d = Design::new();
        let _a = d.add_generator("a");
        let b = d.add_generator("b");
        d.set_top(b);
        assert_eq!(d.top, Some(b));
    }

    #[test]
    fn flags_are_per_generator() {
        let mut d = Design::new();
        let g = d.add_generator("m");
        assert!(!d.generator(g).external);
        d.set_external(g, true);
        d.set_debug(g, true);
        assert!(d.generator(g).external);
        assert!(d.generator(g).debug);
    }

    #[test]
    fn intern_is_stable() {
        let d = Design::new();
        let a = d.intern("sig");
        let b = d.intern("sig");
        assert_eq!(a, b);
        assert_eq!(d.resolve(a), "sig");
    }
}
