//! Interface definitions, modports, and per-generator instances.
//!
//! An [`InterfaceDefinition`] is a reusable bundle of ports, internal
//! variables, and modport views. Generators hold [`InterfaceInst`]s that
//! point back at a definition; the aggregation pass in `quartz_codegen`
//! checks that every instantiation of one definition name agrees
//! structurally and emits each definition once.

use crate::ids::InterfaceId;
use crate::var::PortDirection;
use indexmap::IndexMap;
use quartz_common::Ident;
use serde::{Deserialize, Serialize};

/// A port in an interface definition's header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfacePort {
    /// Direction of data flow.
    pub direction: PortDirection,
    /// Bit width.
    pub width: u32,
    /// Array dimensions; `[1]` for scalars.
    pub size: Vec<u32>,
    /// Whether arithmetic is signed.
    pub signed: bool,
}

/// An internal variable of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfaceVar {
    /// Bit width.
    pub width: u32,
    /// Array dimensions; `[1]` for scalars.
    pub size: Vec<u32>,
    /// Whether arithmetic is signed.
    pub signed: bool,
}

/// A named directional view of an interface's signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModPort {
    /// Signals visible as inputs through this view.
    pub inputs: Vec<Ident>,
    /// Signals visible as outputs through this view.
    pub outputs: Vec<Ident>,
}

impl ModPort {
    /// Returns `true` if the modport exposes no signals. Empty modports
    /// are rejected at aggregation.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// A reusable interface bundle shared across generators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceDefinition {
    /// The definition name (`interface <def_name> … endinterface`).
    pub def_name: Ident,
    /// Header ports in declaration order.
    pub ports: IndexMap<Ident, IfacePort>,
    /// Internal variables in declaration order.
    pub vars: IndexMap<Ident, IfaceVar>,
    /// Modport views in declaration order.
    pub mod_ports: IndexMap<Ident, ModPort>,
}

impl InterfaceDefinition {
    /// Creates an empty definition with the given name.
    pub fn new(def_name: Ident) -> Self {
        Self {
            def_name,
            ports: IndexMap::new(),
            vars: IndexMap::new(),
            mod_ports: IndexMap::new(),
        }
    }

    /// The width of the named signal, searching vars then ports.
    pub fn signal_width(&self, name: Ident) -> Option<u32> {
        self.vars
            .get(&name)
            .map(|v| v.width)
            .or_else(|| self.ports.get(&name).map(|p| p.width))
    }
}

/// One use of an interface definition inside a generator, either declared
/// by an instantiation statement or received through a port bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceInst {
    /// The instance (reference) name within the generator.
    pub name: Ident,
    /// The definition this instance uses.
    pub definition: InterfaceId,
    /// When set, the generator sees the definition through this modport.
    pub modport: Option<Ident>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn def_with_var(width: u32) -> InterfaceDefinition {
        let mut def = InterfaceDefinition::new(Ident::from_raw(0));
        def.vars.insert(
            Ident::from_raw(1),
            IfaceVar {
                width,
                size: vec![1],
                signed: false,
            },
        );
        def
    }

    #[test]
    fn structural_equality() {
        assert_eq!(def_with_var(8), def_with_var(8));
        assert_ne!(def_with_var(8), def_with_var(16));
    }

    #[test]
    fn signal_width_checks_vars_and_ports() {
        let mut def = def_with_var(8);
        def.ports.insert(
            Ident::from_raw(2),
            IfacePort {
                direction: PortDirection::In,
                width: 1,
                size: vec![1],
                signed: false,
            },
        );
        assert_eq!(def.signal_width(Ident::from_raw(1)), Some(8));
        assert_eq!(def.signal_width(Ident::from_raw(2)), Some(1));
        assert_eq!(def.signal_width(Ident::from_raw(3)), None);
    }

    #[test]
    fn empty_modport_detection() {
        let empty = ModPort {
            inputs: Vec::new(),
            outputs: Vec::new(),
        };
        assert!(empty.is_empty());

        let used = ModPort {
            inputs: vec![Ident::from_raw(1)],
            outputs: Vec::new(),
        };
        assert!(!used.is_empty());
    }

    #[test]
    fn port_order_matters_for_equality() {
        let p = IfacePort {
            direction: PortDirection::In,
            width: 1,
            size: vec![1],
            signed: false,
        };
        let mut a = InterfaceDefinition::new(Ident::from_raw(0));
        a.ports.insert(Ident::from_raw(1), p.clone());
        a.ports.insert(Ident::from_raw(2), p.clone());

        let mut b = InterfaceDefinition::new(Ident::from_raw(0));
        b.ports.insert(Ident::from_raw(2), p.clone());
        b.ports.insert(Ident::from_raw(1), p);

        // IndexMap equality is order-insensitive; ordered comparison is the
        // aggregator's job.
        assert_eq!(a, b);
        assert_ne!(
            a.ports.keys().collect::<Vec<_>>(),
            b.ports.keys().collect::<Vec<_>>()
        );
    }
}
