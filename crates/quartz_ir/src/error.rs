//! Typed errors reported by IR construction and emission.
//!
//! Every error message embeds the rendered handles of the offending nodes;
//! the `nodes` field carries the same handles for programmatic access.
//! Errors bubble to the API boundary and nothing is recovered inside the
//! core.

use quartz_common::InternalError;

/// An error produced while building or emitting a design.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    /// Malformed construction: assigning to a constant/expression/signed
    /// view, an out-of-range constant, a width mismatch, a duplicate name,
    /// or a cross-generator binary operation.
    #[error("{message}")]
    Construction {
        /// What was rejected and why.
        message: String,
        /// Rendered handles of the nodes involved.
        nodes: Vec<String>,
    },

    /// Incompatible assignment kinds sharing one destination, or a
    /// non-blocking assignment at the generator top level.
    #[error("{message}")]
    AssignKindConflict {
        /// Which kinds collided and where.
        message: String,
        /// Rendered handles of the nodes involved.
        nodes: Vec<String>,
    },

    /// An operand lookup by name missed.
    #[error("unknown variable `{name}` in generator `{generator}`")]
    UnknownVar {
        /// The name that failed to resolve.
        name: String,
        /// The generator that was searched.
        generator: String,
    },

    /// A structural invariant was broken: an input port driven by its own
    /// module, an empty switch case, a function call at the module top, a
    /// duplicate switch key, or an empty modport.
    #[error("{message}")]
    InvariantViolation {
        /// Which invariant was broken.
        message: String,
        /// Rendered handles of the nodes involved.
        nodes: Vec<String>,
    },

    /// Conflicting interface definitions across instantiations, or
    /// conflicting external bindings within one instantiation.
    #[error("{message}")]
    InterfaceMismatch {
        /// Which definitions or bindings disagreed.
        message: String,
        /// Rendered handles of the nodes involved.
        nodes: Vec<String>,
    },

    /// An instance parameter chains to a parent parameter that is not
    /// declared in the enclosing generator.
    #[error("{message}")]
    UnresolvedParam {
        /// The parameter and the generators involved.
        message: String,
        /// Rendered handles of the nodes involved.
        nodes: Vec<String>,
    },

    /// A registry or cast failure: a bug in Quartz, not in the design.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl IrError {
    /// Shorthand for a [`IrError::Construction`] with node handles.
    pub fn construction(message: impl Into<String>, nodes: Vec<String>) -> Self {
        Self::Construction {
            message: message.into(),
            nodes,
        }
    }

    /// Shorthand for an [`IrError::InvariantViolation`] with node handles.
    pub fn invariant(message: impl Into<String>, nodes: Vec<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
            nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_display() {
        let err = IrError::construction(
            "value 256 does not fit in 8 unsigned bits",
            vec!["8'h?".to_string()],
        );
        assert_eq!(err.to_string(), "value 256 does not fit in 8 unsigned bits");
    }

    #[test]
    fn unknown_var_display() {
        let err = IrError::UnknownVar {
            name: "data_in".to_string(),
            generator: "top".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown variable `data_in` in generator `top`"
        );
    }

    #[test]
    fn internal_wraps_common_error() {
        let err: IrError = InternalError::new("arena index out of range").into();
        assert!(err.to_string().contains("arena index out of range"));
    }

    #[test]
    fn invariant_keeps_nodes() {
        let err = IrError::invariant("empty switch case", vec!["2'h1".to_string()]);
        if let IrError::InvariantViolation { nodes, .. } = &err {
            assert_eq!(nodes.len(), 1);
        } else {
            panic!("expected InvariantViolation");
        }
    }
}
