//! Depth-first traversal over generator hierarchies.

use quartz_ir::{Design, GeneratorId, IrError};
use std::collections::HashSet;

/// A hook-based walker over a design's generators.
///
/// [`visit_design`](Visitor::visit_design) walks the top generator and all
/// of its descendants in preorder, visiting each generator exactly once
/// even when it is reachable through several instantiation paths.
pub trait Visitor {
    /// Called once per reachable generator.
    fn visit_generator(&mut self, design: &mut Design, id: GeneratorId) -> Result<(), IrError>;

    /// Walks the design from its top generator.
    fn visit_design(&mut self, design: &mut Design) -> Result<(), IrError> {
        let Some(top) = design.top else {
            return Ok(());
        };
        let mut visited = HashSet::new();
        self.walk(design, top, &mut visited)
    }

    /// Walks `id` and its descendants. Exposed so passes can re-walk a
    /// subtree they just created.
    fn walk(
        &mut self,
        design: &mut Design,
        id: GeneratorId,
        visited: &mut HashSet<GeneratorId>,
    ) -> Result<(), IrError> {
        if !visited.insert(id) {
            return Ok(());
        }
        self.visit_generator(design, id)?;
        let children = design.generator(id).children.clone();
        for child in children {
            self.walk(design, child, visited)?;
        }
        Ok(())
    }
}

/// The generators reachable from the top, in preorder, each listed once.
pub fn reachable_generators(design: &Design) -> Vec<GeneratorId> {
    let mut order = Vec::new();
    let Some(top) = design.top else {
        return order;
    };
    let mut visited = HashSet::new();
    // iterative preorder so a read-only caller does not need &mut Design
    let mut stack = vec![top];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        let children = &design.generator(id).children;
        for &child in children.iter().rev() {
            stack.push(child);
        }
    }
    order
}
