//! The named pass registry.
//!
//! Passes run in registration order and stop at the first error. A pass
//! receives the manager itself and may register follow-up passes, which
//! run after the ones already queued.

use quartz_ir::{Design, IrError};
use std::rc::Rc;

/// The callable form of a pass.
pub type PassFn = Rc<dyn Fn(&mut Design, &mut PassManager) -> Result<(), IrError>>;

struct Pass {
    name: String,
    run: PassFn,
}

/// An ordered collection of named passes.
#[derive(Default)]
pub struct PassManager {
    passes: Vec<Pass>,
}

impl PassManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pass. Passes registered while [`run`](Self::run) is in
    /// flight execute after the currently queued ones.
    pub fn register<F>(&mut self, name: &str, pass: F)
    where
        F: Fn(&mut Design, &mut PassManager) -> Result<(), IrError> + 'static,
    {
        self.passes.push(Pass {
            name: name.to_string(),
            run: Rc::new(pass),
        });
    }

    /// The registered pass names, in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.passes.iter().map(|p| p.name.as_str()).collect()
    }

    /// Runs every pass in order, fail-fast.
    pub fn run(&mut self, design: &mut Design) -> Result<(), IrError> {
        let mut index = 0;
        while index < self.passes.len() {
            let pass = Rc::clone(&self.passes[index].run);
            pass(design, self)?;
            index += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn passes_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pm = PassManager::new();
        for name in ["first", "second", "third"] {
            let log = Rc::clone(&log);
            pm.register(name, move |_, _| {
                log.borrow_mut().push(name);
                Ok(())
            });
        }
        let mut d = Design::new();
        pm.run(&mut d).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn a_pass_may_register_followups() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut pm = PassManager::new();
        let outer_log = Rc::clone(&log);
        pm.register("seed", move |_, pm| {
            outer_log.borrow_mut().push("seed");
            let inner_log = Rc::clone(&outer_log);
            pm.register("follow_up", move |_, _| {
                inner_log.borrow_mut().push("follow_up");
                Ok(())
            });
            Ok(())
        });
        let mut d = Design::new();
        pm.run(&mut d).unwrap();
        assert_eq!(*log.borrow(), vec!["seed", "follow_up"]);
        assert_eq!(pm.names(), vec!["seed", "follow_up"]);
    }

    #[test]
    fn run_stops_at_first_error() {
        let reached = Rc::new(RefCell::new(false));
        let mut pm = PassManager::new();
        pm.register("fails", |_, _| Err(IrError::invariant("bad pass", vec![])));
        let reached_inner = Rc::clone(&reached);
        pm.register("never", move |_, _| {
            *reached_inner.borrow_mut() = true;
            Ok(())
        });
        let mut d = Design::new();
        assert!(pm.run(&mut d).is_err());
        assert!(!*reached.borrow());
    }

    #[test]
    fn passes_can_mutate_the_design() {
        let mut pm = PassManager::new();
        pm.register("add_generator", |design, _| {
            design.add_generator("injected");
            Ok(())
        });
        let mut d = Design::new();
        pm.run(&mut d).unwrap();
        assert_eq!(d.generators.len(), 1);
    }
}
