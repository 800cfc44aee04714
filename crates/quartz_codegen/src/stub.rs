//! Black-box stub emission.
//!
//! Clones the top generator's port list into a fresh empty generator and
//! runs the code generator on it, producing the module declaration used
//! to wrap externally defined implementations.

use crate::generate_verilog;
use quartz_common::InternalError;
use quartz_ir::{Design, IrError, VarKind};

/// Emits an empty module with the same name and port list as the design's
/// top generator.
pub fn create_stub(design: &Design) -> Result<String, IrError> {
    let top = design
        .top
        .ok_or_else(|| InternalError::new("design has no top generator"))?;
    let top_gen = design.generator(top);
    let name = design.generator_name(top).to_string();

    let mut stub = Design::new();
    let g = stub.add_generator(&name);
    for port_name in top_gen.get_port_names() {
        let Some(vid) = top_gen.find_var(port_name) else {
            continue;
        };
        let var = &top_gen.vars[vid];
        let (direction, port_type) = match var.kind {
            VarKind::Port {
                direction,
                port_type,
                ..
            } => (direction, port_type),
            _ => continue,
        };
        let r = stub.port_full(
            g,
            direction,
            design.resolve(port_name),
            var.width,
            &var.size,
            port_type,
            var.signed,
        )?;
        let stub_var = stub.var_mut(r);
        stub_var.packed = var.packed;
        stub_var.explicit_array = var.explicit_array;
    }

    let mut sources = generate_verilog(&stub)?;
    sources
        .remove(&name)
        .ok_or_else(|| IrError::from(InternalError::new("stub emission produced no module")))
}
