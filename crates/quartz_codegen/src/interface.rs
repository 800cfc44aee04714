//! Interface aggregation.
//!
//! Walks the generator tree, collects every interface instantiation,
//! verifies that all instantiations of one definition name agree
//! structurally (same ordered ports, same attributes, same vars, same
//! modports), and renders one `interface … endinterface` block per
//! definition.

use quartz_common::{Ident, InternalError};
use quartz_ir::{
    Design, GeneratorId, IfacePort, IfaceVar, InterfaceId, IrError, StmtKind,
};
use quartz_passes::reachable_generators;
use std::collections::BTreeMap;

/// Collects every interface definition used in the design and returns one
/// source text per definition name. Conflicting definitions under one
/// name are an [`IrError::InterfaceMismatch`] naming both offenders.
pub fn extract_interface_info(design: &Design) -> Result<BTreeMap<String, String>, IrError> {
    let mut seen: BTreeMap<String, (GeneratorId, InterfaceId)> = BTreeMap::new();
    for gid in reachable_generators(design) {
        let gen = design.generator(gid);
        for &sid in &gen.body {
            let StmtKind::InterfaceInstantiation(ii) = &gen.stmts[sid].kind else {
                continue;
            };
            let inst = gen.interfaces.get(&ii.instance).ok_or_else(|| {
                InternalError::new("interface instantiation references an unregistered instance")
            })?;
            let def_id = inst.definition;
            let def_name = design
                .resolve(design.interfaces[def_id].def_name)
                .to_string();
            match seen.get(&def_name) {
                None => {
                    seen.insert(def_name, (gid, def_id));
                }
                Some(&(first_gid, first_def)) => {
                    if first_def != def_id && !definitions_match(design, first_def, def_id) {
                        return Err(IrError::InterfaceMismatch {
                            message: format!(
                                "{}.{def_name}'s interface differs from {}.{def_name}'s",
                                design.generator_name(gid),
                                design.generator_name(first_gid)
                            ),
                            nodes: vec![
                                format!("{}.{def_name}", design.generator_name(gid)),
                                format!("{}.{def_name}", design.generator_name(first_gid)),
                            ],
                        });
                    }
                }
            }
        }
    }

    let mut result = BTreeMap::new();
    for (name, &(_, def_id)) in &seen {
        result.insert(name.clone(), render_definition(design, def_id)?);
    }
    Ok(result)
}

/// Ordered structural comparison: the same port names in the same order
/// with the same attributes, likewise for vars and modports.
fn definitions_match(design: &Design, a: InterfaceId, b: InterfaceId) -> bool {
    let da = &design.interfaces[a];
    let db = &design.interfaces[b];
    da.ports.len() == db.ports.len()
        && da
            .ports
            .iter()
            .zip(db.ports.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
        && da.vars.len() == db.vars.len()
        && da
            .vars
            .iter()
            .zip(db.vars.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
        && da.mod_ports.len() == db.mod_ports.len()
        && da
            .mod_ports
            .iter()
            .zip(db.mod_ports.iter())
            .all(|((ka, va), (kb, vb))| ka == kb && va == vb)
}

fn unpacked_dims(size: &[u32]) -> String {
    if size.first().copied().unwrap_or(1) > 1 || size.len() > 1 {
        size.iter().map(|&w| format!("[{}:0]", w - 1)).collect()
    } else {
        String::new()
    }
}

fn iface_port_str(design: &Design, name: Ident, port: &IfacePort) -> String {
    let mut parts = vec![port.direction.as_str().to_string(), "logic".to_string()];
    if port.signed {
        parts.push("signed".to_string());
    }
    if port.width > 1 {
        parts.push(format!("[{}:0]", port.width - 1));
    }
    parts.push(design.resolve(name).to_string());
    let dims = unpacked_dims(&port.size);
    if !dims.is_empty() {
        parts.push(dims);
    }
    parts.join(" ")
}

fn iface_var_str(design: &Design, name: Ident, var: &IfaceVar) -> String {
    let mut parts = vec!["logic".to_string()];
    if var.signed {
        parts.push("signed".to_string());
    }
    if var.width > 1 {
        parts.push(format!("[{}:0]", var.width - 1));
    }
    parts.push(design.resolve(name).to_string());
    let dims = unpacked_dims(&var.size);
    if !dims.is_empty() {
        parts.push(dims);
    }
    parts.join(" ")
}

fn render_definition(design: &Design, def_id: InterfaceId) -> Result<String, IrError> {
    let def = &design.interfaces[def_id];
    let name = design.resolve(def.def_name);
    let mut out = String::new();
    out.push_str(&format!("interface {name}"));
    if def.ports.is_empty() {
        out.push_str(";\n");
    } else {
        out.push_str("(\n");
        let total = def.ports.len();
        for (index, (&pname, port)) in def.ports.iter().enumerate() {
            out.push_str(&format!("  {}", iface_port_str(design, pname, port)));
            out.push_str(if index + 1 == total { "\n" } else { ",\n" });
        }
        out.push_str(");\n");
    }
    for (&vname, var) in &def.vars {
        out.push_str(&format!("  {};\n", iface_var_str(design, vname, var)));
    }
    for (&mname, modport) in &def.mod_ports {
        if modport.is_empty() {
            return Err(IrError::invariant(
                format!(
                    "modport `{}` of interface `{name}` is empty",
                    design.resolve(mname)
                ),
                vec![format!("{name}.{}", design.resolve(mname))],
            ));
        }
        let mut entries = Vec::new();
        for &input in &modport.inputs {
            entries.push(format!("input {}", design.resolve(input)));
        }
        for &output in &modport.outputs {
            entries.push(format!("output {}", design.resolve(output)));
        }
        out.push_str(&format!(
            "  modport {}({});\n",
            design.resolve(mname),
            entries.join(", ")
        ));
    }
    out.push_str("endinterface\n");
    Ok(out)
}
