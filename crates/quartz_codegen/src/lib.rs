//! SystemVerilog emission for Quartz designs.
//!
//! The three host-facing entry points mirror the compilation flow:
//!
//! - [`generate_verilog`] walks every generator reachable from the top and
//!   returns one source text per module name (external generators are
//!   skipped; a duplicated name is last-write-wins).
//! - [`extract_interface_info`] aggregates interface definitions across
//!   the tree and renders each one once.
//! - [`create_stub`] emits a black-box declaration of the top module.
//!
//! When a generator has its `debug` flag set, emission also fills a
//! [`DebugInfo`] table mapping statements and declarations to the output
//! lines they landed on; [`generate_verilog_debug`] exposes it.

#![warn(missing_docs)]

pub mod interface;
pub mod stream;
pub mod stub;
pub mod sv;

pub use interface::extract_interface_info;
pub use stub::create_stub;
pub use sv::SystemVerilogCodeGen;

use quartz_ir::{Design, GeneratorId, IrError, StmtId, VarId};
use quartz_passes::reachable_generators;
use std::collections::BTreeMap;

/// Output line numbers recorded during emission, keyed by owning
/// generator. Only filled for generators with the `debug` flag set.
#[derive(Debug, Clone, Default)]
pub struct DebugInfo {
    /// Statement → 1-based line of its first token.
    pub stmt_lines: BTreeMap<(GeneratorId, StmtId), u32>,
    /// Variable → 1-based line of its declaration (or first use site for
    /// instantiation connections).
    pub var_lines: BTreeMap<(GeneratorId, VarId), u32>,
}

impl DebugInfo {
    fn merge(&mut self, other: DebugInfo) {
        self.stmt_lines.extend(other.stmt_lines);
        self.var_lines.extend(other.var_lines);
    }
}

/// Emits every generator reachable from the top, one text per module name.
pub fn generate_verilog(design: &Design) -> Result<BTreeMap<String, String>, IrError> {
    generate_verilog_debug(design).map(|(sources, _)| sources)
}

/// Like [`generate_verilog`], also returning the recorded line map.
pub fn generate_verilog_debug(
    design: &Design,
) -> Result<(BTreeMap<String, String>, DebugInfo), IrError> {
    let mut sources = BTreeMap::new();
    let mut debug = DebugInfo::default();
    for gid in reachable_generators(design) {
        if design.generator(gid).external {
            continue;
        }
        let (text, info) = SystemVerilogCodeGen::new(design, gid).emit()?;
        sources.insert(design.generator_name(gid).to_string(), text);
        debug.merge(info);
    }
    Ok((sources, debug))
}
