//! The per-generator SystemVerilog emitter.
//!
//! One [`SystemVerilogCodeGen`] emits one module: header, sorted ports
//! (interface bundles collapsed and printed first), enum typedefs,
//! variable declarations, interface instantiations, functions, and the
//! top-level statements in attachment order. Statement emission is a flat
//! dispatch on [`StmtKind`]; inline positions (else-if flattening,
//! single-statement case arms, assert-else) suppress the leading indent of
//! the dispatched statement.

use crate::stream::{line_wrap, Stream, INDENT_UNIT};
use crate::DebugInfo;
use quartz_common::{Ident, InternalError};
use quartz_ir::{
    AssignKind, BlockKind, Design, FunctionBlock, GeneratorId, IrError, PortDirection, StmtId,
    StmtKind, StmtParent, SwitchCase, Var, VarId, VarKind, VarRef,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// The column limit for right-hand-side wrapping.
const WRAP_COLUMNS: usize = 80;

/// Removes embedded newlines from a comment.
fn strip_newline(text: &str) -> String {
    text.replace('\n', "")
}

/// Renders `[w-1:0]` for a known width.
fn size_bracket(width: u32) -> String {
    format!("[{}:0]", width - 1)
}

enum StmtTag {
    Assign,
    Block,
    If,
    Switch,
    ModuleInstantiation,
    InterfaceInstantiation,
    FunctionCall,
    Return,
    AssertValue,
    Comment,
    RawString,
}

/// Emits one generator as SystemVerilog text.
pub struct SystemVerilogCodeGen<'a> {
    design: &'a Design,
    generator: GeneratorId,
    package_name: Option<String>,
    header_include_name: Option<String>,
    indent_level: usize,
    stream: Stream,
    label_index: HashMap<StmtId, Ident>,
    debug: DebugInfo,
}

impl<'a> SystemVerilogCodeGen<'a> {
    /// Creates an emitter for one generator.
    pub fn new(design: &'a Design, generator: GeneratorId) -> Self {
        let label_index = design
            .generator(generator)
            .named_blocks
            .iter()
            .map(|(&label, &stmt)| (stmt, label))
            .collect();
        Self {
            design,
            generator,
            package_name: None,
            header_include_name: None,
            indent_level: 0,
            stream: Stream::new(),
            label_index,
            debug: DebugInfo::default(),
        }
    }

    /// Sets the module preamble: a `` `include `` line and a package
    /// wildcard import.
    pub fn with_preamble(mut self, package_name: &str, header_include_name: &str) -> Self {
        if !package_name.is_empty() {
            self.package_name = Some(package_name.to_string());
        }
        if !header_include_name.is_empty() {
            self.header_include_name = Some(header_include_name.to_string());
        }
        self
    }

    /// Emits the module and returns its text plus the recorded line map
    /// (empty unless the generator has `debug` set).
    pub fn emit(mut self) -> Result<(String, DebugInfo), IrError> {
        self.output_module_def()?;
        Ok((self.stream.finish(), self.debug))
    }

    fn gen(&self) -> &quartz_ir::Generator {
        self.design.generator(self.generator)
    }

    fn debug_enabled(&self) -> bool {
        self.gen().debug
    }

    fn indent(&self) -> String {
        INDENT_UNIT.repeat(self.indent_level)
    }

    fn first_indent(&self, inline: bool) -> String {
        if inline {
            String::new()
        } else {
            self.indent()
        }
    }

    fn record_stmt(&mut self, sid: StmtId) {
        if self.debug_enabled() {
            self.debug
                .stmt_lines
                .insert((self.generator, sid), self.stream.line_no());
        }
    }

    fn record_var(&mut self, var: VarRef) {
        if self.debug_enabled() {
            let line = self.stream.line_no();
            self.debug
                .var_lines
                .entry((var.generator, var.var))
                .or_insert(line);
        }
    }

    fn local_text(&self, id: VarId) -> String {
        self.design.var_text(VarRef::new(self.generator, id))
    }

    fn comment_line(&mut self, comment: &Option<String>) {
        if let Some(text) = comment {
            let line = format!("{}// {}", self.indent(), strip_newline(text));
            self.stream.write(&line);
            self.stream.newline();
        }
    }

    // ---- module structure ----

    fn output_module_def(&mut self) -> Result<(), IrError> {
        if let Some(header) = self.header_include_name.clone() {
            self.stream.write(&format!("`include \"{header}\""));
            self.stream.newline();
            self.stream.newline();
        }
        if let Some(package) = self.package_name.clone() {
            self.stream.write(&format!("import {package}::*;"));
            self.stream.newline();
        }

        let name = self.design.generator_name(self.generator).to_string();
        self.stream.write(&format!("module {name} "));
        self.generate_parameters();
        self.stream.write("(");
        self.stream.newline();
        self.generate_ports()?;
        self.stream.write(");");
        self.stream.newline();
        self.stream.newline();

        self.generate_enums();
        self.generate_variables();
        self.generate_interface_instantiations()?;
        self.generate_functions()?;

        let body = self.gen().body.clone();
        for sid in body {
            self.dispatch_stmt(sid, false)?;
        }

        self.stream.write(&format!("endmodule   // {name}"));
        self.stream.newline();
        Ok(())
    }

    fn generate_parameters(&mut self) {
        let gen = self.gen();
        if gen.params.is_empty() {
            return;
        }
        let mut names: Vec<Ident> = gen.params.keys().copied().collect();
        names.sort_by(|a, b| self.design.resolve(*a).cmp(self.design.resolve(*b)));
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let pid = self.gen().params[&name];
            let value = match self.gen().vars[pid].kind {
                VarKind::Param { value, .. } => value,
                _ => 0,
            };
            entries.push(format!("{} = {}", self.design.resolve(name), value));
        }
        self.stream
            .write(&format!("#(parameter {})", entries.join(", ")));
        self.stream.newline();
    }

    fn generate_ports(&mut self) -> Result<(), IrError> {
        self.indent_level += 1;
        let mut names = self.gen().get_port_names();
        names.sort_by(|a, b| self.design.resolve(*a).cmp(self.design.resolve(*b)));

        let mut interface_seen = HashSet::new();
        let mut interface_entries: Vec<(String, String)> = Vec::new();
        let mut plain: Vec<VarId> = Vec::new();
        for name in names {
            let vid = match self.gen().find_var(name) {
                Some(vid) => vid,
                None => continue,
            };
            if let VarKind::Port {
                interface: Some(inst),
                ..
            } = self.gen().vars[vid].kind
            {
                if interface_seen.insert(inst) {
                    let inst_info = self.gen().interfaces.get(&inst).ok_or_else(|| {
                        InternalError::new("interface port references an unregistered instance")
                    })?;
                    let def = &self.design.interfaces[inst_info.definition];
                    interface_entries.push((
                        self.design.resolve(def.def_name).to_string(),
                        self.design.resolve(inst).to_string(),
                    ));
                }
            } else {
                plain.push(vid);
            }
        }

        let total = interface_entries.len() + plain.len();
        let mut count = 0;
        for (def, inst) in interface_entries {
            count += 1;
            self.stream.write(&format!("{}{def} {inst}", self.indent()));
            if count != total {
                self.stream.write(",");
            }
            self.stream.newline();
        }
        for vid in plain {
            count += 1;
            let comment = self.gen().vars[vid].comment.clone();
            self.comment_line(&comment);
            self.record_var(VarRef::new(self.generator, vid));
            let decl = self.port_str(self.generator, vid);
            let end = if count == total { "" } else { "," };
            self.stream
                .write(&format!("{}{decl}{end}", self.indent()));
            self.stream.newline();
        }
        self.indent_level -= 1;
        Ok(())
    }

    fn generate_enums(&mut self) {
        let enum_names: Vec<Ident> = self.gen().enums.keys().copied().collect();
        for name in enum_names {
            let def = self.gen().enums[&name].clone();
            let bracket = if def.width == 1 {
                String::new()
            } else {
                size_bracket(def.width)
            };
            self.stream
                .write(&format!("typedef enum logic{bracket} {{"));
            self.stream.newline();
            let mut members: Vec<(Ident, VarId)> =
                def.values.iter().map(|(&m, &v)| (m, v)).collect();
            members.sort_by_key(|&(_, vid)| match self.gen().vars[vid].kind {
                VarKind::Const { value } => value,
                _ => i64::MAX,
            });
            let total = members.len();
            for (index, (member, vid)) in members.into_iter().enumerate() {
                self.record_var(VarRef::new(self.generator, vid));
                let value = self.local_text(vid);
                let sep = if index + 1 == total { "" } else { "," };
                self.stream.write(&format!(
                    "  {} = {}{}",
                    self.design.resolve(member),
                    value,
                    sep
                ));
                self.stream.newline();
            }
            self.stream
                .write(&format!("}} {};", self.design.resolve(name)));
            self.stream.newline();
        }
    }

    fn generate_variables(&mut self) {
        let names = self.gen().base_var_names();
        for name in names {
            // interface member proxies (`bus_if.data`) are declared by the
            // interface, not the module
            if self.design.resolve(name).contains('.') {
                continue;
            }
            let vid = match self.gen().find_var(name) {
                Some(vid) => vid,
                None => continue,
            };
            let comment = self.gen().vars[vid].comment.clone();
            self.comment_line(&comment);
            self.record_var(VarRef::new(self.generator, vid));
            let decl = self.var_decl(self.generator, vid);
            self.stream.write(&format!("{decl};"));
            self.stream.newline();
        }
    }

    fn generate_interface_instantiations(&mut self) -> Result<(), IrError> {
        let body = self.gen().body.clone();
        for sid in body {
            if matches!(
                self.gen().stmts[sid].kind,
                StmtKind::InterfaceInstantiation(_)
            ) {
                self.interface_inst_code(sid, false)?;
            }
        }
        Ok(())
    }

    fn generate_functions(&mut self) -> Result<(), IrError> {
        let functions: Vec<StmtId> = self.gen().functions.values().copied().collect();
        for sid in functions {
            self.dispatch_stmt(sid, false)?;
        }
        Ok(())
    }

    // ---- statement dispatch ----

    fn dispatch_stmt(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let tag = match &self.gen().stmts[sid].kind {
            StmtKind::Assign(_) => StmtTag::Assign,
            StmtKind::Block(_) => StmtTag::Block,
            StmtKind::If(_) => StmtTag::If,
            StmtKind::Switch(_) => StmtTag::Switch,
            StmtKind::ModuleInstantiation(_) => StmtTag::ModuleInstantiation,
            StmtKind::InterfaceInstantiation(_) => StmtTag::InterfaceInstantiation,
            StmtKind::FunctionCall { .. } => StmtTag::FunctionCall,
            StmtKind::Return { .. } => StmtTag::Return,
            StmtKind::AssertValue { .. } => StmtTag::AssertValue,
            StmtKind::Comment { .. } => StmtTag::Comment,
            StmtKind::RawString { .. } => StmtTag::RawString,
        };
        match tag {
            StmtTag::Assign => self.assign_code(sid, inline),
            StmtTag::Block => self.block_code(sid, inline),
            StmtTag::If => self.if_code(sid, inline),
            StmtTag::Switch => self.switch_code(sid, inline),
            StmtTag::ModuleInstantiation => self.module_inst_code(sid, inline),
            // emitted in the interface section of the module body
            StmtTag::InterfaceInstantiation => Ok(()),
            StmtTag::FunctionCall => self.call_code(sid, inline),
            StmtTag::Return => self.return_code(sid, inline),
            StmtTag::AssertValue => self.assert_code(sid, inline),
            StmtTag::Comment => self.comment_code(sid, inline),
            StmtTag::RawString => self.raw_code(sid, inline),
        }
    }

    fn assign_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (left, right, kind, parent, comment) = {
            let stmt = &self.gen().stmts[sid];
            let a = stmt
                .as_assign()
                .ok_or_else(|| InternalError::new("assign emitter got a non-assignment"))?;
            (a.left, a.right, a.kind, stmt.parent, stmt.comment.clone())
        };

        let left_var = self.design.var_data(left);
        if let VarKind::Port {
            direction: PortDirection::In,
            ..
        } = left_var.kind
        {
            if left.generator == self.generator {
                return Err(IrError::invariant(
                    "cannot drive a module's input from itself",
                    vec![
                        self.design.var_handle(left),
                        self.design.var_handle(right),
                    ],
                ));
            }
        }

        self.comment_line(&comment);
        self.record_stmt(sid);

        let left_text = self.design.var_text(left);
        let right_text = self.design.var_text(right);
        let (prefix, eq) = if parent == StmtParent::Generator {
            if kind != AssignKind::Blocking {
                return Err(IrError::AssignKindConflict {
                    message: format!(
                        "top level assignment for `{left_text}` ← `{right_text}` has to be blocking"
                    ),
                    nodes: vec![self.design.var_handle(left), self.design.var_handle(right)],
                });
            }
            ("assign ".to_string(), "=")
        } else {
            let eq = match kind {
                AssignKind::Blocking => "=",
                AssignKind::NonBlocking => "<=",
                AssignKind::Undefined => {
                    return Err(IrError::AssignKindConflict {
                        message: format!(
                            "assignment kind for `{left_text}` ← `{right_text}` was never resolved"
                        ),
                        nodes: vec![
                            self.design.var_handle(left),
                            self.design.var_handle(right),
                        ],
                    });
                }
            };
            (self.first_indent(inline), eq)
        };

        self.stream.write(&format!("{prefix}{left_text} {eq} "));
        let wrapped = line_wrap(&right_text, WRAP_COLUMNS);
        self.stream.write(&wrapped[0]);
        for piece in &wrapped[1..] {
            self.stream.newline();
            self.stream
                .write(&format!("{}    {piece}", self.indent()));
        }
        self.stream.write(";");
        self.stream.newline();
        Ok(())
    }

    fn block_code(&mut self, sid: StmtId, _inline: bool) -> Result<(), IrError> {
        let block = match &self.gen().stmts[sid].kind {
            StmtKind::Block(b) => b.clone(),
            _ => return Err(InternalError::new("block emitter got a non-block").into()),
        };
        let comment = self.gen().stmts[sid].comment.clone();
        match block.kind {
            BlockKind::Sequential { ref sensitivity } => {
                self.comment_line(&comment);
                let edges: Vec<String> = sensitivity
                    .iter()
                    .map(|&(edge, vid)| format!("{} {}", edge.as_str(), self.local_text(vid)))
                    .collect();
                self.stream.newline();
                self.record_stmt(sid);
                self.stream.write(&format!(
                    "always_ff @({}) begin{}",
                    edges.join(", "),
                    self.block_label(sid)
                ));
                self.stream.newline();
                self.block_children(&block.children)?;
                self.stream
                    .write(&format!("{}end{}", self.indent(), self.block_label(sid)));
                self.stream.newline();
            }
            BlockKind::Combinational => {
                self.comment_line(&comment);
                self.record_stmt(sid);
                self.stream
                    .write(&format!("always_comb begin{}", self.block_label(sid)));
                self.stream.newline();
                self.block_children(&block.children)?;
                self.stream
                    .write(&format!("{}end{}", self.indent(), self.block_label(sid)));
                self.stream.newline();
            }
            BlockKind::Initial => {
                self.comment_line(&comment);
                self.record_stmt(sid);
                self.stream
                    .write(&format!("initial begin{}", self.block_label(sid)));
                self.stream.newline();
                self.block_children(&block.children)?;
                self.stream
                    .write(&format!("{}end{}", self.indent(), self.block_label(sid)));
                self.stream.newline();
            }
            BlockKind::Scoped => {
                self.record_stmt(sid);
                self.stream
                    .write(&format!("begin{}", self.block_label(sid)));
                self.stream.newline();
                self.block_children(&block.children)?;
                self.stream
                    .write(&format!("{}end{}", self.indent(), self.block_label(sid)));
                self.stream.newline();
            }
            BlockKind::Function(ref fb) => {
                self.function_code(sid, fb, &block.children)?;
            }
        }
        Ok(())
    }

    fn block_children(&mut self, children: &[StmtId]) -> Result<(), IrError> {
        self.indent_level += 1;
        for &child in children {
            self.dispatch_stmt(child, false)?;
        }
        self.indent_level -= 1;
        Ok(())
    }

    fn block_label(&self, sid: StmtId) -> String {
        match self.label_index.get(&sid) {
            Some(&label) => format!(" :{}", self.design.resolve(label)),
            None => String::new(),
        }
    }

    fn function_code(
        &mut self,
        sid: StmtId,
        fb: &FunctionBlock,
        children: &[StmtId],
    ) -> Result<(), IrError> {
        if fb.dpi {
            return Ok(());
        }
        self.record_stmt(sid);
        let return_str = if fb.has_return { "" } else { "void " };
        self.stream.write(&format!(
            "function {return_str}{}(",
            self.design.resolve(fb.name)
        ));
        self.stream.newline();
        self.indent_level += 1;
        let port_names = match &fb.ordering {
            Some(order) => order.clone(),
            None => {
                let mut names: Vec<Ident> = fb.ports.keys().copied().collect();
                names.sort_by(|a, b| self.design.resolve(*a).cmp(self.design.resolve(*b)));
                names
            }
        };
        if port_names.is_empty() {
            self.stream.write(");");
            self.stream.newline();
        }
        let total = port_names.len();
        for (index, name) in port_names.into_iter().enumerate() {
            let vid = *fb
                .ports
                .get(&name)
                .ok_or_else(|| InternalError::new("function ordering names a missing port"))?;
            self.record_var(VarRef::new(self.generator, vid));
            let decl = self.port_str(self.generator, vid);
            self.stream.write(&format!("{}{decl}", self.indent()));
            if index + 1 != total {
                self.stream.write(",");
                self.stream.newline();
            } else {
                self.stream.newline();
                self.stream.write(");");
                self.stream.newline();
            }
        }
        self.indent_level -= 1;

        self.stream.write("begin");
        self.stream.newline();
        self.block_children(children)?;
        self.stream.write(&format!("{}end", self.indent()));
        self.stream.newline();
        self.stream.write("endfunction");
        self.stream.newline();
        Ok(())
    }

    fn if_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (predicate, then_body, else_body) = match &self.gen().stmts[sid].kind {
            StmtKind::If(i) => (i.predicate, i.then_body, i.else_body),
            _ => return Err(InternalError::new("if emitter got a non-if").into()),
        };
        self.record_stmt(sid);
        self.record_var(VarRef::new(self.generator, predicate));
        self.stream.write(&format!(
            "{}if ({}) ",
            self.first_indent(inline),
            self.local_text(predicate)
        ));
        self.dispatch_stmt(then_body, true)?;

        let else_children = match &self.gen().stmts[else_body].kind {
            StmtKind::Block(b) => b.children.clone(),
            _ => return Err(InternalError::new("if else-body is not a block").into()),
        };
        if !else_children.is_empty() {
            self.stream.write(&format!("{}else ", self.indent()));
            if else_children.len() == 1 {
                // flattens `else begin if … end` into `else if …`
                self.dispatch_stmt(else_children[0], true)?;
            } else {
                self.dispatch_stmt(else_body, true)?;
            }
        }
        Ok(())
    }

    fn switch_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (target, cases) = match &self.gen().stmts[sid].kind {
            StmtKind::Switch(s) => (s.target, s.cases.clone()),
            _ => return Err(InternalError::new("switch emitter got a non-switch").into()),
        };
        self.record_stmt(sid);
        self.stream.write(&format!(
            "{}unique case ({})",
            self.first_indent(inline),
            self.local_text(target)
        ));
        self.stream.newline();
        self.indent_level += 1;

        let mut sorted: Vec<SwitchCase> = cases;
        sorted.sort_by_key(|case| match case.value {
            Some(vid) => match self.gen().vars[vid].kind {
                VarKind::Const { value } => (0, value),
                _ => (0, i64::MAX),
            },
            // default sorts last
            None => (1, 0),
        });

        for case in sorted {
            let label = match case.value {
                Some(vid) => self.local_text(vid),
                None => "default".to_string(),
            };
            self.stream
                .write(&format!("{}{label}: ", self.indent()));
            let children = match &self.gen().stmts[case.body].kind {
                StmtKind::Block(b) => b.children.clone(),
                _ => return Err(InternalError::new("switch case body is not a block").into()),
            };
            if children.is_empty() {
                if case.value.is_some() {
                    return Err(IrError::invariant(
                        format!("switch statement condition {label} is empty!"),
                        vec![self.design.var_handle(VarRef::new(self.generator, target))],
                    ));
                }
                self.stream.write("begin end");
                self.stream.newline();
            } else if children.len() == 1 && !self.label_index.contains_key(&case.body) {
                self.dispatch_stmt(children[0], true)?;
            } else {
                self.indent_level += 1;
                self.dispatch_stmt(case.body, true)?;
                self.indent_level -= 1;
            }
        }

        self.indent_level -= 1;
        self.stream
            .write(&format!("{}endcase", self.indent()));
        self.stream.newline();
        Ok(())
    }

    fn module_inst_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (target, connections) = match &self.gen().stmts[sid].kind {
            StmtKind::ModuleInstantiation(mi) => (mi.target, mi.connections.clone()),
            _ => {
                return Err(
                    InternalError::new("instantiation emitter got a different statement").into(),
                )
            }
        };
        let comment = self.gen().stmts[sid].comment.clone();
        self.comment_line(&comment);
        self.record_stmt(sid);

        let target_name = self.design.generator_name(target).to_string();
        self.stream
            .write(&format!("{}{target_name}", self.first_indent(inline)));

        let child = self.design.generator(target);
        if !child.params.is_empty() {
            let mut names: Vec<Ident> = child.params.keys().copied().collect();
            names.sort_by(|a, b| self.design.resolve(*a).cmp(self.design.resolve(*b)));
            self.stream.write(" #(");
            self.stream.newline();
            self.indent_level += 1;
            let total = names.len();
            for (index, name) in names.into_iter().enumerate() {
                let pid = self.design.generator(target).params[&name];
                let (value, parent) = match self.design.generator(target).vars[pid].kind {
                    VarKind::Param { value, parent } => (value, parent),
                    _ => return Err(InternalError::new("parameter map holds a non-parameter").into()),
                };
                let value_text = match parent {
                    Some(parent_param) => {
                        if parent_param.generator != self.generator {
                            return Err(IrError::UnresolvedParam {
                                message: format!(
                                    "{}.{} is not declared in generator {}",
                                    self.design.generator_name(parent_param.generator),
                                    self.design.var_text(parent_param),
                                    self.design.generator_name(self.generator)
                                ),
                                nodes: vec![self.design.var_handle(parent_param)],
                            });
                        }
                        self.design.var_text(parent_param)
                    }
                    None => value.to_string(),
                };
                self.stream.write(&format!(
                    "{}.{}({})",
                    self.indent(),
                    self.design.resolve(name),
                    value_text
                ));
                if index + 1 == total {
                    self.stream.write(")");
                } else {
                    self.stream.write(",");
                    self.stream.newline();
                }
            }
            self.indent_level -= 1;
        }

        let instance = child
            .instance_name
            .ok_or_else(|| InternalError::new("instantiated generator has no instance name"))?;
        self.stream
            .write(&format!(" {}", self.design.resolve(instance)));
        self.module_connections(target, &connections)
    }

    fn module_connections(
        &mut self,
        target: GeneratorId,
        connections: &[(VarId, VarRef)],
    ) -> Result<(), IrError> {
        if connections.is_empty() {
            self.stream.write("();");
            self.stream.newline();
            return Ok(());
        }
        self.stream.write(" (");
        self.stream.newline();
        self.indent_level += 1;

        let mut sorted: Vec<(VarId, VarRef)> = connections.to_vec();
        sorted.sort_by_key(|&(internal, _)| self.design.var_text(VarRef::new(target, internal)));

        let mut interface_bindings: BTreeMap<String, String> = BTreeMap::new();
        let mut entries: Vec<(String, String)> = Vec::new();
        for (internal, external) in sorted {
            self.record_var(external);
            let internal_ref = VarRef::new(target, internal);
            let child = self.design.generator(target);
            if let VarKind::Port {
                interface: Some(inst_name),
                ..
            } = child.vars[internal].kind
            {
                let inst = child.interfaces.get(&inst_name).ok_or_else(|| {
                    InternalError::new("interface port references an unregistered instance")
                })?;
                let internal_name = self.design.resolve(inst_name).to_string();
                let mut external_name = self.design.var_text(external);
                if let Some(modport) = inst.modport {
                    if !external_name.contains('.') {
                        external_name =
                            format!("{external_name}.{}", self.design.resolve(modport));
                    }
                }
                match interface_bindings.get(&internal_name) {
                    Some(bound) if bound != &external_name => {
                        return Err(IrError::InterfaceMismatch {
                            message: format!(
                                "`{}` and `{}` are not from the same interface definition",
                                self.design.var_handle(internal_ref),
                                self.design.var_handle(external)
                            ),
                            nodes: vec![
                                self.design.var_handle(internal_ref),
                                self.design.var_handle(external),
                            ],
                        });
                    }
                    Some(_) => continue,
                    None => {
                        interface_bindings.insert(internal_name.clone(), external_name.clone());
                        entries.push((internal_name, external_name));
                    }
                }
            } else {
                entries.push((
                    self.design.var_text(internal_ref),
                    self.design.var_text(external),
                ));
            }
        }

        let total = entries.len();
        for (index, (internal, external)) in entries.into_iter().enumerate() {
            self.stream
                .write(&format!("{}.{internal}({external})", self.indent()));
            if index + 1 != total {
                self.stream.write(",");
            }
            self.stream.newline();
        }
        self.stream.write(");");
        self.stream.newline();
        self.stream.newline();
        self.indent_level -= 1;
        Ok(())
    }

    fn interface_inst_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (instance, connections) = match &self.gen().stmts[sid].kind {
            StmtKind::InterfaceInstantiation(ii) => (ii.instance, ii.connections.clone()),
            _ => {
                return Err(
                    InternalError::new("interface emitter got a different statement").into(),
                )
            }
        };
        let comment = self.gen().stmts[sid].comment.clone();
        self.comment_line(&comment);
        self.record_stmt(sid);

        let inst = self
            .gen()
            .interfaces
            .get(&instance)
            .ok_or_else(|| InternalError::new("instantiation of an unregistered interface"))?;
        let def = &self.design.interfaces[inst.definition];
        self.stream.write(&format!(
            "{}{} {}",
            self.first_indent(inline),
            self.design.resolve(def.def_name),
            self.design.resolve(instance)
        ));

        if connections.is_empty() {
            self.stream.write("();");
            self.stream.newline();
            return Ok(());
        }
        self.stream.write(" (");
        self.stream.newline();
        self.indent_level += 1;
        let mut sorted = connections;
        sorted.sort_by_key(|&(name, _)| self.design.resolve(name).to_string());
        let total = sorted.len();
        for (index, (name, vid)) in sorted.into_iter().enumerate() {
            self.stream.write(&format!(
                "{}.{}({})",
                self.indent(),
                self.design.resolve(name),
                self.local_text(vid)
            ));
            if index + 1 != total {
                self.stream.write(",");
            }
            self.stream.newline();
        }
        self.stream.write(");");
        self.stream.newline();
        self.stream.newline();
        self.indent_level -= 1;
        Ok(())
    }

    fn call_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (call, parent) = match &self.gen().stmts[sid].kind {
            StmtKind::FunctionCall { call } => (*call, self.gen().stmts[sid].parent),
            _ => return Err(InternalError::new("call emitter got a different statement").into()),
        };
        if parent == StmtParent::Generator {
            return Err(IrError::invariant(
                "function call statement cannot be used in top level",
                vec![self.design.var_handle(VarRef::new(self.generator, call))],
            ));
        }
        self.record_stmt(sid);
        self.stream.write(&format!(
            "{}{};",
            self.first_indent(inline),
            self.local_text(call)
        ));
        self.stream.newline();
        Ok(())
    }

    fn return_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let value = match &self.gen().stmts[sid].kind {
            StmtKind::Return { value } => *value,
            _ => return Err(InternalError::new("return emitter got a different statement").into()),
        };
        self.record_stmt(sid);
        self.stream.write(&format!(
            "{}return {};",
            self.first_indent(inline),
            self.local_text(value)
        ));
        self.stream.newline();
        Ok(())
    }

    fn assert_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let (value, else_stmt) = match &self.gen().stmts[sid].kind {
            StmtKind::AssertValue { value, else_stmt } => (*value, *else_stmt),
            _ => return Err(InternalError::new("assert emitter got a different statement").into()),
        };
        self.record_stmt(sid);
        self.stream.write(&format!(
            "{}assert ({})",
            self.first_indent(inline),
            self.local_text(value)
        ));
        if let Some(else_id) = else_stmt {
            self.stream.write(" else ");
            self.dispatch_stmt(else_id, true)?;
        } else {
            self.stream.write(";");
            self.stream.newline();
        }
        Ok(())
    }

    fn comment_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let lines = match &self.gen().stmts[sid].kind {
            StmtKind::Comment { lines } => lines.clone(),
            _ => return Err(InternalError::new("comment emitter got a different statement").into()),
        };
        for (index, line) in lines.into_iter().enumerate() {
            let indent = if index == 0 {
                self.first_indent(inline)
            } else {
                self.indent()
            };
            self.stream.write(&format!("{indent}// {line}"));
            self.stream.newline();
        }
        Ok(())
    }

    fn raw_code(&mut self, sid: StmtId, inline: bool) -> Result<(), IrError> {
        let lines = match &self.gen().stmts[sid].kind {
            StmtKind::RawString { lines } => lines.clone(),
            _ => return Err(InternalError::new("raw emitter got a different statement").into()),
        };
        for (index, line) in lines.into_iter().enumerate() {
            let indent = if index == 0 {
                self.first_indent(inline)
            } else {
                self.indent()
            };
            self.stream.write(&format!("{indent}{line}"));
            self.stream.newline();
        }
        Ok(())
    }

    // ---- declarations ----

    fn width_bracket(&self, gid: GeneratorId, var: &Var) -> String {
        if var.width <= 1 {
            return String::new();
        }
        let high = match var.width_param {
            Some(param) => format!("{}-1", self.design.var_text(VarRef::new(gid, param))),
            None => (var.width - 1).to_string(),
        };
        format!("[{high}:0]")
    }

    /// Renders a variable declaration (without the trailing semicolon).
    pub(crate) fn var_decl(&self, gid: GeneratorId, vid: VarId) -> String {
        let var = &self.design.generator(gid).vars[vid];
        let name = var
            .name
            .map(|n| self.design.resolve(n).to_string())
            .unwrap_or_default();
        let ty = match var.enum_ty {
            Some(e) => self.design.resolve(e).to_string(),
            None => "logic".to_string(),
        };
        let mut parts = vec![ty];
        if var.signed {
            parts.push("signed".to_string());
        }
        let width = self.width_bracket(gid, var);
        if var.is_array() {
            let dims: String = var.size.iter().map(|&w| size_bracket(w)).collect();
            if var.packed {
                let mut packed = dims;
                packed.push_str(&width);
                parts.push(packed);
                parts.push(name);
            } else {
                if !width.is_empty() {
                    parts.push(width);
                }
                parts.push(name);
                parts.push(dims);
            }
        } else {
            if !width.is_empty() && var.enum_ty.is_none() {
                parts.push(width);
            }
            parts.push(name);
        }
        parts.join(" ")
    }

    /// Renders a port declaration (direction, type, shape, name).
    pub(crate) fn port_str(&self, gid: GeneratorId, vid: VarId) -> String {
        let var = &self.design.generator(gid).vars[vid];
        let name = var
            .name
            .map(|n| self.design.resolve(n).to_string())
            .unwrap_or_default();
        let direction = var.port_direction().unwrap_or(PortDirection::In);
        let is_enum = var.enum_ty.is_some();
        let mut parts = vec![direction.as_str().to_string()];
        parts.push(match var.enum_ty {
            Some(e) => self.design.resolve(e).to_string(),
            None => "logic".to_string(),
        });
        if var.signed {
            parts.push("signed".to_string());
        }
        if var.is_array() && var.packed {
            parts.push(var.size.iter().map(|&w| size_bracket(w)).collect());
        }
        if !is_enum {
            let width = self.width_bracket(gid, var);
            if !width.is_empty() {
                parts.push(width);
            }
        }
        parts.push(name);
        if var.is_array() && !var.packed {
            parts.push(var.size.iter().map(|&w| size_bracket(w)).collect());
        }
        parts.join(" ")
    }
}
