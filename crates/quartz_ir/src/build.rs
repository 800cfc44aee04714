//! The construction API.
//!
//! Everything here is an inherent method on [`Design`]: ports, variables,
//! parameters, constants, enums, expression operators, assignments with
//! SSA-style merging, blocks and control flow, module and interface
//! instantiation, and the rewiring helpers. Each method enforces the IR
//! invariants and reports violations as [`IrError`].

use crate::design::Design;
use crate::error::IrError;
use crate::expr::ExprOp;
use crate::generator::EnumDef;
use crate::ids::{GeneratorId, InterfaceId, StmtRef, VarId, VarRef};
use crate::interface::{IfacePort, IfaceVar, InterfaceDefinition, InterfaceInst, ModPort};
use crate::stmt::{
    Assign, AssignKind, Block, BlockKind, EdgeType, FunctionBlock, IfStmt, InterfaceInstantiation,
    ModuleInstantiation, Stmt, StmtKind, StmtParent, Switch, SwitchCase,
};
use crate::var::{PortDirection, PortType, Var, VarKind};
use indexmap::IndexMap;
use quartz_common::{Ident, InternalError};

impl Design {
    fn ensure_unique(&self, g: GeneratorId, name: Ident) -> Result<(), IrError> {
        let gen = self.generator(g);
        if gen.named.contains_key(&name)
            || gen.enums.contains_key(&name)
            || gen.functions.contains_key(&name)
            || gen.interfaces.contains_key(&name)
        {
            return Err(IrError::construction(
                format!(
                    "name `{}` is already used in generator `{}`",
                    self.resolve(name),
                    self.generator_name(g)
                ),
                vec![format!("{}.{}", self.generator_name(g), self.resolve(name))],
            ));
        }
        Ok(())
    }

    fn alloc_var(&mut self, g: GeneratorId, var: impl FnOnce(VarId) -> Var) -> VarRef {
        let gen = self.generator_mut(g);
        let id = gen.vars.next_id();
        gen.vars.alloc(var(id));
        VarRef::new(g, id)
    }

    fn alloc_stmt(&mut self, g: GeneratorId, kind: StmtKind) -> StmtRef {
        let gen = self.generator_mut(g);
        let id = gen.stmts.next_id();
        gen.stmts.alloc(Stmt::new(id, kind));
        StmtRef::new(g, id)
    }

    /// Resolves `r` to a variable owned by `g`. A handle from another
    /// generator is looked up by name in `g`.
    fn resolve_local(&self, g: GeneratorId, r: VarRef) -> Result<VarId, IrError> {
        if r.generator == g {
            return Ok(r.var);
        }
        let unknown = |name: String| IrError::UnknownVar {
            name,
            generator: self.generator_name(g).to_string(),
        };
        let name = self
            .var_data(r)
            .name
            .ok_or_else(|| unknown(self.var_text(r)))?;
        self.generator(g)
            .find_var(name)
            .ok_or_else(|| unknown(self.resolve(name).to_string()))
    }

    // ---- ports, variables, parameters, constants, enums ----

    /// Creates a scalar data port. Duplicate names fail.
    pub fn port(
        &mut self,
        g: GeneratorId,
        direction: PortDirection,
        name: &str,
        width: u32,
    ) -> Result<VarRef, IrError> {
        self.port_full(g, direction, name, width, &[1], PortType::Data, false)
    }

    /// Creates a port with explicit array shape, role, and signedness.
    pub fn port_full(
        &mut self,
        g: GeneratorId,
        direction: PortDirection,
        name: &str,
        width: u32,
        size: &[u32],
        port_type: PortType,
        signed: bool,
    ) -> Result<VarRef, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let size = size.to_vec();
        let r = self.alloc_var(g, |id| {
            let mut v = Var::new(
                id,
                Some(ident),
                width,
                signed,
                VarKind::Port {
                    direction,
                    port_type,
                    interface: None,
                },
            );
            v.size = size;
            v
        });
        let gen = self.generator_mut(g);
        gen.named.insert(ident, r.var);
        gen.ports.push(r.var);
        Ok(r)
    }

    /// Creates a scalar variable. Duplicate names fail.
    pub fn var(&mut self, g: GeneratorId, name: &str, width: u32) -> Result<VarRef, IrError> {
        self.var_full(g, name, width, &[1], false)
    }

    /// Creates a variable with explicit array shape and signedness.
    pub fn var_full(
        &mut self,
        g: GeneratorId,
        name: &str,
        width: u32,
        size: &[u32],
        signed: bool,
    ) -> Result<VarRef, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let size = size.to_vec();
        let r = self.alloc_var(g, |id| {
            let mut v = Var::new(id, Some(ident), width, signed, VarKind::Base);
            v.size = size;
            v
        });
        self.generator_mut(g).named.insert(ident, r.var);
        Ok(r)
    }

    /// Creates a module parameter with a resolved value.
    pub fn param(&mut self, g: GeneratorId, name: &str, value: i64) -> Result<VarRef, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let r = self.alloc_var(g, |id| {
            Var::new(
                id,
                Some(ident),
                32,
                false,
                VarKind::Param {
                    value,
                    parent: None,
                },
            )
        });
        let gen = self.generator_mut(g);
        gen.named.insert(ident, r.var);
        gen.params.insert(ident, r.var);
        Ok(r)
    }

    /// Chains `param` to a parameter of the instantiating generator, so
    /// instantiation emits the parent's name instead of the value.
    pub fn set_param_parent(&mut self, param: VarRef, parent: VarRef) -> Result<(), IrError> {
        for r in [param, parent] {
            if !matches!(self.var_data(r).kind, VarKind::Param { .. }) {
                return Err(IrError::construction(
                    format!("`{}` is not a parameter", self.var_text(r)),
                    vec![self.var_handle(r)],
                ));
            }
        }
        if let VarKind::Param { parent: p, .. } = &mut self.var_mut(param).kind {
            *p = Some(parent);
        }
        Ok(())
    }

    /// Replaces the numeric width of a declaration with `[<param>-1:0]`.
    pub fn set_width_param(&mut self, var: VarRef, param: VarRef) -> Result<(), IrError> {
        if !matches!(self.var_data(param).kind, VarKind::Param { .. }) {
            return Err(IrError::construction(
                format!("`{}` is not a parameter", self.var_text(param)),
                vec![self.var_handle(param)],
            ));
        }
        let pid = self.resolve_local(var.generator, param)?;
        self.var_mut(var).width_param = Some(pid);
        Ok(())
    }

    fn check_const_range(&self, value: i64, width: u32, signed: bool) -> Result<(), IrError> {
        if width == 0 || width > 64 {
            return Err(IrError::construction(
                format!("constant width {width} is outside the supported 1..=64 range"),
                vec![value.to_string()],
            ));
        }
        let value = value as i128;
        let (min, max) = if signed {
            (-(1i128 << (width - 1)), (1i128 << (width - 1)) - 1)
        } else {
            (0, (1i128 << width) - 1)
        };
        if value < min {
            return Err(IrError::construction(
                format!("{value} is smaller than the minimum value ({min}) given width {width}"),
                vec![value.to_string()],
            ));
        }
        if value > max {
            return Err(IrError::construction(
                format!("{value} is larger than the maximum value ({max}) given width {width}"),
                vec![value.to_string()],
            ));
        }
        Ok(())
    }

    /// Creates an integer literal, validated against the (width, signed)
    /// range.
    pub fn constant(
        &mut self,
        g: GeneratorId,
        value: i64,
        width: u32,
        signed: bool,
    ) -> Result<VarRef, IrError> {
        self.check_const_range(value, width, signed)?;
        Ok(self.alloc_var(g, |id| {
            Var::new(id, None, width, signed, VarKind::Const { value })
        }))
    }

    /// Updates a constant's value, re-validated against its range.
    pub fn set_const_value(&mut self, c: VarRef, value: i64) -> Result<(), IrError> {
        let (width, signed) = {
            let v = self.var_data(c);
            if !matches!(v.kind, VarKind::Const { .. }) {
                return Err(IrError::construction(
                    format!("`{}` is not a constant", self.var_text(c)),
                    vec![self.var_handle(c)],
                ));
            }
            (v.width, v.signed)
        };
        self.check_const_range(value, width, signed)?;
        if let VarKind::Const { value: v } = &mut self.var_mut(c).kind {
            *v = value;
        }
        Ok(())
    }

    /// Declares an enum with the given members. Member values are checked
    /// against the enum width; member and enum names must be unique.
    pub fn enum_def(
        &mut self,
        g: GeneratorId,
        name: &str,
        width: u32,
        members: &[(&str, i64)],
    ) -> Result<(), IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let mut values = IndexMap::new();
        for &(member, value) in members {
            let member_ident = self.intern(member);
            if values.contains_key(&member_ident) {
                return Err(IrError::construction(
                    format!("enum `{name}` declares member `{member}` twice"),
                    vec![format!("{name}.{member}")],
                ));
            }
            let c = self.constant(g, value, width, false)?;
            values.insert(member_ident, c.var);
        }
        self.generator_mut(g).enums.insert(
            ident,
            EnumDef {
                name: ident,
                width,
                values,
            },
        );
        Ok(())
    }

    /// Returns the `Const` variable behind an enum member.
    pub fn enum_value(
        &self,
        g: GeneratorId,
        enum_name: &str,
        member: &str,
    ) -> Result<VarRef, IrError> {
        let unknown = |name: &str| IrError::UnknownVar {
            name: name.to_string(),
            generator: self.generator_name(g).to_string(),
        };
        let def = self
            .interner
            .get(enum_name)
            .and_then(|n| self.generator(g).enums.get(&n))
            .ok_or_else(|| unknown(enum_name))?;
        let id = self
            .interner
            .get(member)
            .and_then(|m| def.values.get(&m).copied())
            .ok_or_else(|| unknown(member))?;
        Ok(VarRef::new(g, id))
    }

    /// Declares a variable typed by a previously declared enum.
    pub fn enum_var(
        &mut self,
        g: GeneratorId,
        name: &str,
        enum_name: &str,
    ) -> Result<VarRef, IrError> {
        let enum_ident = self.intern(enum_name);
        let width = self
            .generator(g)
            .enums
            .get(&enum_ident)
            .map(|e| e.width)
            .ok_or_else(|| IrError::UnknownVar {
                name: enum_name.to_string(),
                generator: self.generator_name(g).to_string(),
            })?;
        let r = self.var(g, name, width)?;
        self.var_mut(r).enum_ty = Some(enum_ident);
        Ok(r)
    }

    // ---- expressions ----

    /// Applies a unary operator.
    pub fn unary(&mut self, g: GeneratorId, op: ExprOp, v: VarRef) -> Result<VarRef, IrError> {
        if !op.is_unary() {
            return Err(IrError::construction(
                format!("operator `{}` is not unary", op.as_str()),
                vec![self.var_handle(v)],
            ));
        }
        let vid = self.resolve_local(g, v)?;
        let operand = &self.generator(g).vars[vid];
        let (width, signed) = (operand.width, operand.signed);
        Ok(self.alloc_var(g, |id| {
            Var::new(
                id,
                None,
                width,
                signed,
                VarKind::Expression {
                    op,
                    left: vid,
                    right: None,
                },
            )
        }))
    }

    /// Applies a binary operator. Operand widths must match unless the
    /// operator is relational; relational results are one bit wide.
    pub fn binary(
        &mut self,
        g: GeneratorId,
        op: ExprOp,
        l: VarRef,
        r: VarRef,
    ) -> Result<VarRef, IrError> {
        if op.is_unary() {
            return Err(IrError::construction(
                format!("operator `{}` is not binary", op.as_str()),
                vec![self.var_handle(l), self.var_handle(r)],
            ));
        }
        let lid = self.resolve_local(g, l)?;
        let rid = self.resolve_local(g, r)?;
        let gen = self.generator(g);
        let (lw, ls) = (gen.vars[lid].width, gen.vars[lid].signed);
        let (rw, rs) = (gen.vars[rid].width, gen.vars[rid].signed);
        if !op.is_relational() && lw != rw {
            return Err(IrError::construction(
                format!(
                    "left (`{}`) width ({}) doesn't match with right (`{}`) width ({})",
                    self.var_text(VarRef::new(g, lid)),
                    lw,
                    self.var_text(VarRef::new(g, rid)),
                    rw
                ),
                vec![
                    self.var_handle(VarRef::new(g, lid)),
                    self.var_handle(VarRef::new(g, rid)),
                ],
            ));
        }
        let width = if op.is_relational() { 1 } else { lw };
        let signed = ls && rs;
        Ok(self.alloc_var(g, |id| {
            Var::new(
                id,
                None,
                width,
                signed,
                VarKind::Expression {
                    op,
                    left: lid,
                    right: Some(rid),
                },
            )
        }))
    }

    /// Returns the memoized slice `parent[high:low]`.
    pub fn slice(&mut self, parent: VarRef, high: u32, low: u32) -> Result<VarRef, IrError> {
        let (width, signed) = {
            let v = self.var_data(parent);
            (v.width, v.signed)
        };
        if low > high {
            return Err(IrError::construction(
                format!("low ({low}) cannot be larger than high ({high})"),
                vec![self.var_handle(parent)],
            ));
        }
        if high >= width {
            return Err(IrError::construction(
                format!("high ({high}) has to be smaller than width ({width})"),
                vec![self.var_handle(parent)],
            ));
        }
        if let Some(&existing) = self.var_data(parent).slices.get(&(high, low)) {
            return Ok(VarRef::new(parent.generator, existing));
        }
        let pid = parent.var;
        let r = self.alloc_var(parent.generator, |id| {
            Var::new(
                id,
                None,
                high - low + 1,
                signed,
                VarKind::Slice {
                    parent: pid,
                    high,
                    low,
                },
            )
        });
        self.var_mut(parent).slices.insert((high, low), r.var);
        Ok(r)
    }

    /// Returns the memoized single-bit slice `parent[bit]`.
    pub fn index(&mut self, parent: VarRef, bit: u32) -> Result<VarRef, IrError> {
        self.slice(parent, bit, bit)
    }

    /// Returns a `$signed` view of `v`, or `v` itself when already signed.
    /// The view is memoized and can never be assigned to.
    pub fn signed_cast(&mut self, v: VarRef) -> VarRef {
        let (signed, memo, width) = {
            let var = self.var_data(v);
            (var.signed, var.signed_view, var.width)
        };
        if signed {
            return v;
        }
        if let Some(existing) = memo {
            return VarRef::new(v.generator, existing);
        }
        let pid = v.var;
        let r = self.alloc_var(v.generator, |id| {
            Var::new(id, None, width, true, VarKind::Signed { parent: pid })
        });
        self.var_mut(v).signed_view = Some(r.var);
        r
    }

    /// Concatenates `a` and `b`. Two-way concatenation is memoized on `a`;
    /// concatenating onto an existing concatenation copies it and appends.
    pub fn concat(&mut self, a: VarRef, b: VarRef) -> Result<VarRef, IrError> {
        let g = a.generator;
        let bid = self.resolve_local(g, b)?;
        let b_var = &self.generator(g).vars[bid];
        let (bw, bs) = (b_var.width, b_var.signed);
        let a_var = &self.generator(g).vars[a.var];
        let (aw, asn) = (a_var.width, a_var.signed);

        if let VarKind::Concat { parts } = &a_var.kind {
            let mut parts = parts.clone();
            parts.push(bid);
            let (width, signed) = (aw + bw, asn && bs);
            let parts_copy = parts.clone();
            let r = self.alloc_var(g, |id| {
                Var::new(id, None, width, signed, VarKind::Concat { parts: parts_copy })
            });
            for pid in parts {
                self.generator_mut(g).vars[pid].concats.push(r.var);
            }
            return Ok(r);
        }

        for &cid in &self.generator(g).vars[a.var].concats {
            if let VarKind::Concat { parts } = &self.generator(g).vars[cid].kind {
                if parts.len() == 2 && parts[0] == a.var && parts[1] == bid {
                    return Ok(VarRef::new(g, cid));
                }
            }
        }
        let parts = vec![a.var, bid];
        let (width, signed) = (aw + bw, asn && bs);
        let r = self.alloc_var(g, |id| {
            Var::new(id, None, width, signed, VarKind::Concat { parts })
        });
        self.generator_mut(g).vars[a.var].concats.push(r.var);
        Ok(r)
    }

    // ---- assignments ----

    /// Creates (or merges into) the assignment `dst ← src`.
    ///
    /// A structurally equal assignment to the same destination is returned
    /// instead of duplicated, upgrading an `Undefined` kind in place. The
    /// statement is not attached anywhere; pass it to
    /// [`add_stmt`](Self::add_stmt) or [`add_to_block`](Self::add_to_block).
    pub fn assign(
        &mut self,
        g: GeneratorId,
        dst: VarRef,
        src: VarRef,
        kind: AssignKind,
    ) -> Result<StmtRef, IrError> {
        if !self.var_data(dst).is_assignable() {
            return Err(IrError::construction(
                format!(
                    "cannot assign `{}` to `{}`: the destination is not assignable",
                    self.var_text(src),
                    self.var_text(dst)
                ),
                vec![self.var_handle(dst), self.var_handle(src)],
            ));
        }

        let existing: Vec<StmtRef> = self.var_data(dst).sources.iter().copied().collect();
        for sref in existing {
            let a = self
                .stmt(sref)
                .as_assign()
                .ok_or_else(|| InternalError::new("source set contains a non-assignment"))?;
            if a.left == dst && a.right == src {
                let current = a.kind;
                match (current, kind) {
                    (_, AssignKind::Undefined) => return Ok(sref),
                    (AssignKind::Undefined, k) => {
                        if let StmtKind::Assign(a) = &mut self.stmt_mut(sref).kind {
                            a.kind = k;
                        }
                        self.unify_assign_kinds(dst)?;
                        return Ok(sref);
                    }
                    (c, k) if c == k => return Ok(sref),
                    (c, k) => {
                        return Err(IrError::AssignKindConflict {
                            message: format!(
                                "assignment `{}` ← `{}` is already {:?}, cannot redeclare it {:?}",
                                self.var_text(dst),
                                self.var_text(src),
                                c,
                                k
                            ),
                            nodes: vec![self.var_handle(dst), self.var_handle(src)],
                        });
                    }
                }
            }
        }

        let sref = self.alloc_stmt(
            g,
            StmtKind::Assign(Assign {
                left: dst,
                right: src,
                kind,
            }),
        );
        self.var_mut(dst).sources.insert(sref);
        self.var_mut(src).sinks.insert(sref);
        self.unify_assign_kinds(dst)?;
        Ok(sref)
    }

    /// Unifies the assignment kinds across every driver of `dst`: once any
    /// driver commits to Blocking or NonBlocking, `Undefined` drivers are
    /// upgraded to match and a committed disagreement is an error.
    fn unify_assign_kinds(&mut self, dst: VarRef) -> Result<(), IrError> {
        let sources: Vec<StmtRef> = self.var_data(dst).sources.iter().copied().collect();
        let mut committed: Option<AssignKind> = None;
        for &sref in &sources {
            let kind = self
                .stmt(sref)
                .as_assign()
                .map(|a| a.kind)
                .ok_or_else(|| InternalError::new("source set contains a non-assignment"))?;
            if kind == AssignKind::Undefined {
                continue;
            }
            match committed {
                None => committed = Some(kind),
                Some(k) if k == kind => {}
                Some(k) => {
                    return Err(IrError::AssignKindConflict {
                        message: format!(
                            "`{}` is driven by both {:?} and {:?} assignments",
                            self.var_text(dst),
                            k,
                            kind
                        ),
                        nodes: vec![self.var_handle(dst)],
                    });
                }
            }
        }
        if let Some(k) = committed {
            for sref in sources {
                if let StmtKind::Assign(a) = &mut self.stmt_mut(sref).kind {
                    if a.kind == AssignKind::Undefined {
                        a.kind = k;
                    }
                }
            }
        }
        Ok(())
    }

    /// Removes an assignment from both endpoint sets and from its parent.
    pub fn unassign(&mut self, stmt: StmtRef) -> Result<(), IrError> {
        let (left, right, parent) = {
            let s = self.stmt(stmt);
            let a = s
                .as_assign()
                .ok_or_else(|| InternalError::new("unassign called on a non-assignment"))?;
            (a.left, a.right, s.parent)
        };
        self.var_mut(left).sources.remove(&stmt);
        self.var_mut(right).sinks.remove(&stmt);
        match parent {
            StmtParent::Generator => {
                let body = &mut self.generator_mut(stmt.generator).body;
                body.retain(|&s| s != stmt.stmt);
            }
            StmtParent::Stmt(pid) => {
                if let StmtKind::Block(block) =
                    &mut self.generator_mut(stmt.generator).stmts[pid].kind
                {
                    block.children.retain(|&s| s != stmt.stmt);
                }
            }
            StmtParent::Detached => {}
        }
        self.stmt_mut(stmt).parent = StmtParent::Detached;
        Ok(())
    }

    // ---- rewiring ----

    fn check_rewirable(&self, r: VarRef) -> Result<(), IrError> {
        if !self.var_data(r).is_rewirable() {
            return Err(IrError::construction(
                "only base or port variables are allowed",
                vec![self.var_handle(r)],
            ));
        }
        Ok(())
    }

    /// Rewrites every assignment driving `old` (recursively including its
    /// slices) to drive `new` instead, then appends `old ← new` to
    /// `parent` to preserve semantics.
    pub fn move_src_to(
        &mut self,
        old: VarRef,
        new: VarRef,
        parent: GeneratorId,
    ) -> Result<(), IrError> {
        self.check_rewirable(old)?;
        self.check_rewirable(new)?;
        self.move_src_inner(old, new)?;
        let stmt = self.assign(parent, old, new, AssignKind::Undefined)?;
        self.add_stmt(parent, stmt)
    }

    fn move_src_inner(&mut self, old: VarRef, new: VarRef) -> Result<(), IrError> {
        let sources: Vec<StmtRef> = self.var_data(old).sources.iter().copied().collect();
        for sref in sources {
            let left = self
                .stmt(sref)
                .as_assign()
                .map(|a| a.left)
                .ok_or_else(|| InternalError::new("source set contains a non-assignment"))?;
            if left != old {
                return Err(InternalError::new("assignment does not drive the moved variable").into());
            }
            if let StmtKind::Assign(a) = &mut self.stmt_mut(sref).kind {
                a.left = new;
            }
            self.var_mut(new).sources.insert(sref);
        }
        self.var_mut(old).sources.clear();
        let slices: Vec<((u32, u32), VarId)> = self
            .var_data(old)
            .slices
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect();
        for ((high, low), slice_id) in slices {
            let new_slice = self.slice(new, high, low)?;
            self.move_src_inner(VarRef::new(old.generator, slice_id), new_slice)?;
        }
        self.unify_assign_kinds(new)
    }

    /// Rewrites every assignment reading `old` (recursively including its
    /// slices) to read `new` instead, then appends `new ← old` to
    /// `parent` to preserve semantics.
    pub fn move_sink_to(
        &mut self,
        old: VarRef,
        new: VarRef,
        parent: GeneratorId,
    ) -> Result<(), IrError> {
        self.check_rewirable(old)?;
        self.check_rewirable(new)?;
        self.move_sink_inner(old, new)?;
        let stmt = self.assign(parent, new, old, AssignKind::Undefined)?;
        self.add_stmt(parent, stmt)
    }

    fn move_sink_inner(&mut self, old: VarRef, new: VarRef) -> Result<(), IrError> {
        let sinks: Vec<StmtRef> = self.var_data(old).sinks.iter().copied().collect();
        for sref in sinks {
            let right = self
                .stmt(sref)
                .as_assign()
                .map(|a| a.right)
                .ok_or_else(|| InternalError::new("sink set contains a non-assignment"))?;
            if right != old {
                return Err(InternalError::new("assignment does not read the moved variable").into());
            }
            if let StmtKind::Assign(a) = &mut self.stmt_mut(sref).kind {
                a.right = new;
            }
            self.var_mut(new).sinks.insert(sref);
        }
        self.var_mut(old).sinks.clear();
        let slices: Vec<((u32, u32), VarId)> = self
            .var_data(old)
            .slices
            .iter()
            .map(|(&k, &v)| (k, v))
            .collect();
        for ((high, low), slice_id) in slices {
            let new_slice = self.slice(new, high, low)?;
            self.move_sink_inner(VarRef::new(old.generator, slice_id), new_slice)?;
        }
        Ok(())
    }

    // ---- statement attachment ----

    /// Attaches a statement to the generator body. An `Undefined`
    /// assignment resolves to Blocking; a NonBlocking one is rejected.
    pub fn add_stmt(&mut self, g: GeneratorId, stmt: StmtRef) -> Result<(), IrError> {
        if stmt.generator != g {
            return Err(InternalError::new("statement belongs to another generator").into());
        }
        if self.stmt(stmt).parent != StmtParent::Detached {
            return Err(IrError::construction(
                "statement is already attached",
                vec![],
            ));
        }
        if let Some((kind, left, right)) = self.stmt(stmt).as_assign().map(|a| (a.kind, a.left, a.right))
        {
            match kind {
                AssignKind::NonBlocking => {
                    return Err(IrError::AssignKindConflict {
                        message: format!(
                            "top level assignment for `{}` ← `{}` has to be blocking",
                            self.var_text(left),
                            self.var_text(right)
                        ),
                        nodes: vec![self.var_handle(left), self.var_handle(right)],
                    });
                }
                AssignKind::Undefined => {
                    if let StmtKind::Assign(a) = &mut self.stmt_mut(stmt).kind {
                        a.kind = AssignKind::Blocking;
                    }
                    self.unify_assign_kinds(left)?;
                }
                AssignKind::Blocking => {}
            }
        } else {
            // statements nested under the top level are blocking as well
            self.propagate_kind(stmt, AssignKind::Blocking)?;
        }
        self.stmt_mut(stmt).parent = StmtParent::Generator;
        self.generator_mut(g).body.push(stmt.stmt);
        Ok(())
    }

    /// Detaches a top-level statement from the generator body.
    pub fn remove_stmt(&mut self, g: GeneratorId, stmt: StmtRef) {
        self.generator_mut(g).body.retain(|&s| s != stmt.stmt);
        if self.stmt(stmt).parent == StmtParent::Generator {
            self.stmt_mut(stmt).parent = StmtParent::Detached;
        }
    }

    // ---- blocks ----

    fn new_block(&mut self, g: GeneratorId, kind: BlockKind) -> StmtRef {
        self.alloc_stmt(
            g,
            StmtKind::Block(Block {
                kind,
                children: Vec::new(),
                label: None,
            }),
        )
    }

    /// Creates an `always_ff` block with the given sensitivity list.
    pub fn seq_block(
        &mut self,
        g: GeneratorId,
        sensitivity: &[(EdgeType, VarRef)],
    ) -> Result<StmtRef, IrError> {
        let mut resolved = Vec::with_capacity(sensitivity.len());
        for &(edge, var) in sensitivity {
            resolved.push((edge, self.resolve_local(g, var)?));
        }
        Ok(self.new_block(
            g,
            BlockKind::Sequential {
                sensitivity: resolved,
            },
        ))
    }

    /// Creates an `always_comb` block.
    pub fn comb_block(&mut self, g: GeneratorId) -> StmtRef {
        self.new_block(g, BlockKind::Combinational)
    }

    /// Creates an `initial` block.
    pub fn initial_block(&mut self, g: GeneratorId) -> StmtRef {
        self.new_block(g, BlockKind::Initial)
    }

    /// Creates a plain `begin … end` scope.
    pub fn scope_block(&mut self, g: GeneratorId) -> StmtRef {
        self.new_block(g, BlockKind::Scoped)
    }

    /// Labels a block; the label is emitted as `begin :label` and indexed
    /// for lookup.
    pub fn set_block_label(&mut self, block: StmtRef, label: &str) -> Result<(), IrError> {
        let ident = self.intern(label);
        if self
            .generator(block.generator)
            .named_blocks
            .contains_key(&ident)
        {
            return Err(IrError::construction(
                format!("block label `{label}` is already used"),
                vec![label.to_string()],
            ));
        }
        match &mut self.stmt_mut(block).kind {
            StmtKind::Block(b) => b.label = Some(ident),
            _ => return Err(InternalError::new("labels can only be set on blocks").into()),
        }
        self.generator_mut(block.generator)
            .named_blocks
            .insert(ident, block.stmt);
        Ok(())
    }

    /// Declares a function block. The body is populated with
    /// [`add_to_block`](Self::add_to_block).
    pub fn function_block(&mut self, g: GeneratorId, name: &str) -> Result<StmtRef, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let stmt = self.new_block(
            g,
            BlockKind::Function(FunctionBlock {
                name: ident,
                ports: IndexMap::new(),
                ordering: None,
                has_return: false,
                dpi: false,
            }),
        );
        self.generator_mut(g).functions.insert(ident, stmt.stmt);
        Ok(stmt)
    }

    /// Adds an input port to a function signature.
    pub fn function_port(
        &mut self,
        func: StmtRef,
        name: &str,
        width: u32,
        signed: bool,
    ) -> Result<VarRef, IrError> {
        let ident = self.intern(name);
        let g = func.generator;
        {
            let fb = self.function_payload(func)?;
            if fb.ports.contains_key(&ident) {
                return Err(IrError::construction(
                    format!("function already has a port named `{name}`"),
                    vec![name.to_string()],
                ));
            }
        }
        let r = self.alloc_var(g, |id| {
            Var::new(
                id,
                Some(ident),
                width,
                signed,
                VarKind::Port {
                    direction: PortDirection::In,
                    port_type: PortType::Data,
                    interface: None,
                },
            )
        });
        self.function_payload_mut(func)?.ports.insert(ident, r.var);
        Ok(r)
    }

    /// Sets an explicit port ordering for a function; emission uses it
    /// instead of the alphabetical default.
    pub fn set_function_port_ordering(
        &mut self,
        func: StmtRef,
        order: &[&str],
    ) -> Result<(), IrError> {
        let idents: Vec<Ident> = order.iter().map(|n| self.intern(n)).collect();
        let fb = self.function_payload(func)?;
        if idents.len() != fb.ports.len() || idents.iter().any(|i| !fb.ports.contains_key(i)) {
            return Err(InternalError::new("port ordering size mismatches ports").into());
        }
        self.function_payload_mut(func)?.ordering = Some(idents);
        Ok(())
    }

    /// Marks whether the function returns a value.
    pub fn set_function_return(&mut self, func: StmtRef, has_return: bool) -> Result<(), IrError> {
        self.function_payload_mut(func)?.has_return = has_return;
        Ok(())
    }

    /// Marks the function as a DPI import; emission skips it.
    pub fn set_function_dpi(&mut self, func: StmtRef, dpi: bool) -> Result<(), IrError> {
        self.function_payload_mut(func)?.dpi = dpi;
        Ok(())
    }

    fn function_payload(&self, func: StmtRef) -> Result<&FunctionBlock, IrError> {
        match &self.stmt(func).kind {
            StmtKind::Block(Block {
                kind: BlockKind::Function(fb),
                ..
            }) => Ok(fb),
            _ => Err(InternalError::new("statement is not a function block").into()),
        }
    }

    fn function_payload_mut(&mut self, func: StmtRef) -> Result<&mut FunctionBlock, IrError> {
        match &mut self.stmt_mut(func).kind {
            StmtKind::Block(Block {
                kind: BlockKind::Function(fb),
                ..
            }) => Ok(fb),
            _ => Err(InternalError::new("statement is not a function block").into()),
        }
    }

    /// Appends a statement to a block, resolving `Undefined` assignment
    /// kinds from the block's context (NonBlocking under `always_ff`,
    /// Blocking elsewhere).
    pub fn add_to_block(&mut self, block: StmtRef, stmt: StmtRef) -> Result<(), IrError> {
        if block.generator != stmt.generator {
            return Err(InternalError::new("statement belongs to another generator").into());
        }
        if self.stmt(stmt).parent != StmtParent::Detached {
            return Err(IrError::construction(
                "statement is already attached",
                vec![],
            ));
        }
        let is_function = matches!(
            &self.stmt(block).kind,
            StmtKind::Block(Block {
                kind: BlockKind::Function(_),
                ..
            })
        );
        match &mut self.stmt_mut(block).kind {
            StmtKind::Block(b) => b.children.push(stmt.stmt),
            _ => return Err(InternalError::new("add_to_block target is not a block").into()),
        }
        self.stmt_mut(stmt).parent = StmtParent::Stmt(block.stmt);
        if is_function && matches!(self.stmt(stmt).kind, StmtKind::Return { .. }) {
            self.function_payload_mut(block)?.has_return = true;
        }
        if let Some(kind) = self.effective_block_kind(block) {
            self.propagate_kind(stmt, kind)?;
        }
        Ok(())
    }

    /// The assignment kind implied by a block's context, walking up
    /// through scopes to the nearest `always_ff`/`always_comb`/`initial`/
    /// function, or to the generator top.
    fn effective_block_kind(&self, block: StmtRef) -> Option<AssignKind> {
        let mut current = block.stmt;
        loop {
            let stmt = &self.generator(block.generator).stmts[current];
            if let StmtKind::Block(b) = &stmt.kind {
                match b.kind {
                    BlockKind::Sequential { .. } => return Some(AssignKind::NonBlocking),
                    BlockKind::Combinational | BlockKind::Initial | BlockKind::Function(_) => {
                        return Some(AssignKind::Blocking)
                    }
                    BlockKind::Scoped => {}
                }
            }
            match stmt.parent {
                StmtParent::Stmt(pid) => current = pid,
                StmtParent::Generator => return Some(AssignKind::Blocking),
                StmtParent::Detached => return None,
            }
        }
    }

    /// Commits `kind` to every `Undefined` assignment reachable through
    /// scoped blocks, if-bodies, switch arms, and assert-else clauses.
    fn propagate_kind(&mut self, stmt: StmtRef, kind: AssignKind) -> Result<(), IrError> {
        let g = stmt.generator;
        let mut queue = vec![stmt.stmt];
        let mut dirty_dsts = Vec::new();
        while let Some(id) = queue.pop() {
            let mut commit = false;
            match &self.generator(g).stmts[id].kind {
                StmtKind::Assign(a) => {
                    if a.kind == AssignKind::Undefined {
                        dirty_dsts.push(a.left);
                        commit = true;
                    }
                }
                StmtKind::Block(b) => {
                    if matches!(b.kind, BlockKind::Scoped) {
                        queue.extend(b.children.iter().copied());
                    }
                }
                StmtKind::If(i) => {
                    queue.push(i.then_body);
                    queue.push(i.else_body);
                }
                StmtKind::Switch(s) => {
                    queue.extend(s.cases.iter().map(|c| c.body));
                }
                StmtKind::AssertValue {
                    else_stmt: Some(e), ..
                } => queue.push(*e),
                _ => {}
            }
            if commit {
                if let StmtKind::Assign(a) = &mut self.generator_mut(g).stmts[id].kind {
                    a.kind = kind;
                }
            }
        }
        for dst in dirty_dsts {
            self.unify_assign_kinds(dst)?;
        }
        Ok(())
    }

    // ---- control flow ----

    /// Creates an if statement with empty then/else scopes.
    pub fn if_stmt(&mut self, g: GeneratorId, predicate: VarRef) -> Result<StmtRef, IrError> {
        let pid = self.resolve_local(g, predicate)?;
        let then_body = self.scope_block(g);
        let else_body = self.scope_block(g);
        let stmt = self.alloc_stmt(
            g,
            StmtKind::If(IfStmt {
                predicate: pid,
                then_body: then_body.stmt,
                else_body: else_body.stmt,
            }),
        );
        self.stmt_mut(then_body).parent = StmtParent::Stmt(stmt.stmt);
        self.stmt_mut(else_body).parent = StmtParent::Stmt(stmt.stmt);
        Ok(stmt)
    }

    /// The then-scope of an if statement.
    pub fn then_body(&self, if_stmt: StmtRef) -> Result<StmtRef, IrError> {
        match &self.stmt(if_stmt).kind {
            StmtKind::If(i) => Ok(StmtRef::new(if_stmt.generator, i.then_body)),
            _ => Err(InternalError::new("statement is not an if").into()),
        }
    }

    /// The else-scope of an if statement.
    pub fn else_body(&self, if_stmt: StmtRef) -> Result<StmtRef, IrError> {
        match &self.stmt(if_stmt).kind {
            StmtKind::If(i) => Ok(StmtRef::new(if_stmt.generator, i.else_body)),
            _ => Err(InternalError::new("statement is not an if").into()),
        }
    }

    /// Creates an empty switch over `target`.
    pub fn switch_stmt(&mut self, g: GeneratorId, target: VarRef) -> Result<StmtRef, IrError> {
        let tid = self.resolve_local(g, target)?;
        Ok(self.alloc_stmt(
            g,
            StmtKind::Switch(Switch {
                target: tid,
                cases: Vec::new(),
            }),
        ))
    }

    /// Adds an arm to a switch and returns its body scope. `None` adds the
    /// default arm; a duplicate key or second default is rejected.
    pub fn switch_case(
        &mut self,
        sw: StmtRef,
        value: Option<VarRef>,
    ) -> Result<StmtRef, IrError> {
        let g = sw.generator;
        let value_id = match value {
            Some(v) => {
                let vid = self.resolve_local(g, v)?;
                if !matches!(self.generator(g).vars[vid].kind, VarKind::Const { .. }) {
                    return Err(IrError::construction(
                        format!(
                            "switch case `{}` is not a constant",
                            self.var_text(VarRef::new(g, vid))
                        ),
                        vec![self.var_handle(VarRef::new(g, vid))],
                    ));
                }
                Some(vid)
            }
            None => None,
        };
        let existing = match &self.stmt(sw).kind {
            StmtKind::Switch(s) => s.cases.clone(),
            _ => return Err(InternalError::new("statement is not a switch").into()),
        };
        for case in &existing {
            match (case.value, value_id) {
                (None, None) => {
                    return Err(IrError::invariant(
                        "switch statement already has a default case",
                        vec![],
                    ));
                }
                (Some(a), Some(b)) => {
                    let va = self.const_value_of(g, a)?;
                    let vb = self.const_value_of(g, b)?;
                    if va == vb {
                        return Err(IrError::invariant(
                            format!(
                                "switch statement already has a case for `{}`",
                                self.var_text(VarRef::new(g, b))
                            ),
                            vec![self.var_handle(VarRef::new(g, b))],
                        ));
                    }
                }
                _ => {}
            }
        }
        let body = self.scope_block(g);
        self.stmt_mut(body).parent = StmtParent::Stmt(sw.stmt);
        match &mut self.stmt_mut(sw).kind {
            StmtKind::Switch(s) => s.cases.push(SwitchCase {
                value: value_id,
                body: body.stmt,
            }),
            _ => unreachable!("checked above"),
        }
        Ok(body)
    }

    /// The value of a `Const` variable.
    pub(crate) fn const_value_of(&self, g: GeneratorId, id: VarId) -> Result<i64, IrError> {
        match self.generator(g).vars[id].kind {
            VarKind::Const { value } => Ok(value),
            _ => Err(InternalError::new("variable is not a constant").into()),
        }
    }

    // ---- instantiation ----

    /// Creates a module instantiation statement for `child`, connecting
    /// the named child ports to parent-side values. The statement still
    /// needs to be attached with [`add_stmt`](Self::add_stmt).
    pub fn instantiate(
        &mut self,
        g: GeneratorId,
        child: GeneratorId,
        instance_name: &str,
        connections: &[(&str, VarRef)],
    ) -> Result<StmtRef, IrError> {
        if child == g {
            return Err(IrError::construction(
                format!(
                    "generator `{}` cannot instantiate itself",
                    self.generator_name(g)
                ),
                vec![self.generator_name(g).to_string()],
            ));
        }
        if self.generator(child).instance_name.is_some() {
            return Err(IrError::construction(
                format!(
                    "generator `{}` is already instantiated; clone it for a second instance",
                    self.generator_name(child)
                ),
                vec![self.generator_name(child).to_string()],
            ));
        }
        let mut resolved = Vec::with_capacity(connections.len());
        for &(port_name, external) in connections {
            let ident = self.intern(port_name);
            let port_id =
                self.generator(child)
                    .find_var(ident)
                    .ok_or_else(|| IrError::UnknownVar {
                        name: port_name.to_string(),
                        generator: self.generator_name(child).to_string(),
                    })?;
            if !self.generator(child).vars[port_id].is_port() {
                return Err(IrError::construction(
                    format!(
                        "`{}` is not a port of `{}`",
                        port_name,
                        self.generator_name(child)
                    ),
                    vec![self.var_handle(VarRef::new(child, port_id))],
                ));
            }
            resolved.push((port_id, external));
        }
        let instance = self.intern(instance_name);
        self.generator_mut(child).instance_name = Some(instance);
        self.generator_mut(g).children.push(child);
        Ok(self.alloc_stmt(
            g,
            StmtKind::ModuleInstantiation(ModuleInstantiation {
                target: child,
                connections: resolved,
            }),
        ))
    }

    // ---- interfaces ----

    /// Creates an empty interface definition.
    pub fn interface_def(&mut self, name: &str) -> InterfaceId {
        let ident = self.intern(name);
        self.interfaces.alloc(InterfaceDefinition::new(ident))
    }

    /// Adds a port to an interface definition's header.
    pub fn interface_def_port(
        &mut self,
        iface: InterfaceId,
        name: &str,
        direction: PortDirection,
        width: u32,
    ) -> Result<(), IrError> {
        let ident = self.intern(name);
        let def = &mut self.interfaces[iface];
        if def.ports.contains_key(&ident) || def.vars.contains_key(&ident) {
            return Err(IrError::construction(
                format!("interface already declares `{name}`"),
                vec![name.to_string()],
            ));
        }
        def.ports.insert(
            ident,
            IfacePort {
                direction,
                width,
                size: vec![1],
                signed: false,
            },
        );
        Ok(())
    }

    /// Adds an internal variable to an interface definition.
    pub fn interface_def_var(
        &mut self,
        iface: InterfaceId,
        name: &str,
        width: u32,
    ) -> Result<(), IrError> {
        let ident = self.intern(name);
        let def = &mut self.interfaces[iface];
        if def.ports.contains_key(&ident) || def.vars.contains_key(&ident) {
            return Err(IrError::construction(
                format!("interface already declares `{name}`"),
                vec![name.to_string()],
            ));
        }
        def.vars.insert(
            ident,
            IfaceVar {
                width,
                size: vec![1],
                signed: false,
            },
        );
        Ok(())
    }

    /// Adds a modport view to an interface definition.
    pub fn interface_def_modport(
        &mut self,
        iface: InterfaceId,
        name: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<(), IrError> {
        let ident = self.intern(name);
        let inputs: Vec<Ident> = inputs.iter().map(|n| self.intern(n)).collect();
        let outputs: Vec<Ident> = outputs.iter().map(|n| self.intern(n)).collect();
        let def = &mut self.interfaces[iface];
        if def.mod_ports.contains_key(&ident) {
            return Err(IrError::construction(
                format!("interface already declares modport `{name}`"),
                vec![name.to_string()],
            ));
        }
        def.mod_ports.insert(ident, ModPort { inputs, outputs });
        Ok(())
    }

    /// Registers an interface instance inside a generator.
    pub fn interface_instance(
        &mut self,
        g: GeneratorId,
        iface: InterfaceId,
        name: &str,
    ) -> Result<Ident, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        self.generator_mut(g).interfaces.insert(
            ident,
            InterfaceInst {
                name: ident,
                definition: iface,
                modport: None,
            },
        );
        Ok(ident)
    }

    /// Creates an interface instantiation statement for a registered
    /// instance, connecting its header ports to local variables.
    pub fn interface_instantiation(
        &mut self,
        g: GeneratorId,
        instance: &str,
        connections: &[(&str, VarRef)],
    ) -> Result<StmtRef, IrError> {
        let inst_ident = self.intern(instance);
        let def_id = self
            .generator(g)
            .interfaces
            .get(&inst_ident)
            .map(|i| i.definition)
            .ok_or_else(|| IrError::UnknownVar {
                name: instance.to_string(),
                generator: self.generator_name(g).to_string(),
            })?;
        let mut resolved = Vec::with_capacity(connections.len());
        for &(port_name, external) in connections {
            let port_ident = self.intern(port_name);
            if !self.interfaces[def_id].ports.contains_key(&port_ident) {
                return Err(IrError::UnknownVar {
                    name: port_name.to_string(),
                    generator: self.generator_name(g).to_string(),
                });
            }
            resolved.push((port_ident, self.resolve_local(g, external)?));
        }
        Ok(self.alloc_stmt(
            g,
            StmtKind::InterfaceInstantiation(InterfaceInstantiation {
                instance: inst_ident,
                connections: resolved,
            }),
        ))
    }

    /// Declares an interface-backed port bundle. All bundles referencing
    /// the same instance collapse to a single line in the port list.
    pub fn interface_port(
        &mut self,
        g: GeneratorId,
        iface: InterfaceId,
        name: &str,
        modport: Option<&str>,
    ) -> Result<VarRef, IrError> {
        let ident = self.intern(name);
        self.ensure_unique(g, ident)?;
        let modport_ident = match modport {
            Some(m) => {
                let mi = self.intern(m);
                if !self.interfaces[iface].mod_ports.contains_key(&mi) {
                    return Err(IrError::UnknownVar {
                        name: m.to_string(),
                        generator: self.generator_name(g).to_string(),
                    });
                }
                Some(mi)
            }
            None => None,
        };
        let r = self.alloc_var(g, |id| {
            Var::new(
                id,
                Some(ident),
                1,
                false,
                VarKind::Port {
                    direction: PortDirection::InOut,
                    port_type: PortType::Data,
                    interface: Some(ident),
                },
            )
        });
        let gen = self.generator_mut(g);
        gen.named.insert(ident, r.var);
        gen.ports.push(r.var);
        gen.interfaces.insert(
            ident,
            InterfaceInst {
                name: ident,
                definition: iface,
                modport: modport_ident,
            },
        );
        Ok(r)
    }

    /// Returns (creating on first use) the variable `instance.signal` for
    /// a signal inside an interface instance.
    pub fn interface_signal(
        &mut self,
        g: GeneratorId,
        instance: &str,
        signal: &str,
    ) -> Result<VarRef, IrError> {
        let inst_ident = self.intern(instance);
        let def_id = self
            .generator(g)
            .interfaces
            .get(&inst_ident)
            .map(|i| i.definition)
            .ok_or_else(|| IrError::UnknownVar {
                name: instance.to_string(),
                generator: self.generator_name(g).to_string(),
            })?;
        let signal_ident = self.intern(signal);
        let width = self.interfaces[def_id]
            .signal_width(signal_ident)
            .ok_or_else(|| IrError::UnknownVar {
                name: format!("{instance}.{signal}"),
                generator: self.generator_name(g).to_string(),
            })?;
        let full = self.intern(&format!("{instance}.{signal}"));
        if let Some(existing) = self.generator(g).find_var(full) {
            return Ok(VarRef::new(g, existing));
        }
        let r = self.alloc_var(g, |id| Var::new(id, Some(full), width, false, VarKind::Base));
        self.generator_mut(g).named.insert(full, r.var);
        Ok(r)
    }

    // ---- miscellaneous statements ----

    /// Creates a function-call expression variable.
    pub fn function_call(
        &mut self,
        g: GeneratorId,
        function: &str,
        args: &[VarRef],
    ) -> Result<VarRef, IrError> {
        let ident = self.intern(function);
        let mut resolved = Vec::with_capacity(args.len());
        for &a in args {
            resolved.push(self.resolve_local(g, a)?);
        }
        Ok(self.alloc_var(g, |id| {
            Var::new(
                id,
                None,
                1,
                false,
                VarKind::Call {
                    function: ident,
                    args: resolved,
                },
            )
        }))
    }

    /// Wraps a call expression in a statement. Must not be attached at the
    /// generator top; emission rejects that.
    pub fn function_call_stmt(&mut self, g: GeneratorId, call: VarRef) -> Result<StmtRef, IrError> {
        let cid = self.resolve_local(g, call)?;
        if !matches!(self.generator(g).vars[cid].kind, VarKind::Call { .. }) {
            return Err(IrError::construction(
                format!(
                    "`{}` is not a function call",
                    self.var_text(VarRef::new(g, cid))
                ),
                vec![self.var_handle(VarRef::new(g, cid))],
            ));
        }
        Ok(self.alloc_stmt(g, StmtKind::FunctionCall { call: cid }))
    }

    /// Creates a `return value;` statement.
    pub fn return_stmt(&mut self, g: GeneratorId, value: VarRef) -> Result<StmtRef, IrError> {
        let vid = self.resolve_local(g, value)?;
        Ok(self.alloc_stmt(g, StmtKind::Return { value: vid }))
    }

    /// Creates an `assert (value)` statement with an optional else clause
    /// dispatched inline.
    pub fn assert_stmt(
        &mut self,
        g: GeneratorId,
        value: VarRef,
        else_stmt: Option<StmtRef>,
    ) -> Result<StmtRef, IrError> {
        let vid = self.resolve_local(g, value)?;
        let else_id = match else_stmt {
            Some(e) => {
                if e.generator != g {
                    return Err(
                        InternalError::new("assert else clause belongs to another generator")
                            .into(),
                    );
                }
                Some(e.stmt)
            }
            None => None,
        };
        let stmt = self.alloc_stmt(
            g,
            StmtKind::AssertValue {
                value: vid,
                else_stmt: else_id,
            },
        );
        if let Some(e) = else_id {
            self.generator_mut(g).stmts[e].parent = StmtParent::Stmt(stmt.stmt);
        }
        Ok(stmt)
    }

    /// Creates a comment statement, one emitted line per text line.
    pub fn comment_stmt(&mut self, g: GeneratorId, text: &str) -> StmtRef {
        let lines = text.lines().map(str::to_string).collect();
        self.alloc_stmt(g, StmtKind::Comment { lines })
    }

    /// Creates a raw-string statement emitted verbatim (indented).
    pub fn raw_stmt(&mut self, g: GeneratorId, lines: &[&str]) -> StmtRef {
        let lines = lines.iter().map(|s| s.to_string()).collect();
        self.alloc_stmt(g, StmtKind::RawString { lines })
    }

    /// Attaches a comment to a statement.
    pub fn set_stmt_comment(&mut self, stmt: StmtRef, text: &str) {
        self.stmt_mut(stmt).comment = Some(text.to_string());
    }

    /// Attaches a comment to a variable declaration.
    pub fn set_var_comment(&mut self, var: VarRef, text: &str) {
        self.var_mut(var).comment = Some(text.to_string());
    }
}
