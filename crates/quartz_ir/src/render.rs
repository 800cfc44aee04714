//! Textual rendering of variables.
//!
//! Expressions render with their operands parenthesized one level deep
//! (`x = a + (b ^ c)`), slices compose textually (`a[7:4][1:0]`), and
//! constants render as sized hexadecimal literals (`8'h7F`, `-8'h80`).

use crate::design::Design;
use crate::ids::{GeneratorId, VarId, VarRef};
use crate::var::VarKind;

/// Renders a constant as a sized hexadecimal literal.
pub fn const_text(value: i64, width: u32, signed: bool) -> String {
    if signed && value < 0 {
        format!("-{}'h{:X}", width, -(value as i128))
    } else {
        format!("{}'h{:X}", width, value)
    }
}

impl Design {
    /// The statement-level text of a variable: its name, or the composed
    /// text of an anonymous view.
    pub fn var_text(&self, r: VarRef) -> String {
        self.render_var(r.generator, r.var, false)
    }

    /// A diagnostic handle of the form `generator.text`.
    pub fn var_handle(&self, r: VarRef) -> String {
        format!("{}.{}", self.generator_name(r.generator), self.var_text(r))
    }

    fn render_var(&self, g: GeneratorId, id: VarId, nested: bool) -> String {
        let var = &self.generator(g).vars[id];
        match &var.kind {
            VarKind::Base | VarKind::Port { .. } | VarKind::Param { .. } => var
                .name
                .map(|n| self.resolve(n).to_string())
                .unwrap_or_else(|| "<anonymous>".to_string()),
            VarKind::Const { value } => const_text(*value, var.width, var.signed),
            VarKind::Expression {
                op,
                left,
                right: Some(right),
            } => {
                let l = self.render_var(g, *left, true);
                let r = self.render_var(g, *right, true);
                if nested {
                    format!("({} {} {})", l, op.as_str(), r)
                } else {
                    format!("{} {} {}", l, op.as_str(), r)
                }
            }
            VarKind::Expression {
                op,
                left,
                right: None,
            } => {
                let l = self.render_var(g, *left, true);
                if nested {
                    format!("({} {})", op.as_str(), l)
                } else {
                    format!("{}{}", op.as_str(), l)
                }
            }
            VarKind::Call { function, args } => {
                let args: Vec<String> = args
                    .iter()
                    .map(|&a| self.render_var(g, a, false))
                    .collect();
                format!("{} ({})", self.resolve(*function), args.join(", "))
            }
            VarKind::Slice { parent, high, low } => {
                format!("{}[{}:{}]", self.render_var(g, *parent, false), high, low)
            }
            VarKind::Concat { parts } => {
                let parts: Vec<String> = parts
                    .iter()
                    .map(|&p| self.render_var(g, p, false))
                    .collect();
                format!("{{{}}}", parts.join(", "))
            }
            VarKind::Signed { parent } => {
                format!("$signed({})", self.render_var(g, *parent, false))
            }
        }
    }
}
