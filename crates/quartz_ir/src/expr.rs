//! Expression operators.
//!
//! [`ExprOp`] covers both unary and binary operators; an expression node
//! stores the operator plus one or two operand IDs. Relational operators
//! produce single-bit results regardless of operand width.

use serde::{Deserialize, Serialize};

/// An expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprOp {
    /// Bitwise inversion (`~`), unary.
    UInvert,
    /// Unary plus (`+`).
    UPlus,
    /// Arithmetic negation (`-`), unary.
    UMinus,
    /// Addition (`+`).
    Add,
    /// Subtraction (`-`).
    Minus,
    /// Multiplication (`*`).
    Multiply,
    /// Division (`/`).
    Divide,
    /// Modulo (`%`).
    Mod,
    /// Bitwise AND (`&`).
    And,
    /// Bitwise OR (`|`).
    Or,
    /// Bitwise XOR (`^`).
    Xor,
    /// Left shift (`<<`).
    ShiftLeft,
    /// Logical right shift (`>>`).
    LogicalShiftRight,
    /// Arithmetic right shift (`>>>`).
    SignedShiftRight,
    /// Equality (`==`).
    Eq,
    /// Less than (`<`).
    LessThan,
    /// Greater than (`>`).
    GreaterThan,
    /// Less than or equal (`<=`).
    LessEqThan,
    /// Greater than or equal (`>=`).
    GreaterEqThan,
}

impl ExprOp {
    /// Returns `true` for operators whose result is a single bit.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            ExprOp::Eq
                | ExprOp::LessThan
                | ExprOp::GreaterThan
                | ExprOp::LessEqThan
                | ExprOp::GreaterEqThan
        )
    }

    /// Returns `true` for the unary operators.
    pub fn is_unary(self) -> bool {
        matches!(self, ExprOp::UInvert | ExprOp::UPlus | ExprOp::UMinus)
    }

    /// The SystemVerilog spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ExprOp::UInvert => "~",
            ExprOp::UPlus => "+",
            ExprOp::UMinus => "-",
            ExprOp::Add => "+",
            ExprOp::Minus => "-",
            ExprOp::Multiply => "*",
            ExprOp::Divide => "/",
            ExprOp::Mod => "%",
            ExprOp::And => "&",
            ExprOp::Or => "|",
            ExprOp::Xor => "^",
            ExprOp::ShiftLeft => "<<",
            ExprOp::LogicalShiftRight => ">>",
            ExprOp::SignedShiftRight => ">>>",
            ExprOp::Eq => "==",
            ExprOp::LessThan => "<",
            ExprOp::GreaterThan => ">",
            ExprOp::LessEqThan => "<=",
            ExprOp::GreaterEqThan => ">=",
        }
    }
}
