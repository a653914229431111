// src/codegen/ops.rs
//
// Binary operator emission: static instructions when both operand types
// are known, dynamically-resolved call sites when either side is `def`.

use crate::bytecode::{
    ArithOp, Bootstrap, DynamicCall, Inst, Repr, Sig, ALLOWS_NULL, COMPOUND_ASSIGNMENT,
};
use crate::codegen::writer::MethodWriter;
use crate::errors::{CodegenError, CodegenResult};
use crate::location::Location;
use crate::sema::{Sort, Type};

/// The source language's binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Lsh,
    Ush,
    Rsh,
    BwAnd,
    Xor,
    BwOr,
}

impl Operation {
    /// Method name the runtime resolver looks up for this operator.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Mul => "mul",
            Operation::Div => "div",
            Operation::Rem => "rem",
            Operation::Add => "add",
            Operation::Sub => "sub",
            Operation::Lsh => "lsh",
            Operation::Ush => "ush",
            Operation::Rsh => "rsh",
            Operation::BwAnd => "and",
            Operation::Xor => "xor",
            Operation::BwOr => "or",
        }
    }

    /// Shift operators resolve under their own policy: the right operand
    /// is a shift amount, not a promotion participant.
    pub fn is_shift(self) -> bool {
        matches!(self, Operation::Lsh | Operation::Ush | Operation::Rsh)
    }

    fn is_bitwise(self) -> bool {
        matches!(self, Operation::BwAnd | Operation::Xor | Operation::BwOr)
    }

    fn arith(self) -> ArithOp {
        match self {
            Operation::Mul => ArithOp::Mul,
            Operation::Div => ArithOp::Div,
            Operation::Rem => ArithOp::Rem,
            Operation::Add => ArithOp::Add,
            Operation::Sub => ArithOp::Sub,
            Operation::Lsh => ArithOp::Shl,
            Operation::Ush => ArithOp::Ushr,
            Operation::Rsh => ArithOp::Shr,
            Operation::BwAnd => ArithOp::And,
            Operation::Xor => ArithOp::Xor,
            Operation::BwOr => ArithOp::Or,
        }
    }
}

impl MethodWriter<'_> {
    /// Emit a binary operator over statically-known operand types.
    ///
    /// `ty` is the promoted operand type the front end computed. Bitwise
    /// and shift operators on floating-point types are rejected as an
    /// internal error: the front end must never produce such a node.
    pub fn static_binary(
        &mut self,
        location: Location,
        ty: Type,
        operation: Operation,
    ) -> CodegenResult<()> {
        let sort = ty.sort();

        if matches!(sort, Sort::Float | Sort::Double)
            && (operation.is_shift() || operation.is_bitwise())
        {
            return Err(CodegenError::illegal_tree_at(
                &format!("{} on {}", operation.name(), sort),
                location,
            ));
        }

        let repr = match sort {
            Sort::Byte | Sort::Short | Sort::Char | Sort::Int => Repr::I32,
            Sort::Long => Repr::I64,
            Sort::Float => Repr::F32,
            Sort::Double => Repr::F64,
            // the language's boolean bitwise forms compute at int width
            Sort::Bool if operation.is_bitwise() => Repr::I32,
            _ => {
                return Err(CodegenError::illegal_tree_at(
                    &format!("{} on {}", operation.name(), sort),
                    location,
                ));
            }
        };

        self.emit(Inst::Arith {
            op: operation.arith(),
            repr,
        });
        Ok(())
    }

    /// Emit a dynamically-resolved binary operator call site.
    ///
    /// Used whenever either operand's compile-time type is `def`: the
    /// concrete implementation is picked by the runtime from the actual
    /// operand types. `compound` marks the desugared right-hand side of a
    /// compound assignment. Addition additionally allows null operands
    /// unless one side is statically primitive (hence non-null): reference
    /// addition must support null-safe string concatenation, while
    /// primitive addition should fail fast on a null rather than mask it.
    pub fn dynamic_binary(
        &mut self,
        location: Location,
        return_type: Type,
        lhs: Type,
        rhs: Type,
        operation: Operation,
        compound: bool,
    ) {
        let mut flags = 0;
        if compound {
            flags |= COMPOUND_ASSIGNMENT;
        }
        if operation == Operation::Add
            && !(lhs.sort().is_primitive() || rhs.sort().is_primitive())
        {
            flags |= ALLOWS_NULL;
        }
        let bootstrap = if operation.is_shift() {
            Bootstrap::Shift { flags }
        } else {
            Bootstrap::Binary { flags }
        };
        tracing::trace!(
            method = %self.name(),
            op = operation.name(),
            offset = location.offset(),
            flags,
            "dynamic binary call site"
        );
        self.emit(Inst::CallDynamic {
            call: DynamicCall {
                name: operation.name(),
                sig: Sig::binary(return_type.tag(), lhs.tag(), rhs.tag()),
                bootstrap,
            },
        });
    }
}
