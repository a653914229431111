// src/codegen/writer.rs
//
// Per-method emission state and the writer-level helpers shared by the
// tree-walking front end: statement/debug tracking, the loop iteration
// guard, stack shuffling, and method finalization.

use rustc_hash::FxHashSet;

use crate::bytecode::{CodeBlob, CodeWriter, Inst, IntCond, Label, TrapKind};
use crate::codegen::strings::{ConcatState, ConcatStrategy};
use crate::errors::{CodegenError, CodegenResult};
use crate::location::Location;
use crate::sema::HostTypes;

/// Options resolved once per compilation run, before any method is
/// emitted. Capability-dependent choices (which concatenation shape the
/// platform supports) live here rather than branching at every call site.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodegenConfig {
    pub concat: ConcatStrategy,
}

/// A finished method body: instructions, debug tables, and the statement
/// boundary offsets collected while emitting.
#[derive(Debug, Clone)]
pub struct MethodCode {
    pub name: String,
    pub code: CodeBlob,
    /// Sorted source offsets at which top-level statements start.
    pub statements: Vec<u32>,
}

/// Emits the body of one method.
///
/// One instance exists per compiled method, driven by the front end in
/// tree-visitation order; it holds no knowledge of tree shape beyond the
/// node it is currently asked to emit. Never share an instance: the writer
/// is stateful and single-pass. The shared `HostTypes` is read-only, so
/// independent methods may compile concurrently.
///
/// [`finish`](MethodWriter::finish) consumes the writer, which makes
/// finalize-exactly-once a compile-time guarantee.
pub struct MethodWriter<'a> {
    name: String,
    host: &'a HostTypes,
    pub(crate) code: CodeWriter,
    statements: FxHashSet<u32>,
    pub(crate) concat: ConcatState,
}

impl<'a> MethodWriter<'a> {
    pub fn new(name: impl Into<String>, host: &'a HostTypes, config: CodegenConfig) -> Self {
        MethodWriter {
            name: name.into(),
            host,
            code: CodeWriter::new(),
            statements: FxHashSet::default(),
            concat: ConcatState::new(config.concat),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn host(&self) -> &HostTypes {
        self.host
    }

    /// Append a raw instruction.
    pub fn emit(&mut self, inst: Inst) {
        self.code.emit(inst);
    }

    pub fn new_label(&mut self) -> Label {
        self.code.new_label()
    }

    pub fn bind(&mut self, label: Label) -> CodegenResult<()> {
        self.code.bind(label)
    }

    /// Instructions emitted so far.
    pub fn insts(&self) -> &[Inst] {
        self.code.insts()
    }

    /// Marks a new statement boundary.
    ///
    /// Invoked once per top-level statement. A duplicate offset means the
    /// front end assigned the same boundary twice; fail fast instead of
    /// overwriting, it catches walker bugs.
    pub fn mark_statement(&mut self, location: Location) -> CodegenResult<()> {
        let offset = location.offset();
        if !self.statements.insert(offset) {
            return Err(CodegenError::DuplicateStatementBoundary { offset });
        }
        Ok(())
    }

    /// Encodes the offset into the line table as `offset + 1`.
    ///
    /// Invoked immediately before any instruction that can raise a runtime
    /// error, so the error is attributed to the right line.
    pub fn debug_info(&mut self, location: Location) {
        self.code.set_line(location.offset() + 1);
    }

    /// Emits the cooperative loop iteration guard.
    ///
    /// `slot` is the int local holding the remaining statement budget;
    /// `None` means no budget is configured and nothing is emitted.
    /// Otherwise the counter is decremented by `decrement` and, once it
    /// reaches zero or below, a script-fatal trap fires instead of falling
    /// through. The trap is not catchable by the script's own handlers, so
    /// a runaway script cannot suppress it.
    pub fn loop_counter_check(
        &mut self,
        slot: Option<u16>,
        decrement: u32,
        location: Location,
    ) -> CodegenResult<()> {
        let Some(slot) = slot else {
            return Ok(());
        };
        self.debug_info(location);
        let end = self.code.new_label();

        self.code.emit(Inst::IncLocal {
            slot,
            delta: -(decrement as i32),
        });
        self.code.emit(Inst::LoadLocal { slot });
        self.code.emit(Inst::ConstI32(0));
        self.code.emit(Inst::JumpIfCmp {
            cond: IntCond::Gt,
            target: end,
        });
        self.code.emit(Inst::Trap {
            kind: TrapKind::LoopBudgetExceeded,
        });
        self.code.bind(end)
    }

    /// Jump to `tru` when the int on top of the stack is nonzero, else to
    /// `fals`; whichever is present.
    pub fn branch(&mut self, tru: Option<Label>, fals: Option<Label>) {
        if let Some(target) = tru {
            self.code.emit(Inst::JumpIf {
                cond: IntCond::Ne,
                target,
            });
        } else if let Some(target) = fals {
            self.code.emit(Inst::JumpIf {
                cond: IntCond::Eq,
                target,
            });
        }
    }

    /// Duplicate the top value of `size` slots, inserting the copy below
    /// `below` additional slots.
    pub fn dup(&mut self, size: u8, below: u8) -> CodegenResult<()> {
        let inst = match (size, below) {
            (1, 0) => Inst::Dup,
            (1, 1) => Inst::DupX1,
            (1, 2) => Inst::DupX2,
            (2, 0) => Inst::Dup2,
            (2, 1) => Inst::Dup2X1,
            (2, 2) => Inst::Dup2X2,
            _ => return Err(CodegenError::InvalidStackOp { size, below }),
        };
        self.code.emit(inst);
        Ok(())
    }

    /// Discard the top value of `size` slots.
    pub fn discard(&mut self, size: u8) -> CodegenResult<()> {
        let inst = match size {
            1 => Inst::Pop,
            2 => Inst::Pop2,
            _ => return Err(CodegenError::InvalidStackOp { size, below: 0 }),
        };
        self.code.emit(inst);
        Ok(())
    }

    /// Finalize the method.
    ///
    /// Verifies the concatenation stack has drained (an open concatenation
    /// here is an unbalanced begin/append/finish sequence upstream) and
    /// closes the underlying instruction writer. A failed finalization
    /// discards the partial method; no truncated stream escapes.
    pub fn finish(self) -> CodegenResult<MethodCode> {
        if !self.concat.is_drained() {
            return Err(CodegenError::UnbalancedConcat {
                context: "concatenation still open at end of method",
            });
        }
        tracing::trace!(
            method = %self.name,
            insts = self.code.len(),
            statements = self.statements.len(),
            "finishing method"
        );
        let code = self.code.finish()?;
        let mut statements: Vec<u32> = self.statements.into_iter().collect();
        statements.sort_unstable();
        Ok(MethodCode {
            name: self.name,
            code,
            statements,
        })
    }
}
