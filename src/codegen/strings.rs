// src/codegen/strings.rs
//
// String concatenation codegen. Two code shapes exist, selected once per
// compilation run by platform capability: a dynamically-resolved call site
// over the buffered operand types, or a mutable accumulator object with
// per-sort append calls.

use crate::bytecode::{Bootstrap, DynamicCall, Inst, RtCall, Sig, TagVec};
use crate::bytecode::inst::AppendArg;
use crate::codegen::writer::MethodWriter;
use crate::errors::{CodegenError, CodegenResult};
use crate::sema::{HostTypes, Sort, Type, TypeTag};

/// Argument-count limit the platform imposes on one concatenation call
/// site; longer chains are split with an intermediate string.
pub const MAX_CONCAT_ARGS: usize = 200;

/// Which concatenation shape this compilation run emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcatStrategy {
    /// Buffer operand types and emit one dynamically-resolved
    /// concatenation call per chain. `max_args` must be at least 2: a
    /// split chain needs room for the intermediate string plus one
    /// operand.
    CallSite { max_args: usize },
    /// Emit a mutable string accumulator with in-place appends.
    Accumulator,
}

impl Default for ConcatStrategy {
    fn default() -> Self {
        ConcatStrategy::CallSite {
            max_args: MAX_CONCAT_ARGS,
        }
    }
}

/// Per-method concatenation state. Must be drained (no open chains) by the
/// time the method finalizes.
#[derive(Debug)]
pub(crate) enum ConcatState {
    CallSite {
        max_args: usize,
        pending: Vec<TagVec>,
    },
    Accumulator {
        depth: u32,
    },
}

impl ConcatState {
    pub(crate) fn new(strategy: ConcatStrategy) -> Self {
        match strategy {
            ConcatStrategy::CallSite { max_args } => ConcatState::CallSite {
                max_args,
                pending: Vec::new(),
            },
            ConcatStrategy::Accumulator => ConcatState::Accumulator { depth: 0 },
        }
    }

    pub(crate) fn is_drained(&self) -> bool {
        match self {
            ConcatState::CallSite { pending, .. } => pending.is_empty(),
            ConcatState::Accumulator { depth } => *depth == 0,
        }
    }
}

impl MethodWriter<'_> {
    /// Start a concatenation chain.
    pub fn begin_concat(&mut self) {
        match &mut self.concat {
            ConcatState::CallSite { pending, .. } => pending.push(TagVec::new()),
            ConcatState::Accumulator { depth } => {
                *depth += 1;
                self.code.emit(Inst::CallRt {
                    call: RtCall::AccumNew,
                });
            }
        }
    }

    /// Record (or append) one operand of the open chain. The operand's
    /// value is already on the stack; only its type steers emission.
    ///
    /// A full operand list is flushed before the new operand is recorded,
    /// so no emitted call site ever exceeds the platform limit.
    pub fn append_concat(&mut self, ty: Type) -> CodegenResult<()> {
        let full = match &mut self.concat {
            ConcatState::CallSite { max_args, pending } => {
                let top = pending.last().ok_or(CodegenError::UnbalancedConcat {
                    context: "append outside of a concatenation",
                })?;
                top.len() >= *max_args
            }
            ConcatState::Accumulator { depth } => {
                if *depth == 0 {
                    return Err(CodegenError::UnbalancedConcat {
                        context: "append outside of a concatenation",
                    });
                }
                self.code.emit(Inst::CallRt {
                    call: RtCall::AccumAppend(append_overload(ty.sort())),
                });
                return Ok(());
            }
        };
        if full {
            self.flush_concat()?;
        }
        if let ConcatState::CallSite { pending, .. } = &mut self.concat {
            if let Some(top) = pending.last_mut() {
                top.push(ty.tag());
            }
        }
        Ok(())
    }

    /// Close the chain, leaving one string on the stack.
    pub fn finish_concat(&mut self) -> CodegenResult<()> {
        match &mut self.concat {
            ConcatState::CallSite { pending, .. } => {
                let params = pending.pop().ok_or(CodegenError::UnbalancedConcat {
                    context: "finish without a matching begin",
                })?;
                self.code.emit(Inst::CallDynamic {
                    call: DynamicCall {
                        name: "concat",
                        sig: Sig {
                            params,
                            ret: TypeTag::Ref(HostTypes::STRING),
                        },
                        bootstrap: Bootstrap::Concat,
                    },
                });
            }
            ConcatState::Accumulator { depth } => {
                if *depth == 0 {
                    return Err(CodegenError::UnbalancedConcat {
                        context: "finish without a matching begin",
                    });
                }
                *depth -= 1;
                self.code.emit(Inst::CallRt {
                    call: RtCall::AccumToString,
                });
            }
        }
        Ok(())
    }

    /// The call-site shape hit the platform's argument limit: concatenate
    /// what is buffered into an intermediate string, then start a new
    /// chain seeded with that string as its first operand. Left-to-right
    /// semantics are preserved across the split.
    fn flush_concat(&mut self) -> CodegenResult<()> {
        tracing::debug!(
            method = %self.name(),
            "concatenation argument limit reached, splitting call site"
        );
        self.finish_concat()?;
        self.begin_concat();
        if let ConcatState::CallSite { pending, .. } = &mut self.concat {
            if let Some(top) = pending.last_mut() {
                top.push(TypeTag::Ref(HostTypes::STRING));
            }
        }
        Ok(())
    }
}

/// Append overloads mirror the accumulator's platform signatures: narrow
/// integrals widen to the int overload, everything non-primitive routes to
/// the object overload.
fn append_overload(sort: Sort) -> AppendArg {
    match sort {
        Sort::Bool => AppendArg::Bool,
        Sort::Char => AppendArg::Char,
        Sort::Byte | Sort::Short | Sort::Int => AppendArg::Int,
        Sort::Long => AppendArg::Long,
        Sort::Float => AppendArg::Float,
        Sort::Double => AppendArg::Double,
        Sort::String => AppendArg::Str,
        _ => AppendArg::Obj,
    }
}
