// src/bytecode/writer.rs
//
// The generic instruction writer: an append-only buffer with labels and a
// line-number table. Knows nothing about types, casts, or operators; the
// method writer in `codegen` layers those on top.

use crate::bytecode::inst::{Inst, Label};
use crate::errors::{CodegenError, CodegenResult};

/// Line table entry: the instruction at `inst` and everything after it up
/// to the next entry maps to source line `line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEntry {
    pub inst: u32,
    pub line: u32,
}

/// Append-only instruction buffer for one method body.
#[derive(Debug, Default)]
pub struct CodeWriter {
    insts: Vec<Inst>,
    /// Bound position per label id; `None` until bound.
    labels: Vec<Option<u32>>,
    lines: Vec<LineEntry>,
    pending_line: Option<u32>,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Allocate a fresh, unbound label.
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.labels.len() as u32);
        self.labels.push(None);
        label
    }

    /// Bind `label` to the position of the next emitted instruction.
    pub fn bind(&mut self, label: Label) -> CodegenResult<()> {
        let slot = &mut self.labels[label.0 as usize];
        if slot.is_some() {
            return Err(CodegenError::ReboundLabel { label: label.0 });
        }
        *slot = Some(self.insts.len() as u32);
        Ok(())
    }

    /// Associate the next emitted instruction with `line` in the debug
    /// table. A later call before any emission supersedes the earlier one.
    pub fn set_line(&mut self, line: u32) {
        self.pending_line = Some(line);
    }

    pub fn emit(&mut self, inst: Inst) {
        if let Some(line) = self.pending_line.take() {
            self.lines.push(LineEntry {
                inst: self.insts.len() as u32,
                line,
            });
        }
        self.insts.push(inst);
    }

    /// Close the buffer. Every label referenced by a jump must have been
    /// bound; a dangling label means the emission sequence upstream was
    /// incomplete and the method must be discarded.
    pub fn finish(self) -> CodegenResult<CodeBlob> {
        for (inst_index, inst) in self.insts.iter().enumerate() {
            let target = match inst {
                Inst::Jump { target }
                | Inst::JumpIf { target, .. }
                | Inst::JumpIfCmp { target, .. } => *target,
                _ => continue,
            };
            if self.labels[target.0 as usize].is_none() {
                tracing::debug!(inst_index, label = target.0, "jump to unbound label");
                return Err(CodegenError::UnboundLabel { label: target.0 });
            }
        }
        let label_targets = self.labels.into_iter().map(|l| l.unwrap_or(0)).collect();
        Ok(CodeBlob {
            insts: self.insts,
            label_targets,
            lines: self.lines,
        })
    }
}

/// A finished, immutable instruction stream with its side tables.
#[derive(Debug, Clone)]
pub struct CodeBlob {
    pub insts: Vec<Inst>,
    label_targets: Vec<u32>,
    pub lines: Vec<LineEntry>,
}

impl CodeBlob {
    /// Instruction index a bound label refers to.
    pub fn target(&self, label: Label) -> usize {
        self.label_targets[label.0 as usize] as usize
    }

    /// Source line attributed to the instruction at `index`, if any.
    pub fn line_at(&self, index: usize) -> Option<u32> {
        self.lines
            .iter()
            .take_while(|entry| entry.inst as usize <= index)
            .last()
            .map(|entry| entry.line)
    }
}
