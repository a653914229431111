// src/bytecode/mod.rs
//
// Low-level instruction stream: the instruction set and the generic
// append/label/line writer the method writer builds on.

pub mod inst;
pub mod writer;

pub use inst::{
    AppendArg, ArithOp, Bootstrap, DynamicCall, Inst, IntCond, Label, Repr, RtCall, Sig, TagVec,
    TrapKind, ALLOWS_NULL, COMPOUND_ASSIGNMENT,
};
pub use writer::{CodeBlob, CodeWriter, LineEntry};
