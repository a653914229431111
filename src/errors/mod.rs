// src/errors/mod.rs
//! Internal compiler errors for code generation.
//!
//! Everything in here is an internal consistency failure (a malformed tree
//! handed over by the front end, unbalanced emission sequences, misuse of
//! the writer API) and is fatal to the current method's compilation. None
//! of these are user script errors; user-facing runtime failures are
//! *emitted* as instructions, never raised during compilation.
//!
//! Error code ranges:
//! - E3xxx: Codegen errors (this module)

use miette::Diagnostic;
use thiserror::Error;

use crate::location::Location;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CodegenError {
    #[error("duplicate statement boundary at offset {offset}")]
    #[diagnostic(
        code(E3001),
        help("the front end assigned the same boundary offset twice")
    )]
    DuplicateStatementBoundary { offset: u32 },

    #[error("illegal tree structure: {context}")]
    #[diagnostic(
        code(E3002),
        help("this is a bug in the compiler front end, not in the script")
    )]
    IllegalTree { context: String },

    #[error("unbalanced string concatenation: {context}")]
    #[diagnostic(code(E3003))]
    UnbalancedConcat { context: &'static str },

    #[error("unsupported stack shuffle: size {size}, below {below}")]
    #[diagnostic(code(E3004))]
    InvalidStackOp { size: u8, below: u8 },

    #[error("label {label} referenced but never bound")]
    #[diagnostic(code(E3005))]
    UnboundLabel { label: u32 },

    #[error("label {label} bound twice")]
    #[diagnostic(code(E3006))]
    ReboundLabel { label: u32 },
}

impl CodegenError {
    /// Illegal tree structure with free-form context.
    pub fn illegal_tree(context: impl Into<String>) -> Self {
        CodegenError::IllegalTree {
            context: context.into(),
        }
    }

    /// Illegal tree structure at a known source location.
    pub fn illegal_tree_at(context: &str, location: Location) -> Self {
        CodegenError::IllegalTree {
            context: format!("{context} at {location}"),
        }
    }
}

/// Result type alias for emission operations.
pub type CodegenResult<T> = Result<T, CodegenError>;
