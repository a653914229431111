// src/location.rs
//
// Source locations attached to emission points that can raise errors.

use std::fmt;

/// Byte offset into the script source.
///
/// The front end attaches one of these to every node that can raise a
/// runtime error; code generation uses it for the line table and for
/// internal-error context. Offsets are opaque here, the front end owns
/// their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Location {
    offset: u32,
}

impl Location {
    pub fn new(offset: u32) -> Self {
        Self { offset }
    }

    pub fn offset(self) -> u32 {
        self.offset
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "offset {}", self.offset)
    }
}
