// src/sema/cast.rs
//
// Cast descriptors produced by the front end for every conversion point.

use crate::sema::types::{Sort, Type};

/// The conversion plan attached to a cast.
///
/// A closed set instead of independent box/unbox flags: conflicting
/// combinations (unbox the source *and* box the destination, say) cannot be
/// expressed, so the engine never has to guess a precedence for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    /// Plain cast: numeric conversion, identity, or reference check.
    Direct,
    /// Unbox a concretely-typed boxed source, then cast the primitive.
    UnboxThenCast,
    /// Cast to the boxed destination type, then unbox it.
    CastThenUnbox,
    /// Box the primitive source, then cast the reference.
    BoxThenCast,
    /// Cast to the destination's primitive form, then box it.
    CastThenBox,
    /// The source is `def`: its runtime type is unknown, so conversion is
    /// deferred to a runtime coercion helper. Explicit casts use the hard
    /// helpers (may truncate, error on incompatible values); implicit ones
    /// use the soft helpers with a narrower set of accepted source types.
    DynamicCoerce { explicit: bool },
}

/// A resolved conversion point: source type, destination type, and plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cast {
    pub from: Type,
    pub to: Type,
    pub kind: CoercionKind,
}

impl Cast {
    pub fn direct(from: Type, to: Type) -> Self {
        Cast {
            from,
            to,
            kind: CoercionKind::Direct,
        }
    }

    pub fn unbox_then_cast(from: Type, to: Type) -> Self {
        Cast {
            from,
            to,
            kind: CoercionKind::UnboxThenCast,
        }
    }

    pub fn cast_then_unbox(from: Type, to: Type) -> Self {
        Cast {
            from,
            to,
            kind: CoercionKind::CastThenUnbox,
        }
    }

    pub fn box_then_cast(from: Type, to: Type) -> Self {
        Cast {
            from,
            to,
            kind: CoercionKind::BoxThenCast,
        }
    }

    pub fn cast_then_box(from: Type, to: Type) -> Self {
        Cast {
            from,
            to,
            kind: CoercionKind::CastThenBox,
        }
    }

    /// Runtime coercion of a `def` value to `to`.
    pub fn coerce_def(to: Type, explicit: bool) -> Self {
        Cast {
            from: Type::DEF,
            to,
            kind: CoercionKind::DynamicCoerce { explicit },
        }
    }

    /// Whether this cast is the char/string utility conversion, which is
    /// not representable as a numeric or reference cast.
    pub fn is_char_string_bridge(&self) -> bool {
        matches!(
            (self.from.sort(), self.to.sort()),
            (Sort::Char, Sort::String) | (Sort::String, Sort::Char)
        )
    }
}
