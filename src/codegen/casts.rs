// src/codegen/casts.rs
//
// The cast/coercion engine: translates a resolved cast descriptor into
// conversion instructions.

use crate::bytecode::{Inst, RtCall};
use crate::codegen::writer::MethodWriter;
use crate::errors::{CodegenError, CodegenResult};
use crate::sema::{Cast, CoercionKind, Sort, Type};

impl MethodWriter<'_> {
    /// Emit the conversion for one cast point. `None` means the front end
    /// decided no conversion is needed; nothing is emitted.
    pub fn cast(&mut self, cast: Option<&Cast>) -> CodegenResult<()> {
        let Some(cast) = cast else {
            return Ok(());
        };
        let from = cast.from;
        let to = cast.to;

        // char/string bridges are utility conversions, not numeric casts
        if cast.is_char_string_bridge() {
            let call = if from.sort() == Sort::Char {
                RtCall::CharToString
            } else {
                RtCall::StringToChar
            };
            self.code.emit(Inst::CallRt { call });
            return Ok(());
        }

        match cast.kind {
            CoercionKind::Direct => self.direct_cast(from, to),
            CoercionKind::UnboxThenCast => {
                let prim = from.sort().unboxed().ok_or_else(|| {
                    CodegenError::illegal_tree(format!("unbox of non-boxed source {}", from.sort()))
                })?;
                self.code.emit(Inst::Unbox { sort: prim });
                let unboxed = Type::primitive(prim).ok_or_else(|| {
                    CodegenError::illegal_tree(format!("no primitive form for {prim}"))
                })?;
                self.direct_cast(unboxed, to)
            }
            CoercionKind::CastThenUnbox => {
                self.direct_cast(from, to)?;
                let prim = to.sort().unboxed().ok_or_else(|| {
                    CodegenError::illegal_tree(format!(
                        "unbox into non-boxed destination {}",
                        to.sort()
                    ))
                })?;
                self.code.emit(Inst::Unbox { sort: prim });
                Ok(())
            }
            CoercionKind::BoxThenCast => {
                let boxed = Type::boxed(from.sort()).ok_or_else(|| {
                    CodegenError::illegal_tree(format!("box of non-primitive {}", from.sort()))
                })?;
                self.code.emit(Inst::Box { sort: from.sort() });
                self.direct_cast(boxed, to)
            }
            CoercionKind::CastThenBox => {
                let prim = to.sort().unboxed().ok_or_else(|| {
                    CodegenError::illegal_tree(format!(
                        "box into non-boxed destination {}",
                        to.sort()
                    ))
                })?;
                let unboxed = Type::primitive(prim).ok_or_else(|| {
                    CodegenError::illegal_tree(format!("no primitive form for {prim}"))
                })?;
                self.direct_cast(from, unboxed)?;
                self.code.emit(Inst::Box { sort: prim });
                Ok(())
            }
            CoercionKind::DynamicCoerce { explicit } => {
                if from.sort() != Sort::Def {
                    return Err(CodegenError::illegal_tree(format!(
                        "dynamic coercion from non-def source {}",
                        from.sort()
                    )));
                }
                let call = def_coercion(to.sort(), explicit)?;
                self.code.emit(Inst::CallRt { call });
                Ok(())
            }
        }
    }

    /// The underlying cast, once any boxing plan has been handled: numeric
    /// conversion between primitives, identity, or a reference check.
    fn direct_cast(&mut self, from: Type, to: Type) -> CodegenResult<()> {
        if from == to {
            return Ok(());
        }
        if from.sort().is_numeric() && to.sort().is_numeric() {
            self.code.emit(Inst::Convert {
                from: from.sort(),
                to: to.sort(),
            });
            return Ok(());
        }
        match (from.class(), to.class()) {
            (Some(from_class), Some(to_class)) => {
                // downcast only when the host type system can't prove it
                if !self.host().is_assignable(to_class, from_class) {
                    self.code.emit(Inst::CheckCast { class: to_class });
                }
                Ok(())
            }
            _ => Err(CodegenError::illegal_tree(format!(
                "cast between {} and {} without a boxing plan",
                from.sort(),
                to.sort()
            ))),
        }
    }
}

/// Select the runtime coercion helper for a `def` source by destination
/// sort. Boolean coercion has a single helper; the explicit flag only
/// matters for the numeric destinations.
fn def_coercion(to: Sort, explicit: bool) -> CodegenResult<RtCall> {
    match to {
        Sort::Bool => Ok(RtCall::DefTo {
            sort: Sort::Bool,
            explicit: false,
        }),
        Sort::Byte
        | Sort::Short
        | Sort::Char
        | Sort::Int
        | Sort::Long
        | Sort::Float
        | Sort::Double => Ok(RtCall::DefTo { sort: to, explicit }),
        _ => Err(CodegenError::illegal_tree(format!(
            "dynamic coercion to non-primitive {to}"
        ))),
    }
}
