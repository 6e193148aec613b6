//! The type-mapping contract and its table-driven implementation.
//!
//! Backends do not implement type mapping themselves; they configure
//! [`TableMapper`] with a [`MapperConfig`] delta (primitive table, array
//! rendering, reference adornments, unknown-name policy) and the shared
//! machinery applies the context rules uniformly.

use thiserror::Error;

use abi_ir::{Class, Property};

use crate::context::TypeCtx;
use crate::primitive::Primitive;

/// Type-resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TypeError {
    /// A type name is absent from a closed backend type table.
    #[error("unsupported type: {name}")]
    Unsupported { name: String },
}

/// What a backend does with a base type name outside [`Primitive`].
///
/// The divergence is deliberate and chosen per backend: closed-world
/// backends fail fast, open-world backends treat the name as an opaque
/// forward reference to an already-declared enum/delegate/class.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnknownTypePolicy {
    /// Fail with [`TypeError::Unsupported`].
    Reject,
    /// Emit the name verbatim as a forward reference.
    Forward,
}

/// Per-backend delta configuring a [`TableMapper`].
#[derive(Clone)]
pub struct MapperConfig {
    /// Backend name, for diagnostics.
    pub name: &'static str,
    /// Target spelling of each primitive kind.
    pub primitive: fn(Primitive) -> &'static str,
    /// Renders an array of the given element target type.
    pub array: fn(&str) -> String,
    /// Read-only borrow adornment used in `Value` context for object-like
    /// values; `None` for backends where values are already references.
    pub value_borrow: Option<fn(&str) -> String>,
    /// Mutable reference adornment used in `Ref` context.
    pub mutable_ref: Option<fn(&str) -> String>,
    /// Whether array parameters take the `Value`-context borrow regardless
    /// of element object-likeness. Backend policy, not a fixed rule.
    pub arrays_by_ref_in_value: bool,
    /// Closed or open type world.
    pub unknown: UnknownTypePolicy,
    /// The backend's null-pointer literal, used for pointer-kind handles
    /// with an absent or null-ish invalid value.
    pub null_literal: &'static str,
    /// The backend's default-value literal for non-pointer handles with an
    /// absent invalid value.
    pub default_literal: &'static str,
}

/// Maps a manifest type plus usage context to a target type string.
pub trait TypeMapper {
    /// Map a base type name (no adornments resolved yet).
    fn map_type(&self, base: &str, ctx: TypeCtx, is_array: bool) -> Result<String, TypeError>;

    /// Map a parameter, honoring enum/prototype overrides and the `ref`
    /// flag. `ctx` is the default context when the flag is unset.
    fn map_param_type(&self, param: &Property, ctx: TypeCtx) -> Result<String, TypeError>;

    /// Map a return slot, honoring enum/prototype overrides.
    fn map_return_type(&self, ret: &Property) -> Result<String, TypeError>;

    /// Resolve a class's `(invalid_value literal, handle target type)`.
    fn map_handle_type(&self, class: &Class) -> Result<(String, String), TypeError>;
}

/// The single [`TypeMapper`] implementation, driven by [`MapperConfig`].
#[derive(Clone)]
pub struct TableMapper {
    config: MapperConfig,
}

impl TableMapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    /// The configured backend name.
    pub fn backend(&self) -> &'static str {
        self.config.name
    }

    /// Whether this backend borrows array parameters in `Value` context.
    pub fn arrays_by_ref_in_value(&self) -> bool {
        self.config.arrays_by_ref_in_value
    }

    /// Adorn an already-declared entity name (enum or delegate) with array
    /// and context decorations, bypassing the primitive table and the
    /// unknown-name policy.
    fn adorn_custom(&self, name: &str, ctx: TypeCtx, is_array: bool) -> String {
        let mut mapped = if is_array {
            (self.config.array)(name)
        } else {
            name.to_string()
        };
        match ctx {
            TypeCtx::Value => {
                if is_array && self.config.arrays_by_ref_in_value {
                    if let Some(borrow) = self.config.value_borrow {
                        mapped = borrow(&mapped);
                    }
                }
            }
            TypeCtx::Ref => {
                if let Some(mutate) = self.config.mutable_ref {
                    mapped = mutate(&mapped);
                }
            }
            TypeCtx::Return | TypeCtx::Cast => {}
        }
        mapped
    }
}

impl TypeMapper for TableMapper {
    fn map_type(&self, base: &str, ctx: TypeCtx, is_array: bool) -> Result<String, TypeError> {
        let prim = Primitive::from_name(base);
        let element = match prim {
            Some(p) => (self.config.primitive)(p).to_string(),
            None => match self.config.unknown {
                UnknownTypePolicy::Reject => {
                    return Err(TypeError::Unsupported {
                        name: base.to_string(),
                    });
                }
                UnknownTypePolicy::Forward => base.to_string(),
            },
        };

        let mut mapped = if is_array {
            (self.config.array)(&element)
        } else {
            element
        };

        if prim == Some(Primitive::Void) && !is_array {
            return Ok(mapped);
        }

        match ctx {
            TypeCtx::Value => {
                let object_like = prim.is_some_and(Primitive::is_object_like);
                let array_borrow = is_array && self.config.arrays_by_ref_in_value;
                if object_like || array_borrow {
                    if let Some(borrow) = self.config.value_borrow {
                        mapped = borrow(&mapped);
                    }
                }
            }
            TypeCtx::Ref => {
                if let Some(mutate) = self.config.mutable_ref {
                    mapped = mutate(&mapped);
                }
            }
            TypeCtx::Return | TypeCtx::Cast => {}
        }

        Ok(mapped)
    }

    fn map_param_type(&self, param: &Property, ctx: TypeCtx) -> Result<String, TypeError> {
        let effective = if param.is_ref { TypeCtx::Ref } else { ctx };

        if let Some(proto) = &param.prototype {
            return Ok(proto.name.clone());
        }
        if let Some(enum_) = &param.enum_ {
            return Ok(self.adorn_custom(&enum_.name, effective, param.is_array()));
        }
        self.map_type(param.base_type(), effective, param.is_array())
    }

    fn map_return_type(&self, ret: &Property) -> Result<String, TypeError> {
        if let Some(proto) = &ret.prototype {
            return Ok(proto.name.clone());
        }
        if let Some(enum_) = &ret.enum_ {
            return Ok(self.adorn_custom(&enum_.name, TypeCtx::Return, ret.is_array()));
        }
        self.map_type(ret.base_type(), TypeCtx::Return, ret.is_array())
    }

    fn map_handle_type(&self, class: &Class) -> Result<(String, String), TypeError> {
        let handle = self.map_type(&class.handle_type, TypeCtx::Return, false)?;

        let given = class.invalid_value.as_str();
        let nullish = matches!(given, "" | "0" | "NULL" | "nullptr");
        let invalid = if class.handle_type.starts_with("ptr") && nullish {
            self.config.null_literal.to_string()
        } else if given.is_empty() {
            self.config.default_literal.to_string()
        } else {
            given.to_string()
        };

        Ok((invalid, handle))
    }
}
