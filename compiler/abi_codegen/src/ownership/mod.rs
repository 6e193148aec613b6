//! Ownership analysis for handle-wrapped classes.
//!
//! A [`ClassPlan`] is everything a backend needs to render one class
//! correctly: resolved handle type and invalid-value literal, resolved
//! method references, and the two rules that are easy to get subtly
//! wrong: the raw-handle constructor's default-ownership argument, and
//! the pre-call null check.
//!
//! The wrapper state machine the plans encode:
//!
//! ```text
//! {handle, ownership}   ownership ∈ {Borrowed, Owned}
//!
//! manifest ctor    → (native result, Owned)
//! raw-handle ctor  → caller-supplied; Borrowed by default when a default
//!                    is offered at all
//! get()            → read, no change
//! release()        → yields handle, state := (invalid, Borrowed)
//! reset()          → destructor iff Owned && handle != invalid, then
//!                    state := (invalid, Borrowed)
//! move             → destination takes state, source := (invalid, Borrowed)
//! scope exit       → reset(), at most once
//! ```
//!
//! Whatever the path, the native destructor runs at most once per
//! originally-owned handle.

use abi_ir::{BindAlias, Binding, Class, Manifest, ManifestError, Method, Property};
use abi_types::TypeMapper;

use crate::GenerateError;

/// Whether a wrapper must destroy its handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Ownership {
    Borrowed,
    Owned,
}

impl Ownership {
    /// The spelling used in generated code.
    pub fn name(self) -> &'static str {
        match self {
            Ownership::Borrowed => "Borrowed",
            Ownership::Owned => "Owned",
        }
    }
}

/// One class binding with its method reference resolved and the receiver
/// parameter stripped.
#[derive(Debug)]
pub struct BindingPlan<'m> {
    pub binding: &'m Binding,
    pub method: &'m Method,
    /// Public-signature parameters: the underlying method's, minus the
    /// implicit receiver when `bind_self`.
    pub params: &'m [Property],
    /// Fail with the empty-handle condition before the native call.
    pub null_check: bool,
}

impl<'m> BindingPlan<'m> {
    /// The class alias for the public parameter at `index`, if any.
    /// Aliases are position-aligned with `params`.
    pub fn param_alias(&self, index: usize) -> Option<&'m BindAlias> {
        self.binding.param_aliases.get(index)?.as_ref()
    }

    pub fn ret_alias(&self) -> Option<&'m BindAlias> {
        self.binding.ret_alias.as_ref()
    }
}

/// Per-class emission plan.
#[derive(Debug)]
pub struct ClassPlan<'m> {
    pub class: &'m Class,
    /// Static-namespace class without a handle.
    pub handleless: bool,
    /// Mapped handle target type; empty for handleless classes.
    pub handle_type: String,
    /// Resolved invalid-value literal; empty for handleless classes.
    pub invalid_value: String,
    pub constructors: Vec<&'m Method>,
    pub destructor: Option<&'m Method>,
    pub bindings: Vec<BindingPlan<'m>>,
    /// Default for the raw-handle constructor's ownership argument.
    /// `None` when the class declares a constructor taking exactly one
    /// handle-typed parameter: offering `= Borrowed` there would make the
    /// two single-argument constructors ambiguous.
    pub raw_ctor_default: Option<Ownership>,
    /// A manifest constructor with zero parameters exists, so no synthetic
    /// default constructor is needed.
    pub has_zero_param_ctor: bool,
}

impl<'m> ClassPlan<'m> {
    /// Analyze `class` against the manifest and the backend's type mapper.
    pub fn build(
        manifest: &'m Manifest,
        class: &'m Class,
        mapper: &dyn TypeMapper,
    ) -> Result<ClassPlan<'m>, GenerateError> {
        let handleless = class.is_handleless();

        if handleless {
            if !class.constructors.is_empty() {
                return Err(invariant(class, "handleless classes cannot have constructors"));
            }
            if class.destructor.is_some() {
                return Err(invariant(class, "handleless classes cannot have a destructor"));
            }
            if let Some(binding) = class.bindings.iter().find(|b| b.bind_self) {
                return Err(invariant(
                    class,
                    &format!(
                        "handleless classes cannot have instance methods (bindSelf=true for {})",
                        binding.name
                    ),
                ));
            }
        }

        let (invalid_value, handle_type) = if handleless {
            (String::new(), String::new())
        } else {
            mapper.map_handle_type(class)?
        };

        let constructors = class
            .constructors
            .iter()
            .map(|name| resolve(manifest, class, name))
            .collect::<Result<Vec<_>, _>>()?;

        let destructor = class
            .destructor
            .as_ref()
            .map(|name| resolve(manifest, class, name))
            .transpose()?;

        let throw_on_null = class.null_policy() == "throw";
        let bindings = class
            .bindings
            .iter()
            .map(|binding| {
                let method = resolve(manifest, class, &binding.method)?;
                let skip = usize::from(binding.bind_self && !method.param_types.is_empty());
                Ok(BindingPlan {
                    binding,
                    method,
                    params: &method.param_types[skip..],
                    null_check: binding.bind_self && throw_on_null,
                })
            })
            .collect::<Result<Vec<_>, GenerateError>>()?;

        let single_handle_ctor = constructors.iter().any(|m| {
            m.param_types.len() == 1 && m.param_types[0].ty == class.handle_type
        });
        let raw_ctor_default = if handleless || single_handle_ctor {
            None
        } else {
            Some(Ownership::Borrowed)
        };

        let has_zero_param_ctor = constructors.iter().any(|m| m.param_types.is_empty());

        Ok(ClassPlan {
            class,
            handleless,
            handle_type,
            invalid_value,
            constructors,
            destructor,
            bindings,
            raw_ctor_default,
            has_zero_param_ctor,
        })
    }

    pub fn has_destructor(&self) -> bool {
        self.destructor.is_some()
    }

    pub fn has_constructors(&self) -> bool {
        !self.constructors.is_empty()
    }
}

fn invariant(class: &Class, reason: &str) -> GenerateError {
    GenerateError::Manifest(ManifestError::Invariant {
        class: class.name.clone(),
        reason: reason.to_string(),
    })
}

fn resolve<'m>(
    manifest: &'m Manifest,
    class: &Class,
    name: &str,
) -> Result<&'m Method, GenerateError> {
    manifest.find_method(name).ok_or_else(|| {
        GenerateError::Manifest(ManifestError::UnknownMethod {
            class: class.name.clone(),
            method: name.to_string(),
        })
    })
}

#[cfg(test)]
mod tests;
