//! Identifier sanitization.
//!
//! Target languages reserve identifiers the manifest is free to use, so
//! every name that will appear in generated source runs through an injected
//! [`NamingPolicy`] before emission. The pass also normalizes partition
//! groups: lowercased, with ungrouped entities falling into `"core"`.
//!
//! The policy is a seam, not a table: keyword lists live with the backends
//! that own them and are handed in from outside, keeping this crate free of
//! per-language data.

use crate::manifest::{EnumDef, Manifest, Property, Prototype};

/// The default partition group for ungrouped methods and classes.
pub const DEFAULT_GROUP: &str = "core";

/// Rewrites identifiers that collide with a target language's reserved
/// words (or are otherwise unusable) into legal ones.
pub trait NamingPolicy {
    /// Return the name to emit for `name`. Must be pure: equal inputs give
    /// equal outputs within a run.
    fn sanitize(&self, name: &str) -> String;
}

/// A policy that leaves every name untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdentityPolicy;

impl NamingPolicy for IdentityPolicy {
    fn sanitize(&self, name: &str) -> String {
        name.to_string()
    }
}

impl Manifest {
    /// Apply `policy` to every identifier that will surface in generated
    /// code, recursing into nested prototypes, and normalize groups.
    pub fn sanitize(&mut self, policy: &dyn NamingPolicy) {
        for method in &mut self.methods {
            apply(&mut method.name, policy);
            apply(&mut method.func_name, policy);
            apply(&mut method.group, policy);
            normalize_group(&mut method.group);
            sanitize_params(&mut method.param_types, policy);
            sanitize_type_refs(&mut method.ret_type, policy);
        }

        for class in &mut self.classes {
            apply(&mut class.name, policy);
            apply(&mut class.group, policy);
            normalize_group(&mut class.group);

            for binding in &mut class.bindings {
                apply(&mut binding.name, policy);
                apply(&mut binding.method, policy);
                for alias in binding.param_aliases.iter_mut().flatten() {
                    apply(&mut alias.name, policy);
                }
                if let Some(alias) = &mut binding.ret_alias {
                    apply(&mut alias.name, policy);
                }
            }
        }
    }
}

fn apply(name: &mut String, policy: &dyn NamingPolicy) {
    if !name.is_empty() {
        *name = policy.sanitize(name);
    }
}

fn normalize_group(group: &mut String) {
    if group.is_empty() {
        *group = DEFAULT_GROUP.to_string();
    } else {
        *group = group.to_lowercase();
    }
}

fn sanitize_params(params: &mut [Property], policy: &dyn NamingPolicy) {
    for param in params {
        apply(&mut param.name, policy);
        sanitize_type_refs(param, policy);
    }
}

fn sanitize_type_refs(prop: &mut Property, policy: &dyn NamingPolicy) {
    if let Some(enum_) = &mut prop.enum_ {
        sanitize_enum(enum_, policy);
    }
    if let Some(proto) = &mut prop.prototype {
        sanitize_prototype(proto, policy);
    }
}

fn sanitize_enum(enum_: &mut EnumDef, policy: &dyn NamingPolicy) {
    apply(&mut enum_.name, policy);
    for value in &mut enum_.values {
        apply(&mut value.name, policy);
    }
}

fn sanitize_prototype(proto: &mut Prototype, policy: &dyn NamingPolicy) {
    apply(&mut proto.name, policy);
    sanitize_params(&mut proto.param_types, policy);
    sanitize_type_refs(&mut proto.ret_type, policy);
}

#[cfg(test)]
mod tests;
