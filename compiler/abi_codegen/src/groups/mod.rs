//! Group partitioning and shared-entity collection.
//!
//! Methods and classes are partitioned into named groups, one emitted unit
//! per group. Enums and delegates are shared: referenced from anywhere,
//! defined exactly once in a shared unit. Collection order is the first
//! appearance during a deterministic manifest walk, so repeated runs
//! produce byte-identical units.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use abi_ir::{EnumDef, Manifest, Property, Prototype, DEFAULT_GROUP};

use crate::session::GenSession;

/// The partition key for an entity's declared group.
pub fn group_key(group: &str) -> String {
    if group.is_empty() {
        DEFAULT_GROUP.to_string()
    } else {
        group.to_lowercase()
    }
}

/// All partition keys in the manifest, sorted.
pub fn partition(manifest: &Manifest) -> BTreeSet<String> {
    let mut groups = BTreeSet::new();
    for method in &manifest.methods {
        groups.insert(group_key(&method.group));
    }
    for class in &manifest.classes {
        groups.insert(group_key(&class.group));
    }
    tracing::debug!(count = groups.len(), "partitioned manifest groups");
    groups
}

/// Groups that `group`'s classes depend on through their constructor,
/// destructor, and binding methods. Backends import these units so that
/// cross-group method references resolve.
pub fn dependent_groups(manifest: &Manifest, group: &str) -> BTreeSet<String> {
    let mut method_groups: FxHashMap<&str, String> = FxHashMap::default();
    for method in &manifest.methods {
        method_groups.insert(method.name.as_str(), group_key(&method.group));
    }

    let mut referenced = BTreeSet::new();
    let mut add = |name: &str| {
        if let Some(method_group) = method_groups.get(name) {
            if method_group != group {
                referenced.insert(method_group.clone());
            }
        }
    };

    for class in &manifest.classes {
        if group_key(&class.group) != group {
            continue;
        }
        for ctor in &class.constructors {
            add(ctor);
        }
        if let Some(dtor) = &class.destructor {
            add(dtor);
        }
        for binding in &class.bindings {
            add(&binding.method);
        }
    }

    referenced
}

/// A shared enum definition with its resolved underlying base type name.
#[derive(Copy, Clone)]
pub struct SharedEnum<'m> {
    pub def: &'m EnumDef,
    /// Manifest base type the enum is backed by: the definition's own
    /// `type` when present, otherwise the referencing property's base.
    pub underlying: &'m str,
}

/// Collect every enum referenced by the manifest's methods, recursing into
/// prototypes, each name exactly once.
pub fn collect_enums<'m>(manifest: &'m Manifest, session: &mut GenSession) -> Vec<SharedEnum<'m>> {
    let mut found = Vec::new();
    for method in &manifest.methods {
        visit_enums(&method.ret_type, session, &mut found);
        for param in &method.param_types {
            visit_enums(param, session, &mut found);
        }
    }
    tracing::debug!(count = found.len(), "collected shared enums");
    found
}

fn visit_enums<'m>(
    prop: &'m Property,
    session: &mut GenSession,
    found: &mut Vec<SharedEnum<'m>>,
) {
    if let Some(def) = &prop.enum_ {
        if session.claim_enum(&def.name) {
            let underlying = if def.ty.is_empty() {
                prop.base_type()
            } else {
                &def.ty
            };
            found.push(SharedEnum { def, underlying });
        }
    }
    if let Some(proto) = &prop.prototype {
        visit_enums(&proto.ret_type, session, found);
        for param in &proto.param_types {
            visit_enums(param, session, found);
        }
    }
}

/// Collect every delegate (prototype) referenced by the manifest's
/// methods, outer definitions before the nested ones they mention, each
/// name exactly once.
pub fn collect_delegates<'m>(
    manifest: &'m Manifest,
    session: &mut GenSession,
) -> Vec<&'m Prototype> {
    let mut found = Vec::new();
    for method in &manifest.methods {
        visit_delegates(&method.ret_type, session, &mut found);
        for param in &method.param_types {
            visit_delegates(param, session, &mut found);
        }
    }
    tracing::debug!(count = found.len(), "collected shared delegates");
    found
}

fn visit_delegates<'m>(
    prop: &'m Property,
    session: &mut GenSession,
    found: &mut Vec<&'m Prototype>,
) {
    if let Some(proto) = &prop.prototype {
        if session.claim_delegate(&proto.name) {
            found.push(proto);
        }
        visit_delegates(&proto.ret_type, session, found);
        for param in &proto.param_types {
            visit_delegates(param, session, found);
        }
    }
}

#[cfg(test)]
mod tests;
