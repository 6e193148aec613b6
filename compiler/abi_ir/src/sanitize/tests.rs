#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::manifest::{BindAlias, Binding, Class, EnumValue, Method};

/// Suffixes names found in a fixed deny list, mirroring how backend
/// keyword policies behave.
struct DenyList(&'static [&'static str]);

impl NamingPolicy for DenyList {
    fn sanitize(&self, name: &str) -> String {
        if self.0.contains(&name) {
            format!("{name}_")
        } else {
            name.to_string()
        }
    }
}

fn fixture() -> Manifest {
    Manifest {
        name: "plugin".to_string(),
        version: "1".to_string(),
        language: "cpp".to_string(),
        methods: vec![Method {
            name: "delete".to_string(),
            func_name: "Delete_Impl".to_string(),
            group: "Memory".to_string(),
            param_types: vec![Property {
                name: "new".to_string(),
                ty: "int32".to_string(),
                enum_: Some(EnumDef {
                    name: "class".to_string(),
                    ty: "int32".to_string(),
                    values: vec![EnumValue {
                        name: "for".to_string(),
                        value: 1,
                        ..EnumValue::default()
                    }],
                    ..EnumDef::default()
                }),
                ..Property::default()
            }],
            ret_type: Property {
                ty: "function".to_string(),
                prototype: Some(Box::new(Prototype {
                    name: "operator".to_string(),
                    param_types: vec![Property {
                        name: "if".to_string(),
                        ty: "int32".to_string(),
                        ..Property::default()
                    }],
                    ret_type: Property {
                        ty: "void".to_string(),
                        ..Property::default()
                    },
                    ..Prototype::default()
                })),
                ..Property::default()
            },
            ..Method::default()
        }],
        classes: vec![Class {
            name: "union".to_string(),
            bindings: vec![Binding {
                name: "try".to_string(),
                method: "delete".to_string(),
                param_aliases: vec![Some(BindAlias {
                    name: "typename".to_string(),
                    owner: false,
                })],
                ..Binding::default()
            }],
            ..Class::default()
        }],
        ..Manifest::default()
    }
}

#[test]
fn sanitizes_every_identifier() {
    let policy = DenyList(&[
        "delete", "new", "class", "for", "operator", "if", "union", "try", "typename",
    ]);
    let mut manifest = fixture();
    manifest.sanitize(&policy);

    let method = &manifest.methods[0];
    assert_eq!(method.name, "delete_");
    assert_eq!(method.func_name, "Delete_Impl");
    assert_eq!(method.param_types[0].name, "new_");

    let enum_ = method.param_types[0].enum_.as_ref().unwrap();
    assert_eq!(enum_.name, "class_");
    assert_eq!(enum_.values[0].name, "for_");

    let proto = method.ret_type.prototype.as_ref().unwrap();
    assert_eq!(proto.name, "operator_");
    assert_eq!(proto.param_types[0].name, "if_");

    let class = &manifest.classes[0];
    assert_eq!(class.name, "union_");
    assert_eq!(class.bindings[0].name, "try_");
    assert_eq!(class.bindings[0].method, "delete_");
    assert_eq!(
        class.bindings[0].param_aliases[0].as_ref().unwrap().name,
        "typename_"
    );
}

#[test]
fn groups_are_lowercased_and_defaulted() {
    let mut manifest = fixture();
    manifest.sanitize(&IdentityPolicy);

    assert_eq!(manifest.methods[0].group, "memory");
    assert_eq!(manifest.classes[0].group, DEFAULT_GROUP);
}

#[test]
fn identity_policy_only_normalizes_groups() {
    let mut manifest = fixture();
    let before = manifest.clone();
    manifest.sanitize(&IdentityPolicy);

    assert_eq!(manifest.methods[0].name, before.methods[0].name);
    assert_eq!(manifest.classes[0].name, before.classes[0].name);
}
