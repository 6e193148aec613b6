use pretty_assertions::assert_eq;

use abi_ir::{Binding, Class, EnumDef, Manifest, Method, Property, Prototype};

use super::*;

fn method(name: &str, group: &str) -> Method {
    Method {
        name: name.to_string(),
        func_name: format!("{name}_Impl"),
        group: group.to_string(),
        ..Method::default()
    }
}

#[test]
fn group_key_lowercases_and_defaults() {
    assert_eq!(group_key(""), "core");
    assert_eq!(group_key("Audio"), "audio");
    assert_eq!(group_key("core"), "core");
}

#[test]
fn partition_merges_methods_and_classes() {
    let manifest = Manifest {
        methods: vec![method("A", "Audio"), method("B", "")],
        classes: vec![Class {
            name: "W".to_string(),
            group: "video".to_string(),
            ..Class::default()
        }],
        ..Manifest::default()
    };
    let groups: Vec<String> = partition(&manifest).into_iter().collect();
    assert_eq!(groups, ["audio", "core", "video"]);
}

#[test]
fn dependent_groups_follow_class_method_references() {
    let manifest = Manifest {
        methods: vec![
            method("Create", "factory"),
            method("Destroy", "factory"),
            method("Use", "core"),
        ],
        classes: vec![Class {
            name: "W".to_string(),
            group: "core".to_string(),
            handle_type: "ptr64".to_string(),
            constructors: vec!["Create".to_string()],
            destructor: Some("Destroy".to_string()),
            bindings: vec![Binding {
                name: "Use".to_string(),
                method: "Use".to_string(),
                ..Binding::default()
            }],
            ..Class::default()
        }],
        ..Manifest::default()
    };

    let deps: Vec<String> = dependent_groups(&manifest, "core").into_iter().collect();
    assert_eq!(deps, ["factory"]);
    assert!(dependent_groups(&manifest, "factory").is_empty());
}

fn enum_prop(name: &str, enum_name: &str) -> Property {
    Property {
        name: name.to_string(),
        ty: "int32".to_string(),
        enum_: Some(EnumDef {
            name: enum_name.to_string(),
            ty: "int32".to_string(),
            ..EnumDef::default()
        }),
        ..Property::default()
    }
}

#[test]
fn enums_collect_once_across_methods() {
    let mut first = method("First", "");
    first.param_types = vec![enum_prop("a", "Color")];
    let mut second = method("Second", "");
    second.param_types = vec![enum_prop("b", "Color"), enum_prop("c", "Shape")];

    let manifest = Manifest {
        methods: vec![first, second],
        ..Manifest::default()
    };

    let mut session = GenSession::new();
    let enums = collect_enums(&manifest, &mut session);
    let names: Vec<&str> = enums.iter().map(|e| e.def.name.as_str()).collect();
    assert_eq!(names, ["Color", "Shape"]);
}

#[test]
fn enums_inside_prototypes_are_found() {
    let mut m = method("WithCallback", "");
    m.param_types = vec![Property {
        name: "cb".to_string(),
        ty: "function".to_string(),
        prototype: Some(Box::new(Prototype {
            name: "Callback".to_string(),
            param_types: vec![enum_prop("state", "State")],
            ret_type: Property {
                ty: "void".to_string(),
                ..Property::default()
            },
            ..Prototype::default()
        })),
        ..Property::default()
    }];

    let manifest = Manifest {
        methods: vec![m],
        ..Manifest::default()
    };

    let mut session = GenSession::new();
    let enums = collect_enums(&manifest, &mut session);
    assert_eq!(enums.len(), 1);
    assert_eq!(enums[0].def.name, "State");
    assert_eq!(enums[0].underlying, "int32");
}

#[test]
fn underlying_falls_back_to_property_base_type() {
    let mut m = method("M", "");
    m.ret_type = Property {
        ty: "uint8".to_string(),
        enum_: Some(EnumDef {
            name: "Flags".to_string(),
            ..EnumDef::default()
        }),
        ..Property::default()
    };
    let manifest = Manifest {
        methods: vec![m],
        ..Manifest::default()
    };

    let mut session = GenSession::new();
    let enums = collect_enums(&manifest, &mut session);
    assert_eq!(enums[0].underlying, "uint8");
}

#[test]
fn delegates_collect_nested_definitions_once() {
    let inner = Prototype {
        name: "Inner".to_string(),
        ret_type: Property {
            ty: "void".to_string(),
            ..Property::default()
        },
        ..Prototype::default()
    };
    let outer = Prototype {
        name: "Outer".to_string(),
        param_types: vec![Property {
            name: "inner".to_string(),
            ty: "function".to_string(),
            prototype: Some(Box::new(inner)),
            ..Property::default()
        }],
        ret_type: Property {
            ty: "void".to_string(),
            ..Property::default()
        },
        ..Prototype::default()
    };

    let mut with_outer = method("First", "");
    with_outer.param_types = vec![Property {
        name: "cb".to_string(),
        ty: "function".to_string(),
        prototype: Some(Box::new(outer.clone())),
        ..Property::default()
    }];
    let mut with_outer_again = method("Second", "");
    with_outer_again.param_types = with_outer.param_types.clone();

    let manifest = Manifest {
        methods: vec![with_outer, with_outer_again],
        ..Manifest::default()
    };

    let mut session = GenSession::new();
    let delegates = collect_delegates(&manifest, &mut session);
    let names: Vec<&str> = delegates.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Outer", "Inner"]);
}
