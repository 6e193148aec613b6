#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use super::*;
use crate::manifest::{Binding, Method, Property};

const MINIMAL: &str = r#"{
    "name": "math",
    "version": "1.0.0",
    "language": "cpp",
    "methods": [
        {
            "name": "Add",
            "funcName": "Add_Impl",
            "paramTypes": [
                {"name": "a", "type": "int32"},
                {"name": "b", "type": "int32"}
            ],
            "retType": {"type": "int32"}
        }
    ]
}"#;

#[test]
fn parses_minimal_manifest() {
    let manifest = Manifest::parse(MINIMAL).unwrap();
    assert_eq!(manifest.name, "math");
    assert_eq!(manifest.methods.len(), 1);
    assert_eq!(manifest.methods[0].func_name, "Add_Impl");
    assert_eq!(manifest.methods[0].param_types[1].name, "b");
    assert_eq!(manifest.methods[0].ret_type.ty, "int32");
}

#[test]
fn ignores_unknown_fields() {
    let json = r#"{
        "$schema": "https://example.invalid/schema.json",
        "name": "p", "version": "1", "language": "cpp",
        "methods": []
    }"#;
    assert!(Manifest::parse(json).is_ok());
}

#[test]
fn rejects_invalid_json() {
    let err = Manifest::parse("{not json").unwrap_err();
    assert!(matches!(err, ManifestError::Json(_)));
}

#[test]
fn rejects_missing_manifest_fields() {
    let err = Manifest::parse(r#"{"version": "1", "language": "cpp"}"#).unwrap_err();
    assert_eq!(
        err,
        ManifestError::MissingField {
            location: "manifest".to_string(),
            field: "name",
        }
    );
}

#[test]
fn rejects_method_without_func_name() {
    let json = r#"{
        "name": "p", "version": "1", "language": "cpp",
        "methods": [{"name": "Foo", "retType": {"type": "void"}}]
    }"#;
    let err = Manifest::parse(json).unwrap_err();
    assert_eq!(
        err,
        ManifestError::MissingField {
            location: "methods[0]".to_string(),
            field: "funcName",
        }
    );
}

#[test]
fn rejects_unnamed_parameter() {
    let json = r#"{
        "name": "p", "version": "1", "language": "cpp",
        "methods": [{
            "name": "Foo", "funcName": "Foo_Impl",
            "paramTypes": [{"type": "int32"}],
            "retType": {"type": "void"}
        }]
    }"#;
    let err = Manifest::parse(json).unwrap_err();
    assert_eq!(
        err,
        ManifestError::MissingField {
            location: "methods[0].paramTypes[0]".to_string(),
            field: "name",
        }
    );
}

#[test]
fn rejects_prototype_array() {
    let json = r#"{
        "name": "p", "version": "1", "language": "cpp",
        "methods": [{
            "name": "Foo", "funcName": "Foo_Impl",
            "paramTypes": [{
                "name": "cb", "type": "function[]",
                "prototype": {"name": "Callback", "retType": {"type": "void"}}
            }],
            "retType": {"type": "void"}
        }]
    }"#;
    let err = Manifest::parse(json).unwrap_err();
    assert!(matches!(err, ManifestError::PrototypeArray { .. }));
}

#[test]
fn validates_nested_prototype_parameters() {
    let json = r#"{
        "name": "p", "version": "1", "language": "cpp",
        "methods": [{
            "name": "Foo", "funcName": "Foo_Impl",
            "paramTypes": [{
                "name": "cb", "type": "function",
                "prototype": {
                    "name": "Callback",
                    "paramTypes": [{"name": "x"}],
                    "retType": {"type": "void"}
                }
            }],
            "retType": {"type": "void"}
        }]
    }"#;
    let err = Manifest::parse(json).unwrap_err();
    assert_eq!(
        err,
        ManifestError::MissingField {
            location: "methods[0].paramTypes[0].prototype.paramTypes[0]".to_string(),
            field: "type",
        }
    );
}

fn manifest_with_class(class: Class) -> Manifest {
    Manifest {
        name: "p".to_string(),
        version: "1".to_string(),
        language: "cpp".to_string(),
        methods: vec![Method {
            name: "Destroy".to_string(),
            func_name: "Destroy_Impl".to_string(),
            ret_type: Property {
                ty: "void".to_string(),
                ..Property::default()
            },
            ..Method::default()
        }],
        classes: vec![class],
        ..Manifest::default()
    }
}

#[test]
fn handleless_class_with_constructor_is_invariant_error() {
    let manifest = manifest_with_class(Class {
        name: "Util".to_string(),
        constructors: vec!["Destroy".to_string()],
        ..Class::default()
    });
    let err = manifest.validate().unwrap_err();
    assert!(matches!(err, ManifestError::Invariant { .. }));
}

#[test]
fn handleless_class_with_bind_self_is_invariant_error() {
    let manifest = manifest_with_class(Class {
        name: "Util".to_string(),
        bindings: vec![Binding {
            name: "Use".to_string(),
            method: "Destroy".to_string(),
            bind_self: true,
            ..Binding::default()
        }],
        ..Class::default()
    });
    let err = manifest.validate().unwrap_err();
    assert!(matches!(err, ManifestError::Invariant { .. }));
}

#[test]
fn unknown_destructor_is_reference_error() {
    let manifest = manifest_with_class(Class {
        name: "Widget".to_string(),
        handle_type: "ptr64".to_string(),
        destructor: Some("Vanish".to_string()),
        ..Class::default()
    });
    let err = manifest.validate().unwrap_err();
    assert_eq!(
        err,
        ManifestError::UnknownMethod {
            class: "Widget".to_string(),
            method: "Vanish".to_string(),
        }
    );
}

#[test]
fn handle_class_with_known_references_validates() {
    let manifest = manifest_with_class(Class {
        name: "Widget".to_string(),
        handle_type: "ptr64".to_string(),
        destructor: Some("Destroy".to_string()),
        bindings: vec![Binding {
            name: "Close".to_string(),
            method: "Destroy_Impl".to_string(),
            bind_self: true,
            ..Binding::default()
        }],
        ..Class::default()
    });
    assert!(manifest.validate().is_ok());
}
