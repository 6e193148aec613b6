#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use abi_ir::{Binding, Class, Manifest, ManifestError, Method, Property};
use abi_types::{MapperConfig, Primitive, TableMapper, TypeCtx, TypeMapper, UnknownTypePolicy};

use super::*;
use crate::GenerateError;

fn mapper() -> TableMapper {
    TableMapper::new(MapperConfig {
        name: "test",
        primitive: Primitive::name,
        array: |t| format!("{t}[]"),
        value_borrow: None,
        mutable_ref: None,
        arrays_by_ref_in_value: false,
        unknown: UnknownTypePolicy::Forward,
        null_literal: "null",
        default_literal: "default",
    })
}

fn method(name: &str, param_types: Vec<Property>) -> Method {
    Method {
        name: name.to_string(),
        func_name: format!("{name}_Impl"),
        param_types,
        ..Method::default()
    }
}

fn handle_param(ty: &str) -> Property {
    Property {
        name: "handle".to_string(),
        ty: ty.to_string(),
        ..Property::default()
    }
}

fn widget_manifest(constructors: Vec<Method>) -> (Manifest, Class) {
    let class = Class {
        name: "Widget".to_string(),
        handle_type: "ptr64".to_string(),
        constructors: constructors.iter().map(|m| m.name.clone()).collect(),
        destructor: Some("Destroy".to_string()),
        bindings: vec![Binding {
            name: "Refresh".to_string(),
            method: "Refresh".to_string(),
            bind_self: true,
            ..Binding::default()
        }],
        ..Class::default()
    };

    let mut methods = constructors;
    methods.push(method("Destroy", vec![handle_param("ptr64")]));
    methods.push(method(
        "Refresh",
        vec![handle_param("ptr64"), handle_param("int32")],
    ));

    let manifest = Manifest {
        name: "plugin".to_string(),
        version: "1".to_string(),
        language: "test".to_string(),
        methods,
        classes: vec![class.clone()],
        ..Manifest::default()
    };
    (manifest, class)
}

#[test]
fn resolves_handle_and_references() {
    let (manifest, class) = widget_manifest(vec![method("Create", vec![])]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();

    assert!(!plan.handleless);
    assert_eq!(plan.handle_type, "ptr64");
    assert_eq!(plan.invalid_value, "null");
    assert_eq!(plan.constructors.len(), 1);
    assert_eq!(plan.destructor.unwrap().name, "Destroy");
    assert_eq!(plan.bindings.len(), 1);
}

#[test]
fn bind_self_strips_the_receiver() {
    let (manifest, class) = widget_manifest(vec![]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();

    let binding = &plan.bindings[0];
    assert_eq!(binding.method.param_types.len(), 2);
    assert_eq!(binding.params.len(), 1);
    assert_eq!(binding.params[0].ty, "int32");
    assert!(binding.null_check);
}

#[test]
fn non_throw_policy_disables_null_check() {
    let (manifest, mut class) = widget_manifest(vec![]);
    class.null_policy = "none".to_string();
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert!(!plan.bindings[0].null_check);
}

#[test]
fn raw_ctor_default_present_for_zero_param_ctor() {
    let (manifest, class) = widget_manifest(vec![method("Create", vec![])]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert_eq!(plan.raw_ctor_default, Some(Ownership::Borrowed));
    assert!(plan.has_zero_param_ctor);
}

#[test]
fn raw_ctor_default_present_for_multi_param_ctor() {
    let (manifest, class) = widget_manifest(vec![method(
        "Create",
        vec![handle_param("int32"), handle_param("int32")],
    )]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert_eq!(plan.raw_ctor_default, Some(Ownership::Borrowed));
    assert!(!plan.has_zero_param_ctor);
}

#[test]
fn single_handle_param_ctor_omits_the_default() {
    // A `Widget(ptr64)` constructor would be ambiguous against
    // `Widget(handle, ownership = Borrowed)`.
    let (manifest, class) = widget_manifest(vec![method("Adopt", vec![handle_param("ptr64")])]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert_eq!(plan.raw_ctor_default, None);
}

#[test]
fn single_non_handle_param_ctor_keeps_the_default() {
    let (manifest, class) = widget_manifest(vec![method("Open", vec![handle_param("string")])]);
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert_eq!(plan.raw_ctor_default, Some(Ownership::Borrowed));
}

#[test]
fn handleless_class_rejects_constructors() {
    let manifest = Manifest {
        methods: vec![method("Create", vec![])],
        ..Manifest::default()
    };
    let class = Class {
        name: "Util".to_string(),
        constructors: vec!["Create".to_string()],
        ..Class::default()
    };
    let err = ClassPlan::build(&manifest, &class, &mapper()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Manifest(ManifestError::Invariant { .. })
    ));
}

#[test]
fn handleless_class_rejects_bind_self() {
    let manifest = Manifest {
        methods: vec![method("Use", vec![])],
        ..Manifest::default()
    };
    let class = Class {
        name: "Util".to_string(),
        bindings: vec![Binding {
            name: "Use".to_string(),
            method: "Use".to_string(),
            bind_self: true,
            ..Binding::default()
        }],
        ..Class::default()
    };
    let err = ClassPlan::build(&manifest, &class, &mapper()).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Manifest(ManifestError::Invariant { .. })
    ));
}

#[test]
fn handleless_static_namespace_is_allowed() {
    let manifest = Manifest {
        methods: vec![method("Use", vec![])],
        ..Manifest::default()
    };
    let class = Class {
        name: "Util".to_string(),
        bindings: vec![Binding {
            name: "Use".to_string(),
            method: "Use".to_string(),
            bind_self: false,
            ..Binding::default()
        }],
        ..Class::default()
    };
    let plan = ClassPlan::build(&manifest, &class, &mapper()).unwrap();
    assert!(plan.handleless);
    assert!(plan.handle_type.is_empty());
}

#[test]
fn unknown_binding_method_is_reference_error() {
    let manifest = Manifest::default();
    let class = Class {
        name: "Widget".to_string(),
        handle_type: "ptr64".to_string(),
        bindings: vec![Binding {
            name: "Lost".to_string(),
            method: "Missing".to_string(),
            ..Binding::default()
        }],
        ..Class::default()
    };
    let err = ClassPlan::build(&manifest, &class, &mapper()).unwrap_err();
    assert_eq!(
        err,
        GenerateError::Manifest(ManifestError::UnknownMethod {
            class: "Widget".to_string(),
            method: "Missing".to_string(),
        })
    );
}

#[test]
fn mapper_contract_sees_value_context() {
    // Guards the fixture mapper itself: parameters map through the same
    // contract backends use.
    let m = mapper();
    assert_eq!(
        m.map_param_type(&handle_param("int32"), TypeCtx::Value).unwrap(),
        "int32"
    );
}
