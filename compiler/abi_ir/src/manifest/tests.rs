use pretty_assertions::assert_eq;

use super::*;

fn prop(ty: &str) -> Property {
    Property {
        ty: ty.to_string(),
        ..Property::default()
    }
}

#[test]
fn array_suffix_detected() {
    assert!(prop("int32[]").is_array());
    assert!(prop("string[]").is_array());
    assert!(!prop("int32").is_array());
    assert!(!prop("void").is_array());
}

#[test]
fn bare_array_suffix_is_not_an_array() {
    // The suffix alone carries no element type.
    assert!(!prop("[]").is_array());
}

#[test]
fn base_type_strips_suffix() {
    assert_eq!(prop("int32[]").base_type(), "int32");
    assert_eq!(prop("mat4x4").base_type(), "mat4x4");
}

#[test]
fn handleless_detection() {
    let mut class = Class::default();
    assert!(class.is_handleless());
    class.handle_type = "void".to_string();
    assert!(class.is_handleless());
    class.handle_type = "ptr64".to_string();
    assert!(!class.is_handleless());
}

#[test]
fn null_policy_defaults_to_throw() {
    let mut class = Class::default();
    assert_eq!(class.null_policy(), "throw");
    class.null_policy = "ignore".to_string();
    assert_eq!(class.null_policy(), "ignore");
}

#[test]
fn find_method_matches_public_and_native_names() {
    let manifest = Manifest {
        methods: vec![Method {
            name: "Add".to_string(),
            func_name: "Add_Impl".to_string(),
            ..Method::default()
        }],
        ..Manifest::default()
    };
    assert!(manifest.find_method("Add").is_some());
    assert!(manifest.find_method("Add_Impl").is_some());
    assert!(manifest.find_method("Sub").is_none());
}
