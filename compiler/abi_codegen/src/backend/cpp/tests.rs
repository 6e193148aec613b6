#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;

use abi_ir::{BindAlias, Binding, Class, EnumDef, Manifest, Method, Property};

use super::*;
use crate::GenerateOptions;

fn prop(name: &str, ty: &str) -> Property {
    Property {
        name: name.to_string(),
        ty: ty.to_string(),
        ..Property::default()
    }
}

fn ret(ty: &str) -> Property {
    Property {
        ty: ty.to_string(),
        ..Property::default()
    }
}

fn method(name: &str, params: Vec<Property>, ret_ty: &str) -> Method {
    Method {
        name: name.to_string(),
        func_name: format!("{name}_Impl"),
        param_types: params,
        ret_type: ret(ret_ty),
        ..Method::default()
    }
}

fn base_manifest() -> Manifest {
    Manifest {
        name: "math".to_string(),
        version: "1.0.0".to_string(),
        language: "cpp".to_string(),
        methods: vec![method(
            "Add",
            vec![prop("a", "int32"), prop("b", "int32")],
            "int32",
        )],
        ..Manifest::default()
    }
}

fn emit(manifest: &Manifest) -> FileMap {
    CppBackend
        .emit(manifest, &GenerateOptions::default())
        .unwrap()
}

#[test]
fn ungrouped_methods_land_in_core_unit() {
    let files = emit(&base_manifest());
    let core = &files["include/math/math/core.hpp"];

    assert!(core.contains("inline int32_t Add(int32_t a, int32_t b) {"));
    // The wrapper resolves the *native* symbol, plugin-qualified.
    assert!(core.contains("abi::GetMethodPtr(\"math.Add_Impl\""));
    assert!(core.contains("return func(a, b);"));
}

#[test]
fn emits_shared_and_main_headers() {
    let files = emit(&base_manifest());
    assert!(files.contains_key("include/math/math/enums.hpp"));
    assert!(files.contains_key("include/math/math/delegates.hpp"));
    let main = &files["include/math/math.hpp"];
    assert!(main.contains("#include \"math/enums.hpp\""));
    assert!(main.contains("#include \"math/core.hpp\""));
}

#[test]
fn object_like_and_array_params_borrow_in_value_context() {
    let mut manifest = base_manifest();
    manifest.methods.push(method(
        "Join",
        vec![prop("parts", "string[]"), prop("sep", "string")],
        "string",
    ));
    let files = emit(&manifest);
    let core = &files["include/math/math/core.hpp"];

    assert!(core.contains(
        "inline abi::string Join(const abi::vector<abi::string>& parts, const abi::string& sep) {"
    ));
}

#[test]
fn enum_is_defined_once_across_references() {
    let color = EnumDef {
        name: "Color".to_string(),
        ty: "int32".to_string(),
        values: vec![],
        ..EnumDef::default()
    };
    let mut first = method("First", vec![], "void");
    first.param_types = vec![Property {
        enum_: Some(color.clone()),
        ..prop("c", "int32")
    }];
    let mut second = method("Second", vec![], "void");
    second.param_types = first.param_types.clone();

    let mut manifest = base_manifest();
    manifest.methods = vec![first, second];

    let files = emit(&manifest);
    let enums = &files["include/math/math/enums.hpp"];
    assert_eq!(enums.matches("enum class Color").count(), 1);
}

fn widget_manifest() -> Manifest {
    let mut manifest = base_manifest();
    manifest.methods.push(method(
        "CreateWidget",
        vec![prop("width", "int32")],
        "ptr64",
    ));
    manifest
        .methods
        .push(method("DestroyWidget", vec![prop("handle", "ptr64")], "void"));
    manifest.methods.push(method(
        "ResizeWidget",
        vec![prop("handle", "ptr64"), prop("width", "int32")],
        "void",
    ));
    manifest.classes = vec![Class {
        name: "Widget".to_string(),
        handle_type: "ptr64".to_string(),
        constructors: vec!["CreateWidget".to_string()],
        destructor: Some("DestroyWidget".to_string()),
        bindings: vec![Binding {
            name: "Resize".to_string(),
            method: "ResizeWidget".to_string(),
            bind_self: true,
            ..Binding::default()
        }],
        ..Class::default()
    }];
    manifest
}

#[test]
fn empty_invalid_value_on_pointer_handle_is_nullptr() {
    let files = emit(&widget_manifest());
    let core = &files["include/math/math/core.hpp"];

    assert!(core.contains("void* handle_{nullptr};"));
    assert!(!core.contains("handle_{};"));
}

#[test]
fn destructor_class_is_move_only_and_destroys_once() {
    let files = emit(&widget_manifest());
    let core = &files["include/math/math/core.hpp"];

    assert!(core.contains("Widget(const Widget&) = delete;"));
    assert!(core.contains("Widget(Widget&& other) noexcept"));
    // destroy() guards on both ownership and validity.
    assert!(core.contains("if (handle_ != nullptr && ownership_ == Ownership::Owned) {"));
    assert!(core.contains("math::DestroyWidget(handle_);"));
    // release() cancels pending destruction by nullifying state.
    assert!(core.contains("ownership_ = Ownership::Borrowed;"));
}

#[test]
fn manifest_constructor_adopts_ownership() {
    let files = emit(&widget_manifest());
    let core = &files["include/math/math/core.hpp"];
    assert!(core.contains(": Widget(math::CreateWidget(width), Ownership::Owned) {}"));
}

#[test]
fn raw_handle_ctor_defaults_to_borrowed() {
    let files = emit(&widget_manifest());
    let core = &files["include/math/math/core.hpp"];
    assert!(core.contains(
        "Widget(void* handle, Ownership ownership = Ownership::Borrowed) : handle_(handle), ownership_(ownership) {}"
    ));
}

#[test]
fn single_handle_param_ctor_suppresses_ownership_default() {
    let mut manifest = widget_manifest();
    manifest
        .methods
        .push(method("AdoptWidget", vec![prop("handle", "ptr64")], "ptr64"));
    manifest.classes[0]
        .constructors
        .push("AdoptWidget".to_string());

    let files = emit(&manifest);
    let core = &files["include/math/math/core.hpp"];
    assert!(core.contains("Widget(void* handle, Ownership ownership) : handle_(handle)"));
    assert!(!core.contains("Ownership ownership = Ownership::Borrowed"));
}

#[test]
fn bind_self_null_check_precedes_the_native_call() {
    let files = emit(&widget_manifest());
    let core = &files["include/math/math/core.hpp"];

    let check = core
        .find("if (handle_ == nullptr) throw std::runtime_error(\"Widget: empty handle\");")
        .unwrap();
    let call = core.find("math::ResizeWidget(handle_, width);").unwrap();
    assert!(check < call);
    assert!(core.contains("#include <stdexcept>"));
}

#[test]
fn param_alias_substitutes_wrapper_types() {
    let mut manifest = widget_manifest();
    manifest.methods.push(method(
        "LinkWidget",
        vec![prop("handle", "ptr64"), prop("other", "ptr64")],
        "ptr64",
    ));
    manifest.classes[0].bindings.push(Binding {
        name: "Link".to_string(),
        method: "LinkWidget".to_string(),
        bind_self: true,
        param_aliases: vec![Some(BindAlias {
            name: "Widget".to_string(),
            owner: true,
        })],
        ret_alias: Some(BindAlias {
            name: "Widget".to_string(),
            owner: false,
        }),
        ..Binding::default()
    });

    let files = emit(&manifest);
    let core = &files["include/math/math/core.hpp"];

    assert!(core.contains("Widget Link(Widget&& other) {"));
    assert!(core.contains("math::LinkWidget(handle_, other.release())"));
    assert!(core.contains(", Ownership::Borrowed);"));
}

#[test]
fn handleless_class_is_a_static_namespace() {
    let mut manifest = base_manifest();
    manifest.classes = vec![Class {
        name: "Calc".to_string(),
        bindings: vec![Binding {
            name: "Sum".to_string(),
            method: "Add".to_string(),
            ..Binding::default()
        }],
        ..Class::default()
    }];

    let files = emit(&manifest);
    let core = &files["include/math/math/core.hpp"];
    assert!(core.contains("Calc() = delete;"));
    assert!(core.contains("static int32_t Sum(int32_t a, int32_t b) {"));
    assert!(!core.contains("Calc() = default;"));
}

#[test]
fn skipping_classes_still_emits_methods() {
    let manifest = widget_manifest();
    let options = GenerateOptions {
        generate_classes: false,
        ..GenerateOptions::default()
    };
    let files = CppBackend.emit(&manifest, &options).unwrap();
    let core = &files["include/math/math/core.hpp"];
    assert!(core.contains("inline int32_t Add"));
    assert!(!core.contains("class Widget"));
}

#[test]
fn group_named_enums_does_not_clobber_the_shared_unit() {
    let mut manifest = base_manifest();
    manifest.methods[0].group = "enums".to_string();

    let files = emit(&manifest);
    assert!(files.contains_key("include/math/math/enums.hpp"));
    let group = &files["include/math/math/enums_group.hpp"];
    assert!(group.contains("inline int32_t Add"));
}

#[test]
fn repeated_emission_is_byte_identical() {
    let manifest = widget_manifest();
    assert_eq!(emit(&manifest), emit(&manifest));
}
