//! The manifest IR.
//!
//! A manifest describes a plugin's exported surface: flat methods, the
//! enums and function-pointer prototypes they reference, and handle-based
//! wrapper classes synthesized on top of the methods. The JSON field names
//! follow the manifest schema (`camelCase`); unknown fields are ignored so
//! schema-adjacent keys such as `$schema` pass through harmlessly.

use serde::Deserialize;

/// Root manifest entity.
///
/// Immutable once parsed, except for the identifier-sanitization pass
/// ([`Manifest::sanitize`](crate::sanitize)).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    pub name: String,
    pub version: String,
    pub language: String,
    pub description: String,
    pub author: String,
    pub website: String,
    pub license: String,
    pub entry: String,
    pub platforms: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub methods: Vec<Method>,
    pub classes: Vec<Class>,
}

/// A plugin dependency.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dependency {
    pub name: String,
    pub optional: bool,
}

/// An exported method.
///
/// `name` is the public symbol exposed to binding users; `func_name` is the
/// underlying exported native symbol. `group` partitions methods across
/// emitted compilation units and is case-normalized during sanitization.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Method {
    pub name: String,
    pub group: String,
    pub description: String,
    pub deprecated: String,
    pub func_name: String,
    pub param_types: Vec<Property>,
    pub ret_type: Property,
}

/// A parameter or return type.
///
/// The raw `ty` string carries the manifest type name, with a `[]` suffix
/// marking arrays. Exactly one of {plain base type, `enum_`, `prototype`}
/// describes the value; `is_ref` marks pass-by-mutable-reference
/// parameters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(rename = "ref")]
    pub is_ref: bool,
    pub description: String,
    pub default: Option<i64>,
    #[serde(rename = "enum")]
    pub enum_: Option<EnumDef>,
    pub prototype: Option<Box<Prototype>>,
}

impl Property {
    /// True if the type carries the `[]` array suffix.
    pub fn is_array(&self) -> bool {
        self.ty.len() > 2 && self.ty.ends_with("[]")
    }

    /// The type name without the array suffix.
    pub fn base_type(&self) -> &str {
        if self.is_array() {
            &self.ty[..self.ty.len() - 2]
        } else {
            &self.ty
        }
    }
}

/// An enum referenced by a parameter or return type.
///
/// Identity is by name: every reference to the same name anywhere in the
/// manifest must resolve to the same definition, and the definition is
/// emitted exactly once per run.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnumDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub description: String,
    pub values: Vec<EnumValue>,
}

/// A single enum constant.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
    pub description: String,
}

/// A function-pointer/delegate type. Same one-definition-per-name rule as
/// [`EnumDef`].
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prototype {
    pub name: String,
    pub description: String,
    pub param_types: Vec<Property>,
    pub ret_type: Property,
}

/// An RAII wrapper class over an opaque native handle.
///
/// An empty or `"void"` `handle_type` makes the class *handleless*: a
/// static-method namespace that must not declare constructors, a
/// destructor, or `bind_self` bindings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Class {
    pub name: String,
    pub group: String,
    pub description: String,
    pub deprecated: String,
    pub handle_type: String,
    pub invalid_value: String,
    pub null_policy: String,
    pub constructors: Vec<String>,
    pub destructor: Option<String>,
    pub bindings: Vec<Binding>,
}

impl Class {
    /// True if the class has no opaque handle (static namespace only).
    pub fn is_handleless(&self) -> bool {
        self.handle_type.is_empty() || self.handle_type == "void"
    }

    /// The effective null policy; `"throw"` unless the manifest overrides
    /// it. Values other than `"throw"` are a reserved extension point and
    /// currently disable the pre-call check.
    pub fn null_policy(&self) -> &str {
        if self.null_policy.is_empty() {
            "throw"
        } else {
            &self.null_policy
        }
    }
}

/// An object-style member synthesized from a flat exported method.
///
/// With `bind_self` the underlying method's first parameter becomes the
/// implicit receiver and is omitted from the public signature.
/// `param_aliases` is position-aligned with the *remaining* parameters.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Binding {
    pub name: String,
    pub method: String,
    pub bind_self: bool,
    pub deprecated: String,
    pub param_aliases: Vec<Option<BindAlias>>,
    pub ret_alias: Option<BindAlias>,
}

/// Substitutes a wrapper-class type for a raw handle parameter or return
/// value. `owner` controls whether the call consumes (`release`) or borrows
/// (`get`) the wrapper's handle, and whether a returned handle is adopted.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BindAlias {
    pub name: String,
    pub owner: bool,
}

impl Manifest {
    /// Look up a method by public name or native symbol name.
    pub fn find_method(&self, name: &str) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name || m.func_name == name)
    }
}

#[cfg(test)]
mod tests;
