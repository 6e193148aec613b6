//! Manifest JSON parsing and validation.
//!
//! Validation is local and total: it either accepts the whole manifest or
//! rejects it with the first failure found. There is no partially-valid IR;
//! a failed parse or validation aborts the entire generation run.

use thiserror::Error;

use crate::manifest::{Class, Manifest, Property, Prototype};

/// Errors produced while building the IR.
///
/// `location` strings follow the JSON structure, e.g.
/// `methods[2].paramTypes[0]`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ManifestError {
    /// The input was not valid manifest JSON.
    #[error("failed to parse manifest JSON: {0}")]
    Json(String),

    /// A required field is missing or empty.
    #[error("{location}: {field} is required")]
    MissingField {
        location: String,
        field: &'static str,
    },

    /// A prototype-typed value carried the `[]` array suffix.
    #[error("{location}: function-pointer types cannot be array element types")]
    PrototypeArray { location: String },

    /// A constructor, destructor, or binding referenced an unknown method.
    #[error("class {class}: references unknown method {method}")]
    UnknownMethod { class: String, method: String },

    /// The handleless-class rule was violated.
    #[error("class {class}: {reason}")]
    Invariant { class: String, reason: String },
}

impl Manifest {
    /// Parse and validate manifest JSON.
    pub fn parse(data: &str) -> Result<Manifest, ManifestError> {
        let manifest: Manifest =
            serde_json::from_str(data).map_err(|e| ManifestError::Json(e.to_string()))?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate the manifest: required fields, the handleless-class
    /// invariant, and method references from classes.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(missing("manifest", "name"));
        }
        if self.version.is_empty() {
            return Err(missing("manifest", "version"));
        }
        if self.language.is_empty() {
            return Err(missing("manifest", "language"));
        }

        for (i, method) in self.methods.iter().enumerate() {
            let location = format!("methods[{i}]");
            if method.name.is_empty() {
                return Err(missing(&location, "name"));
            }
            if method.func_name.is_empty() {
                return Err(missing(&location, "funcName"));
            }
            for (j, param) in method.param_types.iter().enumerate() {
                validate_property(param, &format!("{location}.paramTypes[{j}]"), true)?;
            }
            validate_property(&method.ret_type, &format!("{location}.retType"), false)?;
        }

        for class in &self.classes {
            validate_class(self, class)?;
        }

        Ok(())
    }
}

fn missing(location: &str, field: &'static str) -> ManifestError {
    ManifestError::MissingField {
        location: location.to_string(),
        field,
    }
}

fn validate_property(
    prop: &Property,
    location: &str,
    is_param: bool,
) -> Result<(), ManifestError> {
    if is_param && prop.name.is_empty() {
        return Err(missing(location, "name"));
    }
    if prop.ty.is_empty() {
        return Err(missing(location, "type"));
    }
    if prop.prototype.is_some() && prop.is_array() {
        return Err(ManifestError::PrototypeArray {
            location: location.to_string(),
        });
    }
    if let Some(proto) = &prop.prototype {
        validate_prototype(proto, &format!("{location}.prototype"))?;
    }
    Ok(())
}

fn validate_prototype(proto: &Prototype, location: &str) -> Result<(), ManifestError> {
    if proto.name.is_empty() {
        return Err(missing(location, "name"));
    }
    for (j, param) in proto.param_types.iter().enumerate() {
        validate_property(param, &format!("{location}.paramTypes[{j}]"), true)?;
    }
    validate_property(&proto.ret_type, &format!("{location}.retType"), false)?;
    Ok(())
}

fn validate_class(manifest: &Manifest, class: &Class) -> Result<(), ManifestError> {
    if class.name.is_empty() {
        return Err(missing("classes", "name"));
    }

    if class.is_handleless() {
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

    for ctor in &class.constructors {
        resolve(manifest, class, ctor)?;
    }
    if let Some(dtor) = &class.destructor {
        resolve(manifest, class, dtor)?;
    }
    for binding in &class.bindings {
        resolve(manifest, class, &binding.method)?;
    }

    Ok(())
}

fn invariant(class: &Class, reason: &str) -> ManifestError {
    ManifestError::Invariant {
        class: class.name.clone(),
        reason: reason.to_string(),
    }
}

fn resolve(manifest: &Manifest, class: &Class, method: &str) -> Result<(), ManifestError> {
    if manifest.find_method(method).is_none() {
        return Err(ManifestError::UnknownMethod {
            class: class.name.clone(),
            method: method.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
