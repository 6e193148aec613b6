//! Binding emission for the abigen compiler.
//!
//! The entry point is [`generate`]: parse-validated manifest in, map of
//! relative path → file content out. Everything between is pure and
//! synchronous; all mutable state lives in a per-call [`GenSession`], so
//! independent generation runs can proceed concurrently without sharing
//! anything.
//!
//! # Pipeline
//!
//! ```text
//! Manifest (validated)
//!        ↓
//!   sanitize identifiers     (injected NamingPolicy, backend keywords)
//!        ↓
//!   partition groups         (groups::partition)
//!        ↓
//!   per class: ClassPlan     (ownership analysis)
//!   per method: CallPlan     (marshal analysis, managed backends)
//!        ↓
//!   Backend::emit            (UnitBuilder rendering)
//!        ↓
//!   FileMap                  (relative path → content)
//! ```
//!
//! Either the full file map is produced or a single terminal error is
//! returned; there is no partial output.

use std::collections::BTreeMap;

use thiserror::Error;

use abi_ir::{Manifest, ManifestError, NamingPolicy};
use abi_types::TypeError;

pub mod backend;
pub mod groups;
pub mod marshal;
pub mod ownership;
pub mod session;
pub mod unit;

pub use backend::Backend;
pub use marshal::CallPlan;
pub use ownership::{ClassPlan, Ownership};
pub use session::GenSession;
pub use unit::UnitBuilder;

/// Generated files: relative path → content, deterministically ordered.
pub type FileMap = BTreeMap<String, String>;

/// Options for a generation run.
#[derive(Clone, Copy)]
pub struct GenerateOptions<'a> {
    /// Emit class wrappers (methods, enums, and delegates are always
    /// emitted). Defaults to true.
    pub generate_classes: bool,
    /// Identifier sanitizer override. When absent, the backend's
    /// reserved-keyword policy is used.
    pub naming: Option<&'a dyn NamingPolicy>,
}

impl Default for GenerateOptions<'_> {
    fn default() -> Self {
        Self {
            generate_classes: true,
            naming: None,
        }
    }
}

/// Terminal generation failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerateError {
    /// The manifest failed validation (missing field, broken reference, or
    /// handleless-class invariant).
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Type resolution failed.
    #[error(transparent)]
    Type(#[from] TypeError),

    /// No backend is registered for the requested language.
    #[error("unsupported language: {name} (supported: {supported})")]
    UnsupportedLanguage { name: String, supported: String },
}

/// Generate bindings for `manifest` in the given target language.
///
/// The manifest is re-validated, cloned, and sanitized before emission, so
/// the caller's copy is never mutated and a hand-constructed manifest gets
/// the same all-or-nothing treatment as a parsed one.
pub fn generate(
    manifest: &Manifest,
    language: &str,
    options: &GenerateOptions<'_>,
) -> Result<FileMap, GenerateError> {
    let Some(backend) = backend::for_language(language) else {
        return Err(GenerateError::UnsupportedLanguage {
            name: language.to_string(),
            supported: backend::supported_languages().join(", "),
        });
    };

    manifest.validate()?;

    let mut manifest = manifest.clone();
    match options.naming {
        Some(policy) => manifest.sanitize(policy),
        None => manifest.sanitize(&backend.keyword_policy()),
    }

    tracing::debug!(
        backend = backend.name(),
        methods = manifest.methods.len(),
        classes = manifest.classes.len(),
        "generating bindings"
    );

    backend.emit(&manifest, options)
}
