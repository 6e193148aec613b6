//! Backend emitters and the language registry.

use abi_ir::Manifest;
use abi_types::KeywordPolicy;

use crate::{FileMap, GenerateError, GenerateOptions};

pub mod cpp;
pub mod csharp;
pub mod python;

/// A concrete language emitter.
///
/// Backends receive an already-sanitized manifest and own only the
/// per-language delta: a mapper configuration, staging tables where the
/// runtime is managed, and text rendering. Everything else (grouping,
/// ownership analysis, marshal planning) is shared machinery.
pub trait Backend {
    /// Registry name, e.g. `"cpp"`.
    fn name(&self) -> &'static str;

    /// The reserved-word policy applied during sanitization.
    fn keyword_policy(&self) -> KeywordPolicy;

    /// Emit the full file map for a sanitized manifest.
    fn emit(
        &self,
        manifest: &Manifest,
        options: &GenerateOptions<'_>,
    ) -> Result<FileMap, GenerateError>;
}

/// Look up the backend for a language name.
pub fn for_language(language: &str) -> Option<Box<dyn Backend>> {
    match language {
        "cpp" => Some(Box::new(cpp::CppBackend)),
        "csharp" => Some(Box::new(csharp::CSharpBackend)),
        "python" => Some(Box::new(python::PythonBackend)),
        _ => None,
    }
}

/// Registered language names, sorted.
pub fn supported_languages() -> Vec<&'static str> {
    vec!["cpp", "csharp", "python"]
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn registry_resolves_each_supported_language() {
        for language in supported_languages() {
            let backend = for_language(language).expect("registered language");
            assert_eq!(backend.name(), language);
        }
    }

    #[test]
    fn unknown_language_is_not_resolved() {
        assert!(for_language("cobol").is_none());
    }

    #[test]
    fn supported_languages_are_sorted() {
        let mut sorted = supported_languages();
        sorted.sort_unstable();
        assert_eq!(sorted, supported_languages());
    }
}
