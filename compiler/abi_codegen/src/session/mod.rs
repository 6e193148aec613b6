//! Per-run generation state.
//!
//! A `GenSession` is created inside each emission run and dropped with it.
//! Nothing here is `static` or otherwise shared: two concurrent runs over
//! independent manifests each own their caches, which is what makes the
//! crate safe to embed in a long-running service.

use rustc_hash::FxHashSet;

/// Caches owned by a single generation run.
#[derive(Default)]
pub struct GenSession {
    emitted_enums: FxHashSet<String>,
    emitted_delegates: FxHashSet<String>,
    used_paths: FxHashSet<String>,
}

impl GenSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim an enum name for emission. True the first time only; every
    /// later reference reuses the already-emitted definition.
    pub fn claim_enum(&mut self, name: &str) -> bool {
        self.emitted_enums.insert(name.to_string())
    }

    /// Claim a delegate name for emission.
    pub fn claim_delegate(&mut self, name: &str) -> bool {
        self.emitted_delegates.insert(name.to_string())
    }

    /// Claim an output path. A group whose name collides with a shared
    /// unit (a group literally named `enums`, say) must not silently
    /// overwrite it; callers rename on false.
    pub fn claim_path(&mut self, path: &str) -> bool {
        self.used_paths.insert(path.to_string())
    }
}
