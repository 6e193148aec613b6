//! Call-boundary marshaling plans for managed-runtime backends.
//!
//! A [`CallPlan`] fixes, per method, which parameters pin, which stage,
//! and what the return slot needs, before any text is rendered. Emitters
//! then walk the plan in the one ordering that is correct for every call,
//! outermost to innermost:
//!
//! ```text
//! declare result locals
//!   open pinned/fixed scopes (POD and scalar refs)
//!     construct object-like staging locals
//!       guarded region (only if cleanup actions exist)
//!         native call
//!         unmarshal: staging → managed (size + data for arrays)
//!       guaranteed cleanup: destroy staging
//!     close pinned scopes, innermost first
//! return
//! ```
//!
//! Destruction of staging is unconditional once constructed, even when the
//! conversion step fails, so no native allocation outlives the call.

use abi_ir::{Method, Property};
use abi_types::MarshalKind;

/// Per-backend staging function tables.
///
/// Each hook names the runtime entry point for a property's shape, or
/// `None` when the shape does not participate in that phase. The property
/// is passed whole so implementations can specialize on array-ness and
/// enum-ness.
pub trait StagingHooks {
    /// Builds the transient native staging value before the call.
    fn construct_fn(&self, prop: &Property) -> Option<String>;
    /// Converts staging data into the managed representation.
    fn data_fn(&self, prop: &Property) -> Option<String>;
    /// Array element count of a staging vector.
    fn size_fn(&self, prop: &Property) -> Option<String>;
    /// Releases the staging value. Must exist for every shape that
    /// `construct_fn` covers.
    fn destroy_fn(&self, prop: &Property) -> Option<String>;
    /// Native staging value type for object-like return slots.
    fn staging_type(&self, prop: &Property) -> Option<String>;
}

/// An object-like parameter that stages through construct/destroy.
pub struct StagedParam<'m> {
    pub prop: &'m Property,
    pub construct: String,
    pub destroy: String,
    /// Present when the parameter is `ref` and must be read back.
    pub data: Option<String>,
    /// Present for arrays: element count for the read-back resize.
    pub size: Option<String>,
}

/// The return slot's staging requirements.
pub struct RetStaging {
    pub staging_type: String,
    pub data: String,
    pub size: Option<String>,
    pub destroy: String,
}

/// The marshaling layout of one native call.
pub struct CallPlan<'m> {
    pub method: &'m Method,
    pub has_return: bool,
    pub ret_kind: MarshalKind,
    /// Parameters pinned for the call's duration: `ref` flagged, but not
    /// object-like (scalars, PODs, enums). No heap allocation.
    pub pinned: Vec<&'m Property>,
    /// Object-like parameters staged through construct → destroy.
    pub staged: Vec<StagedParam<'m>>,
    /// Staging for an object-like return value.
    pub ret_staging: Option<RetStaging>,
}

impl<'m> CallPlan<'m> {
    /// Lay out the call for `method` against a backend's staging tables.
    pub fn build(method: &'m Method, hooks: &dyn StagingHooks) -> CallPlan<'m> {
        let has_return = method.ret_type.ty != "void";
        let ret_kind = MarshalKind::of(&method.ret_type);

        let mut pinned = Vec::new();
        let mut staged = Vec::new();

        for param in &method.param_types {
            let kind = MarshalKind::of(param);
            if kind.needs_staging() {
                if let (Some(construct), Some(destroy)) =
                    (hooks.construct_fn(param), hooks.destroy_fn(param))
                {
                    staged.push(StagedParam {
                        prop: param,
                        construct,
                        destroy,
                        data: param.is_ref.then(|| hooks.data_fn(param)).flatten(),
                        size: param.is_ref.then(|| hooks.size_fn(param)).flatten(),
                    });
                }
            } else if param.is_ref {
                pinned.push(param);
            }
        }

        let ret_staging = if has_return && ret_kind.needs_staging() {
            match (
                hooks.staging_type(&method.ret_type),
                hooks.data_fn(&method.ret_type),
                hooks.destroy_fn(&method.ret_type),
            ) {
                (Some(staging_type), Some(data), Some(destroy)) => Some(RetStaging {
                    staging_type,
                    data,
                    size: hooks.size_fn(&method.ret_type),
                    destroy,
                }),
                _ => None,
            }
        } else {
            None
        };

        CallPlan {
            method,
            has_return,
            ret_kind,
            pinned,
            staged,
            ret_staging,
        }
    }

    /// Whether any cleanup action exists. Without one, no guarded region
    /// is emitted at all.
    pub fn needs_guard(&self) -> bool {
        self.ret_staging.is_some() || !self.staged.is_empty()
    }

    /// Whether the managed result local is declared ahead of the pinned
    /// scopes rather than at the call itself.
    pub fn declares_ret_early(&self) -> bool {
        self.has_return
            && (self.ret_staging.is_some() || self.needs_guard() || !self.pinned.is_empty())
    }

    /// Staged `ref` parameters that must be read back after the call.
    pub fn ref_unmarshals(&self) -> impl Iterator<Item = &StagedParam<'m>> {
        self.staged.iter().filter(|s| s.prop.is_ref && s.data.is_some())
    }
}
