//! Marshal-category classification.
//!
//! Every parameter and return value crosses the ABI boundary in exactly
//! one way. The category decides whether a value passes directly, pins a
//! view, or goes through the construct/convert/destroy staging protocol.

use abi_ir::Property;

use crate::primitive::Primitive;

/// How a value crosses the native call boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MarshalKind {
    /// Blittable scalar; passed directly, no staging.
    Scalar,
    /// Fixed-size POD aggregate; pinned view for the call's duration.
    Pod,
    /// Text, tagged variant, or any array; staged through
    /// construct → convert → destroy.
    ObjectLike,
    /// Enum; its underlying blittable scalar, optionally via an
    /// enum-specialized conversion entry point.
    Enum,
    /// Function pointer; converted through the platform marshaling call.
    Delegate,
}

impl MarshalKind {
    /// Classify a parameter or return value. Arrays are object-like
    /// regardless of element kind; enum-ness of array elements is visible
    /// separately through the property itself.
    pub fn of(prop: &Property) -> MarshalKind {
        if prop.prototype.is_some() {
            return MarshalKind::Delegate;
        }
        if prop.is_array() {
            return MarshalKind::ObjectLike;
        }
        if prop.enum_.is_some() {
            return MarshalKind::Enum;
        }
        match Primitive::from_name(prop.base_type()) {
            Some(Primitive::String | Primitive::Any) => MarshalKind::ObjectLike,
            Some(p) if p.is_pod() => MarshalKind::Pod,
            Some(Primitive::Function) => MarshalKind::Delegate,
            _ => MarshalKind::Scalar,
        }
    }

    /// True for categories that require staging cleanup after the call.
    pub fn needs_staging(self) -> bool {
        self == MarshalKind::ObjectLike
    }
}
