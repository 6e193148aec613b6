//! The closed set of manifest base kinds.

/// A primitive manifest type kind.
///
/// Every base type name a manifest may use without declaring it is listed
/// here. Names outside this set are *custom* references (enums, delegates,
/// or class handles) and are resolved by backend policy, not by this enum.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    Void,
    Bool,
    Char8,
    Char16,
    Int8,
    Int16,
    Int32,
    Int64,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Ptr64,
    Float,
    Double,
    String,
    Any,
    Vec2,
    Vec3,
    Vec4,
    Mat4x4,
    Function,
}

impl Primitive {
    /// Resolve a manifest base type name, without array suffix.
    pub fn from_name(name: &str) -> Option<Primitive> {
        Some(match name {
            "void" => Primitive::Void,
            "bool" => Primitive::Bool,
            "char8" => Primitive::Char8,
            "char16" => Primitive::Char16,
            "int8" => Primitive::Int8,
            "int16" => Primitive::Int16,
            "int32" => Primitive::Int32,
            "int64" => Primitive::Int64,
            "uint8" => Primitive::UInt8,
            "uint16" => Primitive::UInt16,
            "uint32" => Primitive::UInt32,
            "uint64" => Primitive::UInt64,
            "ptr64" => Primitive::Ptr64,
            "float" => Primitive::Float,
            "double" => Primitive::Double,
            "string" => Primitive::String,
            "any" => Primitive::Any,
            "vec2" => Primitive::Vec2,
            "vec3" => Primitive::Vec3,
            "vec4" => Primitive::Vec4,
            "mat4x4" => Primitive::Mat4x4,
            "function" => Primitive::Function,
            _ => return None,
        })
    }

    /// The manifest spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Void => "void",
            Primitive::Bool => "bool",
            Primitive::Char8 => "char8",
            Primitive::Char16 => "char16",
            Primitive::Int8 => "int8",
            Primitive::Int16 => "int16",
            Primitive::Int32 => "int32",
            Primitive::Int64 => "int64",
            Primitive::UInt8 => "uint8",
            Primitive::UInt16 => "uint16",
            Primitive::UInt32 => "uint32",
            Primitive::UInt64 => "uint64",
            Primitive::Ptr64 => "ptr64",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "string",
            Primitive::Any => "any",
            Primitive::Vec2 => "vec2",
            Primitive::Vec3 => "vec3",
            Primitive::Vec4 => "vec4",
            Primitive::Mat4x4 => "mat4x4",
            Primitive::Function => "function",
        }
    }

    /// True for kinds whose values are non-trivial to copy and therefore
    /// pass by read-only reference in `Value` context on backends that
    /// distinguish borrows: text, the tagged variant, and the fixed-size
    /// vector/matrix aggregates.
    pub fn is_object_like(self) -> bool {
        matches!(
            self,
            Primitive::String
                | Primitive::Any
                | Primitive::Vec2
                | Primitive::Vec3
                | Primitive::Vec4
                | Primitive::Mat4x4
        )
    }

    /// True for the plain-old-data aggregates that marshal through a
    /// pinned view rather than heap staging.
    pub fn is_pod(self) -> bool {
        matches!(
            self,
            Primitive::Vec2 | Primitive::Vec3 | Primitive::Vec4 | Primitive::Mat4x4
        )
    }
}
