//! abigen IR - Manifest Representation
//!
//! This crate contains the input-side data structures for the abigen
//! compiler:
//! - The manifest IR (`Manifest`, `Method`, `Property`, `Class`, ...)
//! - JSON parsing and total validation
//! - The identifier-sanitization pass and the `NamingPolicy` seam
//!
//! The IR is built once per generation run, is read-only during emission
//! (apart from the sanitization pass applied up front), and is discarded
//! afterwards. Nothing in this crate holds process-global state.

pub mod manifest;
pub mod parse;
pub mod sanitize;

pub use manifest::{
    BindAlias, Binding, Class, Dependency, EnumDef, EnumValue, Manifest, Method, Property,
    Prototype,
};
pub use parse::ManifestError;
pub use sanitize::{IdentityPolicy, NamingPolicy, DEFAULT_GROUP};
