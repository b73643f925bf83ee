//! Attributes attached to classes, fields and methods.
//!
//! An [`Attribute`] is a named payload. A handful of kinds are understood structurally and
//! re-encoded when they have to move to a different constant pool; everything else is carried
//! as an opaque [`AttributeBody::Unknown`] payload (the `Code` attribute included).
//!
//! Attributes decoded from a class file remember their exact encoding and the pool it
//! references. Writing such an attribute into a pool that can read the source pool directly
//! copies those bytes unchanged.
//!
//! # Key Components
//!
//! - [`Attribute`] - one attribute, structured body plus optional bound encoding
//! - [`AttributeKind`] - the understood kinds, with [`AttributeStability`] and
//!   [`AttributeLocations`]
//! - [`AttributeHolder`] - the per-builder accumulator that applies the attribute policy

mod codec;
mod holder;

pub(crate) use codec::{read_attributes, write_attributes};
pub use holder::AttributeHolder;

use std::{fmt, str::FromStr, sync::Arc};

use bitflags::bitflags;
use strum::{EnumString, IntoStaticStr};

use crate::pool::{ConstantPool, PoolEntry};

/// How much an attribute's payload depends on its surroundings.
///
/// Ordered from least to most hazardous to copy, so a policy can keep everything up to a
/// threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttributeStability {
    /// No payload or a payload without pool references.
    Stateless,
    /// Payload references constant pool entries only.
    CpRefs,
    /// Payload format unknown; may reference anything.
    Unknown,
}

bitflags! {
    #[derive(PartialEq, Eq, Debug, Clone, Copy)]
    /// Where an attribute kind may appear.
    pub struct AttributeLocations: u8 {
        /// Top level of a class
        const CLASS = 0x01;
        /// On a field
        const FIELD = 0x02;
        /// On a method
        const METHOD = 0x04;
    }
}

/// The attribute kinds with a structured body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr)]
pub enum AttributeKind {
    /// Value of a constant field
    ConstantValue,
    /// Generic signature
    Signature,
    /// Source file name
    SourceFile,
    /// Checked exceptions of a method
    Exceptions,
    /// Compiler-generated marker
    Synthetic,
    /// Deprecation marker
    Deprecated,
    /// Any other attribute
    Unknown,
}

impl AttributeKind {
    /// Classifies an attribute by name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        AttributeKind::from_str(name).unwrap_or(AttributeKind::Unknown)
    }

    /// The attribute name of the kind.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Stability class of the kind.
    #[must_use]
    pub fn stability(self) -> AttributeStability {
        match self {
            AttributeKind::Synthetic | AttributeKind::Deprecated => AttributeStability::Stateless,
            AttributeKind::ConstantValue
            | AttributeKind::Signature
            | AttributeKind::SourceFile
            | AttributeKind::Exceptions => AttributeStability::CpRefs,
            AttributeKind::Unknown => AttributeStability::Unknown,
        }
    }

    /// Locations the kind is valid in.
    #[must_use]
    pub fn locations(self) -> AttributeLocations {
        match self {
            AttributeKind::ConstantValue => AttributeLocations::FIELD,
            AttributeKind::SourceFile => AttributeLocations::CLASS,
            AttributeKind::Exceptions => AttributeLocations::METHOD,
            AttributeKind::Signature
            | AttributeKind::Synthetic
            | AttributeKind::Deprecated
            | AttributeKind::Unknown => AttributeLocations::all(),
        }
    }
}

/// Structured content of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeBody {
    /// Loadable constant (`Integer`, `Float`, `Long`, `Double` or `String`)
    ConstantValue(PoolEntry),
    /// `Utf8` signature
    Signature(PoolEntry),
    /// `Utf8` file name
    SourceFile(PoolEntry),
    /// `Class` entries of the thrown exception types
    Exceptions(Vec<PoolEntry>),
    /// Empty marker
    Synthetic,
    /// Empty marker
    Deprecated,
    /// Opaque payload
    Unknown {
        /// Attribute name
        name: Arc<str>,
        /// Payload, without name and length
        data: Arc<[u8]>,
    },
}

/// The exact encoding of a decoded attribute and the pool it was encoded against.
#[derive(Debug, Clone)]
pub(crate) struct BoundAttribute {
    pub(crate) pool: Arc<ConstantPool>,
    /// Name index, length and payload
    pub(crate) bytes: Arc<[u8]>,
}

/// One attribute.
///
/// Equality compares the structured body only, never the bound encoding.
#[derive(Debug, Clone)]
pub struct Attribute {
    body: AttributeBody,
    bound: Option<BoundAttribute>,
}

impl Attribute {
    /// Creates an attribute from a structured body.
    #[must_use]
    pub fn new(body: AttributeBody) -> Self {
        Attribute { body, bound: None }
    }

    pub(crate) fn bound(body: AttributeBody, pool: Arc<ConstantPool>, bytes: &[u8]) -> Self {
        Attribute {
            body,
            bound: Some(BoundAttribute {
                pool,
                bytes: Arc::from(bytes),
            }),
        }
    }

    /// `Synthetic` marker.
    #[must_use]
    pub fn synthetic() -> Self {
        Self::new(AttributeBody::Synthetic)
    }

    /// `Deprecated` marker.
    #[must_use]
    pub fn deprecated() -> Self {
        Self::new(AttributeBody::Deprecated)
    }

    /// `SourceFile` attribute from a `Utf8` entry.
    #[must_use]
    pub fn source_file(name: PoolEntry) -> Self {
        Self::new(AttributeBody::SourceFile(name))
    }

    /// `Signature` attribute from a `Utf8` entry.
    #[must_use]
    pub fn signature(signature: PoolEntry) -> Self {
        Self::new(AttributeBody::Signature(signature))
    }

    /// `ConstantValue` attribute from a loadable constant entry.
    #[must_use]
    pub fn constant_value(value: PoolEntry) -> Self {
        Self::new(AttributeBody::ConstantValue(value))
    }

    /// `Exceptions` attribute from `Class` entries.
    #[must_use]
    pub fn exceptions(exceptions: Vec<PoolEntry>) -> Self {
        Self::new(AttributeBody::Exceptions(exceptions))
    }

    /// Opaque attribute with an arbitrary name.
    #[must_use]
    pub fn unknown(name: &str, data: &[u8]) -> Self {
        Self::new(AttributeBody::Unknown {
            name: Arc::from(name),
            data: Arc::from(data),
        })
    }

    /// The structured body.
    #[must_use]
    pub fn body(&self) -> &AttributeBody {
        &self.body
    }

    /// The kind of this attribute.
    ///
    /// An opaque attribute whose name happens to match an understood kind still reports
    /// [`AttributeKind::Unknown`].
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        match &self.body {
            AttributeBody::ConstantValue(_) => AttributeKind::ConstantValue,
            AttributeBody::Signature(_) => AttributeKind::Signature,
            AttributeBody::SourceFile(_) => AttributeKind::SourceFile,
            AttributeBody::Exceptions(_) => AttributeKind::Exceptions,
            AttributeBody::Synthetic => AttributeKind::Synthetic,
            AttributeBody::Deprecated => AttributeKind::Deprecated,
            AttributeBody::Unknown { .. } => AttributeKind::Unknown,
        }
    }

    /// The attribute name as written in the class file.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.body {
            AttributeBody::Unknown { name, .. } => name,
            _ => self.kind().name(),
        }
    }

    /// Returns true if the attribute still carries the encoding it was decoded from.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    pub(crate) fn bound_encoding(&self) -> Option<&BoundAttribute> {
        self.bound.as_ref()
    }
}

impl PartialEq for Attribute {
    fn eq(&self, other: &Self) -> bool {
        self.body == other.body
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            AttributeBody::ConstantValue(e)
            | AttributeBody::Signature(e)
            | AttributeBody::SourceFile(e) => write!(f, "{} {}", self.name(), e.constant()),
            AttributeBody::Exceptions(list) => write!(f, "Exceptions [{}]", list.len()),
            AttributeBody::Unknown { name, data } => write!(f, "{name} ({} bytes)", data.len()),
            AttributeBody::Synthetic | AttributeBody::Deprecated => f.write_str(self.name()),
        }
    }
}
