use std::iter;

use crate::{
    attribute::{Attribute, AttributeBody},
    model::{MethodAccessFlags, MethodElement, RawMember},
    pool::PoolEntry,
};

/// An immutable method.
///
/// Bytecode is carried inside the opaque `Code` attribute. Like fields, decoded methods keep
/// their exact encoding for verbatim reuse, and equality ignores it.
#[derive(Debug, Clone)]
pub struct MethodModel {
    flags: MethodAccessFlags,
    name: PoolEntry,
    descriptor: PoolEntry,
    attributes: Vec<Attribute>,
    raw: Option<RawMember>,
}

impl MethodModel {
    pub(crate) fn new(
        flags: MethodAccessFlags,
        name: PoolEntry,
        descriptor: PoolEntry,
        attributes: Vec<Attribute>,
        raw: Option<RawMember>,
    ) -> Self {
        MethodModel {
            flags,
            name,
            descriptor,
            attributes,
            raw,
        }
    }

    /// Access flags.
    #[must_use]
    pub fn flags(&self) -> MethodAccessFlags {
        self.flags
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_utf8().unwrap_or_default()
    }

    /// `Utf8` entry holding the name.
    #[must_use]
    pub fn name_entry(&self) -> &PoolEntry {
        &self.name
    }

    /// Method descriptor, e.g. `(I)V`.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        self.descriptor.as_utf8().unwrap_or_default()
    }

    /// `Utf8` entry holding the descriptor.
    #[must_use]
    pub fn descriptor_entry(&self) -> &PoolEntry {
        &self.descriptor
    }

    /// Attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// The opaque `Code` attribute, if the method has a body.
    #[must_use]
    pub fn code(&self) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| {
            matches!(attribute.body(), AttributeBody::Unknown { name, .. } if &**name == "Code")
        })
    }

    /// Returns true if the method still carries the encoding it was decoded from.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.raw.is_some()
    }

    pub(crate) fn raw(&self) -> Option<&RawMember> {
        self.raw.as_ref()
    }

    /// Replays the method as elements: flags first, then each attribute.
    pub fn elements(&self) -> impl Iterator<Item = MethodElement> + '_ {
        iter::once(MethodElement::Flags(self.flags)).chain(
            self.attributes
                .iter()
                .cloned()
                .map(MethodElement::Attribute),
        )
    }
}

impl PartialEq for MethodModel {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags
            && self.name() == other.name()
            && self.descriptor() == other.descriptor()
            && self.attributes == other.attributes
    }
}
