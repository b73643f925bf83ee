use std::iter;

use crate::{
    attribute::Attribute,
    model::{FieldAccessFlags, FieldElement, RawMember},
    pool::PoolEntry,
};

/// An immutable field.
///
/// Fields decoded from a class file keep their exact encoding, which the direct builder copies
/// verbatim when the output pool allows it. Equality ignores that encoding.
#[derive(Debug, Clone)]
pub struct FieldModel {
    flags: FieldAccessFlags,
    name: PoolEntry,
    descriptor: PoolEntry,
    attributes: Vec<Attribute>,
    raw: Option<RawMember>,
}

impl FieldModel {
    pub(crate) fn new(
        flags: FieldAccessFlags,
        name: PoolEntry,
        descriptor: PoolEntry,
        attributes: Vec<Attribute>,
        raw: Option<RawMember>,
    ) -> Self {
        FieldModel {
            flags,
            name,
            descriptor,
            attributes,
            raw,
        }
    }

    /// Access flags.
    #[must_use]
    pub fn flags(&self) -> FieldAccessFlags {
        self.flags
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_utf8().unwrap_or_default()
    }

    /// `Utf8` entry holding the name.
    #[must_use]
    pub fn name_entry(&self) -> &PoolEntry {
        &self.name
    }

    /// Field descriptor, e.g. `I` or `Ljava/lang/String;`.
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

    /// Returns true if the field still carries the encoding it was decoded from.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.raw.is_some()
    }

    pub(crate) fn raw(&self) -> Option<&RawMember> {
        self.raw.as_ref()
    }

    /// Replays the field as elements: flags first, then each attribute.
    ///
    /// Name and descriptor are not elements; they are the identity a builder is created with.
    pub fn elements(&self) -> impl Iterator<Item = FieldElement> + '_ {
        iter::once(FieldElement::Flags(self.flags)).chain(
            self.attributes
                .iter()
                .cloned()
                .map(FieldElement::Attribute),
        )
    }
}

impl PartialEq for FieldModel {
    fn eq(&self, other: &Self) -> bool {
        self.flags == other.flags
            && self.name() == other.name()
            && self.descriptor() == other.descriptor()
            && self.attributes == other.attributes
    }
}
