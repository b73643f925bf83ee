use std::sync::Arc;

use crate::{
    attribute::Attribute,
    model::{ClassAccessFlags, ClassElement, FieldModel, MethodModel},
    pool::{ConstantPool, PoolEntry},
};

/// An immutable class decoded from class-file bytes.
///
/// The model owns an `Arc` of its constant pool. Transforming the model never mutates it; a
/// transformation builds a new class whose pool extends (or replaces) this one, so the same
/// model can feed any number of transforms.
#[derive(Debug, Clone)]
pub struct ClassModel {
    pub(crate) pool: Arc<ConstantPool>,
    pub(crate) major: u16,
    pub(crate) minor: u16,
    pub(crate) flags: ClassAccessFlags,
    pub(crate) this_class: PoolEntry,
    pub(crate) superclass: Option<PoolEntry>,
    pub(crate) interfaces: Vec<PoolEntry>,
    pub(crate) fields: Vec<FieldModel>,
    pub(crate) methods: Vec<MethodModel>,
    pub(crate) attributes: Vec<Attribute>,
}

impl ClassModel {
    /// The class's constant pool.
    #[must_use]
    pub fn constant_pool(&self) -> &Arc<ConstantPool> {
        &self.pool
    }

    /// `(major, minor)` class-file version.
    #[must_use]
    pub fn version(&self) -> (u16, u16) {
        (self.major, self.minor)
    }

    /// Access flags.
    #[must_use]
    pub fn flags(&self) -> ClassAccessFlags {
        self.flags
    }

    /// `Class` entry of this class.
    #[must_use]
    pub fn this_class(&self) -> &PoolEntry {
        &self.this_class
    }

    /// Internal name of this class.
    #[must_use]
    pub fn name(&self) -> &str {
        self.this_class.as_class().unwrap_or_default()
    }

    /// `Class` entry of the superclass; `None` only for `java/lang/Object` and modules.
    #[must_use]
    pub fn superclass(&self) -> Option<&PoolEntry> {
        self.superclass.as_ref()
    }

    /// Directly implemented interfaces.
    #[must_use]
    pub fn interfaces(&self) -> &[PoolEntry] {
        &self.interfaces
    }

    /// Fields in declaration order.
    #[must_use]
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    /// Methods in declaration order.
    #[must_use]
    pub fn methods(&self) -> &[MethodModel] {
        &self.methods
    }

    /// Looks up a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name() == name)
    }

    /// Looks up a method by name and descriptor.
    #[must_use]
    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodModel> {
        self.methods
            .iter()
            .find(|method| method.name() == name && method.descriptor() == descriptor)
    }

    /// Class-level attributes in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Replays the class as a lazy sequence of elements.
    ///
    /// Order: version, flags, superclass (if any), interfaces (if any), fields, methods,
    /// attributes. Replaying into a builder that extends this class's pool reproduces the
    /// class.
    pub fn elements(&self) -> impl Iterator<Item = ClassElement> + '_ {
        let header = [
            Some(ClassElement::Version {
                major: self.major,
                minor: self.minor,
            }),
            Some(ClassElement::Flags(self.flags)),
            self.superclass.clone().map(ClassElement::Superclass),
            (!self.interfaces.is_empty()).then(|| ClassElement::Interfaces(self.interfaces.clone())),
        ];

        header
            .into_iter()
            .flatten()
            .chain(self.fields.iter().cloned().map(ClassElement::Field))
            .chain(self.methods.iter().cloned().map(ClassElement::Method))
            .chain(
                self.attributes
                    .iter()
                    .cloned()
                    .map(ClassElement::Attribute),
            )
    }
}
