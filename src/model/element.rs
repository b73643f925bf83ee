use std::fmt;

use crate::{
    attribute::Attribute,
    model::{
        ClassAccessFlags, FieldAccessFlags, FieldModel, MethodAccessFlags, MethodModel,
    },
    pool::PoolEntry,
};

/// One unit of class content, as streamed into a [`crate::builder::ClassBuilder`].
#[derive(Debug, Clone, PartialEq)]
pub enum ClassElement {
    /// Class-file version
    Version {
        /// Major version, e.g. 65 for Java 21
        major: u16,
        /// Minor version
        minor: u16,
    },
    /// Class access flags
    Flags(ClassAccessFlags),
    /// Superclass; must be a `Class` entry
    Superclass(PoolEntry),
    /// Directly implemented interfaces; all `Class` entries
    Interfaces(Vec<PoolEntry>),
    /// A finished field
    Field(FieldModel),
    /// A finished method
    Method(MethodModel),
    /// A class-level attribute
    Attribute(Attribute),
}

impl fmt::Display for ClassElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassElement::Version { major, minor } => write!(f, "version {major}.{minor}"),
            ClassElement::Flags(flags) => write!(f, "class flags 0x{:04x}", flags.bits()),
            ClassElement::Superclass(entry) => write!(f, "superclass {entry}"),
            ClassElement::Interfaces(list) => write!(f, "{} interfaces", list.len()),
            ClassElement::Field(field) => write!(f, "field {}:{}", field.name(), field.descriptor()),
            ClassElement::Method(method) => {
                write!(f, "method {}{}", method.name(), method.descriptor())
            }
            ClassElement::Attribute(attribute) => write!(f, "attribute {}", attribute.name()),
        }
    }
}

/// One unit of field content.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldElement {
    /// Field access flags
    Flags(FieldAccessFlags),
    /// A field attribute
    Attribute(Attribute),
}

/// One unit of method content.
///
/// Bytecode is not modelled; a `Code` attribute travels as an opaque [`Attribute`].
#[derive(Debug, Clone, PartialEq)]
pub enum MethodElement {
    /// Method access flags
    Flags(MethodAccessFlags),
    /// A method attribute
    Attribute(Attribute),
}
