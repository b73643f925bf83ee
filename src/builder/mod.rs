//! Builders: the sinks that class elements are streamed into.
//!
//! Every class-level builder implements [`ClassBuilder`]. There are two of them:
//!
//! - [`DirectClassBuilder`] - the terminal sink. It owns the output constant pool and the
//!   class attribute holder, collects members, and serializes the class.
//! - [`ChainedClassBuilder`] - a forwarding sink used inside transformation pipelines. It owns
//!   nothing; each accepted element goes to the next stage, and pool or identity queries go
//!   straight to the terminal.
//!
//! Fields and methods are built out-of-line by [`BufferedFieldBuilder`] and
//! [`BufferedMethodBuilder`], which borrow the terminal's pool and finalize into immutable
//! models.
//!
//! # Examples
//!
//! ```rust
//! use classweave::prelude::*;
//!
//! let bytes = ClassFile::new().build("com/example/Point", |class| {
//!     class.with_flags(ClassAccessFlags::PUBLIC | ClassAccessFlags::FINAL)?;
//!     class.with_field("x", "I", &mut |field| {
//!         field.with_flags(FieldAccessFlags::PRIVATE);
//!         Ok(())
//!     })?;
//!     Ok(())
//! })?;
//! assert_eq!(&bytes[..4], &[0xCA, 0xFE, 0xBA, 0xBE]);
//! # Ok::<(), classweave::Error>(())
//! ```

mod buffered;
mod chained;
mod direct;
mod writer;

pub use buffered::{BufferedFieldBuilder, BufferedMethodBuilder};
pub use chained::ChainedClassBuilder;
pub(crate) use chained::{end_stages, start_stages};
pub use direct::DirectClassBuilder;

use crate::{
    attribute::{Attribute, AttributeHolder, AttributeLocations},
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    model::{ClassAccessFlags, ClassElement, FieldModel, MethodAccessFlags, MethodModel},
    pool::{ConstantPool, ConstantPoolBuilder, PoolEntry},
    transform::{FieldTransform, MethodTransform},
    ClassFile, Error, Result,
};

/// Handler that populates a field builder.
pub type FieldHandler<'h> = dyn FnMut(&mut BufferedFieldBuilder<'_>) -> Result<()> + 'h;

/// Handler that populates a method builder.
pub type MethodHandler<'h> = dyn FnMut(&mut BufferedMethodBuilder<'_>) -> Result<()> + 'h;

/// A sink for class elements.
///
/// Elements may arrive in any order that makes sense for the class: later `Flags` or
/// `Version` elements replace earlier ones, fields and methods are appended in arrival order,
/// and attributes are filtered by the active [`crate::options::AttributePolicy`].
pub trait ClassBuilder {
    /// Accepts one element.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidElement`] for elements that cannot be placed, such as a
    /// superclass that is not a `Class` entry.
    fn accept(&mut self, element: ClassElement) -> Result<()>;

    /// `Class` entry of the class being built.
    fn this_class(&self) -> &PoolEntry;

    /// The output constant pool.
    fn constant_pool(&mut self) -> &mut ConstantPoolBuilder;

    /// Returns true if bytes encoded against `source` can be written unchanged.
    fn can_write_direct(&self, source: &ConstantPool) -> bool;

    /// Builds a field with `handler` and adds it.
    ///
    /// # Errors
    /// Propagates pool and handler errors.
    fn with_field(
        &mut self,
        name: &str,
        descriptor: &str,
        handler: &mut FieldHandler<'_>,
    ) -> Result<()>;

    /// Rebuilds `field` through `transform` and adds the result.
    ///
    /// # Errors
    /// Propagates pool and transform errors.
    fn transform_field(&mut self, field: &FieldModel, transform: &mut dyn FieldTransform)
        -> Result<()>;

    /// Builds a method with `handler` and adds it.
    ///
    /// # Errors
    /// Propagates pool and handler errors.
    fn with_method(
        &mut self,
        name: &str,
        descriptor: &str,
        flags: MethodAccessFlags,
        handler: &mut MethodHandler<'_>,
    ) -> Result<()>;

    /// Rebuilds `method` through `transform` and adds the result.
    ///
    /// # Errors
    /// Propagates pool and transform errors.
    fn transform_method(
        &mut self,
        method: &MethodModel,
        transform: &mut dyn MethodTransform,
    ) -> Result<()>;

    /// Sets the class-file version.
    ///
    /// # Errors
    /// See [`ClassBuilder::accept`].
    fn with_version(&mut self, major: u16, minor: u16) -> Result<()> {
        self.accept(ClassElement::Version { major, minor })
    }

    /// Sets the access flags.
    ///
    /// # Errors
    /// See [`ClassBuilder::accept`].
    fn with_flags(&mut self, flags: ClassAccessFlags) -> Result<()> {
        self.accept(ClassElement::Flags(flags))
    }

    /// Sets the superclass by internal name.
    ///
    /// # Errors
    /// See [`ClassBuilder::accept`].
    fn with_superclass(&mut self, name: &str) -> Result<()> {
        let entry = self.constant_pool().class_entry(name)?;
        self.accept(ClassElement::Superclass(entry))
    }

    /// Sets the implemented interfaces by internal name.
    ///
    /// # Errors
    /// See [`ClassBuilder::accept`].
    fn with_interfaces(&mut self, names: &[&str]) -> Result<()> {
        let entries = names
            .iter()
            .map(|name| self.constant_pool().class_entry(name))
            .collect::<Result<Vec<_>>>()?;
        self.accept(ClassElement::Interfaces(entries))
    }

    /// Adds a class-level attribute.
    ///
    /// # Errors
    /// See [`ClassBuilder::accept`].
    fn with_attribute(&mut self, attribute: Attribute) -> Result<()> {
        self.accept(ClassElement::Attribute(attribute))
    }
}

/// Checks the location of `attribute`, then applies the attribute policy.
///
/// A wrong location is an error; a policy drop is recorded as an Info diagnostic.
pub(crate) fn hold_attribute(
    holder: &mut AttributeHolder,
    attribute: Attribute,
    location: AttributeLocations,
    context: &ClassFile,
    owner: &str,
    builder: &'static str,
) -> Result<()> {
    if !attribute.kind().locations().contains(location) {
        return Err(Error::InvalidElement {
            element: format!("attribute {}", attribute.name()),
            context: builder,
        });
    }

    let name = attribute.name().to_string();
    if !holder.add(attribute, context.options()) {
        record_drop(context, &name, owner);
    }
    Ok(())
}

pub(crate) fn record_drop(context: &ClassFile, attribute: &str, owner: &str) {
    context.diagnostics().push(Diagnostic::new(
        DiagnosticSeverity::Info,
        DiagnosticCategory::Attribute,
        format!("Dropped attribute {attribute} of {owner} by policy"),
    ));
}
