use crate::{
    attribute::{Attribute, AttributeHolder, AttributeLocations},
    builder::hold_attribute,
    model::{
        FieldAccessFlags, FieldElement, FieldModel, MethodAccessFlags, MethodElement,
        MethodModel,
    },
    pool::{ConstantPoolBuilder, PoolEntry},
    transform::{FieldTransform, MethodTransform},
    ClassFile, Result,
};

/// Builds one field out-of-line, then yields an immutable [`FieldModel`].
///
/// The builder borrows the constant pool of the class it will be added to, so every entry it
/// interns is valid in the final class. It owns its own attribute holder.
///
/// Builders are normally lent to a handler as `&mut` (see
/// [`crate::builder::ClassBuilder::with_field`]); a `&mut` cannot outlive the handler, and
/// [`BufferedFieldBuilder::to_model`] consumes the builder, so a finished builder cannot be
/// finalized again or mutated.
pub struct BufferedFieldBuilder<'p> {
    pool: &'p mut ConstantPoolBuilder,
    context: &'p ClassFile,
    name: PoolEntry,
    descriptor: PoolEntry,
    flags: FieldAccessFlags,
    attributes: AttributeHolder,
}

impl<'p> BufferedFieldBuilder<'p> {
    /// Creates a builder for the field `name` with `descriptor`; both must be `Utf8` entries of
    /// `pool`.
    pub fn new(
        pool: &'p mut ConstantPoolBuilder,
        context: &'p ClassFile,
        name: PoolEntry,
        descriptor: PoolEntry,
    ) -> Self {
        BufferedFieldBuilder {
            pool,
            context,
            name,
            descriptor,
            flags: FieldAccessFlags::empty(),
            attributes: AttributeHolder::new(),
        }
    }

    /// Field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_utf8().unwrap_or_default()
    }

    /// Field descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        self.descriptor.as_utf8().unwrap_or_default()
    }

    /// The pool of the enclosing class.
    pub fn constant_pool(&mut self) -> &mut ConstantPoolBuilder {
        self.pool
    }

    /// Accepts one element.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidElement`] for attributes that cannot appear on a field.
    pub fn accept(&mut self, element: FieldElement) -> Result<&mut Self> {
        match element {
            FieldElement::Flags(flags) => self.flags = flags,
            FieldElement::Attribute(attribute) => {
                let owner = format!("{}:{}", self.name(), self.descriptor());
                hold_attribute(
                    &mut self.attributes,
                    attribute,
                    AttributeLocations::FIELD,
                    self.context,
                    &owner,
                    "field builder",
                )?;
            }
        }
        Ok(self)
    }

    /// Sets the access flags.
    pub fn with_flags(&mut self, flags: FieldAccessFlags) -> &mut Self {
        self.flags = flags;
        self
    }

    /// Adds an attribute.
    ///
    /// # Errors
    /// See [`BufferedFieldBuilder::accept`].
    pub fn with_attribute(&mut self, attribute: Attribute) -> Result<&mut Self> {
        self.accept(FieldElement::Attribute(attribute))
    }

    /// Runs `handler` against this builder and returns it for finalization.
    ///
    /// # Errors
    /// Propagates the handler's error.
    pub fn run<F>(mut self, handler: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        handler(&mut self)?;
        Ok(self)
    }

    /// Replays every element of `model` through `transform` into this builder.
    ///
    /// # Errors
    /// Propagates errors from the transform and from [`BufferedFieldBuilder::accept`].
    pub fn transform(&mut self, model: &FieldModel, transform: &mut dyn FieldTransform) -> Result<()> {
        transform.at_start(self)?;
        for element in model.elements() {
            transform.accept(self, element)?;
        }
        transform.at_end(self)
    }

    /// Finalizes the builder into an immutable field.
    #[must_use]
    pub fn to_model(self) -> FieldModel {
        FieldModel::new(
            self.flags,
            self.name,
            self.descriptor,
            self.attributes.into_vec(),
            None,
        )
    }
}

/// Builds one method out-of-line, then yields an immutable [`MethodModel`].
///
/// When the builder transforms an existing method it is seeded with that method: its flags
/// become the defaults and [`BufferedMethodBuilder::original`] exposes it to transforms.
pub struct BufferedMethodBuilder<'p> {
    pool: &'p mut ConstantPoolBuilder,
    context: &'p ClassFile,
    name: PoolEntry,
    descriptor: PoolEntry,
    flags: MethodAccessFlags,
    original: Option<&'p MethodModel>,
    attributes: AttributeHolder,
}

impl<'p> BufferedMethodBuilder<'p> {
    /// Creates a builder for the method `name` with `descriptor`; both must be `Utf8` entries
    /// of `pool`.
    pub fn new(
        pool: &'p mut ConstantPoolBuilder,
        context: &'p ClassFile,
        name: PoolEntry,
        descriptor: PoolEntry,
        flags: MethodAccessFlags,
        original: Option<&'p MethodModel>,
    ) -> Self {
        BufferedMethodBuilder {
            pool,
            context,
            name,
            descriptor,
            flags,
            original,
            attributes: AttributeHolder::new(),
        }
    }

    /// Method name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_utf8().unwrap_or_default()
    }

    /// Method descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        self.descriptor.as_utf8().unwrap_or_default()
    }

    /// Current access flags.
    #[must_use]
    pub fn flags(&self) -> MethodAccessFlags {
        self.flags
    }

    /// The method being transformed, if any.
    #[must_use]
    pub fn original(&self) -> Option<&'p MethodModel> {
        self.original
    }

    /// The pool of the enclosing class.
    pub fn constant_pool(&mut self) -> &mut ConstantPoolBuilder {
        self.pool
    }

    /// Accepts one element.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidElement`] for attributes that cannot appear on a method.
    pub fn accept(&mut self, element: MethodElement) -> Result<&mut Self> {
        match element {
            MethodElement::Flags(flags) => self.flags = flags,
            MethodElement::Attribute(attribute) => {
                let owner = format!("{}{}", self.name(), self.descriptor());
                hold_attribute(
                    &mut self.attributes,
                    attribute,
                    AttributeLocations::METHOD,
                    self.context,
                    &owner,
                    "method builder",
                )?;
            }
        }
        Ok(self)
    }

    /// Sets the access flags.
    pub fn with_flags(&mut self, flags: MethodAccessFlags) -> &mut Self {
        self.flags = flags;
        self
    }

    /// Adds an attribute.
    ///
    /// # Errors
    /// See [`BufferedMethodBuilder::accept`].
    pub fn with_attribute(&mut self, attribute: Attribute) -> Result<&mut Self> {
        self.accept(MethodElement::Attribute(attribute))
    }

    /// Runs `handler` against this builder and returns it for finalization.
    ///
    /// # Errors
    /// Propagates the handler's error.
    pub fn run<F>(mut self, handler: F) -> Result<Self>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        handler(&mut self)?;
        Ok(self)
    }

    /// Replays every element of `model` through `transform` into this builder.
    ///
    /// # Errors
    /// Propagates errors from the transform and from [`BufferedMethodBuilder::accept`].
    pub fn transform(
        &mut self,
        model: &MethodModel,
        transform: &mut dyn MethodTransform,
    ) -> Result<()> {
        transform.at_start(self)?;
        for element in model.elements() {
            transform.accept(self, element)?;
        }
        transform.at_end(self)
    }

    /// Finalizes the builder into an immutable method.
    #[must_use]
    pub fn to_model(self) -> MethodModel {
        MethodModel::new(
            self.flags,
            self.name,
            self.descriptor,
            self.attributes.into_vec(),
            None,
        )
    }
}
