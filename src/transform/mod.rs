//! Transforms: element-wise rewriting of classes, fields and methods.
//!
//! A transform sees the elements of a model one at a time and decides, for each, what to
//! hand to the builder it is given: the element unchanged, a modified element, several
//! elements, or nothing. `at_start` and `at_end` let a transform inject content before the
//! first and after the last element.
//!
//! Any closure with the right shape is a transform. Use [`from_fn`], [`field_fn`] and
//! [`method_fn`] to fix a closure's signature where inference needs help.
//!
//! Transforms compose with [`ClassTransformExt::and_then`] into a [`ClassTransformChain`], a
//! flat list of stages. Running a chain feeds the output of each stage into the next, with a
//! single [`crate::builder::DirectClassBuilder`] at the end.
//!
//! # Examples
//!
//! ```rust
//! use classweave::prelude::*;
//!
//! let context = ClassFile::new();
//! let bytes = context.build("Foo", |class| {
//!     class.with_field("x", "I", &mut |_| Ok(()))?;
//!     class.with_attribute(Attribute::deprecated())
//! })?;
//! let model = context.parse(&bytes)?;
//!
//! let strip = dropping(|e| matches!(e, ClassElement::Attribute(_)));
//! let mark = transforming_fields(field_fn(|field, element| {
//!     field.accept(element)?;
//!     Ok(())
//! }));
//! let output = context.transform_class(&model, strip.and_then(mark))?;
//! assert!(context.parse(&output)?.attributes().is_empty());
//! # Ok::<(), classweave::Error>(())
//! ```

mod chain;
mod combinators;

pub use chain::{ClassTransformChain, ClassTransformExt};
pub use combinators::{
    dropping, ending_with, pass_through, transforming_fields, transforming_methods, Dropping,
    EndingWith, PassThrough, TransformingFields, TransformingMethods,
};

use crate::{
    builder::{BufferedFieldBuilder, BufferedMethodBuilder, ClassBuilder},
    model::{ClassElement, FieldElement, MethodElement},
    Result,
};

/// A class-level transform.
///
/// `accept` is called once per element of the source class, in model order, between a
/// single `at_start` and a single `at_end`. Everything a transform emits goes into the
/// builder it is handed, which may be the next stage of a chain.
pub trait ClassTransform {
    /// Called before the first element.
    ///
    /// # Errors
    /// Whatever the transform or the downstream builder returns.
    fn at_start(&mut self, _builder: &mut dyn ClassBuilder) -> Result<()> {
        Ok(())
    }

    /// Handles one element.
    ///
    /// # Errors
    /// Whatever the transform or the downstream builder returns.
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()>;

    /// Called after the last element.
    ///
    /// # Errors
    /// Whatever the transform or the downstream builder returns.
    fn at_end(&mut self, _builder: &mut dyn ClassBuilder) -> Result<()> {
        Ok(())
    }
}

impl<F> ClassTransform for F
where
    F: FnMut(&mut dyn ClassBuilder, ClassElement) -> Result<()>,
{
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        self(builder, element)
    }
}

/// A field-level transform, run inside a [`BufferedFieldBuilder`].
pub trait FieldTransform {
    /// Called before the first element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn at_start(&mut self, _builder: &mut BufferedFieldBuilder<'_>) -> Result<()> {
        Ok(())
    }

    /// Handles one element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn accept(&mut self, builder: &mut BufferedFieldBuilder<'_>, element: FieldElement)
        -> Result<()>;

    /// Called after the last element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn at_end(&mut self, _builder: &mut BufferedFieldBuilder<'_>) -> Result<()> {
        Ok(())
    }
}

impl<F> FieldTransform for F
where
    F: FnMut(&mut BufferedFieldBuilder<'_>, FieldElement) -> Result<()>,
{
    fn accept(
        &mut self,
        builder: &mut BufferedFieldBuilder<'_>,
        element: FieldElement,
    ) -> Result<()> {
        self(builder, element)
    }
}

/// A method-level transform, run inside a [`BufferedMethodBuilder`].
pub trait MethodTransform {
    /// Called before the first element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn at_start(&mut self, _builder: &mut BufferedMethodBuilder<'_>) -> Result<()> {
        Ok(())
    }

    /// Handles one element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn accept(
        &mut self,
        builder: &mut BufferedMethodBuilder<'_>,
        element: MethodElement,
    ) -> Result<()>;

    /// Called after the last element.
    ///
    /// # Errors
    /// Whatever the transform or the builder returns.
    fn at_end(&mut self, _builder: &mut BufferedMethodBuilder<'_>) -> Result<()> {
        Ok(())
    }
}

impl<F> MethodTransform for F
where
    F: FnMut(&mut BufferedMethodBuilder<'_>, MethodElement) -> Result<()>,
{
    fn accept(
        &mut self,
        builder: &mut BufferedMethodBuilder<'_>,
        element: MethodElement,
    ) -> Result<()> {
        self(builder, element)
    }
}

/// Fixes the signature of a closure used as a [`ClassTransform`].
pub fn from_fn<F>(f: F) -> F
where
    F: FnMut(&mut dyn ClassBuilder, ClassElement) -> Result<()>,
{
    f
}

/// Fixes the signature of a closure used as a [`FieldTransform`].
pub fn field_fn<F>(f: F) -> F
where
    F: FnMut(&mut BufferedFieldBuilder<'_>, FieldElement) -> Result<()>,
{
    f
}

/// Fixes the signature of a closure used as a [`MethodTransform`].
pub fn method_fn<F>(f: F) -> F
where
    F: FnMut(&mut BufferedMethodBuilder<'_>, MethodElement) -> Result<()>,
{
    f
}
