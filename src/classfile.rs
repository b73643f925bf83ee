//! The processing context: parse, build and transform entry points.
//!
//! A [`ClassFile`] carries the [`ClassFileOptions`] that govern one family of operations and
//! a shared [`Diagnostics`] collector that every parse, build and transform run through it
//! reports into. It is cheap to share: `&ClassFile` is `Send + Sync`, and
//! [`ClassFile::transform_all`] uses it from several threads at once.

use std::{path::Path, sync::Arc};

use rayon::prelude::*;

use crate::{
    builder::{end_stages, start_stages, ChainedClassBuilder, ClassBuilder, DirectClassBuilder},
    diagnostics::{DiagnosticCategory, Diagnostics},
    model::{reader::read_class, ClassModel},
    options::{ClassFileOptions, PoolSharing},
    pool::ConstantPoolBuilder,
    transform::ClassTransformChain,
    Result,
};

/// Entry point for reading, building and transforming classes.
///
/// # Examples
///
/// ```rust
/// use classweave::prelude::*;
///
/// let context = ClassFile::new();
/// let bytes = context.build("com/example/Empty", |class| {
///     class.with_flags(ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER)
/// })?;
///
/// let model = context.parse(&bytes)?;
/// assert_eq!(model.name(), "com/example/Empty");
///
/// // the identity transform reproduces the input
/// let copy = context.transform_class(&model, pass_through())?;
/// assert_eq!(copy, bytes);
/// # Ok::<(), classweave::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct ClassFile {
    options: ClassFileOptions,
    diagnostics: Arc<Diagnostics>,
}

impl ClassFile {
    /// Creates a context with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a context with `options`.
    #[must_use]
    pub fn with_options(options: ClassFileOptions) -> Self {
        ClassFile {
            options,
            diagnostics: Arc::new(Diagnostics::new()),
        }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &ClassFileOptions {
        &self.options
    }

    /// The diagnostics collected so far.
    ///
    /// The collector accumulates across every operation on this context. Use
    /// [`ClassFile::take_diagnostics`] between batches to start over.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Returns the diagnostics collected so far and replaces them with an empty collector.
    ///
    /// Clones of the previous [`Arc`] keep the returned entries; later operations on this
    /// context report into the new collector only.
    pub fn take_diagnostics(&mut self) -> Arc<Diagnostics> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Parses class-file bytes into a model.
    ///
    /// # Arguments
    ///
    /// * `data` - The complete class file
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Empty`] for empty input, [`crate::Error::OutOfBounds`] for
    /// truncated input, [`crate::Error::InvalidIndex`] for dangling or mistyped pool
    /// references and [`crate::Error::Malformed`] for everything else that cannot be decoded.
    pub fn parse(&self, data: &[u8]) -> Result<ClassModel> {
        read_class(data, self, Vec::new())
    }

    /// Reads and parses a class file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be read, otherwise see
    /// [`ClassFile::parse`].
    pub fn parse_path(&self, path: impl AsRef<Path>) -> Result<ClassModel> {
        let data = std::fs::read(path)?;
        self.parse(&data)
    }

    /// Builds a new class.
    ///
    /// `handler` receives the terminal builder for the class `name` (an internal name such
    /// as `com/example/Point`) and streams elements into it.
    ///
    /// # Arguments
    ///
    /// * `name` - Internal name of the class
    /// * `handler` - Populates the class
    ///
    /// # Returns
    ///
    /// The serialized class file.
    ///
    /// # Errors
    ///
    /// Propagates errors from the handler and from [`DirectClassBuilder::build`].
    pub fn build<F>(&self, name: &str, handler: F) -> Result<Vec<u8>>
    where
        F: FnOnce(&mut DirectClassBuilder<'_>) -> Result<()>,
    {
        let builder = self.direct_builder(name, handler)?;
        builder.build()
    }

    /// Builds a new class and parses the result.
    ///
    /// The returned model's pool is known to extend the pool it was built with, so
    /// transforming it with shared pools copies everything verbatim.
    ///
    /// # Errors
    ///
    /// See [`ClassFile::build`].
    pub fn build_model<F>(&self, name: &str, handler: F) -> Result<ClassModel>
    where
        F: FnOnce(&mut DirectClassBuilder<'_>) -> Result<()>,
    {
        let builder = self.direct_builder(name, handler)?;
        let (bytes, lineage) = builder.finish()?;
        read_class(&bytes, self, lineage)
    }

    fn direct_builder<F>(&self, name: &str, handler: F) -> Result<DirectClassBuilder<'_>>
    where
        F: FnOnce(&mut DirectClassBuilder<'_>) -> Result<()>,
    {
        let mut pool = ConstantPoolBuilder::new();
        let this_class = pool.class_entry(name)?;
        let mut builder = DirectClassBuilder::new(self, pool, &this_class)?;
        handler(&mut builder)?;
        Ok(builder)
    }

    /// Transforms a class.
    ///
    /// The output pool extends the model's pool under [`PoolSharing::Shared`] and starts
    /// empty under [`PoolSharing::New`]. Every stage's `at_start` runs first, in order; then
    /// the model's elements are replayed through the chain; then every stage's `at_end` runs
    /// in order. An empty chain copies the class.
    ///
    /// # Arguments
    ///
    /// * `model` - The class to transform
    /// * `transform` - A single transform or a [`ClassTransformChain`]
    ///
    /// # Returns
    ///
    /// The serialized, transformed class.
    ///
    /// # Errors
    ///
    /// Propagates errors from the transforms and from [`DirectClassBuilder::build`].
    pub fn transform_class<'t>(
        &self,
        model: &ClassModel,
        transform: impl Into<ClassTransformChain<'t>>,
    ) -> Result<Vec<u8>> {
        let mut stages = transform.into().into_stages();
        let pool = match self.options.pool_sharing {
            PoolSharing::Shared => ConstantPoolBuilder::extending(Arc::clone(model.constant_pool())),
            PoolSharing::New => ConstantPoolBuilder::new(),
        };
        let mut builder = DirectClassBuilder::new(self, pool, model.this_class())?;

        start_stages(&mut builder, &mut stages)?;
        {
            let mut chain = ChainedClassBuilder::new(&mut builder, &mut stages);
            for element in model.elements() {
                chain.accept(element)?;
            }
        }
        end_stages(&mut builder, &mut stages)?;

        builder.build()
    }

    /// Transforms independent classes in parallel.
    ///
    /// `make` is called once per model, on the worker that transforms it, so stateful
    /// transforms are never shared between classes. Results keep the order of `models`;
    /// failures are also recorded as diagnostics.
    ///
    /// # Arguments
    ///
    /// * `models` - The classes to transform
    /// * `make` - Creates the transform for one class
    pub fn transform_all<F>(&self, models: &[ClassModel], make: F) -> Vec<Result<Vec<u8>>>
    where
        F: Fn(&ClassModel) -> ClassTransformChain<'static> + Sync,
    {
        models
            .par_iter()
            .map(|model| {
                let result = self.transform_class(model, make(model));
                if let Err(error) = &result {
                    self.diagnostics.error(
                        DiagnosticCategory::Transform,
                        format!("Failed to transform {}: {error}", model.name()),
                    );
                }
                result
            })
            .collect()
    }
}
