use crate::{
    builder::{ClassBuilder, DirectClassBuilder, FieldHandler, MethodHandler},
    model::{ClassElement, FieldModel, MethodAccessFlags, MethodModel},
    pool::{ConstantPool, ConstantPoolBuilder, PoolEntry},
    transform::{ClassTransform, FieldTransform, MethodTransform},
    Result,
};

/// A forwarding builder inside a transformation pipeline.
///
/// A chained builder is what a transform stage writes into. It holds the terminal
/// [`DirectClassBuilder`] and the stages that come after the current one. Accepting an
/// element hands it to the next stage, together with a chained builder for the stages after
/// that; with no stage left, the element reaches the terminal.
///
/// The terminal is a direct reference taken when the chain is constructed, so pool and
/// identity queries cost the same at any depth, and a chain without a terminal cannot be
/// expressed. Nothing is buffered: an element is forwarded before `accept` returns.
pub struct ChainedClassBuilder<'s, 'a> {
    terminal: &'s mut DirectClassBuilder<'a>,
    downstream: &'s mut [Box<dyn ClassTransform + 'a>],
}

impl<'s, 'a> ChainedClassBuilder<'s, 'a> {
    /// Creates a builder that feeds `downstream` in order, then `terminal`.
    pub fn new(
        terminal: &'s mut DirectClassBuilder<'a>,
        downstream: &'s mut [Box<dyn ClassTransform + 'a>],
    ) -> Self {
        ChainedClassBuilder {
            terminal,
            downstream,
        }
    }

    /// Number of stages between this builder and the terminal.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.downstream.len()
    }

    /// The terminal builder.
    pub fn terminal(&mut self) -> &mut DirectClassBuilder<'a> {
        self.terminal
    }
}

impl ClassBuilder for ChainedClassBuilder<'_, '_> {
    fn accept(&mut self, element: ClassElement) -> Result<()> {
        match self.downstream.split_first_mut() {
            None => self.terminal.accept(element),
            Some((next, rest)) => {
                let mut downstream = ChainedClassBuilder::new(&mut *self.terminal, rest);
                next.accept(&mut downstream, element)
            }
        }
    }

    fn this_class(&self) -> &PoolEntry {
        self.terminal.this_class()
    }

    fn constant_pool(&mut self) -> &mut ConstantPoolBuilder {
        self.terminal.constant_pool()
    }

    fn can_write_direct(&self, source: &ConstantPool) -> bool {
        self.terminal.can_write_direct(source)
    }

    fn with_field(
        &mut self,
        name: &str,
        descriptor: &str,
        handler: &mut FieldHandler<'_>,
    ) -> Result<()> {
        let field = self.terminal.build_field(name, descriptor, handler)?;
        self.accept(ClassElement::Field(field))
    }

    fn transform_field(
        &mut self,
        field: &FieldModel,
        transform: &mut dyn FieldTransform,
    ) -> Result<()> {
        let field = self.terminal.rebuild_field(field, transform)?;
        self.accept(ClassElement::Field(field))
    }

    fn with_method(
        &mut self,
        name: &str,
        descriptor: &str,
        flags: MethodAccessFlags,
        handler: &mut MethodHandler<'_>,
    ) -> Result<()> {
        let method = self.terminal.build_method(name, descriptor, flags, handler)?;
        self.accept(ClassElement::Method(method))
    }

    fn transform_method(
        &mut self,
        method: &MethodModel,
        transform: &mut dyn MethodTransform,
    ) -> Result<()> {
        let method = self.terminal.rebuild_method(method, transform)?;
        self.accept(ClassElement::Method(method))
    }
}

/// Runs `at_start` of every stage in order, each writing into the stages after it.
pub(crate) fn start_stages<'a>(
    terminal: &mut DirectClassBuilder<'a>,
    stages: &mut [Box<dyn ClassTransform + 'a>],
) -> Result<()> {
    let mut remaining = stages;
    while let Some((stage, rest)) = std::mem::take(&mut remaining).split_first_mut() {
        stage.at_start(&mut ChainedClassBuilder::new(&mut *terminal, &mut *rest))?;
        remaining = rest;
    }
    Ok(())
}

/// Runs `at_end` of every stage in order, each writing into the stages after it.
pub(crate) fn end_stages<'a>(
    terminal: &mut DirectClassBuilder<'a>,
    stages: &mut [Box<dyn ClassTransform + 'a>],
) -> Result<()> {
    let mut remaining = stages;
    while let Some((stage, rest)) = std::mem::take(&mut remaining).split_first_mut() {
        stage.at_end(&mut ChainedClassBuilder::new(&mut *terminal, &mut *rest))?;
        remaining = rest;
    }
    Ok(())
}
