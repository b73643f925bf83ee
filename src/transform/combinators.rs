use crate::{
    builder::ClassBuilder,
    model::ClassElement,
    transform::{ClassTransform, FieldTransform, MethodTransform},
    Result,
};

/// Forwards every element unchanged. See [`pass_through`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

/// The identity transform.
#[must_use]
pub fn pass_through() -> PassThrough {
    PassThrough
}

impl ClassTransform for PassThrough {
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        builder.accept(element)
    }
}

/// Drops the elements matching a predicate. See [`dropping`].
pub struct Dropping<P> {
    predicate: P,
}

/// Drops every element for which `predicate` returns true and forwards the rest in order.
pub fn dropping<P>(predicate: P) -> Dropping<P>
where
    P: FnMut(&ClassElement) -> bool,
{
    Dropping { predicate }
}

impl<P> ClassTransform for Dropping<P>
where
    P: FnMut(&ClassElement) -> bool,
{
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        if (self.predicate)(&element) {
            return Ok(());
        }
        builder.accept(element)
    }
}

/// Forwards everything, then runs a callback at the end. See [`ending_with`].
pub struct EndingWith<F> {
    finish: F,
}

/// Forwards every element, then lets `finish` add content after the last one.
pub fn ending_with<F>(finish: F) -> EndingWith<F>
where
    F: FnMut(&mut dyn ClassBuilder) -> Result<()>,
{
    EndingWith { finish }
}

impl<F> ClassTransform for EndingWith<F>
where
    F: FnMut(&mut dyn ClassBuilder) -> Result<()>,
{
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        builder.accept(element)
    }

    fn at_end(&mut self, builder: &mut dyn ClassBuilder) -> Result<()> {
        (self.finish)(builder)
    }
}

/// Rewrites every field with a [`FieldTransform`]. See [`transforming_fields`].
pub struct TransformingFields<T> {
    transform: T,
}

/// Lifts a field transform to the class level; non-field elements pass through.
pub fn transforming_fields<T: FieldTransform>(transform: T) -> TransformingFields<T> {
    TransformingFields { transform }
}

impl<T: FieldTransform> ClassTransform for TransformingFields<T> {
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        match element {
            ClassElement::Field(field) => builder.transform_field(&field, &mut self.transform),
            other => builder.accept(other),
        }
    }
}

/// Rewrites every method with a [`MethodTransform`]. See [`transforming_methods`].
pub struct TransformingMethods<T> {
    transform: T,
}

/// Lifts a method transform to the class level; non-method elements pass through.
pub fn transforming_methods<T: MethodTransform>(transform: T) -> TransformingMethods<T> {
    TransformingMethods { transform }
}

impl<T: MethodTransform> ClassTransform for TransformingMethods<T> {
    fn accept(&mut self, builder: &mut dyn ClassBuilder, element: ClassElement) -> Result<()> {
        match element {
            ClassElement::Method(method) => builder.transform_method(&method, &mut self.transform),
            other => builder.accept(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        attribute::Attribute,
        builder::DirectClassBuilder,
        model::{FieldAccessFlags, FieldElement, MethodAccessFlags, MethodElement},
        pool::ConstantPoolBuilder,
        transform::{field_fn, method_fn},
        ClassFile,
    };

    fn terminal(context: &ClassFile) -> DirectClassBuilder<'_> {
        let mut pool = ConstantPoolBuilder::new();
        let this_class = pool.class_entry("Target").unwrap();
        DirectClassBuilder::new(context, pool, &this_class).unwrap()
    }

    #[test]
    fn pass_through_forwards() {
        let context = ClassFile::new();
        let mut class = terminal(&context);
        pass_through()
            .accept(&mut class, ClassElement::Attribute(Attribute::synthetic()))
            .unwrap();
        let model = context.parse(&class.build().unwrap()).unwrap();
        assert_eq!(model.attributes(), [Attribute::synthetic()]);
    }

    #[test]
    fn dropping_filters_matches() {
        let context = ClassFile::new();
        let mut class = terminal(&context);
        let mut drop_deprecated = dropping(|e| {
            matches!(e, ClassElement::Attribute(a) if a.name() == "Deprecated")
        });
        for attribute in [Attribute::deprecated(), Attribute::synthetic()] {
            drop_deprecated
                .accept(&mut class, ClassElement::Attribute(attribute))
                .unwrap();
        }
        let model = context.parse(&class.build().unwrap()).unwrap();
        assert_eq!(model.attributes(), [Attribute::synthetic()]);
    }

    #[test]
    fn ending_with_runs_last() {
        let context = ClassFile::new();
        let mut class = terminal(&context);
        let mut transform = ending_with(|b| b.with_attribute(Attribute::deprecated()));
        transform.at_start(&mut class).unwrap();
        transform
            .accept(&mut class, ClassElement::Attribute(Attribute::synthetic()))
            .unwrap();
        transform.at_end(&mut class).unwrap();
        let model = context.parse(&class.build().unwrap()).unwrap();
        assert_eq!(
            model.attributes(),
            [Attribute::synthetic(), Attribute::deprecated()]
        );
    }

    #[test]
    fn field_and_method_lifting() {
        let context = ClassFile::new();
        let mut source = terminal(&context);
        source
            .with_field("x", "I", &mut |f| {
                f.with_flags(FieldAccessFlags::PRIVATE);
                Ok(())
            })
            .unwrap();
        source
            .with_method("run", "()V", MethodAccessFlags::PUBLIC, &mut |_| Ok(()))
            .unwrap();
        let model = context.parse(&source.build().unwrap()).unwrap();

        let mut fields = transforming_fields(field_fn(|b, e| {
            b.accept(e)?;
            b.accept(FieldElement::Attribute(Attribute::synthetic()))?;
            Ok(())
        }));
        let mut methods = transforming_methods(method_fn(|b, e| {
            if let MethodElement::Flags(flags) = e {
                b.with_flags(flags | MethodAccessFlags::FINAL);
                return Ok(());
            }
            b.accept(e)?;
            Ok(())
        }));

        let mut class = terminal(&context);
        for element in model.elements() {
            match element {
                ClassElement::Field(_) => fields.accept(&mut class, element).unwrap(),
                _ => methods.accept(&mut class, element).unwrap(),
            }
        }
        assert_eq!(class.fields()[0].attributes(), [Attribute::synthetic()]);
        assert_eq!(
            class.methods()[0].flags(),
            MethodAccessFlags::PUBLIC | MethodAccessFlags::FINAL
        );
    }
}
