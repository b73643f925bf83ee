//! Integration tests for transforming existing classes.

use classweave::{prelude::*, Result};

/// A class with one field `x` carrying a `Deprecated` attribute and no methods.
fn single_field_class(context: &ClassFile) -> Result<Vec<u8>> {
    context.build("com/example/Holder", |class| {
        class.with_field("x", "I", &mut |field| {
            field
                .with_flags(FieldAccessFlags::PRIVATE)
                .with_attribute(Attribute::deprecated())?;
            Ok(())
        })
    })
}

/// A class with members, a pool-referencing attribute and an opaque method body.
fn service_class(context: &ClassFile) -> Result<Vec<u8>> {
    context.build("com/example/Service", |class| {
        class.with_flags(ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER)?;
        class.with_interfaces(&["java/lang/Runnable"])?;
        class.with_field("count", "J", &mut |field| {
            field.with_flags(FieldAccessFlags::PRIVATE | FieldAccessFlags::VOLATILE);
            Ok(())
        })?;
        class.with_field("name", "Ljava/lang/String;", &mut |field| {
            field.with_flags(FieldAccessFlags::PRIVATE | FieldAccessFlags::FINAL);
            Ok(())
        })?;
        class.with_method("run", "()V", MethodAccessFlags::PUBLIC, &mut |method| {
            let code: [u8; 13] = [0, 1, 0, 1, 0, 0, 0, 1, 0xb1, 0, 0, 0, 0];
            method.with_attribute(Attribute::unknown("Code", &code))?;
            Ok(())
        })?;
        let source = class.constant_pool().utf8_entry("Service.java")?;
        class.with_attribute(Attribute::source_file(source))
    })
}

/// Appends a `Synthetic` attribute to field `x` after its own attributes.
struct MarkSynthetic;

impl FieldTransform for MarkSynthetic {
    fn accept(
        &mut self,
        builder: &mut BufferedFieldBuilder<'_>,
        element: FieldElement,
    ) -> Result<()> {
        builder.accept(element)?;
        Ok(())
    }

    fn at_end(&mut self, builder: &mut BufferedFieldBuilder<'_>) -> Result<()> {
        if builder.name() == "x" {
            builder.with_attribute(Attribute::synthetic())?;
        }
        Ok(())
    }
}

#[test]
fn test_identity_transform_is_byte_identical() -> Result<()> {
    let context = ClassFile::new();
    let bytes = service_class(&context)?;
    let model = context.parse(&bytes)?;

    for output in [
        context.transform_class(&model, pass_through())?,
        context.transform_class(&model, from_fn(|b, e| b.accept(e)))?,
        context.transform_class(&model, pass_through().and_then(pass_through()))?,
        context.transform_class(&model, ClassTransformChain::new())?,
    ] {
        assert_eq!(output, bytes);
    }
    assert!(!context.diagnostics().has_any());
    Ok(())
}

#[test]
fn test_identity_transform_of_built_model() -> Result<()> {
    let context = ClassFile::new();
    let model = context.build_model("com/example/Built", |class| {
        class.with_field("f", "Z", &mut |_| Ok(()))
    })?;
    let output = context.transform_class(&model, pass_through())?;
    let copy = context.parse(&output)?;

    assert_eq!(copy.constant_pool().raw_entries(), model.constant_pool().raw_entries());
    assert!(copy.fields().iter().all(FieldModel::is_bound));
    Ok(())
}

#[test]
fn test_synthetic_field_scenario() -> Result<()> {
    let context = ClassFile::new();
    let original = context.parse(&single_field_class(&context)?)?;

    let output = context.transform_class(&original, transforming_fields(MarkSynthetic))?;
    let model = context.parse(&output)?;

    assert_eq!(model.fields().len(), 1);
    assert!(model.methods().is_empty());
    let field = &model.fields()[0];
    assert_eq!(field.name(), "x");
    assert_eq!(field.flags(), FieldAccessFlags::PRIVATE);
    assert_eq!(
        field.attributes(),
        [Attribute::deprecated(), Attribute::synthetic()]
    );

    // the original pool is kept as-is and only the new attribute name is appended
    let before = original.constant_pool();
    let after = model.constant_pool();
    assert!(after.raw_entries().starts_with(before.raw_entries()));
    assert_eq!(after.size(), before.size() + 1);
    for (index, constant) in before.iter() {
        assert_eq!(after.get(index), Some(constant));
    }
    assert_eq!(after.utf8(before.size() as u16)?, "Synthetic");
    Ok(())
}

#[test]
fn test_untouched_members_are_copied_verbatim() -> Result<()> {
    let context = ClassFile::new();
    let bytes = service_class(&context)?;
    let model = context.parse(&bytes)?;

    let output = context.transform_class(
        &model,
        transforming_fields(field_fn(|field, element| {
            match element {
                FieldElement::Flags(flags) if field.name() == "count" => {
                    field.with_flags(flags - FieldAccessFlags::VOLATILE);
                }
                other => {
                    field.accept(other)?;
                }
            }
            Ok(())
        })),
    )?;
    let copy = context.parse(&output)?;

    assert_eq!(copy.fields()[0].flags(), FieldAccessFlags::PRIVATE);
    assert_eq!(copy.fields()[1], model.fields()[1]);
    assert_eq!(copy.methods(), model.methods());
    assert_eq!(copy.attributes(), model.attributes());
    assert!(copy
        .constant_pool()
        .raw_entries()
        .starts_with(model.constant_pool().raw_entries()));
    Ok(())
}

#[test]
fn test_can_write_direct_prefix_law() -> Result<()> {
    let context = ClassFile::new();
    let model = context.parse(&service_class(&context)?)?;
    let source = model.constant_pool();

    // extending: O(1) and stays true while the builder grows
    let mut extending = ConstantPoolBuilder::extending(source.clone());
    assert!(extending.can_write_direct(source));
    for value in 0..100 {
        extending.int_entry(value)?;
        assert!(extending.can_write_direct(source));
    }

    // an unrelated pool with the same entries in the same order is a structural prefix
    let mut replica = ConstantPoolBuilder::new();
    for (_, constant) in source.iter() {
        replica.intern(Constant::clone(constant))?;
    }
    assert_eq!(replica.size(), source.size());
    assert!(!replica.is_known_direct(source.id()));
    assert!(replica.can_write_direct(source));
    assert!(replica.is_known_direct(source.id()));
    replica.utf8_entry("appended later")?;
    assert!(replica.can_write_direct(source));

    // a pool missing entries, or holding them at other indices, is not
    let mut shifted = ConstantPoolBuilder::new();
    shifted.utf8_entry("shifts everything")?;
    for (_, constant) in source.iter() {
        shifted.intern(Constant::clone(constant))?;
    }
    assert!(!shifted.can_write_direct(source));
    assert!(!ConstantPoolBuilder::new().can_write_direct(source));
    Ok(())
}

#[test]
fn test_fresh_pool_reencodes_everything() -> Result<()> {
    let source = ClassFile::new();
    let bytes = service_class(&source)?;

    // the opaque method body cannot be remapped, so it is dropped when reading
    let context = ClassFile::with_options(
        ClassFileOptions::fresh_pool().with_unknown_attributes(UnknownAttributes::Drop),
    );
    let model = context.parse(&bytes)?;
    let output = context.transform_class(&model, pass_through())?;
    let copy = context.parse(&output)?;

    assert_eq!(copy.name(), "com/example/Service");
    assert_eq!(copy.interfaces()[0].as_class(), Some("java/lang/Runnable"));
    assert!(copy.fields().iter().all(|f| f.is_bound()));
    let names: Vec<_> = copy.fields().iter().map(FieldModel::name).collect();
    assert_eq!(names, ["count", "name"]);
    match copy.attributes()[0].body() {
        AttributeBody::SourceFile(file) => assert_eq!(file.as_utf8(), Some("Service.java")),
        other => panic!("unexpected attribute {other:?}"),
    }
    assert!(copy.methods()[0].code().is_none());
    assert!(!context.diagnostics().has_warnings());

    let reencoded = context
        .diagnostics()
        .by_category(DiagnosticCategory::ConstantPool);
    assert!(reencoded.iter().any(|d| d.member.as_deref() == Some("count:J")));
    Ok(())
}

#[test]
fn test_fresh_pool_rejects_opaque_method_body() -> Result<()> {
    let bytes = service_class(&ClassFile::new())?;

    let context = ClassFile::with_options(ClassFileOptions::fresh_pool());
    let model = context.parse(&bytes)?;
    assert!(model.methods()[0].code().is_some());

    match context.transform_class(&model, pass_through()) {
        Err(Error::InvalidElement { element, .. }) => {
            assert_eq!(element, "attribute Code of run()V");
        }
        other => panic!("unexpected result {other:?}"),
    }

    // dropping the body in a transform makes the class writable again
    let output = context.transform_class(
        &model,
        transforming_methods(method_fn(|method, element| {
            match element {
                MethodElement::Attribute(attribute) if attribute.name() == "Code" => {}
                other => {
                    method.accept(other)?;
                }
            }
            Ok(())
        })),
    )?;
    let copy = context.parse(&output)?;
    assert_eq!(copy.methods()[0].name(), "run");
    assert!(copy.methods()[0].attributes().is_empty());
    Ok(())
}

#[test]
fn test_policy_applies_during_transform() -> Result<()> {
    let bytes = service_class(&ClassFile::new())?;

    let context = ClassFile::with_options(
        ClassFileOptions::default()
            .with_attribute_policy(AttributePolicy::UpTo(AttributeStability::Stateless)),
    );
    let model = context.parse(&bytes)?;
    let output = context.transform_class(&model, pass_through())?;
    let copy = context.parse(&output)?;

    assert!(copy.attributes().is_empty());
    assert!(copy.methods()[0].attributes().is_empty());
    assert_eq!(copy.fields().len(), 2);
    assert!(context
        .diagnostics()
        .by_category(DiagnosticCategory::Attribute)
        .iter()
        .all(|d| d.severity == DiagnosticSeverity::Info));
    Ok(())
}

#[test]
fn test_transform_all_in_parallel() -> Result<()> {
    let context = ClassFile::new();
    let models = (0..16)
        .map(|i| {
            context.build_model(&format!("com/example/Gen{i}"), |class| {
                class.with_field("value", "I", &mut |_| Ok(()))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let results = context.transform_all(&models, |_| {
        transforming_fields(MarkSynthetic)
            .and_then(ending_with(|b| b.with_attribute(Attribute::deprecated())))
    });
    assert_eq!(results.len(), models.len());
    for (i, result) in results.into_iter().enumerate() {
        let model = context.parse(&result?)?;
        assert_eq!(model.name(), format!("com/example/Gen{i}"));
        assert!(model.fields()[0].attributes().is_empty());
        assert_eq!(model.attributes(), [Attribute::deprecated()]);
    }
    assert!(!context.diagnostics().has_errors());
    Ok(())
}
