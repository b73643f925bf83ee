//! Integration tests for transform chains.

use std::{cell::RefCell, rc::Rc};

use classweave::{prelude::*, Result};

fn sample(context: &ClassFile) -> Result<ClassModel> {
    context.build_model("com/example/Sample", |class| {
        class.with_field("a", "I", &mut |field| {
            field.with_attribute(Attribute::synthetic())?;
            Ok(())
        })?;
        class.with_field("b", "J", &mut |_| Ok(()))?;
        class.with_method("go", "()V", MethodAccessFlags::PUBLIC, &mut |method| {
            method.with_attribute(Attribute::deprecated())?;
            Ok(())
        })?;
        class.with_attribute(Attribute::synthetic())
    })
}

/// Makes every field final.
fn finalize_fields() -> impl ClassTransform {
    transforming_fields(field_fn(|field, element| {
        match element {
            FieldElement::Flags(flags) => {
                field.with_flags(flags | FieldAccessFlags::FINAL);
            }
            other => {
                field.accept(other)?;
            }
        }
        Ok(())
    }))
}

/// Removes class-level `Synthetic` and adds a field; two stages.
fn restructure() -> ClassTransformChain<'static> {
    let strip = dropping(|e| matches!(e, ClassElement::Attribute(a) if a.name() == "Synthetic"));
    strip.and_then(ending_with(|b| {
        b.with_field("added", "Z", &mut |field| {
            field.with_flags(FieldAccessFlags::PUBLIC);
            Ok(())
        })
    }))
}

/// Deprecates the class.
fn deprecate() -> impl ClassTransform {
    ending_with(|b| b.with_attribute(Attribute::deprecated()))
}

/// The observable content of a class, independent of pool layout.
fn summary(context: &ClassFile, bytes: &[u8]) -> Result<Vec<String>> {
    let model = context.parse(bytes)?;
    let mut out = vec![format!("{} {:?}", model.name(), model.flags())];
    for field in model.fields() {
        let attributes: Vec<_> = field.attributes().iter().map(Attribute::name).collect();
        out.push(format!(
            "field {}:{} {:?} {:?}",
            field.name(),
            field.descriptor(),
            field.flags(),
            attributes
        ));
    }
    for method in model.methods() {
        let attributes: Vec<_> = method.attributes().iter().map(Attribute::name).collect();
        out.push(format!("method {}{} {:?}", method.name(), method.descriptor(), attributes));
    }
    let attributes: Vec<_> = model.attributes().iter().map(Attribute::name).collect();
    out.push(format!("class {attributes:?}"));
    Ok(out)
}

#[test]
fn test_chain_matches_materialized_steps() -> Result<()> {
    let context = ClassFile::new();
    let model = sample(&context)?;

    let step1 = context.transform_class(&model, finalize_fields())?;
    let step2 = context.transform_class(&context.parse(&step1)?, restructure())?;
    let step3 = context.transform_class(&context.parse(&step2)?, deprecate())?;
    let materialized = summary(&context, &step3)?;

    let left = finalize_fields()
        .and_then(restructure())
        .and_then(deprecate());
    let right = finalize_fields().and_then(restructure().and_then(deprecate()));
    assert_eq!(left.len(), 4);
    assert_eq!(right.len(), 4);

    let left = context.transform_class(&model, left)?;
    let right = context.transform_class(&model, right)?;
    assert_eq!(summary(&context, &left)?, materialized);
    assert_eq!(summary(&context, &right)?, materialized);
    assert_eq!(left, right);

    // the added field enters after finalize_fields and so is not final
    assert!(materialized.contains(&format!(
        "field added:Z {:?} []",
        FieldAccessFlags::PUBLIC
    )));
    Ok(())
}

#[test]
fn test_stages_see_upstream_output_only() -> Result<()> {
    let context = ClassFile::new();
    let model = sample(&context)?;
    let log = Rc::new(RefCell::new(Vec::new()));

    let observe = |stage: &'static str| {
        let log = Rc::clone(&log);
        from_fn(move |b, e| {
            log.borrow_mut().push(format!("{stage}: {e}"));
            b.accept(e)
        })
    };
    let chain = observe("first")
        .and_then(dropping(|e| matches!(e, ClassElement::Method(_))))
        .and_then(observe("second"));
    context.transform_class(&model, chain)?;

    let log = log.borrow();
    assert!(log.iter().any(|line| line == "first: method go()V"));
    assert!(!log.iter().any(|line| line == "second: method go()V"));
    let first: Vec<_> = log.iter().filter(|l| l.starts_with("first")).collect();
    let second: Vec<_> = log.iter().filter(|l| l.starts_with("second")).collect();
    assert_eq!(first.len(), second.len() + 1);
    Ok(())
}

#[test]
fn test_injected_members_flow_downstream() -> Result<()> {
    let context = ClassFile::new();
    let model = sample(&context)?;

    let inject = from_fn(|b, e| {
        let is_method = matches!(e, ClassElement::Method(_));
        b.accept(e)?;
        if is_method {
            b.with_method("helper", "()V", MethodAccessFlags::PRIVATE, &mut |_| Ok(()))?;
        }
        Ok(())
    });
    let check_owner = from_fn(|b, e| {
        // the downstream stage sees the injected method as a finished model
        if let ClassElement::Method(method) = &e {
            if method.name() == "helper" {
                let this_class = b.this_class().as_class().unwrap_or_default().to_string();
                assert_eq!(this_class, "com/example/Sample");
            }
        }
        b.accept(e)
    });
    let output = context.transform_class(&model, inject.and_then(check_owner))?;
    let copy = context.parse(&output)?;

    let methods: Vec<_> = copy.methods().iter().map(MethodModel::name).collect();
    assert_eq!(methods, ["go", "helper"]);
    Ok(())
}

#[test]
fn test_stage_errors_abort_the_transform() -> Result<()> {
    let context = ClassFile::new();
    let model = sample(&context)?;
    let failing = from_fn(|_, e| match e {
        ClassElement::Method(_) => Err(Error::InvalidElement {
            element: e.to_string(),
            context: "test stage",
        }),
        _ => Ok(()),
    });
    let result = context.transform_class(&model, pass_through().and_then(failing));
    assert!(matches!(result, Err(Error::InvalidElement { .. })));
    Ok(())
}
