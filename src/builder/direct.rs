use crate::{
    attribute::{Attribute, AttributeHolder, AttributeLocations},
    builder::{
        hold_attribute, record_drop, writer::ClassWriter, BufferedFieldBuilder,
        BufferedMethodBuilder, ClassBuilder, FieldHandler, MethodHandler,
    },
    model::{ClassAccessFlags, ClassElement, FieldModel, MethodAccessFlags, MethodModel},
    pool::{ConstantPool, ConstantPoolBuilder, PoolEntry, PoolId},
    transform::{FieldTransform, MethodTransform},
    ClassFile, Error, Result,
};

/// Class-file version written when no `Version` element was accepted (Java 21).
pub const DEFAULT_VERSION: (u16, u16) = (65, 0);

const OBJECT: &str = "java/lang/Object";

/// The terminal builder of a class.
///
/// Owns the output [`ConstantPoolBuilder`], the class-level [`AttributeHolder`] and the list
/// of finished members, and serializes them with [`DirectClassBuilder::build`]. Every build or
/// transform ends in exactly one direct builder.
///
/// Defaults: version 65.0, `ACC_PUBLIC`, superclass `java/lang/Object` (unless the class is
/// `java/lang/Object` itself or a module).
pub struct DirectClassBuilder<'a> {
    context: &'a ClassFile,
    pool: ConstantPoolBuilder,
    this_class: PoolEntry,
    version: Option<(u16, u16)>,
    flags: ClassAccessFlags,
    superclass: Option<PoolEntry>,
    interfaces: Vec<PoolEntry>,
    fields: Vec<FieldModel>,
    methods: Vec<MethodModel>,
    attributes: AttributeHolder,
}

impl<'a> DirectClassBuilder<'a> {
    /// Creates a builder for the class `this_class`, which must be a `Class` entry of `pool`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidElement`] if `this_class` is not a `Class` entry.
    pub fn new(
        context: &'a ClassFile,
        mut pool: ConstantPoolBuilder,
        this_class: &PoolEntry,
    ) -> Result<Self> {
        if this_class.as_class().is_none() {
            return Err(Error::InvalidElement {
                element: format!("this class {this_class}"),
                context: "class builder",
            });
        }
        let this_class = pool.map_entry(this_class)?;
        Ok(DirectClassBuilder {
            context,
            pool,
            this_class,
            version: None,
            flags: ClassAccessFlags::PUBLIC,
            superclass: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: AttributeHolder::new(),
        })
    }

    /// The processing context this builder works for.
    #[must_use]
    pub fn context(&self) -> &'a ClassFile {
        self.context
    }

    /// Internal name of the class being built.
    #[must_use]
    pub fn name(&self) -> &str {
        self.this_class.as_class().unwrap_or_default()
    }

    /// Fields accepted so far.
    #[must_use]
    pub fn fields(&self) -> &[FieldModel] {
        &self.fields
    }

    /// Methods accepted so far.
    #[must_use]
    pub fn methods(&self) -> &[MethodModel] {
        &self.methods
    }

    /// Adds a class-level attribute after checking its location and the attribute policy.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidElement`] for attributes that cannot appear on a class.
    pub fn write_attribute(&mut self, attribute: Attribute) -> Result<()> {
        let owner = self.name().to_string();
        hold_attribute(
            &mut self.attributes,
            attribute,
            AttributeLocations::CLASS,
            self.context,
            &owner,
            "class builder",
        )
    }

    pub(crate) fn field_builder<'b>(
        &'b mut self,
        name: &PoolEntry,
        descriptor: &PoolEntry,
    ) -> Result<BufferedFieldBuilder<'b>> {
        let name = self.pool.map_entry(name)?;
        let descriptor = self.pool.map_entry(descriptor)?;
        Ok(BufferedFieldBuilder::new(
            &mut self.pool,
            self.context,
            name,
            descriptor,
        ))
    }

    pub(crate) fn method_builder<'b>(
        &'b mut self,
        name: &PoolEntry,
        descriptor: &PoolEntry,
        flags: MethodAccessFlags,
        original: Option<&'b MethodModel>,
    ) -> Result<BufferedMethodBuilder<'b>> {
        let name = self.pool.map_entry(name)?;
        let descriptor = self.pool.map_entry(descriptor)?;
        Ok(BufferedMethodBuilder::new(
            &mut self.pool,
            self.context,
            name,
            descriptor,
            flags,
            original,
        ))
    }

    pub(crate) fn build_field(
        &mut self,
        name: &str,
        descriptor: &str,
        handler: &mut FieldHandler<'_>,
    ) -> Result<FieldModel> {
        let name = self.pool.utf8_entry(name)?;
        let descriptor = self.pool.utf8_entry(descriptor)?;
        let mut builder = self.field_builder(&name, &descriptor)?;
        handler(&mut builder)?;
        Ok(builder.to_model())
    }

    pub(crate) fn rebuild_field(
        &mut self,
        field: &FieldModel,
        transform: &mut dyn FieldTransform,
    ) -> Result<FieldModel> {
        let mut builder = self.field_builder(field.name_entry(), field.descriptor_entry())?;
        builder.transform(field, transform)?;
        Ok(builder.to_model())
    }

    pub(crate) fn build_method(
        &mut self,
        name: &str,
        descriptor: &str,
        flags: MethodAccessFlags,
        handler: &mut MethodHandler<'_>,
    ) -> Result<MethodModel> {
        let name = self.pool.utf8_entry(name)?;
        let descriptor = self.pool.utf8_entry(descriptor)?;
        let mut builder = self.method_builder(&name, &descriptor, flags, None)?;
        handler(&mut builder)?;
        Ok(builder.to_model())
    }

    pub(crate) fn rebuild_method(
        &mut self,
        method: &MethodModel,
        transform: &mut dyn MethodTransform,
    ) -> Result<MethodModel> {
        let mut builder = self.method_builder(
            method.name_entry(),
            method.descriptor_entry(),
            method.flags(),
            Some(method),
        )?;
        builder.transform(method, transform)?;
        Ok(builder.to_model())
    }

    fn class_entry(&mut self, entry: &PoolEntry) -> Result<PoolEntry> {
        if entry.as_class().is_none() {
            return Err(Error::InvalidElement {
                element: format!("entry {entry}"),
                context: "class builder",
            });
        }
        self.pool.map_entry(entry)
    }

    /// Re-checks the attributes of a member that arrives as a finished model.
    ///
    /// Members built by buffered builders were filtered on the way in; decoded members were
    /// not. A member losing attributes here loses its bound encoding too.
    fn admit_field(&self, field: FieldModel) -> FieldModel {
        let options = self.context.options();
        if field.attributes().iter().all(|a| options.allows(a)) {
            return field;
        }
        let owner = format!("{}:{}", field.name(), field.descriptor());
        let kept = self.filter_attributes(field.attributes(), &owner);
        FieldModel::new(
            field.flags(),
            field.name_entry().clone(),
            field.descriptor_entry().clone(),
            kept,
            None,
        )
    }

    fn admit_method(&self, method: MethodModel) -> MethodModel {
        let options = self.context.options();
        if method.attributes().iter().all(|a| options.allows(a)) {
            return method;
        }
        let owner = format!("{}{}", method.name(), method.descriptor());
        let kept = self.filter_attributes(method.attributes(), &owner);
        MethodModel::new(
            method.flags(),
            method.name_entry().clone(),
            method.descriptor_entry().clone(),
            kept,
            None,
        )
    }

    fn filter_attributes(&self, attributes: &[Attribute], owner: &str) -> Vec<Attribute> {
        let options = self.context.options();
        attributes
            .iter()
            .filter(|attribute| {
                let allowed = options.allows(attribute);
                if !allowed {
                    record_drop(self.context, attribute.name(), owner);
                }
                allowed
            })
            .cloned()
            .collect()
    }

    /// Serializes the class.
    ///
    /// Members are written first, so entries interned while re-encoding them are part of the
    /// pool written afterwards. The output is fully determined by the accepted elements.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolOverflow`] if re-encoding overflows the pool, and
    /// [`crate::Error::Malformed`] for tables that exceed the format's limits.
    pub fn build(self) -> Result<Vec<u8>> {
        self.finish().map(|(bytes, _)| bytes)
    }

    /// Serializes the class and reports the pools its output pool extends.
    pub(crate) fn finish(mut self) -> Result<(Vec<u8>, Vec<PoolId>)> {
        let superclass = match self.superclass.take() {
            Some(entry) => Some(entry),
            None if self.name() != OBJECT && !self.flags.contains(ClassAccessFlags::MODULE) => {
                Some(self.pool.class_entry(OBJECT)?)
            }
            None => None,
        };
        let owner = self.name().to_string();
        let (major, minor) = self.version.unwrap_or(DEFAULT_VERSION);

        let mut writer = ClassWriter::new(&mut self.pool, self.context);
        let body = writer.write_body(
            &self.fields,
            &self.methods,
            &self.attributes.into_vec(),
            &owner,
        )?;
        let bytes = writer.write_class(
            (major, minor),
            self.flags,
            &self.this_class,
            superclass.as_ref(),
            &self.interfaces,
            &body,
        )?;

        Ok((bytes, self.pool.descendant_lineage()))
    }
}

impl ClassBuilder for DirectClassBuilder<'_> {
    fn accept(&mut self, element: ClassElement) -> Result<()> {
        match element {
            ClassElement::Version { major, minor } => self.version = Some((major, minor)),
            ClassElement::Flags(flags) => self.flags = flags,
            ClassElement::Superclass(entry) => {
                self.superclass = Some(self.class_entry(&entry)?);
            }
            ClassElement::Interfaces(entries) => {
                self.interfaces = entries
                    .iter()
                    .map(|entry| self.class_entry(entry))
                    .collect::<Result<Vec<_>>>()?;
            }
            ClassElement::Field(field) => {
                let field = self.admit_field(field);
                self.fields.push(field);
            }
            ClassElement::Method(method) => {
                let method = self.admit_method(method);
                self.methods.push(method);
            }
            ClassElement::Attribute(attribute) => self.write_attribute(attribute)?,
        }
        Ok(())
    }

    fn this_class(&self) -> &PoolEntry {
        &self.this_class
    }

    fn constant_pool(&mut self) -> &mut ConstantPoolBuilder {
        &mut self.pool
    }

    fn can_write_direct(&self, source: &ConstantPool) -> bool {
        self.pool.can_write_direct(source)
    }

    fn with_field(
        &mut self,
        name: &str,
        descriptor: &str,
        handler: &mut FieldHandler<'_>,
    ) -> Result<()> {
        let field = self.build_field(name, descriptor, handler)?;
        self.accept(ClassElement::Field(field))
    }

    fn transform_field(
        &mut self,
        field: &FieldModel,
        transform: &mut dyn FieldTransform,
    ) -> Result<()> {
        let field = self.rebuild_field(field, transform)?;
        self.accept(ClassElement::Field(field))
    }

    fn with_method(
        &mut self,
        name: &str,
        descriptor: &str,
        flags: MethodAccessFlags,
        handler: &mut MethodHandler<'_>,
    ) -> Result<()> {
        let method = self.build_method(name, descriptor, flags, handler)?;
        self.accept(ClassElement::Method(method))
    }

    fn transform_method(
        &mut self,
        method: &MethodModel,
        transform: &mut dyn MethodTransform,
    ) -> Result<()> {
        let method = self.rebuild_method(method, transform)?;
        self.accept(ClassElement::Method(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::FieldAccessFlags,
        options::{AttributePolicy, ClassFileOptions},
    };

    fn builder<'c>(context: &'c ClassFile, name: &str) -> DirectClassBuilder<'c> {
        let mut pool = ConstantPoolBuilder::new();
        let this_class = pool.class_entry(name).unwrap();
        DirectClassBuilder::new(context, pool, &this_class).unwrap()
    }

    #[test]
    fn defaults_are_applied() {
        let context = ClassFile::new();
        let bytes = builder(&context, "Foo").build().unwrap();
        let model = context.parse(&bytes).unwrap();
        assert_eq!(model.version(), DEFAULT_VERSION);
        assert_eq!(model.flags(), ClassAccessFlags::PUBLIC);
        assert_eq!(
            model.superclass().and_then(PoolEntry::as_class),
            Some(OBJECT)
        );

        let object = builder(&context, OBJECT).build().unwrap();
        assert!(context.parse(&object).unwrap().superclass().is_none());
    }

    #[test]
    fn this_class_must_be_a_class() {
        let context = ClassFile::new();
        let mut pool = ConstantPoolBuilder::new();
        let name = pool.utf8_entry("Foo").unwrap();
        assert!(matches!(
            DirectClassBuilder::new(&context, pool, &name),
            Err(Error::InvalidElement { .. })
        ));
    }

    #[test]
    fn superclass_must_be_a_class() {
        let context = ClassFile::new();
        let mut class = builder(&context, "Foo");
        let utf8 = class.constant_pool().utf8_entry("Bar").unwrap();
        assert!(class.accept(ClassElement::Superclass(utf8)).is_err());
        assert!(class.with_superclass("Bar").is_ok());
    }

    #[test]
    fn location_and_policy_checks() {
        let context = ClassFile::with_options(
            ClassFileOptions::default()
                .with_attribute_policy(AttributePolicy::allow(["SourceFile", "Synthetic"])),
        );
        let mut class = builder(&context, "Foo");
        let value = class.constant_pool().int_entry(1).unwrap();
        assert!(class
            .write_attribute(Attribute::constant_value(value))
            .is_err());

        class.write_attribute(Attribute::deprecated()).unwrap();
        class.write_attribute(Attribute::synthetic()).unwrap();
        assert_eq!(context.diagnostics().info_count(), 1);

        let model = context.parse(&class.build().unwrap()).unwrap();
        assert_eq!(model.attributes(), [Attribute::synthetic()]);
    }

    #[test]
    fn members_keep_arrival_order() {
        let context = ClassFile::new();
        let mut class = builder(&context, "Foo");
        for name in ["b", "a", "c"] {
            class
                .with_field(name, "J", &mut |f| {
                    f.with_flags(FieldAccessFlags::STATIC);
                    Ok(())
                })
                .unwrap();
        }
        class
            .with_method("<init>", "()V", MethodAccessFlags::PUBLIC, &mut |_| Ok(()))
            .unwrap();
        assert_eq!(class.fields().len(), 3);
        assert_eq!(class.methods().len(), 1);

        let model = context.parse(&class.build().unwrap()).unwrap();
        let names: Vec<_> = model.fields().iter().map(FieldModel::name).collect();
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(model.methods()[0].name(), "<init>");
    }

    #[test]
    fn later_elements_replace_earlier_ones() {
        let context = ClassFile::new();
        let mut class = builder(&context, "Foo");
        class.with_version(52, 0).unwrap();
        class.with_version(61, 0).unwrap();
        class.with_interfaces(&["A", "B"]).unwrap();
        class.with_interfaces(&["C"]).unwrap();
        let model = context.parse(&class.build().unwrap()).unwrap();
        assert_eq!(model.version(), (61, 0));
        assert_eq!(model.interfaces().len(), 1);
        assert_eq!(model.interfaces()[0].as_class(), Some("C"));
    }
}
