use crate::{
    attribute::{write_attributes, Attribute},
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    file::io::{write_be, write_count},
    model::{ClassAccessFlags, FieldModel, MethodModel, RawMember, CLASS_MAGIC},
    pool::{ConstantPoolBuilder, PoolEntry},
    ClassFile, Result,
};

/// Serializes a class against its output pool.
///
/// The body (members and class attributes) is written before the header because re-encoding
/// may intern new constants, and the pool has to be complete when the header is written.
pub(crate) struct ClassWriter<'w> {
    pool: &'w mut ConstantPoolBuilder,
    context: &'w ClassFile,
}

impl<'w> ClassWriter<'w> {
    pub(crate) fn new(pool: &'w mut ConstantPoolBuilder, context: &'w ClassFile) -> Self {
        ClassWriter { pool, context }
    }

    /// Writes fields, methods and class attributes.
    pub(crate) fn write_body(
        &mut self,
        fields: &[FieldModel],
        methods: &[MethodModel],
        attributes: &[Attribute],
        owner: &str,
    ) -> Result<Vec<u8>> {
        let mut out = Vec::new();

        write_count(&mut out, fields.len(), "fields")?;
        for field in fields {
            let member = format!("{}:{}", field.name(), field.descriptor());
            self.write_member(
                &mut out,
                field.flags().bits(),
                field.name_entry(),
                field.descriptor_entry(),
                field.attributes(),
                field.raw(),
                &member,
            )?;
        }

        write_count(&mut out, methods.len(), "methods")?;
        for method in methods {
            let member = format!("{}{}", method.name(), method.descriptor());
            self.write_member(
                &mut out,
                method.flags().bits(),
                method.name_entry(),
                method.descriptor_entry(),
                method.attributes(),
                method.raw(),
                &member,
            )?;
        }

        write_attributes(&mut out, attributes, self.pool, self.context, owner)?;
        Ok(out)
    }

    /// Writes one `field_info` or `method_info`, verbatim when its source pool allows.
    #[allow(clippy::too_many_arguments)]
    fn write_member(
        &mut self,
        out: &mut Vec<u8>,
        flags: u16,
        name: &PoolEntry,
        descriptor: &PoolEntry,
        attributes: &[Attribute],
        raw: Option<&RawMember>,
        member: &str,
    ) -> Result<()> {
        if let Some(raw) = raw {
            if self.pool.can_write_direct(&raw.pool) {
                out.extend_from_slice(&raw.bytes);
                return Ok(());
            }
            self.context.diagnostics().push(
                Diagnostic::new(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::ConstantPool,
                    "Re-encoded member against a foreign constant pool",
                )
                .with_member(
                    name.as_utf8().unwrap_or_default(),
                    descriptor.as_utf8().unwrap_or_default(),
                ),
            );
        }

        write_be(out, flags);
        write_be(out, self.pool.map_entry(name)?.index());
        write_be(out, self.pool.map_entry(descriptor)?.index());
        write_attributes(out, attributes, self.pool, self.context, member)
    }

    /// Writes the header, the now complete pool, and the previously written body.
    pub(crate) fn write_class(
        &mut self,
        (major, minor): (u16, u16),
        flags: ClassAccessFlags,
        this_class: &PoolEntry,
        superclass: Option<&PoolEntry>,
        interfaces: &[PoolEntry],
        body: &[u8],
    ) -> Result<Vec<u8>> {
        let this_class = self.pool.map_entry(this_class)?.index();
        let superclass = match superclass {
            Some(entry) => self.pool.map_entry(entry)?.index(),
            None => 0,
        };
        let interfaces = interfaces
            .iter()
            .map(|entry| self.pool.map_entry(entry).map(|e| e.index()))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(body.len() + 64);
        write_be(&mut out, CLASS_MAGIC);
        write_be(&mut out, minor);
        write_be(&mut out, major);
        self.pool.write_to(&mut out);
        write_be(&mut out, flags.bits());
        write_be(&mut out, this_class);
        write_be(&mut out, superclass);
        write_count(&mut out, interfaces.len(), "interfaces")?;
        for interface in interfaces {
            write_be(&mut out, interface);
        }
        out.extend_from_slice(body);
        Ok(out)
    }
}
