use std::sync::Arc;

use crate::{
    attribute::{Attribute, AttributeBody, AttributeKind},
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
    file::{
        io::{write_be, write_count},
        parser::Parser,
    },
    options::UnknownAttributes,
    pool::{Constant, ConstantPool, ConstantPoolBuilder},
    ClassFile, Error, Result,
};

/// Reads an `attributes_count` table.
///
/// Every decoded attribute is bound to `pool` and its exact encoding. Unknown attributes are
/// skipped under [`UnknownAttributes::Drop`]; the returned flag reports whether anything was
/// skipped, since the enclosing encoding is then no longer a faithful copy.
pub(crate) fn read_attributes(
    parser: &mut Parser<'_>,
    pool: &Arc<ConstantPool>,
    context: &ClassFile,
    owner: &str,
) -> Result<(Vec<Attribute>, bool)> {
    let count = parser.read_be::<u16>()?;
    let mut attributes = Vec::with_capacity(usize::from(count));
    let mut dropped = false;

    for _ in 0..count {
        let start = parser.pos();
        let name_index = parser.read_be::<u16>()?;
        let length = parser.read_be::<u32>()?;
        let data = parser.read_bytes(length as usize)?;
        let name = pool.utf8(name_index)?;

        let kind = AttributeKind::from_name(name);
        if kind == AttributeKind::Unknown
            && context.options().unknown_attributes == UnknownAttributes::Drop
        {
            context.diagnostics().push(
                Diagnostic::new(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::Attribute,
                    format!("Dropped unknown attribute {name} of {owner}"),
                )
                .with_offset(start),
            );
            dropped = true;
            continue;
        }

        let body = decode_body(kind, name, data, pool)?;
        attributes.push(Attribute::bound(
            body,
            Arc::clone(pool),
            parser.consumed_since(start)?,
        ));
    }

    Ok((attributes, dropped))
}

fn decode_body(
    kind: AttributeKind,
    name: &str,
    data: &[u8],
    pool: &ConstantPool,
) -> Result<AttributeBody> {
    let mut parser = Parser::new(data);
    let body = match kind {
        AttributeKind::ConstantValue => {
            let index = parser.read_be::<u16>()?;
            let entry = pool.entry(index)?;
            if !matches!(
                entry.constant(),
                Constant::Integer(_)
                    | Constant::Float(_)
                    | Constant::Long(_)
                    | Constant::Double(_)
                    | Constant::String(_)
            ) {
                return Err(Error::InvalidIndex(index));
            }
            AttributeBody::ConstantValue(entry)
        }
        AttributeKind::Signature | AttributeKind::SourceFile => {
            let index = parser.read_be::<u16>()?;
            pool.utf8(index)?;
            let entry = pool.entry(index)?;
            if kind == AttributeKind::Signature {
                AttributeBody::Signature(entry)
            } else {
                AttributeBody::SourceFile(entry)
            }
        }
        AttributeKind::Exceptions => {
            let count = parser.read_be::<u16>()?;
            let exceptions = (0..count)
                .map(|_| {
                    let index = parser.read_be::<u16>()?;
                    pool.class_entry(index)
                })
                .collect::<Result<Vec<_>>>()?;
            AttributeBody::Exceptions(exceptions)
        }
        AttributeKind::Synthetic => AttributeBody::Synthetic,
        AttributeKind::Deprecated => AttributeBody::Deprecated,
        AttributeKind::Unknown => {
            return Ok(AttributeBody::Unknown {
                name: Arc::from(name),
                data: Arc::from(data),
            })
        }
    };

    if parser.has_more_data() {
        return Err(malformed_error!(
            "Attribute {} has {} trailing bytes",
            name,
            parser.remaining()
        ));
    }
    Ok(body)
}

/// Writes an `attributes_count` table into `out`.
///
/// Bound attributes are copied verbatim when `pool` can write their source pool directly;
/// everything else is encoded against `pool`, interning what it references.
///
/// # Errors
///
/// Returns [`Error::InvalidElement`] for a bound unknown attribute whose source pool `pool`
/// cannot write directly. Its payload is opaque, so it cannot be re-encoded; read the class
/// with [`UnknownAttributes::Drop`] or drop the attribute in a transform instead.
pub(crate) fn write_attributes(
    out: &mut Vec<u8>,
    attributes: &[Attribute],
    pool: &mut ConstantPoolBuilder,
    context: &ClassFile,
    owner: &str,
) -> Result<()> {
    write_count(out, attributes.len(), "attributes")?;
    for attribute in attributes {
        write_attribute(out, attribute, pool, context, owner)?;
    }
    Ok(())
}

fn write_attribute(
    out: &mut Vec<u8>,
    attribute: &Attribute,
    pool: &mut ConstantPoolBuilder,
    context: &ClassFile,
    owner: &str,
) -> Result<()> {
    if let Some(bound) = attribute.bound_encoding() {
        if pool.can_write_direct(&bound.pool) {
            out.extend_from_slice(&bound.bytes);
            return Ok(());
        }
        if attribute.kind() != AttributeKind::Unknown {
            context.diagnostics().info(
                DiagnosticCategory::ConstantPool,
                format!("Re-encoded attribute {} of {owner}", attribute.name()),
            );
        }
    }

    let name = pool.utf8_entry(attribute.name())?.index();
    let mut payload = Vec::new();
    match attribute.body() {
        AttributeBody::ConstantValue(entry)
        | AttributeBody::Signature(entry)
        | AttributeBody::SourceFile(entry) => {
            write_be(&mut payload, pool.map_entry(entry)?.index());
        }
        AttributeBody::Exceptions(exceptions) => {
            write_count(&mut payload, exceptions.len(), "exceptions")?;
            for exception in exceptions {
                write_be(&mut payload, pool.map_entry(exception)?.index());
            }
        }
        AttributeBody::Synthetic | AttributeBody::Deprecated => {}
        AttributeBody::Unknown { name, data } => {
            // the payload may hold indices into the source pool, which cannot be remapped
            if attribute.is_bound() {
                return Err(Error::InvalidElement {
                    element: format!("attribute {name} of {owner}"),
                    context: "unknown attribute bound to a foreign constant pool",
                });
            }
            payload.extend_from_slice(data);
        }
    }

    let Ok(length) = u32::try_from(payload.len()) else {
        return Err(malformed_error!(
            "Attribute {} is too large: {} bytes",
            attribute.name(),
            payload.len()
        ));
    };
    write_be(out, name);
    write_be(out, length);
    out.extend_from_slice(&payload);
    Ok(())
}
