//! Decoding of class-file bytes into a [`crate::model::ClassModel`].
//!
//! The reader is strict about structure (bounds, magic, every pool reference resolves to an
//! entry of the expected kind, no trailing bytes) and lenient about semantics: flag
//! combinations, descriptors and versions are taken as they are.
//!
//! Fields, methods and attributes are bound to the exact bytes they were decoded from, which
//! is what lets a transformation copy untouched members without re-encoding them.

use std::sync::Arc;

use crate::{
    attribute::read_attributes,
    file::parser::Parser,
    model::{
        ClassAccessFlags, ClassModel, FieldAccessFlags, FieldModel, MethodAccessFlags,
        MethodModel, RawMember,
    },
    pool::{ConstantPool, PoolEntry, PoolId},
    ClassFile, Error, Result,
};

/// `0xCAFEBABE`
pub const CLASS_MAGIC: u32 = 0xCAFE_BABE;

/// Decodes `data`.
///
/// `lineage` records the pools the decoded pool is known to extend; it is empty for input
/// from outside the crate.
pub(crate) fn read_class(data: &[u8], context: &ClassFile, lineage: Vec<PoolId>) -> Result<ClassModel> {
    if data.is_empty() {
        return Err(Error::Empty);
    }

    let mut parser = Parser::new(data);
    let magic = parser.read_be::<u32>()?;
    if magic != CLASS_MAGIC {
        return Err(malformed_error!("Invalid class magic 0x{:08x}", magic));
    }
    let minor = parser.read_be::<u16>()?;
    let major = parser.read_be::<u16>()?;

    let pool = Arc::new(ConstantPool::read(&mut parser)?.with_lineage(lineage));

    let flags = ClassAccessFlags::from_bits_retain(parser.read_be()?);
    let this_class = pool.class_entry(parser.read_be()?)?;
    let superclass = match parser.read_be::<u16>()? {
        0 => None,
        index => Some(pool.class_entry(index)?),
    };

    let interface_count = parser.read_be::<u16>()?;
    let interfaces = (0..interface_count)
        .map(|_| pool.class_entry(parser.read_be()?))
        .collect::<Result<Vec<_>>>()?;

    let field_count = parser.read_be::<u16>()?;
    let mut fields = Vec::with_capacity(usize::from(field_count));
    for _ in 0..field_count {
        let member = read_member(&mut parser, &pool, context)?;
        fields.push(FieldModel::new(
            FieldAccessFlags::from_bits_retain(member.flags),
            member.name,
            member.descriptor,
            member.attributes,
            member.raw,
        ));
    }

    let method_count = parser.read_be::<u16>()?;
    let mut methods = Vec::with_capacity(usize::from(method_count));
    for _ in 0..method_count {
        let member = read_member(&mut parser, &pool, context)?;
        methods.push(MethodModel::new(
            MethodAccessFlags::from_bits_retain(member.flags),
            member.name,
            member.descriptor,
            member.attributes,
            member.raw,
        ));
    }

    let owner = this_class.as_class().unwrap_or_default().to_string();
    let (attributes, _) = read_attributes(&mut parser, &pool, context, &owner)?;

    if parser.has_more_data() {
        return Err(malformed_error!(
            "{} trailing bytes after class {}",
            parser.remaining(),
            owner
        ));
    }

    Ok(ClassModel {
        pool,
        major,
        minor,
        flags,
        this_class,
        superclass,
        interfaces,
        fields,
        methods,
        attributes,
    })
}

/// Layout shared by `field_info` and `method_info`.
struct DecodedMember {
    flags: u16,
    name: PoolEntry,
    descriptor: PoolEntry,
    attributes: Vec<crate::attribute::Attribute>,
    raw: Option<RawMember>,
}

fn read_member(
    parser: &mut Parser<'_>,
    pool: &Arc<ConstantPool>,
    context: &ClassFile,
) -> Result<DecodedMember> {
    let start = parser.pos();
    let flags = parser.read_be::<u16>()?;
    let name = utf8_entry(pool, parser.read_be()?)?;
    let descriptor = utf8_entry(pool, parser.read_be()?)?;

    let owner = format!(
        "{}:{}",
        name.as_utf8().unwrap_or_default(),
        descriptor.as_utf8().unwrap_or_default()
    );
    let (attributes, dropped) = read_attributes(parser, pool, context, &owner)?;

    let raw = if dropped {
        None
    } else {
        Some(RawMember {
            pool: Arc::clone(pool),
            bytes: Arc::from(parser.consumed_since(start)?),
        })
    };

    Ok(DecodedMember {
        flags,
        name,
        descriptor,
        attributes,
        raw,
    })
}

fn utf8_entry(pool: &ConstantPool, index: u16) -> Result<PoolEntry> {
    pool.utf8(index)?;
    pool.entry(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::{point_class_bytes, ClassBytesBuilder};

    #[test]
    fn reads_point_class() {
        let bytes = point_class_bytes();
        let model = read_class(&bytes, &ClassFile::new(), Vec::new()).unwrap();

        assert_eq!(model.name(), "com/example/Point");
        assert_eq!(model.version(), (65, 0));
        assert_eq!(
            model.superclass().and_then(PoolEntry::as_class),
            Some("java/lang/Object")
        );
        assert_eq!(model.interfaces().len(), 1);
        assert_eq!(model.fields().len(), 2);
        assert_eq!(model.fields()[0].name(), "x");
        assert_eq!(model.fields()[0].descriptor(), "I");
        assert!(model.fields().iter().all(FieldModel::is_bound));
        assert_eq!(model.methods().len(), 1);
        assert!(model.methods()[0].code().is_some());
        assert_eq!(model.attributes().len(), 1);
        assert!(model.constant_pool().lineage().is_empty());
    }

    #[test]
    fn rejects_structural_damage() {
        let context = ClassFile::new();
        assert!(matches!(read_class(&[], &context, Vec::new()), Err(Error::Empty)));

        let mut bytes = point_class_bytes();
        bytes[0] = 0xCB;
        assert!(matches!(
            read_class(&bytes, &context, Vec::new()),
            Err(Error::Malformed { .. })
        ));

        let mut bytes = point_class_bytes();
        bytes.push(0);
        assert!(read_class(&bytes, &context, Vec::new()).is_err());

        let bytes = point_class_bytes();
        for cut in [4, 9, bytes.len() / 2, bytes.len() - 1] {
            assert!(read_class(&bytes[..cut], &context, Vec::new()).is_err());
        }
    }

    #[test]
    fn this_class_must_be_a_class_entry() {
        let bytes = ClassBytesBuilder::new("Foo")
            .this_class_index_override(1)
            .finish();
        assert!(matches!(
            read_class(&bytes, &ClassFile::new(), Vec::new()),
            Err(Error::InvalidIndex(1))
        ));
    }
}
