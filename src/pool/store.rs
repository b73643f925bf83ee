use std::sync::Arc;

use crate::{
    file::parser::Parser,
    pool::{
        constant::decode_modified_utf8, Constant, ConstantTag, MemberRef, PoolEntry, PoolId,
    },
    Error, Result,
};

/// Immutable constant pool of one decoded class.
///
/// The pool keeps both the resolved constants and the exact bytes they were decoded from, so a
/// [`crate::pool::ConstantPoolBuilder`] extending it can emit the original entries verbatim and
/// only encode what it appends.
#[derive(Debug)]
pub struct ConstantPool {
    id: PoolId,
    lineage: Vec<PoolId>,
    /// Slot 0 and the second slot of `Long`/`Double` entries are `None`
    slots: Vec<Option<Arc<Constant>>>,
    raw: Vec<u8>,
}

/// A decoded entry whose references are still indices.
enum RawConstant {
    Resolved(Constant),
    Class(u16),
    String(u16),
    MethodType(u16),
    Module(u16),
    Package(u16),
    NameAndType(u16, u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    MethodHandle(u8, u16),
}

impl RawConstant {
    /// Resolution order: an entry only references entries of a lower level.
    fn level(&self) -> u8 {
        match self {
            RawConstant::Resolved(_) => 0,
            RawConstant::Class(_)
            | RawConstant::String(_)
            | RawConstant::MethodType(_)
            | RawConstant::Module(_)
            | RawConstant::Package(_)
            | RawConstant::NameAndType(..) => 1,
            RawConstant::FieldRef(..)
            | RawConstant::MethodRef(..)
            | RawConstant::InterfaceMethodRef(..)
            | RawConstant::Dynamic(..)
            | RawConstant::InvokeDynamic(..) => 2,
            RawConstant::MethodHandle(..) => 3,
        }
    }
}

impl ConstantPool {
    /// Decodes a constant pool, starting at its `constant_pool_count` field.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] on truncated input and [`crate::Error::Malformed`]
    /// for unknown tags, dangling references, or references to entries of the wrong kind.
    pub(crate) fn read(parser: &mut Parser<'_>) -> Result<ConstantPool> {
        let count = usize::from(parser.read_be::<u16>()?);
        if count == 0 {
            return Err(malformed_error!("Constant pool count must be at least 1"));
        }

        let start = parser.pos();
        let mut raw: Vec<Option<RawConstant>> = Vec::with_capacity(count);
        raw.push(None);
        while raw.len() < count {
            let index = raw.len();
            let tag_byte = parser.read_be::<u8>()?;
            let tag = ConstantTag::from_repr(tag_byte).ok_or_else(|| {
                malformed_error!("Unknown constant tag {} at index {}", tag_byte, index)
            })?;
            let entry = match tag {
                ConstantTag::Utf8 => {
                    let length = parser.read_be::<u16>()?;
                    let bytes = parser.read_bytes(usize::from(length))?;
                    RawConstant::Resolved(Constant::Utf8(decode_modified_utf8(bytes)?))
                }
                ConstantTag::Integer => RawConstant::Resolved(Constant::Integer(parser.read_be()?)),
                ConstantTag::Float => RawConstant::Resolved(Constant::Float(parser.read_be()?)),
                ConstantTag::Long => RawConstant::Resolved(Constant::Long(parser.read_be()?)),
                ConstantTag::Double => RawConstant::Resolved(Constant::Double(parser.read_be()?)),
                ConstantTag::Class => RawConstant::Class(parser.read_be()?),
                ConstantTag::String => RawConstant::String(parser.read_be()?),
                ConstantTag::MethodType => RawConstant::MethodType(parser.read_be()?),
                ConstantTag::Module => RawConstant::Module(parser.read_be()?),
                ConstantTag::Package => RawConstant::Package(parser.read_be()?),
                ConstantTag::NameAndType => {
                    RawConstant::NameAndType(parser.read_be()?, parser.read_be()?)
                }
                ConstantTag::FieldRef => RawConstant::FieldRef(parser.read_be()?, parser.read_be()?),
                ConstantTag::MethodRef => {
                    RawConstant::MethodRef(parser.read_be()?, parser.read_be()?)
                }
                ConstantTag::InterfaceMethodRef => {
                    RawConstant::InterfaceMethodRef(parser.read_be()?, parser.read_be()?)
                }
                ConstantTag::Dynamic => RawConstant::Dynamic(parser.read_be()?, parser.read_be()?),
                ConstantTag::InvokeDynamic => {
                    RawConstant::InvokeDynamic(parser.read_be()?, parser.read_be()?)
                }
                ConstantTag::MethodHandle => {
                    RawConstant::MethodHandle(parser.read_be()?, parser.read_be()?)
                }
            };
            raw.push(Some(entry));
            if tag.slots() == 2 {
                raw.push(None);
            }
        }
        if raw.len() != count {
            return Err(malformed_error!(
                "Constant pool entry {} overruns the declared count {}",
                raw.len() - 2,
                count
            ));
        }

        let mut slots: Vec<Option<Arc<Constant>>> = vec![None; count];
        for level in 0..=3 {
            for (index, entry) in raw.iter_mut().enumerate() {
                if entry.as_ref().map(RawConstant::level) != Some(level) {
                    continue;
                }
                if let Some(unresolved) = entry.take() {
                    slots[index] = Some(Arc::new(resolve(&slots, unresolved)?));
                }
            }
        }

        Ok(ConstantPool {
            id: PoolId::next(),
            lineage: Vec::new(),
            slots,
            raw: parser.consumed_since(start)?.to_vec(),
        })
    }

    pub(crate) fn with_lineage(mut self, lineage: Vec<PoolId>) -> Self {
        self.lineage = lineage;
        self
    }

    /// Process-unique identity of this pool.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// Ids of the pools this pool was produced from by appending entries.
    #[must_use]
    pub fn lineage(&self) -> &[PoolId] {
        &self.lineage
    }

    /// Returns true if this pool is an append-only extension of the pool `id`.
    #[must_use]
    pub fn extends(&self, id: PoolId) -> bool {
        self.lineage.contains(&id)
    }

    /// The `constant_pool_count` value: one more than the highest usable index.
    #[must_use]
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Returns the constant at `index`, or `None` for index 0, unusable slots and indices
    /// past the end.
    #[must_use]
    pub fn get(&self, index: u16) -> Option<&Arc<Constant>> {
        self.slots.get(usize::from(index)).and_then(Option::as_ref)
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIndex`] if no constant lives at `index`.
    pub fn entry(&self, index: u16) -> Result<PoolEntry> {
        self.get(index)
            .map(|constant| PoolEntry::new(self.id, index, Arc::clone(constant)))
            .ok_or(Error::InvalidIndex(index))
    }

    /// Returns the text of the `Utf8` entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIndex`] if the entry is missing or not `Utf8`.
    pub fn utf8(&self, index: u16) -> Result<&str> {
        self.get(index)
            .and_then(|c| c.as_utf8())
            .ok_or(Error::InvalidIndex(index))
    }

    /// Returns the entry at `index`, requiring it to be a `Class`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIndex`] if the entry is missing or not a `Class`.
    pub fn class_entry(&self, index: u16) -> Result<PoolEntry> {
        let entry = self.entry(index)?;
        if entry.as_class().is_none() {
            return Err(Error::InvalidIndex(index));
        }
        Ok(entry)
    }

    /// Iterates `(index, constant)` over all usable slots in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &Arc<Constant>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|c| (index as u16, c)))
    }

    /// The encoded entries, excluding the leading count.
    #[must_use]
    pub fn raw_entries(&self) -> &[u8] {
        &self.raw
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Arc<Constant>> {
        self.slots.get(index).and_then(Option::as_ref)
    }
}

fn resolve(slots: &[Option<Arc<Constant>>], raw: RawConstant) -> Result<Constant> {
    let constant = match raw {
        RawConstant::Resolved(constant) => constant,
        RawConstant::Class(name) => Constant::Class(utf8_at(slots, name)?),
        RawConstant::String(value) => Constant::String(utf8_at(slots, value)?),
        RawConstant::MethodType(descriptor) => Constant::MethodType(utf8_at(slots, descriptor)?),
        RawConstant::Module(name) => Constant::Module(utf8_at(slots, name)?),
        RawConstant::Package(name) => Constant::Package(utf8_at(slots, name)?),
        RawConstant::NameAndType(name, descriptor) => Constant::NameAndType {
            name: utf8_at(slots, name)?,
            descriptor: utf8_at(slots, descriptor)?,
        },
        RawConstant::FieldRef(owner, nat) => Constant::FieldRef(member_at(slots, owner, nat)?),
        RawConstant::MethodRef(owner, nat) => Constant::MethodRef(member_at(slots, owner, nat)?),
        RawConstant::InterfaceMethodRef(owner, nat) => {
            Constant::InterfaceMethodRef(member_at(slots, owner, nat)?)
        }
        RawConstant::Dynamic(bootstrap, nat) => {
            let (name, descriptor) = name_and_type_at(slots, nat)?;
            Constant::Dynamic {
                bootstrap,
                name,
                descriptor,
            }
        }
        RawConstant::InvokeDynamic(bootstrap, nat) => {
            let (name, descriptor) = name_and_type_at(slots, nat)?;
            Constant::InvokeDynamic {
                bootstrap,
                name,
                descriptor,
            }
        }
        RawConstant::MethodHandle(kind, reference) => {
            if !(1..=9).contains(&kind) {
                return Err(malformed_error!("Invalid method handle kind {}", kind));
            }
            let target = slot_at(slots, reference)?;
            if !target.is_member_ref() {
                return Err(malformed_error!(
                    "Method handle references #{} which is not a member reference",
                    reference
                ));
            }
            Constant::MethodHandle {
                kind,
                reference: Arc::clone(target),
            }
        }
    };
    Ok(constant)
}

fn slot_at(slots: &[Option<Arc<Constant>>], index: u16) -> Result<&Arc<Constant>> {
    slots
        .get(usize::from(index))
        .and_then(Option::as_ref)
        .ok_or_else(|| malformed_error!("Dangling constant pool reference #{}", index))
}

fn utf8_at(slots: &[Option<Arc<Constant>>], index: u16) -> Result<Arc<str>> {
    match slot_at(slots, index)?.as_ref() {
        Constant::Utf8(value) => Ok(Arc::clone(value)),
        other => Err(malformed_error!("Expected Utf8 at #{}, found {}", index, other.tag())),
    }
}

fn name_and_type_at(slots: &[Option<Arc<Constant>>], index: u16) -> Result<(Arc<str>, Arc<str>)> {
    match slot_at(slots, index)?.as_ref() {
        Constant::NameAndType { name, descriptor } => Ok((Arc::clone(name), Arc::clone(descriptor))),
        other => Err(malformed_error!(
            "Expected NameAndType at #{}, found {}",
            index,
            other.tag()
        )),
    }
}

fn member_at(slots: &[Option<Arc<Constant>>], owner: u16, nat: u16) -> Result<MemberRef> {
    let owner = match slot_at(slots, owner)?.as_ref() {
        Constant::Class(name) => Arc::clone(name),
        other => {
            return Err(malformed_error!(
                "Expected Class at #{}, found {}",
                owner,
                other.tag()
            ))
        }
    };
    let (name, descriptor) = name_and_type_at(slots, nat)?;
    Ok(MemberRef {
        owner,
        name,
        descriptor,
    })
}
