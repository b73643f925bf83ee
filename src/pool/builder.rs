use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    sync::Arc,
};

use crate::{
    file::io::write_be,
    pool::{constant::encode_modified_utf8, Constant, ConstantPool, MemberRef, PoolEntry, PoolId},
    Error, Result,
};

/// Highest `constant_pool_count` the class-file format can express.
const MAX_POOL_SIZE: usize = u16::MAX as usize;

/// Append-only, deduplicating constant pool for one build.
///
/// A builder either starts empty or extends a decoded [`ConstantPool`]. Entries of the parent
/// keep their indices and their original encoding; new entries are appended after them and
/// encoded once, at the moment they are interned. Nothing is ever removed or reordered, so an
/// index handed out by [`ConstantPoolBuilder::intern`] stays valid for the lifetime of the
/// builder.
///
/// The builder is `!Sync`: it memoizes positive reuse checks in a [`RefCell`], and concurrent
/// interning on one builder is not supported.
///
/// # Examples
///
/// ```rust
/// use classweave::pool::ConstantPoolBuilder;
///
/// let mut pool = ConstantPoolBuilder::new();
/// let a = pool.class_entry("com/example/Foo")?;
/// let b = pool.class_entry("com/example/Foo")?;
/// assert_eq!(a.index(), b.index());
/// // #1 Utf8 "com/example/Foo", #2 Class
/// assert_eq!(pool.size(), 3);
/// # Ok::<(), classweave::Error>(())
/// ```
#[derive(Debug)]
pub struct ConstantPoolBuilder {
    id: PoolId,
    parent: Option<Arc<ConstantPool>>,
    /// Pools this builder is an append-only extension of, parent included
    lineage: Vec<PoolId>,
    /// Slot count inherited from the parent, including slot 0
    parent_size: usize,
    /// Appended slots; `None` marks the second slot of a `Long`/`Double`
    appended: Vec<Option<Arc<Constant>>>,
    /// Encodings of the appended entries in index order
    appended_bytes: Vec<u8>,
    lookup: HashMap<Arc<Constant>, u16>,
    parent_indexed: bool,
    /// Unrelated pools already proven to be a prefix of this one
    verified: RefCell<HashSet<PoolId>>,
}

impl Default for ConstantPoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstantPoolBuilder {
    /// Creates an empty pool builder.
    #[must_use]
    pub fn new() -> Self {
        ConstantPoolBuilder {
            id: PoolId::next(),
            parent: None,
            lineage: Vec::new(),
            parent_size: 1,
            appended: Vec::new(),
            appended_bytes: Vec::new(),
            lookup: HashMap::new(),
            parent_indexed: true,
            verified: RefCell::new(HashSet::new()),
        }
    }

    /// Creates a pool builder that extends `parent`.
    ///
    /// All parent entries are available at their original indices. The lookup index over them
    /// is only built when the first constant is interned.
    #[must_use]
    pub fn extending(parent: Arc<ConstantPool>) -> Self {
        let mut lineage = parent.lineage().to_vec();
        lineage.push(parent.id());
        ConstantPoolBuilder {
            id: PoolId::next(),
            parent_size: parent.size(),
            parent: Some(parent),
            lineage,
            appended: Vec::new(),
            appended_bytes: Vec::new(),
            lookup: HashMap::new(),
            parent_indexed: false,
            verified: RefCell::new(HashSet::new()),
        }
    }

    /// Process-unique identity of this builder.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.id
    }

    /// The pool this builder extends, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Arc<ConstantPool>> {
        self.parent.as_ref()
    }

    /// Ids of the pools this builder extends, nearest last.
    #[must_use]
    pub fn lineage(&self) -> &[PoolId] {
        &self.lineage
    }

    /// The `constant_pool_count` the builder would currently write.
    #[must_use]
    pub fn size(&self) -> usize {
        self.parent_size + self.appended.len()
    }

    /// Returns the entry at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidIndex`] if no constant lives at `index`.
    pub fn entry(&self, index: u16) -> Result<PoolEntry> {
        self.slot(usize::from(index))
            .map(|constant| PoolEntry::new(self.id, index, Arc::clone(constant)))
            .ok_or(Error::InvalidIndex(index))
    }

    fn slot(&self, index: usize) -> Option<&Arc<Constant>> {
        if index < self.parent_size {
            self.parent.as_ref().and_then(|parent| parent.slot(index))
        } else {
            self.appended
                .get(index - self.parent_size)
                .and_then(Option::as_ref)
        }
    }

    /// Interns `constant`, returning the existing entry when a structurally equal constant is
    /// already present.
    ///
    /// Components are interned before the constant itself, so a new `Class` is preceded by its
    /// `Utf8` name unless that name already exists.
    ///
    /// # Errors
    /// Returns [`crate::Error::PoolOverflow`] if the pool would exceed 65535 slots, and
    /// [`crate::Error::Malformed`] for text longer than 65535 encoded bytes.
    pub fn intern(&mut self, constant: Constant) -> Result<PoolEntry> {
        if let Some(entry) = self.find(&constant) {
            return Ok(entry);
        }

        let mut encoded = Vec::with_capacity(8);
        write_be(&mut encoded, constant.tag() as u8);
        match &constant {
            Constant::Utf8(value) => {
                let bytes = encode_modified_utf8(value);
                let length = u16::try_from(bytes.len()).map_err(|_| {
                    malformed_error!("Utf8 constant of {} bytes is too long", bytes.len())
                })?;
                write_be(&mut encoded, length);
                encoded.extend_from_slice(&bytes);
            }
            Constant::Integer(value) => write_be(&mut encoded, *value),
            Constant::Float(bits) => write_be(&mut encoded, *bits),
            Constant::Long(value) => write_be(&mut encoded, *value),
            Constant::Double(bits) => write_be(&mut encoded, *bits),
            Constant::Class(text)
            | Constant::String(text)
            | Constant::MethodType(text)
            | Constant::Module(text)
            | Constant::Package(text) => {
                let index = self.utf8_entry(text)?.index();
                write_be(&mut encoded, index);
            }
            Constant::NameAndType { name, descriptor } => {
                let name = self.utf8_entry(name)?.index();
                let descriptor = self.utf8_entry(descriptor)?.index();
                write_be(&mut encoded, name);
                write_be(&mut encoded, descriptor);
            }
            Constant::FieldRef(member)
            | Constant::MethodRef(member)
            | Constant::InterfaceMethodRef(member) => {
                let owner = self.class_entry(&member.owner)?.index();
                let nat = self
                    .name_and_type_entry(&member.name, &member.descriptor)?
                    .index();
                write_be(&mut encoded, owner);
                write_be(&mut encoded, nat);
            }
            Constant::MethodHandle { kind, reference } => {
                let reference = self.intern(Constant::clone(reference))?.index();
                write_be(&mut encoded, *kind);
                write_be(&mut encoded, reference);
            }
            Constant::Dynamic {
                bootstrap,
                name,
                descriptor,
            }
            | Constant::InvokeDynamic {
                bootstrap,
                name,
                descriptor,
            } => {
                let nat = self.name_and_type_entry(name, descriptor)?.index();
                write_be(&mut encoded, *bootstrap);
                write_be(&mut encoded, nat);
            }
        }

        self.append(constant, &encoded)
    }

    fn find(&mut self, constant: &Constant) -> Option<PoolEntry> {
        if !self.parent_indexed {
            self.index_parent();
        }
        self.lookup
            .get_key_value(constant)
            .map(|(shared, &index)| PoolEntry::new(self.id, index, Arc::clone(shared)))
    }

    fn index_parent(&mut self) {
        self.parent_indexed = true;
        if let Some(parent) = &self.parent {
            for (index, constant) in parent.iter() {
                self.lookup.entry(Arc::clone(constant)).or_insert(index);
            }
        }
    }

    fn append(&mut self, constant: Constant, encoded: &[u8]) -> Result<PoolEntry> {
        let index = self.size();
        let next = index + constant.slots();
        if next > MAX_POOL_SIZE {
            return Err(Error::PoolOverflow(next));
        }

        let index = index as u16;
        let shared = Arc::new(constant);
        if shared.slots() == 2 {
            self.appended.push(Some(Arc::clone(&shared)));
            self.appended.push(None);
        } else {
            self.appended.push(Some(Arc::clone(&shared)));
        }
        self.appended_bytes.extend_from_slice(encoded);
        self.lookup.insert(Arc::clone(&shared), index);
        Ok(PoolEntry::new(self.id, index, shared))
    }

    /// Interns a `Utf8` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn utf8_entry(&mut self, value: &str) -> Result<PoolEntry> {
        self.intern(Constant::utf8(value))
    }

    /// Interns a `Class` constant for an internal name such as `java/lang/Object`.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn class_entry(&mut self, name: &str) -> Result<PoolEntry> {
        self.intern(Constant::class(name))
    }

    /// Interns a `String` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn string_entry(&mut self, value: &str) -> Result<PoolEntry> {
        self.intern(Constant::String(Arc::from(value)))
    }

    /// Interns an `Integer` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn int_entry(&mut self, value: i32) -> Result<PoolEntry> {
        self.intern(Constant::Integer(value))
    }

    /// Interns a `Long` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn long_entry(&mut self, value: i64) -> Result<PoolEntry> {
        self.intern(Constant::Long(value))
    }

    /// Interns a `Float` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn float_entry(&mut self, value: f32) -> Result<PoolEntry> {
        self.intern(Constant::Float(value.to_bits()))
    }

    /// Interns a `Double` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn double_entry(&mut self, value: f64) -> Result<PoolEntry> {
        self.intern(Constant::Double(value.to_bits()))
    }

    /// Interns a `NameAndType` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn name_and_type_entry(&mut self, name: &str, descriptor: &str) -> Result<PoolEntry> {
        self.intern(Constant::name_and_type(name, descriptor))
    }

    /// Interns a `FieldRef` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn field_ref_entry(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<PoolEntry> {
        self.intern(Constant::FieldRef(member_ref(owner, name, descriptor)))
    }

    /// Interns a `MethodRef` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn method_ref_entry(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<PoolEntry> {
        self.intern(Constant::MethodRef(member_ref(owner, name, descriptor)))
    }

    /// Interns an `InterfaceMethodRef` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn interface_method_ref_entry(
        &mut self,
        owner: &str,
        name: &str,
        descriptor: &str,
    ) -> Result<PoolEntry> {
        self.intern(Constant::InterfaceMethodRef(member_ref(
            owner, name, descriptor,
        )))
    }

    /// Interns a `MethodType` constant.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn method_type_entry(&mut self, descriptor: &str) -> Result<PoolEntry> {
        self.intern(Constant::MethodType(Arc::from(descriptor)))
    }

    /// Returns true if every entry of `source` sits at the same index in this builder with a
    /// structurally equal constant, i.e. `source` is a prefix of this pool.
    ///
    /// When this holds, bytes encoded against `source` can be written unchanged. The check is
    /// O(1) when this builder extends `source` (directly or through the lineage of its parent)
    /// and falls back to an entry-by-entry comparison for unrelated pools. Positive results of
    /// the comparison are memoized; since the builder only grows, a prefix stays a prefix.
    #[must_use]
    pub fn can_write_direct(&self, source: &ConstantPool) -> bool {
        if self.is_known_direct(source.id()) {
            return true;
        }

        if source.size() > self.size() {
            return false;
        }
        let is_prefix = (1..source.size()).all(|index| source.slot(index) == self.slot(index));
        if is_prefix {
            self.verified.borrow_mut().insert(source.id());
        }
        is_prefix
    }

    /// Identity check only: true if indices from pool `id` are valid in this builder without
    /// any comparison.
    #[must_use]
    pub fn is_known_direct(&self, id: PoolId) -> bool {
        id == self.id || self.lineage.contains(&id) || self.verified.borrow().contains(&id)
    }

    /// Maps an entry from any pool into this one.
    ///
    /// Entries whose pool is known to be directly writable are returned as-is; all others are
    /// re-interned by value, which yields an index that resolves to an equal constant here.
    ///
    /// # Errors
    /// See [`ConstantPoolBuilder::intern`].
    pub fn map_entry(&mut self, entry: &PoolEntry) -> Result<PoolEntry> {
        if self.is_known_direct(entry.pool()) {
            return Ok(PoolEntry::new(
                self.id,
                entry.index(),
                Arc::clone(entry.shared_constant()),
            ));
        }
        self.intern(entry.constant().clone())
    }

    /// Ids of every pool that will be a prefix of the pool this builder writes: its lineage,
    /// the pools verified so far, and the builder itself.
    pub(crate) fn descendant_lineage(&self) -> Vec<PoolId> {
        let mut lineage = self.lineage.clone();
        lineage.extend(self.verified.borrow().iter().copied());
        lineage.push(self.id);
        lineage
    }

    /// Writes `constant_pool_count` followed by all entries.
    ///
    /// Parent entries are copied from their original encoding; appended entries use the
    /// encoding produced when they were interned.
    pub fn write_to(&self, out: &mut Vec<u8>) {
        write_be(out, self.size() as u16);
        if let Some(parent) = &self.parent {
            out.extend_from_slice(parent.raw_entries());
        }
        out.extend_from_slice(&self.appended_bytes);
    }
}

fn member_ref(owner: &str, name: &str, descriptor: &str) -> MemberRef {
    MemberRef {
        owner: Arc::from(owner),
        name: Arc::from(name),
        descriptor: Arc::from(descriptor),
    }
}
