use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use crate::pool::Constant;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a constant pool.
///
/// Every decoded [`crate::pool::ConstantPool`] and every [`crate::pool::ConstantPoolBuilder`]
/// receives a fresh id. Ids are what the reuse fast path compares: an entry whose pool id is
/// the builder's own, or one of the builder's ancestors, can be written without remapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolId(u64);

impl PoolId {
    pub(crate) fn next() -> Self {
        PoolId(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool#{}", self.0)
    }
}

/// A constant together with its index in a specific pool.
///
/// Equality compares index and constant only. Two entries from different pools are equal when
/// they sit at the same index and hold structurally equal constants, which is exactly the
/// condition under which bytes referencing one may be read against the other.
#[derive(Debug, Clone)]
pub struct PoolEntry {
    pool: PoolId,
    index: u16,
    constant: Arc<Constant>,
}

impl PoolEntry {
    pub(crate) fn new(pool: PoolId, index: u16, constant: Arc<Constant>) -> Self {
        PoolEntry {
            pool,
            index,
            constant,
        }
    }

    /// Identity of the pool this entry was taken from.
    #[must_use]
    pub fn pool(&self) -> PoolId {
        self.pool
    }

    /// Index of the entry within its pool.
    #[must_use]
    pub fn index(&self) -> u16 {
        self.index
    }

    /// The resolved constant.
    #[must_use]
    pub fn constant(&self) -> &Constant {
        &self.constant
    }

    pub(crate) fn shared_constant(&self) -> &Arc<Constant> {
        &self.constant
    }

    /// Text of a `Utf8` entry.
    #[must_use]
    pub fn as_utf8(&self) -> Option<&str> {
        self.constant.as_utf8()
    }

    /// Internal name of a `Class` entry.
    #[must_use]
    pub fn as_class(&self) -> Option<&str> {
        self.constant.as_class()
    }
}

impl PartialEq for PoolEntry {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.constant == other.constant
    }
}

impl Eq for PoolEntry {}

impl fmt::Display for PoolEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} = {}", self.index, self.constant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = PoolId::next();
        let b = PoolId::next();
        assert_ne!(a, b);
        assert!(a < b);
    }

    #[test]
    fn equality_ignores_pool() {
        let constant = Arc::new(Constant::class("Foo"));
        let a = PoolEntry::new(PoolId::next(), 3, Arc::clone(&constant));
        let b = PoolEntry::new(PoolId::next(), 3, Arc::clone(&constant));
        let c = PoolEntry::new(a.pool(), 4, constant);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.as_class(), Some("Foo"));
        assert_eq!(a.to_string(), "#3 = Class Foo");
    }
}
