//! Processing options shared by every builder of one operation.
//!
//! [`ClassFileOptions`] decides which attributes survive a build or transform, whether
//! unrecognized attributes are kept, and whether a transformed class extends its source
//! constant pool or starts from an empty one. Options are plain values, cloned into each
//! [`crate::ClassFile`] and read by every builder it creates.
//!
//! # Presets
//!
//! - [`ClassFileOptions::default`] - keep everything, share the source pool
//! - [`ClassFileOptions::strict`] - drop unknown attributes and anything less stable than
//!   pool references
//! - [`ClassFileOptions::fresh_pool`] - keep everything, but rebuild the constant pool
//!
//! # Examples
//!
//! ```rust
//! use classweave::options::{AttributePolicy, ClassFileOptions, UnknownAttributes};
//! use classweave::attribute::Attribute;
//!
//! let options = ClassFileOptions::default()
//!     .with_attribute_policy(AttributePolicy::allow(["Signature", "Synthetic"]))
//!     .with_unknown_attributes(UnknownAttributes::Drop);
//!
//! assert!(options.allows(&Attribute::synthetic()));
//! assert!(!options.allows(&Attribute::deprecated()));
//! ```

use std::{collections::HashSet, fmt, sync::Arc};

use crate::attribute::{Attribute, AttributeKind, AttributeStability};

/// Predicate deciding whether an attribute is kept.
pub type AttributePredicate = Arc<dyn Fn(&Attribute) -> bool + Send + Sync>;

/// Which attributes a builder keeps.
#[derive(Clone, Default)]
pub enum AttributePolicy {
    /// Keep every attribute.
    #[default]
    PassAll,
    /// Drop every attribute.
    DropAll,
    /// Keep attributes whose name is in the set.
    Allow(HashSet<String>),
    /// Keep attributes the predicate accepts.
    Predicate(AttributePredicate),
    /// Keep attributes whose stability is at most the given class.
    UpTo(AttributeStability),
}

impl AttributePolicy {
    /// Builds an [`AttributePolicy::Allow`] from attribute names.
    pub fn allow<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AttributePolicy::Allow(names.into_iter().map(Into::into).collect())
    }

    /// Builds an [`AttributePolicy::Predicate`] from a closure.
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&Attribute) -> bool + Send + Sync + 'static,
    {
        AttributePolicy::Predicate(Arc::new(predicate))
    }

    /// Returns true if the policy keeps `attribute`.
    #[must_use]
    pub fn allows(&self, attribute: &Attribute) -> bool {
        match self {
            AttributePolicy::PassAll => true,
            AttributePolicy::DropAll => false,
            AttributePolicy::Allow(names) => names.contains(attribute.name()),
            AttributePolicy::Predicate(predicate) => predicate(attribute),
            AttributePolicy::UpTo(threshold) => attribute.kind().stability() <= *threshold,
        }
    }
}

impl fmt::Debug for AttributePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributePolicy::PassAll => f.write_str("PassAll"),
            AttributePolicy::DropAll => f.write_str("DropAll"),
            AttributePolicy::Allow(names) => f.debug_tuple("Allow").field(names).finish(),
            AttributePolicy::Predicate(_) => f.write_str("Predicate(..)"),
            AttributePolicy::UpTo(threshold) => f.debug_tuple("UpTo").field(threshold).finish(),
        }
    }
}

/// Treatment of attributes with an unrecognized name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownAttributes {
    /// Keep them as opaque payloads.
    #[default]
    Pass,
    /// Drop them when reading and when building.
    Drop,
}

/// Constant pool used when transforming a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolSharing {
    /// Extend the source class's pool; untouched entries keep their indices.
    #[default]
    Shared,
    /// Start from an empty pool; everything is re-interned.
    New,
}

/// Options for one build or transform operation.
#[derive(Debug, Clone, Default)]
pub struct ClassFileOptions {
    /// Attribute filtering policy
    pub attributes: AttributePolicy,
    /// Treatment of unrecognized attributes
    pub unknown_attributes: UnknownAttributes,
    /// Pool used by transformations
    pub pool_sharing: PoolSharing,
}

impl ClassFileOptions {
    /// Drops unknown attributes and any attribute less stable than pool references.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            attributes: AttributePolicy::UpTo(AttributeStability::CpRefs),
            unknown_attributes: UnknownAttributes::Drop,
            pool_sharing: PoolSharing::Shared,
        }
    }

    /// Keeps every attribute but re-interns everything into a new pool.
    ///
    /// Unknown attributes such as `Code` cannot be remapped into the new pool; combine with
    /// [`UnknownAttributes::Drop`] to transform classes that carry them.
    #[must_use]
    pub fn fresh_pool() -> Self {
        Self {
            pool_sharing: PoolSharing::New,
            ..Self::default()
        }
    }

    /// Sets the attribute policy.
    #[must_use]
    pub fn with_attribute_policy(mut self, policy: AttributePolicy) -> Self {
        self.attributes = policy;
        self
    }

    /// Sets the treatment of unknown attributes.
    #[must_use]
    pub fn with_unknown_attributes(mut self, unknown: UnknownAttributes) -> Self {
        self.unknown_attributes = unknown;
        self
    }

    /// Sets the pool sharing mode.
    #[must_use]
    pub fn with_pool_sharing(mut self, sharing: PoolSharing) -> Self {
        self.pool_sharing = sharing;
        self
    }

    /// Returns true if `attribute` is kept under these options.
    #[must_use]
    pub fn allows(&self, attribute: &Attribute) -> bool {
        if attribute.kind() == AttributeKind::Unknown
            && self.unknown_attributes == UnknownAttributes::Drop
        {
            return false;
        }
        self.attributes.allows(attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_passes_everything() {
        let options = ClassFileOptions::default();
        assert!(options.allows(&Attribute::synthetic()));
        assert!(options.allows(&Attribute::unknown("Code", &[])));
        assert_eq!(options.pool_sharing, PoolSharing::Shared);
    }

    #[test]
    fn presets() {
        let strict = ClassFileOptions::strict();
        assert!(strict.allows(&Attribute::deprecated()));
        assert!(!strict.allows(&Attribute::unknown("Code", &[])));

        let fresh = ClassFileOptions::fresh_pool();
        assert_eq!(fresh.pool_sharing, PoolSharing::New);
        assert!(fresh.allows(&Attribute::unknown("Code", &[])));
    }

    #[test]
    fn policies() {
        let drop_all = ClassFileOptions::default().with_attribute_policy(AttributePolicy::DropAll);
        assert!(!drop_all.allows(&Attribute::synthetic()));

        let stateless = AttributePolicy::UpTo(AttributeStability::Stateless);
        assert!(stateless.allows(&Attribute::synthetic()));
        assert!(!stateless.allows(&Attribute::unknown("Foo", &[1])));

        let predicate = AttributePolicy::predicate(|a| a.name().starts_with('S'));
        assert!(predicate.allows(&Attribute::synthetic()));
        assert!(!predicate.allows(&Attribute::deprecated()));
        assert_eq!(format!("{predicate:?}"), "Predicate(..)");

        let allow = AttributePolicy::allow(["Code"]);
        assert!(allow.allows(&Attribute::unknown("Code", &[])));
        assert!(!allow.allows(&Attribute::synthetic()));
    }

    #[test]
    fn unknown_drop_overrides_policy() {
        let options = ClassFileOptions::default()
            .with_attribute_policy(AttributePolicy::allow(["Code"]))
            .with_unknown_attributes(UnknownAttributes::Drop);
        assert!(!options.allows(&Attribute::unknown("Code", &[])));
    }
}
