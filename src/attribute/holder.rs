use crate::{attribute::Attribute, options::ClassFileOptions};

/// Ordered accumulator of the attributes collected by one builder.
///
/// Attributes are kept in the order they were added; duplicates are not merged. The holder is
/// consumed when its builder finalizes.
#[derive(Debug, Clone, Default)]
pub struct AttributeHolder {
    attributes: Vec<Attribute>,
}

impl AttributeHolder {
    /// Creates an empty holder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `attribute` if `options` allow it.
    ///
    /// Returns `false` when the attribute was filtered out. Filtering is not an error.
    pub fn add(&mut self, attribute: Attribute, options: &ClassFileOptions) -> bool {
        if !options.allows(&attribute) {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    /// Number of attributes held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Returns true if no attribute has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Iterates the attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.iter()
    }

    /// Consumes the holder.
    #[must_use]
    pub fn into_vec(self) -> Vec<Attribute> {
        self.attributes
    }
}
