use std::fmt;

use crate::transform::ClassTransform;

/// An ordered list of class transforms, run as a pipeline.
///
/// Chains are always flat: appending a chain to a chain splices its stages in, so
/// `(a.and_then(b)).and_then(c)` and `a.and_then(b.and_then(c))` hold the same three stages
/// in the same order. Every stage of a running chain writes into a builder for the stages
/// after it, and the last stage writes into the terminal builder directly.
///
/// An empty chain is the identity transform.
pub struct ClassTransformChain<'a> {
    stages: Vec<Box<dyn ClassTransform + 'a>>,
}

impl<'a> ClassTransformChain<'a> {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        ClassTransformChain { stages: Vec::new() }
    }

    /// Appends `next` after the current stages and returns the chain.
    #[must_use]
    pub fn and_then(mut self, next: impl Into<ClassTransformChain<'a>>) -> Self {
        self.append(next);
        self
    }

    /// Appends `next` after the current stages.
    pub fn append(&mut self, next: impl Into<ClassTransformChain<'a>>) {
        self.stages.extend(next.into().stages);
    }

    /// Number of stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if the chain has no stages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub(crate) fn into_stages(self) -> Vec<Box<dyn ClassTransform + 'a>> {
        self.stages
    }
}

impl Default for ClassTransformChain<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClassTransformChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTransformChain")
            .field("stages", &self.stages.len())
            .finish()
    }
}

impl<'a, T> From<T> for ClassTransformChain<'a>
where
    T: ClassTransform + 'a,
{
    fn from(transform: T) -> Self {
        ClassTransformChain {
            stages: vec![Box::new(transform)],
        }
    }
}

impl<'a> Extend<Box<dyn ClassTransform + 'a>> for ClassTransformChain<'a> {
    fn extend<I: IntoIterator<Item = Box<dyn ClassTransform + 'a>>>(&mut self, iter: I) {
        self.stages.extend(iter);
    }
}

impl<'a> FromIterator<Box<dyn ClassTransform + 'a>> for ClassTransformChain<'a> {
    fn from_iter<I: IntoIterator<Item = Box<dyn ClassTransform + 'a>>>(iter: I) -> Self {
        ClassTransformChain {
            stages: iter.into_iter().collect(),
        }
    }
}

/// Composition for any [`ClassTransform`].
pub trait ClassTransformExt<'a>: ClassTransform + Sized + 'a {
    /// Runs `self`, then `next` on everything `self` emits.
    fn and_then(self, next: impl Into<ClassTransformChain<'a>>) -> ClassTransformChain<'a> {
        ClassTransformChain::from(self).and_then(next)
    }
}

impl<'a, T: ClassTransform + Sized + 'a> ClassTransformExt<'a> for T {}
