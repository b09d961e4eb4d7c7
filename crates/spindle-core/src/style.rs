//! Style tag sets carried by inline wrappers.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// An unordered set of style tags (`bold`, `edt-u`, ...).
///
/// Backed by a sorted set so that equality and serialization are independent of
/// the order tags were added in.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleSet(BTreeSet<SmolStr>);

impl StyleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set holding a single tag.
    pub fn single(tag: impl Into<SmolStr>) -> Self {
        let mut set = Self::new();
        set.insert(tag);
        set
    }

    /// Parse a whitespace separated class attribute.
    pub fn from_classes(classes: &str) -> Self {
        classes.split_whitespace().map(SmolStr::new).collect()
    }

    /// Returns true if the tag was not already present.
    pub fn insert(&mut self, tag: impl Into<SmolStr>) -> bool {
        self.0.insert(tag.into())
    }

    /// Returns true if the tag was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        self.0.remove(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SmolStr> {
        self.0.iter()
    }

    /// Keep only the tags also present in `other`.
    pub fn retain_common(&mut self, other: &StyleSet) {
        self.0.retain(|tag| other.contains(tag));
    }

    /// Add every tag of `other`.
    pub fn extend_from(&mut self, other: &StyleSet) {
        self.0.extend(other.0.iter().cloned());
    }
}

impl fmt::Display for StyleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for tag in &self.0 {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(tag)?;
            first = false;
        }
        Ok(())
    }
}

impl<T: Into<SmolStr>> FromIterator<T> for StyleSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a StyleSet {
    type Item = &'a SmolStr;
    type IntoIter = std::collections::btree_set::Iter<'a, SmolStr>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
