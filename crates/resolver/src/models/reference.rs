use std::fmt;
use std::sync::Arc;

/// An asset path recognized as an entity reference.
///
/// Holds the literal string and the length of the scheme prefix that tagged
/// it. Immutable once classified; equality and hashing use the literal
/// string, so two references only match when they are byte-identical.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EntityReference {
    literal: Arc<str>,
    prefix_len: usize,
}

impl EntityReference {
    /// Tags `literal` as an entity reference whose scheme prefix is the first
    /// `prefix_len` bytes. Only the classifier constructs references.
    pub(crate) fn new(literal: &str, prefix_len: usize) -> Self {
        Self {
            literal: Arc::from(literal),
            prefix_len,
        }
    }

    /// The literal reference string, e.g. `bal:///cat`.
    pub fn as_str(&self) -> &str {
        &self.literal
    }

    /// The recognized scheme prefix, e.g. `bal:///`.
    pub fn prefix(&self) -> &str {
        &self.literal[..self.prefix_len]
    }

    /// Everything after the scheme prefix.
    pub fn body(&self) -> &str {
        &self.literal[self.prefix_len..]
    }
}

impl fmt::Display for EntityReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl AsRef<str> for EntityReference {
    fn as_ref(&self) -> &str {
        &self.literal
    }
}

/// Result of classifying a raw asset path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetPath<'a> {
    /// A path carrying a recognized entity scheme prefix.
    Entity(EntityReference),
    /// Anything else. Handled by the default file resolver.
    Plain(&'a str),
}

impl AssetPath<'_> {
    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Entity(reference) => reference.as_str(),
            Self::Plain(path) => path,
        }
    }
}
