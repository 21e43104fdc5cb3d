//! Manager capabilities.
//!
//! This module defines the operation kinds a manager backend can advertise,
//! and the set the capability gate checks before any backend call.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// An operation kind a manager may support.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    /// Resolving entity references to locations and metadata.
    Resolution,
    /// Publishing new data to an entity reference.
    Publishing,
    /// Telling whether a string is one of the manager's entity references.
    EntityReferenceIdentification,
    /// Reporting descriptive information about an entity.
    EntityTraitIntrospection,
    /// Answering whether an entity exists.
    ExistenceQueries,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolution => "resolution",
            Self::Publishing => "publishing",
            Self::EntityReferenceIdentification => "entityReferenceIdentification",
            Self::EntityTraitIntrospection => "entityTraitIntrospection",
            Self::ExistenceQueries => "existenceQueries",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Describes what a manager can do.
///
/// Reported once per session and read-only afterwards; see
/// [`CapabilityGate`](crate::gate::CapabilityGate).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerCapabilities {
    supported: BTreeSet<Capability>,
}

impl ManagerCapabilities {
    pub fn new(capabilities: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            supported: capabilities.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn supports(&self, capability: Capability) -> bool {
        self.supported.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.supported.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.supported.is_empty()
    }
}

impl FromIterator<Capability> for ManagerCapabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports() {
        let caps = ManagerCapabilities::new([Capability::Resolution]);
        assert!(caps.supports(Capability::Resolution));
        assert!(!caps.supports(Capability::Publishing));
    }

    #[test]
    fn test_deserialize_camel_case() {
        let caps: ManagerCapabilities =
            serde_json::from_str(r#"["resolution", "entityTraitIntrospection"]"#).unwrap();
        assert!(caps.supports(Capability::Resolution));
        assert!(caps.supports(Capability::EntityTraitIntrospection));
        assert_eq!(caps.iter().count(), 2);
    }
}
