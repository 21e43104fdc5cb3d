//! Reference classifier - entity reference or ordinary file path.
//!
//! Classification is purely lexical: a string is an entity reference exactly
//! when it starts with the bound manager's scheme prefix. It never fails and
//! never touches the backend.

use crate::manager::ManagerInterface;
use crate::models::{AssetPath, EntityReference};

/// Tags raw asset paths as entity references or plain paths.
#[derive(Clone, Debug, Default)]
pub struct ReferenceClassifier {
    prefix: Option<String>,
}

impl ReferenceClassifier {
    /// Recognize references starting with `prefix`.
    ///
    /// An empty prefix recognizes nothing.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            prefix: (!prefix.is_empty()).then_some(prefix),
        }
    }

    /// Classifier that treats every input as a plain path.
    pub fn disabled() -> Self {
        Self { prefix: None }
    }

    /// Classifier for the references of `manager`.
    pub fn for_manager(manager: &dyn ManagerInterface) -> Self {
        Self::new(manager.entity_reference_prefix())
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn is_entity_reference(&self, path: &str) -> bool {
        self.prefix
            .as_deref()
            .is_some_and(|prefix| path.starts_with(prefix))
    }

    /// Classify `path`. Unrecognized schemes fall through to [`AssetPath::Plain`].
    pub fn classify<'a>(&self, path: &'a str) -> AssetPath<'a> {
        match self.prefix.as_deref() {
            Some(prefix) if path.starts_with(prefix) => {
                AssetPath::Entity(EntityReference::new(path, prefix.len()))
            }
            _ => AssetPath::Plain(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_classify_entity_reference() {
        let classifier = ReferenceClassifier::new("bal:///");
        match classifier.classify("bal:///cat") {
            AssetPath::Entity(reference) => {
                assert_eq!(reference.as_str(), "bal:///cat");
                assert_eq!(reference.body(), "cat");
            }
            AssetPath::Plain(_) => panic!("Expected entity reference"),
        }
    }

    #[test]
    fn test_classify_plain_paths() {
        let classifier = ReferenceClassifier::new("bal:///");
        assert_eq!(
            classifier.classify("parking_lot.usd"),
            AssetPath::Plain("parking_lot.usd")
        );
        assert_eq!(
            classifier.classify("/abs/shot.usda"),
            AssetPath::Plain("/abs/shot.usda")
        );
        // Other schemes are not ours
        assert!(!classifier.classify("other:///cat").is_entity());
        // Prefix match is case-sensitive
        assert!(!classifier.classify("BAL:///cat").is_entity());
    }

    #[test]
    fn test_disabled_classifier() {
        let classifier = ReferenceClassifier::disabled();
        assert!(!classifier.is_entity_reference("bal:///cat"));
        assert_eq!(classifier.prefix(), None);
    }

    #[test]
    fn test_empty_prefix_recognizes_nothing() {
        let classifier = ReferenceClassifier::new("");
        assert!(!classifier.classify("anything").is_entity());
    }

    proptest! {
        #[test]
        fn prop_paths_without_prefix_are_plain(path in "[a-zA-Z0-9_./ -]{0,64}") {
            let classifier = ReferenceClassifier::new("bal:///");
            prop_assert_eq!(classifier.classify(&path), AssetPath::Plain(path.as_str()));
        }

        #[test]
        fn prop_prefixed_paths_are_entities(body in "[a-zA-Z0-9_]{0,32}") {
            let classifier = ReferenceClassifier::new("bal:///");
            let literal = format!("bal:///{}", body);
            let classified = classifier.classify(&literal);
            prop_assert!(classified.is_entity());
            prop_assert_eq!(classified.as_str(), literal.as_str());
        }
    }
}
