//! # Remote Error Translation
//!
//! Some backend error strings are accurate but useless to an operator. The
//! [`ErrorTranslator`] rewrites known messages, matched exactly, into
//! actionable guidance; anything else passes through unchanged. The table is
//! plain data so deployments can extend it from configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Backend message rejecting a mirrored sync of a repository with external references
pub const MIRROR_INCOMPATIBLE_MESSAGE: &str =
    "This repository uses features which are incompatible with 'mirror' sync. Please sync without mirroring enabled.";

/// Guidance shown instead of [`MIRROR_INCOMPATIBLE_MESSAGE`]
pub const MIRROR_INCOMPATIBLE_GUIDANCE: &str =
    "Please disable 'mirror on sync' because the upstream repository refers to external resources.";

/// One exact-match rewrite rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRewrite {
    pub message: String,
    pub replacement: String,
}

impl ErrorRewrite {
    pub fn new(message: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            replacement: replacement.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorTranslator {
    rewrites: HashMap<String, String>,
}

impl Default for ErrorTranslator {
    fn default() -> Self {
        Self::empty().with_rewrite(MIRROR_INCOMPATIBLE_MESSAGE, MIRROR_INCOMPATIBLE_GUIDANCE)
    }
}

impl ErrorTranslator {
    /// Translator with no rules at all
    pub fn empty() -> Self {
        Self {
            rewrites: HashMap::new(),
        }
    }

    pub fn with_rewrite(
        mut self,
        message: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        self.rewrites.insert(message.into(), replacement.into());
        self
    }

    /// Add rules; later rules win over earlier ones for the same message
    pub fn extend<I>(&mut self, rewrites: I)
    where
        I: IntoIterator<Item = ErrorRewrite>,
    {
        self.rewrites.extend(
            rewrites
                .into_iter()
                .map(|rewrite| (rewrite.message, rewrite.replacement)),
        );
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }

    pub fn translate(&self, message: &str) -> String {
        self.rewrites
            .get(message)
            .cloned()
            .unwrap_or_else(|| message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_message_rewritten() {
        let translator = ErrorTranslator::default();
        assert_eq!(
            translator.translate(MIRROR_INCOMPATIBLE_MESSAGE),
            MIRROR_INCOMPATIBLE_GUIDANCE
        );
    }

    #[test]
    fn test_unmatched_messages_pass_through() {
        let translator = ErrorTranslator::default();
        assert_eq!(translator.translate("404 Not Found"), "404 Not Found");

        // Matching is exact, not substring
        let padded = format!("{MIRROR_INCOMPATIBLE_MESSAGE} ");
        assert_eq!(translator.translate(&padded), padded);
    }

    #[test]
    fn test_extend_adds_rules() {
        let mut translator = ErrorTranslator::default();
        translator.extend([ErrorRewrite::new("upstream gone", "Check the upstream URL.")]);

        assert_eq!(translator.len(), 2);
        assert_eq!(translator.translate("upstream gone"), "Check the upstream URL.");
        assert!(ErrorTranslator::empty().is_empty());
    }
}
