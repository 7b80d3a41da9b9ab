//! Per-node validation context
//!
//! Copyright (c) 2025 Conform Team
//! Licensed under the Apache-2.0 license

use crate::path::Path;
use crate::value::Key;

/// Where the engine is within the value, and what the position allows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationContext {
    /// Current path
    pub path: Path,
    /// Whether a null here is acceptable to nodes that inherit nullability
    pub null_allowed: bool,
}

impl ValidationContext {
    /// Context for the root value
    pub fn root() -> Self {
        Self::default()
    }

    /// Create a child context descending into a key
    pub fn child(&self, key: impl Into<Key>) -> Self {
        Self {
            path: self.path.child(key),
            null_allowed: false,
        }
    }

    /// Create a child context for a list or tuple index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: self.path.child_index(index),
            null_allowed: false,
        }
    }

    pub fn with_null_allowed(mut self, null_allowed: bool) -> Self {
        self.null_allowed = null_allowed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_children_do_not_inherit_null_allowance() {
        let optional = ValidationContext::root().child("a").with_null_allowed(true);
        assert!(optional.null_allowed);
        let nested = optional.child_index(0);
        assert!(!nested.null_allowed);
        assert_eq!(nested.path.to_string(), "$.a[0]");
    }
}
