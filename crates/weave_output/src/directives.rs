//! Order-preserving, duplicate-free directive sets.

use indexmap::IndexSet;

/// An insertion-ordered set of directive lines (`#include`, `import`, ...).
///
/// Inserting a directive that is already present is a no-op, so the rendered
/// prologue lists each directive once, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct DirectiveSet {
    items: IndexSet<String>,
}

impl DirectiveSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a directive. Returns `false` if it was already present.
    pub fn insert(&mut self, directive: impl Into<String>) -> bool {
        self.items.insert(directive.into())
    }

    /// Iterates in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    /// Returns the number of distinct directives.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if no directive was inserted.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
