//! Fluent assertions for parsed trees
//!
//! Checking a whole tree with nested `match`/`assert_eq!` buries what a test
//! actually cares about. [`assert_tree`] gives a builder that walks the tree
//! and reports failures with the path to the offending node:
//!
//! ```rust-example
//! use don::testing::assert_tree;
//!
//! let tree = don::parse("Apple(small,ounces=5.2){One,Two}")?;
//! assert_tree(&tree)
//!     .child_count(1)
//!     .child(0, |apple| {
//!         apple
//!             .named("Apple")
//!             .flag("small")
//!             .property("ounces", "5.2")
//!             .child_count(2)
//!             .child(0, |one| {
//!                 one.named("One");
//!             });
//!     });
//! ```

use crate::node::Node;

/// Create an assertion builder rooted at a node
pub fn assert_tree(node: &Node) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        context: node.name.clone(),
    }
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    context: String,
}

impl<'a> NodeAssertion<'a> {
    /// Assert the node's name
    pub fn named(self, expected: &str) -> Self {
        assert_eq!(
            self.node.name, expected,
            "{}: expected name '{}', found '{}'",
            self.context, expected, self.node.name
        );
        self
    }

    /// Assert the number of children
    pub fn child_count(self, expected: usize) -> Self {
        let actual = self.node.children.len();
        assert_eq!(
            actual,
            expected,
            "{}: expected {} children, found {}: [{}]",
            self.context,
            expected,
            actual,
            summarize(&self.node.children)
        );
        self
    }

    /// Assert the number of properties
    pub fn property_count(self, expected: usize) -> Self {
        let actual = self.node.properties.len();
        assert_eq!(
            actual, expected,
            "{}: expected {} properties, found {}",
            self.context, expected, actual
        );
        self
    }

    /// Assert a valueless property is present
    pub fn flag(self, key: &str) -> Self {
        match self.node.properties.get(key) {
            Some(None) => {}
            Some(Some(value)) => panic!(
                "{}: expected '{}' to be a flag, found value '{}'",
                self.context, key, value
            ),
            None => panic!("{}: missing property '{}'", self.context, key),
        }
        self
    }

    /// Assert a property is present with the given value
    pub fn property(self, key: &str, expected: &str) -> Self {
        match self.node.properties.get(key) {
            Some(Some(value)) => assert_eq!(
                value, expected,
                "{}: expected property '{}' to be '{}', found '{}'",
                self.context, key, expected, value
            ),
            Some(None) => panic!(
                "{}: expected property '{}' to have value '{}', found a flag",
                self.context, key, expected
            ),
            None => panic!("{}: missing property '{}'", self.context, key),
        }
        self
    }

    /// Assert on a specific child by index
    pub fn child<F>(self, index: usize, assertion: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>),
    {
        assert!(
            index < self.node.children.len(),
            "{}: child index {} out of bounds ({} children)",
            self.context,
            index,
            self.node.children.len()
        );

        assertion(NodeAssertion {
            node: &self.node.children[index],
            context: format!("{}.children[{}]", self.context, index),
        });
        self
    }
}

fn summarize(children: &[Node]) -> String {
    children
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
