//! # don
//!
//! A parser and deserializer for DON, a compact hierarchical text notation:
//! names separated by `,` or newlines, `(key=value, flag)` property blocks,
//! `{...}` child blocks, and `||...||` escape blocks for verbatim text.
//!
//! Parsing produces a generic tree of [`Node`]s; deserialization turns a
//! node into typed values through [`FromDon`], either the built-in scalar
//! and container implementations or record types declared with
//! [`don_record!`]:
//!
//! ```rust-example
//! don_record! {
//!     pub struct Apple {
//!         pub ounces: f32,
//!         pub color: String,
//!     }
//! }
//!
//! let tree = don::parse("Apple(ounces=5.2, color=red)")?;
//! let apple: Apple = tree.children[0].deserialize()?;
//! assert_eq!(apple.color, "red");
//! ```
//!
//! Trees can also be inspected directly ([`Node::property`], the containers
//! on [`Node`]) or rendered through the [`formats`] registry.

mod convert;
pub mod de;
pub mod error;
pub mod formats;
pub mod node;
pub mod parser;
pub mod testing;

pub use de::FromDon;
pub use error::{DeserializeError, ParseError};
pub use node::{Node, Properties};
pub use parser::parse;
