//! Error types for parsing and deserialization
//!
//! Both parsing and deserialization are synchronous, single-call operations:
//! every error here is fatal to the call that produced it, carries the
//! offending key/name/type so it can be diagnosed from the message alone,
//! and is never retried or recovered internally.

use std::fmt;

/// Errors that can occur while parsing DON text into a tree
#[derive(Debug, Clone, PartialEq)]
pub enum ParseError {
    /// A property block contained the same key twice
    DuplicateKey { node: String, key: String },
    /// A `}` appeared with no open child block to close
    UnmatchedClose { position: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::DuplicateKey { node, key } => {
                write!(f, "Duplicate property key '{key}' on node '{node}'")
            }
            ParseError::UnmatchedClose { position } => {
                write!(f, "Unmatched '}}' at byte {position}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors that can occur while deserializing a tree into a typed value
#[derive(Debug, Clone, PartialEq)]
pub enum DeserializeError {
    /// A property targeted a member whose declared type has no scalar converter
    NoConverter {
        record: &'static str,
        member: String,
        target: &'static str,
    },
    /// A text value did not match the lexical rules of the target scalar kind
    InvalidScalar { text: String, target: &'static str },
    /// A property key matched no member of the target record
    UnknownProperty { record: &'static str, key: String },
    /// A child name matched no member of the target record
    UnknownChild { record: &'static str, name: String },
    /// A presence-flag property (no `=` value) targeted a record member
    MissingValue { record: &'static str, key: String },
    /// A fixed-size array target did not match the node's child count
    WrongLength { expected: usize, found: usize },
}

impl fmt::Display for DeserializeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeserializeError::NoConverter {
                record,
                member,
                target,
            } => {
                write!(
                    f,
                    "No scalar converter for member '{member}' of {record} (declared type {target})"
                )
            }
            DeserializeError::InvalidScalar { text, target } => {
                write!(f, "Cannot convert '{text}' to {target}")
            }
            DeserializeError::UnknownProperty { record, key } => {
                write!(f, "{record} has no member matching property '{key}'")
            }
            DeserializeError::UnknownChild { record, name } => {
                write!(f, "{record} has no member matching child '{name}'")
            }
            DeserializeError::MissingValue { record, key } => {
                write!(
                    f,
                    "Property '{key}' has no value to assign to a member of {record}"
                )
            }
            DeserializeError::WrongLength { expected, found } => {
                write!(
                    f,
                    "Expected {expected} children for a fixed-size array, found {found}"
                )
            }
        }
    }
}

impl std::error::Error for DeserializeError {}
