//! Type-directed deserialization of parsed trees
//!
//! [`FromDon`] turns one [`Node`] into a typed value. Implementations exist
//! for every scalar kind in the conversion table, for containers, and for
//! record types declared through [`don_record!`](crate::don_record).
//!
//! Dispatch follows a fixed order. Types with a registered shape handler
//! fill themselves straight from property keys (when the node has any
//! properties) or child names. Sequences build one element per child, in
//! child order; a scalar element type converts each child's name, any other
//! element type deserializes the child node recursively. Everything else is
//! a record: a default instance whose members are bound by name.
//!
//! Record binding is case-insensitive and ignores underscores, so a member
//! declared `big_numbers` is targeted by `BigNumbers`, `bignumbers`, or
//! `BIG_NUMBERS`. Properties are bound first and children second; when both
//! target the same member, the child assignment wins. A property key or
//! child name with no matching member is an error, as is a valueless
//! property bound to a member or a member type outside the scalar table
//! bound from a property.

use std::any::{type_name, Any};
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::convert;
use crate::error::DeserializeError;
use crate::node::Node;

/// Conversion from a parsed node to a typed value
///
/// Implement this directly for custom leaf types, or declare record types
/// with [`don_record!`](crate::don_record) to get an implementation that
/// binds members by name.
pub trait FromDon: Sized + 'static {
    fn from_don(node: &Node) -> Result<Self, DeserializeError>;
}

impl Node {
    /// Deserialize this node as `T`
    pub fn deserialize<T: FromDon>(&self) -> Result<T, DeserializeError> {
        T::from_don(self)
    }

    /// Look up one property case-insensitively and convert its value
    ///
    /// The result is absent when the property is missing, is a valueless
    /// flag, or `T` has no scalar conversion. The only error is value text
    /// that does not match `T`'s lexical rules.
    pub fn property<T: Any>(&self, name: &str) -> Result<Option<T>, DeserializeError> {
        let Some(value) = self.properties.get(name) else {
            return Ok(None);
        };
        let Some(text) = value else {
            return Ok(None);
        };
        match convert::scalar_from_text(text) {
            Some(Ok(value)) => Ok(Some(value)),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }
}

macro_rules! scalar_from_don {
    ($($ty:ty),* $(,)?) => {$(
        impl FromDon for $ty {
            fn from_don(node: &Node) -> Result<Self, DeserializeError> {
                convert::scalar_from_name(&node.name)
            }
        }
    )*};
}

scalar_from_don!(String, char, i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, Decimal);

/// Property shape first (when the node has properties), then child shape
fn from_shapes<T: Any>(node: &Node) -> Option<T> {
    if !node.properties.is_empty() {
        if let Some(value) = convert::shape_from_properties(&node.properties) {
            return Some(value);
        }
    }
    convert::shape_from_children(&node.children)
}

/// The unique property keys when the node has properties, otherwise the
/// unique child names
impl FromDon for HashSet<String> {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        Ok(from_shapes(node).unwrap_or_default())
    }
}

/// A copy of the property map; empty for a node without properties
impl FromDon for HashMap<String, Option<String>> {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        Ok(from_shapes(node).unwrap_or_default())
    }
}

impl<E: FromDon> FromDon for Vec<E> {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        if let Some(names) = convert::shape_from_children::<Self>(&node.children) {
            return Ok(names);
        }
        node.children.iter().map(E::from_don).collect()
    }
}

impl<E: FromDon, const N: usize> FromDon for [E; N] {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        let items: Vec<E> = node.children.iter().map(E::from_don).collect::<Result<_, _>>()?;
        let found = items.len();
        <[E; N]>::try_from(items).map_err(|_| DeserializeError::WrongLength {
            expected: N,
            found,
        })
    }
}

impl<E: FromDon> FromDon for Option<E> {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        E::from_don(node).map(Some)
    }
}

impl<E: FromDon> FromDon for Box<E> {
    fn from_don(node: &Node) -> Result<Self, DeserializeError> {
        E::from_don(node).map(Box::new)
    }
}

/// Member names as bound: lower-cased, underscores dropped
fn canonical(name: &str) -> String {
    name.to_lowercase().replace('_', "")
}

type AssignText<R> =
    Box<dyn Fn(&mut R, &str, &'static str) -> Result<(), DeserializeError> + Send + Sync>;
type AssignNode<R> = Box<dyn Fn(&mut R, &Node) -> Result<(), DeserializeError> + Send + Sync>;

/// One bindable member of a record type
///
/// Built by [`don_record!`](crate::don_record); holds the canonical member
/// name and the two assignment paths, from a property value and from a
/// child node.
pub struct Field<R> {
    canonical: String,
    from_property: AssignText<R>,
    from_child: AssignNode<R>,
}

impl<R: 'static> Field<R> {
    pub fn of<T: FromDon>(member: &'static str, assign: fn(&mut R, T)) -> Self {
        Field {
            canonical: canonical(member),
            from_property: Box::new(move |target, text, record| {
                match convert::scalar_from_text::<T>(text) {
                    Some(value) => {
                        assign(target, value?);
                        Ok(())
                    }
                    None => Err(DeserializeError::NoConverter {
                        record,
                        member: member.to_string(),
                        target: type_name::<T>(),
                    }),
                }
            }),
            from_child: Box::new(move |target, child| {
                assign(target, T::from_don(child)?);
                Ok(())
            }),
        }
    }
}

/// Field table for one record type, built on first use
pub struct Fields<R: 'static>(Lazy<Vec<Field<R>>>);

impl<R: 'static> Fields<R> {
    pub const fn new(build: fn() -> Vec<Field<R>>) -> Self {
        Fields(Lazy::new(build))
    }

    pub fn get(&self) -> &[Field<R>] {
        &self.0
    }
}

/// Bind one node onto a default instance of `R`
///
/// Properties are bound first, then children, each matched against the
/// field table by canonical name. `record` is the record's declared name,
/// carried into error values.
pub fn bind_record<R: Default>(
    node: &Node,
    record: &'static str,
    fields: &[Field<R>],
) -> Result<R, DeserializeError> {
    let mut target = R::default();
    for (key, value) in &node.properties {
        let field = find(fields, key).ok_or_else(|| DeserializeError::UnknownProperty {
            record,
            key: key.clone(),
        })?;
        let text = value.as_deref().ok_or_else(|| DeserializeError::MissingValue {
            record,
            key: key.clone(),
        })?;
        (field.from_property)(&mut target, text, record)?;
    }
    for child in &node.children {
        let field = find(fields, &child.name).ok_or_else(|| DeserializeError::UnknownChild {
            record,
            name: child.name.clone(),
        })?;
        (field.from_child)(&mut target, child)?;
    }
    Ok(target)
}

fn find<'f, R>(fields: &'f [Field<R>], name: &str) -> Option<&'f Field<R>> {
    let name = canonical(name);
    fields.iter().find(|field| field.canonical == name)
}

/// Declare a record type that deserializes by member name
///
/// Expands to the struct itself (with `Debug`, `Clone`, `Default`, and
/// `PartialEq` derives) and a [`FromDon`] implementation that binds
/// properties and children onto a default instance:
///
/// ```rust-example
/// don_record! {
///     pub struct Apple {
///         pub ounces: f32,
///         pub color: String,
///     }
/// }
///
/// let tree = don::parse("Apple(ounces=5.2, color=red)")?;
/// let apple: Apple = tree.children[0].deserialize()?;
/// ```
///
/// Member types must themselves implement [`FromDon`]. Matching ignores
/// case and underscores, so `ounces` above is targeted by `Ounces` or
/// `OUNCES` as well.
#[macro_export]
macro_rules! don_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::FromDon for $name {
            fn from_don(node: &$crate::Node) -> Result<Self, $crate::DeserializeError> {
                static FIELDS: $crate::de::Fields<$name> = $crate::de::Fields::new(|| {
                    vec![
                        $(
                            $crate::de::Field::of::<$ty>(
                                stringify!($field),
                                |target: &mut $name, value| target.$field = value,
                            ),
                        )*
                    ]
                });
                $crate::de::bind_record(node, stringify!($name), FIELDS.get())
            }
        }
    };
}
