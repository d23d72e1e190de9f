//! Scalar converters and container fast paths
//!
//! Three process-wide tables keyed by type identity, built on first use and
//! never mutated afterwards, so they are safe to query from any number of
//! threads without locking.
//!
//! The scalar table maps a fixed set of target types to text conversions:
//! text itself, single characters, signed and unsigned integers of every
//! width, binary floating point, and exact decimals. Numeric conversion
//! tolerates surrounding whitespace; text and character conversion take the
//! span exactly as written.
//!
//! The two shape tables recognize container types that can be filled
//! directly from one facet of a node without element-wise conversion: a set
//! or map built from property keys, and a set or ordered list built from
//! child names.

use std::any::{Any, TypeId};
use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use rust_decimal::Decimal;

use crate::error::DeserializeError;
use crate::node::{Node, Properties};

type Value = Box<dyn Any + Send + Sync>;

/// A registered text conversion for one scalar target type
struct Scalar {
    parse: fn(&str) -> Result<Value, DeserializeError>,
}

fn number<T>(text: &str, target: &'static str) -> Result<Value, DeserializeError>
where
    T: std::str::FromStr + Send + Sync + 'static,
{
    match text.trim().parse::<T>() {
        Ok(value) => Ok(Box::new(value)),
        Err(_) => Err(DeserializeError::InvalidScalar {
            text: text.to_string(),
            target,
        }),
    }
}

fn text(value: &str) -> Result<Value, DeserializeError> {
    Ok(Box::new(value.to_string()))
}

fn character(text: &str) -> Result<Value, DeserializeError> {
    match text.parse::<char>() {
        Ok(value) => Ok(Box::new(value)),
        Err(_) => Err(DeserializeError::InvalidScalar {
            text: text.to_string(),
            target: "char",
        }),
    }
}

static SCALARS: Lazy<HashMap<TypeId, Scalar>> = Lazy::new(|| {
    let mut table = HashMap::new();
    table.insert(TypeId::of::<String>(), Scalar { parse: text });
    table.insert(TypeId::of::<char>(), Scalar { parse: character });
    macro_rules! numbers {
        ($($ty:ty),* $(,)?) => {$(
            table.insert(
                TypeId::of::<$ty>(),
                Scalar { parse: |text| number::<$ty>(text, stringify!($ty)) },
            );
        )*};
    }
    numbers!(i8, i16, i32, i64, i128, u8, u16, u32, u64, u128, f32, f64, Decimal);
    table
});

/// Convert one text span to `T` through the scalar table
///
/// `None` means `T` has no registered conversion. `Some(Err(_))` means `T`
/// is a scalar kind but the text does not match its lexical rules.
pub(crate) fn scalar_from_text<T: Any>(text: &str) -> Option<Result<T, DeserializeError>> {
    let scalar = SCALARS.get(&TypeId::of::<T>())?;
    Some((scalar.parse)(text).map(|value| match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("scalar conversion registered under a different type"),
    }))
}

/// Convert a node name for a type already known to be in the scalar table
pub(crate) fn scalar_from_name<T: Any>(name: &str) -> Result<T, DeserializeError> {
    match scalar_from_text(name) {
        Some(result) => result,
        None => unreachable!("name conversion requested outside the scalar table"),
    }
}

type PropertyShape = fn(&Properties) -> Value;
type ChildShape = fn(&[Node]) -> Value;

static PROPERTY_SHAPES: Lazy<HashMap<TypeId, PropertyShape>> = Lazy::new(|| {
    let mut table: HashMap<TypeId, PropertyShape> = HashMap::new();
    table.insert(TypeId::of::<HashSet<String>>(), |properties| {
        Box::new(properties.keys().map(str::to_string).collect::<HashSet<String>>())
    });
    table.insert(TypeId::of::<HashMap<String, Option<String>>>(), |properties| {
        let map: HashMap<String, Option<String>> = properties
            .iter()
            .map(|(key, value)| (key.to_string(), value.map(str::to_string)))
            .collect();
        Box::new(map)
    });
    table
});

static CHILD_SHAPES: Lazy<HashMap<TypeId, ChildShape>> = Lazy::new(|| {
    let mut table: HashMap<TypeId, ChildShape> = HashMap::new();
    table.insert(TypeId::of::<HashSet<String>>(), |children| {
        Box::new(children.iter().map(|c| c.name.clone()).collect::<HashSet<String>>())
    });
    table.insert(TypeId::of::<Vec<String>>(), |children| {
        Box::new(children.iter().map(|c| c.name.clone()).collect::<Vec<String>>())
    });
    table
});

fn downcast<T: Any>(value: Value) -> T {
    match value.downcast::<T>() {
        Ok(value) => *value,
        Err(_) => unreachable!("shape handler registered under a different type"),
    }
}

/// Fill `T` directly from property keys and values, if a handler is
/// registered for it
pub(crate) fn shape_from_properties<T: Any>(properties: &Properties) -> Option<T> {
    let handler = PROPERTY_SHAPES.get(&TypeId::of::<T>())?;
    Some(downcast(handler(properties)))
}

/// Fill `T` directly from child names, if a handler is registered for it
pub(crate) fn shape_from_children<T: Any>(children: &[Node]) -> Option<T> {
    let handler = CHILD_SHAPES.get(&TypeId::of::<T>())?;
    Some(downcast(handler(children)))
}
