//! Native dynamic values
//!
//! The shape tool arguments take on the host side before they are encoded
//! onto the wire.

use std::fmt;

use indexmap::IndexMap;

/// A dynamically typed native value
#[derive(Debug, Clone, PartialEq)]
pub enum NativeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<NativeValue>),
    Map(NativeMap),
}

impl NativeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, NativeValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            NativeValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&NativeMap> {
        match self {
            NativeValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NativeValue::Null => write!(f, "null"),
            NativeValue::Bool(b) => write!(f, "{}", b),
            NativeValue::Int(i) => write!(f, "{}", i),
            NativeValue::Float(x) => write!(f, "{}", x),
            NativeValue::Str(s) => write!(f, "{}", s),
            NativeValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            NativeValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for NativeValue {
    fn from(b: bool) -> Self {
        NativeValue::Bool(b)
    }
}

impl From<i64> for NativeValue {
    fn from(i: i64) -> Self {
        NativeValue::Int(i)
    }
}

impl From<i32> for NativeValue {
    fn from(i: i32) -> Self {
        NativeValue::Int(i64::from(i))
    }
}

impl From<f64> for NativeValue {
    fn from(x: f64) -> Self {
        NativeValue::Float(x)
    }
}

impl From<&str> for NativeValue {
    fn from(s: &str) -> Self {
        NativeValue::Str(s.to_string())
    }
}

impl From<String> for NativeValue {
    fn from(s: String) -> Self {
        NativeValue::Str(s)
    }
}

impl<T: Into<NativeValue>> From<Vec<T>> for NativeValue {
    fn from(items: Vec<T>) -> Self {
        NativeValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<NativeValue>> From<Option<T>> for NativeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(NativeValue::Null)
    }
}

impl From<NativeMap> for NativeValue {
    fn from(map: NativeMap) -> Self {
        NativeValue::Map(map)
    }
}

/// String-keyed map that remembers insertion order
///
/// Re-inserting an existing key replaces the value in place. Equality
/// compares entries, not order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeMap {
    entries: IndexMap<String, NativeValue>,
}

impl NativeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert a value, returning the previous one for that key
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<NativeValue>,
    ) -> Option<NativeValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&NativeValue> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key, keeping the order of the rest
    pub fn remove(&mut self, key: &str) -> Option<NativeValue> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<NativeValue>> FromIterator<(K, V)> for NativeMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for NativeMap {
    type Item = (String, NativeValue);
    type IntoIter = indexmap::map::IntoIter<String, NativeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
