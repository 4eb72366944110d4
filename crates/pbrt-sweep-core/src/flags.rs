//! Ordered flag/value sets forwarded to the renderer.
//!
//! A [`FlagSet`] behaves like a layered dictionary: overriding an existing
//! flag keeps its original position, new flags are appended. Emitting the
//! set therefore yields the same order no matter how many layers were merged.

use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

/// Value of a single command-line flag.
///
/// Every variant is forwarded as its textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    /// Integer value, emitted in decimal.
    Int(i64),
    /// Any other JSON number (decimals, integers beyond `i64`), emitted as written.
    Number(serde_json::Number),
    /// Boolean, emitted as `true` or `false`.
    Bool(bool),
    /// Textual value, emitted verbatim.
    Text(String),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Number(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for FlagValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for FlagValue {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i32> for FlagValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<bool> for FlagValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FlagValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FlagValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

/// Insertion-ordered mapping from flag name to value.
///
/// Deserializes from a JSON object in document order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FlagSet {
    entries: IndexMap<String, FlagValue>,
}

// Order is part of a flag set's identity.
impl PartialEq for FlagSet {
    fn eq(&self, other: &Self) -> bool {
        self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for FlagSet {}

impl FlagSet {
    /// Create an empty flag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FlagSet::set`].
    #[must_use]
    pub fn with(mut self, flag: impl Into<String>, value: impl Into<FlagValue>) -> Self {
        self.set(flag, value);
        self
    }

    /// Set a flag, returning the value it replaced.
    ///
    /// A replaced flag keeps its position; a new flag goes to the end.
    pub fn set(
        &mut self,
        flag: impl Into<String>,
        value: impl Into<FlagValue>,
    ) -> Option<FlagValue> {
        self.entries.insert(flag.into(), value.into())
    }

    /// Look up a flag's value.
    pub fn get(&self, flag: &str) -> Option<&FlagValue> {
        self.entries.get(flag)
    }

    /// Whether the flag is present.
    pub fn contains(&self, flag: &str) -> bool {
        self.entries.contains_key(flag)
    }

    /// Apply every entry of `other` on top of this set; `other` wins.
    pub fn overlay(&mut self, other: &Self) {
        self.entries.extend(
            other
                .entries
                .iter()
                .map(|(flag, value)| (flag.clone(), value.clone())),
        );
    }

    /// Iterate flags in emission order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FlagValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Flag names in emission order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append every flag as two tokens, the name then the value's text.
    pub fn push_args(&self, args: &mut Vec<String>) {
        args.reserve(self.entries.len() * 2);
        for (flag, value) in &self.entries {
            args.push(flag.clone());
            args.push(value.to_string());
        }
    }
}

impl<K, V> FromIterator<(K, V)> for FlagSet
where
    K: Into<String>,
    V: Into<FlagValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(flag, value)| (flag.into(), value.into()))
                .collect(),
        }
    }
}
