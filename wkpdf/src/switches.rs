//! The wkhtmltopdf option set.
//!
//! Switch names are normalized before they are stored, so `pageSize`,
//! `page-size` and `page_Size` all address the same slot and the last write
//! wins regardless of spelling.
//!
//! # Examples
//!
//! ```
//! use wkpdf::switches::{SwitchValue, Switches};
//!
//! let mut switches = Switches::new();
//! switches.set("pageSize", "A4");
//! switches.set("grayscale", true);
//! switches.set("page-size", "Letter");
//!
//! assert_eq!(switches.get("page_Size"), Some(&SwitchValue::from("Letter")));
//! assert_eq!(switches.len(), 2);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalize a switch name to its canonical kebab-case form.
///
/// Every character that is not an ASCII letter or `-` is dropped, then each
/// capital letter is lowercased and, unless it starts the name, prefixed
/// with `-`. Normalizing an already normalized name returns it unchanged.
///
/// ```
/// use wkpdf::switches::normalize_switch_name;
///
/// assert_eq!(normalize_switch_name("pageSize"), "page-size");
/// assert_eq!(normalize_switch_name("margin_top2"), "margintop");
/// assert_eq!(normalize_switch_name("page-size"), "page-size");
/// ```
pub fn normalize_switch_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len() + 4);

    for ch in name.chars() {
        if ch.is_ascii_uppercase() {
            if !normalized.is_empty() {
                normalized.push('-');
            }
            normalized.push(ch.to_ascii_lowercase());
        } else if ch.is_ascii_lowercase() || ch == '-' {
            normalized.push(ch);
        }
    }

    normalized
}

/// Value stored for a single switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SwitchValue {
    /// Value-less switch: `true` emits `--name`, `false` omits it.
    Flag(bool),
    /// Switch followed by a value token.
    Value(String),
    /// Switch kept in the set but never emitted.
    Absent,
}

impl SwitchValue {
    /// Whether this value produces any command-line token.
    pub fn is_emitted(&self) -> bool {
        matches!(self, Self::Flag(true) | Self::Value(_))
    }

    /// The value token, if this switch carries one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for SwitchValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Value(value) => f.write_str(value),
            Self::Absent => f.write_str("(absent)"),
        }
    }
}

impl From<bool> for SwitchValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

impl From<&str> for SwitchValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for SwitchValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&String> for SwitchValue {
    fn from(value: &String) -> Self {
        Self::Value(value.clone())
    }
}

macro_rules! numeric_switch_value {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for SwitchValue {
                fn from(value: $ty) -> Self {
                    Self::Value(value.to_string())
                }
            }
        )*
    };
}

numeric_switch_value!(i32, i64, u16, u32, u64, usize, f32, f64);

impl<T: Into<SwitchValue>> From<Option<T>> for SwitchValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}

/// Mapping from normalized switch names to values.
///
/// Iteration is ordered by name, so two equal sets always serialize to the
/// same argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Switches {
    entries: BTreeMap<String, SwitchValue>,
}

impl Switches {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a switch, replacing any value stored under the same normalized name.
    ///
    /// Returns the normalized name the value was stored under. Names that
    /// normalize to nothing are ignored and return `None`.
    pub fn set(&mut self, name: &str, value: impl Into<SwitchValue>) -> Option<String> {
        let key = normalize_switch_name(name);
        if key.is_empty() {
            return None;
        }
        self.entries.insert(key.clone(), value.into());
        Some(key)
    }

    /// Get the value of a switch.
    pub fn get(&self, name: &str) -> Option<&SwitchValue> {
        self.entries.get(&normalize_switch_name(name))
    }

    /// Remove a switch. Returns the previous value, if there was one.
    pub fn remove(&mut self, name: &str) -> Option<SwitchValue> {
        self.entries.remove(&normalize_switch_name(name))
    }

    /// Check whether a switch is present (any value, including `Absent`).
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_switch_name(name))
    }

    /// Number of stored switches.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no switch is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SwitchValue)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<'a> IntoIterator for &'a Switches {
    type Item = (&'a String, &'a SwitchValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, SwitchValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
