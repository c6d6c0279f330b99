//! Helpers for the comma-separated NO_PROXY list.
//!
//! Entries are compared by exact string equality after trimming. There is no
//! case folding and no domain-suffix matching.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Ordered, duplicate-free view over a NO_PROXY string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoProxyList {
    items: Vec<String>,
}

impl NoProxyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &str) -> bool {
        let item = item.trim();
        !item.is_empty() && self.items.iter().any(|existing| existing == item)
    }

    /// Appends the trimmed item. Returns false if it was blank or present.
    pub fn insert(&mut self, item: &str) -> bool {
        let item = item.trim();
        if item.is_empty() || self.contains(item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    /// Drops the trimmed item. Returns false if nothing was removed.
    pub fn remove(&mut self, item: &str) -> bool {
        let item = item.trim();
        let before = self.items.len();
        self.items.retain(|existing| existing != item);
        self.items.len() != before
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl FromStr for NoProxyList {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut list = Self::new();
        for piece in s.split(',') {
            list.insert(piece);
        }
        Ok(list)
    }
}

impl fmt::Display for NoProxyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.items.join(","))
    }
}

impl<S: AsRef<str>> FromIterator<S> for NoProxyList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = Self::new();
        for item in iter {
            list.insert(item.as_ref());
        }
        list
    }
}

fn to_list(list: &str) -> NoProxyList {
    list.parse().unwrap_or_default()
}

/// Splits on commas, trims, drops blanks and keeps the first occurrence of
/// each entry.
pub fn parse(list: &str) -> Vec<String> {
    to_list(list).into_vec()
}

/// Joins the non-blank items with commas in their given order.
pub fn format<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .filter(|item| !item.trim().is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

/// Returns `list` untouched when `item` is blank or already present.
pub fn add(list: &str, item: &str) -> String {
    let mut parsed = to_list(list);
    if parsed.insert(item) {
        parsed.to_string()
    } else {
        list.to_string()
    }
}

/// Returns `list` untouched when `item` is blank or absent.
pub fn remove(list: &str, item: &str) -> String {
    if item.trim().is_empty() {
        return list.to_string();
    }
    let mut parsed = to_list(list);
    if parsed.remove(item) {
        parsed.to_string()
    } else {
        list.to_string()
    }
}

pub fn contains(list: &str, item: &str) -> bool {
    to_list(list).contains(item)
}
