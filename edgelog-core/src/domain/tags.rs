//! Tag model — the typed replacement for per-record ad hoc variable maps.
//!
//! A `TagMap` maps a lower-cased tag name to either a single value or a list of
//! values. Names that collide with system fields are rejected on insert, so
//! consumers never re-check them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Field names owned by the trade record itself. Never usable as tags.
pub const RESERVED_TAG_NAMES: &[&str] = &[
    // identifiers
    "id",
    "trade_id",
    "user_id",
    "import_batch_id",
    // identity
    "symbol",
    "direction",
    // prices and sizing
    "entry_price",
    "exit_price",
    "stop_loss",
    "take_profit",
    "quantity",
    "contract_size",
    "risk_amount",
    // results
    "pnl",
    "rr",
    // date/time
    "date",
    "time",
    "datetime",
    "entry_date",
    "exit_date",
    "entry_time",
    "exit_time",
    "duration",
    "created_at",
    "updated_at",
    "trade_hour",
    "trade_day",
    "trade_week",
    "trade_month",
    "trade_year",
    // containers and free text
    "notes",
    "tags",
    "variables",
    "extra",
    "extra_data",
];

/// Name prefixes that mark bookkeeping columns rather than user variables.
pub const RESERVED_TAG_PREFIXES: &[&str] = &["_", "unused", "temp", "meta", "trade_", "time_"];

/// Whether a (lower-cased, trimmed) tag name is excluded from analysis.
pub fn is_reserved_tag_name(name: &str) -> bool {
    RESERVED_TAG_NAMES.contains(&name) || RESERVED_TAG_PREFIXES.iter().any(|p| name.starts_with(p))
}

/// Canonical form of a tag name: trimmed and lower-cased.
pub fn canonical_tag_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Value of a tag: one string, or several for multi-valued tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagValue {
    Single(String),
    Multi(Vec<String>),
}

impl TagValue {
    /// Single value, trimmed. `None` if nothing remains.
    pub fn single(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self::Single(trimmed.to_string()))
        }
    }

    /// List value: entries trimmed and lower-cased, empties and repeats dropped.
    /// `None` if the list ends up empty.
    pub fn multi<I, S>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut cleaned: Vec<String> = Vec::new();
        for v in values {
            let v = v.as_ref().trim().to_lowercase();
            if !v.is_empty() && !cleaned.contains(&v) {
                cleaned.push(v);
            }
        }
        if cleaned.is_empty() {
            None
        } else {
            Some(Self::Multi(cleaned))
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::Single(v) => std::slice::from_ref(v),
            Self::Multi(vs) => vs,
        }
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }
}

/// A single (tag name, value) membership.
///
/// Ordering is lexicographic on name, then value; this is the ordering used to
/// canonicalize tag combinations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TagPair {
    pub name: String,
    pub value: String,
}

impl TagPair {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Label used for single-tag groups: `"name: value"`.
    pub fn group_label(&self) -> String {
        format!("{}: {}", self.name, self.value)
    }
}

/// Compact form used inside combination labels: `"name:value"`.
impl fmt::Display for TagPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.value)
    }
}

/// Ordered tag map. Keys are canonical names, never reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagMap(BTreeMap<String, TagValue>);

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag unless the name is empty, reserved, or already present.
    ///
    /// Returns whether the value was stored. The first value for a name wins,
    /// which is how the primary tag source takes precedence over the fallback.
    pub fn insert(&mut self, name: &str, value: TagValue) -> bool {
        let name = canonical_tag_name(name);
        if name.is_empty() || is_reserved_tag_name(&name) || self.0.contains_key(&name) {
            return false;
        }
        self.0.insert(name, value);
        true
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.0.get(&canonical_tag_name(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(&canonical_tag_name(name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Every (name, value) membership, sorted and de-duplicated.
    pub fn pairs(&self) -> Vec<TagPair> {
        let mut pairs: Vec<TagPair> = self
            .0
            .iter()
            .flat_map(|(name, value)| {
                value
                    .as_slice()
                    .iter()
                    .map(move |v| TagPair::new(name.clone(), v.clone()))
            })
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }
}
