use std::collections::BTreeMap;
use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

pub const CAMPUS_DIR: &str = ".campus";

/// Courses a student can be enrolled in.
pub const COURSES: &[&str] = &[
    "React Fundamentals",
    "Advanced JavaScript",
    "UI/UX Design",
    "Python for Data Science",
];

/// Named attributes of a record, keyed by column name
pub type Fields = BTreeMap<String, String>;

/// One row of a remote collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Server-assigned identifier
    pub id: String,
    pub fields: Fields,
    pub created_at: Timestamp,
}

impl ListItem {
    pub fn new(id: impl Into<String>, fields: Fields, created_at: Timestamp) -> Self {
        Self {
            id: id.into(),
            fields,
            created_at,
        }
    }

    /// Field value, or the empty string when the column is absent
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    /// "First Last" when both name columns exist
    pub fn display_name(&self) -> String {
        let first = self.field("first_name");
        let last = self.field("last_name");
        format!("{first} {last}").trim().to_string()
    }
}

/// Build a field map from `(name, value)` pairs
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Category restriction applied to a list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, value: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == value,
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        if s.is_empty() || s == "all" {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(s.to_string())
        }
    }
}

impl From<Option<String>> for CategoryFilter {
    fn from(value: Option<String>) -> Self {
        value
            .as_deref()
            .map(CategoryFilter::from)
            .unwrap_or_default()
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => write!(f, "all"),
            CategoryFilter::Only(v) => write!(f, "{v}"),
        }
    }
}
