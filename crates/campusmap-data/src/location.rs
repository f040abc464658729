use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};

/// Unique identifier of a location in the gazetteer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for LocationId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// A named place on the campus map.
///
/// Coordinates are in base map pixels (full scale). Locations are immutable
/// once loaded into a [`Gazetteer`](crate::Gazetteer); unknown fields are
/// rejected when deserializing a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Location {
    /// Unique identifier
    pub id: LocationId,
    /// Short building code (e.g. "LIB"), matched case-insensitively
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Display name, not necessarily unique
    pub name: String,
    /// Alternate names, in preference order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    /// Lowercase keyword tags such as "food" or "parking"
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub keywords: BTreeSet<String>,
    /// Horizontal position in base map pixels
    pub x: i64,
    /// Vertical position in base map pixels
    pub y: i64,
}

impl Location {
    #[must_use]
    pub fn new(id: impl Into<LocationId>, name: impl Into<String>, x: i64, y: i64) -> Self {
        Self {
            id: id.into(),
            code: None,
            name: name.into(),
            aliases: Vec::new(),
            keywords: BTreeSet::new(),
            x,
            y,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    #[must_use]
    pub fn with_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Tags the location with keywords. Keywords are stored lowercase.
    #[must_use]
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords.extend(
            keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty()),
        );
        self
    }

    /// Returns the code lowercased, as used by the by-code index.
    #[must_use]
    pub fn normalized_code(&self) -> Option<String> {
        self.code.as_deref().map(str::to_lowercase)
    }

    /// The name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    #[must_use]
    pub fn position(&self) -> (i64, i64) {
        (self.x, self.y)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Location: {} {}>", self.id, self.name)
    }
}
