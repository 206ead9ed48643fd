//! Dotted attribute paths

use std::fmt;
use std::str::FromStr;

use crate::error::PathError;

/// Segment separator inside an attribute path.
pub const SEPARATOR: char = '.';

/// A validated, dot-separated chain of attribute names.
///
/// Every segment is non-empty, so `""`, `"."`, `".a"`, `"a."` and `"a..b"`
/// are all rejected.
///
/// # Example
///
/// ```
/// use hostattr::AttrPath;
///
/// let path = AttrPath::parse("os.path.join").unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segments().collect::<Vec<_>>(), ["os", "path", "join"]);
/// assert_eq!(path.last(), "join");
///
/// assert!(AttrPath::parse("os..join").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrPath {
    raw: String,
    len: usize,
}

impl AttrPath {
    /// Parse and validate a dotted path.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut len = 0;
        for (index, segment) in raw.split(SEPARATOR).enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { index });
            }
            len += 1;
        }

        Ok(Self {
            raw: raw.to_string(),
            len,
        })
    }

    /// The path as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Iterate over the attribute names in lookup order.
    pub fn segments(&self) -> std::str::Split<'_, char> {
        self.raw.split(SEPARATOR)
    }

    /// Number of segments (always at least one).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether this path is a single direct lookup.
    pub fn is_single(&self) -> bool {
        self.len == 1
    }

    /// The first attribute name.
    pub fn first(&self) -> &str {
        self.raw.split(SEPARATOR).next().unwrap_or(&self.raw)
    }

    /// The final attribute name.
    pub fn last(&self) -> &str {
        self.raw.rsplit(SEPARATOR).next().unwrap_or(&self.raw)
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for AttrPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for AttrPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl AsRef<str> for AttrPath {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}
