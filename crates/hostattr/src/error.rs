//! Error types for path resolution and symbol loading

use thiserror::Error;

/// Failure reported by a host runtime's attribute-lookup primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// The object has no attribute with this name
    #[error("no attribute `{name}`")]
    MissingAttribute {
        /// Attribute that was looked up
        name: String,
    },

    /// Any other error raised by the host during lookup
    #[error("host error: {0}")]
    Host(String),
}

/// Reasons an attribute path is rejected before any lookup happens.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathError {
    /// The path has no characters at all
    #[error("path is empty")]
    Empty,

    /// A segment between separators is empty (leading, trailing or doubled dot)
    #[error("segment {index} is empty")]
    EmptySegment {
        /// Zero-based position of the empty segment
        index: usize,
    },
}

/// Main error type for resolving an attribute path.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The path string is malformed
    #[error("invalid attribute path `{path}`: {source}")]
    InvalidPath {
        /// The rejected path
        path: String,
        /// Why it was rejected
        #[source]
        source: PathError,
    },

    /// The path has more segments than the context allows
    #[error("attribute path `{path}` has {segments} segments, limit is {max}")]
    TooManySegments {
        /// The rejected path
        path: String,
        /// Number of segments in the path
        segments: usize,
        /// Configured limit
        max: usize,
    },

    /// A lookup somewhere along the path failed
    #[error("cannot resolve `{path}`: lookup of `{segment}` failed: {source}")]
    AttributeLookup {
        /// The full path being resolved
        path: String,
        /// The segment whose lookup failed
        segment: String,
        /// Zero-based position of that segment
        index: usize,
        /// Host-side failure
        #[source]
        source: HostError,
    },
}

impl ResolveError {
    /// The path this error refers to.
    pub fn path(&self) -> &str {
        match self {
            ResolveError::InvalidPath { path, .. }
            | ResolveError::TooManySegments { path, .. }
            | ResolveError::AttributeLookup { path, .. } => path,
        }
    }

    /// Whether this error came from the host lookup rather than path validation.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(self, ResolveError::AttributeLookup { .. })
    }
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_message() {
        let err = ResolveError::AttributeLookup {
            path: "os.path.nope".to_string(),
            segment: "nope".to_string(),
            index: 2,
            source: HostError::MissingAttribute {
                name: "nope".to_string(),
            },
        };
        assert_eq!(
            err.to_string(),
            "cannot resolve `os.path.nope`: lookup of `nope` failed: no attribute `nope`"
        );
        assert!(err.is_lookup_failure());
        assert_eq!(err.path(), "os.path.nope");
    }

    #[test]
    fn test_invalid_path_message() {
        let err = ResolveError::InvalidPath {
            path: "a..b".to_string(),
            source: PathError::EmptySegment { index: 1 },
        };
        assert_eq!(
            err.to_string(),
            "invalid attribute path `a..b`: segment 1 is empty"
        );
        assert!(!err.is_lookup_failure());
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;

        let err = ResolveError::InvalidPath {
            path: String::new(),
            source: PathError::Empty,
        };
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("path is empty"));
    }
}
