//! Resolution context configuration

/// Default limit on the number of segments in one path.
pub const DEFAULT_MAX_SEGMENTS: usize = 64;

/// Configuration for path resolution and symbol loading.
///
/// Passed by reference to the `*_with` entry points; the plain entry points
/// use [`ResolveContext::default`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Maximum number of segments accepted in one path
    pub max_segments: usize,

    /// Whether to log every attribute lookup at `trace` level
    pub trace: bool,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            max_segments: DEFAULT_MAX_SEGMENTS,
            trace: false,
        }
    }
}

impl ResolveContext {
    /// Create a new context with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context with a custom segment limit.
    pub fn with_max_segments(max_segments: usize) -> Self {
        Self {
            max_segments,
            ..Default::default()
        }
    }

    /// Enable or disable per-lookup tracing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}
