//! Bulk symbol loading
//!
//! Fills a list of output slots from one root object, one dotted path per
//! slot. Loading is best-effort: a failed path leaves its slot empty and
//! does not stop the remaining requests. Slots that already hold a reference
//! are left alone, so a partially failed load can simply be retried with the
//! same requests.

use std::fmt;

use crate::context::ResolveContext;
use crate::error::ResolveError;
use crate::host::{HostRef, HostRuntime};
use crate::resolve::resolve_with;

/// One (name, slot) pair of a bulk load.
///
/// An empty `name` is the sentinel: it ends the request sequence and every
/// request after it is ignored.
pub struct SymbolRequest<'s, 'rt, R: HostRuntime + ?Sized> {
    /// Dotted path to resolve from the root
    pub name: &'s str,

    /// Destination; filled only if currently empty
    pub slot: &'s mut Option<HostRef<'rt, R>>,
}

impl<'s, 'rt, R: HostRuntime + ?Sized> SymbolRequest<'s, 'rt, R> {
    /// Pair a dotted path with its destination slot.
    pub fn new(name: &'s str, slot: &'s mut Option<HostRef<'rt, R>>) -> Self {
        Self { name, slot }
    }

    /// Whether this request terminates the sequence.
    pub fn is_sentinel(&self) -> bool {
        self.name.is_empty()
    }
}

impl<R: HostRuntime + ?Sized> fmt::Debug for SymbolRequest<'_, '_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolRequest")
            .field("name", &self.name)
            .field("slot", &self.slot)
            .finish()
    }
}

/// A request whose path could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolFailure {
    /// Position of the request in the sequence
    pub index: usize,

    /// The requested path
    pub name: String,

    /// Why resolution failed
    pub error: ResolveError,
}

/// Outcome of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Slots filled by this call
    pub loaded: usize,

    /// Slots left alone because they were already filled
    pub skipped: usize,

    /// Requests that failed, in request order; their slots are still empty
    pub failures: Vec<SymbolFailure>,
}

impl LoadReport {
    /// Whether every request is now satisfied.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of requests that triggered a resolution.
    pub fn attempted(&self) -> usize {
        self.loaded + self.failures.len()
    }

    /// Paths of the failed requests.
    pub fn failed_names(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.name.as_str()).collect()
    }

    /// Positions of the failed requests.
    pub fn failed_indices(&self) -> Vec<usize> {
        self.failures.iter().map(|f| f.index).collect()
    }
}

/// Load every requested symbol from `root`, using the default context.
///
/// Requests are processed in order up to the first sentinel. Each one
/// resolves independently from `root`.
///
/// # Example
///
/// ```
/// use hostattr::{load_symbols, HostRef, MemoryRuntime, SymbolRequest};
///
/// let rt = MemoryRuntime::new();
/// let math = rt.new_object("math");
/// let sqrt = rt.new_object("sqrt");
/// rt.set_attr(math, "sqrt", sqrt);
///
/// let root = HostRef::from_borrowed(&rt, math);
/// let mut sqrt_slot = None;
/// let mut tau_slot = None;
///
/// let report = load_symbols(
///     &root,
///     [
///         SymbolRequest::new("sqrt", &mut sqrt_slot),
///         SymbolRequest::new("tau", &mut tau_slot),
///     ],
/// );
///
/// assert_eq!(report.loaded, 1);
/// assert_eq!(report.failed_names(), ["tau"]);
/// assert!(sqrt_slot.is_some());
/// assert!(tau_slot.is_none());
/// ```
pub fn load_symbols<'s, 'rt, R, I>(root: &HostRef<'rt, R>, requests: I) -> LoadReport
where
    R: HostRuntime + ?Sized + 'rt,
    I: IntoIterator<Item = SymbolRequest<'s, 'rt, R>>,
    'rt: 's,
{
    load_symbols_with(root, requests, &ResolveContext::default())
}

/// Load every requested symbol from `root` with an explicit context.
pub fn load_symbols_with<'s, 'rt, R, I>(
    root: &HostRef<'rt, R>,
    requests: I,
    ctx: &ResolveContext,
) -> LoadReport
where
    R: HostRuntime + ?Sized + 'rt,
    I: IntoIterator<Item = SymbolRequest<'s, 'rt, R>>,
    'rt: 's,
{
    let mut report = LoadReport::default();

    for (index, request) in requests.into_iter().enumerate() {
        if request.is_sentinel() {
            break;
        }

        if request.slot.is_some() {
            log::trace!("symbol `{}` already loaded, skipping", request.name);
            report.skipped += 1;
            continue;
        }

        match resolve_with(root, request.name, ctx) {
            Ok(found) => {
                *request.slot = Some(found);
                report.loaded += 1;
            }
            Err(error) => {
                log::debug!("symbol `{}` not loaded: {}", request.name, error);
                report.failures.push(SymbolFailure {
                    index,
                    name: request.name.to_string(),
                    error,
                });
            }
        }
    }

    log::debug!(
        "loaded {} symbols ({} already present, {} failed)",
        report.loaded,
        report.skipped,
        report.failures.len()
    );

    report
}

/// Builder collecting symbol requests against one root.
///
/// # Example
///
/// ```
/// use hostattr::{HostRef, MemoryRuntime, SymbolLoader};
///
/// let rt = MemoryRuntime::new();
/// let module = rt.new_object("module");
/// let attr = rt.new_object("attr");
/// let getter = rt.new_object("__get__");
/// rt.set_attr(module, "attr", attr);
/// rt.set_attr(attr, "__get__", getter);
///
/// let root = HostRef::from_borrowed(&rt, module);
/// let (mut attr_slot, mut getter_slot) = (None, None);
///
/// let report = SymbolLoader::new(&root)
///     .symbol("attr", &mut attr_slot)
///     .symbol("attr.__get__", &mut getter_slot)
///     .load();
///
/// assert!(report.is_complete());
/// assert_eq!(getter_slot.map(|r| r.raw()), Some(getter));
/// ```
pub struct SymbolLoader<'s, 'rt, R: HostRuntime + ?Sized> {
    root: &'s HostRef<'rt, R>,
    requests: Vec<SymbolRequest<'s, 'rt, R>>,
    ctx: ResolveContext,
}

impl<'s, 'rt, R: HostRuntime + ?Sized> SymbolLoader<'s, 'rt, R> {
    /// Start an empty set of requests against `root`.
    pub fn new(root: &'s HostRef<'rt, R>) -> Self {
        Self {
            root,
            requests: Vec::new(),
            ctx: ResolveContext::default(),
        }
    }

    /// Use a custom resolution context.
    pub fn with_context(mut self, ctx: ResolveContext) -> Self {
        self.ctx = ctx;
        self
    }

    /// Queue one request.
    pub fn symbol(mut self, name: &'s str, slot: &'s mut Option<HostRef<'rt, R>>) -> Self {
        self.requests.push(SymbolRequest::new(name, slot));
        self
    }

    /// Number of queued requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether no requests are queued.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Run the load.
    pub fn load(self) -> LoadReport {
        load_symbols_with(self.root, self.requests, &self.ctx)
    }
}
