//! Dotted path resolution against a host object

use crate::context::ResolveContext;
use crate::error::{ResolveError, Result};
use crate::host::{HostRef, HostRuntime};
use crate::path::AttrPath;

/// Resolve a dotted path starting at `root`, using the default context.
///
/// Returns a new reference owned by the caller. `root` is only borrowed and
/// its count is unchanged when this returns, on success and on failure.
///
/// # Errors
///
/// Returns `InvalidPath` if `path` is empty or has an empty segment; no
/// lookups are performed in that case.
/// Returns `AttributeLookup` if any segment, intermediate or final, cannot
/// be looked up. Later segments are never looked up.
///
/// # Example
///
/// ```
/// use hostattr::{resolve, HostRef, MemoryRuntime};
///
/// let rt = MemoryRuntime::new();
/// let os = rt.new_object("os");
/// let path = rt.new_object("os.path");
/// let join = rt.new_object("join");
/// rt.set_attr(os, "path", path);
/// rt.set_attr(path, "join", join);
///
/// let root = HostRef::from_borrowed(&rt, os);
/// let found = resolve(&root, "path.join").unwrap();
/// assert_eq!(found.raw(), join);
/// assert!(resolve(&root, "path.split").is_err());
/// ```
pub fn resolve<'rt, R>(root: &HostRef<'rt, R>, path: &str) -> Result<HostRef<'rt, R>>
where
    R: HostRuntime + ?Sized,
{
    resolve_with(root, path, &ResolveContext::default())
}

/// Resolve a dotted path with an explicit context.
///
/// # Errors
///
/// See [`resolve`]; additionally returns `TooManySegments` when the path is
/// longer than `ctx.max_segments`.
pub fn resolve_with<'rt, R>(
    root: &HostRef<'rt, R>,
    path: &str,
    ctx: &ResolveContext,
) -> Result<HostRef<'rt, R>>
where
    R: HostRuntime + ?Sized,
{
    let parsed = AttrPath::parse(path).map_err(|source| ResolveError::InvalidPath {
        path: path.to_string(),
        source,
    })?;
    resolve_path_with(root, &parsed, ctx)
}

/// Resolve an already-validated path, using the default context.
///
/// # Errors
///
/// See [`resolve_with`].
pub fn resolve_path<'rt, R>(root: &HostRef<'rt, R>, path: &AttrPath) -> Result<HostRef<'rt, R>>
where
    R: HostRuntime + ?Sized,
{
    resolve_path_with(root, path, &ResolveContext::default())
}

/// Resolve an already-validated path with an explicit context.
///
/// # Errors
///
/// See [`resolve_with`].
pub fn resolve_path_with<'rt, R>(
    root: &HostRef<'rt, R>,
    path: &AttrPath,
    ctx: &ResolveContext,
) -> Result<HostRef<'rt, R>>
where
    R: HostRuntime + ?Sized,
{
    if path.len() > ctx.max_segments {
        return Err(ResolveError::TooManySegments {
            path: path.to_string(),
            segments: path.len(),
            max: ctx.max_segments,
        });
    }

    // Exactly one owned reference is carried from step to step
    let mut current = root.clone();

    for (index, segment) in path.segments().enumerate() {
        if ctx.trace {
            log::trace!("{}: looking up `{}` on {:?}", path, segment, current.raw());
        }

        let next = current.getattr(segment);
        drop(current);

        current = match next {
            Ok(found) => found,
            Err(source) => {
                return Err(ResolveError::AttributeLookup {
                    path: path.to_string(),
                    segment: segment.to_string(),
                    index,
                    source,
                });
            }
        };
    }

    Ok(current)
}
