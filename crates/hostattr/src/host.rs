//! Host runtime seam and reference-counted handles

use std::fmt;
use std::mem::ManuallyDrop;

use crate::error::HostError;

/// The object model of an external, reference-counted runtime.
///
/// Implementations supply exactly the three primitives the resolver needs.
/// Objects are identified by a cheap, copyable raw handle; ownership of a
/// count is tracked by [`HostRef`], not by the raw handle itself.
pub trait HostRuntime {
    /// Raw object handle (a pointer, an index, ...).
    type Object: Copy + Eq + fmt::Debug;

    /// Look up `name` on `object`.
    ///
    /// On success the returned object carries a new reference owned by the
    /// caller. `object`'s own count is left as it was.
    fn get_attribute(&self, object: Self::Object, name: &str) -> Result<Self::Object, HostError>;

    /// Increase `object`'s reference count.
    fn increment_reference(&self, object: Self::Object);

    /// Decrease `object`'s reference count, possibly finalising it.
    fn decrement_reference(&self, object: Self::Object);
}

/// An owned reference to a host object.
///
/// Cloning increments the host count; dropping decrements it. A `HostRef`
/// always owns exactly one count.
///
/// # Example
///
/// ```
/// use hostattr::{HostRef, MemoryRuntime};
///
/// let rt = MemoryRuntime::new();
/// let module = rt.new_object("module");
/// assert_eq!(rt.refcount(module), 1);
///
/// {
///     let handle = HostRef::from_borrowed(&rt, module);
///     let _copy = handle.clone();
///     assert_eq!(rt.refcount(module), 3);
/// }
/// assert_eq!(rt.refcount(module), 1);
/// ```
pub struct HostRef<'rt, R: HostRuntime + ?Sized> {
    runtime: &'rt R,
    raw: R::Object,
}

impl<'rt, R: HostRuntime + ?Sized> HostRef<'rt, R> {
    /// Wrap a reference the caller already owns (e.g. one returned by a lookup).
    pub fn from_owned(runtime: &'rt R, raw: R::Object) -> Self {
        Self { runtime, raw }
    }

    /// Acquire a new reference to an object the caller only borrows.
    pub fn from_borrowed(runtime: &'rt R, raw: R::Object) -> Self {
        runtime.increment_reference(raw);
        Self { runtime, raw }
    }

    /// The raw handle, without affecting ownership.
    pub fn raw(&self) -> R::Object {
        self.raw
    }

    /// Give up the handle without decrementing; the caller now owns the count.
    pub fn into_raw(self) -> R::Object {
        let this = ManuallyDrop::new(self);
        this.raw
    }

    /// The runtime this reference belongs to.
    pub fn runtime(&self) -> &'rt R {
        self.runtime
    }

    /// Look up a single attribute, returning a new owned reference.
    pub fn getattr(&self, name: &str) -> Result<HostRef<'rt, R>, HostError> {
        let raw = self.runtime.get_attribute(self.raw, name)?;
        Ok(HostRef::from_owned(self.runtime, raw))
    }

    /// Whether both references point at the same host object.
    pub fn same_object(&self, other: &HostRef<'_, R>) -> bool {
        self.raw == other.raw
    }
}

impl<R: HostRuntime + ?Sized> Clone for HostRef<'_, R> {
    fn clone(&self) -> Self {
        HostRef::from_borrowed(self.runtime, self.raw)
    }
}

impl<R: HostRuntime + ?Sized> Drop for HostRef<'_, R> {
    fn drop(&mut self) {
        self.runtime.decrement_reference(self.raw);
    }
}

impl<R: HostRuntime + ?Sized> fmt::Debug for HostRef<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HostRef").field(&self.raw).finish()
    }
}
