//! C ABI for embedding layers
//!
//! Exposes the resolver and the bulk loader to native code that already
//! holds raw object pointers and the runtime's three reference primitives.
//! The bulk loader keeps the classic calling convention of a NULL-terminated
//! list of names with one output slot per name.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;
use std::ptr::{self, NonNull};

use crate::error::HostError;
use crate::host::{HostRef, HostRuntime};
use crate::loader::{load_symbols, SymbolRequest};
use crate::resolve::resolve;

/// The host runtime's object primitives as C function pointers.
///
/// `get_attribute` must return a new reference, or null if the lookup
/// failed. Names are NUL-terminated UTF-8.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct HostVTable {
    /// Look up a named attribute, returning a new reference or null
    pub get_attribute: unsafe extern "C" fn(object: *mut c_void, name: *const c_char) -> *mut c_void,

    /// Increase an object's reference count
    pub increment_reference: unsafe extern "C" fn(object: *mut c_void),

    /// Decrease an object's reference count
    pub decrement_reference: unsafe extern "C" fn(object: *mut c_void),
}

/// A [`HostRuntime`] backed by a [`HostVTable`].
pub struct VTableRuntime<'v> {
    vtable: &'v HostVTable,
}

impl<'v> VTableRuntime<'v> {
    /// Wrap a table of host primitives.
    ///
    /// # Safety
    ///
    /// Every function in `vtable` must be safe to call with any live object
    /// pointer handed to this runtime, and must follow the ownership rules
    /// documented on [`HostVTable`].
    pub unsafe fn new(vtable: &'v HostVTable) -> Self {
        Self { vtable }
    }
}

impl HostRuntime for VTableRuntime<'_> {
    type Object = NonNull<c_void>;

    fn get_attribute(&self, object: Self::Object, name: &str) -> Result<Self::Object, HostError> {
        let c_name = CString::new(name).map_err(|_| {
            HostError::Host(format!("attribute name {:?} contains a NUL byte", name))
        })?;
        // SAFETY: upheld by the contract of `VTableRuntime::new`
        let raw = unsafe { (self.vtable.get_attribute)(object.as_ptr(), c_name.as_ptr()) };
        NonNull::new(raw).ok_or_else(|| HostError::MissingAttribute {
            name: name.to_string(),
        })
    }

    fn increment_reference(&self, object: Self::Object) {
        // SAFETY: upheld by the contract of `VTableRuntime::new`
        unsafe { (self.vtable.increment_reference)(object.as_ptr()) }
    }

    fn decrement_reference(&self, object: Self::Object) {
        // SAFETY: upheld by the contract of `VTableRuntime::new`
        unsafe { (self.vtable.decrement_reference)(object.as_ptr()) }
    }
}

/// Resolve a dotted `path` from `root`.
///
/// Returns a new reference owned by the caller, or null on any failure
/// (null arguments, malformed path, failed lookup).
///
/// # Safety
///
/// `vtable` must be null or point to a valid [`HostVTable`]; `root` must be
/// null or a live object of that runtime; `path` must be null or a valid
/// NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn hostattr_resolve(
    vtable: *const HostVTable,
    root: *mut c_void,
    path: *const c_char,
) -> *mut c_void {
    // SAFETY: caller guarantees `vtable` is null or valid
    let Some(vtable) = (unsafe { vtable.as_ref() }) else {
        return ptr::null_mut();
    };
    let Some(root) = NonNull::new(root) else {
        return ptr::null_mut();
    };
    if path.is_null() {
        return ptr::null_mut();
    }
    // SAFETY: non-null and NUL-terminated per the caller contract
    let Ok(path) = (unsafe { CStr::from_ptr(path) }).to_str() else {
        log::warn!("hostattr_resolve: path is not valid UTF-8");
        return ptr::null_mut();
    };

    // SAFETY: caller guarantees the table is valid for `root`'s runtime
    let runtime = unsafe { VTableRuntime::new(vtable) };
    let root = HostRef::from_borrowed(&runtime, root);

    #[allow(clippy::let_and_return)]
    let found = match resolve(&root, path) {
        Ok(found) => found.into_raw().as_ptr(),
        Err(err) => {
            log::debug!("hostattr_resolve: {}", err);
            ptr::null_mut()
        }
    };
    found
}

/// Fill `slots[i]` with the object at `names[i]`, for every name before the
/// terminating null.
///
/// Slots that are non-null on entry are left untouched. Failed requests
/// leave their slot null. Returns the number of failed requests; a request
/// whose name is empty or not UTF-8, or whose slot pointer is null, counts
/// as failed; later names are still loaded.
/// Null `vtable`, `root` or `names` fail the whole call and return `usize::MAX`.
///
/// # Safety
///
/// `vtable` and `root` as for [`hostattr_resolve`]. `names` must be null or
/// a null-terminated array of NUL-terminated strings, and `slots` must have
/// at least as many entries as `names` has before its terminator, each null
/// or pointing at a writable object pointer.
#[no_mangle]
pub unsafe extern "C" fn hostattr_load_symbols(
    vtable: *const HostVTable,
    root: *mut c_void,
    names: *const *const c_char,
    slots: *const *mut *mut c_void,
) -> usize {
    // SAFETY: caller guarantees `vtable` is null or valid
    let Some(vtable) = (unsafe { vtable.as_ref() }) else {
        return usize::MAX;
    };
    let Some(root) = NonNull::new(root) else {
        return usize::MAX;
    };
    if names.is_null() || slots.is_null() {
        return usize::MAX;
    }

    // SAFETY: caller guarantees the table is valid for `root`'s runtime
    let runtime = unsafe { VTableRuntime::new(vtable) };
    let root = HostRef::from_borrowed(&runtime, root);

    let mut malformed = 0;
    let mut pending: Vec<(&str, *mut *mut c_void, Option<HostRef<'_, VTableRuntime<'_>>>)> =
        Vec::new();

    for index in 0.. {
        // SAFETY: `names` is null-terminated, so every index up to the
        // terminator is in bounds
        let name = unsafe { *names.add(index) };
        if name.is_null() {
            break;
        }
        // SAFETY: `slots` has an entry for every name before the terminator
        let out = unsafe { *slots.add(index) };
        // SAFETY: non-null and NUL-terminated per the caller contract
        let Ok(name) = (unsafe { CStr::from_ptr(name) }).to_str() else {
            log::warn!("hostattr_load_symbols: name {} is not valid UTF-8", index);
            malformed += 1;
            continue;
        };
        // Only NULL terminates the list; an empty name is a failed request
        if name.is_empty() {
            log::warn!("hostattr_load_symbols: name {} is empty", index);
            malformed += 1;
            continue;
        }
        if out.is_null() {
            log::warn!("hostattr_load_symbols: no slot for `{}`", name);
            malformed += 1;
            continue;
        }
        // SAFETY: `out` points at a writable object pointer
        let existing = unsafe { *out };
        if !existing.is_null() {
            continue;
        }
        pending.push((name, out, None));
    }

    let report = load_symbols(
        &root,
        pending
            .iter_mut()
            .map(|(name, _, slot)| SymbolRequest::new(*name, slot)),
    );

    for (_, out, slot) in pending {
        if let Some(found) = slot {
            // SAFETY: checked non-null above; still owned by the caller
            unsafe { *out = found.into_raw().as_ptr() };
        }
    }

    malformed + report.failures.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    struct Node {
        refs: Cell<usize>,
        attrs: RefCell<Vec<(String, *mut c_void)>>,
    }

    impl Node {
        fn new() -> Box<Node> {
            Box::new(Node {
                refs: Cell::new(1),
                attrs: RefCell::new(Vec::new()),
            })
        }

        fn ptr(&self) -> *mut c_void {
            self as *const Node as *mut c_void
        }

        fn set(&self, name: &str, child: &Node) {
            child.refs.set(child.refs.get() + 1);
            self.attrs.borrow_mut().push((name.to_string(), child.ptr()));
        }
    }

    unsafe extern "C" fn node_getattr(object: *mut c_void, name: *const c_char) -> *mut c_void {
        let node = &*(object as *const Node);
        let name = CStr::from_ptr(name).to_str().unwrap();
        for (attr, child) in node.attrs.borrow().iter() {
            if attr == name {
                node_incref(*child);
                return *child;
            }
        }
        ptr::null_mut()
    }

    unsafe extern "C" fn node_incref(object: *mut c_void) {
        let node = &*(object as *const Node);
        node.refs.set(node.refs.get() + 1);
    }

    unsafe extern "C" fn node_decref(object: *mut c_void) {
        let node = &*(object as *const Node);
        node.refs.set(node.refs.get() - 1);
    }

    const VTABLE: HostVTable = HostVTable {
        get_attribute: node_getattr,
        increment_reference: node_incref,
        decrement_reference: node_decref,
    };

    #[test]
    fn test_resolve_through_vtable() {
        let (root, a, b) = (Node::new(), Node::new(), Node::new());
        root.set("a", &a);
        a.set("b", &b);
        let path = CString::new("a.b").unwrap();

        let found = unsafe { hostattr_resolve(&VTABLE, root.ptr(), path.as_ptr()) };
        assert_eq!(found, b.ptr());
        assert_eq!(b.refs.get(), 3);
        assert_eq!(a.refs.get(), 2);
        assert_eq!(root.refs.get(), 1);
    }

    #[test]
    fn test_resolve_failures_return_null() {
        let root = Node::new();
        let missing = CString::new("nope").unwrap();
        let empty = CString::new("").unwrap();

        unsafe {
            assert!(hostattr_resolve(&VTABLE, root.ptr(), missing.as_ptr()).is_null());
            assert!(hostattr_resolve(&VTABLE, root.ptr(), empty.as_ptr()).is_null());
            assert!(hostattr_resolve(&VTABLE, root.ptr(), ptr::null()).is_null());
            assert!(hostattr_resolve(ptr::null(), root.ptr(), missing.as_ptr()).is_null());
        }
        assert_eq!(root.refs.get(), 1);
    }

    #[test]
    fn test_load_symbols_partial() {
        let (root, a, attr, c) = (Node::new(), Node::new(), Node::new(), Node::new());
        root.set("valid", &a);
        a.set("attr", &attr);
        root.set("valid2", &c);

        let names = [
            CString::new("valid.attr").unwrap(),
            CString::new("missing.attr").unwrap(),
            CString::new("valid2").unwrap(),
        ];
        let name_ptrs = [
            names[0].as_ptr(),
            names[1].as_ptr(),
            names[2].as_ptr(),
            ptr::null(),
        ];
        let mut slot_a: *mut c_void = ptr::null_mut();
        let mut slot_b: *mut c_void = ptr::null_mut();
        let mut slot_c: *mut c_void = ptr::null_mut();
        let slot_ptrs: [*mut *mut c_void; 3] = [&mut slot_a, &mut slot_b, &mut slot_c];

        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), name_ptrs.as_ptr(), slot_ptrs.as_ptr())
        };

        assert_eq!(failed, 1);
        assert_eq!(slot_a, attr.ptr());
        assert!(slot_b.is_null());
        assert_eq!(slot_c, c.ptr());
        assert_eq!(root.refs.get(), 1);
        assert_eq!(a.refs.get(), 2);
    }

    #[test]
    fn test_load_symbols_skips_filled_slots() {
        let (root, a) = (Node::new(), Node::new());
        root.set("a", &a);
        let name = CString::new("a").unwrap();
        let name_ptrs = [name.as_ptr(), ptr::null()];

        let mut slot: *mut c_void = a.ptr();
        let slot_ptrs: [*mut *mut c_void; 1] = [&mut slot];
        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), name_ptrs.as_ptr(), slot_ptrs.as_ptr())
        };

        assert_eq!(failed, 0);
        assert_eq!(slot, a.ptr());
        assert_eq!(a.refs.get(), 2);
    }

    #[test]
    fn test_load_symbols_null_slot_counts_as_failure() {
        let (root, a) = (Node::new(), Node::new());
        root.set("a", &a);
        let name = CString::new("a").unwrap();
        let name_ptrs = [name.as_ptr(), ptr::null()];
        let slot_ptrs: [*mut *mut c_void; 1] = [ptr::null_mut()];

        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), name_ptrs.as_ptr(), slot_ptrs.as_ptr())
        };
        assert_eq!(failed, 1);
        assert_eq!(a.refs.get(), 2);
    }

    #[test]
    fn test_load_symbols_empty_name_is_not_terminator() {
        let (root, a) = (Node::new(), Node::new());
        root.set("a", &a);
        let empty = CString::new("").unwrap();
        let name = CString::new("a").unwrap();
        let name_ptrs = [empty.as_ptr(), name.as_ptr(), ptr::null()];

        let mut slot_empty: *mut c_void = ptr::null_mut();
        let mut slot_a: *mut c_void = ptr::null_mut();
        let slot_ptrs: [*mut *mut c_void; 2] = [&mut slot_empty, &mut slot_a];

        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), name_ptrs.as_ptr(), slot_ptrs.as_ptr())
        };

        assert_eq!(failed, 1);
        assert!(slot_empty.is_null());
        assert_eq!(slot_a, a.ptr());
        assert_eq!(a.refs.get(), 3);
    }

    #[test]
    fn test_load_symbols_invalid_utf8_name_counted() {
        let (root, a, b) = (Node::new(), Node::new(), Node::new());
        root.set("a", &a);
        root.set("b", &b);
        let invalid = CString::new(vec![0xff, 0xfe]).unwrap();
        let empty = CString::new("").unwrap();
        let name_a = CString::new("a").unwrap();
        let name_b = CString::new("b").unwrap();
        let name_ptrs = [
            name_a.as_ptr(),
            invalid.as_ptr(),
            empty.as_ptr(),
            name_b.as_ptr(),
            ptr::null(),
        ];

        let mut slots: [*mut c_void; 4] = [ptr::null_mut(); 4];
        let base = slots.as_mut_ptr();
        // SAFETY: every offset is inside `slots`
        let slot_ptrs: [*mut *mut c_void; 4] =
            unsafe { [base, base.add(1), base.add(2), base.add(3)] };

        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), name_ptrs.as_ptr(), slot_ptrs.as_ptr())
        };

        assert_eq!(failed, 2);
        assert_eq!(slots[0], a.ptr());
        assert!(slots[1].is_null());
        assert!(slots[2].is_null());
        assert_eq!(slots[3], b.ptr());
        assert_eq!(root.refs.get(), 1);
    }

    #[test]
    fn test_load_symbols_null_arguments() {
        let root = Node::new();
        let failed = unsafe {
            hostattr_load_symbols(&VTABLE, root.ptr(), ptr::null(), ptr::null())
        };
        assert_eq!(failed, usize::MAX);
    }

    #[test]
    fn test_nul_in_name_is_host_error() {
        let root = Node::new();
        let runtime = unsafe { VTableRuntime::new(&VTABLE) };
        let raw = NonNull::new(root.ptr()).unwrap();
        let err = runtime.get_attribute(raw, "a\0b").unwrap_err();
        assert!(matches!(err, HostError::Host(_)));
    }
}
