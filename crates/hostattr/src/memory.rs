//! In-memory host runtime
//!
//! A small reference-counted object graph that implements [`HostRuntime`]
//! with observable counts, a log of every attribute lookup, and injectable
//! host errors. Useful for dry runs of a symbol table before pointing it at
//! a real embedded runtime, and as the host for this crate's own tests.

use std::cell::{Cell, RefCell};
use std::fmt;

use indexmap::IndexMap;

use crate::error::HostError;
use crate::host::HostRuntime;

/// Handle to an object owned by a [`MemoryRuntime`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    /// Position of the object in its runtime's arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One recorded call to [`HostRuntime::get_attribute`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup {
    /// Object the lookup was performed on
    pub object: ObjectId,
    /// Attribute name requested
    pub name: String,
}

#[derive(Debug)]
struct Object {
    label: String,
    attrs: IndexMap<String, ObjectId>,
    refcount: usize,
    finalized: bool,
}

/// Reference-counted object graph living entirely in memory.
///
/// Objects start with a count of one, owned by whoever created them.
/// Attributes hold their own reference to their value. When a count drops
/// to zero the object is finalised and releases its attributes.
#[derive(Debug, Default)]
pub struct MemoryRuntime {
    objects: RefCell<Vec<Object>>,
    failures: RefCell<IndexMap<String, String>>,
    lookups: RefCell<Vec<Lookup>>,
    underflows: Cell<usize>,
}

impl MemoryRuntime {
    /// Create an empty runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new object; the caller owns its single reference.
    pub fn new_object(&self, label: impl Into<String>) -> ObjectId {
        let mut objects = self.objects.borrow_mut();
        objects.push(Object {
            label: label.into(),
            attrs: IndexMap::new(),
            refcount: 1,
            finalized: false,
        });
        ObjectId(objects.len() - 1)
    }

    /// Bind `child` as attribute `name` of `parent`.
    ///
    /// The attribute takes its own reference to `child`; a value previously
    /// bound under the same name is released.
    /// Unknown or finalised parents are left untouched and no reference is
    /// taken.
    pub fn set_attr(&self, parent: ObjectId, name: impl Into<String>, child: ObjectId) {
        let previous = match self.objects.borrow_mut().get_mut(parent.0) {
            Some(object) if !object.finalized => object.attrs.insert(name.into(), child),
            _ => return,
        };
        self.increment_reference(child);
        if let Some(previous) = previous {
            self.decrement_reference(previous);
        }
    }

    /// Make every lookup of `name` fail with a host error carrying `message`.
    pub fn fail_attribute(&self, name: impl Into<String>, message: impl Into<String>) {
        self.failures.borrow_mut().insert(name.into(), message.into());
    }

    /// Current reference count (zero for unknown or finalised objects).
    pub fn refcount(&self, id: ObjectId) -> usize {
        self.objects
            .borrow()
            .get(id.0)
            .map_or(0, |object| object.refcount)
    }

    /// Whether the object's count has reached zero.
    pub fn is_finalized(&self, id: ObjectId) -> bool {
        self.objects
            .borrow()
            .get(id.0)
            .is_some_and(|object| object.finalized)
    }

    /// The label given at creation time.
    pub fn label(&self, id: ObjectId) -> Option<String> {
        self.objects
            .borrow()
            .get(id.0)
            .map(|object| object.label.clone())
    }

    /// Every lookup performed so far, in order.
    pub fn lookups(&self) -> Vec<Lookup> {
        self.lookups.borrow().clone()
    }

    /// Names of every lookup performed so far, in order.
    pub fn lookup_names(&self) -> Vec<String> {
        self.lookups
            .borrow()
            .iter()
            .map(|lookup| lookup.name.clone())
            .collect()
    }

    /// Forget recorded lookups.
    pub fn clear_lookups(&self) {
        self.lookups.borrow_mut().clear();
    }

    /// Number of decrements applied to an object whose count was already zero.
    pub fn underflows(&self) -> usize {
        self.underflows.get()
    }

    fn finalize(&self, id: ObjectId) {
        let released = match self.objects.borrow_mut().get_mut(id.0) {
            Some(object) => {
                object.finalized = true;
                std::mem::take(&mut object.attrs)
            }
            None => return,
        };
        for (_, child) in released {
            self.decrement_reference(child);
        }
    }
}

impl HostRuntime for MemoryRuntime {
    type Object = ObjectId;

    fn get_attribute(&self, object: ObjectId, name: &str) -> Result<ObjectId, HostError> {
        self.lookups.borrow_mut().push(Lookup {
            object,
            name: name.to_string(),
        });

        if let Some(message) = self.failures.borrow().get(name) {
            return Err(HostError::Host(message.clone()));
        }

        let found = {
            let objects = self.objects.borrow();
            let target = objects
                .get(object.0)
                .ok_or_else(|| HostError::Host(format!("unknown object {}", object)))?;
            if target.finalized {
                return Err(HostError::Host(format!(
                    "lookup on finalized object {}",
                    object
                )));
            }
            target.attrs.get(name).copied()
        };

        match found {
            Some(child) => {
                self.increment_reference(child);
                Ok(child)
            }
            None => Err(HostError::MissingAttribute {
                name: name.to_string(),
            }),
        }
    }

    fn increment_reference(&self, object: ObjectId) {
        if let Some(target) = self.objects.borrow_mut().get_mut(object.0) {
            target.refcount += 1;
        }
    }

    fn decrement_reference(&self, object: ObjectId) {
        let reached_zero = match self.objects.borrow_mut().get_mut(object.0) {
            Some(target) if target.refcount == 0 => {
                self.underflows.set(self.underflows.get() + 1);
                false
            }
            Some(target) => {
                target.refcount -= 1;
                target.refcount == 0
            }
            None => false,
        };
        if reached_zero {
            self.finalize(object);
        }
    }
}
