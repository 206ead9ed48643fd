//! Shared fixtures for integration tests

#![allow(dead_code)]

use hostattr::{MemoryRuntime, ObjectId};

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `root.a.b.c`, plus a sibling `root.valid2`.
pub struct Graph {
    pub root: ObjectId,
    pub a: ObjectId,
    pub b: ObjectId,
    pub c: ObjectId,
    pub valid2: ObjectId,
}

/// Build the standard fixture graph and drop the creator references of every
/// non-root object, so their counts are owned by the graph alone.
pub fn graph(rt: &MemoryRuntime) -> Graph {
    let root = rt.new_object("root");
    let a = rt.new_object("a");
    let b = rt.new_object("b");
    let c = rt.new_object("c");
    let valid2 = rt.new_object("valid2");

    rt.set_attr(root, "a", a);
    rt.set_attr(a, "b", b);
    rt.set_attr(b, "c", c);
    rt.set_attr(root, "valid2", valid2);

    for id in [a, b, c, valid2] {
        hostattr::HostRuntime::decrement_reference(rt, id);
    }

    Graph {
        root,
        a,
        b,
        c,
        valid2,
    }
}
