//! Hooks a tracing collector plugs into.
//!
//! The VM owns no heap objects yet, so nothing here runs on its own. A collector
//! implements [`Tracer`] and [`Collector`]; the VM (and any chunk still under
//! construction) implement [`Trace`] to hand their roots over before a pass.

use crate::value::Value;

pub trait Tracer {
    /// Handle to a heap object, defined by the collector.
    type Object;

    fn mark_value(&mut self, value: Value);

    fn mark_object(&mut self, object: &Self::Object);
}

pub trait Trace {
    fn trace<T: Tracer>(&self, tracer: &mut T);
}

pub trait Collector {
    /// Marks everything reachable from `roots`, then reclaims the rest.
    fn collect_garbage<R: Trace + ?Sized>(&mut self, roots: &R);
}

impl Trace for Value {
    fn trace<T: Tracer>(&self, tracer: &mut T) {
        tracer.mark_value(*self);
    }
}

impl<V: Trace> Trace for [V] {
    fn trace<T: Tracer>(&self, tracer: &mut T) {
        for value in self {
            value.trace(tracer);
        }
    }
}
