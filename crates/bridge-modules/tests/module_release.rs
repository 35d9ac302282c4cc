//! Integration tests for deferred release of module implementations

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bridge_modules::{
    DescriptorBuilder, IdAllocator, InvokeError, ModuleInterface, ModuleRegistry, Operation,
    Reflect, ReleaseQueue, Surface, Value,
};

/// Module that counts how often it has been released
struct Instrumented {
    calls: AtomicUsize,
    released: Arc<AtomicUsize>,
    queue: ReleaseQueue,
}

impl Drop for Instrumented {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl ModuleInterface for Instrumented {
    fn module_name(&self) -> String {
        "RCTInstrumented".to_string()
    }

    fn methods_to_export(&self) -> Vec<Operation<Self>> {
        vec![Operation::method("touch", |m: &Instrumented, _: &[Value]| {
            Ok(Value::from(m.calls.fetch_add(1, Ordering::SeqCst) as f64 + 1.0))
        })]
    }
}

impl Reflect for Instrumented {
    fn surface() -> Surface<Self> {
        Surface::new()
            .with_interface()
            .method("drainDuringCall", |m: &Instrumented, _: &[Value]| {
                let drained = m.queue.drain();
                Ok(Value::List(vec![
                    Value::from(drained as f64),
                    Value::from(m.released.load(Ordering::SeqCst) as f64),
                ]))
            })
    }
}

fn setup() -> (Arc<AtomicUsize>, ReleaseQueue, DescriptorBuilder) {
    let released = Arc::new(AtomicUsize::new(0));
    let queue = ReleaseQueue::new();
    let ids: Arc<dyn IdAllocator> = Arc::new(ModuleRegistry::new());
    let builder = DescriptorBuilder::new(ids, queue.clone());
    (released, queue, builder)
}

fn instrumented(released: &Arc<AtomicUsize>, queue: &ReleaseQueue) -> Instrumented {
    Instrumented {
        calls: AtomicUsize::new(0),
        released: Arc::clone(released),
        queue: queue.clone(),
    }
}

#[test]
fn test_release_happens_once_after_drain() {
    let (released, queue, builder) = setup();
    let d = builder.build(instrumented(&released, &queue)).unwrap();

    for expected in 1..=5 {
        assert_eq!(d.method(0).invoke(&[]).unwrap(), Value::from(expected));
    }

    drop(d);
    assert_eq!(released.load(Ordering::SeqCst), 0);
    assert_eq!(queue.pending(), 1);

    assert_eq!(queue.drain(), 1);
    assert_eq!(released.load(Ordering::SeqCst), 1);

    assert_eq!(queue.drain(), 0);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_release_without_any_calls() {
    let (released, queue, builder) = setup();
    drop(builder.build(instrumented(&released, &queue)).unwrap());
    queue.drain();
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_drain_during_call_defers_free_until_return() {
    let (released, queue, builder) = setup();
    let d = builder.build(instrumented(&released, &queue)).unwrap();
    let method = d.method(1).clone();
    assert_eq!(method.name(), "drainDuringCall");

    drop(d);
    let result = method.invoke(&[]).unwrap();

    // Drained one handle, but the object was still alive inside the call.
    assert_eq!(result, Value::from(vec![1, 0]));
    assert_eq!(released.load(Ordering::SeqCst), 1);
    assert!(queue.is_empty());
}

#[test]
fn test_invoke_after_release_reports_module() {
    let (released, queue, builder) = setup();
    let d = builder.build(instrumented(&released, &queue)).unwrap();
    let touch = d.method(0).clone();

    drop(d);
    queue.drain();

    assert_eq!(
        touch.invoke(&[]).unwrap_err(),
        InvokeError::ModuleReleased {
            module: "Instrumented".to_string()
        }
    );
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_build_does_not_queue() {
    struct NoInterface(Arc<AtomicUsize>);

    impl Drop for NoInterface {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Reflect for NoInterface {
        fn surface() -> Surface<Self> {
            Surface::new()
        }
    }

    let (released, queue, builder) = setup();
    assert!(builder.build(NoInterface(Arc::clone(&released))).is_err());
    assert!(queue.is_empty());
    assert_eq!(released.load(Ordering::SeqCst), 1);
}
