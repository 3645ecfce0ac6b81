use std::{
    marker::PhantomData,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
    time::Duration,
};

use rigging::{
    Arguments, Context, DynInstance, Injectable, Injector, Provider, SingletonScope,
};

use crate::components::{Consumer, ImplA, Service};

mod components;

static SLOW_CONSTRUCTED: AtomicUsize = AtomicUsize::new(0);

struct Slow;

impl Injectable for Slow {
    fn construct(_: Arguments) -> rigging::Result<Self> {
        SLOW_CONSTRUCTED.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        Ok(Slow)
    }
}

#[test]
fn injector_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}

    assert_send_sync::<Injector>();
    assert_send_sync::<rigging::RequestScope>();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn singleton_is_produced_once() {
    let injector = Arc::new(Injector::new());
    injector
        .bind::<Slow>(|b| b.to_class::<Slow>().scope::<SingletonScope>())
        .unwrap();

    let handles = (0..8)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || injector.get::<Slow>().unwrap())
        })
        .collect::<Vec<_>>();

    let mut instances = Vec::with_capacity(handles.len());
    for handle in handles {
        instances.push(handle.await.unwrap());
    }

    assert_eq!(SLOW_CONSTRUCTED.load(Ordering::SeqCst), 1);
    assert!(instances
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolution_has_no_false_cycles() {
    let injector = Arc::new(Injector::new());
    injector
        .bind::<dyn Service>(|b| b.to_class::<ImplA>())
        .unwrap();

    let handles = (0..16)
        .map(|_| {
            let injector = injector.clone();
            tokio::task::spawn_blocking(move || {
                (0..100)
                    .map(|_| injector.get::<Consumer>().map(|consumer| consumer.service.name()))
                    .collect::<rigging::Result<Vec<_>>>()
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        let names = handle.await.unwrap().unwrap();
        assert!(names.iter().all(|name| *name == "a"));
    }
}

#[test]
fn binding_while_resolving_on_other_threads() {
    let injector = Injector::new();
    injector.bind::<i32>(|b| b.to_value(0)).unwrap();

    thread::scope(|s| {
        let reader = s.spawn(|| {
            (0..1000)
                .map(|_| *injector.get::<i32>().unwrap())
                .all(|value| (0..100).contains(&value))
        });

        for value in 1..100 {
            injector.bind::<i32>(|b| b.to_value(value)).unwrap();
        }

        assert!(reader.join().unwrap());
    });

    assert_eq!(*injector.get::<i32>().unwrap(), 99);
}

#[derive(Default)]
struct North;

#[derive(Default)]
struct South;

/// Produces `K` after resolving `D`. The first call waits for the other thread.
struct Crossing<K, D> {
    barrier: Arc<Barrier>,
    waited: AtomicBool,
    _marker: PhantomData<fn() -> (K, D)>,
}

impl<K, D> Crossing<K, D> {
    fn new(barrier: Arc<Barrier>) -> Self {
        Self {
            barrier,
            waited: AtomicBool::new(false),
            _marker: PhantomData,
        }
    }
}

impl<K, D> Provider for Crossing<K, D>
where
    K: Default + Send + Sync + 'static,
    D: Send + Sync + 'static,
{
    fn provide(&self, cx: &mut Context<'_>) -> rigging::Result<DynInstance> {
        if !self.waited.swap(true, Ordering::SeqCst) {
            self.barrier.wait();
        }

        cx.resolve::<D>()?;
        Ok(DynInstance::new(Arc::new(K::default())))
    }
}

#[test]
fn singleton_cycle_across_threads_fails() {
    let barrier = Arc::new(Barrier::new(2));

    let injector = Injector::new();
    injector
        .bind::<North>(|b| {
            b.to_provider(Crossing::<North, South>::new(barrier.clone()))
                .scope::<SingletonScope>()
        })
        .unwrap();
    injector
        .bind::<South>(|b| {
            b.to_provider(Crossing::<South, North>::new(barrier.clone()))
                .scope::<SingletonScope>()
        })
        .unwrap();

    let (north, south) = thread::scope(|s| {
        let north = s.spawn(|| injector.get::<North>().map(|_| ()));
        let south = s.spawn(|| injector.get::<South>().map(|_| ()));

        (north.join().unwrap(), south.join().unwrap())
    });

    assert!(north.is_err_and(|e| e.is_circular()));
    assert!(south.is_err_and(|e| e.is_circular()));
    assert!(!injector.contains_singleton::<North>());
    assert!(!injector.contains_singleton::<South>());
}
