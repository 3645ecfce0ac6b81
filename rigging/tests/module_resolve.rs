use std::{
    any,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Barrier,
    },
    thread,
    time::Duration,
};

use rigging::{modules, Error, Injector, Key, Module, ResolveModule};

use crate::components::{init_tracing, Plain};

mod components;

struct Database;

impl Module for Database {
    fn configure(injector: &Injector) -> rigging::Result<()> {
        injector.bind::<String>(|b| b.to_value(String::from("postgres://localhost")))?;
        injector.bind::<u16>(|b| b.to_value(5432_u16))
    }
}

struct Cache;

impl Module for Cache {
    fn configure(injector: &Injector) -> rigging::Result<()> {
        injector.bind::<u32>(|b| b.to_value(64_u32))
    }
}

struct App;

impl Module for App {
    fn submodules() -> Option<Vec<ResolveModule>> {
        Some(modules![Database, Cache])
    }

    fn configure(injector: &Injector) -> rigging::Result<()> {
        injector.bind::<u16>(|b| b.to_value(8080_u16))
    }
}

struct Broken;

impl Module for Broken {
    fn configure(injector: &Injector) -> rigging::Result<()> {
        injector.bind::<Plain>(|b| b)
    }
}

static COUNTED_CONFIGURED: AtomicUsize = AtomicUsize::new(0);

struct Counted;

impl Module for Counted {
    fn configure(injector: &Injector) -> rigging::Result<()> {
        COUNTED_CONFIGURED.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        injector.bind::<i64>(|b| b.to_value(1_i64))
    }
}

#[test]
fn resolve_module() {
    let module = ResolveModule::new::<App>();

    assert_eq!(*module.key(), Key::of::<App>());
    assert_eq!(module.key().name, any::type_name::<App>());
}

#[test]
fn submodules_are_installed_first() {
    init_tracing();

    let injector = Injector::create(modules![App]).unwrap();

    assert_eq!(*injector.get::<String>().unwrap(), "postgres://localhost");
    assert_eq!(*injector.get::<u32>().unwrap(), 64);
    assert_eq!(*injector.get::<u16>().unwrap(), 8080);

    assert_eq!(
        injector.loaded_modules(),
        [Key::of::<Database>(), Key::of::<Cache>(), Key::of::<App>()]
    );
}

#[test]
fn installed_modules_are_skipped() {
    let injector = Injector::create(modules![Database, App]).unwrap();

    // overridden by `App`, `Database` does not run again
    assert_eq!(*injector.get::<u16>().unwrap(), 8080);

    injector.install(modules![Database]).unwrap();
    assert_eq!(*injector.get::<u16>().unwrap(), 8080);

    assert_eq!(injector.loaded_modules().len(), 3);
}

#[test]
fn no_modules() {
    let injector = Injector::create(modules![]).unwrap();

    assert!(injector.loaded_modules().is_empty());
    assert_eq!(injector.bindings_len(), 0);
}

#[test]
fn configure_error_is_returned() {
    let injector = Injector::new();

    let err = injector.install(modules![Cache, Broken]).unwrap_err();

    assert!(matches!(err, Error::Binding(_)));
    assert!(injector.contains_binding::<u32>());
}

#[test]
fn options_create() {
    let err = Injector::options()
        .allow_override(false)
        .create(modules![App])
        .err()
        .unwrap();

    assert!(err.is_binding());
}

#[test]
fn concurrent_installs_configure_once() {
    let injector = Injector::new();
    let barrier = Barrier::new(4);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                barrier.wait();
                injector.install(modules![Counted]).unwrap();
            });
        }
    });

    assert_eq!(COUNTED_CONFIGURED.load(Ordering::SeqCst), 1);
    assert_eq!(injector.loaded_modules(), [Key::of::<Counted>()]);
    assert_eq!(*injector.get::<i64>().unwrap(), 1);
}
