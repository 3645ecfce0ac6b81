#![cfg(feature = "auto-register")]

use std::{marker::PhantomData, sync::Arc};

use rigging::{
    auto_registered_constructibles, register_constructible, Arguments, BindingError, Error,
    Injectable, Injector, Key, ResolutionError,
};

#[Injectable]
struct Registered;

#[Injectable(auto_register = false)]
struct Unregistered;

struct ByHand(i32);

impl Injectable for ByHand {
    fn construct(_: Arguments) -> rigging::Result<Self> {
        Ok(ByHand(11))
    }
}

register_constructible!(ByHand);

#[Injectable(auto_register = false)]
struct Wrapper<T: Send + Sync + 'static> {
    inner: Arc<T>,
}

#[Injectable(auto_register = false)]
struct Tagged<T: Send + Sync + 'static>(#[di(default)] PhantomData<fn() -> T>);

#[test]
fn injectable_types_are_collected() {
    let keys = auto_registered_constructibles()
        .map(|constructible| *constructible.key())
        .collect::<Vec<_>>();

    assert!(keys.contains(&Key::of::<Registered>()));
    assert!(keys.contains(&Key::of::<ByHand>()));
    assert!(!keys.contains(&Key::of::<Unregistered>()));
}

#[test]
fn collected_types_are_constructible() {
    let injector = Injector::new();

    assert!(injector.is_constructible::<Registered>());
    assert!(injector.is_constructible::<ByHand>());
    assert!(injector.is_constructible::<i32>());
    assert!(!injector.is_constructible::<Unregistered>());

    assert!(injector.get::<Registered>().is_ok());
    assert_eq!(injector.get::<ByHand>().unwrap().0, 11);
}

#[test]
fn collection_can_be_turned_off() {
    let injector = Injector::options().auto_register(false).build();

    assert!(!injector.is_constructible::<Registered>());
    assert!(injector.is_constructible::<String>());

    let err = injector.get::<Registered>().err().unwrap();
    assert!(matches!(
        err,
        Error::Resolution(ResolutionError::NoBinding { .. })
    ));
}

#[test]
fn unregistered_type_needs_a_target() {
    let injector = Injector::new();

    let err = injector.bind_self::<Unregistered>().unwrap_err();
    assert!(matches!(
        err,
        Error::Binding(BindingError::UndeterminedProvider { .. })
    ));

    injector
        .bind::<Unregistered>(|b| b.to_class::<Unregistered>())
        .unwrap();
    assert!(injector.get::<Unregistered>().is_ok());
}

#[test]
fn explicit_constructible() {
    let injector = Injector::options()
        .auto_register(false)
        .constructible::<Unregistered>()
        .build();

    assert!(injector.is_constructible::<Unregistered>());
    assert!(injector.get::<Unregistered>().is_ok());
}

#[test]
fn generic_types_are_registered_explicitly() {
    let injector = Injector::options()
        .constructible::<Wrapper<Registered>>()
        .constructible::<Tagged<u8>>()
        .build();

    assert!(injector.get::<Wrapper<Registered>>().is_ok());
    assert!(injector.get::<Tagged<u8>>().is_ok());
    assert!(!injector.is_constructible::<Wrapper<ByHand>>());
}
