use std::{fmt, sync::Arc};

use crate::{ClassProvider, Injectable, Key, Provider, RequestScopeOptions};

/// A type the injector may bind to itself.
///
/// Binding a constructible key without a target, or resolving it without any
/// binding, uses a class provider constructing the type itself.
///
/// Constructible types are collected from `#[Injectable]` items (with the
/// `auto-register` feature), registered explicitly with
/// [`InjectorOptions::constructible`](crate::InjectorOptions::constructible),
/// or built in: `bool`, `char`, `String`, the integer and float types, and
/// [`RequestScopeOptions`].
#[derive(Clone, Copy)]
pub struct Constructible {
    key: Key,
    provider: fn() -> Arc<dyn Provider>,
}

impl Constructible {
    /// Returns the constructible entry of `C`.
    pub fn of<C: Injectable>() -> Self {
        fn provider<C: Injectable>() -> Arc<dyn Provider> {
            Arc::new(ClassProvider::<C, C>::new())
        }

        Self {
            key: Key::of::<C>(),
            provider: provider::<C>,
        }
    }

    /// Returns the key of the type.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub(crate) fn provider(&self) -> Arc<dyn Provider> {
        (self.provider)()
    }
}

impl fmt::Debug for Constructible {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructible").field(&self.key).finish()
    }
}

pub(crate) fn builtin_constructibles() -> [Constructible; 18] {
    [
        Constructible::of::<bool>(),
        Constructible::of::<char>(),
        Constructible::of::<String>(),
        Constructible::of::<i8>(),
        Constructible::of::<i16>(),
        Constructible::of::<i32>(),
        Constructible::of::<i64>(),
        Constructible::of::<i128>(),
        Constructible::of::<isize>(),
        Constructible::of::<u8>(),
        Constructible::of::<u16>(),
        Constructible::of::<u32>(),
        Constructible::of::<u64>(),
        Constructible::of::<u128>(),
        Constructible::of::<usize>(),
        Constructible::of::<f32>(),
        Constructible::of::<f64>(),
        Constructible::of::<RequestScopeOptions>(),
    ]
}
