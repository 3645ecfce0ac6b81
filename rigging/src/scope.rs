use std::{
    any::{self, Any, TypeId},
    fmt,
    sync::Arc,
};

use crate::{Context, DynInstance, Key, Result, SingletonCache};

/// Decides whether a binding reuses an instance or asks its provider for a new one.
///
/// One scope object exists per scope type and injector, created lazily by
/// [`ScopeFactory::create`] the first time a binding uses it.
///
/// `provide` runs the provider of the binding. `cache` is the injector-wide
/// singleton cache; scopes that manage their own lifetimes are free to ignore it.
pub trait Scope: Send + Sync + 'static {
    /// Returns the instance for `key`.
    fn get_instance(
        &self,
        key: &Key,
        provide: &mut dyn FnMut() -> Result<DynInstance>,
        cache: &SingletonCache,
    ) -> Result<DynInstance>;
}

/// Creates the scope object of a scope type.
///
/// The constructor may resolve its own inputs through `cx`, such resolutions
/// take part in cycle detection like any other.
pub trait ScopeFactory: Scope + Sized {
    /// Creates the scope object.
    fn create(cx: &mut Context<'_>) -> Result<Self>;
}

/// Creates a new instance on every resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct TransientScope;

impl Scope for TransientScope {
    fn get_instance(
        &self,
        _: &Key,
        provide: &mut dyn FnMut() -> Result<DynInstance>,
        _: &SingletonCache,
    ) -> Result<DynInstance> {
        provide()
    }
}

impl ScopeFactory for TransientScope {
    fn create(_: &mut Context<'_>) -> Result<Self> {
        Ok(TransientScope)
    }
}

/// Creates at most one instance per key for the lifetime of the injector.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingletonScope;

impl Scope for SingletonScope {
    fn get_instance(
        &self,
        key: &Key,
        provide: &mut dyn FnMut() -> Result<DynInstance>,
        cache: &SingletonCache,
    ) -> Result<DynInstance> {
        cache.get_or_try_init(key, provide)
    }
}

impl ScopeFactory for SingletonScope {
    fn create(_: &mut Context<'_>) -> Result<Self> {
        Ok(SingletonScope)
    }
}

#[derive(Clone)]
pub(crate) struct ScopeInstance {
    pub(crate) key: Key,
    pub(crate) scope: Arc<dyn Scope>,
    pub(crate) any: Arc<dyn Any + Send + Sync>,
}

impl ScopeInstance {
    pub(crate) fn new<S: Scope>(scope: S) -> Self {
        let scope = Arc::new(scope);

        Self {
            key: Key::of::<S>(),
            scope: scope.clone(),
            any: scope,
        }
    }
}

/// Names a scope type and how to create its scope object.
#[derive(Clone, Copy)]
pub(crate) struct ScopeDefinition {
    pub(crate) id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) create: fn(&mut Context<'_>) -> Result<ScopeInstance>,
}

impl ScopeDefinition {
    pub(crate) fn of<S: ScopeFactory>() -> Self {
        fn create<S: ScopeFactory>(cx: &mut Context<'_>) -> Result<ScopeInstance> {
            S::create(cx).map(ScopeInstance::new)
        }

        Self {
            id: TypeId::of::<S>(),
            name: any::type_name::<S>(),
            create: create::<S>,
        }
    }
}

impl fmt::Debug for ScopeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
