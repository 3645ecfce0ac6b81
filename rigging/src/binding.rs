use std::{fmt, marker::PhantomData, sync::Arc};

use crate::{
    instance::release_instance, BindingError, ClassProvider, Context, Factory, FactoryProvider,
    Implements, Injectable, Key, Provider, Release, ReleaseHook, Result, Scope, ScopeDefinition,
    ScopeFactory, TransientScope, ValueProvider,
};

/// The association of a key with a provider and a scope.
///
/// Immutable once registered. Binding the same key again replaces it.
pub struct Binding {
    key: Key,
    provider: Arc<dyn Provider>,
    scope: Arc<dyn Scope>,
    release: Option<ReleaseHook>,
}

impl Binding {
    pub(crate) fn new(
        key: Key,
        provider: Arc<dyn Provider>,
        scope: Arc<dyn Scope>,
        release: Option<ReleaseHook>,
    ) -> Self {
        Self {
            key,
            provider,
            scope,
            release,
        }
    }

    /// Returns the key of the binding.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// Returns the provider of the binding.
    pub fn provider(&self) -> &Arc<dyn Provider> {
        &self.provider
    }

    /// Returns the scope object of the binding.
    pub fn scope(&self) -> &Arc<dyn Scope> {
        &self.scope
    }

    /// Returns the release hook attached to the produced instances, if the binding is releasable.
    pub fn release(&self) -> Option<ReleaseHook> {
        self.release
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("provider", &self.provider.kind())
            .field("releasable", &self.release.is_some())
            .finish()
    }
}

/// Describes a bind request for the key `K`.
///
/// At most one target may be given: [`to_class`](BindOptions::to_class),
/// [`to_factory`](BindOptions::to_factory), [`to_value`](BindOptions::to_value)
/// or [`to_provider`](BindOptions::to_provider). Without a target, `K` is bound
/// to itself if it is a constructible type. The default scope is [`TransientScope`].
///
/// # Example
///
/// ```rust
/// use rigging::{Injector, SingletonScope};
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<i32>(|b| b.to_value(42).scope::<SingletonScope>())?;
///
/// assert_eq!(*injector.get::<i32>()?, 42);
///
/// let err = injector.bind::<u8>(|b| b.to_value(1_u8).to_value(2_u8)).unwrap_err();
/// assert!(err.is_binding());
/// # Ok(())
/// # }
/// ```
pub struct BindOptions<K: ?Sized> {
    targets: Vec<Arc<dyn Provider>>,
    scope: ScopeDefinition,
    release: Option<ReleaseHook>,
    _marker: PhantomData<fn() -> Arc<K>>,
}

impl<K> BindOptions<K>
where
    K: ?Sized + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            targets: Vec::new(),
            scope: ScopeDefinition::of::<TransientScope>(),
            release: None,
            _marker: PhantomData,
        }
    }

    /// Constructs `C` for the key.
    pub fn to_class<C>(mut self) -> Self
    where
        C: Injectable + Implements<K>,
    {
        self.targets.push(Arc::new(ClassProvider::<C, K>::new()));
        self
    }

    /// Calls `factory` for the key.
    pub fn to_factory<F>(mut self, factory: F) -> Self
    where
        F: Factory,
        F::Output: Implements<K>,
    {
        self.targets
            .push(Arc::new(FactoryProvider::<F, K>::new(factory)));
        self
    }

    /// Returns `value` for the key.
    ///
    /// Any value is accepted, an `Option` holding `None` included.
    pub fn to_value(mut self, value: impl Into<Arc<K>>) -> Self {
        self.targets.push(Arc::new(ValueProvider::new(value.into())));
        self
    }

    /// Uses a custom provider for the key.
    pub fn to_provider<P>(mut self, provider: P) -> Self
    where
        P: Provider,
    {
        self.targets.push(Arc::new(provider));
        self
    }

    /// Sets the scope of the binding.
    pub fn scope<S>(mut self) -> Self
    where
        S: ScopeFactory,
    {
        self.scope = ScopeDefinition::of::<S>();
        self
    }

    /// Declares that the produced instances hold resources to release.
    ///
    /// Scopes that end a lifetime, such as [`RequestScope`](crate::RequestScope),
    /// call [`Release::release`] on these instances.
    pub fn releasable(mut self) -> Self
    where
        K: Release,
    {
        self.release = Some(release_instance::<K>);
        self
    }

    pub(crate) fn into_binding(self, cx: &mut Context<'_>) -> Result<Binding> {
        let key = Key::of::<K>();

        let BindOptions {
            mut targets,
            scope,
            release,
            _marker,
        } = self;

        let provider = match targets.len() {
            0 => match cx.injector().constructible(&key) {
                Some(constructible) => constructible.provider(),
                None => return Err(BindingError::UndeterminedProvider { key }.into()),
            },
            1 => targets.remove(0),
            count => return Err(BindingError::MultipleTargets { key, count }.into()),
        };

        let scope = cx.scope_instance(&scope)?.scope;

        Ok(Binding::new(key, provider, scope, release))
    }
}
