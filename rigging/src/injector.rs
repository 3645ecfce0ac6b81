use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use parking_lot::RwLock;

use crate::{
    constructible::builtin_constructibles, BindOptions, Binding, BindingRegistry, Constructible,
    ConstructibleRegistry, Context, Injectable, Key, ResolveModule, Result, ScopeFactory,
    ScopeRegistry, SingletonCache, ValueProvider,
};

/// A container of bindings, and the entry point of resolution.
///
/// An injector maps keys to providers mediated by scopes. It is `Send + Sync`
/// and may be shared between threads; every [`get`](Injector::get) call
/// resolves on its own [`Context`].
///
/// When creating an `Injector`, you can use options to change the default
/// behavior, see [`InjectorOptions`] for details.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use rigging::{Injectable, Injector, SingletonScope};
///
/// trait Service: Send + Sync {
///     fn name(&self) -> &'static str;
/// }
///
/// #[Injectable(implements = [dyn Service])]
/// struct ServiceImpl;
///
/// impl Service for ServiceImpl {
///     fn name(&self) -> &'static str {
///         "impl"
///     }
/// }
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<dyn Service>(|b| b.to_class::<ServiceImpl>().scope::<SingletonScope>())?;
///
/// let a = injector.get::<dyn Service>()?;
/// let b = injector.get::<dyn Service>()?;
///
/// assert_eq!(a.name(), "impl");
/// assert!(Arc::ptr_eq(&a, &b));
/// # Ok(())
/// # }
/// ```
pub struct Injector {
    pub(crate) id: u64,
    allow_override: bool,
    auto_bind: bool,

    pub(crate) bindings: BindingRegistry,
    pub(crate) singletons: SingletonCache,
    pub(crate) scopes: ScopeRegistry,
    constructibles: ConstructibleRegistry,

    loaded_modules: RwLock<Vec<Key>>,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    /// Creates an injector with the default options.
    pub fn new() -> Injector {
        InjectorOptions::default().build()
    }

    /// Creates an injector with the default options and installs `modules`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rigging::{modules, Injector, Module};
    ///
    /// struct ConfigModule;
    ///
    /// impl Module for ConfigModule {
    ///     fn configure(injector: &Injector) -> rigging::Result<()> {
    ///         injector.bind::<u16>(|b| b.to_value(8080_u16))
    ///     }
    /// }
    ///
    /// # fn main() -> rigging::Result<()> {
    /// let injector = Injector::create(modules![ConfigModule])?;
    /// assert_eq!(*injector.get::<u16>()?, 8080);
    /// # Ok(())
    /// # }
    /// ```
    pub fn create(modules: Vec<ResolveModule>) -> Result<Injector> {
        InjectorOptions::default().create(modules)
    }

    /// Returns a new [`InjectorOptions`].
    pub fn options() -> InjectorOptions {
        InjectorOptions::default()
    }

    /// Returns whether a later binding may replace an existing one.
    pub fn allow_override(&self) -> bool {
        self.allow_override
    }

    /// Returns whether unbound constructible keys are bound on first resolution.
    pub fn auto_bind(&self) -> bool {
        self.auto_bind
    }

    /// Registers a binding for the key `K`.
    ///
    /// The scope object of the chosen scope is created now if absent.
    /// See [`BindOptions`] for the accepted requests.
    ///
    /// # Errors
    ///
    /// - [`BindingError::MultipleTargets`](crate::BindingError::MultipleTargets) if more than one target is given.
    /// - [`BindingError::UndeterminedProvider`](crate::BindingError::UndeterminedProvider) if no target is given and `K` is not constructible.
    /// - [`BindingError::AlreadyBound`](crate::BindingError::AlreadyBound) if `K` is bound and overriding is not allowed.
    /// - [`BindingError::ScopeCreation`](crate::BindingError::ScopeCreation) if the scope object could not be created.
    pub fn bind<K>(&self, configure: impl FnOnce(BindOptions<K>) -> BindOptions<K>) -> Result<()>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Context::new(self).bind(configure)
    }

    /// Binds the constructible type `C` to itself with the transient scope.
    pub fn bind_self<C>(&self) -> Result<()>
    where
        C: Injectable,
    {
        self.bind::<C>(|b| b)
    }

    /// Resolves an instance of `K`.
    ///
    /// # Errors
    ///
    /// - [`ResolutionError::NoBinding`](crate::ResolutionError::NoBinding) if `K` is unbound and not constructible.
    /// - [`ResolutionError::CircularDependency`](crate::ResolutionError::CircularDependency) if `K` depends on itself.
    /// - any error raised by a provider or a constructor on the way.
    pub fn get<K>(&self) -> Result<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Context::new(self).resolve::<K>()
    }

    /// Returns the scope object of `S`, creating it if absent.
    pub fn scope<S>(&self) -> Result<Arc<S>>
    where
        S: ScopeFactory,
    {
        Context::new(self).scope::<S>()
    }

    /// Installs `modules`, depth-first, submodules before their parent's own bindings.
    ///
    /// Modules that were already installed are skipped.
    pub fn install(&self, modules: Vec<ResolveModule>) -> Result<()> {
        let Some(modules) = flatten(modules, ResolveModule::submodules) else {
            return Ok(());
        };

        for module in modules {
            let key = *module.key();

            {
                let mut loaded = self.loaded_modules.write();

                if loaded.contains(&key) {
                    continue;
                }

                loaded.push(key);
            }

            #[cfg(feature = "tracing")]
            tracing::debug!("(+) install module: {}", key);

            module.configure(self)?;
        }

        Ok(())
    }

    /// Returns the types of the installed modules, in installation order.
    pub fn loaded_modules(&self) -> Vec<Key> {
        self.loaded_modules.read().clone()
    }

    /// Returns whether `K` has a binding.
    pub fn contains_binding<K>(&self) -> bool
    where
        K: ?Sized + 'static,
    {
        self.bindings.contains(&Key::of::<K>())
    }

    /// Returns whether a singleton instance of `K` has been produced.
    pub fn contains_singleton<K>(&self) -> bool
    where
        K: ?Sized + 'static,
    {
        self.singletons.contains(&Key::of::<K>())
    }

    /// Returns whether `K` is a constructible type.
    pub fn is_constructible<K>(&self) -> bool
    where
        K: ?Sized + 'static,
    {
        self.constructibles.contains(&Key::of::<K>())
    }

    /// Returns the number of bindings.
    pub fn bindings_len(&self) -> usize {
        self.bindings.len()
    }

    pub(crate) fn constructible(&self, key: &Key) -> Option<Constructible> {
        self.constructibles.get(key)
    }
}

fn flatten<T, F>(mut unresolved: Vec<T>, get_sublist: F) -> Option<Vec<T>>
where
    F: Fn(&mut T) -> Option<Vec<T>>,
{
    if unresolved.is_empty() {
        return None;
    }

    let mut resolved = Vec::with_capacity(unresolved.len());

    unresolved.reverse();

    while let Some(mut element) = unresolved.pop() {
        if let Some(mut sublist) = get_sublist(&mut element) {
            sublist.reverse();
            unresolved.push(element);
            unresolved.append(&mut sublist);
            continue;
        }

        resolved.push(element);
    }

    Some(resolved)
}

/// Options and flags which can be used to configure how an injector is created.
///
/// Generally speaking, you'll first call [`InjectorOptions::default`] (or
/// [`Injector::options`]), then chain calls to methods to set each option, then
/// call [`InjectorOptions::build`] or [`InjectorOptions::create`].
///
/// # Example
///
/// ```rust
/// use rigging::{Injector, InjectorOptions};
///
/// # fn main() -> rigging::Result<()> {
/// let injector: Injector = InjectorOptions::default()
///     .allow_override(false)
///     .value::<String>(String::from("postgres://localhost"))
///     .build();
///
/// assert_eq!(*injector.get::<String>()?, "postgres://localhost");
///
/// let err = injector.bind::<String>(|b| b.to_value(String::new())).unwrap_err();
/// assert!(err.is_binding());
/// # Ok(())
/// # }
/// ```
pub struct InjectorOptions {
    allow_override: bool,
    auto_bind: bool,
    auto_register: bool,
    constructibles: Vec<Constructible>,
    values: Vec<(Key, Arc<ValueProvider>)>,
}

impl Default for InjectorOptions {
    fn default() -> Self {
        Self {
            allow_override: true,
            auto_bind: true,
            auto_register: true,
            constructibles: Default::default(),
            values: Default::default(),
        }
    }
}

impl InjectorOptions {
    /// Sets whether a later binding may replace an existing one with the same key, default is true.
    ///
    /// When false, the second bind fails with
    /// [`BindingError::AlreadyBound`](crate::BindingError::AlreadyBound).
    pub fn allow_override(mut self, allow_override: bool) -> Self {
        self.allow_override = allow_override;
        self
    }

    /// Sets whether unbound constructible keys are bound to themselves on first
    /// resolution, default is true.
    pub fn auto_bind(mut self, auto_bind: bool) -> Self {
        self.auto_bind = auto_bind;
        self
    }

    /// Sets whether auto-registered constructible types are collected, default is true.
    ///
    /// Has no effect without the `auto-register` feature.
    pub fn auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Registers `C` as a constructible type.
    pub fn constructible<C>(mut self) -> Self
    where
        C: Injectable,
    {
        self.constructibles.push(Constructible::of::<C>());
        self
    }

    /// Binds `K` to a fixed value with the singleton scope.
    ///
    /// A later value for the same key replaces the earlier one.
    pub fn value<K>(mut self, value: impl Into<Arc<K>>) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.values
            .push((Key::of::<K>(), Arc::new(ValueProvider::new(value.into()))));
        self
    }

    /// Creates an injector with the configured options.
    pub fn build(self) -> Injector {
        let InjectorOptions {
            allow_override,
            auto_bind,
            auto_register,
            constructibles,
            values,
        } = self;

        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        let injector = Injector {
            id,
            allow_override,
            auto_bind,
            bindings: Default::default(),
            singletons: SingletonCache::new(id),
            scopes: Default::default(),
            constructibles: Default::default(),
            loaded_modules: Default::default(),
        };

        builtin_constructibles()
            .into_iter()
            .chain(constructibles)
            .for_each(|constructible| injector.constructibles.insert(constructible));

        #[cfg(feature = "auto-register")]
        if auto_register {
            crate::auto_registered_constructibles()
                .for_each(|constructible| injector.constructibles.insert(constructible));
        }

        #[cfg(not(feature = "auto-register"))]
        let _ = auto_register;

        for (key, provider) in values {
            let binding = Binding::new(key, provider, injector.scopes.singleton(), None);
            injector.bindings.replace(binding);
        }

        injector
    }

    /// Creates an injector with the configured options and installs `modules`.
    pub fn create(self, modules: Vec<ResolveModule>) -> Result<Injector> {
        let injector = self.build();
        injector.install(modules)?;
        Ok(injector)
    }
}
