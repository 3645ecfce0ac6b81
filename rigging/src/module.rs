use crate::{Injector, Key, Result};

/// Represents a module.
///
/// A module groups bindings. Its submodules are installed before its own
/// [`configure`](Module::configure) runs, so a module may override the
/// bindings of its submodules.
///
/// # Example
///
/// ```rust
/// use rigging::{modules, Injector, Module, ResolveModule};
///
/// struct DatabaseModule;
///
/// impl Module for DatabaseModule {
///     fn configure(injector: &Injector) -> rigging::Result<()> {
///         injector.bind::<String>(|b| b.to_value(String::from("postgres://localhost")))
///     }
/// }
///
/// struct AppModule;
///
/// impl Module for AppModule {
///     fn submodules() -> Option<Vec<ResolveModule>> {
///         Some(modules![DatabaseModule])
///     }
///
///     fn configure(injector: &Injector) -> rigging::Result<()> {
///         injector.bind::<u16>(|b| b.to_value(8080_u16))
///     }
/// }
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::create(modules![AppModule])?;
///
/// assert_eq!(*injector.get::<String>()?, "postgres://localhost");
/// assert_eq!(*injector.get::<u16>()?, 8080);
/// assert_eq!(injector.loaded_modules().len(), 2);
/// # Ok(())
/// # }
/// ```
pub trait Module {
    /// Included submodules, default is None.
    fn submodules() -> Option<Vec<ResolveModule>> {
        None
    }

    /// Registers the bindings of the module.
    fn configure(injector: &Injector) -> Result<()>;
}

/// A type representing a Module, converted from a type that implements [`Module`].
pub struct ResolveModule {
    key: Key,
    submodules: Option<Vec<ResolveModule>>,
    configure: fn(&Injector) -> Result<()>,
}

impl ResolveModule {
    /// Create a [`ResolveModule`] from a type that implements [`Module`].
    pub fn new<T: Module + 'static>() -> Self {
        Self {
            key: Key::of::<T>(),
            submodules: T::submodules(),
            configure: T::configure,
        }
    }

    /// Key of the type that is converted to a ResolveModule.
    pub fn key(&self) -> &Key {
        &self.key
    }

    pub(crate) fn submodules(&mut self) -> Option<Vec<ResolveModule>> {
        self.submodules.take()
    }

    pub(crate) fn configure(self, injector: &Injector) -> Result<()> {
        (self.configure)(injector)
    }
}
