use std::{cell::RefCell, collections::HashMap, fmt, sync::Arc};

use crate::{
    BindOptions, Binding, DynInstance, Error, Injector, Key, ResolutionError, Result,
    ScopeDefinition, ScopeFactory, ScopeInstance,
};

thread_local! {
    // injector id -> keys in flight on this thread, outermost first
    static IN_FLIGHT: RefCell<HashMap<u64, Vec<Key>>> = RefCell::new(HashMap::new());
}

/// The state of one resolution call.
///
/// A context is created for every [`Injector::get`] and [`Injector::bind`] call
/// and threaded through every nested resolution of that call: providers and
/// scope constructors receive it and resolve their own dependencies with it.
///
/// The keys whose resolution is in flight are tracked per thread and per
/// injector, so a provider calling back into [`Injector::get`] joins the chain
/// of the call that runs it and cycles through such calls are detected too.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use rigging::{Context, DynInstance, Injector, Provider};
///
/// struct Greeting;
///
/// impl Provider for Greeting {
///     fn provide(&self, cx: &mut Context<'_>) -> rigging::Result<DynInstance> {
///         let name = cx.resolve::<&'static str>()?;
///         Ok(DynInstance::new(Arc::new(format!("Hello, {}!", name))))
///     }
/// }
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<&'static str>(|b| b.to_value("World"))?;
/// injector.bind::<String>(|b| b.to_provider(Greeting))?;
///
/// assert_eq!(*injector.get::<String>()?, "Hello, World!");
/// # Ok(())
/// # }
/// ```
pub struct Context<'a> {
    injector: &'a Injector,
}

impl<'a> Context<'a> {
    pub(crate) fn new(injector: &'a Injector) -> Self {
        Self { injector }
    }

    /// Returns the injector the context resolves from.
    pub fn injector(&self) -> &'a Injector {
        self.injector
    }

    /// Returns the keys whose resolution is in flight on the current thread,
    /// outermost first.
    pub fn dependency_chain(&self) -> Vec<Key> {
        in_flight(self.injector.id)
    }

    /// Resolves an instance of `K`.
    pub fn resolve<K>(&mut self) -> Result<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<K>();
        let instance = self.resolve_key(&key)?;

        instance.as_instance::<K>().ok_or_else(|| {
            ResolutionError::TypeMismatch {
                key,
                found: *instance.ty(),
            }
            .into()
        })
    }

    /// Resolves the instance bound to `key`.
    ///
    /// Resolving a key whose resolution is already in flight fails with
    /// [`ResolutionError::CircularDependency`]. The key is removed from the
    /// chain again whether the resolution succeeds or fails.
    pub fn resolve_key(&mut self, key: &Key) -> Result<DynInstance> {
        let _in_flight = InFlight::enter(self.injector.id, key)?;
        self.provide(key)
    }

    /// Registers a binding, see [`Injector::bind`].
    ///
    /// Scope objects created for the binding resolve their inputs on this context.
    pub fn bind<K>(&mut self, configure: impl FnOnce(BindOptions<K>) -> BindOptions<K>) -> Result<()>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let binding = configure(BindOptions::new()).into_binding(self)?;
        self.injector
            .bindings
            .insert(binding, self.injector.allow_override())
    }

    /// Returns the scope object of `S`, creating it if absent.
    pub fn scope<S>(&mut self) -> Result<Arc<S>>
    where
        S: ScopeFactory,
    {
        let instance = self.scope_instance(&ScopeDefinition::of::<S>())?;
        let found = instance.key;

        instance.any.downcast::<S>().map_err(|_| {
            ResolutionError::TypeMismatch {
                key: Key::of::<S>(),
                found,
            }
            .into()
        })
    }

    pub(crate) fn scope_instance(
        &mut self,
        definition: &ScopeDefinition,
    ) -> Result<ScopeInstance> {
        let injector = self.injector;
        injector.scopes.get_or_create(definition, self)
    }

    fn provide(&mut self, key: &Key) -> Result<DynInstance> {
        let binding = match self.injector.bindings.get(key) {
            Some(binding) => binding,
            None => self.auto_bind(key)?,
        };

        let injector = self.injector;
        let provider = binding.provider().clone();
        let release = binding.release();

        let mut provide = || {
            provider
                .provide(self)
                .map(|instance| instance.with_release(release))
        };

        binding
            .scope()
            .get_instance(key, &mut provide, &injector.singletons)
    }

    fn auto_bind(&mut self, key: &Key) -> Result<Arc<Binding>> {
        let constructible = if self.injector.auto_bind() {
            self.injector.constructible(key)
        } else {
            None
        };

        let Some(constructible) = constructible else {
            return Err(ResolutionError::NoBinding { key: *key }.into());
        };

        let binding = Binding::new(
            *key,
            constructible.provider(),
            self.injector.scopes.transient(),
            None,
        );

        Ok(self.injector.bindings.insert_if_absent(binding))
    }
}

/// Marks a key in flight on the current thread until dropped.
struct InFlight {
    injector: u64,
}

impl InFlight {
    fn enter(injector: u64, key: &Key) -> Result<Self> {
        IN_FLIGHT.with(|chains| {
            let mut chains = chains.borrow_mut();
            let stack = chains.entry(injector).or_default();

            if stack.contains(key) {
                return Err(circular_dependency(stack.clone(), *key));
            }

            stack.push(*key);
            Ok(Self { injector })
        })
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        IN_FLIGHT.with(|chains| {
            let mut chains = chains.borrow_mut();

            if let Some(stack) = chains.get_mut(&self.injector) {
                stack.pop();

                if stack.is_empty() {
                    chains.remove(&self.injector);
                }
            }
        });
    }
}

/// Returns the keys in flight on the current thread for the injector `injector`.
pub(crate) fn in_flight(injector: u64) -> Vec<Key> {
    IN_FLIGHT.with(|chains| chains.borrow().get(&injector).cloned().unwrap_or_default())
}

/// Builds the error for `key` closing a cycle at the end of `keys`.
pub(crate) fn circular_dependency(mut keys: Vec<Key>, key: Key) -> Error {
    keys.push(key);

    ResolutionError::CircularDependency {
        key,
        path: DependencyPath { keys },
    }
    .into()
}

/// The resolution chain that closed a cycle, carried by
/// [`ResolutionError::CircularDependency`].
///
/// Displays one key per line, the keys taking part in the cycle marked with `-->`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencyPath {
    keys: Vec<Key>,
}

impl DependencyPath {
    /// Returns the keys of the chain, outermost first. The last key closed the cycle.
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }
}

impl fmt::Display for DependencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(last) = self.keys.last() else {
            return f.write_str("[]");
        };

        f.write_str("[\n")?;

        for key in &self.keys {
            if key == last {
                f.write_str(" --> ")?;
            } else {
                f.write_str("     ")?;
            }

            writeln!(f, "{}", key)?;
        }

        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    struct A;
    struct B;

    #[test]
    fn entering_a_key_in_flight_fails() {
        let injector = u64::MAX;

        let a = InFlight::enter(injector, &Key::of::<A>()).unwrap();
        let b = InFlight::enter(injector, &Key::of::<B>()).unwrap();

        match InFlight::enter(injector, &Key::of::<A>()) {
            Err(Error::Resolution(ResolutionError::CircularDependency { key, path })) => {
                assert_eq!(key, Key::of::<A>());
                assert_eq!(
                    path.keys(),
                    &[Key::of::<A>(), Key::of::<B>(), Key::of::<A>()]
                );
            }
            Err(e) => panic!("expected a circular dependency, got {}", e),
            Ok(_) => panic!("expected a circular dependency"),
        }

        assert_eq!(in_flight(injector), [Key::of::<A>(), Key::of::<B>()]);

        drop(b);
        drop(a);
        assert!(in_flight(injector).is_empty());
    }

    #[test]
    fn chains_are_per_injector_and_thread() {
        let _a = InFlight::enter(u64::MAX - 1, &Key::of::<A>()).unwrap();

        assert!(InFlight::enter(u64::MAX - 2, &Key::of::<A>()).is_ok());
        assert!(in_flight(u64::MAX - 2).is_empty());

        std::thread::spawn(|| {
            assert!(in_flight(u64::MAX - 1).is_empty());
            assert!(InFlight::enter(u64::MAX - 1, &Key::of::<A>()).is_ok());
        })
        .join()
        .unwrap();

        assert_eq!(in_flight(u64::MAX - 1), [Key::of::<A>()]);
    }

    #[test]
    fn path_marks_the_cycle() {
        let path = DependencyPath {
            keys: vec![Key::of::<A>(), Key::of::<B>(), Key::of::<A>()],
        };

        let a = Key::of::<A>().name;
        let b = Key::of::<B>().name;

        assert_eq!(
            path.to_string(),
            format!("[\n --> {a}\n     {b}\n --> {a}\n]")
        );
    }
}
