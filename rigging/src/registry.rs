use std::{
    any::TypeId,
    collections::{hash_map::Entry, HashMap},
    sync::Arc,
    thread::{self, ThreadId},
};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex, RwLock};

use crate::{
    context, Binding, BindingError, Constructible, Context, DynInstance, Error, Key, Result,
    Scope, ScopeDefinition, ScopeInstance, SingletonScope, TransientScope,
};

/// The injector-wide cache of singleton instances.
///
/// Each key owns a write-once cell. The first caller of
/// [`get_or_try_init`](SingletonCache::get_or_try_init) runs the provider while
/// concurrent callers for the same key wait, so a provider runs at most once
/// per key. A failed provider leaves the cell empty.
///
/// A caller that would wait on a key whose provider is itself waiting, directly
/// or through other threads, on a key this caller is producing fails with
/// [`ResolutionError::CircularDependency`](crate::ResolutionError::CircularDependency)
/// instead of blocking.
///
/// Cached instances are never evicted, rebinding a key does not replace an
/// instance that was already produced.
pub struct SingletonCache {
    injector: u64,
    cells: Mutex<HashMap<Key, Arc<OnceCell<DynInstance>>>>,
    pending: Mutex<Pending>,
    finished: Condvar,
}

impl SingletonCache {
    pub(crate) fn new(injector: u64) -> Self {
        Self {
            injector,
            cells: Default::default(),
            pending: Default::default(),
            finished: Condvar::new(),
        }
    }

    /// Returns the cached instance for `key`, calling `init` to produce it if absent.
    pub fn get_or_try_init<F>(&self, key: &Key, init: F) -> Result<DynInstance>
    where
        F: FnOnce() -> Result<DynInstance>,
    {
        let cell = self.cells.lock().entry(*key).or_default().clone();

        if let Some(instance) = cell.get() {
            return Ok(instance.clone());
        }

        let me = thread::current().id();
        let mut pending = self.pending.lock();

        loop {
            if let Some(instance) = cell.get() {
                return Ok(instance.clone());
            }

            if !pending.owners.contains_key(key) {
                break;
            }

            if let Some((waited, closing)) = pending.wait_cycle(me, key) {
                drop(pending);
                return Err(self.cycle(waited, closing));
            }

            pending.waiting.insert(me, *key);
            self.finished.wait(&mut pending);
            pending.waiting.remove(&me);
        }

        pending.owners.insert(*key, me);
        drop(pending);

        let _producing = Producing { cache: self, key };

        let instance = init()?;
        let instance = cell.get_or_init(|| instance).clone();

        Ok(instance)
    }

    /// Returns the cached instance for `key`, if any.
    pub fn get(&self, key: &Key) -> Option<DynInstance> {
        let cell = self.cells.lock().get(key)?.clone();
        cell.get().cloned()
    }

    /// Returns whether an instance is cached for `key`.
    pub fn contains(&self, key: &Key) -> bool {
        self.cells
            .lock()
            .get(key)
            .is_some_and(|cell| cell.get().is_some())
    }

    /// Returns the number of cached instances.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .values()
            .filter(|cell| cell.get().is_some())
            .count()
    }

    /// Returns whether no instance is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn cycle(&self, waited: Vec<Key>, closing: Key) -> Error {
        let mut keys = context::in_flight(self.injector);
        keys.extend(waited);
        context::circular_dependency(keys, closing)
    }
}

/// Keys whose provider is running, and the keys blocked threads wait for.
#[derive(Default)]
struct Pending {
    owners: HashMap<Key, ThreadId>,
    waiting: HashMap<ThreadId, Key>,
}

impl Pending {
    /// Follows the owner of `key` through the keys each owner waits for.
    /// Returns the keys waited for and the key owned by `me` when the chain
    /// leads back to `me`.
    fn wait_cycle(&self, me: ThreadId, key: &Key) -> Option<(Vec<Key>, Key)> {
        let mut owner = *self.owners.get(key)?;

        if owner == me {
            return Some((Vec::new(), *key));
        }

        let mut waited = Vec::new();

        while waited.len() < self.waiting.len() {
            let key = *self.waiting.get(&owner)?;

            owner = *self.owners.get(&key)?;
            if owner == me {
                return Some((waited, key));
            }

            waited.push(key);
        }

        None
    }
}

/// Releases the ownership of a key when its provider returns or unwinds.
struct Producing<'a> {
    cache: &'a SingletonCache,
    key: &'a Key,
}

impl Drop for Producing<'_> {
    fn drop(&mut self) {
        self.cache.pending.lock().owners.remove(self.key);
        self.cache.finished.notify_all();
    }
}

#[derive(Default)]
pub(crate) struct BindingRegistry {
    registry: RwLock<HashMap<Key, Arc<Binding>>>,
}

impl BindingRegistry {
    pub(crate) fn insert(&self, binding: Binding, allow_override: bool) -> Result<()> {
        let key = *binding.key();
        let mut registry = self.registry.write();

        if !registry.contains_key(&key) {
            #[cfg(feature = "tracing")]
            tracing::debug!("(+) insert new: {:?}", binding);
        } else if allow_override {
            #[cfg(feature = "tracing")]
            tracing::warn!("(!) override by `key`: {:?}", binding);
        } else {
            return Err(BindingError::AlreadyBound { key }.into());
        }

        registry.insert(key, Arc::new(binding));
        Ok(())
    }

    /// Inserts `binding`, replacing any binding of its key.
    pub(crate) fn replace(&self, binding: Binding) {
        #[cfg(feature = "tracing")]
        tracing::debug!("(+) insert new: {:?}", binding);

        self.registry
            .write()
            .insert(*binding.key(), Arc::new(binding));
    }

    /// Inserts `binding` unless the key got bound meanwhile, returning the binding in effect.
    pub(crate) fn insert_if_absent(&self, binding: Binding) -> Arc<Binding> {
        match self.registry.write().entry(*binding.key()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("(+) auto-bind: {:?}", binding);

                entry.insert(Arc::new(binding)).clone()
            }
        }
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Arc<Binding>> {
        self.registry.read().get(key).cloned()
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.registry.read().contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.registry.read().len()
    }
}

pub(crate) struct ScopeRegistry {
    transient: Arc<dyn Scope>,
    singleton: Arc<dyn Scope>,
    registry: RwLock<HashMap<TypeId, ScopeInstance>>,
}

impl Default for ScopeRegistry {
    fn default() -> Self {
        let transient = ScopeInstance::new(TransientScope);
        let singleton = ScopeInstance::new(SingletonScope);

        Self {
            transient: transient.scope.clone(),
            singleton: singleton.scope.clone(),
            registry: RwLock::new(HashMap::from([
                (TypeId::of::<TransientScope>(), transient),
                (TypeId::of::<SingletonScope>(), singleton),
            ])),
        }
    }
}

impl ScopeRegistry {
    pub(crate) fn transient(&self) -> Arc<dyn Scope> {
        self.transient.clone()
    }

    pub(crate) fn singleton(&self) -> Arc<dyn Scope> {
        self.singleton.clone()
    }

    /// Returns the scope object of `definition`, creating it through `cx` if absent.
    ///
    /// The scope constructor runs without holding the lock. If two callers
    /// race, the first inserted object wins.
    pub(crate) fn get_or_create(
        &self,
        definition: &ScopeDefinition,
        cx: &mut Context<'_>,
    ) -> Result<ScopeInstance> {
        if let Some(instance) = self.get(&definition.id) {
            return Ok(instance);
        }

        let instance = (definition.create)(cx).map_err(|e| BindingError::ScopeCreation {
            scope: definition.name,
            source: Box::new(e),
        })?;

        let mut registry = self.registry.write();
        let instance = registry.entry(definition.id).or_insert_with(|| {
            #[cfg(feature = "tracing")]
            tracing::debug!("(+) create scope: {:?}", definition);

            instance
        });

        Ok(instance.clone())
    }

    fn get(&self, id: &TypeId) -> Option<ScopeInstance> {
        self.registry.read().get(id).cloned()
    }
}

#[derive(Default)]
pub(crate) struct ConstructibleRegistry {
    registry: RwLock<HashMap<Key, Constructible>>,
}

impl ConstructibleRegistry {
    pub(crate) fn insert(&self, constructible: Constructible) {
        self.registry
            .write()
            .insert(*constructible.key(), constructible);
    }

    pub(crate) fn get(&self, key: &Key) -> Option<Constructible> {
        self.registry.read().get(key).copied()
    }

    pub(crate) fn contains(&self, key: &Key) -> bool {
        self.registry.read().contains_key(key)
    }
}
