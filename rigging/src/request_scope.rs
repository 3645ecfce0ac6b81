use std::{
    cell::RefCell,
    collections::HashMap,
    marker::PhantomData,
    sync::atomic::{AtomicU64, Ordering},
};

use parking_lot::Mutex;

use crate::{
    Arguments, Context, DynInstance, Error, Injectable, Injector, Key, Module, Result, Scope,
    ScopeFactory, SingletonCache, SingletonScope,
};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // request scope id -> open session ids, the active one last
    static CURRENT: RefCell<HashMap<u64, Vec<u64>>> = RefCell::new(HashMap::new());
}

/// Errors raised by [`RequestScope`].
#[derive(Debug, thiserror::Error)]
pub enum RequestScopeError {
    /// A request scoped key was resolved outside a session.
    #[error("no request session is active on the current thread")]
    NoActiveSession,
}

/// The inputs of [`RequestScope`], resolved when the scope object is created.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestScopeOptions {
    /// Whether releasable instances are released when their session closes, default is false.
    pub enable_cleanup: bool,
}

impl Injectable for RequestScopeOptions {
    fn construct(_: Arguments) -> Result<Self> {
        Ok(Self::default())
    }
}

/// A module binding the default [`RequestScopeOptions`] as a singleton.
pub struct RequestScopeModule;

impl Module for RequestScopeModule {
    fn configure(injector: &Injector) -> Result<()> {
        RequestScope::install(injector, RequestScopeOptions::default())
    }
}

#[derive(Default)]
struct Session {
    cache: HashMap<Key, DynInstance>,
    releases: Vec<DynInstance>,
}

/// Caches one instance per key and request session.
///
/// A session is opened with [`RequestScope::enter`] and bound to the current
/// thread until its [`RequestSession`] guard is dropped. Resolving a request
/// scoped key outside a session fails with [`RequestScopeError::NoActiveSession`].
///
/// When [`RequestScopeOptions::enable_cleanup`] is set, closing a session
/// releases, in reverse order of creation, every instance whose binding was
/// declared [`releasable`](crate::BindOptions::releasable).
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use rigging::{Injectable, Injector, RequestScope};
///
/// #[Injectable]
/// struct RequestId(#[di(default)] u64);
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<RequestId>(|b| b.scope::<RequestScope>())?;
///
/// let scope = injector.scope::<RequestScope>()?;
///
/// let (a, b) = scope.scoped(|| -> rigging::Result<_> {
///     Ok((injector.get::<RequestId>()?, injector.get::<RequestId>()?))
/// })?;
/// assert!(Arc::ptr_eq(&a, &b));
///
/// let c = scope.scoped(|| injector.get::<RequestId>())?;
/// assert!(!Arc::ptr_eq(&a, &c));
///
/// assert!(injector.get::<RequestId>().is_err());
/// # Ok(())
/// # }
/// ```
pub struct RequestScope {
    id: u64,
    options: RequestScopeOptions,
    sessions: Mutex<HashMap<u64, Session>>,
}

impl RequestScope {
    /// Binds `options` as the inputs of the request scope.
    ///
    /// Must run before the first binding using the request scope.
    pub fn install(injector: &Injector, options: RequestScopeOptions) -> Result<()> {
        injector.bind::<RequestScopeOptions>(|b| b.to_value(options).scope::<SingletonScope>())
    }

    /// Returns the options the scope was created with.
    pub fn options(&self) -> &RequestScopeOptions {
        &self.options
    }

    /// Opens a session on the current thread.
    ///
    /// The new session is active until another one is entered. It is closed
    /// when the returned guard is dropped, and the most recent of the sessions
    /// still open on the thread, if any, becomes active again.
    pub fn enter(&self) -> RequestSession<'_> {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);

        self.sessions.lock().insert(id, Session::default());
        CURRENT.with(|current| current.borrow_mut().entry(self.id).or_default().push(id));

        #[cfg(feature = "tracing")]
        tracing::debug!("(+) open request session: {}", id);

        RequestSession {
            scope: self,
            id,
            _not_send: PhantomData,
        }
    }

    /// Runs `f` in a fresh session.
    pub fn scoped<R>(&self, f: impl FnOnce() -> R) -> R {
        let _session = self.enter();
        f()
    }

    /// Returns whether a session of this scope is active on the current thread.
    pub fn in_session(&self) -> bool {
        self.current().is_some()
    }

    fn current(&self) -> Option<u64> {
        CURRENT.with(|current| {
            current
                .borrow()
                .get(&self.id)
                .and_then(|open| open.last().copied())
        })
    }

    fn close(&self, id: u64) {
        CURRENT.with(|current| {
            let mut current = current.borrow_mut();

            if let Some(open) = current.get_mut(&self.id) {
                open.retain(|&session| session != id);

                if open.is_empty() {
                    current.remove(&self.id);
                }
            }
        });

        let Some(session) = self.sessions.lock().remove(&id) else {
            return;
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "(-) close request session: {}, releasable: {}",
            id,
            session.releases.len()
        );

        if self.options.enable_cleanup {
            session
                .releases
                .iter()
                .rev()
                .for_each(|instance| instance.release());
        }
    }
}

impl Scope for RequestScope {
    fn get_instance(
        &self,
        key: &Key,
        provide: &mut dyn FnMut() -> Result<DynInstance>,
        _: &SingletonCache,
    ) -> Result<DynInstance> {
        let id = self
            .current()
            .ok_or_else(|| Error::external(RequestScopeError::NoActiveSession))?;

        if let Some(instance) = self
            .sessions
            .lock()
            .get(&id)
            .and_then(|session| session.cache.get(key))
        {
            return Ok(instance.clone());
        }

        let instance = provide()?;

        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get_mut(&id) else {
            return Ok(instance);
        };

        if let Some(cached) = session.cache.get(key) {
            return Ok(cached.clone());
        }

        if instance.release_hook().is_some() {
            session.releases.push(instance.clone());
        }

        session.cache.insert(*key, instance.clone());
        Ok(instance)
    }
}

impl ScopeFactory for RequestScope {
    fn create(cx: &mut Context<'_>) -> Result<Self> {
        let options = cx.resolve::<RequestScopeOptions>()?;

        Ok(Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            options: *options,
            sessions: Default::default(),
        })
    }
}

/// An open request session, closed on drop.
///
/// Bound to the thread it was opened on.
#[must_use = "the session closes as soon as the guard is dropped"]
pub struct RequestSession<'a> {
    scope: &'a RequestScope,
    id: u64,
    _not_send: PhantomData<*const ()>,
}

impl RequestSession<'_> {
    /// Closes the session.
    pub fn close(self) {}
}

impl Drop for RequestSession<'_> {
    fn drop(&mut self) {
        self.scope.close(self.id);
    }
}
