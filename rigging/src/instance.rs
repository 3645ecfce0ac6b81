use std::{any::Any, fmt, sync::Arc};

use crate::Key;

/// A function that releases the resources held by an instance.
pub type ReleaseHook = fn(&DynInstance);

/// Represents an instance that erased its type.
///
/// The origin is always an `Arc<K>` for the key `K` it was produced for,
/// so cloning a `DynInstance` never clones the value itself.
#[derive(Clone)]
pub struct DynInstance {
    origin: Arc<dyn Any + Send + Sync>,
    ty: Key,
    release: Option<ReleaseHook>,
}

impl DynInstance {
    /// Erases the type of `instance`.
    pub fn new<K>(instance: Arc<K>) -> Self
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Self {
            origin: Arc::new(instance),
            ty: Key::of::<K>(),
            release: None,
        }
    }

    /// Returns the origin `Arc<K>`, if the instance was produced for `K`.
    pub fn as_instance<K>(&self) -> Option<Arc<K>>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        self.origin.downcast_ref::<Arc<K>>().cloned()
    }

    /// Returns the key of the type the instance was produced for.
    pub fn ty(&self) -> &Key {
        &self.ty
    }

    /// Returns the release hook attached by the binding, if any.
    pub fn release_hook(&self) -> Option<ReleaseHook> {
        self.release
    }

    /// Releases the instance if a release hook is attached.
    pub fn release(&self) {
        if let Some(release) = self.release {
            release(self);
        }
    }

    pub(crate) fn with_release(mut self, release: Option<ReleaseHook>) -> Self {
        if release.is_some() {
            self.release = release;
        }
        self
    }
}

impl fmt::Debug for DynInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynInstance")
            .field("ty", &self.ty)
            .field("releasable", &self.release.is_some())
            .finish()
    }
}

/// A capability for values that hold resources which must be released explicitly.
///
/// Declared per binding with [`BindOptions::releasable`](crate::BindOptions::releasable).
/// Scopes that own a lifetime shorter than the injector, such as
/// [`RequestScope`](crate::RequestScope), call [`Release::release`] when that lifetime ends.
pub trait Release: Send + Sync {
    /// Releases the held resources.
    fn release(&self);
}

pub(crate) fn release_instance<K>(instance: &DynInstance)
where
    K: ?Sized + Release + 'static,
{
    #[cfg(feature = "tracing")]
    tracing::trace!("(-) release: {}", instance.ty());

    if let Some(value) = instance.as_instance::<K>() {
        value.release();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn downcast_keeps_identity() {
        let origin: Arc<dyn Greeter> = Arc::new(English);
        let instance = DynInstance::new(origin.clone());

        let greeter = instance.as_instance::<dyn Greeter>().unwrap();
        assert!(Arc::ptr_eq(&origin, &greeter));
        assert_eq!(greeter.greet(), "hello");
        assert!(instance.as_instance::<English>().is_none());
        assert_eq!(instance.ty(), &Key::of::<dyn Greeter>());
    }

    #[test]
    fn release_hook_is_opt_in() {
        struct Connection(AtomicUsize);

        impl Release for Connection {
            fn release(&self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let connection = Arc::new(Connection(AtomicUsize::new(0)));

        let plain = DynInstance::new(connection.clone());
        plain.release();
        assert_eq!(connection.0.load(Ordering::SeqCst), 0);

        let releasable = plain.with_release(Some(release_instance::<Connection>));
        releasable.release();
        assert_eq!(connection.0.load(Ordering::SeqCst), 1);
    }
}
