/// Convert a set of types that implement [`Module`]
/// to a set of [`ResolveModule`] instances.
///
/// # Example
///
/// ```rust
/// use rigging::{modules, Injector, Module, ResolveModule};
///
/// struct MyModule;
///
/// impl Module for MyModule {
///     fn configure(_: &Injector) -> rigging::Result<()> {
///         Ok(())
///     }
/// }
///
/// # fn main() {
/// let _: Vec<ResolveModule> = modules![MyModule];
/// # }
/// ```
///
/// [`Module`]: crate::Module
/// [`ResolveModule`]: crate::ResolveModule
#[macro_export]
macro_rules! modules {
    () => {
        vec![]
    };
    ($($module:ty),+ $(,)?) => {
        vec![$(
            $crate::ResolveModule::new::<$module>()
        ),+]
    };
}

/// Implement [`Implements`] for concrete types, so they can be bound to trait object keys.
///
/// Each concrete type may list several trait objects, entries are separated by `;`.
///
/// # Example
///
/// ```rust
/// use rigging::{implements, Injectable, Injector};
///
/// trait Reader: Send + Sync {}
/// trait Writer: Send + Sync {}
///
/// #[Injectable]
/// struct File;
///
/// impl Reader for File {}
/// impl Writer for File {}
///
/// implements!(File => dyn Reader, dyn Writer);
///
/// # fn main() -> rigging::Result<()> {
/// let injector = Injector::new();
/// injector.bind::<dyn Reader>(|b| b.to_class::<File>())?;
/// injector.bind::<dyn Writer>(|b| b.to_class::<File>())?;
///
/// assert!(injector.get::<dyn Reader>().is_ok());
/// assert!(injector.get::<dyn Writer>().is_ok());
/// # Ok(())
/// # }
/// ```
///
/// [`Implements`]: crate::Implements
#[macro_export]
macro_rules! implements {
    ($($ty:ty => $($interface:ty),+);+ $(;)?) => {
        $($(
            impl $crate::Implements<$interface> for $ty {
                fn upcast(this: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$interface> {
                    this
                }
            }
        )+)+
    };
}
