#[doc(hidden)]
pub use inventory::submit;

use crate::Constructible;

#[doc(hidden)]
pub struct ConstructibleRegister {
    pub register: fn() -> Constructible,
}

inventory::collect!(ConstructibleRegister);

/// Returns an iterator over all auto-registered constructible types.
///
/// [`InjectorOptions::build`](crate::InjectorOptions::build) collects them
/// unless [`InjectorOptions::auto_register`](crate::InjectorOptions::auto_register)
/// is turned off.
pub fn auto_registered_constructibles() -> impl Iterator<Item = Constructible> {
    inventory::iter::<ConstructibleRegister>
        .into_iter()
        .map(|register| (register.register)())
}

/// Registers a constructible type that will be collected by [`auto_registered_constructibles`].
///
/// `#[Injectable]` registers its type unless `auto_register = false` is given,
/// this macro is for types implementing [`Injectable`](crate::Injectable) by hand.
///
/// Because auto-registration relies on the [`inventory`] crate, it is not
/// available on platforms where `inventory` is not supported.
///
/// # Example
///
/// ```rust
/// use rigging::{register_constructible, Arguments, Injectable, Injector};
///
/// struct Clock;
///
/// impl Injectable for Clock {
///     fn construct(_: Arguments) -> rigging::Result<Self> {
///         Ok(Clock)
///     }
/// }
///
/// register_constructible!(Clock);
///
/// # fn main() {
/// let injector = Injector::new();
/// assert!(injector.get::<Clock>().is_ok());
/// # }
/// ```
#[macro_export]
macro_rules! register_constructible {
    ($ty:ty) => {
        const _: () = {
            fn register() -> $crate::Constructible {
                $crate::Constructible::of::<$ty>()
            }

            $crate::submit! {
                $crate::ConstructibleRegister {
                    register
                }
            }
        };
    };
}
