//! # Rigging
//!
//! A small, thread-safe dependency injection runtime.
//!
//! An [`Injector`] maps keys, which are Rust types including trait objects such
//! as `dyn Service`, to providers mediated by scopes. Constructors and
//! factories declare their parameters, and the injector resolves every
//! parameter carrying a type marker before calling them. Circular dependencies
//! are detected while resolving and reported as errors.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use rigging::{Factory, Injectable, Injector, SingletonScope};
//!
//! trait Repository: Send + Sync {
//!     fn url(&self) -> &str;
//! }
//!
//! #[Injectable(implements = [dyn Repository])]
//! struct PgRepository {
//!     url: Arc<String>,
//! }
//!
//! impl Repository for PgRepository {
//!     fn url(&self) -> &str {
//!         &self.url
//!     }
//! }
//!
//! #[Injectable]
//! struct UserService {
//!     repository: Arc<dyn Repository>,
//!     #[di(default = 3)]
//!     retries: u8,
//! }
//!
//! #[Factory]
//! fn Banner(user_service: Arc<UserService>) -> Arc<str> {
//!     Arc::from(format!("{} ({})", user_service.repository.url(), user_service.retries))
//! }
//!
//! # fn main() -> rigging::Result<()> {
//! let injector = Injector::new();
//! injector.bind::<String>(|b| b.to_value(String::from("postgres://localhost")))?;
//! injector.bind::<dyn Repository>(|b| b.to_class::<PgRepository>().scope::<SingletonScope>())?;
//! injector.bind::<str>(|b| b.to_factory(Banner))?;
//!
//! let service = injector.get::<UserService>()?;
//! assert_eq!(service.repository.url(), "postgres://localhost");
//! assert_eq!(service.retries, 3);
//!
//! let other = injector.get::<UserService>()?;
//! assert!(!Arc::ptr_eq(&service, &other));
//! assert!(Arc::ptr_eq(&service.repository, &other.repository));
//!
//! assert_eq!(&*injector.get::<str>()?, "postgres://localhost (3)");
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature flags
//!
//! - `rigging-macro` (default): the `#[Injectable]` and `#[Factory]` attribute macros.
//! - `auto-register` (default): collect `#[Injectable]` types with [`inventory`](https://docs.rs/inventory)
//!   so they can be bound without a target and resolved without a binding.
//! - `tracing`: log bindings, scope creation and request sessions with [`tracing`](https://docs.rs/tracing).
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg_attr(docsrs, doc(cfg(feature = "auto-register")))]
#[cfg(feature = "auto-register")]
mod auto_register;
mod binding;
mod constructible;
mod context;
mod error;
mod injector;
mod instance;
mod key;
mod macros;
mod module;
mod provider;
mod registry;
mod request_scope;
mod resolver;
mod scope;

#[cfg_attr(docsrs, doc(cfg(feature = "auto-register")))]
#[cfg(feature = "auto-register")]
pub use auto_register::*;
pub use binding::*;
pub use constructible::Constructible;
pub use context::*;
pub use error::*;
pub use injector::*;
pub use instance::{DynInstance, Release, ReleaseHook};
pub use key::*;
pub use module::*;
pub use provider::*;
pub(crate) use registry::{BindingRegistry, ConstructibleRegistry, ScopeRegistry};
pub use registry::SingletonCache;
pub use request_scope::*;
pub use resolver::*;
pub use rigging_core::*;
pub(crate) use scope::{ScopeDefinition, ScopeInstance};
pub use scope::{Scope, ScopeFactory, SingletonScope, TransientScope};

macro_rules! export_attribute_macros {
    (
        $(
            $(#[$doc:meta])*
            $name:ident;
        )*
    ) => {
        $(
            #[cfg_attr(docsrs, doc(cfg(feature = "rigging-macro")))]
            #[cfg(feature = "rigging-macro")]
            $(#[$doc])*
            pub use rigging_macro::$name;
        )*
    };
}

export_attribute_macros! {
    /// Derive [`Injectable`] for a struct.
    ///
    /// - `implements = [dyn Trait, ..]`: implement [`Implements`] for each trait object.
    /// - `auto_register = bool`: register the struct as a constructible type, default is true.
    /// - `rigging_path = path`: the path of this crate, default is `::rigging`.
    ///
    /// Fields of type `Arc<T>` are resolved as `T`. Any other field needs
    /// `#[di(default)]` or `#[di(default = expr)]`. A resolved field with a
    /// default is still resolved, the default only applies to arguments built by hand.
    Injectable;
    /// Turn a function into a [`Factory`].
    ///
    /// Generates a unit struct with the name of the function, implementing
    /// [`Factory`]. Returning `Arc<T>` produces `T`, returning `Result<T>`
    /// propagates the error.
    ///
    /// - `rigging_path = path`: the path of this crate, default is `::rigging`.
    ///
    /// Arguments follow the field rules of [`Injectable`], and are positional
    /// unless marked `#[di(keyword)]`.
    Factory;
}
