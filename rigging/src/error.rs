use std::error::Error as StdError;

use crate::{DependencyPath, Key};

/// A boxed error raised outside the core, e.g. by a factory or a custom scope.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// A specialized [`Result`](std::result::Result) type for rigging operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The root of every error raised by the injector.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A malformed bind request.
    #[error(transparent)]
    Binding(#[from] BindingError),
    /// A key could not be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),
    /// A constructor or factory could not take its arguments.
    #[error(transparent)]
    Argument(#[from] ArgumentError),
    /// An error raised by a provider, factory or custom scope.
    #[error(transparent)]
    External(BoxError),
}

impl Error {
    /// Wraps an error raised outside the core.
    pub fn external<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Error::External(error.into())
    }

    /// Returns whether the error is a [`BindingError`].
    pub fn is_binding(&self) -> bool {
        matches!(self, Error::Binding(_))
    }

    /// Returns whether the error is a [`ResolutionError`], circular dependencies included.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Error::Resolution(_))
    }

    /// Returns whether the error is a [`ResolutionError::CircularDependency`].
    pub fn is_circular(&self) -> bool {
        matches!(
            self,
            Error::Resolution(ResolutionError::CircularDependency { .. })
        )
    }
}

/// Errors raised while registering a binding.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// More than one of `to_class`, `to_factory`, `to_value` and `to_provider` was given.
    #[error(
        "provide only one of `to_class`, `to_factory`, `to_value` or `to_provider` for `{key}`, {count} were given"
    )]
    MultipleTargets {
        /// The key being bound.
        key: Key,
        /// The number of targets given.
        count: usize,
    },
    /// No target was given and the key is not a constructible type.
    #[error(
        "cannot determine a provider for `{key}`, please specify `to_class`, `to_factory` or `to_value`"
    )]
    UndeterminedProvider {
        /// The key being bound.
        key: Key,
    },
    /// The key is already bound and the injector does not allow overriding.
    #[error("already existing a binding with the same key: `{key}`")]
    AlreadyBound {
        /// The key being bound.
        key: Key,
    },
    /// The scope instance could not be created.
    #[error("could not instantiate scope `{scope}`: {source}")]
    ScopeCreation {
        /// The type name of the scope.
        scope: &'static str,
        /// The error raised by the scope constructor.
        #[source]
        source: Box<Error>,
    },
}

/// Errors raised while resolving a key.
#[derive(Debug, thiserror::Error)]
pub enum ResolutionError {
    /// The key has no binding and is not a constructible type.
    #[error("no binding found for `{key}` and it is not a constructible type for auto-binding")]
    NoBinding {
        /// The requested key.
        key: Key,
    },
    /// The key was requested again while its own resolution was in flight.
    #[error("circular dependency detected for `{key}`: {path}")]
    CircularDependency {
        /// The key that closed the cycle.
        key: Key,
        /// The resolution chain, ending with `key`.
        path: DependencyPath,
    },
    /// The provider of a binding produced an instance of another type.
    #[error("binding for `{key}` produced an instance of `{found}`")]
    TypeMismatch {
        /// The requested key.
        key: Key,
        /// The type the instance was produced for.
        found: Key,
    },
}

/// Errors raised by a constructor or factory taking its resolved arguments.
#[derive(Debug, thiserror::Error)]
pub enum ArgumentError {
    /// No argument was resolved for the parameter.
    #[error("missing argument for parameter `{name}`")]
    Missing {
        /// The parameter name.
        name: &'static str,
    },
    /// The argument was resolved for another type.
    #[error("argument for parameter `{name}` is a `{found}`, expected `{expected}`")]
    TypeMismatch {
        /// The parameter name.
        name: &'static str,
        /// The type requested by the constructor.
        expected: Key,
        /// The type the argument was resolved for.
        found: Key,
    },
}
