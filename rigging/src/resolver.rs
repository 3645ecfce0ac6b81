use std::{collections::VecDeque, sync::Arc};

use crate::{ArgumentError, Context, DynInstance, Key, ParamKind, Result};

/// Represents a parameter declared by a constructor or a factory.
///
/// A parameter carrying a type marker is resolved from the injector before the
/// constructor runs. A parameter without a marker is left to the constructor,
/// which applies its own default.
///
/// # Example
///
/// ```rust
/// use rigging::{ParamKind, Parameter};
///
/// # fn main() {
/// let parameter = Parameter::keyword("port").marked::<u16>().with_default();
///
/// assert_eq!(parameter.name(), "port");
/// assert_eq!(parameter.kind(), ParamKind::Keyword);
/// assert!(parameter.marker().is_some());
/// assert!(parameter.has_default());
/// # }
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    name: &'static str,
    kind: ParamKind,
    marker: Option<Key>,
    has_default: bool,
}

impl Parameter {
    fn new(name: &'static str, kind: ParamKind) -> Self {
        Self {
            name,
            kind,
            marker: None,
            has_default: false,
        }
    }

    /// Creates a positional parameter.
    pub fn positional(name: &'static str) -> Self {
        Self::new(name, ParamKind::Positional)
    }

    /// Creates a keyword parameter.
    pub fn keyword(name: &'static str) -> Self {
        Self::new(name, ParamKind::Keyword)
    }

    /// Creates a variadic positional parameter, which is never injected.
    pub fn var_positional(name: &'static str) -> Self {
        Self::new(name, ParamKind::VarPositional)
    }

    /// Creates a variadic keyword parameter, which is never injected.
    pub fn var_keyword(name: &'static str) -> Self {
        Self::new(name, ParamKind::VarKeyword)
    }

    /// Marks the parameter with the type `T` it is resolved as.
    pub fn marked<T: ?Sized + 'static>(mut self) -> Self {
        self.marker = Some(Key::of::<T>());
        self
    }

    /// Declares that the constructor has a default value for the parameter.
    pub fn with_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Returns the name of the parameter.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns how the parameter receives its argument.
    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    /// Returns the type marker of the parameter.
    pub fn marker(&self) -> Option<&Key> {
        self.marker.as_ref()
    }

    /// Returns whether the constructor has a default value for the parameter.
    pub fn has_default(&self) -> bool {
        self.has_default
    }
}

/// The resolved arguments handed to a constructor or a factory.
///
/// Positional arguments are taken in declaration order, keyword arguments
/// by name.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    positional: VecDeque<(&'static str, DynInstance)>,
    keyword: Vec<(&'static str, DynInstance)>,
}

impl Arguments {
    /// Appends a positional argument.
    pub fn push_positional(&mut self, name: &'static str, instance: DynInstance) {
        self.positional.push_back((name, instance));
    }

    /// Appends a keyword argument.
    pub fn push_keyword(&mut self, name: &'static str, instance: DynInstance) {
        self.keyword.push((name, instance));
    }

    /// Returns the number of arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keyword.len()
    }

    /// Returns whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes the next positional argument.
    pub fn positional<T>(&mut self, name: &'static str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.positional.pop_front() {
            Some((_, instance)) => downcast(name, instance),
            None => Err(ArgumentError::Missing { name }.into()),
        }
    }

    /// Takes the next positional argument, or calls `default` if there is none left.
    pub fn positional_or_else<T, F>(&mut self, name: &'static str, default: F) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Arc<T>,
    {
        match self.positional.pop_front() {
            Some((_, instance)) => downcast(name, instance),
            None => Ok(default()),
        }
    }

    /// Takes the keyword argument named `name`.
    pub fn keyword<T>(&mut self, name: &'static str) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.take_keyword(name) {
            Some(instance) => downcast(name, instance),
            None => Err(ArgumentError::Missing { name }.into()),
        }
    }

    /// Takes the keyword argument named `name`, or calls `default` if it was not resolved.
    pub fn keyword_or_else<T, F>(&mut self, name: &'static str, default: F) -> Result<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
        F: FnOnce() -> Arc<T>,
    {
        match self.take_keyword(name) {
            Some(instance) => downcast(name, instance),
            None => Ok(default()),
        }
    }

    fn take_keyword(&mut self, name: &str) -> Option<DynInstance> {
        let index = self.keyword.iter().position(|(n, _)| *n == name)?;
        Some(self.keyword.remove(index).1)
    }
}

fn downcast<T>(name: &'static str, instance: DynInstance) -> Result<Arc<T>>
where
    T: ?Sized + Send + Sync + 'static,
{
    instance.as_instance::<T>().ok_or_else(|| {
        ArgumentError::TypeMismatch {
            name,
            expected: Key::of::<T>(),
            found: *instance.ty(),
        }
        .into()
    })
}

/// Resolves the injectable parameters of a constructor or a factory.
///
/// Variadic parameters and parameters without a type marker are skipped.
/// A marked parameter is always resolved, even if it has a default, and a
/// failure to resolve it is returned unchanged.
pub fn resolve_arguments(cx: &mut Context<'_>, parameters: &[Parameter]) -> Result<Arguments> {
    let mut arguments = Arguments::default();

    for parameter in parameters {
        if parameter.kind.is_variadic() {
            continue;
        }

        let Some(marker) = &parameter.marker else {
            continue;
        };

        let instance = cx.resolve_key(marker)?;

        match parameter.kind {
            ParamKind::Positional => arguments.push_positional(parameter.name, instance),
            _ => arguments.push_keyword(parameter.name, instance),
        }
    }

    Ok(arguments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Injector, ResolutionError};

    struct Unbound;

    fn injector() -> Injector {
        let injector = Injector::options().auto_register(false).build();
        injector.bind::<i32>(|b| b.to_value(42)).unwrap();
        injector
            .bind::<String>(|b| b.to_value(String::from("hello")))
            .unwrap();
        injector
    }

    #[test]
    fn buckets_marked_parameters() {
        let injector = injector();
        let mut cx = Context::new(&injector);

        let mut arguments = resolve_arguments(
            &mut cx,
            &[
                Parameter::positional("0").marked::<i32>(),
                Parameter::keyword("greeting").marked::<String>(),
            ],
        )
        .unwrap();

        assert_eq!(arguments.len(), 2);
        assert_eq!(*arguments.keyword::<String>("greeting").unwrap(), "hello");
        assert_eq!(*arguments.positional::<i32>("0").unwrap(), 42);
        assert!(arguments.is_empty());
    }

    #[test]
    fn skips_variadic_and_unmarked_parameters() {
        let injector = injector();
        let mut cx = Context::new(&injector);

        let arguments = resolve_arguments(
            &mut cx,
            &[
                Parameter::var_positional("args").marked::<Unbound>(),
                Parameter::var_keyword("kwargs").marked::<Unbound>(),
                Parameter::keyword("plain"),
                Parameter::keyword("fallback").with_default(),
            ],
        )
        .unwrap();

        assert!(arguments.is_empty());
    }

    #[test]
    fn marked_parameter_with_default_is_still_resolved() {
        let injector = injector();
        let mut cx = Context::new(&injector);

        let err = resolve_arguments(
            &mut cx,
            &[Parameter::keyword("unbound")
                .marked::<Unbound>()
                .with_default()],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Resolution(ResolutionError::NoBinding { key }) if key == Key::of::<Unbound>()
        ));
        assert!(cx.dependency_chain().is_empty());
    }

    #[test]
    fn accessors_report_missing_and_mismatched_arguments() {
        let mut arguments = Arguments::default();
        arguments.push_keyword("number", DynInstance::new(Arc::new(1_i32)));

        assert!(matches!(
            arguments.keyword::<String>("number"),
            Err(Error::Argument(ArgumentError::TypeMismatch { name: "number", .. }))
        ));
        assert!(matches!(
            arguments.positional::<i32>("0"),
            Err(Error::Argument(ArgumentError::Missing { name: "0" }))
        ));
        assert_eq!(
            *arguments
                .keyword_or_else::<i32, _>("number", || Arc::new(7))
                .unwrap(),
            7
        );
    }
}
